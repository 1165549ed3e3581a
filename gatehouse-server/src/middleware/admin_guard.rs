use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use gatehouse_core::identity::normalize;
use tracing::debug;

use crate::{
    infra::{
        app_state::AppState,
        errors::{AppError, AppResult},
    },
    middleware::cookies::{SESSION_COOKIE, read_cookie},
};

pub const LOGIN_PATH: &str = "/Accounts/Login";

/// Gate for `/Admin/*` when `ADMIN_ROLE` is configured: anonymous callers are
/// sent to the login form, signed-in users without the role get 403.
pub async fn require_admin_role(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> AppResult<Response> {
    let Some(required) = state.config.admin_role.as_deref() else {
        return Ok(next.run(request).await);
    };

    let user = match read_cookie(request.headers(), SESSION_COOKIE) {
        Some(token) => state.sessions.authenticate(&token).await?,
        None => None,
    };
    let Some(user) = user else {
        return Ok(Redirect::to(LOGIN_PATH).into_response());
    };

    let required = normalize(required);
    let held = state.store.roles_for(&user).await?;
    if !held.iter().any(|role| normalize(role) == required) {
        debug!(user_id = %user.id, path = %request.uri().path(), "admin area refused");
        return Err(AppError::forbidden("Access denied."));
    }

    Ok(next.run(request).await)
}
