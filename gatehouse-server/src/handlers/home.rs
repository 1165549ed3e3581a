use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::{
    infra::app_state::AppState,
    middleware::cookies::{CurrentUser, PendingNotice},
    views::{Page, View},
};

/// Landing page: shows the pending notice and who is signed in.
pub async fn index(
    State(state): State<AppState>,
    notice: PendingNotice,
    CurrentUser(user): CurrentUser,
) -> Page {
    View::new("Home")
        .current_user(user.as_ref())
        .page(notice, state.config.cookie_secure)
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
