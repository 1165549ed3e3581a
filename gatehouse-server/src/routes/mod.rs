use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::{
    AppState,
    handlers::{accounts, admin, home},
    middleware::admin_guard::require_admin_role,
};

/// The full application router with state applied.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(home::index))
        .route("/health", get(home::health))
        .merge(account_routes())
        .merge(admin_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/Accounts/Register",
            get(accounts::register_form).post(accounts::register),
        )
        .route(
            "/Accounts/Login",
            get(accounts::login_form).post(accounts::login),
        )
        .route("/Accounts/Logout", post(accounts::logout))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            admin::CREATE_ROLE,
            get(admin::create_role_form).post(admin::create_role),
        )
        .route(
            admin::ASSIGN_ROLE,
            get(admin::assign_role_form).post(admin::assign_role),
        )
        .route(
            admin::CREATE_USER,
            get(admin::create_user_form).post(admin::create_user),
        )
        .route(admin::LIST_USERS_AND_ROLES, get(admin::list_users_and_roles))
        .route_layer(middleware::from_fn_with_state(state, require_admin_role))
}
