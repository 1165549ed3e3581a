//! `/Accounts/*`: registration, login and logout.

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use gatehouse_core::application::{FlowOutcome, LoginInput, RegisterInput};

use crate::{
    infra::{app_state::AppState, errors::AppResult},
    middleware::cookies::{PendingNotice, SessionToken},
    views::{Completed, View},
};

const LANDING: &str = "/";

fn finish(state: &AppState, outcome: FlowOutcome, form: View) -> Response {
    match outcome {
        FlowOutcome::Completed { notice, session } => Completed {
            to: LANDING,
            notice,
            session,
            secure: state.config.cookie_secure,
        }
        .into_response(),
        FlowOutcome::Rejected { errors } => form.errors(errors).rejected().into_response(),
    }
}

pub async fn register_form(State(state): State<AppState>, notice: PendingNotice) -> Response {
    View::new("Accounts/Register")
        .page(notice, state.config.cookie_secure)
        .into_response()
}

pub async fn register(
    State(state): State<AppState>,
    Form(input): Form<RegisterInput>,
) -> AppResult<Response> {
    let outcome = state.accounts().register(&input).await?;
    let form = View::new("Accounts/Register").value("email", input.email);
    Ok(finish(&state, outcome, form))
}

pub async fn login_form(State(state): State<AppState>, notice: PendingNotice) -> Response {
    View::new("Accounts/Login")
        .page(notice, state.config.cookie_secure)
        .into_response()
}

pub async fn login(
    State(state): State<AppState>,
    Form(input): Form<LoginInput>,
) -> AppResult<Response> {
    let outcome = state.accounts().login(&input).await?;
    let form = View::new("Accounts/Login")
        .value("email", input.email)
        .value("rememberMe", input.remember_me.to_string());
    Ok(finish(&state, outcome, form))
}

pub async fn logout(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
) -> AppResult<Response> {
    let outcome = state.accounts().logout(token.as_deref()).await?;
    Ok(finish(&state, outcome, View::new("Home")))
}
