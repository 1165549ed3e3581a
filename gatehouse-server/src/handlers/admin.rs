//! `/Admin/*`: role and user administration.

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use gatehouse_core::application::{
    AssignRoleInput, CreateRoleInput, CreateUserInput, FlowOutcome,
};

use crate::{
    infra::{app_state::AppState, errors::AppResult},
    middleware::cookies::PendingNotice,
    views::{Completed, Page, View},
};

pub const CREATE_ROLE: &str = "/Admin/CreateRole";
pub const ASSIGN_ROLE: &str = "/Admin/AssignRole";
pub const CREATE_USER: &str = "/Admin/CreateUser";
pub const LIST_USERS_AND_ROLES: &str = "/Admin/ListUsersAndRoles";

/// Completed admin submissions land back on their own (empty) form.
fn finish(state: &AppState, outcome: FlowOutcome, back_to: &'static str, form: View) -> Response {
    match outcome {
        FlowOutcome::Completed { notice, session } => Completed {
            to: back_to,
            notice,
            session,
            secure: state.config.cookie_secure,
        }
        .into_response(),
        FlowOutcome::Rejected { errors } => form.errors(errors).rejected().into_response(),
    }
}

pub async fn create_role_form(State(state): State<AppState>, notice: PendingNotice) -> Page {
    View::new("Admin/CreateRole").page(notice, state.config.cookie_secure)
}

pub async fn create_role(
    State(state): State<AppState>,
    Form(input): Form<CreateRoleInput>,
) -> AppResult<Response> {
    let outcome = state.admin().create_role(&input).await?;
    let form = View::new("Admin/CreateRole").value("roleName", input.role_name);
    Ok(finish(&state, outcome, CREATE_ROLE, form))
}

pub async fn assign_role_form(
    State(state): State<AppState>,
    notice: PendingNotice,
) -> AppResult<Page> {
    let choices = state.admin().assign_role_choices().await?;
    Ok(View::new("Admin/AssignRole")
        .role_names(choices.roles)
        .user_emails(choices.users)
        .page(notice, state.config.cookie_secure))
}

pub async fn assign_role(
    State(state): State<AppState>,
    Form(input): Form<AssignRoleInput>,
) -> AppResult<Response> {
    let admin = state.admin();
    let outcome = admin.assign_role(&input).await?;
    if outcome.is_completed() {
        return Ok(finish(&state, outcome, ASSIGN_ROLE, View::new("Admin/AssignRole")));
    }

    let choices = admin.assign_role_choices().await?;
    let form = View::new("Admin/AssignRole")
        .value("email", input.email)
        .value("role", input.role)
        .role_names(choices.roles)
        .user_emails(choices.users);
    Ok(finish(&state, outcome, ASSIGN_ROLE, form))
}

pub async fn create_user_form(
    State(state): State<AppState>,
    notice: PendingNotice,
) -> AppResult<Page> {
    let roles = state.admin().role_names().await?;
    Ok(View::new("Admin/CreateUser")
        .role_names(roles)
        .page(notice, state.config.cookie_secure))
}

pub async fn create_user(
    State(state): State<AppState>,
    Form(input): Form<CreateUserInput>,
) -> AppResult<Response> {
    let admin = state.admin();
    let outcome = admin.create_user(&input).await?;
    if outcome.is_completed() {
        return Ok(finish(&state, outcome, CREATE_USER, View::new("Admin/CreateUser")));
    }

    let roles = admin.role_names().await?;
    let form = View::new("Admin/CreateUser")
        .value("email", input.email)
        .value("role", input.role.unwrap_or_default())
        .role_names(roles);
    Ok(finish(&state, outcome, CREATE_USER, form))
}

pub async fn list_users_and_roles(
    State(state): State<AppState>,
    notice: PendingNotice,
) -> AppResult<Page> {
    let directory = state.admin().directory().await?;
    Ok(View::new("Admin/ListUsersAndRoles")
        .directory(directory.users, directory.roles, directory.user_roles)
        .page(notice, state.config.cookie_secure))
}
