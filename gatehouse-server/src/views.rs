//! JSON view models and the responses the form handlers produce.

use std::collections::BTreeMap;

use axum::{
    Json,
    http::{StatusCode, header},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use gatehouse_core::{
    application::{Notice, SessionChange},
    identity::{Role, User, UserRoles},
};
use serde::Serialize;
use uuid::Uuid;

use crate::middleware::cookies::{
    NOTICE_COOKIE, PendingNotice, SESSION_COOKIE, expired_cookie, notice_cookie, session_cookie,
};

#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleSummary {
    pub id: Uuid,
    pub name: String,
}

impl From<Role> for RoleSummary {
    fn from(role: Role) -> Self {
        Self {
            id: role.id,
            name: role.name,
        }
    }
}

/// Selection lists are plain names; the listing page shows full records.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Names(Vec<String>),
    Records(Vec<T>),
}

/// The JSON stand-in for a rendered page.
#[derive(Debug, Clone, Serialize)]
pub struct View {
    pub view: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    pub errors: Vec<String>,
    pub values: BTreeMap<&'static str, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Listing<RoleSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<Listing<UserSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_roles: Option<UserRoles>,
}

impl View {
    pub fn new(view: &'static str) -> Self {
        Self {
            view,
            notice: None,
            errors: Vec::new(),
            values: BTreeMap::new(),
            current_user: None,
            roles: None,
            users: None,
            user_roles: None,
        }
    }

    pub fn errors(mut self, errors: Vec<String>) -> Self {
        self.errors = errors;
        self
    }

    /// Echo a submitted field. Never called for passwords.
    pub fn value(mut self, field: &'static str, value: impl Into<String>) -> Self {
        self.values.insert(field, value.into());
        self
    }

    pub fn current_user(mut self, user: Option<&User>) -> Self {
        self.current_user = user.map(|user| user.email.clone());
        self
    }

    pub fn role_names(mut self, names: Vec<String>) -> Self {
        self.roles = Some(Listing::Names(names));
        self
    }

    pub fn user_emails(mut self, emails: Vec<String>) -> Self {
        self.users = Some(Listing::Names(emails));
        self
    }

    pub fn directory(mut self, users: Vec<User>, roles: Vec<Role>, user_roles: UserRoles) -> Self {
        self.users = Some(Listing::Records(users.into_iter().map(Into::into).collect()));
        self.roles = Some(Listing::Records(roles.into_iter().map(Into::into).collect()));
        self.user_roles = Some(user_roles);
        self
    }

    /// A GET render. Consumes the pending notice, if any.
    pub fn page(mut self, notice: PendingNotice, secure: bool) -> Page {
        self.notice = notice.message;
        Page {
            status: StatusCode::OK,
            view: self,
            clear_notice: notice.present.then(|| expired_cookie(NOTICE_COOKIE, secure)),
        }
    }

    /// The form redisplayed after a rejected submission.
    pub fn rejected(self) -> Page {
        Page {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            view: self,
            clear_notice: None,
        }
    }
}

#[derive(Debug)]
pub struct Page {
    status: StatusCode,
    view: View,
    clear_notice: Option<String>,
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        let cookies = self
            .clear_notice
            .into_iter()
            .map(|cookie| (header::SET_COOKIE, cookie));
        (self.status, AppendHeaders(cookies), Json(self.view)).into_response()
    }
}

/// `303 See Other` after a completed submission, carrying the notice and
/// any session cookie change.
#[derive(Debug)]
pub struct Completed {
    pub to: &'static str,
    pub notice: Notice,
    pub session: SessionChange,
    pub secure: bool,
}

impl IntoResponse for Completed {
    fn into_response(self) -> Response {
        let mut cookies = vec![(
            header::SET_COOKIE,
            notice_cookie(self.notice.message(), self.secure),
        )];
        match &self.session {
            SessionChange::Unchanged => {}
            SessionChange::Started(ticket) => {
                cookies.push((header::SET_COOKIE, session_cookie(ticket, self.secure)));
            }
            SessionChange::Ended => {
                cookies.push((header::SET_COOKIE, expired_cookie(SESSION_COOKIE, self.secure)));
            }
        }
        (AppendHeaders(cookies), Redirect::to(self.to)).into_response()
    }
}
