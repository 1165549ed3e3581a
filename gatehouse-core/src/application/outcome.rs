use std::fmt;

use serde::Serialize;

use crate::identity::{Role, SessionTicket, User, UserRoles};

/// One-shot success message shown by the view rendered after the redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Registered,
    LoggedIn,
    LoggedOut,
    RoleCreated,
    RoleAssigned,
    UserCreated,
}

impl Notice {
    pub fn message(self) -> &'static str {
        match self {
            Notice::Registered => "Registration successful!",
            Notice::LoggedIn => "Login successful!",
            Notice::LoggedOut => "You have been logged out.",
            Notice::RoleCreated => "Role created successfully!",
            Notice::RoleAssigned => "Role assigned successfully!",
            Notice::UserCreated => "User created successfully!",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// What a completed flow did to the caller's session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    Unchanged,
    Started(SessionTicket),
    Ended,
}

/// Result of a form submission.
///
/// `Rejected` carries the messages to attach to the redisplayed form.
/// Infrastructure failures never end up here; they are returned as
/// [`IdentityError`](crate::error::IdentityError) instead.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum FlowOutcome {
    Completed {
        notice: Notice,
        session: SessionChange,
    },
    Rejected {
        errors: Vec<String>,
    },
}

impl FlowOutcome {
    pub fn completed(notice: Notice) -> Self {
        FlowOutcome::Completed {
            notice,
            session: SessionChange::Unchanged,
        }
    }

    pub fn rejected<I, S>(errors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        FlowOutcome::Rejected {
            errors: errors.into_iter().map(|e| e.to_string()).collect(),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, FlowOutcome::Completed { .. })
    }

    pub fn errors(&self) -> &[String] {
        match self {
            FlowOutcome::Completed { .. } => &[],
            FlowOutcome::Rejected { errors } => errors,
        }
    }
}

/// Selection lists shown next to the assign-role form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssignRoleChoices {
    pub roles: Vec<String>,
    pub users: Vec<String>,
}

/// Everything the users-and-roles listing displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    pub users: Vec<User>,
    pub roles: Vec<Role>,
    pub user_roles: UserRoles,
}

impl Directory {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.roles.is_empty() && self.user_roles.is_empty()
    }
}
