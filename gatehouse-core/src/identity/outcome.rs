//! Tagged success/failure results returned by the credential store.

use serde::Serialize;

/// One reason a credential-store operation was refused.
///
/// `code` is stable and meant for programmatic checks; `description` is the
/// human message forwarded verbatim to the form that triggered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityFailure {
    pub code: FailureCode,
    pub description: String,
}

impl IdentityFailure {
    pub fn new(code: FailureCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
        }
    }

    pub fn invalid_email(email: &str) -> Self {
        Self::new(FailureCode::InvalidEmail, format!("Email '{email}' is invalid."))
    }

    pub fn duplicate_email(email: &str) -> Self {
        Self::new(
            FailureCode::DuplicateEmail,
            format!("Email '{email}' is already taken."),
        )
    }

    pub fn invalid_role_name(name: &str) -> Self {
        Self::new(
            FailureCode::InvalidRoleName,
            format!("Role name '{name}' is invalid."),
        )
    }

    pub fn duplicate_role_name(name: &str) -> Self {
        Self::new(
            FailureCode::DuplicateRoleName,
            format!("Role name '{name}' is already taken."),
        )
    }

    pub fn role_not_found(name: &str) -> Self {
        Self::new(FailureCode::RoleNotFound, format!("Role {name} does not exist."))
    }

    pub fn user_already_in_role(name: &str) -> Self {
        Self::new(
            FailureCode::UserAlreadyInRole,
            format!("User already in role '{name}'."),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FailureCode {
    InvalidEmail,
    DuplicateEmail,
    InvalidRoleName,
    DuplicateRoleName,
    RoleNotFound,
    UserAlreadyInRole,
    PasswordTooShort,
    PasswordRequiresNonAlphanumeric,
    PasswordRequiresDigit,
    PasswordRequiresLower,
    PasswordRequiresUpper,
    PasswordRequiresUniqueChars,
}

/// Outcome of a credential-store operation: either the produced value or the
/// list of reasons it was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum IdentityResult<T = ()> {
    Succeeded(T),
    Failed(Vec<IdentityFailure>),
}

impl<T> IdentityResult<T> {
    pub fn failed(failure: IdentityFailure) -> Self {
        IdentityResult::Failed(vec![failure])
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, IdentityResult::Succeeded(_))
    }

    pub fn failures(&self) -> &[IdentityFailure] {
        match self {
            IdentityResult::Succeeded(_) => &[],
            IdentityResult::Failed(failures) => failures,
        }
    }

    /// Descriptions of every failure, in the order they were reported.
    pub fn descriptions(&self) -> Vec<String> {
        self.failures()
            .iter()
            .map(|failure| failure.description.clone())
            .collect()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> IdentityResult<U> {
        match self {
            IdentityResult::Succeeded(value) => IdentityResult::Succeeded(f(value)),
            IdentityResult::Failed(failures) => IdentityResult::Failed(failures),
        }
    }

    pub fn into_result(self) -> Result<T, Vec<IdentityFailure>> {
        match self {
            IdentityResult::Succeeded(value) => Ok(value),
            IdentityResult::Failed(failures) => Err(failures),
        }
    }
}

impl IdentityResult<()> {
    pub fn success() -> Self {
        IdentityResult::Succeeded(())
    }
}
