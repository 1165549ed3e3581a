//! Form payloads posted to the account and admin flows, and their shape checks.
//!
//! Shape checks only look at the submitted fields. Anything that needs the
//! credential store (duplicates, password policy, role existence) is decided
//! later by the collaborators.

use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::identity::is_valid_email;

/// A field-less validation message, reported in field order.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    #[error("The Email field is required.")]
    EmailRequired,
    #[error("The Email field is not a valid e-mail address.")]
    EmailInvalid,
    #[error("The Password field is required.")]
    PasswordRequired,
    #[error("The password and confirmation password do not match.")]
    PasswordMismatch,
}

fn check_credentials(email: &str, password: &str, errors: &mut Vec<FieldError>) {
    if email.trim().is_empty() {
        errors.push(FieldError::EmailRequired);
    } else if !is_valid_email(email) {
        errors.push(FieldError::EmailInvalid);
    }

    if password.is_empty() {
        errors.push(FieldError::PasswordRequired);
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterInput {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        check_credentials(&self.email, &self.password, &mut errors);
        if self.confirm_password != self.password {
            errors.push(FieldError::PasswordMismatch);
        }
        errors
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoginInput {
    pub email: String,
    pub password: String,
    #[serde(deserialize_with = "checkbox")]
    pub remember_me: bool,
}

impl LoginInput {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        check_credentials(&self.email, &self.password, &mut errors);
        errors
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateRoleInput {
    pub role_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AssignRoleInput {
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateUserInput {
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

impl CreateUserInput {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        check_credentials(&self.email, &self.password, &mut errors);
        errors
    }

    /// The requested role, if one was actually filled in.
    pub fn requested_role(&self) -> Option<&str> {
        self.role
            .as_deref()
            .map(str::trim)
            .filter(|role| !role.is_empty())
    }
}

/// HTML checkboxes post `on` (or `true`) when ticked and nothing otherwise.
fn checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Bool(value) => value,
        Raw::Text(text) => matches!(
            text.trim().to_ascii_lowercase().as_str(),
            "on" | "true" | "1"
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn register_collects_every_shape_error_in_field_order() {
        let input = RegisterInput {
            email: "   ".into(),
            password: String::new(),
            confirm_password: "x".into(),
        };
        assert_eq!(
            input.validate(),
            vec![
                FieldError::EmailRequired,
                FieldError::PasswordRequired,
                FieldError::PasswordMismatch,
            ]
        );
    }

    #[test]
    fn malformed_email_is_reported_once() {
        let input = LoginInput {
            email: "alice.example.com".into(),
            password: "pw".into(),
            remember_me: false,
        };
        let errors = input.validate();
        assert_eq!(errors, vec![FieldError::EmailInvalid]);
        assert_eq!(
            errors[0].to_string(),
            "The Email field is not a valid e-mail address."
        );
    }

    #[test]
    fn well_formed_register_passes() {
        let input = RegisterInput {
            email: "alice@example.com".into(),
            password: "Secret#1".into(),
            confirm_password: "Secret#1".into(),
        };
        assert!(input.validate().is_empty());
    }

    #[test]
    fn form_field_names_follow_camel_case() {
        let register: RegisterInput = serde_json::from_value(json!({
            "email": "a@b.c",
            "password": "pw",
            "confirmPassword": "pw",
        }))
        .unwrap();
        assert_eq!(register.confirm_password, "pw");

        let role: CreateRoleInput =
            serde_json::from_value(json!({ "roleName": "Admin" })).unwrap();
        assert_eq!(role.role_name, "Admin");
    }

    #[test]
    fn remember_me_accepts_checkbox_values() {
        for (raw, expected) in [
            (json!("on"), true),
            (json!("true"), true),
            (json!("false"), false),
            (json!(""), false),
            (json!(true), true),
        ] {
            let input: LoginInput =
                serde_json::from_value(json!({ "email": "a@b.c", "rememberMe": raw }))
                    .unwrap();
            assert_eq!(input.remember_me, expected);
        }

        let absent: LoginInput = serde_json::from_value(json!({ "email": "a@b.c" })).unwrap();
        assert!(!absent.remember_me);
    }

    #[test]
    fn blank_role_counts_as_none() {
        let mut input = CreateUserInput {
            email: "a@b.c".into(),
            password: "pw".into(),
            role: Some("  ".into()),
        };
        assert_eq!(input.requested_role(), None);

        input.role = Some(" Editor ".into());
        assert_eq!(input.requested_role(), Some("Editor"));
    }
}
