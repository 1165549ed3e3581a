use std::collections::HashSet;

use serde::Deserialize;

use super::outcome::{FailureCode, IdentityFailure};

/// Password rules enforced by the credential store when an account is
/// created. Every violated rule is reported, not just the first one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_non_alphanumeric: bool,
    pub require_digit: bool,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
    pub required_unique_chars: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 6,
            require_non_alphanumeric: true,
            require_digit: true,
            require_lowercase: true,
            require_uppercase: true,
            required_unique_chars: 1,
        }
    }
}

impl PasswordPolicy {
    /// Check a candidate password, returning one failure per broken rule.
    pub fn validate(&self, password: &str) -> Vec<IdentityFailure> {
        let mut failures = Vec::new();

        if password.chars().count() < self.min_length {
            failures.push(IdentityFailure::new(
                FailureCode::PasswordTooShort,
                format!("Passwords must be at least {} characters.", self.min_length),
            ));
        }

        // Letters and digits of any script count as alphanumeric.
        if self.require_non_alphanumeric && password.chars().all(char::is_alphanumeric) {
            failures.push(IdentityFailure::new(
                FailureCode::PasswordRequiresNonAlphanumeric,
                "Passwords must have at least one non alphanumeric character.",
            ));
        }

        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            failures.push(IdentityFailure::new(
                FailureCode::PasswordRequiresDigit,
                "Passwords must have at least one digit ('0'-'9').",
            ));
        }

        if self.require_lowercase && !password.chars().any(|c| c.is_ascii_lowercase()) {
            failures.push(IdentityFailure::new(
                FailureCode::PasswordRequiresLower,
                "Passwords must have at least one lowercase ('a'-'z').",
            ));
        }

        if self.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
            failures.push(IdentityFailure::new(
                FailureCode::PasswordRequiresUpper,
                "Passwords must have at least one uppercase ('A'-'Z').",
            ));
        }

        if self.required_unique_chars >= 1 {
            let distinct = password.chars().collect::<HashSet<_>>().len();
            if distinct < self.required_unique_chars {
                failures.push(IdentityFailure::new(
                    FailureCode::PasswordRequiresUniqueChars,
                    format!(
                        "Passwords must use at least {} different characters.",
                        self.required_unique_chars
                    ),
                ));
            }
        }

        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(password: &str) -> Vec<FailureCode> {
        PasswordPolicy::default()
            .validate(password)
            .into_iter()
            .map(|failure| failure.code)
            .collect()
    }

    #[test]
    fn accepts_password_meeting_every_rule() {
        assert!(codes("Passw0rd!").is_empty());
    }

    #[test]
    fn reports_every_broken_rule() {
        assert_eq!(
            codes("abc"),
            vec![
                FailureCode::PasswordTooShort,
                FailureCode::PasswordRequiresNonAlphanumeric,
                FailureCode::PasswordRequiresDigit,
                FailureCode::PasswordRequiresUpper,
            ]
        );
    }

    #[test]
    fn accented_letters_are_not_symbols() {
        assert_eq!(
            codes("Passw0rdä"),
            vec![FailureCode::PasswordRequiresNonAlphanumeric]
        );
        assert!(codes("Passw0rdä!").is_empty());
    }

    #[test]
    fn empty_password_fails_unique_chars() {
        assert!(codes("").contains(&FailureCode::PasswordRequiresUniqueChars));
    }

    #[test]
    fn relaxed_policy_only_checks_length() {
        let policy = PasswordPolicy {
            min_length: 4,
            require_non_alphanumeric: false,
            require_digit: false,
            require_lowercase: false,
            require_uppercase: false,
            required_unique_chars: 0,
        };
        assert!(policy.validate("aaaa").is_empty());
        assert_eq!(policy.validate("aaa").len(), 1);
    }

    #[test]
    fn messages_match_the_configured_length() {
        let policy = PasswordPolicy {
            min_length: 12,
            ..PasswordPolicy::default()
        };
        let failures = policy.validate("Short#1a");
        assert_eq!(
            failures[0].description,
            "Passwords must be at least 12 characters."
        );
    }
}
