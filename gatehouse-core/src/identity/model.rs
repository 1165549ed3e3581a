use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered account. The email doubles as the login name.
///
/// The password hash is deliberately not part of this record; it stays inside
/// the credential store and is only ever compared, never handed out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct User {
    pub id: Uuid,
    pub email: String,
    /// Upper-cased email used for uniqueness checks and lookups
    pub normalized_email: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: impl Into<String>) -> Self {
        let email = email.into();
        Self {
            id: Uuid::now_v7(),
            normalized_email: normalize(&email),
            email,
            created_at: Utc::now(),
        }
    }
}

/// A named role (e.g. "Admin") users can be members of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub normalized_name: String,
    pub created_at: DateTime<Utc>,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: Uuid::now_v7(),
            normalized_name: normalize(&name),
            name,
            created_at: Utc::now(),
        }
    }
}

/// Role names held by each user, keyed by user id.
pub type UserRoles = BTreeMap<Uuid, Vec<String>>;

/// Normalizes an email or role name for case-insensitive comparison.
pub fn normalize(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Loose address check: exactly one `@`, something on both sides, no
/// whitespace. Deliverability is not our concern.
pub fn is_valid_email(value: &str) -> bool {
    let value = value.trim();
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        }
        None => false,
    }
}
