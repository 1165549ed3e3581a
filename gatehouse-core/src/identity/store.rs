use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;

use super::{
    model::{Role, User},
    outcome::IdentityResult,
};

/// The credential store collaborator: owns users, roles and memberships.
///
/// Business refusals (duplicate email, weak password, unknown role) come back
/// as [`IdentityResult::Failed`]; the outer `Result` is reserved for
/// infrastructure failure. Email and role-name matching is case-insensitive.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Create a user whose login name is `email`, hashing `password`.
    async fn create_user(&self, email: &str, password: &str) -> Result<IdentityResult<User>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    async fn create_role(&self, name: &str) -> Result<IdentityResult<Role>>;

    async fn role_exists(&self, name: &str) -> Result<bool>;

    async fn add_to_role(&self, user: &User, role: &str) -> Result<IdentityResult<()>>;

    /// All users, ordered by email.
    async fn users(&self) -> Result<Vec<User>>;

    /// All roles, ordered by name.
    async fn roles(&self) -> Result<Vec<Role>>;

    /// Names of the roles `user` holds, ordered by name.
    async fn roles_for(&self, user: &User) -> Result<Vec<String>>;

    async fn check_password(&self, user: &User, password: &str) -> Result<bool>;
}
