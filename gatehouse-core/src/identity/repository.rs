use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;

use super::model::{Role, User};

/// Persistence port behind the [`IdentityManager`](super::IdentityManager).
///
/// Implementations only store and fetch; validation, hashing and
/// normalization happen in the manager. Lookups take already-normalized keys.
/// Inserting a user or role whose normalized key already exists must fail
/// with [`IdentityError::Conflict`](crate::error::IdentityError::Conflict).
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    async fn insert_user(&self, user: &User, password_hash: &str) -> Result<()>;
    async fn find_user_by_normalized_email(
        &self,
        normalized_email: &str,
    ) -> Result<Option<User>>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn password_hash(&self, user_id: Uuid) -> Result<Option<String>>;
    async fn list_users(&self) -> Result<Vec<User>>;

    async fn insert_role(&self, role: &Role) -> Result<()>;
    async fn find_role_by_normalized_name(
        &self,
        normalized_name: &str,
    ) -> Result<Option<Role>>;
    async fn list_roles(&self) -> Result<Vec<Role>>;

    /// Records a membership. Returns `false` when it already existed.
    async fn insert_membership(&self, user_id: Uuid, role_id: Uuid) -> Result<bool>;
    /// Names of the roles held by a user, ordered by name.
    async fn role_names_for_user(&self, user_id: Uuid) -> Result<Vec<String>>;
}
