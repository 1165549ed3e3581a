use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{IdentityError, Result},
    identity::{IdentityRepository, Role, User},
};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    password_hashes: HashMap<Uuid, String>,
    users_by_email: HashMap<String, Uuid>,
    roles: HashMap<Uuid, Role>,
    roles_by_name: HashMap<String, Uuid>,
    memberships: BTreeSet<(Uuid, Uuid)>,
}

/// Process-local identity store. Used when no database is configured and
/// throughout the tests. All tables sit behind one lock so every write is
/// atomic with respect to the uniqueness checks.
#[derive(Clone, Debug, Default)]
pub struct InMemoryIdentityRepository {
    tables: Arc<RwLock<Tables>>,
}

#[async_trait]
impl IdentityRepository for InMemoryIdentityRepository {
    async fn insert_user(&self, user: &User, password_hash: &str) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.users_by_email.contains_key(&user.normalized_email) {
            return Err(IdentityError::Conflict(format!(
                "user {} already exists",
                user.email
            )));
        }

        tables
            .users_by_email
            .insert(user.normalized_email.clone(), user.id);
        tables
            .password_hashes
            .insert(user.id, password_hash.to_string());
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user_by_normalized_email(
        &self,
        normalized_email: &str,
    ) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users_by_email
            .get(normalized_email)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn password_hash(&self, user_id: Uuid) -> Result<Option<String>> {
        Ok(self
            .tables
            .read()
            .await
            .password_hashes
            .get(&user_id)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let mut users: Vec<User> = self.tables.read().await.users.values().cloned().collect();
        users.sort_by(|a, b| a.normalized_email.cmp(&b.normalized_email));
        Ok(users)
    }

    async fn insert_role(&self, role: &Role) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.roles_by_name.contains_key(&role.normalized_name) {
            return Err(IdentityError::Conflict(format!(
                "role {} already exists",
                role.name
            )));
        }

        tables
            .roles_by_name
            .insert(role.normalized_name.clone(), role.id);
        tables.roles.insert(role.id, role.clone());
        Ok(())
    }

    async fn find_role_by_normalized_name(
        &self,
        normalized_name: &str,
    ) -> Result<Option<Role>> {
        let tables = self.tables.read().await;
        Ok(tables
            .roles_by_name
            .get(normalized_name)
            .and_then(|id| tables.roles.get(id))
            .cloned())
    }

    async fn list_roles(&self) -> Result<Vec<Role>> {
        let mut roles: Vec<Role> = self.tables.read().await.roles.values().cloned().collect();
        roles.sort_by(|a, b| a.normalized_name.cmp(&b.normalized_name));
        Ok(roles)
    }

    async fn insert_membership(&self, user_id: Uuid, role_id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) {
            return Err(IdentityError::Storage(format!("unknown user {user_id}")));
        }
        if !tables.roles.contains_key(&role_id) {
            return Err(IdentityError::Storage(format!("unknown role {role_id}")));
        }
        Ok(tables.memberships.insert((user_id, role_id)))
    }

    async fn role_names_for_user(&self, user_id: Uuid) -> Result<Vec<String>> {
        let tables = self.tables.read().await;
        let mut roles: Vec<&Role> = tables
            .memberships
            .range((user_id, Uuid::nil())..=(user_id, Uuid::max()))
            .filter_map(|(_, role_id)| tables.roles.get(role_id))
            .collect();
        roles.sort_by(|a, b| a.normalized_name.cmp(&b.normalized_name));
        Ok(roles.into_iter().map(|role| role.name.clone()).collect())
    }
}
