//! Credential store backed by an [`IdentityRepository`].

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{IdentityError, Result};

use super::{
    crypto::AuthCrypto,
    model::{Role, User, is_valid_email, normalize},
    outcome::{IdentityFailure, IdentityResult},
    policy::PasswordPolicy,
    repository::IdentityRepository,
    store::CredentialStore,
};

/// Validates, normalizes and hashes on top of a persistence port.
pub struct IdentityManager {
    repo: Arc<dyn IdentityRepository>,
    crypto: Arc<AuthCrypto>,
    policy: PasswordPolicy,
}

impl fmt::Debug for IdentityManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityManager")
            .field("repo", &"Arc<dyn IdentityRepository>")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl IdentityManager {
    pub fn new(
        repo: Arc<dyn IdentityRepository>,
        crypto: Arc<AuthCrypto>,
        policy: PasswordPolicy,
    ) -> Self {
        Self {
            repo,
            crypto,
            policy,
        }
    }

    pub fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }
}

#[async_trait]
impl CredentialStore for IdentityManager {
    async fn create_user(&self, email: &str, password: &str) -> Result<IdentityResult<User>> {
        let email = email.trim();
        let mut failures = Vec::new();

        if !is_valid_email(email) {
            failures.push(IdentityFailure::invalid_email(email));
        } else if self
            .repo
            .find_user_by_normalized_email(&normalize(email))
            .await?
            .is_some()
        {
            failures.push(IdentityFailure::duplicate_email(email));
        }

        failures.extend(self.policy.validate(password));
        if !failures.is_empty() {
            debug!(failures = failures.len(), "user creation refused");
            return Ok(IdentityResult::Failed(failures));
        }

        let password_hash = self.crypto.hash_password(password)?;
        let user = User::new(email);

        match self.repo.insert_user(&user, &password_hash).await {
            Ok(()) => {}
            // Lost a race against a concurrent registration of the same email.
            Err(IdentityError::Conflict(_)) => {
                return Ok(IdentityResult::failed(IdentityFailure::duplicate_email(email)));
            }
            Err(err) => return Err(err),
        }

        info!(user_id = %user.id, "user created");
        Ok(IdentityResult::Succeeded(user))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        if email.trim().is_empty() {
            return Ok(None);
        }
        self.repo
            .find_user_by_normalized_email(&normalize(email))
            .await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        self.repo.find_user_by_id(id).await
    }

    async fn create_role(&self, name: &str) -> Result<IdentityResult<Role>> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(IdentityResult::failed(IdentityFailure::invalid_role_name(name)));
        }

        let role = Role::new(name);
        if self
            .repo
            .find_role_by_normalized_name(&role.normalized_name)
            .await?
            .is_some()
        {
            return Ok(IdentityResult::failed(IdentityFailure::duplicate_role_name(name)));
        }

        match self.repo.insert_role(&role).await {
            Ok(()) => {}
            Err(IdentityError::Conflict(_)) => {
                return Ok(IdentityResult::failed(IdentityFailure::duplicate_role_name(name)));
            }
            Err(err) => return Err(err),
        }

        info!(role = %role.name, "role created");
        Ok(IdentityResult::Succeeded(role))
    }

    async fn role_exists(&self, name: &str) -> Result<bool> {
        if name.trim().is_empty() {
            return Ok(false);
        }
        Ok(self
            .repo
            .find_role_by_normalized_name(&normalize(name))
            .await?
            .is_some())
    }

    async fn add_to_role(&self, user: &User, role: &str) -> Result<IdentityResult<()>> {
        let Some(found) = self
            .repo
            .find_role_by_normalized_name(&normalize(role))
            .await?
        else {
            return Ok(IdentityResult::failed(IdentityFailure::role_not_found(role)));
        };

        if !self.repo.insert_membership(user.id, found.id).await? {
            return Ok(IdentityResult::failed(IdentityFailure::user_already_in_role(
                &found.name,
            )));
        }

        info!(user_id = %user.id, role = %found.name, "user added to role");
        Ok(IdentityResult::success())
    }

    async fn users(&self) -> Result<Vec<User>> {
        self.repo.list_users().await
    }

    async fn roles(&self) -> Result<Vec<Role>> {
        self.repo.list_roles().await
    }

    async fn roles_for(&self, user: &User) -> Result<Vec<String>> {
        self.repo.role_names_for_user(user.id).await
    }

    async fn check_password(&self, user: &User, password: &str) -> Result<bool> {
        match self.repo.password_hash(user.id).await? {
            Some(hash) => Ok(self.crypto.verify_password(password, &hash)?),
            None => Ok(false),
        }
    }
}
