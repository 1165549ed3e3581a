use std::{fmt, sync::Arc};

use tracing::{debug, info};

use crate::{
    error::Result,
    identity::{CredentialStore, IdentityResult, User},
};

/// Startup and command-line provisioning: seed roles, create the first
/// administrator.
pub struct BootstrapService {
    store: Arc<dyn CredentialStore>,
}

impl fmt::Debug for BootstrapService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapService")
            .field("store", &"Arc<dyn CredentialStore>")
            .finish()
    }
}

impl BootstrapService {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Creates each named role that does not exist yet. Returns how many
    /// were created.
    pub async fn ensure_roles<S: AsRef<str>>(&self, names: &[S]) -> Result<usize> {
        let mut created = 0;
        for name in names.iter().map(AsRef::as_ref).map(str::trim) {
            if name.is_empty() || self.store.role_exists(name).await? {
                continue;
            }
            match self.store.create_role(name).await? {
                IdentityResult::Succeeded(role) => {
                    info!(role = %role.name, "seeded role");
                    created += 1;
                }
                // Created concurrently by another instance.
                failed => debug!(role = name, failures = ?failed.descriptions(), "role not seeded"),
            }
        }
        Ok(created)
    }

    /// Creates a user and, when given, places it in `role`, creating the role
    /// first if needed. Unlike the admin form, an attachment failure is
    /// reported back to the caller.
    pub async fn provision_user(
        &self,
        email: &str,
        password: &str,
        role: Option<&str>,
    ) -> Result<IdentityResult<User>> {
        let user = match self.store.create_user(email, password).await? {
            IdentityResult::Succeeded(user) => user,
            IdentityResult::Failed(failures) => return Ok(IdentityResult::Failed(failures)),
        };

        if let Some(role) = role.map(str::trim).filter(|r| !r.is_empty()) {
            self.ensure_roles(&[role]).await?;
            if let IdentityResult::Failed(failures) = self.store.add_to_role(&user, role).await? {
                return Ok(IdentityResult::Failed(failures));
            }
        }

        Ok(IdentityResult::Succeeded(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{AuthCrypto, IdentityManager, PasswordPolicy};
    use crate::infrastructure::InMemoryIdentityRepository;

    fn service() -> (BootstrapService, Arc<IdentityManager>) {
        let store = Arc::new(IdentityManager::new(
            Arc::new(InMemoryIdentityRepository::default()),
            Arc::new(AuthCrypto::for_tests()),
            PasswordPolicy::default(),
        ));
        (BootstrapService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let (service, store) = service();
        assert_eq!(service.ensure_roles(&["Admin", "User", " "]).await.unwrap(), 2);
        assert_eq!(service.ensure_roles(&["admin", "User"]).await.unwrap(), 0);
        assert_eq!(store.roles().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn provisioned_user_gets_role_created_on_demand() {
        let (service, store) = service();
        let user = service
            .provision_user("root@example.com", "Secret#1", Some("Admin"))
            .await
            .unwrap()
            .into_result()
            .unwrap();

        assert_eq!(store.roles_for(&user).await.unwrap(), vec!["Admin".to_string()]);
    }

    #[tokio::test]
    async fn provisioning_reports_policy_failures() {
        let (service, store) = service();
        let result = service
            .provision_user("root@example.com", "short", Some("Admin"))
            .await
            .unwrap();

        assert!(!result.is_succeeded());
        assert!(store.roles().await.unwrap().is_empty());
    }
}
