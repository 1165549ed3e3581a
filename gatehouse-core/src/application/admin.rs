//! Role and user administration on top of the credential store.

use std::{fmt, sync::Arc};

use tracing::{info, warn};

use crate::{
    error::Result,
    identity::{CredentialStore, IdentityResult, UserRoles},
};

use super::{
    forms::{AssignRoleInput, CreateRoleInput, CreateUserInput},
    outcome::{AssignRoleChoices, Directory, FlowOutcome, Notice},
};

pub const ROLE_NAME_REQUIRED: &str = "Role name is required";
pub const ROLE_ALREADY_EXISTS: &str = "Role already exists";
pub const USER_OR_ROLE_NOT_FOUND: &str = "User or Role not found";

pub struct AdminFlow {
    store: Arc<dyn CredentialStore>,
}

impl fmt::Debug for AdminFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminFlow")
            .field("store", &"Arc<dyn CredentialStore>")
            .finish()
    }
}

impl AdminFlow {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    pub async fn create_role(&self, input: &CreateRoleInput) -> Result<FlowOutcome> {
        let name = input.role_name.trim();
        if name.is_empty() {
            return Ok(FlowOutcome::rejected([ROLE_NAME_REQUIRED]));
        }
        if self.store.role_exists(name).await? {
            return Ok(FlowOutcome::rejected([ROLE_ALREADY_EXISTS]));
        }

        match self.store.create_role(name).await? {
            IdentityResult::Succeeded(role) => {
                info!(role = %role.name, "role created via admin");
                Ok(FlowOutcome::completed(Notice::RoleCreated))
            }
            failed @ IdentityResult::Failed(_) => {
                Ok(FlowOutcome::rejected(failed.descriptions()))
            }
        }
    }

    /// Role names and user emails for the assign-role selection lists.
    pub async fn assign_role_choices(&self) -> Result<AssignRoleChoices> {
        let roles = self.role_names().await?;
        let users = self
            .store
            .users()
            .await?
            .into_iter()
            .map(|user| user.email)
            .collect();
        Ok(AssignRoleChoices { roles, users })
    }

    pub async fn assign_role(&self, input: &AssignRoleInput) -> Result<FlowOutcome> {
        let Some(user) = self.store.find_by_email(&input.email).await? else {
            return Ok(FlowOutcome::rejected([USER_OR_ROLE_NOT_FOUND]));
        };
        if !self.store.role_exists(&input.role).await? {
            return Ok(FlowOutcome::rejected([USER_OR_ROLE_NOT_FOUND]));
        }

        match self.store.add_to_role(&user, input.role.trim()).await? {
            IdentityResult::Succeeded(()) => {
                info!(user_id = %user.id, role = %input.role.trim(), "role assigned");
                Ok(FlowOutcome::completed(Notice::RoleAssigned))
            }
            failed @ IdentityResult::Failed(_) => {
                Ok(FlowOutcome::rejected(failed.descriptions()))
            }
        }
    }

    /// Role names for the create-user selection list.
    pub async fn role_names(&self) -> Result<Vec<String>> {
        Ok(self
            .store
            .roles()
            .await?
            .into_iter()
            .map(|role| role.name)
            .collect())
    }

    /// Creates a user without signing anyone in. The optional role is attached
    /// only when it exists; a missing role or a failed attachment is logged
    /// and otherwise ignored.
    pub async fn create_user(&self, input: &CreateUserInput) -> Result<FlowOutcome> {
        let errors = input.validate();
        if !errors.is_empty() {
            return Ok(FlowOutcome::rejected(errors));
        }

        let user = match self.store.create_user(&input.email, &input.password).await? {
            IdentityResult::Succeeded(user) => user,
            failed @ IdentityResult::Failed(_) => {
                return Ok(FlowOutcome::rejected(failed.descriptions()));
            }
        };
        info!(user_id = %user.id, "user created via admin");

        if let Some(role) = input.requested_role() {
            match self.store.role_exists(role).await {
                Ok(true) => match self.store.add_to_role(&user, role).await {
                    Ok(IdentityResult::Succeeded(())) => {
                        info!(user_id = %user.id, role, "role assigned");
                    }
                    Ok(failed) => {
                        warn!(user_id = %user.id, role, failures = ?failed.descriptions(), "role not attached");
                    }
                    Err(err) => {
                        warn!(user_id = %user.id, role, error = %err, "role not attached");
                    }
                },
                Ok(false) => warn!(user_id = %user.id, role, "requested role does not exist"),
                Err(err) => warn!(user_id = %user.id, role, error = %err, "role lookup failed"),
            }
        }

        Ok(FlowOutcome::completed(Notice::UserCreated))
    }

    /// Every user, every role, and the roles each user holds. Looks the
    /// memberships up one user at a time.
    pub async fn directory(&self) -> Result<Directory> {
        let users = self.store.users().await?;
        let roles = self.store.roles().await?;

        let mut user_roles = UserRoles::new();
        for user in &users {
            user_roles.insert(user.id, self.store.roles_for(user).await?);
        }

        Ok(Directory {
            users,
            roles,
            user_roles,
        })
    }
}
