use std::{fmt, sync::Arc};

use gatehouse_core::{
    application::{AccountFlow, AdminFlow},
    identity::{CredentialStore, SessionAuthenticator},
};

use crate::infra::config::Config;

/// Shared per-request state. The two collaborators are the only way handlers
/// reach user, role and session data.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CredentialStore>,
    pub sessions: Arc<dyn SessionAuthenticator>,
    pub config: Arc<Config>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionAuthenticator>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            store,
            sessions,
            config,
        }
    }

    pub fn accounts(&self) -> AccountFlow {
        AccountFlow::new(self.store.clone(), self.sessions.clone())
    }

    pub fn admin(&self) -> AdminFlow {
        AdminFlow::new(self.store.clone())
    }
}
