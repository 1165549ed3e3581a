//! Registration, login and logout.

use std::{fmt, sync::Arc};

use tracing::{debug, info};

use crate::{
    error::Result,
    identity::{CredentialStore, IdentityResult, SessionAuthenticator, SignInResult},
};

use super::{
    forms::{LoginInput, RegisterInput},
    outcome::{FlowOutcome, Notice, SessionChange},
};

pub const INVALID_LOGIN_ATTEMPT: &str = "Invalid login attempt. Please try again.";

pub struct AccountFlow {
    store: Arc<dyn CredentialStore>,
    sessions: Arc<dyn SessionAuthenticator>,
}

impl fmt::Debug for AccountFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountFlow")
            .field("store", &"Arc<dyn CredentialStore>")
            .field("sessions", &"Arc<dyn SessionAuthenticator>")
            .finish()
    }
}

impl AccountFlow {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionAuthenticator>,
    ) -> Self {
        Self { store, sessions }
    }

    /// Create the account and sign it in with a browser-session cookie.
    pub async fn register(&self, input: &RegisterInput) -> Result<FlowOutcome> {
        let errors = input.validate();
        if !errors.is_empty() {
            return Ok(FlowOutcome::rejected(errors));
        }

        let user = match self.store.create_user(&input.email, &input.password).await? {
            IdentityResult::Succeeded(user) => user,
            failed @ IdentityResult::Failed(_) => {
                debug!(failures = failed.failures().len(), "registration refused");
                return Ok(FlowOutcome::rejected(failed.descriptions()));
            }
        };

        let ticket = self.sessions.sign_in(&user, false).await?;
        info!(user_id = %user.id, "user registered");

        Ok(FlowOutcome::Completed {
            notice: Notice::Registered,
            session: SessionChange::Started(ticket),
        })
    }

    pub async fn login(&self, input: &LoginInput) -> Result<FlowOutcome> {
        let errors = input.validate();
        if !errors.is_empty() {
            return Ok(FlowOutcome::rejected(errors));
        }

        match self
            .sessions
            .password_sign_in(&input.email, &input.password, input.remember_me)
            .await?
        {
            SignInResult::Succeeded(ticket) => {
                info!(user_id = %ticket.user_id, persistent = ticket.persistent, "user logged in");
                Ok(FlowOutcome::Completed {
                    notice: Notice::LoggedIn,
                    session: SessionChange::Started(ticket),
                })
            }
            SignInResult::Failed => Ok(FlowOutcome::rejected([INVALID_LOGIN_ATTEMPT])),
        }
    }

    /// Ends the caller's session. Succeeds whether or not there was one.
    pub async fn logout(&self, token: Option<&str>) -> Result<FlowOutcome> {
        self.sessions.sign_out(token).await?;
        Ok(FlowOutcome::Completed {
            notice: Notice::LoggedOut,
            session: SessionChange::Ended,
        })
    }
}
