//! Session authenticator: verifies credentials and tracks signed-in sessions.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{IdentityError, Result};

use super::{crypto::AuthCrypto, model::User, store::CredentialStore};

/// Proof of a freshly started session. `token` is the only copy of the
/// plaintext bearer value and belongs in the client's cookie.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionTicket {
    pub token: String,
    pub user_id: Uuid,
    pub persistent: bool,
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for SessionTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTicket")
            .field("token", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("persistent", &self.persistent)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Outcome of a password sign-in. Deliberately carries no reason on failure
/// so callers cannot tell an unknown email from a wrong password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInResult {
    Succeeded(SessionTicket),
    Failed,
}

impl SignInResult {
    pub fn is_succeeded(&self) -> bool {
        matches!(self, SignInResult::Succeeded(_))
    }
}

/// The session authenticator collaborator.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait SessionAuthenticator: Send + Sync {
    /// Start a session for an already-verified user.
    async fn sign_in(&self, user: &User, persistent: bool) -> Result<SessionTicket>;

    /// Verify `email`/`password` and, when they match, start a session.
    async fn password_sign_in(
        &self,
        email: &str,
        password: &str,
        persistent: bool,
    ) -> Result<SignInResult>;

    /// End the session identified by `token`. Unknown or absent tokens are a
    /// no-op.
    async fn sign_out<'a>(&self, token: Option<&'a str>) -> Result<()>;

    /// Resolve the user behind a live session token.
    async fn authenticate(&self, token: &str) -> Result<Option<User>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub lifetime: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lifetime: Duration::days(14),
        }
    }
}

#[derive(Debug, Clone)]
struct SessionRecord {
    user_id: Uuid,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl SessionRecord {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// In-process session table keyed by the HMAC digest of each token.
pub struct SessionManager {
    store: Arc<dyn CredentialStore>,
    crypto: Arc<AuthCrypto>,
    config: SessionConfig,
    sessions: DashMap<String, SessionRecord>,
    /// Verified against when the email is unknown, so both failure paths
    /// spend one Argon2 verification.
    dummy_hash: String,
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("config", &self.config)
            .field("active_sessions", &self.sessions.len())
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        crypto: Arc<AuthCrypto>,
        config: SessionConfig,
    ) -> Result<Self> {
        let dummy_hash = crypto.hash_password("gatehouse-dummy-password")?;
        Ok(Self {
            store,
            crypto,
            config,
            sessions: DashMap::new(),
            dummy_hash,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Drop every expired session, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, record| record.is_live(now));
        before.saturating_sub(self.sessions.len())
    }

    fn issue(&self, user_id: Uuid, persistent: bool) -> Result<SessionTicket> {
        let issued_at = Utc::now();
        let expires_at = issued_at
            .checked_add_signed(self.config.lifetime)
            .ok_or_else(|| {
                IdentityError::Internal(format!(
                    "session lifetime {} overflows the expiry timestamp",
                    self.config.lifetime
                ))
            })?;
        let token = self.crypto.generate_token()?;

        self.sessions.insert(
            self.crypto.hash_token(&token),
            SessionRecord {
                user_id,
                issued_at,
                expires_at,
            },
        );

        Ok(SessionTicket {
            token,
            user_id,
            persistent,
            expires_at,
        })
    }
}

#[async_trait]
impl SessionAuthenticator for SessionManager {
    async fn sign_in(&self, user: &User, persistent: bool) -> Result<SessionTicket> {
        let ticket = self.issue(user.id, persistent)?;
        info!(user_id = %user.id, persistent, "session started");
        Ok(ticket)
    }

    async fn password_sign_in(
        &self,
        email: &str,
        password: &str,
        persistent: bool,
    ) -> Result<SignInResult> {
        let Some(user) = self.store.find_by_email(email).await? else {
            let _ = self.crypto.verify_password(password, &self.dummy_hash)?;
            debug!("sign-in refused");
            return Ok(SignInResult::Failed);
        };

        if !self.store.check_password(&user, password).await? {
            debug!(user_id = %user.id, "sign-in refused");
            return Ok(SignInResult::Failed);
        }

        self.sign_in(&user, persistent).await.map(SignInResult::Succeeded)
    }

    async fn sign_out<'a>(&self, token: Option<&'a str>) -> Result<()> {
        let Some(token) = token else {
            return Ok(());
        };

        if let Some((_, record)) = self.sessions.remove(&self.crypto.hash_token(token)) {
            info!(
                user_id = %record.user_id,
                session_age_secs = (Utc::now() - record.issued_at).num_seconds(),
                "session ended"
            );
        }
        Ok(())
    }

    async fn authenticate(&self, token: &str) -> Result<Option<User>> {
        let key = self.crypto.hash_token(token);
        let Some(user_id) = self
            .sessions
            .get(&key)
            .map(|record| (record.user_id, record.is_live(Utc::now())))
            .and_then(|(user_id, live)| live.then_some(user_id))
        else {
            self.sessions.remove(&key);
            return Ok(None);
        };

        let user = self.store.find_by_id(user_id).await?;
        if user.is_none() {
            self.sessions.remove(&key);
        }
        Ok(user)
    }
}
