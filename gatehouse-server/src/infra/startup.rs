use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use gatehouse_core::{
    application::BootstrapService,
    identity::{
        AuthCrypto, IdentityManager, IdentityRepository, SessionConfig, SessionManager,
    },
    infrastructure::InMemoryIdentityRepository,
};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::infra::{app_state::AppState, config::Config};

pub const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(300);

/// Everything `main` needs to serve: the router state, plus the concrete
/// session manager so the purge task can reach it.
#[derive(Debug)]
pub struct Services {
    pub state: AppState,
    pub session_manager: Arc<SessionManager>,
}

pub fn build_crypto(config: &Config) -> Result<Arc<AuthCrypto>> {
    let crypto = AuthCrypto::new(&config.auth_password_pepper, &config.auth_token_key)
        .context("invalid authentication secrets")?;
    Ok(Arc::new(crypto))
}

/// PostgreSQL when a database URL is configured (migrations applied on
/// connect), otherwise a process-local store.
pub async fn open_repository(config: &Config) -> Result<Arc<dyn IdentityRepository>> {
    match config.database_url.as_deref() {
        #[cfg(feature = "database")]
        Some(url) => {
            let pool = connect(url).await?;
            gatehouse_core::MIGRATOR
                .run(&pool)
                .await
                .context("database migration failed")?;
            info!("connected to PostgreSQL identity store");
            Ok(Arc::new(
                gatehouse_core::infrastructure::PostgresIdentityRepository::new(pool),
            ))
        }
        #[cfg(not(feature = "database"))]
        Some(_) => {
            warn!("DATABASE_URL is set but this build has no database support; using in-memory store");
            Ok(Arc::new(InMemoryIdentityRepository::default()))
        }
        None => {
            warn!("DATABASE_URL not set; accounts and roles live in memory only");
            Ok(Arc::new(InMemoryIdentityRepository::default()))
        }
    }
}

#[cfg(feature = "database")]
pub async fn connect(url: &str) -> Result<sqlx::PgPool> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(url)
        .await
        .context("failed to connect to PostgreSQL")
}

pub async fn build_services(config: Config) -> Result<Services> {
    let crypto = build_crypto(&config)?;
    let repo = open_repository(&config).await?;
    build_services_with(config, repo, crypto).await
}

/// Wires the collaborators over an already-open repository and seeds the
/// configured roles.
pub async fn build_services_with(
    config: Config,
    repo: Arc<dyn IdentityRepository>,
    crypto: Arc<AuthCrypto>,
) -> Result<Services> {
    let store = Arc::new(IdentityManager::new(
        repo,
        crypto.clone(),
        config.password_policy.clone(),
    ));
    let session_manager = Arc::new(
        SessionManager::new(
            store.clone(),
            crypto,
            SessionConfig {
                lifetime: config.session_lifetime,
            },
        )
        .context("failed to initialise session manager")?,
    );

    if !config.seed_roles.is_empty() {
        let created = BootstrapService::new(store.clone())
            .ensure_roles(&config.seed_roles)
            .await
            .context("failed to seed roles")?;
        info!(created, requested = config.seed_roles.len(), "role seeding finished");
    }

    let state = AppState::new(store, session_manager.clone(), Arc::new(config));
    Ok(Services {
        state,
        session_manager,
    })
}

pub fn spawn_session_purge(sessions: Arc<SessionManager>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let purged = sessions.purge_expired();
            if purged > 0 {
                debug!(purged, remaining = sessions.active_sessions(), "purged expired sessions");
            }
        }
    })
}
