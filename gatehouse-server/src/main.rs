//! # Gatehouse Server
//!
//! Registration, login/logout and role administration over HTTP.
//!
//! Accounts and roles live in PostgreSQL when `DATABASE_URL` is set and in
//! memory otherwise. Sessions are tracked in-process.

use std::sync::Arc;

use anyhow::{Context, anyhow, bail};
use clap::{Args as ClapArgs, Parser, Subcommand};
use gatehouse_core::{
    application::BootstrapService,
    identity::{IdentityManager, IdentityResult},
};
use gatehouse_server::{
    create_app,
    infra::{
        config::{Config, ConfigLoad},
        startup::{
            SESSION_PURGE_INTERVAL, build_crypto, build_services, open_repository,
            spawn_session_purge,
        },
    },
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "gatehouse-server")]
#[command(about = "User registration, login and role administration server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Server port (overrides config)
    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, env = "SERVER_HOST")]
    host: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Db(DbCommand),
    #[command(subcommand)]
    User(UserCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply database migrations and exit
    Migrate,
}

#[derive(Debug, Subcommand)]
enum UserCommand {
    /// Create a user in the configured database, optionally placing it in a
    /// role (created if missing). Used to bootstrap the first administrator.
    Create {
        #[arg(long)]
        email: String,
        #[arg(long, env = "GATEHOUSE_USER_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        role: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loads .env first so clap's `env` fallbacks see it too.
    let ConfigLoad {
        mut config,
        env_file_loaded,
        warnings,
    } = Config::from_env().context("failed to load configuration")?;
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if env_file_loaded {
        info!("loaded .env file");
    }
    for warning in &warnings {
        warn!("{warning}");
    }

    if let Some(port) = cli.serve.port {
        config.server_port = port;
    }
    if let Some(host) = cli.serve.host.clone() {
        config.server_host = host;
    }

    match cli.command {
        Some(Command::Db(DbCommand::Migrate)) => run_db_migrate(&config).await,
        Some(Command::User(UserCommand::Create {
            email,
            password,
            role,
        })) => run_user_create(&config, &email, &password, role.as_deref()).await,
        None => run_server(config).await,
    }
}

#[cfg(feature = "database")]
async fn run_db_migrate(config: &Config) -> anyhow::Result<()> {
    let url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set to run migrations")?;
    let pool = gatehouse_server::infra::startup::connect(url).await?;
    gatehouse_core::MIGRATOR
        .run(&pool)
        .await
        .context("database migration failed")?;
    info!("Database migrations applied successfully");
    Ok(())
}

#[cfg(not(feature = "database"))]
async fn run_db_migrate(_config: &Config) -> anyhow::Result<()> {
    bail!("this build has no database support")
}

async fn run_user_create(
    config: &Config,
    email: &str,
    password: &str,
    role: Option<&str>,
) -> anyhow::Result<()> {
    if config.database_url.is_none() {
        bail!("DATABASE_URL must be set; an in-memory user would vanish on exit");
    }

    let crypto = build_crypto(config)?;
    let repo = open_repository(config).await?;
    let store = Arc::new(IdentityManager::new(
        repo,
        crypto,
        config.password_policy.clone(),
    ));

    match BootstrapService::new(store)
        .provision_user(email, password, role)
        .await
        .context("failed to create user")?
    {
        IdentityResult::Succeeded(user) => {
            info!(user_id = %user.id, email = %user.email, role, "user created");
            Ok(())
        }
        failed @ IdentityResult::Failed(_) => {
            Err(anyhow!("user not created: {}", failed.descriptions().join(" ")))
        }
    }
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    let services = build_services(config)
        .await
        .context("failed to initialise services")?;
    spawn_session_purge(services.session_manager.clone(), SESSION_PURGE_INTERVAL);

    let addr = services.state.config.bind_address();
    if services.state.config.admin_role.is_none() {
        warn!("ADMIN_ROLE not set; /Admin routes are open to anonymous callers");
    }

    let app = create_app(services.state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "Gatehouse listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    info!("Gatehouse stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
