use std::io::{self, IsTerminal, Write};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use clap::Parser;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use tokio::net::TcpListener;
use tracing::{debug, info};

use studentdir::account::{AccountRepository, AccountService};
use studentdir::api::{AppState, create_router};
use studentdir::auth::{AuthConfig, AuthState};
use studentdir::db::Database;
use studentdir::student::{StudentRepository, StudentService};

const APP_NAME: &str = "studentdir";

#[derive(Debug, Parser)]
#[command(author, version, about = "Student directory REST backend.")]
struct Cli {
    /// Override the config file path
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Address to bind (overrides config)
    #[arg(long)]
    host: Option<String>,
    /// Port to bind (overrides config)
    #[arg(long)]
    port: Option<u16>,
    /// SQLite database file (overrides config)
    #[arg(long, value_name = "PATH")]
    database: Option<PathBuf>,
    /// Increase logging verbosity (stackable)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
    /// Output machine readable JSON logs
    #[arg(long)]
    json: bool,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct ServerConfig {
    host: String,
    port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct DatabaseConfig {
    path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("studentdir.db"),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct AppConfig {
    server: ServerConfig,
    database: DatabaseConfig,
    auth: AuthConfig,
}

fn main() {
    if let Err(err) = try_main() {
        let _ = writeln!(io::stderr(), "{err:?}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json);

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(database) = cli.database {
        config.database.path = database;
    }
    // The auth section stays out of the logs; it may carry the secret.
    debug!(
        "resolved config: server={:?} database={:?}",
        config.server, config.database
    );

    serve(config)
}

/// Load configuration from an optional TOML file plus environment
/// overrides (`STUDENTDIR_SERVER__PORT=9000` style).
fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let mut builder = Config::builder();

    builder = match path {
        Some(path) => builder.add_source(File::from(path).format(FileFormat::Toml)),
        None => builder.add_source(File::with_name(APP_NAME).required(false)),
    };

    builder = builder.add_source(Environment::with_prefix("STUDENTDIR").separator("__"));

    let config = builder.build().context("loading configuration")?;
    config
        .try_deserialize()
        .context("parsing configuration")
}

fn init_logging(verbose: u8, json: bool) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{APP_NAME}={level},tower_http={level}")));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_ansi(io::stderr().is_terminal()))
            .try_init()
            .ok();
    }
}

#[tokio::main]
async fn serve(config: AppConfig) -> Result<()> {
    let db = Database::new(&config.database.path).await?;

    let auth = AuthState::new(config.auth).map_err(|e| anyhow!("auth configuration: {e}"))?;

    let accounts = AccountService::new(AccountRepository::new(db.pool().clone()));
    let students = StudentService::new(StudentRepository::new(db.pool().clone()));

    // Seed the bootstrap admin on first run so login works out of the box.
    accounts.bootstrap().await?;

    spawn_revocation_sweeper(&auth);

    let state = AppState::new(accounts, students, auth);
    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("parsing bind address")?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;
    info!("listening on {addr}");

    axum::serve(listener, router)
        .await
        .context("serving HTTP")?;

    Ok(())
}

/// Periodically drop revocation entries whose tokens have expired.
fn spawn_revocation_sweeper(auth: &AuthState) {
    let registry = auth.revocations();
    let interval_secs = auth.sweep_interval_secs().max(1);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        // The first tick completes immediately; skip it.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = registry.sweep_expired(Utc::now().timestamp());
            if removed > 0 {
                debug!(removed, "Swept expired revocation entries");
            }
        }
    });
}
