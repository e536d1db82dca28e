//! LiftLog - Personal Strength Training Log
//!
//! Opens the configured database, applies migrations and reports its health.

use anyhow::Context;
use liftlog::storage::config;
use liftlog::Logbook;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting LiftLog v{}", env!("CARGO_PKG_VERSION"));

    let config = config::load_config().context("loading configuration")?;
    let path = config.database_path();

    let logbook = Logbook::open(&config)
        .with_context(|| format!("opening database at {}", path.display()))?;

    let db = logbook.database();
    let users = db.count_users().context("counting users")?;
    let version = db.schema_version().context("reading schema version")?;

    tracing::info!(
        "Database {} ready: schema version {}, {} registered users",
        path.display(),
        version,
        users
    );
    Ok(())
}
