//! League API server.
//!
//! Serves the tournament registration API over PostgreSQL and runs the
//! periodic auto-close sweep in the background.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Error};
use league::db::{Database, PgLeagueRepository};
use league_server::{
    api::{self, AppState},
    config::ServerConfig,
    logging, metrics, scheduler,
};
use log::info;
use pico_args::Arguments;
use tokio::sync::watch;

const HELP: &str = "\
Run the league tournament registration server

USAGE:
  league_server [OPTIONS]

OPTIONS:
  --bind            IP:PORT  Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8080]
  --db-url          URL      Database connection string  [default: env DATABASE_URL]
  --close-interval  SECS     Seconds between auto-close sweeps  [default: env CLOSE_INTERVAL_SECS or 60]

FLAGS:
  -h, --help                 Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL             PostgreSQL connection string
  ADMIN_API_KEY            Key expected in the x-admin-key header (required)
  METRICS_BIND             Prometheus listener address (optional)
  RUN_MIGRATIONS           Apply migrations on startup [default: true]
  RUST_LOG                 Log filter [default: info,sqlx=warn,hyper=warn]
";

struct Args {
    bind: Option<SocketAddr>,
    database_url: Option<String>,
    close_interval_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
        close_interval_secs: pargs.opt_value_from_str("--close-interval")?,
    };

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.database_url, args.close_interval_secs)?;
    config.validate()?;

    if let Some(metrics_bind) = config.metrics_bind {
        metrics::init_metrics(metrics_bind).context("Failed to start metrics exporter")?;
        info!("Prometheus metrics at http://{metrics_bind}/metrics");
    }

    let db = Database::new(&config.database)
        .await
        .context("Failed to connect to database")?;
    db.health_check()
        .await
        .context("Database did not answer health check")?;
    info!("Database connected successfully");

    if config.run_migrations {
        db.migrate().await.context("Failed to run migrations")?;
        info!("Database migrations applied");
    }

    let repository = Arc::new(PgLeagueRepository::new(Arc::new(db.pool().clone())));
    let state = AppState::new(repository, &config.admin_api_key);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = scheduler::spawn_auto_close(
        state.tournament_manager.clone(),
        config.close_interval(),
        shutdown_rx,
    );

    let app = api::create_router(state);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;

    info!("League server listening on http://{}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down");
    let _ = shutdown_tx.send(true);
    if let Err(e) = sweeper.await {
        log::error!("Auto-close scheduler ended abnormally: {e}");
    }
    db.close().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
