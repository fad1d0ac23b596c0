//! rehab-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) and `REHAB_*`
//! environment variables, opens the SQLite store, and either serves the JSON
//! API or loads development fixtures.
//!
//! ```
//! cargo run -p rehab-server -- serve
//! cargo run -p rehab-server -- seed
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use rand_core::OsRng;
use rehab_server::{ServerConfig, expand_tilde};
use rehab_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Tele-rehabilitation record server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the JSON API (the default).
  Serve,
  /// Wipe the collections and load development fixtures.
  Seed {
    /// Write fixtures without emptying the collections first.
    #[arg(long)]
    keep_existing: bool,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg =
    ServerConfig::load(&cli.config).context("failed to load configuration")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let store = Arc::new(store);

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => {
      let app = rehab_server::app(store, &server_cfg)?;
      let address = server_cfg.address();

      tracing::info!("Listening on http://{address}");
      let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

      axum::serve(listener, app).await.context("server error")?;
    }
    Command::Seed { keep_existing } => {
      let summary =
        rehab_server::seed::seed(store.as_ref(), !keep_existing, &mut OsRng)
          .await
          .context("seeding failed")?;
      println!(
        "seeded {} doctors, {} patients, {} presets, {} sessions",
        summary.doctors, summary.patients, summary.presets, summary.sessions
      );
    }
  }

  Ok(())
}
