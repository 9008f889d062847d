//! meetbot server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), then the
//! environment, opens the SQLite principal store, and serves the HTTP API.
//!
//! Client credentials usually come from the environment:
//!
//! ```text
//! GOOGLE_CLIENT_ID=...
//! GOOGLE_CLIENT_SECRET=...
//! ```
//!
//! Any other field can be overridden with a `MEETBOT_` variable, e.g.
//! `MEETBOT_PORT=9000`. A `.env` file in the working directory is loaded
//! first if present.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use meetbot_server::{AppState, ServerConfig};
use meetbot_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Calendar meeting bot server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
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

  if let Ok(path) = dotenvy::dotenv() {
    tracing::debug!(path = %path.display(), "loaded environment file");
  }

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("MEETBOT"))
    .add_source(config::Environment::with_prefix("GOOGLE"))
    .build()
    .context("failed to read configuration")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig (are GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET set?)")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  let redirect_uri = server_cfg.redirect_uri();

  let state = AppState::new(Arc::new(store), server_cfg)
    .context("failed to build identity provider clients")?;
  let app = meetbot_server::router(state);

  tracing::info!(%redirect_uri, "Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
