//! Process-level wiring for the rehab record service: configuration, the
//! top-level router with CORS and request tracing, and development seeding.

pub mod seed;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use axum::{Router, http::HeaderValue};
use rehab_core::store::DocumentStore;
use serde::Deserialize;
use tower_http::{
  cors::{AllowHeaders, AllowMethods, CorsLayer},
  trace::TraceLayer,
};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `REHAB_*` environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:         String,
  #[serde(default = "default_port")]
  pub port:         u16,
  #[serde(default = "default_store_path")]
  pub store_path:   PathBuf,
  /// Origins allowed to make credentialed cross-origin requests.
  #[serde(default = "default_cors_origins")]
  pub cors_origins: Vec<String>,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8000 }

fn default_store_path() -> PathBuf { PathBuf::from("rehab.sqlite3") }

fn default_cors_origins() -> Vec<String> { vec!["http://localhost:3000".to_owned()] }

impl ServerConfig {
  /// Layer the optional file at `path` under the environment.
  ///
  /// `REHAB_CORS_ORIGINS` takes a comma-separated list.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("REHAB")
          .try_parsing(true)
          .list_separator(",")
          .with_list_parse_key("cors_origins"),
      )
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// CORS for the configured origins. Credentials are allowed, so methods and
/// headers mirror the request instead of using a wildcard.
pub fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
  let origins = origins
    .iter()
    .map(|o| {
      HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin {o:?}"))
    })
    .collect::<anyhow::Result<Vec<_>>>()?;

  Ok(
    CorsLayer::new()
      .allow_origin(origins)
      .allow_methods(AllowMethods::mirror_request())
      .allow_headers(AllowHeaders::mirror_request())
      .allow_credentials(true),
  )
}

/// The full application: the JSON API under `/api`, wrapped in CORS and
/// request tracing.
pub fn app<S>(store: Arc<S>, config: &ServerConfig) -> anyhow::Result<Router>
where
  S: DocumentStore + 'static,
{
  Ok(
    Router::new()
      .nest("/api", rehab_api::api_router(store))
      .layer(cors_layer(&config.cors_origins)?)
      .layer(TraceLayer::new_for_http()),
  )
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use rehab_core::memory::MemoryStore;
  use tower::ServiceExt as _;

  use super::*;

  fn config() -> ServerConfig {
    ServerConfig {
      host:         "127.0.0.1".to_owned(),
      port:         8000,
      store_path:   PathBuf::from(":memory:"),
      cors_origins: vec!["http://localhost:3000".to_owned()],
    }
  }

  #[test]
  fn missing_config_file_falls_back_to_defaults() {
    let cfg = ServerConfig::load(Path::new("/nonexistent/rehab-config.toml")).unwrap();
    assert_eq!(cfg.port, 8000);
    assert_eq!(cfg.store_path, PathBuf::from("rehab.sqlite3"));
    assert_eq!(cfg.cors_origins, ["http://localhost:3000"]);
  }

  #[test]
  fn tilde_is_expanded_only_at_the_start() {
    assert_eq!(expand_tilde(Path::new("/var/db")), PathBuf::from("/var/db"));
    assert_eq!(expand_tilde(Path::new("a/~/b")), PathBuf::from("a/~/b"));
  }

  #[test]
  fn invalid_origin_is_rejected() {
    assert!(cors_layer(&["bad\norigin".to_owned()]).is_err());
  }

  #[tokio::test]
  async fn api_is_nested_under_api_prefix() {
    let app = app(Arc::new(MemoryStore::new()), &config()).unwrap();

    let req = Request::builder()
      .uri("/api/health")
      .body(Body::empty())
      .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn allowed_origin_gets_cors_headers() {
    let app = app(Arc::new(MemoryStore::new()), &config()).unwrap();

    let req = Request::builder()
      .uri("/api/doctors")
      .header(header::ORIGIN, "http://localhost:3000")
      .body(Body::empty())
      .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(
      resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
      "http://localhost:3000"
    );
    assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");

    let req = Request::builder()
      .uri("/api/doctors")
      .header(header::ORIGIN, "https://elsewhere.example")
      .body(Body::empty())
      .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert!(!resp.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
  }
}
