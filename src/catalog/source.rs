//! Catalog sources
//!
//! A source is read once, without arguments, and yields the whole catalog.
//! There is no pagination or incremental update. Loading happens on a tokio
//! task so the editor never waits on it; callers poll the receiver returned by
//! [`spawn_fetch`] and keep an empty catalog until it resolves.

use std::path::PathBuf;

use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{info, warn};

use super::{Catalog, Suggestion};

/// Failure to obtain a catalog. Every variant means "catalog unavailable";
/// the editor degrades to an empty catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to fetch catalog from {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("catalog is not a JSON list of suggestions: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("catalog fetch was abandoned before completing")]
    Abandoned,
}

/// Where the catalog comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// Remote JSON endpoint returning an array of suggestions
    Http(String),
    /// Local JSON file containing an array of suggestions
    File(PathBuf),
}

impl CatalogSource {
    /// Interpret a configured location: `http://` and `https://` are remote,
    /// anything else is a path.
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            CatalogSource::Http(trimmed.to_string())
        } else {
            CatalogSource::File(PathBuf::from(trimmed))
        }
    }

    /// Read the full catalog
    pub async fn fetch(&self) -> Result<Catalog, CatalogError> {
        let suggestions: Vec<Suggestion> = match self {
            CatalogSource::Http(url) => {
                let http_err = |source| CatalogError::Http {
                    url: url.clone(),
                    source,
                };
                let response = reqwest::get(url.as_str())
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(http_err)?;
                let body = response.text().await.map_err(http_err)?;
                serde_json::from_str(&body)?
            }
            CatalogSource::File(path) => {
                let body =
                    tokio::fs::read_to_string(path)
                        .await
                        .map_err(|source| CatalogError::Io {
                            path: path.clone(),
                            source,
                        })?;
                serde_json::from_str(&body)?
            }
        };

        if suggestions.is_empty() {
            warn!(source = %self, "catalog source returned no suggestions");
        } else {
            info!(source = %self, count = suggestions.len(), "catalog loaded");
        }
        Ok(Catalog::new(suggestions))
    }
}

impl std::fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogSource::Http(url) => write!(f, "{}", url),
            CatalogSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Receiver side of a catalog fetch running in the background
pub struct PendingCatalog {
    rx: oneshot::Receiver<Result<Catalog, CatalogError>>,
}

impl PendingCatalog {
    /// Non-blocking check. `None` while the fetch is still running.
    pub fn poll(&mut self) -> Option<Result<Catalog, CatalogError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(CatalogError::Abandoned)),
        }
    }

    /// Wait for the fetch to finish
    pub async fn wait(self) -> Result<Catalog, CatalogError> {
        self.rx.await.unwrap_or(Err(CatalogError::Abandoned))
    }
}

/// Start fetching `source` on the given runtime. The fetch is issued once and
/// never cancelled.
pub fn spawn_fetch(runtime: &tokio::runtime::Handle, source: CatalogSource) -> PendingCatalog {
    let (tx, rx) = oneshot::channel();
    runtime.spawn(async move {
        let result = source.fetch().await;
        if let Err(err) = &result {
            warn!(%source, error = %err, "catalog unavailable");
        }
        // The editor may already be gone; nothing to report then.
        let _ = tx.send(result);
    });
    PendingCatalog { rx }
}
