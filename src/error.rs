//! Error taxonomy for catalog loading, routing and lookups.
//!
//! Formatting problems never show up here: the formatters in [`crate::format`]
//! absorb them and return placeholder strings instead.

use thiserror::Error;

/// A fetch against the site root failed (non-success status, transport error, missing file).
#[derive(Error, Debug)]
pub enum NetworkError {
  #[error("GET {url} returned status {status}")]
  Status { url: String, status: u16 },

  #[error("GET {url} failed: {source}")]
  Http {
    url: String,
    #[source]
    source: reqwest::Error,
  },

  #[error("failed to read {path}: {source}")]
  File {
    path: String,
    #[source]
    source: std::io::Error,
  },
}

/// Catalog load failure. Both variants are terminal for the view that needed the catalog.
#[derive(Error, Debug)]
pub enum LoadError {
  #[error("catalog fetch failed: {0}")]
  Network(#[from] NetworkError),

  #[error("catalog is not well-formed: {0}")]
  Parse(#[from] serde_json::Error),
}

/// A URL fragment that could not be turned into a navigation target.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
  #[error("empty route")]
  Empty,

  #[error("unknown page '{0}'")]
  UnknownPage(String),

  #[error("detail route without an id")]
  MissingId,
}

/// Lookup of a single entry by id found nothing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no catalog entry with id '{id}'")]
pub struct NotFoundError {
  pub id: String,
}
