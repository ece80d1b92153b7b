use anyhow::{Context, Result, anyhow};
use image::DynamicImage;
use reqwest::Client;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

use crate::constants::constants;
use crate::error::NetworkError;

/// Where the catalog, page fragments and images are read from.
///
/// A site root is either an `http(s)://` base URL or a local directory laid out
/// the same way as the published site (`assets/data/...`, `pages/...`).
#[derive(Debug, Clone)]
pub enum SiteSource {
  Remote { base: String, client: Client },
  Local { root: PathBuf },
}

impl SiteSource {
  pub fn from_root(root: &str) -> Result<Self> {
    let trimmed = root.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
      let client = Client::builder()
        .timeout(Duration::from_secs(constants().http_timeout_secs))
        .user_agent(concat!("kiseki/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;
      let base = if trimmed.ends_with('/') { trimmed.to_string() } else { format!("{}/", trimmed) };
      return Ok(SiteSource::Remote { base, client });
    }
    if trimmed.is_empty() {
      return Err(anyhow!("Site root is empty"));
    }
    Ok(SiteSource::Local { root: PathBuf::from(trimmed) })
  }

  /// Human-readable location of a relative path, for logs and error messages.
  pub fn resolve(&self, rel: &str) -> String {
    let rel = rel.trim_start_matches('/');
    match self {
      SiteSource::Remote { base, .. } => format!("{}{}", base, rel),
      SiteSource::Local { root } => root.join(rel).display().to_string(),
    }
  }

  /// Fetch raw bytes. `fresh` asks intermediaries to bypass their caches.
  pub async fn fetch_bytes(&self, rel: &str, fresh: bool) -> Result<Vec<u8>, NetworkError> {
    let location = self.resolve(rel);
    debug!(target = %location, fresh, "site: fetch");
    match self {
      SiteSource::Remote { client, .. } => {
        let mut request = client.get(&location);
        if fresh {
          request = request.header(CACHE_CONTROL, "no-cache").header(PRAGMA, "no-cache");
        }
        let response =
          request.send().await.map_err(|source| NetworkError::Http { url: location.clone(), source })?;
        let status = response.status();
        if !status.is_success() {
          return Err(NetworkError::Status { url: location, status: status.as_u16() });
        }
        let bytes = response.bytes().await.map_err(|source| NetworkError::Http { url: location, source })?;
        Ok(bytes.to_vec())
      }
      SiteSource::Local { .. } => {
        tokio::fs::read(&location).await.map_err(|source| NetworkError::File { path: location, source })
      }
    }
  }

  pub async fn fetch_text(&self, rel: &str, fresh: bool) -> Result<String, NetworkError> {
    let bytes = self.fetch_bytes(rel, fresh).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
  }
}

/// Load a thumbnail for an entry, falling back to the placeholder image.
///
/// `thumbnail_path` is relative to the data directory, as stored in the catalog.
pub async fn fetch_thumbnail(site: &SiteSource, thumbnail_path: Option<&str>) -> Result<DynamicImage> {
  let c = constants();
  let mut candidates = Vec::with_capacity(2);
  if let Some(path) = thumbnail_path.map(str::trim).filter(|p| !p.is_empty()) {
    candidates.push(format!("{}/{}", c.data_dir, path.trim_start_matches('/')));
  }
  candidates.push(format!("{}/{}", c.data_dir, c.placeholder_thumbnail));

  for rel in &candidates {
    if let Ok(bytes) = site.fetch_bytes(rel, false).await
      && let Ok(image) = image::load_from_memory(&bytes)
    {
      return Ok(image);
    }
    debug!(target = %site.resolve(rel), "site: thumbnail candidate unusable");
  }
  Err(anyhow!("No usable thumbnail (tried {} candidates)", candidates.len()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn remote_root_gets_trailing_slash() {
    let site = SiteSource::from_root("https://example.org/archive").unwrap();
    assert_eq!(site.resolve("pages/home.html"), "https://example.org/archive/pages/home.html");
    assert_eq!(site.resolve("/pages/home.html"), "https://example.org/archive/pages/home.html");
  }

  #[test]
  fn local_root_joins_paths() {
    let site = SiteSource::from_root("/srv/site").unwrap();
    assert_eq!(site.resolve("assets/data/videos.json"), "/srv/site/assets/data/videos.json");
  }

  #[test]
  fn empty_root_is_rejected() {
    assert!(SiteSource::from_root("  ").is_err());
  }

  #[tokio::test]
  async fn local_fetch_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("pages")).unwrap();
    std::fs::write(dir.path().join("pages/home.html"), "<h2>Home</h2>").unwrap();
    let site = SiteSource::from_root(dir.path().to_str().unwrap()).unwrap();
    let text = site.fetch_text("pages/home.html", true).await.unwrap();
    assert_eq!(text, "<h2>Home</h2>");
  }

  #[tokio::test]
  async fn local_fetch_missing_file_is_network_error() {
    let dir = tempfile::tempdir().unwrap();
    let site = SiteSource::from_root(dir.path().to_str().unwrap()).unwrap();
    let err = site.fetch_text("pages/nope.html", false).await.unwrap_err();
    assert!(matches!(err, NetworkError::File { .. }));
  }

  #[tokio::test]
  async fn thumbnail_without_any_image_fails() {
    let dir = tempfile::tempdir().unwrap();
    let site = SiteSource::from_root(dir.path().to_str().unwrap()).unwrap();
    assert!(fetch_thumbnail(&site, Some("images/x.jpg")).await.is_err());
  }
}
