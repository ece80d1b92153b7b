use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::constants::constants;
use crate::error::{LoadError, NotFoundError};
use crate::format::parse_timestamp;
use crate::site::SiteSource;

/// Title shown when an entry has none.
pub const UNTITLED: &str = "タイトルなし";

/// One archived stream or video. Immutable once the catalog is loaded.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
  #[serde(default, deserialize_with = "lenient_string")]
  pub id: String,
  #[serde(default, deserialize_with = "lenient_opt_string")]
  pub title: Option<String>,
  #[serde(default, deserialize_with = "lenient_opt_string")]
  pub published_at: Option<String>,
  #[serde(default, deserialize_with = "lenient_opt_string")]
  pub duration: Option<String>,
  #[serde(default, deserialize_with = "lenient_count")]
  pub view_count: Option<u64>,
  #[serde(default, deserialize_with = "lenient_tags")]
  pub tags: Vec<String>,
  #[serde(default, deserialize_with = "lenient_opt_string")]
  pub thumbnail_path: Option<String>,
  #[serde(default, deserialize_with = "lenient_opt_string")]
  pub description: Option<String>,
  #[serde(default, deserialize_with = "lenient_opt_string")]
  pub video_url: Option<String>,
  #[serde(default, deserialize_with = "lenient_opt_string")]
  pub video_id: Option<String>,
}

/// Ids are opaque; accept numbers as well as strings.
fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
  Ok(match Option::<Value>::deserialize(d)? {
    Some(Value::String(s)) => s,
    Some(Value::Number(n)) => n.to_string(),
    _ => String::new(),
  })
}

/// Free-text fields: numbers are stringified, other wrong types and blanks count as missing.
fn lenient_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
  let s = lenient_string(d)?;
  Ok(if s.trim().is_empty() { None } else { Some(s) })
}

/// View counts show up as numbers or numeric strings; anything else counts as missing.
fn lenient_count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
  Ok(match Option::<Value>::deserialize(d)? {
    Some(Value::Number(n)) => n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
    Some(Value::String(s)) => s.trim().parse().ok(),
    _ => None,
  })
}

fn lenient_tags<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
  Ok(match Option::<Value>::deserialize(d)? {
    Some(Value::Array(items)) => items.into_iter().filter_map(|v| v.as_str().map(str::to_string)).collect(),
    _ => Vec::new(),
  })
}

impl CatalogEntry {
  pub fn display_title(&self) -> &str {
    self.title.as_deref().filter(|t| !t.trim().is_empty()).unwrap_or(UNTITLED)
  }

  pub fn timestamp(&self) -> Option<DateTime<Utc>> {
    self.published_at.as_deref().and_then(parse_timestamp)
  }

  /// Calendar date of the publish time in UTC.
  ///
  /// A full timestamp is converted to UTC; a value that only carries a
  /// `YYYY-MM-DD` prefix is taken as-is.
  pub fn utc_date(&self) -> Option<NaiveDate> {
    let raw = self.published_at.as_deref()?.trim();
    if let Some(ts) = parse_timestamp(raw) {
      return Some(ts.date_naive());
    }
    let prefix = raw.split('T').next()?;
    if prefix.len() != 10 {
      return None;
    }
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
  }

  pub fn has_tag(&self, tag: &str) -> bool {
    self.tags.iter().any(|t| t == tag)
  }

  /// External "space" link, present only when the marker tag is set and a provider id exists.
  pub fn space_url(&self) -> Option<String> {
    let c = constants();
    if !self.has_tag(&c.marker_tag) {
      return None;
    }
    self.video_id.as_deref().map(|id| format!("{}{}", c.space_url_base, id))
  }
}

/// The loaded, read-only catalog.
#[derive(Debug, Default)]
pub struct Catalog {
  entries: Vec<CatalogEntry>,
}

impl Catalog {
  pub fn new(entries: Vec<CatalogEntry>) -> Self {
    Self { entries }
  }

  pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
    let entries: Vec<CatalogEntry> = serde_json::from_str(text)?;
    Ok(Self { entries })
  }

  pub fn entries(&self) -> &[CatalogEntry] {
    &self.entries
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn get(&self, index: usize) -> Option<&CatalogEntry> {
    self.entries.get(index)
  }

  /// First entry with the given id. Ids are assumed unique but not enforced.
  pub fn find(&self, id: &str) -> Result<(usize, &CatalogEntry), NotFoundError> {
    self
      .entries
      .iter()
      .enumerate()
      .find(|(_, e)| e.id == id)
      .ok_or_else(|| NotFoundError { id: id.to_string() })
  }

  /// Every tag used by any entry, deduplicated and sorted for display.
  pub fn tag_universe(&self) -> Vec<String> {
    let set: BTreeSet<&str> = self.entries.iter().flat_map(|e| e.tags.iter().map(String::as_str)).collect();
    set.into_iter().map(str::to_string).collect()
  }

  /// Indices of the `count` most recently published entries, newest first.
  /// Entries without a parseable publish time are left out.
  pub fn recent(&self, count: usize) -> Vec<usize> {
    let mut dated: Vec<(usize, DateTime<Utc>)> =
      self.entries.iter().enumerate().filter_map(|(i, e)| e.timestamp().map(|ts| (i, ts))).collect();
    dated.sort_by(|a, b| b.1.cmp(&a.1));
    dated.into_iter().take(count).map(|(i, _)| i).collect()
  }

  pub fn total_views(&self) -> u64 {
    self.entries.iter().filter_map(|e| e.view_count).sum()
  }
}

/// Fetch and parse the catalog file from the site.
pub async fn load_catalog(site: &SiteSource) -> Result<Catalog, LoadError> {
  let path = &constants().catalog_path;
  info!(target = %site.resolve(path), "catalog: loading");
  let text = site.fetch_text(path, true).await?;
  match Catalog::from_json(&text) {
    Ok(catalog) => {
      info!(entries = catalog.len(), "catalog: loaded");
      Ok(catalog)
    }
    Err(e) => {
      let snippet: String = text.chars().take(500).collect();
      error!(err = %e, snippet = %snippet, "catalog: parse failed");
      Err(LoadError::Parse(e))
    }
  }
}

/// Shared, load-once access to the catalog. Every view reads through this
/// instead of fetching the file itself. A failed load is not cached.
pub struct CatalogStore {
  site: SiteSource,
  cell: OnceCell<Arc<Catalog>>,
}

impl CatalogStore {
  pub fn new(site: SiteSource) -> Self {
    Self { site, cell: OnceCell::new() }
  }

  pub async fn get_or_load(&self) -> Result<Arc<Catalog>, LoadError> {
    self.cell.get_or_try_init(|| async { load_catalog(&self.site).await.map(Arc::new) }).await.map(Arc::clone)
  }

  pub fn loaded(&self) -> Option<Arc<Catalog>> {
    self.cell.get().cloned()
  }
}
