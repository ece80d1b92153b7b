//! Application constants loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!` so it's always available,
//! with no runtime file I/O. Parsed once on first access via `LazyLock`.

use serde::Deserialize;
use std::sync::LazyLock;

/// All tuneable application constants.
#[derive(Debug, Deserialize)]
pub struct Constants {
  // Site layout
  pub catalog_path: String,
  pub data_dir: String,
  pub placeholder_thumbnail: String,
  pub pages_dir: String,

  // Profile card
  pub talent_name: String,
  pub talent_subtitle: String,
  pub talent_description: String,
  pub activity_start: String,

  // Listing
  pub recent_count: usize,
  pub page_size: usize,
  pub max_page_buttons: usize,

  // Detail / sharing
  pub marker_tag: String,
  pub space_url_base: String,
  pub share_hashtag: String,

  // Timers
  pub copy_message_secs: u64,
  pub error_dismiss_secs: u64,
  pub http_timeout_secs: u64,
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time; if it's malformed this is a build-time error.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

/// Returns a reference to the parsed application constants.
pub fn constants() -> &'static Constants {
  &CONSTANTS
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn embedded_constants_parse() {
    let c = constants();
    assert_eq!(c.page_size, 12);
    assert_eq!(c.max_page_buttons, 5);
    assert_eq!(c.marker_tag, "スペース");
    assert!(c.space_url_base.ends_with('/'));
  }
}
