use std::sync::LazyLock;
use std::time::{Duration, Instant};

use regex::Regex;

use crate::catalog::Catalog;
use crate::constants::constants;
use crate::error::NotFoundError;
use crate::format::{format_duration, format_jp_date, format_view_count};
use crate::route::Page;

pub const NO_TAGS: &str = "タグなし";
pub const NO_DESCRIPTION: &str = "説明文はありません。";
pub const NOT_FOUND: &str = "動画が見つかりませんでした。";
pub const SPACE_LINK_LABEL: &str = "Xでスペースを見る";
pub const COPY_OK: &str = "クリップボードにコピーしました！";
pub const COPY_FAILED: &str = "コピーに失敗しました。手動でコピーしてください。";

static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://[^\s]+").expect("valid url regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescSegment {
  Text(String),
  Link(String),
}

/// Split free text into plain and URL segments.
pub fn link_segments(text: &str) -> Vec<DescSegment> {
  let mut out = Vec::new();
  let mut last = 0;
  for m in URL_RE.find_iter(text) {
    if m.start() > last {
      out.push(DescSegment::Text(text[last..m.start()].to_string()));
    }
    out.push(DescSegment::Link(m.as_str().to_string()));
    last = m.end();
  }
  if last < text.len() {
    out.push(DescSegment::Text(text[last..].to_string()));
  }
  out
}

/// Summary text for the copy action: date, title, the space link when the
/// entry carries the marker tag, then the fixed hashtag.
pub fn share_text(date: &str, title: &str, space_url: Option<&str>) -> String {
  let c = constants();
  let mut text = format!("{}に{}さんが配信しました\n{}", date, c.talent_name, title);
  if let Some(url) = space_url {
    text.push('\n');
    text.push_str(url);
  }
  text.push('\n');
  text.push_str(&c.share_hashtag);
  text
}

/// Every display region of the detail page, with placeholders already applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
  pub index: usize,
  pub id: String,
  pub title: String,
  pub views: String,
  pub date: String,
  pub duration: String,
  /// Empty means "no tags" and renders the placeholder.
  pub tags: Vec<String>,
  pub description: Option<Vec<DescSegment>>,
  pub thumbnail_path: Option<String>,
  pub video_url: Option<String>,
  pub space_url: Option<String>,
  pub from_page: Page,
  pub share_text: String,
  copy_message: Option<(String, Instant)>,
  pub scroll: u16,
}

impl DetailView {
  pub fn assemble(catalog: &Catalog, id: &str, from_page: Page) -> Result<Self, NotFoundError> {
    let (index, entry) = catalog.find(id)?;
    let date = format_jp_date(entry.published_at.as_deref());
    let duration = format_duration(entry.duration.as_deref());
    let space_url = entry.space_url();
    let share = share_text(&date, entry.display_title(), space_url.as_deref());
    Ok(Self {
      index,
      id: entry.id.clone(),
      title: entry.display_title().to_string(),
      views: format!("{} 回視聴", format_view_count(entry.view_count)),
      date,
      duration: if duration.is_empty() { "-".to_string() } else { duration },
      tags: entry.tags.clone(),
      description: entry.description.as_deref().filter(|d| !d.is_empty()).map(link_segments),
      thumbnail_path: entry.thumbnail_path.clone(),
      video_url: entry.video_url.clone(),
      space_url,
      from_page,
      share_text: share,
      copy_message: None,
      scroll: 0,
    })
  }

  /// URLs found in the description, in order.
  pub fn links(&self) -> Vec<&str> {
    self
      .description
      .iter()
      .flatten()
      .filter_map(|s| match s {
        DescSegment::Link(url) => Some(url.as_str()),
        DescSegment::Text(_) => None,
      })
      .collect()
  }

  /// Replace any message still showing.
  pub fn show_copy_message(&mut self, ok: bool) {
    let msg = if ok { COPY_OK } else { COPY_FAILED };
    self.copy_message = Some((msg.to_string(), Instant::now()));
  }

  pub fn copy_message(&self) -> Option<&str> {
    self.copy_message.as_ref().map(|(m, _)| m.as_str())
  }

  /// Drop the copy message once its display time has passed.
  pub fn expire_copy_message(&mut self, now: Instant) {
    let ttl = Duration::from_secs(constants().copy_message_secs);
    if let Some((_, shown)) = &self.copy_message
      && now.duration_since(*shown) >= ttl
    {
      self.copy_message = None;
    }
  }
}
