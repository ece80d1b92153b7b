//! Page identity, URL-fragment routes and the in-process history stack.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::error::RouteError;

/// Fragment name of the detail page.
pub const DETAIL_PAGE: &str = "video-detail";

/// Pages reachable from the navigation bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
  Home,
  Calendar,
  Search,
}

impl Page {
  pub const ALL: [Page; 3] = [Page::Home, Page::Calendar, Page::Search];

  pub fn name(self) -> &'static str {
    match self {
      Page::Home => "home",
      Page::Calendar => "calendar",
      Page::Search => "search",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Page::Home => "ホーム",
      Page::Calendar => "カレンダー",
      Page::Search => "検索",
    }
  }

  pub fn from_name(name: &str) -> Option<Self> {
    Page::ALL.into_iter().find(|p| p.name() == name)
  }
}

/// Where the app is (or is going). Serializes to the history state shape
/// `{"page":"home"}` / `{"page":"video-detail","videoId":..,"fromPage":..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "page")]
pub enum NavigationState {
  #[serde(rename = "home")]
  Home,
  #[serde(rename = "calendar")]
  Calendar,
  #[serde(rename = "search")]
  Search,
  #[serde(rename = "video-detail", rename_all = "camelCase")]
  Detail { video_id: String, from_page: Page },
}

impl From<Page> for NavigationState {
  fn from(page: Page) -> Self {
    match page {
      Page::Home => NavigationState::Home,
      Page::Calendar => NavigationState::Calendar,
      Page::Search => NavigationState::Search,
    }
  }
}

impl NavigationState {
  pub fn detail(video_id: impl Into<String>, from_page: Page) -> Self {
    NavigationState::Detail { video_id: video_id.into(), from_page }
  }

  /// The nav-bar page this state corresponds to, `None` for the detail page.
  pub fn nav_page(&self) -> Option<Page> {
    match self {
      NavigationState::Home => Some(Page::Home),
      NavigationState::Calendar => Some(Page::Calendar),
      NavigationState::Search => Some(Page::Search),
      NavigationState::Detail { .. } => None,
    }
  }

  /// Name of the markup fragment backing this page.
  pub fn page_name(&self) -> &'static str {
    match self.nav_page() {
      Some(page) => page.name(),
      None => DETAIL_PAGE,
    }
  }

  pub fn to_hash(&self) -> String {
    match self {
      NavigationState::Detail { video_id, .. } => {
        let id: String = form_urlencoded::byte_serialize(video_id.as_bytes()).collect();
        format!("#{}?id={}", DETAIL_PAGE, id)
      }
      other => format!("#{}", other.page_name()),
    }
  }

  /// Parse `#<page>` or `#video-detail?id=<id>`. A detail route reached this
  /// way returns to the home page.
  pub fn parse_hash(hash: &str) -> Result<Self, RouteError> {
    let body = hash.trim().trim_start_matches('#');
    if body.is_empty() {
      return Err(RouteError::Empty);
    }
    let (page, query) = match body.split_once('?') {
      Some((page, query)) => (page, Some(query)),
      None => (body, None),
    };

    if page == DETAIL_PAGE {
      let id = query
        .and_then(|q| form_urlencoded::parse(q.as_bytes()).find(|(k, _)| k == "id").map(|(_, v)| v.into_owned()))
        .filter(|id| !id.is_empty())
        .ok_or(RouteError::MissingId)?;
      return Ok(NavigationState::detail(id, Page::Home));
    }

    Page::from_name(page).map(NavigationState::from).ok_or_else(|| RouteError::UnknownPage(page.to_string()))
  }
}

/// Per-view state saved into a history entry when the user leaves it and
/// restored on back/forward, the way a browser restores scroll position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewSnapshot {
  Home { selected: usize },
  /// `clicked` is false while the selection is still the automatic first one.
  Calendar { selected: chrono::NaiveDate, clicked: bool, results_focused: bool, card: usize },
  Search { page: usize, card: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
  /// `None` for an entry created without a state object (initial load).
  pub state: Option<NavigationState>,
  pub hash: String,
  pub snapshot: Option<ViewSnapshot>,
}

/// Session history: a list of entries and a cursor, with browser push/replace/back/forward semantics.
#[derive(Debug)]
pub struct History {
  entries: Vec<HistoryEntry>,
  index: usize,
}

impl History {
  pub fn new(initial_hash: Option<&str>) -> Self {
    let hash = initial_hash.map(|h| if h.starts_with('#') { h.to_string() } else { format!("#{}", h) });
    Self { entries: vec![HistoryEntry { state: None, hash: hash.unwrap_or_default(), snapshot: None }], index: 0 }
  }

  pub fn current(&self) -> &HistoryEntry {
    &self.entries[self.index]
  }

  pub fn current_mut(&mut self) -> &mut HistoryEntry {
    &mut self.entries[self.index]
  }

  /// Add an entry after the current one, dropping any forward entries.
  pub fn push(&mut self, state: NavigationState) {
    self.entries.truncate(self.index + 1);
    let hash = state.to_hash();
    self.entries.push(HistoryEntry { state: Some(state), hash, snapshot: None });
    self.index = self.entries.len() - 1;
  }

  pub fn replace(&mut self, state: NavigationState) {
    let hash = state.to_hash();
    *self.current_mut() = HistoryEntry { state: Some(state), hash, snapshot: None };
  }

  pub fn back(&mut self) -> Option<&HistoryEntry> {
    if self.index == 0 {
      return None;
    }
    self.index -= 1;
    Some(self.current())
  }

  pub fn forward(&mut self) -> Option<&HistoryEntry> {
    if self.index + 1 >= self.entries.len() {
      return None;
    }
    self.index += 1;
    Some(self.current())
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn index(&self) -> usize {
    self.index
  }

  pub fn can_go_back(&self) -> bool {
    self.index > 0
  }

  pub fn can_go_forward(&self) -> bool {
    self.index + 1 < self.entries.len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_simple_pages() {
    assert_eq!(NavigationState::parse_hash("#home"), Ok(NavigationState::Home));
    assert_eq!(NavigationState::parse_hash("calendar"), Ok(NavigationState::Calendar));
    assert_eq!(NavigationState::parse_hash("#search?q=ignored"), Ok(NavigationState::Search));
  }

  #[test]
  fn parse_detail_route() {
    assert_eq!(
      NavigationState::parse_hash("#video-detail?id=abc_123"),
      Ok(NavigationState::detail("abc_123", Page::Home))
    );
    assert_eq!(
      NavigationState::parse_hash("#video-detail?x=1&id=a%20b"),
      Ok(NavigationState::detail("a b", Page::Home))
    );
  }

  #[test]
  fn parse_failures_are_typed() {
    assert_eq!(NavigationState::parse_hash("#"), Err(RouteError::Empty));
    assert_eq!(NavigationState::parse_hash("#video-detail"), Err(RouteError::MissingId));
    assert_eq!(NavigationState::parse_hash("#video-detail?id="), Err(RouteError::MissingId));
    assert_eq!(NavigationState::parse_hash("#settings"), Err(RouteError::UnknownPage("settings".into())));
  }

  #[test]
  fn hash_round_trips() {
    for state in [NavigationState::Home, NavigationState::Search, NavigationState::detail("a b", Page::Home)] {
      assert_eq!(NavigationState::parse_hash(&state.to_hash()), Ok(state));
    }
  }

  #[test]
  fn history_state_shape() {
    let json = serde_json::to_value(NavigationState::detail("v1", Page::Calendar)).unwrap();
    assert_eq!(json, serde_json::json!({"page": "video-detail", "videoId": "v1", "fromPage": "calendar"}));
    let json = serde_json::to_value(NavigationState::Search).unwrap();
    assert_eq!(json, serde_json::json!({"page": "search"}));
  }

  #[test]
  fn push_truncates_forward_entries() {
    let mut h = History::new(None);
    h.replace(NavigationState::Home);
    h.push(NavigationState::Calendar);
    h.push(NavigationState::Search);
    assert_eq!(h.back().and_then(|e| e.state.clone()), Some(NavigationState::Calendar));
    h.push(NavigationState::detail("x", Page::Calendar));
    assert_eq!(h.len(), 3);
    assert!(!h.can_go_forward());
    assert_eq!(h.current().hash, "#video-detail?id=x");
  }

  #[test]
  fn back_and_forward_stop_at_ends() {
    let mut h = History::new(Some("calendar"));
    assert_eq!(h.current().hash, "#calendar");
    assert!(h.back().is_none());
    h.push(NavigationState::Search);
    assert!(h.forward().is_none());
    assert!(h.back().is_some());
    assert_eq!(h.index(), 0);
    assert!(h.forward().is_some());
    assert_eq!(h.index(), 1);
  }
}
