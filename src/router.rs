use tracing::{debug, info, warn};

use crate::error::RouteError;
use crate::route::{History, HistoryEntry, NavigationState, Page, ViewSnapshot};

/// A navigation that has been committed to history and now needs its page
/// fragment fetched and its view built.
///
/// `generation` identifies the intent; async results carrying an older
/// generation are stale and must be dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavIntent {
  pub generation: u64,
  pub state: NavigationState,
  pub snapshot: Option<ViewSnapshot>,
}

/// Owns page identity, the history stack and the navigation generation counter.
///
/// User-initiated navigation pushes exactly one entry; bootstrap replaces the
/// initial entry; back/forward only move the history cursor.
#[derive(Debug)]
pub struct Router {
  history: History,
  generation: u64,
  current: Option<NavigationState>,
  active_nav: Option<Page>,
}

impl Router {
  pub fn new(initial_hash: Option<&str>) -> Self {
    Self { history: History::new(initial_hash), generation: 0, current: None, active_nav: None }
  }

  pub fn current(&self) -> Option<&NavigationState> {
    self.current.as_ref()
  }

  /// Highlighted nav-bar page. Detail navigation leaves it untouched.
  pub fn active_nav(&self) -> Option<Page> {
    self.active_nav
  }

  pub fn hash(&self) -> &str {
    &self.history.current().hash
  }

  pub fn history(&self) -> &History {
    &self.history
  }

  pub fn generation(&self) -> u64 {
    self.generation
  }

  pub fn is_current(&self, generation: u64) -> bool {
    generation == self.generation
  }

  /// Page to record as the "return to" context when opening a detail view from here.
  pub fn from_page(&self) -> Page {
    match &self.current {
      Some(NavigationState::Detail { from_page, .. }) => *from_page,
      Some(state) => state.nav_page().unwrap_or(Page::Home),
      None => Page::Home,
    }
  }

  /// Remember view state on the current entry before leaving it.
  pub fn save_snapshot(&mut self, snapshot: Option<ViewSnapshot>) {
    if self.current.is_some() {
      self.history.current_mut().snapshot = snapshot;
    }
  }

  /// Initial navigation from the startup URL fragment. Uses replace, never push.
  /// An unusable fragment fails soft: nothing navigates and the caller shows a notice.
  pub fn bootstrap(&mut self) -> Result<NavIntent, RouteError> {
    let hash = self.history.current().hash.clone();
    let state = if hash.trim_start_matches('#').is_empty() {
      NavigationState::Home
    } else {
      NavigationState::parse_hash(&hash)
        .inspect_err(|e| warn!(hash = %hash, err = %e, "router: bootstrap route rejected"))?
    };
    info!(hash = %hash, page = state.page_name(), "router: bootstrap");
    self.history.replace(state.clone());
    Ok(self.begin(state, None))
  }

  /// A user-initiated transition (nav bar, card activation, in-page link).
  pub fn navigate(&mut self, state: NavigationState) -> NavIntent {
    self.history.push(state.clone());
    debug!(
      state = %serde_json::to_string(&state).unwrap_or_default(),
      hash = %self.history.current().hash,
      "router: push"
    );
    self.begin(state, None)
  }

  /// Navigate to a typed fragment, as if entered in the location bar.
  pub fn open_hash(&mut self, hash: &str) -> Result<NavIntent, RouteError> {
    let state = NavigationState::parse_hash(hash)?;
    Ok(self.navigate(state))
  }

  pub fn back(&mut self) -> Option<NavIntent> {
    let entry = self.history.back()?.clone();
    self.playback(entry)
  }

  pub fn forward(&mut self) -> Option<NavIntent> {
    let entry = self.history.forward()?.clone();
    self.playback(entry)
  }

  /// Re-run the current navigation without touching history, e.g. after a failed load.
  pub fn reload(&mut self) -> Option<NavIntent> {
    let state = self.current.clone()?;
    let snapshot = self.history.current().snapshot.clone();
    Some(self.begin(state, snapshot))
  }

  fn playback(&mut self, entry: HistoryEntry) -> Option<NavIntent> {
    match resolve_entry(&entry) {
      Ok(state) => {
        debug!(hash = %entry.hash, page = state.page_name(), "router: history playback");
        Some(self.begin(state, entry.snapshot))
      }
      Err(e) => {
        warn!(hash = %entry.hash, err = %e, "router: history entry not navigable");
        None
      }
    }
  }

  fn begin(&mut self, state: NavigationState, snapshot: Option<ViewSnapshot>) -> NavIntent {
    self.generation += 1;
    if let Some(page) = state.nav_page() {
      self.active_nav = Some(page);
    }
    self.current = Some(state.clone());
    NavIntent { generation: self.generation, state, snapshot }
  }
}

/// Target of a history entry: its state object, else its fragment, else home.
pub fn resolve_entry(entry: &HistoryEntry) -> Result<NavigationState, RouteError> {
  if let Some(state) = &entry.state {
    return Ok(state.clone());
  }
  if entry.hash.trim_start_matches('#').is_empty() {
    return Ok(NavigationState::Home);
  }
  NavigationState::parse_hash(&entry.hash)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn booted(hash: Option<&str>) -> Router {
    let mut router = Router::new(hash);
    router.bootstrap().unwrap();
    router
  }

  #[test]
  fn bootstrap_without_hash_replaces_with_home() {
    let router = booted(None);
    assert_eq!(router.history().len(), 1);
    assert_eq!(router.current(), Some(&NavigationState::Home));
    assert_eq!(router.active_nav(), Some(Page::Home));
    assert_eq!(router.hash(), "#home");
  }

  #[test]
  fn bootstrap_from_detail_hash() {
    let router = booted(Some("#video-detail?id=abc"));
    assert_eq!(router.history().len(), 1);
    assert_eq!(router.current(), Some(&NavigationState::detail("abc", Page::Home)));
    assert_eq!(router.active_nav(), None);
  }

  #[test]
  fn bootstrap_unknown_hash_fails_soft() {
    let mut router = Router::new(Some("#nowhere"));
    assert_eq!(router.bootstrap(), Err(RouteError::UnknownPage("nowhere".into())));
    assert_eq!(router.current(), None);
    assert_eq!(router.generation(), 0);
    assert_eq!(router.history().len(), 1);
  }

  #[test]
  fn each_user_navigation_pushes_once() {
    let mut router = booted(None);
    router.navigate(NavigationState::Calendar);
    router.navigate(NavigationState::Search);
    assert_eq!(router.history().len(), 3);
    router.back();
    router.forward();
    assert_eq!(router.history().len(), 3);
  }

  #[test]
  fn detail_keeps_active_nav_and_back_restores() {
    let mut router = booted(None);
    router.navigate(NavigationState::Calendar);
    router.save_snapshot(Some(ViewSnapshot::Home { selected: 4 }));
    let from = router.from_page();
    assert_eq!(from, Page::Calendar);
    router.navigate(NavigationState::detail("v1", from));
    assert_eq!(router.active_nav(), Some(Page::Calendar));
    assert_eq!(router.hash(), "#video-detail?id=v1");

    let intent = router.back().unwrap();
    assert_eq!(intent.state, NavigationState::Calendar);
    assert_eq!(intent.snapshot, Some(ViewSnapshot::Home { selected: 4 }));
    assert_eq!(router.active_nav(), Some(Page::Calendar));
    assert_eq!(router.hash(), "#calendar");
  }

  #[test]
  fn stale_generations_are_rejected() {
    let mut router = booted(None);
    let slow = router.navigate(NavigationState::Calendar);
    let fast = router.navigate(NavigationState::Search);
    assert!(!router.is_current(slow.generation));
    assert!(router.is_current(fast.generation));
    let popped = router.back().unwrap();
    assert!(!router.is_current(fast.generation));
    assert!(router.is_current(popped.generation));
  }

  #[test]
  fn back_at_start_does_nothing() {
    let mut router = booted(None);
    let before = router.generation();
    assert!(router.back().is_none());
    assert_eq!(router.generation(), before);
  }

  #[test]
  fn stateless_entries_fall_back_to_hash_then_home() {
    let with_hash = HistoryEntry { state: None, hash: "#search".into(), snapshot: None };
    assert_eq!(resolve_entry(&with_hash), Ok(NavigationState::Search));
    let bare = HistoryEntry { state: None, hash: String::new(), snapshot: None };
    assert_eq!(resolve_entry(&bare), Ok(NavigationState::Home));
    let bad = HistoryEntry { state: None, hash: "#??".into(), snapshot: None };
    assert!(resolve_entry(&bad).is_err());
  }

  #[test]
  fn unknown_bootstrap_entry_is_skipped_on_back() {
    let mut router = Router::new(Some("#nowhere"));
    assert!(router.bootstrap().is_err());
    router.navigate(NavigationState::Calendar);
    let before = router.generation();
    assert!(router.back().is_none());
    assert_eq!(router.generation(), before);
    assert_eq!(router.current(), Some(&NavigationState::Calendar));
  }

  #[test]
  fn reload_bumps_generation_without_pushing() {
    let mut router = booted(Some("#search"));
    let before = router.generation();
    let intent = router.reload().unwrap();
    assert_eq!(intent.state, NavigationState::Search);
    assert_eq!(intent.generation, before + 1);
    assert_eq!(router.history().len(), 1);
    assert!(Router::new(None).reload().is_none());
  }

  #[test]
  fn open_hash_pushes_valid_routes_only() {
    let mut router = booted(None);
    assert!(router.open_hash("#bogus").is_err());
    assert_eq!(router.history().len(), 1);
    let intent = router.open_hash("#video-detail?id=q").unwrap();
    assert_eq!(intent.state, NavigationState::detail("q", Page::Home));
    assert_eq!(router.history().len(), 2);
  }
}
