use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::ops::{Range, RangeInclusive};
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use ratatui::widgets::ListState;
use tracing::debug;

use crate::card::{Card, render_cards};
use crate::catalog::{Catalog, CatalogEntry};
use crate::constants::constants;
use crate::format::duration_seconds;
use crate::route::{Page, ViewSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOption {
  #[default]
  DateDesc,
  DateAsc,
  ViewsDesc,
  ViewsAsc,
  DurationDesc,
  DurationAsc,
}

impl SortOption {
  pub const ALL: [SortOption; 6] = [
    SortOption::DateDesc,
    SortOption::DateAsc,
    SortOption::ViewsDesc,
    SortOption::ViewsAsc,
    SortOption::DurationDesc,
    SortOption::DurationAsc,
  ];

  pub fn key(self) -> &'static str {
    match self {
      SortOption::DateDesc => "date-desc",
      SortOption::DateAsc => "date-asc",
      SortOption::ViewsDesc => "views-desc",
      SortOption::ViewsAsc => "views-asc",
      SortOption::DurationDesc => "duration-desc",
      SortOption::DurationAsc => "duration-asc",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      SortOption::DateDesc => "新しい順",
      SortOption::DateAsc => "古い順",
      SortOption::ViewsDesc => "再生回数が多い順",
      SortOption::ViewsAsc => "再生回数が少ない順",
      SortOption::DurationDesc => "長い順",
      SortOption::DurationAsc => "短い順",
    }
  }

  pub fn next(self) -> Self {
    let i = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
    Self::ALL[(i + 1) % Self::ALL.len()]
  }

  /// Total order over entries. Undated entries sort as the oldest, missing
  /// view counts and durations as zero.
  pub fn compare(self, a: &CatalogEntry, b: &CatalogEntry) -> Ordering {
    match self {
      SortOption::DateDesc => b.timestamp().cmp(&a.timestamp()),
      SortOption::DateAsc => a.timestamp().cmp(&b.timestamp()),
      SortOption::ViewsDesc => b.view_count.unwrap_or(0).cmp(&a.view_count.unwrap_or(0)),
      SortOption::ViewsAsc => a.view_count.unwrap_or(0).cmp(&b.view_count.unwrap_or(0)),
      SortOption::DurationDesc => duration_seconds(b.duration.as_deref()).cmp(&duration_seconds(a.duration.as_deref())),
      SortOption::DurationAsc => duration_seconds(a.duration.as_deref()).cmp(&duration_seconds(b.duration.as_deref())),
    }
  }
}

impl FromStr for SortOption {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL.into_iter().find(|o| o.key() == s).ok_or_else(|| format!("unknown sort option: {}", s))
  }
}

/// Filter inputs for the search view. Survives leaving and re-entering the
/// view; only [`FilterState::clear`] resets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
  /// Trimmed and lowercased.
  pub search_term: String,
  pub selected_tags: BTreeSet<String>,
  pub sort: SortOption,
  /// 1-based.
  pub page: usize,
}

impl Default for FilterState {
  fn default() -> Self {
    Self { search_term: String::new(), selected_tags: BTreeSet::new(), sort: SortOption::default(), page: 1 }
  }
}

impl FilterState {
  pub fn set_term(&mut self, raw: &str) {
    self.search_term = raw.trim().to_lowercase();
  }

  /// Returns whether the tag is selected after the toggle.
  pub fn toggle_tag(&mut self, tag: &str) -> bool {
    if self.selected_tags.remove(tag) {
      false
    } else {
      self.selected_tags.insert(tag.to_string());
      true
    }
  }

  pub fn clear(&mut self) {
    *self = Self::default();
  }

  pub fn matches(&self, entry: &CatalogEntry) -> bool {
    matches_term(entry, &self.search_term) && matches_tags(entry, &self.selected_tags)
  }
}

pub fn matches_term(entry: &CatalogEntry, term: &str) -> bool {
  if term.is_empty() {
    return true;
  }
  let in_title = entry.title.as_deref().is_some_and(|t| t.to_lowercase().contains(term));
  let in_description = entry.description.as_deref().is_some_and(|d| d.to_lowercase().contains(term));
  in_title || in_description
}

/// An entry matches when it carries every selected tag. An empty selection matches everything.
///
/// This is the single place tag semantics live: an any-of mode would be a
/// second predicate selected by a flag on [`FilterState`].
pub fn matches_tags(entry: &CatalogEntry, tags: &BTreeSet<String>) -> bool {
  tags.iter().all(|t| entry.has_tag(t))
}

/// Catalog indices passing the filter, in the order of the chosen comparator.
pub fn filter_and_sort(catalog: &Catalog, state: &FilterState) -> Vec<usize> {
  let entries = catalog.entries();
  let mut matches: Vec<usize> = (0..entries.len()).filter(|&i| state.matches(&entries[i])).collect();
  // sort_by is stable, so ties keep catalog order
  matches.sort_by(|&a, &b| state.sort.compare(&entries[a], &entries[b]));
  matches
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
  pub total_items: usize,
  pub page_size: usize,
  /// Always within `1..=max(1, total_pages)`.
  pub current: usize,
}

impl Pagination {
  pub fn new(total_items: usize, page_size: usize, requested: usize) -> Self {
    let mut p = Self { total_items, page_size: page_size.max(1), current: 1 };
    p.current = requested.clamp(1, p.total_pages().max(1));
    p
  }

  pub fn total_pages(&self) -> usize {
    self.total_items.div_ceil(self.page_size)
  }

  /// Index range into the result list for the current page.
  pub fn range(&self) -> Range<usize> {
    let start = ((self.current - 1) * self.page_size).min(self.total_items);
    let end = (start + self.page_size).min(self.total_items);
    start..end
  }

  /// Page numbers to show as buttons: at most `max_buttons`, centred on the
  /// current page where the ends allow it.
  pub fn window(&self, max_buttons: usize) -> RangeInclusive<usize> {
    let total = self.total_pages();
    if total == 0 || max_buttons == 0 {
      return 1..=0;
    }
    let half = max_buttons / 2;
    let mut start = self.current.saturating_sub(half).max(1);
    let end = (start + max_buttons - 1).min(total);
    if end + 1 - start < max_buttons {
      start = end.saturating_sub(max_buttons - 1).max(1);
    }
    start..=end
  }

  pub fn has_prev(&self) -> bool {
    self.current > 1
  }

  pub fn has_next(&self) -> bool {
    self.current < self.total_pages()
  }

  pub fn shows_controls(&self) -> bool {
    self.total_pages() > 1
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResults {
  pub matches: Vec<usize>,
  pub pagination: Pagination,
}

impl SearchResults {
  pub fn page_items(&self) -> &[usize] {
    &self.matches[self.pagination.range()]
  }

  pub fn is_empty(&self) -> bool {
    self.matches.is_empty()
  }
}

/// Recompute the filtered, sorted set and slice out `page`. The stored page
/// number is updated to the clamped value actually shown.
pub fn update_results(catalog: &Catalog, state: &mut FilterState, page: usize) -> SearchResults {
  let matches = filter_and_sort(catalog, state);
  let pagination = Pagination::new(matches.len(), constants().page_size, page);
  state.page = pagination.current;
  debug!(
    term = %state.search_term,
    tags = state.selected_tags.len(),
    sort = state.sort.key(),
    hits = matches.len(),
    page = pagination.current,
    "search: results updated"
  );
  SearchResults { matches, pagination }
}

// --- View state ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchFocus {
  Input,
  Tags,
  Results,
}

pub struct SearchView {
  catalog: Arc<Catalog>,
  pub filter: FilterState,
  pub tags: Vec<String>,
  pub results: SearchResults,
  pub cards: Vec<Card>,
  pub focus: SearchFocus,
  /// Text being edited; applied to the filter on submit.
  pub input: String,
  pub cursor: usize,
  pub tag_state: ListState,
  pub result_state: ListState,
}

impl SearchView {
  pub fn new(catalog: Arc<Catalog>, filter: FilterState) -> Self {
    let tags = catalog.tag_universe();
    let page = filter.page;
    let input = filter.search_term.clone();
    let cursor = input.chars().count();
    let mut tag_state = ListState::default();
    if !tags.is_empty() {
      tag_state.select(Some(0));
    }
    let mut view = Self {
      catalog,
      filter,
      tags,
      results: SearchResults { matches: Vec::new(), pagination: Pagination::new(0, 1, 1) },
      cards: Vec::new(),
      focus: SearchFocus::Input,
      input,
      cursor,
      tag_state,
      result_state: ListState::default(),
    };
    view.update_results(page);
    view
  }

  pub fn update_results(&mut self, page: usize) {
    self.results = update_results(&self.catalog, &mut self.filter, page);
    self.cards = render_cards(&self.catalog, self.results.page_items(), Page::Search, Utc::now());
    self.result_state.select(if self.cards.is_empty() { None } else { Some(0) });
  }

  pub fn submit(&mut self) {
    self.filter.set_term(&self.input);
    self.update_results(1);
  }

  pub fn toggle_selected_tag(&mut self) {
    let Some(tag) = self.tag_state.selected().and_then(|i| self.tags.get(i)).cloned() else {
      return;
    };
    self.filter.toggle_tag(&tag);
    self.update_results(1);
  }

  pub fn cycle_sort(&mut self) {
    self.filter.sort = self.filter.sort.next();
    self.update_results(1);
  }

  pub fn clear_filters(&mut self) {
    self.filter.clear();
    self.input.clear();
    self.cursor = 0;
    self.update_results(1);
  }

  /// Jump to a page and put focus at the top of the results.
  pub fn goto_page(&mut self, page: usize) {
    self.update_results(page);
    if !self.cards.is_empty() {
      self.focus = SearchFocus::Results;
    }
  }

  pub fn next_page(&mut self) {
    if self.results.pagination.has_next() {
      self.goto_page(self.results.pagination.current + 1);
    }
  }

  pub fn prev_page(&mut self) {
    if self.results.pagination.has_prev() {
      self.goto_page(self.results.pagination.current - 1);
    }
  }

  pub fn selected_card(&self) -> Option<&Card> {
    self.result_state.selected().and_then(|i| self.cards.get(i))
  }

  pub fn cycle_focus(&mut self) {
    self.focus = match self.focus {
      SearchFocus::Input => SearchFocus::Tags,
      SearchFocus::Tags => SearchFocus::Results,
      SearchFocus::Results => SearchFocus::Input,
    };
  }

  pub fn snapshot(&self) -> ViewSnapshot {
    ViewSnapshot::Search { page: self.results.pagination.current, card: self.result_state.selected().unwrap_or(0) }
  }

  pub fn restore(&mut self, snapshot: &ViewSnapshot) {
    if let ViewSnapshot::Search { page, card } = snapshot {
      self.update_results(*page);
      if !self.cards.is_empty() {
        self.result_state.select(Some((*card).min(self.cards.len() - 1)));
        self.focus = SearchFocus::Results;
      }
    }
  }

  /// Hand the filter back when the view is torn down.
  pub fn into_filter(self) -> FilterState {
    self.filter
  }
}
