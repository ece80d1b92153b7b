use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{Datelike, Months, NaiveDate, Utc};
use ratatui::widgets::ListState;
use tracing::{debug, warn};

use crate::card::{Card, render_cards};
use crate::catalog::Catalog;
use crate::month_grid::{DateRange, MonthGridState, WEEKDAYS, first_of_month};
use crate::route::{Page, ViewSnapshot};

pub const NO_STREAMS: &str = "この日の配信はありません。";
pub const PICK_A_DATE: &str = "日付を選択してください";

/// Catalog indices bucketed by UTC publish date.
#[derive(Debug, Default)]
pub struct CalendarIndex {
  days: BTreeMap<NaiveDate, Vec<usize>>,
}

impl CalendarIndex {
  pub fn build(catalog: &Catalog) -> Self {
    let mut days: BTreeMap<NaiveDate, Vec<usize>> = BTreeMap::new();
    for (i, entry) in catalog.entries().iter().enumerate() {
      match entry.utc_date() {
        Some(date) => days.entry(date).or_default().push(i),
        None => warn!(id = %entry.id, published_at = ?entry.published_at, "calendar: entry skipped, no usable date"),
      }
    }
    debug!(days = days.len(), "calendar: index built");
    Self { days }
  }

  pub fn markers(&self) -> BTreeSet<NaiveDate> {
    self.days.keys().copied().collect()
  }

  pub fn entries_on(&self, date: NaiveDate) -> &[usize] {
    self.days.get(&date).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Date of the most recently published entry.
  pub fn latest(&self) -> Option<NaiveDate> {
    self.days.keys().next_back().copied()
  }

  /// From the first day of the earliest month to the first day of the month
  /// after the latest one, exclusive.
  pub fn valid_range(&self) -> Option<DateRange> {
    let earliest = *self.days.keys().next()?;
    let latest = *self.days.keys().next_back()?;
    let end = first_of_month(latest).checked_add_months(Months::new(1))?;
    Some(DateRange { start: first_of_month(earliest), end })
  }

  pub fn len(&self) -> usize {
    self.days.len()
  }

  pub fn is_empty(&self) -> bool {
    self.days.is_empty()
  }
}

/// `2024年3月15日(金)`
pub fn day_header(date: NaiveDate) -> String {
  let weekday = WEEKDAYS[date.weekday().num_days_from_sunday() as usize];
  format!("{}年{}月{}日({})", date.year(), date.month(), date.day(), weekday)
}

/// What triggered a day selection.
///
/// The empty-day outcome differs on purpose: a user click on an empty day
/// says so, while the automatic first selection falls back to the neutral
/// prompt. Only user clicks move focus into the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOrigin {
  Initial,
  User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySelection {
  pub date: NaiveDate,
  pub header: String,
  pub entries: Vec<usize>,
  /// Shown in place of the result list.
  pub placeholder: Option<&'static str>,
  pub origin: SelectionOrigin,
}

pub fn select_day(index: &CalendarIndex, date: NaiveDate, origin: SelectionOrigin) -> DaySelection {
  let entries = index.entries_on(date).to_vec();
  let (header, placeholder) = match (entries.is_empty(), origin) {
    (false, _) => (format!("{} ({}件の配信)", day_header(date), entries.len()), None),
    (true, SelectionOrigin::User) => (day_header(date), Some(NO_STREAMS)),
    (true, SelectionOrigin::Initial) => (PICK_A_DATE.to_string(), None),
  };
  DaySelection { date, header, entries, placeholder, origin }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarFocus {
  Grid,
  Results,
}

pub struct CalendarView {
  catalog: Arc<Catalog>,
  index: CalendarIndex,
  pub grid: MonthGridState,
  pub selection: DaySelection,
  pub cards: Vec<Card>,
  pub focus: CalendarFocus,
  pub result_state: ListState,
}

impl CalendarView {
  pub fn new(catalog: Arc<Catalog>, today: NaiveDate) -> Self {
    let index = CalendarIndex::build(&catalog);
    let initial = index.latest().unwrap_or(today);
    let grid = MonthGridState::new(index.markers(), index.valid_range(), initial);
    let selection = select_day(&index, initial, SelectionOrigin::Initial);
    let mut view = Self {
      catalog,
      index,
      grid,
      selection,
      cards: Vec::new(),
      focus: CalendarFocus::Grid,
      result_state: ListState::default(),
    };
    view.select(initial, SelectionOrigin::Initial);
    view
  }

  pub fn index(&self) -> &CalendarIndex {
    &self.index
  }

  fn select(&mut self, date: NaiveDate, origin: SelectionOrigin) {
    self.selection = select_day(&self.index, date, origin);
    self.grid.set_selected(date);
    self.cards = render_cards(&self.catalog, &self.selection.entries, Page::Calendar, Utc::now());
    self.result_state.select(if self.cards.is_empty() { None } else { Some(0) });
    if origin == SelectionOrigin::User && !self.cards.is_empty() {
      self.focus = CalendarFocus::Results;
    }
  }

  /// Click the day under the grid cursor.
  pub fn click(&mut self) {
    if let Some(date) = self.grid.click() {
      debug!(date = %date, "calendar: day clicked");
      self.select(date, SelectionOrigin::User);
    }
  }

  pub fn selected_card(&self) -> Option<&Card> {
    self.result_state.selected().and_then(|i| self.cards.get(i))
  }

  pub fn snapshot(&self) -> ViewSnapshot {
    ViewSnapshot::Calendar {
      selected: self.selection.date,
      clicked: self.selection.origin == SelectionOrigin::User,
      results_focused: self.focus == CalendarFocus::Results,
      card: self.result_state.selected().unwrap_or(0),
    }
  }

  pub fn restore(&mut self, snapshot: &ViewSnapshot) {
    if let ViewSnapshot::Calendar { selected, clicked, results_focused, card } = snapshot {
      let origin = if *clicked { SelectionOrigin::User } else { SelectionOrigin::Initial };
      self.grid.goto_date(*selected);
      self.select(*selected, origin);
      self.focus = CalendarFocus::Grid;
      if !self.cards.is_empty() {
        self.result_state.select(Some((*card).min(self.cards.len() - 1)));
        if *results_focused {
          self.focus = CalendarFocus::Results;
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::tests::entry;
  use crate::catalog::CatalogEntry;

  fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
  }

  fn sample() -> Catalog {
    Catalog::new(vec![
      entry("a", "2024-01-20T12:00:00Z"),
      entry("b", "2024-03-15T10:00:00Z"),
      entry("c", "2024-03-15T23:30:00Z"),
      entry("bad", "someday"),
      CatalogEntry { id: "none".into(), ..Default::default() },
    ])
  }

  #[test]
  fn buckets_by_utc_date_and_skips_bad_dates() {
    let index = CalendarIndex::build(&sample());
    assert_eq!(index.entries_on(d(2024, 3, 15)), &[1, 2]);
    assert_eq!(index.len(), 2);
    assert!(index.entries_on(d(2024, 3, 16)).is_empty());
  }

  #[test]
  fn offset_timestamps_bucket_in_utc() {
    let catalog = Catalog::new(vec![entry("x", "2024-03-16T01:00:00+09:00")]);
    let index = CalendarIndex::build(&catalog);
    assert_eq!(index.entries_on(d(2024, 3, 15)), &[0]);
  }

  #[test]
  fn valid_range_spans_whole_months() {
    let index = CalendarIndex::build(&sample());
    let range = index.valid_range().unwrap();
    assert_eq!(range, DateRange { start: d(2024, 1, 1), end: d(2024, 4, 1) });
    assert!(range.contains(d(2024, 3, 31)));
    assert!(!range.contains(d(2024, 4, 1)));
    assert!(CalendarIndex::default().valid_range().is_none());
  }

  #[test]
  fn december_range_rolls_into_next_year() {
    let index = CalendarIndex::build(&Catalog::new(vec![entry("x", "2023-12-31T00:00:00Z")]));
    assert_eq!(index.valid_range().unwrap().end, d(2024, 1, 1));
  }

  #[test]
  fn header_has_weekday_and_count() {
    let index = CalendarIndex::build(&sample());
    let sel = select_day(&index, d(2024, 3, 15), SelectionOrigin::User);
    assert_eq!(sel.header, "2024年3月15日(金) (2件の配信)");
    assert_eq!(sel.placeholder, None);
  }

  #[test]
  fn empty_day_policy_depends_on_origin() {
    let index = CalendarIndex::build(&sample());
    let user = select_day(&index, d(2024, 3, 1), SelectionOrigin::User);
    assert_eq!(user.placeholder, Some(NO_STREAMS));
    assert_eq!(user.header, "2024年3月1日(金)");
    let initial = select_day(&index, d(2024, 3, 1), SelectionOrigin::Initial);
    assert_eq!(initial.placeholder, None);
    assert_eq!(initial.header, PICK_A_DATE);
  }

  #[test]
  fn initial_selection_is_latest_entry_without_focus_move() {
    let view = CalendarView::new(Arc::new(sample()), d(2030, 1, 1));
    assert_eq!(view.selection.date, d(2024, 3, 15));
    assert_eq!(view.grid.month(), d(2024, 3, 1));
    assert_eq!(view.cards.len(), 2);
    assert_eq!(view.focus, CalendarFocus::Grid);
  }

  #[test]
  fn empty_catalog_starts_on_today_with_prompt() {
    let view = CalendarView::new(Arc::new(Catalog::default()), d(2030, 1, 1));
    assert_eq!(view.selection.header, PICK_A_DATE);
    assert!(view.cards.is_empty());
  }

  #[test]
  fn user_click_on_empty_day_shows_placeholder() {
    let mut view = CalendarView::new(Arc::new(sample()), d(2030, 1, 1));
    view.grid.goto_date(d(2024, 3, 14));
    view.click();
    assert_eq!(view.selection.placeholder, Some(NO_STREAMS));
    assert!(view.cards.is_empty());
    assert_eq!(view.focus, CalendarFocus::Grid);
  }

  #[test]
  fn user_click_with_results_focuses_them() {
    let mut view = CalendarView::new(Arc::new(sample()), d(2030, 1, 1));
    view.grid.goto_date(d(2024, 1, 20));
    view.click();
    assert_eq!(view.focus, CalendarFocus::Results);
    assert_eq!(view.selected_card().map(|c| c.index), Some(0));
  }

  #[test]
  fn snapshot_round_trip() {
    let mut view = CalendarView::new(Arc::new(sample()), d(2030, 1, 1));
    view.result_state.select(Some(1));
    view.focus = CalendarFocus::Results;
    let snap = view.snapshot();

    let mut fresh = CalendarView::new(Arc::new(sample()), d(2030, 1, 1));
    fresh.grid.goto_date(d(2024, 1, 1));
    fresh.restore(&snap);
    assert_eq!(fresh.snapshot(), snap);
    assert_eq!(fresh.grid.month(), d(2024, 3, 1));
  }

  #[test]
  fn clicked_empty_day_survives_restore() {
    let mut view = CalendarView::new(Arc::new(sample()), d(2030, 1, 1));
    view.grid.goto_date(d(2024, 3, 14));
    view.click();
    let snap = view.snapshot();
    assert!(matches!(snap, ViewSnapshot::Calendar { clicked: true, .. }));

    let mut fresh = CalendarView::new(Arc::new(sample()), d(2030, 1, 1));
    fresh.restore(&snap);
    assert_eq!(fresh.selection.date, d(2024, 3, 14));
    assert_eq!(fresh.selection.placeholder, Some(NO_STREAMS));
    assert_ne!(fresh.selection.header, PICK_A_DATE);
    assert_eq!(fresh.focus, CalendarFocus::Grid);
  }
}
