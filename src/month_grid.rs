use std::collections::BTreeSet;

use chrono::{Datelike, Days, Months, NaiveDate};
use ratatui::{
  buffer::Buffer,
  layout::Rect,
  style::{Modifier, Style},
  text::{Line, Span},
  widgets::Widget,
};

use crate::theme::Theme;

pub const WEEKDAYS: [&str; 7] = ["日", "月", "火", "水", "木", "金", "土"];

const CELL_WIDTH: u16 = 4;

/// Half-open date range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
  pub start: NaiveDate,
  pub end: NaiveDate,
}

impl DateRange {
  pub fn contains(&self, date: NaiveDate) -> bool {
    self.start <= date && date < self.end
  }

  fn last_day(&self) -> NaiveDate {
    self.end.pred_opt().unwrap_or(self.end)
  }
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
  date.with_day(1).unwrap_or(date)
}

/// Month-view calendar state: background markers on days with content, a
/// bounded navigable range, a cursor and the last clicked day. Month and
/// day navigation never leave the range.
#[derive(Debug, Clone)]
pub struct MonthGridState {
  markers: BTreeSet<NaiveDate>,
  range: Option<DateRange>,
  month: NaiveDate,
  cursor: NaiveDate,
  selected: Option<NaiveDate>,
}

impl MonthGridState {
  pub fn new(markers: BTreeSet<NaiveDate>, range: Option<DateRange>, initial: NaiveDate) -> Self {
    let mut state = Self { markers, range, month: first_of_month(initial), cursor: initial, selected: None };
    state.goto_date(initial);
    state
  }

  pub fn month(&self) -> NaiveDate {
    self.month
  }

  pub fn cursor(&self) -> NaiveDate {
    self.cursor
  }

  pub fn selected(&self) -> Option<NaiveDate> {
    self.selected
  }

  pub fn set_selected(&mut self, date: NaiveDate) {
    self.selected = Some(date);
  }

  pub fn is_marked(&self, date: NaiveDate) -> bool {
    self.markers.contains(&date)
  }

  pub fn in_range(&self, date: NaiveDate) -> bool {
    self.range.is_none_or(|r| r.contains(date))
  }

  fn clamp(&self, date: NaiveDate) -> NaiveDate {
    match self.range {
      Some(r) => date.clamp(r.start, r.last_day()),
      None => date,
    }
  }

  /// Scroll to the month containing `date` and put the cursor on it.
  pub fn goto_date(&mut self, date: NaiveDate) {
    self.cursor = self.clamp(date);
    self.month = first_of_month(self.cursor);
  }

  /// Move the cursor by a signed number of days, following it across
  /// month boundaries. Returns false when the target is outside the range.
  pub fn move_cursor(&mut self, days: i64) -> bool {
    let target = if days >= 0 {
      self.cursor.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
      self.cursor.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    match target {
      Some(d) if self.in_range(d) => {
        self.goto_date(d);
        true
      }
      _ => false,
    }
  }

  pub fn next_month(&mut self) -> bool {
    self.shift_month(true)
  }

  pub fn prev_month(&mut self) -> bool {
    self.shift_month(false)
  }

  fn shift_month(&mut self, forward: bool) -> bool {
    let month = if forward {
      self.month.checked_add_months(Months::new(1))
    } else {
      self.month.checked_sub_months(Months::new(1))
    };
    let Some(month) = month else {
      return false;
    };
    if let Some(r) = self.range
      && (month < first_of_month(r.start) || month > first_of_month(r.last_day()))
    {
      return false;
    }
    // keep the day of month where possible
    let day = self.cursor.day().min(days_in_month(month));
    self.goto_date(month.with_day(day).unwrap_or(month));
    true
  }

  /// The date under the cursor, if it may be clicked.
  pub fn click(&mut self) -> Option<NaiveDate> {
    let date = self.cursor;
    if !self.in_range(date) {
      return None;
    }
    self.selected = Some(date);
    Some(date)
  }

  pub fn title(&self) -> String {
    format!("{}年{}月", self.month.year(), self.month.month())
  }

  /// Sunday-first weeks covering the displayed month only.
  pub fn weeks(&self) -> Vec<[Option<NaiveDate>; 7]> {
    let offset = self.month.weekday().num_days_from_sunday() as usize;
    let days = days_in_month(self.month);
    let mut weeks = Vec::new();
    let mut week = [None; 7];
    for day in 1..=days {
      let slot = (offset + day as usize - 1) % 7;
      week[slot] = self.month.with_day(day);
      if slot == 6 {
        weeks.push(week);
        week = [None; 7];
      }
    }
    if week.iter().any(Option::is_some) {
      weeks.push(week);
    }
    weeks
  }
}

pub fn days_in_month(month: NaiveDate) -> u32 {
  let first = first_of_month(month);
  first
    .checked_add_months(Months::new(1))
    .and_then(|next| next.pred_opt())
    .map(|last| last.day())
    .unwrap_or(28)
}

pub struct MonthGrid<'a> {
  pub state: &'a MonthGridState,
  pub theme: &'a Theme,
  pub focused: bool,
}

impl Widget for MonthGrid<'_> {
  fn render(self, area: Rect, buf: &mut Buffer) {
    if area.is_empty() {
      return;
    }
    let t = self.theme;
    let s = self.state;

    let arrow = |enabled: bool, glyph: &'static str| {
      Span::styled(glyph, if enabled { Style::default().fg(t.accent) } else { Style::default().fg(t.border) })
    };
    let has_prev = s.range.is_none_or(|r| s.month > first_of_month(r.start));
    let has_next = s.range.is_none_or(|r| s.month < first_of_month(r.last_day()));
    let title = Line::from(vec![
      arrow(has_prev, "‹ "),
      Span::styled(s.title(), Style::default().fg(t.fg).add_modifier(Modifier::BOLD)),
      arrow(has_next, " ›"),
    ]);
    buf.set_line(area.x, area.y, &title, area.width);

    if area.height < 2 {
      return;
    }
    for (i, name) in WEEKDAYS.iter().enumerate() {
      let color = match i {
        0 => t.error,
        6 => t.link,
        _ => t.muted,
      };
      let x = area.x + i as u16 * CELL_WIDTH;
      if x + CELL_WIDTH > area.right() {
        break;
      }
      buf.set_string(x + 1, area.y + 1, name, Style::default().fg(color));
    }

    for (row, week) in s.weeks().iter().enumerate() {
      let y = area.y + 2 + row as u16;
      if y >= area.bottom() {
        break;
      }
      for (col, day) in week.iter().enumerate() {
        let Some(date) = day else { continue };
        let x = area.x + col as u16 * CELL_WIDTH;
        if x + CELL_WIDTH > area.right() {
          break;
        }
        let mut style = Style::default().fg(t.fg);
        if !s.in_range(*date) {
          style = Style::default().fg(t.border);
        }
        if s.is_marked(*date) {
          style = style.bg(t.marker_bg);
        }
        if s.selected == Some(*date) {
          style = style.fg(t.accent).add_modifier(Modifier::BOLD);
        }
        if self.focused && s.cursor == *date {
          style = style.add_modifier(Modifier::REVERSED);
        }
        buf.set_string(x, y, format!(" {:>2} ", date.day()), style);
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
  }

  fn state() -> MonthGridState {
    let range = DateRange { start: d(2024, 1, 1), end: d(2024, 4, 1) };
    MonthGridState::new(BTreeSet::from([d(2024, 3, 15)]), Some(range), d(2024, 3, 15))
  }

  #[test]
  fn month_paging_is_clamped_to_range() {
    let mut s = state();
    assert!(!s.next_month());
    assert!(s.prev_month());
    assert_eq!(s.month(), d(2024, 2, 1));
    assert_eq!(s.cursor(), d(2024, 2, 15));
    assert!(s.prev_month());
    assert!(!s.prev_month());
    assert_eq!(s.title(), "2024年1月");
  }

  #[test]
  fn month_paging_clips_day_of_month() {
    let range = DateRange { start: d(2024, 1, 1), end: d(2024, 4, 1) };
    let mut s = MonthGridState::new(BTreeSet::new(), Some(range), d(2024, 1, 31));
    assert!(s.next_month());
    assert_eq!(s.cursor(), d(2024, 2, 29));
  }

  #[test]
  fn cursor_follows_across_months_but_not_out_of_range() {
    let mut s = state();
    s.goto_date(d(2024, 3, 31));
    assert!(!s.move_cursor(1));
    assert!(s.move_cursor(-31));
    assert_eq!(s.cursor(), d(2024, 2, 29));
    assert_eq!(s.month(), d(2024, 2, 1));
  }

  #[test]
  fn goto_outside_range_clamps() {
    let mut s = state();
    s.goto_date(d(2030, 1, 1));
    assert_eq!(s.cursor(), d(2024, 3, 31));
  }

  #[test]
  fn click_selects_cursor() {
    let mut s = state();
    assert_eq!(s.click(), Some(d(2024, 3, 15)));
    assert_eq!(s.selected(), Some(d(2024, 3, 15)));
    assert!(s.is_marked(d(2024, 3, 15)));
  }

  #[test]
  fn weeks_start_on_sunday() {
    let s = state();
    let weeks = s.weeks();
    // 2024-03-01 is a Friday
    assert_eq!(weeks[0][5], Some(d(2024, 3, 1)));
    assert_eq!(weeks[0][4], None);
    assert_eq!(weeks.len(), 6);
    assert_eq!(weeks.iter().flatten().flatten().count(), 31);
  }

  #[test]
  fn unbounded_grid_allows_everything() {
    let mut s = MonthGridState::new(BTreeSet::new(), None, d(2024, 6, 1));
    assert!(s.prev_month());
    assert!(s.in_range(d(1990, 1, 1)));
    assert_eq!(days_in_month(d(2023, 2, 10)), 28);
  }
}
