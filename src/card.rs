use chrono::{DateTime, Utc};
use ratatui::{
  style::{Modifier, Style},
  text::{Line, Span},
};

use crate::catalog::CatalogEntry;
use crate::format::{UNKNOWN_DATE, format_duration, format_relative_time, format_utc_date, format_view_count};
use crate::route::{NavigationState, Page};
use crate::theme::Theme;
use crate::ui::truncate_str;

/// Display unit for one catalog entry, with every optional field already
/// replaced by its placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
  /// Index of the entry in the catalog.
  pub index: usize,
  pub title: String,
  /// Relative to the data dir; `None` falls back to the placeholder image.
  pub thumbnail_path: Option<String>,
  /// Empty when the entry has no usable duration.
  pub duration: String,
  pub time_ago: String,
  pub views: String,
  pub date: String,
  pub tags: Vec<String>,
  /// Where activating the card goes, including the page to return to.
  pub target: NavigationState,
}

pub fn render_card(index: usize, entry: &CatalogEntry, from_page: Page, now: DateTime<Utc>) -> Card {
  let published = entry.published_at.as_deref().unwrap_or_default();
  Card {
    index,
    title: entry.display_title().to_string(),
    thumbnail_path: entry.thumbnail_path.clone(),
    duration: format_duration(entry.duration.as_deref()),
    time_ago: format_relative_time(published, now),
    views: format_view_count(entry.view_count),
    date: format_utc_date(published).unwrap_or_else(|| UNKNOWN_DATE.to_string()),
    tags: entry.tags.clone(),
    target: NavigationState::detail(entry.id.clone(), from_page),
  }
}

/// Thumbnail marker drawn before the title.
pub const THUMB_GLYPH: &str = "▣ ";
/// Marker for entries that only have the placeholder image.
pub const PLACEHOLDER_GLYPH: &str = "□ ";

/// Build cards for a set of catalog indices, skipping any index that no longer resolves.
pub fn render_cards(
  catalog: &crate::catalog::Catalog,
  indices: &[usize],
  from_page: Page,
  now: DateTime<Utc>,
) -> Vec<Card> {
  indices.iter().filter_map(|&i| catalog.get(i).map(|e| render_card(i, e, from_page, now))).collect()
}

impl Card {
  pub fn thumbnail_glyph(&self) -> &'static str {
    if self.thumbnail_path.is_some() { THUMB_GLYPH } else { PLACEHOLDER_GLYPH }
  }

  /// Three-line list rendering: thumbnail marker and title, badges and stats, tag chips.
  pub fn lines(&self, theme: &Theme, width: usize) -> Vec<Line<'static>> {
    let mut badges = Vec::new();
    if !self.duration.is_empty() {
      badges.push(Span::styled(format!(" {} ", self.duration), Style::default().fg(theme.key_fg).bg(theme.key_bg)));
      badges.push(Span::raw(" "));
    }
    badges.push(Span::styled(self.time_ago.clone(), Style::default().fg(theme.muted)));
    badges.push(Span::styled("  ·  ", Style::default().fg(theme.border)));
    badges.push(Span::styled(format!("{} 回視聴", self.views), Style::default().fg(theme.fg)));
    badges.push(Span::styled("  ·  ", Style::default().fg(theme.border)));
    badges.push(Span::styled(self.date.clone(), Style::default().fg(theme.muted)));

    let mut lines = vec![
      Line::from(vec![
        Span::styled(self.thumbnail_glyph(), Style::default().fg(theme.muted)),
        Span::styled(
          truncate_str(&self.title, width.saturating_sub(2)),
          Style::default().add_modifier(Modifier::BOLD),
        ),
      ]),
      Line::from(badges),
    ];
    if !self.tags.is_empty() {
      let chips = self.tags.iter().map(|t| format!("#{}", t)).collect::<Vec<_>>().join(" ");
      lines.push(Line::from(Span::styled(truncate_str(&chips, width), Style::default().fg(theme.tag))));
    }
    lines
  }
}
