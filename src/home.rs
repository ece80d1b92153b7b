use std::sync::Arc;

use chrono::Utc;
use ratatui::widgets::ListState;

use crate::card::{Card, render_cards};
use crate::catalog::Catalog;
use crate::constants::constants;
use crate::format::{format_view_count, thousands};
use crate::route::{Page, ViewSnapshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileStats {
  pub entries: String,
  pub total_views: String,
  pub activity_start: String,
}

impl ProfileStats {
  pub fn from_catalog(catalog: &Catalog) -> Self {
    Self {
      entries: thousands(catalog.len() as u64),
      total_views: format_view_count(Some(catalog.total_views())),
      activity_start: constants().activity_start.clone(),
    }
  }

  /// Label and value pairs in display order.
  pub fn pairs(&self) -> [(&'static str, &str); 3] {
    [
      ("配信数", self.entries.as_str()),
      ("総再生回数", self.total_views.as_str()),
      ("活動開始日", self.activity_start.as_str()),
    ]
  }
}

pub struct HomeView {
  pub stats: ProfileStats,
  pub cards: Vec<Card>,
  pub list_state: ListState,
}

impl HomeView {
  pub fn new(catalog: Arc<Catalog>) -> Self {
    let recent = catalog.recent(constants().recent_count);
    let cards = render_cards(&catalog, &recent, Page::Home, Utc::now());
    let mut list_state = ListState::default();
    if !cards.is_empty() {
      list_state.select(Some(0));
    }
    Self { stats: ProfileStats::from_catalog(&catalog), cards, list_state }
  }

  pub fn selected_card(&self) -> Option<&Card> {
    self.list_state.selected().and_then(|i| self.cards.get(i))
  }

  pub fn snapshot(&self) -> ViewSnapshot {
    ViewSnapshot::Home { selected: self.list_state.selected().unwrap_or(0) }
  }

  pub fn restore(&mut self, snapshot: &ViewSnapshot) {
    if let ViewSnapshot::Home { selected } = snapshot
      && !self.cards.is_empty()
    {
      self.list_state.select(Some((*selected).min(self.cards.len() - 1)));
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::tests::entry;

  fn catalog(n: usize) -> Arc<Catalog> {
    let entries = (0..n)
      .map(|i| {
        let mut e = entry(&format!("v{i}"), &format!("2024-01-{:02}T00:00:00Z", i + 1));
        e.view_count = Some(5000);
        e
      })
      .collect();
    Arc::new(Catalog::new(entries))
  }

  #[test]
  fn shows_six_newest() {
    let home = HomeView::new(catalog(9));
    assert_eq!(home.cards.len(), 6);
    assert_eq!(home.cards[0].index, 8);
    assert_eq!(home.selected_card().map(|c| c.index), Some(8));
  }

  #[test]
  fn stats_use_view_count_rule() {
    let stats = ProfileStats::from_catalog(&catalog(3));
    assert_eq!(stats.entries, "3");
    assert_eq!(stats.total_views, "1.5万");
    assert_eq!(stats.pairs()[2], ("活動開始日", "2023/10/11"));
  }

  #[test]
  fn empty_catalog_has_no_selection() {
    let home = HomeView::new(Arc::new(Catalog::default()));
    assert!(home.cards.is_empty());
    assert!(home.selected_card().is_none());
    assert_eq!(ProfileStats::from_catalog(&Catalog::default()).total_views, "0");
  }

  #[test]
  fn restore_clamps_selection() {
    let mut home = HomeView::new(catalog(2));
    home.restore(&ViewSnapshot::Home { selected: 9 });
    assert_eq!(home.list_state.selected(), Some(1));
  }
}
