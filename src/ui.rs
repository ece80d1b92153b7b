use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Layout, Rect},
  style::{Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, BorderType, List, ListItem, Padding, Paragraph, Tabs, Wrap},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::{App, AppMode, View};
use crate::calendar::{CalendarFocus, CalendarView};
use crate::card::Card;
use crate::constants::constants;
use crate::detail::{self, DescSegment, DetailView};
use crate::graphics::{ThumbnailWidget, fit_thumbnail};
use crate::home::HomeView;
use crate::month_grid::MonthGrid;
use crate::route::Page;
use crate::search::{SearchFocus, SearchView};
use crate::theme::Theme;

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
pub fn display_width(s: &str, n: usize) -> usize {
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` terminal columns, appending "…" if truncated.
pub fn truncate_str(s: &str, max_width: usize) -> String {
  if s.width() <= max_width {
    return s.to_string();
  }
  let budget = max_width.saturating_sub(1);
  let mut used = 0;
  let mut out = String::new();
  for c in s.chars() {
    let w = c.width().unwrap_or(0);
    if used + w > budget {
      break;
    }
    used += w;
    out.push(c);
  }
  out.push('…');
  out
}

fn rounded_block<'a>(title: impl Into<Line<'a>>, theme: &Theme, focused: bool) -> Block<'a> {
  let color = if focused { theme.accent } else { theme.border };
  Block::bordered()
    .title(title)
    .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
    .border_type(BorderType::Rounded)
    .border_style(Style::default().fg(color))
}

fn card_items(cards: &[Card], theme: &Theme, width: usize) -> Vec<ListItem<'static>> {
  cards
    .iter()
    .enumerate()
    .map(|(i, card)| {
      let bg = if i % 2 == 1 { theme.stripe_bg } else { theme.bg };
      let mut lines = card.lines(theme, width);
      lines.push(Line::from(""));
      ListItem::new(lines).bg(bg)
    })
    .collect()
}

fn card_list<'a>(items: Vec<ListItem<'a>>, block: Block<'a>, theme: &Theme) -> List<'a> {
  List::new(items)
    .block(block)
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg))
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();

  frame.render_widget(Block::default().style(Style::default().bg(theme.bg).fg(theme.fg)), frame.area());

  let location_h = if app.mode == AppMode::Location { 3 } else { 0 };
  let [header_area, tabs_area, banner_area, main_area, location_area, status_area, footer_area] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Length(1),
    Constraint::Length(1),
    Constraint::Min(5),
    Constraint::Length(location_h),
    Constraint::Length(1),
    Constraint::Length(1),
  ])
  .areas(frame.area());

  render_header(frame, app, header_area);
  render_tabs(frame, app, tabs_area);
  render_banner(frame, app, banner_area);
  render_main(frame, app, main_area);
  if app.mode == AppMode::Location {
    render_location(frame, app, location_area);
  }
  render_status(frame, app, status_area);
  render_footer(frame, app, footer_area);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let hash = if app.router.hash().is_empty() { "#" } else { app.router.hash() };
  let nav = |enabled: bool, glyph: &'static str| {
    Span::styled(glyph, Style::default().fg(if enabled { theme.fg } else { theme.border }))
  };
  let left = Line::from(vec![
    Span::styled(" ◆ kiseki ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
    nav(app.router.history().can_go_back(), "‹"),
    nav(app.router.history().can_go_forward(), "›"),
    Span::raw(" "),
    Span::styled(hash.to_string(), Style::default().fg(theme.link)),
  ]);
  frame.render_widget(left, area);

  let version = format!("v{} ", env!("CARGO_PKG_VERSION"));
  let right = Line::from(Span::styled(&version, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(version.len() as u16), width: version.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let titles: Vec<Line> = Page::ALL
    .iter()
    .enumerate()
    .map(|(i, p)| {
      Line::from(vec![Span::styled(format!("{} ", i + 1), Style::default().fg(theme.muted)), Span::raw(p.label())])
    })
    .collect();
  let selected = app.router.active_nav().and_then(|p| Page::ALL.iter().position(|&q| q == p));
  let tabs = Tabs::new(titles)
    .select(selected)
    .style(Style::default().fg(theme.fg))
    .highlight_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD | Modifier::UNDERLINED))
    .divider(Span::styled("│", Style::default().fg(theme.border)));
  frame.render_widget(tabs, area);
}

fn render_banner(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let Some(fragment) = &app.fragment else { return };
  let mut spans = Vec::new();
  if let Some(title) = &fragment.title {
    spans.push(Span::styled(format!(" {} ", title), Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)));
  }
  if let Some(line) = fragment.lines.first() {
    spans.push(Span::styled(line.clone(), Style::default().fg(theme.muted)));
  }
  frame.render_widget(Line::from(spans), area);
}

fn render_main(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  if matches!(app.view, View::Detail(_)) {
    render_detail(frame, app, area);
    return;
  }
  match &mut app.view {
    View::Loading => render_message(frame, theme, area, "読み込み中...", theme.muted),
    View::Failed(msg) => render_message(frame, theme, area, msg, theme.error),
    View::Notice(msg) => render_message(frame, theme, area, msg, theme.status),
    View::Home(home) => render_home(frame, theme, home, area),
    View::Calendar(cal) => render_calendar(frame, theme, cal, area),
    View::Search(search) => render_search(frame, theme, search, area),
    View::Detail(_) => {}
  }
}

fn render_message(frame: &mut Frame, theme: &Theme, area: Rect, msg: &str, color: ratatui::style::Color) {
  let text = vec![Line::from(""), Line::from(Span::styled(msg.to_string(), Style::default().fg(color)))];
  let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(rounded_block("", theme, false));
  frame.render_widget(paragraph, area);
}

fn render_home(frame: &mut Frame, theme: &Theme, home: &mut HomeView, area: Rect) {
  let [profile_area, recent_area] = Layout::horizontal([Constraint::Length(38), Constraint::Min(20)]).areas(area);
  let c = constants();

  let mut lines = vec![
    Line::from(Span::styled(c.talent_name.clone(), Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))),
    Line::from(Span::styled(c.talent_subtitle.clone(), Style::default().fg(theme.muted))),
    Line::from(""),
    Line::from(c.talent_description.clone()),
    Line::from(""),
  ];
  for (label, value) in home.stats.pairs() {
    lines.push(Line::from(vec![
      Span::styled(format!("{:<8}", label), Style::default().fg(theme.muted)),
      Span::styled(value.to_string(), Style::default().fg(theme.fg).add_modifier(Modifier::BOLD)),
    ]));
  }
  let profile = Paragraph::new(lines)
    .wrap(Wrap { trim: true })
    .block(rounded_block(" Profile ", theme, false).padding(Padding::horizontal(1)));
  frame.render_widget(profile, profile_area);

  let width = recent_area.width.saturating_sub(4) as usize;
  let list = card_list(card_items(&home.cards, theme, width), rounded_block(" 最近の配信 ", theme, true), theme);
  frame.render_stateful_widget(list, recent_area, &mut home.list_state);
}

fn render_calendar(frame: &mut Frame, theme: &Theme, cal: &mut CalendarView, area: Rect) {
  let [grid_area, results_area] = Layout::horizontal([Constraint::Length(32), Constraint::Min(20)]).areas(area);

  let grid_focused = cal.focus == CalendarFocus::Grid;
  let block = rounded_block(" Calendar ", theme, grid_focused);
  let inner = block.inner(grid_area);
  frame.render_widget(block, grid_area);
  frame.render_widget(MonthGrid { state: &cal.grid, theme, focused: grid_focused }, inner);

  let title = format!(" {} ", cal.selection.header);
  let block = rounded_block(title, theme, !grid_focused);
  if let Some(placeholder) = cal.selection.placeholder {
    let p = Paragraph::new(Line::from(Span::styled(placeholder, Style::default().fg(theme.muted)))).block(block);
    frame.render_widget(p, results_area);
    return;
  }
  let width = results_area.width.saturating_sub(4) as usize;
  let list = card_list(card_items(&cal.cards, theme, width), block, theme);
  frame.render_stateful_widget(list, results_area, &mut cal.result_state);
}

fn render_search(frame: &mut Frame, theme: &Theme, search: &mut SearchView, area: Rect) {
  let [input_area, body_area, pager_area] =
    Layout::vertical([Constraint::Length(3), Constraint::Min(3), Constraint::Length(1)]).areas(area);

  let focused = search.focus == SearchFocus::Input;
  let count = format!(" {}  ({}件) ", search.filter.sort.label(), search.results.matches.len());
  let block = rounded_block(" キーワード ", theme, focused)
    .title(Line::from(Span::styled(count, Style::default().fg(theme.muted))).right_aligned())
    .padding(Padding::horizontal(1));
  let mut scroll = 0;
  render_text_input(frame, input_area, block, &search.input, search.cursor, &mut scroll, focused, theme);

  let [tags_area, results_area] = Layout::horizontal([Constraint::Length(24), Constraint::Min(20)]).areas(body_area);

  let tag_items: Vec<ListItem> = search
    .tags
    .iter()
    .map(|t| {
      let on = search.filter.selected_tags.contains(t);
      let mark = if on { "[x] " } else { "[ ] " };
      let style = if on { Style::default().fg(theme.tag).add_modifier(Modifier::BOLD) } else { Style::default() };
      ListItem::new(Line::from(Span::styled(format!("{}{}", mark, t), style)))
    })
    .collect();
  let tags = List::new(tag_items)
    .block(rounded_block(" タグ ", theme, search.focus == SearchFocus::Tags))
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg));
  frame.render_stateful_widget(tags, tags_area, &mut search.tag_state);

  let results_block = rounded_block(" 検索結果 ", theme, search.focus == SearchFocus::Results);
  if search.results.is_empty() {
    let p = Paragraph::new(Line::from(Span::styled("該当する配信が見つかりませんでした。", Style::default().fg(theme.muted))))
      .block(results_block);
    frame.render_widget(p, results_area);
  } else {
    let width = results_area.width.saturating_sub(4) as usize;
    let list = card_list(card_items(&search.cards, theme, width), results_block, theme);
    frame.render_stateful_widget(list, results_area, &mut search.result_state);
  }

  let pagination = &search.results.pagination;
  if pagination.shows_controls() {
    let mut spans = Vec::new();
    if pagination.has_prev() {
      spans.push(Span::styled(" ‹ 前へ ", Style::default().fg(theme.accent)));
    }
    for page in pagination.window(constants().max_page_buttons) {
      let style = if page == pagination.current {
        Style::default().fg(theme.key_fg).bg(theme.key_bg).add_modifier(Modifier::BOLD)
      } else {
        Style::default().fg(theme.fg)
      };
      spans.push(Span::styled(format!(" {} ", page), style));
    }
    if pagination.has_next() {
      spans.push(Span::styled(" 次へ › ", Style::default().fg(theme.accent)));
    }
    frame.render_widget(Line::from(spans).alignment(Alignment::Center), pager_area);
  }
}

fn detail_lines(view: &DetailView, theme: &Theme) -> Vec<Line<'static>> {
  let muted = Style::default().fg(theme.muted);
  let mut lines = vec![
    Line::from(Span::styled(view.title.clone(), Style::default().fg(theme.fg).add_modifier(Modifier::BOLD))),
    Line::from(""),
    Line::from(vec![Span::styled("視聴  ", muted), Span::raw(view.views.clone())]),
    Line::from(vec![Span::styled("配信日  ", muted), Span::raw(view.date.clone())]),
    Line::from(vec![Span::styled("時間  ", muted), Span::raw(view.duration.clone())]),
  ];

  let tags = if view.tags.is_empty() {
    Line::from(Span::styled(detail::NO_TAGS, muted))
  } else {
    Line::from(Span::styled(
      view.tags.iter().map(|t| format!("#{}", t)).collect::<Vec<_>>().join(" "),
      Style::default().fg(theme.tag),
    ))
  };
  lines.push(tags);

  if let Some(url) = &view.space_url {
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
      Span::styled(format!(" {} ", detail::SPACE_LINK_LABEL), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
      Span::raw(" "),
      Span::styled(format!("@{}", url), Style::default().fg(theme.link).add_modifier(Modifier::UNDERLINED)),
    ]));
  }

  if let Some(msg) = view.copy_message() {
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(msg.to_string(), Style::default().fg(theme.status))));
  }

  lines.push(Line::from(""));
  match &view.description {
    None => lines.push(Line::from(Span::styled(detail::NO_DESCRIPTION, muted))),
    Some(segments) => {
      // split segments on newlines so each text line renders on its own row
      let mut current: Vec<Span<'static>> = Vec::new();
      for seg in segments {
        match seg {
          DescSegment::Link(url) => current.push(Span::styled(
            url.clone(),
            Style::default().fg(theme.link).add_modifier(Modifier::UNDERLINED),
          )),
          DescSegment::Text(text) => {
            let mut parts = text.split('\n');
            if let Some(first) = parts.next() {
              current.push(Span::raw(first.to_string()));
            }
            for part in parts {
              lines.push(Line::from(std::mem::take(&mut current)));
              current.push(Span::raw(part.to_string()));
            }
          }
        }
      }
      lines.push(Line::from(current));
    }
  }
  lines
}

fn render_detail(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let View::Detail(view) = &app.view else { return };
  let [thumb_area, info_area] =
    Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).areas(area);

  let thumb_block = rounded_block(format!(" {} ", view.from_page.label()), theme, false);
  let mut inner = thumb_block.inner(thumb_area);
  frame.render_widget(thumb_block, thumb_area);
  // keep roughly 16:9 in cells (cells are twice as tall as wide)
  let ideal_h = (inner.width as f32 * 9.0 / 32.0).round() as u16;
  if ideal_h > 0 && ideal_h < inner.height {
    inner.height = ideal_h;
  }

  let image = match (&app.thumbnail, app.display_mode.shows_images()) {
    (Some((id, image)), true) if *id == view.id => Some((id, image)),
    _ => None,
  };
  match image {
    Some((id, image)) => {
      let stale = match &app.resized_thumb {
        Some((rid, w, h, _)) => rid != id || *w != inner.width || *h != inner.height,
        None => true,
      };
      if stale {
        let fitted = fit_thumbnail(image, inner, app.display_mode);
        app.resized_thumb = Some((id.clone(), inner.width, inner.height, fitted));
      }
      if let Some((_, _, _, resized)) = &app.resized_thumb {
        frame.render_widget(ThumbnailWidget { image: resized, display_mode: app.display_mode }, inner);
      }
    }
    None => {
      let label = if view.video_url.is_some() { "[ サムネイル ]  o: 動画を開く" } else { "[ サムネイル ]" };
      let p =
        Paragraph::new(Line::from(Span::styled(label, Style::default().fg(theme.muted)))).alignment(Alignment::Center);
      frame.render_widget(p, inner);
    }
  }

  let info = Paragraph::new(detail_lines(view, theme))
    .wrap(Wrap { trim: false })
    .scroll((view.scroll, 0))
    .block(rounded_block(" 配信詳細 ", theme, true).padding(Padding::horizontal(1)));
  frame.render_widget(info, info_area);
}

#[allow(clippy::too_many_arguments)]
fn render_text_input(
  frame: &mut Frame,
  area: Rect,
  block: Block,
  text: &str,
  cursor: usize,
  scroll: &mut usize,
  focused: bool,
  theme: &Theme,
) {
  let inner_w = area.width.saturating_sub(4) as usize;
  let cursor_col = display_width(text, cursor);

  if cursor_col < *scroll {
    *scroll = cursor_col;
  } else if cursor_col >= *scroll + inner_w {
    *scroll = cursor_col.saturating_sub(inner_w) + 1;
  }

  let visible: String = text
    .chars()
    .scan(0usize, |col, c| {
      let w = c.width().unwrap_or(0);
      let start = *col;
      *col += w;
      Some((start, *col, c))
    })
    .skip_while(|(_, end, _)| *end <= *scroll)
    .take_while(|(start, _, _)| *start < *scroll + inner_w)
    .map(|(_, _, c)| c)
    .collect();

  let paragraph = Paragraph::new(visible).style(Style::default().fg(theme.fg)).block(block);
  frame.render_widget(paragraph, area);

  if focused {
    let cursor_x = area.x + 2 + (cursor_col - *scroll) as u16;
    frame.set_cursor_position((cursor_x, area.y + 1));
  }
}

fn render_location(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let block = rounded_block(" Location ", theme, true).padding(Padding::horizontal(1));
  let mut scroll = app.location_scroll;
  render_text_input(frame, area, block, &app.location, app.location_cursor, &mut scroll, true, theme);
  app.location_scroll = scroll;
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let (text, style) = if let Some(msg) = &app.status_message {
    (format!(" ⏳ {}", msg), Style::default().fg(theme.status))
  } else if let Some(err) = &app.last_error {
    (format!(" ⚠  {}", err), Style::default().fg(theme.error))
  } else if let Some(info) = &app.info_message {
    (format!(" ℹ  {}", info), Style::default().fg(theme.muted))
  } else {
    let entries = app.catalog().map_or(String::new(), |c| format!(" · {} entries", c.len()));
    (format!(" Ready{}", entries), Style::default().fg(theme.muted))
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let keys: Vec<(&str, &str)> = if app.mode == AppMode::Location {
    vec![("Enter", "Go"), ("Esc", "Cancel")]
  } else {
    let mut k = match &app.view {
      View::Home(_) => vec![("j/k", "Move"), ("Enter", "Open")],
      View::Calendar(c) if c.focus == CalendarFocus::Grid => {
        vec![("←↓↑→", "Day"), ("[ ]", "Month"), ("Enter", "Select"), ("Tab", "Results")]
      }
      View::Calendar(_) => vec![("j/k", "Move"), ("Enter", "Open"), ("Tab", "Grid")],
      View::Search(s) if s.focus == SearchFocus::Input => vec![("Enter", "Search"), ("Tab", "Tags"), ("Esc", "Clear")],
      View::Search(_) => vec![("Space", "Tag"), ("s", "Sort"), ("c", "Clear"), ("n/p", "Page"), ("Enter", "Open")],
      View::Detail(d) => {
        let mut k = vec![("o", "Video"), ("y", "Copy")];
        if d.space_url.is_some() {
          k.push(("x", "Space"));
        }
        k.push(("Esc", "Back"));
        k
      }
      View::Failed(_) => vec![("r", "Retry")],
      View::Loading | View::Notice(_) => vec![],
    };
    k.extend([("1-3", "Pages"), ("⌫", "Back"), ("g", "Go to"), ("^t", "Theme"), ("q", "Quit")]);
    k
  };

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw(" "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let theme_label = format!("{} ", theme.name);
  let right = Line::from(Span::styled(&theme_label, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(theme_label.len() as u16), width: theme_label.len() as u16, ..area };
  frame.render_widget(right, right_area);
}
