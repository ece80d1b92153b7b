use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::ListState;

use crate::app::{App, AppMode, View};
use crate::calendar::CalendarFocus;
use crate::route::Page;
use crate::search::SearchFocus;

// --- Helpers ---

/// Convert a char index to a byte offset within the string.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
  s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

/// Single-line text editing shared by the location bar and the search box.
/// Returns false for keys it does not handle.
fn edit_line(text: &mut String, cursor: &mut usize, code: KeyCode) -> bool {
  match code {
    KeyCode::Char(c) => {
      let byte_idx = char_to_byte_index(text, *cursor);
      text.insert(byte_idx, c);
      *cursor += 1;
    }
    KeyCode::Backspace => {
      if *cursor > 0 {
        *cursor -= 1;
        let byte_idx = char_to_byte_index(text, *cursor);
        text.remove(byte_idx);
      }
    }
    KeyCode::Delete => {
      if *cursor < text.chars().count() {
        let byte_idx = char_to_byte_index(text, *cursor);
        text.remove(byte_idx);
      }
    }
    KeyCode::Left => *cursor = cursor.saturating_sub(1),
    KeyCode::Right => {
      if *cursor < text.chars().count() {
        *cursor += 1;
      }
    }
    KeyCode::Home => *cursor = 0,
    KeyCode::End => *cursor = text.chars().count(),
    _ => return false,
  }
  true
}

fn list_next(state: &mut ListState, count: usize) {
  if count > 0 {
    let i = state.selected().map_or(0, |i| (i + 1) % count);
    state.select(Some(i));
  }
}

fn list_prev(state: &mut ListState, count: usize) {
  if count > 0 {
    let i = state.selected().map_or(0, |i| if i == 0 { count - 1 } else { i - 1 });
    state.select(Some(i));
  }
}

// --- Event Handling ---

pub fn handle_key_event(app: &mut App, key: KeyEvent) {
  let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
  let alt = key.modifiers.contains(KeyModifiers::ALT);

  if ctrl && key.code == KeyCode::Char('c') {
    app.should_quit = true;
    return;
  }
  if ctrl && key.code == KeyCode::Char('t') {
    app.next_theme();
    return;
  }
  if alt && key.code == KeyCode::Left {
    app.go_back();
    return;
  }
  if alt && key.code == KeyCode::Right {
    app.go_forward();
    return;
  }
  if ctrl && key.code == KeyCode::Char('l') {
    app.open_location();
    return;
  }

  if app.mode == AppMode::Location {
    handle_location_key(app, key);
    return;
  }

  // Text entry in the search box swallows plain keys.
  if matches!(&app.view, View::Search(s) if s.focus == SearchFocus::Input) {
    handle_search_input_key(app, key);
    return;
  }

  if handle_global_key(app, key) {
    return;
  }

  match &app.view {
    View::Home(_) => handle_home_key(app, key),
    View::Calendar(_) => handle_calendar_key(app, key),
    View::Search(_) => handle_search_key(app, key),
    View::Detail(_) => handle_detail_key(app, key),
    View::Loading | View::Failed(_) | View::Notice(_) => {}
  }
}

/// Keys that work on every page outside of text entry.
fn handle_global_key(app: &mut App, key: KeyEvent) -> bool {
  match key.code {
    KeyCode::Char('q') => app.should_quit = true,
    KeyCode::Char('1') => app.goto_page(Page::Home),
    KeyCode::Char('2') => app.goto_page(Page::Calendar),
    KeyCode::Char('3') => app.goto_page(Page::Search),
    KeyCode::Char('g') | KeyCode::Char(':') => app.open_location(),
    KeyCode::Char('r') if matches!(app.view, View::Failed(_)) => app.retry(),
    KeyCode::Backspace => app.go_back(),
    KeyCode::Esc if matches!(app.view, View::Detail(_) | View::Failed(_) | View::Notice(_)) => app.go_back(),
    _ => return false,
  }
  true
}

fn handle_location_key(app: &mut App, key: KeyEvent) {
  match key.code {
    KeyCode::Enter => app.submit_location(),
    KeyCode::Esc => app.cancel_location(),
    code => {
      app.clear_error();
      edit_line(&mut app.location, &mut app.location_cursor, code);
    }
  }
}

fn handle_home_key(app: &mut App, key: KeyEvent) {
  let View::Home(home) = &mut app.view else { return };
  match key.code {
    KeyCode::Down | KeyCode::Char('j') => list_next(&mut home.list_state, home.cards.len()),
    KeyCode::Up | KeyCode::Char('k') => list_prev(&mut home.list_state, home.cards.len()),
    KeyCode::Enter => {
      if let Some(target) = home.selected_card().map(|c| c.target.clone()) {
        app.open_card(target);
      }
    }
    _ => {}
  }
}

fn handle_calendar_key(app: &mut App, key: KeyEvent) {
  let View::Calendar(cal) = &mut app.view else { return };
  match (cal.focus, key.code) {
    (_, KeyCode::Char('[') | KeyCode::PageUp) => {
      cal.grid.prev_month();
    }
    (_, KeyCode::Char(']') | KeyCode::PageDown) => {
      cal.grid.next_month();
    }
    (CalendarFocus::Grid, KeyCode::Left | KeyCode::Char('h')) => {
      cal.grid.move_cursor(-1);
    }
    (CalendarFocus::Grid, KeyCode::Right | KeyCode::Char('l')) => {
      cal.grid.move_cursor(1);
    }
    (CalendarFocus::Grid, KeyCode::Up | KeyCode::Char('k')) => {
      cal.grid.move_cursor(-7);
    }
    (CalendarFocus::Grid, KeyCode::Down | KeyCode::Char('j')) => {
      cal.grid.move_cursor(7);
    }
    (CalendarFocus::Grid, KeyCode::Enter | KeyCode::Char(' ')) => cal.click(),
    (CalendarFocus::Grid, KeyCode::Tab) => {
      if !cal.cards.is_empty() {
        cal.focus = CalendarFocus::Results;
      }
    }
    (CalendarFocus::Results, KeyCode::Down | KeyCode::Char('j')) => list_next(&mut cal.result_state, cal.cards.len()),
    (CalendarFocus::Results, KeyCode::Up | KeyCode::Char('k')) => list_prev(&mut cal.result_state, cal.cards.len()),
    (CalendarFocus::Results, KeyCode::Tab | KeyCode::Esc) => cal.focus = CalendarFocus::Grid,
    (CalendarFocus::Results, KeyCode::Enter) => {
      if let Some(target) = cal.selected_card().map(|c| c.target.clone()) {
        app.open_card(target);
      }
    }
    _ => {}
  }
}

fn handle_search_input_key(app: &mut App, key: KeyEvent) {
  let View::Search(search) = &mut app.view else { return };
  match key.code {
    KeyCode::Enter => search.submit(),
    KeyCode::Tab => search.cycle_focus(),
    KeyCode::Down => search.focus = SearchFocus::Tags,
    KeyCode::Esc => {
      if search.input.is_empty() {
        search.cycle_focus();
      } else {
        search.input.clear();
        search.cursor = 0;
      }
    }
    code => {
      edit_line(&mut search.input, &mut search.cursor, code);
    }
  }
}

fn handle_search_key(app: &mut App, key: KeyEvent) {
  let View::Search(search) = &mut app.view else { return };
  match (search.focus, key.code) {
    (_, KeyCode::Tab) => search.cycle_focus(),
    (_, KeyCode::Char('/')) => search.focus = SearchFocus::Input,
    (_, KeyCode::Char('s')) => search.cycle_sort(),
    (_, KeyCode::Char('c')) => search.clear_filters(),
    (_, KeyCode::Char('n') | KeyCode::Right) => search.next_page(),
    (_, KeyCode::Char('p') | KeyCode::Left) => search.prev_page(),
    (SearchFocus::Tags, KeyCode::Down | KeyCode::Char('j')) => list_next(&mut search.tag_state, search.tags.len()),
    (SearchFocus::Tags, KeyCode::Up | KeyCode::Char('k')) => list_prev(&mut search.tag_state, search.tags.len()),
    (SearchFocus::Tags, KeyCode::Enter | KeyCode::Char(' ')) => search.toggle_selected_tag(),
    (SearchFocus::Results, KeyCode::Down | KeyCode::Char('j')) => {
      list_next(&mut search.result_state, search.cards.len())
    }
    (SearchFocus::Results, KeyCode::Up | KeyCode::Char('k')) => list_prev(&mut search.result_state, search.cards.len()),
    (SearchFocus::Results, KeyCode::Enter) => {
      if let Some(target) = search.selected_card().map(|c| c.target.clone()) {
        app.open_card(target);
      }
    }
    _ => {}
  }
}

fn handle_detail_key(app: &mut App, key: KeyEvent) {
  match key.code {
    KeyCode::Char('o') => app.open_video(),
    KeyCode::Char('x') => app.open_space(),
    KeyCode::Char('y') => app.copy_summary(),
    KeyCode::Down | KeyCode::Char('j') => {
      if let View::Detail(d) = &mut app.view {
        d.scroll = d.scroll.saturating_add(1);
      }
    }
    KeyCode::Up | KeyCode::Char('k') => {
      if let View::Detail(d) = &mut app.view {
        d.scroll = d.scroll.saturating_sub(1);
      }
    }
    _ => {}
  }
}
