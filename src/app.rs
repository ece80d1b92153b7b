use anyhow::Result;
use chrono::Utc;
use image::DynamicImage;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::calendar::CalendarView;
use crate::catalog::{Catalog, CatalogStore};
use crate::config::Config;
use crate::constants::constants;
use crate::desktop::{self, CopyMethod};
use crate::detail::{self, DetailView};
use crate::display::DisplayMode;
use crate::error::{LoadError, NetworkError};
use crate::fragment::{Fragment, FragmentSource};
use crate::home::HomeView;
use crate::route::{NavigationState, Page, ViewSnapshot};
use crate::router::{NavIntent, Router};
use crate::search::{FilterState, SearchView};
use crate::site::{SiteSource, fetch_thumbnail};
use crate::theme::{THEMES, Theme, theme_index};

pub const LOAD_FAILED: &str = "動画データの読み込みに失敗しました。";
pub const PAGE_FAILED: &str = "ページの読み込みに失敗しました。";
pub const UNKNOWN_ROUTE: &str = "このページは表示できません。";

// --- Types ---

/// What the content area shows.
pub enum View {
  /// Waiting on the page fragment or the catalog.
  Loading,
  Home(HomeView),
  Calendar(CalendarView),
  Search(SearchView),
  Detail(DetailView),
  /// Inline error in place of the page content.
  Failed(String),
  /// A route that could not be opened. Navigation keys keep working.
  Notice(String),
}

impl View {
  fn snapshot(&self) -> Option<ViewSnapshot> {
    match self {
      View::Home(v) => Some(v.snapshot()),
      View::Calendar(v) => Some(v.snapshot()),
      View::Search(v) => Some(v.snapshot()),
      _ => None,
    }
  }

  fn restore(&mut self, snapshot: &ViewSnapshot) {
    match self {
      View::Home(v) => v.restore(snapshot),
      View::Calendar(v) => v.restore(snapshot),
      View::Search(v) => v.restore(snapshot),
      _ => {}
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
  Browse,
  /// Editing the location bar.
  Location,
}

enum CatalogStatus {
  Loading,
  Ready(Arc<Catalog>),
  Failed(String),
}

struct FragmentReply {
  generation: u64,
  result: Result<Fragment, NetworkError>,
}

/// A committed navigation waiting for its fragment and the catalog.
struct Pending {
  intent: NavIntent,
  fragment: Option<Fragment>,
}

/// In-flight async task receivers.
pub(crate) struct AsyncTasks {
  catalog_rx: Option<oneshot::Receiver<Result<Arc<Catalog>, LoadError>>>,
  fragment_tx: mpsc::UnboundedSender<FragmentReply>,
  fragment_rx: mpsc::UnboundedReceiver<FragmentReply>,
  thumb_rx: Option<oneshot::Receiver<(String, Result<DynamicImage>)>>,
  copy_rx: Option<oneshot::Receiver<Result<CopyMethod>>>,
}

impl AsyncTasks {
  fn new() -> Self {
    let (fragment_tx, fragment_rx) = mpsc::unbounded_channel();
    Self { catalog_rx: None, fragment_tx, fragment_rx, thumb_rx: None, copy_rx: None }
  }
}

pub struct App {
  pub mode: AppMode,
  pub theme_index: usize,
  pub display_mode: DisplayMode,
  pub router: Router,
  pub view: View,
  /// Banner of the page currently shown.
  pub fragment: Option<Fragment>,
  pub location: String,
  pub location_cursor: usize,
  pub location_scroll: usize,
  pub last_error: Option<String>,
  pub status_message: Option<String>,
  /// Informational message, lower priority than status/error.
  pub info_message: Option<String>,
  pub should_quit: bool,
  /// Decoded thumbnail keyed by entry id.
  pub thumbnail: Option<(String, DynamicImage)>,
  /// Thumbnail fitted to the last drawn area: (id, width, height, image).
  pub resized_thumb: Option<(String, u16, u16, DynamicImage)>,
  /// Escape sequences for the terminal, written by the draw loop between frames.
  terminal_output: Vec<String>,
  store: Arc<CatalogStore>,
  site: SiteSource,
  fragments: FragmentSource,
  catalog: CatalogStatus,
  pending: Option<Pending>,
  /// Search filter kept while the search view is not on screen.
  filter: FilterState,
  config: Config,
  pub(crate) tasks: AsyncTasks,
  /// When the last error was set, for auto-dismiss.
  error_time: Option<Instant>,
}

impl App {
  pub fn new(
    site: SiteSource,
    fragments: FragmentSource,
    display_mode: DisplayMode,
    initial_route: Option<&str>,
    config: Config,
  ) -> Self {
    Self {
      mode: AppMode::Browse,
      theme_index: theme_index(config.theme_name.as_deref()),
      display_mode,
      router: Router::new(initial_route),
      view: View::Loading,
      fragment: None,
      location: String::new(),
      location_cursor: 0,
      location_scroll: 0,
      last_error: None,
      status_message: None,
      info_message: None,
      should_quit: false,
      thumbnail: None,
      resized_thumb: None,
      terminal_output: Vec::new(),
      store: Arc::new(CatalogStore::new(site.clone())),
      site,
      fragments,
      catalog: CatalogStatus::Loading,
      pending: None,
      filter: FilterState::default(),
      config,
      tasks: AsyncTasks::new(),
      error_time: None,
    }
  }

  /// Kick off the catalog load and the bootstrap navigation.
  pub fn start(&mut self) {
    self.load_catalog();
    match self.router.bootstrap() {
      Ok(intent) => self.begin(intent),
      Err(e) => {
        self.view = View::Notice(format!("{} ({})", UNKNOWN_ROUTE, self.router.hash()));
        self.info_message = Some(format!("Unknown route: {}", e));
      }
    }
  }

  pub fn theme(&self) -> &'static Theme {
    &THEMES[self.theme_index]
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    self.config.theme_name = Some(self.theme().name.to_string());
    self.config.save();
  }

  pub fn catalog(&self) -> Option<&Arc<Catalog>> {
    match &self.catalog {
      CatalogStatus::Ready(c) => Some(c),
      _ => None,
    }
  }

  pub fn catalog_failed(&self) -> bool {
    matches!(self.catalog, CatalogStatus::Failed(_))
  }

  /// Set an error message with auto-dismiss tracking.
  pub fn set_error(&mut self, msg: String) {
    self.last_error = Some(msg);
    self.error_time = Some(Instant::now());
  }

  pub fn clear_error(&mut self) {
    self.last_error = None;
    self.error_time = None;
  }

  /// Clear stale error and copy messages.
  pub fn expire_messages(&mut self) {
    if let Some(t) = self.error_time
      && t.elapsed() >= Duration::from_secs(constants().error_dismiss_secs)
    {
      self.last_error = None;
      self.error_time = None;
    }
    if let View::Detail(v) = &mut self.view {
      v.expire_copy_message(Instant::now());
    }
  }

  // --- Navigation ---

  /// User-initiated navigation: pushes one history entry.
  pub fn navigate(&mut self, state: NavigationState) {
    self.leave_view();
    let intent = self.router.navigate(state);
    self.begin(intent);
  }

  pub fn goto_page(&mut self, page: Page) {
    self.navigate(page.into());
  }

  /// Open the detail view for a card, returning here on back.
  pub fn open_card(&mut self, target: NavigationState) {
    self.navigate(target);
  }

  pub fn go_back(&mut self) {
    if !self.router.history().can_go_back() {
      return;
    }
    self.leave_view();
    match self.router.back() {
      Some(intent) => self.begin(intent),
      None => self.view = View::Notice(format!("{} ({})", UNKNOWN_ROUTE, self.router.hash())),
    }
  }

  pub fn go_forward(&mut self) {
    if !self.router.history().can_go_forward() {
      return;
    }
    self.leave_view();
    match self.router.forward() {
      Some(intent) => self.begin(intent),
      None => self.view = View::Notice(format!("{} ({})", UNKNOWN_ROUTE, self.router.hash())),
    }
  }

  /// Retry after a failed catalog or page load.
  pub fn retry(&mut self) {
    if self.catalog_failed() {
      self.load_catalog();
    }
    if let Some(intent) = self.router.reload() {
      self.view = View::Loading;
      self.begin(intent);
    }
  }

  pub fn open_location(&mut self) {
    self.location = self.router.hash().to_string();
    self.location_cursor = self.location.chars().count();
    self.location_scroll = 0;
    self.mode = AppMode::Location;
  }

  pub fn cancel_location(&mut self) {
    self.mode = AppMode::Browse;
  }

  /// Navigate to the typed fragment. Unknown routes leave everything as it was.
  pub fn submit_location(&mut self) {
    let typed = self.location.trim().to_string();
    match NavigationState::parse_hash(&typed) {
      Ok(state) => {
        self.mode = AppMode::Browse;
        self.navigate(state);
      }
      Err(e) => {
        warn!(hash = %typed, err = %e, "location: route rejected");
        self.set_error(format!("Unknown route '{}': {}", typed, e));
      }
    }
  }

  /// Tear down the live view, saving its snapshot into the history entry it belongs to.
  fn leave_view(&mut self) {
    let old = std::mem::replace(&mut self.view, View::Loading);
    self.router.save_snapshot(old.snapshot());
    if let View::Search(search) = old {
      self.filter = search.into_filter();
    }
    self.pending = None;
    self.clear_error();
    self.info_message = None;
  }

  fn load_catalog(&mut self) {
    self.catalog = CatalogStatus::Loading;
    let store = Arc::clone(&self.store);
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(store.get_or_load().await);
    });
    self.tasks.catalog_rx = Some(rx);
  }

  /// Fetch the fragment for a committed navigation. The reply is tagged with
  /// the intent's generation.
  fn begin(&mut self, intent: NavIntent) {
    let page = intent.state.page_name();
    let generation = intent.generation;
    info!(page, generation, hash = %self.router.hash(), "navigation started");
    self.status_message = Some(format!("Loading {}…", page));

    let fragments = self.fragments.clone();
    let tx = self.tasks.fragment_tx.clone();
    tokio::spawn(async move {
      let result = fragments.fetch(page).await;
      let _ = tx.send(FragmentReply { generation, result });
    });
    self.pending = Some(Pending { intent, fragment: None });
  }

  fn build_view(&mut self, catalog: Arc<Catalog>, state: &NavigationState) -> View {
    match state {
      NavigationState::Home => View::Home(HomeView::new(catalog)),
      NavigationState::Calendar => View::Calendar(CalendarView::new(catalog, Utc::now().date_naive())),
      NavigationState::Search => View::Search(SearchView::new(catalog, std::mem::take(&mut self.filter))),
      NavigationState::Detail { video_id, from_page } => match DetailView::assemble(&catalog, video_id, *from_page) {
        Ok(view) => {
          self.request_thumbnail(&view);
          View::Detail(view)
        }
        Err(e) => {
          warn!(err = %e, "detail: lookup failed");
          View::Failed(detail::NOT_FOUND.to_string())
        }
      },
    }
  }

  /// Build the pending view once both its fragment and the catalog are in.
  fn finish_pending(&mut self) {
    if !self.pending.as_ref().is_some_and(|p| p.fragment.is_some()) {
      return;
    }
    let catalog = match &self.catalog {
      CatalogStatus::Loading => return,
      CatalogStatus::Failed(_) => {
        self.pending = None;
        self.status_message = None;
        self.view = View::Failed(LOAD_FAILED.to_string());
        return;
      }
      CatalogStatus::Ready(c) => Arc::clone(c),
    };
    let Some(Pending { intent, fragment }) = self.pending.take() else { return };
    self.fragment = fragment;
    self.status_message = None;
    self.view = self.build_view(catalog, &intent.state);
    if let Some(snapshot) = &intent.snapshot {
      self.view.restore(snapshot);
    }
    debug!(page = intent.state.page_name(), generation = intent.generation, "view ready");
  }

  // --- Detail actions ---

  fn request_thumbnail(&mut self, view: &DetailView) {
    if !self.display_mode.shows_images() || self.thumbnail.as_ref().is_some_and(|(id, _)| *id == view.id) {
      return;
    }
    let site = self.site.clone();
    let id = view.id.clone();
    let path = view.thumbnail_path.clone();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let result = fetch_thumbnail(&site, path.as_deref()).await;
      let _ = tx.send((id, result));
    });
    self.tasks.thumb_rx = Some(rx);
  }

  pub fn copy_summary(&mut self) {
    let View::Detail(view) = &self.view else { return };
    let text = view.share_text.clone();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(desktop::copy_text(&text).await);
    });
    self.tasks.copy_rx = Some(rx);
  }

  pub fn open_video(&mut self) {
    let View::Detail(view) = &self.view else { return };
    let Some(url) = view.video_url.clone() else {
      self.info_message = Some("No video link for this entry.".to_string());
      return;
    };
    if let Err(e) = desktop::open_url(&url) {
      self.set_error(format!("{:#}", e));
    }
  }

  pub fn open_space(&mut self) {
    let View::Detail(view) = &self.view else { return };
    let Some(url) = view.space_url.clone() else { return };
    if let Err(e) = desktop::open_url(&url) {
      self.set_error(format!("{:#}", e));
    }
  }

  // --- Polling ---

  pub fn check_pending(&mut self) {
    if let Some(mut rx) = self.tasks.catalog_rx.take() {
      match rx.try_recv() {
        Ok(Ok(catalog)) => {
          info!(entries = catalog.len(), "catalog ready");
          self.catalog = CatalogStatus::Ready(catalog);
        }
        Ok(Err(e)) => {
          error!(err = %e, "catalog: load failed");
          self.set_error(format!("Catalog load failed: {}", e));
          self.catalog = CatalogStatus::Failed(e.to_string());
        }
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.catalog_rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          self.set_error("Catalog task failed.".to_string());
          self.catalog = CatalogStatus::Failed("task closed".to_string());
        }
      }
    }

    while let Ok(reply) = self.tasks.fragment_rx.try_recv() {
      if !self.router.is_current(reply.generation) {
        debug!(generation = reply.generation, current = self.router.generation(), "stale fragment dropped");
        continue;
      }
      let Some(pending) = self.pending.as_mut().filter(|p| p.intent.generation == reply.generation) else {
        continue;
      };
      match reply.result {
        Ok(fragment) => pending.fragment = Some(fragment),
        Err(e) => {
          warn!(err = %e, generation = reply.generation, "fragment: fetch failed");
          self.pending = None;
          self.status_message = None;
          self.fragment = None;
          self.view = View::Failed(PAGE_FAILED.to_string());
          self.set_error(e.to_string());
        }
      }
    }
    self.finish_pending();

    if let Some(mut rx) = self.tasks.thumb_rx.take() {
      match rx.try_recv() {
        Ok((id, Ok(image))) => {
          self.thumbnail = Some((id, image));
          self.resized_thumb = None;
        }
        Ok((id, Err(e))) => {
          // text placeholder is drawn instead
          debug!(id = %id, err = %e, "thumbnail unavailable");
        }
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.thumb_rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => {}
      }
    }

    if let Some(mut rx) = self.tasks.copy_rx.take() {
      match rx.try_recv() {
        Ok(result) => {
          let ok = match result {
            Ok(CopyMethod::Osc52(sequence)) => {
              self.terminal_output.push(sequence);
              true
            }
            Ok(CopyMethod::Command(_)) => true,
            Err(e) => {
              warn!(err = %e, "clipboard: copy failed");
              false
            }
          };
          if let View::Detail(view) = &mut self.view {
            view.show_copy_message(ok);
          }
        }
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.copy_rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          if let View::Detail(view) = &mut self.view {
            view.show_copy_message(false);
          }
        }
      }
    }

    self.expire_messages();
  }

  /// Drain queued terminal escape sequences.
  pub fn take_terminal_output(&mut self) -> Vec<String> {
    std::mem::take(&mut self.terminal_output)
  }

  /// Whether a navigation is still waiting on its fragment or the catalog.
  pub fn is_loading(&self) -> bool {
    self.pending.is_some()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::search::SearchFocus;

  const CATALOG: &str = r#"[
    {"id":"a","title":"歌枠 #1","publishedAt":"2024-01-20T12:00:00Z","viewCount":1200,"tags":["歌"]},
    {"id":"b","title":"雑談","publishedAt":"2024-03-15T10:00:00Z","tags":["スペース"],"videoId":"1xyz"},
    {"id":"c","title":"ゲーム","publishedAt":"2024-03-16T10:00:00Z","duration":"PT2H","tags":["ゲーム","歌"]}
  ]"#;

  fn site_with(catalog: &str) -> (tempfile::TempDir, SiteSource) {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("assets").join("data");
    std::fs::create_dir_all(&data).unwrap();
    std::fs::write(data.join("videos.json"), catalog).unwrap();
    let site = SiteSource::Local { root: dir.path().to_path_buf() };
    (dir, site)
  }

  fn app(site: SiteSource, route: Option<&str>) -> App {
    let mut app = App::new(site, FragmentSource::Builtin, DisplayMode::Off, route, Config::default());
    app.start();
    app
  }

  async fn settle(app: &mut App) {
    for _ in 0..500 {
      app.check_pending();
      if !app.is_loading() && app.tasks.catalog_rx.is_none() {
        return;
      }
      tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("app did not settle");
  }

  #[tokio::test]
  async fn bootstrap_from_route_replaces_entry() {
    let (_dir, site) = site_with(CATALOG);
    let mut app = app(site, Some("#calendar"));
    settle(&mut app).await;
    assert!(matches!(app.view, View::Calendar(_)));
    assert_eq!(app.router.active_nav(), Some(Page::Calendar));
    assert_eq!(app.router.history().len(), 1);
    assert_eq!(app.fragment.as_ref().and_then(|f| f.title.as_deref()), Some("配信カレンダー"));
  }

  #[tokio::test]
  async fn detail_then_back_restores_previous_view() {
    let (_dir, site) = site_with(CATALOG);
    let mut app = app(site, None);
    settle(&mut app).await;
    let View::Home(home) = &mut app.view else { panic!("expected home") };
    home.list_state.select(Some(1));
    let target = home.selected_card().unwrap().target.clone();
    assert_eq!(target, NavigationState::detail("b", Page::Home));

    app.open_card(target);
    settle(&mut app).await;
    let View::Detail(detail) = &app.view else { panic!("expected detail") };
    assert_eq!(detail.space_url.as_deref(), Some("https://x.com/i/spaces/1xyz"));
    assert_eq!(app.router.active_nav(), Some(Page::Home));
    assert_eq!(app.router.history().len(), 2);

    app.go_back();
    settle(&mut app).await;
    let View::Home(home) = &app.view else { panic!("expected home after back") };
    assert_eq!(home.list_state.selected(), Some(1));
    assert_eq!(app.router.active_nav(), Some(Page::Home));
    assert_eq!(app.router.hash(), "#home");
    assert_eq!(app.router.history().len(), 2);
  }

  #[tokio::test]
  async fn malformed_catalog_fails_the_view() {
    let (_dir, site) = site_with("{\"not\": \"an array\"}");
    let mut app = app(site, Some("#search"));
    settle(&mut app).await;
    assert!(matches!(&app.view, View::Failed(m) if m == LOAD_FAILED));
    assert!(app.catalog_failed());
  }

  #[tokio::test]
  async fn unknown_bootstrap_route_shows_notice_and_nav_still_works() {
    let (_dir, site) = site_with(CATALOG);
    let mut app = app(site, Some("#nowhere"));
    assert!(matches!(app.view, View::Notice(_)));
    assert_eq!(app.router.current(), None);
    app.goto_page(Page::Search);
    settle(&mut app).await;
    assert!(matches!(app.view, View::Search(_)));
    assert_eq!(app.router.history().len(), 2);
  }

  #[tokio::test]
  async fn missing_detail_id_renders_not_found() {
    let (_dir, site) = site_with(CATALOG);
    let mut app = app(site, Some("#video-detail?id=zzz"));
    settle(&mut app).await;
    assert!(matches!(&app.view, View::Failed(m) if m == detail::NOT_FOUND));
  }

  #[tokio::test]
  async fn search_filter_survives_leaving_the_view() {
    let (_dir, site) = site_with(CATALOG);
    let mut app = app(site, Some("#search"));
    settle(&mut app).await;
    let View::Search(search) = &mut app.view else { panic!("expected search") };
    search.input = "歌枠".into();
    search.submit();
    assert_eq!(search.cards.len(), 1);

    app.goto_page(Page::Home);
    settle(&mut app).await;
    app.goto_page(Page::Search);
    settle(&mut app).await;
    let View::Search(search) = &app.view else { panic!("expected search again") };
    assert_eq!(search.filter.search_term, "歌枠");
    assert_eq!(search.cards.len(), 1);
    assert_eq!(search.focus, SearchFocus::Input);
  }

  #[tokio::test]
  async fn only_the_latest_navigation_lands() {
    let (_dir, site) = site_with(CATALOG);
    let mut app = app(site, None);
    app.goto_page(Page::Calendar);
    app.goto_page(Page::Search);
    settle(&mut app).await;
    assert!(matches!(app.view, View::Search(_)));
    assert_eq!(app.router.active_nav(), Some(Page::Search));
  }

  #[tokio::test]
  async fn location_bar_rejects_unknown_routes() {
    let (_dir, site) = site_with(CATALOG);
    let mut app = app(site, None);
    settle(&mut app).await;
    app.open_location();
    assert_eq!(app.location, "#home");
    app.location = "#bogus".into();
    app.submit_location();
    assert_eq!(app.mode, AppMode::Location);
    assert!(app.last_error.is_some());
    assert_eq!(app.router.history().len(), 1);

    app.location = "#video-detail?id=c".into();
    app.submit_location();
    settle(&mut app).await;
    assert_eq!(app.mode, AppMode::Browse);
    assert!(matches!(app.view, View::Detail(_)));
  }

  #[tokio::test]
  async fn missing_fragment_fails_inline_and_retry_recovers() {
    let (dir, site) = site_with(CATALOG);
    let fragments = FragmentSource::Site(site.clone());
    let mut app = App::new(site, fragments, DisplayMode::Off, Some("#calendar"), Config::default());
    app.start();
    settle(&mut app).await;
    assert!(matches!(&app.view, View::Failed(m) if m == PAGE_FAILED));
    assert_eq!(app.router.active_nav(), Some(Page::Calendar));
    assert!(app.last_error.is_some());

    let pages = dir.path().join("pages");
    std::fs::create_dir_all(&pages).unwrap();
    std::fs::write(pages.join("calendar.html"), "<h2>配信カレンダー</h2>").unwrap();
    let generation = app.router.generation();
    app.retry();
    settle(&mut app).await;
    assert!(matches!(app.view, View::Calendar(_)));
    assert_eq!(app.router.history().len(), 1);
    assert!(app.router.generation() > generation);
    assert_eq!(app.fragment.as_ref().and_then(|f| f.title.as_deref()), Some("配信カレンダー"));
  }

  #[tokio::test]
  async fn osc52_copy_is_queued_for_the_draw_loop() {
    let (_dir, site) = site_with(CATALOG);
    let mut app = app(site, Some("#video-detail?id=c"));
    settle(&mut app).await;
    assert!(app.take_terminal_output().is_empty());

    let sequence = desktop::osc52_sequence("ゲーム");
    let (tx, rx) = oneshot::channel();
    tx.send(Ok(CopyMethod::Osc52(sequence.clone()))).unwrap();
    app.tasks.copy_rx = Some(rx);
    app.check_pending();

    assert_eq!(app.take_terminal_output(), vec![sequence]);
    assert!(app.take_terminal_output().is_empty());
    let View::Detail(view) = &app.view else { panic!("expected detail") };
    assert_eq!(view.copy_message(), Some(detail::COPY_OK));
  }
}
