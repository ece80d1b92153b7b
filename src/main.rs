mod app;
mod calendar;
mod card;
mod catalog;
mod config;
mod constants;
mod desktop;
mod detail;
mod display;
mod error;
mod format;
mod fragment;
mod graphics;
mod home;
mod input;
mod month_grid;
mod route;
mod router;
mod search;
mod site;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use directories::ProjectDirs;
use ratatui::{
  DefaultTerminal,
  crossterm::event::{self, Event, KeyEventKind},
};
use std::time::Duration;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use app::App;
use config::{APP_NAME, Config};
use display::CliDisplayMode;
use fragment::FragmentSource;
use site::SiteSource;

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Args {
  /// Site root: a base URL (https://...) or a local directory with the published layout
  #[arg(short, long)]
  site: Option<String>,

  /// Route to open first, as a URL fragment (e.g. '#calendar' or '#video-detail?id=abc')
  #[arg(short, long)]
  route: Option<String>,

  /// Thumbnail mode: 'auto', 'direct', 'ascii' or 'off' (default: auto-detect)
  #[arg(short, long, default_value = "auto")]
  display_mode: CliDisplayMode,

  /// Use the page fragments bundled with the binary instead of the site's
  #[arg(long)]
  builtin_pages: bool,

  /// Print a shell completion script and exit
  #[arg(long, value_name = "SHELL")]
  completions: Option<Shell>,
}

// --- Logging ---

/// Log to a file under the data dir; the terminal belongs to the UI.
fn init_logging() -> Option<WorkerGuard> {
  let dirs = ProjectDirs::from("", "", APP_NAME)?;
  let log_dir = dirs.data_dir();
  std::fs::create_dir_all(log_dir).ok()?;
  let appender = tracing_appender::rolling::never(log_dir, format!("{}.log", APP_NAME));
  let (writer, guard) = tracing_appender::non_blocking(appender);
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer).with_ansi(false).init();
  Some(guard)
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(shell) = args.completions {
    clap_complete::generate(shell, &mut Args::command(), APP_NAME, &mut std::io::stdout());
    return Ok(());
  }

  let _log_guard = init_logging();

  let config = Config::load();
  let root = args.site.clone().or_else(|| config.site.clone()).unwrap_or_else(|| ".".to_string());
  let site = SiteSource::from_root(&root)?;
  let fragments = if args.builtin_pages || config.builtin_pages {
    FragmentSource::Builtin
  } else {
    FragmentSource::Site(site.clone())
  };
  let display_mode = display::resolve_display_mode(args.display_mode);
  info!(site = %site.resolve(""), display = display_mode.label(), "starting");

  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    ratatui::restore();
    default_hook(info);
  }));

  let mut app = App::new(site, fragments, display_mode, args.route.as_deref(), config);
  let mut terminal = ratatui::init();
  let result = run(&mut terminal, &mut app);
  ratatui::restore();
  result
}

fn run(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
  app.start();

  loop {
    app.check_pending();
    app.expire_messages();

    terminal.draw(|frame| ui::ui(frame, app)).context("Failed to draw frame")?;
    for sequence in app.take_terminal_output() {
      desktop::write_escape(terminal.backend_mut(), &sequence)?;
    }

    if event::poll(Duration::from_millis(100))? {
      match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => input::handle_key_event(app, key),
        _ => {}
      }
    }

    if app.should_quit {
      break;
    }
  }

  info!("quit");
  Ok(())
}
