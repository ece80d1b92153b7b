use clap::ValueEnum;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliDisplayMode {
  Auto,
  Direct,
  Ascii,
  Off,
}

/// How thumbnails are drawn into the cell grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
  Ascii,
  Direct,
  /// Text placeholder only; nothing is fetched.
  Off,
}

impl DisplayMode {
  pub fn label(self) -> &'static str {
    match self {
      DisplayMode::Ascii => "ASCII",
      DisplayMode::Direct => "Half-block",
      DisplayMode::Off => "Off",
    }
  }

  pub fn shows_images(self) -> bool {
    self != DisplayMode::Off
  }
}

/// Detect the best thumbnail mode the terminal supports.
///
/// - Direct: `COLORTERM` is `truecolor` or `24bit`
/// - Ascii: fallback
pub fn detect_display_mode() -> DisplayMode {
  let colorterm = std::env::var("COLORTERM").unwrap_or_default().to_lowercase();
  if colorterm == "truecolor" || colorterm == "24bit" {
    return DisplayMode::Direct;
  }
  DisplayMode::Ascii
}

pub fn resolve_display_mode(cli: CliDisplayMode) -> DisplayMode {
  match cli {
    CliDisplayMode::Auto => detect_display_mode(),
    CliDisplayMode::Direct => DisplayMode::Direct,
    CliDisplayMode::Ascii => DisplayMode::Ascii,
    CliDisplayMode::Off => DisplayMode::Off,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn explicit_modes_bypass_detection() {
    assert_eq!(resolve_display_mode(CliDisplayMode::Ascii), DisplayMode::Ascii);
    assert_eq!(resolve_display_mode(CliDisplayMode::Off), DisplayMode::Off);
    assert!(!DisplayMode::Off.shows_images());
  }
}
