use ratatui::style::Color;

pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub accent: Color,
  pub muted: Color,
  pub border: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  pub stripe_bg: Color,
  pub status: Color,
  pub error: Color,
  pub key_fg: Color,
  pub key_bg: Color,
  /// Background of calendar days that have entries.
  pub marker_bg: Color,
  pub tag: Color,
  pub link: Color,
}

pub static THEMES: [Theme; 3] = [
  Theme {
    name: "Sakura",
    bg: Color::Rgb(30, 24, 30),
    fg: Color::Rgb(236, 226, 232),
    accent: Color::Rgb(244, 143, 177),
    muted: Color::Rgb(150, 132, 142),
    border: Color::Rgb(90, 70, 84),
    highlight_fg: Color::Rgb(30, 24, 30),
    highlight_bg: Color::Rgb(244, 143, 177),
    stripe_bg: Color::Rgb(38, 31, 38),
    status: Color::Rgb(255, 204, 128),
    error: Color::Rgb(255, 110, 110),
    key_fg: Color::Rgb(30, 24, 30),
    key_bg: Color::Rgb(206, 160, 190),
    marker_bg: Color::Rgb(92, 52, 74),
    tag: Color::Rgb(186, 160, 255),
    link: Color::Rgb(128, 203, 196),
  },
  Theme {
    name: "Midnight",
    bg: Color::Rgb(16, 20, 32),
    fg: Color::Rgb(220, 226, 240),
    accent: Color::Rgb(122, 162, 247),
    muted: Color::Rgb(110, 120, 150),
    border: Color::Rgb(56, 64, 92),
    highlight_fg: Color::Rgb(16, 20, 32),
    highlight_bg: Color::Rgb(122, 162, 247),
    stripe_bg: Color::Rgb(22, 27, 42),
    status: Color::Rgb(224, 175, 104),
    error: Color::Rgb(247, 118, 142),
    key_fg: Color::Rgb(16, 20, 32),
    key_bg: Color::Rgb(160, 170, 200),
    marker_bg: Color::Rgb(40, 60, 110),
    tag: Color::Rgb(187, 154, 247),
    link: Color::Rgb(125, 207, 255),
  },
  Theme {
    name: "Paper",
    bg: Color::Rgb(250, 247, 240),
    fg: Color::Rgb(50, 46, 42),
    accent: Color::Rgb(196, 72, 110),
    muted: Color::Rgb(140, 132, 122),
    border: Color::Rgb(200, 192, 180),
    highlight_fg: Color::Rgb(250, 247, 240),
    highlight_bg: Color::Rgb(196, 72, 110),
    stripe_bg: Color::Rgb(242, 238, 228),
    status: Color::Rgb(170, 110, 20),
    error: Color::Rgb(190, 40, 40),
    key_fg: Color::Rgb(250, 247, 240),
    key_bg: Color::Rgb(120, 112, 104),
    marker_bg: Color::Rgb(246, 214, 224),
    tag: Color::Rgb(110, 80, 170),
    link: Color::Rgb(20, 110, 140),
  },
];

pub fn theme_index(name: Option<&str>) -> usize {
  name.and_then(|n| THEMES.iter().position(|t| t.name.eq_ignore_ascii_case(n))).unwrap_or(0)
}
