use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

use crate::constants::constants;
use crate::error::NetworkError;
use crate::site::SiteSource;

static TEXT_BLOCKS: LazyLock<Selector> =
  LazyLock::new(|| Selector::parse("h1, h2, h3, p, li").expect("static fragment selector"));

/// Banner text extracted from a page's markup fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
  pub page: String,
  pub title: Option<String>,
  pub lines: Vec<String>,
}

/// Where page fragments come from.
#[derive(Debug, Clone)]
pub enum FragmentSource {
  /// `pages/<name>.html` under the site root.
  Site(SiteSource),
  /// The fragment set compiled into the binary.
  Builtin,
}

fn builtin_markup(page: &str) -> Option<&'static str> {
  match page {
    "home" => Some(include_str!("../pages/home.html")),
    "calendar" => Some(include_str!("../pages/calendar.html")),
    "search" => Some(include_str!("../pages/search.html")),
    "video-detail" => Some(include_str!("../pages/video-detail.html")),
    _ => None,
  }
}

impl FragmentSource {
  pub async fn fetch(&self, page: &str) -> Result<Fragment, NetworkError> {
    let markup = match self {
      FragmentSource::Site(site) => site.fetch_text(&format!("{}/{}.html", constants().pages_dir, page), false).await?,
      FragmentSource::Builtin => builtin_markup(page)
        .ok_or_else(|| NetworkError::File {
          path: format!("builtin:{}", page),
          source: std::io::Error::new(std::io::ErrorKind::NotFound, "no built-in fragment"),
        })?
        .to_string(),
    };
    let fragment = parse_fragment(page, &markup);
    debug!(page, lines = fragment.lines.len(), "fragment: loaded");
    Ok(fragment)
  }
}

fn element_text(el: ElementRef<'_>) -> String {
  el.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

/// Pull headings and paragraphs out of a fragment. The first `h1`/`h2` becomes the title.
pub fn parse_fragment(page: &str, markup: &str) -> Fragment {
  let html = Html::parse_fragment(markup);
  let mut fragment = Fragment { page: page.to_string(), ..Fragment::default() };
  for el in html.select(&TEXT_BLOCKS) {
    let text = element_text(el);
    if text.is_empty() {
      continue;
    }
    let is_heading = matches!(el.value().name(), "h1" | "h2");
    if is_heading && fragment.title.is_none() {
      fragment.title = Some(text);
    } else {
      fragment.lines.push(text);
    }
  }
  fragment
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extracts_title_and_lines() {
    let f = parse_fragment("home", "<div><h2> Home  page </h2><p>one</p><ul><li>two</li></ul><p>  </p></div>");
    assert_eq!(f.title.as_deref(), Some("Home page"));
    assert_eq!(f.lines, vec!["one", "two"]);
  }

  #[test]
  fn markup_without_text_is_empty() {
    let f = parse_fragment("x", "<div id=\"calendar\"></div>");
    assert_eq!(f.title, None);
    assert!(f.lines.is_empty());
  }

  #[tokio::test]
  async fn builtin_pages_exist_for_every_route() {
    for page in ["home", "calendar", "search", "video-detail"] {
      let f = FragmentSource::Builtin.fetch(page).await.unwrap();
      assert!(f.title.is_some(), "{page}");
    }
    assert!(FragmentSource::Builtin.fetch("settings").await.is_err());
  }

  #[tokio::test]
  async fn site_fragment_missing_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let source = FragmentSource::Site(SiteSource::from_root(dir.path().to_str().unwrap()).unwrap());
    assert!(source.fetch("home").await.is_err());
    std::fs::create_dir_all(dir.path().join("pages")).unwrap();
    std::fs::write(dir.path().join("pages/home.html"), "<h1>Hi</h1>").unwrap();
    assert_eq!(source.fetch("home").await.unwrap().title.as_deref(), Some("Hi"));
  }
}
