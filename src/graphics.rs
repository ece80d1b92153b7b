use image::{DynamicImage, imageops::FilterType};
use ratatui::{
  buffer::Buffer,
  layout::Rect,
  style::{Color, Style},
  widgets::Widget,
};

use crate::display::DisplayMode;

// --- Thumbnail Widget ---

pub struct ThumbnailWidget<'a> {
  pub image: &'a DynamicImage,
  pub display_mode: DisplayMode,
}

const ASCII_CHARS: [&str; 10] = [" ", ".", ":", "-", "=", "+", "*", "#", "%", "@"];

impl Widget for ThumbnailWidget<'_> {
  fn render(self, area: Rect, buf: &mut Buffer) {
    if area.is_empty() {
      return;
    }
    // Image is already fitted by the caller (see `fit_thumbnail`).
    match self.display_mode {
      DisplayMode::Direct => render_direct(self.image, area, buf),
      DisplayMode::Ascii => render_ascii(self.image, area, buf),
      DisplayMode::Off => {}
    }
  }
}

/// Scale an image to fit `area` for the given mode, keeping aspect ratio.
///
/// Half-block output packs two pixel rows per cell. ASCII output gets one
/// pixel per cell, squashed vertically because cells are about twice as tall as wide.
pub fn fit_thumbnail(image: &DynamicImage, area: Rect, mode: DisplayMode) -> DynamicImage {
  let w = (area.width as u32).max(1);
  let h = (area.height as u32 * 2).max(1);
  let resized = image.resize(w, h, FilterType::Triangle);
  match mode {
    DisplayMode::Ascii => {
      resized.resize_exact(resized.width(), resized.height().div_ceil(2).max(1), FilterType::Triangle)
    }
    DisplayMode::Direct | DisplayMode::Off => resized,
  }
}

fn cell_origin(area: Rect, img_w: u32, img_h: u32) -> (u16, u16) {
  let offset_x = (area.width as u32).saturating_sub(img_w) / 2;
  let offset_y = (area.height as u32).saturating_sub(img_h) / 2;
  (
    area.x.saturating_add(offset_x.min(u16::MAX as u32) as u16),
    area.y.saturating_add(offset_y.min(u16::MAX as u32) as u16),
  )
}

fn render_direct(image: &DynamicImage, area: Rect, buf: &mut Buffer) {
  let rgb = image.to_rgb8();
  let img_w = rgb.width().min(area.width as u32);
  let img_h = rgb.height();
  let cell_h = img_h.div_ceil(2).min(area.height as u32);
  let (ox, oy) = cell_origin(area, img_w, cell_h);

  for y in 0..cell_h {
    for x in 0..img_w {
      let upper = rgb.get_pixel(x, y * 2);
      let lower_y = y * 2 + 1;
      let fg = Color::Rgb(upper[0], upper[1], upper[2]);
      let bg = if lower_y < img_h {
        let lower = rgb.get_pixel(x, lower_y);
        Color::Rgb(lower[0], lower[1], lower[2])
      } else {
        Color::Reset
      };
      buf.set_string(ox + x as u16, oy + y as u16, "▀", Style::default().fg(fg).bg(bg));
    }
  }
}

fn render_ascii(image: &DynamicImage, area: Rect, buf: &mut Buffer) {
  let luma = image.to_luma8();
  let img_w = luma.width().min(area.width as u32);
  let img_h = luma.height().min(area.height as u32);
  let (ox, oy) = cell_origin(area, img_w, img_h);

  for y in 0..img_h {
    for x in 0..img_w {
      buf.set_string(ox + x as u16, oy + y as u16, ascii_glyph(luma.get_pixel(x, y)[0]), Style::default());
    }
  }
}

fn ascii_glyph(luma: u8) -> &'static str {
  let idx = ((luma as f32 / 255.0) * (ASCII_CHARS.len() - 1) as f32).round() as usize;
  ASCII_CHARS[idx.min(ASCII_CHARS.len() - 1)]
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::{Rgb, RgbImage};

  fn solid(w: u32, h: u32, px: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb(px)))
  }

  #[test]
  fn glyph_ramp_ends() {
    assert_eq!(ascii_glyph(0), " ");
    assert_eq!(ascii_glyph(255), "@");
  }

  #[test]
  fn direct_render_stays_inside_area() {
    let area = Rect::new(2, 1, 10, 4);
    let mut buf = Buffer::empty(Rect::new(0, 0, 20, 10));
    let image = fit_thumbnail(&solid(64, 36, [255, 0, 0]), area, DisplayMode::Direct);
    assert!(image.width() <= 10 && image.height() <= 8);
    ThumbnailWidget { image: &image, display_mode: DisplayMode::Direct }.render(area, &mut buf);
    assert_eq!(buf[(0, 0)].symbol(), " ");
    let painted: Vec<(u16, u16)> =
      (0..20u16).flat_map(|x| (0..10u16).map(move |y| (x, y))).filter(|&p| buf[p].symbol() == "▀").collect();
    assert!(!painted.is_empty());
    for (x, y) in painted {
      assert!(area.contains((x, y).into()));
    }
  }

  #[test]
  fn off_mode_draws_nothing() {
    let area = Rect::new(0, 0, 8, 4);
    let mut buf = Buffer::empty(area);
    ThumbnailWidget { image: &solid(8, 8, [0, 0, 0]), display_mode: DisplayMode::Off }.render(area, &mut buf);
    assert!(buf.content().iter().all(|c| c.symbol() == " "));
  }
}
