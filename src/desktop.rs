use std::io::Write;
use std::process::Stdio;

use anyhow::{Context, Result, bail};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

/// How a successful copy reached the clipboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyMethod {
  /// A platform clipboard program.
  Command(&'static str),
  /// The terminal's OSC 52 clipboard escape, still to be written between frames.
  Osc52(String),
}

/// Pick the platform clipboard program, if one is likely to be present.
fn clipboard_command() -> Option<(&'static str, &'static [&'static str])> {
  if cfg!(target_os = "macos") {
    return Some(("pbcopy", &[]));
  }
  if cfg!(target_os = "windows") {
    return Some(("clip", &[]));
  }
  let env = |k: &str| std::env::var_os(k).is_some_and(|v| !v.is_empty());
  if env("WAYLAND_DISPLAY") {
    return Some(("wl-copy", &[]));
  }
  if env("DISPLAY") {
    return Some(("xclip", &["-selection", "clipboard"]));
  }
  if env("WSL_DISTRO_NAME") {
    return Some(("clip.exe", &[]));
  }
  None
}

async fn copy_with_command(program: &str, args: &[&str], text: &str) -> Result<()> {
  let mut child = tokio::process::Command::new(program)
    .args(args)
    .stdin(Stdio::piped())
    .stdout(Stdio::null())
    .stderr(Stdio::null())
    .spawn()
    .with_context(|| format!("Failed to start {}", program))?;
  let mut stdin = child.stdin.take().context("Clipboard program has no stdin")?;
  stdin.write_all(text.as_bytes()).await.context("Failed to write to clipboard program")?;
  drop(stdin);
  let status = child.wait().await.context("Failed to wait for clipboard program")?;
  if !status.success() {
    bail!("{} exited with {}", program, status);
  }
  Ok(())
}

/// `ESC ] 52 ; c ; <base64> BEL`
pub fn osc52_sequence(text: &str) -> String {
  format!("\x1B]52;c;{}\x07", BASE64.encode(text))
}

/// Emit a queued escape sequence. Called from the draw loop so it never lands mid-frame.
pub fn write_escape(out: &mut impl Write, sequence: &str) -> Result<()> {
  out.write_all(sequence.as_bytes()).context("Failed to write OSC 52 sequence")?;
  out.flush().context("Failed to flush OSC 52 sequence")?;
  Ok(())
}

/// Write plain text to the system clipboard. The platform program is tried
/// first; when it is missing or fails, an OSC 52 sequence is returned for the
/// draw loop to write.
pub async fn copy_text(text: &str) -> Result<CopyMethod> {
  if let Some((program, args)) = clipboard_command() {
    match copy_with_command(program, args, text).await {
      Ok(()) => {
        info!(program, "clipboard: copied");
        return Ok(CopyMethod::Command(program));
      }
      Err(e) => warn!(program, err = %e, "clipboard: program failed, falling back to OSC 52"),
    }
  }
  info!("clipboard: queued OSC 52 sequence");
  Ok(CopyMethod::Osc52(osc52_sequence(text)))
}

/// Open a URL in the default browser without waiting for it.
pub fn open_url(url: &str) -> Result<()> {
  #[cfg(target_os = "macos")]
  let cmd = "open";
  #[cfg(not(target_os = "macos"))]
  let cmd = "xdg-open";
  let mut child = std::process::Command::new(cmd)
    .arg(url)
    .stdin(Stdio::null())
    .stdout(Stdio::null())
    .stderr(Stdio::null())
    .spawn()
    .with_context(|| format!("Failed to open browser with {}", cmd))?;
  // Reap the child in a background thread to avoid zombie processes.
  std::thread::spawn(move || {
    let _ = child.wait();
  });
  info!(url, "opened in browser");
  Ok(())
}
