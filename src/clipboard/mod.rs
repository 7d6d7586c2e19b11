pub mod backend;
pub mod wayland;
pub mod x11;

use anyhow::{Context, Result, anyhow};
use std::env;
use std::io::Write;
use std::process::{Command, Stdio};

pub use backend::ClipboardBackend;
pub use wayland::WaylandBackend;
pub use x11::X11Backend;

/// Create a clipboard backend based on the current display server
/// Prefers Wayland (WAYLAND_DISPLAY), then X11 (DISPLAY)
/// Returns error if no supported display server is detected
pub fn create_backend() -> Result<Box<dyn ClipboardBackend>> {
    if env::var("WAYLAND_DISPLAY").is_ok() {
        log::info!("Detected Wayland display server");
        let backend = WaylandBackend::new()?;
        return Ok(Box::new(backend));
    }

    if env::var("DISPLAY").is_ok() {
        log::info!("Detected X11 display server");
        let backend = X11Backend::new()?;
        return Ok(Box::new(backend));
    }

    Err(anyhow!(
        "No supported display server detected. Set WAYLAND_DISPLAY or DISPLAY"
    ))
}

/// Run a clipboard tool, feeding `data` through its stdin
/// Notes with embedded images easily exceed argument length limits,
/// so content is never passed on the command line.
pub(crate) fn pipe_to(program: &str, args: &[&str], data: &[u8]) -> Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("Failed to spawn {}", program))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(data)
            .with_context(|| format!("Failed to write to {} stdin", program))?;
    }

    let status = child
        .wait()
        .with_context(|| format!("Failed to wait for {}", program))?;

    if !status.success() {
        return Err(anyhow!("{} failed with status: {}", program, status));
    }

    Ok(())
}
