use anyhow::{Context, Result};
use std::process::Command;

use super::backend::ClipboardBackend;
use super::pipe_to;

/// X11 clipboard backend using xclip
/// Writes to the CLIPBOARD selection (not PRIMARY)
pub struct X11Backend;

impl X11Backend {
    pub fn new() -> Result<Self> {
        Command::new("xclip")
            .arg("-version")
            .output()
            .context("xclip not found. Install the xclip package")?;

        log::debug!("X11Backend initialized successfully");
        Ok(X11Backend)
    }
}

impl ClipboardBackend for X11Backend {
    fn write_text(&self, text: &str) -> Result<()> {
        pipe_to(
            "xclip",
            &["-selection", "clipboard", "-target", "UTF8_STRING"],
            text.as_bytes(),
        )?;
        log::debug!("Wrote {} bytes text to X11 clipboard", text.len());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "X11"
    }
}
