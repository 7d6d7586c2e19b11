use anyhow::{Context, Result};
use notify::{EventKind, RecursiveMode, Watcher};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::clipboard::ClipboardBackend;
use crate::embed::{self, EmbedConfig};
use crate::models::ConversionResult;
use crate::storage::Config;
use crate::vault::FsVault;

/// How long the watch loop sleeps when nothing is pending
const WATCH_IDLE_TIMEOUT: Duration = Duration::from_secs(3600);

/// Enforces a minimum interval between copies
#[derive(Debug, Clone)]
pub struct RateLimiter {
    min_interval: Duration,
    last: Option<Instant>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        RateLimiter {
            min_interval,
            last: None,
        }
    }

    /// Record an attempt at `now`; returns false if it came too soon after the
    /// last successful one
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last
            && now.saturating_duration_since(last) < self.min_interval
        {
            return false;
        }
        self.last = Some(now);
        true
    }
}

/// User-facing outcome of a copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Called again before the minimum interval elapsed
    Throttled,
    /// Copied; `skipped` images were left as links
    Copied { skipped: usize },
    /// Something went wrong; details are in the log only
    Failed,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Throttled => f.write_str("Please wait a moment before copying again"),
            Notice::Copied { skipped: 0 } => f.write_str("Markdown with embedded images copied!"),
            Notice::Copied { skipped } => write!(
                f,
                "Copied! ({} image(s) skipped - too large or unsupported)",
                skipped
            ),
            Notice::Failed => f.write_str("Error copying markdown. Check the log for details."),
        }
    }
}

/// Host session: configuration plus copy throttling
/// Constructed once per process; the configuration is read-only afterwards.
pub struct Session {
    config: Config,
    embed: EmbedConfig,
    vault_override: Option<PathBuf>,
    limiter: RateLimiter,
}

impl Session {
    /// `vault_override` takes precedence over `general.vault_root`
    pub fn new(config: Config, vault_override: Option<PathBuf>) -> Self {
        let embed = config.embed_config();
        let limiter = RateLimiter::new(config.min_interval());
        Session {
            config,
            embed,
            vault_override,
            limiter,
        }
    }

    /// Convert the note at `document` without touching it
    pub fn render(&self, document: &Path) -> Result<ConversionResult> {
        let text = fs::read_to_string(document)
            .with_context(|| format!("Failed to read note {:?}", document))?;
        let (vault, document_path) = self.open_vault(document)?;

        let result = embed::convert(&vault, &self.embed, &text, &document_path)?;
        Ok(result)
    }

    /// Convert `document` and put the result on the clipboard
    pub fn copy(&mut self, document: &Path, clipboard: &dyn ClipboardBackend) -> Notice {
        self.copy_at(document, clipboard, Instant::now())
    }

    /// [`copy`](Self::copy) with an explicit clock reading
    pub fn copy_at(
        &mut self,
        document: &Path,
        clipboard: &dyn ClipboardBackend,
        now: Instant,
    ) -> Notice {
        if !self.limiter.try_acquire(now) {
            log::debug!("Copy throttled");
            return Notice::Throttled;
        }

        let result = self.render(document).and_then(|result| {
            clipboard
                .write_text(&result.text)
                .with_context(|| format!("Failed to write to {} clipboard", clipboard.name()))?;
            Ok(result)
        });

        match result {
            Ok(result) => Notice::Copied {
                skipped: result.skipped_count(),
            },
            Err(e) => {
                log::error!("Error copying with images: {:#}", e);
                Notice::Failed
            }
        }
    }

    /// Copy `document` now and again every time it changes on disk
    /// Changes arriving while throttled are copied once the interval has passed.
    /// Runs until the watcher shuts down.
    pub fn watch(&mut self, document: &Path, clipboard: &dyn ClipboardBackend) -> Result<()> {
        let document = fs::canonicalize(document)
            .with_context(|| format!("Failed to open note {:?}", document))?;
        let dir = document
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Note {:?} has no parent directory", document))?;

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let _ = tx.send(res);
        })
        .context("Failed to create file watcher")?;

        // Watch the directory rather than the file so editors that save by
        // writing a temp file and renaming it are still seen
        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {:?}", dir))?;
        log::info!("Watching {:?} for changes", document);

        let mut pending = true;
        loop {
            if pending {
                let notice = self.copy(&document, clipboard);
                if notice != Notice::Throttled {
                    eprintln!("{}", notice);
                    pending = false;
                }
            }

            let timeout = if pending {
                self.config.min_interval()
            } else {
                WATCH_IDLE_TIMEOUT
            };

            match rx.recv_timeout(timeout) {
                Ok(Ok(event)) => {
                    if is_change_to(&event, &document) {
                        log::debug!("Note changed: {:?}", event.kind);
                        pending = true;
                    }
                }
                Ok(Err(e)) => log::warn!("File watcher error: {}", e),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        Ok(())
    }

    /// Open the vault for `document` and find the note's vault-relative path
    fn open_vault(&self, document: &Path) -> Result<(FsVault, String)> {
        let root = match self
            .vault_override
            .as_ref()
            .or(self.config.general.vault_root.as_ref())
        {
            Some(root) => root.clone(),
            None => match document.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            },
        };

        let vault = FsVault::new(&root)?;
        let document_path = match vault.relative_path(document) {
            Some(path) => path,
            None => {
                log::warn!(
                    "Note {:?} is outside the vault {:?}; resolving links from the vault root",
                    document,
                    vault.root()
                );
                document
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default()
            }
        };

        Ok((vault, document_path))
    }
}

fn is_change_to(event: &notify::Event, document: &Path) -> bool {
    matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
        && event
            .paths
            .iter()
            .any(|path| path.file_name() == document.file_name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingClipboard {
        writes: Mutex<Vec<String>>,
        fail: bool,
    }

    impl ClipboardBackend for RecordingClipboard {
        fn write_text(&self, text: &str) -> Result<()> {
            if self.fail {
                anyhow::bail!("clipboard unavailable");
            }
            self.writes.lock().unwrap().push(text.to_string());
            Ok(())
        }

        fn name(&self) -> &'static str {
            "Recording"
        }
    }

    fn write(dir: &Path, path: &str, data: &[u8]) -> PathBuf {
        let full = dir.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(&full, data).unwrap();
        full
    }

    #[test]
    fn test_rate_limiter() {
        let mut limiter = RateLimiter::new(Duration::from_millis(500));
        let start = Instant::now();

        assert!(limiter.try_acquire(start));
        assert!(!limiter.try_acquire(start + Duration::from_millis(100)));
        assert!(!limiter.try_acquire(start + Duration::from_millis(499)));
        assert!(limiter.try_acquire(start + Duration::from_millis(500)));
        // Throttled attempts do not push the window forward
        assert!(!limiter.try_acquire(start + Duration::from_millis(900)));
        assert!(limiter.try_acquire(start + Duration::from_millis(1000)));
    }

    #[test]
    fn test_rate_limiter_disabled() {
        let mut limiter = RateLimiter::new(Duration::ZERO);
        let now = Instant::now();
        assert!(limiter.try_acquire(now));
        assert!(limiter.try_acquire(now));
    }

    #[test]
    fn test_notice_messages() {
        assert_eq!(
            Notice::Copied { skipped: 0 }.to_string(),
            "Markdown with embedded images copied!"
        );
        assert_eq!(
            Notice::Copied { skipped: 2 }.to_string(),
            "Copied! (2 image(s) skipped - too large or unsupported)"
        );
        assert_eq!(
            Notice::Throttled.to_string(),
            "Please wait a moment before copying again"
        );
        assert!(!Notice::Failed.to_string().contains("clipboard"));
    }

    #[test]
    fn test_render_with_vault_root() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "attachments/chart.png", b"png-bytes");
        let note = write(
            dir.path(),
            "notes/report.md",
            b"# Report\n![[chart.png]]\n![[missing.png]]\n",
        );

        let session = Session::new(Config::default(), Some(dir.path().to_path_buf()));
        let result = session.render(&note).unwrap();

        assert!(result.text.starts_with("# Report\n![chart](data:image/png;base64,"));
        assert!(result.text.ends_with("\n![[missing.png]]\n"));
        assert_eq!(result.skipped_count(), 1);

        // The note on disk is untouched
        assert_eq!(
            fs::read_to_string(&note).unwrap(),
            "# Report\n![[chart.png]]\n![[missing.png]]\n"
        );
    }

    #[test]
    fn test_render_defaults_to_note_folder() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "img/a.gif", b"GIF89a");
        let note = write(dir.path(), "note.md", b"![a](img/a.gif)");

        let session = Session::new(Config::default(), None);
        let result = session.render(&note).unwrap();
        assert_eq!(result.text, "![a](data:image/gif;base64,R0lGODlh)");
    }

    #[test]
    fn test_copy_writes_clipboard_and_throttles() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.png", b"png");
        let note = write(dir.path(), "note.md", b"![[a.png]] ![[b.png]]");

        let clipboard = RecordingClipboard::default();
        let mut session = Session::new(Config::default(), None);
        let start = Instant::now();

        let notice = session.copy_at(&note, &clipboard, start);
        assert_eq!(notice, Notice::Copied { skipped: 1 });
        assert_eq!(clipboard.writes.lock().unwrap().len(), 1);

        let notice = session.copy_at(&note, &clipboard, start + Duration::from_millis(10));
        assert_eq!(notice, Notice::Throttled);
        assert_eq!(clipboard.writes.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_copy_failure_is_generic() {
        let dir = TempDir::new().unwrap();
        let note = write(dir.path(), "note.md", b"text");
        let clipboard = RecordingClipboard {
            fail: true,
            ..Default::default()
        };

        let mut session = Session::new(Config::default(), None);
        assert_eq!(session.copy(&note, &clipboard), Notice::Failed);

        let missing = dir.path().join("missing.md");
        let mut session = Session::new(Config::default(), None);
        assert_eq!(
            session.copy(&missing, &RecordingClipboard::default()),
            Notice::Failed
        );
    }

    #[test]
    fn test_is_change_to() {
        let doc = PathBuf::from("/vault/note.md");
        let modify = notify::Event::new(EventKind::Modify(notify::event::ModifyKind::Any))
            .add_path(PathBuf::from("/vault/note.md"));
        let other = notify::Event::new(EventKind::Modify(notify::event::ModifyKind::Any))
            .add_path(PathBuf::from("/vault/other.md"));
        let remove = notify::Event::new(EventKind::Remove(notify::event::RemoveKind::Any))
            .add_path(PathBuf::from("/vault/note.md"));

        assert!(is_change_to(&modify, &doc));
        assert!(!is_change_to(&other, &doc));
        assert!(!is_change_to(&remove, &doc));
    }
}
