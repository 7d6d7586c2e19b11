use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::backend::Vault;
use super::{is_bare_name, link_candidates, pick_by_name};

/// A file resolved inside an [`FsVault`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultFile {
    /// Canonical absolute path
    path: PathBuf,
    /// Vault-relative path, `/`-separated
    relative: String,
}

impl VaultFile {
    pub fn relative(&self) -> &str {
        &self.relative
    }
}

/// A directory on disk treated as a vault of notes and attachments
/// Links never resolve outside the root, including through symlinks.
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    /// Open a vault rooted at `root`
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let root = fs::canonicalize(root)
            .with_context(|| format!("Failed to open vault directory {:?}", root))?;
        if !root.is_dir() {
            anyhow::bail!("Vault root {:?} is not a directory", root);
        }

        log::debug!("Opened vault at {:?}", root);
        Ok(FsVault { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Vault-relative `/`-separated form of `path`, if it lies inside the vault
    pub fn relative_path(&self, path: &Path) -> Option<String> {
        let canonical = fs::canonicalize(path).ok()?;
        let relative = canonical.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }

    /// Look up an exact vault-relative path
    fn lookup(&self, relative: &str) -> Option<VaultFile> {
        let candidate = self.root.join(relative);
        let canonical = match fs::canonicalize(&candidate) {
            Ok(path) => path,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    log::debug!("Cannot access {}: {}", relative, e);
                }
                return None;
            }
        };

        if !canonical.starts_with(&self.root) {
            log::warn!("Ignoring link that leaves the vault: {}", relative);
            return None;
        }
        if !canonical.is_file() {
            return None;
        }

        Some(VaultFile {
            path: canonical,
            relative: relative.to_string(),
        })
    }

    /// Search the whole vault for a file called `name`
    fn find_by_name(&self, name: &str) -> Result<Option<VaultFile>> {
        let mut files = Vec::new();
        collect_files(&self.root, "", &mut files)
            .context("Failed to list vault files")?;

        let found = pick_by_name(files.iter().map(String::as_str), name);
        Ok(found.and_then(|relative| self.lookup(relative)))
    }
}

impl Vault for FsVault {
    type File = VaultFile;

    fn resolve_link(&self, link: &str, base_path: &str) -> Result<Option<VaultFile>> {
        for candidate in link_candidates(link, base_path) {
            if let Some(file) = self.lookup(&candidate) {
                return Ok(Some(file));
            }
        }

        if is_bare_name(link) {
            return self.find_by_name(link);
        }

        Ok(None)
    }

    fn stat_size(&self, file: &VaultFile) -> Result<u64> {
        let metadata = fs::metadata(&file.path)
            .with_context(|| format!("Failed to stat {}", file.relative))?;
        Ok(metadata.len())
    }

    fn read_binary(&self, file: &VaultFile) -> Result<Vec<u8>> {
        fs::read(&file.path).with_context(|| format!("Failed to read {}", file.relative))
    }

    fn extension_of(&self, file: &VaultFile) -> String {
        file.path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }
}

/// Recursively collect vault-relative file paths, skipping hidden entries
fn collect_files(dir: &Path, prefix: &str, out: &mut Vec<String>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }

        let relative = if prefix.is_empty() {
            name
        } else {
            format!("{}/{}", prefix, name)
        };

        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            if let Err(e) = collect_files(&entry.path(), &relative, out) {
                log::warn!("Skipping unreadable vault folder {}: {}", relative, e);
            }
        } else if file_type.is_file() {
            out.push(relative);
        }
    }
    Ok(())
}
