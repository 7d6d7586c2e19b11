use anyhow::{Result, anyhow};
use std::collections::{BTreeMap, HashMap, HashSet};

use super::backend::Vault;
use super::{is_bare_name, link_candidates, pick_by_name};

/// In-memory vault keyed by vault-relative path
/// Resolves links with the same rules as [`FsVault`](super::FsVault) and can be told
/// to fail, so hosts and tests can exercise every conversion path without a disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryVault {
    files: BTreeMap<String, Vec<u8>>,
    reported_sizes: HashMap<String, u64>,
    failing_reads: HashSet<String>,
    failing_resolution: bool,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file
    pub fn insert(&mut self, path: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), data.into());
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with_file(mut self, path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.insert(path, data);
        self
    }

    /// Report `size` from `stat_size` for `path` instead of its real length
    pub fn report_size(&mut self, path: impl Into<String>, size: u64) {
        self.reported_sizes.insert(path.into(), size);
    }

    /// Make `stat_size` and `read_binary` fail for `path`
    pub fn fail_reads(&mut self, path: impl Into<String>) {
        self.failing_reads.insert(path.into());
    }

    /// Make every `resolve_link` call fail
    pub fn fail_resolution(&mut self) {
        self.failing_resolution = true;
    }

    fn check_readable(&self, path: &str) -> Result<&[u8]> {
        if self.failing_reads.contains(path) {
            return Err(anyhow!("I/O error reading {}", path));
        }
        self.files
            .get(path)
            .map(Vec::as_slice)
            .ok_or_else(|| anyhow!("{} was removed from the vault", path))
    }
}

impl Vault for MemoryVault {
    type File = String;

    fn resolve_link(&self, link: &str, base_path: &str) -> Result<Option<String>> {
        if self.failing_resolution {
            return Err(anyhow!("vault index unavailable"));
        }

        for candidate in link_candidates(link, base_path) {
            if self.files.contains_key(&candidate) {
                return Ok(Some(candidate));
            }
        }

        if is_bare_name(link) {
            let found = pick_by_name(self.files.keys().map(String::as_str), link);
            return Ok(found.map(str::to_string));
        }

        Ok(None)
    }

    fn stat_size(&self, file: &String) -> Result<u64> {
        let data = self.check_readable(file)?;
        Ok(self
            .reported_sizes
            .get(file)
            .copied()
            .unwrap_or(data.len() as u64))
    }

    fn read_binary(&self, file: &String) -> Result<Vec<u8>> {
        self.check_readable(file).map(<[u8]>::to_vec)
    }

    fn extension_of(&self, file: &String) -> String {
        let name = file.rsplit('/').next().unwrap_or(file);
        name.rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default()
    }
}
