use anyhow::Result;

/// File storage capabilities the embedder needs from its host
/// Implementations resolve note-relative links and read image files.
/// Paths handed to a vault are vault-relative and `/`-separated.
pub trait Vault {
    /// Handle to a resolved file
    type File;

    /// Resolve a possibly-relative link from the note at `base_path`
    /// Returns `Ok(None)` when no file matches. An `Err` means the vault itself
    /// failed and aborts the whole conversion.
    fn resolve_link(&self, link: &str, base_path: &str) -> Result<Option<Self::File>>;

    /// File size in bytes, without reading the content
    fn stat_size(&self, file: &Self::File) -> Result<u64>;

    /// Read the full file content
    fn read_binary(&self, file: &Self::File) -> Result<Vec<u8>>;

    /// Lowercase file extension without the leading dot
    fn extension_of(&self, file: &Self::File) -> String;
}
