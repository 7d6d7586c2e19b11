//! mdembed - copy Markdown notes with their images embedded inline
//!
//! This library exports the core modules for testing and potential reuse.

pub mod app;
pub mod clipboard;
pub mod embed;
pub mod image;
pub mod logging;
pub mod models;
pub mod storage;
pub mod vault;

pub use embed::{ConvertError, EmbedConfig, convert};
pub use models::{ConversionResult, ImageReference, ReferenceKind, SkipReason};
pub use vault::{FsVault, MemoryVault, Vault};
