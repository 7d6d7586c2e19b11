//! Rewrites image references in a note into inline `data:` URIs.
//!
//! [`convert`] scans the text once, then resolves, validates and encodes each
//! reference in turn: wiki embeds first, then Markdown images, each group in
//! document order. A reference that cannot be embedded is left as-is and
//! reported with its [`SkipReason`]; only a failure of the vault's link
//! resolution aborts the whole call.

pub mod sanitize;
pub mod scanner;

use std::ops::Range;

use crate::image::{EncodedImage, ImageFormat};
use crate::models::reference::truncate_chars;
use crate::models::{
    ConversionResult, ImageReference, ReferenceKind, ReferenceReport, ResolvedFile, SkipReason,
};
use crate::vault::Vault;

pub use sanitize::{sanitize_alt_text, wiki_alt_text};
pub use scanner::scan;

/// Default per-image size limit (10 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Read-only settings for a conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedConfig {
    /// Files larger than this many bytes are skipped
    pub max_file_size: u64,
    /// Formats that may be embedded
    pub allowed_formats: Vec<ImageFormat>,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        EmbedConfig {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_formats: ImageFormat::ALL.to_vec(),
        }
    }
}

impl EmbedConfig {
    /// Allowed format for a resolved file's extension
    pub fn allowed_format(&self, extension: &str) -> Option<ImageFormat> {
        ImageFormat::from_extension(extension).filter(|f| self.allowed_formats.contains(f))
    }

    fn check_size(&self, size: u64) -> Result<(), SkipReason> {
        if size > self.max_file_size {
            return Err(SkipReason::FileTooLarge {
                size,
                limit: self.max_file_size,
            });
        }
        Ok(())
    }
}

/// Failure of a whole conversion
/// Details stay in the error chain for logging; the message is safe to show users.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("failed to resolve image links")]
    Resolution {
        #[source]
        source: anyhow::Error,
    },
}

/// Embed every resolvable image referenced by `text`
///
/// `document_path` is the note's vault-relative path, used as the base for
/// relative links. The input is never modified; the rewritten text is returned
/// only when the whole conversion succeeds.
pub fn convert<V: Vault>(
    vault: &V,
    config: &EmbedConfig,
    text: &str,
    document_path: &str,
) -> Result<ConversionResult, ConvertError> {
    let references = scan(text);
    log::debug!(
        "Found {} image reference(s) in {}",
        references.len(),
        document_path
    );

    let mut replacements: Vec<(Range<usize>, String)> = Vec::new();
    let mut reports = Vec::with_capacity(references.len());

    for reference in references {
        let outcome = match resolve(vault, &reference, document_path)? {
            Some(file) => embed_file(vault, config, file),
            None => Err(SkipReason::ReferenceUnresolved),
        };

        let outcome = match outcome {
            Ok(encoded) => {
                replacements.push((reference.span.clone(), replacement(&reference, &encoded)));
                Ok(())
            }
            Err(reason) => {
                log_skip(&reference, &reason);
                Err(reason)
            }
        };

        reports.push(ReferenceReport { reference, outcome });
    }

    let result = ConversionResult {
        text: splice(text, replacements),
        reports,
    };
    log::info!(
        "Embedded {} image(s), skipped {} in {}",
        result.embedded_count(),
        result.skipped_count(),
        document_path
    );
    Ok(result)
}

fn resolve<V: Vault>(
    vault: &V,
    reference: &ImageReference,
    document_path: &str,
) -> Result<Option<V::File>, ConvertError> {
    vault
        .resolve_link(&reference.path, document_path)
        .map_err(|source| ConvertError::Resolution { source })
}

/// Validate a resolved file and encode its content
fn embed_file<V: Vault>(
    vault: &V,
    config: &EmbedConfig,
    file: V::File,
) -> Result<EncodedImage, SkipReason> {
    let extension = vault.extension_of(&file);
    let format = config
        .allowed_format(&extension)
        .ok_or_else(|| SkipReason::DisallowedExtension {
            extension: extension.clone(),
        })?;

    let size = vault.stat_size(&file).map_err(read_failure)?;
    let resolved = ResolvedFile {
        file,
        extension,
        size,
    };
    config.check_size(resolved.size)?;

    let data = vault.read_binary(&resolved.file).map_err(read_failure)?;
    // The file may have grown since it was stat'ed
    config.check_size(data.len() as u64)?;

    log::debug!(
        "Encoding {} byte {} image",
        data.len(),
        resolved.extension
    );
    Ok(EncodedImage::encode(format, &data))
}

fn read_failure(err: anyhow::Error) -> SkipReason {
    SkipReason::ReadFailure(format!("{:#}", err))
}

/// Inline image text for a successfully encoded reference
fn replacement(reference: &ImageReference, encoded: &EncodedImage) -> String {
    let alt = match reference.kind {
        ReferenceKind::Wiki => sanitize_alt_text(wiki_alt_text(&reference.path)),
        ReferenceKind::Markdown => sanitize_alt_text(reference.alt.as_deref().unwrap_or("")),
    };
    format!("![{}]({})", alt, encoded)
}

/// Build the output from the original text and non-overlapping replacements
fn splice(text: &str, mut replacements: Vec<(Range<usize>, String)>) -> String {
    replacements.sort_by_key(|(span, _)| span.start);

    let extra: usize = replacements.iter().map(|(_, r)| r.len()).sum();
    let mut out = String::with_capacity(text.len() + extra);
    let mut cursor = 0;
    for (span, replacement) in replacements {
        out.push_str(&text[cursor..span.start]);
        out.push_str(&replacement);
        cursor = span.end;
    }
    out.push_str(&text[cursor..]);
    out
}

fn log_skip(reference: &ImageReference, reason: &SkipReason) {
    match reason {
        SkipReason::ReferenceUnresolved => {
            log::warn!("Image not found: {}", reference.path_preview());
        }
        SkipReason::DisallowedExtension { extension } => {
            log::warn!("Unsupported file type: {}", extension);
        }
        SkipReason::FileTooLarge { size, .. } => {
            let name = reference.path.rsplit('/').next().unwrap_or(&reference.path);
            log::warn!(
                "File too large ({}MB): {}",
                (*size as f64 / 1024.0 / 1024.0).round(),
                truncate_chars(name, 50)
            );
        }
        SkipReason::ReadFailure(message) => {
            log::error!("Failed to process image {}: {}", reference.path_preview(), message);
        }
    }
}
