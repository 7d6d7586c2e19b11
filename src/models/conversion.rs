use super::reference::ImageReference;

/// Why a reference was left untouched in the output
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("image not found")]
    ReferenceUnresolved,

    #[error("unsupported file type: {extension}")]
    DisallowedExtension { extension: String },

    #[error("file too large ({size} bytes, limit {limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("failed to read image: {0}")]
    ReadFailure(String),
}

/// A reference that resolved to a file in the vault
/// Created and consumed within a single resolution step
#[derive(Debug, Clone)]
pub struct ResolvedFile<F> {
    pub file: F,
    /// Lowercase extension without the leading dot
    pub extension: String,
    pub size: u64,
}

/// What happened to a single reference during conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceReport {
    pub reference: ImageReference,
    pub outcome: Result<(), SkipReason>,
}

impl ReferenceReport {
    pub fn is_embedded(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Rewritten document text plus per-reference outcomes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    pub text: String,
    /// Reports in processing order: wiki references first, then Markdown references
    pub reports: Vec<ReferenceReport>,
}

impl ConversionResult {
    /// Number of references left in place because they could not be embedded
    pub fn skipped_count(&self) -> usize {
        self.reports.iter().filter(|r| !r.is_embedded()).count()
    }

    /// Number of references replaced by inline data
    pub fn embedded_count(&self) -> usize {
        self.reports.iter().filter(|r| r.is_embedded()).count()
    }

    /// Iterate over skipped references with their reasons
    pub fn skipped(&self) -> impl Iterator<Item = (&ImageReference, &SkipReason)> {
        self.reports.iter().filter_map(|r| match &r.outcome {
            Ok(()) => None,
            Err(reason) => Some((&r.reference, reason)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReferenceKind;

    fn reference(path: &str) -> ImageReference {
        ImageReference {
            kind: ReferenceKind::Wiki,
            span: 0..path.len() + 5,
            raw: format!("![[{}]]", path),
            path: path.to_string(),
            alt: None,
        }
    }

    #[test]
    fn test_counts() {
        let result = ConversionResult {
            text: String::new(),
            reports: vec![
                ReferenceReport {
                    reference: reference("a.png"),
                    outcome: Ok(()),
                },
                ReferenceReport {
                    reference: reference("b.png"),
                    outcome: Err(SkipReason::ReferenceUnresolved),
                },
                ReferenceReport {
                    reference: reference("c.png"),
                    outcome: Err(SkipReason::FileTooLarge { size: 11, limit: 10 }),
                },
            ],
        };

        assert_eq!(result.skipped_count(), 2);
        assert_eq!(result.embedded_count(), 1);

        let skipped: Vec<&str> = result.skipped().map(|(r, _)| r.path.as_str()).collect();
        assert_eq!(skipped, vec!["b.png", "c.png"]);
    }

    #[test]
    fn test_skip_reason_messages() {
        assert_eq!(
            SkipReason::DisallowedExtension {
                extension: "svg".to_string()
            }
            .to_string(),
            "unsupported file type: svg"
        );
        assert_eq!(
            SkipReason::FileTooLarge { size: 20, limit: 10 }.to_string(),
            "file too large (20 bytes, limit 10 bytes)"
        );
    }
}
