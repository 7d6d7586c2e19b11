//! Bounded-length tokenizer for image references.
//!
//! Recognizes two syntaxes:
//!
//! - wiki embeds: `![[<path>.<ext>]]`
//! - Markdown images: `![<alt>](<path>.<ext>)`
//!
//! where `<ext>` is one of the [`ImageFormat`] extensions (case-insensitive).
//! Every captured segment has a character bound and `regex` never backtracks, so
//! scanning stays linear in the input length. Candidates that run past a bound
//! are left as plain text.

use regex::Regex;
use std::sync::LazyLock;

use crate::image::ImageFormat;
use crate::models::{ImageReference, ReferenceKind};

/// Maximum characters in a wiki embed's path before the extension
pub const WIKI_PATH_MAX: usize = 256;
/// Maximum characters in a Markdown image's alt text
pub const MARKDOWN_ALT_MAX: usize = 256;
/// Maximum characters in a Markdown image's path before the extension
pub const MARKDOWN_PATH_MAX: usize = 512;

static WIKI_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"(?i)!\[\[([^\]]{{1,{WIKI_PATH_MAX}}}\.(?:{}))\]\]",
        extension_alternation()
    );
    Regex::new(&pattern).expect("wiki embed pattern is valid")
});

static MARKDOWN_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"(?i)!\[([^\]]{{0,{MARKDOWN_ALT_MAX}}})\]\(([^\)]{{1,{MARKDOWN_PATH_MAX}}}\.(?:{}))\)",
        extension_alternation()
    );
    Regex::new(&pattern).expect("markdown image pattern is valid")
});

/// `png|jpg|...` for every recognized format
fn extension_alternation() -> String {
    ImageFormat::ALL
        .iter()
        .map(|format| format.extension())
        .collect::<Vec<_>>()
        .join("|")
}

/// Scan `text` for image references
///
/// Wiki embeds come first, then Markdown images, each group in left-to-right order.
/// Markdown matches overlapping a wiki embed are dropped.
pub fn scan(text: &str) -> Vec<ImageReference> {
    let mut references = scan_wiki(text);
    let wiki_count = references.len();

    for reference in scan_markdown(text) {
        let overlaps = references[..wiki_count].iter().any(|wiki| {
            reference.span.start < wiki.span.end && wiki.span.start < reference.span.end
        });
        if overlaps {
            log::debug!(
                "Ignoring markdown image overlapping a wiki embed at byte {}",
                reference.span.start
            );
            continue;
        }
        references.push(reference);
    }

    references
}

/// Find all wiki-style embeds, e.g. `![[folder/diagram.png]]`
pub fn scan_wiki(text: &str) -> Vec<ImageReference> {
    WIKI_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let path = caps.get(1)?;
            Some(ImageReference {
                kind: ReferenceKind::Wiki,
                span: whole.range(),
                raw: whole.as_str().to_string(),
                path: path.as_str().to_string(),
                alt: None,
            })
        })
        .collect()
}

/// Find all standard Markdown images, e.g. `![chart](img/chart.jpg)`
pub fn scan_markdown(text: &str) -> Vec<ImageReference> {
    MARKDOWN_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let alt = caps.get(1)?;
            let path = caps.get(2)?;
            Some(ImageReference {
                kind: ReferenceKind::Markdown,
                span: whole.range(),
                raw: whole.as_str().to_string(),
                path: path.as_str().to_string(),
                alt: Some(alt.as_str().to_string()),
            })
        })
        .collect()
}
