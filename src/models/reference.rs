use std::fmt;
use std::ops::Range;

/// Syntax an image reference was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// Wiki-style embed: `![[path.png]]`
    Wiki,
    /// Standard Markdown image: `![alt](path.png)`
    Markdown,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Wiki => f.write_str("wiki"),
            ReferenceKind::Markdown => f.write_str("markdown"),
        }
    }
}

/// An image reference found in document text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// Syntax the reference was written in
    pub kind: ReferenceKind,
    /// Byte range of `raw` within the scanned text
    pub span: Range<usize>,
    /// The full matched text, e.g. `![[a.png]]`
    pub raw: String,
    /// Referenced path, including the extension
    pub path: String,
    /// Alt text for Markdown references; `None` for wiki embeds
    pub alt: Option<String>,
}

impl ImageReference {
    /// Shortened path for log lines
    pub fn path_preview(&self) -> String {
        truncate_chars(&self.path, 50)
    }
}

/// Truncate to at most `max` characters
pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("", 0), "");
    }

    #[test]
    fn test_path_preview() {
        let long = format!("{}.png", "x".repeat(100));
        let reference = ImageReference {
            kind: ReferenceKind::Wiki,
            span: 0..long.len() + 5,
            raw: format!("![[{}]]", long),
            path: long,
            alt: None,
        };
        assert_eq!(reference.path_preview().chars().count(), 50);
    }
}
