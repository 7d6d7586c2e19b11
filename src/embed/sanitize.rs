/// Maximum characters kept in rewritten alt text
pub const ALT_TEXT_MAX: usize = 200;

/// Strip characters that could break out of the image syntax or inject markup,
/// then truncate to [`ALT_TEXT_MAX`] characters
pub fn sanitize_alt_text(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '<' | '>' | '"' | '\''))
        .take(ALT_TEXT_MAX)
        .collect()
}

/// Alt text for a wiki embed: the file name without its extension
/// `"attachments/My Diagram.png"` -> `"My Diagram"`
pub fn wiki_alt_text(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(dot) if dot + 1 < name.len() => &name[..dot],
        _ => name,
    }
}
