pub mod backend;
pub mod fs;
pub mod memory;

pub use backend::Vault;
pub use fs::{FsVault, VaultFile};
pub use memory::MemoryVault;

/// Vault-relative paths to try for `link` from the note at `base_path`, in order
///
/// Links starting with `./` or `../` are relative to the note's folder only.
/// Other links are tried from the note's folder, then from the vault root.
/// Absolute links and links escaping the vault yield nothing.
pub(crate) fn link_candidates(link: &str, base_path: &str) -> Vec<String> {
    if link.is_empty() || link.starts_with('/') {
        return Vec::new();
    }

    let base_dir = parent_dir(base_path);
    let from_note = normalize(&join(base_dir, link));

    let mut candidates: Vec<String> = from_note.into_iter().collect();
    let note_relative = link.starts_with("./") || link.starts_with("../");
    if !note_relative
        && let Some(from_root) = normalize(link)
        && !candidates.contains(&from_root)
    {
        candidates.push(from_root);
    }
    candidates
}

/// True when `link` names a file without any folder component
pub(crate) fn is_bare_name(link: &str) -> bool {
    !link.is_empty() && !link.contains('/')
}

/// Pick the best match for a bare file name among vault-relative paths
/// Exact name matches beat ASCII case-insensitive ones; ties go to the shortest
/// path, then the lexicographically smallest.
pub(crate) fn pick_by_name<'a>(
    paths: impl IntoIterator<Item = &'a str>,
    name: &str,
) -> Option<&'a str> {
    let mut exact: Option<&str> = None;
    let mut folded: Option<&str> = None;

    for path in paths {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        if file_name == name {
            exact = Some(prefer(exact, path));
        } else if file_name.eq_ignore_ascii_case(name) {
            folded = Some(prefer(folded, path));
        }
    }

    exact.or(folded)
}

fn prefer<'a>(current: Option<&'a str>, candidate: &'a str) -> &'a str {
    match current {
        Some(c) if (c.len(), c) <= (candidate.len(), candidate) => c,
        _ => candidate,
    }
}

/// Folder part of a vault-relative path (`""` for the root)
pub(crate) fn parent_dir(path: &str) -> &str {
    path.rfind('/').map_or("", |idx| &path[..idx])
}

fn join(dir: &str, link: &str) -> String {
    if dir.is_empty() {
        link.to_string()
    } else {
        format!("{}/{}", dir, link)
    }
}

/// Lexically resolve `.` and `..` segments; `None` if the path climbs above the root
pub(crate) fn normalize(path: &str) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            s => parts.push(s),
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("a/./b/../c.png").as_deref(), Some("a/c.png"));
        assert_eq!(normalize("a//b.png").as_deref(), Some("a/b.png"));
        assert_eq!(normalize("../escape.png"), None);
        assert_eq!(normalize("a/../../escape.png"), None);
        assert_eq!(normalize("."), None);
    }

    #[test]
    fn test_link_candidates() {
        assert_eq!(
            link_candidates("img/a.png", "notes/daily/today.md"),
            vec!["notes/daily/img/a.png", "img/a.png"]
        );
        assert_eq!(
            link_candidates("./a.png", "notes/today.md"),
            vec!["notes/a.png"]
        );
        assert_eq!(
            link_candidates("../a.png", "notes/today.md"),
            vec!["a.png"]
        );
        assert_eq!(link_candidates("a.png", "root.md"), vec!["a.png"]);
        assert!(link_candidates("../../a.png", "notes/today.md").is_empty());
        assert!(link_candidates("/etc/passwd.png", "today.md").is_empty());
    }

    #[test]
    fn test_pick_by_name() {
        let paths = ["z/deep/a.png", "b/a.png", "a/a.png", "c/A.PNG"];
        assert_eq!(pick_by_name(paths, "a.png"), Some("a/a.png"));
        assert_eq!(pick_by_name(["x/long/A.PNG", "y/A.png"], "a.png"), Some("y/A.png"));
        assert_eq!(pick_by_name(paths, "missing.png"), None);
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir("a/b/c.md"), "a/b");
        assert_eq!(parent_dir("c.md"), "");
    }
}
