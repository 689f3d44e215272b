//! Name helpers shared by tag extraction, preview grouping and sidecar lookup.

/// Longest suffix after the last `.` that still counts as a file extension.
const MAX_EXTENSION_LEN: usize = 10;

/// Split a name into stem and extension (without the dot).
///
/// Only a short, purely alphanumeric tail counts as an extension, so names such
/// as `v1.2 draft` or `.env` are returned whole.
pub fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(pos) if pos > 0 => {
            let ext = &name[pos + 1..];
            if !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
            {
                (&name[..pos], Some(ext))
            } else {
                (name, None)
            }
        }
        _ => (name, None),
    }
}

/// Name with its extension removed.
pub fn strip_extension(name: &str) -> &str {
    split_extension(name).0
}

/// Whether the name (or its stem) carries the `_hidden` marker.
pub fn is_hidden_name(name: &str) -> bool {
    name.ends_with("_hidden") || strip_extension(name).ends_with("_hidden")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("report.pdf"), ("report", Some("pdf")));
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", Some("gz")));
        assert_eq!(split_extension("Notes"), ("Notes", None));
        assert_eq!(split_extension(".env"), (".env", None));
        assert_eq!(split_extension("v1.2 draft"), ("v1.2 draft", None));
        assert_eq!(split_extension("trailing."), ("trailing.", None));
    }

    #[test]
    fn test_is_hidden_name() {
        assert!(is_hidden_name("drafts_hidden"));
        assert!(is_hidden_name("notes_hidden.txt"));
        assert!(!is_hidden_name("hidden_gems"));
        assert!(!is_hidden_name("report.pdf"));
    }
}
