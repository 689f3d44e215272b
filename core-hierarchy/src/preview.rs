//! Detection of multi-part preview assets named `<base>-P<n>[.ext]`.

use once_cell::sync::Lazy;
use regex::Regex;

static PREVIEW_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^(.+)-P([0-9]+)(\.[^.]+)?$").ok());

/// Outcome of matching a name against the preview pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewMatch {
    pub is_preview: bool,
    /// `P<n>` label, empty when the name is not a preview
    pub pattern: String,
    /// Parsed `<n>`, saturating at `u32::MAX`
    pub number: Option<u32>,
    /// `<base>` plus the original extension, or the unchanged name
    pub base_name: String,
}

impl PreviewMatch {
    fn not_a_preview(name: &str) -> Self {
        Self {
            is_preview: false,
            pattern: String::new(),
            number: None,
            base_name: name.to_string(),
        }
    }
}

/// Match `name` against `<base>-P<digits><optional .ext>`.
///
/// ```
/// use core_hierarchy::preview::detect_preview;
///
/// let found = detect_preview("brochure-P2.pdf");
/// assert!(found.is_preview);
/// assert_eq!(found.pattern, "P2");
/// assert_eq!(found.base_name, "brochure.pdf");
/// ```
pub fn detect_preview(name: &str) -> PreviewMatch {
    let Some(captures) = PREVIEW_PATTERN
        .as_ref()
        .and_then(|pattern| pattern.captures(name))
    else {
        return PreviewMatch::not_a_preview(name);
    };

    let (Some(base), Some(digits)) = (captures.get(1), captures.get(2)) else {
        return PreviewMatch::not_a_preview(name);
    };
    let extension = captures.get(3).map(|m| m.as_str()).unwrap_or_default();

    PreviewMatch {
        is_preview: true,
        pattern: format!("P{}", digits.as_str()),
        number: Some(digits.as_str().parse::<u32>().unwrap_or(u32::MAX)),
        base_name: format!("{}{}", base.as_str(), extension),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_with_extension() {
        let found = detect_preview("report-P1.pdf");
        assert!(found.is_preview);
        assert_eq!(found.pattern, "P1");
        assert_eq!(found.number, Some(1));
        assert_eq!(found.base_name, "report.pdf");
    }

    #[test]
    fn test_preview_without_extension() {
        let found = detect_preview("Slides-P12");
        assert!(found.is_preview);
        assert_eq!(found.pattern, "P12");
        assert_eq!(found.base_name, "Slides");
    }

    #[test]
    fn test_non_preview_names() {
        for name in ["report.pdf", "report-p1.pdf", "-P1.pdf", "report-P.pdf", "report-P1.tar.gz", "report-P٣.png"] {
            let found = detect_preview(name);
            assert!(!found.is_preview, "{}", name);
            assert!(found.pattern.is_empty());
            assert_eq!(found.number, None);
            assert_eq!(found.base_name, name);
        }
    }

    #[test]
    fn test_base_may_contain_dashes() {
        let found = detect_preview("year-end-summary-P3.jpg");
        assert_eq!(found.base_name, "year-end-summary.jpg");
        assert_eq!(found.number, Some(3));
    }
}
