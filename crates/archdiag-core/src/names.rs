//! Name handling shared by the model, view selection and the exporter.
//!
//! Three different normalizations exist and they are intentionally not
//! interchangeable:
//!
//! - [`slugify`] derives element ids (`"Risk & ML"` → `risk-ml`).
//! - [`normalize`] folds display names for name-based lookups
//!   (`" Payments_API "` → `payments-api`).
//! - [`identifier`] derives DSL variable names (`"Payments API"` → `payments_api`).

/// Derives a URL-safe slug: ASCII alphanumerics lower-cased, every other run
/// of characters collapsed into a single `-`, no leading or trailing `-`.
#[must_use]
pub fn slugify(name: &str) -> String {
    collapse(name, '-')
}

/// Derives a DSL identifier from a display name.
///
/// Same folding as [`slugify`] but joined with `_`. Names that slug to nothing
/// fall back to `element`, and identifiers never start with a digit.
#[must_use]
pub fn identifier(name: &str) -> String {
    let base = collapse(name, '_');
    if base.is_empty() {
        return "element".to_string();
    }
    if base.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("e_{base}");
    }
    base
}

/// Folds a display name for case-, space- and underscore-insensitive matching.
#[must_use]
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase().replace(['_', ' '], "-")
}

/// Returns the "module" of a view subject: its first `/` segment, normalized.
///
/// Returns `None` for a missing or blank subject.
#[must_use]
pub fn module_of(subject: Option<&str>) -> Option<String> {
    let first = subject?.split('/').next()?.trim();
    if first.is_empty() {
        return None;
    }
    Some(normalize(first))
}

/// Splits a `System/Container` path. Returns `None` for a plain name.
#[must_use]
pub fn split_path(key: &str) -> Option<(&str, &str)> {
    key.split_once('/')
}

fn collapse(name: &str, separator: char) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending && !out.is_empty() {
                out.push(separator);
            }
            pending = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("Risk & ML"), "risk-ml");
        assert_eq!(slugify("  Payments API  "), "payments-api");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn identifier_is_dsl_safe() {
        assert_eq!(identifier("Payments API"), "payments_api");
        assert_eq!(identifier("3rd Party"), "e_3rd_party");
        assert_eq!(identifier("---"), "element");
    }

    #[test]
    fn normalize_folds_spaces_and_underscores() {
        assert_eq!(normalize(" Payments_API "), "payments-api");
        assert_eq!(normalize("Event Router"), normalize("event_router"));
    }

    #[test]
    fn module_is_first_subject_segment() {
        assert_eq!(
            module_of(Some("Care Journeys/Web App")),
            Some("care-journeys".to_string())
        );
        assert_eq!(module_of(Some("Assess")), Some("assess".to_string()));
        assert_eq!(module_of(Some("  ")), None);
        assert_eq!(module_of(None), None);
    }
}
