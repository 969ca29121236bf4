//! View inheritance through `extends`.

use super::ViewSpec;

/// Merges derived specs into base specs.
///
/// A derived spec whose `extends` names a known key replaces that spec in
/// place with the merged result: tags union, selectors and filters
/// concatenate base-then-derived, scalars come from the derived spec when it
/// sets them, and `smart` is true if either side is. Specs without `extends`,
/// or whose base is unknown, are appended unchanged.
#[must_use]
pub fn merge_specs(base: Vec<ViewSpec>, derived: Vec<ViewSpec>) -> Vec<ViewSpec> {
    let mut merged = base;
    for spec in derived {
        let target = spec
            .extends
            .as_deref()
            .and_then(|key| merged.iter().position(|s| s.key == key));
        match target {
            Some(pos) => {
                let combined = combine(&merged[pos], spec);
                tracing::debug!("View '{}' replaces '{}'", combined.key, merged[pos].key);
                merged[pos] = combined;
            }
            None => {
                if let Some(key) = &spec.extends {
                    tracing::debug!("View '{}' extends unknown '{}'; kept as-is", spec.key, key);
                }
                merged.push(spec);
            }
        }
    }
    merged
}

fn combine(base: &ViewSpec, derived: ViewSpec) -> ViewSpec {
    let or_base = |value: String, fallback: &str| {
        if value.is_empty() {
            fallback.to_string()
        } else {
            value
        }
    };
    let mut tags = base.tags.clone();
    tags.extend(derived.tags);
    ViewSpec {
        key: or_base(derived.key, &base.key),
        name: or_base(derived.name, &base.name),
        view_type: derived.view_type,
        description: or_base(derived.description, &base.description),
        tags,
        includes: base.includes.iter().cloned().chain(derived.includes).collect(),
        excludes: base.excludes.iter().cloned().chain(derived.excludes).collect(),
        filters: base.filters.iter().cloned().chain(derived.filters).collect(),
        subject: derived.subject.or_else(|| base.subject.clone()),
        smart: derived.smart || base.smart,
        extends: None,
    }
}
