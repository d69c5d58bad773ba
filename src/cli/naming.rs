//! Name canonicalization
//!
//! Users type flags in dashed form (`--content-type`). Internally every flag
//! and argument is stored under a single camel-style key (`contentType`), so
//! lookups do not depend on how a name was spelled in a descriptor.

/// Prefix that negates a boolean flag
pub const NEGATION_PREFIX: &str = "no-";

/// Convert a name to its dashed (kebab) form.
///
/// Camel humps, underscores and whitespace all become single dashes and the
/// result is lower-cased: `contentType`, `content_type` and `content type`
/// all map to `content-type`.
pub fn dashed(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);

    for ch in name.chars() {
        if ch == '-' || ch == '_' || ch.is_whitespace() {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
        } else if ch.is_uppercase() {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }

    while out.ends_with('-') {
        out.pop();
    }

    out
}

/// Convert a name to camel case, treating `-`, `_` and whitespace as word breaks
pub fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;

    for ch in name.chars() {
        if ch == '-' || ch == '_' || ch.is_whitespace() {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }

    out
}

/// The key a flag or argument is stored and looked up under
pub fn canonical_key(name: &str) -> String {
    camel_case(&dashed(name))
}

/// Split a dashed name into `(base, negated)`.
///
/// `no-browser` yields `("browser", true)`; names without the prefix come
/// back unchanged with `false`.
pub fn strip_negation(dashed_name: &str) -> (&str, bool) {
    match dashed_name.strip_prefix(NEGATION_PREFIX) {
        Some(base) if !base.is_empty() => (base, true),
        _ => (dashed_name, false),
    }
}
