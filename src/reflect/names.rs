//! Name matching between schema fields and type members.
//!
//! Names match when they are equal after lower-casing and dropping word
//! separators, so `first_name`, `firstName`, `FirstName` and `first-name`
//! all refer to one field.

/// Normalize a name for case- and word-boundary-insensitive comparison.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '_' | '-') && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Whether two names match after normalization.
pub fn names_match(a: &str, b: &str) -> bool {
    normalize_name(a) == normalize_name(b)
}

/// Whether `name` matches any of `candidates` after normalization.
pub fn matches_any<'a, I>(name: &str, candidates: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    let normalized = normalize_name(name);
    candidates
        .into_iter()
        .any(|candidate| normalize_name(candidate) == normalized)
}
