//! Collision-free gallery titles.

use std::collections::HashSet;

/// Returns `base` if no existing title equals it, otherwise the first of
/// `"base 2"`, `"base 3"`, ... that is not taken.
pub fn uniquify<I, S>(base: &str, existing: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let taken: HashSet<String> = existing
        .into_iter()
        .map(|title| title.as_ref().to_string())
        .collect();

    if !taken.contains(base) {
        return base.to_string();
    }

    (2u64..)
        .map(|n| format!("{} {}", base, n))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}
