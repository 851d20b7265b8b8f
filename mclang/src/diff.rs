//! Key-level difference between a reference translation and a target one.

use crate::types::{DiffResult, TranslationMap};

/// Returns the reference keys that the target lacks or maps to a blank
/// (empty or whitespace-only) string, in reference order, each with its
/// reference text. Keys only present in the target are ignored.
///
/// # Example
///
/// ```rust
/// use mclang::{TranslationMap, diff};
///
/// let reference: TranslationMap = [("a", "Hello"), ("b", "World")].into_iter().collect();
/// let target: TranslationMap = [("a", "Привет")].into_iter().collect();
/// let missing = diff(&reference, &target);
/// assert_eq!(missing.keys().collect::<Vec<_>>(), vec!["b"]);
/// assert_eq!(missing.get("b"), Some("World"));
/// ```
pub fn diff(reference: &TranslationMap, target: &TranslationMap) -> DiffResult {
    let mut result = DiffResult::default();
    for (key, text) in reference.iter() {
        if is_untranslated(target.get(key)) {
            result.push(key, text);
        }
    }
    result
}

fn is_untranslated(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}
