//! Text normalization applied before fuzzy comparison

/// Default preprocessing for fuzzy matching
///
/// - Replaces every non-alphanumeric character with a space
/// - Converts to lowercase
/// - Collapses whitespace
/// - Trims leading and trailing whitespace
pub fn default_process(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    collapse_whitespace(&replaced.to_lowercase())
        .trim()
        .to_string()
}

/// Key used by exact matchers; `None` for values that never match
pub(crate) fn exact_key(value: Option<&str>, case_sensitive: bool) -> Option<String> {
    let value = value?;
    if value.is_empty() {
        return None;
    }
    if case_sensitive {
        Some(value.to_string())
    } else {
        Some(value.to_lowercase())
    }
}

/// Collapse multiple whitespace characters into a single space
fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_was_space = false;

    for c in s.chars() {
        if c.is_whitespace() {
            if !prev_was_space {
                result.push(' ');
                prev_was_space = true;
            }
        } else {
            result.push(c);
            prev_was_space = false;
        }
    }

    result
}
