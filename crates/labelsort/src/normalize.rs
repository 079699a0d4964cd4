//! Label canonicalization used for every comparison.

/// Canonicalize a label for comparison.
///
/// Anything that is not an ASCII letter or digit acts as a word separator,
/// runs of separators collapse to a single space, and the result is trimmed
/// and lowercased.
pub fn normalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_space = false;
    for ch in s.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_space = true;
        }
    }
    out
}

/// Split a raw label into the tokens tried by the relaxed fallback pass.
pub fn split_tokens(label: &str) -> Vec<&str> {
    label
        .split([' ', '/'])
        .filter(|t| !t.is_empty())
        .collect()
}
