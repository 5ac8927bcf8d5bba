use std::sync::LazyLock;

use regex::Regex;

/// Letters and `_`, followed by letters, numbers and `_`.
static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{L}_][\p{L}\p{N}_]*").unwrap_or_else(|_| unreachable!())
});

/// Returns the length in bytes of the identifier `s` starts with.
pub fn identifier_len(s: &str) -> Option<usize> {
    IDENTIFIER.find(s).map(|m| m.end())
}

pub fn is_identifier(s: &str) -> bool {
    identifier_len(s) == Some(s.len())
}

/// Returns the only character in `s`, or `None` if `s` is empty or holds more
/// than one code point.
pub fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(c)
}

/// Unwraps a vector with exactly one element. Any other vector is handed back.
pub fn into_single<T>(items: Vec<T>) -> Result<T, Vec<T>> {
    <[T; 1]>::try_from(items).map(|[item]| item)
}
