//! String hygiene for model output and evidence text. Every function here
//! is total: any unicode string in, never an error out.

/// Strip leading whitespace and stray opening bracket/parenthesis/brace
/// characters that the generation collaborator occasionally prefixes to
/// its markdown. Idempotent.
pub fn strip_leading_noise(s: &str) -> &str {
    s.trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '(' | '[' | '{'))
}

/// Drop every code point outside ASCII (0x00..=0x7F). Emoji and
/// punctuation variants are removed, not transliterated. Idempotent.
pub fn ascii_sanitize(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii()).collect()
}

/// Bound `s` to at most `max` bytes without splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        s.char_indices()
            .take_while(|&(i, _)| i < max)
            .map(|(_, c)| c)
            .collect()
    }
}
