//! Fixed-width line formatting.
//!
//! All helpers measure in characters, not bytes, and target
//! [`LINE_WIDTH`] columns. Text that does not fit is never truncated here;
//! the display driver clips long lines.

/// Characters per display line.
pub const LINE_WIDTH: usize = 16;

/// A full-width separator line.
pub fn rule() -> String {
    "#".repeat(LINE_WIDTH)
}

/// Place `left` and `right` at opposite ends of a line.
///
/// If both do not fit, they are separated by a single space.
pub fn space_between(left: &str, right: &str) -> String {
    let used = left.chars().count() + right.chars().count();
    if right.is_empty() {
        return left.to_string();
    }
    let gap = LINE_WIDTH.saturating_sub(used).max(1);
    format!("{}{}{}", left, " ".repeat(gap), right)
}

/// Centre `text` and pad both sides with `fill`.
///
/// `fill_around('*', " NO CARGO ")` gives `*** NO CARGO ***`.
pub fn fill_around(fill: char, text: &str) -> String {
    let pad = LINE_WIDTH.saturating_sub(text.chars().count());
    let left = pad / 2;
    let right = pad - left;
    let mut line = String::with_capacity(LINE_WIDTH);
    line.extend(std::iter::repeat(fill).take(left));
    line.push_str(text);
    line.extend(std::iter::repeat(fill).take(right));
    line
}

/// Centre `text` with spaces.
pub fn centre(text: &str) -> String {
    fill_around(' ', text)
}

/// Format a number with thousands separators.
pub fn group_thousands(n: i64) -> String {
    let s = n.unsigned_abs().to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3 + 1);
    if n < 0 {
        result.push('-');
    }
    let chars: Vec<_> = s.chars().collect();

    for (i, ch) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(*ch);
    }

    result
}

/// Capitalise the first letter of every word, lowercase the rest.
///
/// Hyphens and other punctuation start a new word: `Metal-rich body` gives
/// `Metal-Rich Body`.
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut start_of_word = true;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if start_of_word {
                result.extend(ch.to_uppercase());
            } else {
                result.extend(ch.to_lowercase());
            }
            start_of_word = false;
        } else {
            result.push(ch);
            start_of_word = true;
        }
    }
    result
}
