//! Greedy word wrapping against a caller-supplied width measurement.

/// Wrap `text` into lines narrower than `max_width`, measured with `measure`.
///
/// Tokens are whitespace-delimited and rejoined with single spaces. A line grows while
/// `measure(line + " " + token) < max_width`; a token that is wider than `max_width` on its own
/// still gets a line of its own and is never split. Empty input yields one empty line.
pub fn wrap_text(text: &str, max_width: f32, mut measure: impl FnMut(&str) -> f32) -> Vec<String> {
    let mut tokens = text.split_whitespace();
    let Some(first) = tokens.next() else {
        return vec![String::new()];
    };

    let mut lines = Vec::new();
    let mut current = first.to_string();
    let mut candidate = String::new();
    for token in tokens {
        candidate.clear();
        candidate.push_str(&current);
        candidate.push(' ');
        candidate.push_str(token);
        if measure(&candidate) < max_width {
            std::mem::swap(&mut current, &mut candidate);
        } else {
            lines.push(std::mem::replace(&mut current, token.to_string()));
        }
    }
    lines.push(current);
    lines
}

/// Fixed-advance measurement: every char is `px_per_char` wide.
pub fn monospace_measure(px_per_char: f32) -> impl Fn(&str) -> f32 {
    move |s: &str| s.chars().count() as f32 * px_per_char
}

#[cfg(test)]
#[path = "../../tests/unit/layout/wrap.rs"]
mod tests;
