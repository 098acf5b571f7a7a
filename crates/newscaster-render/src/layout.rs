//! Text layout independent of any font backend.
//!
//! Widths are supplied by a measuring closure so the wrapping rules can be
//! tested without a font file.

/// Lines kept on the image.
pub const MAX_LINES: usize = 3;

/// Shortest last line that gets an ellipsis when lines were dropped.
const ELLIPSIS_MIN_CHARS: usize = 15;

/// Horizontal padding subtracted from the canvas width.
pub const HORIZONTAL_PADDING: u32 = 100;

/// Font size for a canvas: a fifteenth of the shorter side, at least 10.
pub fn font_size_for(width: u32, height: u32) -> f32 {
    (width.min(height) / 15).max(10) as f32
}

/// Greedy word wrap. A word wider than `max_width` gets a line of its own.
pub fn wrap_words<F>(text: &str, max_width: u32, measure: F) -> Vec<String>
where
    F: Fn(&str) -> u32,
{
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };

        if measure(&candidate) <= max_width || current.is_empty() {
            current = candidate;
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Keep at most [`MAX_LINES`]. When lines are dropped and the last kept line
/// is long enough, its last three characters become `...`.
pub fn clamp_lines(mut lines: Vec<String>) -> Vec<String> {
    if lines.len() <= MAX_LINES {
        return lines;
    }

    lines.truncate(MAX_LINES);
    if let Some(last) = lines.last_mut() {
        let count = last.chars().count();
        if count > ELLIPSIS_MIN_CHARS {
            let kept: String = last.chars().take(count - 3).collect();
            *last = format!("{}...", kept);
        }
    }
    lines
}
