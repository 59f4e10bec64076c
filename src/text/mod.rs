//! # Text Measurement
//!
//! Greedy word wrapping against Helvetica metrics.
//!
//! Lines only break at whitespace. A token that is wider than the line on
//! its own is placed alone on a line and left to overflow rather than being
//! split, so values like reference ranges or dosages are never cut apart.

use crate::font::StandardFont;

/// Wraps text and converts line counts to heights.
#[derive(Debug, Clone, Copy)]
pub struct TextMeasurer {
    line_height_ratio: f64,
}

impl TextMeasurer {
    pub fn new(line_height_ratio: f64) -> Self {
        Self { line_height_ratio }
    }

    /// Height of one line at `font_size`.
    pub fn line_height(&self, font_size: f64) -> f64 {
        font_size * self.line_height_ratio
    }

    /// Height of `line_count` lines at `font_size`.
    pub fn height(&self, line_count: usize, font_size: f64) -> f64 {
        line_count as f64 * self.line_height(font_size)
    }

    /// Width of a single line of text.
    pub fn width(&self, text: &str, font_size: f64, bold: bool) -> f64 {
        StandardFont::regular_or_bold(bold).measure(text, font_size)
    }

    /// Break `text` into lines no wider than `max_width` in regular weight.
    ///
    /// Runs of whitespace collapse to a single space. Empty input yields no
    /// lines; whitespace-only input yields one empty line.
    pub fn wrap(&self, text: &str, max_width: f64, font_size: f64) -> Vec<String> {
        self.wrap_with(StandardFont::Helvetica, text, max_width, font_size)
    }

    pub fn wrap_with(
        &self,
        font: StandardFont,
        text: &str,
        max_width: f64,
        font_size: f64,
    ) -> Vec<String> {
        let metrics = font.metrics();
        let space = metrics.char_width(' ', font_size);

        let mut lines = Vec::new();
        let mut current = String::new();
        let mut current_width = 0.0;

        for word in text.split_whitespace() {
            let word_width = metrics.measure_string(word, font_size);

            if current.is_empty() {
                current.push_str(word);
                current_width = word_width;
                continue;
            }

            if current_width + space + word_width <= max_width {
                current.push(' ');
                current.push_str(word);
                current_width += space + word_width;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_width = word_width;
            }
        }

        if !current.is_empty() || (lines.is_empty() && !text.is_empty()) {
            lines.push(current);
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measurer() -> TextMeasurer {
        TextMeasurer::new(1.45)
    }

    #[test]
    fn test_single_line() {
        let lines = measurer().wrap("Eat more spinach", 500.0, 9.0);
        assert_eq!(lines, vec!["Eat more spinach"]);
    }

    #[test]
    fn test_line_break_at_space() {
        let m = measurer();
        let text = "Increase dietary iron intake with leafy greens and legumes";
        let lines = m.wrap(text, 120.0, 10.0);
        assert!(lines.len() > 1, "Expected wrapping, got {:?}", lines);
        for line in &lines {
            assert!(m.width(line, 10.0, false) <= 120.0, "Line too wide: {}", line);
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_empty_string() {
        assert!(measurer().wrap("", 100.0, 10.0).is_empty());
    }

    #[test]
    fn test_blank_text_is_one_line() {
        assert_eq!(measurer().wrap("   \n\t ", 100.0, 10.0), vec![String::new()]);
    }

    #[test]
    fn test_oversized_token_kept_whole() {
        let lines = measurer().wrap("see https://example.org/a/very/long/reference/path now", 60.0, 10.0);
        assert_eq!(
            lines,
            vec!["see", "https://example.org/a/very/long/reference/path", "now"]
        );
    }

    #[test]
    fn test_whitespace_collapses() {
        let lines = measurer().wrap("iron   rich\n\nfoods", 500.0, 10.0);
        assert_eq!(lines, vec!["iron rich foods"]);
    }

    #[test]
    fn test_height_is_linear_in_lines() {
        let m = measurer();
        assert!((m.line_height(10.0) - 14.5).abs() < 1e-9);
        assert!((m.height(4, 10.0) - 58.0).abs() < 1e-9);
        assert_eq!(m.height(0, 10.0), 0.0);
    }

    #[test]
    fn test_bold_wraps_sooner() {
        let m = measurer();
        let text = "Moderate anemia detected consult physician";
        let regular = m.wrap_with(StandardFont::Helvetica, text, 150.0, 10.0);
        let bold = m.wrap_with(StandardFont::HelveticaBold, text, 150.0, 10.0);
        assert!(bold.len() >= regular.len());
    }
}
