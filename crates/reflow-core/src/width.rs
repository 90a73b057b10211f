//! Column measurement.
//!
//! Widths follow UAX #11 (wide CJK characters take two columns) and a `'\t'` advances to the
//! next multiple of the tab size.

use unicode_width::UnicodeWidthChar;

/// Tab size used when the `tab_size` setting is absent or invalid.
pub const DEFAULT_TAB_SIZE: usize = 4;

/// Visual width of a character (UAX #11).
///
/// Return value:
/// - 1: Narrow character (ASCII, etc.)
/// - 2: Wide character (CJK, fullwidth, etc.)
/// - 0: Zero-width character (combining characters, etc.)
pub fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(1)
}

/// Width of `ch` when it starts at column `column`.
pub fn width_at(ch: char, column: usize, tab_size: usize) -> usize {
    if ch == '\t' {
        let tab_size = tab_size.max(1);
        tab_size - column % tab_size
    } else {
        char_width(ch)
    }
}

/// Width of a line of text. `line` must not contain a newline.
pub fn str_width(line: &str, tab_size: usize) -> usize {
    line.chars()
        .fold(0usize, |x, ch| x.saturating_add(width_at(ch, x, tab_size)))
}

/// Byte index of the first character of `line` that starts at or beyond column `width`.
///
/// Returns `line.len()` if the whole line is narrower. For example, with `"foo bar"` and a
/// width of 4 this is 4.
pub fn advance_by_width(line: &str, width: usize, tab_size: usize) -> usize {
    let mut traveled = 0usize;
    for (i, ch) in line.char_indices() {
        if traveled >= width {
            return i;
        }
        traveled = traveled.saturating_add(width_at(ch, traveled, tab_size));
    }
    line.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_stops() {
        assert_eq!(width_at('\t', 0, 4), 4);
        assert_eq!(width_at('\t', 3, 4), 1);
        assert_eq!(width_at('\t', 4, 4), 4);
        assert_eq!(str_width("a\tb", 4), 5);
        assert_eq!(str_width("\t\t", 2), 4);
    }

    #[test]
    fn test_wide_chars() {
        assert_eq!(str_width("你好", 4), 4);
        assert_eq!(str_width("a\u{301}", 4), 1);
    }

    #[test]
    fn test_advance_by_width() {
        assert_eq!(advance_by_width("foo bar", 4, 4), 4);
        assert_eq!(advance_by_width("foo", 10, 4), 3);
        assert_eq!(advance_by_width("\tx", 2, 4), 1);
        // "你" spans columns 0-1; the next character starts at column 2.
        assert_eq!(advance_by_width("你好", 1, 4), 3);
    }
}
