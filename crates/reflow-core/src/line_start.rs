//! Line starts and the indentation around them.
//!
//! For a line such as `"   * Foo"` and the line start `" * "`:
//!
//! - the *section indent* is the whitespace before the line start (`"  "`),
//! - the *i_line_start_i* is indent + line start + any whitespace that follows (`"   * "`).
//!
//! The i_line_start_i is the exact prefix that every wrapped line of a run must repeat.

/// Leading whitespace of `s[start..]`.
pub fn leading_whitespace(s: &str, start: usize) -> &str {
    let rest = &s[start..];
    let end = rest
        .char_indices()
        .find(|(_, ch)| !ch.is_whitespace())
        .map_or(rest.len(), |(i, _)| i);
    &rest[..end]
}

/// Returns `true` if `s` is empty or consists only of whitespace.
pub fn is_all_whitespace(s: &str) -> bool {
    s.chars().all(char::is_whitespace)
}

/// Byte index where the trailing whitespace of `s` begins (`s.len()` if there is none).
pub fn trailing_whitespace_start(s: &str) -> usize {
    s.trim_end_matches(char::is_whitespace).len()
}

/// Whitespace of `line` before `line_start`, or `None` if the line does not open with
/// whitespace followed by `line_start`.
///
/// If `line_start` is itself whitespace, several splits are possible and the shortest indent
/// wins. `line` must not contain a newline.
pub fn section_indent<'a>(line: &'a str, line_start: &str) -> Option<&'a str> {
    let line_indent = leading_whitespace(line, 0);
    if is_all_whitespace(line_start) {
        return line_indent.find(line_start).map(|i| &line_indent[..i]);
    }

    let start_indent = leading_whitespace(line_start, 0);
    let start_rest = &line_start[start_indent.len()..];
    if line_indent.ends_with(start_indent) && line[line_indent.len()..].starts_with(start_rest) {
        Some(&line_indent[..line_indent.len() - start_indent.len()])
    } else {
        None
    }
}

/// Indent + line start + following whitespace of `line`, or `None` if `line_start` does not
/// apply to the line.
pub fn i_line_start_i<'a>(line: &'a str, line_start: &str) -> Option<&'a str> {
    let indent = section_indent(line, line_start)?;
    let after_start = indent.len() + line_start.len();
    let post = leading_whitespace(line, after_start);
    Some(&line[..after_start + post.len()])
}
