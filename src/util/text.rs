use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: &str = "...";

/// Terminal columns occupied by `s` (emoji and CJK count as two).
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Shorten `s` to at most `max_width` columns, ending in "..." when cut.
///
/// Widths of three or less have no room for the ellipsis, so the text is
/// cut without one. Returns the input unchanged (borrowed) when it fits.
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    let (budget, suffix) = if max_width > ELLIPSIS.len() {
        (max_width - ELLIPSIS.len(), ELLIPSIS)
    } else {
        (max_width, "")
    };

    let mut used = 0;
    let mut end = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        end = idx + c.len_utf8();
    }

    Cow::Owned(format!("{}{}", &s[..end], suffix))
}

/// Pad `s` with spaces on the right up to `width` columns.
pub fn pad_to_width(s: &str, width: usize) -> Cow<'_, str> {
    let current = display_width(s);
    if current >= width {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(format!("{}{}", s, " ".repeat(width - current)))
    }
}

fn is_unsafe_control(c: char) -> bool {
    c.is_control() && c != '\t'
}

/// Remove control characters (including ESC, so no ANSI sequence survives)
/// from text that came from imported or remote link data.
///
/// Any CSI sequence is dropped whole; tabs become spaces so column math holds.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    if !s.chars().any(|c| is_unsafe_control(c) || c == '\t') {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\u{1b}' => {
                if chars.peek() == Some(&'[') {
                    chars.next();
                    // Parameters run until a final byte in @..~
                    for next in chars.by_ref() {
                        if ('@'..='~').contains(&next) {
                            break;
                        }
                    }
                }
            }
            '\t' => out.push(' '),
            c if is_unsafe_control(c) => {}
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}
