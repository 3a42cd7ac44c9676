use std::borrow::Cow;

/// Line terminators a tag run may not span.
fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

/// Removes every `<...>` run from `s`.
///
/// A run starts at `<` and ends at the nearest following `>` on the same
/// line. A `<` with no `>` before the end of its line is kept as literal
/// text. This is a textual filter, not an HTML parser: `a < b > c` loses
/// `< b >` just like a real tag would.
///
/// Returns `Cow::Borrowed` when `s` contains no `<`.
///
/// # Examples
///
/// ```
/// use rssagg::util::strip_tags;
///
/// assert_eq!(strip_tags("<b>Breaking</b> news"), "Breaking news");
/// assert_eq!(strip_tags("1 < 2"), "1 < 2");
/// ```
pub fn strip_tags(s: &str) -> Cow<'_, str> {
    if !s.contains('<') {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let mut close = None;
        for (idx, c) in after.char_indices() {
            if c == '>' {
                close = Some(idx);
                break;
            }
            if is_line_terminator(c) {
                break;
            }
        }

        match close {
            Some(idx) => rest = &after[idx + 1..],
            None => {
                out.push('<');
                rest = after;
            }
        }
    }
    out.push_str(rest);

    Cow::Owned(out)
}

/// Escapes `&`, `<`, `>`, `"` and `'` for use in HTML text or a quoted
/// attribute value.
///
/// Returns `Cow::Borrowed` when nothing needs escaping.
pub fn escape_html(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 16);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}
