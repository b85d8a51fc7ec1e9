//! Escaping of LaTeX special characters in cell text

use std::borrow::Cow;

/// Escape sequences for every character with special meaning in LaTeX text
const ESCAPES: &[(char, &str)] = &[
    ('\\', "\\textbackslash{}"),
    ('&', "\\&"),
    ('%', "\\%"),
    ('$', "\\$"),
    ('#', "\\#"),
    ('_', "\\_"),
    ('{', "\\{"),
    ('}', "\\}"),
    ('~', "\\textasciitilde{}"),
    ('^', "\\textasciicircum{}"),
    ('<', "\\textless{}"),
    ('>', "\\textgreater{}"),
    ('[', "{[}"),
    (']', "{]}"),
];

/// Cell contents treated as "no value" when missing markers are enabled
const MISSING_VALUES: &[&str] = &["", "NA", "N/A", "NaN", "None", "\\", "//", "---", "_"];

/// Rendering of a missing value
pub const MISSING_MARKER: &str = "\\textemdash";

fn escape_for(c: char) -> Option<&'static str> {
    ESCAPES.iter().find(|(raw, _)| *raw == c).map(|(_, esc)| *esc)
}

/// Escape LaTeX special characters in a cell value
///
/// Every character is mapped independently, so the braces introduced by
/// `\textbackslash{}` and friends are never escaped a second time.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match escape_for(c) {
            Some(esc) => out.push_str(esc),
            None => out.push(c),
        }
    }
    out
}

/// Characters that break a caption or label argument when left bare
const MARKUP_ESCAPES: &[char] = &['%', '#', '&'];

/// Escape the characters that would break a user-supplied caption or label
///
/// Unlike [`escape_latex`] this leaves commands, math and braces alone, so
/// captions may still contain intentional markup. `%`, `#` and `&` are
/// escaped unless an odd run of backslashes already escapes them.
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut backslashes = 0;
    for c in text.chars() {
        if MARKUP_ESCAPES.contains(&c) && backslashes % 2 == 0 {
            out.push('\\');
        }
        backslashes = if c == '\\' { backslashes + 1 } else { 0 };
        out.push(c);
    }
    out
}

/// Invert [`escape_latex`]
///
/// Text that was not produced by `escape_latex` is passed through where no
/// escape sequence matches.
pub fn unescape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    'outer: while let Some(c) = rest.chars().next() {
        if c == '\\' || c == '{' {
            for (raw, esc) in ESCAPES {
                if let Some(tail) = rest.strip_prefix(esc) {
                    out.push(*raw);
                    rest = tail;
                    continue 'outer;
                }
            }
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}

/// Join the lines of a multi-line cell with single spaces
///
/// A whitespace run holding a line break becomes one space (none at either
/// end of the cell); a blank line inside a tabular cell would otherwise start
/// a new paragraph.
pub fn flatten_lines(text: &str) -> Cow<'_, str> {
    if !text.contains(['\n', '\r']) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if !c.is_whitespace() {
            out.push(c);
            continue;
        }

        let mut run = String::from(c);
        while let Some(&next) = chars.peek().filter(|next| next.is_whitespace()) {
            run.push(next);
            chars.next();
        }

        if !run.contains(['\n', '\r']) {
            out.push_str(&run);
        } else if !out.is_empty() && chars.peek().is_some() {
            out.push(' ');
        }
    }
    Cow::Owned(out)
}

/// Check whether a cell holds one of the recognised missing-value markers
pub fn is_missing_value(text: &str) -> bool {
    MISSING_VALUES.contains(&text.trim())
}

/// Render a cell for output: flatten and escape it, or emit the missing marker
pub fn render_cell(text: &str, mark_missing: bool) -> String {
    if mark_missing && is_missing_value(text) {
        MISSING_MARKER.to_string()
    } else {
        escape_latex(&flatten_lines(text))
    }
}
