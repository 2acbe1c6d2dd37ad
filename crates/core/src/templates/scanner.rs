//! Directive location, argument splitting and the final unescape pass.
//!
//! A directive is `((name,arg,...))`. A backslash escapes the next
//! character, so `\(`, `\)` and `\,` never act as syntax.

use super::MacroError;

/// A directive found in a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located<'a> {
    pub before: &'a str,
    pub body: &'a str,
    pub after: &'a str,
}

/// Byte range of one directive, markers included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// The text between the markers.
    #[must_use]
    pub fn body(self, text: &str) -> &str {
        &text[self.start + 2..self.end - 2]
    }
}

/// Incremental directive finder for a text rewritten in place.
///
/// Open markers seen so far are kept on a stack, so after the caller
/// replaces the returned span the next call resumes at the span's start
/// instead of rescanning the whole text. Text before that point must not
/// change between calls.
#[derive(Debug, Default)]
pub struct Scanner {
    pos: usize,
    opens: Vec<usize>,
}

impl Scanner {
    /// Next innermost directive, or `None` when the text has no more.
    pub fn next_directive(&mut self, text: &str) -> Result<Option<Span>, MacroError> {
        let bytes = text.as_bytes();
        let mut i = self.pos;

        while i < bytes.len() {
            match bytes[i] {
                b'\\' => {
                    i += 2;
                    continue;
                }
                b'(' if bytes.get(i + 1) == Some(&b'(') => {
                    self.opens.push(i);
                    i += 2;
                    continue;
                }
                b')' if bytes.get(i + 1) == Some(&b')') => {
                    if let Some(start) = self.opens.pop() {
                        self.pos = start;
                        return Ok(Some(Span { start, end: i + 2 }));
                    }
                }
                _ => {}
            }
            i += 1;
        }

        self.pos = bytes.len();
        match self.opens.last() {
            Some(&start) => Err(MacroError::Unterminated(snippet(&text[start..]))),
            None => Ok(None),
        }
    }
}

/// Find the innermost directive of the first directive in `text`.
///
/// The chosen directive is the last open marker before the first close
/// marker that follows an open marker. Close markers with no open marker
/// before them are plain text.
pub fn locate(text: &str) -> Result<Option<Located<'_>>, MacroError> {
    Ok(Scanner::default().next_directive(text)?.map(|span| Located {
        before: &text[..span.start],
        body: span.body(text),
        after: &text[span.end..],
    }))
}

fn snippet(text: &str) -> String {
    text.chars().take(40).collect()
}

/// Split a directive body on unescaped commas.
///
/// Escapes are kept; they are removed by [`unescape`] at the very end.
#[must_use]
pub fn split_args(body: &str) -> Vec<String> {
    let mut args: Vec<String> = Vec::new();
    let mut pending: Option<String> = None;

    for piece in body.split(',') {
        let current = match pending.take() {
            Some(mut acc) => {
                acc.push(',');
                acc.push_str(piece);
                acc
            }
            None => piece.to_string(),
        };
        if ends_with_escape(&current) {
            pending = Some(current);
        } else {
            args.push(current);
        }
    }
    if let Some(rest) = pending {
        args.push(rest);
    }
    args
}

/// True when `s` ends in an odd run of backslashes.
fn ends_with_escape(s: &str) -> bool {
    s.bytes().rev().take_while(|b| *b == b'\\').count() % 2 == 1
}

/// Collapse `\\`, `\(`, `\)` and `\,` to the escaped character.
///
/// Any other backslash is kept as written.
#[must_use]
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if matches!(next, '\\' | '(' | ')' | ',') {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}
