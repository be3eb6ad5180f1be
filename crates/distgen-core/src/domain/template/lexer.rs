//! Splits template source into text runs and directive bodies.
//!
//! Only the three opening delimiters are significant: `{{`, `{%` and `{#`.
//! Closing delimiters found in plain text (`}}` ends many Solidity blocks)
//! are ordinary text.

use crate::domain::error::DomainError;

/// 1-based location of a directive in the template source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub(crate) fn at(source: &str, offset: usize) -> Self {
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(newline) => before[newline + 1..].chars().count() + 1,
            None => before.chars().count() + 1,
        };
        Self { line, column }
    }

    pub(crate) fn error(self, message: impl Into<String>) -> DomainError {
        DomainError::TemplateSyntax {
            line: self.line,
            column: self.column,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    Text(&'a str),
    /// `{{ body }}`. `raw` is the whole directive, delimiters included.
    Output {
        body: &'a str,
        raw: &'a str,
        pos: Position,
    },
    /// `{% body %}`
    Tag { body: &'a str, pos: Position },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Opener {
    Output,
    Tag,
    Comment,
}

impl Opener {
    fn close(self) -> &'static str {
        match self {
            Self::Output => "}}",
            Self::Tag => "%}",
            Self::Comment => "#}",
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::Output => "placeholder",
            Self::Tag => "tag",
            Self::Comment => "comment",
        }
    }
}

/// Split `source` into segments. Comments are dropped and `{% raw %}` blocks
/// are returned as plain text.
///
/// A `-` just inside a delimiter (`{%-`, `-}}`) trims the whitespace of the
/// neighbouring text on that side.
pub(crate) fn tokenize(source: &str) -> Result<Vec<Segment<'_>>, DomainError> {
    let mut segments = Vec::new();
    let mut cursor = 0;
    let mut trim_next = false;

    while let Some((start, opener)) = next_opener(source, cursor) {
        let pos = Position::at(source, start);
        let body_start = start + 2;
        let close = opener.close();
        let Some(len) = find_close(source, body_start, opener) else {
            return Err(pos.error(format!(
                "unterminated {}, expected `{close}`",
                opener.describe()
            )));
        };
        let body_end = body_start + len;
        let end = body_end + close.len();
        let (body, trim_before, trim_after) = strip_markers(&source[body_start..body_end]);

        push_text(&mut segments, &source[cursor..start], trim_next, trim_before);
        trim_next = trim_after;

        cursor = match opener {
            Opener::Comment => end,
            Opener::Output => {
                segments.push(Segment::Output {
                    body,
                    raw: &source[start..end],
                    pos,
                });
                end
            }
            Opener::Tag if body.trim() == "raw" => {
                let raw = take_raw(source, end, pos)?;
                push_text(&mut segments, raw.text, trim_after, raw.trim_before);
                trim_next = raw.trim_after;
                raw.end
            }
            Opener::Tag => {
                segments.push(Segment::Tag { body, pos });
                end
            }
        };
    }

    push_text(&mut segments, &source[cursor..], trim_next, false);

    Ok(segments)
}

fn push_text<'a>(segments: &mut Vec<Segment<'a>>, text: &'a str, trim_start: bool, trim_end: bool) {
    let text = if trim_start { text.trim_start() } else { text };
    let text = if trim_end { text.trim_end() } else { text };
    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }
}

/// Removes the whitespace-control dashes from a directive body, reporting
/// which sides had one.
fn strip_markers(body: &str) -> (&str, bool, bool) {
    let (body, before) = match body.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (body, false),
    };
    let (body, after) = match body.strip_suffix('-') {
        Some(rest) => (rest, true),
        None => (body, false),
    };
    (body, before, after)
}

/// Offset of the closing delimiter in `source[from..]`.
///
/// Inside `{{ }}` and `{% %}` a closer within a quoted string does not end the
/// directive. If the quotes never balance the first closer wins, and the
/// expression parser reports the bad literal.
fn find_close(source: &str, from: usize, opener: Opener) -> Option<usize> {
    let close = opener.close().as_bytes();
    let plain = || source[from..].find(opener.close());
    if opener == Opener::Comment {
        return plain();
    }

    let bytes = source.as_bytes();
    let mut quote = None;
    let mut at = from;
    while at < bytes.len() {
        let byte = bytes[at];
        match quote {
            Some(_) if byte == b'\\' => at += 1,
            Some(q) if byte == q => quote = None,
            Some(_) => {}
            None if byte == b'"' || byte == b'\'' => quote = Some(byte),
            None if bytes[at..].starts_with(close) => return Some(at - from),
            None => {}
        }
        at += 1;
    }

    plain()
}

fn next_opener(source: &str, from: usize) -> Option<(usize, Opener)> {
    let bytes = source.as_bytes();
    let mut search = from;

    while let Some(len) = source[search..].find('{') {
        let at = search + len;
        match bytes.get(at + 1) {
            Some(b'{') => return Some((at, Opener::Output)),
            Some(b'%') => return Some((at, Opener::Tag)),
            Some(b'#') => return Some((at, Opener::Comment)),
            _ => search = at + 1,
        }
    }

    None
}

struct RawBlock<'a> {
    text: &'a str,
    /// Offset just past `{% endraw %}`.
    end: usize,
    trim_before: bool,
    trim_after: bool,
}

fn take_raw(source: &str, from: usize, opened: Position) -> Result<RawBlock<'_>, DomainError> {
    let mut search = from;

    while let Some(len) = source[search..].find("{%") {
        let start = search + len;
        let body_start = start + 2;
        if let Some(close) = source[body_start..].find("%}") {
            let body_end = body_start + close;
            let (body, trim_before, trim_after) = strip_markers(&source[body_start..body_end]);
            if body.trim() == "endraw" {
                return Ok(RawBlock {
                    text: &source[from..start],
                    end: body_end + 2,
                    trim_before,
                    trim_after,
                });
            }
        }
        search = body_start;
    }

    Err(opened.error("unclosed `{% raw %}` block, expected `{% endraw %}`"))
}
