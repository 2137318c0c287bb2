//! LaTeX-aware inline parsing of joined question text.
//!
//! `$$...$$` is tried before `$...$`. A `$` that opens nothing stays literal
//! text and marks the result unbalanced; `\$` is always a literal dollar.

use crate::model::{RichText, Segment};

use super::cursor::Cursor;

const DISPLAY: &[u8] = b"$$";
const INLINE: u8 = b'$';
const ESCAPED: &[u8] = b"\\$";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedText {
    pub text: RichText,
    /// A `$` delimiter had no partner.
    pub unbalanced: bool,
}

pub fn parse_rich_text(s: &str) -> ParsedText {
    let mut cur = Cursor::new(s);
    let mut segments = vec![];
    let mut pending = String::new();
    let mut unbalanced = false;

    fn flush_text(segments: &mut Vec<Segment>, pending: &mut String) {
        if !pending.is_empty() {
            segments.push(Segment::text(std::mem::take(pending)));
        }
    }

    while !cur.eof() {
        if cur.starts_with(ESCAPED) {
            pending.push('$');
            cur.bump_n(ESCAPED.len());
            continue;
        }
        if let Some(segment) = try_parse_math(&mut cur, DISPLAY) {
            flush_text(&mut segments, &mut pending);
            segments.push(segment);
            continue;
        }
        if let Some(segment) = try_parse_math(&mut cur, &[INLINE]) {
            flush_text(&mut segments, &mut pending);
            segments.push(segment);
            continue;
        }
        if cur.peek() == Some(INLINE) {
            unbalanced = true;
            pending.push('$');
            cur.bump_n(1);
            continue;
        }
        if let Some(c) = cur.bump_char() {
            pending.push(c);
        }
    }

    flush_text(&mut segments, &mut pending);
    ParsedText {
        text: RichText::new(segments),
        unbalanced,
    }
}

/// Attempts a math span delimited by `delim` on both sides.
///
/// Returns `None` if the span isn't closed or is blank; the cursor is restored.
fn try_parse_math(cur: &mut Cursor<'_>, delim: &[u8]) -> Option<Segment> {
    if !cur.starts_with(delim) {
        return None;
    }

    let saved = cur.clone();
    cur.bump_n(delim.len());
    let inner_start = cur.i;

    while !cur.eof() {
        if cur.starts_with(ESCAPED) {
            cur.bump_n(ESCAPED.len());
            continue;
        }
        if cur.peek() == Some(INLINE) {
            break;
        }
        cur.bump_char();
    }
    let inner = cur.since(inner_start);

    if !cur.starts_with(delim) || inner.trim().is_empty() {
        *cur = saved;
        return None;
    }
    cur.bump_n(delim.len());

    Some(Segment::latex(inner, delim == DISPLAY))
}
