//! # Lexer - Tokenizing Styled Runs
//!
//! This module is the first stage of the pipeline: it turns the styled runs
//! delivered by the extraction collaborator into a flat stream of [`Token`]s,
//! using the [Logos] lexer generator to scan each run.
//!
//! [Logos]: https://docs.rs/logos
//!
//! ## Two Layers
//!
//! Logos scans one run at a time into [`Lexeme`]s, which are purely lexical
//! (`[<sg>]`, `(CLO3)`, `A.`, whitespace, text). The [`Scanner`] then turns
//! lexemes into tokens, which needs state that outlives a single run:
//!
//! - the current source line, so every token can be reported by line
//! - whether anything but whitespace has been seen on the current line, so
//!   `A.` is an answer marker only at the start of a line
//! - the text run being accumulated, so consecutive text lexemes with the same
//!   emphasis become one [`TextRun`]
//!
//! ```text
//! "(CLO1) What is SQL?\nA. Structured" → [CloTag(Clo1), TextRun(" What is SQL?"),
//!                                        LineBreak, AnswerLine('A'), TextRun(" Structured"), Eof]
//! ```
//!
//! ## Lexing Never Fails
//!
//! Anything that looks like a tag but is not one (`[<foo>]`, `(CLO9)`,
//! `{<x>}`) degrades to text and is recorded as a [`LexDiagnostic`]. One
//! malformed tag must not stop the rest of the document from being read.
//!
//! ## Public API
//!
//! - [`lex`] - full form, tokens with lines plus diagnostics
//! - [`tokenize`] - tokens only
//! - [`lex_str`] - convenience for unstyled text

use logos::Logos;

use crate::run::StyledRun;
use crate::token::{CloLevel, MediaKind, MediaRef, Spanned, TextRun, Token};

/// Lexemes produced by Logos within a single run.
///
/// Literal markers outrank the catch-all `Tag` pattern, and `OptionMarker`
/// outranks `Text`, so `A.` followed by a space is always seen as a possible
/// marker. Whether it really is one is decided by the [`Scanner`].
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum Lexeme {
    #[token("[<sg>]")]
    GroupStart,

    #[token("[<egc>]")]
    GroupStimulusEnd,

    #[token("[</sg>]")]
    GroupEnd,

    #[token("[<br>]")]
    QuestionBreak,

    /// `(CLO<digits>)`, keyword in any case
    #[regex(r"\([cC][lL][oO][0-9]+\)")]
    Clo,

    /// `{<n>}` plus the underscores authors use to draw the blank
    #[regex(r"\{<[ \t]*[0-9]+[ \t]*>\}_*")]
    Blank,

    /// `(<n>)`
    #[regex(r"\([ \t]*<[ \t]*[0-9]+[ \t]*>[ \t]*\)")]
    SubQuestion,

    #[regex(r"\[[aA][uU][dD][iI][oO][ \t]*:[^\]\r\n]*\]")]
    Audio,

    #[regex(r"\[[iI][mM][aA][gG][eE][ \t]*:[^\]\r\n]*\]")]
    Image,

    /// Anything tag-shaped the dialect does not define
    #[regex(r"[\[\{\(]<[^<>\r\n\]\}\)]*>[\]\}\)]", priority = 1)]
    Tag,

    #[regex(r"\r?\n")]
    Newline,

    /// Horizontal whitespace, including the no-break spaces word processors
    /// use for indentation
    #[regex(r"[\p{Zs}\t]+")]
    Whitespace,

    /// `A.` / `A)`
    #[regex(r"[A-Z][.)]")]
    OptionMarker,

    #[token("[")]
    #[token("{")]
    #[token("(")]
    Open,

    #[regex(r"[^\s\[\{\(]+")]
    Text,
}

/// Why a tag-shaped sequence was kept as plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticReason {
    /// `[<...>]`, `{<...>}` or `(<...>)` with unknown content
    UnknownTag,
    /// `(CLOn)` with n outside 1-5
    CloOutOfRange,
    /// `{<0>}`, `(<0>)` or an index too large to represent
    InvalidIndex,
}

/// A tag-shaped sequence that degraded to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexDiagnostic {
    pub line: usize,
    pub text: String,
    pub reason: DiagnosticReason,
}

/// Output of [`lex`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Lexed {
    pub tokens: Vec<Spanned>,
    pub diagnostics: Vec<LexDiagnostic>,
}

impl Lexed {
    /// Drop line information.
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens.into_iter().map(|s| s.token).collect()
    }
}

/// Lex styled runs into tokens with line numbers and diagnostics.
///
/// The token stream always ends with exactly one [`Token::Eof`].
pub fn lex(runs: &[StyledRun]) -> Lexed {
    let mut scanner = Scanner::new();
    for run in runs {
        scanner.scan_run(run);
    }
    scanner.finish()
}

/// Lex styled runs into tokens.
pub fn tokenize(runs: &[StyledRun]) -> Vec<Token> {
    lex(runs).into_tokens()
}

/// Lex unstyled text, as if it were a single run with no emphasis.
pub fn lex_str(text: &str) -> Lexed {
    lex(&[StyledRun::plain(text)])
}

/// Token builder that carries line state across runs.
struct Scanner {
    tokens: Vec<Spanned>,
    diagnostics: Vec<LexDiagnostic>,
    /// Text being accumulated, with the line it started on.
    pending: Option<(TextRun, usize)>,
    line: usize,
    line_has_content: bool,
}

impl Scanner {
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            diagnostics: Vec::new(),
            pending: None,
            line: 1,
            line_has_content: false,
        }
    }

    fn scan_run(&mut self, run: &StyledRun) {
        let emphasized = run.emphasized;
        let mut lexer = Lexeme::lexer(&run.text);

        while let Some(result) = lexer.next() {
            let slice = lexer.slice();
            match result {
                Ok(Lexeme::GroupStart) => self.marker(Token::GroupStart),
                Ok(Lexeme::GroupStimulusEnd) => self.marker(Token::GroupStimulusEnd),
                Ok(Lexeme::GroupEnd) => self.marker(Token::GroupEnd),
                Ok(Lexeme::QuestionBreak) => self.marker(Token::QuestionBreak),
                Ok(Lexeme::Clo) => match clo_level(slice) {
                    Some(level) => self.marker(Token::CloTag(level)),
                    None => self.degrade(slice, emphasized, DiagnosticReason::CloOutOfRange),
                },
                Ok(Lexeme::Blank) => match marker_index(slice) {
                    Some(n) => self.marker(Token::BlankRef(n)),
                    None => self.degrade(slice, emphasized, DiagnosticReason::InvalidIndex),
                },
                Ok(Lexeme::SubQuestion) => match marker_index(slice) {
                    Some(n) => self.marker(Token::SubQuestionRef(n)),
                    None => self.degrade(slice, emphasized, DiagnosticReason::InvalidIndex),
                },
                Ok(Lexeme::Audio) => {
                    let media = media_ref(MediaKind::Audio, slice).at_line(self.line);
                    self.marker(Token::MediaRef(media))
                }
                Ok(Lexeme::Image) => {
                    let media = media_ref(MediaKind::Image, slice).at_line(self.line);
                    self.marker(Token::MediaRef(media))
                }
                Ok(Lexeme::Tag) => self.degrade(slice, emphasized, DiagnosticReason::UnknownTag),
                Ok(Lexeme::Newline) => self.line_break(),
                Ok(Lexeme::Whitespace) => self.text(slice, emphasized, false),
                Ok(Lexeme::OptionMarker) => {
                    let followed_by_space = lexer
                        .remainder()
                        .chars()
                        .next()
                        .is_none_or(char::is_whitespace);
                    if !self.line_has_content && followed_by_space {
                        self.answer_line(slice, emphasized);
                    } else {
                        self.text(slice, emphasized, true);
                    }
                }
                Ok(Lexeme::Open) | Ok(Lexeme::Text) => self.text(slice, emphasized, true),
                // Unmatched character (a lone `\r`, a vertical tab): keep it as text
                Err(()) => self.text(slice, emphasized, !slice.trim().is_empty()),
            }
        }

        // Emphasis may change at the next run
        self.flush_text();
    }

    fn finish(mut self) -> Lexed {
        self.flush_text();
        self.push(Token::Eof);
        Lexed {
            tokens: self.tokens,
            diagnostics: self.diagnostics,
        }
    }

    fn push(&mut self, token: Token) {
        self.tokens.push(Spanned {
            token,
            line: self.line,
        });
    }

    fn marker(&mut self, token: Token) {
        self.flush_text();
        self.push(token);
        self.line_has_content = true;
    }

    fn answer_line(&mut self, slice: &str, emphasized: bool) {
        // The regex guarantees an ASCII capital first
        let letter = slice.chars().next().unwrap_or('A');
        self.marker(Token::AnswerLine {
            letter,
            run: TextRun::new(slice, emphasized),
        });
    }

    fn line_break(&mut self) {
        self.flush_text();
        self.push(Token::LineBreak);
        self.line += 1;
        self.line_has_content = false;
    }

    fn degrade(&mut self, slice: &str, emphasized: bool, reason: DiagnosticReason) {
        self.diagnostics.push(LexDiagnostic {
            line: self.line,
            text: slice.to_string(),
            reason,
        });
        self.text(slice, emphasized, true);
    }

    fn text(&mut self, slice: &str, emphasized: bool, is_content: bool) {
        let same_emphasis = self
            .pending
            .as_ref()
            .is_some_and(|(run, _)| run.emphasized == emphasized);
        if same_emphasis {
            if let Some((run, _)) = self.pending.as_mut() {
                run.content.push_str(slice);
            }
        } else {
            self.flush_text();
            self.pending = Some((TextRun::new(slice, emphasized), self.line));
        }
        if is_content {
            self.line_has_content = true;
        }
    }

    fn flush_text(&mut self) {
        if let Some((run, line)) = self.pending.take() {
            self.tokens.push(Spanned {
                token: Token::TextRun(run),
                line,
            });
        }
    }
}

fn clo_level(slice: &str) -> Option<CloLevel> {
    let digits = slice.get(4..slice.len().saturating_sub(1))?;
    digits.parse::<u32>().ok().and_then(CloLevel::from_number)
}

/// Digits inside `{< n >}` / `(< n >)`. Indices are 1-based.
fn marker_index(slice: &str) -> Option<u32> {
    let digits: String = slice.chars().filter(char::is_ascii_digit).collect();
    digits.parse::<u32>().ok().filter(|n| *n > 0)
}

fn media_ref(kind: MediaKind, slice: &str) -> MediaRef {
    let inner = slice.strip_suffix(']').unwrap_or(slice);
    let path = inner.split_once(':').map(|(_, path)| path).unwrap_or("");
    MediaRef::new(kind, path.trim())
}
