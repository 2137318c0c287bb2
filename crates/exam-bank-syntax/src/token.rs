//! Token types shared by the lexer and the engine.
//!
//! Unlike a lossless CST, the exam dialect only needs a flat stream: markers
//! are reduced to their meaning (`CloTag(Clo2)`, `BlankRef(1)`), text keeps its
//! emphasis flag, and line structure survives as explicit [`Token::LineBreak`]s.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Course Learning Outcome level, `(CLO1)` through `(CLO5)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CloLevel {
    Clo1,
    Clo2,
    Clo3,
    Clo4,
    Clo5,
}

impl CloLevel {
    pub const ALL: [CloLevel; 5] = [
        CloLevel::Clo1,
        CloLevel::Clo2,
        CloLevel::Clo3,
        CloLevel::Clo4,
        CloLevel::Clo5,
    ];

    /// Maps the digit written in `(CLOn)` to a level. Only 1-5 are valid.
    pub fn from_number(n: u32) -> Option<Self> {
        match n {
            1 => Some(CloLevel::Clo1),
            2 => Some(CloLevel::Clo2),
            3 => Some(CloLevel::Clo3),
            4 => Some(CloLevel::Clo4),
            5 => Some(CloLevel::Clo5),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        self as u8 + 1
    }
}

impl fmt::Display for CloLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CLO{}", self.number())
    }
}

/// Kind of external media a document can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Image,
}

impl MediaKind {
    /// The keyword used in `[audio: ...]` / `[image: ...]`.
    pub fn keyword(self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Image => "image",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A reference to an external media file.
///
/// `url` stays `None` until the storage collaborator's answers are merged back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaRef {
    pub kind: MediaKind,
    pub raw_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Source line of the reference, when it came from a document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl MediaRef {
    pub fn new(kind: MediaKind, raw_path: impl Into<String>) -> Self {
        Self {
            kind,
            raw_path: raw_path.into(),
            url: None,
            line: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

/// A slice of source text with the emphasis flag of the run it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    pub content: String,
    pub emphasized: bool,
}

impl TextRun {
    pub fn new(content: impl Into<String>, emphasized: bool) -> Self {
        Self {
            content: content.into(),
            emphasized,
        }
    }

    /// True when the run carries visible characters.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// A token of the exam markup dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `[<sg>]`
    GroupStart,
    /// `[<egc>]`
    GroupStimulusEnd,
    /// `[</sg>]`
    GroupEnd,
    /// `[<br>]`
    QuestionBreak,
    /// `(CLOn)`
    CloTag(CloLevel),
    /// `{<n>}`
    BlankRef(u32),
    /// `(<n>)`
    SubQuestionRef(u32),
    /// `[audio: path]` or `[image: path]`
    MediaRef(MediaRef),
    /// `X.` or `X)` at the start of a line. `run` holds the marker text itself.
    AnswerLine { letter: char, run: TextRun },
    TextRun(TextRun),
    LineBreak,
    Eof,
}

impl Token {
    pub fn is_line_break(&self) -> bool {
        matches!(self, Token::LineBreak)
    }

    /// Whitespace-only text runs.
    pub fn is_blank_text(&self) -> bool {
        matches!(self, Token::TextRun(run) if run.is_blank())
    }

    /// Source form of the token, used when a marker degrades to plain text.
    pub fn source_text(&self) -> String {
        match self {
            Token::GroupStart => "[<sg>]".to_string(),
            Token::GroupStimulusEnd => "[<egc>]".to_string(),
            Token::GroupEnd => "[</sg>]".to_string(),
            Token::QuestionBreak => "[<br>]".to_string(),
            Token::CloTag(level) => format!("({level})"),
            Token::BlankRef(n) => format!("{{<{n}>}}"),
            Token::SubQuestionRef(n) => format!("(<{n}>)"),
            Token::MediaRef(media) => format!("[{}: {}]", media.kind, media.raw_path),
            Token::AnswerLine { run, .. } | Token::TextRun(run) => run.content.clone(),
            Token::LineBreak => "\n".to_string(),
            Token::Eof => String::new(),
        }
    }
}

/// A token together with the 1-based source line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    pub line: usize,
}
