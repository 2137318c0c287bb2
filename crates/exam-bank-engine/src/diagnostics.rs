use std::fmt;

use exam_bank_syntax::{CloLevel, MediaKind};
use serde::Serialize;
use thiserror::Error;

/// Problems that make a document unusable. Parsing stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line {line}: group is never closed with [</sg>]")]
    UnterminatedGroup { line: usize },

    #[error("line {line}: [<sg>] inside the group opened on line {outer_line}")]
    NestedGroup { line: usize, outer_line: usize },

    #[error("line {line}: stimulus references {reference} but the group has no answer block for it")]
    MissingAnswerBlock { line: usize, reference: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

/// Where in the question tree a warning applies.
///
/// `question` is the 1-based ordinal of the top-level question; `child` is the
/// sub-question or blank index inside a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub question: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child: Option<u32>,
}

impl Location {
    pub fn question(question: usize) -> Self {
        Self {
            question,
            child: None,
        }
    }

    pub fn child(question: usize, child: u32) -> Self {
        Self {
            question,
            child: Some(child),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.child {
            Some(child) => write!(f, "question {} #{child}", self.question),
            None => write!(f, "question {}", self.question),
        }
    }
}

/// Why a media path was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidPathReason {
    Empty,
    Absolute,
    UrlScheme,
    ParentTraversal,
}

impl fmt::Display for InvalidPathReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InvalidPathReason::Empty => "empty path",
            InvalidPathReason::Absolute => "absolute path",
            InvalidPathReason::UrlScheme => "URL instead of a relative path",
            InvalidPathReason::ParentTraversal => "path escapes the document folder",
        })
    }
}

/// Every recoverable authoring problem the pipeline reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WarningKind {
    /// Tag-shaped text the lexer could not interpret.
    MalformedTag { text: String },
    NoCorrectAnswer,
    MultipleCorrectAnswers { count: usize },
    LetterMismatch { found: char, expected: char },
    TooManyOptions { count: usize },
    NoAnswers,
    EmptyContent,
    EmptyGroup,
    DanglingCloTag { clo: CloLevel },
    CloTagReplaced { previous: CloLevel, current: CloLevel },
    ExtraCloTag { clo: CloLevel },
    StrayMarker { marker: String },
    MissingStimulusEnd,
    TextOutsideChild,
    DuplicateIndex { index: u32 },
    /// Inclusive `(first, last)` runs of undeclared indices below the highest one.
    IndexGap { ranges: Vec<(u32, u32)> },
    UnreferencedBlank { index: u32 },
    UnbalancedLatex,
    InvalidMediaPath { path: String, reason: InvalidPathReason },
    DuplicateMedia { path: String },
    UnexpectedExtension { path: String, media: MediaKind },
}

impl WarningKind {
    pub fn severity(&self) -> Severity {
        match self {
            WarningKind::MultipleCorrectAnswers { .. }
            | WarningKind::LetterMismatch { .. }
            | WarningKind::UnexpectedExtension { .. } => Severity::Info,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningKind::MalformedTag { text } => write!(f, "unrecognized tag {text:?} kept as text"),
            WarningKind::NoCorrectAnswer => f.write_str("no correct answer marked"),
            WarningKind::MultipleCorrectAnswers { count } => {
                write!(f, "{count} answers marked correct")
            }
            WarningKind::LetterMismatch { found, expected } => {
                write!(f, "option written as {found} is option {expected} by position")
            }
            WarningKind::TooManyOptions { count } => {
                write!(f, "{count} options, letters stop at Z")
            }
            WarningKind::NoAnswers => f.write_str("question has no answers"),
            WarningKind::EmptyContent => f.write_str("question content is empty"),
            WarningKind::EmptyGroup => f.write_str("group has no sub-questions"),
            WarningKind::DanglingCloTag { clo } => {
                write!(f, "({clo}) tag is not followed by a question")
            }
            WarningKind::CloTagReplaced { previous, current } => {
                write!(f, "({current}) replaces earlier ({previous}) tag")
            }
            WarningKind::ExtraCloTag { clo } => {
                write!(f, "group is already tagged, ({clo}) ignored")
            }
            WarningKind::StrayMarker { marker } => write!(f, "{marker} out of place, kept as text"),
            WarningKind::MissingStimulusEnd => f.write_str("group closed before [<egc>]"),
            WarningKind::TextOutsideChild => {
                f.write_str("text before the first sub-question marker dropped")
            }
            WarningKind::DuplicateIndex { index } => write!(f, "index {index} declared twice"),
            WarningKind::IndexGap { ranges } => {
                let ranges: Vec<String> = ranges
                    .iter()
                    .map(|&(first, last)| {
                        if first == last {
                            first.to_string()
                        } else {
                            format!("{first}-{last}")
                        }
                    })
                    .collect();
                write!(f, "missing index {}", ranges.join(", "))
            }
            WarningKind::UnreferencedBlank { index } => {
                write!(f, "blank {index} is never referenced in the stimulus")
            }
            WarningKind::UnbalancedLatex => f.write_str("unbalanced $ delimiter"),
            WarningKind::InvalidMediaPath { path, reason } => {
                write!(f, "media {path:?} rejected: {reason}")
            }
            WarningKind::DuplicateMedia { path } => write!(f, "media {path:?} referenced again"),
            WarningKind::UnexpectedExtension { path, media } => {
                write!(f, "{path:?} does not look like an {media} file")
            }
        }
    }
}

/// A recorded, non-fatal problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(flatten)]
    pub kind: WarningKind,
}

impl Warning {
    pub fn new(kind: WarningKind) -> Self {
        Self {
            severity: kind.severity(),
            line: None,
            location: None,
            kind,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn is_info(&self) -> bool {
        self.severity == Severity::Info
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
        };
        write!(f, "{label}")?;
        if let Some(line) = self.line {
            write!(f, " line {line}")?;
        }
        if let Some(location) = self.location {
            write!(f, " ({location})")?;
        }
        write!(f, ": {}", self.kind)
    }
}
