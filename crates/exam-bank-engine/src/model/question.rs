use std::fmt;

use exam_bank_syntax::{CloLevel, MediaRef};
use serde::{Deserialize, Serialize};

use super::rich_text::RichText;

/// An answer option. `letter` is positional (A, B, C, ...), `order` is zero-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub letter: char,
    pub content: RichText,
    pub is_correct: bool,
    pub order: u32,
}

/// Whether an answer set expects one or several correct options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceKind {
    #[default]
    Single,
    Multiple,
}

impl ChoiceKind {
    /// `Multiple` only when more than one option is marked correct.
    pub fn from_answers(answers: &[Answer]) -> Self {
        if answers.iter().filter(|a| a.is_correct).count() > 1 {
            ChoiceKind::Multiple
        } else {
            ChoiceKind::Single
        }
    }
}

/// A stand-alone multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleQuestion {
    pub line: usize,
    pub clo: Option<CloLevel>,
    pub content: RichText,
    pub answers: Vec<Answer>,
    pub choice: ChoiceKind,
    /// Options may be presented in any order.
    pub shuffle: bool,
    pub media: Vec<MediaRef>,
}

/// A child of a group, keyed by its `(<n>)` index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubQuestion {
    pub index: u32,
    pub clo: Option<CloLevel>,
    pub content: RichText,
    pub answers: Vec<Answer>,
    pub choice: ChoiceKind,
    /// Options may be presented in any order.
    pub shuffle: bool,
    pub media: Vec<MediaRef>,
}

/// Shared stimulus with ordered sub-questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupQuestion {
    pub line: usize,
    pub clo: Option<CloLevel>,
    pub stimulus: RichText,
    pub stimulus_media: Vec<MediaRef>,
    pub children: Vec<SubQuestion>,
}

/// Options for one `{<n>}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlankAnswerSet {
    pub index: u32,
    pub prompt: RichText,
    pub answers: Vec<Answer>,
    pub choice: ChoiceKind,
    pub shuffle: bool,
    pub media: Vec<MediaRef>,
}

/// A passage with `{<n>}` placeholders and one answer set per placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillBlankQuestion {
    pub line: usize,
    pub clo: Option<CloLevel>,
    pub stimulus: RichText,
    pub stimulus_media: Vec<MediaRef>,
    pub blanks: Vec<BlankAnswerSet>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Question {
    Single(SingleQuestion),
    Group(GroupQuestion),
    FillBlank(FillBlankQuestion),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Single,
    Group,
    FillBlank,
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QuestionType::Single => "single",
            QuestionType::Group => "group",
            QuestionType::FillBlank => "fill-blank",
        })
    }
}

impl Question {
    pub fn kind(&self) -> QuestionType {
        match self {
            Question::Single(_) => QuestionType::Single,
            Question::Group(_) => QuestionType::Group,
            Question::FillBlank(_) => QuestionType::FillBlank,
        }
    }

    pub fn clo(&self) -> Option<CloLevel> {
        match self {
            Question::Single(q) => q.clo,
            Question::Group(q) => q.clo,
            Question::FillBlank(q) => q.clo,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            Question::Single(q) => q.line,
            Question::Group(q) => q.line,
            Question::FillBlank(q) => q.line,
        }
    }

    /// Every media list in the question, with the child index that owns it.
    pub fn media_lists(&self) -> Vec<(Option<u32>, &Vec<MediaRef>)> {
        match self {
            Question::Single(q) => vec![(None, &q.media)],
            Question::Group(q) => std::iter::once((None, &q.stimulus_media))
                .chain(q.children.iter().map(|c| (Some(c.index), &c.media)))
                .collect(),
            Question::FillBlank(q) => std::iter::once((None, &q.stimulus_media))
                .chain(q.blanks.iter().map(|b| (Some(b.index), &b.media)))
                .collect(),
        }
    }

    pub fn media_lists_mut(&mut self) -> Vec<(Option<u32>, &mut Vec<MediaRef>)> {
        match self {
            Question::Single(q) => vec![(None, &mut q.media)],
            Question::Group(q) => std::iter::once((None, &mut q.stimulus_media))
                .chain(q.children.iter_mut().map(|c| (Some(c.index), &mut c.media)))
                .collect(),
            Question::FillBlank(q) => std::iter::once((None, &mut q.stimulus_media))
                .chain(q.blanks.iter_mut().map(|b| (Some(b.index), &mut b.media)))
                .collect(),
        }
    }

    pub fn media(&self) -> impl Iterator<Item = &MediaRef> {
        self.media_lists().into_iter().flat_map(|(_, list)| list.iter())
    }

    pub fn has_media(&self) -> bool {
        self.media_lists().iter().any(|(_, list)| !list.is_empty())
    }

    /// All answers of the question, across children and blanks.
    pub fn answers(&self) -> Box<dyn Iterator<Item = &Answer> + '_> {
        match self {
            Question::Single(q) => Box::new(q.answers.iter()),
            Question::Group(q) => Box::new(q.children.iter().flat_map(|c| c.answers.iter())),
            Question::FillBlank(q) => Box::new(q.blanks.iter().flat_map(|b| b.answers.iter())),
        }
    }
}

/// The finished tree for one document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionBank {
    pub questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn media(&self) -> impl Iterator<Item = &MediaRef> {
        self.questions.iter().flat_map(|q| q.media())
    }
}
