//! # Answer Extraction
//!
//! Turns the tokens of one answer block into ordered [`Answer`]s.
//!
//! Correctness comes only from emphasis: an option is correct when any of its
//! visible content was bold or underlined in the source. Emphasis on the
//! marker itself (`A.`) or on whitespace does not count, since authors often
//! bold a whole line's prefix by accident.
//!
//! Letters are assigned by position. The letter written in the source is only
//! compared against the positional one and reported when they differ.
//!
//! A block is `Multiple` choice when more than one option is correct. Options
//! may be shuffled unless the last one refers to the others ("all of the
//! above", "tất cả đều đúng", ...), which only reads right in last place.

use exam_bank_syntax::{Spanned, Token};

use crate::diagnostics::{Location, Warning, WarningKind};
use crate::model::{Answer, ChoiceKind};

use super::inline::parse_rich_text;
use super::lines::LineJoiner;

const MAX_LETTERS: usize = 26;

/// Option texts that must stay last, matched case-insensitively.
const PINNED_LAST_OPTIONS: &[&str] = &[
    "all of the above",
    "none of the above",
    "tất cả đều đúng",
    "tất cả đều sai",
];

/// The finished options of one block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnswerSet {
    pub answers: Vec<Answer>,
    pub choice: ChoiceKind,
    pub shuffle: bool,
}

impl AnswerSet {
    fn new(answers: Vec<Answer>) -> Self {
        let choice = ChoiceKind::from_answers(&answers);
        let shuffle = shuffle_allowed(&answers);
        Self {
            answers,
            choice,
            shuffle,
        }
    }
}

/// False when the last option refers to the ones before it.
pub fn shuffle_allowed(answers: &[Answer]) -> bool {
    let Some(last) = answers.last() else {
        return true;
    };
    let text = last.content.plain_text().to_lowercase();
    !PINNED_LAST_OPTIONS.iter().any(|phrase| text.contains(phrase))
}

#[derive(Debug)]
struct OptionDraft {
    source_letter: char,
    line: usize,
    text: LineJoiner,
    emphasized: bool,
}

/// Option lines of one block, in encounter order.
#[derive(Debug, Default)]
pub struct AnswerBlock {
    options: Vec<OptionDraft>,
}

impl AnswerBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Feed one token. Only answer lines, text and line breaks are meaningful;
    /// text before the first answer line has no option to attach to and is ignored.
    pub fn push(&mut self, spanned: &Spanned) {
        match &spanned.token {
            Token::AnswerLine { letter, .. } => self.options.push(OptionDraft {
                source_letter: *letter,
                line: spanned.line,
                text: LineJoiner::new(),
                emphasized: false,
            }),
            Token::TextRun(run) => {
                if let Some(option) = self.options.last_mut() {
                    option.text.push(&run.content);
                    if run.emphasized && !run.is_blank() {
                        option.emphasized = true;
                    }
                }
            }
            Token::LineBreak => {
                if let Some(option) = self.options.last_mut() {
                    option.text.line_break();
                }
            }
            _ => {}
        }
    }

    /// Push plain text that came from a degraded marker.
    pub fn push_text(&mut self, text: &str) {
        if let Some(option) = self.options.last_mut() {
            option.text.push(text);
        }
    }

    /// Assign letters and correctness, reporting problems against `location`.
    pub fn finish(self, location: Location) -> (AnswerSet, Vec<Warning>) {
        let mut warnings = vec![];
        let first_line = self.options.first().map(|o| o.line);

        if self.options.len() > MAX_LETTERS {
            let line = self.options[MAX_LETTERS].line;
            warnings.push(
                Warning::new(WarningKind::TooManyOptions {
                    count: self.options.len(),
                })
                .at_line(line)
                .at(location),
            );
        }

        let mut answers = Vec::with_capacity(self.options.len());
        for (order, option) in self.options.into_iter().enumerate() {
            let letter = positional_letter(order);
            if letter != '?' && option.source_letter != letter {
                warnings.push(
                    Warning::new(WarningKind::LetterMismatch {
                        found: option.source_letter,
                        expected: letter,
                    })
                    .at_line(option.line)
                    .at(location),
                );
            }

            let parsed = parse_rich_text(&option.text.finish());
            if parsed.unbalanced {
                warnings.push(
                    Warning::new(WarningKind::UnbalancedLatex)
                        .at_line(option.line)
                        .at(location),
                );
            }

            answers.push(Answer {
                letter,
                content: parsed.text,
                is_correct: option.emphasized,
                order: order as u32,
            });
        }

        let correct = answers.iter().filter(|a| a.is_correct).count();
        if let Some(line) = first_line {
            match correct {
                0 => warnings.push(
                    Warning::new(WarningKind::NoCorrectAnswer)
                        .at_line(line)
                        .at(location),
                ),
                1 => {}
                count => warnings.push(
                    Warning::new(WarningKind::MultipleCorrectAnswers { count })
                        .at_line(line)
                        .at(location),
                ),
            }
        }

        (AnswerSet::new(answers), warnings)
    }
}

/// Extract answers from a complete block of tokens.
pub fn extract_answers(tokens: &[Spanned], location: Location) -> (AnswerSet, Vec<Warning>) {
    let mut block = AnswerBlock::new();
    for spanned in tokens {
        block.push(spanned);
    }
    block.finish(location)
}

fn positional_letter(order: usize) -> char {
    if order < MAX_LETTERS {
        (b'A' + order as u8) as char
    } else {
        '?'
    }
}
