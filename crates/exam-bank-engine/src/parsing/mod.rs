//! # Structural Parsing
//!
//! Turns the lexer's token stream into a [`QuestionBank`].
//!
//! ## Architecture
//!
//! ```text
//! Lexed tokens → QuestionBuilder (state machine) → Questions + Warnings
//!                    ├── LineJoiner   stems, stimuli, prompts
//!                    ├── AnswerBlock  option lines → Answers
//!                    └── inline       joined text → RichText (LaTeX spans)
//! ```
//!
//! ## Modules
//!
//! - **`builder`**: `QuestionBuilder`, the explicit state machine
//! - **`answers`**: answer extraction, correctness from emphasis
//! - **`lines`**: line-joining text accumulator
//! - **`inline`**: `parse_rich_text()` with `try_parse_math` helper
//! - **`cursor`**: `Cursor` for byte-level inline parsing
//!
//! Authoring mistakes become [`Warning`]s and parsing continues. Only the
//! three structural failures in [`ParseError`] abort a document.

pub mod answers;
pub mod builder;
pub mod cursor;
pub mod inline;
pub mod lines;

use exam_bank_syntax::{Lexed, Token};

use crate::diagnostics::{ParseError, Warning, WarningKind};
use crate::model::QuestionBank;

pub use answers::{AnswerBlock, AnswerSet, extract_answers};
pub use builder::{QuestionBuilder, State};
pub use inline::{ParsedText, parse_rich_text};

/// Knobs for one ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// A blank line after an answer block ends the question unless another
    /// option line follows.
    pub blank_line_closes_question: bool,
    /// Note media files whose extension does not match their kind.
    pub check_media_extensions: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            blank_line_closes_question: true,
            check_media_extensions: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    pub bank: QuestionBank,
    pub warnings: Vec<Warning>,
}

/// Build the question tree from lexed tokens.
pub fn parse(lexed: &Lexed, options: &ParseOptions) -> Result<Parsed, ParseError> {
    let mut builder = QuestionBuilder::new(*options);

    for (pos, spanned) in lexed.tokens.iter().enumerate() {
        if spanned.token == Token::Eof {
            break;
        }
        builder.push(spanned, &lexed.tokens[pos + 1..])?;
    }

    let (questions, builder_warnings) = builder.finish()?;

    let mut warnings: Vec<Warning> = lexed
        .diagnostics
        .iter()
        .map(|d| {
            Warning::new(WarningKind::MalformedTag {
                text: d.text.clone(),
            })
            .at_line(d.line)
        })
        .collect();
    warnings.extend(builder_warnings);

    log::debug!(
        "parsed {} questions with {} warnings",
        questions.len(),
        warnings.len()
    );

    Ok(Parsed {
        bank: QuestionBank::new(questions),
        warnings,
    })
}
