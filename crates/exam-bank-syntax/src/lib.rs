//! # exam-bank-syntax
//!
//! Lexing for the exam-bank question markup dialect, built on [Logos].
//!
//! [Logos]: https://docs.rs/logos
//!
//! ## Input
//!
//! Documents arrive already extracted into styled runs ([`StyledRun`]): plain
//! text in reading order, each run flagged as emphasized when the source run
//! was bold or underlined. Emphasis is how authors mark the correct answer, so
//! it has to survive lexing.
//!
//! ## The Dialect
//!
//! ```text
//! [<sg>]            group start
//! [<egc>]           end of group stimulus
//! [</sg>]           group end
//! [<br>]            question separator
//! (CLO1)..(CLO5)    learning outcome tag
//! {<n>}             blank reference (trailing underscores swallowed)
//! (<n>)             sub-question reference
//! [audio: path]     media reference
//! [image: path]
//! A. / A)           answer marker at the start of a line
//! ```
//!
//! Text between markers keeps its emphasis, and line structure survives as
//! [`Token::LineBreak`] so the engine can apply line-based rules.
//!
//! ## Quick Start
//!
//! ```
//! use exam_bank_syntax::{lex_str, Token, CloLevel};
//!
//! let lexed = lex_str("(CLO2) Pick one\nA. yes");
//! let tokens = lexed.into_tokens();
//!
//! assert_eq!(tokens[0], Token::CloTag(CloLevel::Clo2));
//! assert!(matches!(tokens[3], Token::AnswerLine { letter: 'A', .. }));
//! assert_eq!(tokens.last(), Some(&Token::Eof));
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! exam-bank-syntax/
//! ├── lib.rs    # This file - public API
//! ├── run.rs    # StyledRun, the extraction input
//! ├── token.rs  # Token, CloLevel, MediaRef, TextRun
//! └── lexer.rs  # Logos-based scanner
//! ```

pub mod lexer;
pub mod run;
pub mod token;

pub use lexer::{DiagnosticReason, LexDiagnostic, Lexed, lex, lex_str, tokenize};
pub use run::StyledRun;
pub use token::{CloLevel, MediaKind, MediaRef, Spanned, TextRun, Token};
