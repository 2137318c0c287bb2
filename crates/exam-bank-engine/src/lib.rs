//! # exam-bank-engine
//!
//! Turns lexed exam documents into a structured question bank.
//!
//! ```text
//! StyledRuns → lex → parse (state machine) → media::resolve → validate::statistics
//!              │     ├── answers (emphasis → correctness)
//!              │     └── inline (LaTeX spans)
//!              └── exam-bank-syntax
//! ```
//!
//! [`ingest`] runs the whole pipeline. Each stage is also public so callers
//! can stop early, e.g. to parse without resolving media.
//!
//! ```
//! use exam_bank_engine::{ingest, ParseOptions, Question};
//! use exam_bank_syntax::StyledRun;
//!
//! let runs = [
//!     StyledRun::plain("(CLO1) Which is a DBMS?\nA. Linux\nB. "),
//!     StyledRun::emphasized("PostgreSQL"),
//! ];
//! let ingested = ingest(&runs, &ParseOptions::default()).unwrap();
//!
//! let Question::Single(q) = &ingested.bank.questions[0] else { panic!() };
//! assert!(q.answers[1].is_correct);
//! assert_eq!(ingested.statistics.total, 1);
//! ```

pub mod diagnostics;
pub mod media;
pub mod model;
pub mod parsing;
pub mod pipeline;
pub mod validate;

pub use exam_bank_syntax::{CloLevel, MediaKind, MediaRef, StyledRun};

pub use diagnostics::{InvalidPathReason, Location, ParseError, Severity, Warning, WarningKind};
pub use media::{MediaRequest, Resolution, merge_urls, normalize_path, resolve};
pub use model::*;
pub use parsing::{ParseOptions, Parsed, parse};
pub use pipeline::{Ingested, ingest, ingest_str};
pub use validate::{Statistics, statistics};
