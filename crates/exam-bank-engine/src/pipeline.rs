use exam_bank_syntax::{StyledRun, lex};
use serde::Serialize;

use crate::diagnostics::ParseError;
use crate::media::{self, MediaRequest};
use crate::model::QuestionBank;
use crate::parsing::{self, ParseOptions};
use crate::validate::{self, Statistics};

/// Everything a caller needs from one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ingested {
    #[serde(rename = "questions")]
    pub bank: QuestionBank,
    pub media_requests: Vec<MediaRequest>,
    pub statistics: Statistics,
}

/// Run the whole pipeline over one document's styled runs.
///
/// Pure: the same runs and options always give the same result.
pub fn ingest(runs: &[StyledRun], options: &ParseOptions) -> Result<Ingested, ParseError> {
    let lexed = lex(runs);
    log::trace!("lexed {} tokens from {} runs", lexed.tokens.len(), runs.len());

    let parsed = parsing::parse(&lexed, options)?;
    let resolution = media::resolve(parsed.bank, options.check_media_extensions);

    let mut warnings = parsed.warnings;
    warnings.extend(resolution.warnings);
    let statistics = validate::statistics(&resolution.bank, &resolution.requests, warnings);

    Ok(Ingested {
        bank: resolution.bank,
        media_requests: resolution.requests,
        statistics,
    })
}

/// Convenience for unstyled text, mostly for tests and previews.
pub fn ingest_str(text: &str, options: &ParseOptions) -> Result<Ingested, ParseError> {
    ingest(&[StyledRun::plain(text)], options)
}
