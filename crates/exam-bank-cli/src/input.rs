use std::path::{Path, PathBuf};

use exam_bank_engine::StyledRun;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse styled runs in {path}: {source}")]
    RunsParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Read a document as styled runs.
///
/// `.json` files hold an array of `{ "text", "emphasized" }` objects as written
/// by the extraction step. Anything else is plain text, read as one
/// unemphasized run.
pub fn read_runs(path: &Path) -> Result<Vec<StyledRun>, InputError> {
    let content = std::fs::read_to_string(path).map_err(|source| InputError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    if is_json(path) {
        serde_json::from_str(&content).map_err(|source| InputError::RunsParseError {
            path: path.to_path_buf(),
            source,
        })
    } else {
        Ok(vec![StyledRun::plain(content)])
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
