//! # Media Resolution
//!
//! Media references come straight from author-typed markup, so paths are
//! normalized before anything is forwarded to storage:
//!
//! - separators unified to `/`, `./` and empty segments dropped
//! - absolute paths, drive letters, URLs, empty paths and `..` refused
//!
//! Refused references are removed from the tree. Accepted ones are rewritten
//! to their normalized form and requested once per distinct path.
//!
//! [`merge_urls`] is the inverse step: storage answers with a URL per
//! normalized path, and the URLs are written back into the tree.

use std::collections::{HashMap, HashSet};

use exam_bank_syntax::MediaKind;
use relative_path::{Component, RelativePath};
use serde::Serialize;

use crate::diagnostics::{InvalidPathReason, Location, Warning, WarningKind};
use crate::model::QuestionBank;

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "m4a", "aac", "flac"];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "svg"];

/// One file the storage collaborator must provide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaRequest {
    pub kind: MediaKind,
    pub normalized_path: String,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub bank: QuestionBank,
    pub requests: Vec<MediaRequest>,
    pub warnings: Vec<Warning>,
}

/// Normalize a media path as written in the document.
pub fn normalize_path(raw: &str) -> Result<String, InvalidPathReason> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(InvalidPathReason::Empty);
    }
    if raw.contains("://") {
        return Err(InvalidPathReason::UrlScheme);
    }
    if raw.starts_with('/') || raw.starts_with('\\') || has_drive_letter(raw) {
        return Err(InvalidPathReason::Absolute);
    }

    let unified = raw.replace('\\', "/");
    let mut parts = vec![];
    for component in RelativePath::new(&unified).components() {
        match component {
            Component::ParentDir => return Err(InvalidPathReason::ParentTraversal),
            Component::CurDir => {}
            Component::Normal(name) if name.is_empty() => {}
            Component::Normal(name) => parts.push(name),
        }
    }

    if parts.is_empty() {
        return Err(InvalidPathReason::Empty);
    }
    Ok(parts.join("/"))
}

fn has_drive_letter(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

fn file_name(path: &str) -> &str {
    RelativePath::new(path).file_name().unwrap_or(path)
}

fn extension_matches(kind: MediaKind, path: &str) -> bool {
    let Some(extension) = RelativePath::new(path).extension() else {
        return false;
    };
    let extension = extension.to_ascii_lowercase();
    let known = match kind {
        MediaKind::Audio => AUDIO_EXTENSIONS,
        MediaKind::Image => IMAGE_EXTENSIONS,
    };
    known.contains(&extension.as_str())
}

/// Normalize every media reference in the bank and collect storage requests.
pub fn resolve(mut bank: QuestionBank, check_extensions: bool) -> Resolution {
    let mut requests = vec![];
    let mut warnings = vec![];
    let mut seen = HashSet::new();

    for (ordinal, question) in bank.questions.iter_mut().enumerate() {
        let question_line = question.line();
        for (child, list) in question.media_lists_mut() {
            let location = match child {
                Some(index) => Location::child(ordinal + 1, index),
                None => Location::question(ordinal + 1),
            };

            let refs = std::mem::take(list);
            for mut media in refs {
                let line = media.line.unwrap_or(question_line);
                let path = match normalize_path(&media.raw_path) {
                    Ok(path) => path,
                    Err(reason) => {
                        warnings.push(
                            Warning::new(WarningKind::InvalidMediaPath {
                                path: media.raw_path.clone(),
                                reason,
                            })
                            .at_line(line)
                            .at(location),
                        );
                        continue;
                    }
                };

                if seen.insert(path.clone()) {
                    if check_extensions && !extension_matches(media.kind, &path) {
                        warnings.push(
                            Warning::new(WarningKind::UnexpectedExtension {
                                path: path.clone(),
                                media: media.kind,
                            })
                            .at_line(line)
                            .at(location),
                        );
                    }
                    requests.push(MediaRequest {
                        kind: media.kind,
                        file_name: file_name(&path).to_string(),
                        normalized_path: path.clone(),
                    });
                } else {
                    warnings.push(
                        Warning::new(WarningKind::DuplicateMedia { path: path.clone() })
                            .at_line(line)
                            .at(location),
                    );
                }

                media.raw_path = path;
                list.push(media);
            }
        }
    }

    log::debug!(
        "resolved {} media requests, {} media warnings",
        requests.len(),
        warnings.len()
    );

    Resolution {
        bank,
        requests,
        warnings,
    }
}

/// Write storage URLs back into the tree, keyed by normalized path.
///
/// References without an entry in `urls` keep their current `url`.
pub fn merge_urls(mut bank: QuestionBank, urls: &HashMap<String, String>) -> QuestionBank {
    for question in &mut bank.questions {
        for (_, list) in question.media_lists_mut() {
            for media in list.iter_mut() {
                if let Some(url) = urls.get(&media.raw_path) {
                    media.url = Some(url.clone());
                }
            }
        }
    }
    bank
}
