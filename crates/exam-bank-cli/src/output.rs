use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use exam_bank_engine::Ingested;
use thiserror::Error;

/// Output targets that would lose data if written.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("{first} and {second} would both be written to {target}")]
    SharedTarget {
        target: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },
    #[error("output {target} would overwrite input {input}")]
    OverwritesInput { target: PathBuf, input: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// `{ questions, media_requests, statistics }` per document
    Json,
    /// Counts and warnings, one block per document
    Summary,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Summary => "txt",
        }
    }
}

pub fn render_json(ingested: &Ingested, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(ingested)
    } else {
        serde_json::to_string(ingested)
    }
}

pub fn render_summary(source: &Path, ingested: &Ingested) -> String {
    let stats = &ingested.statistics;
    let mut out = format!("{}: {stats}\n", source.display());
    if !stats.clo_coverage.is_empty() {
        let coverage: Vec<String> = stats
            .clo_coverage
            .iter()
            .map(|(clo, count)| format!("{clo}={count}"))
            .collect();
        let _ = writeln!(out, "  coverage: {}", coverage.join(", "));
    }
    for warning in &stats.warnings {
        let _ = writeln!(out, "  {warning}");
    }
    out
}

pub fn render(source: &Path, ingested: &Ingested, format: Format, pretty: bool) -> Result<String> {
    match format {
        Format::Json => {
            let mut json = render_json(ingested, pretty)
                .with_context(|| format!("serializing {}", source.display()))?;
            json.push('\n');
            Ok(json)
        }
        Format::Summary => Ok(render_summary(source, ingested)),
    }
}

/// Where a document's rendering goes when an output directory is set:
/// `<dir>/<stem>.<json|txt>`.
pub fn output_path(dir: &Path, source: &Path, format: Format) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    dir.join(format!("{stem}.{}", format.extension()))
}

/// Output file for each source, in order, once no two sources share a target
/// and no target is one of the inputs. `dir` must already exist.
pub fn plan_outputs(
    dir: &Path,
    sources: &[PathBuf],
    format: Format,
) -> Result<Vec<PathBuf>, OutputError> {
    let dir = std::fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
    let inputs: Vec<PathBuf> = sources.iter().map(|s| canonical(s)).collect();

    let mut targets: Vec<PathBuf> = Vec::with_capacity(sources.len());
    for (i, source) in sources.iter().enumerate() {
        let target = output_path(&dir, source, format);
        if let Some(j) = targets.iter().position(|t| *t == target) {
            return Err(OutputError::SharedTarget {
                target,
                first: sources[j].clone(),
                second: source.clone(),
            });
        }
        if let Some(k) = inputs.iter().position(|input| *input == target) {
            return Err(OutputError::OverwritesInput {
                target,
                input: sources[k].clone(),
            });
        }
        log::trace!("{} -> {}", inputs[i].display(), target.display());
        targets.push(target);
    }
    Ok(targets)
}

fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_bank_engine::{ParseOptions, ingest_str};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample() -> Ingested {
        ingest_str("(CLO2) Pick one\nA. x\nB. y\n", &ParseOptions::default()).unwrap()
    }

    #[test]
    fn json_has_top_level_sections() {
        let json = render_json(&sample(), false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["questions"].as_array().unwrap().len(), 1);
        assert!(value["media_requests"].as_array().unwrap().is_empty());
        assert_eq!(value["statistics"]["total"], 1);
        assert!(!json.contains('\n'));
    }

    #[test]
    fn pretty_json_is_multiline() {
        let json = render_json(&sample(), true).unwrap();
        assert!(json.lines().count() > 1);
    }

    #[test]
    fn summary_lists_warnings() {
        let summary = render_summary(Path::new("exam.txt"), &sample());
        let lines: Vec<&str> = summary.lines().collect();

        assert!(lines[0].starts_with("exam.txt: 1 questions (1 single"));
        assert_eq!(lines[1], "  coverage: CLO2=1");
        assert!(lines[2].contains("no correct answer marked"));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn output_path_uses_stem_and_format() {
        assert_eq!(
            output_path(Path::new("out"), Path::new("in/midterm.json"), Format::Json),
            PathBuf::from("out/midterm.json")
        );
        assert_eq!(
            output_path(Path::new("out"), Path::new("final.txt"), Format::Summary),
            PathBuf::from("out/final.txt")
        );
    }

    #[test]
    fn plan_refuses_to_overwrite_an_input() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("quiz.json");
        std::fs::write(&source, "[]").unwrap();

        let err = plan_outputs(temp_dir.path(), &[source], Format::Json).unwrap_err();
        assert!(matches!(err, OutputError::OverwritesInput { .. }), "{err}");
    }

    #[test]
    fn plan_refuses_sources_with_the_same_stem() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a");
        let b = temp_dir.path().join("b");
        let out = temp_dir.path().join("out");
        for dir in [&a, &b, &out] {
            std::fs::create_dir_all(dir).unwrap();
        }
        std::fs::write(a.join("quiz.txt"), "Q\nA. x\n").unwrap();
        std::fs::write(b.join("quiz.txt"), "Q\nA. y\n").unwrap();

        let sources = [a.join("quiz.txt"), b.join("quiz.txt")];
        let err = plan_outputs(&out, &sources, Format::Json).unwrap_err();
        match err {
            OutputError::SharedTarget { first, second, .. } => {
                assert_eq!(first, sources[0]);
                assert_eq!(second, sources[1]);
            }
            other => panic!("expected shared target, got {other:?}"),
        }
    }

    #[test]
    fn plan_keeps_source_order() {
        let temp_dir = TempDir::new().unwrap();
        let sources = [PathBuf::from("midterm.txt"), PathBuf::from("final.json")];

        let targets = plan_outputs(temp_dir.path(), &sources, Format::Summary).unwrap();
        let names: Vec<_> = targets.iter().map(|t| t.file_name().unwrap()).collect();
        assert_eq!(names, vec!["midterm.txt", "final.txt"]);
    }
}
