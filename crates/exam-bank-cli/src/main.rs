mod input;
mod output;

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use exam_bank_config::Config;
use exam_bank_engine::{Ingested, ParseOptions, ingest};
use rayon::prelude::*;

use crate::output::Format;

/// Ingest exam documents into a structured question bank.
#[derive(Debug, Parser)]
#[command(name = "exam-bank", version, about)]
struct Cli {
    /// Config file (defaults to ~/.config/exam-bank/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Write one file per document here instead of stdout
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Plain-text documents, or `.json` arrays of styled runs
    #[arg(required = true, value_name = "FILES")]
    files: Vec<PathBuf>,
}

fn parse_options(config: &Config) -> ParseOptions {
    ParseOptions {
        blank_line_closes_question: config.parse.blank_line_closes_question,
        check_media_extensions: config.parse.check_media_extensions,
    }
}

fn ingest_file(path: &Path, options: &ParseOptions) -> Result<Ingested> {
    let runs = input::read_runs(path)?;
    let ingested = ingest(&runs, options).with_context(|| format!("parsing {}", path.display()))?;
    log::debug!(
        "{}: {} questions, {} warnings",
        path.display(),
        ingested.statistics.total,
        ingested.statistics.warnings.len()
    );
    Ok(ingested)
}

fn emit(
    source: &Path,
    ingested: &Ingested,
    format: Format,
    pretty: bool,
    target: Option<&Path>,
) -> Result<()> {
    let rendered = output::render(source, ingested, format, pretty)?;
    match target {
        Some(target) => {
            std::fs::write(target, rendered)
                .with_context(|| format!("writing {}", target.display()))?;
            log::info!("{} -> {}", source.display(), target.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();

    let config = match Config::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(2);
        }
    };
    let options = parse_options(&config);

    // Targets are checked before anything is ingested or written.
    let targets: Vec<Option<PathBuf>> = match cli.output.or(config.output.dir) {
        Some(dir) => {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("creating output directory {}", dir.display()))?;
            output::plan_outputs(&dir, &cli.files, cli.format)?
                .into_iter()
                .map(Some)
                .collect()
        }
        None => vec![None; cli.files.len()],
    };

    // Documents are independent; results keep input order.
    let results: Vec<(&PathBuf, Result<Ingested>)> = cli
        .files
        .par_iter()
        .map(|path| (path, ingest_file(path, &options)))
        .collect();

    let mut failed = 0;
    for ((path, result), target) in results.into_iter().zip(&targets) {
        match result {
            Ok(ingested) => emit(
                path,
                &ingested,
                cli.format,
                config.output.pretty,
                target.as_deref(),
            )?,
            Err(e) => {
                failed += 1;
                eprintln!("Error: {e:#}");
            }
        }
    }

    if failed > 0 {
        log::error!("{failed} of {} documents failed", cli.files.len());
        process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use exam_bank_config::ParseSection;
    use tempfile::TempDir;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_flags_and_files() {
        let cli = Cli::try_parse_from([
            "exam-bank",
            "--format",
            "summary",
            "--output",
            "out",
            "a.txt",
            "b.json",
        ])
        .unwrap();

        assert_eq!(cli.format, Format::Summary);
        assert_eq!(cli.output, Some(PathBuf::from("out")));
        assert_eq!(cli.files, vec![PathBuf::from("a.txt"), PathBuf::from("b.json")]);
    }

    #[test]
    fn files_are_required() {
        assert!(Cli::try_parse_from(["exam-bank"]).is_err());
    }

    #[test]
    fn config_maps_to_parse_options() {
        let config = Config {
            parse: ParseSection {
                blank_line_closes_question: false,
                check_media_extensions: true,
            },
            ..Config::default()
        };
        let options = parse_options(&config);
        assert!(!options.blank_line_closes_question);
        assert!(options.check_media_extensions);
    }

    #[test]
    fn fatal_document_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.txt");
        std::fs::write(&path, "[<sg>]\nPassage\n(<1>) Q\nA. x\n").unwrap();

        let err = ingest_file(&path, &ParseOptions::default()).unwrap_err();
        assert!(format!("{err:#}").contains("broken.txt"));
    }

    #[test]
    fn writes_into_output_dir() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("quiz.txt");
        std::fs::write(&source, "Q\nA. x\n").unwrap();

        let ingested = ingest_file(&source, &ParseOptions::default()).unwrap();
        let out = temp_dir.path().join("out");
        std::fs::create_dir_all(&out).unwrap();
        let targets = output::plan_outputs(&out, &[source.clone()], Format::Json).unwrap();
        emit(&source, &ingested, Format::Json, false, Some(&targets[0])).unwrap();

        let written = std::fs::read_to_string(out.join("quiz.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["statistics"]["total"], 1);
    }

    #[test]
    fn output_dir_holding_the_inputs_is_refused() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("quiz.json");
        let runs = r#"[{"text": "Q\nA. "}, {"text": "x", "emphasized": true}]"#;
        std::fs::write(&source, runs).unwrap();

        let err = output::plan_outputs(temp_dir.path(), &[source.clone()], Format::Json)
            .unwrap_err();
        assert!(err.to_string().contains("would overwrite input"));
        assert_eq!(std::fs::read_to_string(&source).unwrap(), runs);
    }
}
