use std::collections::HashMap;

use exam_bank_engine::{
    CloLevel, InvalidPathReason, Location, ParseError, ParseOptions, Question, QuestionType,
    WarningKind, ingest, ingest_str, merge_urls,
};
use exam_bank_syntax::{MediaKind, StyledRun};
use pretty_assertions::assert_eq;

fn fixture_runs(name: &str) -> Vec<StyledRun> {
    let json = std::fs::read_to_string(format!(
        "{}/tests/fixtures/{name}.json",
        env!("CARGO_MANIFEST_DIR")
    ))
    .unwrap();
    serde_json::from_str(&json).unwrap()
}

fn fixture_text(name: &str) -> String {
    std::fs::read_to_string(format!(
        "{}/tests/fixtures/{name}.txt",
        env!("CARGO_MANIFEST_DIR")
    ))
    .unwrap()
}

#[test]
fn midterm_structure() {
    let ingested = ingest(&fixture_runs("english_midterm"), &ParseOptions::default()).unwrap();

    let kinds: Vec<QuestionType> = ingested.bank.questions.iter().map(Question::kind).collect();
    assert_eq!(
        kinds,
        vec![
            QuestionType::Single,
            QuestionType::Single,
            QuestionType::Group,
            QuestionType::FillBlank,
            QuestionType::Single,
            QuestionType::Single,
        ]
    );

    let Question::Group(group) = &ingested.bank.questions[2] else {
        panic!("expected group");
    };
    assert_eq!(group.clo, Some(CloLevel::Clo3));
    assert_eq!(group.children.len(), 2);
    assert!(group.children.iter().all(|c| c.clo == Some(CloLevel::Clo3)));
    assert_eq!(group.stimulus_media[0].raw_path, "audio/part1.mp3");
    assert_eq!(group.children[1].media[0].raw_path, "images/chart.png");

    let Question::FillBlank(fill) = &ingested.bank.questions[3] else {
        panic!("expected fill-blank");
    };
    assert_eq!(
        fill.stimulus.to_string(),
        "Read and choose. Tom {<1>} football every Sunday and he {<2>} it very much."
    );
    let correct: Vec<String> = fill
        .blanks
        .iter()
        .flat_map(|b| b.answers.iter().filter(|a| a.is_correct))
        .map(|a| a.content.to_string())
        .collect();
    assert_eq!(correct, vec!["plays", "enjoys"]);

    let Question::Single(math) = &ingested.bank.questions[4] else {
        panic!("expected single");
    };
    assert!(math.content.has_latex());
    assert!(math.media.is_empty());
    assert!(math.answers[0].is_correct);
}

#[test]
fn midterm_statistics() {
    let ingested = ingest(&fixture_runs("english_midterm"), &ParseOptions::default()).unwrap();
    let stats = &ingested.statistics;

    assert_eq!(stats.total, 6);
    assert_eq!(stats.count(QuestionType::Single), 4);
    assert_eq!(stats.count(QuestionType::Group), 1);
    assert_eq!(stats.count(QuestionType::FillBlank), 1);
    assert_eq!(stats.sub_question_count, 2);
    assert_eq!(stats.blank_count, 2);
    assert_eq!(stats.answer_count, 20);
    assert_eq!(stats.tagged_clo_count, 5);
    assert_eq!(stats.clo_coverage.get(&CloLevel::Clo3), Some(&3));
    assert_eq!(stats.media_count, 2);
    assert_eq!(stats.questions_with_media, 1);

    let kinds: Vec<&WarningKind> = stats.warnings.iter().map(|w| &w.kind).collect();
    assert_eq!(
        kinds,
        vec![
            &WarningKind::NoCorrectAnswer,
            &WarningKind::InvalidMediaPath {
                path: "../../etc/passwd".to_string(),
                reason: InvalidPathReason::ParentTraversal,
            },
        ]
    );
    assert_eq!(stats.warnings[0].location, Some(Location::question(6)));
    assert_eq!(stats.warnings[1].location, Some(Location::question(5)));
}

#[test]
fn traversal_path_is_never_requested() {
    let ingested = ingest(&fixture_runs("english_midterm"), &ParseOptions::default()).unwrap();
    let paths: Vec<(MediaKind, &str)> = ingested
        .media_requests
        .iter()
        .map(|r| (r.kind, r.normalized_path.as_str()))
        .collect();
    assert_eq!(
        paths,
        vec![
            (MediaKind::Audio, "audio/part1.mp3"),
            (MediaKind::Image, "images/chart.png"),
        ]
    );
    assert_eq!(ingested.media_requests[1].file_name, "chart.png");
}

#[test]
fn urls_merge_back_into_tree() {
    let ingested = ingest(&fixture_runs("english_midterm"), &ParseOptions::default()).unwrap();
    let urls: HashMap<String, String> = ingested
        .media_requests
        .iter()
        .map(|r| {
            (
                r.normalized_path.clone(),
                format!("https://cdn.example/{}", r.file_name),
            )
        })
        .collect();

    let bank = merge_urls(ingested.bank, &urls);
    let merged: Vec<&str> = bank.media().filter_map(|m| m.url.as_deref()).collect();
    assert_eq!(
        merged,
        vec![
            "https://cdn.example/part1.mp3",
            "https://cdn.example/chart.png"
        ]
    );
}

#[test]
fn ingest_is_deterministic() {
    let runs = fixture_runs("english_midterm");
    let options = ParseOptions::default();
    assert_eq!(ingest(&runs, &options), ingest(&runs, &options));
}

#[test]
fn unterminated_group_fails_the_document() {
    let result = ingest_str(&fixture_text("broken_group"), &ParseOptions::default());
    assert_eq!(result, Err(ParseError::UnterminatedGroup { line: 5 }));
}

#[test]
fn json_output_shape() {
    let ingested = ingest_str(
        "(CLO2) Pick [image: a.png]\nA. x",
        &ParseOptions::default(),
    )
    .unwrap();
    let value = serde_json::to_value(&ingested).unwrap();

    assert_eq!(value["questions"][0]["type"], "single");
    assert_eq!(value["questions"][0]["clo"], "Clo2");
    assert_eq!(value["questions"][0]["content"][0]["kind"], "text");
    assert_eq!(value["questions"][0]["answers"][0]["letter"], "A");
    assert_eq!(value["questions"][0]["choice"], "single");
    assert_eq!(value["questions"][0]["shuffle"], true);
    assert_eq!(value["media_requests"][0]["kind"], "image");
    assert_eq!(value["statistics"]["by_type"]["single"], 1);
    assert_eq!(value["statistics"]["warnings"][0]["kind"], "no_correct_answer");
    assert_eq!(value["statistics"]["warnings"][0]["severity"], "warning");
}
