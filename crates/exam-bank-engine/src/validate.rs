use std::collections::BTreeMap;
use std::fmt;

use exam_bank_syntax::CloLevel;
use serde::Serialize;

use crate::diagnostics::{Severity, Warning};
use crate::media::MediaRequest;
use crate::model::{Question, QuestionBank, QuestionType};

/// Counts over a finished bank, plus every warning raised while building it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Statistics {
    pub total: usize,
    pub by_type: BTreeMap<QuestionType, usize>,
    pub sub_question_count: usize,
    pub blank_count: usize,
    pub answer_count: usize,
    /// Top-level questions carrying a CLO tag.
    pub tagged_clo_count: usize,
    /// Histogram over top-level questions and sub-questions.
    pub clo_coverage: BTreeMap<CloLevel, usize>,
    /// Distinct media files requested.
    pub media_count: usize,
    pub questions_with_media: usize,
    pub warnings: Vec<Warning>,
}

impl Statistics {
    pub fn count(&self, kind: QuestionType) -> usize {
        self.by_type.get(&kind).copied().unwrap_or(0)
    }

    pub fn warning_count(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| w.severity == Severity::Warning)
            .count()
    }

    pub fn info_count(&self) -> usize {
        self.warnings.iter().filter(|w| w.is_info()).count()
    }

    /// Warnings only, without informational notes.
    pub fn is_clean(&self) -> bool {
        self.warning_count() == 0
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} questions ({} single, {} group, {} fill-blank), {} sub-questions, {} blanks, {} answers",
            self.total,
            self.count(QuestionType::Single),
            self.count(QuestionType::Group),
            self.count(QuestionType::FillBlank),
            self.sub_question_count,
            self.blank_count,
            self.answer_count,
        )?;
        write!(
            f,
            "; {} tagged, {} media files in {} questions; {} warnings, {} notes",
            self.tagged_clo_count,
            self.media_count,
            self.questions_with_media,
            self.warning_count(),
            self.info_count(),
        )
    }
}

/// Compute statistics for a bank. Pure; `warnings` is carried through as-is.
pub fn statistics(
    bank: &QuestionBank,
    requests: &[MediaRequest],
    warnings: Vec<Warning>,
) -> Statistics {
    let mut stats = Statistics {
        total: bank.len(),
        media_count: requests.len(),
        warnings,
        ..Statistics::default()
    };

    for question in &bank.questions {
        *stats.by_type.entry(question.kind()).or_insert(0) += 1;
        stats.answer_count += question.answers().count();

        if let Some(clo) = question.clo() {
            stats.tagged_clo_count += 1;
            *stats.clo_coverage.entry(clo).or_insert(0) += 1;
        }
        if question.has_media() {
            stats.questions_with_media += 1;
        }

        match question {
            Question::Single(_) => {}
            Question::Group(group) => {
                stats.sub_question_count += group.children.len();
                for clo in group.children.iter().filter_map(|c| c.clo) {
                    *stats.clo_coverage.entry(clo).or_insert(0) += 1;
                }
            }
            Question::FillBlank(fill) => stats.blank_count += fill.blanks.len(),
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::WarningKind;
    use crate::model::{Answer, ChoiceKind, GroupQuestion, RichText, SingleQuestion, SubQuestion};
    use exam_bank_syntax::{MediaKind, MediaRef};
    use pretty_assertions::assert_eq;

    fn answer(letter: char, is_correct: bool, order: u32) -> Answer {
        Answer {
            letter,
            content: RichText::plain("x"),
            is_correct,
            order,
        }
    }

    fn sub(index: u32, clo: Option<CloLevel>) -> SubQuestion {
        SubQuestion {
            index,
            clo,
            content: RichText::default(),
            answers: vec![answer('A', true, 0), answer('B', false, 1)],
            choice: ChoiceKind::Single,
            shuffle: true,
            media: vec![],
        }
    }

    #[test]
    fn counts_over_mixed_bank() {
        let bank = QuestionBank::new(vec![
            Question::Single(SingleQuestion {
                line: 1,
                clo: Some(CloLevel::Clo1),
                content: RichText::plain("q"),
                answers: vec![answer('A', true, 0)],
                choice: ChoiceKind::Single,
                shuffle: true,
                media: vec![MediaRef::new(MediaKind::Image, "a.png")],
            }),
            Question::Group(GroupQuestion {
                line: 3,
                clo: Some(CloLevel::Clo2),
                stimulus: RichText::plain("passage"),
                stimulus_media: vec![],
                children: vec![sub(1, Some(CloLevel::Clo2)), sub(2, Some(CloLevel::Clo3))],
            }),
        ]);
        let warnings = vec![
            Warning::new(WarningKind::NoCorrectAnswer),
            Warning::new(WarningKind::MultipleCorrectAnswers { count: 2 }),
        ];

        let stats = statistics(&bank, &[], warnings);

        assert_eq!(stats.total, 2);
        assert_eq!(stats.count(QuestionType::Single), 1);
        assert_eq!(stats.count(QuestionType::Group), 1);
        assert_eq!(stats.count(QuestionType::FillBlank), 0);
        assert_eq!(stats.sub_question_count, 2);
        assert_eq!(stats.answer_count, 5);
        assert_eq!(stats.tagged_clo_count, 2);
        assert_eq!(
            stats.clo_coverage,
            BTreeMap::from([
                (CloLevel::Clo1, 1),
                (CloLevel::Clo2, 2),
                (CloLevel::Clo3, 1)
            ])
        );
        assert_eq!(stats.questions_with_media, 1);
        assert_eq!(stats.warning_count(), 1);
        assert_eq!(stats.info_count(), 1);
        assert!(!stats.is_clean());
    }

    #[test]
    fn empty_bank() {
        let stats = statistics(&QuestionBank::default(), &[], vec![]);
        assert_eq!(stats, Statistics::default());
        assert!(stats.is_clean());
    }

    #[test]
    fn summary_line() {
        let stats = statistics(&QuestionBank::default(), &[], vec![]);
        insta::assert_snapshot!(stats.to_string(), @"0 questions (0 single, 0 group, 0 fill-blank), 0 sub-questions, 0 blanks, 0 answers; 0 tagged, 0 media files in 0 questions; 0 warnings, 0 notes");
    }
}
