//! Question assembly from the token stream.
//!
//! [`QuestionBuilder`] is fed one token at a time and moves between the
//! [`State`]s below. Top-level text forms single questions. `[<sg>]` opens a
//! group whose stimulus runs to `[<egc>]`; the body then holds `(<n>)` or
//! `{<n>}` children until `[</sg>]`.
//!
//! A group is a fill-blank question when its stimulus holds `{<n>}`
//! placeholders, otherwise a group of sub-questions.

use std::collections::BTreeSet;

use exam_bank_syntax::{CloLevel, MediaRef, Spanned, Token};

use crate::diagnostics::{Location, ParseError, Warning, WarningKind};
use crate::model::{
    BlankAnswerSet, FillBlankQuestion, GroupQuestion, Question, RichText,
    SingleQuestion, SubQuestion,
};

use super::ParseOptions;
use super::answers::{AnswerBlock, AnswerSet};
use super::inline::{ParsedText, parse_rich_text};
use super::lines::LineJoiner;

/// Where the builder is in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    TopLevel,
    InGroupStimulus,
    InFillBlankStimulus,
    InGroupBody,
    InAnswerBlock,
}

#[derive(Debug)]
struct SingleDraft {
    line: usize,
    clo: Option<CloLevel>,
    clo_line: usize,
    stem: LineJoiner,
    media: Vec<MediaRef>,
    answers: AnswerBlock,
}

impl SingleDraft {
    fn new(line: usize, clo: Option<CloLevel>) -> Self {
        Self {
            line,
            clo,
            clo_line: line,
            stem: LineJoiner::new(),
            media: vec![],
            answers: AnswerBlock::new(),
        }
    }

    /// No stem text and no options yet. A bare draft may still hold a tag or media.
    fn is_bare(&self) -> bool {
        !self.stem.has_text() && self.answers.is_empty()
    }
}

/// A `(<n>)` or `{<n>}` written inside a stimulus.
#[derive(Debug)]
struct Reference {
    index: u32,
    line: usize,
    source: String,
}

#[derive(Debug)]
struct ChildDraft {
    index: u32,
    line: usize,
    clo: Option<CloLevel>,
    stem: LineJoiner,
    media: Vec<MediaRef>,
    answers: AnswerBlock,
}

impl ChildDraft {
    fn new(index: u32, line: usize, clo: Option<CloLevel>) -> Self {
        Self {
            index,
            line,
            clo,
            stem: LineJoiner::new(),
            media: vec![],
            answers: AnswerBlock::new(),
        }
    }

    fn in_answers(&self) -> bool {
        !self.answers.is_empty()
    }
}

#[derive(Debug)]
struct GroupDraft {
    line: usize,
    clo: Option<CloLevel>,
    stimulus: LineJoiner,
    stimulus_media: Vec<MediaRef>,
    fill_blank: bool,
    references: Vec<Reference>,
    children: Vec<ChildDraft>,
    /// Tag seen in the body that belongs to the next child.
    pending_clo: Option<(CloLevel, usize)>,
    warned_outside: bool,
}

impl GroupDraft {
    fn new(line: usize, clo: Option<CloLevel>, media: Vec<MediaRef>) -> Self {
        Self {
            line,
            clo,
            stimulus: LineJoiner::new(),
            stimulus_media: media,
            fill_blank: false,
            references: vec![],
            children: vec![],
            pending_clo: None,
            warned_outside: false,
        }
    }
}

/// Token-driven state machine that assembles [`Question`]s.
///
/// Singles are flushed when the next question starts; groups are closed by
/// `[</sg>]` and decide between `Group` and `FillBlank` only then.
pub struct QuestionBuilder {
    options: ParseOptions,
    state: State,
    single: Option<SingleDraft>,
    group: Option<GroupDraft>,
    line_is_blank: bool,
    out: Vec<Question>,
    warnings: Vec<Warning>,
}

impl QuestionBuilder {
    /// A builder at the top level with nothing collected.
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            state: State::TopLevel,
            single: None,
            group: None,
            line_is_blank: true,
            out: vec![],
            warnings: vec![],
        }
    }

    /// Current state, for tracing and tests.
    pub fn state(&self) -> State {
        self.state
    }

    /// Feed one token. `rest` is everything after it, for lookahead.
    pub fn push(&mut self, spanned: &Spanned, rest: &[Spanned]) -> Result<(), ParseError> {
        let blank_line = spanned.token.is_line_break() && self.line_is_blank;
        match &spanned.token {
            Token::LineBreak => self.line_is_blank = true,
            token if token.is_blank_text() => {}
            _ => self.line_is_blank = false,
        }

        match self.state {
            State::TopLevel | State::InAnswerBlock => {
                self.push_top_level(spanned, rest, blank_line);
                Ok(())
            }
            State::InGroupStimulus | State::InFillBlankStimulus => self.push_stimulus(spanned),
            State::InGroupBody => self.push_body(spanned),
        }
    }

    /// Flush the last single question. An open group is an error.
    pub fn finish(mut self) -> Result<(Vec<Question>, Vec<Warning>), ParseError> {
        if let Some(group) = &self.group {
            return Err(ParseError::UnterminatedGroup { line: group.line });
        }
        self.flush_single();
        Ok((self.out, self.warnings))
    }

    fn enter(&mut self, state: State) {
        if self.state != state {
            log::trace!("{:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }

    fn warn(&mut self, kind: WarningKind, line: usize) {
        self.warnings.push(Warning::new(kind).at_line(line));
    }

    fn ordinal(&self) -> usize {
        self.out.len() + 1
    }

    // Top level

    fn push_top_level(&mut self, spanned: &Spanned, rest: &[Spanned], blank_line: bool) {
        let line = spanned.line;
        match &spanned.token {
            Token::CloTag(clo) => self.top_level_clo(*clo, line),
            Token::GroupStart => self.open_group(line),
            Token::QuestionBreak => self.flush_single(),
            Token::GroupStimulusEnd
            | Token::GroupEnd
            | Token::BlankRef(_)
            | Token::SubQuestionRef(_) => {
                let source = spanned.token.source_text();
                self.warn(
                    WarningKind::StrayMarker {
                        marker: source.clone(),
                    },
                    line,
                );
                let in_answers = self.state == State::InAnswerBlock;
                let single = self.single_mut(line);
                if in_answers {
                    single.answers.push_text(&source);
                } else {
                    single.stem.push(&source);
                }
            }
            Token::MediaRef(media) => self.single_mut(line).media.push(media.clone()),
            Token::AnswerLine { .. } => {
                self.single_mut(line).answers.push(spanned);
                self.enter(State::InAnswerBlock);
            }
            Token::TextRun(run) => {
                if self.state == State::InAnswerBlock {
                    self.single_mut(line).answers.push(spanned);
                } else if let Some(single) = &mut self.single {
                    single.stem.push(&run.content);
                } else if !run.is_blank() {
                    self.single_mut(line).stem.push(&run.content);
                }
            }
            Token::LineBreak => {
                if self.state == State::InAnswerBlock {
                    self.single_mut(line).answers.push(spanned);
                    if blank_line
                        && self.options.blank_line_closes_question
                        && !next_is_answer_line(rest)
                    {
                        self.flush_single();
                    }
                } else if let Some(single) = &mut self.single {
                    single.stem.line_break();
                }
            }
            Token::Eof => {}
        }
    }

    fn single_mut(&mut self, line: usize) -> &mut SingleDraft {
        self.single.get_or_insert_with(|| SingleDraft::new(line, None))
    }

    fn top_level_clo(&mut self, clo: CloLevel, line: usize) {
        if let Some(single) = self.single.as_mut().filter(|s| s.is_bare()) {
            let previous = single.clo.replace(clo);
            single.clo_line = line;
            if let Some(previous) = previous {
                self.warn(
                    WarningKind::CloTagReplaced {
                        previous,
                        current: clo,
                    },
                    line,
                );
            }
            return;
        }
        self.flush_single();
        self.single = Some(SingleDraft::new(line, Some(clo)));
    }

    fn open_group(&mut self, line: usize) {
        let (clo, media) = match self.single.take() {
            Some(single) if single.is_bare() => (single.clo, single.media),
            other => {
                self.single = other;
                self.flush_single();
                (None, vec![])
            }
        };
        self.group = Some(GroupDraft::new(line, clo, media));
        self.enter(State::InGroupStimulus);
    }

    fn flush_single(&mut self) {
        if self.state == State::InAnswerBlock {
            self.enter(State::TopLevel);
        }
        let Some(draft) = self.single.take() else {
            return;
        };

        if draft.is_bare() && draft.media.is_empty() {
            if let Some(clo) = draft.clo {
                self.warn(WarningKind::DanglingCloTag { clo }, draft.clo_line);
            }
            return;
        }

        let location = Location::question(self.ordinal());
        let (set, answer_warnings) = draft.answers.finish(location);
        let content = self.rich_text(draft.stem.finish(), draft.line, location);

        if content.is_empty() {
            self.warnings.push(
                Warning::new(WarningKind::EmptyContent)
                    .at_line(draft.line)
                    .at(location),
            );
        }
        if set.answers.is_empty() {
            self.warnings.push(
                Warning::new(WarningKind::NoAnswers)
                    .at_line(draft.line)
                    .at(location),
            );
        }
        self.warnings.extend(answer_warnings);

        log::trace!(
            "single question {} with {} options",
            location.question,
            set.answers.len()
        );
        self.out.push(Question::Single(SingleQuestion {
            line: draft.line,
            clo: draft.clo,
            content,
            answers: set.answers,
            choice: set.choice,
            shuffle: set.shuffle,
            media: draft.media,
        }));
    }

    fn rich_text(&mut self, text: String, line: usize, location: Location) -> RichText {
        let ParsedText { text, unbalanced } = parse_rich_text(&text);
        if unbalanced {
            self.warnings.push(
                Warning::new(WarningKind::UnbalancedLatex)
                    .at_line(line)
                    .at(location),
            );
        }
        text
    }

    // Group stimulus

    fn push_stimulus(&mut self, spanned: &Spanned) -> Result<(), ParseError> {
        let line = spanned.line;
        let Some(group) = self.group.as_mut() else {
            return Ok(());
        };

        match &spanned.token {
            Token::TextRun(run) | Token::AnswerLine { run, .. } => group.stimulus.push(&run.content),
            Token::LineBreak => group.stimulus.line_break(),
            Token::MediaRef(media) => group.stimulus_media.push(media.clone()),
            Token::CloTag(clo) => {
                if group.clo.is_none() {
                    group.clo = Some(*clo);
                } else {
                    self.warn(WarningKind::ExtraCloTag { clo: *clo }, line);
                }
            }
            Token::BlankRef(index) | Token::SubQuestionRef(index) => {
                let source = spanned.token.source_text();
                group.stimulus.push(&source);
                group.references.push(Reference {
                    index: *index,
                    line,
                    source,
                });
                if matches!(spanned.token, Token::BlankRef(_)) {
                    group.fill_blank = true;
                    self.enter(State::InFillBlankStimulus);
                }
            }
            Token::GroupStimulusEnd => self.enter(State::InGroupBody),
            Token::GroupEnd => {
                self.warn(WarningKind::MissingStimulusEnd, line);
                self.close_group()?;
            }
            Token::GroupStart => {
                return Err(ParseError::NestedGroup {
                    line,
                    outer_line: group.line,
                });
            }
            Token::QuestionBreak | Token::Eof => {}
        }
        Ok(())
    }

    // Group body

    fn push_body(&mut self, spanned: &Spanned) -> Result<(), ParseError> {
        let line = spanned.line;
        let Some(group) = self.group.as_mut() else {
            return Ok(());
        };

        match &spanned.token {
            Token::SubQuestionRef(index) | Token::BlankRef(index) => {
                let clo = group.pending_clo.take().map(|(clo, _)| clo);
                group.children.push(ChildDraft::new(*index, line, clo));
                group.warned_outside = false;
            }
            Token::CloTag(clo) => match group.children.last_mut() {
                Some(child) if child.clo.is_none() && !child.in_answers() => {
                    child.clo = Some(*clo);
                }
                _ => {
                    if let Some((previous, _)) = group.pending_clo.replace((*clo, line)) {
                        self.warn(
                            WarningKind::CloTagReplaced {
                                previous,
                                current: *clo,
                            },
                            line,
                        );
                    }
                }
            },
            Token::AnswerLine { .. } => match group.children.last_mut() {
                Some(child) => child.answers.push(spanned),
                None => self.text_outside_child(line),
            },
            Token::TextRun(run) => match group.children.last_mut() {
                Some(child) if child.in_answers() => child.answers.push(spanned),
                Some(child) => child.stem.push(&run.content),
                None if run.is_blank() => {}
                None => self.text_outside_child(line),
            },
            Token::LineBreak => match group.children.last_mut() {
                Some(child) if child.in_answers() => child.answers.push(spanned),
                Some(child) => child.stem.line_break(),
                None => {}
            },
            Token::MediaRef(media) => match group.children.last_mut() {
                Some(child) => child.media.push(media.clone()),
                None => group.stimulus_media.push(media.clone()),
            },
            Token::GroupStimulusEnd => {
                let source = spanned.token.source_text();
                if let Some(child) = group.children.last_mut() {
                    if child.in_answers() {
                        child.answers.push_text(&source);
                    } else {
                        child.stem.push(&source);
                    }
                }
                self.warn(WarningKind::StrayMarker { marker: source }, line);
            }
            Token::GroupEnd => self.close_group()?,
            Token::GroupStart => {
                return Err(ParseError::NestedGroup {
                    line,
                    outer_line: group.line,
                });
            }
            Token::QuestionBreak | Token::Eof => {}
        }
        Ok(())
    }

    fn text_outside_child(&mut self, line: usize) {
        if let Some(group) = self.group.as_mut() {
            if !group.warned_outside {
                group.warned_outside = true;
                self.warn(WarningKind::TextOutsideChild, line);
            }
        }
    }

    fn close_group(&mut self) -> Result<(), ParseError> {
        self.enter(State::TopLevel);
        let Some(group) = self.group.take() else {
            return Ok(());
        };
        let ordinal = self.ordinal();
        let location = Location::question(ordinal);

        if let Some((clo, line)) = group.pending_clo {
            self.warn(WarningKind::DanglingCloTag { clo }, line);
        }

        let mut children = group.children;
        children.sort_by_key(|c| c.index);

        let mut declared = BTreeSet::new();
        for child in &children {
            if !declared.insert(child.index) {
                self.warnings.push(
                    Warning::new(WarningKind::DuplicateIndex { index: child.index })
                        .at_line(child.line)
                        .at(location),
                );
            }
        }
        let ranges = gap_ranges(&declared);
        if !ranges.is_empty() {
            self.warnings.push(
                Warning::new(WarningKind::IndexGap { ranges })
                    .at_line(group.line)
                    .at(location),
            );
        }

        for reference in &group.references {
            if !declared.contains(&reference.index) {
                return Err(ParseError::MissingAnswerBlock {
                    line: reference.line,
                    reference: reference.source.clone(),
                });
            }
        }

        if children.is_empty() {
            self.warnings.push(
                Warning::new(WarningKind::EmptyGroup)
                    .at_line(group.line)
                    .at(location),
            );
        }

        let stimulus = self.rich_text(group.stimulus.finish(), group.line, location);

        let question = if group.fill_blank {
            // One answer set per placeholder: the first block declared for an index wins
            children.dedup_by_key(|c| c.index);
            let referenced: BTreeSet<u32> = group.references.iter().map(|r| r.index).collect();
            let blanks = children
                .into_iter()
                .map(|child| {
                    let child_location = Location::child(ordinal, child.index);
                    if !referenced.contains(&child.index) {
                        self.warnings.push(
                            Warning::new(WarningKind::UnreferencedBlank { index: child.index })
                                .at_line(child.line)
                                .at(child_location),
                        );
                    }
                    let (set, prompt) = self.finish_child_parts(
                        child.answers,
                        child.stem,
                        child.line,
                        child_location,
                    );
                    BlankAnswerSet {
                        index: child.index,
                        prompt,
                        answers: set.answers,
                        choice: set.choice,
                        shuffle: set.shuffle,
                        media: child.media,
                    }
                })
                .collect::<Vec<_>>();
            log::trace!("fill-blank question {ordinal} with {} blanks", blanks.len());
            Question::FillBlank(FillBlankQuestion {
                line: group.line,
                clo: group.clo,
                stimulus,
                stimulus_media: group.stimulus_media,
                blanks,
            })
        } else {
            let children = children
                .into_iter()
                .map(|child| {
                    let child_location = Location::child(ordinal, child.index);
                    let (set, content) = self.finish_child_parts(
                        child.answers,
                        child.stem,
                        child.line,
                        child_location,
                    );
                    SubQuestion {
                        index: child.index,
                        clo: child.clo.or(group.clo),
                        content,
                        answers: set.answers,
                        choice: set.choice,
                        shuffle: set.shuffle,
                        media: child.media,
                    }
                })
                .collect::<Vec<_>>();
            log::trace!(
                "group question {ordinal} with {} sub-questions",
                children.len()
            );
            Question::Group(GroupQuestion {
                line: group.line,
                clo: group.clo,
                stimulus,
                stimulus_media: group.stimulus_media,
                children,
            })
        };

        self.out.push(question);
        Ok(())
    }

    fn finish_child_parts(
        &mut self,
        answers: AnswerBlock,
        stem: LineJoiner,
        line: usize,
        location: Location,
    ) -> (AnswerSet, RichText) {
        let (set, answer_warnings) = answers.finish(location);
        let text = self.rich_text(stem.finish(), line, location);
        if set.answers.is_empty() {
            self.warnings.push(
                Warning::new(WarningKind::NoAnswers)
                    .at_line(line)
                    .at(location),
            );
        }
        self.warnings.extend(answer_warnings);
        (set, text)
    }
}

/// Undeclared indices below the highest declared one, as inclusive runs.
/// Linear in the number of declared indices, whatever their values.
fn gap_ranges(declared: &BTreeSet<u32>) -> Vec<(u32, u32)> {
    let mut ranges = vec![];
    let mut previous = 0u32;
    for &index in declared {
        if index > previous + 1 {
            ranges.push((previous + 1, index - 1));
        }
        previous = index;
    }
    ranges
}

/// True when the next token with content is an option line.
fn next_is_answer_line(rest: &[Spanned]) -> bool {
    rest.iter()
        .find(|s| !s.token.is_line_break() && !s.token.is_blank_text())
        .is_some_and(|s| matches!(s.token, Token::AnswerLine { .. }))
}
