use std::fmt;

use serde::{Deserialize, Serialize};

/// One inline piece of question text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    /// Plain text, with `\$` escapes already resolved to `$`.
    Text { text: String },
    /// A LaTeX span. `display` is true for `$$...$$`.
    Latex { source: String, display: bool },
}

impl Segment {
    pub fn text(text: impl Into<String>) -> Self {
        Segment::Text { text: text.into() }
    }

    pub fn latex(source: impl Into<String>, display: bool) -> Self {
        Segment::Latex {
            source: source.into(),
            display,
        }
    }
}

/// Ordered inline segments of a stem, stimulus, prompt or option.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText {
    pub segments: Vec<Segment>,
}

impl RichText {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            return Self::default();
        }
        Self::new(vec![Segment::text(text)])
    }

    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|s| match s {
            Segment::Text { text } => text.trim().is_empty(),
            Segment::Latex { .. } => false,
        })
    }

    /// Text segments only, without LaTeX sources or escapes.
    pub fn plain_text(&self) -> String {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Text { text } => Some(text.as_str()),
                Segment::Latex { .. } => None,
            })
            .collect()
    }

    pub fn has_latex(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Latex { .. }))
    }
}

/// Renders back to dialect form: delimiters restored, literal `$` escaped.
impl fmt::Display for RichText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Text { text } => f.write_str(&text.replace('$', "\\$"))?,
                Segment::Latex {
                    source,
                    display: true,
                } => write!(f, "$${source}$$")?,
                Segment::Latex {
                    source,
                    display: false,
                } => write!(f, "${source}$")?,
            }
        }
        Ok(())
    }
}
