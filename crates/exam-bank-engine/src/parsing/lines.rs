//! Line joining for stems, stimuli and prompts.
//!
//! Source documents wrap question text over several lines; the model keeps it
//! as one line of normalized text.

/// Accumulates text line by line. Whitespace inside a line collapses to one
/// space and lines are joined with single spaces.
#[derive(Debug, Clone, Default)]
pub struct LineJoiner {
    done: Vec<String>,
    current: String,
}

impl LineJoiner {
    /// An empty joiner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append text to the current line as-is.
    pub fn push(&mut self, text: &str) {
        self.current.push_str(text);
    }

    /// Close the current line. Blank lines leave no trace.
    pub fn line_break(&mut self) {
        let line = std::mem::take(&mut self.current);
        let words: Vec<&str> = line.split_whitespace().collect();
        if !words.is_empty() {
            self.done.push(words.join(" "));
        }
    }

    /// True once any non-whitespace text has been pushed.
    pub fn has_text(&self) -> bool {
        !self.done.is_empty() || !self.current.trim().is_empty()
    }

    /// Close the last line and join everything with single spaces.
    pub fn finish(mut self) -> String {
        self.line_break();
        self.done.join(" ")
    }
}
