use serde::{Deserialize, Serialize};

/// A run of text as delivered by the document-extraction collaborator.
///
/// `emphasized` is true when the source run was bold or underlined. Runs are
/// in reading order and still contain the bracketed markup as literal text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledRun {
    pub text: String,
    #[serde(default)]
    pub emphasized: bool,
}

impl StyledRun {
    pub fn new(text: impl Into<String>, emphasized: bool) -> Self {
        Self {
            text: text.into(),
            emphasized,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, false)
    }

    pub fn emphasized(text: impl Into<String>) -> Self {
        Self::new(text, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_emphasis() {
        assert!(!StyledRun::plain("x").emphasized);
        assert!(StyledRun::emphasized("x").emphasized);
        assert_eq!(StyledRun::new("x", true), StyledRun::emphasized("x"));
    }
}
