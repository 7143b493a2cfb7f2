use std::fmt::{Display, Formatter, Result as FmtResult};

/// A pattern failed to compile
#[derive(Debug)]
pub struct PatternCompileError {
    /// Source text of the offending pattern
    pub pattern: String,

    /// Label the pattern would have classified text with
    pub label: String,

    pub error: regex::Error,
}

impl Display for PatternCompileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "Pattern {:?} (label {:?}) failed to compile: {}",
            self.pattern, self.label, self.error
        )
    }
}

impl std::error::Error for PatternCompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Resolving spans for a snapshot of text failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HighlightError {
    /// The resolver returned an error
    Failed(String),

    /// The resolver panicked
    Panicked(String),
}

impl Display for HighlightError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            HighlightError::Failed(message) => write!(f, "Highlighting failed: {}", message),
            HighlightError::Panicked(message) => write!(f, "Highlighter panicked: {}", message),
        }
    }
}

impl std::error::Error for HighlightError {}

/// A finished computation was not applied, since a newer one has been applied or the text
/// changed after its snapshot was taken
///
/// This never reaches the user. It only gets logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaleResultDiscarded {
    pub sequence: u64,

    /// Highest sequence number applied so far
    pub last_applied: Option<u64>,

    /// Whether the text changed since the snapshot was taken
    pub text_changed: bool,
}

impl Display for StaleResultDiscarded {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "Discarded stale highlighting result #{}", self.sequence)?;
        if let Some(last_applied) = self.last_applied {
            write!(f, " (already applied #{})", last_applied)?;
        }
        if self.text_changed {
            f.write_str(" (text changed since snapshot)")?;
        }
        Ok(())
    }
}

impl std::error::Error for StaleResultDiscarded {}
