use super::PatternCompileError;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

/// Classification attached to ranges of text (eg. `keyword` or `string`)
pub type Label = Arc<str>;

/// Compiled matcher along with the label it assigns to matched text
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    label: Label,
}

impl Pattern {
    pub fn new(source: &str, label: Label) -> Result<Pattern, PatternCompileError> {
        match Regex::new(source) {
            Ok(regex) => Ok(Pattern { regex, label }),
            Err(error) => Err(PatternCompileError {
                pattern: source.to_owned(),
                label: label.to_string(),
                error,
            }),
        }
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    /// Source text the pattern was compiled from
    pub fn source(&self) -> &str {
        self.regex.as_str()
    }
}

/// Ordered, immutable set of patterns
///
/// Several patterns may share a label. The order of patterns only affects the order in which
/// boundary events get generated, never the resulting spans.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    /// Compile `(pattern, label)` pairs, in order
    ///
    /// Patterns use the syntax of the [`regex`] crate. The first pattern that fails to compile
    /// aborts the whole set.
    pub fn compile<I, P, L>(pairs: I) -> Result<PatternSet, PatternCompileError>
    where
        I: IntoIterator<Item = (P, L)>,
        P: AsRef<str>,
        L: AsRef<str>,
    {
        // Patterns sharing a label share one allocation for it
        let mut labels: HashMap<String, Label> = HashMap::new();
        let mut patterns = vec![];
        for (source, label) in pairs {
            let label = labels
                .entry(label.as_ref().to_owned())
                .or_insert_with(|| Arc::from(label.as_ref()))
                .clone();
            patterns.push(Pattern::new(source.as_ref(), label)?);
        }
        Ok(PatternSet { patterns })
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
