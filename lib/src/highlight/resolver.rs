use super::{HighlightError, Label, PatternSet};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Range `[start, end)` of text (in bytes) along with every label active throughout it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub labels: BTreeSet<Label>,
}

impl Span {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| &**l == label)
    }
}

/// Point where a label becomes active (start) or stops being active (end)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryEvent {
    pub offset: usize,
    pub label: Label,
    pub is_start: bool,
}

/// Events sort by offset, and at the same offset ends come before starts
impl Ord for BoundaryEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.offset
            .cmp(&other.offset)
            .then(self.is_start.cmp(&other.is_start))
            .then_with(|| self.label.cmp(&other.label))
    }
}

impl PartialOrd for BoundaryEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Anything that can turn text into spans
///
/// The incremental highlighter runs resolvers on worker threads, hence `Send + Sync`.
pub trait Resolve: Send + Sync {
    fn resolve(&self, text: &str) -> Result<Vec<Span>, HighlightError>;
}

impl Resolve for PatternSet {
    fn resolve(&self, text: &str) -> Result<Vec<Span>, HighlightError> {
        Ok(resolve(self, text))
    }
}

impl<R: Resolve + ?Sized> Resolve for &R {
    fn resolve(&self, text: &str) -> Result<Vec<Span>, HighlightError> {
        (**self).resolve(text)
    }
}

/// Sorted start and end events for every match of every pattern
///
/// Each pattern contributes its non-overlapping, leftmost-first matches. Matches of different
/// patterns may overlap. Empty matches cover no text and are skipped.
pub fn boundary_events(patterns: &PatternSet, text: &str) -> Vec<BoundaryEvent> {
    let mut events = vec![];
    for pattern in patterns.patterns() {
        for found in pattern.regex().find_iter(text) {
            if found.start() == found.end() {
                continue;
            }
            events.push(BoundaryEvent {
                offset: found.start(),
                label: pattern.label().clone(),
                is_start: true,
            });
            events.push(BoundaryEvent {
                offset: found.end(),
                label: pattern.label().clone(),
                is_start: false,
            });
        }
    }
    events.sort();
    events
}

/// Partition `text` into spans tagged with the labels of the patterns matching them
///
/// The spans are ordered, do not overlap, and cover `[0, text.len())` with no gaps. Text no
/// pattern matches ends up in spans with no labels. Empty text produces the one span `[0, 0)`.
///
/// ```
/// use patch_editor::highlight::{resolve, PatternSet};
///
/// let patterns = PatternSet::compile([("class ", "keyword")]).unwrap();
/// let spans = resolve(&patterns, "class Foo;");
///
/// assert_eq!((spans[0].start, spans[0].end), (0, 6));
/// assert!(spans[0].has_label("keyword"));
/// assert_eq!((spans[1].start, spans[1].end), (6, 10));
/// assert!(spans[1].labels.is_empty());
/// ```
pub fn resolve(patterns: &PatternSet, text: &str) -> Vec<Span> {
    let events = boundary_events(patterns, text);

    // A label stays active as long as at least one of its matches is open
    let mut active: BTreeMap<Label, usize> = BTreeMap::new();
    let mut spans = vec![];
    let mut previous = 0;

    let mut events = events.into_iter().peekable();
    while let Some(first) = events.peek() {
        let offset = first.offset;
        if offset > previous {
            spans.push(Span {
                start: previous,
                end: offset,
                labels: active.keys().cloned().collect(),
            });
            previous = offset;
        }

        while let Some(event) = events.next_if(|event| event.offset == offset) {
            if event.is_start {
                *active.entry(event.label).or_insert(0) += 1;
            } else if let Some(count) = active.get_mut(&event.label) {
                *count -= 1;
                if *count == 0 {
                    active.remove(&event.label);
                }
            }
        }
    }

    if previous < text.len() || spans.is_empty() {
        spans.push(Span {
            start: previous,
            end: text.len(),
            labels: active.keys().cloned().collect(),
        });
    }
    spans
}

#[cfg(test)]
mod test {
    use super::*;

    fn labels(span: &Span) -> Vec<&str> {
        span.labels.iter().map(|l| &**l).collect()
    }

    fn assert_tiles(spans: &[Span], len: usize) {
        assert_eq!(spans.first().map(|s| s.start), Some(0));
        assert_eq!(spans.last().map(|s| s.end), Some(len));
        for pair in spans.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert_eq!(spans.iter().map(Span::len).sum::<usize>(), len);
    }

    #[test]
    fn single_keyword() {
        let patterns = PatternSet::compile([("class ", "keyword")]).unwrap();
        let spans = resolve(&patterns, "class Foo;");
        assert_eq!(spans.len(), 2);
        assert_eq!((spans[0].start, spans[0].end), (0, 6));
        assert_eq!(labels(&spans[0]), vec!["keyword"]);
        assert_eq!((spans[1].start, spans[1].end), (6, 10));
        assert!(labels(&spans[1]).is_empty());
    }

    #[test]
    fn empty_inputs() {
        let patterns = PatternSet::compile([("x", "letter")]).unwrap();
        let spans = resolve(&patterns, "");
        assert_eq!(spans.len(), 1);
        assert_eq!((spans[0].start, spans[0].end), (0, 0));
        assert!(spans[0].labels.is_empty());

        let spans = resolve(&PatternSet::default(), "hello");
        assert_eq!(spans.len(), 1);
        assert_eq!((spans[0].start, spans[0].end), (0, 5));
    }

    #[test]
    fn overlapping_patterns() {
        let patterns = PatternSet::compile([("abc", "outer"), ("b", "inner")]).unwrap();
        let spans = resolve(&patterns, "xabcx");
        assert_tiles(&spans, 5);
        let summary: Vec<(usize, usize, Vec<&str>)> = spans
            .iter()
            .map(|s| (s.start, s.end, labels(s)))
            .collect();
        assert_eq!(
            summary,
            vec![
                (0, 1, vec![]),
                (1, 2, vec!["outer"]),
                (2, 3, vec!["inner", "outer"]),
                (3, 4, vec!["outer"]),
                (4, 5, vec![]),
            ]
        );
    }

    #[test]
    fn same_label_overlap_and_adjacency() {
        // Two patterns with the same label overlapping: the label stays on until both end
        let patterns = PatternSet::compile([("ab", "k"), ("bc", "k")]).unwrap();
        let spans = resolve(&patterns, "abc");
        assert_tiles(&spans, 3);
        assert!(spans.iter().all(|s| labels(s) == vec!["k"]));

        // Adjacent matches of one pattern: end and start at the same offset
        let patterns = PatternSet::compile([("a", "k")]).unwrap();
        let spans = resolve(&patterns, "aa");
        assert_tiles(&spans, 2);
        assert_eq!(spans.len(), 2);
        assert!(spans.iter().all(|s| labels(s) == vec!["k"]));
    }

    #[test]
    fn empty_matches_are_ignored() {
        let patterns = PatternSet::compile([("x*", "maybe")]).unwrap();
        let spans = resolve(&patterns, "ab");
        assert_eq!(spans.len(), 1);
        assert!(spans[0].labels.is_empty());
    }

    #[test]
    fn multibyte_text() {
        let patterns = PatternSet::compile([("é+", "accent")]).unwrap();
        let text = "café!";
        let spans = resolve(&patterns, text);
        assert_tiles(&spans, text.len());
        assert_eq!((spans[1].start, spans[1].end), (3, 5));
        assert_eq!(&text[spans[1].start..spans[1].end], "é");
    }

    #[test]
    fn event_order() {
        let patterns = PatternSet::compile([("a", "k")]).unwrap();
        let events = boundary_events(&patterns, "aa");
        let summary: Vec<(usize, bool)> = events.iter().map(|e| (e.offset, e.is_start)).collect();
        assert_eq!(summary, vec![(0, true), (1, false), (1, true), (2, false)]);
    }

    #[test]
    fn appending_keeps_prefix() {
        let patterns = PatternSet::compile([("class ", "keyword"), (";", "semicolon")]).unwrap();
        let before = resolve(&patterns, "class Foo;");
        let after = resolve(&patterns, "class Foo; class Bar;");
        assert_eq!(before[..2], after[..2]);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        /// Patterns over `a`, `b`, `é` and `;`, none of which match empty text or `Z`
        fn pattern_strategy() -> impl Strategy<Value = (String, String)> {
            let literal = "[abé;]{1,3}".prop_map(|text| regex::escape(&text));
            let class = prop::sample::select(vec!["[ab]+", "[é;]", "b[a;]*", "(?i)A", "é{2}"])
                .prop_map(String::from);
            (prop_oneof![literal, class], 0..3usize)
                .prop_map(|(pattern, label)| (pattern, format!("k{}", label)))
        }

        fn patterns_strategy() -> impl Strategy<Value = PatternSet> {
            prop::collection::vec(pattern_strategy(), 0..5)
                .prop_map(|pairs| PatternSet::compile(pairs).unwrap())
        }

        proptest! {
            #[test]
            fn spans_tile_the_text(patterns in patterns_strategy(), text in "[abAé; \n]{0,40}") {
                let spans = resolve(&patterns, &text);
                prop_assert_eq!(spans.first().map(|s| s.start), Some(0));
                prop_assert_eq!(spans.last().map(|s| s.end), Some(text.len()));
                for pair in spans.windows(2) {
                    prop_assert_eq!(pair[0].end, pair[1].start);
                }
                for span in &spans {
                    prop_assert!(span.start < span.end || text.is_empty());
                    prop_assert!(text.is_char_boundary(span.start));
                    prop_assert!(text.is_char_boundary(span.end));
                }
                prop_assert_eq!(spans.iter().map(Span::len).sum::<usize>(), text.len());
            }

            #[test]
            fn appending_leaves_prefix_alone(
                patterns in patterns_strategy(),
                prefix in "[abé;]{1,20}",
                suffix in "[abé; ]{0,20}"
            ) {
                // Nothing matches `Z`, so no match can straddle it
                let before = resolve(&patterns, &prefix);
                let after = resolve(&patterns, &format!("{}Z{}", prefix, suffix));

                let clipped: Vec<Span> = after
                    .into_iter()
                    .filter(|span| span.start < prefix.len())
                    .map(|span| Span {
                        end: span.end.min(prefix.len()),
                        ..span
                    })
                    .collect();
                prop_assert_eq!(before, clipped);
            }
        }
    }
}
