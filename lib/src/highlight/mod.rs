//! Syntax highlighting by pattern classes
//!
//! Highlighting is not tied to any grammar. A [`PatternSet`] is an ordered list of regular
//! expressions, each attached to a label (`keyword`, `string`, `comment`, ...). Resolving text
//! against the set produces [`Span`]s: consecutive, non-overlapping ranges that together cover
//! the whole text, each carrying every label whose pattern matched the whole range. Ranges no
//! pattern matched still get a span, just with no labels.
//!
//! Since matches of different patterns may overlap, a span can carry several labels (eg. a
//! `#include` line in a patch script is both an `action` and a `comment`).
//!
//! ### Simple example
//!
//! ```
//! use patch_editor::highlight::{resolve, PatternSet};
//!
//! let patterns = PatternSet::compile([
//!     ("class ", "keyword"),
//!     ("[{}]", "brace"),
//! ])
//! .unwrap();
//!
//! let text = "class Foo {}";
//! for span in resolve(&patterns, text) {
//!     let labels: Vec<&str> = span.labels.iter().map(|l| &**l).collect();
//!     println!("{:?} {:?}", &text[span.start..span.end], labels);
//! }
//! ```
//!
//! ### While editing
//!
//! [`IncrementalHighlighter`] re-resolves text in the background as it changes, debouncing
//! bursts of edits and making sure a result computed for old text never overwrites the result
//! for newer text. The built-in sets for Java source and patch scripts are in [`builtins`].

pub mod builtins;
mod errors;
mod incremental;
mod pattern;
mod resolver;

pub use errors::*;
pub use incremental::*;
pub use pattern::*;
pub use resolver::*;
