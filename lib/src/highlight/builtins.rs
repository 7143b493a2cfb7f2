//! Pattern sets shipped with the editor
//!
//! Both sets are compiled on first use and then live for the rest of the process.

use super::PatternSet;
use crate::jvm::code::mnemonics;
use std::str::FromStr;
use std::sync::OnceLock;

const JAVA_KEYWORDS: &[&str] = &[
    "abstract ", "assert ", "boolean ", "break ", "byte ",
    "case ", "catch ", "char ", "class ", "const ",
    "continue ", "default ", "do ", "double ", "else ",
    "enum ", "extends ", "final ", "finally ", "float ",
    "for ", "goto ", "if ", "implements ", "import ",
    "instanceof ", "int ", "interface ", "long ", "native ",
    "new ", "package ", "private ", "protected ", "public ",
    "return ", "short ", "static ", "strictfp ", "super ",
    "switch ", "synchronized ", "this ", "throw ", "throws ",
    "transient ", "try ", "void ", "volatile ", "while",
];

const PATCH_KEYWORDS: &[&str] = &[
    "abstract ", "class ", "void ", "double ", "float ", "int ", "interface ", "long ",
    "native ", "private ", "protected ", "public ", "short ", "static ", "synchronized ",
    "throws ", "boolean ",
];

const STRING_LITERAL: &str = r#""(?:[^"\\]|\\.)*""#;
const CHAR_LITERAL: &str = r#"'(?:\\["']|.)'"#;

/// Punctuation and literals, common to both dialects
fn common_pairs() -> Vec<(String, &'static str)> {
    vec![
        (String::from(";"), "semicolon"),
        (String::from(r"[()]"), "paren"),
        (String::from(r"[{}]"), "brace"),
        (String::from(r"[\[\]]"), "bracket"),
        (String::from(STRING_LITERAL), "string"),
        (String::from(CHAR_LITERAL), "string"),
    ]
}

fn keyword_pairs(keywords: &[&str]) -> Vec<(String, &'static str)> {
    keywords
        .iter()
        .map(|keyword| (regex::escape(keyword), "keyword"))
        .collect()
}

/// One pattern per instruction mnemonic, each preceded by `prefix`
///
/// `prefix` is regex syntax. Mnemonics match case-insensitively, and an `_` in a mnemonic also
/// accepts `-` (so `.aconst-null` and `.ACONST_NULL` both count).
pub fn mnemonic_patterns(prefix: &str) -> Vec<String> {
    mnemonics()
        .map(|mnemonic| {
            let escaped = regex::escape(&mnemonic.to_lowercase()).replace('_', "[-_]");
            format!("(?i){}{}", prefix, escaped)
        })
        .collect()
}

/// `(pattern, label)` pairs of the Java set
pub fn java_pairs() -> Vec<(String, &'static str)> {
    let mut pairs = keyword_pairs(JAVA_KEYWORDS);
    pairs.extend(common_pairs());
    pairs
}

/// `(pattern, label)` pairs of the patch script set
pub fn patch_pairs() -> Vec<(String, &'static str)> {
    let mut pairs = keyword_pairs(PATCH_KEYWORDS);
    pairs.extend(mnemonic_patterns(r"\.").into_iter().map(|p| (p, "find")));
    pairs.push((String::from("add"), "add"));
    pairs.extend(mnemonic_patterns(r"\+").into_iter().map(|p| (p, "add")));
    pairs.push((String::from("remove"), "remove"));
    pairs.extend(mnemonic_patterns("-").into_iter().map(|p| (p, "remove")));
    pairs.extend(common_pairs());
    pairs.extend([
        (String::from(r"//[^\n]*"), "comment"),
        (String::from(r"#[^\n]*"), "comment"),
        (String::from(r"/\*(?:[^*]|\*+[^*/])*\*+/"), "comment"),
        (String::from(r"#(?:include|exclude) [^\n]+"), "action"),
        (String::from(r"//(?:include|exclude) [^\n]+"), "action"),
        (String::from("~"), "match"),
    ]);
    pairs
}

fn compile_builtin(name: &str, pairs: Vec<(String, &'static str)>) -> PatternSet {
    match PatternSet::compile(pairs) {
        Ok(set) => {
            log::debug!("Compiled {} built-in {} patterns", set.len(), name);
            set
        }
        Err(err) => panic!("Built-in {} pattern set is broken: {}", name, err),
    }
}

/// Java source highlighting
pub fn java() -> &'static PatternSet {
    static JAVA: OnceLock<PatternSet> = OnceLock::new();
    JAVA.get_or_init(|| compile_builtin("java", java_pairs()))
}

/// Patch script highlighting
pub fn patch() -> &'static PatternSet {
    static PATCH: OnceLock<PatternSet> = OnceLock::new();
    PATCH.get_or_init(|| compile_builtin("patch", patch_pairs()))
}

/// Which built-in set to highlight with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Java,
    Patch,
}

impl Dialect {
    pub fn patterns(self) -> &'static PatternSet {
        match self {
            Dialect::Java => java(),
            Dialect::Patch => patch(),
        }
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Dialect, String> {
        match s {
            "java" => Ok(Dialect::Java),
            "patch" => Ok(Dialect::Patch),
            other => Err(format!("Unknown dialect {:?} (expected `java` or `patch`)", other)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::highlight::{resolve, Span};

    fn labelled<'a>(spans: &'a [Span], text: &'a str, label: &str) -> Vec<&'a str> {
        spans
            .iter()
            .filter(|span| span.has_label(label))
            .map(|span| &text[span.start..span.end])
            .collect()
    }

    #[test]
    fn builtins_compile() {
        assert_eq!(java().len(), java_pairs().len());
        assert_eq!(patch().len(), patch_pairs().len());
        assert!(std::ptr::eq(java(), Dialect::Java.patterns()));
    }

    #[test]
    fn mnemonic_patterns_follow_opcode_table() {
        let patterns = mnemonic_patterns(r"\.");
        assert_eq!(patterns.len(), mnemonics().count());
        assert!(patterns.contains(&String::from(r"(?i)\.aconst[-_]null")));
        assert!(patterns.contains(&String::from(r"(?i)\.label")));
    }

    #[test]
    fn java_source() {
        let text = "public class Foo { String s = \"a\\\"b\"; char c = 'x'; }";
        let spans = resolve(java(), text);
        assert_eq!(labelled(&spans, text, "keyword"), vec!["public ", "class ", "char "]);
        assert_eq!(labelled(&spans, text, "string"), vec!["\"a\\\"b\"", "'x'"]);
        assert_eq!(labelled(&spans, text, "brace"), vec!["{", "}"]);
        assert_eq!(labelled(&spans, text, "semicolon"), vec![";", ";"]);
    }

    #[test]
    fn patch_script() {
        let text = "// header\n.ALOAD 0\n+aconst-null x\n-pop\n~\n/* x */";
        let spans = resolve(patch(), text);
        assert_eq!(labelled(&spans, text, "comment"), vec!["// header", "/* x */"]);
        assert_eq!(labelled(&spans, text, "find"), vec![".ALOAD"]);
        assert_eq!(labelled(&spans, text, "add"), vec!["+aconst-null"]);
        assert_eq!(labelled(&spans, text, "remove"), vec!["-pop"]);
        assert_eq!(labelled(&spans, text, "match"), vec!["~"]);
    }

    #[test]
    fn patch_actions() {
        let text = "#include Foo\n";
        let spans = resolve(patch(), text);
        assert_eq!(labelled(&spans, text, "action"), vec!["#include Foo"]);
        assert_eq!(labelled(&spans, text, "comment"), vec!["#include Foo"]);
    }

    #[test]
    fn dialect_names() {
        assert_eq!("java".parse::<Dialect>(), Ok(Dialect::Java));
        assert_eq!("patch".parse::<Dialect>(), Ok(Dialect::Patch));
        assert!("kotlin".parse::<Dialect>().is_err());
    }
}
