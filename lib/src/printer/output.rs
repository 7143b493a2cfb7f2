//! Indentation-aware text sink

use std::fmt::{Result, Write};

/// Writer of line-oriented, block-indented text
///
/// Indentation is added lazily: only once something gets written on a fresh line. This keeps
/// blank lines free of trailing whitespace.
pub struct TextOutput<W: Write> {
    /// Text repeated once per indentation level
    indent: String,

    /// How many levels deep new lines are indented
    level: usize,

    /// Is there a line already in progress?
    line_in_progress: bool,

    inner: W,
}

impl<W: Write> Write for TextOutput<W> {
    fn write_str(&mut self, text: &str) -> Result {
        for line in text.split_inclusive('\n') {
            if line != "\n" {
                self.ensure_line_indented()?;
            }
            self.inner.write_str(line)?;
            self.line_in_progress = !line.ends_with('\n');
        }
        Ok(())
    }
}

impl<W: Write> TextOutput<W> {
    pub fn new(inner: W, indent: impl Into<String>) -> TextOutput<W> {
        TextOutput {
            indent: indent.into(),
            level: 0,
            line_in_progress: false,
            inner,
        }
    }

    /// If we are on a fresh line, make sure the indent is present
    fn ensure_line_indented(&mut self) -> Result {
        if !self.line_in_progress {
            for _ in 0..self.level {
                self.inner.write_str(&self.indent)?;
            }
            self.line_in_progress = true;
        }
        Ok(())
    }

    /// Write text to the current line
    pub fn write(&mut self, text: &str) -> Result {
        self.write_str(text)
    }

    /// Write text and end the line
    pub fn write_line(&mut self, text: &str) -> Result {
        self.write_str(text)?;
        self.newline()
    }

    /// End the current line (an empty line if nothing was written on it)
    pub fn newline(&mut self) -> Result {
        self.inner.write_str("\n")?;
        self.line_in_progress = false;
        Ok(())
    }

    /// Indent lines started from now on by one more level
    pub fn indent(&mut self) {
        self.level += 1;
    }

    /// Undo one [`TextOutput::indent`] (no-op at the outermost level)
    pub fn unindent(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pass_through() -> Result {
        let mut output = TextOutput::new(String::new(), "  ");
        output.write("hello")?;
        write!(&mut output, " {}", "world")?;
        output.write_line("!")?;
        assert_eq!(output.into_inner(), "hello world!\n");
        Ok(())
    }

    #[test]
    fn nested_blocks() -> Result {
        let mut output = TextOutput::new(String::new(), "  ");
        output.write_line("class A {")?;
        output.indent();
        output.write_line("int x;")?;
        output.newline()?;
        output.write_line("void f() {")?;
        output.indent();
        output.write_line(".return")?;
        output.unindent();
        output.write_line("}")?;
        output.unindent();
        output.write_line("}")?;

        assert_eq!(
            output.into_inner(),
            "class A {\n  int x;\n\n  void f() {\n    .return\n  }\n}\n"
        );
        Ok(())
    }

    #[test]
    fn embedded_newlines_are_indented() -> Result {
        let mut output = TextOutput::new(String::new(), "\t");
        output.indent();
        output.write("a\n\nb\n")?;
        output.unindent();
        output.unindent();
        assert_eq!(output.level(), 0);
        assert_eq!(output.into_inner(), "\ta\n\n\tb\n");
        Ok(())
    }
}
