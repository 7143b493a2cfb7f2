use super::{ClassSource, Decompiler, Error, PatchApplier};
use crate::highlight::{builtins, HighlightSink, HighlighterSettings, IncrementalHighlighter};
use crate::jvm::model::ClassDeclaration;
use crate::printer::{BytecodePrinter, PrinterSettings};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Settings for an [`EditorSession`]
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Quiet period after the last patch edit before the patch gets applied again
    pub patch_debounce: Duration,

    /// Quiet period after the last edit before highlighting gets recomputed
    pub highlight_debounce: Duration,

    pub printer: PrinterSettings,
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            patch_debounce: Duration::from_secs(2),
            highlight_debounce: Duration::from_millis(20),
            printer: PrinterSettings::default(),
        }
    }
}

/// Everything shown for the current state of the patch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputedCode {
    /// Bytecode listing of the patched class
    pub bytecode: String,

    /// Decompiled source of the patched class (`None` without a decompiler)
    pub java: Option<String>,
}

/// One class being patched
///
/// The session keeps the original class bytes untouched. Each [`EditorSession::recompute`]
/// applies the current patch text to those original bytes, so patches never stack on top of the
/// output of earlier patches. When recomputing fails, whatever was computed last stays in place.
pub struct EditorSession {
    class_path: Option<PathBuf>,
    original: Arc<[u8]>,

    patch_path: Option<PathBuf>,
    patch_text: String,
    saved: bool,

    computed: ComputedCode,
    applier: Box<dyn PatchApplier>,
    decompiler: Option<Box<dyn Decompiler>>,
    printer: BytecodePrinter,
    settings: SessionSettings,
}

impl EditorSession {
    /// Start a session on a class file
    pub fn open(
        class_path: impl AsRef<Path>,
        applier: Box<dyn PatchApplier>,
        decompiler: Option<Box<dyn Decompiler>>,
        settings: SessionSettings,
    ) -> Result<EditorSession, Error> {
        let source = ClassSource::File(class_path.as_ref().to_owned());
        EditorSession::open_source(&source, applier, decompiler, settings)
    }

    /// Start a session on a class file or a class inside a jar
    pub fn open_source(
        source: &ClassSource,
        applier: Box<dyn PatchApplier>,
        decompiler: Option<Box<dyn Decompiler>>,
        settings: SessionSettings,
    ) -> Result<EditorSession, Error> {
        let class_path = source.display_path();
        let bytes = source.read()?;
        log::info!("Loaded class {} ({} bytes)", class_path.display(), bytes.len());
        let mut session = EditorSession::from_bytes(bytes, applier, decompiler, settings)?;
        session.class_path = Some(class_path);
        Ok(session)
    }

    /// Start a session on class bytes that didn't come from a file
    ///
    /// The unpatched class is printed (and decompiled) right away, so this fails if the class
    /// can't be read.
    pub fn from_bytes(
        bytes: Vec<u8>,
        applier: Box<dyn PatchApplier>,
        decompiler: Option<Box<dyn Decompiler>>,
        settings: SessionSettings,
    ) -> Result<EditorSession, Error> {
        let printer = BytecodePrinter::new().with_settings(settings.printer.clone());
        let computed = compute(&printer, decompiler.as_deref(), &bytes)?;
        Ok(EditorSession {
            class_path: None,
            original: Arc::from(bytes),
            patch_path: None,
            patch_text: String::new(),
            saved: true,
            computed,
            applier,
            decompiler,
            printer,
            settings,
        })
    }

    /// Replace the patch text with the contents of a file
    ///
    /// The patch is now associated with that file and counts as saved.
    pub fn load_patch(&mut self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        self.patch_text = fs::read_to_string(path)?;
        self.patch_path = Some(path.to_owned());
        self.saved = true;
        log::info!("Loaded patch {}", path.display());
        Ok(())
    }

    /// Replace the patch text (eg. after an edit), marking the patch as unsaved
    pub fn set_patch_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.patch_text {
            self.patch_text = text;
            self.saved = false;
        }
    }

    /// Break the line at byte offset `at` of the patch text, carrying its indentation over
    ///
    /// Returns the offset right after the inserted indentation (where the caret goes). Offsets
    /// past the end or inside a character move back to the closest character boundary.
    pub fn insert_line_break(&mut self, at: usize) -> usize {
        let mut at = at.min(self.patch_text.len());
        while !self.patch_text.is_char_boundary(at) {
            at -= 1;
        }
        let line_start = self.patch_text[..at].rfind('\n').map_or(0, |idx| idx + 1);
        let mut inserted = String::from("\n");
        inserted.push_str(continuation_indent(&self.patch_text[line_start..at]));

        let mut text = self.patch_text.clone();
        text.insert_str(at, &inserted);
        self.set_patch_text(text);
        at + inserted.len()
    }

    /// Write the patch back to the file it came from (or was last saved to)
    pub fn save(&mut self) -> Result<(), Error> {
        let path = self.patch_path.clone().ok_or(Error::NoPatchPath)?;
        self.save_as(path)
    }

    /// Write the patch to a new file, which becomes the patch file from now on
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        fs::write(path, self.patch_text.as_bytes())?;
        self.patch_path = Some(path.to_owned());
        self.saved = true;
        log::info!("Saved patch to {}", path.display());
        Ok(())
    }

    /// Apply the current patch to the original class, then print and decompile the result
    ///
    /// On success the new output replaces [`EditorSession::computed`]. On failure the error is
    /// returned and the previous output stays.
    pub fn recompute(&mut self) -> Result<&ComputedCode, Error> {
        let result = self
            .applier
            .apply(&self.original, &self.patch_text)
            .map_err(Error::from)
            .and_then(|patched| compute(&self.printer, self.decompiler.as_deref(), &patched));

        match result {
            Ok(computed) => {
                log::debug!("Recomputed output ({} bytes of bytecode)", computed.bytecode.len());
                self.computed = computed;
                Ok(&self.computed)
            }
            Err(err) => {
                log::warn!("Keeping previous output: {}", err);
                Err(err)
            }
        }
    }

    /// Output of the last successful computation
    pub fn computed(&self) -> &ComputedCode {
        &self.computed
    }

    pub fn original_bytes(&self) -> &[u8] {
        &self.original
    }

    pub fn patch_text(&self) -> &str {
        &self.patch_text
    }

    pub fn patch_path(&self) -> Option<&Path> {
        self.patch_path.as_deref()
    }

    pub fn class_path(&self) -> Option<&Path> {
        self.class_path.as_deref()
    }

    pub fn is_saved(&self) -> bool {
        self.saved
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Window title: `PTE`, then the patch and class paths if known, with a leading `* ` while
    /// the patch has unsaved changes
    pub fn title(&self) -> String {
        let mut title = String::new();
        if !self.saved {
            title.push_str("* ");
        }
        title.push_str("PTE");
        for path in [&self.patch_path, &self.class_path].into_iter().flatten() {
            title.push_str(" - ");
            title.push_str(&path.display().to_string());
        }
        title
    }

    /// Highlighter for patch script text, using the session's debounce
    pub fn patch_highlighter<S: HighlightSink>(&self, sink: S) -> IncrementalHighlighter<S> {
        let settings = HighlighterSettings {
            debounce: self.settings.highlight_debounce,
            ..HighlighterSettings::default()
        };
        IncrementalHighlighter::new(Arc::new(builtins::patch()), sink, settings)
    }
}

/// Leading whitespace of `previous_line`, to be inserted after a line break
///
/// A line with nothing but whitespace is carried over whole.
pub fn continuation_indent(previous_line: &str) -> &str {
    let previous_line = previous_line.trim_end_matches(&['\n', '\r'][..]);
    match previous_line.find(|c: char| !c.is_whitespace()) {
        Some(end) => &previous_line[..end],
        None => previous_line,
    }
}

fn compute(
    printer: &BytecodePrinter,
    decompiler: Option<&dyn Decompiler>,
    class_bytes: &[u8],
) -> Result<ComputedCode, Error> {
    let class = ClassDeclaration::parse(class_bytes)?;
    let bytecode = printer.print(&class)?;
    let java = match decompiler {
        Some(decompiler) => Some(decompiler.decompile(class_bytes)?),
        None => None,
    };
    Ok(ComputedCode { bytecode, java })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn indentation_carries_over() {
        assert_eq!(continuation_indent("    .aload 0"), "    ");
        assert_eq!(continuation_indent("\t+pop\n"), "\t");
        assert_eq!(continuation_indent("   "), "   ");
        assert_eq!(continuation_indent("  \n"), "  ");
        assert_eq!(continuation_indent("x"), "");
        assert_eq!(continuation_indent(""), "");
    }
}
