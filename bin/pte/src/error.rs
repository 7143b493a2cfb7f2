use patch_editor::highlight::HighlightError;
use patch_editor::{editor, jvm, printer};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io;
use std::path::PathBuf;

/// Ways a command can go wrong
#[derive(Debug)]
pub enum CliError {
    Io(io::Error),

    /// An input could not be read (or found inside its jar)
    Input(PathBuf, editor::Error),

    ClassFile(PathBuf, jvm::Error),
    Print(PathBuf, printer::Error),
    Session(editor::Error),
    Highlight(HighlightError),
    Watch(notify::Error),

    MissingArgument(&'static str),
    BadArgument(String),

    /// Highlighting produced nothing in time
    HighlightTimeout,

    /// Some inputs failed (each was already reported)
    Failures(usize),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            CliError::Io(err) => write!(f, "I/O error: {}", err),
            CliError::Input(path, err) => write!(f, "{}: {}", path.display(), err),
            CliError::ClassFile(path, err) => write!(f, "{}: {}", path.display(), err),
            CliError::Print(path, err) => write!(f, "{}: {}", path.display(), err),
            CliError::Session(err) => err.fmt(f),
            CliError::Highlight(err) => err.fmt(f),
            CliError::Watch(err) => write!(f, "Cannot watch the patch file: {}", err),
            CliError::MissingArgument(name) => write!(f, "Missing argument {}", name),
            CliError::BadArgument(msg) => f.write_str(msg),
            CliError::HighlightTimeout => f.write_str("Timed out waiting for highlighting"),
            CliError::Failures(count) => write!(f, "{} input(s) could not be printed", count),
        }
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> CliError {
        CliError::Io(err)
    }
}

impl From<editor::Error> for CliError {
    fn from(err: editor::Error) -> CliError {
        CliError::Session(err)
    }
}

impl From<HighlightError> for CliError {
    fn from(err: HighlightError) -> CliError {
        CliError::Highlight(err)
    }
}

impl From<notify::Error> for CliError {
    fn from(err: notify::Error) -> CliError {
        CliError::Watch(err)
    }
}
