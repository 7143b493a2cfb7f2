use crate::{jvm, printer};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io;
use zip::result::ZipError;

/// Patch script could not be applied to the class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchApplicationFailure {
    /// Short description of what went wrong
    pub message: String,

    /// Full diagnostic output of the patcher (eg. its stderr), possibly empty
    pub diagnostics: String,
}

impl PatchApplicationFailure {
    pub fn new(message: impl Into<String>) -> PatchApplicationFailure {
        PatchApplicationFailure {
            message: message.into(),
            diagnostics: String::new(),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: impl Into<String>) -> PatchApplicationFailure {
        self.diagnostics = diagnostics.into();
        self
    }
}

impl Display for PatchApplicationFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "Patch could not be applied: {}", self.message)?;
        if !self.diagnostics.is_empty() {
            write!(f, "\n{}", self.diagnostics.trim_end())?;
        }
        Ok(())
    }
}

impl std::error::Error for PatchApplicationFailure {}

/// Class could not be decompiled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecompileFailure {
    pub message: String,
}

impl Display for DecompileFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "Decompilation failed: {}", self.message)
    }
}

impl std::error::Error for DecompileFailure {}

/// Problems with an editing session
#[derive(Debug)]
pub enum Error {
    Io(io::Error),

    /// The jar holding the class could not be read, or has no such class
    Jar(ZipError),

    /// The class (original or patched) could not be read
    ClassFile(jvm::Error),

    Print(printer::Error),
    Patch(PatchApplicationFailure),
    Decompile(DecompileFailure),

    /// `save` was called before the patch was ever given a path
    NoPatchPath,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Jar(err) => write!(f, "Jar error: {}", err),
            Error::ClassFile(err) => write!(f, "Invalid class file: {}", err),
            Error::Print(err) => err.fmt(f),
            Error::Patch(err) => err.fmt(f),
            Error::Decompile(err) => err.fmt(f),
            Error::NoPatchPath => f.write_str("Patch has not been saved anywhere yet"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Jar(err) => Some(err),
            Error::ClassFile(err) => Some(err),
            Error::Print(err) => Some(err),
            Error::Patch(err) => Some(err),
            Error::Decompile(err) => Some(err),
            Error::NoPatchPath => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<ZipError> for Error {
    fn from(err: ZipError) -> Error {
        Error::Jar(err)
    }
}

impl From<jvm::Error> for Error {
    fn from(err: jvm::Error) -> Error {
        Error::ClassFile(err)
    }
}

impl From<printer::Error> for Error {
    fn from(err: printer::Error) -> Error {
        Error::Print(err)
    }
}

impl From<PatchApplicationFailure> for Error {
    fn from(err: PatchApplicationFailure) -> Error {
        Error::Patch(err)
    }
}

impl From<DecompileFailure> for Error {
    fn from(err: DecompileFailure) -> Error {
        Error::Decompile(err)
    }
}
