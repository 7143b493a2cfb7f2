use super::class_file::ConstantIndex;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Problems encountered while reading or writing a class file
#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),

    /// File did not start with `0xCAFEBABE`
    BadMagic(u32),

    /// Constant index is zero, out of range, or points at the unusable slot after a `long` or
    /// `double`
    InvalidConstantIndex(ConstantIndex),

    /// Constant exists, but is not of the expected kind
    UnexpectedConstant {
        index: ConstantIndex,
        expected: &'static str,
    },

    /// Unknown tag in the constant pool
    UnknownConstantTag(u8),

    BadDescriptor(String),
    MalformedName(String),

    /// Byte sequence that is not valid modified UTF-8
    MalformedUtf8,

    /// Instruction (or its operands) runs past the end of the code array
    TruncatedCode { offset: u32 },

    /// Jump or switch target that is outside of the code array
    InvalidJumpTarget { offset: u32, target: i64 },

    /// Operand that can't be valid for its instruction (eg. `newarray` with an unknown type
    /// code, or `wide` in front of an instruction it can't modify)
    InvalidOperand { offset: u32, opcode: u8 },

    /// Constant pool, code array, or other table is too big for its length prefix
    TableOverflow(&'static str),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Error::IoError(err) => write!(f, "I/O error: {}", err),
            Error::BadMagic(magic) => write!(f, "Bad magic number {:#010X}", magic),
            Error::InvalidConstantIndex(idx) => write!(f, "Invalid constant index {}", idx.0),
            Error::UnexpectedConstant { index, expected } => {
                write!(f, "Constant at index {} is not a {}", index.0, expected)
            }
            Error::UnknownConstantTag(tag) => write!(f, "Unknown constant tag {}", tag),
            Error::BadDescriptor(msg) => write!(f, "Bad descriptor: {}", msg),
            Error::MalformedName(msg) => write!(f, "Malformed name: {}", msg),
            Error::MalformedUtf8 => f.write_str("Malformed modified UTF-8 string"),
            Error::TruncatedCode { offset } => {
                write!(f, "Code ends in the middle of the instruction at {}", offset)
            }
            Error::InvalidJumpTarget { offset, target } => write!(
                f,
                "Instruction at {} jumps to {}, outside of the code",
                offset, target
            ),
            Error::InvalidOperand { offset, opcode } => write!(
                f,
                "Invalid operand for opcode {:#04X} at {}",
                opcode, offset
            ),
            Error::TableOverflow(what) => write!(f, "Too many entries in {}", what),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::IoError(err)
    }
}
