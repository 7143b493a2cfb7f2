use crate::jvm::class_file::{
    read_bytes, ClassConstantIndex, ConstantIndex, ConstantPool, Deserialize, Serialize,
    Utf8ConstantIndex,
};
use crate::jvm::Error;
use byteorder::{ReadBytesExt, WriteBytesExt};

/// Attributes (used in classes, fields, methods, and even on some attributes)
///
/// The representation is designed to be easily extended with custom attributes.
/// While some attributes aren't essential, others are really important (eg. the
/// code attribute for including the actual bytecode).
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name_index: Utf8ConstantIndex,
    pub info: Vec<u8>,
}

impl Attribute {
    /// Find and decode the first attribute with the name of `A`
    pub fn find<A: AttributeLike>(
        attributes: &[Attribute],
        constants: &ConstantPool,
    ) -> Result<Option<A>, Error> {
        for attribute in attributes {
            if constants.utf8(attribute.name_index)? == A::NAME {
                let mut info: &[u8] = &attribute.info;
                return Ok(Some(A::deserialize(&mut info)?));
            }
        }
        Ok(None)
    }
}

impl Serialize for Attribute {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.name_index.serialize(writer)?;

        // Attribute info length is 4 bytes
        (self.info.len() as u32).serialize(writer)?;
        writer.write_all(&self.info)?;

        Ok(())
    }
}

impl Deserialize for Attribute {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> std::io::Result<Self> {
        let name_index = Utf8ConstantIndex::deserialize(reader)?;
        let len = u32::deserialize(reader)?;
        let info = read_bytes(reader, len)?;
        Ok(Attribute { name_index, info })
    }
}

/// Attributes are all stored in the same way (see `Attribute`), but internally
/// they represent very different things. This trait is implemented by things
/// which can be turned into attributes and read back out of them.
pub trait AttributeLike: Serialize + Deserialize {
    /// Name of the attribute
    const NAME: &'static str;
}

/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantValue(pub ConstantIndex);

impl Serialize for ConstantValue {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.0.serialize(writer)
    }
}

impl Deserialize for ConstantValue {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> std::io::Result<Self> {
        Ok(ConstantValue(ConstantIndex::deserialize(reader)?))
    }
}

impl AttributeLike for ConstantValue {
    const NAME: &'static str = "ConstantValue";
}

/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.3
#[derive(Debug, Clone)]
pub struct Code {
    pub max_stack: u16,
    pub max_locals: u16,

    /// Encoded bytecode instructions
    pub code_array: Vec<u8>,
    pub exception_table: Vec<ExceptionHandler>,
    pub attributes: Vec<Attribute>,
}

impl Serialize for Code {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.max_stack.serialize(writer)?;
        self.max_locals.serialize(writer)?;
        (self.code_array.len() as u32).serialize(writer)?;
        writer.write_all(&self.code_array)?;
        self.exception_table.serialize(writer)?;
        self.attributes.serialize(writer)?;
        Ok(())
    }
}

impl Deserialize for Code {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> std::io::Result<Self> {
        let max_stack = u16::deserialize(reader)?;
        let max_locals = u16::deserialize(reader)?;
        let code_len = u32::deserialize(reader)?;
        let code_array = read_bytes(reader, code_len)?;
        Ok(Code {
            max_stack,
            max_locals,
            code_array,
            exception_table: Vec::deserialize(reader)?,
            attributes: Vec::deserialize(reader)?,
        })
    }
}

impl AttributeLike for Code {
    const NAME: &'static str = "Code";
}

#[derive(Debug, Clone, Copy)]
pub struct ExceptionHandler {
    /// Start of exception handler range (inclusive)
    pub start_pc: u16,

    /// End of exception handler range (exclusive)
    pub end_pc: u16,

    /// Start of the exception handler
    pub handler_pc: u16,

    /// Index `0` means the handler catches everything
    pub catch_type: ClassConstantIndex,
}

impl Serialize for ExceptionHandler {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.start_pc.serialize(writer)?;
        self.end_pc.serialize(writer)?;
        self.handler_pc.serialize(writer)?;
        self.catch_type.serialize(writer)?;
        Ok(())
    }
}

impl Deserialize for ExceptionHandler {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> std::io::Result<Self> {
        Ok(ExceptionHandler {
            start_pc: u16::deserialize(reader)?,
            end_pc: u16::deserialize(reader)?,
            handler_pc: u16::deserialize(reader)?,
            catch_type: ClassConstantIndex::deserialize(reader)?,
        })
    }
}

/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.12
#[derive(Debug, Clone, Default)]
pub struct LineNumberTable(pub Vec<LineNumber>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineNumber {
    pub start_pc: u16,
    pub line_number: u16,
}

impl Serialize for LineNumberTable {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.0.serialize(writer)
    }
}

impl Deserialize for LineNumberTable {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> std::io::Result<Self> {
        Ok(LineNumberTable(Vec::deserialize(reader)?))
    }
}

impl AttributeLike for LineNumberTable {
    const NAME: &'static str = "LineNumberTable";
}

impl Serialize for LineNumber {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.start_pc.serialize(writer)?;
        self.line_number.serialize(writer)
    }
}

impl Deserialize for LineNumber {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> std::io::Result<Self> {
        Ok(LineNumber {
            start_pc: u16::deserialize(reader)?,
            line_number: u16::deserialize(reader)?,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn oversized_attribute_length() {
        // Name index 1, then a length of 4 GiB with only two bytes behind it
        let bytes: &[u8] = &[0, 1, 0xFF, 0xFF, 0xFF, 0xFF, 1, 2];
        assert!(Attribute::deserialize(&mut &bytes[..]).is_err());

        let bytes: &[u8] = &[0, 1, 0, 0, 0, 2, 1, 2];
        let attribute = Attribute::deserialize(&mut &bytes[..]).unwrap();
        assert_eq!(attribute.info, vec![1, 2]);
    }
}
