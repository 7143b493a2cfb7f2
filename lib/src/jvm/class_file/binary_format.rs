use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{ErrorKind, Read, Result};

/// Utility trait for serializing data inside class files
///
/// Java class files have some peculiarities that make it useful to define an extra trait (instead
/// of just using `serde`):
///
///   - tags are always `u8`
///   - when serializing a sequence, the length of the sequence is usually `u16`
///
pub trait Serialize: Sized {
    /// Serialize construct into a binary output stream
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()>;
}

/// Counterpart of [`Serialize`], for reading constructs back out of a binary input stream
///
/// Only structural problems (truncated input) are reported here. Anything that needs the
/// constant pool to be validated is checked later, when the class is resolved.
pub trait Deserialize: Sized {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self>;
}

macro_rules! primitive_format {
    ($typ:ty, $write:ident, $read:ident) => {
        impl Serialize for $typ {
            fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()> {
                writer.$write::<BigEndian>(*self)
            }
        }

        impl Deserialize for $typ {
            fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
                reader.$read::<BigEndian>()
            }
        }
    };
}

impl Serialize for u8 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(*self)
    }
}

impl Deserialize for u8 {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        reader.read_u8()
    }
}

impl Serialize for i8 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()> {
        writer.write_i8(*self)
    }
}

impl Deserialize for i8 {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        reader.read_i8()
    }
}

primitive_format!(u16, write_u16, read_u16);
primitive_format!(u32, write_u32, read_u32);
primitive_format!(u64, write_u64, read_u64);
primitive_format!(i16, write_i16, read_i16);
primitive_format!(i32, write_i32, read_i32);
primitive_format!(i64, write_i64, read_i64);
primitive_format!(f32, write_f32, read_f32);
primitive_format!(f64, write_f64, read_f64);

/// Size in `u16` is the first thing serialized/deserialized
impl<A: Serialize> Serialize for Vec<A> {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()> {
        let len = u16::try_from(self.len()).map_err(|_| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "sequence is too long for a u16 length prefix",
            )
        })?;
        len.serialize(writer)?;
        for elem in self {
            elem.serialize(writer)?;
        }
        Ok(())
    }
}

impl<A: Deserialize> Deserialize for Vec<A> {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        let len = u16::deserialize(reader)?;
        let mut elems = Vec::with_capacity(len as usize);
        for _ in 0..len {
            elems.push(A::deserialize(reader)?);
        }
        Ok(elems)
    }
}

/// Read exactly `len` bytes
///
/// Lengths come straight out of the class file, so the buffer grows with the input actually
/// read instead of being allocated up front.
pub fn read_bytes<R: Read>(reader: &mut R, len: u32) -> Result<Vec<u8>> {
    let mut bytes = vec![];
    reader.take(u64::from(len)).read_to_end(&mut bytes)?;
    if bytes.len() as u64 != u64::from(len) {
        let msg = format!("expected {} bytes, found only {}", len, bytes.len());
        return Err(std::io::Error::new(ErrorKind::UnexpectedEof, msg));
    }
    Ok(bytes)
}
