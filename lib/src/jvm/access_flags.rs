use crate::jvm::class_file::{Deserialize, Serialize};
use bitflags::bitflags;
use byteorder::{ReadBytesExt, WriteBytesExt};
use std::io::Result;

bitflags! {
    /// Access flags on classes
    ///
    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.1-200-E.1
    pub struct ClassAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const FINAL = 0x0010;
        const SUPER = 0x0020;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
        const MODULE = 0x8000;
    }
}

bitflags! {
    /// Access flags on methods
    ///
    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.6-200-A.1
    pub struct MethodAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SYNCHRONIZED = 0x0020;
        const BRIDGE = 0x0040;
        const VARARGS = 0x0080;
        const NATIVE = 0x0100;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
    }
}

bitflags! {
    /// Access flags on fields
    ///
    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.5-200-A.1
    pub struct FieldAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const VOLATILE = 0x0040;
        const TRANSIENT = 0x0080;
        const SYNTHETIC = 0x1000;
        const ENUM = 0x4000;
    }
}

/// Source-level modifiers that get rendered in front of declarations
///
/// Only these modifiers are ever printed. The order of [`Modifier::CANONICAL_ORDER`] is the order
/// in which they appear, no matter how the access flag bits are laid out.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Modifier {
    Private,
    Public,
    Protected,
    Static,
    Synchronized,
    Final,
}

impl Modifier {
    pub const CANONICAL_ORDER: [Modifier; 6] = [
        Modifier::Private,
        Modifier::Public,
        Modifier::Protected,
        Modifier::Static,
        Modifier::Synchronized,
        Modifier::Final,
    ];

    /// Access flag bit for the modifier (shared by classes, fields, and methods)
    ///
    /// Note: on classes, `0x0020` is `ACC_SUPER` and not `synchronized`.
    pub const fn bit(self) -> u16 {
        match self {
            Modifier::Public => 0x0001,
            Modifier::Private => 0x0002,
            Modifier::Protected => 0x0004,
            Modifier::Static => 0x0008,
            Modifier::Final => 0x0010,
            Modifier::Synchronized => 0x0020,
        }
    }

    pub const fn keyword(self) -> &'static str {
        match self {
            Modifier::Private => "private",
            Modifier::Public => "public",
            Modifier::Protected => "protected",
            Modifier::Static => "static",
            Modifier::Synchronized => "synchronized",
            Modifier::Final => "final",
        }
    }

    /// Modifiers set in `bits`, in canonical order, skipping anything in `exclude`
    pub fn from_bits(bits: u16, exclude: &[Modifier]) -> impl Iterator<Item = Modifier> + '_ {
        Modifier::CANONICAL_ORDER
            .into_iter()
            .filter(move |modifier| bits & modifier.bit() != 0 && !exclude.contains(modifier))
    }
}

impl Serialize for ClassAccessFlags {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()> {
        self.bits().serialize(writer)
    }
}

impl Serialize for MethodAccessFlags {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()> {
        self.bits().serialize(writer)
    }
}

impl Serialize for FieldAccessFlags {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()> {
        self.bits().serialize(writer)
    }
}

// Bits with no name are dropped when reading
impl Deserialize for ClassAccessFlags {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        Ok(ClassAccessFlags::from_bits_truncate(u16::deserialize(reader)?))
    }
}

impl Deserialize for MethodAccessFlags {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        Ok(MethodAccessFlags::from_bits_truncate(u16::deserialize(reader)?))
    }
}

impl Deserialize for FieldAccessFlags {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        Ok(FieldAccessFlags::from_bits_truncate(u16::deserialize(reader)?))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn render(bits: u16, exclude: &[Modifier]) -> Vec<&'static str> {
        Modifier::from_bits(bits, exclude).map(Modifier::keyword).collect()
    }

    #[test]
    fn canonical_order() {
        let bits = (MethodAccessFlags::FINAL
            | MethodAccessFlags::STATIC
            | MethodAccessFlags::PUBLIC
            | MethodAccessFlags::SYNCHRONIZED)
            .bits();
        assert_eq!(render(bits, &[]), vec!["public", "static", "synchronized", "final"]);
    }

    #[test]
    fn excluded_modifiers() {
        let bits = (ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER).bits();
        assert_eq!(render(bits, &[Modifier::Synchronized]), vec!["public"]);
    }

    #[test]
    fn unlisted_bits_are_ignored() {
        let bits = (MethodAccessFlags::NATIVE | MethodAccessFlags::ABSTRACT).bits();
        assert!(render(bits, &[]).is_empty());
    }
}
