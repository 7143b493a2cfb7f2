use crate::jvm::class_file::{
    Attribute, ClassConstantIndex, ConstantPool, Deserialize, Field, Method, Serialize, Version,
};
use crate::jvm::{ClassAccessFlags, Error};
use byteorder::{ReadBytesExt, WriteBytesExt};
use std::fs;
use std::path::Path;

/// Representation of the [`class` file format of the JVM][0]
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html
#[derive(Debug, Clone)]
pub struct ClassFile {
    pub version: Version,
    pub constants: ConstantPool,
    pub access_flags: ClassAccessFlags,
    pub this_class: ClassConstantIndex,

    /// Only `java/lang/Object` has no superclass, which is encoded as index 0
    pub super_class: ClassConstantIndex,
    pub interfaces: Vec<ClassConstantIndex>,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
    pub attributes: Vec<Attribute>,
}

impl ClassFile {
    /// Magic header bytes that go at the front of the serialized class file
    pub const MAGIC: [u8; 4] = [0xCA, 0xFE, 0xBA, 0xBE];

    /// Parse a class file from its raw bytes
    ///
    /// Trailing bytes after the last attribute are ignored.
    pub fn parse(bytes: &[u8]) -> Result<ClassFile, Error> {
        let mut reader = bytes;
        ClassFile::read(&mut reader)
    }

    /// Read a class file from a stream
    pub fn read<R: ReadBytesExt>(reader: &mut R) -> Result<ClassFile, Error> {
        let magic = u32::deserialize(reader)?;
        if magic != u32::from_be_bytes(ClassFile::MAGIC) {
            return Err(Error::BadMagic(magic));
        }
        let version = Version::deserialize(reader)?;
        let constants = ConstantPool::read(reader)?;
        Ok(ClassFile {
            version,
            constants,
            access_flags: ClassAccessFlags::deserialize(reader)?,
            this_class: ClassConstantIndex::deserialize(reader)?,
            super_class: ClassConstantIndex::deserialize(reader)?,
            interfaces: Vec::deserialize(reader)?,
            fields: Vec::deserialize(reader)?,
            methods: Vec::deserialize(reader)?,
            attributes: Vec::deserialize(reader)?,
        })
    }

    /// Binary name of the class
    pub fn class_name(&self) -> Result<&str, Error> {
        self.constants.class_name(self.this_class)
    }

    /// Binary name of the superclass, if there is one
    pub fn super_class_name(&self) -> Result<Option<&str>, Error> {
        if (self.super_class.0).0 == 0 {
            Ok(None)
        } else {
            self.constants.class_name(self.super_class).map(Some)
        }
    }

    /// Serialize the class file into a fresh buffer
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut bytes = vec![];
        self.serialize(&mut bytes)?;
        Ok(bytes)
    }

    /// Save the class file to disk
    pub fn save_to_path<P: AsRef<Path>>(
        &self,
        path: P,
        create_missing_directories: bool,
    ) -> std::io::Result<()> {
        let path = path.as_ref();
        if create_missing_directories {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut class_file = fs::File::create(path)?;
        self.serialize(&mut class_file)
    }
}

impl Serialize for ClassFile {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&ClassFile::MAGIC)?;
        self.version.serialize(writer)?;
        self.constants.serialize(writer)?;
        self.access_flags.serialize(writer)?;
        self.this_class.serialize(writer)?;
        self.super_class.serialize(writer)?;
        self.interfaces.serialize(writer)?;
        self.fields.serialize(writer)?;
        self.methods.serialize(writer)?;
        self.attributes.serialize(writer)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bad_magic() {
        let bytes = [0xCA, 0xFE, 0xBA, 0xBF, 0, 0, 0, 52];
        assert!(matches!(
            ClassFile::parse(&bytes),
            Err(Error::BadMagic(0xCAFEBABF))
        ));
    }

    #[test]
    fn truncated_file() {
        let bytes = [0xCA, 0xFE, 0xBA, 0xBE, 0, 0];
        assert!(matches!(ClassFile::parse(&bytes), Err(Error::IoError(_))));
    }

    #[test]
    fn write_then_read() {
        let mut constants = ConstantPool::new();
        let this_class = constants.get_class("me/Foo").unwrap();
        let runnable = constants.get_class("java/lang/Runnable").unwrap();
        let class = ClassFile {
            version: Version::JAVA8,
            constants,
            access_flags: ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER,
            this_class,
            super_class: ClassConstantIndex(crate::jvm::class_file::ConstantIndex(0)),
            interfaces: vec![runnable],
            fields: vec![],
            methods: vec![],
            attributes: vec![],
        };

        let bytes = class.to_bytes().unwrap();
        assert_eq!(&bytes[0..4], &ClassFile::MAGIC);

        let read = ClassFile::parse(&bytes).unwrap();
        assert_eq!(read.version, Version::JAVA8);
        assert_eq!(read.class_name().unwrap(), "me/Foo");
        assert_eq!(read.super_class_name().unwrap(), None);
        assert_eq!(read.interfaces, vec![runnable]);
    }
}
