use crate::jvm::class_file::{read_bytes, Attribute, AttributeLike, Deserialize, Serialize};
use crate::jvm::Error;
use byteorder::{ReadBytesExt, WriteBytesExt};
use std::borrow::{Borrow, Cow};
use std::collections::HashMap;

/// Class file constants pool
///
/// Indexing starts at 1 and `long`/`double` constants take up two slots, so the pool keeps an
/// explicit slot table where unusable slots are `None`. Constants can be looked up by index (with
/// the expected kind checked) or inserted with the `get_*` methods, which reuse an existing
/// identical constant when there is one.
#[derive(Debug, Clone)]
pub struct ConstantPool {
    slots: Vec<Option<Constant>>,

    utf8s: HashMap<String, Utf8ConstantIndex>,
    classes: HashMap<Utf8ConstantIndex, ClassConstantIndex>,
    strings: HashMap<Utf8ConstantIndex, StringConstantIndex>,
    integers: HashMap<i32, ConstantIndex>,
    longs: HashMap<i64, ConstantIndex>,
    name_and_types: HashMap<(Utf8ConstantIndex, Utf8ConstantIndex), NameAndTypeConstantIndex>,
    fieldrefs: HashMap<(ClassConstantIndex, NameAndTypeConstantIndex), FieldRefConstantIndex>,
    methodrefs:
        HashMap<(ClassConstantIndex, NameAndTypeConstantIndex, bool), MethodRefConstantIndex>,
}

impl Default for ConstantPool {
    fn default() -> Self {
        ConstantPool::new()
    }
}

impl ConstantPool {
    /// Make a fresh empty constants pool
    pub fn new() -> ConstantPool {
        ConstantPool {
            slots: vec![None],
            utf8s: HashMap::new(),
            classes: HashMap::new(),
            strings: HashMap::new(),
            integers: HashMap::new(),
            longs: HashMap::new(),
            name_and_types: HashMap::new(),
            fieldrefs: HashMap::new(),
            methodrefs: HashMap::new(),
        }
    }

    /// Number of slots in the pool, including the unused slot 0 (this is the `constant_pool_count`
    /// of the class file)
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Iterate over all the constants along with their indices
    pub fn iter(&self) -> impl Iterator<Item = (ConstantIndex, &Constant)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|c| (ConstantIndex(idx as u16), c)))
    }

    /// Push a constant into the constant pool, provided there is space for it
    ///
    /// Note: the largest valid index is 65535, indexing starts at 1, and some constants take two
    /// spaces.
    fn push_constant(&mut self, constant: Constant) -> Result<ConstantIndex, Error> {
        let offset = self.slots.len();
        if offset + constant.width() > u16::MAX as usize {
            return Err(Error::TableOverflow("constant pool"));
        }
        let idx = ConstantIndex(offset as u16);

        // Remember the constant so that later `get_*` calls reuse it
        match &constant {
            Constant::Utf8(string) => {
                self.utf8s
                    .entry(string.clone())
                    .or_insert(Utf8ConstantIndex(idx));
            }
            Constant::Class(name) => {
                self.classes.entry(*name).or_insert(ClassConstantIndex(idx));
            }
            Constant::String(utf8) => {
                self.strings.entry(*utf8).or_insert(StringConstantIndex(idx));
            }
            Constant::Integer(integer) => {
                self.integers.entry(*integer).or_insert(idx);
            }
            Constant::Long(long) => {
                self.longs.entry(*long).or_insert(idx);
            }
            Constant::NameAndType { name, descriptor } => {
                self.name_and_types
                    .entry((*name, *descriptor))
                    .or_insert(NameAndTypeConstantIndex(idx));
            }
            Constant::FieldRef(class, name_and_type) => {
                self.fieldrefs
                    .entry((*class, *name_and_type))
                    .or_insert(FieldRefConstantIndex(idx));
            }
            Constant::MethodRef {
                class,
                name_and_type,
                is_interface,
            } => {
                self.methodrefs
                    .entry((*class, *name_and_type, *is_interface))
                    .or_insert(MethodRefConstantIndex(idx));
            }
            _ => (),
        }

        let width = constant.width();
        self.slots.push(Some(constant));
        for _ in 1..width {
            self.slots.push(None);
        }
        Ok(idx)
    }

    /// Get or insert a utf8 constant from the constant pool
    pub fn get_utf8<'a, S: Into<Cow<'a, str>>>(
        &mut self,
        utf8: S,
    ) -> Result<Utf8ConstantIndex, Error> {
        let cow = utf8.into();
        if let Some(idx) = self.utf8s.get::<str>(cow.borrow()) {
            Ok(*idx)
        } else {
            let constant = Constant::Utf8(cow.into_owned());
            Ok(Utf8ConstantIndex(self.push_constant(constant)?))
        }
    }

    /// Get or insert a class constant, given the class' binary name (or array descriptor)
    pub fn get_class<'a, S: Into<Cow<'a, str>>>(
        &mut self,
        name: S,
    ) -> Result<ClassConstantIndex, Error> {
        let name = self.get_utf8(name)?;
        if let Some(idx) = self.classes.get(&name) {
            Ok(*idx)
        } else {
            Ok(ClassConstantIndex(self.push_constant(Constant::Class(name))?))
        }
    }

    /// Get or insert a string constant from the constant pool
    pub fn get_string<'a, S: Into<Cow<'a, str>>>(
        &mut self,
        string: S,
    ) -> Result<StringConstantIndex, Error> {
        let utf8 = self.get_utf8(string)?;
        if let Some(idx) = self.strings.get(&utf8) {
            Ok(*idx)
        } else {
            Ok(StringConstantIndex(self.push_constant(Constant::String(utf8))?))
        }
    }

    /// Get or insert an integer constant from the constant pool
    pub fn get_integer(&mut self, integer: i32) -> Result<ConstantIndex, Error> {
        if let Some(idx) = self.integers.get(&integer) {
            Ok(*idx)
        } else {
            self.push_constant(Constant::Integer(integer))
        }
    }

    /// Get or insert a long constant from the constant pool
    pub fn get_long(&mut self, long: i64) -> Result<ConstantIndex, Error> {
        if let Some(idx) = self.longs.get(&long) {
            Ok(*idx)
        } else {
            self.push_constant(Constant::Long(long))
        }
    }

    /// Insert a float constant (floats aren't deduplicated, since `NaN != NaN`)
    pub fn get_float(&mut self, float: f32) -> Result<ConstantIndex, Error> {
        self.push_constant(Constant::Float(float))
    }

    /// Insert a double constant (doubles aren't deduplicated, since `NaN != NaN`)
    pub fn get_double(&mut self, double: f64) -> Result<ConstantIndex, Error> {
        self.push_constant(Constant::Double(double))
    }

    /// Get or insert a name & type constant from the constant pool
    pub fn get_name_and_type(
        &mut self,
        name: &str,
        descriptor: &str,
    ) -> Result<NameAndTypeConstantIndex, Error> {
        let name = self.get_utf8(name)?;
        let descriptor = self.get_utf8(descriptor)?;
        if let Some(idx) = self.name_and_types.get(&(name, descriptor)) {
            Ok(*idx)
        } else {
            let constant = Constant::NameAndType { name, descriptor };
            Ok(NameAndTypeConstantIndex(self.push_constant(constant)?))
        }
    }

    /// Get or insert a `CONSTANT_Fieldref_info`
    pub fn get_field_ref(
        &mut self,
        class: &str,
        name: &str,
        descriptor: &str,
    ) -> Result<FieldRefConstantIndex, Error> {
        let class = self.get_class(class)?;
        let name_and_type = self.get_name_and_type(name, descriptor)?;
        if let Some(idx) = self.fieldrefs.get(&(class, name_and_type)) {
            Ok(*idx)
        } else {
            let constant = Constant::FieldRef(class, name_and_type);
            Ok(FieldRefConstantIndex(self.push_constant(constant)?))
        }
    }

    /// Get or insert a `CONSTANT_Methodref_info` or `CONSTANT_InterfaceMethodref_info`
    pub fn get_method_ref(
        &mut self,
        class: &str,
        name: &str,
        descriptor: &str,
        is_interface: bool,
    ) -> Result<MethodRefConstantIndex, Error> {
        let class = self.get_class(class)?;
        let name_and_type = self.get_name_and_type(name, descriptor)?;
        if let Some(idx) = self.methodrefs.get(&(class, name_and_type, is_interface)) {
            Ok(*idx)
        } else {
            let constant = Constant::MethodRef {
                class,
                name_and_type,
                is_interface,
            };
            Ok(MethodRefConstantIndex(self.push_constant(constant)?))
        }
    }

    /// Add an attribute to the constant pool
    pub fn get_attribute<A: AttributeLike>(&mut self, attribute: A) -> Result<Attribute, Error> {
        let name_index = self.get_utf8(A::NAME)?;
        let mut info = vec![];
        attribute.serialize(&mut info)?;
        Ok(Attribute { name_index, info })
    }

    /// Look up any constant
    pub fn get(&self, index: impl Into<ConstantIndex>) -> Result<&Constant, Error> {
        let index = index.into();
        match self.slots.get(index.0 as usize) {
            Some(Some(constant)) => Ok(constant),
            _ => Err(Error::InvalidConstantIndex(index)),
        }
    }

    /// Look up a `CONSTANT_Utf8_info`
    pub fn utf8(&self, index: Utf8ConstantIndex) -> Result<&str, Error> {
        match self.get(index)? {
            Constant::Utf8(string) => Ok(string),
            _ => Err(Error::UnexpectedConstant {
                index: index.0,
                expected: "Utf8",
            }),
        }
    }

    /// Look up the name inside a `CONSTANT_Class_info`
    pub fn class_name(&self, index: ClassConstantIndex) -> Result<&str, Error> {
        match self.get(index)? {
            Constant::Class(name) => self.utf8(*name),
            _ => Err(Error::UnexpectedConstant {
                index: index.0,
                expected: "Class",
            }),
        }
    }

    /// Look up the name and descriptor inside a `CONSTANT_NameAndType_info`
    pub fn name_and_type(&self, index: NameAndTypeConstantIndex) -> Result<(&str, &str), Error> {
        match self.get(index)? {
            Constant::NameAndType { name, descriptor } => {
                Ok((self.utf8(*name)?, self.utf8(*descriptor)?))
            }
            _ => Err(Error::UnexpectedConstant {
                index: index.0,
                expected: "NameAndType",
            }),
        }
    }

    /// Look up a field or method reference
    pub fn member_ref(&self, index: ConstantIndex) -> Result<MemberRefInfo<'_>, Error> {
        let (class, name_and_type, is_interface) = match self.get(index)? {
            Constant::FieldRef(class, name_and_type) => (*class, *name_and_type, false),
            Constant::MethodRef {
                class,
                name_and_type,
                is_interface,
            } => (*class, *name_and_type, *is_interface),
            _ => {
                return Err(Error::UnexpectedConstant {
                    index,
                    expected: "Fieldref or Methodref",
                })
            }
        };
        let (name, descriptor) = self.name_and_type(name_and_type)?;
        Ok(MemberRefInfo {
            class: self.class_name(class)?,
            name,
            descriptor,
            is_interface,
        })
    }

    /// Read the constant pool, starting at the `constant_pool_count`
    pub fn read<R: ReadBytesExt>(reader: &mut R) -> Result<ConstantPool, Error> {
        let count = u16::deserialize(reader)?;
        let mut pool = ConstantPool::new();
        while pool.slots.len() < count as usize {
            let constant = Constant::read(reader)?;
            pool.push_constant(constant)?;
        }
        if pool.slots.len() != count as usize {
            // A wide constant occupied the last slot plus one beyond the declared count
            return Err(Error::TableOverflow("constant pool"));
        }
        Ok(pool)
    }
}

impl Serialize for ConstantPool {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        (self.slots.len() as u16).serialize(writer)?;
        for constant in self.slots.iter().flatten() {
            constant.serialize(writer)?;
        }
        Ok(())
    }
}

/// Resolved field or method reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberRefInfo<'a> {
    pub class: &'a str,
    pub name: &'a str,
    pub descriptor: &'a str,
    pub is_interface: bool,
}

/// Constants as in the constant pool
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.4
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    /// Class or an interface
    Class(Utf8ConstantIndex),

    /// Field
    FieldRef(ClassConstantIndex, NameAndTypeConstantIndex),

    /// Method (this combines `Methodref` and `InterfaceMethodref`
    MethodRef {
        class: ClassConstantIndex,
        name_and_type: NameAndTypeConstantIndex,
        is_interface: bool,
    },

    /// Constant object of type `java.lang.String`
    String(Utf8ConstantIndex),

    /// Constant primitive of type `int`
    Integer(i32),

    /// Constant primitive of type `float`
    Float(f32),

    /// Constant primitive of type `long`
    Long(i64),

    /// Constant primitive of type `double`
    Double(f64),

    /// Name and a type (eg. for a field or a method)
    NameAndType {
        name: Utf8ConstantIndex,
        descriptor: Utf8ConstantIndex,
    },

    /// Constant UTF-8 encoded raw string value
    ///
    /// Despite the name, the encoding is not quite UTF-8 (the encoding of the
    /// null character `\u{0000}` and the encoding of supplementary characters
    /// is different).
    Utf8(String),

    /// Constant object of type `java.lang.invoke.MethodHandle`
    MethodHandle {
        handle_kind: HandleKind,

        /// Depending on the method kind, this points to different things:
        ///
        ///   - `FieldRef` for `GetField`, `GetStatic`, `PutField`, `PutStatic`
        ///   - `MethodRef` for the rest
        member: ConstantIndex,
    },

    /// Method type
    MethodType { descriptor: Utf8ConstantIndex },

    /// Dynamically-computed constant
    Dynamic {
        bootstrap_method: u16,
        name_and_type: NameAndTypeConstantIndex,
    },

    /// Dynamically-computed call site
    InvokeDynamic {
        /// Index into the `BootstrapMethods` attribute
        bootstrap_method: u16,
        method_descriptor: NameAndTypeConstantIndex,
    },

    Module(Utf8ConstantIndex),
    Package(Utf8ConstantIndex),
}

impl Constant {
    /// Almost all constants have width 1, except for `Constant::Long` and `Constant::Double`.
    /// Quoting the JVM specification:
    ///
    /// > All 8-byte constants take up two entries in the constant_pool table of the class file.
    /// > If a CONSTANT_Long_info or CONSTANT_Double_info structure is the item in the
    /// > constant_pool table at index n, then the next usable item in the pool is located at
    /// > index n+2.
    pub fn width(&self) -> usize {
        match self {
            Constant::Long(_) | Constant::Double(_) => 2,
            _ => 1,
        }
    }

    /// Read one tagged constant
    pub fn read<R: ReadBytesExt>(reader: &mut R) -> Result<Constant, Error> {
        let tag = u8::deserialize(reader)?;
        let constant = match tag {
            1 => {
                let len = u16::deserialize(reader)?;
                let bytes = read_bytes(reader, u32::from(len))?;
                Constant::Utf8(decode_modified_utf8(&bytes)?)
            }
            3 => Constant::Integer(i32::deserialize(reader)?),
            4 => Constant::Float(f32::deserialize(reader)?),
            5 => Constant::Long(i64::deserialize(reader)?),
            6 => Constant::Double(f64::deserialize(reader)?),
            7 => Constant::Class(Utf8ConstantIndex::deserialize(reader)?),
            8 => Constant::String(Utf8ConstantIndex::deserialize(reader)?),
            9 => Constant::FieldRef(
                ClassConstantIndex::deserialize(reader)?,
                NameAndTypeConstantIndex::deserialize(reader)?,
            ),
            10 | 11 => Constant::MethodRef {
                class: ClassConstantIndex::deserialize(reader)?,
                name_and_type: NameAndTypeConstantIndex::deserialize(reader)?,
                is_interface: tag == 11,
            },
            12 => Constant::NameAndType {
                name: Utf8ConstantIndex::deserialize(reader)?,
                descriptor: Utf8ConstantIndex::deserialize(reader)?,
            },
            15 => {
                let kind = u8::deserialize(reader)?;
                let handle_kind =
                    HandleKind::from_u8(kind).ok_or(Error::UnknownConstantTag(kind))?;
                Constant::MethodHandle {
                    handle_kind,
                    member: ConstantIndex::deserialize(reader)?,
                }
            }
            16 => Constant::MethodType {
                descriptor: Utf8ConstantIndex::deserialize(reader)?,
            },
            17 => Constant::Dynamic {
                bootstrap_method: u16::deserialize(reader)?,
                name_and_type: NameAndTypeConstantIndex::deserialize(reader)?,
            },
            18 => Constant::InvokeDynamic {
                bootstrap_method: u16::deserialize(reader)?,
                method_descriptor: NameAndTypeConstantIndex::deserialize(reader)?,
            },
            19 => Constant::Module(Utf8ConstantIndex::deserialize(reader)?),
            20 => Constant::Package(Utf8ConstantIndex::deserialize(reader)?),
            other => return Err(Error::UnknownConstantTag(other)),
        };
        Ok(constant)
    }
}

impl Serialize for Constant {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        match self {
            Constant::Utf8(string) => {
                1u8.serialize(writer)?;
                let buffer: Vec<u8> = encode_modified_utf8(string);
                let len = u16::try_from(buffer.len()).map_err(|_| {
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        "string constant is longer than 65535 bytes",
                    )
                })?;
                len.serialize(writer)?;
                writer.write_all(&buffer)?;
            }
            Constant::Integer(integer) => {
                3u8.serialize(writer)?;
                integer.serialize(writer)?;
            }
            Constant::Float(float) => {
                4u8.serialize(writer)?;
                float.serialize(writer)?;
            }
            Constant::Long(long) => {
                5u8.serialize(writer)?;
                long.serialize(writer)?;
            }
            Constant::Double(double) => {
                6u8.serialize(writer)?;
                double.serialize(writer)?;
            }
            Constant::Class(name) => {
                7u8.serialize(writer)?;
                name.serialize(writer)?;
            }
            Constant::String(bytes) => {
                8u8.serialize(writer)?;
                bytes.serialize(writer)?;
            }
            Constant::FieldRef(class, name_and_type) => {
                9u8.serialize(writer)?;
                class.serialize(writer)?;
                name_and_type.serialize(writer)?;
            }
            Constant::MethodRef {
                class,
                name_and_type,
                is_interface,
            } => {
                (if !is_interface { 10u8 } else { 11u8 }).serialize(writer)?;
                class.serialize(writer)?;
                name_and_type.serialize(writer)?;
            }
            Constant::NameAndType { name, descriptor } => {
                12u8.serialize(writer)?;
                name.serialize(writer)?;
                descriptor.serialize(writer)?;
            }
            Constant::MethodHandle {
                handle_kind,
                member,
            } => {
                15u8.serialize(writer)?;
                handle_kind.serialize(writer)?;
                member.serialize(writer)?;
            }
            Constant::MethodType { descriptor } => {
                16u8.serialize(writer)?;
                descriptor.serialize(writer)?;
            }
            Constant::Dynamic {
                bootstrap_method,
                name_and_type,
            } => {
                17u8.serialize(writer)?;
                bootstrap_method.serialize(writer)?;
                name_and_type.serialize(writer)?;
            }
            Constant::InvokeDynamic {
                bootstrap_method,
                method_descriptor,
            } => {
                18u8.serialize(writer)?;
                bootstrap_method.serialize(writer)?;
                method_descriptor.serialize(writer)?;
            }
            Constant::Module(name) => {
                19u8.serialize(writer)?;
                name.serialize(writer)?;
            }
            Constant::Package(name) => {
                20u8.serialize(writer)?;
                name.serialize(writer)?;
            }
        };
        Ok(())
    }
}

/// Modified UTF-8 format used in class files.
///
/// See [this `DataInput` section for details][0]. Quoting from that section:
///
/// > The differences between this format and the standard UTF-8 format are the following:
/// >
/// >  * The null byte `\u0000` is encoded in 2-byte format rather than 1-byte, so that the encoded
/// >    strings never have embedded nulls.
/// >  * Only the 1-byte, 2-byte, and 3-byte formats are used.
/// >  * Supplementary characters are represented in the form of surrogate pairs.
///
/// [0]: https://docs.oracle.com/en/java/javase/17/docs/api/java.base/java/io/DataInput.html#modified-utf-8
pub fn encode_modified_utf8(string: &str) -> Vec<u8> {
    let mut buffer: Vec<u8> = vec![];
    for c in string.chars() {
        // Handle the exception for how `\u{0000}` is represented
        let len: usize = if c == '\u{0000}' { 2 } else { c.len_utf8() };
        let code: u32 = c as u32;

        match len {
            1 => buffer.push(code as u8),
            2 => {
                buffer.push((code >> 6 & 0x1F) as u8 | 0b1100_0000);
                buffer.push((code & 0x3F) as u8 | 0b1000_0000);
            }
            3 => {
                buffer.push((code >> 12 & 0x0F) as u8 | 0b1110_0000);
                buffer.push((code >> 6 & 0x3F) as u8 | 0b1000_0000);
                buffer.push((code & 0x3F) as u8 | 0b1000_0000);
            }

            // Supplementary characters: main divergence from unicode
            _ => {
                buffer.push(0b1110_1101);
                buffer.push(((code >> 16 & 0x0F) as u8).wrapping_sub(1) & 0x0F | 0b1010_0000);
                buffer.push((code >> 10 & 0x3F) as u8 | 0b1000_0000);

                buffer.push(0b1110_1101);
                buffer.push(((code >> 6 & 0x0F) as u8) | 0b1011_0000);
                buffer.push((code & 0x3F) as u8 | 0b1000_0000);
            }
        }
    }
    buffer
}

/// Inverse of [`encode_modified_utf8`]
///
/// The input is decoded into UTF-16 code units first, since that is what the 3-byte groups
/// actually encode. Unpaired surrogates can't be represented in a Rust string and come out as
/// `U+FFFD`.
pub fn decode_modified_utf8(bytes: &[u8]) -> Result<String, Error> {
    fn continuation(byte: Option<u8>) -> Result<u16, Error> {
        match byte {
            Some(b) if b & 0b1100_0000 == 0b1000_0000 => Ok((b & 0x3F) as u16),
            _ => Err(Error::MalformedUtf8),
        }
    }

    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut bytes = bytes.iter().copied();
    while let Some(byte) = bytes.next() {
        let unit = match byte {
            0x01..=0x7F => byte as u16,
            0xC0..=0xDF => {
                let low = continuation(bytes.next())?;
                (byte as u16 & 0x1F) << 6 | low
            }
            0xE0..=0xEF => {
                let mid = continuation(bytes.next())?;
                let low = continuation(bytes.next())?;
                (byte as u16 & 0x0F) << 12 | mid << 6 | low
            }
            _ => return Err(Error::MalformedUtf8),
        };
        units.push(unit);
    }

    Ok(char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect())
}

#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub struct ConstantIndex(pub u16);

impl Serialize for ConstantIndex {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.0.serialize(writer)
    }
}

impl Deserialize for ConstantIndex {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> std::io::Result<Self> {
        Ok(ConstantIndex(u16::deserialize(reader)?))
    }
}

/// Declare a constant index that is expected to point at a specific kind of constant
macro_rules! typed_constant_index {
    ($($name:ident),* $(,)?) => {
        $(
            #[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
            pub struct $name(pub ConstantIndex);

            impl From<$name> for ConstantIndex {
                fn from(index: $name) -> ConstantIndex {
                    index.0
                }
            }

            impl Serialize for $name {
                fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
                    self.0.serialize(writer)
                }
            }

            impl Deserialize for $name {
                fn deserialize<R: ReadBytesExt>(reader: &mut R) -> std::io::Result<Self> {
                    Ok($name(ConstantIndex::deserialize(reader)?))
                }
            }
        )*
    };
}

typed_constant_index!(
    Utf8ConstantIndex,
    StringConstantIndex,
    NameAndTypeConstantIndex,
    ClassConstantIndex,
    FieldRefConstantIndex,
    MethodRefConstantIndex,
);

/// Type of method handle
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-5.html#jvms-5.4.3.5-220
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum HandleKind {
    GetField,
    GetStatic,
    PutField,
    PutStatic,
    InvokeVirtual,
    InvokeStatic,
    InvokeSpecial,
    NewInvokeSpecial,
    InvokeInterface,
}

impl HandleKind {
    pub fn from_u8(byte: u8) -> Option<HandleKind> {
        let kind = match byte {
            1 => HandleKind::GetField,
            2 => HandleKind::GetStatic,
            3 => HandleKind::PutField,
            4 => HandleKind::PutStatic,
            5 => HandleKind::InvokeVirtual,
            6 => HandleKind::InvokeStatic,
            7 => HandleKind::InvokeSpecial,
            8 => HandleKind::NewInvokeSpecial,
            9 => HandleKind::InvokeInterface,
            _ => return None,
        };
        Some(kind)
    }
}

impl Serialize for HandleKind {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        let byte: u8 = match self {
            HandleKind::GetField => 1,
            HandleKind::GetStatic => 2,
            HandleKind::PutField => 3,
            HandleKind::PutStatic => 4,
            HandleKind::InvokeVirtual => 5,
            HandleKind::InvokeStatic => 6,
            HandleKind::InvokeSpecial => 7,
            HandleKind::NewInvokeSpecial => 8,
            HandleKind::InvokeInterface => 9,
        };
        byte.serialize(writer)
    }
}

#[cfg(test)]
mod encode_modified_utf8_tests {
    use super::*;

    #[test]
    fn containing_null_byte() {
        assert_eq!(encode_modified_utf8("a\x00a"), vec![97, 192, 128, 97]);
    }

    #[test]
    fn simple_ascii() {
        assert_eq!(encode_modified_utf8("foo"), vec![102, 111, 111]);
        assert_eq!(
            encode_modified_utf8("hel10_World"),
            vec![104, 101, 108, 49, 48, 95, 87, 111, 114, 108, 100]
        );
    }

    #[test]
    fn two_and_three_byte_encodings() {
        assert_eq!(
            encode_modified_utf8("ĄǍǞǠǺȀȂȦȺӐӒ"),
            vec![
                196, 132, 199, 141, 199, 158, 199, 160, 199, 186, 200, 128, 200, 130, 200, 166,
                200, 186, 211, 144, 211, 146
            ]
        );
    }

    #[test]
    fn supplementary_characters() {
        assert_eq!(
            encode_modified_utf8("\u{10000}\u{dffff}\u{10FFFF}"),
            vec![
                237, 160, 128, 237, 176, 128, 237, 172, 191, 237, 191, 191, 237, 175, 191, 237,
                191, 191
            ]
        );
    }
}
