use super::{BinaryName, Name};
use std::io::{Error, ErrorKind, Result};
use std::iter::Peekable;
use std::str::Chars;

/// Parsing of field and method descriptors (`I`, `[Ljava/lang/String;`, `(JI)V`)
pub trait ParseDescriptor: Sized {
    /// Parse a descriptor from a string
    fn parse(source: &str) -> Result<Self> {
        let mut chars = source.chars().peekable();
        let ret = Self::parse_from(&mut chars)?;
        match chars.next() {
            None => Ok(ret),
            Some(c) => {
                let msg = format!("Unexpected leftover input '{}'", c);
                Err(Error::new(ErrorKind::InvalidInput, msg))
            }
        }
    }

    /// Read the descriptor from a character buffer
    fn parse_from(source: &mut Peekable<Chars>) -> Result<Self>;
}

/// Types rendered the way Java source code spells them (`int`, `java.lang.String[]`)
pub trait JavaTypeName {
    fn java_name(&self) -> String {
        let mut string = String::new();
        self.java_name_to(&mut string);
        string
    }

    fn java_name_to(&self, write_to: &mut String);
}

/// Primitive value types
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

impl BaseType {
    /// Type codes used by the `newarray` instruction
    ///
    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-6.html#jvms-6.5.newarray
    pub fn from_array_type_code(code: u8) -> Option<BaseType> {
        let typ = match code {
            4 => BaseType::Boolean,
            5 => BaseType::Char,
            6 => BaseType::Float,
            7 => BaseType::Double,
            8 => BaseType::Byte,
            9 => BaseType::Short,
            10 => BaseType::Int,
            11 => BaseType::Long,
            _ => return None,
        };
        Some(typ)
    }
}

impl JavaTypeName for BaseType {
    fn java_name_to(&self, write_to: &mut String) {
        let name = match self {
            BaseType::Byte => "byte",
            BaseType::Char => "char",
            BaseType::Double => "double",
            BaseType::Float => "float",
            BaseType::Int => "int",
            BaseType::Long => "long",
            BaseType::Short => "short",
            BaseType::Boolean => "boolean",
        };
        write_to.push_str(name);
    }
}

impl ParseDescriptor for BaseType {
    fn parse_from(source: &mut Peekable<Chars>) -> Result<Self> {
        let typ = match source.next() {
            Some('B') => BaseType::Byte,
            Some('C') => BaseType::Char,
            Some('D') => BaseType::Double,
            Some('F') => BaseType::Float,
            Some('I') => BaseType::Int,
            Some('J') => BaseType::Long,
            Some('S') => BaseType::Short,
            Some('Z') => BaseType::Boolean,
            Some(c) => {
                let msg = format!("Invalid base type character '{}'", c);
                return Err(Error::new(ErrorKind::InvalidInput, msg));
            }
            None => {
                let msg = "Missing base type character";
                return Err(Error::new(ErrorKind::UnexpectedEof, msg));
            }
        };
        Ok(typ)
    }
}

/// Reference type
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum RefType<Class> {
    Object(Class),
    ObjectArray(ArrayType<Class>),
    PrimitiveArray(ArrayType<BaseType>),
}

/// Generic array type
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ArrayType<T> {
    /// Additional dimensions (`A[]` has 0 additional dimensions, `A[][][][]` has 3)
    pub additional_dimensions: usize,

    /// Underlying element type (`A` is the underlying element type of `A[][]`)
    pub element_type: T,
}

impl<T> ArrayType<T> {
    /// Total number of dimensions in the array type
    ///
    /// This is always just `additional_dimensions + 1`
    pub const fn dimensions(&self) -> usize {
        self.additional_dimensions + 1
    }
}

impl<T: JavaTypeName> JavaTypeName for ArrayType<T> {
    fn java_name_to(&self, write_to: &mut String) {
        self.element_type.java_name_to(write_to);
        for _ in 0..=self.additional_dimensions {
            write_to.push_str("[]");
        }
    }
}

impl JavaTypeName for BinaryName {
    fn java_name_to(&self, write_to: &mut String) {
        write_to.push_str(&self.java_name());
    }
}

impl ParseDescriptor for BinaryName {
    fn parse_from(source: &mut Peekable<Chars>) -> Result<Self> {
        if let Some('L') = source.next() {
            let mut class_name = String::new();
            loop {
                let c: char = source.next().ok_or_else(|| {
                    let msg = format!("Missing terminator for 'L{}'", class_name);
                    Error::new(ErrorKind::UnexpectedEof, msg)
                })?;
                if c == ';' {
                    return BinaryName::from_string(class_name)
                        .map_err(|msg| Error::new(ErrorKind::InvalidInput, msg));
                } else {
                    class_name.push(c)
                }
            }
        } else {
            Err(Error::new(
                ErrorKind::InvalidInput,
                "Expected object type to start with `L`",
            ))
        }
    }
}

impl<C: JavaTypeName> JavaTypeName for RefType<C> {
    fn java_name_to(&self, write_to: &mut String) {
        match self {
            RefType::Object(cls) => cls.java_name_to(write_to),
            RefType::PrimitiveArray(arr) => arr.java_name_to(write_to),
            RefType::ObjectArray(arr) => arr.java_name_to(write_to),
        }
    }
}

impl<C: ParseDescriptor> ParseDescriptor for RefType<C> {
    fn parse_from(source: &mut Peekable<Chars>) -> Result<Self> {
        Ok(match source.peek().copied() {
            Some('L') => RefType::Object(C::parse_from(source)?),
            Some('[') => {
                source.next();
                let mut additional_dimensions = 0;
                while let Some('[') = source.peek().copied() {
                    additional_dimensions += 1;
                    source.next();
                }
                if let Some('L') = source.peek().copied() {
                    RefType::ObjectArray(ArrayType {
                        additional_dimensions,
                        element_type: C::parse_from(source)?,
                    })
                } else {
                    RefType::PrimitiveArray(ArrayType {
                        additional_dimensions,
                        element_type: BaseType::parse_from(source)?,
                    })
                }
            }
            Some(c) => {
                let msg = format!("Invalid reference type character '{}'", c);
                return Err(Error::new(ErrorKind::InvalidInput, msg));
            }
            None => {
                let msg = "Missing field type";
                return Err(Error::new(ErrorKind::UnexpectedEof, msg));
            }
        })
    }
}

/// Type of a class, instance, or local variable
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum FieldType<Class> {
    Base(BaseType),
    Ref(RefType<Class>),
}

impl<C> FieldType<C> {
    pub const fn object(class_name: C) -> FieldType<C> {
        FieldType::Ref(RefType::Object(class_name))
    }

    pub const fn int() -> FieldType<C> {
        FieldType::Base(BaseType::Int)
    }
}

impl<C: JavaTypeName> JavaTypeName for FieldType<C> {
    fn java_name_to(&self, write_to: &mut String) {
        match self {
            FieldType::Base(base_type) => base_type.java_name_to(write_to),
            FieldType::Ref(reference_type) => reference_type.java_name_to(write_to),
        }
    }
}

impl<C: ParseDescriptor> ParseDescriptor for FieldType<C> {
    fn parse_from(source: &mut Peekable<Chars>) -> Result<Self> {
        match source.peek().copied() {
            None => Err(Error::new(ErrorKind::UnexpectedEof, "Missing field type")),
            Some('B' | 'C' | 'D' | 'F' | 'I' | 'J' | 'S' | 'Z') => {
                BaseType::parse_from(source).map(FieldType::Base)
            }
            Some('L' | '[') => RefType::parse_from(source).map(FieldType::Ref),
            Some(c) => {
                let msg = format!("Invalid reference type character '{}'", c);
                Err(Error::new(ErrorKind::InvalidInput, msg))
            }
        }
    }
}

/// Signature of a method
#[derive(PartialEq, Eq, Hash, Debug, Clone)]
pub struct MethodDescriptor<Class> {
    pub parameters: Vec<FieldType<Class>>,
    pub return_type: Option<FieldType<Class>>, // `None` is for `void` (ie. no return)
}

impl<C: JavaTypeName> MethodDescriptor<C> {
    /// Java name of the return type (`void` when there is none)
    pub fn java_return_name(&self) -> String {
        match &self.return_type {
            None => String::from("void"),
            Some(typ) => typ.java_name(),
        }
    }
}

impl<C: ParseDescriptor> ParseDescriptor for MethodDescriptor<C> {
    fn parse_from(source: &mut Peekable<Chars>) -> Result<Self> {
        // Assert open paren
        if let Some('(') = source.next() {
        } else {
            let msg = "Expected '(' for method";
            return Err(Error::new(ErrorKind::InvalidInput, msg));
        }

        // Parse parameters
        let mut parameters = vec![];
        while source.peek().copied() != Some(')') {
            parameters.push(FieldType::<C>::parse_from(source)?);
        }

        // Assert close paren
        if let Some(')') = source.next() {
        } else {
            let msg = "Expected ')' for method";
            return Err(Error::new(ErrorKind::InvalidInput, msg));
        }

        // Parse return
        let return_type = if let Some('V') = source.peek().copied() {
            let _ = source.next();
            None
        } else {
            Some(FieldType::<C>::parse_from(source)?)
        };

        Ok(MethodDescriptor {
            parameters,
            return_type,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fmt::Debug;

    fn parses_to<T: ParseDescriptor + Debug + Eq>(source: &str, parsed: T) {
        assert_eq!(T::parse(source).unwrap(), parsed);
    }

    type FT = FieldType<BinaryName>;

    const INT: FT = FieldType::Base(BaseType::Int);
    const DOUBLE: FT = FieldType::Base(BaseType::Double);
    const OBJECT: FT = FieldType::object(BinaryName::OBJECT);
    const INTEGER: FT = FieldType::object(BinaryName::INTEGER);

    #[test]
    fn method_descriptors() {
        parses_to(
            "(IDLjava/lang/Integer;)Ljava/lang/Object;",
            MethodDescriptor {
                parameters: vec![INT, DOUBLE, INTEGER],
                return_type: Some(OBJECT),
            },
        );
        parses_to(
            "()V",
            MethodDescriptor {
                parameters: Vec::<FT>::new(),
                return_type: None,
            },
        );
    }

    #[test]
    fn java_names() {
        assert_eq!(FT::parse("I").unwrap().java_name(), "int");
        assert_eq!(FT::parse("Z").unwrap().java_name(), "boolean");
        assert_eq!(
            FT::parse("Ljava/lang/String;").unwrap().java_name(),
            "java.lang.String"
        );
        assert_eq!(FT::parse("[[J").unwrap().java_name(), "long[][]");
        assert_eq!(
            FT::parse("[Ljava/util/Map$Entry;").unwrap().java_name(),
            "java.util.Map$Entry[]"
        );
    }

    #[test]
    fn void_return() {
        let descriptor = MethodDescriptor::<BinaryName>::parse("(I)V").unwrap();
        assert_eq!(descriptor.java_return_name(), "void");
        let descriptor = MethodDescriptor::<BinaryName>::parse("()[I").unwrap();
        assert_eq!(descriptor.java_return_name(), "int[]");
    }

    #[test]
    fn malformed_descriptors() {
        assert!(FT::parse("Ljava/lang/String").is_err());
        assert!(FT::parse("Q").is_err());
        assert!(FT::parse("II").is_err());
        assert!(MethodDescriptor::<BinaryName>::parse("(I").is_err());
    }
}
