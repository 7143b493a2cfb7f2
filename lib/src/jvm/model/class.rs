use crate::jvm::class_file::ClassFile;
use crate::jvm::model::{FieldDeclaration, MethodDeclaration};
use crate::jvm::{BinaryName, ClassAccessFlags, Error, Name};

/// Class, as it is declared in a class file
#[derive(Debug, Clone)]
pub struct ClassDeclaration {
    pub access_flags: ClassAccessFlags,
    pub name: BinaryName,

    /// Only `java/lang/Object` has no superclass
    pub superclass: Option<BinaryName>,
    pub interfaces: Vec<BinaryName>,
    pub fields: Vec<FieldDeclaration>,
    pub methods: Vec<MethodDeclaration>,
}

impl ClassDeclaration {
    /// Parse the raw bytes of a class file and resolve it
    pub fn parse(bytes: &[u8]) -> Result<ClassDeclaration, Error> {
        ClassDeclaration::from_class_file(&ClassFile::parse(bytes)?)
    }

    /// Resolve everything in a class file against its constant pool
    pub fn from_class_file(class_file: &ClassFile) -> Result<ClassDeclaration, Error> {
        let constants = &class_file.constants;

        let name = binary_name(class_file.class_name()?)?;
        let superclass = class_file.super_class_name()?.map(binary_name).transpose()?;
        let interfaces = class_file
            .interfaces
            .iter()
            .map(|interface| binary_name(constants.class_name(*interface)?))
            .collect::<Result<Vec<_>, Error>>()?;
        let fields = class_file
            .fields
            .iter()
            .map(|field| FieldDeclaration::from_field(field, constants))
            .collect::<Result<Vec<_>, Error>>()?;
        let methods = class_file
            .methods
            .iter()
            .map(|method| MethodDeclaration::from_method(method, constants))
            .collect::<Result<Vec<_>, Error>>()?;

        log::debug!(
            "Resolved class {} ({} fields, {} methods)",
            name,
            fields.len(),
            methods.len()
        );

        Ok(ClassDeclaration {
            access_flags: class_file.access_flags,
            name,
            superclass,
            interfaces,
            fields,
            methods,
        })
    }
}

fn binary_name(name: &str) -> Result<BinaryName, Error> {
    BinaryName::from_string(name.to_owned()).map_err(Error::MalformedName)
}
