use crate::jvm::class_file::{self, Attribute, Code, ConstantPool};
use crate::jvm::code::{decode, Instruction};
use crate::jvm::{
    BinaryName, Error, MethodAccessFlags, MethodDescriptor, Name, ParseDescriptor, UnqualifiedName,
};

/// Method, as it is declared in a class
#[derive(Debug, Clone)]
pub struct MethodDeclaration {
    pub access_flags: MethodAccessFlags,
    pub name: UnqualifiedName,
    pub descriptor: MethodDescriptor<BinaryName>,

    /// Decoded body (empty for `abstract` and `native` methods)
    pub instructions: Vec<Instruction>,
}

impl MethodDeclaration {
    pub fn from_method(
        method: &class_file::Method,
        constants: &ConstantPool,
    ) -> Result<MethodDeclaration, Error> {
        let name = constants.utf8(method.name_index)?;
        let name = UnqualifiedName::from_string(name.to_owned()).map_err(Error::MalformedName)?;
        let descriptor = constants.utf8(method.descriptor_index)?;
        let descriptor = MethodDescriptor::parse(descriptor)
            .map_err(|err| Error::BadDescriptor(format!("{}: {}", descriptor, err)))?;

        let instructions = match Attribute::find::<Code>(&method.attributes, constants)? {
            Some(code) => decode(&code, constants)?,
            None => vec![],
        };

        Ok(MethodDeclaration {
            access_flags: method.access_flags,
            name,
            descriptor,
            instructions,
        })
    }
}
