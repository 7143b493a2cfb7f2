use crate::jvm::class_file::{self, Attribute, Constant, ConstantPool};
use crate::jvm::model::ConstantValue;
use crate::jvm::{
    BinaryName, Error, FieldAccessFlags, FieldType, Name, ParseDescriptor, UnqualifiedName,
};

/// Field, as it is declared in a class
#[derive(Debug, Clone)]
pub struct FieldDeclaration {
    pub access_flags: FieldAccessFlags,
    pub name: UnqualifiedName,
    pub descriptor: FieldType<BinaryName>,

    /// Compile-time constant initializer, if any
    pub constant_value: Option<ConstantValue>,
}

impl FieldDeclaration {
    pub fn from_field(
        field: &class_file::Field,
        constants: &ConstantPool,
    ) -> Result<FieldDeclaration, Error> {
        let name = constants.utf8(field.name_index)?;
        let name = UnqualifiedName::from_string(name.to_owned()).map_err(Error::MalformedName)?;
        let descriptor = constants.utf8(field.descriptor_index)?;
        let descriptor = FieldType::parse(descriptor)
            .map_err(|err| Error::BadDescriptor(format!("{}: {}", descriptor, err)))?;

        let constant_value = match Attribute::find::<class_file::ConstantValue>(
            &field.attributes,
            constants,
        )? {
            None => None,
            Some(class_file::ConstantValue(index)) => {
                let value = match constants.get(index)? {
                    Constant::Integer(integer) => ConstantValue::Integer(*integer),
                    Constant::Long(long) => ConstantValue::Long(*long),
                    Constant::Float(float) => ConstantValue::Float(*float),
                    Constant::Double(double) => ConstantValue::Double(*double),
                    Constant::String(utf8) => {
                        ConstantValue::String(constants.utf8(*utf8)?.to_owned())
                    }
                    _ => {
                        return Err(Error::UnexpectedConstant {
                            index,
                            expected: "field constant value",
                        })
                    }
                };
                Some(value)
            }
        };

        Ok(FieldDeclaration {
            access_flags: field.access_flags,
            name,
            descriptor,
            constant_value,
        })
    }
}
