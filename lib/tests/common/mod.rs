//! Building small class files for tests

#![allow(dead_code)]

use patch_editor::jvm::class_file::{
    ClassFile, Code, ConstantPool, ConstantValue, Field, Method, Version,
};
use patch_editor::jvm::{ClassAccessFlags, Error, FieldAccessFlags, MethodAccessFlags};

pub struct FieldSpec {
    pub access_flags: FieldAccessFlags,
    pub name: String,
    pub descriptor: String,
    pub int_value: Option<i32>,
}

pub struct MethodSpec {
    pub access_flags: MethodAccessFlags,
    pub name: String,
    pub descriptor: String,

    /// Raw code array (no `Code` attribute if `None`)
    pub code: Option<Vec<u8>>,
}

pub struct ClassSpec {
    pub name: String,
    pub fields: Vec<FieldSpec>,
    pub methods: Vec<MethodSpec>,
}

impl ClassSpec {
    pub fn new(name: &str) -> ClassSpec {
        ClassSpec {
            name: name.to_owned(),
            fields: vec![],
            methods: vec![],
        }
    }

    pub fn field(mut self, access_flags: FieldAccessFlags, name: &str, descriptor: &str) -> Self {
        self.fields.push(FieldSpec {
            access_flags,
            name: name.to_owned(),
            descriptor: descriptor.to_owned(),
            int_value: None,
        });
        self
    }

    pub fn constant_field(mut self, name: &str, value: i32) -> Self {
        self.fields.push(FieldSpec {
            access_flags: FieldAccessFlags::PUBLIC
                | FieldAccessFlags::STATIC
                | FieldAccessFlags::FINAL,
            name: name.to_owned(),
            descriptor: String::from("I"),
            int_value: Some(value),
        });
        self
    }

    pub fn method(
        mut self,
        access_flags: MethodAccessFlags,
        name: &str,
        descriptor: &str,
        code: Option<Vec<u8>>,
    ) -> Self {
        self.methods.push(MethodSpec {
            access_flags,
            name: name.to_owned(),
            descriptor: descriptor.to_owned(),
            code,
        });
        self
    }

    pub fn build(&self) -> Result<ClassFile, Error> {
        let mut constants = ConstantPool::new();
        let this_class = constants.get_class(self.name.as_str())?;
        let super_class = constants.get_class("java/lang/Object")?;

        let mut fields = vec![];
        for spec in &self.fields {
            let mut attributes = vec![];
            if let Some(value) = spec.int_value {
                let index = constants.get_integer(value)?;
                attributes.push(constants.get_attribute(ConstantValue(index))?);
            }
            fields.push(Field {
                access_flags: spec.access_flags,
                name_index: constants.get_utf8(spec.name.as_str())?,
                descriptor_index: constants.get_utf8(spec.descriptor.as_str())?,
                attributes,
            });
        }

        let mut methods = vec![];
        for spec in &self.methods {
            let mut attributes = vec![];
            if let Some(code_array) = &spec.code {
                let code = Code {
                    max_stack: 4,
                    max_locals: 4,
                    code_array: code_array.clone(),
                    exception_table: vec![],
                    attributes: vec![],
                };
                attributes.push(constants.get_attribute(code)?);
            }
            methods.push(Method {
                access_flags: spec.access_flags,
                name_index: constants.get_utf8(spec.name.as_str())?,
                descriptor_index: constants.get_utf8(spec.descriptor.as_str())?,
                attributes,
            });
        }

        Ok(ClassFile {
            version: Version::JAVA8,
            constants,
            access_flags: ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER,
            this_class,
            super_class,
            interfaces: vec![],
            fields,
            methods,
            attributes: vec![],
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.build()
            .and_then(|class| class.to_bytes())
            .expect("test class should serialize")
    }
}

/// Descriptor of a method taking `count` ints and returning nothing
pub fn int_parameters(count: usize) -> String {
    format!("({})V", "I".repeat(count))
}
