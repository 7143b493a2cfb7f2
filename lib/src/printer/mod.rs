//! Rendering classes as pseudo-assembly text
//!
//! The output is what patch scripts are written against, so it is meant to be read by people and
//! to be stable: printing the same class twice produces the same bytes. A class looks like this:
//!
//! ```text
//! public class Point implements java/io/Serializable {
//!   public static final int ORIGIN = 0;
//!
//!   public int getX() {
//!     .aload_0
//!     .getfield Point x I
//!     .ireturn
//!   }
//! }
//! ```
//!
//! Only a fixed list of modifiers is printed (see [`Modifier::CANONICAL_ORDER`]). Method
//! parameters have no names in the class file, so they get named `a`, `b`, `c`, ... in order.
//! Every instruction goes on its own line prefixed with `.`, see [`InstructionFormatter`] for
//! how operands are rendered.

mod instructions;
mod output;

pub use instructions::*;
pub use output::*;

use crate::jvm::code::{opcode_name, Instruction};
use crate::jvm::model::{ClassDeclaration, FieldDeclaration, MethodDeclaration};
use crate::jvm::{BinaryName, JavaTypeName, Modifier, Name};
use std::fmt::{self, Display, Formatter, Write as _};

/// Method parameters are named with single lowercase letters
const PARAMETER_NAMES: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";

#[derive(Debug)]
pub enum Error {
    /// Method has more parameters than there are parameter names
    UnsupportedInstructionCount { method: String, parameters: usize },

    /// The output sink failed
    Format(fmt::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnsupportedInstructionCount { method, parameters } => write!(
                f,
                "Method {} has {} parameters (at most {} can be printed)",
                method,
                parameters,
                PARAMETER_NAMES.len()
            ),
            Error::Format(_) => f.write_str("Failed to write output"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Format(err) => Some(err),
            _ => None,
        }
    }
}

impl From<fmt::Error> for Error {
    fn from(err: fmt::Error) -> Error {
        Error::Format(err)
    }
}

#[derive(Debug, Clone)]
pub struct PrinterSettings {
    /// Text used for one level of indentation
    pub indent: String,
}

impl Default for PrinterSettings {
    fn default() -> Self {
        PrinterSettings {
            indent: String::from("  "),
        }
    }
}

/// Renders [`ClassDeclaration`]s as text
#[derive(Clone, Default)]
pub struct BytecodePrinter {
    formatter: InstructionFormatter,
    settings: PrinterSettings,
}

impl BytecodePrinter {
    pub fn new() -> BytecodePrinter {
        BytecodePrinter::default()
    }

    pub fn with_formatter(formatter: InstructionFormatter) -> BytecodePrinter {
        BytecodePrinter {
            formatter,
            settings: PrinterSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: PrinterSettings) -> BytecodePrinter {
        self.settings = settings;
        self
    }

    pub fn formatter(&self) -> &InstructionFormatter {
        &self.formatter
    }

    /// Render a whole class into a fresh string
    pub fn print(&self, class: &ClassDeclaration) -> Result<String, Error> {
        let mut output = TextOutput::new(String::new(), self.settings.indent.as_str());
        self.write_class(class, &mut output)?;
        Ok(output.into_inner())
    }

    /// Render a whole class into some output
    pub fn write_class<W: fmt::Write>(
        &self,
        class: &ClassDeclaration,
        output: &mut TextOutput<W>,
    ) -> Result<(), Error> {
        // `0x0020` is `ACC_SUPER` on classes
        write_modifiers(output, class.access_flags.bits(), &[Modifier::Synchronized])?;
        write!(output, "class {}", class.name.as_str())?;
        if let Some(superclass) = &class.superclass {
            if superclass != &BinaryName::OBJECT {
                write!(output, " extends {}", superclass.as_str())?;
            }
        }
        for (idx, interface) in class.interfaces.iter().enumerate() {
            let separator = if idx == 0 { " implements " } else { ", " };
            write!(output, "{}{}", separator, interface.as_str())?;
        }
        output.write_line(" {")?;
        output.indent();

        let mut first_member = true;
        for field in &class.fields {
            separate_member(output, &mut first_member)?;
            self.write_field(field, output)?;
        }
        for method in &class.methods {
            separate_member(output, &mut first_member)?;
            self.write_method(method, output)?;
        }

        output.unindent();
        output.write_line("}")?;
        Ok(())
    }

    fn write_field<W: fmt::Write>(
        &self,
        field: &FieldDeclaration,
        output: &mut TextOutput<W>,
    ) -> Result<(), Error> {
        write_modifiers(output, field.access_flags.bits(), &[])?;
        let mut line = format!("{} {}", field.descriptor.java_name(), field.name.as_str());
        if let Some(value) = &field.constant_value {
            write!(line, " = {}", value)?;
        }
        line.push(';');
        output.write_line(&line.replace('\n', "\\n"))?;
        Ok(())
    }

    fn write_method<W: fmt::Write>(
        &self,
        method: &MethodDeclaration,
        output: &mut TextOutput<W>,
    ) -> Result<(), Error> {
        let parameters = &method.descriptor.parameters;
        if parameters.len() > PARAMETER_NAMES.len() {
            return Err(Error::UnsupportedInstructionCount {
                method: method.name.as_str().to_owned(),
                parameters: parameters.len(),
            });
        }

        write_modifiers(output, method.access_flags.bits(), &[])?;
        write!(
            output,
            "{} {}(",
            method.descriptor.java_return_name(),
            method.name.as_str()
        )?;
        for (idx, (parameter, name)) in parameters.iter().zip(PARAMETER_NAMES).enumerate() {
            if idx > 0 {
                output.write(", ")?;
            }
            write!(output, "{} {}", parameter.java_name(), *name as char)?;
        }
        output.write_line(") {")?;
        output.indent();

        for instruction in &method.instructions {
            if let Some(text) = self.instruction_text(instruction) {
                output.write(".")?;
                output.write_line(&text.replace('\n', "\\n"))?;
            }
        }

        output.unindent();
        output.write_line("}")?;
        Ok(())
    }

    /// Text of an instruction line (without the leading `.`), or `None` if it isn't printed
    pub fn instruction_text(&self, instruction: &Instruction) -> Option<String> {
        self.formatter
            .format(instruction)
            .or_else(|| opcode_name(instruction.opcode()).map(String::from))
    }
}

fn write_modifiers<W: fmt::Write>(
    output: &mut TextOutput<W>,
    bits: u16,
    exclude: &[Modifier],
) -> fmt::Result {
    for modifier in Modifier::from_bits(bits, exclude) {
        write!(output, "{} ", modifier.keyword())?;
    }
    Ok(())
}

/// Members are separated by one blank line
fn separate_member<W: fmt::Write>(
    output: &mut TextOutput<W>,
    first_member: &mut bool,
) -> fmt::Result {
    if *first_member {
        *first_member = false;
        Ok(())
    } else {
        output.newline()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::code::{opcodes, Label, LoadableConstant};
    use crate::jvm::model::ConstantValue;
    use crate::jvm::{
        ClassAccessFlags, FieldAccessFlags, FieldType, MethodAccessFlags, MethodDescriptor,
        UnqualifiedName,
    };

    fn empty_class(name: &str) -> ClassDeclaration {
        ClassDeclaration {
            access_flags: ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER,
            name: BinaryName::from_string(name.to_owned()).unwrap(),
            superclass: Some(BinaryName::OBJECT),
            interfaces: vec![],
            fields: vec![],
            methods: vec![],
        }
    }

    fn method(name: &str, parameters: usize, instructions: Vec<Instruction>) -> MethodDeclaration {
        MethodDeclaration {
            access_flags: MethodAccessFlags::PUBLIC,
            name: UnqualifiedName::from_string(name.to_owned()).unwrap(),
            descriptor: MethodDescriptor {
                parameters: vec![FieldType::int(); parameters],
                return_type: None,
            },
            instructions,
        }
    }

    #[test]
    fn class_header() {
        let mut class = empty_class("a/B");
        class.superclass = Some(BinaryName::from_string(String::from("a/Base")).unwrap());
        class.interfaces = vec![
            BinaryName::from_string(String::from("a/I")).unwrap(),
            BinaryName::from_string(String::from("a/J")).unwrap(),
        ];
        let text = BytecodePrinter::new().print(&class).unwrap();
        assert_eq!(text, "public class a/B extends a/Base implements a/I, a/J {\n}\n");
    }

    #[test]
    fn field_with_constant() {
        let mut class = empty_class("C");
        class.fields.push(FieldDeclaration {
            access_flags: FieldAccessFlags::PRIVATE
                | FieldAccessFlags::STATIC
                | FieldAccessFlags::FINAL
                | FieldAccessFlags::VOLATILE,
            name: UnqualifiedName::from_string(String::from("NAME")).unwrap(),
            descriptor: FieldType::object(BinaryName::STRING),
            constant_value: Some(ConstantValue::String(String::from("a\"b"))),
        });
        let text = BytecodePrinter::new().print(&class).unwrap();
        assert_eq!(
            text,
            "public class C {\n  private static final java.lang.String NAME = \"a\\\"b\";\n}\n"
        );
    }

    #[test]
    fn string_constant_stays_on_one_line() {
        let mut class = empty_class("C");
        class.fields.push(FieldDeclaration {
            access_flags: FieldAccessFlags::STATIC | FieldAccessFlags::FINAL,
            name: UnqualifiedName::from_string(String::from("S")).unwrap(),
            descriptor: FieldType::object(BinaryName::STRING),
            constant_value: Some(ConstantValue::String(String::from("a\nb"))),
        });
        let text = BytecodePrinter::new().print(&class).unwrap();
        assert_eq!(
            text,
            "public class C {\n  static final java.lang.String S = \"a\\nb\";\n}\n"
        );
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn method_body() {
        let mut class = empty_class("C");
        class.methods.push(method(
            "f",
            2,
            vec![
                Instruction::Label(Label(0)),
                Instruction::LineNumber(3),
                Instruction::Local {
                    opcode: opcodes::ILOAD,
                    index: 1,
                },
                Instruction::Constant {
                    opcode: opcodes::LDC,
                    value: LoadableConstant::String(String::from("x\ny")),
                },
                Instruction::Simple(0xCA),
                Instruction::Simple(opcodes::RETURN),
            ],
        ));
        class.methods.push(method("g", 0, vec![]));

        let text = BytecodePrinter::new().print(&class).unwrap();
        assert_eq!(
            text,
            "public class C {\n  public void f(int a, int b) {\n    .label L0\n    .iload 1\n    .ldc \"x\\ny\"\n    .return\n  }\n\n  public void g() {\n  }\n}\n"
        );
    }

    #[test]
    fn too_many_parameters() {
        let mut class = empty_class("C");
        class.methods.push(method("wide", 27, vec![]));
        match BytecodePrinter::new().print(&class) {
            Err(Error::UnsupportedInstructionCount { method, parameters }) => {
                assert_eq!(method, "wide");
                assert_eq!(parameters, 27);
            }
            other => panic!("unexpected {:?}", other),
        }

        let mut class = empty_class("C");
        class.methods.push(method("ok", 26, vec![]));
        let text = BytecodePrinter::new().print(&class).unwrap();
        assert!(text.contains("int z) {"));
    }

    #[test]
    fn custom_settings_and_formatter() {
        let mut formatter = InstructionFormatter::default();
        formatter.remove(crate::jvm::code::InstructionKind::Local);
        let printer = BytecodePrinter::with_formatter(formatter).with_settings(PrinterSettings {
            indent: String::from("\t"),
        });

        let mut class = empty_class("C");
        class.methods.push(method(
            "f",
            0,
            vec![Instruction::Local {
                opcode: opcodes::ILOAD,
                index: 4,
            }],
        ));
        let text = printer.print(&class).unwrap();
        assert_eq!(text, "public class C {\n\tpublic void f() {\n\t\t.iload\n\t}\n}\n");
    }
}
