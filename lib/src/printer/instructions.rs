use crate::jvm::code::{Instruction, InstructionKind};
use crate::jvm::JavaTypeName;
use std::collections::HashMap;
use std::fmt::Write;

/// Renders one kind of instruction, or declines by returning `None`
pub type FormatFn = fn(&Instruction) -> Option<String>;

/// Table of how each kind of instruction gets rendered
///
/// Instructions whose kind has no entry (or whose entry declines) are left to the printer, which
/// falls back to the bare mnemonic.
#[derive(Clone)]
pub struct InstructionFormatter {
    formats: HashMap<InstructionKind, FormatFn>,
}

impl InstructionFormatter {
    /// Formatter with no entries at all
    pub fn empty() -> InstructionFormatter {
        InstructionFormatter {
            formats: HashMap::new(),
        }
    }

    /// Set how a kind of instruction gets rendered, returning the previous entry
    pub fn insert(&mut self, kind: InstructionKind, format: FormatFn) -> Option<FormatFn> {
        self.formats.insert(kind, format)
    }

    pub fn remove(&mut self, kind: InstructionKind) -> Option<FormatFn> {
        self.formats.remove(&kind)
    }

    pub fn contains(&self, kind: InstructionKind) -> bool {
        self.formats.contains_key(&kind)
    }

    /// Render an instruction (without the leading `.`)
    pub fn format(&self, instruction: &Instruction) -> Option<String> {
        let format = self.formats.get(&instruction.kind())?;
        format(instruction)
    }
}

/// Every kind except [`InstructionKind::Simple`] (which the mnemonic fallback covers) and
/// [`InstructionKind::LineNumber`] (which isn't printed)
impl Default for InstructionFormatter {
    fn default() -> Self {
        let mut formatter = InstructionFormatter::empty();
        formatter.insert(InstructionKind::Label, format_label);
        formatter.insert(InstructionKind::IntPush, format_int_push);
        formatter.insert(InstructionKind::NewArray, format_new_array);
        formatter.insert(InstructionKind::Local, format_local);
        formatter.insert(InstructionKind::Increment, format_increment);
        formatter.insert(InstructionKind::Jump, format_jump);
        formatter.insert(InstructionKind::Constant, format_constant);
        formatter.insert(InstructionKind::Field, format_member);
        formatter.insert(InstructionKind::Method, format_member);
        formatter.insert(InstructionKind::InvokeDynamic, format_invoke_dynamic);
        formatter.insert(InstructionKind::Type, format_type);
        formatter.insert(InstructionKind::MultiANewArray, format_multi_anew_array);
        formatter.insert(InstructionKind::TableSwitch, format_table_switch);
        formatter.insert(InstructionKind::LookupSwitch, format_lookup_switch);
        formatter
    }
}

fn format_label(instruction: &Instruction) -> Option<String> {
    match instruction {
        Instruction::Label(label) => Some(format!("{} {}", instruction.mnemonic()?, label)),
        _ => None,
    }
}

fn format_int_push(instruction: &Instruction) -> Option<String> {
    match instruction {
        Instruction::IntPush { value, .. } => {
            Some(format!("{} {}", instruction.mnemonic()?, value))
        }
        _ => None,
    }
}

fn format_new_array(instruction: &Instruction) -> Option<String> {
    match instruction {
        Instruction::NewArray(element) => {
            Some(format!("{} {}", instruction.mnemonic()?, element.java_name()))
        }
        _ => None,
    }
}

fn format_local(instruction: &Instruction) -> Option<String> {
    match instruction {
        Instruction::Local { index, .. } => {
            Some(format!("{} {}", instruction.mnemonic()?, index))
        }
        _ => None,
    }
}

fn format_increment(instruction: &Instruction) -> Option<String> {
    match instruction {
        Instruction::Increment { index, delta } => {
            Some(format!("{} {} {}", instruction.mnemonic()?, index, delta))
        }
        _ => None,
    }
}

fn format_jump(instruction: &Instruction) -> Option<String> {
    match instruction {
        Instruction::Jump { target, .. } => {
            Some(format!("{} {}", instruction.mnemonic()?, target))
        }
        _ => None,
    }
}

fn format_constant(instruction: &Instruction) -> Option<String> {
    match instruction {
        Instruction::Constant { value, .. } => {
            Some(format!("{} {}", instruction.mnemonic()?, value))
        }
        _ => None,
    }
}

fn format_member(instruction: &Instruction) -> Option<String> {
    match instruction {
        Instruction::Field { member, .. } | Instruction::Method { member, .. } => {
            Some(format!("{} {}", instruction.mnemonic()?, member))
        }
        _ => None,
    }
}

fn format_invoke_dynamic(instruction: &Instruction) -> Option<String> {
    match instruction {
        Instruction::InvokeDynamic {
            bootstrap_method,
            name,
            descriptor,
        } => Some(format!(
            "{} <{}> {} {}",
            instruction.mnemonic()?,
            bootstrap_method,
            name,
            descriptor
        )),
        _ => None,
    }
}

fn format_type(instruction: &Instruction) -> Option<String> {
    match instruction {
        Instruction::Type { class, .. } => Some(format!("{} {}", instruction.mnemonic()?, class)),
        _ => None,
    }
}

fn format_multi_anew_array(instruction: &Instruction) -> Option<String> {
    match instruction {
        Instruction::MultiANewArray { class, dimensions } => Some(format!(
            "{} {} {}",
            instruction.mnemonic()?,
            class,
            dimensions
        )),
        _ => None,
    }
}

fn format_table_switch(instruction: &Instruction) -> Option<String> {
    match instruction {
        Instruction::TableSwitch {
            default,
            low,
            targets,
        } => {
            let mut text = format!("{} {}", instruction.mnemonic()?, low);
            for target in targets {
                let _ = write!(text, " {}", target);
            }
            let _ = write!(text, " default {}", default);
            Some(text)
        }
        _ => None,
    }
}

fn format_lookup_switch(instruction: &Instruction) -> Option<String> {
    match instruction {
        Instruction::LookupSwitch { default, pairs } => {
            let mut text = String::from(instruction.mnemonic()?);
            for (key, target) in pairs {
                let _ = write!(text, " {}:{}", key, target);
            }
            let _ = write!(text, " default {}", default);
            Some(text)
        }
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::code::{opcodes, Label, LoadableConstant, MemberRef};
    use crate::jvm::BaseType;

    fn format(instruction: Instruction) -> Option<String> {
        InstructionFormatter::default().format(&instruction)
    }

    #[test]
    fn default_table_covers_everything_but_simple_instructions() {
        let formatter = InstructionFormatter::default();
        for kind in InstructionKind::ALL {
            let expected = !matches!(kind, InstructionKind::Simple | InstructionKind::LineNumber);
            assert_eq!(formatter.contains(kind), expected, "{:?}", kind);
        }
    }

    #[test]
    fn operands() {
        assert_eq!(format(Instruction::Label(Label(2))).as_deref(), Some("label L2"));
        assert_eq!(
            format(Instruction::IntPush {
                opcode: opcodes::BIPUSH,
                value: -5
            })
            .as_deref(),
            Some("bipush -5")
        );
        assert_eq!(
            format(Instruction::NewArray(BaseType::Int)).as_deref(),
            Some("newarray int")
        );
        assert_eq!(
            format(Instruction::Increment { index: 1, delta: -1 }).as_deref(),
            Some("iinc 1 -1")
        );
        assert_eq!(
            format(Instruction::Constant {
                opcode: opcodes::LDC2_W,
                value: LoadableConstant::Long(7)
            })
            .as_deref(),
            Some("ldc2_w 7L")
        );
        assert_eq!(
            format(Instruction::Constant {
                opcode: opcodes::LDC,
                value: LoadableConstant::String(String::from("say \"hi\""))
            })
            .as_deref(),
            Some("ldc \"say \\\"hi\\\"\"")
        );
    }

    #[test]
    fn references() {
        let member = MemberRef {
            class: String::from("java/io/PrintStream"),
            name: String::from("println"),
            descriptor: String::from("(I)V"),
        };
        assert_eq!(
            format(Instruction::Method {
                opcode: opcodes::INVOKEVIRTUAL,
                member,
                is_interface: false,
            })
            .as_deref(),
            Some("invokevirtual java/io/PrintStream println (I)V")
        );
        assert_eq!(
            format(Instruction::MultiANewArray {
                class: String::from("[[I"),
                dimensions: 2
            })
            .as_deref(),
            Some("multianewarray [[I 2")
        );
    }

    #[test]
    fn switches() {
        assert_eq!(
            format(Instruction::TableSwitch {
                default: Label(2),
                low: 0,
                targets: vec![Label(0), Label(1)],
            })
            .as_deref(),
            Some("tableswitch 0 L0 L1 default L2")
        );
        assert_eq!(
            format(Instruction::LookupSwitch {
                default: Label(1),
                pairs: vec![(-1, Label(0))],
            })
            .as_deref(),
            Some("lookupswitch -1:L0 default L1")
        );
    }

    #[test]
    fn entries_can_be_replaced_and_removed() {
        let mut formatter = InstructionFormatter::default();
        let previous = formatter.insert(InstructionKind::Simple, |_| Some(String::from("x")));
        assert!(previous.is_none());
        assert_eq!(
            formatter.format(&Instruction::Simple(opcodes::NOP)).as_deref(),
            Some("x")
        );

        formatter.remove(InstructionKind::Jump);
        let jump = Instruction::Jump {
            opcode: opcodes::GOTO,
            target: Label(0),
        };
        assert_eq!(formatter.format(&jump), None);
    }
}
