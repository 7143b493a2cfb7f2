use super::opcodes::{self, PSEUDO_OPCODE};
use crate::jvm::class_file::HandleKind;
use crate::jvm::model::{java_double, java_float, quote_java_string};
use crate::jvm::BaseType;
use std::fmt;

/// Jump target inside a method body
///
/// Labels are numbered in the order their targets appear in the code, so the first jump target
/// in a method is always `L0`.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Label(pub usize);

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Field or method referenced by an instruction
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MemberRef {
    /// Owner, as a binary name (or an array descriptor for methods like `[I.clone()`)
    pub class: String,
    pub name: String,
    pub descriptor: String,
}

impl fmt::Display for MemberRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.class, self.name, self.descriptor)
    }
}

/// Constant that can be pushed with `ldc`, `ldc_w`, or `ldc2_w`
#[derive(Clone, Debug, PartialEq)]
pub enum LoadableConstant {
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    String(String),
    Class(String),
    MethodType(String),
    MethodHandle {
        handle_kind: HandleKind,
        member: MemberRef,
    },
    Dynamic {
        name: String,
        descriptor: String,
    },
}

impl fmt::Display for LoadableConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadableConstant::Integer(integer) => write!(f, "{}", integer),
            LoadableConstant::Float(float) => write!(f, "{}F", java_float(*float)),
            LoadableConstant::Long(long) => write!(f, "{}L", long),
            LoadableConstant::Double(double) => write!(f, "{}D", java_double(*double)),
            LoadableConstant::String(string) => f.write_str(&quote_java_string(string)),
            LoadableConstant::Class(class) => write!(f, "{}.class", class),
            LoadableConstant::MethodType(descriptor) => f.write_str(descriptor),
            LoadableConstant::MethodHandle {
                handle_kind,
                member,
            } => write!(f, "{:?} {}", handle_kind, member),
            LoadableConstant::Dynamic { name, descriptor } => {
                write!(f, "{} {}", name, descriptor)
            }
        }
    }
}

/// Decoded bytecode instruction
///
/// Instructions that only differ by opcode are grouped into one variant (eg. all the conditional
/// branches are a [`Instruction::Jump`]) and carry the opcode along. Labels and line numbers are
/// pseudo-instructions: they don't occupy any bytes in the code array.
#[derive(Clone, Debug, PartialEq)]
pub enum Instruction {
    /// Marks the position of a jump target
    Label(Label),

    /// The following instructions were compiled from this source line
    LineNumber(u16),

    /// Instruction without operands (also used for opcodes outside the known table)
    Simple(u8),

    /// `bipush` or `sipush`
    IntPush { opcode: u8, value: i32 },

    /// `newarray`
    NewArray(BaseType),

    /// Loads, stores, and `ret` with an explicit local variable index (including `wide` forms)
    Local { opcode: u8, index: u16 },

    /// `iinc` (including the `wide` form)
    Increment { index: u16, delta: i16 },

    /// Conditional and unconditional branches, `jsr`, and their wide forms
    Jump { opcode: u8, target: Label },

    /// `ldc`, `ldc_w`, `ldc2_w`
    Constant {
        opcode: u8,
        value: LoadableConstant,
    },

    /// `getstatic`, `putstatic`, `getfield`, `putfield`
    Field { opcode: u8, member: MemberRef },

    /// `invokevirtual`, `invokespecial`, `invokestatic`, `invokeinterface`
    Method {
        opcode: u8,
        member: MemberRef,
        is_interface: bool,
    },

    InvokeDynamic {
        bootstrap_method: u16,
        name: String,
        descriptor: String,
    },

    /// `new`, `anewarray`, `checkcast`, `instanceof`
    Type { opcode: u8, class: String },

    MultiANewArray { class: String, dimensions: u8 },

    TableSwitch {
        default: Label,
        low: i32,
        targets: Vec<Label>,
    },

    LookupSwitch {
        default: Label,
        pairs: Vec<(i32, Label)>,
    },
}

/// Discriminant of [`Instruction`], used to pick how an instruction gets formatted
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InstructionKind {
    Label,
    LineNumber,
    Simple,
    IntPush,
    NewArray,
    Local,
    Increment,
    Jump,
    Constant,
    Field,
    Method,
    InvokeDynamic,
    Type,
    MultiANewArray,
    TableSwitch,
    LookupSwitch,
}

impl InstructionKind {
    pub const ALL: [InstructionKind; 16] = [
        InstructionKind::Label,
        InstructionKind::LineNumber,
        InstructionKind::Simple,
        InstructionKind::IntPush,
        InstructionKind::NewArray,
        InstructionKind::Local,
        InstructionKind::Increment,
        InstructionKind::Jump,
        InstructionKind::Constant,
        InstructionKind::Field,
        InstructionKind::Method,
        InstructionKind::InvokeDynamic,
        InstructionKind::Type,
        InstructionKind::MultiANewArray,
        InstructionKind::TableSwitch,
        InstructionKind::LookupSwitch,
    ];
}

impl Instruction {
    pub fn kind(&self) -> InstructionKind {
        match self {
            Instruction::Label(_) => InstructionKind::Label,
            Instruction::LineNumber(_) => InstructionKind::LineNumber,
            Instruction::Simple(_) => InstructionKind::Simple,
            Instruction::IntPush { .. } => InstructionKind::IntPush,
            Instruction::NewArray(_) => InstructionKind::NewArray,
            Instruction::Local { .. } => InstructionKind::Local,
            Instruction::Increment { .. } => InstructionKind::Increment,
            Instruction::Jump { .. } => InstructionKind::Jump,
            Instruction::Constant { .. } => InstructionKind::Constant,
            Instruction::Field { .. } => InstructionKind::Field,
            Instruction::Method { .. } => InstructionKind::Method,
            Instruction::InvokeDynamic { .. } => InstructionKind::InvokeDynamic,
            Instruction::Type { .. } => InstructionKind::Type,
            Instruction::MultiANewArray { .. } => InstructionKind::MultiANewArray,
            Instruction::TableSwitch { .. } => InstructionKind::TableSwitch,
            Instruction::LookupSwitch { .. } => InstructionKind::LookupSwitch,
        }
    }

    /// Opcode of the instruction
    ///
    /// Pseudo-instructions report [`PSEUDO_OPCODE`], which has no name in the opcode table.
    pub fn opcode(&self) -> u8 {
        match self {
            Instruction::Label(_) | Instruction::LineNumber(_) => PSEUDO_OPCODE,
            Instruction::Simple(opcode)
            | Instruction::IntPush { opcode, .. }
            | Instruction::Local { opcode, .. }
            | Instruction::Jump { opcode, .. }
            | Instruction::Constant { opcode, .. }
            | Instruction::Field { opcode, .. }
            | Instruction::Method { opcode, .. }
            | Instruction::Type { opcode, .. } => *opcode,
            Instruction::NewArray(_) => opcodes::NEWARRAY,
            Instruction::Increment { .. } => opcodes::IINC,
            Instruction::InvokeDynamic { .. } => opcodes::INVOKEDYNAMIC,
            Instruction::MultiANewArray { .. } => opcodes::MULTIANEWARRAY,
            Instruction::TableSwitch { .. } => opcodes::TABLESWITCH,
            Instruction::LookupSwitch { .. } => opcodes::LOOKUPSWITCH,
        }
    }

    /// Mnemonic of the instruction, if it has one
    pub fn mnemonic(&self) -> Option<&'static str> {
        match self {
            Instruction::Label(_) => Some(opcodes::LABEL_MNEMONIC),
            other => opcodes::opcode_name(other.opcode()),
        }
    }

    /// Visit every label this instruction refers to (or defines)
    pub fn labels_mut(&mut self, mut visit: impl FnMut(&mut Label)) {
        match self {
            Instruction::Label(label) | Instruction::Jump { target: label, .. } => visit(label),
            Instruction::TableSwitch {
                default, targets, ..
            } => {
                visit(default);
                for target in targets {
                    visit(target);
                }
            }
            Instruction::LookupSwitch { default, pairs } => {
                visit(default);
                for (_, target) in pairs {
                    visit(target);
                }
            }
            _ => (),
        }
    }
}
