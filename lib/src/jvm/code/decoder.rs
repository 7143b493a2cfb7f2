use super::opcodes::*;
use super::{Instruction, Label, LoadableConstant, MemberRef};
use crate::jvm::class_file::{
    Attribute, ClassConstantIndex, Code, Constant, ConstantIndex, ConstantPool, LineNumberTable,
};
use crate::jvm::{BaseType, Error};
use std::collections::{BTreeMap, BTreeSet};

/// Decode the bytecode of a method into instructions
///
/// Besides the real instructions, the output contains pseudo-instructions:
///
///   - a [`Instruction::Label`] right before every instruction that is the target of a jump, a
///     switch, or an exception handler range (and at the very end if a range ends there)
///   - a [`Instruction::LineNumber`] wherever the `LineNumberTable` says a new line starts
///
/// Labels are numbered `L0`, `L1`, ... in the order they appear in the code.
pub fn decode(code: &Code, constants: &ConstantPool) -> Result<Vec<Instruction>, Error> {
    let code_len = code.code_array.len();

    // First pass: decode instructions with labels holding raw bytecode offsets
    let mut reader = CodeReader {
        code: &code.code_array,
        position: 0,
        start: 0,
    };
    let mut decoded: Vec<(usize, Instruction)> = vec![];
    let mut jumps: Vec<(usize, usize)> = vec![];
    while reader.position < code_len {
        let offset = reader.position;
        reader.start = offset;
        let mut instruction = decode_one(&mut reader, constants)?;
        instruction.labels_mut(|label| jumps.push((offset, label.0)));
        decoded.push((offset, instruction));
    }

    // Every target must be the start of an instruction (exception ranges may also end at the
    // very end of the code)
    let starts: BTreeSet<usize> = decoded.iter().map(|(offset, _)| *offset).collect();
    let mut targets: BTreeSet<usize> = BTreeSet::new();
    for (offset, target) in jumps {
        if !starts.contains(&target) {
            return Err(Error::InvalidJumpTarget {
                offset: offset as u32,
                target: target as i64,
            });
        }
        targets.insert(target);
    }
    for handler in &code.exception_table {
        for target in [handler.start_pc, handler.end_pc, handler.handler_pc] {
            let target = target as usize;
            if target != code_len && !starts.contains(&target) {
                return Err(Error::InvalidJumpTarget {
                    offset: handler.start_pc as u32,
                    target: target as i64,
                });
            }
            targets.insert(target);
        }
    }

    // Second pass: renumber labels in code order and interleave pseudo-instructions
    let labels: BTreeMap<usize, Label> = targets
        .iter()
        .enumerate()
        .map(|(idx, offset)| (*offset, Label(idx)))
        .collect();

    let mut lines: BTreeMap<usize, Vec<u16>> = BTreeMap::new();
    if let Some(LineNumberTable(entries)) =
        Attribute::find::<LineNumberTable>(&code.attributes, constants)?
    {
        for entry in entries {
            lines
                .entry(entry.start_pc as usize)
                .or_default()
                .push(entry.line_number);
        }
    }

    let mut instructions = Vec::with_capacity(decoded.len() + labels.len() + lines.len());
    for (offset, mut instruction) in decoded {
        if let Some(label) = labels.get(&offset) {
            instructions.push(Instruction::Label(*label));
        }
        if let Some(line_numbers) = lines.get(&offset) {
            instructions.extend(line_numbers.iter().copied().map(Instruction::LineNumber));
        }
        instruction.labels_mut(|label| {
            if let Some(renumbered) = labels.get(&label.0) {
                *label = *renumbered;
            }
        });
        instructions.push(instruction);
    }
    if let Some(label) = labels.get(&code_len) {
        instructions.push(Instruction::Label(*label));
    }

    Ok(instructions)
}

/// Cursor over the code array that reports errors relative to the current instruction
struct CodeReader<'a> {
    code: &'a [u8],
    position: usize,

    /// Offset of the instruction being decoded
    start: usize,
}

impl<'a> CodeReader<'a> {
    fn truncated(&self) -> Error {
        Error::TruncatedCode {
            offset: self.start as u32,
        }
    }

    fn jump_error(&self, target: i64) -> Error {
        Error::InvalidJumpTarget {
            offset: self.start as u32,
            target,
        }
    }

    fn invalid_operand(&self, opcode: u8) -> Error {
        Error::InvalidOperand {
            offset: self.start as u32,
            opcode,
        }
    }

    fn bytes<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let end = self.position + N;
        let slice = self.code.get(self.position..end).ok_or_else(|| self.truncated())?;
        self.position = end;
        let mut bytes = [0; N];
        bytes.copy_from_slice(slice);
        Ok(bytes)
    }

    fn u8(&mut self) -> Result<u8, Error> {
        Ok(self.bytes::<1>()?[0])
    }

    fn i8(&mut self) -> Result<i8, Error> {
        Ok(self.u8()? as i8)
    }

    fn u16(&mut self) -> Result<u16, Error> {
        Ok(u16::from_be_bytes(self.bytes()?))
    }

    fn i16(&mut self) -> Result<i16, Error> {
        Ok(i16::from_be_bytes(self.bytes()?))
    }

    fn i32(&mut self) -> Result<i32, Error> {
        Ok(i32::from_be_bytes(self.bytes()?))
    }

    /// Skip the padding that aligns switch operands to a multiple of 4 from the start of the code
    fn align(&mut self) -> Result<(), Error> {
        while self.position % 4 != 0 {
            self.u8()?;
        }
        Ok(())
    }

    /// Resolve a jump relative to the current instruction into an absolute offset
    ///
    /// The offset is stored in a [`Label`] until labels get renumbered.
    fn target(&self, relative: i32) -> Result<Label, Error> {
        let target = self.start as i64 + relative as i64;
        if target < 0 || target >= self.code.len() as i64 {
            Err(self.jump_error(target))
        } else {
            Ok(Label(target as usize))
        }
    }
}

fn decode_one(reader: &mut CodeReader, constants: &ConstantPool) -> Result<Instruction, Error> {
    let opcode = reader.u8()?;
    let instruction = match opcode {
        BIPUSH => Instruction::IntPush {
            opcode,
            value: reader.i8()? as i32,
        },
        SIPUSH => Instruction::IntPush {
            opcode,
            value: reader.i16()? as i32,
        },
        LDC => {
            let index = ConstantIndex(reader.u8()? as u16);
            Instruction::Constant {
                opcode,
                value: loadable_constant(constants, index)?,
            }
        }
        LDC_W | LDC2_W => {
            let index = ConstantIndex(reader.u16()?);
            Instruction::Constant {
                opcode,
                value: loadable_constant(constants, index)?,
            }
        }
        ILOAD..=ALOAD | ISTORE..=ASTORE | RET => Instruction::Local {
            opcode,
            index: reader.u8()? as u16,
        },
        IINC => Instruction::Increment {
            index: reader.u8()? as u16,
            delta: reader.i8()? as i16,
        },
        IFEQ..=JSR | IFNULL | IFNONNULL => {
            let relative = reader.i16()? as i32;
            Instruction::Jump {
                opcode,
                target: reader.target(relative)?,
            }
        }
        GOTO_W | JSR_W => {
            let relative = reader.i32()?;
            Instruction::Jump {
                opcode,
                target: reader.target(relative)?,
            }
        }
        TABLESWITCH => {
            reader.align()?;
            let relative = reader.i32()?;
            let default = reader.target(relative)?;
            let low = reader.i32()?;
            let high = reader.i32()?;
            if high < low {
                return Err(reader.invalid_operand(opcode));
            }
            let count = (high as i64 - low as i64 + 1) as usize;
            if count > reader.code.len() {
                return Err(reader.truncated());
            }
            let mut targets = Vec::with_capacity(count);
            for _ in 0..count {
                let relative = reader.i32()?;
                targets.push(reader.target(relative)?);
            }
            Instruction::TableSwitch {
                default,
                low,
                targets,
            }
        }
        LOOKUPSWITCH => {
            reader.align()?;
            let relative = reader.i32()?;
            let default = reader.target(relative)?;
            let npairs = reader.i32()?;
            if npairs < 0 {
                return Err(reader.invalid_operand(opcode));
            }
            if npairs as usize > reader.code.len() {
                return Err(reader.truncated());
            }
            let mut pairs = Vec::with_capacity(npairs as usize);
            for _ in 0..npairs {
                let key = reader.i32()?;
                let relative = reader.i32()?;
                pairs.push((key, reader.target(relative)?));
            }
            Instruction::LookupSwitch { default, pairs }
        }
        GETSTATIC..=PUTFIELD => {
            let index = ConstantIndex(reader.u16()?);
            Instruction::Field {
                opcode,
                member: member_ref(constants, index)?.0,
            }
        }
        INVOKEVIRTUAL..=INVOKESTATIC => {
            let index = ConstantIndex(reader.u16()?);
            let (member, is_interface) = member_ref(constants, index)?;
            Instruction::Method {
                opcode,
                member,
                is_interface,
            }
        }
        INVOKEINTERFACE => {
            let index = ConstantIndex(reader.u16()?);
            let _count = reader.u8()?;
            let _zero = reader.u8()?;
            let (member, is_interface) = member_ref(constants, index)?;
            Instruction::Method {
                opcode,
                member,
                is_interface,
            }
        }
        INVOKEDYNAMIC => {
            let index = ConstantIndex(reader.u16()?);
            let _zeros = reader.u16()?;
            match constants.get(index)? {
                Constant::InvokeDynamic {
                    bootstrap_method,
                    method_descriptor,
                } => {
                    let (name, descriptor) = constants.name_and_type(*method_descriptor)?;
                    Instruction::InvokeDynamic {
                        bootstrap_method: *bootstrap_method,
                        name: name.to_owned(),
                        descriptor: descriptor.to_owned(),
                    }
                }
                _ => {
                    return Err(Error::UnexpectedConstant {
                        index,
                        expected: "InvokeDynamic",
                    })
                }
            }
        }
        NEW | ANEWARRAY | CHECKCAST | INSTANCEOF => {
            let index = ClassConstantIndex(ConstantIndex(reader.u16()?));
            Instruction::Type {
                opcode,
                class: constants.class_name(index)?.to_owned(),
            }
        }
        NEWARRAY => {
            let code = reader.u8()?;
            let element_type =
                BaseType::from_array_type_code(code).ok_or_else(|| reader.invalid_operand(opcode))?;
            Instruction::NewArray(element_type)
        }
        MULTIANEWARRAY => {
            let index = ClassConstantIndex(ConstantIndex(reader.u16()?));
            Instruction::MultiANewArray {
                class: constants.class_name(index)?.to_owned(),
                dimensions: reader.u8()?,
            }
        }
        WIDE => {
            let modified = reader.u8()?;
            match modified {
                ILOAD..=ALOAD | ISTORE..=ASTORE | RET => Instruction::Local {
                    opcode: modified,
                    index: reader.u16()?,
                },
                IINC => Instruction::Increment {
                    index: reader.u16()?,
                    delta: reader.i16()?,
                },
                _ => return Err(reader.invalid_operand(opcode)),
            }
        }
        other => Instruction::Simple(other),
    };
    Ok(instruction)
}

fn member_ref(constants: &ConstantPool, index: ConstantIndex) -> Result<(MemberRef, bool), Error> {
    let info = constants.member_ref(index)?;
    let member = MemberRef {
        class: info.class.to_owned(),
        name: info.name.to_owned(),
        descriptor: info.descriptor.to_owned(),
    };
    Ok((member, info.is_interface))
}

fn loadable_constant(
    constants: &ConstantPool,
    index: ConstantIndex,
) -> Result<LoadableConstant, Error> {
    let constant = match constants.get(index)? {
        Constant::Integer(integer) => LoadableConstant::Integer(*integer),
        Constant::Float(float) => LoadableConstant::Float(*float),
        Constant::Long(long) => LoadableConstant::Long(*long),
        Constant::Double(double) => LoadableConstant::Double(*double),
        Constant::String(utf8) => LoadableConstant::String(constants.utf8(*utf8)?.to_owned()),
        Constant::Class(name) => LoadableConstant::Class(constants.utf8(*name)?.to_owned()),
        Constant::MethodType { descriptor } => {
            LoadableConstant::MethodType(constants.utf8(*descriptor)?.to_owned())
        }
        Constant::MethodHandle {
            handle_kind,
            member,
        } => LoadableConstant::MethodHandle {
            handle_kind: *handle_kind,
            member: member_ref(constants, *member)?.0,
        },
        Constant::Dynamic { name_and_type, .. } => {
            let (name, descriptor) = constants.name_and_type(*name_and_type)?;
            LoadableConstant::Dynamic {
                name: name.to_owned(),
                descriptor: descriptor.to_owned(),
            }
        }
        _ => {
            return Err(Error::UnexpectedConstant {
                index,
                expected: "loadable constant",
            })
        }
    };
    Ok(constant)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::class_file::{ExceptionHandler, LineNumber};

    fn code(code_array: Vec<u8>) -> Code {
        Code {
            max_stack: 4,
            max_locals: 4,
            code_array,
            exception_table: vec![],
            attributes: vec![],
        }
    }

    #[test]
    fn simple_instructions() {
        let constants = ConstantPool::new();
        let decoded = decode(&code(vec![ICONST_1, ICONST_2, IADD, IRETURN]), &constants).unwrap();
        assert_eq!(
            decoded,
            vec![
                Instruction::Simple(ICONST_1),
                Instruction::Simple(ICONST_2),
                Instruction::Simple(IADD),
                Instruction::Simple(IRETURN),
            ]
        );
    }

    #[test]
    fn labels_numbered_in_code_order() {
        let constants = ConstantPool::new();
        #[rustfmt::skip]
        let bytes = vec![
            ILOAD_0,                // 0
            IFEQ, 0, 7,             // 1 -> 8
            GOTO, 0, 3,             // 4 -> 7
            NOP,                    // 7
            RETURN,                 // 8
        ];
        let decoded = decode(&code(bytes), &constants).unwrap();
        assert_eq!(
            decoded,
            vec![
                Instruction::Simple(ILOAD_0),
                Instruction::Jump {
                    opcode: IFEQ,
                    target: Label(1)
                },
                Instruction::Jump {
                    opcode: GOTO,
                    target: Label(0)
                },
                Instruction::Label(Label(0)),
                Instruction::Simple(NOP),
                Instruction::Label(Label(1)),
                Instruction::Simple(RETURN),
            ]
        );
    }

    #[test]
    fn table_switch_padding() {
        let constants = ConstantPool::new();
        #[rustfmt::skip]
        let bytes = vec![
            ILOAD_0,                // 0
            TABLESWITCH, 0, 0,      // 1, padded to 4
            0, 0, 0, 23,            // default -> 24
            0, 0, 0, 1,             // low
            0, 0, 0, 2,             // high
            0, 0, 0, 23,            // 1 -> 24
            0, 0, 0, 24,            // 2 -> 25
            RETURN,                 // 24
            RETURN,                 // 25
        ];
        let decoded = decode(&code(bytes), &constants).unwrap();
        assert_eq!(
            decoded[1],
            Instruction::TableSwitch {
                default: Label(0),
                low: 1,
                targets: vec![Label(0), Label(1)],
            }
        );
        assert_eq!(decoded.len(), 6);
    }

    #[test]
    fn wide_and_references() {
        let mut constants = ConstantPool::new();
        let field = constants
            .get_field_ref("java/lang/System", "out", "Ljava/io/PrintStream;")
            .unwrap();
        let string = constants.get_string("hi").unwrap();
        let [field_hi, field_lo] = ((field.0).0).to_be_bytes();
        let string_idx = (string.0).0 as u8;

        #[rustfmt::skip]
        let bytes = vec![
            GETSTATIC, field_hi, field_lo,
            LDC, string_idx,
            WIDE, IINC, 1, 0, 0xFF, 0xFF,
            RETURN,
        ];
        let decoded = decode(&code(bytes), &constants).unwrap();
        assert_eq!(
            decoded,
            vec![
                Instruction::Field {
                    opcode: GETSTATIC,
                    member: MemberRef {
                        class: String::from("java/lang/System"),
                        name: String::from("out"),
                        descriptor: String::from("Ljava/io/PrintStream;"),
                    }
                },
                Instruction::Constant {
                    opcode: LDC,
                    value: LoadableConstant::String(String::from("hi")),
                },
                Instruction::Increment {
                    index: 256,
                    delta: -1
                },
                Instruction::Simple(RETURN),
            ]
        );
    }

    #[test]
    fn line_numbers_and_handlers() {
        let mut constants = ConstantPool::new();
        let table = LineNumberTable(vec![
            LineNumber {
                start_pc: 0,
                line_number: 3,
            },
            LineNumber {
                start_pc: 1,
                line_number: 4,
            },
        ]);
        let mut method_code = code(vec![NOP, ATHROW]);
        method_code.attributes = vec![constants.get_attribute(table).unwrap()];
        method_code.exception_table = vec![ExceptionHandler {
            start_pc: 0,
            end_pc: 1,
            handler_pc: 1,
            catch_type: ClassConstantIndex(ConstantIndex(0)),
        }];

        let decoded = decode(&method_code, &constants).unwrap();
        assert_eq!(
            decoded,
            vec![
                Instruction::Label(Label(0)),
                Instruction::LineNumber(3),
                Instruction::Simple(NOP),
                Instruction::Label(Label(1)),
                Instruction::LineNumber(4),
                Instruction::Simple(ATHROW),
            ]
        );
    }

    #[test]
    fn malformed_code() {
        let constants = ConstantPool::new();
        assert!(matches!(
            decode(&code(vec![SIPUSH, 0]), &constants),
            Err(Error::TruncatedCode { offset: 0 })
        ));
        assert!(matches!(
            decode(&code(vec![NOP, GOTO, 0xFF, 0x00]), &constants),
            Err(Error::InvalidJumpTarget { offset: 1, .. })
        ));
        assert!(matches!(
            decode(&code(vec![NEWARRAY, 99]), &constants),
            Err(Error::InvalidOperand { offset: 0, .. })
        ));
        assert!(matches!(
            decode(&code(vec![LDC, 1]), &constants),
            Err(Error::InvalidConstantIndex(ConstantIndex(1)))
        ));
    }

    #[test]
    fn unknown_opcodes_are_kept() {
        let constants = ConstantPool::new();
        let decoded = decode(&code(vec![0xCA, RETURN]), &constants).unwrap();
        assert_eq!(decoded[0], Instruction::Simple(0xCA));
    }
}
