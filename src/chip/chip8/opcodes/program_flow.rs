use core::convert::TryFrom;
use std::marker::PhantomData;

use crate::chip::{
    chip8::{
        constants::CHIP8_STACK_DEPTH,
        opcodes::{
            ExecutableOpcode, InstructionParsingError, InstructionWithAddress,
            InstructionWithOperands, InstructionWithRegAndValue, Opcode, OpcodePayload,
        },
        util, Chip8,
    },
    MachineError,
};

define_instruction_with_address!(Jmp, JmpInstruction, 0x1);
impl ExecutableOpcode for JmpInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), MachineError> {
        state.program_counter = self.address;
        Ok(())
    }
}

define_instruction_with_address!(Call, CallInstruction, 0x2);
impl ExecutableOpcode for CallInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), MachineError> {
        if state.stack_pointer as usize >= CHIP8_STACK_DEPTH {
            return Err(MachineError::StackOverflow {
                address: state.program_counter,
                depth: CHIP8_STACK_DEPTH,
            });
        }
        util::increment_program_counter(state);
        state.stack[state.stack_pointer as usize] = state.program_counter;
        state.stack_pointer += 1;
        state.program_counter = self.address;
        Ok(())
    }
}

define_instruction_with_reg_and_value!(Se, SeInstruction, 0x3);
impl ExecutableOpcode for SeInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), MachineError> {
        util::conditional_skip(self, state, |instruction, state| {
            state.registers[instruction.reg as usize] == instruction.value
        });
        util::increment_program_counter(state);
        Ok(())
    }
}

define_instruction_with_reg_and_value!(Sne, SneInstruction, 0x4);
impl ExecutableOpcode for SneInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), MachineError> {
        util::conditional_skip(self, state, |instruction, state| {
            state.registers[instruction.reg as usize] != instruction.value
        });
        util::increment_program_counter(state);
        Ok(())
    }
}

define_instruction_with_operands!(Sre, SreInstruction, 0x5, |payload| payload.operands().2
    == 0);
impl ExecutableOpcode for SreInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), MachineError> {
        util::conditional_skip(self, state, |instruction, state| {
            state.registers[instruction.op1 as usize] == state.registers[instruction.op2 as usize]
        });
        util::increment_program_counter(state);
        Ok(())
    }
}

define_instruction_with_operands!(Srne, SrneInstruction, 0x9, |payload| payload.operands().2
    == 0);
impl ExecutableOpcode for SrneInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), MachineError> {
        util::conditional_skip(self, state, |instruction, state| {
            state.registers[instruction.op1 as usize] != state.registers[instruction.op2 as usize]
        });
        util::increment_program_counter(state);
        Ok(())
    }
}

define_instruction_with_address!(Jmpr, JmprInstruction, 0xB);
impl ExecutableOpcode for JmprInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), MachineError> {
        state.program_counter = util::wrap_address(self.address + state.registers[0] as u16);
        Ok(())
    }
}

define_instruction_with_reg_and_value!(Sk, SkInstruction, 0xE, |payload| matches!(
    payload.reg_and_value().1,
    0x9E | 0xA1
));
impl ExecutableOpcode for SkInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), MachineError> {
        // key codes above 0xF can never be pressed
        let key = state.registers[self.reg as usize] as usize;
        let pressed = state.input_pins.get(key).copied().unwrap_or(false);

        let skip = if self.value == 0x9E { pressed } else { !pressed };
        if skip {
            util::increment_program_counter(state);
        }
        util::increment_program_counter(state);
        Ok(())
    }
}
