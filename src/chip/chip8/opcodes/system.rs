use core::convert::TryFrom;
use std::marker::PhantomData;

use crate::chip::{
    chip8::{
        opcodes::{
            ExecutableOpcode, InstructionParsingError, InstructionWithAddress, Opcode,
            OpcodePayload,
        },
        util, Chip8,
    },
    MachineError,
};

define_instruction_with_address!(Sys, SysInstruction, 0x0, |payload| matches!(
    payload.address(),
    0x0E0 | 0x0EE
));
impl ExecutableOpcode for SysInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), MachineError> {
        if self.address == 0x0E0 {
            state.clear_display();
            util::increment_program_counter(state);
            return Ok(());
        }

        // 0x0EE, the only other payload accepted on decoding
        if state.stack_pointer == 0 {
            return Err(MachineError::StackUnderflow {
                address: state.program_counter,
            });
        }
        state.stack_pointer -= 1;
        state.program_counter = state.stack[state.stack_pointer as usize];
        Ok(())
    }
}
