use core::convert::TryFrom;
use std::marker::PhantomData;

use crate::chip::{
    chip8::{
        opcodes::{
            ExecutableOpcode, InstructionParsingError, InstructionWithOperands, Opcode,
            OpcodePayload,
        },
        util, Chip8,
    },
    MachineError,
};

define_instruction_with_operands!(Drw, DrwInstruction, 0xD);
impl ExecutableOpcode for DrwInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), MachineError> {
        let x = state.registers[self.op1 as usize];
        let y = state.registers[self.op2 as usize];

        let collision = state.draw_sprite(x, y, self.op3);
        state.registers[0xF] = collision as u8;

        util::increment_program_counter(state);
        Ok(())
    }
}
