use core::convert::TryFrom;
use rand::{thread_rng, Rng};
use std::marker::PhantomData;

use crate::chip::{
    chip8::{
        constants::{CHIP8_CHARSET_GLYPH_LEN, CHIP8_CHARSET_OFFSET},
        opcodes::{
            ExecutableOpcode, InstructionParsingError, InstructionWithAddress,
            InstructionWithOperands, InstructionWithRegAndValue, Opcode, OpcodePayload,
        },
        util, Chip8,
    },
    MachineError,
};

define_instruction_with_reg_and_value!(Ldr, LdrInstruction, 0x6);
impl ExecutableOpcode for LdrInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), MachineError> {
        state.registers[self.reg as usize] = self.value;
        util::increment_program_counter(state);
        Ok(())
    }
}

define_instruction_with_reg_and_value!(Add, AddInstruction, 0x7);
impl ExecutableOpcode for AddInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), MachineError> {
        state.registers[self.reg as usize] =
            state.registers[self.reg as usize].wrapping_add(self.value);
        util::increment_program_counter(state);
        Ok(())
    }
}

define_instruction_with_operands!(Reg, RegInstruction, 0x8, |payload| matches!(
    payload.operands().2,
    0x0..=0x7 | 0xE
));
impl ExecutableOpcode for RegInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), MachineError> {
        /// Stores the result of `f` in `r1` and afterwards sets VF if `f` reports
        /// a carry. VF is never cleared here.
        fn modify_registers(state: &mut Chip8, r1: u8, r2: u8, f: fn(u8, u8) -> (u8, bool)) {
            let (val, carry) = f(state.registers[r1 as usize], state.registers[r2 as usize]);
            state.registers[r1 as usize] = val;
            if carry {
                state.registers[0xF] = 1;
            }
        }

        /// Shifts the source register selected by the configuration with `f`,
        /// which returns the shifted value and the bit shifted out. VF receives
        /// the bit before the result is stored in `r1`.
        fn shift_register(state: &mut Chip8, r1: u8, r2: u8, f: fn(u8) -> (u8, u8)) {
            let source = if state.config.schip_compatible { r1 } else { r2 };
            let (val, flag) = f(state.registers[source as usize]);
            state.registers[0xF] = flag;
            state.registers[r1 as usize] = val;
        }

        let (r1, r2) = (self.op1, self.op2);
        match self.op3 {
            0x0 => modify_registers(state, r1, r2, |_, v2| (v2, false)),
            0x1 => modify_registers(state, r1, r2, |v1, v2| (v1 | v2, false)),
            0x2 => modify_registers(state, r1, r2, |v1, v2| (v1 & v2, false)),
            0x3 => modify_registers(state, r1, r2, |v1, v2| (v1 ^ v2, false)),
            0x4 => modify_registers(state, r1, r2, |v1, v2| v1.overflowing_add(v2)),
            0x5 => modify_registers(state, r1, r2, |v1, v2| {
                let (result, borrow) = v1.overflowing_sub(v2);
                (result, !borrow)
            }),
            0x6 => shift_register(state, r1, r2, |v| (v >> 1, v & 0x1)),
            0x7 => modify_registers(state, r1, r2, |v1, v2| {
                let (result, borrow) = v2.overflowing_sub(v1);
                (result, !borrow)
            }),
            // 0xE, the only other operation accepted on decoding
            _ => shift_register(state, r1, r2, |v| (v << 1, (v & 0x80) >> 7)),
        };
        util::increment_program_counter(state);
        Ok(())
    }
}

define_instruction_with_address!(Ld, LdInstruction, 0xA);
impl ExecutableOpcode for LdInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), MachineError> {
        state.index = self.address;
        util::increment_program_counter(state);
        Ok(())
    }
}

define_instruction_with_reg_and_value!(Rnd, RndInstruction, 0xC);
impl ExecutableOpcode for RndInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), MachineError> {
        let sample: u8 = thread_rng().gen();

        state.registers[self.reg as usize] = sample & self.value;

        util::increment_program_counter(state);
        Ok(())
    }
}

define_instruction_with_reg_and_value!(Ldu, LduInstruction, 0xF, |payload| matches!(
    payload.reg_and_value().1,
    0x07 | 0x0A | 0x15 | 0x18 | 0x1E | 0x29 | 0x33 | 0x55 | 0x65
));
impl ExecutableOpcode for LduInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), MachineError> {
        let reg = self.reg as usize;
        match self.value {
            0x07 => {
                state.registers[reg] = state.timers.delay();
            }
            0x0A => {
                // the program counter moves on right away, but no further
                // instruction is executed until a key goes down
                state.waiting_for_key = Some(self.reg);
            }
            0x15 => {
                state.timers.set_delay(state.registers[reg]);
            }
            0x18 => {
                state.timers.set_sound(state.registers[reg]);
            }
            0x1E => {
                state.index = util::wrap_address(state.index + state.registers[reg] as u16);
            }
            0x29 => {
                let character = (state.registers[reg] % 0x10) as u16;
                state.index = CHIP8_CHARSET_OFFSET + character * CHIP8_CHARSET_GLYPH_LEN;
            }
            0x33 => {
                let value = state.registers[reg];
                let digits = [value / 100, (value / 10) % 10, value % 10];
                for (offset, digit) in digits.iter().enumerate() {
                    state.memory[util::wrap_address(state.index + offset as u16) as usize] = *digit;
                }
            }
            0x55 => {
                for r in 0..=reg {
                    state.memory[util::wrap_address(state.index + r as u16) as usize] =
                        state.registers[r];
                }
                if !state.config.schip_compatible {
                    state.index = util::wrap_address(state.index + reg as u16 + 1);
                }
            }
            // 0x65, the only other operation accepted on decoding
            _ => {
                for r in 0..=reg {
                    state.registers[r] =
                        state.memory[util::wrap_address(state.index + r as u16) as usize];
                }
                if !state.config.schip_compatible {
                    state.index = util::wrap_address(state.index + reg as u16 + 1);
                }
            }
        }
        util::increment_program_counter(state);
        Ok(())
    }
}
