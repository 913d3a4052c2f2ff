use crate::chip::chip8::{constants::CHIP8_MEMORY_SIZE, Chip8};

pub fn conditional_skip<T>(instruction: &T, state: &mut Chip8, f: fn(&T, &Chip8) -> bool) {
    if f(instruction, state) {
        increment_program_counter(state);
    }
}

pub fn increment_program_counter(state: &mut Chip8) {
    state.program_counter = wrap_address(state.program_counter.wrapping_add(2));
}

/// Wraps an address into the 12 bit address space.
pub fn wrap_address(address: u16) -> u16 {
    address % CHIP8_MEMORY_SIZE as u16
}
