/// Configuration of the CHIP-8.
pub mod config;
/// CHIP-8 constants.
pub mod constants;
/// Cursive display output.
pub mod cursive_display;
/// Clearing the output pins and drawing sprites onto them.
mod framebuffer;
/// Decoding of opcodes and their execution.
mod opcodes;
/// The delay and sound timers and the means to tick them.
pub mod timers;
/// Convenience functions for modification of the CHIP-8 state.
mod util;

#[cfg(test)]
mod tests;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use log::{debug, error, trace, warn};
use ux::{u12, u4};

use crate::chip::{
    chip8::{
        config::Config,
        constants::{
            CHIP8_CHARSET, CHIP8_CHARSET_OFFSET, CHIP8_DISPLAY_HEIGHT, CHIP8_DISPLAY_WIDTH,
            CHIP8_MAX_PROGRAM_SIZE, CHIP8_MEMORY_SIZE, CHIP8_PROGRAM_START, CHIP8_STACK_DEPTH,
        },
        opcodes::Opcode,
        timers::Timers,
    },
    Chip, LoadProgramError, MachineError,
};

/// Represents the state of the CHIP-8.
pub struct Chip8 {
    /// 4096 bytes of main memory
    memory: [u8; CHIP8_MEMORY_SIZE],

    /// 16 registers where each can store one byte. The last one doubles as
    /// flag register.
    registers: [u8; 16],

    /// An index register. Always within 0x000 - 0xFFF (inclusive).
    index: u16,

    /// A program counter. Always within 0x000 - 0xFFF (inclusive).
    program_counter: u16,

    /// The output pins. Note that those are usually directly wired
    /// up to the pixels of the display. However, given that this implementation
    /// considers a display as optional, we refer to them as output_pins for
    /// the sake of generality.
    output_pins: [bool; CHIP8_DISPLAY_WIDTH * CHIP8_DISPLAY_HEIGHT],

    /// The delay and sound timers. They are shared with whoever ticks them,
    /// which might be a dedicated thread.
    timers: Arc<Timers>,

    /// The input pins. Note that those input pins are usually directly wired
    /// up to the keys. However, we do not prescribe how this is handled and
    /// hence refer to them as input pins rather than as keys.
    input_pins: [bool; 16],

    /// A stack. Note that there are no instructions allowing to modify the
    /// stack and it is only used to store return addresses for the return
    /// opcode.
    stack: [u16; CHIP8_STACK_DEPTH],

    /// A pointer, pointing to the current position in the stack.
    stack_pointer: u8,

    /// The register waiting for the next key press, if any. While set, `step`
    /// does nothing.
    waiting_for_key: Option<u8>,

    /// A flag that indicates whether the output pins changed since it
    /// was last set to false.
    draw: bool,

    config: Config,

    /// The error that halted the CHIP-8, if any.
    halted: Option<MachineError>,
}

impl Chip for Chip8 {
    /// The CHIP-8 has 16 input pins, hence half a byte suffices to address them.
    type PinAddress = u4;

    /// A CHIP-8 memory address is in the range between 0 and 4096 (exclusive),
    /// which is exactly what fits into 12 bits.
    type MemoryAddress = u12;

    fn load_program(&mut self, path: &Path) -> Result<usize, LoadProgramError> {
        let buffer = fs::read(path).map_err(|source| LoadProgramError::CouldNotReadFile {
            path: path.display().to_string(),
            source,
        })?;

        Ok(self.load_program_bytes(&buffer))
    }

    fn step(&mut self) -> Result<(), MachineError> {
        if let Some(error) = &self.halted {
            return Err(error.clone());
        }

        if self.waiting_for_key.is_some() {
            return Ok(());
        }

        let opcode = self.next_instruction();
        trace!("{:#05X}: {}", self.program_counter, opcode);

        opcode.execute(self).map_err(|e| {
            error!("Halting: {}", e);
            self.halted = Some(e.clone());
            e
        })
    }

    fn tick_timers(&self) {
        self.timers.tick();
    }

    fn read_output_pins(&self) -> &[bool] {
        &self.output_pins
    }

    fn set_input_pin(&mut self, pin: u4, value: bool) {
        let key = u8::from(pin);
        self.input_pins[key as usize] = value;

        if value {
            if let Some(register) = self.waiting_for_key.take() {
                self.registers[register as usize] = key;
            }
        }
    }

    fn reset_input_pins(&mut self) {
        self.input_pins = [false; 16];
    }

    fn set_memory_byte(&mut self, byte: u8, index: u12) {
        self.memory[u16::from(index) as usize] = byte;
    }
}

impl Chip8 {
    /// Constructs a new CHIP-8 with the default configuration and appropriately
    /// initializes all fields so that it is ready for the first execution cycle.
    /// Essentially this means that the program counter is set to 0x200 and the
    /// default CHIP-8 charset is loaded at memory address `CHIP8_CHARSET_OFFSET`.
    /// Note that no program is loaded upon initialization.
    pub fn new() -> Self {
        Chip8::with_config(Config::default())
    }

    /// Constructs a new CHIP-8 using the given configuration.
    pub fn with_config(config: Config) -> Self {
        let mut memory = [0; CHIP8_MEMORY_SIZE];
        let charset_start = CHIP8_CHARSET_OFFSET as usize;
        memory[charset_start..charset_start + CHIP8_CHARSET.len()].copy_from_slice(&CHIP8_CHARSET);

        Chip8 {
            memory,
            registers: [0; 16],
            index: 0,
            program_counter: CHIP8_PROGRAM_START,
            output_pins: [false; CHIP8_DISPLAY_WIDTH * CHIP8_DISPLAY_HEIGHT],
            timers: Arc::new(Timers::new()),
            input_pins: [false; 16],
            stack: [0; CHIP8_STACK_DEPTH],
            stack_pointer: 0,
            waiting_for_key: None,
            draw: false,
            config,
            halted: None,
        }
    }

    /// Fetches the next instruction based on the current state of
    /// self.program_counter. Instructions are stored big-endian.
    fn next_instruction(&self) -> Opcode {
        Opcode::new(&[
            self.memory[self.program_counter as usize],
            self.memory[util::wrap_address(self.program_counter + 1) as usize],
        ])
    }

    /// Loads a program from a slice, starting at 0x200. Bytes which would not
    /// fit into memory are dropped. Returns the number of bytes loaded.
    pub fn load_program_bytes(&mut self, program: &[u8]) -> usize {
        if program.len() > CHIP8_MAX_PROGRAM_SIZE {
            warn!(
                "Program is {} bytes, more than allowed {} bytes; excess bytes are dropped",
                program.len(),
                CHIP8_MAX_PROGRAM_SIZE
            );
        }

        let start = CHIP8_PROGRAM_START as usize;
        let len = program.len().min(CHIP8_MAX_PROGRAM_SIZE);
        debug!("Loading from {:#05X} to {:#05X}", start, start + len);

        self.memory[start..start + len].copy_from_slice(&program[..len]);
        len
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Hands out the timers, e.g., to tick them from a dedicated thread.
    pub fn timers(&self) -> Arc<Timers> {
        Arc::clone(&self.timers)
    }

    pub fn registers(&self) -> &[u8; 16] {
        &self.registers
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    /// The number of return addresses currently on the stack.
    pub fn stack_depth(&self) -> usize {
        self.stack_pointer as usize
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    /// Whether the CHIP-8 waits for a key press before continuing execution.
    pub fn is_waiting_for_key(&self) -> bool {
        self.waiting_for_key.is_some()
    }

    /// The error that halted the CHIP-8, if any.
    pub fn halted(&self) -> Option<&MachineError> {
        self.halted.as_ref()
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Chip8::new()
    }
}
