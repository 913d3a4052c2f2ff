pub mod chip8;

use std::io;
use std::path::Path;

use cursive::CbSink;
use thiserror::Error;

/// The contract between a chip and the host that drives it.
pub trait Chip {
    /// The type used to address a single input pin.
    type PinAddress;

    /// The type used to address a single byte of main memory.
    type MemoryAddress;

    /// Loads the program stored in the file at `path` into main memory and
    /// returns the number of bytes that were actually loaded.
    fn load_program(&mut self, path: &Path) -> Result<usize, LoadProgramError>;

    /// Performs a single fetch-decode-execute cycle. Once this returned an
    /// error the chip is halted and every further call returns the same error.
    fn step(&mut self) -> Result<(), MachineError>;

    /// Advances the timers by one tick. Expected to be called at the timer
    /// frequency of the chip, independent of how often `step` is invoked.
    fn tick_timers(&self);

    /// A read-only, row-major view of the output pins.
    fn read_output_pins(&self) -> &[bool];

    /// Sets the input pin `pin` to `value`. Setting a pin is the equivalent of
    /// a key down event, resetting it the equivalent of a key up event.
    fn set_input_pin(&mut self, pin: Self::PinAddress, value: bool);

    /// Resets all input pins, i.e., releases all keys.
    fn reset_input_pins(&mut self);

    /// Sets the byte at `index` of main memory to `byte`.
    fn set_memory_byte(&mut self, byte: u8, index: Self::MemoryAddress);
}

/// A chip whose output pins can be rendered by a cursive UI.
pub trait ChipWithCursiveDisplay {
    /// Sends the current output pins to the UI if they changed since the last
    /// update.
    fn update_ui(&mut self, gfx_sink: &CbSink);
}

/// Fatal conditions that halt a chip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineError {
    #[error("Stack underflow: return at {address:#05X} without a matching call")]
    StackUnderflow { address: u16 },

    #[error("Stack overflow: call at {address:#05X} exceeds the maximum depth of {depth}")]
    StackOverflow { address: u16, depth: usize },

    #[error("Unsupported opcode {opcode:#06X} at {address:#05X}")]
    UnsupportedOpcode { opcode: u16, address: u16 },
}

/// Errors that occur while loading a program.
#[derive(Debug, Error)]
pub enum LoadProgramError {
    #[error("Could not read program file {path}: {source}")]
    CouldNotReadFile {
        path: String,
        #[source]
        source: io::Error,
    },
}
