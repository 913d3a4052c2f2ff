//! A CHIP-8 virtual machine. The implementation follows the instruction set
//! described [here](https://en.wikipedia.org/wiki/CHIP-8#Opcode_table), including
//! the S-CHIP variations of the shift and bulk load/store instructions, which can
//! be selected through the machine's configuration.
//!
//! The machine itself is host agnostic: a host drives it by calling `step`, ticking
//! its timers at 60Hz (either from its own loop or from a dedicated timer thread),
//! feeding key events into its input pins and reading its framebuffer. The
//! `emulator_text_ui` binary is such a host, rendering through the cursive text
//! user interface library.
pub mod chip;
