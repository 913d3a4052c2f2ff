use crate::chip::chip8::constants::CHIP8_TIMER_FREQUENCY_HZ;

/// Configuration of a CHIP-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Selects the S-CHIP behavior of the shift and bulk load/store
    /// instructions. If set, 8XY6 and 8XYE shift VX instead of VY, and FX55
    /// and FX65 leave the index register untouched.
    pub schip_compatible: bool,

    /// The frequency in Hz at which a host is expected to tick the timers.
    pub timer_frequency_hz: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            schip_compatible: false,
            timer_frequency_hz: CHIP8_TIMER_FREQUENCY_HZ,
        }
    }
}
