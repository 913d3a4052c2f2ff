use crate::chip::chip8::{
    constants::{CHIP8_DISPLAY_HEIGHT, CHIP8_DISPLAY_WIDTH},
    util, Chip8,
};

/// Translates coordinates into an index of the output pins. Coordinates
/// outside of the display wrap around.
fn translate_gfx(x: usize, y: usize) -> usize {
    (x % CHIP8_DISPLAY_WIDTH) + (y % CHIP8_DISPLAY_HEIGHT) * CHIP8_DISPLAY_WIDTH
}

impl Chip8 {
    /// Turns off all output pins.
    pub(super) fn clear_display(&mut self) {
        self.output_pins = [false; CHIP8_DISPLAY_WIDTH * CHIP8_DISPLAY_HEIGHT];
        self.draw = true;
    }

    /// XORs the sprite of `rows` bytes starting at the index register onto the
    /// output pins at (`x`, `y`). Every byte is one row of 8 pixels, most
    /// significant bit first. Returns whether any pixel was turned off.
    pub(super) fn draw_sprite(&mut self, x: u8, y: u8, rows: u8) -> bool {
        let mut collision = false;

        for y_pos in 0..rows as usize {
            let pixel_byte = self.memory[util::wrap_address(self.index + y_pos as u16) as usize];

            for x_pos in 0..8 {
                if pixel_byte & (0x80 >> x_pos) == 0 {
                    continue;
                }

                let pixel_pos = translate_gfx(x as usize + x_pos, y as usize + y_pos);
                if self.output_pins[pixel_pos] {
                    collision = true;
                }
                self.output_pins[pixel_pos] ^= true;
            }
        }

        self.draw = true;
        collision
    }
}
