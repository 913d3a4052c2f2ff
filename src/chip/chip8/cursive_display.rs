use crate::chip::{
    chip8::{
        constants::{CHIP8_DISPLAY_HEIGHT, CHIP8_DISPLAY_WIDTH},
        Chip8,
    },
    ChipWithCursiveDisplay,
};

use cursive::{
    event::{Event, EventResult},
    theme::{BaseColor, Color, ColorStyle},
    view::View,
    CbSink, Cursive, Printer, Vec2,
};
use log::warn;

/// The name under which the display is registered in the cursive UI.
pub const DISPLAY_VIEW_NAME: &str = "chip8-display";

/// Represents the display of the Chip 8
pub struct Display {
    pixels: [bool; CHIP8_DISPLAY_WIDTH * CHIP8_DISPLAY_HEIGHT],
}

impl Display {
    /// Creates a new display from a slice.
    pub fn new(pixels: &[bool]) -> Self {
        let mut display = Display::default();
        display.update(pixels);
        display
    }

    /// Replaces the displayed pixels. Pixels beyond the display size are ignored.
    pub fn update(&mut self, pixels: &[bool]) {
        let len = pixels.len().min(self.pixels.len());
        self.pixels[..len].copy_from_slice(&pixels[..len]);
    }
}

impl Default for Display {
    fn default() -> Self {
        Display {
            pixels: [false; CHIP8_DISPLAY_WIDTH * CHIP8_DISPLAY_HEIGHT],
        }
    }
}

/// Implements cursive::view::View for Display to enable drawing it
/// as a View out of the box.
impl View for Display {
    fn draw(&self, printer: &Printer) {
        printer.with_color(
            ColorStyle::new(Color::Dark(BaseColor::Black), Color::Light(BaseColor::White)),
            |printer| {
                for x in 0..CHIP8_DISPLAY_WIDTH {
                    for y in 0..CHIP8_DISPLAY_HEIGHT {
                        if self.pixels[x + CHIP8_DISPLAY_WIDTH * y] {
                            printer.print((x, y), " ");
                        }
                    }
                }
            },
        );
    }

    fn on_event(&mut self, _event: Event) -> EventResult {
        EventResult::Ignored
    }

    fn required_size(&mut self, _: Vec2) -> Vec2 {
        Vec2 {
            x: CHIP8_DISPLAY_WIDTH,
            y: CHIP8_DISPLAY_HEIGHT,
        }
    }
}

impl ChipWithCursiveDisplay for Chip8 {
    fn update_ui(&mut self, gfx_sink: &CbSink) {
        if !self.draw {
            return;
        }

        let pixels = self.output_pins;
        let sent = gfx_sink.send(Box::new(move |s: &mut Cursive| {
            s.call_on_name(DISPLAY_VIEW_NAME, |display: &mut Display| {
                display.update(&pixels)
            });
        }));
        if sent.is_err() {
            warn!("Sending updated display failed");
        }
        self.draw = false;
    }
}
