use anyhow::{Context, Result, bail};
use std::io::Write;

/// Frame-replace output surface for the simulations.
///
/// `render` lights exactly the given pixels and turns every other pixel
/// off; `flush` pushes the buffered frame out; `clear` blanks the buffer.
/// Any failure is fatal to the run.
pub trait Sink {
    fn clear(&mut self) -> Result<()>;
    fn render(&mut self, points: &[(u32, u32)]) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
}

/// Text renderer standing in for a small monochrome OLED.
///
/// Keeps a width x height pixel buffer and writes it out as one character
/// per pixel, homing the cursor first so successive frames overdraw each
/// other in a terminal.
pub struct TextDisplay<W: Write> {
    writer: W,
    width: u32,
    height: u32,
    pixels: Vec<bool>,
}

const PIXEL_ON: char = '#';
const PIXEL_OFF: char = '.';

impl<W: Write> TextDisplay<W> {
    pub fn new(writer: W, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            bail!("display dimensions must be nonzero, got {width}x{height}");
        }
        Ok(Self {
            writer,
            width,
            height,
            pixels: vec![false; (width * height) as usize],
        })
    }
}

impl<W: Write> Sink for TextDisplay<W> {
    fn clear(&mut self) -> Result<()> {
        self.pixels.fill(false);
        Ok(())
    }

    fn render(&mut self, points: &[(u32, u32)]) -> Result<()> {
        self.pixels.fill(false);
        for &(x, y) in points {
            if x >= self.width || y >= self.height {
                bail!(
                    "point ({x}, {y}) outside the {}x{} frame",
                    self.width,
                    self.height
                );
            }
            self.pixels[(y * self.width + x) as usize] = true;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        // Home the cursor so the next frame draws over this one.
        write!(self.writer, "\x1b[H").context("failed to write frame")?;
        for row in self.pixels.chunks(self.width as usize) {
            for &on in row {
                let pixel = if on { PIXEL_ON } else { PIXEL_OFF };
                write!(self.writer, "{pixel}").context("failed to write frame")?;
            }
            writeln!(self.writer).context("failed to write frame")?;
        }
        self.writer.flush().context("failed to flush frame")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_frame_lights_exactly_the_given_pixels() {
        let mut display = TextDisplay::new(Vec::<u8>::new(), 4, 2).unwrap();
        display.render(&[(0, 0), (3, 1)]).unwrap();
        display.flush().unwrap();

        let output = String::from_utf8(display.writer).unwrap();
        assert_eq!(output, "\x1b[H#...\n...#\n");
    }

    #[test]
    fn render_replaces_the_previous_frame() {
        let mut display = TextDisplay::new(Vec::<u8>::new(), 4, 2).unwrap();
        display.render(&[(0, 0)]).unwrap();
        display.render(&[(1, 1)]).unwrap();
        display.flush().unwrap();

        let output = String::from_utf8(display.writer).unwrap();
        assert_eq!(output, "\x1b[H....\n.#..\n");
    }

    #[test]
    fn clear_blanks_the_frame() {
        let mut display = TextDisplay::new(Vec::<u8>::new(), 2, 1).unwrap();
        display.render(&[(0, 0), (1, 0)]).unwrap();
        display.clear().unwrap();
        display.flush().unwrap();

        let output = String::from_utf8(display.writer).unwrap();
        assert_eq!(output, "\x1b[H..\n");
    }

    #[test]
    fn out_of_bounds_point_is_rejected() {
        let mut display = TextDisplay::new(Vec::<u8>::new(), 4, 2).unwrap();
        assert!(display.render(&[(4, 0)]).is_err());
        assert!(display.render(&[(0, 2)]).is_err());
    }

    #[test]
    fn zero_sized_display_is_rejected() {
        assert!(TextDisplay::new(Vec::<u8>::new(), 0, 8).is_err());
    }
}
