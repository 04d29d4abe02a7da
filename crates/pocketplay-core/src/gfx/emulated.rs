//! In-memory model of the controller's frame memory.
//!
//! Behaves like the panel does on the wire: `set_window` latches a rectangle
//! and resets the write cursor, pixel bytes then fill it row-major and wrap
//! back to the top-left once the rectangle is full. Pixels that land outside
//! the panel are dropped. Latched windows are recorded unless the log is
//! turned off with `without_window_log`.

use alloc::{vec, vec::Vec};
use core::convert::Infallible;

use super::{Panel, Window, color::Rgb565};

#[derive(Clone, Debug)]
pub struct EmulatedPanel {
    width: u16,
    height: u16,
    pixels: Vec<Rgb565>,
    window: Window,
    cursor: (u16, u16),
    pending: Option<u8>,
    windows: Vec<Window>,
    log_windows: bool,
    pixels_written: usize,
    presents: u32,
}

impl EmulatedPanel {
    /// A black panel of `width` x `height`.
    pub fn new(width: u16, height: u16) -> Self {
        let full = Window::new(0, 0, width.saturating_sub(1), height.saturating_sub(1));
        Self {
            width,
            height,
            pixels: vec![Rgb565::BLACK; width as usize * height as usize],
            window: full,
            cursor: (0, 0),
            pending: None,
            windows: Vec::new(),
            log_windows: true,
            pixels_written: 0,
            presents: 0,
        }
    }

    /// Stops recording latched windows, for long-running use.
    pub fn without_window_log(mut self) -> Self {
        self.log_windows = false;
        self.windows = Vec::new();
        self
    }

    pub fn pixel(&self, x: u16, y: u16) -> Option<Rgb565> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y as usize * self.width as usize + x as usize])
    }

    /// Row-major frame contents.
    pub fn pixels(&self) -> &[Rgb565] {
        &self.pixels
    }

    /// Every window latched since creation or the last `clear_log`.
    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    /// Total pixels streamed since creation or the last `clear_log`.
    pub fn pixels_written(&self) -> usize {
        self.pixels_written
    }

    pub fn presents(&self) -> u32 {
        self.presents
    }

    pub fn clear_log(&mut self) {
        self.windows.clear();
        self.pixels_written = 0;
    }

    fn push_pixel(&mut self, color: Rgb565) {
        let (x, y) = self.cursor;
        if x < self.width && y < self.height {
            self.pixels[y as usize * self.width as usize + x as usize] = color;
        }
        self.pixels_written += 1;

        let window = self.window;
        self.cursor = if x >= window.x1 {
            if y >= window.y1 {
                (window.x0, window.y0)
            } else {
                (window.x0, y + 1)
            }
        } else {
            (x + 1, y)
        };
    }
}

impl Panel for EmulatedPanel {
    type Error = Infallible;

    fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn set_window(&mut self, window: Window) -> Result<(), Self::Error> {
        self.window = window;
        self.cursor = (window.x0, window.y0);
        self.pending = None;
        if self.log_windows {
            self.windows.push(window);
        }
        Ok(())
    }

    fn write_pixels(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        let mut rest = bytes;

        if let Some(high) = self.pending.take() {
            let Some((&low, tail)) = rest.split_first() else {
                self.pending = Some(high);
                return Ok(());
            };
            self.push_pixel(Rgb565(u16::from_be_bytes([high, low])));
            rest = tail;
        }

        let mut pairs = rest.chunks_exact(2);
        for pair in &mut pairs {
            self.push_pixel(Rgb565(u16::from_be_bytes([pair[0], pair[1]])));
        }
        if let [odd] = pairs.remainder() {
            self.pending = Some(*odd);
        }

        Ok(())
    }

    fn present(&mut self) -> Result<(), Self::Error> {
        self.presents += 1;
        Ok(())
    }
}
