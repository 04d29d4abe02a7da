//! Host stand-ins for the board: an SPI bus that decodes the ILI9341 byte
//! stream into an emulated panel, plus std-backed clock and delay.

use std::{
    cell::RefCell,
    convert::Infallible,
    rc::Rc,
    thread,
    time::{Duration, Instant},
};

use embedded_hal::{delay::DelayNs, digital, spi};
use ili9341::protocol::cmd;
use log::trace;
use pocketplay_core::{
    Clock,
    gfx::{EmulatedPanel, Panel, Window},
};

/// Controller state as seen from the wire.
#[derive(Debug)]
pub struct SimController {
    panel: EmulatedPanel,
    dc_high: bool,
    command: u8,
    params: Vec<u8>,
    columns: (u16, u16),
    pages: (u16, u16),
    read_cursor: (u16, u16),
    commands: usize,
}

pub type SharedController = Rc<RefCell<SimController>>;

impl SimController {
    pub fn shared(width: u16, height: u16) -> SharedController {
        Rc::new(RefCell::new(Self {
            panel: EmulatedPanel::new(width, height).without_window_log(),
            dc_high: false,
            command: cmd::NOP,
            params: Vec::new(),
            columns: (0, width.saturating_sub(1)),
            pages: (0, height.saturating_sub(1)),
            read_cursor: (0, 0),
            commands: 0,
        }))
    }

    pub fn panel(&self) -> &EmulatedPanel {
        &self.panel
    }

    pub fn commands(&self) -> usize {
        self.commands
    }

    fn window(&self) -> Window {
        Window::new(self.columns.0, self.pages.0, self.columns.1, self.pages.1)
    }

    fn command(&mut self, byte: u8) {
        self.command = byte;
        self.params.clear();
        self.commands += 1;

        match byte {
            cmd::RAMWR => {
                let window = self.window();
                let Ok(()) = self.panel.set_window(window);
            }
            cmd::RAMRD => self.read_cursor = (self.columns.0, self.pages.0),
            _ => trace!("sim: command {byte:#04x}"),
        }
    }

    fn data(&mut self, bytes: &[u8]) {
        match self.command {
            cmd::RAMWR => {
                let Ok(()) = self.panel.write_pixels(bytes);
            }
            cmd::CASET | cmd::PASET => {
                self.params.extend_from_slice(bytes);
                if self.params.len() >= 4 {
                    let lo = u16::from_be_bytes([self.params[0], self.params[1]]);
                    let hi = u16::from_be_bytes([self.params[2], self.params[3]]);
                    if self.command == cmd::CASET {
                        self.columns = (lo, hi);
                    } else {
                        self.pages = (lo, hi);
                    }
                }
            }
            _ => self.params.extend_from_slice(bytes),
        }
    }

    fn read(&mut self, buffer: &mut [u8]) {
        if self.command != cmd::RAMRD {
            buffer.fill(0);
            return;
        }

        for pair in buffer.chunks_mut(2) {
            let (x, y) = self.read_cursor;
            let bytes = self.panel.pixel(x, y).unwrap_or_default().to_be_bytes();
            for (slot, byte) in pair.iter_mut().zip(bytes) {
                *slot = byte;
            }

            self.read_cursor = if x < self.columns.1 {
                (x + 1, y)
            } else if y < self.pages.1 {
                (self.columns.0, y + 1)
            } else {
                (self.columns.0, self.pages.0)
            };
        }
    }
}

pub struct SimBus(pub SharedController);

impl spi::ErrorType for SimBus {
    type Error = Infallible;
}

impl spi::SpiBus<u8> for SimBus {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        self.0.borrow_mut().read(words);
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        let mut controller = self.0.borrow_mut();
        if controller.dc_high {
            controller.data(words);
        } else {
            for byte in words {
                controller.command(*byte);
            }
        }
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        self.write(write)?;
        self.read(read)
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        self.write(words)?;
        self.read(words)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Output line into the simulator. Only DC carries state; CS and RST are
/// accepted and ignored.
pub enum SimPin {
    Dc(SharedController),
    Idle,
}

impl digital::ErrorType for SimPin {
    type Error = Infallible;
}

impl digital::OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        if let Self::Dc(controller) = self {
            controller.borrow_mut().dc_high = false;
        }
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        if let Self::Dc(controller) = self {
            controller.borrow_mut().dc_high = true;
        }
        Ok(())
    }
}

pub struct StdClock {
    started: Instant,
}

impl StdClock {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Clock for StdClock {
    fn now_ms(&mut self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

#[derive(Clone, Copy)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(ns as u64));
    }
}
