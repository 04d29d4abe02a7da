//! Immutable RGB565 images.

use alloc::vec::Vec;

use super::color::Rgb565;

/// Row-major RGB565 pixels, two big-endian bytes each.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Sprite {
    width: u16,
    height: u16,
    data: Vec<u8>,
}

/// Pixel payload does not match `width * height * 2`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SizeMismatch {
    pub expected: usize,
    pub actual: usize,
}

impl Sprite {
    /// Wraps raw RGB565 bytes. Dimensions come from the caller; the
    /// payload length must match exactly.
    pub fn from_rgb565(width: u16, height: u16, data: Vec<u8>) -> Result<Self, SizeMismatch> {
        let expected = byte_len(width, height);
        if data.len() != expected {
            return Err(SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Solid-color sprite.
    pub fn filled(width: u16, height: u16, color: Rgb565) -> Self {
        let bytes = color.to_be_bytes();
        let mut data = Vec::with_capacity(byte_len(width, height));
        for _ in 0..width as usize * height as usize {
            data.extend_from_slice(&bytes);
        }

        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Color at `(x, y)`, `None` outside the sprite.
    pub fn pixel(&self, x: u16, y: u16) -> Option<Rgb565> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let index = 2 * (y as usize * self.width as usize + x as usize);
        Some(Rgb565(u16::from_be_bytes([
            self.data[index],
            self.data[index + 1],
        ])))
    }
}

pub(crate) const fn byte_len(width: u16, height: u16) -> usize {
    width as usize * height as usize * 2
}
