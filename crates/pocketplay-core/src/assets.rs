//! Sprite asset sources.
//!
//! Sprite files are raw RGB565, row-major, with no header; dimensions are
//! supplied by the caller.

use alloc::vec::Vec;
use core::convert::Infallible;

use crate::gfx::{SizeMismatch, Sprite};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AssetError<E> {
    /// No asset is stored under the requested path.
    NotFound,
    /// The backing store failed while reading.
    Source(E),
    /// Payload length does not match the requested dimensions.
    Size(SizeMismatch),
}

/// Read-only store of named binary assets.
pub trait AssetSource {
    type Error;

    fn read(&mut self, path: &str) -> Result<Vec<u8>, AssetError<Self::Error>>;
}

/// Assets compiled into the image.
#[derive(Debug, Clone, Copy)]
pub struct StaticAssets<'a> {
    entries: &'a [(&'a str, &'a [u8])],
}

impl<'a> StaticAssets<'a> {
    pub const fn new(entries: &'a [(&'a str, &'a [u8])]) -> Self {
        Self { entries }
    }
}

impl AssetSource for StaticAssets<'_> {
    type Error = Infallible;

    fn read(&mut self, path: &str) -> Result<Vec<u8>, AssetError<Self::Error>> {
        self.entries
            .iter()
            .find(|(name, _)| *name == path)
            .map(|(_, bytes)| bytes.to_vec())
            .ok_or(AssetError::NotFound)
    }
}

/// Reads `path` and wraps it as a `width` x `height` sprite.
pub fn load_sprite<A>(
    source: &mut A,
    path: &str,
    width: u16,
    height: u16,
) -> Result<Sprite, AssetError<A::Error>>
where
    A: AssetSource + ?Sized,
{
    let data = source.read(path)?;
    Sprite::from_rgb565(width, height, data).map_err(AssetError::Size)
}
