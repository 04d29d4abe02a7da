//! Immediate-mode drawing on top of a windowed pixel stream.
//!
//! There is no framebuffer: every primitive latches an addressing window on
//! the [`Panel`] and streams RGB565 bytes into it. Unclipped primitives
//! (`fill_rect`, `draw_image`) silently skip anything not fully on screen;
//! `safe_fill_rect` clips first. Text is either streamed glyph-row by
//! glyph-row (1x, no background) or blitted from a memoized sprite.

mod cache;
mod color;
mod emulated;
pub mod font;
mod sprite;
pub mod text;

pub use cache::{CacheStats, DEFAULT_CAPACITY, MAX_KEY_BYTES, TextCache, TextKey};
pub use color::Rgb565;
pub use emulated::EmulatedPanel;
pub use sprite::{SizeMismatch, Sprite};

use crate::assets::{self, AssetError, AssetSource};
use font::{GLYPH_SIZE, glyph_bit};

const FILL_CHUNK_PIXELS: usize = 64;
const FILL_CHUNK_BYTES: usize = FILL_CHUNK_PIXELS * 2;

/// Inclusive rectangle latched into the display controller.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Window {
    pub x0: u16,
    pub y0: u16,
    pub x1: u16,
    pub y1: u16,
}

impl Window {
    pub const fn new(x0: u16, y0: u16, x1: u16, y1: u16) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Columns covered; an inverted window counts as one column.
    pub const fn width(&self) -> u16 {
        self.x1.saturating_sub(self.x0).saturating_add(1)
    }

    /// Rows covered; an inverted window counts as one row.
    pub const fn height(&self) -> u16 {
        self.y1.saturating_sub(self.y0).saturating_add(1)
    }
}

/// A display that accepts windowed RGB565 pixel streams.
pub trait Panel {
    type Error;

    /// Addressable `(width, height)`.
    fn size(&self) -> (u16, u16);

    /// Latches `window` and prepares a row-major pixel stream into it.
    /// Not validated; callers keep the window on the panel.
    fn set_window(&mut self, window: Window) -> Result<(), Self::Error>;

    /// Streams big-endian RGB565 bytes into the latched window.
    fn write_pixels(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Streams `count` copies of `color` into the latched window.
    fn fill_pixels(&mut self, color: Rgb565, count: usize) -> Result<(), Self::Error> {
        let bytes = color.to_be_bytes();
        let mut chunk = [0u8; FILL_CHUNK_BYTES];
        for pair in chunk.chunks_exact_mut(2) {
            pair.copy_from_slice(&bytes);
        }

        let mut remaining = count;
        while remaining > 0 {
            let n = remaining.min(FILL_CHUNK_PIXELS);
            self.write_pixels(&chunk[..n * 2])?;
            remaining -= n;
        }
        Ok(())
    }

    /// End-of-frame hook. Immediate panels have nothing to do.
    fn present(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GfxError<E> {
    /// The panel (bus or pins) failed.
    Panel(E),
    /// Image payload does not match its declared dimensions.
    BufferSize(SizeMismatch),
    /// A sprite asset could not be found or read.
    MissingAsset,
}

impl<E, S> From<AssetError<S>> for GfxError<E> {
    fn from(err: AssetError<S>) -> Self {
        match err {
            AssetError::NotFound | AssetError::Source(_) => Self::MissingAsset,
            AssetError::Size(mismatch) => Self::BufferSize(mismatch),
        }
    }
}

pub type GfxResult<E> = Result<(), GfxError<E>>;

/// Drawing surface owning the panel and the text sprite cache.
#[derive(Debug)]
pub struct Surface<P> {
    panel: P,
    width: i32,
    height: i32,
    cache: TextCache,
}

impl<P> Surface<P>
where
    P: Panel,
{
    pub fn new(panel: P) -> Self {
        Self::with_cache_capacity(panel, DEFAULT_CAPACITY)
    }

    pub fn with_cache_capacity(panel: P, capacity: usize) -> Self {
        let (width, height) = panel.size();
        Self {
            panel,
            width: width as i32,
            height: height as i32,
            cache: TextCache::new(capacity),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }

    pub fn into_panel(self) -> P {
        self.panel
    }

    /// Fills the whole surface.
    pub fn clear(&mut self, color: Rgb565) -> GfxResult<P::Error> {
        self.fill_rect(0, 0, self.width, self.height, color)
    }

    /// Unclipped fill: skipped when empty or not fully on the surface.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgb565) -> GfxResult<P::Error> {
        let Some(window) = self.window_for(x, y, w, h) else {
            return Ok(());
        };

        self.panel.set_window(window).map_err(GfxError::Panel)?;
        self.panel
            .fill_pixels(color, w as usize * h as usize)
            .map_err(GfxError::Panel)
    }

    /// Clipped fill: intersects the rectangle with the surface first.
    pub fn safe_fill_rect(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        color: Rgb565,
    ) -> GfxResult<P::Error> {
        if w <= 0 || h <= 0 {
            return Ok(());
        }

        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(w).min(self.width);
        let y1 = y.saturating_add(h).min(self.height);

        let cw = x1 - x0;
        let ch = y1 - y0;
        if cw <= 0 || ch <= 0 {
            return Ok(());
        }

        self.fill_rect(x0, y0, cw, ch, color)
    }

    /// Sets one pixel; off-surface coordinates are ignored.
    pub fn pixel(&mut self, x: i32, y: i32, color: Rgb565) -> GfxResult<P::Error> {
        self.fill_rect(x, y, 1, 1, color)
    }

    /// Streams `buffer` verbatim into `(x, y, w, h)`.
    ///
    /// Not clipped: skipped when not fully on the surface, like `fill_rect`.
    pub fn draw_image(&mut self, x: i32, y: i32, w: i32, h: i32, buffer: &[u8]) -> GfxResult<P::Error> {
        let Some(window) = self.window_for(x, y, w, h) else {
            log::trace!("image {w}x{h} at ({x}, {y}) skipped: off surface");
            return Ok(());
        };

        let expected = w as usize * h as usize * 2;
        if buffer.len() != expected {
            return Err(GfxError::BufferSize(SizeMismatch {
                expected,
                actual: buffer.len(),
            }));
        }

        stream(&mut self.panel, window, buffer)
    }

    pub fn draw_sprite(&mut self, sprite: &Sprite, x: i32, y: i32) -> GfxResult<P::Error> {
        self.draw_image(
            x,
            y,
            sprite.width() as i32,
            sprite.height() as i32,
            sprite.data(),
        )
    }

    /// Reads a raw RGB565 sprite from `source`.
    pub fn load_sprite<A>(
        &self,
        source: &mut A,
        path: &str,
        width: u16,
        height: u16,
    ) -> Result<Sprite, AssetError<A::Error>>
    where
        A: AssetSource + ?Sized,
    {
        assets::load_sprite(source, path, width, height)
    }

    /// `(width, height)` of `text` at `scale`.
    pub fn text_size(&self, text: &str, scale: u8) -> (i32, i32) {
        text::text_size(text, scale)
    }

    /// Draws `text` with its whole box kept on the surface.
    ///
    /// The position is shifted so no glyph is cut off. Text whose box is
    /// larger than the surface is skipped.
    pub fn draw_text(
        &mut self,
        x: i32,
        y: i32,
        text: &str,
        color: Rgb565,
        background: Option<Rgb565>,
        scale: u8,
    ) -> GfxResult<P::Error> {
        if text.is_empty() {
            return Ok(());
        }

        let scale = scale.max(1);
        let (w, h) = text::text_size(text, scale);
        if w > self.width || h > self.height {
            log::trace!("text {text:?} ({w}x{h}) larger than surface, skipped");
            return Ok(());
        }

        let x = x.clamp(0, self.width - w);
        let y = y.clamp(0, self.height - h);
        let window = Window::new(x as u16, y as u16, (x + w - 1) as u16, (y + h - 1) as u16);

        if scale == 1 && background.is_none() {
            return stream_glyphs(&mut self.panel, window, text, color);
        }

        let Self { panel, cache, .. } = self;
        let render = || text::render_text_sprite(text, color, background, scale);

        match TextKey::new(text, color, background, scale) {
            Some(key) => match cache.get_or_insert_with(key, render) {
                Some(sprite) => stream(panel, window, sprite.data()),
                None => Ok(()),
            },
            None => match render() {
                Some(sprite) => stream(panel, window, sprite.data()),
                None => Ok(()),
            },
        }
    }

    /// Empties the text sprite cache.
    pub fn clear_caches(&mut self) {
        log::debug!("dropping {} cached text sprites", self.cache.len());
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn cached_sprites(&self) -> usize {
        self.cache.len()
    }

    /// End-of-frame hook forwarded to the panel.
    pub fn present(&mut self) -> GfxResult<P::Error> {
        self.panel.present().map_err(GfxError::Panel)
    }

    fn window_for(&self, x: i32, y: i32, w: i32, h: i32) -> Option<Window> {
        if w <= 0 || h <= 0 || x < 0 || y < 0 {
            return None;
        }

        let x_end = x.checked_add(w)?;
        let y_end = y.checked_add(h)?;
        if x_end > self.width || y_end > self.height {
            return None;
        }

        Some(Window::new(
            x as u16,
            y as u16,
            (x_end - 1) as u16,
            (y_end - 1) as u16,
        ))
    }
}

fn stream<P: Panel>(panel: &mut P, window: Window, bytes: &[u8]) -> GfxResult<P::Error> {
    panel.set_window(window).map_err(GfxError::Panel)?;
    panel.write_pixels(bytes).map_err(GfxError::Panel)
}

/// 1x text straight into the window, one glyph row at a time, over black.
fn stream_glyphs<P: Panel>(panel: &mut P, window: Window, text: &str, color: Rgb565) -> GfxResult<P::Error> {
    let fg = color.to_be_bytes();
    let bg = Rgb565::BLACK.to_be_bytes();
    let mut chunk = [0u8; FILL_CHUNK_BYTES];
    let mut used = 0;

    panel.set_window(window).map_err(GfxError::Panel)?;

    for row in 0..GLYPH_SIZE {
        for c in text.chars() {
            for col in 0..GLYPH_SIZE {
                let px = if glyph_bit(c, col, row) { fg } else { bg };
                chunk[used..used + 2].copy_from_slice(&px);
                used += 2;

                if used == chunk.len() {
                    panel.write_pixels(&chunk).map_err(GfxError::Panel)?;
                    used = 0;
                }
            }
        }
    }

    if used > 0 {
        panel.write_pixels(&chunk[..used]).map_err(GfxError::Panel)?;
    }
    Ok(())
}
