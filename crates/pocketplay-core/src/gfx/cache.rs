//! Memoized text sprites.
//!
//! Entries are keyed by `(text, color, background, scale)`. The cache holds at
//! most `capacity` sprites and evicts the least recently used one when full;
//! `clear` drops everything at once.

use alloc::vec::Vec;

use heapless::String;

use super::{color::Rgb565, sprite::Sprite};

/// Default number of cached sprites.
pub const DEFAULT_CAPACITY: usize = 32;
/// Longest text (in bytes) that can be used as a key.
pub const MAX_KEY_BYTES: usize = 64;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TextKey {
    text: String<MAX_KEY_BYTES>,
    color: Rgb565,
    background: Option<Rgb565>,
    scale: u8,
}

impl TextKey {
    /// Returns `None` when `text` is longer than `MAX_KEY_BYTES`.
    pub fn new(text: &str, color: Rgb565, background: Option<Rgb565>, scale: u8) -> Option<Self> {
        let mut key = String::new();
        key.push_str(text).ok()?;

        Some(Self {
            text: key,
            color,
            background,
            scale: scale.max(1),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
    pub evictions: u32,
}

#[derive(Debug)]
struct Entry {
    key: TextKey,
    sprite: Sprite,
    last_used: u64,
}

#[derive(Debug)]
pub struct TextCache {
    entries: Vec<Entry>,
    capacity: usize,
    use_counter: u64,
    stats: CacheStats,
}

impl Default for TextCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl TextCache {
    /// `capacity` is clamped to at least one entry.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
            use_counter: 0,
            stats: CacheStats::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn contains(&self, key: &TextKey) -> bool {
        self.entries.iter().any(|entry| entry.key == *key)
    }

    /// Returns the cached sprite for `key`, building it with `render` on a miss.
    ///
    /// A `None` from `render` leaves the cache untouched.
    pub fn get_or_insert_with<F>(&mut self, key: TextKey, render: F) -> Option<&Sprite>
    where
        F: FnOnce() -> Option<Sprite>,
    {
        self.use_counter += 1;
        let now = self.use_counter;

        if let Some(index) = self.entries.iter().position(|entry| entry.key == key) {
            self.stats.hits = self.stats.hits.saturating_add(1);
            let entry = &mut self.entries[index];
            entry.last_used = now;
            return Some(&entry.sprite);
        }

        self.stats.misses = self.stats.misses.saturating_add(1);
        let sprite = render()?;

        if self.entries.len() >= self.capacity {
            self.evict_oldest();
        }

        log::trace!("text cache miss: {:?} (scale {})", key.text(), key.scale);
        self.entries.push(Entry {
            key,
            sprite,
            last_used: now,
        });
        self.entries.last().map(|entry| &entry.sprite)
    }

    /// Drops every cached sprite.
    pub fn clear(&mut self) {
        self.entries = Vec::new();
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .enumerate()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(index, _)| index);

        if let Some(index) = oldest {
            self.entries.swap_remove(index);
            self.stats.evictions = self.stats.evictions.saturating_add(1);
        }
    }
}
