#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod assets;
pub mod engine;
pub mod game;
pub mod gfx;
pub mod input;

pub use engine::{Clock, Engine, EngineConfig, EngineError, RunStats, StopSignal, TickOutcome};
pub use game::{Game, RedrawFlag, Restartable};
pub use gfx::{GfxError, GfxResult, Panel, Rgb565, Surface, Window};
pub use input::{Button, ButtonLevels, InputProvider, InputState};
