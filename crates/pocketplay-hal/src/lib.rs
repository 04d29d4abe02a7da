#![cfg_attr(not(test), no_std)]

pub mod input;
pub mod platform;

pub use input::buttons::{ButtonError, ButtonsConfig, GpioButtons};
pub use platform::display::{DisplayError, TftDisplay};
