use embedded_hal::digital::InputPin;
use pocketplay_core::input::{Button, ButtonLevels, InputProvider};

#[derive(Debug, Clone, Copy)]
pub struct ButtonsConfig {
    active_low: bool,
}

impl Default for ButtonsConfig {
    fn default() -> Self {
        Self { active_low: true }
    }
}

impl ButtonsConfig {
    pub const fn with_active_low(mut self, active_low: bool) -> Self {
        self.active_low = active_low;
        self
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ButtonError<UpErr, DownErr, LeftErr, RightErr> {
    Up(UpErr),
    Down(DownErr),
    Left(LeftErr),
    Right(RightErr),
}

/// Direction pad on four GPIO inputs. The board has no A/B buttons, so
/// those always read released.
#[derive(Debug)]
pub struct GpioButtons<UP, DOWN, LEFT, RIGHT> {
    up: UP,
    down: DOWN,
    left: LEFT,
    right: RIGHT,
    config: ButtonsConfig,
}

impl<UP, DOWN, LEFT, RIGHT> GpioButtons<UP, DOWN, LEFT, RIGHT>
where
    UP: InputPin,
    DOWN: InputPin,
    LEFT: InputPin,
    RIGHT: InputPin,
{
    pub fn new(up: UP, down: DOWN, left: LEFT, right: RIGHT, config: ButtonsConfig) -> Self {
        Self {
            up,
            down,
            left,
            right,
            config,
        }
    }

    pub fn release(self) -> (UP, DOWN, LEFT, RIGHT) {
        (self.up, self.down, self.left, self.right)
    }
}

impl<UP, DOWN, LEFT, RIGHT> InputProvider for GpioButtons<UP, DOWN, LEFT, RIGHT>
where
    UP: InputPin,
    DOWN: InputPin,
    LEFT: InputPin,
    RIGHT: InputPin,
{
    type Error = ButtonError<UP::Error, DOWN::Error, LEFT::Error, RIGHT::Error>;

    fn sample(&mut self) -> Result<ButtonLevels, Self::Error> {
        let active_low = self.config.active_low;
        let up = self.up.is_high().map_err(ButtonError::Up)?;
        let down = self.down.is_high().map_err(ButtonError::Down)?;
        let left = self.left.is_high().map_err(ButtonError::Left)?;
        let right = self.right.is_high().map_err(ButtonError::Right)?;

        Ok(ButtonLevels::new()
            .with(Button::Up, held_from_level(up, active_low))
            .with(Button::Down, held_from_level(down, active_low))
            .with(Button::Left, held_from_level(left, active_low))
            .with(Button::Right, held_from_level(right, active_low)))
    }
}

#[inline]
const fn held_from_level(level_high: bool, active_low: bool) -> bool {
    if active_low { !level_high } else { level_high }
}
