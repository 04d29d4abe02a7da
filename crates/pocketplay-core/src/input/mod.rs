//! Button input: raw levels, edge detection, gestures.

pub mod gesture;
pub mod mock;

pub use gesture::DoubleTap;
pub use mock::{NoInput, ScriptedInput};

/// Physical buttons, in dispatch order.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    A,
    B,
}

impl Button {
    pub const COUNT: usize = 6;

    /// Fixed dispatch order.
    pub const ALL: [Button; Button::COUNT] = [
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
        Button::A,
        Button::B,
    ];

    const fn index(self) -> usize {
        self as usize
    }
}

/// One level per button, `true` while held.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ButtonLevels([bool; Button::COUNT]);

impl ButtonLevels {
    /// Everything released.
    pub const RELEASED: Self = Self([false; Button::COUNT]);

    pub const fn new() -> Self {
        Self::RELEASED
    }

    pub const fn with(mut self, button: Button, held: bool) -> Self {
        self.0[button.index()] = held;
        self
    }

    pub fn set(&mut self, button: Button, held: bool) {
        self.0[button.index()] = held;
    }

    pub const fn is_set(&self, button: Button) -> bool {
        self.0[button.index()]
    }

    pub fn any(&self) -> bool {
        self.0.iter().any(|held| *held)
    }
}

/// Current held levels plus the buttons that went down this tick.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct InputState {
    held: ButtonLevels,
    pressed: ButtonLevels,
}

impl InputState {
    /// Snapshot following `self` given the new raw levels:
    /// `pressed = raw && !previous_raw` for every button.
    pub fn next(&self, raw: ButtonLevels) -> Self {
        let mut pressed = ButtonLevels::RELEASED;
        for button in Button::ALL {
            pressed.set(button, raw.is_set(button) && !self.held.is_set(button));
        }

        Self { held: raw, pressed }
    }

    pub const fn is_held(&self, button: Button) -> bool {
        self.held.is_set(button)
    }

    pub const fn just_pressed(&self, button: Button) -> bool {
        self.pressed.is_set(button)
    }

    pub const fn held(&self) -> ButtonLevels {
        self.held
    }

    pub const fn pressed(&self) -> ButtonLevels {
        self.pressed
    }

    /// Buttons pressed this tick, in dispatch order.
    pub fn pressed_buttons(&self) -> impl Iterator<Item = Button> + '_ {
        Button::ALL
            .into_iter()
            .filter(move |button| self.just_pressed(*button))
    }
}

/// Polled source of raw, already-debounced button levels.
pub trait InputProvider {
    type Error;

    fn sample(&mut self) -> Result<ButtonLevels, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn up(held: bool) -> ButtonLevels {
        ButtonLevels::new().with(Button::Up, held)
    }

    #[test]
    fn press_is_reported_only_on_the_rising_edge() {
        let raw = [false, true, true, false, true];
        let mut state = InputState::default();
        let mut edges = Vec::new();

        for level in raw {
            state = state.next(up(level));
            edges.push(state.just_pressed(Button::Up));
        }

        assert_eq!(edges, vec![false, true, false, false, true]);
    }

    #[test]
    fn edges_follow_raw_and_not_previous_for_every_button() {
        // every (previous, current) pair for every button
        let mut state = InputState::default();
        let patterns: [u8; 5] = [0b000000, 0b111111, 0b101010, 0b010101, 0b000000];

        for pattern in patterns {
            let previous = state.held();
            let mut raw = ButtonLevels::new();
            for (bit, button) in Button::ALL.into_iter().enumerate() {
                raw.set(button, pattern & (1 << bit) != 0);
            }

            state = state.next(raw);
            for button in Button::ALL {
                assert_eq!(
                    state.just_pressed(button),
                    raw.is_set(button) && !previous.is_set(button)
                );
                assert_eq!(state.is_held(button), raw.is_set(button));
            }
        }
    }

    #[test]
    fn pressed_buttons_iterate_in_dispatch_order() {
        let raw = ButtonLevels::new()
            .with(Button::B, true)
            .with(Button::Left, true)
            .with(Button::Up, true);
        let state = InputState::default().next(raw);

        let order: Vec<Button> = state.pressed_buttons().collect();
        assert_eq!(order, vec![Button::Up, Button::Left, Button::B]);
    }
}
