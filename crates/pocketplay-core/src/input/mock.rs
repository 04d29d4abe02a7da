use super::{ButtonLevels, InputProvider};

/// Input source with nothing attached: every button reads released.
#[derive(Default, Debug, Clone, Copy)]
pub struct NoInput;

impl NoInput {
    pub const fn new() -> Self {
        Self
    }
}

impl InputProvider for NoInput {
    type Error = core::convert::Infallible;

    fn sample(&mut self) -> Result<ButtonLevels, Self::Error> {
        Ok(ButtonLevels::RELEASED)
    }
}

/// Replays recorded levels one per sample, then reads released.
#[derive(Debug, Clone)]
pub struct ScriptedInput<'a> {
    levels: &'a [ButtonLevels],
    cursor: usize,
}

impl<'a> ScriptedInput<'a> {
    pub const fn new(levels: &'a [ButtonLevels]) -> Self {
        Self { levels, cursor: 0 }
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.levels.len()
    }
}

impl InputProvider for ScriptedInput<'_> {
    type Error = core::convert::Infallible;

    fn sample(&mut self) -> Result<ButtonLevels, Self::Error> {
        let Some(levels) = self.levels.get(self.cursor).copied() else {
            return Ok(ButtonLevels::RELEASED);
        };
        self.cursor = self.cursor.saturating_add(1);
        Ok(levels)
    }
}
