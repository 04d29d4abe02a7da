//! The contract a game implements to be driven by the engine.

use crate::{
    gfx::{GfxResult, Panel, Surface},
    input::InputState,
};

/// Game logic plugged into [`crate::Engine`].
///
/// Only `update` and `draw` are required. Every other hook defaults to a
/// no-op, and `should_redraw` defaults to always redrawing.
pub trait Game<P: Panel> {
    /// Advances the simulation by `dt` seconds of wall-clock time.
    fn update(&mut self, dt: f32, input: &InputState);

    fn draw(&mut self, gfx: &mut Surface<P>) -> GfxResult<P::Error>;

    fn should_redraw(&self) -> bool {
        true
    }

    /// Called on an up-button double tap.
    fn reset(&mut self) {}

    fn on_up_pressed(&mut self) {}
    fn on_down_pressed(&mut self) {}
    fn on_left_pressed(&mut self) {}
    fn on_right_pressed(&mut self) {}
    fn on_a_pressed(&mut self) {}
    fn on_b_pressed(&mut self) {}
}

/// Wraps a game so that `reset` replaces it with a freshly built value.
pub struct Restartable<G, F> {
    game: G,
    build: F,
    restarts: u32,
}

impl<G, F> Restartable<G, F>
where
    F: FnMut() -> G,
{
    pub fn new(mut build: F) -> Self {
        let game = build();
        Self {
            game,
            build,
            restarts: 0,
        }
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    pub fn restarts(&self) -> u32 {
        self.restarts
    }

    pub fn into_inner(self) -> G {
        self.game
    }
}

impl<P, G, F> Game<P> for Restartable<G, F>
where
    P: Panel,
    G: Game<P>,
    F: FnMut() -> G,
{
    fn update(&mut self, dt: f32, input: &InputState) {
        self.game.update(dt, input);
    }

    fn draw(&mut self, gfx: &mut Surface<P>) -> GfxResult<P::Error> {
        self.game.draw(gfx)
    }

    fn should_redraw(&self) -> bool {
        self.game.should_redraw()
    }

    fn reset(&mut self) {
        self.game = (self.build)();
        self.restarts = self.restarts.saturating_add(1);
    }

    fn on_up_pressed(&mut self) {
        self.game.on_up_pressed();
    }

    fn on_down_pressed(&mut self) {
        self.game.on_down_pressed();
    }

    fn on_left_pressed(&mut self) {
        self.game.on_left_pressed();
    }

    fn on_right_pressed(&mut self) {
        self.game.on_right_pressed();
    }

    fn on_a_pressed(&mut self) {
        self.game.on_a_pressed();
    }

    fn on_b_pressed(&mut self) {
        self.game.on_b_pressed();
    }
}

/// Dirty flag for games that only redraw after a state change.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RedrawFlag {
    dirty: bool,
}

impl Default for RedrawFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl RedrawFlag {
    /// Starts dirty so the first frame is drawn.
    pub const fn new() -> Self {
        Self { dirty: true }
    }

    pub fn request(&mut self) {
        self.dirty = true;
    }

    pub const fn is_requested(&self) -> bool {
        self.dirty
    }

    pub fn clear(&mut self) {
        self.dirty = false;
    }
}
