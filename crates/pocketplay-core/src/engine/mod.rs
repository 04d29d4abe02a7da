//! Cooperative fixed-rate frame scheduler.
//!
//! Each tick samples input, derives press edges, dispatches button hooks,
//! checks for the up-button double tap, then updates and draws the game.
//! `run` repeats ticks and sleeps away the rest of each frame period.

use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::delay::DelayNs;
use log::{debug, trace, warn};

use crate::{
    game::Game,
    gfx::{GfxError, Panel, Surface},
    input::{Button, DoubleTap, InputProvider, InputState, gesture::DOUBLE_TAP_MS},
};

#[cfg(test)]
mod tests;

/// Monotonic millisecond time source.
pub trait Clock {
    fn now_ms(&mut self) -> u64;
}

/// Cooperative stop request, observed between ticks.
#[derive(Debug, Default)]
pub struct StopSignal {
    requested: AtomicBool,
}

impl StopSignal {
    pub const fn new() -> Self {
        Self {
            requested: AtomicBool::new(false),
        }
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::Release);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    pub fn clear(&self) {
        self.requested.store(false, Ordering::Release);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    pub target_fps: u16,
    pub double_tap_ms: u64,
    /// Log draw failures and keep running instead of aborting `run`.
    pub isolate_frame_errors: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_fps: 30,
            double_tap_ms: DOUBLE_TAP_MS,
            isolate_frame_errors: false,
        }
    }
}

impl EngineConfig {
    pub const fn with_target_fps(mut self, target_fps: u16) -> Self {
        self.target_fps = target_fps;
        self
    }

    pub const fn with_double_tap_ms(mut self, double_tap_ms: u64) -> Self {
        self.double_tap_ms = double_tap_ms;
        self
    }

    pub const fn with_isolate_frame_errors(mut self, isolate: bool) -> Self {
        self.isolate_frame_errors = isolate;
        self
    }

    /// Frame budget in milliseconds. A zero rate is treated as 1 fps.
    pub const fn frame_period_ms(&self) -> u64 {
        let fps = if self.target_fps == 0 { 1 } else { self.target_fps };
        1_000 / fps as u64
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// A double tap reset the game; update and draw were skipped.
    Reset,
    Drawn,
    /// Updated, but the game asked for no redraw.
    Skipped,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub ticks: u32,
    pub frames_drawn: u32,
    pub resets: u32,
    pub overruns: u32,
    pub frame_errors: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineError<InputErr, PanelErr> {
    Input(InputErr),
    Draw(GfxError<PanelErr>),
}

pub type EngineResult<T, IN, P> =
    Result<T, EngineError<<IN as InputProvider>::Error, <P as Panel>::Error>>;

pub struct Engine<P, IN, CLK, D> {
    gfx: Surface<P>,
    input: IN,
    clock: CLK,
    delay: D,
    config: EngineConfig,
    state: InputState,
    gesture: DoubleTap,
    last_tick_ms: Option<u64>,
    first_frame: bool,
    stats: RunStats,
}

impl<P, IN, CLK, D> Engine<P, IN, CLK, D>
where
    P: Panel,
    IN: InputProvider,
    CLK: Clock,
    D: DelayNs,
{
    pub fn new(gfx: Surface<P>, input: IN, clock: CLK, delay: D, config: EngineConfig) -> Self {
        Self {
            gfx,
            input,
            clock,
            delay,
            config,
            state: InputState::default(),
            gesture: DoubleTap::new(config.double_tap_ms),
            last_tick_ms: None,
            first_frame: true,
            stats: RunStats::default(),
        }
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    pub fn surface(&self) -> &Surface<P> {
        &self.gfx
    }

    pub fn surface_mut(&mut self) -> &mut Surface<P> {
        &mut self.gfx
    }

    pub fn input_mut(&mut self) -> &mut IN {
        &mut self.input
    }

    /// Input snapshot of the most recent tick.
    pub fn input_state(&self) -> &InputState {
        &self.state
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn into_parts(self) -> (Surface<P>, IN, CLK, D) {
        (self.gfx, self.input, self.clock, self.delay)
    }

    /// Runs one tick at the current clock time.
    pub fn tick<G>(&mut self, game: &mut G) -> EngineResult<TickOutcome, IN, P>
    where
        G: Game<P>,
    {
        let now_ms = self.clock.now_ms();
        self.tick_at(game, now_ms)
    }

    /// Ticks until `stop` is requested, pacing to the configured frame rate.
    ///
    /// The first tick after entering `run` always draws.
    pub fn run<G>(&mut self, game: &mut G, stop: &StopSignal) -> EngineResult<RunStats, IN, P>
    where
        G: Game<P>,
        P::Error: core::fmt::Debug,
    {
        self.first_frame = true;
        self.last_tick_ms = None;
        self.stats = RunStats::default();
        let period_ms = self.config.frame_period_ms();
        debug!("engine: running at {} fps ({period_ms} ms/frame)", self.config.target_fps);

        while !stop.is_requested() {
            let started_ms = self.clock.now_ms();
            let outcome = match self.tick_at(game, started_ms) {
                Ok(outcome) => outcome,
                Err(EngineError::Draw(err)) if self.config.isolate_frame_errors => {
                    self.stats.frame_errors = self.stats.frame_errors.saturating_add(1);
                    warn!("engine: frame {} dropped: {err:?}", self.stats.ticks);
                    TickOutcome::Skipped
                }
                Err(err) => return Err(err),
            };

            if outcome == TickOutcome::Reset {
                continue;
            }

            let elapsed_ms = self.clock.now_ms().saturating_sub(started_ms);
            if elapsed_ms < period_ms {
                let sleep_ms = u32::try_from(period_ms - elapsed_ms).unwrap_or(u32::MAX);
                self.delay.delay_ms(sleep_ms);
            } else if elapsed_ms > period_ms {
                self.stats.overruns = self.stats.overruns.saturating_add(1);
                warn!("engine: tick took {elapsed_ms} ms, budget {period_ms} ms");
            }
        }

        debug!("engine: stopped after {} ticks", self.stats.ticks);
        Ok(self.stats)
    }

    fn tick_at<G>(&mut self, game: &mut G, now_ms: u64) -> EngineResult<TickOutcome, IN, P>
    where
        G: Game<P>,
    {
        let raw = self.input.sample().map_err(EngineError::Input)?;
        self.state = self.state.next(raw);

        let dt = match self.last_tick_ms {
            Some(last_ms) => now_ms.saturating_sub(last_ms) as f32 / 1_000.0,
            None => 0.0,
        };
        self.last_tick_ms = Some(now_ms);
        self.stats.ticks = self.stats.ticks.saturating_add(1);

        for button in self.state.pressed_buttons() {
            dispatch::<P, G>(game, button);
        }

        if self.state.just_pressed(Button::Up) && self.gesture.tap(now_ms) {
            debug!("engine: double tap at {now_ms} ms, resetting game");
            game.reset();
            self.stats.resets = self.stats.resets.saturating_add(1);
            return Ok(TickOutcome::Reset);
        }

        game.update(dt, &self.state);

        if !(game.should_redraw() || self.first_frame) {
            trace!("engine: no redraw requested");
            return Ok(TickOutcome::Skipped);
        }

        game.draw(&mut self.gfx).map_err(EngineError::Draw)?;
        self.gfx.present().map_err(EngineError::Draw)?;
        self.first_frame = false;
        self.stats.frames_drawn = self.stats.frames_drawn.saturating_add(1);

        Ok(TickOutcome::Drawn)
    }
}

fn dispatch<P, G>(game: &mut G, button: Button)
where
    P: Panel,
    G: Game<P>,
{
    match button {
        Button::Up => game.on_up_pressed(),
        Button::Down => game.on_down_pressed(),
        Button::Left => game.on_left_pressed(),
        Button::Right => game.on_right_pressed(),
        Button::A => game.on_a_pressed(),
        Button::B => game.on_b_pressed(),
    }
}
