use std::{cell::Cell, convert::Infallible, rc::Rc};

use super::*;
use crate::{
    gfx::{EmulatedPanel, GfxResult, Rgb565},
    input::{ButtonLevels, ScriptedInput},
};

#[derive(Clone, Default)]
struct FakeClock {
    now: Rc<Cell<u64>>,
}

impl FakeClock {
    fn set(&self, now_ms: u64) {
        self.now.set(now_ms);
    }

    fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for FakeClock {
    fn now_ms(&mut self) -> u64 {
        self.now.get()
    }
}

/// Records every sleep and moves the shared clock forward by it.
struct FakeDelay {
    clock: FakeClock,
    sleeps_ms: Vec<u32>,
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.delay_ms(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.sleeps_ms.push(ms);
        self.clock.advance(ms as u64);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Call {
    Pressed(Button),
    Reset,
    Update(f32),
    Draw,
}

struct RecordingGame<'a> {
    calls: Vec<Call>,
    redraw: bool,
    work_ms: u64,
    clock: FakeClock,
    stop: &'a StopSignal,
    stop_after_updates: Option<usize>,
    stop_on_reset: bool,
    failing_draws: u32,
}

impl<'a> RecordingGame<'a> {
    fn new(clock: &FakeClock, stop: &'a StopSignal) -> Self {
        Self {
            calls: Vec::new(),
            redraw: true,
            work_ms: 0,
            clock: clock.clone(),
            stop,
            stop_after_updates: None,
            stop_on_reset: false,
            failing_draws: 0,
        }
    }

    fn count(&self, wanted: fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|call| wanted(call)).count()
    }

    fn updates(&self) -> usize {
        self.count(|call| matches!(call, Call::Update(_)))
    }

    fn draws(&self) -> usize {
        self.count(|call| matches!(call, Call::Draw))
    }
}

impl Game<EmulatedPanel> for RecordingGame<'_> {
    fn update(&mut self, dt: f32, _input: &InputState) {
        self.calls.push(Call::Update(dt));
        self.clock.advance(self.work_ms);
        if self.stop_after_updates == Some(self.updates()) {
            self.stop.request();
        }
    }

    fn draw(&mut self, gfx: &mut Surface<EmulatedPanel>) -> GfxResult<Infallible> {
        self.calls.push(Call::Draw);
        if self.failing_draws > 0 {
            self.failing_draws -= 1;
            return Err(GfxError::MissingAsset);
        }
        gfx.fill_rect(0, 0, 4, 4, Rgb565::RED)
    }

    fn should_redraw(&self) -> bool {
        self.redraw
    }

    fn reset(&mut self) {
        self.calls.push(Call::Reset);
        if self.stop_on_reset {
            self.stop.request();
        }
    }

    fn on_up_pressed(&mut self) {
        self.calls.push(Call::Pressed(Button::Up));
    }

    fn on_down_pressed(&mut self) {
        self.calls.push(Call::Pressed(Button::Down));
    }

    fn on_left_pressed(&mut self) {
        self.calls.push(Call::Pressed(Button::Left));
    }

    fn on_right_pressed(&mut self) {
        self.calls.push(Call::Pressed(Button::Right));
    }

    fn on_a_pressed(&mut self) {
        self.calls.push(Call::Pressed(Button::A));
    }

    fn on_b_pressed(&mut self) {
        self.calls.push(Call::Pressed(Button::B));
    }
}

type TestEngine<'a> = Engine<EmulatedPanel, ScriptedInput<'a>, FakeClock, FakeDelay>;

fn engine<'a>(levels: &'a [ButtonLevels], clock: &FakeClock, config: EngineConfig) -> TestEngine<'a> {
    Engine::new(
        Surface::new(EmulatedPanel::new(32, 32)),
        ScriptedInput::new(levels),
        clock.clone(),
        FakeDelay {
            clock: clock.clone(),
            sleeps_ms: Vec::new(),
        },
        config,
    )
}

fn up(held: bool) -> ButtonLevels {
    ButtonLevels::new().with(Button::Up, held)
}

#[test]
fn double_tap_within_threshold_resets_and_skips_the_frame() {
    let levels = [up(false), up(true), up(true), up(false), up(true)];
    let times = [0, 100, 150, 250, 300];
    let clock = FakeClock::default();
    let stop = StopSignal::new();
    let mut game = RecordingGame::new(&clock, &stop);
    let mut engine = engine(&levels, &clock, EngineConfig::default());

    let mut outcomes = Vec::new();
    for now_ms in times {
        clock.set(now_ms);
        outcomes.push(engine.tick(&mut game).unwrap());
    }

    assert_eq!(
        outcomes,
        vec![
            TickOutcome::Drawn,
            TickOutcome::Drawn,
            TickOutcome::Drawn,
            TickOutcome::Drawn,
            TickOutcome::Reset,
        ]
    );
    assert_eq!(game.updates(), 4);
    assert_eq!(game.draws(), 4);
    assert_eq!(
        &game.calls[game.calls.len() - 2..],
        &[Call::Pressed(Button::Up), Call::Reset]
    );
    assert_eq!(engine.stats().resets, 1);
}

#[test]
fn slow_second_tap_is_not_a_double_tap() {
    let levels = [up(true), up(false), up(true)];
    let clock = FakeClock::default();
    let stop = StopSignal::new();
    let mut game = RecordingGame::new(&clock, &stop);
    let mut engine = engine(&levels, &clock, EngineConfig::default());

    for now_ms in [0, 200, 401] {
        clock.set(now_ms);
        assert_eq!(engine.tick(&mut game).unwrap(), TickOutcome::Drawn);
    }
    assert!(!game.calls.contains(&Call::Reset));
}

#[test]
fn hooks_fire_in_fixed_order_before_update_and_draw() {
    let all = ButtonLevels::new()
        .with(Button::B, true)
        .with(Button::A, true)
        .with(Button::Right, true)
        .with(Button::Left, true)
        .with(Button::Down, true)
        .with(Button::Up, true);
    let levels = [all, all];
    let clock = FakeClock::default();
    let stop = StopSignal::new();
    let mut game = RecordingGame::new(&clock, &stop);
    let mut engine = engine(&levels, &clock, EngineConfig::default());

    engine.tick(&mut game).unwrap();
    assert_eq!(
        game.calls,
        vec![
            Call::Pressed(Button::Up),
            Call::Pressed(Button::Down),
            Call::Pressed(Button::Left),
            Call::Pressed(Button::Right),
            Call::Pressed(Button::A),
            Call::Pressed(Button::B),
            Call::Update(0.0),
            Call::Draw,
        ]
    );

    // still held: no second dispatch
    game.calls.clear();
    engine.tick(&mut game).unwrap();
    assert_eq!(game.calls, vec![Call::Update(0.0), Call::Draw]);
}

#[test]
fn update_receives_elapsed_seconds() {
    let clock = FakeClock::default();
    let stop = StopSignal::new();
    let mut game = RecordingGame::new(&clock, &stop);
    let mut engine = engine(&[], &clock, EngineConfig::default());

    for now_ms in [1_000, 1_250, 1_750] {
        clock.set(now_ms);
        engine.tick(&mut game).unwrap();
    }

    let dts: Vec<f32> = game
        .calls
        .iter()
        .filter_map(|call| match call {
            Call::Update(dt) => Some(*dt),
            _ => None,
        })
        .collect();
    assert_eq!(dts, vec![0.0, 0.25, 0.5]);
}

#[test]
fn first_frame_draws_even_without_redraw_request() {
    let clock = FakeClock::default();
    let stop = StopSignal::new();
    let mut game = RecordingGame::new(&clock, &stop);
    game.redraw = false;
    let mut engine = engine(&[], &clock, EngineConfig::default());

    assert_eq!(engine.tick(&mut game).unwrap(), TickOutcome::Drawn);
    assert_eq!(engine.tick(&mut game).unwrap(), TickOutcome::Skipped);
    assert_eq!(engine.tick(&mut game).unwrap(), TickOutcome::Skipped);
    assert_eq!(game.updates(), 3);
    assert_eq!(game.draws(), 1);

    // entering run draws once more
    game.stop_after_updates = Some(5);
    let stats = engine.run(&mut game, &stop).unwrap();
    assert_eq!(stats.ticks, 2);
    assert_eq!(stats.frames_drawn, 1);
    assert_eq!(game.draws(), 2);
}

#[test]
fn run_does_nothing_when_already_stopped() {
    let clock = FakeClock::default();
    let stop = StopSignal::new();
    stop.request();
    let mut game = RecordingGame::new(&clock, &stop);
    let mut engine = engine(&[], &clock, EngineConfig::default());

    let stats = engine.run(&mut game, &stop).unwrap();
    assert_eq!(stats, RunStats::default());
    assert!(game.calls.is_empty());
}

#[test]
fn stop_is_observed_at_the_next_tick_boundary() {
    let clock = FakeClock::default();
    let stop = StopSignal::new();
    let mut game = RecordingGame::new(&clock, &stop);
    game.stop_after_updates = Some(3);
    let mut engine = engine(&[], &clock, EngineConfig::default());

    let stats = engine.run(&mut game, &stop).unwrap();
    assert_eq!(stats.ticks, 3);
    // the stopping tick still finishes its draw
    assert_eq!(game.draws(), 3);
}

#[test]
fn run_sleeps_for_the_rest_of_the_frame() {
    let clock = FakeClock::default();
    let stop = StopSignal::new();
    let mut game = RecordingGame::new(&clock, &stop);
    game.work_ms = 30;
    game.stop_after_updates = Some(3);
    let config = EngineConfig::default().with_target_fps(10);
    let mut engine = engine(&[], &clock, config);

    let stats = engine.run(&mut game, &stop).unwrap();
    let (_, _, _, delay) = engine.into_parts();

    assert_eq!(delay.sleeps_ms, vec![70, 70, 70]);
    assert_eq!(stats.overruns, 0);
    assert_eq!(clock.now.get(), 300);
}

#[test]
fn overrun_proceeds_without_sleeping() {
    let clock = FakeClock::default();
    let stop = StopSignal::new();
    let mut game = RecordingGame::new(&clock, &stop);
    game.work_ms = 150;
    game.stop_after_updates = Some(2);
    let config = EngineConfig::default().with_target_fps(10);
    let mut engine = engine(&[], &clock, config);

    let stats = engine.run(&mut game, &stop).unwrap();
    let (_, _, _, delay) = engine.into_parts();

    assert!(delay.sleeps_ms.is_empty());
    assert_eq!(stats.overruns, 2);
}

#[test]
fn reset_tick_is_not_paced() {
    let levels = [up(true), up(false), up(true)];
    let clock = FakeClock::default();
    let stop = StopSignal::new();
    let mut game = RecordingGame::new(&clock, &stop);
    game.stop_on_reset = true;
    let config = EngineConfig::default().with_target_fps(10);
    let mut engine = engine(&levels, &clock, config);

    let stats = engine.run(&mut game, &stop).unwrap();
    let (_, _, _, delay) = engine.into_parts();

    assert_eq!(stats.ticks, 3);
    assert_eq!(stats.resets, 1);
    assert_eq!(delay.sleeps_ms, vec![100, 100]);
}

#[test]
fn draw_error_aborts_run_by_default() {
    let clock = FakeClock::default();
    let stop = StopSignal::new();
    let mut game = RecordingGame::new(&clock, &stop);
    game.failing_draws = 1;
    let mut engine = engine(&[], &clock, EngineConfig::default());

    let err = engine.run(&mut game, &stop).unwrap_err();
    assert_eq!(err, EngineError::Draw(GfxError::MissingAsset));
    assert_eq!(game.updates(), 1);
}

#[test]
fn isolated_draw_error_keeps_running() {
    let clock = FakeClock::default();
    let stop = StopSignal::new();
    let mut game = RecordingGame::new(&clock, &stop);
    game.failing_draws = 1;
    game.stop_after_updates = Some(3);
    let config = EngineConfig::default().with_isolate_frame_errors(true);
    let mut engine = engine(&[], &clock, config);

    let stats = engine.run(&mut game, &stop).unwrap();
    assert_eq!(stats.ticks, 3);
    assert_eq!(stats.frame_errors, 1);
    assert_eq!(stats.frames_drawn, 2);
}

#[test]
fn frame_period_handles_zero_rate() {
    assert_eq!(EngineConfig::default().frame_period_ms(), 33);
    assert_eq!(
        EngineConfig::default().with_target_fps(0).frame_period_ms(),
        1_000
    );
}

struct BrokenInput;

impl InputProvider for BrokenInput {
    type Error = &'static str;

    fn sample(&mut self) -> Result<ButtonLevels, Self::Error> {
        Err("button bus fault")
    }
}

#[test]
fn input_error_aborts_run_under_either_policy() {
    for isolate in [false, true] {
        let clock = FakeClock::default();
        let stop = StopSignal::new();
        let mut game = RecordingGame::new(&clock, &stop);
        let config = EngineConfig::default().with_isolate_frame_errors(isolate);
        let mut engine = Engine::new(
            Surface::new(EmulatedPanel::new(32, 32)),
            BrokenInput,
            clock.clone(),
            FakeDelay {
                clock: clock.clone(),
                sleeps_ms: Vec::new(),
            },
            config,
        );

        let err = engine.run(&mut game, &stop).unwrap_err();
        assert_eq!(err, EngineError::Input("button bus fault"));
        assert!(game.calls.is_empty());
        assert_eq!(engine.stats().frame_errors, 0);
    }
}
