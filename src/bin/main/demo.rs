//! Card-table demo driven by the engine.
//!
//! Left deals a card (hit), right stands, a double tap on up starts a new
//! round. Card backs come from the built-in asset table.

use core::{cell::Cell, fmt::Write};

use heapless::String;
use log::warn;
use pocketplay_core::{
    Button, ButtonLevels, Game, GfxResult, Panel, RedrawFlag, Rgb565, StopSignal, Surface,
    assets::StaticAssets,
    gfx::Sprite,
    input::InputState,
};

pub const CARD_W: u16 = 20;
pub const CARD_H: u16 = 28;
const CARD_BYTES: usize = CARD_W as usize * CARD_H as usize * 2;
const CARD_BACK_PATH: &str = "cards/back.bin";

const CARD_BORDER: Rgb565 = Rgb565::WHITE;
const CARD_FILL: Rgb565 = Rgb565(0x8800);
const TABLE_BORDER: Rgb565 = Rgb565(0xA145);
const MAX_CARDS: u8 = 8;
const SCORE_PREFIX: &str = "CARDS ";
/// Prefix plus the widest `u8`.
const SCORE_BYTES: usize = SCORE_PREFIX.len() + 3;

static CARD_BACK: [u8; CARD_BYTES] = card_back();
pub static ASSETS: [(&str, &[u8]); 1] = [(CARD_BACK_PATH, &CARD_BACK)];

/// White border, velvet-red face.
const fn card_back() -> [u8; CARD_BYTES] {
    let mut bytes = [0u8; CARD_BYTES];
    let mut y = 0;
    while y < CARD_H as usize {
        let mut x = 0;
        while x < CARD_W as usize {
            let edge = x == 0 || y == 0 || x == CARD_W as usize - 1 || y == CARD_H as usize - 1;
            let color = if edge { CARD_BORDER } else { CARD_FILL };
            let [hi, lo] = color.to_be_bytes();
            let offset = (y * CARD_W as usize + x) * 2;
            bytes[offset] = hi;
            bytes[offset + 1] = lo;
            x += 1;
        }
        y += 1;
    }
    bytes
}

/// Tick allowance shared across rounds; requests a stop once spent.
pub struct Budget {
    remaining: Cell<u32>,
    stop: &'static StopSignal,
}

impl Budget {
    pub fn new(ticks: u32, stop: &'static StopSignal) -> Self {
        Self {
            remaining: Cell::new(ticks),
            stop,
        }
    }

    fn spend(&self) {
        let remaining = self.remaining.get().saturating_sub(1);
        self.remaining.set(remaining);
        if remaining == 0 {
            self.stop.request();
        }
    }
}

pub struct Table<'a> {
    budget: &'a Budget,
    assets: StaticAssets<'static>,
    card_back: Option<Sprite>,
    hits: u8,
    stood: bool,
    redraw: RedrawFlag,
}

impl<'a> Table<'a> {
    pub fn new(budget: &'a Budget) -> Self {
        Self {
            budget,
            assets: StaticAssets::new(&ASSETS),
            card_back: None,
            hits: 0,
            stood: false,
            redraw: RedrawFlag::new(),
        }
    }

    fn status(&self) -> &'static str {
        match (self.stood, self.hits) {
            (true, _) => "STAND",
            (false, 0) => "LEFT=HIT RIGHT=STAND",
            (false, _) => "HIT",
        }
    }
}

impl<P: Panel> Game<P> for Table<'_> {
    fn update(&mut self, _dt: f32, input: &InputState) {
        self.budget.spend();
        if input.just_pressed(Button::A) {
            self.redraw.request();
        }
    }

    fn draw(&mut self, gfx: &mut Surface<P>) -> GfxResult<P::Error> {
        if self.card_back.is_none() {
            self.card_back = Some(gfx.load_sprite(&mut self.assets, CARD_BACK_PATH, CARD_W, CARD_H)?);
        }

        let (width, height) = (gfx.width(), gfx.height());
        gfx.clear(TABLE_BORDER)?;
        gfx.safe_fill_rect(8, 8, width - 16, height - 16, Rgb565::FELT)?;
        gfx.draw_text(0, 16, "  BLACKJACK", Rgb565::YELLOW, None, 2)?;

        if let Some(card) = &self.card_back {
            for slot in 0..i32::from(self.hits) {
                gfx.draw_sprite(card, 24 + slot * (i32::from(CARD_W) + 4), 120)?;
            }
        }

        let score = score_line(self.hits);
        gfx.draw_text(24, 200, &score, Rgb565::WHITE, None, 1)?;
        gfx.draw_text(24, 240, self.status(), Rgb565::WHITE, Some(Rgb565::FELT), 1)?;

        self.redraw.clear();
        Ok(())
    }

    fn should_redraw(&self) -> bool {
        self.redraw.is_requested()
    }

    fn on_left_pressed(&mut self) {
        if !self.stood && self.hits < MAX_CARDS {
            self.hits += 1;
            self.redraw.request();
        }
    }

    fn on_right_pressed(&mut self) {
        self.stood = true;
        self.redraw.request();
    }
}

fn score_line(hits: u8) -> String<SCORE_BYTES> {
    let mut line = String::new();
    if write!(line, "{SCORE_PREFIX}{hits}").is_err() {
        warn!("demo: score line truncated at {SCORE_BYTES} bytes");
    }
    line
}

/// Input replayed by the simulator: two hits, a stand, a double tap on up,
/// then one more hit in the new round.
pub fn script() -> Vec<ButtonLevels> {
    let idle = ButtonLevels::RELEASED;
    let left = idle.with(Button::Left, true);
    let right = idle.with(Button::Right, true);
    let up = idle.with(Button::Up, true);

    let mut script = vec![idle; 5];
    script.extend([left, idle, idle, left, idle, idle]);
    script.extend([right, idle, idle, idle]);
    script.extend([up, idle, up, idle, idle]);
    script.extend([left, idle]);
    script
}

#[cfg(test)]
mod tests {
    use pocketplay_core::gfx::EmulatedPanel;

    use super::*;

    static STOP: StopSignal = StopSignal::new();

    #[test]
    fn hits_deal_card_sprites() {
        let budget = Budget::new(100, &STOP);
        let mut table = Table::new(&budget);
        let mut gfx = Surface::new(EmulatedPanel::new(240, 320));

        Game::<EmulatedPanel>::on_left_pressed(&mut table);
        Game::<EmulatedPanel>::on_left_pressed(&mut table);
        table.draw(&mut gfx).unwrap();

        let panel = gfx.panel();
        assert_eq!(panel.pixel(24, 120), Some(CARD_BORDER));
        assert_eq!(panel.pixel(25, 121), Some(CARD_FILL));
        assert_eq!(panel.pixel(48, 120), Some(CARD_BORDER));
        assert_eq!(panel.pixel(72, 121), Some(Rgb565::FELT));
        assert!(!Game::<EmulatedPanel>::should_redraw(&table));
    }

    #[test]
    fn standing_stops_dealing() {
        let budget = Budget::new(100, &STOP);
        let mut table = Table::new(&budget);

        Game::<EmulatedPanel>::on_right_pressed(&mut table);
        Game::<EmulatedPanel>::on_left_pressed(&mut table);
        assert_eq!(table.hits, 0);
        assert_eq!(table.status(), "STAND");
    }

    #[test]
    fn score_line_fits_any_hit_count() {
        assert_eq!(score_line(MAX_CARDS).as_str(), "CARDS 8");
        assert_eq!(score_line(u8::MAX).as_str(), "CARDS 255");
    }
}
