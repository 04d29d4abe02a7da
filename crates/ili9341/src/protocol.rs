//! Wire-level protocol helpers for the ILI9341.

/// Panel width in pixels (portrait, `MADCTL = 0x48`).
pub const WIDTH: u16 = 240;
/// Panel height in pixels.
pub const HEIGHT: u16 = 320;
/// Bytes per RGB565 pixel on the wire.
pub const BYTES_PER_PIXEL: usize = 2;

/// Controller command bytes.
pub mod cmd {
    pub const NOP: u8 = 0x00;
    pub const SWRESET: u8 = 0x01;
    pub const SLPOUT: u8 = 0x11;
    pub const GAMSET: u8 = 0x26;
    pub const DISPOFF: u8 = 0x28;
    pub const DISPON: u8 = 0x29;
    /// Column address set.
    pub const CASET: u8 = 0x2A;
    /// Page (row) address set.
    pub const PASET: u8 = 0x2B;
    /// Memory write.
    pub const RAMWR: u8 = 0x2C;
    /// Memory read.
    pub const RAMRD: u8 = 0x2E;
    /// Memory access control (rotation + color order).
    pub const MADCTL: u8 = 0x36;
    /// Pixel format.
    pub const PIXFMT: u8 = 0x3A;
    pub const FRMCTR1: u8 = 0xB1;
    pub const DFUNCTR: u8 = 0xB6;
    pub const PWCTR1: u8 = 0xC0;
    pub const PWCTR2: u8 = 0xC1;
    pub const VMCTR1: u8 = 0xC5;
    pub const PWCTRB: u8 = 0xCF;
    pub const PWCTRA: u8 = 0xCB;
    pub const GMCTRN1: u8 = 0xE1;
    pub const DTCA: u8 = 0xE8;
    pub const DTCB: u8 = 0xEA;
    pub const PWONSEQ: u8 = 0xED;
    pub const ENABLE3G: u8 = 0xF2;
    pub const PUMPRATIO: u8 = 0xF7;
}

/// One step of the power-on handshake: command, parameter bytes, settle delay.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InitStep {
    pub command: u8,
    pub params: &'static [u8],
    pub settle_ms: u32,
}

impl InitStep {
    const fn new(command: u8, params: &'static [u8]) -> Self {
        Self {
            command,
            params,
            settle_ms: 0,
        }
    }

    const fn settle(command: u8, settle_ms: u32) -> Self {
        Self {
            command,
            params: &[],
            settle_ms,
        }
    }
}

/// Vendor power-on sequence. Order and bytes are fixed.
pub const INIT_SEQUENCE: [InitStep; 19] = [
    InitStep::settle(cmd::SWRESET, 50),
    InitStep::new(cmd::PWCTRB, &[0x00, 0xC1, 0x30]),
    InitStep::new(cmd::PWONSEQ, &[0x64, 0x03, 0x12, 0x81]),
    InitStep::new(cmd::DTCA, &[0x85, 0x00, 0x78]),
    InitStep::new(cmd::PWCTRA, &[0x39, 0x2C, 0x00, 0x34, 0x02]),
    InitStep::new(cmd::PUMPRATIO, &[0x20]),
    InitStep::new(cmd::DTCB, &[0x00, 0x00]),
    // Power control
    InitStep::new(cmd::PWCTR1, &[0x23]),
    InitStep::new(cmd::PWCTR2, &[0x10]),
    // VCOM
    InitStep::new(cmd::VMCTR1, &[0x3E, 0x28]),
    // MX + BGR, portrait 240x320
    InitStep::new(cmd::MADCTL, &[0x48]),
    // 16 bits per pixel
    InitStep::new(cmd::PIXFMT, &[0x55]),
    InitStep::new(cmd::FRMCTR1, &[0x00, 0x18]),
    InitStep::new(cmd::DFUNCTR, &[0x08, 0x82, 0x27]),
    InitStep::new(cmd::ENABLE3G, &[0x00]),
    InitStep::new(cmd::GAMSET, &[0x01]),
    InitStep::new(
        cmd::GMCTRN1,
        &[
            0x00, 0x0E, 0x14, 0x03, 0x11, 0x07, 0x31, 0xC1, 0x48, 0x08, 0x0F, 0x0C, 0x31, 0x36,
            0x0F,
        ],
    ),
    InitStep::settle(cmd::SLPOUT, 120),
    InitStep::settle(cmd::DISPON, 20),
];

/// Encodes an inclusive `[lo, hi]` address range as CASET/PASET parameters.
#[inline]
pub const fn encode_bounds(lo: u16, hi: u16) -> [u8; 4] {
    let lo = lo.to_be_bytes();
    let hi = hi.to_be_bytes();
    [lo[0], lo[1], hi[0], hi[1]]
}

/// Wire bytes for one RGB565 pixel (high byte first).
#[inline]
pub const fn color_bytes(color: u16) -> [u8; BYTES_PER_PIXEL] {
    color.to_be_bytes()
}

/// Builds a chunk of `N` bytes holding repeated copies of `color`.
#[inline]
pub fn color_chunk<const N: usize>(color: u16) -> [u8; N] {
    let bytes = color_bytes(color);
    let mut chunk = [0u8; N];
    for pair in chunk.chunks_exact_mut(BYTES_PER_PIXEL) {
        pair.copy_from_slice(&bytes);
    }
    chunk
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_big_endian_inclusive() {
        assert_eq!(encode_bounds(0, 239), [0x00, 0x00, 0x00, 0xEF]);
        assert_eq!(encode_bounds(0x0102, 0x013F), [0x01, 0x02, 0x01, 0x3F]);
    }

    #[test]
    fn color_is_high_byte_first() {
        assert_eq!(color_bytes(0xF800), [0xF8, 0x00]);
        assert_eq!(color_bytes(0x07E0), [0x07, 0xE0]);
    }

    #[test]
    fn color_chunk_repeats_pixel() {
        let chunk: [u8; 6] = color_chunk(0x1234);
        assert_eq!(chunk, [0x12, 0x34, 0x12, 0x34, 0x12, 0x34]);
    }

    #[test]
    fn init_sequence_brackets_match_vendor_table() {
        assert_eq!(INIT_SEQUENCE[0].command, cmd::SWRESET);
        assert_eq!(INIT_SEQUENCE[0].settle_ms, 50);

        let last_two = &INIT_SEQUENCE[INIT_SEQUENCE.len() - 2..];
        assert_eq!(last_two[0].command, cmd::SLPOUT);
        assert_eq!(last_two[0].settle_ms, 120);
        assert_eq!(last_two[1].command, cmd::DISPON);
        assert_eq!(last_two[1].settle_ms, 20);
    }

    #[test]
    fn pixel_format_and_orientation_are_fixed() {
        let madctl = INIT_SEQUENCE
            .iter()
            .find(|step| step.command == cmd::MADCTL)
            .unwrap();
        assert_eq!(madctl.params, &[0x48]);

        let pixfmt = INIT_SEQUENCE
            .iter()
            .find(|step| step.command == cmd::PIXFMT)
            .unwrap();
        assert_eq!(pixfmt.params, &[0x55]);
    }
}
