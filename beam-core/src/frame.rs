//! Frame buffer encoding
//!
//! A Beam shows 24 columns of 5 LEDs. The chip stores a frame as 12 column
//! registers, each holding two display columns in its low 10 bits:
//!
//! ```text
//!  register j:  bits 9..5 = column 2j+1   bits 4..0 = column 2j
//! ```
//!
//! Frames come from two sources: glyph columns packed by the text layout,
//! and row-major animation bitmaps that have to be transposed into the
//! register layout.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Frames per chip
pub const FRAME_COUNT: usize = 36;

/// Column registers per frame
pub const COLUMN_REGISTERS: usize = 12;

/// Display columns per frame
pub const COLUMNS_PER_FRAME: usize = COLUMN_REGISTERS * 2;

/// Significant bits of a display column
pub const COLUMN_MASK: u8 = 0x1F;

/// Significant bits of a column register
pub const REGISTER_MASK: u16 = 0x3FF;

/// Bytes in one animation bitmap
pub const BITMAP_ROWS: usize = 15;

/// One row-major animation frame, 8 LEDs per byte
pub type AnimationBitmap = [u8; BITMAP_ROWS];

/// Row masks selecting source bits, most significant first
const ROW_MASK: [u8; 8] = [0x80, 0x40, 0x20, 0x10, 0x08, 0x04, 0x02, 0x01];

/// Column registers for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrameRegisters([u16; COLUMN_REGISTERS]);

impl FrameRegisters {
    /// All LEDs off
    pub const fn blank() -> Self {
        Self([0; COLUMN_REGISTERS])
    }

    /// Wrap raw register values
    pub const fn from_registers(registers: [u16; COLUMN_REGISTERS]) -> Self {
        Self(registers)
    }

    /// Pack 24 display columns, two per register
    pub fn from_columns(columns: &[u8; COLUMNS_PER_FRAME]) -> Self {
        let mut registers = [0u16; COLUMN_REGISTERS];
        for (register, pair) in registers.iter_mut().zip(columns.chunks_exact(2)) {
            *register = u16::from(pair[0] & COLUMN_MASK) | u16::from(pair[1] & COLUMN_MASK) << 5;
        }
        Self(registers)
    }

    /// Unpack the 24 display columns
    pub fn to_columns(&self) -> [u8; COLUMNS_PER_FRAME] {
        let mut columns = [0u8; COLUMNS_PER_FRAME];
        for (pair, &register) in columns.chunks_exact_mut(2).zip(self.0.iter()) {
            pair[0] = (register & u16::from(COLUMN_MASK)) as u8;
            pair[1] = ((register >> 5) & u16::from(COLUMN_MASK)) as u8;
        }
        columns
    }

    /// Transpose an animation bitmap into a blank frame
    pub fn from_bitmap(bitmap: &AnimationBitmap) -> Self {
        let mut frame = Self::blank();
        frame.overlay_bitmap(bitmap);
        frame
    }

    /// OR an animation bitmap into the registers
    ///
    /// Registers are not cleared first. Three passes fill registers 0-3,
    /// 4-7 and 8-11; pass `p` walks source rows `p, p+3, ...` and wraps once
    /// the row index passes `12 + p`. Within a pass, output bit `10 - y`
    /// takes source bit `7 - (2k + i)`, where `i` switches from the upper
    /// to the lower half of the 10-row band at `y < 6`. Existing animation
    /// assets depend on this exact walk.
    pub fn overlay_bitmap(&mut self, bitmap: &AnimationBitmap) {
        for pass in 0..3 {
            let wrap = 12 + pass;
            let mut row = pass;
            for y in (1..=10u32).rev() {
                let half = usize::from(y < 6);
                let source = bitmap[row];
                for k in 0..4 {
                    let mask = ROW_MASK[2 * k + half];
                    let shift = (3 + 2 * k + half) as u32;
                    let bit = (u32::from(source & mask) << shift) >> y;
                    self.0[4 * pass + k] |= bit as u16;
                }
                row += 3;
                if row > wrap {
                    row = pass;
                }
            }
        }
    }

    /// Turn every LED off
    pub fn clear(&mut self) {
        self.0 = [0; COLUMN_REGISTERS];
    }

    /// True when no LED is lit
    pub fn is_blank(&self) -> bool {
        self.0.iter().all(|&r| r & REGISTER_MASK == 0)
    }

    /// Raw register values
    pub fn registers(&self) -> &[u16; COLUMN_REGISTERS] {
        &self.0
    }

    /// `(offset, value)` pairs written to a frame section
    ///
    /// Register `j` goes out as offset `2j` (bits 7..0) and `2j + 1`
    /// (bits 9..8).
    pub fn register_bytes(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.0.iter().enumerate().flat_map(|(j, &register)| {
            let offset = (j * 2) as u8;
            [
                (offset, (register & 0xFF) as u8),
                (offset + 1, ((register & 0x300) >> 8) as u8),
            ]
        })
    }
}

/// Glyph columns collected until a frame is full
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnAccumulator {
    columns: [u8; COLUMNS_PER_FRAME],
    len: usize,
}

impl Default for ColumnAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnAccumulator {
    /// Empty accumulator
    pub const fn new() -> Self {
        Self {
            columns: [0; COLUMNS_PER_FRAME],
            len: 0,
        }
    }

    /// Append a column, returning `false` when full
    pub fn push(&mut self, column: u8) -> bool {
        match self.columns.get_mut(self.len) {
            Some(slot) => {
                *slot = column;
                self.len += 1;
                true
            }
            None => false,
        }
    }

    /// Columns collected so far
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no column was collected
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True when a frame's worth of columns was collected
    pub fn is_full(&self) -> bool {
        self.len == COLUMNS_PER_FRAME
    }

    /// All slots; unfilled slots are blank
    pub fn columns(&self) -> &[u8; COLUMNS_PER_FRAME] {
        &self.columns
    }

    /// Encode the collected columns
    pub fn encode(&self) -> FrameRegisters {
        FrameRegisters::from_columns(&self.columns)
    }

    /// Drop all collected columns
    pub fn clear(&mut self) {
        self.columns = [0; COLUMNS_PER_FRAME];
        self.len = 0;
    }

    /// Encode and clear
    pub fn take(&mut self) -> FrameRegisters {
        let frame = self.encode();
        self.clear();
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_from_columns_packs_pairs() {
        let mut columns = [0u8; COLUMNS_PER_FRAME];
        columns[0] = 0x1E;
        columns[1] = 0x05;
        columns[23] = 0x1F;
        let frame = FrameRegisters::from_columns(&columns);

        assert_eq!(frame.registers()[0], 0x1E | 0x05 << 5);
        assert_eq!(frame.registers()[11], 0x1F << 5);
        assert_eq!(frame.registers()[1..11], [0; 10]);
    }

    #[test]
    fn test_from_columns_masks_to_five_bits() {
        let columns = [0xFF; COLUMNS_PER_FRAME];
        let frame = FrameRegisters::from_columns(&columns);
        assert!(frame.registers().iter().all(|&r| r == REGISTER_MASK));
    }

    #[test]
    fn test_register_bytes_split() {
        let frame = FrameRegisters::from_registers([0x3A5, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x100]);
        let bytes: heapless::Vec<(u8, u8), 24> = frame.register_bytes().collect();

        assert_eq!(bytes.len(), 24);
        assert_eq!(bytes[0], (0, 0xA5));
        assert_eq!(bytes[1], (1, 0x03));
        assert_eq!(bytes[2], (2, 0x00));
        assert_eq!(bytes[22], (22, 0x00));
        assert_eq!(bytes[23], (23, 0x01));
    }

    #[test]
    fn test_bitmap_all_on_lights_every_register() {
        let frame = FrameRegisters::from_bitmap(&[0xFF; BITMAP_ROWS]);
        assert!(frame.registers().iter().all(|&r| r == REGISTER_MASK));
    }

    #[test]
    fn test_bitmap_blank() {
        assert!(FrameRegisters::from_bitmap(&[0; BITMAP_ROWS]).is_blank());
    }

    #[test]
    fn test_bitmap_single_bits() {
        // Row 0 MSB feeds register 0 at y = 10, i.e. bit 0
        let mut bitmap = [0u8; BITMAP_ROWS];
        bitmap[0] = 0x80;
        let frame = FrameRegisters::from_bitmap(&bitmap);
        assert_eq!(frame.registers()[0], 0x001);
        assert!(frame.registers()[1..].iter().all(|&r| r == 0));

        // Row 0 bit 6 feeds register 0 in the lower band at y = 5, bit 5
        bitmap[0] = 0x40;
        let frame = FrameRegisters::from_bitmap(&bitmap);
        assert_eq!(frame.registers()[0], 0x020);

        // Row 12 LSB: pass 0, k = 3, lower band, fifth row read at y = 1
        let mut bitmap = [0u8; BITMAP_ROWS];
        bitmap[12] = 0x01;
        let frame = FrameRegisters::from_bitmap(&bitmap);
        assert_eq!(frame.registers()[3], 0x200);

        // Row 14 MSB: pass 2, register 8, upper band at y = 6, bit 4
        let mut bitmap = [0u8; BITMAP_ROWS];
        bitmap[14] = 0x80;
        let frame = FrameRegisters::from_bitmap(&bitmap);
        assert_eq!(frame.registers()[8], 0x010);
    }

    #[test]
    fn test_bitmap_passes_read_own_rows() {
        // Row 1 only feeds the second pass
        let mut bitmap = [0u8; BITMAP_ROWS];
        bitmap[1] = 0xFF;
        let frame = FrameRegisters::from_bitmap(&bitmap);
        let regs = frame.registers();
        assert!(regs[0..4].iter().all(|&r| r == 0));
        assert!(regs[4..8].iter().all(|&r| r == 0x021));
        assert!(regs[8..12].iter().all(|&r| r == 0));
    }

    #[test]
    fn test_overlay_does_not_clear() {
        let mut frame = FrameRegisters::from_registers([0x200; COLUMN_REGISTERS]);
        let mut bitmap = [0u8; BITMAP_ROWS];
        bitmap[0] = 0x80;
        frame.overlay_bitmap(&bitmap);
        assert_eq!(frame.registers()[0], 0x201);
        assert_eq!(frame.registers()[1], 0x200);
    }

    #[test]
    fn test_accumulator_fills_and_takes() {
        let mut acc = ColumnAccumulator::new();
        for i in 0..COLUMNS_PER_FRAME {
            assert!(acc.push(i as u8 & COLUMN_MASK));
        }
        assert!(acc.is_full());
        assert!(!acc.push(1));

        let frame = acc.take();
        assert!(acc.is_empty());
        assert_eq!(acc.columns(), &[0; COLUMNS_PER_FRAME]);
        assert_eq!(frame.to_columns()[5], 5);
    }

    proptest! {
        #[test]
        fn prop_column_round_trip(columns in prop::array::uniform24(any::<u8>())) {
            let frame = FrameRegisters::from_columns(&columns);
            let decoded = frame.to_columns();
            for (original, back) in columns.iter().zip(decoded.iter()) {
                prop_assert_eq!(original & COLUMN_MASK, *back);
            }
            prop_assert!(frame.registers().iter().all(|&r| r <= REGISTER_MASK));
        }

        #[test]
        fn prop_bitmap_bits_within_mask(bitmap in prop::array::uniform15(any::<u8>())) {
            let frame = FrameRegisters::from_bitmap(&bitmap);
            prop_assert!(frame.registers().iter().all(|&r| r <= REGISTER_MASK));
        }

        #[test]
        fn prop_bitmap_popcount_of_used_rows(bitmap in prop::array::uniform15(any::<u8>())) {
            // Every pass reads five rows twice: the upper band takes even
            // bit positions, the lower band odd ones, so each source bit
            // lands exactly once.
            let frame = FrameRegisters::from_bitmap(&bitmap);
            let lit: u32 = frame.registers().iter().map(|r| r.count_ones()).sum();
            let source: u32 = bitmap.iter().map(|b| b.count_ones()).sum();
            prop_assert_eq!(lit, source);
        }
    }
}
