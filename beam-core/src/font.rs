//! Glyph table and built-in font
//!
//! A glyph is a run of display columns (bit 0 = top LED) closed by
//! [`GLYPH_END`]. Glyphs are looked up by font row: rows 0-64 cover ASCII
//! 32-96, rows 65-68 hold the German umlauts and sharp s.

/// Glyph terminator
pub const GLYPH_END: u8 = 0xFF;

/// Lead byte of the two-byte Latin-1 supplement sequences, skipped
pub const UTF8_LEAD: u8 = 0xC3;

/// First ASCII value with a font row
pub const FIRST_PRINTABLE: u8 = 32;

/// Last ASCII value with a font row (after uppercase folding)
pub const LAST_PRINTABLE: u8 = 96;

/// Blank glyph, used for anything unknown
pub const ROW_BLANK: usize = 0;
/// A umlaut
pub const ROW_A_UMLAUT: usize = 65;
/// O umlaut
pub const ROW_O_UMLAUT: usize = 66;
/// U umlaut
pub const ROW_U_UMLAUT: usize = 67;
/// Sharp s
pub const ROW_SHARP_S: usize = 68;

/// Number of rows in [`BEAM_FONT`]
pub const FONT_ROWS: usize = 69;

/// Source of glyph columns
pub trait GlyphTable {
    /// Raw font row, terminator included
    fn row(&self, index: usize) -> &[u8];

    /// Glyph columns of a row, up to the terminator
    fn glyph(&self, index: usize) -> &[u8] {
        let row = self.row(index);
        let end = row.iter().position(|&c| c == GLYPH_END).unwrap_or(row.len());
        &row[..end]
    }
}

/// Font backed by a table of rows
#[derive(Debug, Clone, Copy)]
pub struct Font<'a> {
    rows: &'a [&'a [u8]],
}

impl<'a> Font<'a> {
    /// Wrap a row table
    pub const fn new(rows: &'a [&'a [u8]]) -> Self {
        Self { rows }
    }

    /// Number of rows
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no rows
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl GlyphTable for Font<'_> {
    /// Rows past the end fall back to the blank row
    fn row(&self, index: usize) -> &[u8] {
        self.rows
            .get(index)
            .or_else(|| self.rows.get(ROW_BLANK))
            .copied()
            .unwrap_or(&[])
    }
}

/// What a text byte turns into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resolved {
    /// Place the glyph at this font row
    Glyph(usize),
    /// Emit nothing
    Skip,
}

/// Map one text byte to a font row
pub fn resolve_byte(byte: u8) -> Resolved {
    let folded = byte.to_ascii_uppercase();
    match folded {
        FIRST_PRINTABLE..=LAST_PRINTABLE => Resolved::Glyph(usize::from(folded - FIRST_PRINTABLE)),
        UTF8_LEAD => Resolved::Skip,
        0x84 | 0xA4 => Resolved::Glyph(ROW_A_UMLAUT),
        0x96 | 0xB6 => Resolved::Glyph(ROW_O_UMLAUT),
        0x9C | 0xBC => Resolved::Glyph(ROW_U_UMLAUT),
        0x9F => Resolved::Glyph(ROW_SHARP_S),
        _ => Resolved::Glyph(ROW_BLANK),
    }
}

#[rustfmt::skip]
static BEAM_ROWS: [&[u8]; FONT_ROWS] = [
    &[0x00, 0x00, 0x00, 0xFF],                   // space
    &[0x17, 0x00, 0xFF],                         // !
    &[0x03, 0x00, 0x03, 0x00, 0xFF],             // "
    &[0x0A, 0x1F, 0x0A, 0x1F, 0x0A, 0x00, 0xFF], // #
    &[0x12, 0x15, 0x1F, 0x15, 0x09, 0x00, 0xFF], // $
    &[0x13, 0x08, 0x04, 0x02, 0x19, 0x00, 0xFF], // %
    &[0x0A, 0x15, 0x0A, 0x10, 0x00, 0xFF],       // &
    &[0x03, 0x00, 0xFF],                         // '
    &[0x0E, 0x11, 0x00, 0xFF],                   // (
    &[0x11, 0x0E, 0x00, 0xFF],                   // )
    &[0x0A, 0x04, 0x0A, 0x00, 0xFF],             // *
    &[0x04, 0x0E, 0x04, 0x00, 0xFF],             // +
    &[0x10, 0x08, 0x00, 0xFF],                   // ,
    &[0x04, 0x04, 0x04, 0x00, 0xFF],             // -
    &[0x10, 0x00, 0xFF],                         // .
    &[0x18, 0x04, 0x03, 0x00, 0xFF],             // /
    &[0x0E, 0x11, 0x11, 0x0E, 0x00, 0xFF],       // 0
    &[0x12, 0x1F, 0x10, 0x00, 0xFF],             // 1
    &[0x19, 0x15, 0x15, 0x12, 0x00, 0xFF],       // 2
    &[0x11, 0x15, 0x15, 0x0A, 0x00, 0xFF],       // 3
    &[0x07, 0x04, 0x04, 0x1F, 0x00, 0xFF],       // 4
    &[0x17, 0x15, 0x15, 0x09, 0x00, 0xFF],       // 5
    &[0x0E, 0x15, 0x15, 0x08, 0x00, 0xFF],       // 6
    &[0x01, 0x19, 0x05, 0x03, 0x00, 0xFF],       // 7
    &[0x0A, 0x15, 0x15, 0x0A, 0x00, 0xFF],       // 8
    &[0x02, 0x15, 0x15, 0x0E, 0x00, 0xFF],       // 9
    &[0x0A, 0x00, 0xFF],                         // :
    &[0x10, 0x0A, 0x00, 0xFF],                   // ;
    &[0x04, 0x0A, 0x11, 0x00, 0xFF],             // <
    &[0x0A, 0x0A, 0x0A, 0x00, 0xFF],             // =
    &[0x11, 0x0A, 0x04, 0x00, 0xFF],             // >
    &[0x01, 0x15, 0x05, 0x02, 0x00, 0xFF],       // ?
    &[0x0E, 0x11, 0x15, 0x16, 0x00, 0xFF],       // @
    &[0x1E, 0x05, 0x05, 0x1E, 0x00, 0xFF],       // A
    &[0x1F, 0x15, 0x15, 0x0A, 0x00, 0xFF],       // B
    &[0x0E, 0x11, 0x11, 0x11, 0x00, 0xFF],       // C
    &[0x1F, 0x11, 0x11, 0x0E, 0x00, 0xFF],       // D
    &[0x1F, 0x15, 0x15, 0x11, 0x00, 0xFF],       // E
    &[0x1F, 0x05, 0x05, 0x01, 0x00, 0xFF],       // F
    &[0x0E, 0x11, 0x15, 0x1D, 0x00, 0xFF],       // G
    &[0x1F, 0x04, 0x04, 0x1F, 0x00, 0xFF],       // H
    &[0x11, 0x1F, 0x11, 0x00, 0xFF],             // I
    &[0x08, 0x10, 0x10, 0x0F, 0x00, 0xFF],       // J
    &[0x1F, 0x04, 0x0A, 0x11, 0x00, 0xFF],       // K
    &[0x1F, 0x10, 0x10, 0x10, 0x00, 0xFF],       // L
    &[0x1F, 0x02, 0x04, 0x02, 0x1F, 0x00, 0xFF], // M
    &[0x1F, 0x02, 0x04, 0x08, 0x1F, 0x00, 0xFF], // N
    &[0x0E, 0x11, 0x11, 0x0E, 0x00, 0xFF],       // O
    &[0x1F, 0x05, 0x05, 0x02, 0x00, 0xFF],       // P
    &[0x0E, 0x11, 0x09, 0x16, 0x00, 0xFF],       // Q
    &[0x1F, 0x05, 0x0D, 0x12, 0x00, 0xFF],       // R
    &[0x12, 0x15, 0x15, 0x09, 0x00, 0xFF],       // S
    &[0x01, 0x01, 0x1F, 0x01, 0x01, 0x00, 0xFF], // T
    &[0x0F, 0x10, 0x10, 0x0F, 0x00, 0xFF],       // U
    &[0x07, 0x08, 0x10, 0x08, 0x07, 0x00, 0xFF], // V
    &[0x0F, 0x10, 0x0C, 0x10, 0x0F, 0x00, 0xFF], // W
    &[0x1B, 0x04, 0x04, 0x1B, 0x00, 0xFF],       // X
    &[0x03, 0x04, 0x18, 0x04, 0x03, 0x00, 0xFF], // Y
    &[0x19, 0x15, 0x13, 0x11, 0x00, 0xFF],       // Z
    &[0x1F, 0x11, 0x00, 0xFF],                   // [
    &[0x03, 0x04, 0x18, 0x00, 0xFF],             // backslash
    &[0x11, 0x1F, 0x00, 0xFF],                   // ]
    &[0x02, 0x01, 0x02, 0x00, 0xFF],             // ^
    &[0x10, 0x10, 0x10, 0x00, 0xFF],             // _
    &[0x01, 0x02, 0x00, 0xFF],                   // `
    &[0x1D, 0x0A, 0x0A, 0x1D, 0x00, 0xFF],       // A umlaut
    &[0x0D, 0x12, 0x12, 0x0D, 0x00, 0xFF],       // O umlaut
    &[0x0D, 0x10, 0x10, 0x0D, 0x00, 0xFF],       // U umlaut
    &[0x1E, 0x01, 0x15, 0x0A, 0x00, 0xFF],       // sharp s
];

/// Built-in 5-row font
pub static BEAM_FONT: Font<'static> = Font::new(&BEAM_ROWS);
