//! Text layout
//!
//! Turns a byte string into a sequence of encoded frames. Glyph columns are
//! collected in a [`RenderContext`] and flushed whenever a frame is full;
//! the rest of a glyph that did not fit wraps into the next frame. The end
//! of the input always flushes once more, so the last frame may be partly
//! or fully blank. A trailing lone `0xC3` lead byte still gets that flush.
//!
//! ```text
//!  Scanning --24 columns--> FrameFull --carry--> WrapContinuation
//!     |                                               |
//!     +--end of input--> EndOfString --> Done <-------+
//! ```

use crate::font::{resolve_byte, GlyphTable, Resolved};
use crate::frame::{ColumnAccumulator, FrameRegisters, FRAME_COUNT};

/// Why a frame was emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlushKind {
    /// All 24 columns were used
    FrameFull,
    /// The input ended
    EndOfString,
}

/// One laid-out frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TextFrame {
    /// Logical frame index
    pub index: usize,
    /// Encoded registers
    pub registers: FrameRegisters,
    /// Flush trigger
    pub kind: FlushKind,
}

/// Accumulator and frame cursor for one render call
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderContext {
    accumulator: ColumnAccumulator,
    frame: usize,
}

impl RenderContext {
    /// Empty context starting at a logical frame
    pub const fn starting_at(frame: usize) -> Self {
        Self {
            accumulator: ColumnAccumulator::new(),
            frame,
        }
    }

    /// Current logical frame
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Columns waiting for the next flush
    pub fn accumulator(&self) -> &ColumnAccumulator {
        &self.accumulator
    }

    /// Move as many columns as fit, returning the rest
    fn fill<'g>(&mut self, mut columns: &'g [u8]) -> &'g [u8] {
        while let Some((&column, rest)) = columns.split_first() {
            if !self.accumulator.push(column) {
                break;
            }
            columns = rest;
        }
        columns
    }

    fn flush(&mut self, kind: FlushKind) -> TextFrame {
        TextFrame {
            index: self.frame,
            registers: self.accumulator.take(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Scanning,
    EndOfString,
    Done,
}

/// Iterator over the frames of a string
pub struct TextLayout<'a, G: GlyphTable + ?Sized> {
    font: &'a G,
    text: &'a [u8],
    position: usize,
    /// Columns of the current glyph not yet placed
    carry: &'a [u8],
    context: RenderContext,
    /// Stop after the first full frame
    single_frame: bool,
    state: State,
}

impl<'a, G: GlyphTable + ?Sized> TextLayout<'a, G> {
    /// Lay out `text` from frame 0 up to the frame capacity
    pub fn new(font: &'a G, text: &'a [u8]) -> Self {
        Self::starting_at(font, 0, false, text)
    }

    /// Lay out `text` starting at `target`
    ///
    /// A non-zero target stops after the first completed frame; target 0
    /// behaves like [`TextLayout::new`].
    pub fn at_frame(font: &'a G, target: usize, text: &'a [u8]) -> Self {
        Self::starting_at(font, target, target != 0, text)
    }

    fn starting_at(font: &'a G, frame: usize, single_frame: bool, text: &'a [u8]) -> Self {
        Self {
            font,
            text,
            position: 0,
            carry: &[],
            context: RenderContext::starting_at(frame),
            single_frame,
            state: if text.is_empty() {
                State::Done
            } else {
                State::Scanning
            },
        }
    }

    /// Render context as it stands
    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    fn flush_full(&mut self) -> TextFrame {
        let frame = self.context.flush(FlushKind::FrameFull);
        self.context.frame += 1;
        trace!("Frame {} full, {} columns carried", frame.index, self.carry.len());
        if self.single_frame {
            self.state = State::Done;
        }
        frame
    }
}

impl<'a, G: GlyphTable + ?Sized> Iterator for TextLayout<'a, G> {
    type Item = TextFrame;

    fn next(&mut self) -> Option<TextFrame> {
        loop {
            match self.state {
                State::Done => return None,
                State::EndOfString => {
                    self.state = State::Done;
                    if self.context.frame >= FRAME_COUNT {
                        return None;
                    }
                    trace!("End of string in frame {}", self.context.frame);
                    return Some(self.context.flush(FlushKind::EndOfString));
                }
                State::Scanning => {
                    if self.context.frame >= FRAME_COUNT {
                        trace!("Frame capacity reached, dropping remaining text");
                        self.state = State::Done;
                        continue;
                    }

                    if !self.carry.is_empty() {
                        self.carry = self.context.fill(self.carry);
                        if self.context.accumulator.is_full() {
                            return Some(self.flush_full());
                        }
                        continue;
                    }

                    let Some(&byte) = self.text.get(self.position) else {
                        self.state = State::EndOfString;
                        continue;
                    };
                    self.position += 1;

                    match resolve_byte(byte) {
                        Resolved::Skip => {}
                        Resolved::Glyph(row) => {
                            let font: &'a G = self.font;
                            let glyph = font.glyph(row);
                            trace!("Byte {:#x} -> row {}", byte, row);
                            self.carry = self.context.fill(glyph);
                            if self.context.accumulator.is_full() {
                                return Some(self.flush_full());
                            }
                        }
                    }
                }
            }
        }
    }
}
