//! Board-agnostic core of the Beam LED matrix driver
//!
//! Everything here is pure data transformation and can be tested on the
//! host:
//!
//! - [`address`]: chip addresses and chip groups
//! - [`registers`]: register map and typed register records
//! - [`frame`]: column and bitmap encoding into frame registers
//! - [`font`]: glyph table and the built-in font
//! - [`layout`]: text to frames
//! - [`chain`]: slot offsets, start chip, sync roles and the start cascade
//! - [`playback`]: playback configuration and its presets
//!
//! The bus side lives in `beam-drivers`.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod address;
pub mod chain;
pub mod error;
pub mod font;
pub mod frame;
pub mod layout;
pub mod playback;
pub mod registers;

pub use address::{ChipAddress, ChipGroup, GroupMode, BEAM_ADDRESSES, MAX_CHIPS};
pub use chain::{Cascade, CascadeStatus, RenderKind};
pub use error::ConfigError;
pub use font::{Font, GlyphTable, BEAM_FONT};
pub use frame::{AnimationBitmap, FrameRegisters, FRAME_COUNT};
pub use layout::{FlushKind, TextFrame, TextLayout};
pub use playback::{BeamMode, PlaybackConfig, ScrollDirection};
pub use registers::{CurrentSource, Section, Shutdown, SyncRole};
