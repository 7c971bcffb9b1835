//! Chip addresses and chip groups
//!
//! Up to four Beams share one bus. Their addresses are fixed by hardware and
//! the order of [`BEAM_ADDRESSES`] is the physical left-to-right order of a
//! chain.

use heapless::Vec;

use crate::error::ConfigError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum number of chained Beams
pub const MAX_CHIPS: usize = 4;

/// Bus addresses in chain order (A, B, C, D)
pub const BEAM_ADDRESSES: [u8; MAX_CHIPS] = [0x36, 0x34, 0x30, 0x37];

/// Bus address of one Beam
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8"))]
pub struct ChipAddress(u8);

impl ChipAddress {
    /// First unit in a chain, and the default for single-unit use
    pub const A: Self = Self(BEAM_ADDRESSES[0]);
    /// Second unit
    pub const B: Self = Self(BEAM_ADDRESSES[1]);
    /// Third unit
    pub const C: Self = Self(BEAM_ADDRESSES[2]);
    /// Fourth unit
    pub const D: Self = Self(BEAM_ADDRESSES[3]);

    /// Look up a raw address, accepting only the four Beam addresses
    pub fn new(raw: u8) -> Option<Self> {
        BEAM_ADDRESSES.contains(&raw).then_some(Self(raw))
    }

    /// Address at a chain position (0-3)
    pub fn at_position(position: usize) -> Option<Self> {
        BEAM_ADDRESSES.get(position).copied().map(Self)
    }

    /// Raw 7-bit bus address
    pub const fn raw(self) -> u8 {
        self.0
    }
}

impl Default for ChipAddress {
    fn default() -> Self {
        Self::A
    }
}

impl TryFrom<u8> for ChipAddress {
    type Error = ConfigError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or(ConfigError::Address(raw))
    }
}

/// How the chips of a group relate to each other
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GroupMode {
    /// Independent chips acting as one long display
    Chained,
    /// One unit addressed on its own
    Single {
        /// Caller-supplied sync mode, kept for the caller
        sync_mode: u8,
    },
}

/// Ordered set of 1-4 chips driven together
///
/// The order is the physical chain order. A [`GroupMode::Single`] group
/// always holds exactly one chip.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "GroupRecord"))]
pub struct ChipGroup {
    chips: Vec<ChipAddress, MAX_CHIPS>,
    mode: GroupMode,
}

/// Unchecked wire form of a [`ChipGroup`]
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct GroupRecord {
    chips: Vec<ChipAddress, MAX_CHIPS>,
    mode: GroupMode,
}

#[cfg(feature = "serde")]
impl TryFrom<GroupRecord> for ChipGroup {
    type Error = ConfigError;

    fn try_from(record: GroupRecord) -> Result<Self, Self::Error> {
        Self::from_parts(&record.chips, record.mode)
    }
}

impl ChipGroup {
    /// Chain of `count` Beams starting at address A
    ///
    /// An out-of-range count is replaced by a single Beam.
    pub fn chained(count: u8) -> Self {
        Self::try_chained(count).unwrap_or_else(|e| {
            warn!("Number of Beams must be between 1 and 4: {:?} (default to 1 Beam)", e);
            Self::chain_of(1)
        })
    }

    /// Chain of `count` Beams, rejecting an out-of-range count
    pub fn try_chained(count: u8) -> Result<Self, ConfigError> {
        if count == 0 || usize::from(count) > MAX_CHIPS {
            return Err(ConfigError::GroupSize(count));
        }
        Ok(Self::chain_of(usize::from(count)))
    }

    /// One Beam at a raw address
    ///
    /// An unknown address is replaced by address A.
    pub fn single(raw_address: u8, sync_mode: u8) -> Self {
        let address = ChipAddress::try_from(raw_address).unwrap_or_else(|e| {
            warn!("Not a valid Beam address: {:?} (default to Beam A)", e);
            ChipAddress::A
        });
        Self::single_at(address, sync_mode)
    }

    /// One Beam at a known address
    pub fn single_at(address: ChipAddress, sync_mode: u8) -> Self {
        let mut chips = Vec::new();
        // Capacity is MAX_CHIPS, one push always fits
        let _ = chips.push(address);
        Self {
            chips,
            mode: GroupMode::Single { sync_mode },
        }
    }

    /// Rebuild a group from its chips and mode
    ///
    /// A chained group must be the first `n` chain addresses in order, with
    /// `n` in 1-4. A single group must hold exactly one chip.
    pub fn from_parts(chips: &[ChipAddress], mode: GroupMode) -> Result<Self, ConfigError> {
        let count = u8::try_from(chips.len()).unwrap_or(u8::MAX);
        match mode {
            GroupMode::Chained => {
                let group = Self::try_chained(count)?;
                match chips.iter().zip(group.chips()).find(|(got, want)| got != want) {
                    Some((got, _)) => Err(ConfigError::Address(got.raw())),
                    None => Ok(group),
                }
            }
            GroupMode::Single { sync_mode } => match *chips {
                [address] => Ok(Self::single_at(address, sync_mode)),
                _ => Err(ConfigError::GroupSize(count)),
            },
        }
    }

    fn chain_of(count: usize) -> Self {
        let chips = BEAM_ADDRESSES
            .iter()
            .take(count)
            .copied()
            .map(ChipAddress)
            .collect();
        Self {
            chips,
            mode: GroupMode::Chained,
        }
    }

    /// Chips in chain order
    pub fn chips(&self) -> &[ChipAddress] {
        &self.chips
    }

    /// Number of chips (1-4)
    pub fn size(&self) -> u8 {
        // Bounded by MAX_CHIPS
        self.chips.len() as u8
    }

    /// Chip at a chain index
    pub fn get(&self, index: usize) -> Option<ChipAddress> {
        self.chips.get(index).copied()
    }

    /// Group mode
    pub fn mode(&self) -> GroupMode {
        self.mode
    }

    /// True for chained groups
    pub fn is_chained(&self) -> bool {
        self.mode == GroupMode::Chained
    }

    /// True when more than one chip must be kept in sync
    pub fn needs_sync(&self) -> bool {
        self.is_chained() && self.chips.len() > 1
    }
}

impl Default for ChipGroup {
    fn default() -> Self {
        Self::chain_of(1)
    }
}
