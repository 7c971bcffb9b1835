//! Beam register map
//!
//! Registers are paged: a write to [`REGISTER_SELECT`] picks a section, and
//! later transactions address registers inside it. Control registers are
//! modelled as small records with a `to_byte`/`from_byte` pair so bit
//! packing lives in one place.

use crate::playback::ScrollDirection;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Section select register
pub const REGISTER_SELECT: u8 = 0xFD;

/// First frame section (frame 0)
pub const FRAME_SECTION_BASE: u8 = 0x01;

/// First blink & PWM section
pub const BLINK_PWM_SECTION_BASE: u8 = 0x40;

/// Number of blink & PWM sections
pub const BLINK_PWM_SETS: u8 = 6;

/// Control register section
pub const CONTROL_SECTION: u8 = 0xC0;

/// Register section (page)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Section {
    /// Frame memory for a physical frame slot
    Frame(u8),
    /// Blink & PWM set (0-5)
    BlinkPwm(u8),
    /// Control registers
    Control,
}

impl Section {
    /// Raw section number written to [`REGISTER_SELECT`]
    ///
    /// Frame slots are not range checked: chained text rendering addresses
    /// slots past the last frame and the chip ignores those sections.
    pub const fn to_byte(self) -> u8 {
        match self {
            Self::Frame(slot) => slot.wrapping_add(FRAME_SECTION_BASE),
            Self::BlinkPwm(set) => BLINK_PWM_SECTION_BASE + (set % BLINK_PWM_SETS),
            Self::Control => CONTROL_SECTION,
        }
    }

    /// Parse a raw section number
    pub fn from_byte(raw: u8) -> Option<Self> {
        match raw {
            CONTROL_SECTION => Some(Self::Control),
            BLINK_PWM_SECTION_BASE..=0x45 => Some(Self::BlinkPwm(raw - BLINK_PWM_SECTION_BASE)),
            FRAME_SECTION_BASE..=0x3F => Some(Self::Frame(raw - FRAME_SECTION_BASE)),
            _ => None,
        }
    }
}

/// Control section register offsets
pub mod ctrl {
    /// Picture display
    pub const PICTURE: u8 = 0x00;
    /// Movie start frame
    pub const MOVIE: u8 = 0x01;
    /// Movie frame count
    pub const MOVIE_MODE: u8 = 0x02;
    /// Frame delay, scroll and fade
    pub const FRAME_TIME: u8 = 0x03;
    /// Loop count and scan limit
    pub const DISPLAY_OPTION: u8 = 0x04;
    /// LED current source
    pub const CURRENT_SOURCE: u8 = 0x05;
    /// Memory configuration
    pub const CONFIG: u8 = 0x06;
    /// Interrupt mask
    pub const IRQ_MASK: u8 = 0x07;
    /// Interrupt frame definition
    pub const IRQ_FRAME: u8 = 0x08;
    /// Shutdown & open/short
    pub const SHUTDOWN: u8 = 0x09;
    /// Clock synchronization
    pub const CLOCK_SYNC: u8 = 0x0B;
    /// Frame progress status (read only)
    pub const FRAME_STATUS: u8 = 0x0F;
}

/// Blink & PWM section layout
pub mod blink_pwm {
    /// First blink register
    pub const BLINK_FIRST: u8 = 0x00;
    /// Last blink register
    pub const BLINK_LAST: u8 = 0x17;
    /// First PWM register
    pub const PWM_FIRST: u8 = 0x18;
    /// Last PWM register
    pub const PWM_LAST: u8 = 0x9B;
    /// Blink disabled
    pub const BLINK_OFF: u8 = 0x00;
    /// Full duty cycle
    pub const PWM_FULL: u8 = 0xFF;
}

/// Memory configuration written at initialization (36 frames, no RAM config)
pub const MEMORY_CONFIG: u8 = 0x01;

/// Scan limit covering all 12 column lines
pub const SCAN_ALL_COLUMNS: u8 = 0x0B;

/// Frame time register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrameTime {
    /// Fade between frames
    pub fade: bool,
    /// Scroll direction
    pub direction: ScrollDirection,
    /// Scrolling enabled
    pub scroll: bool,
    /// Frame delay (0-15)
    pub delay: u8,
}

impl FrameTime {
    /// Movie playback: only the delay is set
    pub const fn movie(delay: u8) -> Self {
        Self {
            fade: false,
            direction: ScrollDirection::Right,
            scroll: false,
            delay,
        }
    }

    /// Raw register value
    pub const fn to_byte(self) -> u8 {
        (self.fade as u8) << 7
            | (self.direction as u8) << 6
            | (self.scroll as u8) << 4
            | (self.delay & 0x0F)
    }

    /// Parse a raw register value
    pub const fn from_byte(raw: u8) -> Self {
        Self {
            fade: raw & 0x80 != 0,
            direction: if raw & 0x40 != 0 {
                ScrollDirection::Left
            } else {
                ScrollDirection::Right
            },
            scroll: raw & 0x10 != 0,
            delay: raw & 0x0F,
        }
    }
}

/// Display option register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayOption {
    /// Movie loop count (0-7, 7 = endless)
    pub loops: u8,
    /// Slow blink frequency
    pub blink_slow: bool,
    /// Last scanned column line
    pub scan_limit: u8,
}

impl DisplayOption {
    /// All column lines scanned, fast blink
    pub const fn with_loops(loops: u8) -> Self {
        Self {
            loops,
            blink_slow: false,
            scan_limit: SCAN_ALL_COLUMNS,
        }
    }

    /// Raw register value
    pub const fn to_byte(self) -> u8 {
        (self.loops & 0x07) << 5 | (self.blink_slow as u8) << 4 | (self.scan_limit & 0x0F)
    }

    /// Parse a raw register value
    pub const fn from_byte(raw: u8) -> Self {
        Self {
            loops: raw >> 5,
            blink_slow: raw & 0x10 != 0,
            scan_limit: raw & 0x0F,
        }
    }
}

/// Movie register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Movie {
    /// Movie playback enabled
    pub enabled: bool,
    /// First frame played
    pub start_frame: u8,
}

impl Movie {
    /// Raw register value
    pub const fn to_byte(self) -> u8 {
        (self.enabled as u8) << 6 | (self.start_frame & 0x3F)
    }

    /// Parse a raw register value
    pub const fn from_byte(raw: u8) -> Self {
        Self {
            enabled: raw & 0x40 != 0,
            start_frame: raw & 0x3F,
        }
    }
}

/// Movie mode register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MovieMode {
    /// Number of frames in the movie
    pub frame_count: u8,
}

impl MovieMode {
    /// Raw register value
    pub const fn to_byte(self) -> u8 {
        self.frame_count & 0x3F
    }

    /// Parse a raw register value
    pub const fn from_byte(raw: u8) -> Self {
        Self {
            frame_count: raw & 0x3F,
        }
    }
}

/// Picture register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Picture {
    /// Picture display enabled
    pub enabled: bool,
    /// Frame shown
    pub frame: u8,
}

impl Picture {
    /// Raw register value
    pub const fn to_byte(self) -> u8 {
        (self.enabled as u8) << 6 | (self.frame & 0x3F)
    }

    /// Parse a raw register value
    pub const fn from_byte(raw: u8) -> Self {
        Self {
            enabled: raw & 0x40 != 0,
            frame: raw & 0x3F,
        }
    }
}

/// Shutdown register values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Shutdown {
    /// Initialized but not running
    Standby = 0x02,
    /// Normal operation
    Run = 0x03,
}

impl Shutdown {
    /// Raw register value
    pub const fn to_byte(self) -> u8 {
        self as u8
    }

    /// Parse a raw register value
    pub const fn from_byte(raw: u8) -> Option<Self> {
        match raw {
            0x02 => Some(Self::Standby),
            0x03 => Some(Self::Run),
            _ => None,
        }
    }
}

/// Clock synchronization role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncRole {
    /// Takes its clock from the sync line
    Follower = 0x01,
    /// Drives the sync line
    Source = 0x02,
}

impl SyncRole {
    /// Raw register value
    pub const fn to_byte(self) -> u8 {
        self as u8
    }

    /// Parse a raw register value
    pub const fn from_byte(raw: u8) -> Option<Self> {
        match raw {
            0x01 => Some(Self::Follower),
            0x02 => Some(Self::Source),
            _ => None,
        }
    }
}

/// LED current source level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CurrentSource(pub u8);

impl CurrentSource {
    /// Level for a group size
    ///
    /// Larger chains share the supply, so each chip gets less current. The
    /// 2-chip level does not follow the other steps; it matches the units in
    /// the field and is kept as is.
    pub const fn for_group_size(size: u8) -> Self {
        Self(match size {
            1 => 0x20,
            2 => 0x15,
            3 => 0x10,
            4 => 0x08,
            _ => 0x00,
        })
    }

    /// Raw register value
    pub const fn to_byte(self) -> u8 {
        self.0
    }
}

/// Frame progress status register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameStatus {
    /// Frame currently displayed
    pub frame: u8,
}

impl FrameStatus {
    /// Parse a raw register value
    pub const fn from_byte(raw: u8) -> Self {
        Self { frame: raw >> 2 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_bytes() {
        assert_eq!(Section::Frame(0).to_byte(), 0x01);
        assert_eq!(Section::Frame(35).to_byte(), 0x24);
        assert_eq!(Section::BlinkPwm(5).to_byte(), 0x45);
        assert_eq!(Section::Control.to_byte(), 0xC0);

        assert_eq!(Section::from_byte(0x01), Some(Section::Frame(0)));
        assert_eq!(Section::from_byte(0x42), Some(Section::BlinkPwm(2)));
        assert_eq!(Section::from_byte(0xC0), Some(Section::Control));
        assert_eq!(Section::from_byte(0x00), None);
        assert_eq!(Section::from_byte(0x80), None);
    }

    #[test]
    fn test_frame_time_scroll_left() {
        let ft = FrameTime {
            fade: false,
            direction: ScrollDirection::Left,
            scroll: true,
            delay: 5,
        };
        assert_eq!(ft.to_byte(), 0x55);
        assert_eq!(FrameTime::from_byte(0x55), ft);
    }

    #[test]
    fn test_frame_time_fade() {
        let ft = FrameTime {
            fade: true,
            direction: ScrollDirection::Left,
            scroll: true,
            delay: 15,
        };
        assert_eq!(ft.to_byte(), 0xDF);
        assert_eq!(FrameTime::from_byte(0xDF), ft);
    }

    #[test]
    fn test_frame_time_movie() {
        assert_eq!(FrameTime::movie(2).to_byte(), 0x02);
        // Delay is a 4-bit field
        assert_eq!(FrameTime::movie(0x1F).to_byte(), 0x0F);
    }

    #[test]
    fn test_display_option() {
        assert_eq!(DisplayOption::with_loops(7).to_byte(), 0xEB);
        assert_eq!(DisplayOption::with_loops(0).to_byte(), 0x0B);
        assert_eq!(
            DisplayOption::from_byte(0x6B),
            DisplayOption::with_loops(3)
        );
    }

    #[test]
    fn test_movie_registers() {
        let movie = Movie {
            enabled: true,
            start_frame: 1,
        };
        assert_eq!(movie.to_byte(), 0x41);
        assert_eq!(Movie::from_byte(0x41), movie);

        assert_eq!(MovieMode { frame_count: 38 }.to_byte(), 38);
        assert_eq!(MovieMode::from_byte(0xE6).frame_count, 0x26);
    }

    #[test]
    fn test_picture() {
        let picture = Picture {
            enabled: true,
            frame: 2,
        };
        assert_eq!(picture.to_byte(), 0x42);
        assert_eq!(Picture::from_byte(0x42), picture);
    }

    #[test]
    fn test_shutdown_and_sync() {
        assert_eq!(Shutdown::Run.to_byte(), 0x03);
        assert_eq!(Shutdown::Standby.to_byte(), 0x02);
        assert_eq!(Shutdown::from_byte(0x03), Some(Shutdown::Run));
        assert_eq!(Shutdown::from_byte(0x00), None);

        assert_eq!(SyncRole::Source.to_byte(), 0x02);
        assert_eq!(SyncRole::from_byte(0x01), Some(SyncRole::Follower));
        assert_eq!(SyncRole::from_byte(0x03), None);
    }

    #[test]
    fn test_current_source_by_group_size() {
        assert_eq!(CurrentSource::for_group_size(1).to_byte(), 0x20);
        assert_eq!(CurrentSource::for_group_size(2).to_byte(), 0x15);
        assert_eq!(CurrentSource::for_group_size(3).to_byte(), 0x10);
        assert_eq!(CurrentSource::for_group_size(4).to_byte(), 0x08);
        assert_eq!(CurrentSource::for_group_size(0).to_byte(), 0x00);
        assert_eq!(CurrentSource::for_group_size(5).to_byte(), 0x00);
    }

    #[test]
    fn test_frame_status() {
        assert_eq!(FrameStatus::from_byte(0x04).frame, 1);
        assert_eq!(FrameStatus::from_byte(0x8F).frame, 0x23);
    }
}
