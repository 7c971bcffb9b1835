//! Playback configuration
//!
//! The playback record is display-wide state: every render call replaces it
//! with one of the presets below and pushes it to all chips. Setters
//! validate their input and leave the record untouched on rejection.

use crate::error::ConfigError;
use crate::registers::{DisplayOption, FrameTime, Movie, MovieMode};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Slowest/fastest frame delay accepted by [`PlaybackConfig::set_speed`]
pub const SPEED_RANGE: core::ops::RangeInclusive<u8> = 1..=15;

/// Loop counts accepted by [`PlaybackConfig::set_loops`]
pub const LOOPS_RANGE: core::ops::RangeInclusive<u8> = 1..=7;

/// Scroll direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ScrollDirection {
    /// Content moves right
    Right = 0,
    /// Content moves left
    #[default]
    Left = 1,
}

impl TryFrom<u8> for ScrollDirection {
    type Error = ConfigError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::Right),
            1 => Ok(Self::Left),
            _ => Err(ConfigError::Direction(raw)),
        }
    }
}

/// Display mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BeamMode {
    /// Static picture
    Picture = 1,
    /// Frames played once per loop
    Movie = 2,
    /// Frames scrolled continuously
    #[default]
    Scroll = 3,
}

impl TryFrom<u8> for BeamMode {
    type Error = ConfigError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            1 => Ok(Self::Picture),
            2 => Ok(Self::Movie),
            3 => Ok(Self::Scroll),
            _ => Err(ConfigError::Mode(raw)),
        }
    }
}

/// Playback configuration pushed to every chip after a render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "PlaybackRecord"))]
pub struct PlaybackConfig {
    /// Movie or scroll
    pub mode: BeamMode,
    /// First frame played
    pub start_frame: u8,
    /// Frame count (last frame written)
    pub frame_count: u8,
    /// Loop count
    pub loops: u8,
    /// Frame delay
    pub frame_delay: u8,
    /// Scroll direction
    pub direction: ScrollDirection,
    /// Fade between frames
    pub fade: bool,
    /// Scroll bit of the frame time register
    pub scroll: bool,
}

/// Unchecked wire form of a [`PlaybackConfig`]
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct PlaybackRecord {
    mode: BeamMode,
    start_frame: u8,
    frame_count: u8,
    loops: u8,
    frame_delay: u8,
    direction: ScrollDirection,
    fade: bool,
    scroll: bool,
}

#[cfg(feature = "serde")]
impl TryFrom<PlaybackRecord> for PlaybackConfig {
    type Error = ConfigError;

    fn try_from(r: PlaybackRecord) -> Result<Self, Self::Error> {
        let config = Self {
            mode: r.mode,
            start_frame: r.start_frame,
            frame_count: r.frame_count,
            loops: r.loops,
            frame_delay: r.frame_delay,
            direction: r.direction,
            fade: r.fade,
            scroll: r.scroll,
        };
        config.validate()?;
        Ok(config)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self::text_scroll()
    }
}

impl PlaybackConfig {
    /// Scrolling text after a full print
    pub const fn text_scroll() -> Self {
        Self {
            mode: BeamMode::Scroll,
            start_frame: 0,
            frame_count: 0,
            loops: 7,
            frame_delay: 5,
            direction: ScrollDirection::Left,
            fade: false,
            scroll: true,
        }
    }

    /// Text printed into a single target frame
    pub const fn text_frame() -> Self {
        Self {
            mode: BeamMode::Scroll,
            start_frame: 0,
            frame_count: 0,
            loops: 7,
            frame_delay: 15,
            direction: ScrollDirection::Left,
            fade: true,
            scroll: true,
        }
    }

    /// Animation playback
    pub const fn animation() -> Self {
        Self {
            mode: BeamMode::Movie,
            start_frame: 1,
            frame_count: 0,
            loops: 7,
            frame_delay: 2,
            direction: ScrollDirection::Left,
            fade: false,
            scroll: true,
        }
    }

    /// Same configuration with another frame count
    pub const fn with_frame_count(mut self, frame_count: u8) -> Self {
        self.frame_count = frame_count;
        self
    }

    /// Frame time register for the current mode
    ///
    /// Movie mode carries only the delay.
    pub const fn frame_time(&self) -> FrameTime {
        match self.mode {
            BeamMode::Movie => FrameTime::movie(self.frame_delay),
            BeamMode::Picture | BeamMode::Scroll => self.control_frame_time(),
        }
    }

    /// Frame time register with every field of the record
    pub const fn control_frame_time(&self) -> FrameTime {
        FrameTime {
            fade: self.fade,
            direction: self.direction,
            scroll: self.scroll,
            delay: self.frame_delay,
        }
    }

    /// Display option register
    pub const fn display_option(&self) -> DisplayOption {
        DisplayOption::with_loops(self.loops)
    }

    /// Movie register
    pub const fn movie(&self) -> Movie {
        Movie {
            enabled: true,
            start_frame: self.start_frame,
        }
    }

    /// Movie mode register
    pub const fn movie_mode(&self) -> MovieMode {
        MovieMode {
            frame_count: self.frame_count,
        }
    }

    /// Check the fields the setters guard
    ///
    /// Speed and loop count must be in range and the mode must be movie or
    /// scroll.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !SPEED_RANGE.contains(&self.frame_delay) {
            return Err(ConfigError::Speed(self.frame_delay));
        }
        if !LOOPS_RANGE.contains(&self.loops) {
            return Err(ConfigError::Loops(self.loops));
        }
        if self.mode == BeamMode::Picture {
            return Err(ConfigError::Mode(self.mode as u8));
        }
        Ok(())
    }

    /// Set scroll direction and fade, enabling scrolling
    pub fn set_scroll(&mut self, direction: ScrollDirection, fade: bool) {
        self.direction = direction;
        self.fade = fade;
        self.scroll = true;
    }

    /// Set the frame delay (1-15)
    ///
    /// Scrolling is switched off in movie mode and on otherwise.
    pub fn set_speed(&mut self, speed: u8) -> Result<(), ConfigError> {
        if !SPEED_RANGE.contains(&speed) {
            return Err(ConfigError::Speed(speed));
        }
        self.scroll = self.mode != BeamMode::Movie;
        self.frame_delay = speed;
        Ok(())
    }

    /// Set the loop count (1-7)
    pub fn set_loops(&mut self, loops: u8) -> Result<(), ConfigError> {
        if !LOOPS_RANGE.contains(&loops) {
            return Err(ConfigError::Loops(loops));
        }
        self.loops = loops;
        Ok(())
    }

    /// Switch between movie and scroll
    pub fn set_mode(&mut self, mode: BeamMode) -> Result<(), ConfigError> {
        if mode == BeamMode::Picture {
            return Err(ConfigError::Mode(mode as u8));
        }
        self.mode = mode;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_frame_time() {
        assert_eq!(PlaybackConfig::text_scroll().frame_time().to_byte(), 0x55);
        assert_eq!(PlaybackConfig::text_frame().frame_time().to_byte(), 0xDF);
        assert_eq!(PlaybackConfig::animation().frame_time().to_byte(), 0x02);
    }

    #[test]
    fn test_presets_movie_registers() {
        let config = PlaybackConfig::animation().with_frame_count(35);
        assert_eq!(config.movie().to_byte(), 0x41);
        assert_eq!(config.movie_mode().to_byte(), 35);
        assert_eq!(config.display_option().to_byte(), 0xEB);
    }

    #[test]
    fn test_set_speed_validates() {
        let mut config = PlaybackConfig::text_scroll();
        assert_eq!(config.set_speed(0), Err(ConfigError::Speed(0)));
        assert_eq!(config.set_speed(16), Err(ConfigError::Speed(16)));
        assert_eq!(config, PlaybackConfig::text_scroll());

        config.set_speed(9).unwrap();
        assert_eq!(config.frame_delay, 9);
        assert!(config.scroll);
    }

    #[test]
    fn test_set_speed_in_movie_mode_clears_scroll() {
        let mut config = PlaybackConfig::animation();
        config.set_speed(3).unwrap();
        assert!(!config.scroll);
        // Fade and direction bits still go out with the speed change
        assert_eq!(config.control_frame_time().to_byte(), 0x43);
        assert_eq!(config.frame_time().to_byte(), 0x03);
    }

    #[test]
    fn test_set_loops_validates() {
        let mut config = PlaybackConfig::text_scroll();
        assert_eq!(config.set_loops(0), Err(ConfigError::Loops(0)));
        assert_eq!(config.set_loops(8), Err(ConfigError::Loops(8)));
        assert_eq!(config.loops, 7);

        config.set_loops(2).unwrap();
        assert_eq!(config.display_option().to_byte(), 0x4B);
    }

    #[test]
    fn test_set_mode_rejects_picture() {
        let mut config = PlaybackConfig::text_scroll();
        assert_eq!(config.set_mode(BeamMode::Picture), Err(ConfigError::Mode(1)));
        assert_eq!(config.mode, BeamMode::Scroll);

        config.set_mode(BeamMode::Movie).unwrap();
        assert_eq!(config.frame_time().to_byte(), 0x05);
    }

    #[test]
    fn test_set_scroll() {
        let mut config = PlaybackConfig::animation();
        config.set_speed(4).unwrap();
        config.set_scroll(ScrollDirection::Right, true);
        assert!(config.scroll);
        assert_eq!(config.control_frame_time().to_byte(), 0x94);
    }

    #[test]
    fn test_validate() {
        for preset in [
            PlaybackConfig::text_scroll(),
            PlaybackConfig::text_frame(),
            PlaybackConfig::animation(),
        ] {
            assert_eq!(preset.validate(), Ok(()));
        }

        let mut config = PlaybackConfig::text_scroll();
        config.loops = 9;
        assert_eq!(config.validate(), Err(ConfigError::Loops(9)));

        let mut config = PlaybackConfig::text_scroll();
        config.frame_delay = 0;
        assert_eq!(config.validate(), Err(ConfigError::Speed(0)));

        let mut config = PlaybackConfig::animation();
        config.mode = BeamMode::Picture;
        assert_eq!(config.validate(), Err(ConfigError::Mode(1)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_validates_playback() {
        let config = PlaybackConfig::animation().with_frame_count(35);
        let bytes = postcard::to_allocvec(&config).unwrap();
        assert_eq!(postcard::from_bytes::<PlaybackConfig>(&bytes).unwrap(), config);

        let mut bad = PlaybackConfig::text_scroll();
        bad.loops = 200;
        let bytes = postcard::to_allocvec(&bad).unwrap();
        assert!(postcard::from_bytes::<PlaybackConfig>(&bytes).is_err());
    }

    #[test]
    fn test_raw_conversions() {
        assert_eq!(ScrollDirection::try_from(1), Ok(ScrollDirection::Left));
        assert_eq!(ScrollDirection::try_from(2), Err(ConfigError::Direction(2)));
        assert_eq!(BeamMode::try_from(2), Ok(BeamMode::Movie));
        assert_eq!(BeamMode::try_from(0), Err(ConfigError::Mode(0)));
    }
}
