//! Beam display driver
//!
//! Drives a [`ChipGroup`] as one display. Rendering (`print`,
//! `print_frame`, `draw`) writes frames to every chip at its physical slot
//! and then pushes the matching playback preset. `play` starts the group,
//! staggering chained chips through the start cascade; `display` shows a
//! static picture instead.
//!
//! # Example
//!
//! ```ignore
//! let mut beam = Beam::new(bus, clock, reset_pin, delay, ChipGroup::chained(2));
//! beam.begin();
//! beam.print("HELLO");
//! beam.play()?;
//! ```

use beam_core::address::{ChipAddress, ChipGroup};
use beam_core::chain::{self, Cascade, CascadeStatus, RenderKind};
use beam_core::error::ConfigError;
use beam_core::font::{GlyphTable, BEAM_FONT};
use beam_core::frame::{AnimationBitmap, FrameRegisters, FRAME_COUNT};
use beam_core::layout::TextLayout;
use beam_core::playback::{BeamMode, PlaybackConfig, ScrollDirection};
use beam_core::registers::{
    blink_pwm, ctrl, CurrentSource, DisplayOption, FrameStatus, Picture, Section, Shutdown,
    BLINK_PWM_SETS, MEMORY_CONFIG,
};
use beam_hal::{Clock, I2cBus};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::BeamConfig;
use crate::transport::RegisterBus;

/// Chain index whose chip never receives the standby write
const STANDBY_SKIP_INDEX: usize = 3;

/// Playback start failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlayError {
    /// Chained chips did not all start before the cascade timeout
    CascadeTimeout {
        /// Chips still waiting to be started
        waiting: usize,
    },
}

/// Driver for one to four Beams on a shared bus
pub struct Beam<B, C, RST, D> {
    transport: RegisterBus<B, C>,
    reset: RST,
    delay: D,
    group: ChipGroup,
    playback: PlaybackConfig,
    last_frame_written: u8,
    cascade: Cascade,
    config: BeamConfig,
}

impl<B, C, RST, D> Beam<B, C, RST, D>
where
    B: I2cBus,
    C: Clock,
    RST: OutputPin,
    D: DelayNs,
{
    /// Create a driver with default timings
    pub fn new(bus: B, clock: C, reset: RST, delay: D, group: ChipGroup) -> Self {
        Self::with_config(bus, clock, reset, delay, group, BeamConfig::default())
    }

    /// Create a driver with custom timings
    pub fn with_config(
        bus: B,
        clock: C,
        reset: RST,
        delay: D,
        group: ChipGroup,
        config: BeamConfig,
    ) -> Self {
        let cascade = Cascade::new(usize::from(group.size()));
        Self {
            transport: RegisterBus::new(bus, clock, &config),
            reset,
            delay,
            group,
            playback: PlaybackConfig::default(),
            last_frame_written: 0,
            cascade,
            config,
        }
    }

    /// Bring the chips out of reset
    pub fn begin(&mut self) {
        info!("Starting {} Beam(s), mode {:?}", self.group.size(), self.group.mode());
        self.hard_reset();
    }

    /// Pulse the shared reset line
    fn hard_reset(&mut self) {
        if self.reset.set_low().is_err() {
            warn!("Failed to drive reset line low");
        }
        self.delay.delay_ms(self.config.reset_low_ms);
        if self.reset.set_high().is_err() {
            warn!("Failed to release reset line");
        }
        self.delay.delay_ms(self.config.reset_settle_ms);
    }

    /// Clear every chip: memory config, blank frames, blink off, full PWM
    pub fn init_all(&mut self) {
        let group = self.group.clone();
        for &chip in group.chips() {
            trace!("Clearing Beam {:#x}", chip.raw());
            self.init_chip(chip);
        }
    }

    fn init_chip(&mut self, chip: ChipAddress) {
        self.write_control(chip, ctrl::CONFIG, MEMORY_CONFIG);

        let blank = FrameRegisters::blank();
        for slot in 0..FRAME_COUNT {
            self.write_frame(chip, slot, &blank);
        }

        for set in 0..BLINK_PWM_SETS {
            let section = Section::BlinkPwm(set);
            for register in blink_pwm::BLINK_FIRST..=blink_pwm::BLINK_LAST {
                self.write(chip, section, register, blink_pwm::BLINK_OFF);
            }
            for register in blink_pwm::PWM_FIRST..=blink_pwm::PWM_LAST {
                self.write(chip, section, register, blink_pwm::PWM_FULL);
            }
        }
    }

    /// Print text with the built-in font, scrolling across the group
    pub fn print(&mut self, text: &str) {
        self.print_with(&BEAM_FONT, text.as_bytes());
    }

    /// Print raw text bytes with a custom glyph table
    ///
    /// Resets and clears the chips first. Text beyond the frame capacity is
    /// dropped.
    pub fn print_with<G: GlyphTable + ?Sized>(&mut self, font: &G, text: &[u8]) {
        info!("Printing {} bytes", text.len());
        self.hard_reset();
        self.init_all();

        let size = usize::from(self.group.size());
        let group = self.group.clone();
        let mut frames = 0;
        for frame in TextLayout::new(font, text) {
            for (index, &chip) in group.chips().iter().enumerate() {
                let slot = chain::physical_slot(RenderKind::Text, frame.index, size, index);
                self.write_frame(chip, slot, &frame.registers);
            }
            self.last_frame_written =
                chain::last_frame_written(RenderKind::Text, frame.index, size) as u8;
            frames += 1;
        }
        debug!("Wrote {} text frames, last {}", frames, self.last_frame_written);

        self.playback = PlaybackConfig::text_scroll().with_frame_count(self.last_frame_written);
        self.push_playback();
    }

    /// Print text into one frame slot with the built-in font
    pub fn print_frame(&mut self, frame: u8, text: &str) {
        self.print_frame_with(&BEAM_FONT, frame, text.as_bytes());
    }

    /// Print raw text bytes into one frame slot with a custom glyph table
    ///
    /// The same frame goes to every chip. Other frames are left alone. A
    /// target of 0 lays out the whole text from frame 0. Text too short to
    /// fill the target frame is flushed as a partial frame at end of input.
    pub fn print_frame_with<G: GlyphTable + ?Sized>(&mut self, font: &G, target: u8, text: &[u8]) {
        info!("Printing {} bytes into frame {}", text.len(), target);
        let size = usize::from(self.group.size());
        let group = self.group.clone();
        let mut written = false;
        for frame in TextLayout::at_frame(font, usize::from(target), text) {
            for (index, &chip) in group.chips().iter().enumerate() {
                let slot = chain::physical_slot(RenderKind::TextAtFrame, frame.index, size, index);
                self.write_frame(chip, slot, &frame.registers);
            }
            self.last_frame_written =
                chain::last_frame_written(RenderKind::TextAtFrame, frame.index, size) as u8;
            written = true;
        }

        if written {
            self.playback = PlaybackConfig::text_frame().with_frame_count(self.last_frame_written);
            self.push_playback();
        }
    }

    /// Load 36 animation frames and prepare movie playback
    pub fn draw(&mut self, frames: &[AnimationBitmap; FRAME_COUNT]) {
        info!("Drawing {} animation frames", FRAME_COUNT);
        self.hard_reset();
        self.init_all();

        let size = usize::from(self.group.size());
        let group = self.group.clone();
        for (index, bitmap) in frames.iter().enumerate() {
            let registers = FrameRegisters::from_bitmap(bitmap);
            for (chip_index, &chip) in group.chips().iter().enumerate() {
                let slot = chain::physical_slot(RenderKind::Animation, index, size, chip_index);
                self.write_frame(chip, slot, &registers);
            }
            self.last_frame_written =
                chain::last_frame_written(RenderKind::Animation, index, size) as u8;
        }

        self.playback = PlaybackConfig::animation().with_frame_count(self.last_frame_written);
        self.push_playback();
    }

    /// Write the playback configuration to every chip
    fn push_playback(&mut self) {
        let playback = self.playback;
        debug!("Pushing playback {:?}", playback);

        let current = CurrentSource::for_group_size(self.group.size()).to_byte();
        let group = self.group.clone();
        for (index, &chip) in group.chips().iter().enumerate() {
            self.write_control(chip, ctrl::MOVIE, playback.movie().to_byte());
            self.write_control(chip, ctrl::MOVIE_MODE, playback.movie_mode().to_byte());
            self.write_control(chip, ctrl::CURRENT_SOURCE, current);
            self.write_control(chip, ctrl::FRAME_TIME, playback.frame_time().to_byte());
            self.write_control(chip, ctrl::DISPLAY_OPTION, playback.display_option().to_byte());
            // The fourth chip stays out of standby here
            if index != STANDBY_SKIP_INDEX {
                self.write_control(chip, ctrl::SHUTDOWN, Shutdown::Standby.to_byte());
            }
        }

        if group.needs_sync() {
            let size = usize::from(group.size());
            let source = chain::start_chip(playback.direction, size);
            if let Some(chip) = group.get(source) {
                let role = chain::sync_role(playback.direction, size, source);
                self.write_control(chip, ctrl::CLOCK_SYNC, role.to_byte());
            }
            for (index, &chip) in group.chips().iter().enumerate() {
                if index != source {
                    let role = chain::sync_role(playback.direction, size, index);
                    self.write_control(chip, ctrl::CLOCK_SYNC, role.to_byte());
                }
            }
        }
    }

    /// Start playback
    ///
    /// The chip the content enters first is started at once. Chained groups then
    /// run the start cascade until every chip runs or the cascade timeout
    /// expires.
    pub fn play(&mut self) -> Result<(), PlayError> {
        let size = usize::from(self.group.size());
        let start = chain::start_chip(self.playback.direction, size);
        self.start_chip(start);

        if size <= 1 {
            return Ok(());
        }

        let began = self.transport.clock_mut().now_ms();
        loop {
            if self.check_status() {
                return Ok(());
            }
            if self.transport.clock_mut().elapsed_since(began) >= self.config.cascade_timeout_ms {
                let waiting = self.cascade.active().saturating_sub(1);
                warn!("Start cascade timed out, {} Beam(s) not started", waiting);
                self.cascade.reset();
                return Err(PlayError::CascadeTimeout { waiting });
            }
            self.delay.delay_ms(self.config.cascade_poll_ms);
        }
    }

    /// Advance the start cascade by one poll
    ///
    /// Returns `true` once the last chip was started. Single-chip groups
    /// have nothing to cascade.
    pub fn check_status(&mut self) -> bool {
        if self.group.size() <= 1 {
            return true;
        }

        let direction = self.playback.direction;
        let Some(chip) = self.group.get(self.cascade.poll_chip(direction)) else {
            return false;
        };
        let progress = self.read_progress(chip);
        trace!("Cascade poll {:#x}: frame {}, want {}", chip.raw(), progress, self.cascade.expected_progress());

        match self.cascade.observe(direction, progress) {
            CascadeStatus::Waiting => false,
            CascadeStatus::Started(index) => {
                self.start_chip(index);
                false
            }
            CascadeStatus::Finished(index) => {
                self.start_chip(index);
                self.delay.delay_ms(self.config.cascade_poll_ms);
                true
            }
        }
    }

    fn start_chip(&mut self, index: usize) {
        if let Some(chip) = self.group.get(index) {
            debug!("Starting Beam {:#x}", chip.raw());
            self.write_control(chip, ctrl::SHUTDOWN, Shutdown::Run.to_byte());
        }
    }

    /// Show a static picture on every chip
    pub fn display(&mut self) {
        let size = self.group.size();
        let picture = Picture {
            enabled: true,
            frame: size,
        }
        .to_byte();
        let current = CurrentSource::for_group_size(size).to_byte();
        let option = DisplayOption::with_loops(0).to_byte();

        let group = self.group.clone();
        for &chip in group.chips() {
            self.write_control(chip, ctrl::PICTURE, picture);
            self.write_control(chip, ctrl::CURRENT_SOURCE, current);
            self.write_control(chip, ctrl::DISPLAY_OPTION, option);
        }
        for &chip in group.chips() {
            self.write_control(chip, ctrl::SHUTDOWN, Shutdown::Run.to_byte());
        }
    }

    /// Frame currently shown by a single Beam
    ///
    /// Chained groups report 0 without touching the bus.
    pub fn status(&mut self) -> u8 {
        if self.group.is_chained() {
            return 0;
        }
        match self.group.get(0) {
            Some(chip) => {
                let frame = self.read_progress(chip);
                trace!("Frame done ({})", frame);
                frame
            }
            None => 0,
        }
    }

    fn read_progress(&mut self, chip: ChipAddress) -> u8 {
        let raw = self
            .transport
            .read_register(chip, Section::Control, ctrl::FRAME_STATUS);
        FrameStatus::from_byte(raw).frame
    }

    /// Set scroll direction and fade
    pub fn set_scroll(&mut self, direction: ScrollDirection, fade: bool) {
        self.playback.set_scroll(direction, fade);
        self.write_control_all(ctrl::FRAME_TIME, self.playback.control_frame_time().to_byte());
    }

    /// Set the frame delay (1-15)
    pub fn set_speed(&mut self, speed: u8) -> Result<(), ConfigError> {
        self.playback.set_speed(speed).inspect_err(|_| {
            warn!("Enter a speed between 1 and 15, not {}", speed);
        })?;
        self.write_control_all(ctrl::FRAME_TIME, self.playback.control_frame_time().to_byte());
        Ok(())
    }

    /// Set the loop count (1-7)
    pub fn set_loops(&mut self, loops: u8) -> Result<(), ConfigError> {
        self.playback.set_loops(loops).inspect_err(|_| {
            warn!("Enter a loop count between 1 and 7, not {}", loops);
        })?;
        self.write_control_all(ctrl::DISPLAY_OPTION, self.playback.display_option().to_byte());
        Ok(())
    }

    /// Switch between movie and scroll
    pub fn set_mode(&mut self, mode: BeamMode) -> Result<(), ConfigError> {
        self.playback.set_mode(mode).inspect_err(|_| {
            warn!("Select either scroll or movie mode, not {:?}", mode);
        })?;
        self.write_control_all(ctrl::FRAME_TIME, self.playback.frame_time().to_byte());
        Ok(())
    }

    /// Chips driven by this instance
    pub fn group(&self) -> &ChipGroup {
        &self.group
    }

    /// Current playback configuration
    pub fn playback(&self) -> &PlaybackConfig {
        &self.playback
    }

    /// Last frame slot written by the latest render
    pub fn last_frame_written(&self) -> u8 {
        self.last_frame_written
    }

    /// Release the hardware
    pub fn release(self) -> (B, C, RST, D) {
        let (bus, clock) = self.transport.release();
        (bus, clock, self.reset, self.delay)
    }

    fn write_frame(&mut self, chip: ChipAddress, slot: usize, frame: &FrameRegisters) {
        // Slots stay below 40: 36 frames plus at most 4 chips of offset
        let section = Section::Frame(slot as u8);
        for (offset, value) in frame.register_bytes() {
            self.write(chip, section, offset, value);
        }
    }

    fn write_control(&mut self, chip: ChipAddress, register: u8, value: u8) {
        self.write(chip, Section::Control, register, value);
    }

    fn write_control_all(&mut self, register: u8, value: u8) {
        let group = self.group.clone();
        for &chip in group.chips() {
            self.write_control(chip, register, value);
        }
    }

    /// Failures are logged and counted by the transport
    fn write(&mut self, chip: ChipAddress, section: Section, offset: u8, value: u8) {
        let _ = self.transport.write_register(chip, section, offset, value);
    }
}
