//! Test doubles for the driver
//!
//! [`MockBus`] models the section select of each chip so recorded writes
//! carry the section they landed in. Time is shared between [`FakeClock`]
//! and [`FakeDelay`], so delays advance the clock the driver reads.

use std::cell::Cell;
use std::collections::{HashMap, VecDeque};
use std::convert::Infallible;
use std::rc::Rc;

use beam_core::frame::{FrameRegisters, COLUMN_REGISTERS};
use beam_core::registers::{Section, CONTROL_SECTION, REGISTER_SELECT};
use beam_hal::{Clock, I2cBus};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

/// One data write as seen by a chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterWrite {
    pub address: u8,
    pub section: u8,
    pub offset: u8,
    pub value: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusFault;

#[derive(Debug, Default)]
pub struct MockBus {
    /// Data writes in order
    pub writes: Vec<RegisterWrite>,
    /// Section selects in order
    pub selects: Vec<(u8, u8)>,
    /// `(address, section, offset)` of every read
    pub reads: Vec<(u8, u8, u8)>,
    /// Addresses that NAK every transaction
    pub failing: Vec<u8>,
    /// Addresses that accept requests but never deliver data
    pub silent: Vec<u8>,
    /// Raw register bytes returned per address; the last one repeats
    pub responses: HashMap<u8, VecDeque<u8>>,
    pub resets: usize,
    selected: HashMap<u8, u8>,
    pending: Option<u8>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue frame progress values for a chip's status register
    pub fn respond_progress(&mut self, address: u8, progress: &[u8]) {
        self.responses
            .entry(address)
            .or_default()
            .extend(progress.iter().map(|p| p << 2));
    }

    /// Values written to one control register of a chip, in order
    pub fn control_writes(&self, address: u8, register: u8) -> Vec<u8> {
        self.writes
            .iter()
            .filter(|w| w.address == address && w.section == CONTROL_SECTION && w.offset == register)
            .map(|w| w.value)
            .collect()
    }

    /// Control writes to one register across all chips, in order
    pub fn control_sequence(&self, register: u8) -> Vec<(u8, u8)> {
        self.writes
            .iter()
            .filter(|w| w.section == CONTROL_SECTION && w.offset == register)
            .map(|w| (w.address, w.value))
            .collect()
    }

    /// Data writes to one section of a chip
    pub fn section_writes(&self, address: u8, section: u8) -> Vec<RegisterWrite> {
        self.writes
            .iter()
            .filter(|w| w.address == address && w.section == section)
            .copied()
            .collect()
    }

    /// Frame as last written to a physical slot, if it was written at all
    pub fn frame(&self, address: u8, slot: u8) -> Option<FrameRegisters> {
        let section = Section::Frame(slot).to_byte();
        let writes = self.section_writes(address, section);
        if writes.is_empty() {
            return None;
        }
        let mut registers = [0u16; COLUMN_REGISTERS];
        for w in writes {
            let j = usize::from(w.offset / 2);
            if w.offset % 2 == 0 {
                registers[j] = (registers[j] & 0x300) | u16::from(w.value);
            } else {
                registers[j] = (registers[j] & 0xFF) | u16::from(w.value & 0x03) << 8;
            }
        }
        Some(FrameRegisters::from_registers(registers))
    }

    fn section_of(&self, address: u8) -> u8 {
        self.selected.get(&address).copied().unwrap_or(0)
    }
}

impl I2cBus for MockBus {
    type Error = BusFault;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), BusFault> {
        if self.failing.contains(&address) {
            return Err(BusFault);
        }
        match *data {
            [REGISTER_SELECT, section] => {
                self.selected.insert(address, section);
                self.selects.push((address, section));
            }
            [offset, value] => {
                let section = self.section_of(address);
                self.writes.push(RegisterWrite {
                    address,
                    section,
                    offset,
                    value,
                });
            }
            [offset] => {
                let section = self.section_of(address);
                self.reads.push((address, section, offset));
            }
            _ => return Err(BusFault),
        }
        Ok(())
    }

    fn request(&mut self, address: u8, _len: usize) -> Result<(), BusFault> {
        if self.failing.contains(&address) {
            return Err(BusFault);
        }
        self.pending = None;
        if self.silent.contains(&address) {
            return Ok(());
        }
        let value = self
            .responses
            .get_mut(&address)
            .and_then(|queue| {
                if queue.len() > 1 {
                    queue.pop_front()
                } else {
                    queue.front().copied()
                }
            })
            .unwrap_or(0);
        self.pending = Some(value);
        Ok(())
    }

    fn poll_read(&mut self, buf: &mut [u8]) -> Option<usize> {
        let value = self.pending.take()?;
        buf[0] = value;
        Some(1)
    }

    fn reset(&mut self) {
        self.resets += 1;
        self.pending = None;
    }
}

/// Millisecond time shared by the fake clock and delay
#[derive(Debug, Clone, Default)]
pub struct SimTime(Rc<Cell<u32>>);

impl SimTime {
    pub fn now(&self) -> u32 {
        self.0.get()
    }

    fn advance(&self, ms: u32) {
        self.0.set(self.0.get().wrapping_add(ms));
    }
}

/// Clock that moves forward by `step` ms on every read
#[derive(Debug)]
pub struct FakeClock {
    time: SimTime,
    step: u32,
    pub yields: usize,
}

impl FakeClock {
    pub fn new(time: SimTime, step: u32) -> Self {
        Self {
            time,
            step,
            yields: 0,
        }
    }
}

impl Clock for FakeClock {
    fn now_ms(&mut self) -> u32 {
        let now = self.time.now();
        self.time.advance(self.step);
        now
    }

    fn yield_now(&mut self) {
        self.yields += 1;
    }
}

/// Delay that returns at once and advances [`SimTime`]
#[derive(Debug)]
pub struct FakeDelay {
    time: SimTime,
    residual_ns: u32,
    pub total_ms: u32,
}

impl FakeDelay {
    pub fn new(time: SimTime) -> Self {
        Self {
            time,
            residual_ns: 0,
            total_ms: 0,
        }
    }
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        let total = u64::from(self.residual_ns) + u64::from(ns);
        let ms = (total / 1_000_000) as u32;
        self.residual_ns = (total % 1_000_000) as u32;
        self.total_ms += ms;
        self.time.advance(ms);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.total_ms += ms;
        self.time.advance(ms);
    }
}

/// Output pin that records every level it is driven to
#[derive(Debug, Default)]
pub struct RecordingPin {
    pub levels: Vec<bool>,
}

impl ErrorType for RecordingPin {
    type Error = Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.levels.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.levels.push(true);
        Ok(())
    }
}
