//! Register transport
//!
//! Every register access first selects a section on the chip, then
//! addresses a register inside it. Writes count consecutive failed
//! selects and reset the bus once too many pile up. Reads poll for the
//! reply with a timeout and degrade to `0` when nothing arrives.

use beam_core::address::ChipAddress;
use beam_core::registers::{Section, REGISTER_SELECT};
use beam_hal::{Clock, I2cBus};

use crate::config::BeamConfig;

/// Failed register write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WriteError<E> {
    /// Section select was not acknowledged; the data write was skipped
    Select(E),
    /// Data write was not acknowledged
    Data(E),
}

/// Section-addressed register access over an [`I2cBus`]
pub struct RegisterBus<B, C> {
    bus: B,
    clock: C,
    read_timeout_ms: u32,
    failure_threshold: u16,
    /// Consecutive failed section selects
    failures: u16,
}

impl<B, C> RegisterBus<B, C>
where
    B: I2cBus,
    C: Clock,
{
    /// Wrap a bus and a time source
    pub fn new(bus: B, clock: C, config: &BeamConfig) -> Self {
        Self {
            bus,
            clock,
            read_timeout_ms: config.read_timeout_ms,
            failure_threshold: config.failure_threshold.max(1),
            failures: 0,
        }
    }

    /// Write one register
    ///
    /// A failed select counts towards the failure threshold. Reaching it
    /// resets the bus and restarts the count.
    pub fn write_register(
        &mut self,
        chip: ChipAddress,
        section: Section,
        offset: u8,
        value: u8,
    ) -> Result<(), WriteError<B::Error>> {
        let address = chip.raw();

        if let Err(e) = self.bus.write(address, &[REGISTER_SELECT, section.to_byte()]) {
            self.failures = self.failures.saturating_add(1);
            warn!("Beam not found: {:#x} ({} failed)", address, self.failures);
            if self.failures >= self.failure_threshold {
                warn!("Resetting bus after {} failed writes", self.failures);
                self.bus.reset();
                self.failures = 0;
            }
            return Err(WriteError::Select(e));
        }

        self.failures = 0;
        self.bus
            .write(address, &[offset, value])
            .map_err(WriteError::Data)
    }

    /// Read one register
    ///
    /// Returns `0` when the chip does not answer within the read timeout;
    /// the bus is reset in that case.
    pub fn read_register(&mut self, chip: ChipAddress, section: Section, offset: u8) -> u8 {
        let address = chip.raw();

        // Select failures surface as a missing reply below
        let _ = self.bus.write(address, &[REGISTER_SELECT, section.to_byte()]);
        let _ = self.bus.write(address, &[offset]);

        if self.bus.request(address, 1).is_err() {
            warn!("Read request to {:#x} failed", address);
            self.bus.reset();
            return 0;
        }

        let mut buf = [0u8; 1];
        let start = self.clock.now_ms();
        loop {
            if let Some(n) = self.bus.poll_read(&mut buf) {
                if n > 0 {
                    return buf[0];
                }
            }
            if self.clock.elapsed_since(start) >= self.read_timeout_ms {
                break;
            }
            self.clock.yield_now();
        }

        warn!("Read from {:#x} timed out", address);
        self.bus.reset();
        0
    }

    /// Consecutive failed section selects so far
    pub fn failures(&self) -> u16 {
        self.failures
    }

    /// Underlying bus
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Underlying bus, mutably
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Time source
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Release the bus and the time source
    pub fn release(self) -> (B, C) {
        (self.bus, self.clock)
    }
}
