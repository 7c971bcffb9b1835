//! Beam Hardware Abstraction Layer
//!
//! This crate defines the hardware seams the Beam driver is built on. Board
//! support code implements them (or uses the provided `embedded-hal`
//! adapter) so the driver itself stays target-agnostic.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  beam-drivers (Beam device driver)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  beam-hal (this crate - traits)         │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ embedded-hal  │       │  board code,  │
//! │  I2c adapter  │       │  Wire-style   │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`i2c::I2cBus`] - Two-wire bus transactions with polled receive
//! - [`clock::Clock`] - Millisecond time source with a scheduler yield hook

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod i2c;

// Re-export key traits at crate root for convenience
pub use clock::Clock;
pub use i2c::{BlockingI2c, I2cBus};
