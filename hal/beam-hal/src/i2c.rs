//! I2C bus abstractions
//!
//! The Beam chips are driven with Wire-style transactions: a transmit, then
//! a receive request whose data becomes available some time later. The
//! trait keeps that split so the driver can bound the wait itself.

/// I2C bus master
///
/// Provides the transaction primitives the Beam register protocol needs.
pub trait I2cBus {
    /// Error type for I2C operations
    type Error;

    /// Write data to a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `data` - Bytes to write (command byte followed by data)
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Request `len` bytes from a device
    ///
    /// The bytes are collected with [`I2cBus::poll_read`] once available.
    fn request(&mut self, address: u8, len: usize) -> Result<(), Self::Error>;

    /// Take requested bytes if they have arrived
    ///
    /// Returns the number of bytes copied into `buf`, or `None` while the
    /// transfer is still pending.
    fn poll_read(&mut self, buf: &mut [u8]) -> Option<usize>;

    /// Force the bus peripheral back to idle
    fn reset(&mut self);
}

impl<T: I2cBus + ?Sized> I2cBus for &mut T {
    type Error = T::Error;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        T::write(self, address, data)
    }

    fn request(&mut self, address: u8, len: usize) -> Result<(), Self::Error> {
        T::request(self, address, len)
    }

    fn poll_read(&mut self, buf: &mut [u8]) -> Option<usize> {
        T::poll_read(self, buf)
    }

    fn reset(&mut self) {
        T::reset(self);
    }
}

/// Largest receive request the blocking adapter buffers
const PENDING_CAPACITY: usize = 4;

/// [`I2cBus`] over any blocking `embedded-hal` I2C peripheral
///
/// Requests complete synchronously, so data is available on the first poll.
/// `reset` only drops buffered data: `embedded-hal` has no bus recovery.
pub struct BlockingI2c<I> {
    i2c: I,
    pending: [u8; PENDING_CAPACITY],
    pending_len: usize,
}

impl<I> BlockingI2c<I>
where
    I: embedded_hal::i2c::I2c,
{
    /// Wrap a blocking I2C peripheral
    pub fn new(i2c: I) -> Self {
        Self {
            i2c,
            pending: [0; PENDING_CAPACITY],
            pending_len: 0,
        }
    }

    /// Release the wrapped peripheral
    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I> I2cBus for BlockingI2c<I>
where
    I: embedded_hal::i2c::I2c,
{
    type Error = I::Error;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.i2c.write(address, data)
    }

    fn request(&mut self, address: u8, len: usize) -> Result<(), Self::Error> {
        let len = len.min(PENDING_CAPACITY);
        self.pending_len = 0;
        self.i2c.read(address, &mut self.pending[..len])?;
        self.pending_len = len;
        Ok(())
    }

    fn poll_read(&mut self, buf: &mut [u8]) -> Option<usize> {
        if self.pending_len == 0 {
            return None;
        }
        let n = self.pending_len.min(buf.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending_len = 0;
        Some(n)
    }

    fn reset(&mut self) {
        self.pending_len = 0;
    }
}
