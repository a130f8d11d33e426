// Bus seam between the TM1637 driver and whatever moves the bits.
//
// The TM1637 speaks an I2C-like framing (start, byte + ack, stop) but has
// no device address: the first byte of every transfer is a command. Bytes
// cross this trait in logical order; the implementation is responsible
// for shifting them out LSB first.

/// Transport used by [`Tm1637`](super::tm1637::Tm1637).
pub trait Interface {
    type Error: core::fmt::Debug;

    /// Bring the bus to idle. Called from `Tm1637::init`.
    fn init(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Release the bus. Called from `Tm1637::deinit` after power down.
    fn deinit(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// One framed transfer: `cmd` followed by `data`.
    fn write_command(&mut self, cmd: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Send `cmd`, then clock `buf.len()` bytes back from the chip.
    fn read_command(&mut self, cmd: u8, buf: &mut [u8]) -> Result<(), Self::Error>;
}

impl<T: Interface + ?Sized> Interface for &mut T {
    type Error = T::Error;

    fn init(&mut self) -> Result<(), Self::Error> {
        T::init(self)
    }

    fn deinit(&mut self) -> Result<(), Self::Error> {
        T::deinit(self)
    }

    fn write_command(&mut self, cmd: u8, data: &[u8]) -> Result<(), Self::Error> {
        T::write_command(self, cmd, data)
    }

    fn read_command(&mut self, cmd: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        T::read_command(self, cmd, buf)
    }
}
