// Bit-banged TM1637 two-wire bus (board-independent)
//
// CLK is a push-pull output, DIO an open-drain line the chip pulls low to
// acknowledge and to return key data. Bytes go out LSB first: DIO changes
// while CLK is low and is latched on the rising edge. Start = DIO falls
// with CLK high, stop = DIO rises with CLK high. The chip tops out at
// 250kHz, so a half period of a few microseconds is plenty.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, ErrorKind, InputPin, OutputPin};
use log::debug;

use super::interface::Interface;

pub const DEFAULT_BIT_DELAY_US: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BusConfig {
    /// Half period of the clock, in microseconds.
    pub bit_delay_us: u32,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            bit_delay_us: DEFAULT_BIT_DELAY_US,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusError {
    /// A CLK or DIO operation failed.
    Pin(ErrorKind),
    /// The chip did not pull DIO low on the ninth clock.
    Nack,
}

fn pin_err<E: digital::Error>(e: E) -> BusError {
    BusError::Pin(e.kind())
}

pub struct TwoWire<CLK, DIO, D> {
    clk: CLK,
    dio: DIO,
    delay: D,
    config: BusConfig,
}

impl<CLK, DIO, D> TwoWire<CLK, DIO, D>
where
    CLK: OutputPin,
    DIO: OutputPin + InputPin,
    D: DelayNs,
{
    pub fn new(clk: CLK, dio: DIO, delay: D) -> Self {
        Self::with_config(clk, dio, delay, BusConfig::default())
    }

    pub fn with_config(clk: CLK, dio: DIO, delay: D, config: BusConfig) -> Self {
        Self {
            clk,
            dio,
            delay,
            config,
        }
    }

    pub fn config(&self) -> BusConfig {
        self.config
    }

    /// Hand the pins and delay back.
    pub fn release(self) -> (CLK, DIO, D) {
        (self.clk, self.dio, self.delay)
    }

    // ── Framing ─────────────────────────────────────────────

    fn idle(&mut self) -> Result<(), BusError> {
        self.dio.set_high().map_err(pin_err)?;
        self.clk.set_high().map_err(pin_err)?;
        self.half_bit();
        Ok(())
    }

    fn start(&mut self) -> Result<(), BusError> {
        self.dio.set_high().map_err(pin_err)?;
        self.clk.set_high().map_err(pin_err)?;
        self.half_bit();
        self.dio.set_low().map_err(pin_err)?;
        self.half_bit();
        Ok(())
    }

    fn stop(&mut self) -> Result<(), BusError> {
        self.clk.set_low().map_err(pin_err)?;
        self.half_bit();
        self.dio.set_low().map_err(pin_err)?;
        self.half_bit();
        self.clk.set_high().map_err(pin_err)?;
        self.half_bit();
        self.dio.set_high().map_err(pin_err)?;
        self.half_bit();
        Ok(())
    }

    // ── Byte level ──────────────────────────────────────────

    fn write_byte(&mut self, byte: u8) -> Result<(), BusError> {
        for i in 0..8 {
            self.clk.set_low().map_err(pin_err)?;
            if byte & (1 << i) != 0 {
                self.dio.set_high().map_err(pin_err)?;
            } else {
                self.dio.set_low().map_err(pin_err)?;
            }
            self.half_bit();
            self.clk.set_high().map_err(pin_err)?;
            self.half_bit();
        }

        // ninth clock: release DIO, chip answers low
        self.clk.set_low().map_err(pin_err)?;
        self.dio.set_high().map_err(pin_err)?;
        self.half_bit();
        self.clk.set_high().map_err(pin_err)?;
        self.half_bit();
        let ack = self.dio.is_low().map_err(pin_err)?;
        self.clk.set_low().map_err(pin_err)?;
        self.half_bit();

        if ack { Ok(()) } else { Err(BusError::Nack) }
    }

    fn read_byte(&mut self) -> Result<u8, BusError> {
        let mut byte = 0u8;
        self.dio.set_high().map_err(pin_err)?;
        for i in 0..8 {
            self.clk.set_low().map_err(pin_err)?;
            self.half_bit();
            self.clk.set_high().map_err(pin_err)?;
            self.half_bit();
            if self.dio.is_high().map_err(pin_err)? {
                byte |= 1 << i;
            }
        }

        // ack clock; the chip drives it, nothing to check on our side
        self.clk.set_low().map_err(pin_err)?;
        self.half_bit();
        self.clk.set_high().map_err(pin_err)?;
        self.half_bit();
        self.clk.set_low().map_err(pin_err)?;
        Ok(byte)
    }

    fn send(&mut self, cmd: u8, data: &[u8]) -> Result<(), BusError> {
        self.write_byte(cmd)?;
        for &b in data {
            self.write_byte(b)?;
        }
        Ok(())
    }

    fn receive(&mut self, cmd: u8, buf: &mut [u8]) -> Result<(), BusError> {
        self.write_byte(cmd)?;
        for b in buf.iter_mut() {
            *b = self.read_byte()?;
        }
        Ok(())
    }

    #[inline]
    fn half_bit(&mut self) {
        self.delay.delay_us(self.config.bit_delay_us);
    }

    // a failed transfer must still leave the bus idle for the next one
    fn finish<T>(&mut self, res: Result<T, BusError>) -> Result<T, BusError> {
        match res {
            Ok(v) => {
                self.stop()?;
                Ok(v)
            }
            Err(e) => {
                debug!("tm1637: bus transfer aborted: {:?}", e);
                let _ = self.stop();
                Err(e)
            }
        }
    }
}

impl<CLK, DIO, D> Interface for TwoWire<CLK, DIO, D>
where
    CLK: OutputPin,
    DIO: OutputPin + InputPin,
    D: DelayNs,
{
    type Error = BusError;

    fn init(&mut self) -> Result<(), BusError> {
        self.idle()
    }

    fn deinit(&mut self) -> Result<(), BusError> {
        self.idle()
    }

    fn write_command(&mut self, cmd: u8, data: &[u8]) -> Result<(), BusError> {
        self.start()?;
        let res = self.send(cmd, data);
        self.finish(res)
    }

    fn read_command(&mut self, cmd: u8, buf: &mut [u8]) -> Result<(), BusError> {
        self.start()?;
        let res = self.receive(cmd, buf);
        self.finish(res)
    }
}
