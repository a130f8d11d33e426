//! Ready-to-use display with sensible defaults
//!
//! Wraps [`Tm1637`] with the bring-up sequence most boards want:
//! auto-increment addressing, test mode off, full-ish brightness, blank
//! grids, display on. Adds text and number output on top of the raw
//! segment API.

use log::error;

use crate::drivers::interface::Interface;
use crate::drivers::tm1637::{AddressMode, Error, GRIDS, KeyScan, PulseWidth, Tm1637};
use crate::font;

pub const DEFAULT_ADDRESS_MODE: AddressMode = AddressMode::AutoIncrement;
pub const DEFAULT_PULSE_WIDTH: PulseWidth = PulseWidth::Div14_16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub address_mode: AddressMode,
    pub pulse_width: PulseWidth,
    /// Digits actually fitted on the module (4 on most clock boards).
    pub grids: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address_mode: DEFAULT_ADDRESS_MODE,
            pulse_width: DEFAULT_PULSE_WIDTH,
            grids: GRIDS,
        }
    }
}

impl Config {
    pub fn with_pulse_width(mut self, pulse_width: PulseWidth) -> Self {
        self.pulse_width = pulse_width;
        self
    }

    pub fn with_address_mode(mut self, address_mode: AddressMode) -> Self {
        self.address_mode = address_mode;
        self
    }

    pub fn with_grids(mut self, grids: u8) -> Self {
        self.grids = grids.clamp(1, GRIDS);
        self
    }
}

pub struct Basic<I> {
    tm: Tm1637<I>,
    config: Config,
}

impl<I: Interface> Basic<I> {
    pub fn new(interface: I, config: Config) -> Self {
        Self {
            tm: Tm1637::new(interface),
            config,
        }
    }

    /// Bring the chip up. On failure the bus is closed again (best effort)
    /// and the first error is returned.
    pub fn init(&mut self) -> Result<(), Error<I::Error>> {
        self.tm.init().inspect_err(|_| error!("tm1637: init failed."))?;

        if let Err(e) = self.configure() {
            let _ = self.tm.deinit();
            return Err(e);
        }
        Ok(())
    }

    fn configure(&mut self) -> Result<(), Error<I::Error>> {
        self.tm
            .set_address_mode(self.config.address_mode)
            .inspect_err(|_| error!("tm1637: set address mode failed."))?;
        self.tm
            .set_test_mode(false)
            .inspect_err(|_| error!("tm1637: set test mode failed."))?;
        self.tm
            .set_pulse_width(self.config.pulse_width)
            .inspect_err(|_| error!("tm1637: set pulse width failed."))?;
        self.tm
            .clear_segment()
            .inspect_err(|_| error!("tm1637: clear segment failed."))?;
        self.tm
            .set_display(true)
            .inspect_err(|_| error!("tm1637: set display failed."))?;
        Ok(())
    }

    pub fn deinit(&mut self) -> Result<(), Error<I::Error>> {
        self.tm.deinit()
    }

    pub fn config(&self) -> Config {
        self.config
    }

    pub fn driver_mut(&mut self) -> &mut Tm1637<I> {
        &mut self.tm
    }

    pub fn release(self) -> I {
        self.tm.release()
    }

    // ── Segment I/O ─────────────────────────────────────────

    pub fn write(&mut self, addr: u8, data: &[u8]) -> Result<(), Error<I::Error>> {
        self.tm.write_segment(addr, data)
    }

    pub fn clear(&mut self) -> Result<(), Error<I::Error>> {
        self.tm.clear_segment()
    }

    pub fn display_on(&mut self) -> Result<(), Error<I::Error>> {
        self.tm.set_display(true)
    }

    pub fn display_off(&mut self) -> Result<(), Error<I::Error>> {
        self.tm.set_display(false)
    }

    pub fn read(&mut self) -> Result<KeyScan, Error<I::Error>> {
        self.tm.read_segment()
    }

    // ── Text ────────────────────────────────────────────────

    // public field; `with_grids` may have been bypassed
    fn grids(&self) -> usize {
        self.config.grids.clamp(1, GRIDS) as usize
    }

    /// Show `s` left-aligned; grids past the text are blanked.
    pub fn write_str(&mut self, s: &str) -> Result<(), Error<I::Error>> {
        let grids = self.grids();
        let mut glyphs = [font::BLANK; GRIDS as usize];
        font::encode_str(s, &mut glyphs[..grids]);
        self.tm.write_segment(0, &glyphs[..grids])
    }

    /// Show `value` right-aligned. Fails with `OutOfRange` if it needs more
    /// digits than the module has.
    pub fn write_number(&mut self, value: i32) -> Result<(), Error<I::Error>> {
        let grids = self.grids();
        let mut glyphs = [font::BLANK; GRIDS as usize];

        let mut rest = value.unsigned_abs();
        let mut len = 0;
        loop {
            len += 1;
            if len <= grids {
                glyphs[grids - len] = font::DIGITS[(rest % 10) as usize];
            }
            rest /= 10;
            if rest == 0 {
                break;
            }
        }
        if value < 0 {
            len += 1;
            if len <= grids {
                glyphs[grids - len] = font::MINUS;
            }
        }

        if len > grids {
            error!("tm1637: {} does not fit in {} digits.", value, grids);
            return Err(Error::OutOfRange { addr: 0, len });
        }
        self.tm.write_segment(0, &glyphs[..grids])
    }
}

#[cfg(test)]
mod tests {
    use std::vec;

    use super::*;
    use crate::mock::{MockError, MockInterface, Op};

    fn ready(config: Config) -> Basic<MockInterface> {
        let mut basic = Basic::new(MockInterface::new(), config);
        basic.init().unwrap();
        basic.driver_mut().interface_mut().ops.clear();
        basic
    }

    #[test]
    fn init_runs_default_sequence() {
        let mut basic = Basic::new(MockInterface::new(), Config::default());
        basic.init().unwrap();
        assert_eq!(
            basic.driver_mut().interface_mut().ops,
            vec![
                Op::Init,
                Op::Write(0x40, vec![]), // auto increment
                Op::Write(0x40, vec![]), // test mode off
                Op::Write(0x87, vec![]), // 14/16
                Op::Write(0x40, vec![]), // clear: data command
                Op::Write(0xC0, vec![0; 6]),
                Op::Write(0x8F, vec![]), // display on
            ]
        );
        let tm = basic.driver_mut();
        assert_eq!(tm.display(), Ok(true));
        assert_eq!(tm.pulse_width(), Ok(PulseWidth::Div14_16));
    }

    #[test]
    fn init_failure_closes_driver() {
        // ops: Init, address mode, test mode (fails), power down, deinit
        let mut basic = Basic::new(MockInterface::failing_at(2), Config::default());
        assert_eq!(basic.init(), Err(Error::Interface(MockError)));
        let tm = basic.driver_mut();
        assert!(!tm.is_initialized());
        assert_eq!(tm.interface_mut().ops.last(), Some(&Op::Deinit));
    }

    #[test]
    fn display_toggles_keep_brightness() {
        let mut basic = ready(Config::default().with_pulse_width(PulseWidth::Div4_16));
        basic.display_off().unwrap();
        basic.display_on().unwrap();
        assert_eq!(
            basic.driver_mut().interface_mut().writes(),
            vec![(0x82, vec![]), (0x8A, vec![])]
        );
    }

    #[test]
    fn write_and_read_pass_through() {
        let mut basic = ready(Config::default());
        basic.write(1, &[0x06]).unwrap();
        basic.driver_mut().interface_mut().replies.push_back(0x0A);
        assert_eq!(basic.read(), Ok(KeyScan { seg: 2, k: 1 }));
        basic.clear().unwrap();
    }

    #[test]
    fn number_is_right_aligned() {
        let mut basic = ready(Config::default().with_grids(4));
        basic.write_number(42).unwrap();
        assert_eq!(
            basic.driver_mut().interface_mut().writes(),
            vec![(0x40, vec![]), (0xC0, vec![0, 0, 0x66, 0x5B])]
        );
    }

    #[test]
    fn negative_number_and_overflow() {
        let mut basic = ready(Config::default().with_grids(4));
        basic.write_number(-123).unwrap();
        assert_eq!(
            basic.driver_mut().interface_mut().writes()[1],
            (0xC0, vec![0x40, 0x06, 0x5B, 0x4F])
        );
        assert_eq!(
            basic.write_number(12345),
            Err(Error::OutOfRange { addr: 0, len: 5 })
        );
    }

    #[test]
    fn text_blanks_unused_grids() {
        let mut basic = ready(Config::default());
        basic.write_str("12.3").unwrap();
        assert_eq!(
            basic.driver_mut().interface_mut().writes()[1],
            (0xC0, vec![0x06, 0xDB, 0x4F, 0, 0, 0])
        );
    }

    #[test]
    fn grid_count_is_clamped() {
        assert_eq!(Config::default().with_grids(9).grids, 6);
        assert_eq!(Config::default().with_grids(0).grids, 1);
    }

    #[test]
    fn oversized_grid_count_is_limited_to_chip() {
        let mut basic = ready(Config {
            grids: 8,
            ..Config::default()
        });
        basic.write_str("12").unwrap();
        basic.write_number(7).unwrap();
        assert_eq!(
            basic.driver_mut().interface_mut().writes(),
            vec![
                (0x40, vec![]),
                (0xC0, vec![0x06, 0x5B, 0, 0, 0, 0]),
                (0x40, vec![]),
                (0xC0, vec![0, 0, 0, 0, 0, 0x07]),
            ]
        );
    }

    #[test]
    fn extreme_numbers() {
        let mut basic = ready(Config::default());
        basic.write_number(0).unwrap();
        assert_eq!(
            basic.driver_mut().interface_mut().writes()[1],
            (0xC0, vec![0, 0, 0, 0, 0, 0x3F])
        );
        assert_eq!(
            basic.write_number(i32::MIN),
            Err(Error::OutOfRange { addr: 0, len: 11 })
        );
        basic.write_number(-99999).unwrap();
        assert_eq!(
            basic.driver_mut().interface_mut().writes()[3],
            (0xC0, vec![0x40, 0x6F, 0x6F, 0x6F, 0x6F, 0x6F])
        );
    }
}
