// TM1637 LED controller driver (board-independent)
//
// Six grids of up to eight segments plus a 2x8 key scan matrix. The chip
// has three command classes selected by the top two bits of the first
// byte on the bus: data setting (0x40), display control (0x80) and grid
// address (0xC0). None of its registers can be read back, so the driver
// keeps shadow copies of the data and display settings; every setter
// rewrites the whole command from its shadow.

use log::error;

use super::interface::Interface;

/// Number of grid (digit) addresses.
pub const GRIDS: u8 = 6;

/// Largest payload a single transfer may carry.
pub const MAX_PAYLOAD: usize = 16;

// Command classes
mod cmd {
    pub const DATA: u8 = 1 << 6;
    pub const DISPLAY: u8 = 2 << 6;
    pub const ADDRESS: u8 = 3 << 6;
}

// Data setting bits
const DATA_READ_KEYS: u8 = 1 << 1;
const DATA_FIXED_ADDR: u8 = 1 << 2;
const DATA_TEST_MODE: u8 = 1 << 3;

// Display control bits
const DISPLAY_PULSE_MASK: u8 = 0x07;
const DISPLAY_ON: u8 = 1 << 3;

const CHIP_NAME: &str = "Titan Micro Electronics TM1637";
const MANUFACTURER_NAME: &str = "Titan Micro Electronics";
const INTERFACE_NAME: &str = "IIC";
const SUPPLY_VOLTAGE_MIN: f32 = 3.3;
const SUPPLY_VOLTAGE_MAX: f32 = 5.5;
const MAX_CURRENT: f32 = 200.0;
const TEMPERATURE_MIN: f32 = -40.0;
const TEMPERATURE_MAX: f32 = 125.0;
const DRIVER_VERSION: u32 = 1000;

/// Static chip and driver description.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Info {
    pub chip_name: &'static str,
    pub manufacturer_name: &'static str,
    pub interface: &'static str,
    pub supply_voltage_min_v: f32,
    pub supply_voltage_max_v: f32,
    pub max_current_ma: f32,
    pub temperature_min: f32,
    pub temperature_max: f32,
    /// major * 1000 + minor * 100
    pub driver_version: u32,
}

impl Info {
    pub const fn version_major(&self) -> u32 {
        self.driver_version / 1000
    }

    pub const fn version_minor(&self) -> u32 {
        (self.driver_version % 1000) / 100
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum AddressMode {
    /// Address advances by one after every byte.
    #[default]
    AutoIncrement = 0,
    /// Every byte is preceded by its own address command.
    Fixed = 1,
}

/// Segment drive duty cycle, i.e. brightness.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum PulseWidth {
    #[default]
    Div1_16 = 0,
    Div2_16 = 1,
    Div4_16 = 2,
    Div10_16 = 3,
    Div11_16 = 4,
    Div12_16 = 5,
    Div13_16 = 6,
    Div14_16 = 7,
}

impl PulseWidth {
    pub const ALL: [PulseWidth; 8] = [
        PulseWidth::Div1_16,
        PulseWidth::Div2_16,
        PulseWidth::Div4_16,
        PulseWidth::Div10_16,
        PulseWidth::Div11_16,
        PulseWidth::Div12_16,
        PulseWidth::Div13_16,
        PulseWidth::Div14_16,
    ];

    pub const fn from_bits(bits: u8) -> Self {
        match bits & DISPLAY_PULSE_MASK {
            0 => PulseWidth::Div1_16,
            1 => PulseWidth::Div2_16,
            2 => PulseWidth::Div4_16,
            3 => PulseWidth::Div10_16,
            4 => PulseWidth::Div11_16,
            5 => PulseWidth::Div12_16,
            6 => PulseWidth::Div13_16,
            _ => PulseWidth::Div14_16,
        }
    }

    /// Numerator over 16.
    pub const fn sixteenths(self) -> u8 {
        match self {
            PulseWidth::Div1_16 => 1,
            PulseWidth::Div2_16 => 2,
            PulseWidth::Div4_16 => 4,
            PulseWidth::Div10_16 => 10,
            PulseWidth::Div11_16 => 11,
            PulseWidth::Div12_16 => 12,
            PulseWidth::Div13_16 => 13,
            PulseWidth::Div14_16 => 14,
        }
    }
}

/// One key scan byte: `seg` is the segment line (bits 0..2), `k` the key
/// row (bits 3..4).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyScan {
    pub seg: u8,
    pub k: u8,
}

impl KeyScan {
    pub const fn from_raw(raw: u8) -> Self {
        Self {
            seg: raw & 0x07,
            k: (raw >> 3) & 0x03,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error<E> {
    /// The bus reported a failure.
    Interface(E),
    /// Called before `init` or after `deinit`.
    NotInitialized,
    /// `addr + len` runs past the last grid.
    OutOfRange { addr: u8, len: usize },
    /// Transfer longer than [`MAX_PAYLOAD`].
    PayloadTooLong(usize),
}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Error::Interface(e)
    }
}

pub struct Tm1637<I> {
    interface: I,
    inited: bool,
    display_conf: u8,
    data_conf: u8,
}

pub const fn info() -> Info {
    Info {
        chip_name: CHIP_NAME,
        manufacturer_name: MANUFACTURER_NAME,
        interface: INTERFACE_NAME,
        supply_voltage_min_v: SUPPLY_VOLTAGE_MIN,
        supply_voltage_max_v: SUPPLY_VOLTAGE_MAX,
        max_current_ma: MAX_CURRENT,
        temperature_min: TEMPERATURE_MIN,
        temperature_max: TEMPERATURE_MAX,
        driver_version: DRIVER_VERSION,
    }
}

impl<I: Interface> Tm1637<I> {
    pub const fn new(interface: I) -> Self {
        Self {
            interface,
            inited: false,
            display_conf: 0,
            data_conf: 0,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.inited
    }

    pub fn interface_mut(&mut self) -> &mut I {
        &mut self.interface
    }

    /// Hand the bus back. The chip is left as it is.
    pub fn release(self) -> I {
        self.interface
    }

    // ── Lifecycle ───────────────────────────────────────────

    pub fn init(&mut self) -> Result<(), Error<I::Error>> {
        if let Err(e) = self.interface.init() {
            error!("tm1637: iic init failed.");
            return Err(Error::Interface(e));
        }
        self.data_conf = 0;
        self.display_conf = 0;
        self.inited = true;
        Ok(())
    }

    /// Blank the display, then release the bus.
    pub fn deinit(&mut self) -> Result<(), Error<I::Error>> {
        self.check_init()?;

        self.display_conf &= !DISPLAY_ON;
        let command = cmd::DISPLAY | self.display_conf;
        if let Err(e) = self.write(command, &[]) {
            error!("tm1637: power down failed.");
            return Err(e);
        }

        if let Err(e) = self.interface.deinit() {
            error!("tm1637: iic deinit failed.");
            return Err(Error::Interface(e));
        }
        self.inited = false;
        Ok(())
    }

    // ── Display control ─────────────────────────────────────

    pub fn set_pulse_width(&mut self, width: PulseWidth) -> Result<(), Error<I::Error>> {
        self.check_init()?;
        self.display_conf = (self.display_conf & !DISPLAY_PULSE_MASK) | width as u8;
        self.send_display_conf()
    }

    pub fn pulse_width(&self) -> Result<PulseWidth, Error<I::Error>> {
        self.check_init()?;
        Ok(PulseWidth::from_bits(self.display_conf))
    }

    pub fn set_display(&mut self, enable: bool) -> Result<(), Error<I::Error>> {
        self.check_init()?;
        self.display_conf &= !DISPLAY_ON;
        if enable {
            self.display_conf |= DISPLAY_ON;
        }
        self.send_display_conf()
    }

    pub fn display(&self) -> Result<bool, Error<I::Error>> {
        self.check_init()?;
        Ok(self.display_conf & DISPLAY_ON != 0)
    }

    // ── Data setting ────────────────────────────────────────

    pub fn set_address_mode(&mut self, mode: AddressMode) -> Result<(), Error<I::Error>> {
        self.check_init()?;
        self.data_conf &= !DATA_FIXED_ADDR;
        if mode == AddressMode::Fixed {
            self.data_conf |= DATA_FIXED_ADDR;
        }
        self.send_data_conf()
    }

    pub fn address_mode(&self) -> Result<AddressMode, Error<I::Error>> {
        self.check_init()?;
        Ok(if self.data_conf & DATA_FIXED_ADDR != 0 {
            AddressMode::Fixed
        } else {
            AddressMode::AutoIncrement
        })
    }

    pub fn set_test_mode(&mut self, enable: bool) -> Result<(), Error<I::Error>> {
        self.check_init()?;
        self.data_conf &= !DATA_TEST_MODE;
        if enable {
            self.data_conf |= DATA_TEST_MODE;
        }
        self.send_data_conf()
    }

    pub fn test_mode(&self) -> Result<bool, Error<I::Error>> {
        self.check_init()?;
        Ok(self.data_conf & DATA_TEST_MODE != 0)
    }

    // ── Segments ────────────────────────────────────────────

    /// Write segment bytes starting at grid `addr`, honouring the current
    /// address mode.
    pub fn write_segment(&mut self, addr: u8, data: &[u8]) -> Result<(), Error<I::Error>> {
        self.check_init()?;
        if addr as usize + data.len() > GRIDS as usize {
            error!("tm1637: addr + len > {}.", GRIDS);
            return Err(Error::OutOfRange {
                addr,
                len: data.len(),
            });
        }
        self.write_grids(addr, data)
    }

    /// Blank all six grids.
    pub fn clear_segment(&mut self) -> Result<(), Error<I::Error>> {
        self.check_init()?;
        self.write_grids(0, &[0u8; GRIDS as usize])
    }

    pub fn read_segment(&mut self) -> Result<KeyScan, Error<I::Error>> {
        self.check_init()?;
        let mut raw = [0u8; 1];
        self.read(cmd::DATA | self.data_conf | DATA_READ_KEYS, &mut raw)?;
        Ok(KeyScan::from_raw(raw[0]))
    }

    // ── Raw access ──────────────────────────────────────────

    /// Send an arbitrary command byte followed by `data`.
    pub fn set_reg(&mut self, command: u8, data: &[u8]) -> Result<(), Error<I::Error>> {
        self.check_init()?;
        self.write(command, data)
    }

    /// Send an arbitrary command byte and clock `buf.len()` bytes back.
    pub fn get_reg(&mut self, command: u8, buf: &mut [u8]) -> Result<(), Error<I::Error>> {
        self.check_init()?;
        self.read(command, buf)
    }

    // ── Helpers ─────────────────────────────────────────────

    fn check_init(&self) -> Result<(), Error<I::Error>> {
        if self.inited {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }

    fn send_display_conf(&mut self) -> Result<(), Error<I::Error>> {
        self.write(cmd::DISPLAY | self.display_conf, &[])
    }

    fn send_data_conf(&mut self) -> Result<(), Error<I::Error>> {
        self.write(cmd::DATA | self.data_conf, &[])
    }

    // data command first, then either one address command per byte
    // (fixed) or a single address command and a burst (auto increment)
    fn write_grids(&mut self, addr: u8, data: &[u8]) -> Result<(), Error<I::Error>> {
        self.send_data_conf()?;
        if self.data_conf & DATA_FIXED_ADDR != 0 {
            for (i, b) in data.iter().enumerate() {
                self.write(cmd::ADDRESS | (addr + i as u8), core::slice::from_ref(b))?;
            }
            Ok(())
        } else {
            self.write(cmd::ADDRESS | addr, data)
        }
    }

    fn write(&mut self, command: u8, data: &[u8]) -> Result<(), Error<I::Error>> {
        if data.len() > MAX_PAYLOAD {
            error!("tm1637: payload of {} bytes is too long.", data.len());
            return Err(Error::PayloadTooLong(data.len()));
        }
        self.interface.write_command(command, data).map_err(|e| {
            error!("tm1637: write failed.");
            Error::Interface(e)
        })
    }

    fn read(&mut self, command: u8, buf: &mut [u8]) -> Result<(), Error<I::Error>> {
        self.interface.read_command(command, buf).map_err(|e| {
            error!("tm1637: read failed.");
            Error::Interface(e)
        })
    }
}
