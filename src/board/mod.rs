//! ESP32-C3 devkit wiring for a TM1637 display module
//!
//! Maps the module's CLK/DIO lines to GPIOs so application code only
//! sees a ready [`Bus`]. Pin numbers are documented in [`pins`].

pub mod pins;

use esp_hal::{
    delay::Delay,
    gpio::{DriveMode, Flex, Level, Output, OutputConfig, Pull},
    peripherals::Peripherals,
};

use log::info;

use crate::drivers::bitbang::{BusConfig, TwoWire};

// Type Aliases
pub type Bus = TwoWire<Output<'static>, Flex<'static>, Delay>;

/// Complete board hardware, ready for driver initialization.
pub struct Board {
    pub bus: Bus,
}

impl Board {
    pub fn init(p: Peripherals) -> Self {
        let bus = Self::init_bus(p, BusConfig::default());
        info!(
            "tm1637 bus: CLK=GPIO{} DIO=GPIO{}",
            pins::TM1637_CLK,
            pins::TM1637_DIO
        );
        Board { bus }
    }

    fn init_bus(p: Peripherals, config: BusConfig) -> Bus {
        // CLK: GPIO4
        let clk = Output::new(p.GPIO4, Level::High, OutputConfig::default());

        // DIO: GPIO5, open drain so the chip can pull it low for ACK/key data
        let mut dio = Flex::new(p.GPIO5);
        dio.apply_output_config(
            &OutputConfig::default()
                .with_drive_mode(DriveMode::OpenDrain)
                .with_pull(Pull::Up),
        );
        dio.set_output_enable(true);
        dio.set_input_enable(true);
        dio.set_high();

        TwoWire::with_config(clk, dio, Delay::new(), config)
    }
}
