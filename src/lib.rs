// TM1637 LED display driver (two-wire bus, 6 grids, key scan)

#![no_std]

#[cfg(test)]
extern crate std;

pub mod basic;
#[cfg(feature = "esp32c3")]
pub mod board;
pub mod drivers;
pub mod font;
pub mod selftest;

#[cfg(test)]
mod mock;

pub use basic::{Basic, Config};
pub use drivers::bitbang::{BusConfig, BusError, TwoWire};
pub use drivers::interface::Interface;
pub use drivers::tm1637::{AddressMode, Error, Info, KeyScan, PulseWidth, Tm1637};
