//! GPIO |  Function   |      Notes
//! -----+-------------+----------------------------------------
//!  4   | TM1637 CLK  | Push-pull output, idles high
//!  5   | TM1637 DIO  | Open drain + input, module has a 10K pull-up
//!
//! Any free GPIO works; these two sit next to 3V3/GND on the C3 devkit
//! header so a 4-wire module plugs straight in.

// ----- TM1637 display -----
pub const TM1637_CLK: u8 = 4;
pub const TM1637_DIO: u8 = 5;
