//! Seven-segment glyphs in TM1637 bit order
//!
//! Segment layout:
//! ```text
//!    AAAAA
//!   F     B
//!   F     B
//!    GGGGG
//!   E     C
//!   E     C
//!    DDDDD  DP
//! ```
//! Bit 0 is segment A, bit 6 is G and bit 7 drives the decimal point (or
//! the colon on clock modules).

use core::ops::{BitOr, BitOrAssign};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Segments(pub u8);

impl Segments {
    pub const A: u8 = 0b0000_0001;
    pub const B: u8 = 0b0000_0010;
    pub const C: u8 = 0b0000_0100;
    pub const D: u8 = 0b0000_1000;
    pub const E: u8 = 0b0001_0000;
    pub const F: u8 = 0b0010_0000;
    pub const G: u8 = 0b0100_0000;
    pub const DP: u8 = 0b1000_0000;

    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn from_digit(digit: u8) -> Option<Self> {
        DIGITS.get(digit as usize).map(|&bits| Self(bits))
    }

    pub fn contains(&self, segment: u8) -> bool {
        (self.0 & segment) != 0
    }

    pub const fn with_dp(self) -> Self {
        Self(self.0 | Self::DP)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for Segments {
    type Output = Segments;
    fn bitor(self, rhs: Segments) -> Self::Output {
        Segments(self.0 | rhs.0)
    }
}

impl BitOr<u8> for Segments {
    type Output = Segments;
    fn bitor(self, rhs: u8) -> Self::Output {
        Segments(self.0 | rhs)
    }
}

impl BitOrAssign<u8> for Segments {
    fn bitor_assign(&mut self, rhs: u8) {
        self.0 |= rhs;
    }
}

/// 0..9
pub const DIGITS: [u8; 10] = [0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7D, 0x07, 0x7F, 0x6F];

pub const MINUS: u8 = Segments::G;
pub const BLANK: u8 = 0x00;

pub fn digit(d: u8) -> Option<u8> {
    DIGITS.get(d as usize).copied()
}

/// Glyph for a character, where seven segments can draw something
/// recognisable. Letters are case-insensitive.
pub fn encode_char(c: char) -> Option<u8> {
    let bits = match c.to_ascii_uppercase() {
        '0'..='9' => DIGITS[c as usize - '0' as usize],
        'A' => 0x77,
        'B' => 0x7C,
        'C' => 0x39,
        'D' => 0x5E,
        'E' => 0x79,
        'F' => 0x71,
        'G' => 0x3D,
        'H' => 0x76,
        'I' => 0x30,
        'J' => 0x1E,
        'L' => 0x38,
        'N' => 0x54,
        'O' => 0x5C,
        'P' => 0x73,
        'R' => 0x50,
        'S' => 0x6D,
        'T' => 0x78,
        'U' => 0x3E,
        'Y' => 0x6E,
        '-' => MINUS,
        '_' => Segments::D,
        '=' => Segments::G | Segments::D,
        ' ' => BLANK,
        _ => return None,
    };
    Some(bits)
}

/// Encode `s` into `out`, one grid per glyph. A `.` lights the decimal
/// point of the glyph before it (or stands alone if there is none).
/// Characters without a glyph are rendered blank. Returns the number of
/// grids written; extra input is dropped.
pub fn encode_str(s: &str, out: &mut [u8]) -> usize {
    let mut n = 0;
    for c in s.chars() {
        if c == '.' {
            if n > 0 && out[n - 1] & Segments::DP == 0 {
                out[n - 1] |= Segments::DP;
                continue;
            }
            if n == out.len() {
                break;
            }
            out[n] = Segments::DP;
            n += 1;
            continue;
        }
        if n == out.len() {
            break;
        }
        out[n] = encode_char(c).unwrap_or(BLANK);
        n += 1;
    }
    n
}
