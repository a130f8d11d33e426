// Recording doubles for host tests: a scripted `Interface`, and a pair of
// pins sharing one simulated wire so bit-banged traffic can be decoded.

use core::cell::RefCell;
use core::convert::Infallible;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, ErrorKind, ErrorType, InputPin, OutputPin};

use crate::drivers::interface::Interface;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Init,
    Deinit,
    Write(u8, Vec<u8>),
    Read(u8, usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

#[derive(Default)]
pub struct MockInterface {
    pub ops: Vec<Op>,
    // bytes handed out by read_command, front first
    pub replies: VecDeque<u8>,
    // the op with this index (0-based, counting every op) fails
    pub fail_at: Option<usize>,
}

impl MockInterface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(index: usize) -> Self {
        Self {
            fail_at: Some(index),
            ..Self::default()
        }
    }

    pub fn writes(&self) -> Vec<(u8, Vec<u8>)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Write(cmd, data) => Some((*cmd, data.clone())),
                _ => None,
            })
            .collect()
    }

    fn record(&mut self, op: Op) -> Result<(), MockError> {
        let index = self.ops.len();
        self.ops.push(op);
        if self.fail_at == Some(index) {
            Err(MockError)
        } else {
            Ok(())
        }
    }
}

impl Interface for MockInterface {
    type Error = MockError;

    fn init(&mut self) -> Result<(), MockError> {
        self.record(Op::Init)
    }

    fn deinit(&mut self) -> Result<(), MockError> {
        self.record(Op::Deinit)
    }

    fn write_command(&mut self, cmd: u8, data: &[u8]) -> Result<(), MockError> {
        self.record(Op::Write(cmd, data.to_vec()))
    }

    fn read_command(&mut self, cmd: u8, buf: &mut [u8]) -> Result<(), MockError> {
        self.record(Op::Read(cmd, buf.len()))?;
        for b in buf.iter_mut() {
            *b = self.replies.pop_front().unwrap_or(0);
        }
        Ok(())
    }
}

// ── Simulated CLK/DIO wire ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    Start,
    Stop,
    // DIO level latched on a CLK rising edge
    Bit(bool),
}

pub struct Wire {
    clk: bool,
    dio: bool,
    pub events: Vec<Line>,
    // levels the chip drives whenever the master samples DIO; empty = low
    pub replies: VecDeque<bool>,
}

impl Wire {
    pub fn new() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            clk: true,
            dio: true,
            events: Vec::new(),
            replies: VecDeque::new(),
        }))
    }

    pub fn queue_byte(&mut self, byte: u8) {
        for i in 0..8 {
            self.replies.push_back(byte & (1 << i) != 0);
        }
    }

    // Decode every start..stop transfer into bytes (8 bits LSB first + ack slot).
    pub fn frames(&self) -> Vec<Vec<u8>> {
        let mut frames = Vec::new();
        let mut bits: Option<Vec<bool>> = None;
        for ev in &self.events {
            match ev {
                Line::Start => bits = Some(Vec::new()),
                Line::Bit(b) => {
                    if let Some(bits) = bits.as_mut() {
                        bits.push(*b);
                    }
                }
                Line::Stop => {
                    if let Some(bits) = bits.take() {
                        let bytes = bits
                            .chunks_exact(9)
                            .map(|c| {
                                c[..8]
                                    .iter()
                                    .enumerate()
                                    .fold(0u8, |acc, (i, &b)| acc | ((b as u8) << i))
                            })
                            .collect();
                        frames.push(bytes);
                    }
                }
            }
        }
        frames
    }

    pub fn is_idle(&self) -> bool {
        self.clk && self.dio
    }
}

pub struct MockClk(pub Rc<RefCell<Wire>>);
pub struct MockDio(pub Rc<RefCell<Wire>>);

impl ErrorType for MockClk {
    type Error = Infallible;
}

impl OutputPin for MockClk {
    fn set_high(&mut self) -> Result<(), Infallible> {
        let mut w = self.0.borrow_mut();
        if !w.clk {
            w.clk = true;
            let dio = w.dio;
            w.events.push(Line::Bit(dio));
        }
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.borrow_mut().clk = false;
        Ok(())
    }
}

impl ErrorType for MockDio {
    type Error = Infallible;
}

impl OutputPin for MockDio {
    fn set_high(&mut self) -> Result<(), Infallible> {
        let mut w = self.0.borrow_mut();
        if w.clk && !w.dio {
            w.events.push(Line::Stop);
        }
        w.dio = true;
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Infallible> {
        let mut w = self.0.borrow_mut();
        if w.clk && w.dio {
            w.events.push(Line::Start);
        }
        w.dio = false;
        Ok(())
    }
}

impl InputPin for MockDio {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.borrow_mut().replies.pop_front().unwrap_or(false))
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        self.is_high().map(|high| !high)
    }
}

// Pin whose every operation fails.
#[derive(Debug, Clone, Copy)]
pub struct BrokenPin;

#[derive(Debug, Clone, Copy)]
pub struct BrokenPinError;

impl digital::Error for BrokenPinError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

impl ErrorType for BrokenPin {
    type Error = BrokenPinError;
}

impl OutputPin for BrokenPin {
    fn set_high(&mut self) -> Result<(), BrokenPinError> {
        Err(BrokenPinError)
    }

    fn set_low(&mut self) -> Result<(), BrokenPinError> {
        Err(BrokenPinError)
    }
}

impl InputPin for BrokenPin {
    fn is_high(&mut self) -> Result<bool, BrokenPinError> {
        Err(BrokenPinError)
    }

    fn is_low(&mut self) -> Result<bool, BrokenPinError> {
        Err(BrokenPinError)
    }
}

// Delay that only accumulates the requested time.
#[derive(Default)]
pub struct CountingDelay {
    pub ns: u64,
}

impl CountingDelay {
    pub fn millis(&self) -> u64 {
        self.ns / 1_000_000
    }
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.ns += ns as u64;
    }
}
