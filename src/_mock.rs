use core::cell::RefCell;
use std::{rc::Rc, vec::Vec};

use embedded_hal::delay::DelayNs;

use crate::{interface::Channel, timing::Clock};

#[derive(Default)]
struct TimeState {
    now_us: u64,
    delays: Vec<u32>,
}

/// Shared fake time: the clock reads it, the delay advances it.
#[derive(Clone, Default)]
pub struct MockTime(Rc<RefCell<TimeState>>);

impl MockTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clock(&self) -> MockClock {
        MockClock(self.clone())
    }

    pub fn delay(&self) -> MockDelay {
        MockDelay(self.clone())
    }

    pub fn now_us(&self) -> u64 {
        self.0.borrow().now_us
    }

    pub fn advance_us(&self, us: u64) {
        self.0.borrow_mut().now_us += us;
    }

    /// Every delay requested so far, in µs.
    pub fn delays(&self) -> Vec<u32> {
        self.0.borrow().delays.clone()
    }
}

pub struct MockClock(MockTime);

impl Clock for MockClock {
    fn now_us(&mut self) -> u64 {
        self.0.now_us()
    }
}

pub struct MockDelay(MockTime);

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.delay_us(ns.div_ceil(1_000));
    }

    fn delay_us(&mut self, us: u32) {
        let mut state = self.0 .0.borrow_mut();
        state.now_us += u64::from(us);
        state.delays.push(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay_us(ms.saturating_mul(1_000));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

/// One accepted `write` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Write {
    pub at_us: u64,
    pub bytes: Vec<u8>,
}

/// Channel recording every write, optionally giving up after a byte budget.
///
/// Once the budget runs short the call returns a short count; a call made with
/// the budget exhausted fails.
pub struct MockChannel {
    time: MockTime,
    writes: Vec<Write>,
    budget: Option<usize>,
}

impl MockChannel {
    pub fn new(time: &MockTime) -> Self {
        Self {
            time: time.clone(),
            writes: Vec::new(),
            budget: None,
        }
    }

    pub fn with_budget(time: &MockTime, budget: usize) -> Self {
        Self {
            budget: Some(budget),
            ..Self::new(time)
        }
    }

    pub fn set_budget(&mut self, budget: Option<usize>) {
        self.budget = budget;
    }

    pub fn writes(&self) -> &[Write] {
        &self.writes
    }

    pub fn calls(&self) -> usize {
        self.writes.len()
    }

    /// Every byte accepted so far, in order.
    pub fn bytes(&self) -> Vec<u8> {
        self.writes.iter().flat_map(|w| w.bytes.iter().copied()).collect()
    }
}

impl Channel for MockChannel {
    type Error = MockError;

    fn write(&mut self, bytes: &[u8]) -> Result<usize, MockError> {
        let n = match self.budget {
            Some(0) => return Err(MockError),
            Some(budget) => budget.min(bytes.len()),
            None => bytes.len(),
        };
        if let Some(budget) = self.budget.as_mut() {
            *budget -= n;
        }
        self.writes.push(Write {
            at_us: self.time.now_us(),
            bytes: bytes[..n].to_vec(),
        });
        Ok(n)
    }
}

/// Strips the control lines from `bytes` and returns the nibble carried by
/// every frame, skipping filler.
pub fn decode_frames(bytes: &[u8], enable: u8, control: u8) -> Vec<u8> {
    bytes
        .iter()
        .filter(|&&b| b & enable != 0)
        .map(|&b| b & !control)
        .collect()
}
