//! # In-memory DryIce model
//!
//! A register file that behaves enough like the hardware to exercise the driver on a host:
//!
//! - DSR is write-one-to-clear and reading it clears WCF
//! - Lock bits in DCR can be set but never cleared by a write, and a locked time counter keeps
//!   its enable bit
//! - Every synchronized write is acknowledged with WCF, unless an [`Ack`] was queued for it
//! - A write acknowledged with WEF is still stored ([`Ack::Error`]), unless it was queued as
//!   [`Ack::Rejected`]
//! - Every access is logged
//!
//! All handles returned by `clone()` share the same register file, so a test can keep one while
//! the driver owns another.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_time::duration::Microseconds;

use crate::clock::{ClockError, InputClock};
use crate::delay::Delay;
use crate::regs::{Control, Register, Registers, Status};

/// How the model acknowledges one synchronized write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
    /// Store the value and raise WCF
    Complete,
    /// Store the value and raise WEF, the write landed but was flagged
    Error,
    /// Drop the value and raise WEF
    Rejected,
    /// Store the value and raise nothing
    Silent,
}

const LOCKS: Control = Control::TDCHL
    .union(Control::TDCSL)
    .union(Control::KSSL)
    .union(Control::MCHL)
    .union(Control::MCSL)
    .union(Control::TCHL)
    .union(Control::TCSL)
    .union(Control::FSHL);

#[derive(Default)]
struct State {
    file: [u32; 16],
    writes: Vec<(Register, u32)>,
    reads: Vec<Register>,
    acks: VecDeque<Ack>,
    stuck: u32,
}

impl State {
    fn slot(reg: Register) -> usize {
        reg.offset() / 4
    }
}

#[derive(Clone, Default)]
pub struct MockRegisters {
    state: Rc<RefCell<State>>,
}

impl MockRegisters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset a register without logging an access
    pub fn with(self, reg: Register, value: u32) -> Self {
        self.set(reg, value);
        self
    }

    pub fn set(&self, reg: Register, value: u32) {
        self.state.borrow_mut().file[State::slot(reg)] = value;
    }

    /// Current register contents, without the side effects of a hardware read
    pub fn peek(&self, reg: Register) -> u32 {
        self.state.borrow().file[State::slot(reg)]
    }

    pub fn peek_status(&self) -> Status {
        Status::from_bits_retain(self.peek(Register::Dsr))
    }

    pub fn peek_control(&self) -> Control {
        Control::from_bits_retain(self.peek(Register::Dcr))
    }

    /// Queue the acknowledgement for the next synchronized write
    pub fn ack_next(&self, ack: Ack) {
        self.state.borrow_mut().acks.push_back(ack);
    }

    /// Make status bits immune to write-one-to-clear
    pub fn stick(&self, flags: Status) {
        self.state.borrow_mut().stuck |= flags.bits();
    }

    pub fn writes(&self) -> Vec<(Register, u32)> {
        self.state.borrow().writes.clone()
    }

    pub fn writes_to(&self, reg: Register) -> Vec<u32> {
        self.state
            .borrow()
            .writes
            .iter()
            .filter(|(r, _)| *r == reg)
            .map(|(_, v)| *v)
            .collect()
    }

    pub fn reads_of(&self, reg: Register) -> usize {
        self.state.borrow().reads.iter().filter(|r| **r == reg).count()
    }

    pub fn clear_log(&self) {
        let mut state = self.state.borrow_mut();
        state.writes.clear();
        state.reads.clear();
    }
}

impl Registers for MockRegisters {
    fn read(&mut self, reg: Register) -> u32 {
        let mut state = self.state.borrow_mut();
        state.reads.push(reg);

        let slot = State::slot(reg);
        let value = state.file[slot];
        if reg == Register::Dsr {
            state.file[slot] &= !Status::WCF.bits();
        }

        value
    }

    fn write(&mut self, reg: Register, value: u32) {
        let mut state = self.state.borrow_mut();
        state.writes.push((reg, value));

        let ack = if reg.is_synchronized() {
            Some(state.acks.pop_front().unwrap_or(Ack::Complete))
        } else {
            None
        };

        let slot = State::slot(reg);
        match reg {
            _ if ack == Some(Ack::Rejected) => {}
            Register::Dsr => {
                let clear = value & !state.stuck;
                state.file[slot] &= !clear;
            }
            Register::Dcr => {
                let old = Control::from_bits_retain(state.file[slot]);
                let mut new = Control::from_bits_retain(value) | (old & LOCKS);
                // A locked time counter keeps its enable bit
                if old.intersects(Control::TCHL | Control::TCSL) {
                    new.set(Control::TCE, old.contains(Control::TCE));
                }
                state.file[slot] = new.bits();
            }
            _ => state.file[slot] = value,
        }

        let dsr = State::slot(Register::Dsr);
        match ack {
            Some(Ack::Complete) => state.file[dsr] |= Status::WCF.bits(),
            Some(Ack::Error | Ack::Rejected) => state.file[dsr] |= Status::WEF.bits(),
            Some(Ack::Silent) | None => {}
        }
    }
}

/// Records delays instead of spending them
#[derive(Clone, Default)]
pub struct MockDelay {
    elapsed: Rc<Cell<u64>>,
    calls: Rc<Cell<usize>>,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total time waited, in microseconds
    pub fn elapsed(&self) -> u64 {
        self.elapsed.get()
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Delay for MockDelay {
    fn delay(&mut self, duration: Microseconds<u32>) {
        self.elapsed.set(self.elapsed.get() + u64::from(duration.0));
        self.calls.set(self.calls.get() + 1);
    }
}

#[derive(Clone, Default)]
pub struct MockClock {
    enabled: Rc<Cell<bool>>,
    broken: Rc<Cell<bool>>,
}

impl MockClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock whose gate refuses to open
    pub fn broken() -> Self {
        let clock = Self::default();
        clock.broken.set(true);
        clock
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }
}

impl InputClock for MockClock {
    fn enable(&mut self) -> Result<(), ClockError> {
        if self.broken.get() {
            return Err(ClockError);
        }
        self.enabled.set(true);
        Ok(())
    }

    fn disable(&mut self) {
        self.enabled.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_write_one_to_clear() {
        let sticky = Status::NVF | Status::SVF;
        let mut regs = MockRegisters::new().with(Register::Dsr, sticky.bits());
        regs.write(Register::Dsr, Status::NVF.bits());

        assert_eq!(regs.peek_status(), Status::SVF | Status::WCF);
    }

    #[test]
    fn status_read_clears_write_complete() {
        let mut regs = MockRegisters::new();
        regs.write(Register::Dgpr, 1);

        assert_eq!(regs.read(Register::Dsr), Status::WCF.bits());
        assert_eq!(regs.read(Register::Dsr), 0);
    }

    #[test]
    fn lock_bits_cannot_be_cleared() {
        let mut regs = MockRegisters::new().with(Register::Dcr, Control::TDCSL.bits());
        regs.write(Register::Dcr, Control::TCE.bits());

        assert_eq!(regs.peek_control(), Control::TDCSL | Control::TCE);
    }

    #[test]
    fn locked_counter_keeps_enable_bit() {
        let locked = Control::TCHL | Control::TCE;
        let mut regs = MockRegisters::new().with(Register::Dcr, locked.bits());
        regs.write(Register::Dcr, Control::TDCSL.bits());
        assert_eq!(regs.peek_control(), Control::TCHL | Control::TCE | Control::TDCSL);

        let mut regs = MockRegisters::new().with(Register::Dcr, Control::TCSL.bits());
        regs.write(Register::Dcr, Control::TCE.bits());
        assert_eq!(regs.peek_control(), Control::TCSL);
    }

    #[test]
    fn queued_acks_apply_in_order() {
        let mut regs = MockRegisters::new();
        regs.ack_next(Ack::Error);
        regs.ack_next(Ack::Silent);

        regs.write(Register::Dtcmr, 7);
        assert_eq!(regs.peek_status(), Status::WEF);

        regs.write(Register::Dsr, Status::WEF.bits());
        assert_eq!(regs.peek_status(), Status::empty());

        regs.write(Register::Dtclr, 0);
        assert_eq!(regs.peek_status(), Status::WCF);
        assert_eq!(regs.peek(Register::Dtcmr), 7);
    }

    #[test]
    fn rejected_write_is_dropped() {
        let mut regs = MockRegisters::new().with(Register::Dcamr, 5);
        regs.ack_next(Ack::Rejected);

        regs.write(Register::Dcamr, 9);

        assert_eq!(regs.peek(Register::Dcamr), 5);
        assert_eq!(regs.peek_status(), Status::WEF);
    }

    #[test]
    fn interrupt_enable_writes_are_not_acknowledged() {
        let mut regs = MockRegisters::new();
        regs.write(Register::Dier, 0);

        assert_eq!(regs.peek_status(), Status::empty());
    }
}
