//! # Synchronized register writes
//!
//! Writes cross from the bus clock into the unit's 32.768 kHz domain and only one of them can be
//! in flight. There are two ways of knowing a write has landed
//!
//! - [`BusyWait`] writes and then sleeps for longer than the hardware needs. Used while the unit
//!   is brought up, before the write complete interrupt means anything.
//! - [`Polling`] writes and then watches DSR for write complete or write error, giving up after
//!   a timeout. Used for everything after that. A write error is cleared once, and registers that
//!   read back what was written are checked for the value afterwards.
//!
//! Both implement [`SyncWrite`] so the code issuing writes doesn't care which one is in use.
//!
//! Reading DSR clears the write complete flag, so nothing may read DSR between issuing a write
//! and checking for its completion.

use dryice_hal::{Delay, Microseconds, Register, Registers, Status};

use crate::config::Config;
use crate::error::{Error, Result};

pub trait SyncWrite {
    /// Write `value` to `reg` and return once the unit has taken it
    fn write<R: Registers, D: Delay>(
        &self,
        regs: &mut R,
        delay: &mut D,
        reg: Register,
        value: u32,
    ) -> Result<()>;
}

/// Fixed delay writer.
///
/// Write errors are not checked: the only cause is a second write inside the settle window, which
/// the fixed delay rules out.
#[derive(Debug, Clone, Copy)]
pub struct BusyWait {
    settle: Microseconds<u32>,
}

impl BusyWait {
    pub fn new(config: &Config) -> Self {
        Self {
            settle: config.settle,
        }
    }
}

impl SyncWrite for BusyWait {
    fn write<R: Registers, D: Delay>(
        &self,
        regs: &mut R,
        delay: &mut D,
        reg: Register,
        value: u32,
    ) -> Result<()> {
        regs.write(reg, value);
        delay.delay(self.settle);
        Ok(())
    }
}

/// Status polling writer
#[derive(Debug, Clone, Copy)]
pub struct Polling {
    config: Config,
}

impl Polling {
    pub fn new(config: &Config) -> Self {
        Self { config: *config }
    }

    /// Clear a write error.
    ///
    /// Clearing takes another write, so whatever caused the error may need fixing before the
    /// flag goes away.
    fn clear_write_error<R: Registers, D: Delay>(
        &self,
        regs: &mut R,
        delay: &mut D,
        reg: Register,
    ) -> Result<()> {
        warn!("Register write error on {}", reg.name());

        regs.write(Register::Dsr, Status::WEF.bits());

        for _ in 0..self.config.clear_retries {
            if !regs.status().contains(Status::WEF) {
                return Ok(());
            }
            delay.delay(self.config.clear_interval);
        }

        error!("Cannot clear write-error flag after writing {}", reg.name());
        Err(Error::WriteError { reg })
    }
}

impl SyncWrite for Polling {
    fn write<R: Registers, D: Delay>(
        &self,
        regs: &mut R,
        delay: &mut D,
        reg: Register,
        value: u32,
    ) -> Result<()> {
        regs.write(reg, value);

        let mut dsr = None;
        for _ in 0..self.config.polls() {
            let status = regs.status();
            if status.intersects(Status::WCF | Status::WEF) {
                dsr = Some(status);
                break;
            }
            delay.delay(self.config.poll_interval);
        }

        let Some(dsr) = dsr else {
            error!("Write to {} timed out", reg.name());
            return Err(Error::IoTimeout { reg });
        };

        if dsr.contains(Status::WEF) {
            self.clear_write_error(regs, delay, reg)?;

            if reg.holds_written_value() && regs.read(reg) != value {
                error!("Write to {} was rejected", reg.name());
                return Err(Error::WriteError { reg });
            }
        }

        trace!("{} <- {:#x}", reg.name(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dryice_hal::mock::{Ack, MockDelay, MockRegisters};

    #[test]
    fn busy_wait_sleeps_without_polling() {
        let mut regs = MockRegisters::new();
        let mut delay = MockDelay::new();

        BusyWait::new(&Config::default())
            .write(&mut regs, &mut delay, Register::Dcamr, 0xffff_ffff)
            .unwrap();

        assert_eq!(regs.writes(), [(Register::Dcamr, 0xffff_ffff)]);
        assert_eq!(regs.reads_of(Register::Dsr), 0);
        assert_eq!(delay.elapsed(), 130);
    }

    #[test]
    fn polling_returns_on_write_complete() {
        let mut regs = MockRegisters::new();
        let mut delay = MockDelay::new();

        Polling::new(&Config::default())
            .write(&mut regs, &mut delay, Register::Dtcmr, 42)
            .unwrap();

        assert_eq!(regs.peek(Register::Dtcmr), 42);
        assert_eq!(regs.reads_of(Register::Dsr), 1);
        assert_eq!(delay.calls(), 0);
    }

    #[test]
    fn polling_times_out_without_acknowledge() {
        let mut regs = MockRegisters::new();
        let mut delay = MockDelay::new();
        regs.ack_next(Ack::Silent);

        let config = Config::default();
        let res = Polling::new(&config).write(&mut regs, &mut delay, Register::Dtclr, 0);

        assert_eq!(res, Err(Error::IoTimeout { reg: Register::Dtclr }));
        assert_eq!(delay.elapsed(), u64::from(config.write_timeout.0));
        // A timeout is not followed by any clearing write
        assert_eq!(regs.writes().len(), 1);
    }

    #[test]
    fn write_error_is_cleared_once() {
        let mut regs = MockRegisters::new();
        let mut delay = MockDelay::new();
        regs.ack_next(Ack::Error);

        Polling::new(&Config::default())
            .write(&mut regs, &mut delay, Register::Dtcmr, 1_234)
            .unwrap();

        assert_eq!(
            regs.writes(),
            [(Register::Dtcmr, 1_234), (Register::Dsr, Status::WEF.bits())]
        );
        assert_eq!(regs.peek(Register::Dtcmr), 1_234);
        assert!(!regs.peek_status().contains(Status::WEF));
    }

    #[test]
    fn cleared_write_error_is_confirmed_by_reading_back() {
        let mut regs = MockRegisters::new();
        let mut delay = MockDelay::new();
        regs.ack_next(Ack::Error);

        Polling::new(&Config::default())
            .write(&mut regs, &mut delay, Register::Dcamr, 0xffff_ffff)
            .unwrap();

        assert_eq!(regs.reads_of(Register::Dcamr), 1);
        assert_eq!(regs.peek(Register::Dcamr), 0xffff_ffff);
    }

    #[test]
    fn rejected_write_is_reported_after_clear() {
        let mut regs = MockRegisters::new().with(Register::Dgpr, 7);
        let mut delay = MockDelay::new();
        regs.ack_next(Ack::Rejected);

        let res = Polling::new(&Config::default()).write(&mut regs, &mut delay, Register::Dgpr, 8);

        assert_eq!(res, Err(Error::WriteError { reg: Register::Dgpr }));
        assert_eq!(
            regs.writes(),
            [(Register::Dgpr, 8), (Register::Dsr, Status::WEF.bits())]
        );
        assert_eq!(regs.peek(Register::Dgpr), 7);
    }

    #[test]
    fn stuck_write_error_is_reported() {
        let mut regs = MockRegisters::new();
        let mut delay = MockDelay::new();
        regs.ack_next(Ack::Error);
        regs.stick(Status::WEF);

        let config = Config::default().clear_retries(5);
        let res = Polling::new(&config).write(&mut regs, &mut delay, Register::Dcr, 0);

        assert_eq!(res, Err(Error::WriteError { reg: Register::Dcr }));
        assert_eq!(regs.writes_to(Register::Dsr), [Status::WEF.bits()]);
        assert_eq!(delay.calls(), 5);
    }
}
