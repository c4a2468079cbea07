//! # Real time clock
//!
//! DryIce counts a 47 bit value at 32.768 kHz. The upper 32 bits (DTCMR) are whole seconds and
//! are all this driver uses: reads ignore the fraction and writes zero it.
//!
//! Setting the time is three synchronized writes: fraction, seconds, then counter enable. They
//! are not atomic. If one fails the counter may hold the new time without counting, and setting
//! the time again repairs that.

use chrono::{DateTime, Utc};
use dryice_hal::{Control, Delay, InputClock, Register, Registers, Status};

use crate::error::{fatal, Denied, Error, Result};
use crate::unit::DryIce;

/// Whole seconds clock, as consumed by an RTC framework
pub trait RealTimeClock {
    fn read_time(&mut self) -> Result<u32>;

    fn set_time(&mut self, secs: u32) -> Result<()>;
}

impl<R, C, D> DryIce<R, C, D>
where
    R: Registers,
    C: InputClock,
    D: Delay,
{
    pub fn read_seconds(&mut self) -> u32 {
        self.regs.read(Register::Dtcmr)
    }

    pub fn datetime(&mut self) -> Result<DateTime<Utc>> {
        let secs = self.read_seconds();
        DateTime::from_timestamp(i64::from(secs), 0).ok_or(Error::TimeOutOfRange)
    }

    /// Set the time counter.
    ///
    /// The locks are checked against the live registers first, since they may have changed since
    /// the unit was attached. Nothing is written if the counter is locked or the unit has seen a
    /// security violation.
    ///
    /// A unit that came up with TCSL on a running counter attaches fine, but refuses to have its
    /// time set until the next system power-on reset.
    pub fn set_seconds(&mut self, secs: u32) -> Result<()> {
        let dcr = self.regs.control();
        self.dsr = self.regs.status();

        if dcr.contains(Control::TCHL) {
            return Err(fatal(Error::PermissionDenied(Denied::HardLock)));
        }
        if dcr.contains(Control::TCSL) {
            return Err(fatal(Error::PermissionDenied(Denied::SoftLock)));
        }
        if self.dsr.contains(Status::SVF) {
            return Err(fatal(Error::PermissionDenied(Denied::SecurityViolation)));
        }

        // Zero the fractional part first
        self.write_sync(Register::Dtclr, 0)?;
        self.write_sync(Register::Dtcmr, secs)?;

        let dcr = self.regs.control();
        self.write_sync(Register::Dcr, (dcr | Control::TCE).bits())
    }

    pub fn set_datetime(&mut self, time: DateTime<Utc>) -> Result<()> {
        let secs = u32::try_from(time.timestamp()).map_err(|_| Error::TimeOutOfRange)?;
        self.set_seconds(secs)
    }
}

impl<R, C, D> RealTimeClock for DryIce<R, C, D>
where
    R: Registers,
    C: InputClock,
    D: Delay,
{
    fn read_time(&mut self) -> Result<u32> {
        Ok(self.read_seconds())
    }

    fn set_time(&mut self, secs: u32) -> Result<()> {
        self.set_seconds(secs)
    }
}
