//! # State recovery
//!
//! One handler per [`UnitState`]. Each handler either moves the unit one step closer to the valid
//! state and hands a freshly read status to its successor, or ends the chain with an error
//! describing the power cycle that is needed
//!
//! ```text
//! InvalidAndFailure -> Invalid -> Valid -> ready
//! Failure -> error
//! ```
//!
//! The chain is fixed; the unit is never re-classified halfway through it.
//!
//! Everything that can force the unit into failure state:
//!
//! - wire-mesh, external A/B, temperature, clock and voltage tamper detect
//! - external boot and SCC alarm
//! - time counter or monotonic counter overflow
//!
//! Software can only leave failure state once a system power-on reset has also made the unit
//! non-valid. Leaving it means disabling and clearing the tamper sources, clearing SVF and then
//! running the invalid state recovery.

use dryice_hal::regs::DCAMR_UNSET;
use dryice_hal::{Control, Delay, Register, Registers, Status, TamperConfig};

use crate::error::{fatal, Error, Lock, Result};
use crate::state::UnitState;
use crate::writer::SyncWrite;

pub(crate) struct Recovery<'a, R, D, W> {
    regs: &'a mut R,
    delay: &'a mut D,
    writer: W,
}

impl<'a, R, D, W> Recovery<'a, R, D, W>
where
    R: Registers,
    D: Delay,
    W: SyncWrite,
{
    pub fn new(regs: &'a mut R, delay: &'a mut D, writer: W) -> Self {
        Self {
            regs,
            delay,
            writer,
        }
    }

    fn write(&mut self, reg: Register, value: u32) -> Result<()> {
        self.writer.write(&mut *self.regs, &mut *self.delay, reg, value)
    }

    /// Run the recovery chain for the state `dsr` describes
    pub fn run(&mut self, dsr: Status) -> Result<()> {
        let state = UnitState::classify(dsr);
        match state {
            UnitState::Valid => info!("Unit is {}", state.name()),
            _ => warn!("Unit found in {} state", state.name()),
        }

        match state {
            UnitState::Valid => self.valid(dsr),
            UnitState::Invalid => self.invalid(dsr).and_then(|dsr| self.valid(dsr)),
            UnitState::Failure => Err(self.failure(dsr)),
            UnitState::InvalidAndFailure => {
                self.invalid_and_failure(dsr)
                    .and_then(|dsr| self.invalid(dsr))
                    .and_then(|dsr| self.valid(dsr))
            }
        }
    }

    /// Disarm the alarm and clear a pending alarm flag
    pub fn valid(&mut self, dsr: Status) -> Result<()> {
        self.write(Register::Dcamr, DCAMR_UNSET)?;
        self.write(Register::Dcalr, 0)?;

        if dsr.contains(Status::CAF) {
            self.write(Register::Dsr, Status::CAF.bits())?;
        }

        Ok(())
    }

    /// Restart the time counter.
    ///
    /// The counter stops when TCO or NVF is set, when TCE is clear, or when it was never written.
    /// It keeps whatever it held when it stopped, which after a security violation is the time
    /// of the violation. That value is logged and written back.
    pub fn invalid(&mut self, _dsr: Status) -> Result<Status> {
        // Nothing may push the unit back into failure state while it is being recovered
        self.write(Register::Dtcr, TamperConfig::empty().bits())?;
        self.write(Register::Dcr, Control::TDCSL.bits())?;

        let sec = self.regs.read(Register::Dtcmr);
        if sec != 0 {
            warn!("Security violation captured at {} seconds", sec);
        }

        let dcr = self.regs.control();
        // A locked counter that already runs is left running
        if !dcr.contains(Control::TCE) {
            if dcr.contains(Control::TCHL) {
                return Err(fatal(Error::HardLocked(Lock::TimerCounter)));
            }
            if dcr.contains(Control::TCSL) {
                return Err(fatal(Error::SoftLocked(Lock::TimerCounter)));
            }
        }

        self.write(Register::Dsr, Status::NVF.bits())?;
        self.write(Register::Dsr, Status::TCO.bits())?;
        self.write(Register::Dcr, (dcr | Control::TCE).bits())?;
        // Writing the counter is what makes it count again
        self.write(Register::Dtcmr, sec)?;

        Ok(self.regs.status())
    }

    /// Report which power cycle gets the unit out of failure state. There is no other way out.
    pub fn failure(&mut self, dsr: Status) -> Error {
        debug!("DSR register reports: {:#x}", dsr.bits());

        let dcr = self.regs.control();
        if dcr.contains(Control::FSHL) {
            return fatal(Error::HardLocked(Lock::FailureState));
        }

        // The next system power-on reset moves the unit into invalid + failure
        fatal(Error::FailureState)
    }

    /// Disable and clear every tamper source, then clear SVF
    pub fn invalid_and_failure(&mut self, dsr: Status) -> Result<Status> {
        let latched = dsr & Status::TAMPER;

        if !latched.is_empty() {
            let dcr = self.regs.control();
            // TDCHL only goes away with a DryIce power-on reset, and software can't trigger one
            // while the unit is in failure state
            if dcr.contains(Control::TDCHL) {
                return Err(fatal(Error::HardLocked(Lock::TamperConfig)));
            }
            if dcr.contains(Control::TDCSL) {
                return Err(fatal(Error::SoftLocked(Lock::TamperConfig)));
            }
        }

        self.write(Register::Dtcr, TamperConfig::empty().bits())?;
        self.write(Register::Dsr, latched.bits())?;

        let dsr = self.regs.status();
        let leftover = dsr.difference(Status::EXPECTED);
        if !leftover.is_empty() {
            warn!("Unexpected status bits remain after clear: {:#x}", leftover.bits());
        }

        self.write(Register::Dsr, Status::SVF.bits())?;

        let dsr = self.regs.status();
        if dsr.contains(Status::SVF) {
            error!("Security violation flag will not clear, giving up");
            return Err(fatal(Error::SecurityViolationStuck));
        }

        Ok(dsr)
    }
}
