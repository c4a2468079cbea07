use core::fmt;

use dryice_hal::{ClockError, Register};

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// The power supply an operator has to cycle to get the unit going again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerSupply {
    /// Remove and restore the backup battery. Clears every hard lock.
    Battery,
    /// System power-on reset. Clears soft locks and moves a failed unit into invalid + failure.
    Main,
}

impl PowerSupply {
    pub const fn name(self) -> &'static str {
        match self {
            PowerSupply::Battery => "battery",
            PowerSupply::Main => "main",
        }
    }
}

/// Lock domain that blocked a register modification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Lock {
    /// TCHL/TCSL, the time counter
    TimerCounter,
    /// TDCHL/TDCSL, the tamper detect configuration
    TamperConfig,
    /// FSHL, failure state
    FailureState,
}

/// Why a `set_time` request was refused before touching the unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Denied {
    HardLock,
    SoftLock,
    SecurityViolation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A synchronized write was neither completed nor rejected in time
    IoTimeout { reg: Register },
    /// The unit rejected a write and the error flag would not clear
    WriteError { reg: Register },
    HardLocked(Lock),
    SoftLocked(Lock),
    /// The unit is in failure state, which software cannot leave
    FailureState,
    /// The security violation flag survived an attempt to clear it
    SecurityViolationStuck,
    PermissionDenied(Denied),
    Clock(ClockError),
    /// The requested time does not fit the 32 bit seconds counter
    TimeOutOfRange,
}

impl Error {
    /// The external action needed before the unit can work again, if any.
    ///
    /// Errors returning `Some` are permanent for the current boot.
    pub const fn required_action(&self) -> Option<PowerSupply> {
        match self {
            Error::HardLocked(_) | Error::SecurityViolationStuck => Some(PowerSupply::Battery),
            Error::SoftLocked(_) | Error::FailureState => Some(PowerSupply::Main),
            Error::PermissionDenied(Denied::HardLock) => Some(PowerSupply::Battery),
            Error::PermissionDenied(_) => Some(PowerSupply::Main),
            Error::IoTimeout { .. }
            | Error::WriteError { .. }
            | Error::Clock(_)
            | Error::TimeOutOfRange => None,
        }
    }
}

impl From<ClockError> for Error {
    fn from(e: ClockError) -> Self {
        Error::Clock(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::IoTimeout { reg } => write!(f, "write to {} timed out", reg.name()),
            Error::WriteError { reg } => {
                write!(f, "write to {} failed and the error flag is stuck", reg.name())
            }
            Error::HardLocked(lock) => write!(f, "{:?} is hard locked", lock),
            Error::SoftLocked(lock) => write!(f, "{:?} is soft locked", lock),
            Error::FailureState => f.write_str("unit is in failure state"),
            Error::SecurityViolationStuck => {
                f.write_str("security violation flag cannot be cleared")
            }
            Error::PermissionDenied(why) => write!(f, "time counter not writable: {:?}", why),
            Error::Clock(e) => write!(f, "{}", e),
            Error::TimeOutOfRange => f.write_str("time outside of the counter range"),
        }?;

        if let Some(supply) = self.required_action() {
            write!(f, " (cycle the {} power supply)", supply.name())?;
        }

        Ok(())
    }
}

/// Log the physical action an unrecoverable error asks for and hand the error back
pub(crate) fn fatal(e: Error) -> Error {
    if let Some(supply) = e.required_action() {
        error!(
            "Please cycle the {} power supply in order to get the DryIce/RTC unit working again",
            supply.name()
        );
    }
    e
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_errors_name_the_supply() {
        assert_eq!(
            Error::HardLocked(Lock::TimerCounter).required_action(),
            Some(PowerSupply::Battery)
        );
        assert_eq!(
            Error::SoftLocked(Lock::TamperConfig).required_action(),
            Some(PowerSupply::Main)
        );
        assert_eq!(Error::FailureState.required_action(), Some(PowerSupply::Main));
        assert_eq!(
            Error::SecurityViolationStuck.required_action(),
            Some(PowerSupply::Battery)
        );
    }

    #[test]
    fn transient_errors_need_no_power_cycle() {
        assert_eq!(Error::IoTimeout { reg: Register::Dcr }.required_action(), None);
        assert_eq!(Error::Clock(ClockError).required_action(), None);
    }

    #[test]
    fn display_mentions_register_and_action() {
        assert_eq!(
            Error::IoTimeout { reg: Register::Dtcmr }.to_string(),
            "write to DTCMR timed out"
        );
        assert_eq!(
            Error::PermissionDenied(Denied::SecurityViolation).to_string(),
            "time counter not writable: SecurityViolation (cycle the main power supply)"
        );
    }
}
