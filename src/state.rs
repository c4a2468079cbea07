use dryice_hal::Status;

/// # Unit state
///
/// Selected by the two sticky flags in DSR, NVF and SVF. Every other status bit is irrelevant to
/// the classification.
///
/// | NVF | SVF | State |
/// |-----|-----|-------|
/// | 0 | 0 | [`Valid`](UnitState::Valid) |
/// | 1 | 0 | [`Invalid`](UnitState::Invalid) |
/// | 0 | 1 | [`Failure`](UnitState::Failure) |
/// | 1 | 1 | [`InvalidAndFailure`](UnitState::InvalidAndFailure) |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UnitState {
    /// Counting and trustworthy
    Valid,
    /// Counter contents can't be trusted, usually after the battery was removed
    Invalid,
    /// A tamper or overflow event stopped the unit. The counter holds the time of the event.
    Failure,
    /// Failure state after a system power-on reset. The only failure state software can leave.
    InvalidAndFailure,
}

impl UnitState {
    pub fn classify(dsr: Status) -> Self {
        match (dsr.contains(Status::NVF), dsr.contains(Status::SVF)) {
            (false, false) => UnitState::Valid,
            (true, false) => UnitState::Invalid,
            (false, true) => UnitState::Failure,
            (true, true) => UnitState::InvalidAndFailure,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            UnitState::Valid => "valid",
            UnitState::Invalid => "invalid",
            UnitState::Failure => "failure",
            UnitState::InvalidAndFailure => "invalid + failure",
        }
    }
}
