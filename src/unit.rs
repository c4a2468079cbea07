use dryice_hal::{Delay, InputClock, InterruptEnable, Register, Registers, Status};

use crate::config::Config;
use crate::error::Result;
use crate::recovery::Recovery;
use crate::state::UnitState;
use crate::writer::{BusyWait, Polling, SyncWrite};

/// # DryIce unit
///
/// Owns one register block, its input clock and a delay provider. A `DryIce` only exists once
/// the unit has been brought into the valid state, so the time counter is known to run.
///
/// Each register block gets its own handle; callers sharing a handle between contexts have to
/// provide the locking.
pub struct DryIce<R, C, D> {
    pub(crate) regs: R,
    clock: C,
    pub(crate) delay: D,
    config: Config,
    /// Last status read, for diagnostics only
    pub(crate) dsr: Status,
    found: UnitState,
}

impl<R, C, D> DryIce<R, C, D>
where
    R: Registers,
    C: InputClock,
    D: Delay,
{
    /// Bring up the unit.
    ///
    /// Enables the input clock, masks every interrupt and runs the recovery for whatever state
    /// the unit is found in. On failure the clock is disabled again and the unit must not be
    /// used until the power cycle named by the error has happened.
    pub fn attach(mut regs: R, mut clock: C, mut delay: D, config: Config) -> Result<Self> {
        clock.enable()?;

        regs.write(Register::Dier, InterruptEnable::empty().bits());

        let dsr = regs.status();
        let found = UnitState::classify(dsr);

        let res = Recovery::new(&mut regs, &mut delay, BusyWait::new(&config)).run(dsr);
        if let Err(e) = res {
            clock.disable();
            return Err(e);
        }

        Ok(Self {
            regs,
            clock,
            delay,
            config,
            dsr,
            found,
        })
    }

    /// Disable the input clock and give back the resources
    pub fn release(mut self) -> (R, C, D) {
        self.clock.disable();
        (self.regs, self.clock, self.delay)
    }

    /// Classify the unit as it is right now
    pub fn state(&mut self) -> UnitState {
        self.dsr = self.regs.status();
        UnitState::classify(self.dsr)
    }

    /// The state the unit was in when it was attached
    pub fn found_state(&self) -> UnitState {
        self.found
    }

    /// The last status read. May be stale, use [`state`](Self::state) for decisions.
    pub fn status(&self) -> Status {
        self.dsr
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn write_sync(&mut self, reg: Register, value: u32) -> Result<()> {
        Polling::new(&self.config).write(&mut self.regs, &mut self.delay, reg, value)
    }
}
