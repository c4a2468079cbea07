#![allow(dead_code)]

use dryice::hal::mock::{MockClock, MockDelay, MockRegisters};
use dryice::hal::{Control, Register, Status};
use dryice::{Config, DryIce, Result};

pub type Unit = DryIce<MockRegisters, MockClock, MockDelay>;

pub struct Rig {
    pub regs: MockRegisters,
    pub clock: MockClock,
    pub delay: MockDelay,
}

impl Rig {
    pub fn new(dsr: Status, dcr: Control) -> Self {
        Self {
            regs: MockRegisters::new()
                .with(Register::Dsr, dsr.bits())
                .with(Register::Dcr, dcr.bits()),
            clock: MockClock::new(),
            delay: MockDelay::new(),
        }
    }

    pub fn attach(&self) -> Result<Unit> {
        DryIce::attach(
            self.regs.clone(),
            self.clock.clone(),
            self.delay.clone(),
            Config::default(),
        )
    }
}

/// A unit that came up valid with a running counter, access log cleared
pub fn running() -> (Rig, Unit) {
    let rig = Rig::new(Status::empty(), Control::TCE);
    let unit = rig.attach().expect("valid unit attaches");
    rig.regs.clear_log();
    (rig, unit)
}
