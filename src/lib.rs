//! # DryIce
//!
//! Driver for the DryIce secure real time clock.
//!
//! ---
//!
//! DryIce is not a simple counter. It is a security monitor that stops everything, including the
//! time counter, when one of its enabled tamper detectors fires. It can be found in one of four
//! states ([`UnitState`]) and leaving some of them takes a power cycle that software can't do.
//! The driver
//!
//! - Classifies the unit and runs the recovery for that state when it is attached
//!   ([`DryIce::attach`]). Attaching fails if the unit can't be brought into the valid state.
//! - Performs every register write as a synchronized write ([`writer`]), since writes take
//!   several cycles of the 32.768 kHz clock to land and only one may be in flight
//! - Reads and sets the time in whole seconds ([`rtc`])
//! - Exposes the general purpose register as a 4 byte store ([`nvstore`])
//!
//! Logging goes to `defmt` with the `defmt` feature and to the `log` facade otherwise.

#![cfg_attr(not(test), no_std)]

mod fmt;

pub mod config;
pub mod error;
pub mod nvstore;
mod recovery;
pub mod rtc;
pub mod state;
pub mod unit;
pub mod writer;

pub use config::Config;
pub use error::{Denied, Error, Lock, PowerSupply, Result};
pub use nvstore::NvStore;
pub use rtc::RealTimeClock;
pub use state::UnitState;
pub use unit::DryIce;

pub use dryice_hal as hal;
