//! # DryIce HAL
//!
//! A hardware abstraction library for the DryIce block found in i.MX25 class SoCs.
//!
//! ---
//!
//! DryIce is a battery backed security monitor with a 47 bit counter clocked from the 32.768
//! kHz crystal, a clock alarm comparator, a monotonic counter, a set of tamper detectors and a
//! single general purpose register. This library only describes the hardware
//!
//! - The register map and the bit layout of every register the driver touches ([`regs`])
//! - How registers are reached ([`Registers`], implemented for memory mapped IO by [`Mmio`])
//! - The two platform capabilities the unit needs, a way to wait ([`Delay`]) and its gated input
//!   clock ([`InputClock`])
//!
//! The state machine and the write protocol live in the `dryice` crate.

#![cfg_attr(not(any(test, feature = "mock")), no_std)]

pub mod clock;
pub mod delay;
pub mod mmio;
pub mod regs;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use clock::{ClockError, InputClock};
pub use delay::Delay;
pub use mmio::Mmio;
pub use regs::{Control, InterruptEnable, Register, Registers, Status, TamperConfig};

pub use embedded_time::duration::Microseconds;
