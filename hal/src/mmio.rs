use core::ptr::NonNull;

use crate::regs::{Register, Registers};

/// Memory mapped DryIce register block
pub struct Mmio {
    base: NonNull<u32>,
}

impl Mmio {
    /// Wrap the register block at `base`.
    ///
    /// # Safety
    ///
    /// `base` must be the (virtual) address of a mapped DryIce register block, valid for the
    /// lifetime of the returned value, and no other code may access the block while it is alive.
    pub const unsafe fn new(base: NonNull<u32>) -> Self {
        Self { base }
    }

    fn ptr(&self, reg: Register) -> *mut u32 {
        // Offsets are word aligned, so this stays inside the block
        unsafe { self.base.as_ptr().byte_add(reg.offset()) }
    }
}

impl Registers for Mmio {
    fn read(&mut self, reg: Register) -> u32 {
        unsafe { self.ptr(reg).read_volatile() }
    }

    fn write(&mut self, reg: Register, value: u32) {
        unsafe { self.ptr(reg).write_volatile(value) }
    }
}
