//! # Non-volatile store
//!
//! DGPR keeps its contents as long as the battery does. It is exposed as a single 4 byte word
//! with no sub-word access, so anything other than a whole word at offset 0 is ignored.

use dryice_hal::{Delay, InputClock, Register, Registers};

use crate::error::Result;
use crate::unit::DryIce;

/// Byte addressed store, as consumed by an nvmem framework
pub trait NvStore {
    const SIZE: usize;

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<()>;

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<()>;
}

impl<R, C, D> DryIce<R, C, D>
where
    R: Registers,
    C: InputClock,
    D: Delay,
{
    /// Write the general purpose register. Only a 4 byte `data` is written.
    pub fn store_write(&mut self, data: &[u8]) {
        let Ok(word) = <[u8; 4]>::try_from(data) else {
            return;
        };
        self.regs.write(Register::Dgpr, u32::from_le_bytes(word));
    }

    /// Read the general purpose register. Only a 4 byte `buf` is filled.
    pub fn store_read(&mut self, buf: &mut [u8]) {
        if buf.len() != 4 {
            return;
        }
        buf.copy_from_slice(&self.regs.read(Register::Dgpr).to_le_bytes());
    }
}

impl<R, C, D> NvStore for DryIce<R, C, D>
where
    R: Registers,
    C: InputClock,
    D: Delay,
{
    const SIZE: usize = 4;

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<()> {
        if offset == 0 {
            self.store_read(buf);
        }
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        if offset == 0 {
            self.store_write(data);
        }
        Ok(())
    }
}
