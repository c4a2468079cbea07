//! # Register map
//!
//! All DryIce registers are 32 bits wide. Except for [`Register::Dier`], every write is
//! synchronized into the low power domain, which takes four cycles of the 32.768 kHz clock. While
//! a write is in flight the unit sets [`Status::WBF`] and sets [`Status::WCF`] once it has
//! landed.
//!
//! Reading [`Register::Dsr`] clears [`Status::WCF`]. Status flags are write-one-to-clear.

use bitflags::bitflags;

/// A DryIce register, with its offset from the block's base address as the discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Register {
    /// Time counter MSB (whole seconds)
    Dtcmr = 0x00,
    /// Time counter LSB (fraction of a second)
    Dtclr = 0x04,
    /// Clock alarm MSB
    Dcamr = 0x08,
    /// Clock alarm LSB
    Dcalr = 0x0c,
    /// Control
    Dcr = 0x10,
    /// Status
    Dsr = 0x14,
    /// Interrupt enable
    Dier = 0x18,
    /// Monotonic counter
    Dmcr = 0x1c,
    /// Tamper configuration
    Dtcr = 0x28,
    /// General purpose
    Dgpr = 0x3c,
}

impl Register {
    pub const ALL: [Register; 10] = [
        Register::Dtcmr,
        Register::Dtclr,
        Register::Dcamr,
        Register::Dcalr,
        Register::Dcr,
        Register::Dsr,
        Register::Dier,
        Register::Dmcr,
        Register::Dtcr,
        Register::Dgpr,
    ];

    /// Byte offset from the base of the register block
    pub const fn offset(self) -> usize {
        self as usize
    }

    /// Whether a write to this register is synchronized into the low power domain and
    /// acknowledged through [`Status::WCF`]/[`Status::WEF`]
    pub const fn is_synchronized(self) -> bool {
        !matches!(self, Register::Dier)
    }

    /// Whether reading the register returns the last value written. The counter moves on, DCR
    /// keeps its lock bits and DSR is write-one-to-clear.
    pub const fn holds_written_value(self) -> bool {
        matches!(
            self,
            Register::Dcamr | Register::Dcalr | Register::Dtcr | Register::Dgpr
        )
    }

    pub const fn name(self) -> &'static str {
        match self {
            Register::Dtcmr => "DTCMR",
            Register::Dtclr => "DTCLR",
            Register::Dcamr => "DCAMR",
            Register::Dcalr => "DCALR",
            Register::Dcr => "DCR",
            Register::Dsr => "DSR",
            Register::Dier => "DIER",
            Register::Dmcr => "DMCR",
            Register::Dtcr => "DTCR",
            Register::Dgpr => "DGPR",
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Register {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=str}", self.name())
    }
}

/// Alarm MSB value meaning "no alarm" (doomsday minus one second)
pub const DCAMR_UNSET: u32 = 0xFFFF_FFFF;

/// Raw access to a DryIce register block.
///
/// Implementations must not reorder or merge accesses. Reads take `&mut self` because reading
/// [`Register::Dsr`] has a side effect on the hardware.
pub trait Registers {
    fn read(&mut self, reg: Register) -> u32;

    fn write(&mut self, reg: Register, value: u32);

    /// Read DSR. This clears [`Status::WCF`].
    fn status(&mut self) -> Status {
        Status::from_bits_retain(self.read(Register::Dsr))
    }

    fn control(&mut self) -> Control {
        Control::from_bits_retain(self.read(Register::Dcr))
    }
}

impl<T: Registers + ?Sized> Registers for &mut T {
    fn read(&mut self, reg: Register) -> u32 {
        (**self).read(reg)
    }

    fn write(&mut self, reg: Register, value: u32) {
        (**self).write(reg, value)
    }
}

bitflags! {
    /// DCR, the control register
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Control: u32 {
        /// Tamper-detect configuration hard lock
        const TDCHL = 1 << 30;
        /// Tamper-detect configuration soft lock
        const TDCSL = 1 << 29;
        /// Key-select soft lock
        const KSSL = 1 << 27;
        /// Monotonic-counter hard lock
        const MCHL = 1 << 20;
        /// Monotonic-counter soft lock
        const MCSL = 1 << 19;
        /// Timer-counter hard lock
        const TCHL = 1 << 18;
        /// Timer-counter soft lock
        const TCSL = 1 << 17;
        /// Failure state hard lock
        const FSHL = 1 << 16;
        /// Time counter enable
        const TCE = 1 << 3;
        /// Monotonic counter enable
        const MCE = 1 << 2;

        const _ = !0;
    }
}

bitflags! {
    /// DSR, the status register
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Status: u32 {
        /// Wire-mesh tamper detected
        const WTD = 1 << 23;
        /// External tamper B detected
        const ETBD = 1 << 22;
        /// External tamper A detected
        const ETAD = 1 << 21;
        /// External boot detected
        const EBD = 1 << 20;
        /// SCC alarm detected
        const SAD = 1 << 19;
        /// Temperature tamper detected
        const TTD = 1 << 18;
        /// Clock tamper detected
        const CTD = 1 << 17;
        /// Voltage tamper detected
        const VTD = 1 << 16;
        /// Write busy
        const WBF = 1 << 10;
        /// Write next
        const WNF = 1 << 9;
        /// Write complete
        const WCF = 1 << 8;
        /// Write error
        const WEF = 1 << 7;
        /// Clock alarm
        const CAF = 1 << 4;
        /// Monotonic counter overflow
        const MCO = 1 << 3;
        /// Time counter overflow
        const TCO = 1 << 2;
        /// Non-valid
        const NVF = 1 << 1;
        /// Security violation
        const SVF = 1 << 0;

        const _ = !0;
    }
}

impl Status {
    /// Latched tamper and overflow conditions. Any of these, when enabled in DTCR, pushes the
    /// unit into failure state.
    pub const TAMPER: Status = Status::WTD
        .union(Status::ETBD)
        .union(Status::ETAD)
        .union(Status::EBD)
        .union(Status::SAD)
        .union(Status::TTD)
        .union(Status::CTD)
        .union(Status::VTD)
        .union(Status::MCO)
        .union(Status::TCO);

    /// The two sticky flags that select the unit state
    pub const STICKY: Status = Status::NVF.union(Status::SVF);

    /// Bits that are expected to remain once the tamper latches have been cleared
    pub const EXPECTED: Status = Status::STICKY
        .union(Status::WBF)
        .union(Status::WNF)
        .union(Status::WCF)
        .union(Status::WEF);
}

bitflags! {
    /// DIER, the interrupt enable register
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InterruptEnable: u32 {
        /// Write next
        const WNIE = 1 << 9;
        /// Write complete
        const WCIE = 1 << 8;
        /// Write error
        const WEIE = 1 << 7;
        /// Clock alarm
        const CAIE = 1 << 4;
        /// Security violation
        const SVIE = 1 << 0;
    }
}

bitflags! {
    /// DTCR, the tamper configuration register
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TamperConfig: u32 {
        /// Monotonic overflow
        const MOE = 1 << 9;
        /// Time overflow
        const TOE = 1 << 8;
        /// Wire-mesh tamper
        const WTE = 1 << 7;
        /// External tamper B
        const ETBE = 1 << 6;
        /// External tamper A
        const ETAE = 1 << 5;
        /// External boot
        const EBE = 1 << 4;
        /// SCC alarm
        const SAIE = 1 << 3;
        /// Temperature tamper
        const TTE = 1 << 2;
        /// Clock tamper
        const CTE = 1 << 1;
        /// Voltage tamper
        const VTE = 1 << 0;
    }
}

macro_rules! format_bits {
    ( $( $Flags:ident ),* ) => {
        $(
            #[cfg(feature = "defmt")]
            impl defmt::Format for $Flags {
                fn format(&self, f: defmt::Formatter) {
                    defmt::write!(f, "{}({=u32:#x})", stringify!($Flags), self.bits())
                }
            }
        )*
    }
}

format_bits! {Control, Status, InterruptEnable, TamperConfig}
