/// The input clock could not be enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockError;

impl core::fmt::Display for ClockError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("input clock could not be enabled")
    }
}

/// # Input clock
///
/// The bus clock gate feeding the DryIce register interface. The 32.768 kHz counter clock itself
/// is battery backed and never gated by software.
pub trait InputClock {
    fn enable(&mut self) -> Result<(), ClockError>;

    fn disable(&mut self);
}
