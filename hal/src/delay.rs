use embedded_time::duration::Microseconds;

/// Blocking delay provider.
///
/// The write protocol only ever waits for tens to hundreds of microseconds, so a busy loop
/// calibrated against the core clock is a perfectly good implementation.
pub trait Delay {
    fn delay(&mut self, duration: Microseconds<u32>);
}

impl<T: Delay + ?Sized> Delay for &mut T {
    fn delay(&mut self, duration: Microseconds<u32>) {
        (**self).delay(duration)
    }
}
