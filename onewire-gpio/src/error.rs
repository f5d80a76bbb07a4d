/// Bus fault detected by the reset sequence, or an error from the pin.
///
/// The "no device answered" outcome is deliberately not a fault; it is
/// reported as [`Presence::Absent`](crate::Presence) by
/// [`reset`](crate::OneWireBus::reset) and as `None` by discovery.
#[derive(Debug)]
pub enum BusFault<E> {
    /// The line never floated high when released; the pull-up is missing or
    /// the bus is shorted to ground.
    StuckLow,
    /// The line stayed high while driven low; another agent is driving the
    /// bus or the output stage has failed.
    StuckHigh,
    /// The line did not return high after the reset pulse was released.
    RecoveryFailed,
    /// A device answered the reset but released its presence pulse before
    /// the minimum hold time.
    PresenceTooShort,
    /// A device answered the reset but held its presence pulse beyond the
    /// allowed window.
    PresenceTooLong,
    /// Error reported by the underlying pin.
    Pin(E),
}

impl<E> From<E> for BusFault<E> {
    fn from(value: E) -> Self {
        Self::Pin(value)
    }
}
