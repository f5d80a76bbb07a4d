//! Protocol-reserved command bytes and slot timings.

/// Read-ROM: ask the lone device on the bus to transmit its ROM code.
///
/// Only valid on a single-drop bus; with several devices answering, the
/// wired-AND of their responses corrupts the read undetectably.
pub const READ_ROM_CMD: u8 = 0x33;

/// Skip-ROM: address every device on the bus at once.
pub const SKIP_ROM_CMD: u8 = 0xcc;

/// Match-ROM: address the single device whose 64-bit ROM code follows,
/// transmitted least-significant byte first.
pub const MATCH_ROM_CMD: u8 = 0x55;

/// Recall: dummy function command issued to close the Read-ROM exchange.
pub const RECALL_CMD: u8 = 0xb8;

// Slot timings in microseconds. A write or read slot is 60 µs minimum, the
// reset low pulse 480 µs minimum followed by a 480 µs read window in which
// the presence pulse must start 15-60 µs after release and hold 60-240 µs.

/// Settling time for the pull-up to take the line high before a reset.
pub(crate) const RESET_SETTLE_US: u32 = 5;
/// Half of the reset low pulse; the level is checked between the halves.
pub(crate) const RESET_LOW_HALF_US: u32 = 250;
/// Recovery time after releasing the reset pulse.
pub(crate) const RESET_RECOVERY_US: u32 = 10;
/// End of the window in which a device must have begun its presence pulse.
pub(crate) const PRESENCE_WAIT_US: u32 = 60;
/// Additional hold a conforming presence pulse must still be low for.
pub(crate) const PRESENCE_EARLY_US: u32 = 10;
/// Longest a device may keep driving its presence pulse.
pub(crate) const PRESENCE_HOLD_MAX_US: u32 = 240;
/// Minimum duration of the post-reset read window.
pub(crate) const RESET_SLOT_US: u32 = 480;
/// Minimum duration of a bit slot.
pub(crate) const SLOT_US: u32 = 60;
/// Point in a write slot at which a `1` releases the line.
pub(crate) const WRITE_LEAD_US: u32 = 10;
/// Width of the low pulse requesting a read slot.
pub(crate) const READ_PULSE_US: u32 = 1;
/// Sampling point of a read slot, before the 15 µs deadline.
pub(crate) const READ_SAMPLE_US: u32 = 12;
/// Default calibration for the host's pin reconfiguration overhead.
pub(crate) const DELAY_OFFSET_US: u32 = 6;
