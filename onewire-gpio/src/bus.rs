use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::consts::{
    PRESENCE_EARLY_US, PRESENCE_HOLD_MAX_US, PRESENCE_WAIT_US, READ_PULSE_US, READ_SAMPLE_US,
    RESET_LOW_HALF_US, RESET_RECOVERY_US, RESET_SETTLE_US, RESET_SLOT_US, SLOT_US, WRITE_LEAD_US,
};
use crate::{BusFault, OneWireBus, OneWireResult};

/// Outcome of a completed reset pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// A device answered with a conforming presence pulse.
    Present,
    /// The reset completed but nothing answered within the response window.
    Absent,
}

impl Presence {
    /// Returns `true` if a device answered the reset.
    pub fn is_present(self) -> bool {
        matches!(self, Presence::Present)
    }
}

impl<P: InputPin + OutputPin, D: DelayNs> OneWireBus<P, D> {
    /// Stops driving the line, leaving it to the pull-up and the devices.
    pub(crate) fn release_bus(&mut self) -> OneWireResult<(), P::Error> {
        self.pin.set_high().map_err(BusFault::Pin)
    }

    /// Drives the line low.
    pub(crate) fn drive_bus_low(&mut self) -> OneWireResult<(), P::Error> {
        self.pin.set_low().map_err(BusFault::Pin)
    }

    /// Samples the instantaneous line level.
    pub(crate) fn is_bus_high(&mut self) -> OneWireResult<bool, P::Error> {
        self.pin.is_high().map_err(BusFault::Pin)
    }

    /// Resets the bus and detects a device's presence pulse.
    ///
    /// Releases the line and checks that the pull-up takes it high, drives
    /// the ≥480 µs reset pulse, then watches the response window: a device
    /// must begin driving the line 15-60 µs after release and hold it low
    /// for 60-240 µs. Violations of either bound are classified as distinct
    /// [`BusFault`]s; a line that simply stays high is [`Presence::Absent`].
    ///
    /// Everything from the first drive onward runs inside one critical
    /// section, so an interrupt cannot stretch the pulse past its window.
    /// Every exit leaves the line released and interrupts unmasked.
    pub fn reset(&mut self) -> OneWireResult<Presence, P::Error> {
        // Nothing is driven yet; give the pull-up time to take the line high.
        // An internal pull-up is usually too weak for this bus.
        self.release_bus()?;
        self.delay.delay_us(RESET_SETTLE_US);
        if !self.is_bus_high()? {
            return Err(BusFault::StuckLow);
        }

        critical_section::with(|_| {
            // Drive the reset pulse in two halves, checking between them
            // that the line actually went low.
            self.drive_bus_low()?;
            self.delay.delay_us(RESET_LOW_HALF_US);
            if self.is_bus_high()? {
                self.release_bus()?;
                return Err(BusFault::StuckHigh);
            }
            self.delay.delay_us(RESET_LOW_HALF_US);
            self.release_bus()?;

            self.delay.delay_us(RESET_RECOVERY_US);
            if !self.is_bus_high()? {
                return Err(BusFault::RecoveryFailed);
            }

            // The rising edge tells a device to answer within 15-60 µs.
            self.delay.delay_us(PRESENCE_WAIT_US);
            if self.is_bus_high()? {
                return Ok(Presence::Absent);
            }

            self.delay.delay_us(PRESENCE_EARLY_US);
            if self.is_bus_high()? {
                return Err(BusFault::PresenceTooShort);
            }
            self.delay.delay_us(PRESENCE_HOLD_MAX_US);
            if !self.is_bus_high()? {
                return Err(BusFault::PresenceTooLong);
            }

            // Hold the read window open to its 480 µs minimum.
            self.delay.delay_us(RESET_SLOT_US - PRESENCE_HOLD_MAX_US);
            Ok(Presence::Present)
        })
    }

    /// Writes a single bit slot.
    ///
    /// A `1` is a short low pulse released within 15 µs of the falling edge,
    /// a `0` keeps the line low for the whole slot; devices sample the level
    /// 15-60 µs after the falling edge. The slot is interrupt-atomic.
    pub fn write_bit(&mut self, bit: bool) -> OneWireResult<(), P::Error> {
        let offset = self.delay_offset_us;
        critical_section::with(|_| {
            self.drive_bus_low()?;
            self.delay.delay_us(WRITE_LEAD_US.saturating_sub(offset));
            if bit {
                self.release_bus()?;
            }
            self.delay.delay_us(SLOT_US.saturating_sub(offset));
            self.release_bus()?;
            // The ≥1 µs recovery between slots is covered by call overhead.
            Ok(())
        })
    }

    /// Reads a single bit slot.
    ///
    /// Issues a ~1 µs low pulse to open the slot, releases, and samples the
    /// line before the 15 µs deadline: a device transmitting a `0` holds the
    /// line low, a `1` leaves it to the pull-up. The slot is held open to
    /// its 60 µs minimum before returning. Interrupt-atomic.
    pub fn read_bit(&mut self) -> OneWireResult<bool, P::Error> {
        let offset = self.delay_offset_us;
        critical_section::with(|_| {
            self.drive_bus_low()?;
            self.delay.delay_us(READ_PULSE_US);
            self.release_bus()?;
            self.delay.delay_us(READ_SAMPLE_US.saturating_sub(offset));
            let bit = self.is_bus_high()?;
            self.delay.delay_us(SLOT_US);
            Ok(bit)
        })
    }

    /// Writes a byte, least-significant bit first.
    pub fn write_byte(&mut self, byte: u8) -> OneWireResult<(), P::Error> {
        let mut value = byte;
        for _ in 0..8 {
            self.write_bit(value & 0x01 != 0)?;
            value >>= 1;
        }
        Ok(())
    }

    /// Reads a byte, least-significant bit first.
    pub fn read_byte(&mut self) -> OneWireResult<u8, P::Error> {
        let mut value = 0;
        for _ in 0..8 {
            value >>= 1;
            if self.read_bit()? {
                value |= 0x80;
            }
        }
        Ok(value)
    }

    /// Writes a buffer byte by byte and returns the count transferred.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> OneWireResult<usize, P::Error> {
        for &byte in bytes {
            self.write_byte(byte)?;
        }
        Ok(bytes.len())
    }

    /// Fills a buffer byte by byte and returns the count transferred.
    ///
    /// There is no error channel at this layer: a read on a bus without a
    /// responding device yields all-ones garbage, not a failure. Callers are
    /// expected to have selected a device via a successful reset first.
    pub fn read_bytes(&mut self, buffer: &mut [u8]) -> OneWireResult<usize, P::Error> {
        for slot in buffer.iter_mut() {
            *slot = self.read_byte()?;
        }
        Ok(buffer.len())
    }
}
