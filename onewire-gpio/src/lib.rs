#![no_std]
#![deny(missing_docs)]
//! # onewire-gpio
//! A no-std bit-banged master for the Dallas 1-Wire bus, driving a single
//! open-drain GPIO pin with software-timed pulse slots.
//!
//! The bus is represented by an owned [`OneWireBus`] handle wrapping a pin
//! (implementing the [`InputPin`] and [`OutputPin`] traits, released high by
//! an external pull-up, driven low by the master or a device) and a
//! microsecond delay source implementing [`DelayNs`]. Slot timing is
//! protected against preemption with [`critical_section`], so every bit slot
//! and the reset sequence execute atomically with respect to interrupts.
//!
//! [`OneWireBus::reset`] classifies the electrical state of the line into a
//! [`Presence`] outcome or a [`BusFault`]; the session operations
//! ([`OneWireBus::discover_lone_device`], [`OneWireBus::send_command`],
//! [`OneWireBus::broadcast`]) each start with a reset and only touch the bus
//! further when a device answered. The bit and byte primitives below the
//! reset are unchecked building blocks.

mod bus;
pub mod consts;
mod crc;
mod device;
mod error;
mod session;

pub use bus::Presence;
pub use crc::Crc8;
pub use device::{OneWireDevice, RomCode};
pub use error::BusFault;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

/// Result of 1-Wire bus operations, with `E` the pin's error type.
pub type OneWireResult<T, E> = Result<T, BusFault<E>>;

/// A bit-banged 1-Wire bus master.
///
/// Takes ownership of the open-drain bus pin and a busy-wait delay source.
/// Every operation borrows the handle mutably for its full real-time
/// duration; callers sharing a bus across threads must serialize access
/// around the handle themselves.
pub struct OneWireBus<P, D> {
    pub(crate) pin: P,
    pub(crate) delay: D,
    pub(crate) delay_offset_us: u32,
}

/// Builder for a [`OneWireBus`] with custom slot calibration.
pub struct OneWireBusBuilder {
    delay_offset_us: u32,
}

impl Default for OneWireBusBuilder {
    fn default() -> Self {
        OneWireBusBuilder {
            delay_offset_us: consts::DELAY_OFFSET_US,
        }
    }
}

impl OneWireBusBuilder {
    /// Sets the calibration subtracted from slot delays, in microseconds.
    ///
    /// Compensates the host's pin reconfiguration overhead so that the
    /// electrical pulse widths land inside the protocol windows. The default
    /// of 6 µs suits a pin toggle of a few microseconds; a host with faster
    /// GPIO should lower it.
    pub fn with_delay_offset(mut self, us: u32) -> Self {
        self.delay_offset_us = us;
        self
    }

    /// Builds the bus handle, releasing the line so the bus idles high.
    pub fn build<P, D>(self, pin: P, delay: D) -> OneWireResult<OneWireBus<P, D>, P::Error>
    where
        P: InputPin + OutputPin,
        D: DelayNs,
    {
        let mut bus = OneWireBus {
            pin,
            delay,
            delay_offset_us: self.delay_offset_us,
        };
        bus.release_bus()?;
        Ok(bus)
    }
}

impl<P: InputPin + OutputPin, D: DelayNs> OneWireBus<P, D> {
    /// Creates a bus handle with the default calibration.
    pub fn new(pin: P, delay: D) -> OneWireResult<Self, P::Error> {
        OneWireBusBuilder::default().build(pin, delay)
    }

    /// Releases the pin and delay source.
    pub fn into_inner(self) -> (P, D) {
        (self.pin, self.delay)
    }
}
