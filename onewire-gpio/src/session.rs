use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::consts::{MATCH_ROM_CMD, READ_ROM_CMD, RECALL_CMD, SKIP_ROM_CMD};
use crate::{OneWireBus, OneWireDevice, OneWireResult, Presence, RomCode};

impl<P: InputPin + OutputPin, D: DelayNs> OneWireBus<P, D> {
    /// Discovers the ROM code of the lone device on the bus.
    ///
    /// Resets, issues Read-ROM, reads the eight ROM bytes and closes the
    /// exchange with a dummy Recall. Returns `None` when nothing answered
    /// the reset. With more than one device present the wired-AND of their
    /// responses corrupts the read undetectably; this driver assumes a
    /// single-drop bus.
    pub fn discover_lone_device(&mut self) -> OneWireResult<Option<OneWireDevice>, P::Error> {
        if !self.reset()?.is_present() {
            return Ok(None);
        }
        self.write_byte(READ_ROM_CMD)?;

        let mut rom = [0u8; 8];
        self.read_bytes(&mut rom)?;
        // The trailing CRC byte is carried, not checked; callers apply
        // RomCode::crc_is_valid if they want to reject corrupted codes.

        self.write_byte(RECALL_CMD)?;
        Ok(Some(OneWireDevice::new(RomCode::new(rom))))
    }

    /// Addresses one device and sends it a command byte.
    ///
    /// Resets, issues Match-ROM followed by the device's ROM code, then the
    /// command; only the matching device stays selected for the data phase
    /// that follows. Returns [`Presence::Absent`] without writing anything
    /// when the reset found no device.
    pub fn send_command(
        &mut self,
        device: &OneWireDevice,
        command: u8,
    ) -> OneWireResult<Presence, P::Error> {
        if !self.reset()?.is_present() {
            return Ok(Presence::Absent);
        }
        self.write_byte(MATCH_ROM_CMD)?;
        self.write_bytes(device.rom_code().as_bytes())?;
        self.write_byte(command)?;
        Ok(Presence::Present)
    }

    /// Sends a command byte to every device on the bus at once.
    ///
    /// Resets and issues Skip-ROM followed by the command. Useful when only
    /// one device is present, or for commands all devices should execute
    /// identically. Returns [`Presence::Absent`] without writing anything
    /// when the reset found no device.
    pub fn broadcast(&mut self, command: u8) -> OneWireResult<Presence, P::Error> {
        if !self.reset()?.is_present() {
            return Ok(Presence::Absent);
        }
        self.write_byte(SKIP_ROM_CMD)?;
        self.write_byte(command)?;
        Ok(Presence::Present)
    }

    /// Polls whether the selected device is still busy.
    ///
    /// A device working on a command holds read slots low and releases them
    /// when done; poll until this returns `false`.
    pub fn device_busy(&mut self) -> OneWireResult<bool, P::Error> {
        Ok(!self.read_bit()?)
    }
}
