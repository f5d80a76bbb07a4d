use crate::crc::Crc8;

/// 64-bit ROM code identifying one device: a family code, a six-byte serial
/// number and a trailing CRC byte, in bus transfer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RomCode([u8; 8]);

impl RomCode {
    /// Wraps raw ROM bytes as read off the bus.
    pub fn new(bytes: [u8; 8]) -> Self {
        RomCode(bytes)
    }

    /// Family code identifying the device type.
    pub fn family_code(&self) -> u8 {
        self.0[0]
    }

    /// Six-byte serial number, unique within the family.
    pub fn serial_number(&self) -> &[u8] {
        &self.0[1..7]
    }

    /// The trailing CRC byte covering the family code and serial number.
    pub fn crc(&self) -> u8 {
        self.0[7]
    }

    /// Raw bytes in bus transfer order (least-significant byte first).
    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }

    /// Checks the trailing CRC byte against the rest of the code.
    ///
    /// Discovery carries the CRC without checking it; callers wanting to
    /// reject corrupted codes apply this themselves.
    pub fn crc_is_valid(&self) -> bool {
        Crc8::validate(&self.0)
    }
}

/// Handle to a device on the bus, holding the ROM code obtained by
/// [`discover_lone_device`](crate::OneWireBus::discover_lone_device).
///
/// Immutable once created; requires the bus only at the point of use.
#[derive(Debug, Clone)]
pub struct OneWireDevice {
    rom_code: RomCode,
}

impl OneWireDevice {
    /// Creates a device handle from a known ROM code.
    pub fn new(rom_code: RomCode) -> Self {
        OneWireDevice { rom_code }
    }

    /// The device's ROM code.
    pub fn rom_code(&self) -> &RomCode {
        &self.rom_code
    }
}
