use clap::Parser;
use linux_embedded_hal::gpio_cdev::{Chip, LineRequestFlags};
use linux_embedded_hal::{CdevPin, Delay};
use onewire_gpio::OneWireBus;

/// Probe a bit-banged 1-Wire bus on a GPIO character-device line.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the GPIO character device (e.g., /dev/gpiochip0)
    #[arg(short, long)]
    chip: String,

    /// Line offset of the 1-Wire data pin
    #[arg(short, long)]
    line: u32,
}

fn main() {
    // Initialize the logger
    env_logger::init();
    // Parse command line arguments
    let args = Args::parse();
    // Request the bus line as an open-drain output; the bus needs an
    // external pull-up of around 4.7 kOhm.
    let mut chip = Chip::new(&args.chip).expect("Failed to open GPIO chip");
    let handle = chip
        .get_line(args.line)
        .expect("Failed to get GPIO line")
        .request(
            LineRequestFlags::OUTPUT | LineRequestFlags::OPEN_DRAIN,
            1,
            "onewire-gpio",
        )
        .expect("Failed to request GPIO line");
    let pin = CdevPin::new(handle).expect("Failed to wrap GPIO line");
    // Create the bus master
    let mut bus = OneWireBus::new(pin, Delay).expect("Failed to initialize the bus");

    // Discover the lone device on the bus
    match bus.discover_lone_device().expect("Bus fault during discovery") {
        None => log::warn!("No device answered the reset pulse"),
        Some(device) => {
            let rom = device.rom_code();
            log::info!(
                "Found device: family {:#04x}, serial {:02x?}, crc {:#04x} (valid: {})",
                rom.family_code(),
                rom.serial_number(),
                rom.crc(),
                rom.crc_is_valid()
            );
            // Address it once more and wait until it reports ready
            bus.send_command(&device, onewire_gpio::consts::RECALL_CMD)
                .expect("Bus fault while addressing the device");
            while bus.device_busy().expect("Bus fault while polling") {
                log::debug!("Device busy");
            }
            log::info!("Device ready");
        }
    }
}
