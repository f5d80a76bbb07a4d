#![allow(dead_code)]

//! Simulated bus for driving the master against a modeled peer on a virtual
//! microsecond clock: the delay source advances time, the pin computes the
//! sampled level from the master's drive state plus the peer model, and
//! every drive/release/sample action is logged with its timestamp.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

/// Master low pulses at least this wide count as reset pulses.
const RESET_PULSE_US: u64 = 400;
/// Master low pulses wider than this encode a `0`; shorter ones a `1` (or a
/// read-slot request, which the peer tells apart by context).
const WRITE_ZERO_THRESHOLD_US: u64 = 15;
/// How long the peer holds the line low when transmitting a `0`.
const TX_HOLD_US: u64 = 30;

/// Timestamped bus action, in microseconds of virtual time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    DriveLow(u64),
    Release(u64),
    Sample(u64, bool),
}

impl Event {
    /// The same event shifted so that `origin` becomes zero.
    pub fn rebased(&self, origin: u64) -> Event {
        match *self {
            Event::DriveLow(t) => Event::DriveLow(t - origin),
            Event::Release(t) => Event::Release(t - origin),
            Event::Sample(t, level) => Event::Sample(t - origin, level),
        }
    }
}

/// What shares the line with the master.
pub enum Peer {
    /// Pull-up only; nobody answers.
    Empty,
    /// Line permanently at ground (missing pull-up or hard short).
    HeldLow,
    /// Line reads high no matter what the master drives; something stronger
    /// is contending.
    DrivenHigh,
    /// Line latches low forever once the master first drives it.
    LatchesLow,
    /// A device that answers reset pulses and decodes slots.
    Device(Device),
}

/// A modeled 1-Wire device: answers reset pulses with a presence pulse of
/// configurable timing, assembles written bits into bytes, serves its ROM
/// code to a Read-ROM command, optionally echoes every received byte, and
/// can hold read slots low to simulate being busy.
pub struct Device {
    response_delay_us: u64,
    presence_us: u64,
    rom_code: Option<[u8; 8]>,
    echo: bool,
    busy_until_us: u64,

    presence_window: Option<(u64, u64)>,
    tx_bits: VecDeque<bool>,
    tx_slot: Option<(u64, bool)>,
    rx_bits: u8,
    rx_count: u8,
    received: Vec<u8>,
}

impl Device {
    /// A device whose presence pulse starts `response_delay_us` after bus
    /// release and holds for `presence_us`.
    pub fn with_presence(response_delay_us: u64, presence_us: u64) -> Self {
        Device {
            response_delay_us,
            presence_us,
            rom_code: None,
            echo: false,
            busy_until_us: 0,
            presence_window: None,
            tx_bits: VecDeque::new(),
            tx_slot: None,
            rx_bits: 0,
            rx_count: 0,
            received: Vec::new(),
        }
    }

    /// A conforming device that serves `rom` to a Read-ROM command.
    pub fn with_rom(rom: [u8; 8]) -> Self {
        Device {
            rom_code: Some(rom),
            ..Device::with_presence(30, 100)
        }
    }

    /// A conforming device that echoes every received byte back on the
    /// following read slots.
    pub fn echo() -> Self {
        Device {
            echo: true,
            ..Device::with_presence(30, 100)
        }
    }

    fn on_rise(&mut self, fall: u64, rise: u64) {
        let width = rise - fall;
        if width >= RESET_PULSE_US {
            // Reset pulse: schedule the presence answer and drop whatever
            // transfer was in progress.
            let from = rise + self.response_delay_us;
            self.presence_window = Some((from, from + self.presence_us));
            self.tx_bits.clear();
            self.tx_slot = None;
            self.rx_bits = 0;
            self.rx_count = 0;
            return;
        }
        if let Some(bit) = self.tx_bits.pop_front() {
            // Transmitting: the master's short pulse clocks out our next bit.
            self.tx_slot = Some((fall, bit));
            return;
        }
        if width <= WRITE_ZERO_THRESHOLD_US && fall < self.busy_until_us {
            // Busy: answer the read slot with a 0 until the work completes.
            self.tx_slot = Some((fall, false));
            return;
        }
        // Idle read-slot requests land here as 1 bits, as they would for a
        // real device ignoring slots outside a command exchange.
        self.receive_bit(width <= WRITE_ZERO_THRESHOLD_US);
    }

    fn receive_bit(&mut self, bit: bool) {
        if bit {
            self.rx_bits |= 1 << self.rx_count;
        }
        self.rx_count += 1;
        if self.rx_count == 8 {
            let byte = self.rx_bits;
            self.rx_bits = 0;
            self.rx_count = 0;
            self.received.push(byte);
            self.on_byte(byte);
        }
    }

    fn on_byte(&mut self, byte: u8) {
        if self.echo {
            self.load_tx(byte);
        } else if byte == 0x33 {
            if let Some(rom) = self.rom_code {
                for b in rom {
                    self.load_tx(b);
                }
            }
        }
    }

    fn load_tx(&mut self, byte: u8) {
        for i in 0..8 {
            self.tx_bits.push_back(byte & (1 << i) != 0);
        }
    }

    fn level(&self, now: u64) -> bool {
        if let Some((from, to)) = self.presence_window {
            if now >= from && now < to {
                return false;
            }
        }
        if let Some((fall, bit)) = self.tx_slot {
            if !bit && now >= fall && now < fall + TX_HOLD_US {
                return false;
            }
        }
        true
    }
}

struct Sim {
    now_ns: u64,
    master_low: bool,
    last_fall_us: u64,
    ever_driven: bool,
    peer: Peer,
    events: Vec<Event>,
}

impl Sim {
    fn now_us(&self) -> u64 {
        self.now_ns / 1_000
    }

    fn drive_low(&mut self) {
        let now = self.now_us();
        self.events.push(Event::DriveLow(now));
        if !self.master_low {
            self.master_low = true;
            self.ever_driven = true;
            self.last_fall_us = now;
        }
    }

    fn release(&mut self) {
        let now = self.now_us();
        self.events.push(Event::Release(now));
        if self.master_low {
            self.master_low = false;
            let fall = self.last_fall_us;
            if let Peer::Device(device) = &mut self.peer {
                device.on_rise(fall, now);
            }
        }
    }

    fn sample(&mut self) -> bool {
        let now = self.now_us();
        let level = match &self.peer {
            Peer::Empty => !self.master_low,
            Peer::HeldLow => false,
            Peer::DrivenHigh => true,
            Peer::LatchesLow => !self.master_low && !self.ever_driven,
            Peer::Device(device) => !self.master_low && device.level(now),
        };
        self.events.push(Event::Sample(now, level));
        level
    }
}

/// Shared handle onto the simulation, cloned into the pin and delay halves
/// handed to the bus and kept by the test for inspection.
#[derive(Clone)]
pub struct SimHandle(Rc<RefCell<Sim>>);

impl SimHandle {
    pub fn new(peer: Peer) -> SimHandle {
        SimHandle(Rc::new(RefCell::new(Sim {
            now_ns: 0,
            master_low: false,
            last_fall_us: 0,
            ever_driven: false,
            peer,
            events: Vec::new(),
        })))
    }

    pub fn pin(&self) -> SimPin {
        SimPin(self.0.clone())
    }

    pub fn delay(&self) -> SimDelay {
        SimDelay(self.0.clone())
    }

    /// Current virtual time.
    pub fn now_us(&self) -> u64 {
        self.0.borrow().now_us()
    }

    /// Drains the event log.
    pub fn take_events(&self) -> Vec<Event> {
        std::mem::take(&mut self.0.borrow_mut().events)
    }

    /// Bytes the device peer has assembled from the master's write slots.
    pub fn received(&self) -> Vec<u8> {
        match &self.0.borrow().peer {
            Peer::Device(device) => device.received.clone(),
            _ => Vec::new(),
        }
    }

    /// Makes the device peer answer read slots as busy until the given
    /// virtual instant.
    pub fn set_busy_until(&self, us: u64) {
        if let Peer::Device(device) = &mut self.0.borrow_mut().peer {
            device.busy_until_us = us;
        }
    }
}

pub struct SimPin(Rc<RefCell<Sim>>);

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.borrow_mut().drive_low();
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.borrow_mut().release();
        Ok(())
    }
}

impl InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.borrow_mut().sample())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.0.borrow_mut().sample())
    }
}

pub struct SimDelay(Rc<RefCell<Sim>>);

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.borrow_mut().now_ns += u64::from(ns);
    }
}
