//! Book-keeping for SPI hosts shared by several sensors.
//!
//! The registry only records which hosts were brought up and at what clock;
//! the actual peripheral setup stays with the board code, which asks the
//! registry for a [`DeviceConfig`] per chip-select line.

use core::fmt;

use embedded_hal::spi::{Mode, Phase, Polarity, MODE_0};
use log::{debug, info};

use crate::error::BusError;

/// Bytes clocked per MAX6675 transaction.
pub const TRANSFER_LEN: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostId {
    Spi1,
    Spi2,
    Spi3,
    Spi4,
}

impl HostId {
    pub const COUNT: usize = 4;

    pub const fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusConfig {
    pub clock_hz: u32,
}

/// Settings a sensor device on an initialized host must be opened with.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct DeviceConfig {
    pub host: HostId,
    pub cs_pin: u8,
    pub clock_hz: u32,
    pub mode: Mode,
    pub transfer_len: usize,
}

// spi::Mode has no Debug impl in embedded-hal 0.2
impl fmt::Debug for DeviceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceConfig")
            .field("host", &self.host)
            .field("cs_pin", &self.cs_pin)
            .field("clock_hz", &self.clock_hz)
            .field(
                "polarity",
                &format_args!(
                    "{}",
                    match self.mode.polarity {
                        Polarity::IdleLow => "IdleLow",
                        Polarity::IdleHigh => "IdleHigh",
                    }
                ),
            )
            .field(
                "phase",
                &format_args!(
                    "{}",
                    match self.mode.phase {
                        Phase::CaptureOnFirstTransition => "CaptureOnFirstTransition",
                        Phase::CaptureOnSecondTransition => "CaptureOnSecondTransition",
                    }
                ),
            )
            .field("transfer_len", &self.transfer_len)
            .finish()
    }
}

#[derive(Clone, Debug, Default)]
pub struct BusRegistry {
    hosts: [Option<BusConfig>; HostId::COUNT],
}

impl BusRegistry {
    pub const fn new() -> Self {
        Self {
            hosts: [None; HostId::COUNT],
        }
    }

    /// Records `host` as initialized. A second call for the same host is a
    /// no-op and keeps the first clock setting.
    pub fn init_host(&mut self, host: HostId, clock_hz: u32) -> Result<(), BusError> {
        if clock_hz == 0 {
            return Err(BusError::InvalidArgument);
        }
        let slot = &mut self.hosts[host.index()];
        if let Some(existing) = slot {
            debug!("{:?} already initialized at {} Hz", host, existing.clock_hz);
            return Ok(());
        }
        *slot = Some(BusConfig { clock_hz });
        info!("{:?} initialized at {} Hz", host, clock_hz);
        Ok(())
    }

    pub fn add_device(&self, host: HostId, cs_pin: u8) -> Result<DeviceConfig, BusError> {
        let bus = self.hosts[host.index()].ok_or(BusError::HostNotInitialized(host))?;
        Ok(DeviceConfig {
            host,
            cs_pin,
            clock_hz: bus.clock_hz,
            mode: MODE_0,
            transfer_len: TRANSFER_LEN,
        })
    }

    pub fn is_initialized(&self, host: HostId) -> bool {
        self.hosts[host.index()].is_some()
    }

    pub fn clock_hz(&self, host: HostId) -> Option<u32> {
        self.hosts[host.index()].map(|b| b.clock_hz)
    }
}
