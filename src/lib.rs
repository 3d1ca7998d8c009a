//! MAX6675 K-type thermocouple reader.
//!
//! Reads the 16-bit frame the MAX6675 clocks out over SPI, rejects frames that
//! cannot come from a healthy device, and optionally rate-limits bus access
//! per sensor while caching the last good temperature.
//!
//! ```ignore
//! let transport = SpiTransport::new(spi, cs);
//! let config = SensorConfig::conversion_paced(RateLimitPolicy::ReturnCached);
//! let mut sensor = Sensor::new(transport, clock, config)?;
//! match sensor.read()?.measurement {
//!     Measurement::Celsius(c) => { /* ... */ }
//!     Measurement::OpenThermocouple => { /* check wiring */ }
//! }
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod bus;
pub mod clock;
pub mod decode;
pub mod error;
pub mod max6675;
pub mod sensor;

pub use bus::{BusRegistry, DeviceConfig, HostId};
pub use clock::{MillisClock, MonotonicClock};
pub use decode::{decode, decode_with, CelsiusRange, DecodePolicy, Decoded, FrameFault};
pub use error::{BusError, Error, TransportError};
pub use max6675::{SpiTransport, Transport};
pub use sensor::{Measurement, RateLimitPolicy, Reading, Sensor, SensorConfig, SensorState};
