//! Rate-limited, caching reader on top of a [`Transport`].
//!
//! A [`Sensor`] remembers the last good temperature. While a reading is cached
//! and the configured minimum interval has not passed, [`Sensor::read`] either
//! serves the cached value (tagged as not fresh) or rejects the call, depending
//! on the [`RateLimitPolicy`]. It never waits for the interval to elapse.
//!
//! A sensor has no internal locking: sharing one between execution contexts
//! needs an external mutex. Serializing several sensors on one physical bus
//! is the transport's job.

use log::{debug, trace, warn};

use crate::clock::MonotonicClock;
use crate::decode::{decode_with, DecodePolicy, Decoded};
use crate::error::Error;
use crate::max6675::Transport;

/// Upper bound accepted for [`SensorConfig::min_interval_ms`].
pub const MAX_MIN_INTERVAL_MS: u32 = 60 * 60 * 1000;
/// Interval covering the device's ~220 ms conversion time.
pub const CONVERSION_INTERVAL_MS: u32 = 250;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RateLimitPolicy {
    /// Serve the cached value inside the interval.
    #[default]
    ReturnCached,
    /// Fail with [`Error::TooSoon`] inside the interval.
    EnforceMinInterval,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorConfig {
    /// Minimum time between bus transactions, 0 disables rate limiting.
    pub min_interval_ms: u32,
    pub policy: RateLimitPolicy,
    pub decode: DecodePolicy,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self::unlimited()
    }
}

impl SensorConfig {
    /// Every read hits the bus.
    pub const fn unlimited() -> Self {
        Self {
            min_interval_ms: 0,
            policy: RateLimitPolicy::ReturnCached,
            decode: DecodePolicy::DEFAULT,
        }
    }

    /// At most one transaction per conversion.
    pub const fn conversion_paced(policy: RateLimitPolicy) -> Self {
        Self {
            min_interval_ms: CONVERSION_INTERVAL_MS,
            policy,
            decode: DecodePolicy::DEFAULT,
        }
    }

    pub const fn with_min_interval_ms(mut self, min_interval_ms: u32) -> Self {
        self.min_interval_ms = min_interval_ms;
        self
    }

    pub const fn with_policy(mut self, policy: RateLimitPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub const fn with_decode(mut self, decode: DecodePolicy) -> Self {
        self.decode = decode;
        self
    }

    fn validate(&self) -> bool {
        self.min_interval_ms <= MAX_MIN_INTERVAL_MS && self.decode.validate()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Measurement {
    Celsius(f32),
    OpenThermocouple,
}

impl Measurement {
    pub fn celsius(&self) -> Option<f32> {
        match *self {
            Measurement::Celsius(c) => Some(c),
            Measurement::OpenThermocouple => None,
        }
    }
}

/// Result of a successful [`Sensor::read`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    pub measurement: Measurement,
    /// `false` when served from the cache without a bus transaction.
    pub is_fresh: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorState {
    HasNoReading,
    HasReading,
}

#[derive(Clone, Copy, Debug)]
struct Cached {
    celsius: f32,
    updated_us: i64,
}

/// One thermocouple channel.
///
/// `T` may be an owned transport or `&mut` to one owned by the bus layer, in
/// which case the sensor cannot outlive it.
pub struct Sensor<T, C> {
    transport: T,
    clock: C,
    config: SensorConfig,
    cached: Option<Cached>,
    last_raw: Option<u16>,
}

impl<T, C> Sensor<T, C>
where
    T: Transport,
    C: MonotonicClock,
{
    pub fn new(transport: T, clock: C, config: SensorConfig) -> Result<Self, Error<T::Error>> {
        if !config.validate() {
            return Err(Error::InvalidArgument);
        }
        Ok(Self {
            transport,
            clock,
            config,
            cached: None,
            last_raw: None,
        })
    }

    pub fn read(&mut self) -> Result<Reading, Error<T::Error>> {
        let now = self.clock.now_micros();

        if let Some(cached) = self.cached {
            let interval = i64::from(self.config.min_interval_ms);
            let elapsed_ms = now.saturating_sub(cached.updated_us).max(0) / 1000;
            if interval > 0 && elapsed_ms < interval {
                match self.config.policy {
                    RateLimitPolicy::EnforceMinInterval => {
                        let remaining_ms = (interval - elapsed_ms) as u32;
                        debug!("read rejected, {} ms left", remaining_ms);
                        return Err(Error::TooSoon { remaining_ms });
                    }
                    RateLimitPolicy::ReturnCached => {
                        trace!("serving cached {} C", cached.celsius);
                        return Ok(Reading {
                            measurement: Measurement::Celsius(cached.celsius),
                            is_fresh: false,
                        });
                    }
                }
            }
        }

        let raw = self.transport.transact().map_err(Error::Transport)?;
        trace!("raw word {:#06x}", raw);

        let measurement = match decode_with(raw, &self.config.decode) {
            Decoded::Celsius(celsius) => {
                self.cached = Some(Cached { celsius, updated_us: now });
                Measurement::Celsius(celsius)
            }
            Decoded::OpenThermocouple => {
                warn!("thermocouple open");
                self.cached = None;
                Measurement::OpenThermocouple
            }
            Decoded::Fault(fault) => {
                warn!("rejected frame {:#06x}: {}", raw, fault);
                return Err(Error::Frame { fault, raw });
            }
        };
        self.last_raw = Some(raw);

        Ok(Reading { measurement, is_fresh: true })
    }

    pub fn state(&self) -> SensorState {
        match self.cached {
            Some(_) => SensorState::HasReading,
            None => SensorState::HasNoReading,
        }
    }

    pub fn last_celsius(&self) -> Option<f32> {
        self.cached.map(|c| c.celsius)
    }

    pub fn last_update_us(&self) -> Option<i64> {
        self.cached.map(|c| c.updated_us)
    }

    /// Last word that decoded to a temperature or an open thermocouple.
    pub fn last_raw(&self) -> Option<u16> {
        self.last_raw
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    /// Drops the cached reading so the next read goes to the bus.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    pub fn release(self) -> (T, C) {
        (self.transport, self.clock)
    }
}
