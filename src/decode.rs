//! Classification of raw MAX6675 words.
//!
//! The device clocks out 16 bits per conversion:
//!
//! ```text
//!  15 | 14 ........................ 3 |  2  |  1  |  0
//! ----+--------------------------------+-----+-----+----
//!   0 |   temperature, 0.25 C / LSB    | OPN | ID  | TRI
//! ```
//!
//! Bit 2 is the documented open-thermocouple flag. Everything else this module
//! rejects (floating bus, reserved bits, impossible temperatures) is a
//! heuristic and can be tuned through [`DecodePolicy`].

use core::fmt;

/// Thermocouple open flag.
pub const FAULT_BIT: u16 = 0x0004;
/// Degrees Celsius per LSB of the temperature field.
pub const CELSIUS_PER_LSB: f32 = 0.25;
const TEMP_SHIFT: u16 = 3;

/// Inclusive Celsius bounds a decoded temperature must fall into.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CelsiusRange {
    pub min: f32,
    pub max: f32,
}

impl CelsiusRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, celsius: f32) -> bool {
        celsius >= self.min && celsius <= self.max
    }

    fn is_valid(&self) -> bool {
        !self.min.is_nan() && !self.max.is_nan() && self.min <= self.max
    }
}

/// Heuristic fault detection layered on top of the device fault bit.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecodePolicy {
    /// Bits that must read as zero on a healthy frame.
    pub reserved_mask: u16,
    /// Accepted temperature range, `None` disables the check.
    pub range: Option<CelsiusRange>,
}

impl DecodePolicy {
    pub const DEFAULT: DecodePolicy = DecodePolicy {
        reserved_mask: 0x0003,
        range: Some(CelsiusRange::new(-20.0, 1200.0)),
    };

    /// Trusts nothing but the fault bit and the floating bus patterns.
    pub const DEVICE_ONLY: DecodePolicy = DecodePolicy {
        reserved_mask: 0,
        range: None,
    };

    pub const fn with_reserved_mask(mut self, mask: u16) -> Self {
        self.reserved_mask = mask;
        self
    }

    pub const fn with_range(mut self, range: Option<CelsiusRange>) -> Self {
        self.range = range;
        self
    }

    /// The mask may not cover the fault bit or the temperature field.
    pub fn validate(&self) -> bool {
        let mask_ok = self.reserved_mask & !0x0003 == 0;
        let range_ok = self.range.map_or(true, |r| r.is_valid());
        mask_ok && range_ok
    }
}

impl Default for DecodePolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Why a frame was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameFault {
    /// All zeros or all ones: MISO floating or shorted.
    FloatingBus,
    ReservedBits,
    OutOfRange,
}

impl fmt::Display for FrameFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FrameFault::FloatingBus => "bus floating or shorted",
            FrameFault::ReservedBits => "reserved bits set",
            FrameFault::OutOfRange => "temperature out of range",
        })
    }
}

/// Outcome of decoding one raw word.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Decoded {
    Celsius(f32),
    OpenThermocouple,
    Fault(FrameFault),
}

impl Decoded {
    pub fn celsius(&self) -> Option<f32> {
        match *self {
            Decoded::Celsius(c) => Some(c),
            _ => None,
        }
    }
}

/// Converts the temperature field of `raw` to Celsius without any validation.
pub fn raw_to_celsius(raw: u16) -> f32 {
    f32::from(raw >> TEMP_SHIFT) * CELSIUS_PER_LSB
}

/// Decodes `raw` with [`DecodePolicy::DEFAULT`].
pub fn decode(raw: u16) -> Decoded {
    decode_with(raw, &DecodePolicy::DEFAULT)
}

pub fn decode_with(raw: u16, policy: &DecodePolicy) -> Decoded {
    if raw == 0x0000 || raw == 0xFFFF {
        return Decoded::Fault(FrameFault::FloatingBus);
    }
    if raw & FAULT_BIT != 0 {
        return Decoded::OpenThermocouple;
    }
    if raw & policy.reserved_mask != 0 {
        return Decoded::Fault(FrameFault::ReservedBits);
    }
    let celsius = raw_to_celsius(raw);
    match policy.range {
        Some(range) if !range.contains(celsius) => Decoded::Fault(FrameFault::OutOfRange),
        _ => Decoded::Celsius(celsius),
    }
}
