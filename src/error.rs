use core::fmt;

use crate::bus::HostId;
use crate::decode::FrameFault;

/// Errors returned by [`Sensor`](crate::Sensor) construction and reads.
///
/// `E` is the error type of the underlying [`Transport`](crate::Transport).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Bad configuration passed to the sensor.
    InvalidArgument,
    /// The bus transaction itself failed.
    Transport(E),
    /// A word was clocked in but cannot have come from a healthy device.
    Frame { fault: FrameFault, raw: u16 },
    /// Strict rate limiting rejected the read before touching the bus.
    TooSoon { remaining_ms: u32 },
}

impl<E> Error<E> {
    /// Both bus errors and corrupt frames count as transport failures.
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Frame { .. })
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument => f.write_str("invalid sensor configuration"),
            Error::Transport(e) => write!(f, "transport failure: {:?}", e),
            Error::Frame { fault, raw } => write!(f, "bad frame {:#06x}: {}", raw, fault),
            Error::TooSoon { remaining_ms } => {
                write!(f, "read rejected, next read allowed in {} ms", remaining_ms)
            }
        }
    }
}

/// Failure of the SPI transaction performed by [`SpiTransport`](crate::SpiTransport).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError<SpiE, CsE> {
    Spi(SpiE),
    ChipSelect(CsE),
}

impl<SpiE: fmt::Debug, CsE: fmt::Debug> fmt::Display for TransportError<SpiE, CsE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Spi(e) => write!(f, "spi transfer failed: {:?}", e),
            TransportError::ChipSelect(e) => write!(f, "chip select failed: {:?}", e),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    InvalidArgument,
    HostNotInitialized(HostId),
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusError::InvalidArgument => f.write_str("invalid bus configuration"),
            BusError::HostNotInitialized(host) => write!(f, "{:?} bus not initialized", host),
        }
    }
}
