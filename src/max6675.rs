use embedded_hal as hal;
use hal::digital::v2::OutputPin;
use hal::spi::MODE_0;
use log::{debug, warn};

use crate::bus::{DeviceConfig, TRANSFER_LEN};
use crate::error::{BusError, TransportError};

/// One fixed-length bus transaction returning the raw 16-bit word.
///
/// Implementations must not retry; the caller owns retry policy.
pub trait Transport {
    type Error;

    fn transact(&mut self) -> Result<u16, Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn transact(&mut self) -> Result<u16, Self::Error> {
        (**self).transact()
    }
}

/// MAX6675 on a blocking SPI bus with a GPIO chip-select.
///
/// The bus must be configured for mode 0, MSB first. MOSI is not used by the
/// device; the transfer just clocks out zeros.
pub struct SpiTransport<SPI, CS> {
    spi: SPI,
    cs: CS,
}

impl<SPI, CS> SpiTransport<SPI, CS>
    where SPI: hal::blocking::spi::Transfer<u8>,
          CS: OutputPin {

    pub fn new(spi: SPI, cs: CS) -> Self {
        Self { spi, cs }
    }

    /// Checks that `device` describes a MAX6675 frame before wrapping the bus.
    pub fn for_device(spi: SPI, cs: CS, device: &DeviceConfig) -> Result<Self, BusError> {
        if device.mode != MODE_0 || device.transfer_len != TRANSFER_LEN {
            return Err(BusError::InvalidArgument);
        }
        debug!("{:?} sensor on CS {} at {} Hz", device.host, device.cs_pin, device.clock_hz);
        Ok(Self::new(spi, cs))
    }

    pub fn release(self) -> (SPI, CS) {
        (self.spi, self.cs)
    }
}

impl<SPI, CS> Transport for SpiTransport<SPI, CS>
    where SPI: hal::blocking::spi::Transfer<u8>,
          CS: OutputPin {
    type Error = TransportError<SPI::Error, CS::Error>;

    fn transact(&mut self) -> Result<u16, Self::Error> {
        let mut t_buf: [u8; 2] = [0u8, 0u8];
        self.cs.set_low().map_err(TransportError::ChipSelect)?;
        let transfer = self.spi.transfer(&mut t_buf).map(|_| ());
        // CS goes back high even when the transfer failed
        let release = self.cs.set_high().map_err(TransportError::ChipSelect);
        if let (Err(_), Err(_)) = (&transfer, &release) {
            warn!("chip select release failed after spi error");
        }
        transfer.map_err(TransportError::Spi)?;
        release?;
        Ok(u16::from_be_bytes(t_buf))
    }
}
