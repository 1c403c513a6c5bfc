//! MAX6675-style thermocouple converter on a read-only SPI bus.
//!
//! One conversion result is clocked out as 16 bits, MSB first, while CS is
//! low. Bus errors are reported as an open probe so the reading drops to 0
//! instead of stalling the loop.

use defmt::warn;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;
use thermofan::sensor::{SensorReader, FAULT_BIT};

pub struct Max6675<SPI, CS> {
    spi: SPI,
    cs: CS,
}

impl<SPI, CS> Max6675<SPI, CS>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    /// `cs` should already be driven high.
    pub fn new(spi: SPI, cs: CS) -> Self {
        Self { spi, cs }
    }

    fn transfer(&mut self) -> Result<u16, SPI::Error> {
        let mut buf = [0u8; 2];
        let _ = self.cs.set_low();
        let result = self.spi.read(&mut buf).and_then(|()| self.spi.flush());
        let _ = self.cs.set_high();
        result.map(|()| u16::from_be_bytes(buf))
    }
}

impl<SPI, CS> SensorReader for Max6675<SPI, CS>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    fn read_raw(&mut self) -> u16 {
        match self.transfer() {
            Ok(raw) => raw,
            Err(_) => {
                warn!("Thermocouple: SPI read failed");
                FAULT_BIT
            }
        }
    }
}
