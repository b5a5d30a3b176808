//! Touch ADC trait

/// Analog channels of a 4-wire resistive touch controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcChannel {
    /// X position
    X,
    /// Y position
    Y,
    /// First pressure plate
    Z1,
    /// Second pressure plate
    Z2,
}

/// Full-scale 12-bit reading
pub const ADC_MAX: u16 = 0x0FFF;

/// Request/response access to a touch ADC
pub trait TouchAdc {
    /// Transport error
    type Error;

    /// Read one 12-bit channel
    fn read(&mut self, channel: AdcChannel) -> Result<u16, Self::Error>;

    /// Pressure proxy from the two pressure plates
    ///
    /// Zero when Z1 reads zero (no contact), otherwise `z1 - z2 + 4095`.
    fn pressure(&mut self) -> Result<u16, Self::Error> {
        let z1 = self.read(AdcChannel::Z1)?;
        if z1 == 0 {
            return Ok(0);
        }
        let z2 = self.read(AdcChannel::Z2)?;
        let p = z1 as i32 - z2 as i32 + ADC_MAX as i32;
        Ok(p.clamp(0, u16::MAX as i32) as u16)
    }
}
