//! Byte-level transport boundary between the renderer and the panel.

/// Transport to a display controller.
///
/// The render pipeline calls [`DisplayLink::data`] exactly once per packed
/// output byte, in row-major device order. Everything else (register
/// programming, update sequencing, readiness) belongs to the driver behind
/// the trait.
pub trait DisplayLink {
    type Error;

    /// Sends one controller opcode.
    fn command(&mut self, opcode: u8) -> Result<(), Self::Error>;

    /// Sends one byte of display data.
    fn data(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Sends a run of display data bytes.
    fn data_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        for &byte in bytes {
            self.data(byte)?;
        }
        Ok(())
    }

    /// Whether the controller is still busy with a previous operation.
    fn is_busy(&mut self) -> Result<bool, Self::Error>;
}
