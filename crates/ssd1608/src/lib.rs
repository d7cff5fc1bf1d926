#![cfg_attr(not(test), no_std)]

//! SSD1608-class ePaper controller driver.
//!
//! Owns the SPI device and the DC/BUSY/RESET pins, carries the register
//! programming sequences, and implements [`DisplayLink`] so the
//! `inklite-core` pipeline can stream composed frames straight to the panel
//! without a framebuffer.

pub mod protocol;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;
use inklite_core::{CommandBuffer, DisplayLink, Orientation, Viewport, stream_commands};
use log::debug;

const BUSY_POLL_MS: u32 = 10;
const RESET_PULSE_MS: u32 = 10;

/// Driver errors, one lane per hardware resource.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error<SpiErr, DcErr, BusyErr, RstErr> {
    /// SPI transaction failed.
    Spi(SpiErr),
    /// Data/command pin operation failed.
    Dc(DcErr),
    /// Busy pin read failed.
    Busy(BusyErr),
    /// Reset pin operation failed.
    Reset(RstErr),
    /// Input parameters are outside supported bounds.
    InvalidInput,
}

pub type DriverResult<SpiErr, DcErr, BusyErr, RstErr> =
    Result<(), Error<SpiErr, DcErr, BusyErr, RstErr>>;

/// SSD1608-class panel driver.
#[derive(Debug)]
pub struct Ssd1608<SPI, DC, BUSY, RST> {
    spi: SPI,
    dc: DC,
    busy: BUSY,
    rst: RST,
    width: i16,
    height: i16,
    orientation: Orientation,
}

impl<SPI, DC, BUSY, RST> Ssd1608<SPI, DC, BUSY, RST>
where
    SPI: SpiDevice<u8>,
    DC: OutputPin,
    BUSY: InputPin,
    RST: OutputPin,
{
    /// Creates a new driver for a `width x height` pixel panel.
    pub fn new(spi: SPI, dc: DC, busy: BUSY, rst: RST, width: i16, height: i16) -> Self {
        Self {
            spi,
            dc,
            busy,
            rst,
            width,
            height,
            orientation: Orientation::Rotate0,
        }
    }

    /// Releases owned bus and pins.
    pub fn release(self) -> (SPI, DC, BUSY, RST) {
        (self.spi, self.dc, self.busy, self.rst)
    }

    /// Panel width in pixels.
    pub const fn width(&self) -> i16 {
        self.width
    }

    /// Panel height in pixels.
    pub const fn height(&self) -> i16 {
        self.height
    }

    /// Rotation applied to subsequent render passes.
    ///
    /// Frames already sent to the panel are unaffected.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Viewport value threaded through command evaluation.
    pub const fn viewport(&self) -> Viewport {
        Viewport::with_orientation(self.width, self.height, self.orientation)
    }

    /// Programs the panel's data entry mode, RAM windows, and update control.
    pub fn init<D: DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> DriverResult<SPI::Error, DC::Error, BUSY::Error, RST::Error> {
        debug!("ssd1608: init width={} height={}", self.width, self.height);

        self.reset(delay)?;

        self.command(protocol::DATA_ENTRY_MODE)?;
        self.data(protocol::X_INCREMENT | protocol::Y_INCREMENT)?;

        self.command(protocol::SET_RAM_X_RANGE)?;
        self.data_all(&protocol::x_range_data(self.width))?;
        self.command(protocol::SET_RAM_Y_RANGE)?;
        self.data_all(&protocol::y_range_data(self.height))?;

        self.command(protocol::DISPLAY_UPDATE_CONTROL)?;
        self.data_all(&protocol::UPDATE_CONTROL_DATA)?;

        self.place(0, 0)?;
        self.block(delay)
    }

    /// Hard reset via the reset pin followed by a soft reset.
    pub fn reset<D: DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> DriverResult<SPI::Error, DC::Error, BUSY::Error, RST::Error> {
        delay.delay_ms(RESET_PULSE_MS);
        self.rst.set_low().map_err(Error::Reset)?;
        delay.delay_ms(RESET_PULSE_MS);
        self.rst.set_high().map_err(Error::Reset)?;
        self.block(delay)?;

        self.command(protocol::SOFT_RESET)?;
        self.block(delay)
    }

    /// Loads a manufacturer waveform table.
    pub fn load_lut(
        &mut self,
        waveform: &[u8],
    ) -> DriverResult<SPI::Error, DC::Error, BUSY::Error, RST::Error> {
        debug!("ssd1608: loading lut len={}", waveform.len());

        self.command(protocol::WRITE_LUT)?;
        self.data_all(waveform)
    }

    /// Composites the command buffer onto a blank frame and refreshes.
    ///
    /// With `wait = false` the update sequence is left running; call
    /// [`Ssd1608::wait_ready`] before touching the display again.
    pub fn render<const N: usize, D: DelayNs>(
        &mut self,
        buffer: &CommandBuffer<'_, N>,
        delay: &mut D,
        wait: bool,
    ) -> DriverResult<SPI::Error, DC::Error, BUSY::Error, RST::Error> {
        let viewport = self.viewport();
        debug!(
            "ssd1608: render commands={} orientation={}",
            buffer.len(),
            viewport.orientation.index()
        );

        self.place(0, 0)?;
        self.command(protocol::WRITE_RAM)?;
        stream_commands(self, &viewport, buffer)?;
        self.refresh(delay, wait)
    }

    /// Sends a prepacked full frame of `ceil(width / 8) * height` bytes.
    pub fn render_raw<D: DelayNs>(
        &mut self,
        frame: &[u8],
        delay: &mut D,
        wait: bool,
    ) -> DriverResult<SPI::Error, DC::Error, BUSY::Error, RST::Error> {
        if frame.len() != protocol::frame_len(self.width, self.height) {
            return Err(Error::InvalidInput);
        }

        self.place(0, 0)?;
        self.command(protocol::WRITE_RAM)?;
        self.data_all(frame)?;
        self.refresh(delay, wait)
    }

    /// Blanks the whole display and refreshes.
    pub fn clear<D: DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> DriverResult<SPI::Error, DC::Error, BUSY::Error, RST::Error> {
        debug!("ssd1608: clear");

        self.place(0, 0)?;
        self.command(protocol::WRITE_RAM)?;
        for _ in 0..protocol::frame_len(self.width, self.height) {
            self.data(0xFF)?;
        }
        self.refresh(delay, true)
    }

    /// True when the busy line is released.
    pub fn is_ready(&mut self) -> Result<bool, Error<SPI::Error, DC::Error, BUSY::Error, RST::Error>> {
        Ok(!self.busy.is_high().map_err(Error::Busy)?)
    }

    /// Polls the busy line until the panel is ready again.
    pub fn wait_ready<D: DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> DriverResult<SPI::Error, DC::Error, BUSY::Error, RST::Error> {
        while self.busy.is_high().map_err(Error::Busy)? {
            delay.delay_ms(BUSY_POLL_MS);
        }
        delay.delay_ms(BUSY_POLL_MS);
        Ok(())
    }

    fn refresh<D: DelayNs>(
        &mut self,
        delay: &mut D,
        wait: bool,
    ) -> DriverResult<SPI::Error, DC::Error, BUSY::Error, RST::Error> {
        self.command(protocol::MASTER_ACTIVATION)?;
        if wait {
            self.block(delay)?;
        }
        Ok(())
    }

    /// Sets the RAM address counters.
    fn place(&mut self, x: i16, y: i16) -> DriverResult<SPI::Error, DC::Error, BUSY::Error, RST::Error> {
        self.command(protocol::SET_RAM_X_ADDRESS)?;
        self.data(protocol::x_address_data(x))?;
        self.command(protocol::SET_RAM_Y_ADDRESS)?;
        self.data_all(&protocol::y_address_data(y))
    }

    // Busy poll that always sleeps once before sampling the pin.
    fn block<D: DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> DriverResult<SPI::Error, DC::Error, BUSY::Error, RST::Error> {
        loop {
            delay.delay_ms(BUSY_POLL_MS);
            if !self.busy.is_high().map_err(Error::Busy)? {
                break;
            }
        }
        delay.delay_ms(BUSY_POLL_MS);
        Ok(())
    }
}

impl<SPI, DC, BUSY, RST> DisplayLink for Ssd1608<SPI, DC, BUSY, RST>
where
    SPI: SpiDevice<u8>,
    DC: OutputPin,
    BUSY: InputPin,
    RST: OutputPin,
{
    type Error = Error<SPI::Error, DC::Error, BUSY::Error, RST::Error>;

    fn command(&mut self, opcode: u8) -> Result<(), Self::Error> {
        self.dc.set_low().map_err(Error::Dc)?;
        self.spi.write(&[opcode]).map_err(Error::Spi)
    }

    fn data(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.dc.set_high().map_err(Error::Dc)?;
        self.spi.write(&[byte]).map_err(Error::Spi)
    }

    fn data_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.dc.set_high().map_err(Error::Dc)?;
        self.spi.write(bytes).map_err(Error::Spi)
    }

    fn is_busy(&mut self) -> Result<bool, Self::Error> {
        self.busy.is_high().map_err(Error::Busy)
    }
}
