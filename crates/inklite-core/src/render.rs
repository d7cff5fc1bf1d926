//! Byte-at-a-time frame composition.

use log::debug;

use crate::buffer::CommandBuffer;
use crate::link::DisplayLink;
use crate::viewport::Viewport;

/// Streams one full frame of packed display bytes over `link`.
///
/// Rows are emitted top to bottom, 8-pixel column groups left to right,
/// matching the controller's RAM auto-increment order. Each working byte
/// starts all white (`0xFF`); every buffered command is folded over each of
/// the 8 bit positions, left to right, in insertion order. The whole surface
/// is swept exactly once.
pub fn stream_commands<L, const N: usize>(
    link: &mut L,
    viewport: &Viewport,
    buffer: &CommandBuffer<'_, N>,
) -> Result<(), L::Error>
where
    L: DisplayLink,
{
    debug!(
        "render: streaming frame width={} height={} commands={}",
        viewport.width,
        viewport.height,
        buffer.len()
    );

    for y in 0..viewport.height {
        let mut x = 0;
        while x < viewport.width {
            let mut byte = 0xFF;
            for bit in 0..8 {
                for command in buffer.commands() {
                    byte = command.process(byte, x + bit, y, viewport);
                }
            }
            link.data(byte)?;
            x += 8;
        }
    }

    Ok(())
}
