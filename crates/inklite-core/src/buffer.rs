//! Fixed-capacity command storage.

use heapless::Vec;
use log::debug;

use crate::command::Command;
use crate::viewport::Viewport;

/// Ordered store of drawing commands, insertion order = composition order.
///
/// Capacity is a compile-time bound; nothing is heap allocated. A full
/// buffer rejects further pushes and hands the command back to the caller.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommandBuffer<'a, const N: usize> {
    commands: Vec<Command<'a>, N>,
}

impl<'a, const N: usize> CommandBuffer<'a, N> {
    pub const fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Appends a command.
    ///
    /// Returns the command back when the buffer is full; the buffer itself
    /// is left untouched in that case.
    pub fn push(&mut self, command: Command<'a>) -> Result<(), Command<'a>> {
        self.commands.push(command).map_err(|command| {
            debug!("command buffer full, rejecting push capacity={}", N);
            command
        })
    }

    /// Removes the most recently pushed command.
    pub fn pop(&mut self) -> Option<Command<'a>> {
        self.commands.pop()
    }

    /// Drops every command, keeping the storage.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.commands.is_full()
    }

    /// Stored commands in composition order.
    pub fn commands(&self) -> &[Command<'a>] {
        &self.commands
    }

    /// Dispatches one stored command against one bit position.
    ///
    /// An out-of-range index leaves the working byte unchanged.
    pub fn process(&self, at: usize, input: u8, x: i16, y: i16, viewport: &Viewport) -> u8 {
        match self.commands.get(at) {
            Some(command) => command.process(input, x, y, viewport),
            None => input,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::PointCommand;

    #[test]
    fn push_and_pop_are_lifo() {
        let mut buffer: CommandBuffer<'_, 4> = CommandBuffer::new();

        assert!(buffer.push(PointCommand::new(1, 1).into()).is_ok());
        assert!(buffer.push(PointCommand::new(2, 2).into()).is_ok());
        assert_eq!(buffer.len(), 2);

        assert_eq!(buffer.pop(), Some(PointCommand::new(2, 2).into()));
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.pop(), Some(PointCommand::new(1, 1).into()));
        assert_eq!(buffer.pop(), None);
    }

    #[test]
    fn overflowing_push_leaves_the_buffer_intact() {
        let mut full: CommandBuffer<'_, 2> = CommandBuffer::new();
        let mut reference: CommandBuffer<'_, 2> = CommandBuffer::new();

        for buffer in [&mut full, &mut reference] {
            assert!(buffer.push(PointCommand::new(1, 1).into()).is_ok());
            assert!(buffer.push(PointCommand::new(2, 2).into()).is_ok());
        }

        let rejected = full.push(PointCommand::new(3, 3).into());
        assert_eq!(rejected, Err(PointCommand::new(3, 3).into()));
        assert_eq!(full.len(), full.capacity());
        assert_eq!(full, reference);
    }

    #[test]
    fn process_out_of_range_returns_the_input() {
        let mut buffer: CommandBuffer<'_, 2> = CommandBuffer::new();
        let viewport = Viewport::new(16, 16);

        assert!(buffer.push(PointCommand::new(1, 1).into()).is_ok());
        assert_eq!(buffer.process(5, 0xCD, 1, 1, &viewport), 0xCD);
    }

    #[test]
    fn clear_resets_to_empty() {
        let mut buffer: CommandBuffer<'_, 2> = CommandBuffer::new();

        assert!(buffer.push(PointCommand::new(1, 1).into()).is_ok());
        buffer.clear();
        assert!(buffer.is_empty());
        assert!(!buffer.is_full());
    }
}
