//! Logical-to-device coordinate mapping.

/// Rotation of the logical drawing space relative to device memory layout.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Orientation {
    #[default]
    Rotate0,
    Rotate90,
    Rotate180,
    Rotate270,
}

impl Orientation {
    /// Rotation index 0..=3 in 90 degree steps.
    pub const fn index(self) -> u8 {
        match self {
            Orientation::Rotate0 => 0,
            Orientation::Rotate90 => 1,
            Orientation::Rotate180 => 2,
            Orientation::Rotate270 => 3,
        }
    }

    /// Whether text flows along the device's vertical axis.
    pub const fn is_vertical(self) -> bool {
        matches!(self, Orientation::Rotate90 | Orientation::Rotate270)
    }
}

/// Device dimensions plus the active orientation for one render pass.
///
/// Threaded explicitly through every command evaluation; commands transform
/// their own anchor geometry into device space with [`Viewport::map_x`] and
/// [`Viewport::map_y`], then compare against the sweep coordinates directly.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Viewport {
    pub width: i16,
    pub height: i16,
    pub orientation: Orientation,
}

impl Viewport {
    pub const fn new(width: i16, height: i16) -> Self {
        Self {
            width,
            height,
            orientation: Orientation::Rotate0,
        }
    }

    pub const fn with_orientation(width: i16, height: i16, orientation: Orientation) -> Self {
        Self {
            width,
            height,
            orientation,
        }
    }

    /// Device-space x for a logical (x, y) pair.
    pub const fn map_x(&self, x: i16, y: i16) -> i16 {
        match self.orientation {
            Orientation::Rotate0 => x,
            Orientation::Rotate90 => self.width - y,
            Orientation::Rotate180 => self.width - x,
            Orientation::Rotate270 => y,
        }
    }

    /// Device-space y for a logical (x, y) pair.
    ///
    /// Computed independently of [`Viewport::map_x`]; the pair is not a
    /// combined matrix, matching the device's bit packing conventions.
    pub const fn map_y(&self, x: i16, y: i16) -> i16 {
        match self.orientation {
            Orientation::Rotate0 => y,
            Orientation::Rotate90 => x,
            Orientation::Rotate180 => self.height - y,
            Orientation::Rotate270 => self.height - x,
        }
    }
}
