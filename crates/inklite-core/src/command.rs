//! Drawing primitives and their per-pixel compositing tests.
//!
//! Every command answers `process(input, x, y, viewport)` for one device
//! pixel of the 8-pixel working byte. Commands only ever clear bits (0 =
//! drawn), so overlapping commands compose as a union of draws.

use libm::{floorf, sqrtf};

use crate::font::Font;
use crate::viewport::{Orientation, Viewport};

/// Clears the working-byte bit for device column `x` (MSB = leftmost).
#[inline]
fn draw(input: u8, x: i16) -> u8 {
    input & !(1 << (7 - (x % 8)))
}

/// Floor modulus, never negative for positive `b`.
#[inline]
fn modp(a: i16, b: i16) -> i16 {
    ((a % b) + b) % b
}

/// Draws a single pixel.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PointCommand {
    x: i16,
    y: i16,
}

impl PointCommand {
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    pub fn process(&self, input: u8, x: i16, y: i16, viewport: &Viewport) -> u8 {
        let tx = viewport.map_x(self.x, self.y);
        let ty = viewport.map_y(self.x, self.y);

        if tx == x && ty == y {
            return draw(input, x);
        }

        input
    }
}

/// Draws a one pixel wide axis-aligned line.
///
/// Diagonal endpoints make the command a no-op.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LineCommand {
    x0: i16,
    y0: i16,
    x1: i16,
    y1: i16,
}

impl LineCommand {
    pub const fn new(x0: i16, y0: i16, x1: i16, y1: i16) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn process(&self, input: u8, x: i16, y: i16, viewport: &Viewport) -> u8 {
        let tx0 = viewport.map_x(self.x0, self.y0);
        let ty0 = viewport.map_y(self.x0, self.y0);
        let tx1 = viewport.map_x(self.x1, self.y1);
        let ty1 = viewport.map_y(self.x1, self.y1);

        // horizontal line
        if ty0 == ty1 && ty0 == y {
            if x < tx0 || x > tx1 {
                return input;
            }
            return draw(input, x);
        }

        // vertical line
        if tx0 == tx1 && tx0 == x {
            if y < ty0 || y > ty1 {
                return input;
            }
            return draw(input, x);
        }

        input
    }
}

/// Draws a rectangle, filled or as a one pixel outline.
///
/// Membership is inclusive of the far edges, so the covered area is
/// `(width + 1) x (height + 1)` pixels.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RectCommand {
    x: i16,
    y: i16,
    width: i16,
    height: i16,
    filled: bool,
    edges: [LineCommand; 4],
}

impl RectCommand {
    pub const fn new(x: i16, y: i16, width: i16, height: i16, filled: bool) -> Self {
        Self {
            x,
            y,
            width,
            height,
            filled,
            edges: [
                LineCommand::new(x, y, x + width, y),
                LineCommand::new(x + width, y, x + width, y + height),
                LineCommand::new(x, y + height, x + width, y + height),
                LineCommand::new(x, y, x, y + height),
            ],
        }
    }

    pub fn process(&self, input: u8, x: i16, y: i16, viewport: &Viewport) -> u8 {
        if self.filled {
            let tx = viewport.map_x(self.x, self.y);
            let ty = viewport.map_y(self.x, self.y);

            if x < tx || x > tx + self.width || y < ty || y > ty + self.height {
                return input;
            }
            return draw(input, x);
        }

        let mut data = input;
        for edge in &self.edges {
            data = edge.process(data, x, y, viewport);
        }
        data
    }
}

/// Draws a circle, filled or as an outline ring.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CircleCommand {
    x: i16,
    y: i16,
    radius: i16,
    filled: bool,
}

impl CircleCommand {
    pub const fn new(x: i16, y: i16, radius: i16, filled: bool) -> Self {
        Self {
            x,
            y,
            radius,
            filled,
        }
    }

    pub fn process(&self, input: u8, x: i16, y: i16, viewport: &Viewport) -> u8 {
        let tx = viewport.map_x(self.x, self.y);
        let ty = viewport.map_y(self.x, self.y);

        // too far out to touch the ring
        if (x - tx).abs() > self.radius + 1 || (y - ty).abs() > self.radius + 1 {
            return input;
        }

        let dx = f32::from(x - tx);
        let dy = f32::from(y - ty);
        let dist = dx * dx + dy * dy;

        if self.filled {
            let rsq = f32::from(self.radius) * f32::from(self.radius);
            if dist <= rsq {
                return draw(input, x);
            }
        } else if self.radius == floorf(sqrtf(dist) + 0.5) as i16 {
            return draw(input, x);
        }

        input
    }
}

/// Draws a text run in a monospaced bitmap font.
///
/// The string and font are borrowed and must outlive every render pass the
/// owning buffer is used in. One blank pixel column separates glyphs. For
/// 180 and 270 degree orientations the string is indexed back to front so
/// the rotated text reads correctly.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TextCommand<'a> {
    x: i16,
    y: i16,
    text: &'a str,
    length: i16,
    font: &'a Font<'a>,
    scale: i16,
}

impl<'a> TextCommand<'a> {
    pub fn new(x: i16, y: i16, text: &'a str, font: &'a Font<'a>, scale: i16) -> Self {
        Self {
            x,
            y,
            text,
            length: text.len() as i16,
            font,
            scale: if scale < 1 { 1 } else { scale },
        }
    }

    pub fn process(&self, input: u8, x: i16, y: i16, viewport: &Viewport) -> u8 {
        let tx = viewport.map_x(self.x, self.y);
        let ty = viewport.map_y(self.x, self.y);

        if self.out_of_bounds(x, y, tx, ty, viewport) {
            return input;
        }

        let diff = if viewport.orientation.is_vertical() {
            y - ty
        } else {
            x - tx
        };
        let index = diff / ((self.font.width() + 1) * self.scale);
        if index >= self.length {
            return input;
        }

        let reversed = matches!(
            viewport.orientation,
            Orientation::Rotate180 | Orientation::Rotate270
        );
        let at = if reversed {
            self.length - 1 - index
        } else {
            index
        };
        let code = self.text.as_bytes()[at as usize];

        self.render_glyph(input, code, x, y, tx, ty, viewport)
    }

    fn out_of_bounds(&self, x: i16, y: i16, tx: i16, ty: i16, viewport: &Viewport) -> bool {
        let width = self.font.width();
        let height = self.font.height();
        let cell = (width + 1) * self.scale;

        if viewport.orientation.is_vertical() {
            x < tx
                || x > tx + height * self.scale
                || y < ty
                || y >= ty + cell * self.length
                // 1px letter spacing
                || ((y - ty) / self.scale + 1) % (width + 1) == 0
        } else {
            x < tx
                || x >= tx + cell * self.length
                || y < ty
                || y > ty + height * self.scale
                // 1px letter spacing
                || ((x - tx) / self.scale + 1) % (width + 1) == 0
        }
    }

    fn render_glyph(
        &self,
        input: u8,
        code: u8,
        x: i16,
        y: i16,
        tx: i16,
        ty: i16,
        viewport: &Viewport,
    ) -> u8 {
        let width = self.font.width();
        let diff = if viewport.orientation.is_vertical() {
            y - ty
        } else {
            x - tx
        };
        // 270 degree layouts walk glyph columns in reverse
        let mirror = if viewport.orientation == Orientation::Rotate270 {
            width - 1
        } else {
            0
        };
        let column = (mirror - modp(diff / self.scale, width + 1)).abs();
        let slice = u32::from(self.font.column(code, column));

        // the shift direction and probed bit encode each rotation's packing
        let hit = match viewport.orientation {
            Orientation::Rotate0 => (slice >> ((y - ty) / self.scale)) & 1 != 0,
            Orientation::Rotate90 => (slice << ((x - tx) / self.scale)) & 0x80 != 0,
            Orientation::Rotate180 => (slice << ((y - ty) / self.scale)) & 0x80 != 0,
            Orientation::Rotate270 => (slice >> ((x - tx) / self.scale)) & 1 != 0,
        };

        if hit { draw(input, x) } else { input }
    }
}

/// Copies a prepacked 1bpp frame onto the display.
///
/// The source uses the working-byte convention (MSB first, 0 = drawn), so the
/// byte for the swept position is returned verbatim and any prior
/// composition is discarded. Origin-fixed at (0, 0), full device sized.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BitmapCommand<'a> {
    data: &'a [u8],
    width: i16,
}

impl<'a> BitmapCommand<'a> {
    pub const fn new(data: &'a [u8], width: i16) -> Self {
        Self { data, width }
    }

    pub fn process(&self, input: u8, x: i16, y: i16, _viewport: &Viewport) -> u8 {
        if x < 0 || y < 0 {
            return input;
        }

        let index = y as usize * (self.width / 8) as usize + (x / 8) as usize;
        match self.data.get(index) {
            Some(&byte) => byte,
            None => input,
        }
    }
}

/// One drawing primitive, dispatched by exhaustive match.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Command<'a> {
    Point(PointCommand),
    Line(LineCommand),
    Rect(RectCommand),
    Circle(CircleCommand),
    Text(TextCommand<'a>),
    Bitmap(BitmapCommand<'a>),
}

impl<'a> Command<'a> {
    /// Folds this command over one bit position of the working byte.
    pub fn process(&self, input: u8, x: i16, y: i16, viewport: &Viewport) -> u8 {
        match self {
            Command::Point(command) => command.process(input, x, y, viewport),
            Command::Line(command) => command.process(input, x, y, viewport),
            Command::Rect(command) => command.process(input, x, y, viewport),
            Command::Circle(command) => command.process(input, x, y, viewport),
            Command::Text(command) => command.process(input, x, y, viewport),
            Command::Bitmap(command) => command.process(input, x, y, viewport),
        }
    }
}

impl From<PointCommand> for Command<'_> {
    fn from(command: PointCommand) -> Self {
        Command::Point(command)
    }
}

impl From<LineCommand> for Command<'_> {
    fn from(command: LineCommand) -> Self {
        Command::Line(command)
    }
}

impl From<RectCommand> for Command<'_> {
    fn from(command: RectCommand) -> Self {
        Command::Rect(command)
    }
}

impl From<CircleCommand> for Command<'_> {
    fn from(command: CircleCommand) -> Self {
        Command::Circle(command)
    }
}

impl<'a> From<TextCommand<'a>> for Command<'a> {
    fn from(command: TextCommand<'a>) -> Self {
        Command::Text(command)
    }
}

impl<'a> From<BitmapCommand<'a>> for Command<'a> {
    fn from(command: BitmapCommand<'a>) -> Self {
        Command::Bitmap(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font5x7::FONT_5X7;

    const VIEWPORT: Viewport = Viewport::new(64, 32);

    #[test]
    fn every_command_leaves_out_of_range_pixels_untouched() {
        let bitmap = [0x00u8; 8];
        let commands: [Command<'_>; 6] = [
            PointCommand::new(3, 4).into(),
            LineCommand::new(2, 4, 9, 4).into(),
            RectCommand::new(2, 4, 5, 6, true).into(),
            CircleCommand::new(5, 5, 2, false).into(),
            TextCommand::new(0, 0, "hi", &FONT_5X7, 1).into(),
            BitmapCommand::new(&bitmap, 64).into(),
        ];

        // (40, 20) is outside every geometry above; the bitmap source covers
        // only the first row, so the probe must fall past its extent too.
        for command in &commands {
            assert_eq!(command.process(0xAB, 40, 20, &VIEWPORT), 0xAB);
        }
    }

    #[test]
    fn point_draws_only_its_own_pixel() {
        let command = PointCommand::new(10, 3);

        assert_eq!(command.process(0xFF, 10, 3, &VIEWPORT), 0xFF & !(1 << 5));
        assert_eq!(command.process(0xFF, 11, 3, &VIEWPORT), 0xFF);
        assert_eq!(command.process(0xFF, 10, 4, &VIEWPORT), 0xFF);
    }

    #[test]
    fn horizontal_line_spans_inclusive_endpoints() {
        let command = LineCommand::new(2, 4, 6, 4);

        for x in 2..=6 {
            assert_ne!(command.process(0xFF, x, 4, &VIEWPORT), 0xFF);
        }
        assert_eq!(command.process(0xFF, 1, 4, &VIEWPORT), 0xFF);
        assert_eq!(command.process(0xFF, 7, 4, &VIEWPORT), 0xFF);
        assert_eq!(command.process(0xFF, 4, 5, &VIEWPORT), 0xFF);
    }

    #[test]
    fn vertical_line_spans_inclusive_endpoints() {
        let command = LineCommand::new(5, 1, 5, 3);

        for y in 1..=3 {
            assert_ne!(command.process(0xFF, 5, y, &VIEWPORT), 0xFF);
        }
        assert_eq!(command.process(0xFF, 5, 0, &VIEWPORT), 0xFF);
        assert_eq!(command.process(0xFF, 5, 4, &VIEWPORT), 0xFF);
    }

    #[test]
    fn diagonal_line_is_a_no_op() {
        let command = LineCommand::new(0, 0, 5, 5);

        for y in 0..6 {
            for x in 0..6 {
                assert_eq!(command.process(0xFF, x, y, &VIEWPORT), 0xFF);
            }
        }
    }

    #[test]
    fn filled_rect_is_inclusive_of_far_edges() {
        let command = RectCommand::new(2, 3, 4, 2, true);

        // covered area is (width + 1) x (height + 1)
        for y in 3..=5 {
            for x in 2..=6 {
                assert_ne!(command.process(0xFF, x, y, &VIEWPORT), 0xFF);
            }
        }
        assert_eq!(command.process(0xFF, 7, 3, &VIEWPORT), 0xFF);
        assert_eq!(command.process(0xFF, 2, 6, &VIEWPORT), 0xFF);
    }

    #[test]
    fn outline_rect_draws_only_the_border() {
        let command = RectCommand::new(2, 3, 4, 3, false);

        for x in 2..=6 {
            assert_ne!(command.process(0xFF, x, 3, &VIEWPORT), 0xFF);
            assert_ne!(command.process(0xFF, x, 6, &VIEWPORT), 0xFF);
        }
        for y in 3..=6 {
            assert_ne!(command.process(0xFF, 2, y, &VIEWPORT), 0xFF);
            assert_ne!(command.process(0xFF, 6, y, &VIEWPORT), 0xFF);
        }
        assert_eq!(command.process(0xFF, 4, 4, &VIEWPORT), 0xFF);
    }

    #[test]
    fn filled_circle_reaches_cardinal_extremes_and_no_further() {
        let command = CircleCommand::new(10, 10, 3, true);

        assert_ne!(command.process(0xFF, 13, 10, &VIEWPORT), 0xFF);
        assert_ne!(command.process(0xFF, 10, 13, &VIEWPORT), 0xFF);
        assert_ne!(command.process(0xFF, 10, 10, &VIEWPORT), 0xFF);

        for y in 0..VIEWPORT.height {
            for x in 0..VIEWPORT.width {
                let dx = i32::from(x - 10);
                let dy = i32::from(y - 10);
                if dx * dx + dy * dy > 9 {
                    assert_eq!(command.process(0xFF, x, y, &VIEWPORT), 0xFF);
                }
            }
        }
    }

    #[test]
    fn outline_circle_draws_the_rounded_ring() {
        let command = CircleCommand::new(10, 10, 3, false);

        // on the ring: distance rounds to the radius
        assert_ne!(command.process(0xFF, 13, 10, &VIEWPORT), 0xFF);
        assert_ne!(command.process(0xFF, 12, 12, &VIEWPORT), 0xFF);
        // interior and exterior stay blank
        assert_eq!(command.process(0xFF, 10, 10, &VIEWPORT), 0xFF);
        assert_eq!(command.process(0xFF, 11, 10, &VIEWPORT), 0xFF);
        assert_eq!(command.process(0xFF, 15, 10, &VIEWPORT), 0xFF);
    }

    #[test]
    fn text_first_glyph_matches_stored_columns() {
        let command = TextCommand::new(0, 0, "A", &FONT_5X7, 1);

        for y in 0..7i16 {
            for x in 0..5i16 {
                let expected = (FONT_5X7.column(b'A', x) >> y) & 1 != 0;
                let drawn = command.process(0xFF, x, y, &VIEWPORT) != 0xFF;
                assert_eq!(drawn, expected, "glyph mismatch at ({x}, {y})");
            }
            // inter-glyph spacing column stays blank
            assert_eq!(command.process(0xFF, 5, y, &VIEWPORT), 0xFF);
        }
    }

    #[test]
    fn text_second_glyph_is_offset_by_one_cell() {
        let command = TextCommand::new(0, 0, "AB", &FONT_5X7, 1);

        for y in 0..7i16 {
            for x in 0..5i16 {
                let expected = (FONT_5X7.column(b'B', x) >> y) & 1 != 0;
                let drawn = command.process(0xFF, x + 6, y, &VIEWPORT) != 0xFF;
                assert_eq!(drawn, expected, "glyph mismatch at ({x}, {y})");
            }
        }
    }

    #[test]
    fn text_scale_replicates_each_glyph_pixel() {
        let command = TextCommand::new(0, 0, "A", &FONT_5X7, 2);

        for y in 0..14i16 {
            for x in 0..10i16 {
                let expected = (FONT_5X7.column(b'A', x / 2) >> (y / 2)) & 1 != 0;
                let drawn = command.process(0xFF, x, y, &VIEWPORT) != 0xFF;
                assert_eq!(drawn, expected, "scaled glyph mismatch at ({x}, {y})");
            }
        }
    }

    #[test]
    fn bitmap_returns_source_bytes_verbatim() {
        let data = [0xDE, 0xAD, 0xBE, 0xEF];
        let command = BitmapCommand::new(&data, 16);

        // prior composition is discarded
        assert_eq!(command.process(0x00, 0, 0, &VIEWPORT), 0xDE);
        assert_eq!(command.process(0xFF, 9, 0, &VIEWPORT), 0xAD);
        assert_eq!(command.process(0x12, 7, 1, &VIEWPORT), 0xBE);
        assert_eq!(command.process(0x34, 15, 1, &VIEWPORT), 0xEF);
        // past the source, the input is preserved
        assert_eq!(command.process(0x56, 0, 2, &VIEWPORT), 0x56);
    }
}
