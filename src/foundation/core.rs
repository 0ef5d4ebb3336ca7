pub use kurbo::{Point, Rect};

/// Side length of both the rendered card and the sticker, in pixels.
pub const CANVAS_SIZE: u32 = 512;

/// Straight (non-premultiplied) RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Fixed geometry and styling of a quote card. Positions are canvas pixels, text origins are
/// baselines.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardLayout {
    pub avatar: Rect,
    pub bubble: Rect,
    pub bubble_stroke_px: f64,
    pub bubble_color: Rgba8,
    pub name_origin: Point,
    pub name_size_px: f32,
    pub name_color: Rgba8,
    pub body_origin: Point,
    pub body_size_px: f32,
    pub body_line_height_px: f64,
    pub body_max_width_px: f32,
    pub body_color: Rgba8,
}

impl CardLayout {
    pub const STANDARD: CardLayout = CardLayout {
        avatar: Rect::new(20.0, 120.0, 100.0, 200.0),
        bubble: Rect::new(120.0, 100.0, 480.0, 350.0),
        bubble_stroke_px: 20.0,
        bubble_color: Rgba8::opaque(0xf0, 0xf0, 0xf0),
        name_origin: Point::new(140.0, 150.0),
        name_size_px: 40.0,
        name_color: Rgba8::opaque(0x00, 0x7b, 0xff),
        body_origin: Point::new(140.0, 200.0),
        body_size_px: 35.0,
        body_line_height_px: 45.0,
        body_max_width_px: 320.0,
        body_color: Rgba8::opaque(0x00, 0x00, 0x00),
    };

    /// Baseline of the `i`-th wrapped body line.
    pub fn body_baseline(&self, line: usize) -> Point {
        Point::new(
            self.body_origin.x,
            self.body_origin.y + line as f64 * self.body_line_height_px,
        )
    }
}

impl Default for CardLayout {
    fn default() -> Self {
        Self::STANDARD
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
