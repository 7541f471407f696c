#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

/// A point in either screen or canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - other`.
    #[must_use]
    pub fn sub(self, other: Point) -> Point {
        Point { x: self.x - other.x, y: self.y - other.y }
    }

    /// Clamp both axes to be non-negative.
    #[must_use]
    pub fn clamp_non_negative(self) -> Point {
        Point { x: self.x.max(0.0), y: self.y.max(0.0) }
    }
}

/// Placement of the canvas surface on screen.
///
/// `origin` is the screen-space position of the canvas's top-left corner
/// (CSS pixels). Canvas coordinates are unscaled offsets from that corner.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Viewport {
    pub origin: Point,
}

impl Viewport {
    #[must_use]
    pub fn new(origin: Point) -> Self {
        Self { origin }
    }

    /// Convert a screen-space point to canvas coordinates.
    #[must_use]
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        screen.sub(self.origin)
    }

    /// Convert a canvas-space point to screen coordinates.
    #[must_use]
    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        Point { x: canvas.x + self.origin.x, y: canvas.y + self.origin.y }
    }
}
