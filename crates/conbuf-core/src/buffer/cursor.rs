//! Cursor state owned by the text buffer.

use crate::Point;

/// The text cursor: position plus the display state the blink/draw layer
/// reads.
#[derive(Debug, Clone)]
pub struct Cursor {
    position: Point,
    /// Percentage of the character cell the cursor fills.
    size: u32,
    visible: bool,
    double: bool,
    delay: bool,
    on: bool,
    moved: bool,
    defer_draw: bool,
}

impl Cursor {
    #[must_use]
    pub fn new(size: u32) -> Self {
        Self {
            position: Point::ORIGIN,
            size,
            visible: true,
            double: false,
            delay: false,
            on: true,
            moved: false,
            defer_draw: false,
        }
    }

    #[must_use]
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn set_size(&mut self, size: u32) {
        self.size = size;
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_is_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Whether the cursor renders double-size (insert/overtype indicator).
    #[must_use]
    pub fn is_double(&self) -> bool {
        self.double
    }

    pub fn set_is_double(&mut self, double: bool) {
        self.double = double;
    }

    #[must_use]
    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn set_is_on(&mut self, on: bool) {
        self.on = on;
    }

    /// Delay the next blink cycle (set when the cursor moves while focused).
    pub fn set_delay(&mut self, delay: bool) {
        self.delay = delay;
    }

    #[must_use]
    pub fn has_moved(&self) -> bool {
        self.moved
    }

    pub fn set_has_moved(&mut self, moved: bool) {
        self.moved = moved;
    }

    /// Suppress draw notifications while a staged buffer is being filled.
    pub fn start_defer_drawing(&mut self) {
        self.defer_draw = true;
    }

    pub fn end_defer_drawing(&mut self) {
        self.defer_draw = false;
    }

    #[must_use]
    pub fn is_deferring_drawing(&self) -> bool {
        self.defer_draw
    }

    /// Adopt display properties from another cursor. Position and size are
    /// deliberately left alone; callers manage those across buffer swaps.
    pub fn copy_properties(&mut self, other: &Cursor) {
        self.visible = other.visible;
        self.double = other.double;
        self.delay = other.delay;
        self.on = other.on;
        self.moved = other.moved;
    }
}
