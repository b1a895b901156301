//! The viewport: the sub-rectangle of the backing buffer currently shown.

use crate::{CellSize, Error, Point, Rect, Result};

/// Visible window onto the backing grid. Always kept inside the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    rect: Rect,
}

impl Viewport {
    #[must_use]
    pub const fn new(rect: Rect) -> Self {
        Self { rect }
    }

    /// A viewport of `size` anchored at the origin.
    #[must_use]
    pub fn with_size(size: CellSize) -> Self {
        Self {
            rect: Rect::new(0, 0, size.cols - 1, size.rows - 1),
        }
    }

    #[must_use]
    pub const fn rect(&self) -> Rect {
        self.rect
    }

    /// Store `rect` verbatim. The caller vouches for validity.
    pub fn set_rect_raw(&mut self, rect: Rect) {
        self.rect = rect;
    }

    #[must_use]
    pub fn width(&self) -> i16 {
        self.rect.width()
    }

    #[must_use]
    pub fn height(&self) -> i16 {
        self.rect.height()
    }

    #[must_use]
    pub fn size(&self) -> CellSize {
        self.rect.size()
    }

    /// Replace the viewport with `proposed`, corrected to fit `buffer`.
    ///
    /// Negative left/top edges shift the rectangle right/down preserving its
    /// size; right/bottom are clipped to the buffer edges. The correction is
    /// written back through `proposed` so API callers observe it. Returns
    /// whether anything changed.
    pub fn set_rect(&mut self, proposed: &mut Rect, buffer: CellSize) -> bool {
        if *proposed == self.rect {
            return false;
        }

        if proposed.left < 0 {
            proposed.right -= proposed.left;
            proposed.left = 0;
        }
        if proposed.top < 0 {
            proposed.bottom -= proposed.top;
            proposed.top = 0;
        }
        proposed.right = proposed.right.min(buffer.cols - 1);
        proposed.bottom = proposed.bottom.min(buffer.rows - 1);

        self.rect = *proposed;
        let rect = self.rect;
        tracing::trace!(?rect, "viewport rect set");
        true
    }

    /// Move the viewport origin, preserving its size.
    ///
    /// With `relative` false, `origin` is the new top-left; with `relative`
    /// true it is a delta. Returns `Ok(None)` for the recognized no-ops
    /// (absolute move to the current origin, relative move by zero) and
    /// `Ok(Some(rect))` with the applied rectangle otherwise. Rejects moves
    /// that would push any edge outside the buffer.
    pub fn set_origin(
        &mut self,
        relative: bool,
        origin: Point,
        buffer: CellSize,
    ) -> Result<Option<Rect>> {
        let size = self.size();

        let mut target = Rect::default();
        if relative {
            if origin.x == 0 && origin.y == 0 {
                return Ok(None);
            }
            target.left = self.rect.left + origin.x;
            target.top = self.rect.top + origin.y;
        } else {
            if origin.x == self.rect.left && origin.y == self.rect.top {
                return Ok(None);
            }
            target.left = origin.x;
            target.top = origin.y;
        }
        target.right = target.left + size.cols - 1;
        target.bottom = target.top + size.rows - 1;

        if target.left < 0
            || target.top < 0
            || target.right < 0
            || target.bottom < 0
            || target.right >= buffer.cols
            || target.bottom >= buffer.rows
        {
            return Err(Error::InvalidParameter);
        }

        self.rect = target;
        tracing::trace!(?target, "viewport origin moved");
        Ok(Some(target))
    }

    /// Resize the viewport to `size`, absorbing each axis delta on the edge
    /// the window was grabbed by.
    ///
    /// `valid_end_y` is the row of the last meaningful character; growing
    /// downward will slide the top up rather than hide it.
    pub fn resize_to(
        &mut self,
        size: CellSize,
        from_top: bool,
        from_left: bool,
        buffer: CellSize,
        valid_end_y: i16,
    ) {
        let dx = size.cols - self.width();
        let dy = size.rows - self.height();

        if from_left {
            let left_proposed = self.rect.left - dx;
            if left_proposed >= 0 {
                self.rect.left -= dx;
            } else {
                // Not enough backlog to the left: pin the left edge and give
                // the shortfall to the right.
                self.rect.left = 0;
                self.rect.right += -left_proposed;
            }
        } else {
            let right_proposed = self.rect.right + dx;
            if right_proposed <= buffer.cols - 1 {
                self.rect.right += dx;
            } else {
                self.rect.right = buffer.cols - 1;
                self.rect.left -= right_proposed - (buffer.cols - 1);
            }
        }

        if from_top {
            let top_proposed = self.rect.top - dy;
            if top_proposed >= 0 {
                if self.rect.top > 0 {
                    self.rect.top -= dy;
                } else {
                    // Already stuck to row 0: shrinking from the top trims
                    // the bottom instead, so the first rows stay put.
                    debug_assert!(dy <= 0);
                    self.rect.bottom += dy;
                }
            } else {
                self.rect.top = 0;
                self.rect.bottom += -top_proposed;
            }
        } else {
            let bottom_proposed = self.rect.bottom + dy;
            if bottom_proposed <= buffer.rows - 1 {
                if bottom_proposed < valid_end_y {
                    // Collapsing from the bottom would hide the last line of
                    // text: slide the top up instead.
                    self.rect.top -= dy;
                    if self.rect.top < 0 {
                        let remainder = -self.rect.top;
                        self.rect.top = 0;
                        self.rect.bottom += remainder;
                    }
                } else {
                    self.rect.bottom += dy;
                }
            } else {
                self.rect.bottom = buffer.rows - 1;
                self.rect.top -= bottom_proposed - (buffer.rows - 1);
            }
        }

        if self.rect.left < 0 {
            self.rect.right -= self.rect.left;
            self.rect.left = 0;
        }
        if self.rect.top < 0 {
            self.rect.bottom -= self.rect.top;
            self.rect.top = 0;
        }
        self.rect.right = self.rect.right.min(buffer.cols - 1);
        self.rect.bottom = self.rect.bottom.min(buffer.rows - 1);

        let rect = self.rect;
        tracing::trace!(?rect, "viewport resized");
    }

    /// Whether the viewport spans every column of the buffer.
    #[must_use]
    pub fn is_maximized_x(&self, buffer: CellSize) -> bool {
        self.rect.left == 0 && self.rect.right + 1 == buffer.cols
    }

    /// Whether the viewport spans every row of the buffer.
    #[must_use]
    pub fn is_maximized_y(&self, buffer: CellSize) -> bool {
        self.rect.top == 0 && self.rect.bottom + 1 == buffer.rows
    }

    #[must_use]
    pub fn is_maximized_both(&self, buffer: CellSize) -> bool {
        self.is_maximized_x(buffer) && self.is_maximized_y(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUF: CellSize = CellSize::new(80, 25);

    #[test]
    fn set_rect_shifts_negative_origin() {
        let mut vp = Viewport::with_size(CellSize::new(40, 10));
        let mut proposed = Rect::new(-5, -2, 34, 7);
        assert!(vp.set_rect(&mut proposed, BUF));
        assert_eq!(vp.rect(), Rect::new(0, 0, 39, 9));
        // The corrected rect is visible to the caller.
        assert_eq!(proposed, Rect::new(0, 0, 39, 9));
    }

    #[test]
    fn set_rect_clips_to_buffer_edges() {
        let mut vp = Viewport::with_size(CellSize::new(40, 10));
        let mut proposed = Rect::new(50, 20, 120, 40);
        vp.set_rect(&mut proposed, BUF);
        assert_eq!(vp.rect(), Rect::new(50, 20, 79, 24));
    }

    #[test]
    fn set_rect_same_value_is_noop() {
        let mut vp = Viewport::new(Rect::new(0, 0, 39, 9));
        let mut proposed = Rect::new(0, 0, 39, 9);
        assert!(!vp.set_rect(&mut proposed, BUF));
    }

    #[test]
    fn absolute_origin_to_current_position_is_noop() {
        let mut vp = Viewport::new(Rect::new(0, 0, 39, 9));
        assert_eq!(vp.set_origin(false, Point::ORIGIN, BUF).unwrap(), None);
        assert_eq!(vp.rect(), Rect::new(0, 0, 39, 9));
    }

    #[test]
    fn relative_zero_is_noop_even_away_from_origin() {
        let mut vp = Viewport::new(Rect::new(10, 5, 49, 14));
        assert_eq!(vp.set_origin(true, Point::ORIGIN, BUF).unwrap(), None);
    }

    #[test]
    fn origin_move_preserves_size() {
        let mut vp = Viewport::new(Rect::new(0, 0, 39, 9));
        let rect = vp
            .set_origin(false, Point::new(10, 5), BUF)
            .unwrap()
            .unwrap();
        assert_eq!(rect, Rect::new(10, 5, 49, 14));
        assert_eq!(vp.size(), CellSize::new(40, 10));
    }

    #[test]
    fn origin_move_outside_buffer_is_rejected() {
        let mut vp = Viewport::new(Rect::new(0, 0, 39, 9));
        let err = vp.set_origin(false, Point::new(60, 0), BUF).unwrap_err();
        assert_eq!(err, Error::InvalidParameter);
        assert_eq!(vp.rect(), Rect::new(0, 0, 39, 9));

        let err = vp.set_origin(true, Point::new(0, -1), BUF).unwrap_err();
        assert_eq!(err, Error::InvalidParameter);
    }

    #[test]
    fn grow_from_bottom_right_extends_edges() {
        let mut vp = Viewport::new(Rect::new(0, 0, 39, 9));
        vp.resize_to(CellSize::new(50, 15), false, false, BUF, 0);
        assert_eq!(vp.rect(), Rect::new(0, 0, 49, 14));
    }

    #[test]
    fn grow_past_buffer_bottom_pulls_top_up() {
        let mut vp = Viewport::new(Rect::new(0, 10, 39, 24));
        vp.resize_to(CellSize::new(40, 20), false, false, BUF, 0);
        assert_eq!(vp.rect(), Rect::new(0, 5, 39, 24));
    }

    #[test]
    fn shrink_from_bottom_protects_valid_text() {
        // Bottom would collapse above the last line of text: the top slides
        // up instead.
        let mut vp = Viewport::new(Rect::new(0, 10, 79, 24));
        vp.resize_to(CellSize::new(80, 10), false, false, BUF, 24);
        assert_eq!(vp.rect(), Rect::new(0, 15, 79, 24));
    }

    #[test]
    fn shrink_from_top_at_row_zero_trims_bottom() {
        let mut vp = Viewport::new(Rect::new(0, 0, 79, 24));
        vp.resize_to(CellSize::new(80, 20), true, false, BUF, 0);
        assert_eq!(vp.rect(), Rect::new(0, 0, 79, 19));
    }

    #[test]
    fn grow_from_left_with_backlog_moves_left_edge() {
        let mut vp = Viewport::new(Rect::new(20, 0, 59, 9));
        vp.resize_to(CellSize::new(50, 10), false, true, BUF, 0);
        assert_eq!(vp.rect(), Rect::new(10, 0, 59, 9));
    }

    #[test]
    fn grow_from_left_without_backlog_spills_right() {
        let mut vp = Viewport::new(Rect::new(5, 0, 44, 9));
        vp.resize_to(CellSize::new(60, 10), false, true, BUF, 0);
        assert_eq!(vp.rect(), Rect::new(0, 0, 59, 9));
    }

    #[test]
    fn maximized_checks() {
        let vp = Viewport::new(Rect::new(0, 0, 79, 24));
        assert!(vp.is_maximized_x(BUF));
        assert!(vp.is_maximized_y(BUF));
        assert!(vp.is_maximized_both(BUF));

        let vp = Viewport::new(Rect::new(0, 0, 39, 24));
        assert!(!vp.is_maximized_x(BUF));
        assert!(vp.is_maximized_y(BUF));
    }
}
