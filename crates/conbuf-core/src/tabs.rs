//! Tab-stop tracking for virtual-terminal cursor motion.
//!
//! Columns are kept sorted, strictly increasing, with no duplicates. The
//! buffer starts with no stops; the output dispatcher seeds them.

use crate::{Error, Point, Result};

/// Ordered set of tab-stop columns.
#[derive(Debug, Default, Clone)]
pub struct TabStops {
    columns: Vec<i16>,
}

impl TabStops {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stop at `column`. Adding a stop that already exists is a no-op.
    ///
    /// On allocation failure nothing is mutated.
    pub fn add(&mut self, column: i16) -> Result<()> {
        match self.columns.binary_search(&column) {
            Ok(_) => Ok(()),
            Err(index) => {
                self.columns
                    .try_reserve(1)
                    .map_err(|_| Error::NoMemory)?;
                self.columns.insert(index, column);
                Ok(())
            }
        }
    }

    /// Remove every stop.
    pub fn clear(&mut self) {
        self.columns.clear();
    }

    /// Remove the stop at `column`, if one was set.
    pub fn clear_at(&mut self, column: i16) {
        self.columns.retain(|&c| c != column);
    }

    /// Whether any stops are set.
    #[must_use]
    pub fn any(&self) -> bool {
        !self.columns.is_empty()
    }

    /// Drop stops that no longer fit a buffer `width` columns wide.
    pub fn clamp_to_width(&mut self, width: i16) {
        self.columns.retain(|&c| c < width);
    }

    /// Where a forward tab takes `position` on a buffer `width` columns wide.
    ///
    /// From the last column the cursor wraps to the start of the next row.
    /// Otherwise it moves to the next stop past the cursor, or the last
    /// column when no stop remains.
    #[must_use]
    pub fn forward_tab(&self, position: Point, width: i16) -> Point {
        let last_column = width - 1;
        if position.x == last_column {
            return Point::new(0, position.y + 1);
        }
        let next = self.columns.iter().copied().find(|&c| c > position.x);
        Point::new(next.unwrap_or(last_column), position.y)
    }

    /// Where a reverse tab takes `position`.
    ///
    /// Column 0 when the cursor is already there, no stops are set, or the
    /// first stop is at or past the cursor; otherwise the greatest stop
    /// strictly before the cursor.
    #[must_use]
    pub fn reverse_tab(&self, position: Point) -> Point {
        let target = match self.columns.first() {
            None => 0,
            Some(&first) if position.x == 0 || first >= position.x => 0,
            Some(_) => self
                .columns
                .iter()
                .copied()
                .take_while(|&c| c < position.x)
                .last()
                .unwrap_or(0),
        };
        Point::new(target, position.y)
    }

    /// The stop columns, in increasing order.
    #[must_use]
    pub fn columns(&self) -> &[i16] {
        &self.columns
    }
}
