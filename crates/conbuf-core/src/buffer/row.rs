//! Per-row metadata: character-span measurement and attribute runs.
//!
//! Cell text lives in the text buffer's flat arenas; a `Row` carries only
//! the measured span, wrap flags, and run-length-encoded color attributes.

use smallvec::SmallVec;

use crate::attr::TextAttribute;
use crate::{Error, Result};

bitflags::bitflags! {
    /// Per-cell double-byte marker: the cell holds the first or second half
    /// of a double-width glyph.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[repr(transparent)]
    pub struct DbcsAttr: u8 {
        const LEADING = 0x01;
        const TRAILING = 0x02;
    }
}

/// Measured character span of a row plus its wrap state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharRow {
    /// First column holding a non-space character; `width` when the row is
    /// blank.
    pub left: i16,
    /// One past the last column holding a non-space character; 0 when the
    /// row is blank.
    pub right: i16,
    /// The row ended because the grid ran out of columns, not because of an
    /// explicit line break.
    pub wrap_forced: bool,
    /// The wrap was caused by a double-width glyph that did not fit, leaving
    /// a padding cell in the last column.
    pub double_byte_padded: bool,
}

impl CharRow {
    /// Canonical empty state for a row `width` columns wide.
    #[must_use]
    pub fn empty(width: i16) -> Self {
        Self {
            left: width,
            right: 0,
            wrap_forced: false,
            double_byte_padded: false,
        }
    }

    pub fn reset(&mut self, width: i16) {
        *self = Self::empty(width);
    }

    /// Fold a non-space write at `column` into the measured span.
    pub fn measure(&mut self, column: i16) {
        self.left = self.left.min(column);
        self.right = self.right.max(column + 1);
    }
}

/// One run of identically attributed cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrRun {
    pub attributes: TextAttribute,
    pub length: u32,
}

/// Run-length-encoded color attributes covering one row.
///
/// The run lengths always sum to the row width.
#[derive(Debug, Clone, Default)]
pub struct AttrRow {
    runs: SmallVec<[AttrRun; 4]>,
}

impl AttrRow {
    /// Reset to a single run of `attr` covering `width` cells.
    pub fn initialize(&mut self, width: i16, attr: TextAttribute) -> Result<()> {
        self.runs.clear();
        self.runs.push(AttrRun {
            attributes: attr,
            length: width.max(0) as u32,
        });
        Ok(())
    }

    #[must_use]
    pub fn new(width: i16, attr: TextAttribute) -> Self {
        let mut row = Self::default();
        // Infallible: a single run fits inline.
        let _ = row.initialize(width, attr);
        row
    }

    /// The attribute covering `column` and how many cells it still covers
    /// from there to the end of its run.
    #[must_use]
    pub fn find_attr_index(&self, column: i16) -> (TextAttribute, u32) {
        let column = column.max(0) as u32;
        let mut start = 0u32;
        for run in &self.runs {
            let end = start + run.length;
            if column < end {
                return (run.attributes, end - column);
            }
            start = end;
        }
        // Past coverage: report the final run with nothing remaining.
        let last = self.runs.last().copied().unwrap_or(AttrRun {
            attributes: TextAttribute::default(),
            length: 0,
        });
        (last.attributes, 0)
    }

    /// Re-cover a row whose width changed from `old_width` to `new_width`.
    ///
    /// Growth extends the final run over the added columns; shrink truncates
    /// runs past the new width.
    pub fn resize(&mut self, old_width: i16, new_width: i16) -> Result<()> {
        if self.runs.is_empty() {
            return self.initialize(new_width, TextAttribute::default());
        }
        if new_width >= old_width {
            let grow = (new_width - old_width) as u32;
            if let Some(last) = self.runs.last_mut() {
                last.length += grow;
            }
            return Ok(());
        }

        let target = new_width.max(0) as u32;
        let mut covered = 0u32;
        let mut keep = 0usize;
        for (index, run) in self.runs.iter_mut().enumerate() {
            if covered + run.length >= target {
                run.length = target - covered;
                keep = index + 1;
                break;
            }
            covered += run.length;
            keep = index + 1;
        }
        self.runs.truncate(keep);
        self.runs.retain(|r| r.length > 0);
        if self.runs.is_empty() {
            return self.initialize(new_width, TextAttribute::default());
        }
        Ok(())
    }

    /// Set the attribute of a single cell, splitting and re-merging runs as
    /// needed.
    pub fn set_attr_at(&mut self, column: i16, attr: TextAttribute) -> Result<()> {
        let column = if column >= 0 {
            column as u32
        } else {
            return Err(Error::InvalidParameter);
        };

        let mut start = 0u32;
        for index in 0..self.runs.len() {
            let run = self.runs[index];
            let end = start + run.length;
            if column >= end {
                start = end;
                continue;
            }
            if run.attributes == attr {
                return Ok(());
            }

            let before = column - start;
            let after = end - column - 1;
            self.runs[index] = AttrRun {
                attributes: attr,
                length: 1,
            };
            if after > 0 {
                self.runs.insert(
                    index + 1,
                    AttrRun {
                        attributes: run.attributes,
                        length: after,
                    },
                );
            }
            if before > 0 {
                self.runs.insert(
                    index,
                    AttrRun {
                        attributes: run.attributes,
                        length: before,
                    },
                );
            }
            self.merge_adjacent();
            return Ok(());
        }
        Err(Error::InvalidParameter)
    }

    fn merge_adjacent(&mut self) {
        let mut index = 0;
        while index + 1 < self.runs.len() {
            if self.runs[index].attributes == self.runs[index + 1].attributes {
                self.runs[index].length += self.runs[index + 1].length;
                self.runs.remove(index + 1);
            } else {
                index += 1;
            }
        }
    }

    /// Total cells covered. Equals the row width between operations.
    #[must_use]
    pub fn total_length(&self) -> u32 {
        self.runs.iter().map(|r| r.length).sum()
    }

    #[must_use]
    pub fn runs(&self) -> &[AttrRun] {
        &self.runs
    }
}

/// One row of the backing grid: measurement, attributes, and the storage
/// slot identity used for invalidation.
#[derive(Debug, Clone)]
pub struct Row {
    pub char_row: CharRow,
    pub attr_row: AttrRow,
    pub id: i16,
}

impl Row {
    #[must_use]
    pub fn new(width: i16, attr: TextAttribute, id: i16) -> Self {
        Self {
            char_row: CharRow::empty(width),
            attr_row: AttrRow::new(width, attr),
            id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(word: u16) -> TextAttribute {
        TextAttribute::from_legacy(word)
    }

    #[test]
    fn initialize_covers_width_with_one_run() {
        let row = AttrRow::new(80, attr(0x07));
        assert_eq!(row.runs().len(), 1);
        assert_eq!(row.total_length(), 80);
    }

    #[test]
    fn find_attr_index_reports_remaining_coverage() {
        let mut row = AttrRow::new(10, attr(0x07));
        row.set_attr_at(4, attr(0x1F)).unwrap();
        let (a, applies) = row.find_attr_index(0);
        assert_eq!(a, attr(0x07));
        assert_eq!(applies, 4);
        let (a, applies) = row.find_attr_index(4);
        assert_eq!(a, attr(0x1F));
        assert_eq!(applies, 1);
        let (a, applies) = row.find_attr_index(7);
        assert_eq!(a, attr(0x07));
        assert_eq!(applies, 3);
    }

    #[test]
    fn set_attr_at_splits_and_remerges() {
        let mut row = AttrRow::new(10, attr(0x07));
        row.set_attr_at(3, attr(0x1F)).unwrap();
        assert_eq!(row.runs().len(), 3);
        assert_eq!(row.total_length(), 10);
        // Writing the same attribute back merges the runs again.
        row.set_attr_at(3, attr(0x07)).unwrap();
        assert_eq!(row.runs().len(), 1);
    }

    #[test]
    fn resize_grow_extends_final_run() {
        let mut row = AttrRow::new(10, attr(0x07));
        row.set_attr_at(9, attr(0x1F)).unwrap();
        row.resize(10, 16).unwrap();
        assert_eq!(row.total_length(), 16);
        let (a, _) = row.find_attr_index(15);
        assert_eq!(a, attr(0x1F));
    }

    #[test]
    fn resize_shrink_truncates_runs() {
        let mut row = AttrRow::new(16, attr(0x07));
        row.set_attr_at(12, attr(0x1F)).unwrap();
        row.resize(16, 8).unwrap();
        assert_eq!(row.total_length(), 8);
        assert_eq!(row.runs().len(), 1);
    }

    #[test]
    fn char_row_measures_only_growing_span() {
        let mut cr = CharRow::empty(80);
        assert_eq!(cr.left, 80);
        assert_eq!(cr.right, 0);
        cr.measure(5);
        cr.measure(12);
        cr.measure(7);
        assert_eq!(cr.left, 5);
        assert_eq!(cr.right, 13);
    }
}
