//! The two buffer-resize algorithms.
//!
//! Traditional resize reshapes storage in place: the min-overlap rectangle
//! of cells survives verbatim, rows rotate so the cursor row is retained,
//! and wrap flags are left untouched. Reflowing resize rebuilds the buffer
//! by replaying its content at the new width, so soft wraps move and hard
//! breaks stay.

use crate::attr::CharInfo;
use crate::buffer::{DbcsAttr, Row, TextBuffer};
use crate::{CellSize, Error, Point, Result};

use super::ScreenBuffer;

impl ScreenBuffer {
    fn reject_oversize(size: CellSize) -> Result<()> {
        if size.cols as u16 >= 0x7FFF || size.rows as u16 >= 0x7FFF {
            tracing::warn!(cols = size.cols, rows = size.rows, "invalid screen buffer size");
            return Err(Error::InvalidParameter);
        }
        Ok(())
    }

    /// Reshape the backing grid to `new` without rewrapping.
    ///
    /// Every allocation is staged first; on failure the live buffer is
    /// untouched.
    pub fn resize_traditional(&mut self, new: CellSize) -> Result<()> {
        Self::reject_oversize(new)?;
        debug_assert!(new.cols >= 1 && new.rows >= 1);

        let old = self.buffer_size;
        let area = new.area();

        let mut chars: Vec<char> = Vec::new();
        chars.try_reserve_exact(area).map_err(|_| Error::NoMemory)?;
        chars.resize(area, ' ');

        let mut dbcs: Vec<DbcsAttr> = Vec::new();
        dbcs.try_reserve_exact(area).map_err(|_| Error::NoMemory)?;
        dbcs.resize(area, DbcsAttr::empty());

        let limit = CellSize::new(new.cols.min(old.cols), new.rows.min(old.rows));

        // When the buffer is losing the cursor's row, rotate so that row is
        // retained: everything above `top_row` scrolls away.
        let cursor_y = self.text.cursor().position().y;
        let mut top_row = 0;
        if new.rows <= cursor_y {
            top_row += cursor_y - new.rows + 1;
        }
        let top_row_index = (self.text.first_row_index() + top_row) % old.rows;
        let rotated = new.rows != old.rows;

        // Row metadata for the new shape. Rotation folds the first-row
        // offset into physical order; surviving rows carry their flags and
        // attribute runs with them.
        let copied_rows = limit.rows;
        let mut rows: Vec<Row> = Vec::new();
        rows.try_reserve_exact(new.rows as usize)
            .map_err(|_| Error::NoMemory)?;
        for i in 0..new.rows {
            if i < copied_rows {
                let src = if rotated {
                    ((top_row_index + i) % old.rows) as usize
                } else {
                    i as usize
                };
                rows.push(self.text.rows()[src].clone());
            } else {
                rows.push(Row::new(new.cols, self.attributes, i));
            }
        }

        // Copy the surviving cells row by row; the tail of each row and all
        // added rows stay as the spaces the staging buffers were built with.
        let old_width = old.cols as usize;
        let new_width = new.cols as usize;
        for i in 0..copied_rows {
            let src_slot = if rotated {
                ((top_row_index + i) % old.rows) as usize
            } else {
                i as usize
            };
            let src_start = src_slot * old_width;
            let dst_start = i as usize * new_width;
            let span = limit.cols as usize;
            chars[dst_start..dst_start + span]
                .copy_from_slice(&self.text.raw_chars()[src_start..src_start + span]);
            dbcs[dst_start..dst_start + span]
                .copy_from_slice(&self.text.raw_dbcs()[src_start..src_start + span]);

            let row = &mut rows[i as usize];
            if row.char_row.right > new.cols {
                row.char_row.right = new.cols;
            }
            row.id = i;
        }

        let first_row = if rotated {
            0
        } else {
            self.text.first_row_index()
        };
        self.text.install_storage(chars, dbcs, rows, new, first_row);

        // Horizontal growth extends each row's final attribute run; shrink
        // truncates runs past the new width.
        if new.cols != old.cols {
            for i in 0..copied_rows {
                self.text.rows_mut()[i as usize]
                    .attr_row
                    .resize(old.cols, new.cols)?;
            }
        }

        // Keep the same cell under the cursor across the rotation.
        let mut cursor = self.text.cursor().position();
        cursor.y = (cursor.y - top_row).clamp(0, new.rows - 1);
        cursor.x = cursor.x.clamp(0, new.cols - 1);
        self.text.cursor_mut().set_position(cursor);

        self.buffer_size = new;
        self.tabs.clamp_to_width(new.cols);
        self.clamp_viewport_to_buffer();

        tracing::debug!(?old, ?new, top_row, "traditional resize");
        Ok(())
    }

    /// Rebuild the buffer at `new`, rewrapping soft-wrapped lines and
    /// keeping hard breaks.
    ///
    /// The character under the cursor stays under the cursor; a cursor past
    /// the last character keeps its offset from it, modulo the one-row
    /// adjustment when either side's last row is soft-wrapped. The cursor's
    /// row within the viewport is preserved.
    pub fn resize_with_reflow(&mut self, new: CellSize) -> Result<()> {
        Self::reject_oversize(new)?;

        let fill = CharInfo::space(self.attributes.legacy_attributes());
        // Cursor size 0 keeps the staged buffer from rendering until the
        // real size is restored at the end.
        let mut staged = TextBuffer::new(self.text.current_font(), new, fill, 0)?;
        staged.cursor_mut().start_defer_drawing();

        let cursor_height_before = self.text.cursor().position().y - self.viewport.rect().top;

        let old_cursor = self.text.cursor().position();
        let old_last = self.text.last_non_space_character();
        let old_rows_total = old_last.y + 1;
        let old_cols_total = self.buffer_size.cols;

        let mut new_cursor = Point::ORIGIN;
        let mut found_cursor = false;

        for old_row in 0..old_rows_total {
            let char_row = self.text.row_by_offset(old_row).char_row;

            // A soft-wrapped row is full to the brim even if its measured
            // span ends early (trailing spaces are not "displayable"), so
            // replay the whole width. A trailing pad cell left by a wide
            // glyph that spilled is not content; leave it out.
            let mut right = char_row.right;
            if char_row.wrap_forced {
                right = old_cols_total;
                if char_row.double_byte_padded {
                    right -= 1;
                }
            }

            for old_col in 0..right {
                let source = Point::new(old_col, old_row);
                let ch = self.text.char_at(source);
                let dbcs = self.text.dbcs_at(source);
                let (attr, _applies) = self
                    .text
                    .row_by_offset(old_row)
                    .attr_row
                    .find_attr_index(old_col);

                if source == old_cursor {
                    new_cursor = staged.cursor().position();
                    found_cursor = true;
                }

                staged.insert_character(ch, dbcs, attr)?;
            }

            if right < old_cols_total && !char_row.wrap_forced {
                // Hard line break. If the cursor sits on the break column it
                // belongs to this line, not the next.
                if old_cursor.x == right && old_cursor.y == old_row {
                    new_cursor = staged.cursor().position();
                    found_cursor = true;
                }
                // On the final line the cursor stays where printing ended so
                // the offset walk below lines up.
                if old_row < old_rows_total - 1 {
                    staged.newline_cursor()?;
                }
            }
        }

        staged.copy_properties(&self.text);

        if found_cursor {
            staged.cursor_mut().set_position(new_cursor);
        } else {
            // The cursor floated past the last character: re-home it by the
            // old newline/column offsets.
            let mut newlines = old_cursor.y - old_last.y;
            let increments = old_cursor.x - old_last.x;
            let new_last = staged.last_non_space_character();

            if staged.row_by_offset(new_last.y).char_row.wrap_forced {
                // The implicit wrap already advanced the cursor one row.
                newlines = (newlines - 1).max(0);
            } else if self.text.row_by_offset(old_last.y).char_row.wrap_forced {
                // The old side wrapped where this one did not, so the old
                // column delta is one higher than it should be here.
                newlines = (newlines - 1).max(0);
            }

            for _ in 0..newlines {
                staged.newline_cursor()?;
            }
            for _ in 0..(increments - 1).max(0) {
                staged.increment_cursor()?;
            }
        }

        // Re-pin the cursor at its prior height within the viewport. The
        // shift must be bounded by the new dimensions: a grown buffer
        // admits rows the old one could not.
        self.buffer_size = new;
        let cursor_height_after = staged.cursor().position().y - self.viewport.rect().top;
        let height_diff = cursor_height_after - cursor_height_before;
        let _ = self
            .viewport
            .set_origin(true, Point::new(0, height_diff), new);

        // Swap buffers, carrying the cursor size across.
        let cursor_size = self.text.cursor().size();
        staged.cursor_mut().set_size(cursor_size);
        staged.cursor_mut().end_defer_drawing();
        self.text = staged;
        self.tabs.clamp_to_width(new.cols);
        self.clamp_viewport_to_buffer();

        tracing::debug!(?new, "reflow resize");
        Ok(())
    }

    /// Pull the viewport back inside the buffer after a reshape, keeping
    /// its size where possible.
    fn clamp_viewport_to_buffer(&mut self) {
        let buffer = self.buffer_size;
        let mut rect = self.viewport.rect();
        if rect.right >= buffer.cols {
            let shift = rect.right - (buffer.cols - 1);
            rect.left = (rect.left - shift).max(0);
            rect.right = buffer.cols - 1;
        }
        if rect.bottom >= buffer.rows {
            let shift = rect.bottom - (buffer.rows - 1);
            rect.top = (rect.top - shift).max(0);
            rect.bottom = buffer.rows - 1;
        }
        self.viewport.set_rect_raw(rect);
    }
}
