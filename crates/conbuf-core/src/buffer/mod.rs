//! Circular-row text storage.
//!
//! ## Design
//!
//! Cell text and double-byte markers live in flat arenas sized
//! `cols * rows`; row metadata lives in a parallel array. Scrolling rotates
//! a first-row index instead of moving memory:
//! `physical(logical_y) = (first_row + logical_y) % rows`.
//!
//! The arena slot for a physical row never changes between resizes, so the
//! slot index doubles as the row's storage identity.

mod cursor;
mod row;

pub use cursor::Cursor;
pub use row::{AttrRow, AttrRun, CharRow, DbcsAttr, Row};

use crate::attr::{CharInfo, TextAttribute};
use crate::{CellSize, Error, PixelSize, Point, Result};

/// Font metrics the buffer carries for pixel math and renderer handoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontInfo {
    pub size: PixelSize,
}

impl FontInfo {
    #[must_use]
    pub const fn new(size: PixelSize) -> Self {
        Self { size }
    }
}

/// The backing character grid and its cursor.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    size: CellSize,
    chars: Vec<char>,
    dbcs: Vec<DbcsAttr>,
    rows: Vec<Row>,
    first_row: i16,
    cursor: Cursor,
    fill: CharInfo,
    current_font: FontInfo,
    desired_font: FontInfo,
}

impl TextBuffer {
    /// Allocate a buffer of `size` cells painted with `fill`.
    ///
    /// All storage is reserved up front; failure returns [`Error::NoMemory`]
    /// with nothing allocated.
    pub fn new(
        font: FontInfo,
        size: CellSize,
        fill: CharInfo,
        cursor_size: u32,
    ) -> Result<Self> {
        let area = size.area();

        let mut chars = Vec::new();
        chars.try_reserve_exact(area).map_err(|_| Error::NoMemory)?;
        chars.resize(area, fill.ch);

        let mut dbcs = Vec::new();
        dbcs.try_reserve_exact(area).map_err(|_| Error::NoMemory)?;
        dbcs.resize(area, DbcsAttr::empty());

        let row_count = size.rows.max(0) as usize;
        let mut rows = Vec::new();
        rows.try_reserve_exact(row_count)
            .map_err(|_| Error::NoMemory)?;
        let fill_attr = TextAttribute::from_legacy(fill.attributes);
        for id in 0..size.rows.max(0) {
            rows.push(Row::new(size.cols, fill_attr, id));
        }

        Ok(Self {
            size,
            chars,
            dbcs,
            rows,
            first_row: 0,
            cursor: Cursor::new(cursor_size),
            fill,
            current_font: font,
            desired_font: font,
        })
    }

    #[must_use]
    pub fn size(&self) -> CellSize {
        self.size
    }

    /// Record the buffer dimensions. Storage is managed by the resize
    /// algorithms; this only updates the bookkeeping.
    pub fn set_size(&mut self, size: CellSize) {
        self.size = size;
    }

    #[must_use]
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    #[must_use]
    pub fn first_row_index(&self) -> i16 {
        self.first_row
    }

    pub fn set_first_row_index(&mut self, first_row: i16) {
        self.first_row = first_row;
    }

    /// Physical storage slot of the row at logical offset `y`.
    #[must_use]
    pub fn row_index(&self, y: i16) -> usize {
        ((self.first_row + y) % self.size.rows) as usize
    }

    /// Row metadata at logical offset `y` from the top of the buffer.
    #[must_use]
    pub fn row_by_offset(&self, y: i16) -> &Row {
        let index = self.row_index(y);
        &self.rows[index]
    }

    pub fn row_by_offset_mut(&mut self, y: i16) -> &mut Row {
        let index = self.row_index(y);
        &mut self.rows[index]
    }

    /// Characters of the row at logical offset `y`.
    #[must_use]
    pub fn row_chars(&self, y: i16) -> &[char] {
        let slot = self.row_index(y);
        let width = self.size.cols as usize;
        &self.chars[slot * width..(slot + 1) * width]
    }

    /// Double-byte markers of the row at logical offset `y`.
    #[must_use]
    pub fn row_dbcs(&self, y: i16) -> &[DbcsAttr] {
        let slot = self.row_index(y);
        let width = self.size.cols as usize;
        &self.dbcs[slot * width..(slot + 1) * width]
    }

    #[must_use]
    pub fn char_at(&self, position: Point) -> char {
        self.row_chars(position.y)[position.x as usize]
    }

    #[must_use]
    pub fn dbcs_at(&self, position: Point) -> DbcsAttr {
        self.row_dbcs(position.y)[position.x as usize]
    }

    fn cell_index(&self, position: Point) -> usize {
        self.row_index(position.y) * self.size.cols as usize + position.x as usize
    }

    /// Write one character at the cursor and advance it, wrapping at the
    /// right edge (marking the row soft-wrapped) and rotating the buffer
    /// when the cursor runs off the bottom.
    ///
    /// The lead half of a double-width glyph never lands in the last
    /// column: a fill cell pads it out, the row is marked double-byte
    /// padded, and the glyph starts the next row.
    pub fn insert_character(
        &mut self,
        ch: char,
        dbcs: DbcsAttr,
        attr: TextAttribute,
    ) -> Result<()> {
        let position = self.cursor.position();
        if dbcs.contains(DbcsAttr::LEADING) && position.x == self.size.cols - 1 {
            let index = self.cell_index(position);
            self.chars[index] = self.fill.ch;
            self.dbcs[index] = DbcsAttr::empty();
            {
                let row = self.row_by_offset_mut(position.y);
                row.char_row.double_byte_padded = true;
                row.attr_row.set_attr_at(position.x, attr)?;
            }
            self.increment_cursor()?;
            return self.insert_character(ch, dbcs, attr);
        }

        let index = self.cell_index(position);
        self.chars[index] = ch;
        self.dbcs[index] = dbcs;

        let row = self.row_by_offset_mut(position.y);
        if ch != ' ' {
            row.char_row.measure(position.x);
        }
        row.attr_row.set_attr_at(position.x, attr)?;

        self.increment_cursor()
    }

    /// Advance the cursor one cell. At the last column the row is marked
    /// soft-wrapped and the cursor wraps to the next row.
    pub fn increment_cursor(&mut self) -> Result<()> {
        let final_column = self.size.cols - 1;
        let mut position = self.cursor.position();
        if position.x >= final_column {
            self.row_by_offset_mut(position.y).char_row.wrap_forced = true;
            self.newline_cursor()
        } else {
            position.x += 1;
            self.cursor.set_position(position);
            Ok(())
        }
    }

    /// Move the cursor to the start of the next row, rotating the circular
    /// buffer when it is already on the last row.
    pub fn newline_cursor(&mut self) -> Result<()> {
        let final_row = self.size.rows - 1;
        let mut position = self.cursor.position();
        position.x = 0;
        if position.y >= final_row {
            self.increment_circular_buffer()?;
        } else {
            position.y += 1;
        }
        self.cursor.set_position(position);
        Ok(())
    }

    /// Rotate the ring: the oldest row is recycled as the fresh bottom row.
    pub fn increment_circular_buffer(&mut self) -> Result<()> {
        let width = self.size.cols;
        let slot = self.first_row as usize;
        let start = slot * width as usize;
        let fill = self.fill;
        for cell in &mut self.chars[start..start + width as usize] {
            *cell = fill.ch;
        }
        for marker in &mut self.dbcs[start..start + width as usize] {
            *marker = DbcsAttr::empty();
        }
        let fill_attr = TextAttribute::from_legacy(fill.attributes);
        let row = &mut self.rows[slot];
        row.char_row.reset(width);
        row.attr_row.initialize(width, fill_attr)?;

        self.first_row = (self.first_row + 1) % self.size.rows;
        Ok(())
    }

    /// Position of the bottom-most right-most non-space character.
    ///
    /// `x` is -1 when the buffer holds no text at all; callers doing offset
    /// math rely on that.
    #[must_use]
    pub fn last_non_space_character(&self) -> Point {
        let mut y = self.size.rows - 1;
        while y > 0 && self.row_by_offset(y).char_row.right == 0 {
            y -= 1;
        }
        let x = self.row_by_offset(y).char_row.right - 1;
        Point::new(x, y)
    }

    /// Adopt display-facing properties from another buffer (font, cursor
    /// appearance). Grid contents are untouched.
    pub fn copy_properties(&mut self, other: &TextBuffer) {
        self.current_font = other.current_font;
        self.cursor.copy_properties(&other.cursor);
    }

    #[must_use]
    pub fn fill(&self) -> CharInfo {
        self.fill
    }

    pub fn set_fill(&mut self, fill: CharInfo) {
        self.fill = fill;
    }

    #[must_use]
    pub fn fill_attribute(&self) -> TextAttribute {
        TextAttribute::from_legacy(self.fill.attributes)
    }

    #[must_use]
    pub fn current_font(&self) -> FontInfo {
        self.current_font
    }

    #[must_use]
    pub fn desired_font(&self) -> FontInfo {
        self.desired_font
    }

    pub fn set_desired_font(&mut self, font: FontInfo) {
        self.desired_font = font;
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    /// The flat character arena, in physical slot order.
    pub(crate) fn raw_chars(&self) -> &[char] {
        &self.chars
    }

    /// The flat double-byte-marker arena, in physical slot order.
    pub(crate) fn raw_dbcs(&self) -> &[DbcsAttr] {
        &self.dbcs
    }

    /// Swap in freshly staged storage. Used by the traditional resize after
    /// every allocation has succeeded.
    pub(crate) fn install_storage(
        &mut self,
        chars: Vec<char>,
        dbcs: Vec<DbcsAttr>,
        rows: Vec<Row>,
        size: CellSize,
        first_row: i16,
    ) {
        self.chars = chars;
        self.dbcs = dbcs;
        self.rows = rows;
        self.size = size;
        self.first_row = first_row;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FONT: FontInfo = FontInfo::new(PixelSize::new(8, 16));

    fn buffer(cols: i16, rows: i16) -> TextBuffer {
        TextBuffer::new(FONT, CellSize::new(cols, rows), CharInfo::space(0x07), 25).unwrap()
    }

    fn attr(word: u16) -> TextAttribute {
        TextAttribute::from_legacy(word)
    }

    #[test]
    fn new_buffer_is_blank() {
        let buf = buffer(10, 4);
        assert_eq!(buf.size(), CellSize::new(10, 4));
        assert_eq!(buf.row_chars(0), &[' '; 10]);
        assert_eq!(buf.row_by_offset(0).char_row.right, 0);
        assert_eq!(buf.cursor().position(), Point::ORIGIN);
    }

    #[test]
    fn insert_advances_cursor_and_measures() {
        let mut buf = buffer(10, 4);
        for ch in "abc".chars() {
            buf.insert_character(ch, DbcsAttr::empty(), attr(0x07)).unwrap();
        }
        assert_eq!(buf.cursor().position(), Point::new(3, 0));
        assert_eq!(buf.char_at(Point::new(1, 0)), 'b');
        let row = buf.row_by_offset(0);
        assert_eq!(row.char_row.left, 0);
        assert_eq!(row.char_row.right, 3);
        assert!(!row.char_row.wrap_forced);
    }

    #[test]
    fn insert_at_right_edge_wraps_and_marks_row() {
        let mut buf = buffer(4, 3);
        for ch in "wxyz".chars() {
            buf.insert_character(ch, DbcsAttr::empty(), attr(0x07)).unwrap();
        }
        assert!(buf.row_by_offset(0).char_row.wrap_forced);
        assert_eq!(buf.cursor().position(), Point::new(0, 1));
    }

    #[test]
    fn newline_on_last_row_rotates_ring() {
        let mut buf = buffer(4, 2);
        buf.insert_character('a', DbcsAttr::empty(), attr(0x07)).unwrap();
        buf.cursor_mut().set_position(Point::new(0, 1));
        buf.insert_character('b', DbcsAttr::empty(), attr(0x07)).unwrap();
        buf.cursor_mut().set_position(Point::new(0, 1));

        buf.newline_cursor().unwrap();
        // Row "a" scrolled off; row "b" is now logical row 0.
        assert_eq!(buf.first_row_index(), 1);
        assert_eq!(buf.char_at(Point::new(0, 0)), 'b');
        assert_eq!(buf.row_chars(1), &[' '; 4]);
        assert_eq!(buf.cursor().position(), Point::new(0, 1));
    }

    #[test]
    fn last_non_space_walks_up_blank_rows() {
        let mut buf = buffer(8, 4);
        for ch in "hi".chars() {
            buf.insert_character(ch, DbcsAttr::empty(), attr(0x07)).unwrap();
        }
        buf.cursor_mut().set_position(Point::new(0, 1));
        for ch in "there".chars() {
            buf.insert_character(ch, DbcsAttr::empty(), attr(0x07)).unwrap();
        }
        assert_eq!(buf.last_non_space_character(), Point::new(4, 1));
    }

    #[test]
    fn last_non_space_of_empty_buffer_is_minus_one() {
        let buf = buffer(8, 4);
        assert_eq!(buf.last_non_space_character(), Point::new(-1, 0));
    }

    #[test]
    fn trailing_spaces_do_not_extend_measurement() {
        let mut buf = buffer(8, 2);
        buf.insert_character('x', DbcsAttr::empty(), attr(0x07)).unwrap();
        buf.insert_character(' ', DbcsAttr::empty(), attr(0x07)).unwrap();
        buf.insert_character(' ', DbcsAttr::empty(), attr(0x07)).unwrap();
        assert_eq!(buf.row_by_offset(0).char_row.right, 1);
    }

    #[test]
    fn wide_glyph_never_splits_across_the_edge() {
        let mut buf = buffer(4, 3);
        for ch in "abc".chars() {
            buf.insert_character(ch, DbcsAttr::empty(), attr(0x07)).unwrap();
        }
        buf.insert_character('字', DbcsAttr::LEADING, attr(0x07)).unwrap();
        buf.insert_character('字', DbcsAttr::TRAILING, attr(0x07)).unwrap();

        let row0 = buf.row_by_offset(0).char_row;
        assert!(row0.wrap_forced);
        assert!(row0.double_byte_padded);
        // The last cell of row 0 is the pad, and the glyph opens row 1.
        assert_eq!(buf.char_at(Point::new(3, 0)), ' ');
        assert_eq!(buf.char_at(Point::new(0, 1)), '字');
        assert_eq!(buf.dbcs_at(Point::new(0, 1)), DbcsAttr::LEADING);
        assert_eq!(buf.dbcs_at(Point::new(1, 1)), DbcsAttr::TRAILING);
        assert_eq!(buf.cursor().position(), Point::new(2, 1));
    }

    #[test]
    fn row_offset_respects_first_row_rotation() {
        let mut buf = buffer(4, 3);
        buf.set_first_row_index(2);
        assert_eq!(buf.row_index(0), 2);
        assert_eq!(buf.row_index(1), 0);
        assert_eq!(buf.row_index(2), 1);
    }
}
