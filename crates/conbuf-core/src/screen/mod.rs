//! The screen buffer: backing grid, viewport, attributes, tabs, margins,
//! and one half of a main/alternate pair.

mod resize;

use crate::attr::{CharInfo, TextAttribute};
use crate::buffer::{FontInfo, TextBuffer};
use crate::console::ScreenBufferId;
use crate::pipeline::PipelineCustody;
use crate::tabs::TabStops;
use crate::viewport::Viewport;
use crate::{CellSize, Error, PixelRect, PixelSize, Point, Rect, Result, COLOR_TABLE_SIZE};

bitflags::bitflags! {
    /// Output-processing mode bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OutputMode: u32 {
        const PROCESSED_OUTPUT = 0x0001;
        const WRAP_AT_EOL = 0x0002;
        const VIRTUAL_TERMINAL_PROCESSING = 0x0004;
    }
}

/// A window resize that arrived while the alternate buffer was active,
/// parked on the main for replay when the pair flips back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedResize {
    pub client_new: PixelRect,
    pub client_old: PixelRect,
}

/// Which side of a main/alternate pair this buffer is.
#[derive(Debug)]
pub enum AltLink {
    Main {
        alt: Option<ScreenBufferId>,
        saved_resize: Option<SavedResize>,
    },
    Alt {
        main: ScreenBufferId,
    },
}

/// Snapshot returned by the classic get-information call.
#[derive(Debug, Clone, Copy)]
pub struct ScreenBufferInfo {
    pub size: CellSize,
    pub cursor_position: Point,
    pub viewport: Rect,
    pub attributes: u16,
    pub popup_attributes: u16,
    pub color_table: [u32; COLOR_TABLE_SIZE],
    pub maximum_window_size: CellSize,
}

/// Aggregate root: owns the text buffer, viewport, fill attributes, tab
/// stops, scroll margins, and (on a main) the output pipeline.
#[derive(Debug)]
pub struct ScreenBuffer {
    id: ScreenBufferId,
    text: TextBuffer,
    viewport: Viewport,
    buffer_size: CellSize,
    attributes: TextAttribute,
    popup_attributes: TextAttribute,
    output_mode: OutputMode,
    scroll_margins: Rect,
    tabs: TabStops,
    pub(crate) custody: PipelineCustody,
    pub(crate) alt_link: AltLink,
    pub(crate) resizing_depth: u32,
}

impl ScreenBuffer {
    /// Build a buffer with its viewport anchored at the origin at
    /// `window_size` and a backing grid of `buffer_size`.
    ///
    /// The caller supplies the pipeline custody (mains own one, alts borrow).
    pub(crate) fn new(
        id: ScreenBufferId,
        window_size: CellSize,
        font: FontInfo,
        buffer_size: CellSize,
        fill: CharInfo,
        popup_fill: CharInfo,
        cursor_size: u32,
        vt_processing: bool,
        custody: PipelineCustody,
    ) -> Result<Self> {
        let buffer_size = Self::clamp_buffer_size(buffer_size);
        let text = TextBuffer::new(font, buffer_size, fill, cursor_size)?;

        let mut output_mode = OutputMode::PROCESSED_OUTPUT | OutputMode::WRAP_AT_EOL;
        if vt_processing {
            output_mode |= OutputMode::VIRTUAL_TERMINAL_PROCESSING;
        }

        Ok(Self {
            id,
            text,
            viewport: Viewport::new(Rect::new(
                0,
                0,
                window_size.cols - 1,
                window_size.rows - 1,
            )),
            buffer_size,
            attributes: TextAttribute::from_legacy(fill.attributes),
            popup_attributes: TextAttribute::from_legacy(popup_fill.attributes),
            output_mode,
            scroll_margins: Rect::default(),
            tabs: TabStops::new(),
            custody,
            alt_link: AltLink::Main {
                alt: None,
                saved_resize: None,
            },
            resizing_depth: 0,
        })
    }

    fn clamp_buffer_size(size: CellSize) -> CellSize {
        CellSize::new(size.cols.max(1), size.rows.max(1))
    }

    #[must_use]
    pub fn id(&self) -> ScreenBufferId {
        self.id
    }

    #[must_use]
    pub fn buffer_size(&self) -> CellSize {
        self.buffer_size
    }

    /// Record new grid dimensions (clamped to at least 1x1).
    pub fn set_buffer_size(&mut self, size: CellSize) {
        self.buffer_size = Self::clamp_buffer_size(size);
    }

    #[must_use]
    pub fn text(&self) -> &TextBuffer {
        &self.text
    }

    pub fn text_mut(&mut self) -> &mut TextBuffer {
        &mut self.text
    }

    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[must_use]
    pub fn window_size_x(&self) -> i16 {
        self.viewport.width()
    }

    #[must_use]
    pub fn window_size_y(&self) -> i16 {
        self.viewport.height()
    }

    /// Pixel footprint the viewport needs at the given font.
    #[must_use]
    pub fn required_size_in_pixels(&self, font: PixelSize) -> PixelSize {
        PixelSize::new(
            i32::from(self.window_size_x()) * font.width,
            i32::from(self.window_size_y()) * font.height,
        )
    }

    /// Whether this is the alternate half of a pair.
    #[must_use]
    pub fn is_alt(&self) -> bool {
        matches!(self.alt_link, AltLink::Alt { .. })
    }

    /// The row of the last meaningful character (text or cursor), used to
    /// keep the prompt visible while the viewport collapses.
    #[must_use]
    pub fn valid_end_y(&self) -> i16 {
        let last = self.text.last_non_space_character();
        last.y.max(self.text.cursor().position().y)
    }

    // ── Viewport operations ─────────────────────────────────────────────

    /// Resize the viewport as if dragged from the bottom-right corner.
    pub fn set_viewport_size(&mut self, size: CellSize) {
        let valid_end = self.valid_end_y();
        self.viewport
            .resize_to(size, false, false, self.buffer_size, valid_end);
    }

    /// Replace the viewport rectangle, correcting it to fit the buffer.
    /// The corrected value is passed back through `proposed`.
    pub fn set_viewport_rect(&mut self, proposed: &mut Rect) {
        self.viewport.set_rect(proposed, self.buffer_size);
    }

    /// Resize the viewport for a client-area change, absorbing each delta
    /// on the side the window was grabbed by (left/top only when that edge
    /// alone moved; bottom-right otherwise).
    pub fn adjust_viewport_size(
        &mut self,
        client_new: PixelRect,
        client_old: PixelRect,
        size: CellSize,
    ) {
        let from_left =
            client_new.left != client_old.left && client_new.right == client_old.right;
        let from_top =
            client_new.top != client_old.top && client_new.bottom == client_old.bottom;
        let valid_end = self.valid_end_y();
        self.viewport
            .resize_to(size, from_top, from_left, self.buffer_size, valid_end);
    }

    /// Move the viewport origin (absolute or relative), preserving size.
    /// Returns the applied rectangle, or `None` for the recognized no-ops.
    pub fn set_viewport_origin(&mut self, absolute: bool, origin: Point) -> Result<Option<Rect>> {
        self.viewport.set_origin(!absolute, origin, self.buffer_size)
    }

    /// How far the viewport must shift so `position` is inside it.
    #[must_use]
    pub fn cursor_visibility_shift(&self, position: Point) -> Point {
        let rect = self.viewport.rect();
        let x = if position.x > rect.right {
            position.x - rect.right
        } else if position.x < rect.left {
            position.x - rect.left
        } else {
            0
        };
        let y = if position.y > rect.bottom {
            position.y - rect.bottom
        } else if position.y < rect.top {
            position.y - rect.top
        } else {
            0
        };
        Point::new(x, y)
    }

    // ── Attributes and modes ────────────────────────────────────────────

    #[must_use]
    pub fn attributes(&self) -> TextAttribute {
        self.attributes
    }

    /// Set the default attributes, propagating them into the text buffer's
    /// fill so freshly revealed cells take the new colors.
    pub fn set_attributes(&mut self, attributes: TextAttribute) {
        self.attributes.set_from(attributes);
        let mut fill = self.text.fill();
        fill.attributes = self.attributes.legacy_attributes();
        self.text.set_fill(fill);
    }

    #[must_use]
    pub fn popup_attributes(&self) -> TextAttribute {
        self.popup_attributes
    }

    pub fn set_popup_attributes(&mut self, attributes: TextAttribute) {
        self.popup_attributes = attributes;
    }

    #[must_use]
    pub fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    pub fn set_output_mode(&mut self, mode: OutputMode) {
        self.output_mode = mode;
    }

    // ── Scroll margins ──────────────────────────────────────────────────

    #[must_use]
    pub fn scroll_margins(&self) -> Rect {
        self.scroll_margins
    }

    pub fn set_scroll_margins(&mut self, margins: Rect) {
        self.scroll_margins = margins;
    }

    // ── Tab stops ───────────────────────────────────────────────────────

    pub fn add_tab_stop(&mut self, column: i16) -> Result<()> {
        self.tabs.add(column)
    }

    pub fn clear_tab_stops(&mut self) {
        self.tabs.clear();
    }

    pub fn clear_tab_stop(&mut self, column: i16) {
        self.tabs.clear_at(column);
    }

    #[must_use]
    pub fn are_tabs_set(&self) -> bool {
        self.tabs.any()
    }

    #[must_use]
    pub fn forward_tab(&self, position: Point) -> Point {
        self.tabs.forward_tab(position, self.buffer_size.cols)
    }

    #[must_use]
    pub fn reverse_tab(&self, position: Point) -> Point {
        self.tabs.reverse_tab(position)
    }

    #[must_use]
    pub fn tab_stops(&self) -> &TabStops {
        &self.tabs
    }

    // ── Cursor ──────────────────────────────────────────────────────────

    pub fn set_cursor_information(&mut self, size: u32, visible: bool) {
        let cursor = self.text.cursor_mut();
        cursor.set_size(size);
        cursor.set_is_visible(visible);
    }

    /// Flag the cursor as indicating insert/overtype mode.
    pub fn set_cursor_db_mode(&mut self, double: bool) {
        let cursor = self.text.cursor_mut();
        if cursor.is_double() != double {
            cursor.set_is_double(double);
        }
    }

    /// Move the cursor, rejecting positions outside the backing buffer.
    ///
    /// When the console has focus, `turn_on` restarts the blink cycle
    /// immediately; otherwise the next blink is delayed.
    pub fn set_cursor_position(
        &mut self,
        position: Point,
        turn_on: bool,
        focused: bool,
    ) -> Result<()> {
        if position.x < 0
            || position.y < 0
            || position.x >= self.buffer_size.cols
            || position.y >= self.buffer_size.rows
        {
            return Err(Error::InvalidParameter);
        }

        let cursor = self.text.cursor_mut();
        cursor.set_position(position);

        if focused {
            if turn_on {
                cursor.set_delay(false);
                cursor.set_is_on(true);
            } else {
                cursor.set_delay(true);
            }
            cursor.set_has_moved(true);
        }

        Ok(())
    }

    // ── Edges and clipping ──────────────────────────────────────────────

    /// The inclusive final positions of the buffer in each direction.
    #[must_use]
    pub fn screen_edges(&self) -> Rect {
        Rect::new(0, 0, self.buffer_size.cols - 1, self.buffer_size.rows - 1)
    }

    /// Trim a rectangle to the buffer edges.
    pub fn clip_to_screen_buffer(&self, clip: &mut Rect) {
        let edges = self.screen_edges();
        clip.left = clip.left.max(edges.left);
        clip.top = clip.top.max(edges.top);
        clip.right = clip.right.min(edges.right);
        clip.bottom = clip.bottom.min(edges.bottom);
    }

    /// Clamp a point into the buffer.
    pub fn clip_point_to_screen_buffer(&self, clip: &mut Point) {
        let edges = self.screen_edges();
        clip.x = clip.x.clamp(edges.left, edges.right);
        clip.y = clip.y.clamp(edges.top, edges.bottom);
    }

    // ── Alt-link bookkeeping ────────────────────────────────────────────

    pub(crate) fn take_saved_resize(&mut self) -> Option<SavedResize> {
        match &mut self.alt_link {
            AltLink::Main { saved_resize, .. } => saved_resize.take(),
            AltLink::Alt { .. } => None,
        }
    }

    pub(crate) fn set_saved_resize(&mut self, resize: SavedResize) {
        if let AltLink::Main { saved_resize, .. } = &mut self.alt_link {
            *saved_resize = Some(resize);
        }
    }
}
