//! The console: registry of live screen buffers and the cross-buffer
//! operations (activation, alt-buffer switching, window-driven resize).
//!
//! Everything here runs under one lock ([`SharedConsole`]); no operation
//! suspends and none re-enter except the window-resize path, which guards
//! itself with the per-buffer resizing depth counter.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::attr::{CharInfo, TextAttribute};
use crate::buffer::FontInfo;
use crate::geometry::{self, ScrollBarPixels};
use crate::host::{ConsoleEvents, ImeComposition, NoopEvents, Renderer, ScrollBarState, UiaEvent, Window};
use crate::pipeline::{OutputPipeline, PipelineCustody, PipelineId};
use crate::screen::{AltLink, SavedResize, ScreenBuffer, ScreenBufferInfo};
use crate::{
    CellSize, Error, PixelRect, PixelSize, Point, Rect, Result, COLOR_TABLE_SIZE,
    CURSOR_SMALL_SIZE,
};

/// Identity of a registered screen buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScreenBufferId(pub u32);

/// The console under its global lock: the only supported way to share it
/// across threads. Window-thread messages re-enter through this.
pub type SharedConsole = Arc<Mutex<Console>>;

/// Owner of every live screen buffer plus the display-wide state they read.
pub struct Console {
    buffers: FxHashMap<ScreenBufferId, ScreenBuffer>,
    /// Registration order, newest first. The head becomes active when the
    /// active buffer is destroyed.
    order: Vec<ScreenBufferId>,
    active: Option<ScreenBufferId>,
    next_buffer_id: u32,
    next_pipeline_id: u64,

    wrap_text: bool,
    vt_level: u32,
    focused: bool,
    updating_scroll_bars: bool,
    color_table: [u32; COLOR_TABLE_SIZE],
    scroll_bars: ScrollBarPixels,
    dpi: u32,
    selection: Option<Rect>,

    renderer: Option<Box<dyn Renderer>>,
    window: Option<Box<dyn Window>>,
    events: Box<dyn ConsoleEvents>,
    ime: Option<Box<dyn ImeComposition>>,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffers: FxHashMap::default(),
            order: Vec::new(),
            active: None,
            next_buffer_id: 1,
            next_pipeline_id: 1,
            wrap_text: true,
            vt_level: 0,
            focused: false,
            updating_scroll_bars: false,
            color_table: [0; COLOR_TABLE_SIZE],
            scroll_bars: ScrollBarPixels::new(17, 17),
            dpi: 96,
            selection: None,
            renderer: None,
            window: None,
            events: Box::new(NoopEvents),
            ime: None,
        }
    }

    /// Wrap the console in its lock for cross-thread use.
    #[must_use]
    pub fn into_shared(self) -> SharedConsole {
        Arc::new(Mutex::new(self))
    }

    // ── Global state ────────────────────────────────────────────────────

    pub fn set_renderer(&mut self, renderer: Box<dyn Renderer>) {
        self.renderer = Some(renderer);
    }

    pub fn set_window(&mut self, window: Box<dyn Window>) {
        self.window = Some(window);
    }

    pub fn set_events(&mut self, events: Box<dyn ConsoleEvents>) {
        self.events = events;
    }

    pub fn set_ime(&mut self, ime: Box<dyn ImeComposition>) {
        self.ime = Some(ime);
    }

    #[must_use]
    pub fn wrap_text(&self) -> bool {
        self.wrap_text
    }

    pub fn set_wrap_text(&mut self, wrap: bool) {
        self.wrap_text = wrap;
    }

    #[must_use]
    pub fn vt_level(&self) -> u32 {
        self.vt_level
    }

    pub fn set_vt_level(&mut self, level: u32) {
        self.vt_level = level;
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn set_scroll_bar_pixels(&mut self, bars: ScrollBarPixels) {
        self.scroll_bars = bars;
    }

    pub fn set_dpi(&mut self, dpi: u32) {
        self.dpi = dpi;
    }

    #[must_use]
    pub fn color_table(&self) -> &[u32; COLOR_TABLE_SIZE] {
        &self.color_table
    }

    pub fn set_color_table(&mut self, table: [u32; COLOR_TABLE_SIZE]) {
        self.color_table = table;
    }

    #[must_use]
    pub fn selection(&self) -> Option<Rect> {
        self.selection
    }

    pub fn set_selection(&mut self, selection: Option<Rect>) {
        self.selection = selection;
    }

    /// Font cell size in pixels: the renderer's, clamped so scale math
    /// never divides by zero; 1x1 when running headless.
    #[must_use]
    pub fn screen_font_size(&self) -> PixelSize {
        let size = self
            .renderer
            .as_ref()
            .map_or(PixelSize::new(1, 1), |r| r.font_size());
        PixelSize::new(size.width.max(1), size.height.max(1))
    }

    /// How many character cells each scroll bar's thickness covers.
    #[must_use]
    pub fn scroll_bar_sizes_in_chars(&self) -> CellSize {
        geometry::scrollbar_sizes_in_chars(self.screen_font_size(), self.scroll_bars)
    }

    // ── Registry ────────────────────────────────────────────────────────

    /// Create a screen buffer and register it. The first buffer created
    /// becomes active.
    pub fn create_screen_buffer(
        &mut self,
        window_size: CellSize,
        font: FontInfo,
        buffer_size: CellSize,
        fill: CharInfo,
        popup_fill: CharInfo,
        cursor_size: u32,
    ) -> Result<ScreenBufferId> {
        let id = ScreenBufferId(self.next_buffer_id);
        let pipeline = OutputPipeline::new(
            PipelineId(self.next_pipeline_id),
            id,
            TextAttribute::from_legacy(fill.attributes),
        )?;
        let buffer = ScreenBuffer::new(
            id,
            window_size,
            font,
            buffer_size,
            fill,
            popup_fill,
            cursor_size,
            self.vt_level != 0,
            PipelineCustody::OwnedHere(pipeline),
        )?;

        self.next_buffer_id += 1;
        self.next_pipeline_id += 1;
        self.order.insert(0, id);
        self.buffers.insert(id, buffer);
        if self.active.is_none() {
            self.active = Some(id);
        }
        Ok(id)
    }

    /// Unregister and destroy a buffer.
    ///
    /// A main takes its alternate down first. Destroying an alternate hands
    /// the pipeline endpoints back to its main before the alt is dropped,
    /// so the main is never left writing into a dead buffer.
    pub fn remove_screen_buffer(&mut self, id: ScreenBufferId) {
        let (child_alt, parent_main) = match self.buffers.get(&id) {
            Some(buffer) => match &buffer.alt_link {
                AltLink::Main { alt, .. } => (*alt, None),
                AltLink::Alt { main } => (None, Some(*main)),
            },
            None => return,
        };

        if let Some(alt) = child_alt {
            self.remove_screen_buffer(alt);
        }
        if let Some(main) = parent_main {
            if let Some(main_buffer) = self.buffers.get_mut(&main) {
                if let Some(pipeline) = main_buffer.custody.owned_mut() {
                    pipeline.retarget(main);
                }
                if let AltLink::Main { alt, .. } = &mut main_buffer.alt_link {
                    if *alt == Some(id) {
                        *alt = None;
                    }
                }
            }
        }

        self.order.retain(|&b| b != id);
        self.buffers.remove(&id);
        if self.active == Some(id) {
            self.active = self.order.first().copied();
        }
    }

    #[must_use]
    pub fn buffer(&self, id: ScreenBufferId) -> Option<&ScreenBuffer> {
        self.buffers.get(&id)
    }

    pub fn buffer_mut(&mut self, id: ScreenBufferId) -> Option<&mut ScreenBuffer> {
        self.buffers.get_mut(&id)
    }

    #[must_use]
    pub fn active_buffer_id(&self) -> Option<ScreenBufferId> {
        self.active
    }

    pub fn set_active_screen_buffer(&mut self, id: ScreenBufferId) {
        if self.buffers.contains_key(&id) {
            self.active = Some(id);
        }
    }

    #[must_use]
    pub fn is_active(&self, id: ScreenBufferId) -> bool {
        self.active == Some(id)
    }

    /// The buffer a reader or writer of `id` should actually touch: the
    /// alternate when one is attached, otherwise `id` itself.
    #[must_use]
    pub fn active_buffer_of(&self, id: ScreenBufferId) -> ScreenBufferId {
        match self.buffers.get(&id).map(|b| &b.alt_link) {
            Some(AltLink::Main { alt: Some(alt), .. }) => *alt,
            _ => id,
        }
    }

    /// The main half of `id`'s pair (itself when it is a main).
    #[must_use]
    pub fn main_buffer_of(&self, id: ScreenBufferId) -> ScreenBufferId {
        match self.buffers.get(&id).map(|b| &b.alt_link) {
            Some(AltLink::Alt { main }) => *main,
            _ => id,
        }
    }

    fn main_of_alt(&self, id: ScreenBufferId) -> Option<ScreenBufferId> {
        match self.buffers.get(&id).map(|b| &b.alt_link) {
            Some(AltLink::Alt { main }) => Some(*main),
            _ => None,
        }
    }

    /// The pipeline observed from `id`, following custody: an alt resolves
    /// to the group physically held by its main.
    #[must_use]
    pub fn pipeline_of(&self, id: ScreenBufferId) -> Option<&OutputPipeline> {
        let buffer = self.buffers.get(&id)?;
        match &buffer.custody {
            PipelineCustody::OwnedHere(pipeline) => Some(pipeline),
            PipelineCustody::BorrowedFromMain => {
                let main = self.main_of_alt(id)?;
                self.buffers.get(&main)?.custody.owned()
            }
        }
    }

    // ── Alt-buffer switching ────────────────────────────────────────────

    /// Create a fresh alternate for `id`'s pair and make it active.
    ///
    /// The new buffer is viewport-sized on both axes, shares the main's
    /// font and fill, and borrows the main's output pipeline; its own
    /// pipeline is released unused. A previous alternate is destroyed.
    pub fn use_alternate_screen_buffer(
        &mut self,
        id: ScreenBufferId,
    ) -> Result<ScreenBufferId> {
        let main_id = self.main_buffer_of(id);

        // A resize that happened while an old alt was active replays on the
        // main before the new alt is measured from its viewport.
        if let Some(saved) = self
            .buffers
            .get_mut(&main_id)
            .ok_or(Error::InvalidParameter)?
            .take_saved_resize()
        {
            self.process_resize_window(main_id, saved.client_new, saved.client_old)?;
        }

        let (window_size, font, fill) = {
            let main = self.buffers.get(&main_id).ok_or(Error::InvalidParameter)?;
            (
                main.viewport().size(),
                main.text().current_font(),
                CharInfo::space(main.attributes().legacy_attributes()),
            )
        };

        let alt_id = self.create_screen_buffer(
            window_size,
            font,
            window_size,
            fill,
            fill,
            CURSOR_SMALL_SIZE,
        )?;

        // The alt's own pipeline is never used; custody of the main's group
        // is what it operates through.
        {
            let alt = self.buffers.get_mut(&alt_id).expect("alt just created");
            alt.custody = PipelineCustody::BorrowedFromMain;
            alt.alt_link = AltLink::Alt { main: main_id };
        }

        let old_alt = {
            let main = self.buffers.get_mut(&main_id).expect("main is live");
            match &mut main.alt_link {
                AltLink::Main { alt, .. } => alt.replace(alt_id),
                AltLink::Alt { .. } => unreachable!("main_buffer_of returned an alt"),
            }
        };
        // Tearing the old alt down re-aims the pipeline at the main, so the
        // redirect to the new alt must come after.
        if let Some(old) = old_alt {
            self.remove_screen_buffer(old);
        }
        if let Some(pipeline) = self
            .buffers
            .get_mut(&main_id)
            .expect("main is live")
            .custody
            .owned_mut()
        {
            pipeline.retarget(alt_id);
        }

        self.active = Some(alt_id);

        let size = self.buffers[&alt_id].buffer_size();
        self.events.screen_buffer_size_change(size);
        self.events.mouse_screen_mode(true);
        tracing::debug!(?alt_id, ?main_id, "switched to alternate buffer");
        Ok(alt_id)
    }

    /// Restore the pair's main buffer and destroy the alternate. No-op when
    /// `id` already names a main.
    pub fn use_main_screen_buffer(&mut self, id: ScreenBufferId) -> Result<()> {
        let Some(main_id) = self.main_of_alt(id) else {
            return Ok(());
        };

        if let Some(saved) = self
            .buffers
            .get_mut(&main_id)
            .ok_or(Error::InvalidParameter)?
            .take_saved_resize()
        {
            self.process_resize_window(main_id, saved.client_new, saved.client_old)?;
        }

        self.active = Some(main_id);
        // The alt ran with scroll bars disabled; bring them back.
        self.update_scroll_bars(main_id);

        let size = self.buffers[&main_id].buffer_size();
        self.events.screen_buffer_size_change(size);

        // Removal hands the pipeline back to the main.
        self.remove_screen_buffer(id);
        self.events.mouse_screen_mode(false);
        tracing::debug!(?main_id, "switched to main buffer");
        Ok(())
    }

    // ── Window-driven resize ────────────────────────────────────────────

    /// React to the window client area changing size.
    ///
    /// Reshapes the backing buffer where the mode calls for it, fits the
    /// viewport to the new client area (absorbing deltas on the grabbed
    /// edge), and posts a scroll-bar update.
    pub fn process_resize_window(
        &mut self,
        id: ScreenBufferId,
        client_new: PixelRect,
        client_old: PixelRect,
    ) -> Result<()> {
        // An alt resize must also reach the main once the pair flips back;
        // park it there. Main -> alt -> alt keeps the latest.
        if let Some(main_id) = self.main_of_alt(id) {
            if let Some(main) = self.buffers.get_mut(&main_id) {
                main.set_saved_resize(SavedResize {
                    client_new,
                    client_old,
                });
            }
        }

        self.adjust_screen_buffer(id, client_new)?;

        let viewport_size = self.calculate_viewport_size(id, client_new)?;

        {
            let buffer = self.buffers.get_mut(&id).ok_or(Error::InvalidParameter)?;
            buffer.resizing_depth += 1;
            buffer.adjust_viewport_size(client_new, client_old, viewport_size);
            buffer.resizing_depth -= 1;

            let rect = buffer.viewport().rect();
            debug_assert!(rect.top >= 0);
            debug_assert!(rect.top <= rect.bottom);
            debug_assert!(rect.left <= rect.right);
        }

        self.update_scroll_bars(id);
        Ok(())
    }

    /// Grow or re-fit the backing buffer for a new client area.
    ///
    /// Under wrap-text the buffer width locks to the window width (with a
    /// second geometry pass to settle scroll-bar visibility); an alt buffer
    /// snaps to the window on both axes; otherwise the buffer only grows.
    fn adjust_screen_buffer(&mut self, id: ScreenBufferId, client_new: PixelRect) -> Result<()> {
        let font = self.screen_font_size();
        let bars = self.scroll_bars;
        let client = client_new.size();

        let is_alt = self
            .buffers
            .get(&id)
            .ok_or(Error::InvalidParameter)?
            .is_alt();
        // Bar visibility tracks the main's size even when the alt resizes.
        let buffer_old = {
            let measured = self.main_buffer_of(id);
            self.buffers[&measured].buffer_size()
        };

        let chars = geometry::client_area_in_chars(client, buffer_old, font, bars)?;
        let chars = CellSize::new(chars.cols.max(1), chars.rows.max(1));

        let mut buffer_new = buffer_old;
        if self.wrap_text {
            buffer_new.cols = chars.cols;
        }

        // The width may have moved under the bars; settle visibility again.
        let chars = geometry::client_area_in_chars(client, buffer_new, font, bars)?;
        let chars = CellSize::new(chars.cols.max(1), chars.rows.max(1));

        if is_alt {
            // Exactly the window, never more: an alt that grew then shrank
            // must not leave scroll bars behind.
            buffer_new = chars;
        } else {
            if chars.cols > buffer_new.cols {
                buffer_new.cols = chars.cols;
            }
            if chars.rows > buffer_new.rows {
                buffer_new.rows = chars.rows;
            }
        }

        if buffer_new != buffer_old {
            self.events.command_line_visibility(false);
            if let Some(buffer) = self.buffers.get_mut(&id) {
                buffer.text_mut().cursor_mut().set_is_visible(false);
            }
            self.resize_screen_buffer(id, buffer_new, false)?;
            self.events.command_line_visibility(true);
            if let Some(buffer) = self.buffers.get_mut(&id) {
                buffer.text_mut().cursor_mut().set_is_visible(true);
            }
        }

        Ok(())
    }

    /// Viewport dimensions that consume the client area, net of bars.
    fn calculate_viewport_size(
        &self,
        id: ScreenBufferId,
        client: PixelRect,
    ) -> Result<CellSize> {
        let buffer = self.buffers.get(&id).ok_or(Error::InvalidParameter)?;
        let chars = geometry::client_area_in_chars(
            client.size(),
            buffer.buffer_size(),
            self.screen_font_size(),
            self.scroll_bars,
        )?;
        Ok(CellSize::new(chars.cols.max(1), chars.rows.max(1)))
    }

    /// Re-dimension `id`'s backing buffer, reflowing or reshaping per the
    /// wrap-text setting.
    pub fn resize_screen_buffer(
        &mut self,
        id: ScreenBufferId,
        new_size: CellSize,
        update_bars: bool,
    ) -> Result<()> {
        // Selection coordinates do not survive a reshape.
        self.selection = None;

        let wrap = self.wrap_text;
        let size = {
            let buffer = self.buffers.get_mut(&id).ok_or(Error::InvalidParameter)?;
            let clamped = CellSize::new(new_size.cols.max(1), new_size.rows.max(1));
            if wrap {
                buffer.resize_with_reflow(clamped)?;
            } else {
                buffer.resize_traditional(clamped)?;
            }
            buffer.set_buffer_size(clamped);
            buffer.buffer_size()
        };

        self.reset_text_flags(id, Rect::new(0, 0, size.cols - 1, size.rows - 1));

        if let Some(ime) = &mut self.ime {
            if !ime.resize(size) {
                return Err(Error::InvalidHandle);
            }
        }

        if self.is_active(id) {
            self.events.layout_changed();
        }
        if update_bars {
            self.update_scroll_bars(id);
        }
        self.events.screen_buffer_size_change(size);
        Ok(())
    }

    // ── Viewport and cursor, console-level ──────────────────────────────

    /// Move `id`'s viewport origin. When the buffer is active the window is
    /// told so it can reposition thumbs and repaint.
    pub fn set_viewport_origin(
        &mut self,
        id: ScreenBufferId,
        absolute: bool,
        origin: Point,
    ) -> Result<()> {
        let is_active = self.is_active(id);
        let moved = {
            let buffer = self.buffers.get_mut(&id).ok_or(Error::InvalidParameter)?;
            buffer.set_viewport_origin(absolute, origin)?
        };
        if let Some(rect) = moved {
            if is_active {
                if let Some(window) = &mut self.window {
                    window.viewport_origin_changed(rect);
                }
            }
        }
        Ok(())
    }

    /// Shift the viewport the minimum distance that brings the cursor into
    /// view.
    pub fn make_cursor_visible(&mut self, id: ScreenBufferId) {
        let Some(buffer) = self.buffers.get(&id) else {
            return;
        };
        let shift = buffer.cursor_visibility_shift(buffer.text().cursor().position());
        if shift != Point::ORIGIN {
            let _ = self.set_viewport_origin(id, false, shift);
        }
    }

    /// Move the cursor with bounds checking; focus controls blink restart.
    pub fn set_cursor_position(
        &mut self,
        id: ScreenBufferId,
        position: Point,
        turn_on: bool,
    ) -> Result<()> {
        let focused = self.focused;
        let buffer = self.buffers.get_mut(&id).ok_or(Error::InvalidParameter)?;
        buffer.set_cursor_position(position, turn_on, focused)
    }

    // ── Scroll bars ─────────────────────────────────────────────────────

    /// Queue a scroll-bar refresh for the active buffer. Collapses repeat
    /// requests until the window drains the post.
    pub fn update_scroll_bars(&mut self, id: ScreenBufferId) {
        if !self.is_active(id) {
            return;
        }
        if self.updating_scroll_bars {
            return;
        }
        self.updating_scroll_bars = true;
        if let Some(window) = &mut self.window {
            window.post_update_scroll_bars();
        }
    }

    /// The window-thread half of a scroll-bar refresh: recompute geometry
    /// and push it out. Re-entry from the window is damped by the buffer's
    /// resizing depth.
    pub fn internal_update_scroll_bars(&mut self, id: ScreenBufferId) {
        self.updating_scroll_bars = false;
        if !self.is_active(id) {
            return;
        }

        let state = {
            let Some(buffer) = self.buffers.get_mut(&id) else {
                return;
            };
            buffer.resizing_depth += 1;
            let rect = buffer.viewport().rect();
            ScrollBarState {
                page: buffer.viewport().size(),
                maximum: Point::new(
                    buffer.buffer_size().cols - 1,
                    buffer.buffer_size().rows - 1,
                ),
                position: Point::new(rect.left, rect.top),
                disable_no_scroll: buffer.is_alt(),
            }
        };

        if let Some(window) = &mut self.window {
            window.update_scroll_bar_state(state);
        }
        self.events.layout_changed();

        if let Some(buffer) = self.buffers.get_mut(&id) {
            buffer.resizing_depth -= 1;
        }
    }

    // ── Notifications and queries ───────────────────────────────────────

    /// Tell accessibility listeners a region of cells changed. A single
    /// cell reports its character and attribute inline.
    pub fn reset_text_flags(&mut self, id: ScreenBufferId, region: Rect) {
        if !self.is_active(id) {
            return;
        }
        let single_cell = region.left == region.right && region.top == region.bottom;
        if single_cell {
            let Some(buffer) = self.buffers.get(&id) else {
                return;
            };
            let position = Point::new(region.left, region.top);
            let ch = buffer.text().char_at(position);
            let (attr, _) = buffer
                .text()
                .row_by_offset(position.y)
                .attr_row
                .find_attr_index(position.x);
            self.events
                .cell_updated(position, ch, attr.legacy_attributes());
        } else {
            self.events.region_updated(region);
        }
        if let Some(window) = &mut self.window {
            window.signal_uia(UiaEvent::TextChanged);
        }
    }

    /// The classic get-information snapshot, color table included.
    pub fn screen_buffer_information(&self, id: ScreenBufferId) -> Result<ScreenBufferInfo> {
        let buffer = self.buffers.get(&id).ok_or(Error::InvalidParameter)?;
        Ok(ScreenBufferInfo {
            size: buffer.buffer_size(),
            cursor_position: buffer.text().cursor().position(),
            viewport: buffer.viewport().rect(),
            attributes: buffer.attributes().legacy_attributes(),
            popup_attributes: buffer.popup_attributes().legacy_attributes(),
            color_table: self.color_table,
            maximum_window_size: self.max_window_size_in_chars(id),
        })
    }

    /// Smallest character grid the window can shrink to.
    #[must_use]
    pub fn min_window_size_in_chars(&self) -> CellSize {
        let font = self.screen_font_size();
        match &self.window {
            Some(window) => geometry::window_size_in_chars(
                window.min_client_rect_in_pixels().size(),
                font,
            ),
            None => CellSize::new(1, 1),
        }
    }

    /// Largest character grid the monitor allows, unconstrained by buffer.
    #[must_use]
    pub fn largest_window_size_in_chars(&self, id: ScreenBufferId) -> CellSize {
        let font = self.screen_font_size();
        match &self.window {
            Some(window) => geometry::window_size_in_chars(
                window.max_client_rect_in_pixels().size(),
                font,
            ),
            None => self
                .buffers
                .get(&id)
                .map_or(CellSize::new(1, 1), |b| b.buffer_size()),
        }
    }

    /// Largest useful window: the monitor limit capped by the buffer.
    #[must_use]
    pub fn max_window_size_in_chars(&self, id: ScreenBufferId) -> CellSize {
        let largest = self.largest_window_size_in_chars(id);
        let buffer = self
            .buffers
            .get(&id)
            .map_or(largest, |b| b.buffer_size());
        CellSize::new(buffer.cols.min(largest.cols), buffer.rows.min(largest.rows))
    }

    /// Route a new desired font through the renderer when active.
    pub fn update_font(&mut self, id: ScreenBufferId, font: FontInfo) {
        let is_active = self.is_active(id);
        let fonts = {
            let Some(buffer) = self.buffers.get_mut(&id) else {
                return;
            };
            buffer.text_mut().set_desired_font(font);
            (buffer.text().desired_font(), buffer.text().current_font())
        };
        if is_active {
            if let Some(renderer) = &mut self.renderer {
                renderer.trigger_font_change(self.dpi, fonts.0, fonts.1);
            }
        }
    }

    /// Forward a beep to the window; only the active buffer is audible.
    pub fn send_notify_beep(&mut self, id: ScreenBufferId) -> bool {
        if !self.is_active(id) {
            return false;
        }
        self.window
            .as_mut()
            .is_some_and(|window| window.send_notify_beep())
    }

    /// Ask the window to re-derive its size from the buffer.
    pub fn post_update_window_size(&mut self, id: ScreenBufferId) -> bool {
        if !self.is_active(id) {
            return false;
        }
        self.window
            .as_mut()
            .is_some_and(|window| window.post_update_window_size())
    }
}
