//! Capability traits for the window, renderer, and notification sinks.
//!
//! All of these are fire-and-forget from the core's perspective: their
//! failure is never propagated. A headless console simply installs none of
//! them.

use crate::buffer::FontInfo;
use crate::{CellSize, PixelRect, PixelSize, Point, Rect};

/// Accessibility signals raised through the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiaEvent {
    TextChanged,
    LayoutInvalidated,
}

/// Snapshot handed to the window when scroll bars must be redrawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollBarState {
    /// Viewport extent in characters (the bar "page" size).
    pub page: CellSize,
    /// Last scrollable position per axis (buffer extent minus one).
    pub maximum: Point,
    /// Current viewport origin.
    pub position: Point,
    /// Keep bars visible but disabled (alt buffers do this).
    pub disable_no_scroll: bool,
}

/// Pixel metrics and font notifications from the rendering layer.
pub trait Renderer {
    /// Current font cell size in pixels.
    fn font_size(&self) -> PixelSize;

    /// The desired font changed; the renderer picks the closest match.
    fn trigger_font_change(&mut self, dpi: u32, desired: FontInfo, current: FontInfo);
}

/// The hosting window. Only consulted for the active buffer.
pub trait Window {
    fn min_client_rect_in_pixels(&self) -> PixelRect;
    fn max_client_rect_in_pixels(&self) -> PixelRect;

    /// The viewport origin moved; reposition scroll thumbs and repaint.
    fn viewport_origin_changed(&mut self, viewport: Rect);

    /// Queue a scroll-bar refresh; the window calls back into
    /// [`crate::Console::internal_update_scroll_bars`] on its own thread.
    fn post_update_scroll_bars(&mut self);

    /// Deliver freshly computed scroll-bar geometry.
    fn update_scroll_bar_state(&mut self, state: ScrollBarState);

    fn send_notify_beep(&mut self) -> bool;

    fn post_update_window_size(&mut self) -> bool;

    fn signal_uia(&mut self, event: UiaEvent);
}

/// Console-level notification sinks outside the window.
pub trait ConsoleEvents {
    /// The buffer grid was re-dimensioned.
    fn screen_buffer_size_change(&mut self, size: CellSize) {
        let _ = size;
    }

    /// The mouse-input translator should switch alt/main encoding.
    fn mouse_screen_mode(&mut self, alt: bool) {
        let _ = alt;
    }

    /// The command-line prompt region is being hidden or reprinted around a
    /// buffer reshape.
    fn command_line_visibility(&mut self, visible: bool) {
        let _ = visible;
    }

    /// Accessibility: a region of cells changed.
    fn region_updated(&mut self, region: Rect) {
        let _ = region;
    }

    /// Accessibility: a single cell changed.
    fn cell_updated(&mut self, position: Point, ch: char, attributes: u16) {
        let _ = (position, ch, attributes);
    }

    /// Accessibility: the overall layout changed.
    fn layout_changed(&mut self) {}
}

/// IME composition-string surface; resized alongside the buffer.
pub trait ImeComposition {
    /// Returns false when the composition buffer could not be resized.
    fn resize(&mut self, size: CellSize) -> bool;
}

/// Events sink that drops everything. The default for headless use.
#[derive(Debug, Default)]
pub struct NoopEvents;

impl ConsoleEvents for NoopEvents {}
