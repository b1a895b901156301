//! Recording host doubles shared by the integration tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use conbuf_core::buffer::FontInfo;
use conbuf_core::host::{
    ConsoleEvents, ImeComposition, Renderer, ScrollBarState, UiaEvent, Window,
};
use conbuf_core::{CellSize, PixelRect, PixelSize, Point, Rect};

#[derive(Debug, Default)]
pub struct WindowLog {
    pub scroll_bar_posts: usize,
    pub bar_states: Vec<ScrollBarState>,
    pub origin_changes: Vec<Rect>,
    pub uia_signals: Vec<UiaEvent>,
    pub beeps: usize,
    pub size_posts: usize,
}

pub struct TestWindow {
    pub log: Rc<RefCell<WindowLog>>,
    pub min_client: PixelRect,
    pub max_client: PixelRect,
}

impl TestWindow {
    pub fn new(log: Rc<RefCell<WindowLog>>) -> Self {
        Self {
            log,
            min_client: PixelRect::new(0, 0, 120, 64),
            max_client: PixelRect::new(0, 0, 1920, 1080),
        }
    }
}

impl Window for TestWindow {
    fn min_client_rect_in_pixels(&self) -> PixelRect {
        self.min_client
    }

    fn max_client_rect_in_pixels(&self) -> PixelRect {
        self.max_client
    }

    fn viewport_origin_changed(&mut self, viewport: Rect) {
        self.log.borrow_mut().origin_changes.push(viewport);
    }

    fn post_update_scroll_bars(&mut self) {
        self.log.borrow_mut().scroll_bar_posts += 1;
    }

    fn update_scroll_bar_state(&mut self, state: ScrollBarState) {
        self.log.borrow_mut().bar_states.push(state);
    }

    fn send_notify_beep(&mut self) -> bool {
        self.log.borrow_mut().beeps += 1;
        true
    }

    fn post_update_window_size(&mut self) -> bool {
        self.log.borrow_mut().size_posts += 1;
        true
    }

    fn signal_uia(&mut self, event: UiaEvent) {
        self.log.borrow_mut().uia_signals.push(event);
    }
}

#[derive(Debug, Default)]
pub struct EventLog {
    pub size_changes: Vec<CellSize>,
    pub mouse_modes: Vec<bool>,
    pub command_line: Vec<bool>,
    pub regions: Vec<Rect>,
    pub cells: Vec<(Point, char, u16)>,
    pub layouts: usize,
}

pub struct TestEvents {
    pub log: Rc<RefCell<EventLog>>,
}

impl ConsoleEvents for TestEvents {
    fn screen_buffer_size_change(&mut self, size: CellSize) {
        self.log.borrow_mut().size_changes.push(size);
    }

    fn mouse_screen_mode(&mut self, alt: bool) {
        self.log.borrow_mut().mouse_modes.push(alt);
    }

    fn command_line_visibility(&mut self, visible: bool) {
        self.log.borrow_mut().command_line.push(visible);
    }

    fn region_updated(&mut self, region: Rect) {
        self.log.borrow_mut().regions.push(region);
    }

    fn cell_updated(&mut self, position: Point, ch: char, attributes: u16) {
        self.log.borrow_mut().cells.push((position, ch, attributes));
    }

    fn layout_changed(&mut self) {
        self.log.borrow_mut().layouts += 1;
    }
}

pub struct FixedFontRenderer(pub PixelSize);

impl Renderer for FixedFontRenderer {
    fn font_size(&self) -> PixelSize {
        self.0
    }

    fn trigger_font_change(&mut self, _dpi: u32, _desired: FontInfo, _current: FontInfo) {}
}

pub struct FailingIme;

impl ImeComposition for FailingIme {
    fn resize(&mut self, _size: CellSize) -> bool {
        false
    }
}
