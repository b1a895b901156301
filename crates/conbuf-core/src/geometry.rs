//! Pure pixel↔character geometry.
//!
//! Free functions only: the math never touches buffer state, so callers can
//! run it speculatively (the window-resize pipeline runs it twice to settle
//! scroll-bar visibility).

use crate::{CellSize, Error, PixelSize, Result};

/// Pixel thickness of the horizontal and vertical scroll bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollBarPixels {
    /// Height consumed by the horizontal bar.
    pub horizontal: i32,
    /// Width consumed by the vertical bar.
    pub vertical: i32,
}

impl ScrollBarPixels {
    #[must_use]
    pub const fn new(horizontal: i32, vertical: i32) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }
}

/// Whether scroll bars will be needed to show `buffer` inside `client`.
///
/// Showing one bar consumes client space and may in turn require the other;
/// the check runs in whichever order triggers first (horizontal, then
/// vertical, mirrored when only vertical overflows).
#[must_use]
pub fn scrollbar_visibility(
    client: PixelSize,
    buffer: CellSize,
    font: PixelSize,
    bars: ScrollBarPixels,
) -> (bool, bool) {
    debug_assert!(buffer.cols > 0 && buffer.rows > 0);
    debug_assert!(font.width > 0 && font.height > 0);

    let buffer_px = PixelSize::new(
        i32::from(buffer.cols) * font.width,
        i32::from(buffer.rows) * font.height,
    );

    let mut horizontal = false;
    let mut vertical = false;
    let mut client = client;

    if buffer_px.width > client.width {
        horizontal = true;
        client.height -= bars.horizontal;
        if buffer_px.height > client.height {
            vertical = true;
        }
    } else if buffer_px.height > client.height {
        vertical = true;
        client.width -= bars.vertical;
        if buffer_px.width > client.width {
            horizontal = true;
        }
    }

    (horizontal, vertical)
}

/// How many characters fit in `client` once scroll bars for `buffer` are
/// reserved.
///
/// Returns [`Error::InvalidState`] when either font dimension is zero.
pub fn client_area_in_chars(
    client: PixelSize,
    buffer: CellSize,
    font: PixelSize,
    bars: ScrollBarPixels,
) -> Result<CellSize> {
    if font.width == 0 || font.height == 0 {
        return Err(Error::InvalidState);
    }

    let (horizontal, vertical) = scrollbar_visibility(client, buffer, font, bars);

    let mut client = client;
    if horizontal {
        client.height -= bars.horizontal;
    }
    if vertical {
        client.width -= bars.vertical;
    }

    Ok(CellSize::new(
        (client.width / font.width) as i16,
        (client.height / font.height) as i16,
    ))
}

/// How many character cells each scroll bar's thickness covers, rounded up.
#[must_use]
pub fn scrollbar_sizes_in_chars(font: PixelSize, bars: ScrollBarPixels) -> CellSize {
    let ceil_div = |px: i32, font_px: i32| -> i16 {
        ((px / font_px) + i32::from(px % font_px != 0)) as i16
    };
    CellSize::new(
        ceil_div(bars.vertical, font.width),
        ceil_div(bars.horizontal, font.height),
    )
}

/// How many whole characters fit in `client` with no bar reservation.
///
/// Used for the min/max window-size clamps, where the window layer already
/// accounts for chrome.
#[must_use]
pub fn window_size_in_chars(client: PixelSize, font: PixelSize) -> CellSize {
    let font = PixelSize::new(font.width.max(1), font.height.max(1));
    CellSize::new(
        (client.width / font.width) as i16,
        (client.height / font.height) as i16,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const FONT: PixelSize = PixelSize::new(8, 16);
    const BARS: ScrollBarPixels = ScrollBarPixels::new(17, 17);

    #[test]
    fn no_bars_when_buffer_fits() {
        let (h, v) = scrollbar_visibility(
            PixelSize::new(800, 600),
            CellSize::new(80, 25),
            FONT,
            BARS,
        );
        assert!(!h);
        assert!(!v);
    }

    #[test]
    fn horizontal_overflow_can_force_vertical() {
        // 100 cols * 8px = 800 > 400 wide; reserving the bar leaves
        // 600 - 17 = 583px of height against 30 * 16 = 480px, so no
        // vertical bar.
        let (h, v) = scrollbar_visibility(
            PixelSize::new(400, 600),
            CellSize::new(100, 30),
            FONT,
            BARS,
        );
        assert!(h);
        assert!(!v);

        // Shrink the client height so the reservation tips it over.
        let (h, v) = scrollbar_visibility(
            PixelSize::new(400, 490),
            CellSize::new(100, 30),
            FONT,
            BARS,
        );
        assert!(h);
        assert!(v);
    }

    #[test]
    fn vertical_overflow_can_force_horizontal() {
        // Buffer taller than the client; the vertical bar eats width and
        // pushes the horizontal over.
        let (h, v) = scrollbar_visibility(
            PixelSize::new(805, 400),
            CellSize::new(100, 30),
            FONT,
            BARS,
        );
        assert!(v);
        assert!(h);
    }

    #[test]
    fn client_area_subtracts_visible_bars() {
        let chars = client_area_in_chars(
            PixelSize::new(400, 600),
            CellSize::new(100, 30),
            FONT,
            BARS,
        )
        .unwrap();
        // Horizontal bar visible: (600 - 17) / 16 = 36 rows, 400 / 8 = 50 cols.
        assert_eq!(chars, CellSize::new(50, 36));
    }

    #[test]
    fn zero_font_is_invalid_state() {
        let err = client_area_in_chars(
            PixelSize::new(400, 600),
            CellSize::new(100, 30),
            PixelSize::new(0, 16),
            BARS,
        )
        .unwrap_err();
        assert_eq!(err, Error::InvalidState);
    }

    #[test]
    fn geometry_converges_under_wrap() {
        // Deciding a new width from pass one and re-running the math with
        // that width must not flip bar visibility again.
        let client = PixelSize::new(400, 600);
        let old_buffer = CellSize::new(100, 30);
        let pass1 = client_area_in_chars(client, old_buffer, FONT, BARS).unwrap();
        let new_buffer = CellSize::new(pass1.cols, old_buffer.rows);
        let bars1 = scrollbar_visibility(client, new_buffer, FONT, BARS);
        let pass2 = client_area_in_chars(client, new_buffer, FONT, BARS).unwrap();
        let settled = CellSize::new(pass2.cols, new_buffer.rows);
        let bars2 = scrollbar_visibility(client, settled, FONT, BARS);
        assert_eq!(bars1, bars2);
    }

    #[test]
    fn bar_sizes_round_up_to_cells() {
        assert_eq!(scrollbar_sizes_in_chars(FONT, BARS), CellSize::new(3, 2));
        assert_eq!(
            scrollbar_sizes_in_chars(PixelSize::new(17, 17), BARS),
            CellSize::new(1, 1)
        );
    }

    #[test]
    fn window_size_guards_zero_font() {
        assert_eq!(
            window_size_in_chars(PixelSize::new(640, 400), PixelSize::new(0, 0)),
            CellSize::new(640, 400)
        );
    }
}
