//! UiFrame: a thin wrapper around `ratatui::Frame` that clamps drawing to the
//! visible area.
//!
//! Document elements carry signed coordinates and routinely extend past the
//! terminal edges (scrolled rows, panels pushed against the viewport).
//! Writing out of bounds into the underlying `Buffer` panics, so every draw
//! call made while painting the document goes through `UiFrame`, which
//! clips it to the frame area first.
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;

use crate::layout::FloatRect;

pub struct UiFrame<'a> {
    area: Rect,
    buffer: &'a mut Buffer,
}

impl<'a> UiFrame<'a> {
    pub fn new(frame: &'a mut Frame<'_>) -> Self {
        let area = frame.area();
        let buffer = frame.buffer_mut();
        Self { area, buffer }
    }

    /// Paint into an offscreen buffer.
    pub fn from_parts(area: Rect, buffer: &'a mut Buffer) -> Self {
        Self { area, buffer }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn buffer_mut(&mut self) -> &mut Buffer {
        self.buffer
    }

    fn clip_rect(&self, rect: Rect) -> Option<Rect> {
        let clipped = rect.intersection(self.area);
        if clipped.width == 0 || clipped.height == 0 {
            None
        } else {
            Some(clipped)
        }
    }

    /// The on-screen part of a signed rectangle, if any.
    pub fn visible(&self, rect: FloatRect) -> Option<Rect> {
        rect.intersection(&FloatRect::from(self.area))?.to_rect()
    }

    pub fn render_widget<W>(&mut self, widget: W, area: Rect)
    where
        W: Widget,
    {
        if let Some(clipped) = self.clip_rect(area) {
            widget.render(clipped, self.buffer);
        }
    }

    /// Write `text` starting at a signed cell position, keeping only the
    /// characters that land inside `clip`. Leading characters left of the
    /// clip are dropped rather than shifting the rest.
    pub fn put_str(&mut self, x: i32, y: i32, text: &str, clip: Rect, style: Style) {
        let Some(clip) = self.clip_rect(clip) else {
            return;
        };
        let Ok(y) = u16::try_from(y) else {
            return;
        };
        let left = i32::from(clip.x);
        let skip = usize::try_from(left - x).unwrap_or(0);
        let Ok(start) = u16::try_from(x.max(left)) else {
            return;
        };
        let text: String = text.chars().skip(skip).collect();
        safe_set_string(self.buffer, clip, start, y, &text, style);
    }
}

fn safe_set_string(buffer: &mut Buffer, bounds: Rect, x: u16, y: u16, text: &str, style: Style) {
    let max_x = bounds.x.saturating_add(bounds.width);
    let max_y = bounds.y.saturating_add(bounds.height);
    if x < bounds.x || x >= max_x || y < bounds.y || y >= max_y {
        return;
    }
    let available = max_x.saturating_sub(x);
    let text = truncate_to_width(text, available as usize);
    buffer.set_string(x, y, text, style);
}

pub fn truncate_to_width(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    value.chars().take(width).collect()
}
