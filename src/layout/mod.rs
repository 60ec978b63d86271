pub mod placement;

pub use placement::*;

use ratatui::prelude::Rect;

use crate::document::{Document, ElementId};

/// Signed rectangle origin with unsigned size, in document cells.
///
/// Floating panels may be trial-placed partly off screen before clamping, so
/// the origin has to be able to go negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FloatRect {
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
}

impl FloatRect {
    pub const fn new(x: i32, y: i32, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn left(&self) -> i32 {
        self.x
    }

    pub const fn top(&self) -> i32 {
        self.y
    }

    pub const fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub const fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub const fn translate(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            width: self.width,
            height: self.height,
        }
    }

    /// Overlapping region of two rectangles, or `None` when they only touch
    /// or are disjoint.
    pub fn intersection(&self, other: &FloatRect) -> Option<FloatRect> {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            return None;
        }
        Some(FloatRect {
            x: left,
            y: top,
            width: (right - left).min(u16::MAX as i32) as u16,
            height: (bottom - top).min(u16::MAX as i32) as u16,
        })
    }

    /// Clip to the unsigned terminal space. Returns `None` when nothing of the
    /// rectangle lands on non-negative coordinates.
    pub fn to_rect(&self) -> Option<Rect> {
        let bounds = FloatRect::new(0, 0, u16::MAX, u16::MAX);
        let clipped = self.intersection(&bounds)?;
        Some(Rect {
            x: clipped.x as u16,
            y: clipped.y as u16,
            width: clipped.width,
            height: clipped.height,
        })
    }
}

impl From<Rect> for FloatRect {
    fn from(rect: Rect) -> Self {
        Self {
            x: rect.x as i32,
            y: rect.y as i32,
            width: rect.width,
            height: rect.height,
        }
    }
}

/// Total area covered by `rect` inside each of `others`, summed per rectangle.
pub fn overlap_area(rect: &FloatRect, others: &[FloatRect]) -> i64 {
    others
        .iter()
        .map(|other| {
            let dx = 0.max(rect.right().min(other.right()) - rect.left().max(other.left()));
            let dy = 0.max(rect.bottom().min(other.bottom()) - rect.top().max(other.top()));
            dx as i64 * dy as i64
        })
        .sum()
}

pub fn rect_contains(rect: FloatRect, column: i32, row: i32) -> bool {
    if rect.is_empty() {
        return false;
    }
    column >= rect.left() && column < rect.right() && row >= rect.top() && row < rect.bottom()
}

/// Visible window onto the document, sized in cells, plus the document
/// scroll offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
    pub scroll_x: i32,
    pub scroll_y: i32,
}

impl Viewport {
    pub const fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            scroll_x: 0,
            scroll_y: 0,
        }
    }

    pub const fn with_scroll(mut self, scroll_x: i32, scroll_y: i32) -> Self {
        self.scroll_x = scroll_x;
        self.scroll_y = scroll_y;
        self
    }

    /// The viewport expressed in document coordinates.
    pub const fn bounds(&self) -> FloatRect {
        FloatRect::new(self.scroll_x, self.scroll_y, self.width, self.height)
    }
}

impl From<Rect> for Viewport {
    fn from(area: Rect) -> Self {
        Self::new(area.width, area.height)
    }
}

/// Width reserved on the right of menu rows that open a nested panel.
const SUBMENU_ARROW_WIDTH: u16 = 2;

/// Size a menu-like element to fit its rows and stack the children one row
/// each inside a one-cell border, starting at the element's current origin.
///
/// Children with an explicit non-zero height keep it; everything else gets a
/// single row. The element grows to the widest label.
pub fn arrange_rows(doc: &mut Document, parent: ElementId) {
    let children: Vec<ElementId> = doc.children(parent).to_vec();
    let mut inner_width: u16 = 0;
    let mut inner_height: u16 = 0;
    for child in &children {
        let Some(element) = doc.get(*child) else {
            continue;
        };
        let mut width = element.label().chars().count() as u16;
        if element.has_class(crate::constants::TRIGGER_CLASS) {
            width = width.saturating_add(SUBMENU_ARROW_WIDTH);
        }
        inner_width = inner_width.max(width.max(element.bounds().width));
        inner_height = inner_height.saturating_add(element.bounds().height.max(1));
    }

    let origin = doc.bounds(parent).unwrap_or_default();
    let width = origin.width.max(inner_width.saturating_add(2));
    let height = origin.height.max(inner_height.saturating_add(2));
    doc.set_bounds(parent, FloatRect::new(origin.x, origin.y, width, height));

    let mut row = origin.y + 1;
    for child in children {
        let rows = doc
            .bounds(child)
            .map(|b| b.height.max(1))
            .unwrap_or(1);
        doc.place_subtree(
            child,
            FloatRect::new(origin.x + 1, row, width.saturating_sub(2), rows),
        );
        row += rows as i32;
    }
}
