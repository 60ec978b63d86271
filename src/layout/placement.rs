//! Placement of floating panels relative to their trigger.
//!
//! `calculate_position` is a pure function: everything it needs (trigger
//! bounds, panel size, viewport and the bounds of open ancestor panels) is
//! passed in, so identical inputs always produce the same placement.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{FloatRect, Viewport, overlap_area};
use crate::constants::PLACEMENT_MARGIN;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalMode {
    /// Panel extends to the right of its anchor edge.
    #[default]
    Right,
    /// Panel extends to the left of its anchor edge.
    Left,
    /// Panel is centered on the trigger.
    Center,
}

impl HorizontalMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            HorizontalMode::Right => "right",
            HorizontalMode::Left => "left",
            HorizontalMode::Center => "center",
        }
    }
}

impl fmt::Display for HorizontalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HorizontalMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "right" => Ok(HorizontalMode::Right),
            "left" => Ok(HorizontalMode::Left),
            "center" => Ok(HorizontalMode::Center),
            other => Err(format!("unknown horizontal mode `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalMode {
    #[default]
    Down,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelSize {
    pub width: u16,
    pub height: u16,
}

impl PanelSize {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementOptions {
    /// Pin the panel top to the trigger top for nested panels, so menu
    /// cascades line up with the row that opened them.
    pub align_to_trigger_top: bool,
    /// Distance kept from the viewport edges.
    pub margin: i32,
}

impl Default for PlacementOptions {
    fn default() -> Self {
        Self {
            align_to_trigger_top: false,
            margin: PLACEMENT_MARGIN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub top: i32,
    pub left: i32,
    pub horizontal: HorizontalMode,
    pub vertical: VerticalMode,
}

impl Placement {
    pub const fn rect(&self, size: PanelSize) -> FloatRect {
        FloatRect::new(self.left, self.top, size.width, size.height)
    }
}

/// Compute where a floating panel of `size` goes next to `trigger`.
///
/// `trigger` is viewport-relative; `ancestors` and the result are in
/// document coordinates (the viewport scroll offset is added). A non-empty
/// `ancestors` list marks the panel as nested: it cascades away from the
/// trigger and prefers whichever side covers the least of its ancestors.
pub fn calculate_position(
    trigger: FloatRect,
    size: PanelSize,
    preferred_horizontal: HorizontalMode,
    preferred_vertical: VerticalMode,
    ancestors: &[FloatRect],
    options: PlacementOptions,
    viewport: Viewport,
) -> Placement {
    let margin = options.margin;
    let width = size.width as i32;
    let height = size.height as i32;
    let viewport_width = viewport.width as i32;
    let viewport_height = viewport.height as i32;
    let nested = !ancestors.is_empty();

    let fits_right = trigger.left() + width <= viewport_width - margin;
    let fits_left = trigger.right() - width >= margin;

    let mut horizontal = match preferred_horizontal {
        HorizontalMode::Right if !fits_right && fits_left => HorizontalMode::Left,
        HorizontalMode::Left if !fits_left && fits_right => HorizontalMode::Right,
        mode => mode,
    };

    if nested {
        let trial_top = if options.align_to_trigger_top {
            trigger.top()
        } else {
            trigger.bottom()
        } + viewport.scroll_y;
        let mut min_overlap = i64::MAX;
        for (mode, fits) in [
            (HorizontalMode::Right, fits_right),
            (HorizontalMode::Left, fits_left),
        ] {
            if !fits {
                continue;
            }
            let trial_left = match mode {
                HorizontalMode::Right => trigger.right(),
                _ => trigger.left() - width,
            } + viewport.scroll_x;
            let trial = FloatRect::new(trial_left, trial_top, size.width, size.height);
            let overlap = overlap_area(&trial, ancestors);
            if overlap < min_overlap {
                min_overlap = overlap;
                horizontal = mode;
            }
        }
    }

    let fits_down = trigger.bottom() + height <= viewport_height - margin;
    let fits_up = trigger.top() - height >= margin;

    let vertical = match preferred_vertical {
        VerticalMode::Down if !fits_down && fits_up => VerticalMode::Up,
        VerticalMode::Up if !fits_up && fits_down => VerticalMode::Down,
        mode => mode,
    };

    let centered = trigger.left() + trigger.width as i32 / 2 - width / 2;
    let mut left = match (nested, horizontal) {
        (_, HorizontalMode::Center) => centered,
        (false, HorizontalMode::Right) => trigger.left(),
        (false, HorizontalMode::Left) => trigger.right() - width,
        (true, HorizontalMode::Right) => trigger.right(),
        (true, HorizontalMode::Left) => trigger.left() - width,
    } + viewport.scroll_x;

    let mut top = if nested && options.align_to_trigger_top {
        trigger.top()
    } else {
        match vertical {
            VerticalMode::Down => trigger.bottom(),
            VerticalMode::Up => trigger.top() - height,
        }
    } + viewport.scroll_y;

    // Hard safety net; the lower bound wins when the panel is larger than
    // the viewport.
    let min_left = viewport.scroll_x + margin;
    let min_top = viewport.scroll_y + margin;
    left = min_left.max(left.min(viewport.scroll_x + viewport_width - width - margin));
    top = min_top.max(top.min(viewport.scroll_y + viewport_height - height - margin));

    Placement {
        top,
        left,
        horizontal,
        vertical,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(100, 40)
    }

    fn place(
        trigger: FloatRect,
        size: PanelSize,
        mode: HorizontalMode,
        ancestors: &[FloatRect],
    ) -> Placement {
        calculate_position(
            trigger,
            size,
            mode,
            VerticalMode::Down,
            ancestors,
            PlacementOptions::default(),
            viewport(),
        )
    }

    #[test]
    fn root_panel_sits_flush_below_trigger() {
        let trigger = FloatRect::new(10, 5, 8, 1);
        let p = place(trigger, PanelSize::new(20, 6), HorizontalMode::Right, &[]);
        assert_eq!(p.horizontal, HorizontalMode::Right);
        assert_eq!(p.vertical, VerticalMode::Down);
        assert_eq!((p.left, p.top), (10, 6));
    }

    #[test]
    fn flips_left_at_right_edge() {
        let trigger = FloatRect::new(85, 5, 10, 1);
        let p = place(trigger, PanelSize::new(30, 6), HorizontalMode::Right, &[]);
        assert_eq!(p.horizontal, HorizontalMode::Left);
        // right edge of the panel lines up with the trigger's right edge
        assert_eq!(p.left, 95 - 30);
    }

    #[test]
    fn left_mode_flips_right_when_only_right_fits() {
        let trigger = FloatRect::new(5, 5, 6, 1);
        let p = place(trigger, PanelSize::new(20, 6), HorizontalMode::Left, &[]);
        assert_eq!(p.horizontal, HorizontalMode::Right);
        assert_eq!(p.left, 5);
    }

    #[test]
    fn clamps_when_neither_side_fits() {
        let trigger = FloatRect::new(40, 5, 10, 1);
        let size = PanelSize::new(95, 6);
        let p = place(trigger, size, HorizontalMode::Right, &[]);
        assert_eq!(p.horizontal, HorizontalMode::Right);
        // vw - w - margin = 1 is below the margin, so the margin wins
        assert_eq!(p.left, PLACEMENT_MARGIN);

        let size = PanelSize::new(80, 6);
        let p = place(trigger, size, HorizontalMode::Right, &[]);
        assert!(p.left >= PLACEMENT_MARGIN && p.left <= 100 - 80 - PLACEMENT_MARGIN);
        assert_eq!(p.left, 16);
    }

    #[test]
    fn center_mode_never_flips() {
        let trigger = FloatRect::new(40, 5, 10, 1);
        let p = place(trigger, PanelSize::new(20, 6), HorizontalMode::Center, &[]);
        assert_eq!(p.horizontal, HorizontalMode::Center);
        assert_eq!(p.left, 45 - 10);
    }

    #[test]
    fn flips_up_near_bottom() {
        let trigger = FloatRect::new(10, 34, 8, 1);
        let p = place(trigger, PanelSize::new(20, 10), HorizontalMode::Right, &[]);
        assert_eq!(p.vertical, VerticalMode::Up);
        assert_eq!(p.top, 24);
    }

    #[test]
    fn nested_prefers_side_without_ancestor_overlap() {
        // Ancestor panel covers the area to the right of the trigger.
        let trigger = FloatRect::new(40, 10, 10, 1);
        let ancestor = FloatRect::new(50, 0, 30, 30);
        let p = place(trigger, PanelSize::new(20, 5), HorizontalMode::Right, &[ancestor]);
        assert_eq!(p.horizontal, HorizontalMode::Left);
        assert_eq!(p.left, 40 - 20);
    }

    #[test]
    fn nested_tie_keeps_right_and_cascades_from_trigger_right_edge() {
        let trigger = FloatRect::new(20, 10, 10, 1);
        let far_away = FloatRect::new(0, 35, 2, 2);
        let p = place(trigger, PanelSize::new(15, 5), HorizontalMode::Right, &[far_away]);
        assert_eq!(p.horizontal, HorizontalMode::Right);
        assert_eq!(p.left, 30);
        assert_eq!(p.top, 11);
    }

    #[test]
    fn nested_align_to_trigger_top() {
        let trigger = FloatRect::new(20, 10, 10, 1);
        let ancestor = FloatRect::new(18, 8, 14, 6);
        let p = calculate_position(
            trigger,
            PanelSize::new(15, 5),
            HorizontalMode::Right,
            VerticalMode::Up,
            &[ancestor],
            PlacementOptions {
                align_to_trigger_top: true,
                ..PlacementOptions::default()
            },
            viewport(),
        );
        assert_eq!(p.top, 10);
    }

    #[test]
    fn scroll_offset_moves_result_into_document_space() {
        let trigger = FloatRect::new(10, 5, 8, 1);
        let p = calculate_position(
            trigger,
            PanelSize::new(20, 6),
            HorizontalMode::Right,
            VerticalMode::Down,
            &[],
            PlacementOptions::default(),
            viewport().with_scroll(0, 50),
        );
        assert_eq!((p.left, p.top), (10, 56));
    }

    #[test]
    fn horizontal_mode_parses_attribute_values() {
        assert_eq!("Left".parse::<HorizontalMode>(), Ok(HorizontalMode::Left));
        assert_eq!(" center ".parse::<HorizontalMode>(), Ok(HorizontalMode::Center));
        assert!("sideways".parse::<HorizontalMode>().is_err());
    }
}
