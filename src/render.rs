//! Paints a `Document` into a terminal buffer.
//!
//! Elements paint in document order, children after their parent, so the
//! portal (appended last under the root) lands above page content. Menus and
//! panels get a bordered box; rows pick their style from state classes.

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear};

use crate::constants::{
    ACTIVE_CLASS, DISABLED_CLASS, OPEN_CLASS, PANEL_CLASS, SELECT_ARROW_CLASS,
    SELECT_GROUP_LABEL_CLASS, SELECT_INPUT_CLASS, SELECT_MENU_CLASS, SELECT_PILL_CLASS,
    SELECTED_CLASS, TRIGGER_CLASS,
};
use crate::document::{Document, Element, ElementId};
use crate::layout::{FloatRect, Viewport};
use crate::theme;
use crate::ui::UiFrame;

const SUBMENU_ARROW: &str = "▸";

/// Paint every visible element of `doc` into `frame`.
pub fn paint(doc: &Document, frame: &mut UiFrame<'_>) {
    let viewport = doc.viewport();
    paint_node(doc, doc.root(), viewport.bounds(), false, frame);
}

fn paint_node(
    doc: &Document,
    id: ElementId,
    clip: FloatRect,
    in_menu: bool,
    frame: &mut UiFrame<'_>,
) {
    let Some(el) = doc.get(id) else {
        return;
    };
    if el.is_hidden() {
        return;
    }
    let viewport = doc.viewport();
    let bounds = el.bounds();
    let visible = bounds.intersection(&clip);
    let boxed = is_boxed(el);

    let on_screen =
        visible.and_then(|v| frame.visible(v.translate(-viewport.scroll_x, -viewport.scroll_y)));
    if let Some(visible) = on_screen {
        if boxed {
            frame.render_widget(Clear, visible);
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme::menu_border()))
                .style(Style::default().bg(theme::menu_bg()).fg(theme::menu_fg()));
            frame.render_widget(block, visible);
        } else {
            let style = element_style(el, in_menu);
            if style != Style::default() {
                frame.buffer_mut().set_style(visible, style);
            }
            paint_label(el, bounds, viewport, visible, frame);
            if in_menu && el.has_class(TRIGGER_CLASS) && bounds.width > 1 {
                let x = bounds.right() - 1 - viewport.scroll_x;
                let y = bounds.y - viewport.scroll_y;
                frame.put_str(x, y, SUBMENU_ARROW, visible, style);
            }
        }
    }

    let child_clip = if el.clips() {
        match clip.intersection(&bounds) {
            Some(c) => c,
            None => return,
        }
    } else {
        clip
    };
    let child_in_menu = in_menu || boxed;
    for child in el.children() {
        paint_node(doc, *child, child_clip, child_in_menu, frame);
    }
}

fn is_boxed(el: &Element) -> bool {
    el.has_class(PANEL_CLASS) || el.has_class(SELECT_MENU_CLASS)
}

fn element_style(el: &Element, in_menu: bool) -> Style {
    if el.has_class(DISABLED_CLASS) {
        return theme::disabled_style();
    }
    if el.has_class(ACTIVE_CLASS) || (in_menu && el.has_class(OPEN_CLASS)) {
        return Style::default()
            .bg(theme::menu_active_bg())
            .fg(theme::menu_active_fg());
    }
    if el.has_class(OPEN_CLASS) {
        return Style::default()
            .bg(theme::trigger_open_bg())
            .fg(theme::trigger_open_fg());
    }
    if el.has_class(SELECTED_CLASS) {
        return Style::default()
            .bg(theme::select_selected_bg())
            .fg(theme::select_selected_fg());
    }
    if el.has_class(SELECT_GROUP_LABEL_CLASS) {
        return theme::group_label_style();
    }
    if el.has_class(SELECT_PILL_CLASS) {
        return Style::default().bg(theme::pill_bg()).fg(theme::pill_fg());
    }
    if el.has_class(SELECT_INPUT_CLASS) {
        return Style::default()
            .bg(theme::select_input_bg())
            .fg(theme::select_input_fg());
    }
    if el.has_class(SELECT_ARROW_CLASS) {
        return Style::default().fg(theme::accent());
    }
    if el.has_class(TRIGGER_CLASS) && !in_menu {
        return Style::default().fg(theme::trigger_fg());
    }
    if in_menu {
        return Style::default();
    }
    if el.label().is_empty() {
        Style::default()
    } else {
        Style::default().bg(theme::page_bg()).fg(theme::page_fg())
    }
}

fn paint_label(
    el: &Element,
    bounds: FloatRect,
    viewport: Viewport,
    visible: Rect,
    frame: &mut UiFrame<'_>,
) {
    let label = el.label();
    if label.is_empty() || bounds.is_empty() {
        return;
    }
    // Default style leaves the row colours painted underneath in place.
    frame.put_str(
        bounds.x - viewport.scroll_x,
        bounds.y - viewport.scroll_y,
        label,
        visible,
        Style::default(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::buffer::Buffer;

    fn render(doc: &Document) -> Buffer {
        let vp = doc.viewport();
        let area = Rect::new(0, 0, vp.width, vp.height);
        let mut buffer = Buffer::empty(area);
        let mut frame = UiFrame::from_parts(area, &mut buffer);
        paint(doc, &mut frame);
        buffer
    }

    fn text(buffer: &Buffer, x: u16, y: u16, len: u16) -> String {
        (x..x + len).map(|x| buffer[(x, y)].symbol()).collect()
    }

    fn row(buffer: &Buffer, y: u16) -> String {
        text(buffer, 0, y, buffer.area.width)
    }

    fn element(doc: &mut Document, parent: ElementId, label: &str, rect: FloatRect) -> ElementId {
        let el = doc.create_element();
        doc.set_label(el, label);
        doc.set_bounds(el, rect);
        doc.append_child(parent, el);
        el
    }

    #[test]
    fn labels_paint_at_their_bounds() {
        let mut doc = Document::new(Viewport::new(20, 4));
        let root = doc.root();
        element(&mut doc, root, "File", FloatRect::new(2, 1, 4, 1));
        let buffer = render(&doc);
        assert_eq!(text(&buffer, 2, 1, 4), "File");
    }

    #[test]
    fn panels_draw_a_border_and_rows_inside() {
        let mut doc = Document::new(Viewport::new(20, 6));
        let root = doc.root();
        let panel = element(&mut doc, root, "", FloatRect::new(1, 1, 8, 4));
        doc.add_class(panel, PANEL_CLASS);
        let item = element(&mut doc, panel, "Open", FloatRect::new(2, 2, 6, 1));
        doc.add_class(item, ACTIVE_CLASS);
        let buffer = render(&doc);
        assert_eq!(buffer[(1, 1)].symbol(), "┌");
        assert_eq!(buffer[(8, 4)].symbol(), "┘");
        assert_eq!(text(&buffer, 2, 2, 4), "Open");
        assert_eq!(buffer[(3, 2)].bg, theme::menu_active_bg());
    }

    #[test]
    fn hidden_and_clipped_content_is_skipped() {
        let mut doc = Document::new(Viewport::new(20, 4));
        let root = doc.root();
        let hidden = element(&mut doc, root, "Secret", FloatRect::new(0, 0, 6, 1));
        doc.set_hidden(hidden, true);
        let clip = element(&mut doc, root, "", FloatRect::new(0, 2, 3, 1));
        doc.set_clips(clip, true);
        element(&mut doc, clip, "Overflow", FloatRect::new(0, 2, 8, 1));
        let buffer = render(&doc);
        assert!(!row(&buffer, 0).contains("Secret"));
        assert_eq!(row(&buffer, 2).trim_end(), "Ove");
    }

    #[test]
    fn viewport_scroll_shifts_content() {
        let mut doc = Document::new(Viewport::new(20, 4));
        let root = doc.root();
        element(&mut doc, root, "Below", FloatRect::new(0, 5, 5, 1));
        doc.scroll_viewport_to(0, 3);
        let buffer = render(&doc);
        assert_eq!(text(&buffer, 0, 2, 5), "Below");
    }

    #[test]
    fn elements_partly_off_screen_do_not_panic() {
        let mut doc = Document::new(Viewport::new(10, 3));
        let root = doc.root();
        element(&mut doc, root, "Wide label", FloatRect::new(-3, 0, 10, 1));
        let panel = element(&mut doc, root, "", FloatRect::new(6, 1, 8, 5));
        doc.add_class(panel, PANEL_CLASS);
        let buffer = render(&doc);
        assert_eq!(text(&buffer, 0, 0, 7), "e label");
        assert_eq!(buffer[(6, 1)].symbol(), "┌");
    }

    #[test]
    fn labels_far_past_the_screen_edge_are_skipped() {
        let mut doc = Document::new(Viewport::new(10, 2));
        let root = doc.root();
        let far = i32::from(u16::MAX) + 3;
        element(&mut doc, root, "Far", FloatRect::new(far, 0, 3, 1));
        element(&mut doc, root, "Near", FloatRect::new(0, 1, 4, 1));
        let buffer = render(&doc);
        assert_eq!(row(&buffer, 0).trim_end(), "");
        assert_eq!(text(&buffer, 0, 1, 4), "Near");
    }
}
