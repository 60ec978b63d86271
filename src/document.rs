//! Headless element tree hosting triggers, panels and their content.
//!
//! `Document` is an arena of elements with parent links, ordered children,
//! classes, attributes and cell bounds. Bounds are stored in document
//! coordinates; the host (renderer, tests) owns layout and writes them, the
//! toolkit reads them to position panels and to hit-test pointer events.
//!
//! Removed elements free their slot for reuse. Ids carry the generation of
//! the slot they were issued for, so a stale `ElementId` held by a listener
//! resolves to nothing once its element has been removed, even after the
//! slot holds a new element.

use std::collections::{BTreeMap, BTreeSet};

use crate::layout::{FloatRect, Viewport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId {
    index: usize,
    generation: u32,
}

impl ElementId {
    pub const fn index(self) -> usize {
        self.index
    }

    pub const fn generation(self) -> u32 {
        self.generation
    }
}

#[derive(Debug, Clone, Default)]
pub struct Element {
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    classes: BTreeSet<String>,
    attrs: BTreeMap<String, String>,
    label: String,
    bounds: FloatRect,
    hidden: bool,
    clips: bool,
    positioned: bool,
}

impl Element {
    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn bounds(&self) -> FloatRect {
        self.bounds
    }

    /// Hidden elements (and their subtrees) are neither painted nor hit.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Whether descendants are clipped to this element's bounds.
    pub fn clips(&self) -> bool {
        self.clips
    }

    pub fn is_positioned(&self) -> bool {
        self.positioned
    }
}

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    element: Option<Element>,
}

#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<usize>,
    root: ElementId,
    viewport: Viewport,
}

impl Document {
    pub fn new(viewport: Viewport) -> Self {
        let root = Element {
            bounds: FloatRect::new(0, 0, viewport.width, viewport.height),
            ..Element::default()
        };
        Self {
            slots: vec![Slot {
                generation: 0,
                element: Some(root),
            }],
            free: Vec::new(),
            root: ElementId {
                index: 0,
                generation: 0,
            },
            viewport,
        }
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Resize the viewport, keeping the current scroll offset.
    pub fn set_viewport_size(&mut self, width: u16, height: u16) {
        self.viewport.width = width;
        self.viewport.height = height;
        if let Some(root) = self.get_mut(self.root) {
            root.bounds.width = root.bounds.width.max(width);
            root.bounds.height = root.bounds.height.max(height);
        }
    }

    pub fn scroll_viewport_to(&mut self, scroll_x: i32, scroll_y: i32) {
        self.viewport.scroll_x = scroll_x;
        self.viewport.scroll_y = scroll_y;
    }

    pub fn create_element(&mut self) -> ElementId {
        if let Some(index) = self.free.pop()
            && let Some(slot) = self.slots.get_mut(index)
        {
            slot.element = Some(Element::default());
            return ElementId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len();
        self.slots.push(Slot {
            generation: 0,
            element: Some(Element::default()),
        });
        ElementId {
            index,
            generation: 0,
        }
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.element.as_ref())
    }

    fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.element.as_mut())
    }

    /// Number of live elements, attached or not.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slots allocated so far, live or free.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn exists(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.get(id).and_then(|el| el.parent)
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.get(id).map(|el| el.children.as_slice()).unwrap_or(&[])
    }

    pub fn label(&self, id: ElementId) -> &str {
        self.get(id).map(|el| el.label.as_str()).unwrap_or("")
    }

    pub fn set_label(&mut self, id: ElementId, label: impl Into<String>) {
        if let Some(el) = self.get_mut(id) {
            el.label = label.into();
        }
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.get(id).is_some_and(|el| el.has_class(class))
    }

    pub fn add_class(&mut self, id: ElementId, class: &str) {
        if let Some(el) = self.get_mut(id) {
            el.classes.insert(class.to_string());
        }
    }

    pub fn remove_class(&mut self, id: ElementId, class: &str) {
        if let Some(el) = self.get_mut(id) {
            el.classes.remove(class);
        }
    }

    pub fn toggle_class(&mut self, id: ElementId, class: &str, on: bool) {
        if on {
            self.add_class(id, class);
        } else {
            self.remove_class(id, class);
        }
    }

    pub fn attr(&self, id: ElementId, name: &str) -> Option<&str> {
        self.get(id).and_then(|el| el.attr(name))
    }

    pub fn set_attr(&mut self, id: ElementId, name: &str, value: impl Into<String>) {
        if let Some(el) = self.get_mut(id) {
            el.attrs.insert(name.to_string(), value.into());
        }
    }

    pub fn remove_attr(&mut self, id: ElementId, name: &str) {
        if let Some(el) = self.get_mut(id) {
            el.attrs.remove(name);
        }
    }

    pub fn set_hidden(&mut self, id: ElementId, hidden: bool) {
        if let Some(el) = self.get_mut(id) {
            el.hidden = hidden;
        }
    }

    pub fn set_clips(&mut self, id: ElementId, clips: bool) {
        if let Some(el) = self.get_mut(id) {
            el.clips = clips;
        }
    }

    pub fn set_positioned(&mut self, id: ElementId, positioned: bool) {
        if let Some(el) = self.get_mut(id) {
            el.positioned = positioned;
        }
    }

    pub fn bounds(&self, id: ElementId) -> Option<FloatRect> {
        self.get(id).map(|el| el.bounds)
    }

    pub fn set_bounds(&mut self, id: ElementId, bounds: FloatRect) {
        if let Some(el) = self.get_mut(id) {
            el.bounds = bounds;
        }
    }

    /// Bounds relative to the viewport origin rather than the document.
    pub fn client_rect(&self, id: ElementId) -> Option<FloatRect> {
        self.bounds(id)
            .map(|b| b.translate(-self.viewport.scroll_x, -self.viewport.scroll_y))
    }

    /// Move `id` and everything inside it by the same offset.
    pub fn translate_subtree(&mut self, id: ElementId, dx: i32, dy: i32) {
        if dx == 0 && dy == 0 {
            return;
        }
        for node in self.descendants_inclusive(id) {
            if let Some(el) = self.get_mut(node) {
                el.bounds = el.bounds.translate(dx, dy);
            }
        }
    }

    /// Give `id` new bounds, carrying its descendants along with its origin.
    pub fn place_subtree(&mut self, id: ElementId, bounds: FloatRect) {
        let Some(current) = self.bounds(id) else {
            return;
        };
        let (dx, dy) = (bounds.x - current.x, bounds.y - current.y);
        for node in self.descendants(id) {
            if let Some(el) = self.get_mut(node) {
                el.bounds = el.bounds.translate(dx, dy);
            }
        }
        self.set_bounds(id, bounds);
    }

    /// Scroll the content of a container: its descendants move opposite to
    /// the scroll direction while the container itself stays put.
    pub fn scroll_by(&mut self, container: ElementId, dx: i32, dy: i32) {
        for node in self.descendants(container) {
            if let Some(el) = self.get_mut(node) {
                el.bounds = el.bounds.translate(-dx, -dy);
            }
        }
    }

    /// Append `child` as the last child of `parent`, moving it out of any
    /// previous parent first. Refuses to create cycles.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> bool {
        if !self.exists(parent) || !self.exists(child) || self.contains(child, parent) {
            return false;
        }
        self.detach(child);
        if let Some(el) = self.get_mut(child) {
            el.parent = Some(parent);
        }
        if let Some(el) = self.get_mut(parent) {
            el.children.push(child);
        }
        true
    }

    /// Remove `id` from its parent. The subtree stays alive and can be
    /// re-attached later.
    pub fn detach(&mut self, id: ElementId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(el) = self.get_mut(parent) {
            el.children.retain(|c| *c != id);
        }
        if let Some(el) = self.get_mut(id) {
            el.parent = None;
        }
    }

    /// Detach and free the whole subtree.
    pub fn remove(&mut self, id: ElementId) {
        if id == self.root {
            return;
        }
        self.detach(id);
        for node in self.descendants_inclusive(id) {
            if let Some(slot) = self.slots.get_mut(node.index) {
                slot.element = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(node.index);
            }
        }
    }

    /// Ancestors of `id`, nearest first, excluding `id` itself.
    pub fn ancestors(&self, id: ElementId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.parent(id),
        }
    }

    /// Inclusive containment: an element contains itself.
    pub fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        if !self.exists(node) {
            return false;
        }
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    pub fn closest_with_class(&self, id: ElementId, class: &str) -> Option<ElementId> {
        if !self.exists(id) {
            return None;
        }
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|node| self.has_class(*node, class))
    }

    pub fn is_attached(&self, id: ElementId) -> bool {
        self.contains(self.root, id)
    }

    /// Descendants of `id` in document (pre-)order, excluding `id`.
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = self.descendants_inclusive(id);
        if !out.is_empty() {
            out.remove(0);
        }
        out
    }

    fn descendants_inclusive(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        if !self.exists(id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    pub fn query_class(&self, scope: ElementId, class: &str) -> Vec<ElementId> {
        self.descendants(scope)
            .into_iter()
            .filter(|node| self.has_class(*node, class))
            .collect()
    }

    /// First attached element whose `id` attribute equals `id`.
    pub fn find_by_id(&self, id: &str) -> Option<ElementId> {
        self.descendants_inclusive(self.root)
            .into_iter()
            .find(|node| self.attr(*node, "id") == Some(id))
    }

    /// Copy the subtree rooted at `id`. The copy is detached; the source is
    /// left untouched.
    pub fn deep_clone(&mut self, id: ElementId) -> Option<ElementId> {
        let source = self.get(id)?.clone();
        let copy = self.create_element();
        if let Some(el) = self.get_mut(copy) {
            *el = Element {
                parent: None,
                children: Vec::new(),
                ..source.clone()
            };
        }
        for child in source.children {
            if let Some(child_copy) = self.deep_clone(child) {
                self.append_child(copy, child_copy);
            }
        }
        Some(copy)
    }

    /// Whether any part of `id` is inside the viewport once clipping
    /// ancestors are taken into account. Detached and hidden elements are
    /// never visible.
    pub fn is_visible(&self, id: ElementId) -> bool {
        self.visible_rect(id).is_some()
    }

    pub fn visible_rect(&self, id: ElementId) -> Option<FloatRect> {
        if !self.is_attached(id) {
            return None;
        }
        let el = self.get(id)?;
        if el.hidden {
            return None;
        }
        let mut rect = el.bounds.intersection(&self.viewport.bounds())?;
        for ancestor in self.ancestors(id) {
            let a = self.get(ancestor)?;
            if a.hidden {
                return None;
            }
            if a.clips {
                rect = rect.intersection(&a.bounds)?;
            }
        }
        Some(rect)
    }

    /// Topmost element under a viewport cell, in paint order (later in the
    /// document paints above earlier).
    pub fn hit_test(&self, column: u16, row: u16) -> Option<ElementId> {
        let x = column as i32 + self.viewport.scroll_x;
        let y = row as i32 + self.viewport.scroll_y;
        let mut hit = None;
        self.hit_test_node(self.root, x, y, None, &mut hit);
        hit
    }

    fn hit_test_node(
        &self,
        id: ElementId,
        x: i32,
        y: i32,
        clip: Option<FloatRect>,
        hit: &mut Option<ElementId>,
    ) {
        let Some(el) = self.get(id) else {
            return;
        };
        if el.hidden {
            return;
        }
        let inside_clip = clip.is_none_or(|c| crate::layout::rect_contains(c, x, y));
        if inside_clip && crate::layout::rect_contains(el.bounds, x, y) {
            *hit = Some(id);
        }
        let child_clip = if el.clips {
            match clip {
                Some(c) => c.intersection(&el.bounds).or(Some(FloatRect::default())),
                None => Some(el.bounds),
            }
        } else {
            clip
        };
        for child in &el.children {
            self.hit_test_node(*child, x, y, child_clip, hit);
        }
    }
}

pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<ElementId>,
}

impl Iterator for Ancestors<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document::new(Viewport::new(40, 20))
    }

    #[test]
    fn append_moves_between_parents_and_rejects_cycles() {
        let mut d = doc();
        let a = d.create_element();
        let b = d.create_element();
        let c = d.create_element();
        assert!(d.append_child(d.root(), a));
        assert!(d.append_child(a, b));
        assert!(d.append_child(b, c));
        assert!(!d.append_child(c, a));
        assert!(d.append_child(a, c));
        assert_eq!(d.children(a), &[b, c]);
        assert!(d.children(b).is_empty());
        assert!(d.contains(a, c));
        assert!(d.contains(c, c));
        assert!(!d.contains(b, c));
    }

    #[test]
    fn deep_clone_leaves_source_untouched() {
        let mut d = doc();
        let tpl = d.create_element();
        d.add_class(tpl, "menu");
        let item = d.create_element();
        d.set_label(item, "Open");
        d.append_child(tpl, item);

        let copy = d.deep_clone(tpl).expect("clone");
        assert_ne!(copy, tpl);
        assert!(d.has_class(copy, "menu"));
        let copy_item = d.children(copy)[0];
        assert_ne!(copy_item, item);
        assert_eq!(d.label(copy_item), "Open");

        d.set_label(copy_item, "Changed");
        assert_eq!(d.label(item), "Open");
        assert_eq!(d.children(tpl), &[item]);
    }

    #[test]
    fn hit_test_prefers_later_siblings_and_respects_clipping() {
        let mut d = doc();
        let under = d.create_element();
        let over = d.create_element();
        d.set_bounds(under, FloatRect::new(0, 0, 10, 10));
        d.set_bounds(over, FloatRect::new(5, 5, 10, 10));
        d.append_child(d.root(), under);
        d.append_child(d.root(), over);
        assert_eq!(d.hit_test(6, 6), Some(over));
        assert_eq!(d.hit_test(1, 1), Some(under));

        let scroller = d.create_element();
        d.set_bounds(scroller, FloatRect::new(20, 0, 10, 5));
        d.set_clips(scroller, true);
        let row = d.create_element();
        d.set_bounds(row, FloatRect::new(20, 8, 10, 1));
        d.append_child(d.root(), scroller);
        d.append_child(scroller, row);
        // the row lies outside its clipping container
        assert_eq!(d.hit_test(21, 8), Some(d.root()));
        assert!(!d.is_visible(row));

        d.scroll_by(scroller, 0, 6);
        assert_eq!(d.bounds(row), Some(FloatRect::new(20, 2, 10, 1)));
        assert!(d.is_visible(row));
        assert_eq!(d.hit_test(21, 2), Some(row));
    }

    #[test]
    fn detached_and_hidden_elements_are_not_visible() {
        let mut d = doc();
        let a = d.create_element();
        d.set_bounds(a, FloatRect::new(1, 1, 3, 1));
        assert!(!d.is_visible(a));
        d.append_child(d.root(), a);
        assert!(d.is_visible(a));
        d.set_hidden(a, true);
        assert!(!d.is_visible(a));
    }

    #[test]
    fn removed_ids_resolve_to_nothing() {
        let mut d = doc();
        let a = d.create_element();
        let b = d.create_element();
        d.append_child(d.root(), a);
        d.append_child(a, b);
        d.remove(a);
        assert!(!d.exists(a));
        assert!(!d.exists(b));
        assert!(d.children(d.root()).is_empty());
        assert!(!d.contains(d.root(), b));
    }

    #[test]
    fn freed_slots_are_reused_without_reviving_stale_ids() {
        let mut d = doc();
        let a = d.create_element();
        d.append_child(d.root(), a);
        d.set_label(a, "old");
        let slots = d.capacity();
        d.remove(a);

        let b = d.create_element();
        assert_eq!(b.index(), a.index());
        assert_ne!(b, a);
        assert_eq!(d.capacity(), slots);
        assert!(!d.exists(a));
        d.set_label(a, "stale write");
        assert_eq!(d.label(b), "");
        assert_eq!(d.len(), 2);
    }

    #[test]
    fn churn_keeps_the_arena_bounded() {
        let mut d = doc();
        let template = d.create_element();
        let row = d.create_element();
        d.append_child(template, row);
        let before = d.capacity();
        for _ in 0..1000 {
            let copy = d.deep_clone(template).expect("clone");
            d.append_child(d.root(), copy);
            d.remove(copy);
        }
        assert!(d.capacity() <= before + 2);
        assert_eq!(d.len(), 3);
    }

    #[test]
    fn find_by_id_only_sees_attached_elements() {
        let mut d = doc();
        let a = d.create_element();
        d.set_attr(a, "id", "menu");
        assert_eq!(d.find_by_id("menu"), None);
        d.append_child(d.root(), a);
        assert_eq!(d.find_by_id("menu"), Some(a));
    }
}
