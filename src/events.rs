//! Toolkit events and the listener hub that routes them.
//!
//! Listeners never mutate toolkit state directly. Each one inspects the event
//! (plus read-only access to the document and to the hub's shared state `S`)
//! and may return an action `A`. The owner of the hub applies the collected
//! actions once the dispatch pass has finished, so state is never observed
//! half-updated from inside a listener.

use std::collections::BTreeMap;

use crossterm::event::{Event, KeyEvent, MouseButton, MouseEventKind};

use crate::document::{Document, ElementId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PointerDown,
    Click,
    Scroll,
    Resize,
    Key,
    Layout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    PointerDown {
        kind: PointerKind,
        target: ElementId,
        column: u16,
        row: u16,
    },
    Click {
        target: ElementId,
        column: u16,
        row: u16,
    },
    /// Content of `target` (or the viewport when `None`) scrolled.
    Scroll {
        target: Option<ElementId>,
        dx: i32,
        dy: i32,
    },
    Resize {
        width: u16,
        height: u16,
    },
    Key {
        target: Option<ElementId>,
        key: KeyEvent,
    },
    /// The host moved or resized elements outside of a scroll.
    Layout,
}

impl UiEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            UiEvent::PointerDown { .. } => EventKind::PointerDown,
            UiEvent::Click { .. } => EventKind::Click,
            UiEvent::Scroll { .. } => EventKind::Scroll,
            UiEvent::Resize { .. } => EventKind::Resize,
            UiEvent::Key { .. } => EventKind::Key,
            UiEvent::Layout => EventKind::Layout,
        }
    }

    pub fn target(&self) -> Option<ElementId> {
        match self {
            UiEvent::PointerDown { target, .. } | UiEvent::Click { target, .. } => Some(*target),
            UiEvent::Scroll { target, .. } | UiEvent::Key { target, .. } => *target,
            UiEvent::Resize { .. } | UiEvent::Layout => None,
        }
    }
}

/// Translate a terminal event into toolkit events, hit-testing pointer
/// positions against `doc`.
///
/// A left press yields a pointer-down on the element under the cursor, the
/// matching release yields a click. Wheel events scroll the nearest clipping
/// container under the cursor, or the viewport.
pub fn translate(event: &Event, doc: &Document, focus: Option<ElementId>) -> Vec<UiEvent> {
    match event {
        Event::Mouse(mouse) => {
            let Some(target) = doc.hit_test(mouse.column, mouse.row) else {
                return Vec::new();
            };
            let (column, row) = (mouse.column, mouse.row);
            match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => vec![UiEvent::PointerDown {
                    kind: PointerKind::Mouse,
                    target,
                    column,
                    row,
                }],
                MouseEventKind::Up(MouseButton::Left) => {
                    vec![UiEvent::Click {
                        target,
                        column,
                        row,
                    }]
                }
                MouseEventKind::ScrollDown | MouseEventKind::ScrollUp => {
                    let dy = if matches!(mouse.kind, MouseEventKind::ScrollDown) {
                        1
                    } else {
                        -1
                    };
                    let container = std::iter::once(target)
                        .chain(doc.ancestors(target))
                        .find(|node| doc.get(*node).is_some_and(|el| el.clips()));
                    vec![UiEvent::Scroll {
                        target: container,
                        dx: 0,
                        dy,
                    }]
                }
                _ => Vec::new(),
            }
        }
        Event::Key(key) => vec![UiEvent::Key {
            target: focus,
            key: *key,
        }],
        Event::Resize(width, height) => vec![UiEvent::Resize {
            width: *width,
            height: *height,
        }],
        _ => Vec::new(),
    }
}

/// Perform the document-level effect of an event before listeners see it:
/// scrolling moves content, resizing changes the viewport.
pub fn apply_default_action(doc: &mut Document, event: &UiEvent) {
    match event {
        UiEvent::Scroll {
            target: Some(container),
            dx,
            dy,
        } => doc.scroll_by(*container, *dx, *dy),
        UiEvent::Scroll {
            target: None,
            dx,
            dy,
        } => {
            let vp = doc.viewport();
            doc.scroll_viewport_to(vp.scroll_x + dx, (vp.scroll_y + dy).max(0));
        }
        UiEvent::Resize { width, height } => doc.set_viewport_size(*width, *height),
        _ => {}
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    /// Run before every bubble-phase listener.
    pub capture: bool,
    /// Only fire for events whose target lies inside this element.
    pub scope: Option<ElementId>,
    /// Once this listener produces an action, no later listener runs.
    pub stop_propagation: bool,
}

impl ListenerOptions {
    pub fn capture() -> Self {
        Self {
            capture: true,
            ..Self::default()
        }
    }

    pub fn scoped(scope: ElementId) -> Self {
        Self {
            scope: Some(scope),
            ..Self::default()
        }
    }

    pub fn with_capture(mut self, capture: bool) -> Self {
        self.capture = capture;
        self
    }

    pub fn with_stop_propagation(mut self, stop: bool) -> Self {
        self.stop_propagation = stop;
        self
    }
}

pub type Handler<S, A> = Box<dyn FnMut(&UiEvent, &Document, &S) -> Option<A>>;

struct Listener<S, A> {
    kinds: Vec<EventKind>,
    options: ListenerOptions,
    handler: Handler<S, A>,
}

/// Registry of listeners keyed by registration order.
pub struct EventHub<S, A> {
    listeners: BTreeMap<ListenerId, Listener<S, A>>,
    next_id: u64,
}

impl<S, A> Default for EventHub<S, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, A> std::fmt::Debug for EventHub<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHub")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<S, A> EventHub<S, A> {
    pub fn new() -> Self {
        Self {
            listeners: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn listen<F>(&mut self, kinds: &[EventKind], options: ListenerOptions, handler: F) -> ListenerId
    where
        F: FnMut(&UiEvent, &Document, &S) -> Option<A> + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.insert(
            id,
            Listener {
                kinds: kinds.to_vec(),
                options,
                handler: Box::new(handler),
            },
        );
        id
    }

    /// Removing an unknown or already removed listener is a no-op.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    pub fn contains(&self, id: ListenerId) -> bool {
        self.listeners.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Run every matching listener and collect the actions they return.
    ///
    /// Capture listeners run first in registration order. Bubble listeners
    /// follow, innermost scope first, with unscoped (document-level)
    /// listeners last.
    pub fn dispatch(&mut self, event: &UiEvent, doc: &Document, state: &S) -> Vec<A> {
        let kind = event.kind();
        let target = event.target();

        let mut order: Vec<(bool, usize, ListenerId)> = self
            .listeners
            .iter()
            .filter(|(_, l)| l.kinds.contains(&kind))
            .filter_map(|(id, l)| match l.options.scope {
                None => Some((l.options.capture, 0, *id)),
                Some(scope) => {
                    let target = target?;
                    if !doc.contains(scope, target) {
                        return None;
                    }
                    Some((l.options.capture, doc.ancestors(scope).count() + 1, *id))
                }
            })
            .collect();
        order.sort_by(|a, b| {
            b.0.cmp(&a.0).then_with(|| {
                if a.0 {
                    a.2.cmp(&b.2)
                } else {
                    b.1.cmp(&a.1).then_with(|| a.2.cmp(&b.2))
                }
            })
        });

        let mut actions = Vec::new();
        for (_, _, id) in order {
            let Some(listener) = self.listeners.get_mut(&id) else {
                continue;
            };
            if let Some(action) = (listener.handler)(event, doc, state) {
                actions.push(action);
                if listener.options.stop_propagation {
                    break;
                }
            }
        }
        actions
    }
}

/// Handle to a group of listeners registered together.
///
/// `release` removes them from the hub; calling it again does nothing.
#[derive(Debug, Default, PartialEq, Eq)]
#[must_use = "dropping a subscription leaves its listeners registered"]
pub struct Subscription {
    ids: Vec<ListenerId>,
}

impl Subscription {
    pub fn new(ids: Vec<ListenerId>) -> Self {
        Self { ids }
    }

    pub fn single(id: ListenerId) -> Self {
        Self { ids: vec![id] }
    }

    pub fn ids(&self) -> &[ListenerId] {
        &self.ids
    }

    pub fn is_released(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn merge(&mut self, other: Subscription) {
        self.ids.extend(other.ids);
    }

    pub fn release<S, A>(&mut self, hub: &mut EventHub<S, A>) {
        for id in self.ids.drain(..) {
            hub.remove(id);
        }
    }
}
