//! Outside-click detection for dropdowns, dialogs and sidebars.
//!
//! Both helpers register one document-level pointer-down listener (mouse and
//! touch alike) and run the handler only when the event target lies outside
//! every tracked element.

use crate::document::{Document, ElementId};
use crate::events::{EventHub, EventKind, ListenerOptions, PointerKind, Subscription, UiEvent};

/// Pointer-down details passed to outside-click handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerDown {
    pub kind: PointerKind,
    pub target: ElementId,
    pub column: u16,
    pub row: u16,
}

impl PointerDown {
    fn from_event(event: &UiEvent) -> Option<Self> {
        match *event {
            UiEvent::PointerDown {
                kind,
                target,
                column,
                row,
            } => Some(Self {
                kind,
                target,
                column,
                row,
            }),
            _ => None,
        }
    }
}

fn outside(doc: &Document, elements: &[ElementId], target: ElementId) -> bool {
    !elements.iter().any(|el| doc.contains(*el, target))
}

/// Watch a fixed set of elements.
pub fn on_click_outside<S, A, F>(
    hub: &mut EventHub<S, A>,
    elements: Vec<ElementId>,
    mut handler: F,
) -> Subscription
where
    S: 'static,
    A: 'static,
    F: FnMut(&PointerDown) -> Option<A> + 'static,
{
    let id = hub.listen(
        &[EventKind::PointerDown],
        ListenerOptions::default(),
        move |event, doc, _state| {
            let pointer = PointerDown::from_event(event)?;
            if outside(doc, &elements, pointer.target) {
                handler(&pointer)
            } else {
                None
            }
        },
    );
    Subscription::single(id)
}

/// Watch a set of elements recomputed from the hub state on every event, for
/// registries whose membership changes over time.
pub fn on_click_outside_dynamic<S, A, G, F>(
    hub: &mut EventHub<S, A>,
    elements: G,
    mut handler: F,
) -> Subscription
where
    S: 'static,
    A: 'static,
    G: Fn(&S) -> Vec<ElementId> + 'static,
    F: FnMut(&PointerDown) -> Option<A> + 'static,
{
    let id = hub.listen(
        &[EventKind::PointerDown],
        ListenerOptions::default(),
        move |event, doc, state| {
            let pointer = PointerDown::from_event(event)?;
            if outside(doc, &elements(state), pointer.target) {
                handler(&pointer)
            } else {
                None
            }
        },
    );
    Subscription::single(id)
}
