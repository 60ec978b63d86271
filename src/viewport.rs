//! Scroll/resize and visibility tracking for floating content.

use crate::document::ElementId;
use crate::events::{EventHub, EventKind, ListenerOptions, Subscription};

/// Run `on_change` whenever anything scrolls (any container, captured at the
/// document) or the viewport is resized.
pub fn observe_scroll_position<S, A, F>(hub: &mut EventHub<S, A>, mut on_change: F) -> Subscription
where
    S: 'static,
    A: 'static,
    F: FnMut() -> Option<A> + 'static,
{
    let id = hub.listen(
        &[EventKind::Scroll, EventKind::Resize],
        ListenerOptions::capture(),
        move |_, _, _| on_change(),
    );
    Subscription::single(id)
}

/// Run `on_hidden` each time `target` goes from intersecting the viewport to
/// not intersecting it. Visibility is re-evaluated after scrolls, resizes and
/// layout changes; the target counts as visible when observation starts.
pub fn observe_visibility<S, A, F>(
    hub: &mut EventHub<S, A>,
    target: ElementId,
    mut on_hidden: F,
) -> Subscription
where
    S: 'static,
    A: 'static,
    F: FnMut() -> Option<A> + 'static,
{
    let mut was_visible = true;
    let id = hub.listen(
        &[EventKind::Scroll, EventKind::Resize, EventKind::Layout],
        ListenerOptions::capture(),
        move |_, doc, _| {
            let visible = doc.is_visible(target);
            let lost = was_visible && !visible;
            was_visible = visible;
            if lost { on_hidden() } else { None }
        },
    );
    Subscription::single(id)
}
