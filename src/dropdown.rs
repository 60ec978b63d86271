//! Floating panel stack manager.
//!
//! Tracks every open (trigger, panel) pair in a [`PanelStack`], positions
//! panels through [`calculate_position`], and keeps them valid while the
//! document scrolls, resizes or receives clicks elsewhere. Panels nest: a
//! panel may contain further triggers, each opening its own panel above it.
//!
//! Listeners registered on the manager's hub return [`Command`]s; the
//! manager applies them after each dispatch pass.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, warn};

use crate::click_outside::on_click_outside_dynamic;
use crate::constants::{MODE_ATTR, OPEN_CLASS, PANEL_CLASS, PLACEMENT_MARGIN, TEMPLATE_ATTR, TRIGGER_CLASS};
use crate::document::{Document, ElementId};
use crate::events::{EventHub, EventKind, ListenerId, ListenerOptions, Subscription, UiEvent};
use crate::layout::{
    FloatRect, HorizontalMode, PanelSize, PlacementOptions, VerticalMode, arrange_rows,
    calculate_position,
};
use crate::portal::{Layer, MountSurface};
use crate::templates::TemplateLoader;
use crate::viewport::{observe_scroll_position, observe_visibility};

/// Runs once with the trigger after its panel closed.
pub type OnClose = Box<dyn FnOnce(ElementId)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropdownSettings {
    pub margin: i32,
    pub default_horizontal: HorizontalMode,
    pub align_nested_to_trigger_top: bool,
}

impl Default for DropdownSettings {
    fn default() -> Self {
        Self {
            margin: PLACEMENT_MARGIN,
            default_horizontal: HorizontalMode::Right,
            align_nested_to_trigger_top: false,
        }
    }
}

/// Caller overrides for [`DropdownManager::open`]. Anything left unset falls
/// back to the trigger's attributes, then to the manager settings.
#[derive(Default)]
pub struct OpenOptions {
    pub content: Option<ElementId>,
    pub horizontal: Option<HorizontalMode>,
    pub vertical: Option<VerticalMode>,
    pub align_to_trigger_top: Option<bool>,
    pub on_close: Option<OnClose>,
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, content: ElementId) -> Self {
        self.content = Some(content);
        self
    }

    pub fn horizontal(mut self, mode: HorizontalMode) -> Self {
        self.horizontal = Some(mode);
        self
    }

    pub fn vertical(mut self, mode: VerticalMode) -> Self {
        self.vertical = Some(mode);
        self
    }

    pub fn align_to_trigger_top(mut self, align: bool) -> Self {
        self.align_to_trigger_top = Some(align);
        self
    }

    pub fn on_close(mut self, callback: impl FnOnce(ElementId) + 'static) -> Self {
        self.on_close = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for OpenOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenOptions")
            .field("content", &self.content)
            .field("horizontal", &self.horizontal)
            .field("vertical", &self.vertical)
            .field("align_to_trigger_top", &self.align_to_trigger_top)
            .field("on_close", &self.on_close.is_some())
            .finish()
    }
}

/// Placement preferences fixed when a panel opens and reused by every
/// reposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedOpen {
    pub horizontal: HorizontalMode,
    pub vertical: VerticalMode,
    pub align_to_trigger_top: bool,
}

/// Listener subscriptions owned by one open panel.
#[derive(Debug, Default)]
pub struct PanelTracking {
    subscription: Subscription,
}

impl PanelTracking {
    pub fn add(&mut self, subscription: Subscription) {
        self.subscription.merge(subscription);
    }

    pub fn listener_ids(&self) -> &[ListenerId] {
        self.subscription.ids()
    }

    pub fn release<S, A>(&mut self, hub: &mut EventHub<S, A>) {
        self.subscription.release(hub);
    }
}

pub struct OpenPanel {
    pub panel: ElementId,
    pub resolved: ResolvedOpen,
    pub tracking: PanelTracking,
    /// Template clones are freed on close; caller-supplied content is only
    /// detached.
    owned: bool,
    on_close: Option<OnClose>,
}

impl fmt::Debug for OpenPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenPanel")
            .field("panel", &self.panel)
            .field("resolved", &self.resolved)
            .field("tracking", &self.tracking)
            .field("owned", &self.owned)
            .finish()
    }
}

/// Open panels keyed by trigger, plus the order they were opened in.
///
/// Both views change together through `insert` and `remove` only.
#[derive(Debug, Default)]
pub struct PanelStack {
    entries: HashMap<ElementId, OpenPanel>,
    order: Vec<ElementId>,
}

impl PanelStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false, leaving the stack untouched, when `trigger` is
    /// already registered.
    pub fn insert(&mut self, trigger: ElementId, entry: OpenPanel) -> bool {
        if self.entries.contains_key(&trigger) {
            return false;
        }
        self.entries.insert(trigger, entry);
        self.order.push(trigger);
        true
    }

    pub fn remove(&mut self, trigger: ElementId) -> Option<OpenPanel> {
        let entry = self.entries.remove(&trigger)?;
        self.order.retain(|t| *t != trigger);
        Some(entry)
    }

    pub fn contains(&self, trigger: ElementId) -> bool {
        self.entries.contains_key(&trigger)
    }

    pub fn get(&self, trigger: ElementId) -> Option<&OpenPanel> {
        self.entries.get(&trigger)
    }

    pub fn panel_for(&self, trigger: ElementId) -> Option<ElementId> {
        self.entries.get(&trigger).map(|entry| entry.panel)
    }

    pub fn is_panel(&self, element: ElementId) -> bool {
        self.entries.values().any(|entry| entry.panel == element)
    }

    pub fn index_of(&self, trigger: ElementId) -> Option<usize> {
        self.order.iter().position(|t| *t == trigger)
    }

    /// Oldest first.
    pub fn triggers(&self) -> &[ElementId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Every open trigger and panel, for outside-click checks.
    pub fn tracked_elements(&self) -> Vec<ElementId> {
        self.order
            .iter()
            .flat_map(|t| [Some(*t), self.panel_for(*t)])
            .flatten()
            .collect()
    }

    /// Index of the most recently opened panel containing `target`.
    pub fn deepest_containing(&self, doc: &Document, target: ElementId) -> Option<usize> {
        self.order.iter().rposition(|t| {
            self.panel_for(*t)
                .is_some_and(|panel| doc.contains(panel, target))
        })
    }
}

/// Deferred work produced by listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    CloseAll,
    Close(ElementId),
    /// Close every panel opened after this trigger's panel. The index is
    /// looked up when the command runs.
    CloseDeeperThan(ElementId),
    Toggle(ElementId),
    Reposition(ElementId),
}

pub struct DropdownManager {
    stack: PanelStack,
    surface: MountSurface,
    templates: TemplateLoader,
    events: EventHub<PanelStack, Command>,
    settings: DropdownSettings,
    surface_listener: Option<(ElementId, ListenerId)>,
    wired: HashMap<ElementId, Subscription>,
}

impl Default for DropdownManager {
    fn default() -> Self {
        Self::new(DropdownSettings::default())
    }
}

impl fmt::Debug for DropdownManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropdownManager")
            .field("open", &self.stack.triggers())
            .field("listeners", &self.events.len())
            .field("settings", &self.settings)
            .finish()
    }
}

impl DropdownManager {
    pub fn new(settings: DropdownSettings) -> Self {
        Self {
            stack: PanelStack::new(),
            surface: MountSurface::new(),
            templates: TemplateLoader::new(),
            events: EventHub::new(),
            settings,
            surface_listener: None,
            wired: HashMap::new(),
        }
    }

    pub fn settings(&self) -> DropdownSettings {
        self.settings
    }

    pub fn surface(&self) -> &MountSurface {
        &self.surface
    }

    pub fn templates_mut(&mut self) -> &mut TemplateLoader {
        &mut self.templates
    }

    pub fn stack(&self) -> &PanelStack {
        &self.stack
    }

    pub fn is_open(&self, trigger: ElementId) -> bool {
        self.stack.contains(trigger)
    }

    pub fn panel_for(&self, trigger: ElementId) -> Option<ElementId> {
        self.stack.panel_for(trigger)
    }

    pub fn open_triggers(&self) -> &[ElementId] {
        self.stack.triggers()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Number of listeners currently registered, panels and wiring alike.
    pub fn listener_count(&self) -> usize {
        self.events.len()
    }

    fn resolve(&self, doc: &Document, trigger: ElementId, options: &OpenOptions) -> ResolvedOpen {
        let horizontal = options
            .horizontal
            .or_else(|| {
                let raw = doc.attr(trigger, MODE_ATTR)?;
                raw.parse()
                    .inspect_err(|err| warn!(?trigger, "{err}, using default"))
                    .ok()
            })
            .unwrap_or(self.settings.default_horizontal);
        ResolvedOpen {
            horizontal,
            vertical: options.vertical.unwrap_or_default(),
            align_to_trigger_top: options
                .align_to_trigger_top
                .unwrap_or(self.settings.align_nested_to_trigger_top),
        }
    }

    /// Open a panel for `trigger`.
    ///
    /// Content comes from `options.content` or from a clone of the template
    /// named by the trigger's `dropdown_id` attribute. Returns false without
    /// touching any state when the trigger is already open or no content can
    /// be found.
    pub fn open(&mut self, doc: &mut Document, trigger: ElementId, options: OpenOptions) -> bool {
        if !doc.exists(trigger) {
            warn!(?trigger, "cannot open dropdown for a removed trigger");
            return false;
        }
        if self.stack.contains(trigger) {
            debug!(?trigger, "dropdown already open");
            return false;
        }
        let resolved = self.resolve(doc, trigger, &options);

        let (panel, owned) = match options.content {
            Some(content) if doc.exists(content) => (content, false),
            Some(content) => {
                warn!(?trigger, ?content, "dropdown content element no longer exists");
                return false;
            }
            None => {
                let Some(template_id) = doc.attr(trigger, TEMPLATE_ATTR).map(str::to_string) else {
                    warn!(?trigger, "no dropdown_id and no content provided for trigger");
                    return false;
                };
                let Some(panel) = self.templates.load_from_dom(doc, &template_id) else {
                    warn!(?trigger, template = %template_id, "dropdown content could not be loaded");
                    return false;
                };
                (panel, true)
            }
        };

        doc.add_class(panel, PANEL_CLASS);
        doc.set_positioned(panel, true);
        self.surface.mount_to_layer(doc, panel, Layer::Dropdowns);
        self.ensure_surface_listener();
        arrange_rows(doc, panel);
        self.place(doc, trigger, panel, resolved);

        let mut tracking = PanelTracking::default();
        tracking.add(observe_scroll_position(&mut self.events, move || {
            Some(Command::Reposition(trigger))
        }));
        tracking.add(observe_visibility(&mut self.events, trigger, move || {
            Some(Command::Close(trigger))
        }));
        tracking.add(on_click_outside_dynamic(
            &mut self.events,
            PanelStack::tracked_elements,
            |_| Some(Command::CloseAll),
        ));
        for nested in doc.query_class(panel, TRIGGER_CLASS) {
            let id = self.events.listen(
                &[EventKind::Click],
                ListenerOptions::scoped(nested).with_stop_propagation(true),
                move |_, _, _| Some(Command::Toggle(nested)),
            );
            tracking.add(Subscription::single(id));
        }

        doc.add_class(trigger, OPEN_CLASS);
        self.stack.insert(
            trigger,
            OpenPanel {
                panel,
                resolved,
                tracking,
                owned,
                on_close: options.on_close,
            },
        );
        debug!(?trigger, ?panel, depth = self.stack.len(), "dropdown opened");
        true
    }

    /// Close the panel of `trigger` and every registered panel nested inside
    /// it. Closing a trigger that is not open does nothing and returns false.
    pub fn close(&mut self, doc: &mut Document, trigger: ElementId) -> bool {
        let Some(panel) = self.stack.panel_for(trigger) else {
            return false;
        };
        let nested: Vec<ElementId> = self
            .stack
            .triggers()
            .iter()
            .rev()
            .copied()
            .filter(|t| *t != trigger && doc.contains(panel, *t))
            .collect();
        for child in nested {
            self.close(doc, child);
        }

        let Some(mut entry) = self.stack.remove(trigger) else {
            return false;
        };
        entry.tracking.release(&mut self.events);
        self.surface.unmount(doc, entry.panel);
        if entry.owned {
            doc.remove(entry.panel);
        }
        doc.remove_class(trigger, OPEN_CLASS);
        debug!(?trigger, depth = self.stack.len(), "dropdown closed");
        if let Some(on_close) = entry.on_close.take() {
            on_close(trigger);
        }
        true
    }

    /// Close stack positions `index..`, most recently opened first.
    pub fn close_from(&mut self, doc: &mut Document, index: usize) {
        let triggers = self
            .stack
            .triggers()
            .get(index..)
            .map(<[ElementId]>::to_vec)
            .unwrap_or_default();
        for trigger in triggers.into_iter().rev() {
            self.close(doc, trigger);
        }
    }

    pub fn close_all(&mut self, doc: &mut Document) {
        self.close_from(doc, 0);
    }

    /// Close when open, otherwise open from the trigger's attributes.
    /// Returns whether the trigger is open afterwards.
    pub fn toggle(&mut self, doc: &mut Document, trigger: ElementId) -> bool {
        if self.stack.contains(trigger) {
            self.close(doc, trigger);
            false
        } else {
            self.open(doc, trigger, OpenOptions::default())
        }
    }

    /// Make clicks on `trigger` toggle its panel. Wiring twice is a no-op.
    pub fn wire_trigger(&mut self, trigger: ElementId) {
        if self.wired.contains_key(&trigger) {
            return;
        }
        let id = self.events.listen(
            &[EventKind::Click],
            ListenerOptions::scoped(trigger).with_stop_propagation(true),
            move |_, _, _| Some(Command::Toggle(trigger)),
        );
        self.wired.insert(trigger, Subscription::single(id));
    }

    pub fn unwire_trigger(&mut self, trigger: ElementId) {
        if let Some(mut subscription) = self.wired.remove(&trigger) {
            subscription.release(&mut self.events);
        }
    }

    /// Recompute the panel position from the current trigger bounds.
    pub fn reposition(&mut self, doc: &mut Document, trigger: ElementId) {
        let Some(entry) = self.stack.get(trigger) else {
            return;
        };
        let (panel, resolved) = (entry.panel, entry.resolved);
        self.place(doc, trigger, panel, resolved);
    }

    /// Bounds of every open panel the trigger sits inside, nearest first.
    pub fn ancestor_rects(&self, doc: &Document, trigger: ElementId) -> Vec<FloatRect> {
        doc.ancestors(trigger)
            .filter(|a| self.stack.is_panel(*a))
            .filter_map(|a| doc.bounds(a))
            .collect()
    }

    fn place(&self, doc: &mut Document, trigger: ElementId, panel: ElementId, resolved: ResolvedOpen) {
        let (Some(trigger_rect), Some(panel_rect)) = (doc.client_rect(trigger), doc.bounds(panel)) else {
            return;
        };
        let size = PanelSize::new(panel_rect.width, panel_rect.height);
        let ancestors = self.ancestor_rects(doc, trigger);
        let placement = calculate_position(
            trigger_rect,
            size,
            resolved.horizontal,
            resolved.vertical,
            &ancestors,
            PlacementOptions {
                align_to_trigger_top: resolved.align_to_trigger_top,
                margin: self.settings.margin,
            },
            doc.viewport(),
        );
        doc.place_subtree(panel, placement.rect(size));
    }

    /// Register the pointer-down listener on the dropdowns layer that
    /// collapses panels deeper than the one clicked. Re-registered when the
    /// layer element is recreated.
    fn ensure_surface_listener(&mut self) {
        let Some(layer) = self.surface.layer(Layer::Dropdowns) else {
            return;
        };
        if let Some((current, id)) = self.surface_listener {
            if current == layer {
                return;
            }
            self.events.remove(id);
        }
        let id = self.events.listen(
            &[EventKind::PointerDown],
            ListenerOptions::scoped(layer).with_capture(true),
            |event, doc, stack: &PanelStack| {
                let target = event.target()?;
                if doc.closest_with_class(target, TRIGGER_CLASS).is_some() {
                    return None;
                }
                let found = stack.deepest_containing(doc, target)?;
                if found + 1 >= stack.len() {
                    return None;
                }
                Some(Command::CloseDeeperThan(stack.triggers()[found]))
            },
        );
        self.surface_listener = Some((layer, id));
    }

    /// Run listeners for `event` and apply the commands they produced.
    ///
    /// The caller applies the event's default action (scrolling, resizing)
    /// to the document first. Returns true when any command ran.
    pub fn dispatch(&mut self, doc: &mut Document, event: &UiEvent) -> bool {
        let commands = self.events.dispatch(event, doc, &self.stack);
        let ran = !commands.is_empty();
        for command in commands {
            self.apply(doc, command);
        }
        ran
    }

    pub fn apply(&mut self, doc: &mut Document, command: Command) {
        match command {
            Command::CloseAll => self.close_all(doc),
            Command::Close(trigger) => {
                self.close(doc, trigger);
            }
            Command::CloseDeeperThan(trigger) => {
                if let Some(index) = self.stack.index_of(trigger) {
                    self.close_from(doc, index + 1);
                }
            }
            Command::Toggle(trigger) => {
                self.toggle(doc, trigger);
            }
            Command::Reposition(trigger) => self.reposition(doc, trigger),
        }
    }
}
