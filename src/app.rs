//! Demo host: a menu bar of dropdown triggers above a column of select
//! controls, wired to terminal input.
//!
//! `MenuApp` owns the document, the dropdown manager and the selects, and
//! turns each crossterm event into toolkit events. The binary drives it from
//! an [`EventLoop`](crate::event_loop::EventLoop); tests drive it directly.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use indoc::indoc;
use tracing::{info, warn};

use crate::config::Config;
use crate::constants::{TEMPLATE_ATTR, TRIGGER_CLASS};
use crate::document::{Document, ElementId};
use crate::dropdown::DropdownManager;
use crate::error::Result;
use crate::event_loop::ControlFlow;
use crate::events::{UiEvent, apply_default_action, translate};
use crate::layout::{FloatRect, Viewport};
use crate::render;
use crate::select::{SelectConfig, SelectControl, SelectKind, SelectMode, SelectOption};
use crate::templates::FsTemplateSource;
use crate::ui::UiFrame;

/// Attribute naming what a menu row does when clicked.
pub const ACTION_ATTR: &str = "action";

// Panels keep `placement.margin` cells from every viewport edge, so the demo
// lays its content out inside that margin.
const MENU_BAR_ROW: i32 = 3;
const CONTENT_LEFT: i32 = 4;
const SELECT_WIDTH: u16 = 28;
const SELECT_TOP: i32 = 7;
const SELECT_SPACING: i32 = 3;

/// Menus available without any template files.
pub const BUILTIN_TEMPLATES: &str = indoc! {r#"
    [[template]]
    id = "file_menu"
    [[template.root.children]]
    label = "New"
    attrs = { action = "new" }
    [[template.root.children]]
    label = "Open..."
    attrs = { action = "open" }
    [[template.root.children]]
    label = "Recent"
    class = ["dropdown_trigger"]
    attrs = { dropdown_id = "recent_menu" }
    [[template.root.children]]
    label = "Quit"
    attrs = { action = "quit" }

    [[template]]
    id = "recent_menu"
    [[template.root.children]]
    label = "notes.txt"
    attrs = { action = "open:notes.txt" }
    [[template.root.children]]
    label = "todo.md"
    attrs = { action = "open:todo.md" }

    [[template]]
    id = "edit_menu"
    [[template.root.children]]
    label = "Undo"
    attrs = { action = "undo" }
    [[template.root.children]]
    label = "Redo"
    attrs = { action = "redo" }

    [[template]]
    id = "view_menu"
    [[template.root.children]]
    label = "Zoom"
    class = ["dropdown_trigger"]
    attrs = { dropdown_id = "zoom_menu" }
    [[template.root.children]]
    label = "Fullscreen"
    attrs = { action = "fullscreen" }

    [[template]]
    id = "zoom_menu"
    [[template.root.children]]
    label = "Zoom in"
    attrs = { action = "zoom_in" }
    [[template.root.children]]
    label = "Zoom out"
    attrs = { action = "zoom_out" }
"#};

const MENU_BAR: &[(&str, &str)] = &[
    ("File", "file_menu"),
    ("Edit", "edit_menu"),
    ("View", "view_menu"),
];

pub struct MenuApp {
    doc: Document,
    dropdowns: DropdownManager,
    selects: Vec<SelectControl>,
    menu_bar: Vec<ElementId>,
    status: ElementId,
    focus: Option<usize>,
    last_action: Option<String>,
}

impl MenuApp {
    pub fn new(viewport: Viewport, config: &Config) -> Result<Self> {
        let mut doc = Document::new(viewport);
        let mut dropdowns = DropdownManager::new(config.dropdown_settings());

        dropdowns
            .templates_mut()
            .load_markup(&mut doc, "builtin", BUILTIN_TEMPLATES)?;
        let mut source = FsTemplateSource::new(".");
        for path in &config.templates {
            let url = path.to_string_lossy();
            if let Err(err) = dropdowns
                .templates_mut()
                .load_external(&mut doc, &mut source, &url)
            {
                warn!(%url, "skipping template file: {err}");
            }
        }

        let root = doc.root();
        let mut menu_bar = Vec::new();
        let mut x = CONTENT_LEFT;
        for (label, template) in MENU_BAR {
            let trigger = doc.create_element();
            let text = format!(" {label} ");
            let width = text.chars().count() as u16;
            doc.set_label(trigger, text);
            doc.add_class(trigger, TRIGGER_CLASS);
            doc.set_attr(trigger, TEMPLATE_ATTR, *template);
            doc.set_bounds(trigger, FloatRect::new(x, MENU_BAR_ROW, width, 1));
            doc.append_child(root, trigger);
            dropdowns.wire_trigger(trigger);
            menu_bar.push(trigger);
            x += width as i32 + 1;
        }

        let configs = if config.selects.is_empty() {
            default_selects()
        } else {
            config.selects.clone()
        };
        let mut selects = Vec::new();
        let mut y = SELECT_TOP;
        for select_config in configs {
            let host = doc.create_element();
            if let Some(id) = &select_config.id {
                doc.set_attr(host, "id", id.clone());
            }
            doc.set_bounds(host, FloatRect::new(CONTENT_LEFT, y, SELECT_WIDTH, 1));
            doc.append_child(root, host);
            let select = SelectControl::new(&mut doc, host, select_config);
            let height = doc.bounds(select.container()).map_or(1, |b| b.height as i32);
            y += height.max(1) + SELECT_SPACING;
            selects.push(select);
        }

        let status = doc.create_element();
        doc.append_child(root, status);

        let mut app = Self {
            doc,
            dropdowns,
            selects,
            menu_bar,
            status,
            focus: None,
            last_action: None,
        };
        app.layout_status();
        app.refresh_status();
        Ok(app)
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn dropdowns(&self) -> &DropdownManager {
        &self.dropdowns
    }

    pub fn selects(&self) -> &[SelectControl] {
        &self.selects
    }

    pub fn menu_bar(&self) -> &[ElementId] {
        &self.menu_bar
    }

    pub fn focused_select(&self) -> Option<&SelectControl> {
        self.focus.and_then(|index| self.selects.get(index))
    }

    pub fn last_action(&self) -> Option<&str> {
        self.last_action.as_deref()
    }

    pub fn status_line(&self) -> &str {
        self.doc.label(self.status)
    }

    pub fn draw(&self, frame: &mut UiFrame<'_>) {
        render::paint(&self.doc, frame);
    }

    /// Feed one terminal event through the toolkit.
    pub fn handle_event(&mut self, event: &Event) -> ControlFlow {
        if let Event::Key(key) = event
            && is_quit(key, self.focus.is_some())
        {
            return ControlFlow::Quit;
        }
        let focus = self.focused_select().map(SelectControl::input);
        let mut flow = ControlFlow::Continue;
        for ui_event in translate(event, &self.doc, focus) {
            if self.handle_ui_event(&ui_event) == ControlFlow::Quit {
                flow = ControlFlow::Quit;
            }
        }
        self.layout_status();
        self.refresh_status();
        flow
    }

    fn handle_ui_event(&mut self, event: &UiEvent) -> ControlFlow {
        apply_default_action(&mut self.doc, event);
        if let UiEvent::PointerDown { target, .. } = event {
            self.focus = self
                .selects
                .iter()
                .position(|select| select.owns(&self.doc, *target));
        }
        if self.dropdowns.dispatch(&mut self.doc, event) {
            return ControlFlow::Continue;
        }
        for select in &mut self.selects {
            if select.handle_event(&mut self.doc, &mut self.dropdowns, event) {
                return ControlFlow::Continue;
            }
        }
        match event {
            UiEvent::Click { target, .. } => self.run_action(*target),
            UiEvent::Key { key, .. } => {
                self.handle_unrouted_key(key);
                ControlFlow::Continue
            }
            _ => ControlFlow::Continue,
        }
    }

    fn run_action(&mut self, target: ElementId) -> ControlFlow {
        let Some(action) = std::iter::once(target)
            .chain(self.doc.ancestors(target))
            .find_map(|el| self.doc.attr(el, ACTION_ATTR))
            .map(str::to_string)
        else {
            return ControlFlow::Continue;
        };
        info!(%action, "menu action");
        self.dropdowns.close_all(&mut self.doc);
        let flow = if action == "quit" {
            ControlFlow::Quit
        } else {
            ControlFlow::Continue
        };
        self.last_action = Some(action);
        flow
    }

    fn handle_unrouted_key(&mut self, key: &KeyEvent) {
        match key.code {
            KeyCode::Esc => self.dropdowns.close_all(&mut self.doc),
            KeyCode::Tab | KeyCode::BackTab if !self.selects.is_empty() => {
                let count = self.selects.len();
                let forward = key.code == KeyCode::Tab;
                self.focus = Some(match (self.focus, forward) {
                    (None, true) => 0,
                    (None, false) => count - 1,
                    (Some(i), true) => (i + 1) % count,
                    (Some(i), false) => (i + count - 1) % count,
                });
            }
            _ => {}
        }
    }

    fn layout_status(&mut self) {
        let vp = self.doc.viewport();
        let row = vp.height.saturating_sub(1) as i32 + vp.scroll_y;
        self.doc
            .set_bounds(self.status, FloatRect::new(0, row, vp.width, 1));
    }

    fn refresh_status(&mut self) {
        let values: Vec<String> = self
            .selects
            .iter()
            .map(|select| {
                format!(
                    "{}={}",
                    select.hidden().name,
                    select.selected_values().join(",")
                )
            })
            .collect();
        let mut status = values.join("  ");
        if let Some(action) = &self.last_action {
            status = format!("{status}  last: {action}");
        }
        self.doc.set_label(self.status, status);
    }
}

fn is_quit(key: &KeyEvent, select_focused: bool) -> bool {
    match key.code {
        KeyCode::Char('q') if key.modifiers.contains(KeyModifiers::CONTROL) => true,
        KeyCode::Char('q') => !select_focused && key.modifiers.is_empty(),
        _ => false,
    }
}

fn default_selects() -> Vec<SelectConfig> {
    vec![
        SelectConfig {
            kind: Some(SelectKind::Dropdown),
            mode: Some(SelectMode::Single),
            id: Some("fruit".into()),
            options: vec![
                SelectOption::new("apple", "Apple").in_group("Pome"),
                SelectOption::new("pear", "Pear").in_group("Pome"),
                SelectOption::new("cherry", "Cherry").in_group("Drupe"),
                SelectOption::new("plum", "Plum").in_group("Drupe").disabled(),
            ],
            ..SelectConfig::default()
        },
        SelectConfig {
            kind: Some(SelectKind::Flat),
            mode: Some(SelectMode::Multi),
            filterable: true,
            id: Some("tags".into()),
            options: vec![
                SelectOption::new("rust", "Rust"),
                SelectOption::new("tui", "Terminal UI"),
                SelectOption::new("menus", "Menus"),
            ],
            ..SelectConfig::default()
        },
    ]
}
