//! Composite select control.
//!
//! A select renders an input row (the selected label, or pills in multi
//! mode) and a menu of grouped options. The `dropdown` kind floats its menu
//! through the [`DropdownManager`]; the `flat` kind keeps the menu inline
//! under the input. Selection is mirrored into a [`HiddenSelect`] for form
//! integration.

use std::str::FromStr;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use regex::RegexBuilder;
use serde::Deserialize;
use tracing::debug;

use crate::constants::{
    ACTIVE_CLASS, DISABLED_CLASS, OPEN_CLASS, OPTION_INDEX_ATTR, SELECT_ARROW_CLASS,
    SELECT_CONTAINER_CLASS, SELECT_FILTER_CLASS, SELECT_FILTERABLE_ATTR, SELECT_GROUP_LABEL_CLASS,
    SELECT_INPUT_CLASS, SELECT_KIND_ATTR, SELECT_MENU_CLASS, SELECT_MODE_ATTR, SELECT_OPTION_CLASS,
    SELECT_PILL_CLASS, SELECT_PILL_REMOVE_CLASS, SELECTED_CLASS,
};
use crate::document::{Document, ElementId};
use crate::dropdown::{DropdownManager, OpenOptions};
use crate::events::UiEvent;
use crate::layout::{FloatRect, arrange_rows};

const DEFAULT_WIDTH: u16 = 24;
const ARROW: &str = "▾";
const PILL_REMOVE: &str = "×";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectKind {
    #[default]
    Dropdown,
    Flat,
}

impl SelectKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            SelectKind::Dropdown => "dropdown",
            SelectKind::Flat => "flat",
        }
    }
}

impl FromStr for SelectKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dropdown" => Ok(SelectKind::Dropdown),
            "flat" => Ok(SelectKind::Flat),
            other => Err(format!("unknown select type `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectMode {
    #[default]
    Single,
    Multi,
}

impl FromStr for SelectMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(SelectMode::Single),
            "multi" => Ok(SelectMode::Multi),
            other => Err(format!("unknown select mode `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub disabled: bool,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            group: None,
            disabled: false,
        }
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

/// Unset fields fall back to attributes on the select's root element.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SelectConfig {
    pub kind: Option<SelectKind>,
    pub mode: Option<SelectMode>,
    pub filterable: bool,
    pub required: bool,
    pub name: Option<String>,
    pub id: Option<String>,
    pub options: Vec<SelectOption>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiddenOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Form-facing mirror of the control's selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiddenSelect {
    pub name: String,
    pub id: String,
    pub multiple: bool,
    pub required: bool,
    pub options: Vec<HiddenOption>,
}

impl HiddenSelect {
    pub fn selected_values(&self) -> Vec<&str> {
        self.options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.value.as_str())
            .collect()
    }

    /// Missing a required value.
    pub fn is_invalid(&self) -> bool {
        self.required && !self.options.iter().any(|o| o.selected)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionGroup {
    pub label: Option<String>,
    /// Indices into the control's option list.
    pub options: Vec<usize>,
}

/// Group `indices` by their group label, groups in first-seen order.
pub fn group_options(options: &[SelectOption], indices: &[usize]) -> Vec<OptionGroup> {
    let mut groups: Vec<OptionGroup> = Vec::new();
    for &index in indices {
        let Some(option) = options.get(index) else {
            continue;
        };
        match groups.iter_mut().find(|g| g.label == option.group) {
            Some(group) => group.options.push(index),
            None => groups.push(OptionGroup {
                label: option.group.clone(),
                options: vec![index],
            }),
        }
    }
    groups
}

/// Indices of options whose label or value matches `filter`.
///
/// The filter is a case-insensitive regular expression; a pattern that does
/// not compile is matched as a plain case-insensitive substring instead.
pub fn filter_options(options: &[SelectOption], filter: &str) -> Vec<usize> {
    if filter.is_empty() {
        return (0..options.len()).collect();
    }
    let matches: Box<dyn Fn(&str) -> bool> =
        match RegexBuilder::new(filter).case_insensitive(true).build() {
            Ok(regex) => Box::new(move |text: &str| regex.is_match(text)),
            Err(_) => {
                let needle = filter.to_lowercase();
                Box::new(move |text: &str| text.to_lowercase().contains(&needle))
            }
        };
    options
        .iter()
        .enumerate()
        .filter(|(_, o)| matches(&o.label) || matches(&o.value))
        .map(|(index, _)| index)
        .collect()
}

#[derive(Debug)]
pub struct SelectControl {
    id: String,
    kind: SelectKind,
    mode: SelectMode,
    filterable: bool,
    options: Vec<SelectOption>,
    visible: Vec<usize>,
    /// Selection order.
    selected: Vec<usize>,
    filter: String,
    flat_open: bool,
    /// Position in `navigable()`.
    highlighted: Option<usize>,
    hidden: HiddenSelect,
    root: ElementId,
    container: ElementId,
    input: ElementId,
    menu: Option<ElementId>,
}

impl SelectControl {
    /// Build the control's elements under `root`, sized from `root`'s
    /// bounds.
    pub fn new(doc: &mut Document, root: ElementId, config: SelectConfig) -> Self {
        let id = doc
            .attr(root, "id")
            .map(str::to_string)
            .unwrap_or_else(|| format!("select_{}", root.index()));
        let kind = config
            .kind
            .or_else(|| doc.attr(root, SELECT_KIND_ATTR)?.parse().ok())
            .unwrap_or_default();
        let mode = config
            .mode
            .or_else(|| doc.attr(root, SELECT_MODE_ATTR)?.parse().ok())
            .unwrap_or_default();
        let filterable = config.filterable || doc.attr(root, SELECT_FILTERABLE_ATTR) == Some("true");
        let required = config.required || doc.attr(root, "required").is_some();

        let hidden = HiddenSelect {
            name: config.name.unwrap_or_else(|| id.clone()),
            id: config.id.unwrap_or_else(|| format!("{id}_hidden")),
            multiple: mode == SelectMode::Multi,
            required,
            options: config
                .options
                .iter()
                .map(|o| HiddenOption {
                    value: o.value.clone(),
                    label: o.label.clone(),
                    selected: false,
                })
                .collect(),
        };

        let container = doc.create_element();
        doc.add_class(container, SELECT_CONTAINER_CLASS);
        doc.add_class(container, kind.as_str());
        let input = doc.create_element();
        doc.add_class(input, SELECT_INPUT_CLASS);
        doc.append_child(container, input);
        doc.append_child(root, container);

        let mut control = Self {
            id,
            kind,
            mode,
            filterable,
            visible: (0..config.options.len()).collect(),
            options: config.options,
            selected: Vec::new(),
            filter: String::new(),
            flat_open: false,
            highlighted: None,
            hidden,
            root,
            container,
            input,
            menu: None,
        };
        control.render(doc);
        control
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> SelectKind {
        self.kind
    }

    pub fn mode(&self) -> SelectMode {
        self.mode
    }

    pub fn input(&self) -> ElementId {
        self.input
    }

    pub fn container(&self) -> ElementId {
        self.container
    }

    pub fn menu(&self) -> Option<ElementId> {
        self.menu
    }

    pub fn hidden(&self) -> &HiddenSelect {
        &self.hidden
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn selected_values(&self) -> Vec<&str> {
        self.selected
            .iter()
            .filter_map(|i| self.options.get(*i))
            .map(|o| o.value.as_str())
            .collect()
    }

    /// Visible options grouped as the menu shows them.
    pub fn groups(&self) -> Vec<OptionGroup> {
        group_options(&self.options, &self.visible)
    }

    /// Enabled visible options in menu order; what the keyboard moves over.
    fn navigable(&self) -> Vec<usize> {
        self.groups()
            .into_iter()
            .flat_map(|g| g.options)
            .filter(|i| self.options.get(*i).is_some_and(|o| !o.disabled))
            .collect()
    }

    pub fn highlighted_value(&self) -> Option<&str> {
        let index = *self.navigable().get(self.highlighted?)?;
        self.options.get(index).map(|o| o.value.as_str())
    }

    pub fn is_open(&self, dropdowns: &DropdownManager) -> bool {
        match self.kind {
            SelectKind::Dropdown => dropdowns.is_open(self.input),
            SelectKind::Flat => self.flat_open,
        }
    }

    fn sync_hidden(&mut self) {
        for (index, option) in self.hidden.options.iter_mut().enumerate() {
            option.selected = self.selected.contains(&index);
        }
    }

    fn origin(&self, doc: &Document) -> FloatRect {
        let origin = doc.bounds(self.root).unwrap_or_default();
        let width = if origin.width == 0 {
            DEFAULT_WIDTH
        } else {
            origin.width
        };
        FloatRect::new(origin.x, origin.y, width, 1)
    }

    /// Rebuild the input row and, for the flat kind, the inline menu. The
    /// input element itself is kept so an open dropdown stays attached to
    /// it.
    fn render(&mut self, doc: &mut Document) {
        let origin = self.origin(doc);
        for child in doc.children(self.input).to_vec() {
            doc.remove(child);
        }
        doc.set_bounds(self.input, origin);

        let mut x = origin.x;
        let mut label = String::new();
        match self.mode {
            SelectMode::Multi => {
                for &index in &self.selected {
                    let Some(option) = self.options.get(index) else {
                        continue;
                    };
                    let text_width = option.label.chars().count() as u16;
                    let pill = doc.create_element();
                    doc.add_class(pill, SELECT_PILL_CLASS);
                    doc.set_label(pill, option.label.clone());
                    doc.set_bounds(pill, FloatRect::new(x, origin.y, text_width + 2, 1));
                    let remove = doc.create_element();
                    doc.add_class(remove, SELECT_PILL_REMOVE_CLASS);
                    doc.set_label(remove, PILL_REMOVE);
                    doc.set_attr(remove, "value", option.value.clone());
                    doc.set_bounds(
                        remove,
                        FloatRect::new(x + text_width as i32 + 1, origin.y, 1, 1),
                    );
                    doc.append_child(pill, remove);
                    doc.append_child(self.input, pill);
                    x += text_width as i32 + 3;
                }
            }
            SelectMode::Single if self.filter.is_empty() => {
                label = match self.selected.first().and_then(|i| self.options.get(*i)) {
                    Some(option) => option.label.clone(),
                    None if self.filterable => "Select an option...".to_string(),
                    None => "No selection".to_string(),
                };
            }
            SelectMode::Single => {}
        }
        doc.set_label(self.input, label);

        if !self.filter.is_empty() {
            let filter = doc.create_element();
            doc.add_class(filter, SELECT_FILTER_CLASS);
            doc.set_label(filter, self.filter.clone());
            let width = (origin.right() - x).max(0) as u16;
            doc.set_bounds(filter, FloatRect::new(x, origin.y, width, 1));
            doc.append_child(self.input, filter);
        }

        let mut container_height = 1;
        match self.kind {
            SelectKind::Dropdown => {
                let arrow = doc.create_element();
                doc.add_class(arrow, SELECT_ARROW_CLASS);
                doc.set_label(arrow, ARROW);
                doc.set_bounds(arrow, FloatRect::new(origin.right() - 1, origin.y, 1, 1));
                doc.append_child(self.input, arrow);
            }
            SelectKind::Flat => {
                if let Some(old) = self.menu.take() {
                    doc.remove(old);
                }
                let menu = self.build_menu(doc);
                doc.set_bounds(menu, FloatRect::new(origin.x, origin.y + 1, origin.width, 0));
                doc.append_child(self.container, menu);
                arrange_rows(doc, menu);
                container_height += doc.bounds(menu).map_or(0, |b| b.height);
                self.menu = Some(menu);
                doc.toggle_class(self.input, OPEN_CLASS, self.flat_open);
            }
        }
        doc.set_bounds(
            self.container,
            FloatRect::new(origin.x, origin.y, origin.width, container_height),
        );
    }

    /// Detached menu element holding group labels and option rows.
    fn build_menu(&self, doc: &mut Document) -> ElementId {
        let menu = doc.create_element();
        doc.add_class(menu, SELECT_MENU_CLASS);
        doc.add_class(menu, self.kind.as_str());
        let width = self.origin(doc).width;
        doc.set_bounds(menu, FloatRect::new(0, 0, width, 0));
        for group in self.groups() {
            if let Some(label) = group.label {
                let row = doc.create_element();
                doc.add_class(row, SELECT_GROUP_LABEL_CLASS);
                doc.set_label(row, label);
                doc.append_child(menu, row);
            }
            for index in group.options {
                let Some(option) = self.options.get(index) else {
                    continue;
                };
                let row = doc.create_element();
                doc.add_class(row, SELECT_OPTION_CLASS);
                doc.set_label(row, option.label.clone());
                doc.set_attr(row, "value", option.value.clone());
                doc.set_attr(row, OPTION_INDEX_ATTR, index.to_string());
                if option.disabled {
                    doc.add_class(row, DISABLED_CLASS);
                }
                doc.append_child(menu, row);
            }
        }
        self.refresh_menu(doc, menu);
        menu
    }

    /// Update selected and highlighted classes on an existing menu.
    fn refresh_menu(&self, doc: &mut Document, menu: ElementId) {
        let active = self
            .highlighted
            .and_then(|h| self.navigable().get(h).copied());
        for row in doc.query_class(menu, SELECT_OPTION_CLASS) {
            let index = doc
                .attr(row, OPTION_INDEX_ATTR)
                .and_then(|v| v.parse::<usize>().ok());
            let selected = index.is_some_and(|i| self.selected.contains(&i));
            doc.toggle_class(row, SELECTED_CLASS, selected);
            doc.toggle_class(row, ACTIVE_CLASS, index.is_some() && index == active);
        }
    }

    fn refresh_current_menu(&self, doc: &mut Document) {
        if let Some(menu) = self.menu {
            self.refresh_menu(doc, menu);
        }
    }

    /// Returns false when already open.
    pub fn open(&mut self, doc: &mut Document, dropdowns: &mut DropdownManager) -> bool {
        match self.kind {
            SelectKind::Dropdown => {
                if dropdowns.is_open(self.input) {
                    return false;
                }
                if let Some(stale) = self.menu.take() {
                    doc.remove(stale);
                }
                let menu = self.build_menu(doc);
                if !dropdowns.open(doc, self.input, OpenOptions::new().content(menu)) {
                    doc.remove(menu);
                    return false;
                }
                self.menu = Some(menu);
            }
            SelectKind::Flat => {
                if self.flat_open {
                    return false;
                }
                self.flat_open = true;
                doc.add_class(self.input, OPEN_CLASS);
            }
        }
        debug!(select = %self.id, "select opened");
        true
    }

    pub fn close(&mut self, doc: &mut Document, dropdowns: &mut DropdownManager) -> bool {
        self.highlighted = None;
        match self.kind {
            SelectKind::Dropdown => dropdowns.close(doc, self.input),
            SelectKind::Flat => {
                let was_open = self.flat_open;
                self.flat_open = false;
                doc.remove_class(self.input, OPEN_CLASS);
                self.refresh_current_menu(doc);
                was_open
            }
        }
    }

    /// Activate option `index`. Single mode replaces the selection (or
    /// clears it when the option was already selected) and closes the menu;
    /// multi mode toggles membership. Disabled options are ignored.
    pub fn select_option(
        &mut self,
        doc: &mut Document,
        dropdowns: &mut DropdownManager,
        index: usize,
    ) -> bool {
        let Some(option) = self.options.get(index) else {
            return false;
        };
        if option.disabled {
            return false;
        }
        debug!(select = %self.id, value = %option.value, "option activated");
        match self.mode {
            SelectMode::Single => {
                if self.selected == [index] {
                    self.selected.clear();
                } else {
                    self.selected = vec![index];
                }
                self.sync_hidden();
                if self.kind == SelectKind::Dropdown {
                    self.highlighted = None;
                    dropdowns.close(doc, self.input);
                }
                self.render(doc);
            }
            SelectMode::Multi => {
                match self.selected.iter().position(|i| *i == index) {
                    Some(pos) => {
                        self.selected.remove(pos);
                    }
                    None => self.selected.push(index),
                }
                self.sync_hidden();
                self.render(doc);
                self.refresh_current_menu(doc);
            }
        }
        true
    }

    /// Select the option with `value`.
    pub fn select_value(
        &mut self,
        doc: &mut Document,
        dropdowns: &mut DropdownManager,
        value: &str,
    ) -> bool {
        match self.options.iter().position(|o| o.value == value) {
            Some(index) => self.select_option(doc, dropdowns, index),
            None => false,
        }
    }

    /// Drop `value` from the selection, as the pill remove button does.
    pub fn remove_value(&mut self, doc: &mut Document, value: &str) -> bool {
        let Some(pos) = self
            .selected
            .iter()
            .position(|i| self.options.get(*i).is_some_and(|o| o.value == value))
        else {
            return false;
        };
        self.selected.remove(pos);
        self.sync_hidden();
        self.render(doc);
        self.refresh_current_menu(doc);
        true
    }

    fn remove_last(&mut self, doc: &mut Document) -> bool {
        if self.selected.pop().is_none() {
            return false;
        }
        self.sync_hidden();
        self.render(doc);
        self.refresh_current_menu(doc);
        true
    }

    /// Narrow the menu to matching options. An open dropdown menu is rebuilt
    /// and remounted.
    pub fn set_filter(
        &mut self,
        doc: &mut Document,
        dropdowns: &mut DropdownManager,
        filter: impl Into<String>,
    ) {
        self.filter = filter.into();
        self.visible = filter_options(&self.options, &self.filter);
        self.highlighted = None;
        self.render(doc);
        if self.kind == SelectKind::Dropdown && dropdowns.is_open(self.input) {
            dropdowns.close(doc, self.input);
            self.open(doc, dropdowns);
        }
    }

    fn move_highlight(&mut self, doc: &mut Document, delta: isize) {
        let count = self.navigable().len();
        if count == 0 {
            return;
        }
        let next = match self.highlighted {
            None if delta >= 0 => 0,
            None => count - 1,
            Some(current) => (current as isize + delta).rem_euclid(count as isize) as usize,
        };
        self.highlighted = Some(next);
        self.refresh_current_menu(doc);
    }

    pub fn handle_key(
        &mut self,
        doc: &mut Document,
        dropdowns: &mut DropdownManager,
        key: KeyEvent,
    ) -> bool {
        if key.kind == KeyEventKind::Release {
            return false;
        }
        let open = self.is_open(dropdowns);
        // The menu may have been closed from outside (outside press, close_all).
        if !open && self.highlighted.take().is_some() {
            self.refresh_current_menu(doc);
        }
        match key.code {
            KeyCode::Down | KeyCode::Up if !open => {
                self.open(doc, dropdowns);
                true
            }
            KeyCode::Down => {
                self.move_highlight(doc, 1);
                true
            }
            KeyCode::Up => {
                self.move_highlight(doc, -1);
                true
            }
            KeyCode::Enter => {
                let Some(index) = self
                    .highlighted
                    .and_then(|h| self.navigable().get(h).copied())
                else {
                    return false;
                };
                self.select_option(doc, dropdowns, index)
            }
            KeyCode::Esc => {
                self.close(doc, dropdowns);
                true
            }
            KeyCode::Backspace if self.filterable && !self.filter.is_empty() => {
                let mut filter = self.filter.clone();
                filter.pop();
                self.set_filter(doc, dropdowns, filter);
                true
            }
            KeyCode::Backspace if self.mode == SelectMode::Multi => self.remove_last(doc),
            KeyCode::Char(c)
                if self.filterable
                    && !key
                        .modifiers
                        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                let filter = format!("{}{c}", self.filter);
                self.set_filter(doc, dropdowns, filter);
                true
            }
            _ => false,
        }
    }

    fn handle_click(
        &mut self,
        doc: &mut Document,
        dropdowns: &mut DropdownManager,
        target: ElementId,
    ) -> bool {
        if let Some(remove) = doc.closest_with_class(target, SELECT_PILL_REMOVE_CLASS)
            && doc.contains(self.input, remove)
        {
            let value = doc.attr(remove, "value").unwrap_or_default().to_string();
            return self.remove_value(doc, &value);
        }
        if let Some(menu) = self.menu
            && doc.contains(menu, target)
        {
            let index = doc
                .closest_with_class(target, SELECT_OPTION_CLASS)
                .and_then(|row| doc.attr(row, OPTION_INDEX_ATTR))
                .and_then(|v| v.parse::<usize>().ok());
            return match index {
                Some(index) => self.select_option(doc, dropdowns, index),
                None => false,
            };
        }
        if doc.contains(self.input, target) {
            if self.is_open(dropdowns) {
                self.close(doc, dropdowns);
            } else {
                self.open(doc, dropdowns);
            }
            return true;
        }
        false
    }

    /// Route a click or key event to the control. Returns true when the
    /// event was meant for this control.
    pub fn handle_event(
        &mut self,
        doc: &mut Document,
        dropdowns: &mut DropdownManager,
        event: &UiEvent,
    ) -> bool {
        match event {
            UiEvent::Click { target, .. } => self.handle_click(doc, dropdowns, *target),
            UiEvent::Key {
                target: Some(target),
                key,
            } if self.owns(doc, *target) => self.handle_key(doc, dropdowns, *key),
            _ => false,
        }
    }

    /// Whether `element` belongs to this control, floating menu included.
    pub fn owns(&self, doc: &Document, element: ElementId) -> bool {
        doc.contains(self.container, element)
            || self.menu.is_some_and(|menu| doc.contains(menu, element))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Viewport;

    fn fruit() -> Vec<SelectOption> {
        vec![
            SelectOption::new("apple", "Apple").in_group("Pome"),
            SelectOption::new("cherry", "Cherry").in_group("Drupe"),
            SelectOption::new("pear", "Pear").in_group("Pome"),
            SelectOption::new("kiwi", "Kiwi"),
        ]
    }

    fn setup(config: SelectConfig) -> (Document, DropdownManager, SelectControl) {
        let mut doc = Document::new(Viewport::new(80, 24));
        let root = doc.create_element();
        doc.set_bounds(root, FloatRect::new(6, 6, 20, 1));
        let doc_root = doc.root();
        doc.append_child(doc_root, root);
        let control = SelectControl::new(&mut doc, root, config);
        (doc, DropdownManager::default(), control)
    }

    fn click(target: ElementId) -> UiEvent {
        UiEvent::Click {
            target,
            column: 0,
            row: 0,
        }
    }

    fn option_row(doc: &Document, control: &SelectControl, value: &str) -> ElementId {
        let menu = control.menu().expect("menu built");
        doc.query_class(menu, SELECT_OPTION_CLASS)
            .into_iter()
            .find(|row| doc.attr(*row, "value") == Some(value))
            .expect("option row")
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn groups_keep_first_seen_order() {
        let options = fruit();
        let groups = group_options(&options, &[0, 1, 2, 3]);
        let labels: Vec<Option<&str>> = groups.iter().map(|g| g.label.as_deref()).collect();
        assert_eq!(labels, vec![Some("Pome"), Some("Drupe"), None]);
        assert_eq!(groups[0].options, vec![0, 2]);
    }

    #[test]
    fn filter_is_case_insensitive_with_substring_fallback() {
        let mut options = fruit();
        options.push(SelectOption::new("fx", "f(x)"));
        assert_eq!(filter_options(&options, "^P"), vec![2]);
        assert_eq!(filter_options(&options, "ERR"), vec![1]);
        // "(x" does not compile as a pattern
        assert_eq!(filter_options(&options, "(x"), vec![4]);
        assert_eq!(filter_options(&options, "").len(), 5);
    }

    #[test]
    fn single_select_toggles_to_empty() {
        let (mut doc, mut dropdowns, mut control) = setup(SelectConfig {
            kind: Some(SelectKind::Flat),
            options: fruit(),
            ..SelectConfig::default()
        });
        let row = option_row(&doc, &control, "pear");
        assert!(control.handle_event(&mut doc, &mut dropdowns, &click(row)));
        assert_eq!(control.selected_values(), vec!["pear"]);
        assert_eq!(doc.label(control.input()), "Pear");

        let row = option_row(&doc, &control, "pear");
        assert!(doc.has_class(row, SELECTED_CLASS));
        control.handle_event(&mut doc, &mut dropdowns, &click(row));
        assert!(control.selected_values().is_empty());
        assert!(control.hidden().selected_values().is_empty());
        assert_eq!(doc.label(control.input()), "No selection");
    }

    #[test]
    fn multi_select_removes_only_reselected_option() {
        let (mut doc, mut dropdowns, mut control) = setup(SelectConfig {
            kind: Some(SelectKind::Flat),
            mode: Some(SelectMode::Multi),
            options: fruit(),
            ..SelectConfig::default()
        });
        for value in ["apple", "kiwi", "cherry", "kiwi"] {
            assert!(control.select_value(&mut doc, &mut dropdowns, value));
        }
        assert_eq!(control.selected_values(), vec!["apple", "cherry"]);
        assert!(control.hidden().multiple);
    }

    #[test]
    fn pill_remove_updates_selection_and_hidden_mirror() {
        let (mut doc, mut dropdowns, mut control) = setup(SelectConfig {
            mode: Some(SelectMode::Multi),
            options: vec![
                SelectOption::new("x", "Ex"),
                SelectOption::new("y", "Why"),
                SelectOption::new("z", "Zed"),
            ],
            ..SelectConfig::default()
        });
        assert!(control.handle_event(&mut doc, &mut dropdowns, &click(control.input())));
        assert!(control.is_open(&dropdowns));

        for value in ["x", "y"] {
            let row = option_row(&doc, &control, value);
            control.handle_event(&mut doc, &mut dropdowns, &click(row));
        }
        // multi mode keeps the dropdown open
        assert!(control.is_open(&dropdowns));
        assert_eq!(
            doc.query_class(control.input(), SELECT_PILL_CLASS).len(),
            2
        );

        let remove_x = doc
            .query_class(control.input(), SELECT_PILL_REMOVE_CLASS)
            .into_iter()
            .find(|el| doc.attr(*el, "value") == Some("x"))
            .expect("pill for x");
        assert!(control.handle_event(&mut doc, &mut dropdowns, &click(remove_x)));
        assert_eq!(control.selected_values(), vec!["y"]);
        assert_eq!(control.hidden().selected_values(), vec!["y"]);
        assert!(!doc.has_class(option_row(&doc, &control, "x"), SELECTED_CLASS));
    }

    #[test]
    fn dropdown_single_select_closes_after_choice() {
        let (mut doc, mut dropdowns, mut control) = setup(SelectConfig {
            options: fruit(),
            ..SelectConfig::default()
        });
        control.open(&mut doc, &mut dropdowns);
        let menu = control.menu().expect("menu");
        assert_eq!(dropdowns.panel_for(control.input()), Some(menu));
        // the menu hangs directly below the input
        assert_eq!(doc.bounds(menu).map(|b| (b.x, b.y)), Some((6, 7)));

        let row = option_row(&doc, &control, "kiwi");
        control.handle_event(&mut doc, &mut dropdowns, &click(row));
        assert!(!control.is_open(&dropdowns));
        assert_eq!(control.hidden().selected_values(), vec!["kiwi"]);
    }

    #[test]
    fn keyboard_navigation_skips_disabled_and_wraps() {
        let (mut doc, mut dropdowns, mut control) = setup(SelectConfig {
            options: vec![
                SelectOption::new("a", "A"),
                SelectOption::new("b", "B").disabled(),
                SelectOption::new("c", "C"),
            ],
            ..SelectConfig::default()
        });
        // arrow on a closed select only opens it
        assert!(control.handle_key(&mut doc, &mut dropdowns, key(KeyCode::Down)));
        assert!(control.is_open(&dropdowns));
        assert_eq!(control.highlighted_value(), None);

        control.handle_key(&mut doc, &mut dropdowns, key(KeyCode::Down));
        assert_eq!(control.highlighted_value(), Some("a"));
        control.handle_key(&mut doc, &mut dropdowns, key(KeyCode::Down));
        assert_eq!(control.highlighted_value(), Some("c"));
        control.handle_key(&mut doc, &mut dropdowns, key(KeyCode::Down));
        assert_eq!(control.highlighted_value(), Some("a"));
        control.handle_key(&mut doc, &mut dropdowns, key(KeyCode::Up));
        assert_eq!(control.highlighted_value(), Some("c"));
        assert!(doc.has_class(option_row(&doc, &control, "c"), ACTIVE_CLASS));

        assert!(control.handle_key(&mut doc, &mut dropdowns, key(KeyCode::Enter)));
        assert_eq!(control.selected_values(), vec!["c"]);
        assert!(!control.is_open(&dropdowns));

        control.handle_key(&mut doc, &mut dropdowns, key(KeyCode::Up));
        assert!(control.handle_key(&mut doc, &mut dropdowns, key(KeyCode::Esc)));
        assert!(!control.is_open(&dropdowns));
    }

    #[test]
    fn enter_after_outside_close_selects_nothing() {
        let (mut doc, mut dropdowns, mut control) = setup(SelectConfig {
            options: vec![SelectOption::new("a", "A"), SelectOption::new("b", "B")],
            ..SelectConfig::default()
        });
        control.handle_key(&mut doc, &mut dropdowns, key(KeyCode::Down));
        control.handle_key(&mut doc, &mut dropdowns, key(KeyCode::Down));
        assert_eq!(control.highlighted_value(), Some("a"));

        let elsewhere = doc.create_element();
        doc.set_bounds(elsewhere, FloatRect::new(60, 20, 4, 1));
        let doc_root = doc.root();
        doc.append_child(doc_root, elsewhere);
        dropdowns.dispatch(
            &mut doc,
            &UiEvent::PointerDown {
                kind: crate::events::PointerKind::Mouse,
                target: elsewhere,
                column: 60,
                row: 20,
            },
        );
        assert!(!control.is_open(&dropdowns));

        assert!(!control.handle_key(&mut doc, &mut dropdowns, key(KeyCode::Enter)));
        assert!(control.selected_values().is_empty());
        assert_eq!(control.highlighted_value(), None);
    }

    #[test]
    fn typing_filters_and_rebuilds_open_menu() {
        let (mut doc, mut dropdowns, mut control) = setup(SelectConfig {
            filterable: true,
            options: fruit(),
            ..SelectConfig::default()
        });
        control.open(&mut doc, &mut dropdowns);
        let before = control.menu().expect("menu");
        for c in ['P', 'e'] {
            control.handle_key(&mut doc, &mut dropdowns, key(KeyCode::Char(c)));
        }
        assert_eq!(control.filter(), "Pe");
        assert!(control.is_open(&dropdowns));
        let after = control.menu().expect("menu");
        assert_ne!(before, after);
        let rows = doc.query_class(after, SELECT_OPTION_CLASS);
        assert_eq!(rows.len(), 1);
        assert_eq!(doc.attr(rows[0], "value"), Some("pear"));

        control.handle_key(&mut doc, &mut dropdowns, key(KeyCode::Backspace));
        assert_eq!(control.filter(), "P");
        let rows = doc.query_class(control.menu().expect("menu"), SELECT_OPTION_CLASS);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn backspace_with_empty_filter_pops_last_selection() {
        let (mut doc, mut dropdowns, mut control) = setup(SelectConfig {
            kind: Some(SelectKind::Flat),
            mode: Some(SelectMode::Multi),
            options: fruit(),
            ..SelectConfig::default()
        });
        control.select_value(&mut doc, &mut dropdowns, "kiwi");
        control.select_value(&mut doc, &mut dropdowns, "apple");
        assert!(control.handle_key(&mut doc, &mut dropdowns, key(KeyCode::Backspace)));
        assert_eq!(control.selected_values(), vec!["kiwi"]);
    }

    #[test]
    fn root_attributes_fill_unset_config() {
        let mut doc = Document::new(Viewport::new(80, 24));
        let root = doc.create_element();
        doc.set_attr(root, "id", "fruit");
        doc.set_attr(root, SELECT_KIND_ATTR, "flat");
        doc.set_attr(root, SELECT_MODE_ATTR, "multi");
        doc.set_attr(root, "required", "");
        let control = SelectControl::new(
            &mut doc,
            root,
            SelectConfig {
                options: fruit(),
                ..SelectConfig::default()
            },
        );
        assert_eq!(control.kind(), SelectKind::Flat);
        assert_eq!(control.mode(), SelectMode::Multi);
        assert_eq!(control.hidden().name, "fruit");
        assert_eq!(control.hidden().id, "fruit_hidden");
        assert!(control.hidden().is_invalid());
    }

    #[test]
    fn config_deserializes_from_toml() {
        let config: SelectConfig = toml::from_str(indoc::indoc! {r#"
            kind = "flat"
            mode = "multi"
            filterable = true
            name = "fruit"

            [[options]]
            value = "apple"
            label = "Apple"
            group = "Pome"

            [[options]]
            value = "kiwi"
            label = "Kiwi"
            disabled = true
        "#})
        .expect("valid config");
        assert_eq!(config.kind, Some(SelectKind::Flat));
        assert_eq!(config.mode, Some(SelectMode::Multi));
        assert!(config.options[1].disabled);
        assert_eq!(config.options[0].group.as_deref(), Some("Pome"));
    }
}
