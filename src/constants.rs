//! Shared crate-wide constants.

/// Minimum number of cells a floating panel keeps between itself and the
/// viewport edges after placement.
pub const PLACEMENT_MARGIN: i32 = 4;

/// Class added to every panel mounted by the dropdown manager.
pub const PANEL_CLASS: &str = "dropdown_instance";

/// Class marking elements that open a dropdown when clicked. Triggers found
/// inside an open panel are wired automatically.
pub const TRIGGER_CLASS: &str = "dropdown_trigger";

/// Class carried by a trigger while its panel is open.
pub const OPEN_CLASS: &str = "dropdown_open";

/// Trigger attribute naming the template to clone when no content is given.
pub const TEMPLATE_ATTR: &str = "dropdown_id";

/// Trigger attribute selecting the preferred horizontal placement.
pub const MODE_ATTR: &str = "dropdown_mode";

/// Element id of the shared portal root.
pub const PORTAL_ROOT_ID: &str = "ui_portal";

/// Element id of the shared hidden container holding loaded templates.
pub const TEMPLATES_ID: &str = "templates";

/// Element classes used by select controls.
pub const SELECT_CONTAINER_CLASS: &str = "select_container";
pub const SELECT_INPUT_CLASS: &str = "select_input";
pub const SELECT_ARROW_CLASS: &str = "select_arrow";
pub const SELECT_FILTER_CLASS: &str = "select_filter";
pub const SELECT_PILL_CLASS: &str = "select_pill";
pub const SELECT_PILL_REMOVE_CLASS: &str = "select_pill_remove";
pub const SELECT_MENU_CLASS: &str = "select_menu";
pub const SELECT_GROUP_LABEL_CLASS: &str = "select_group_label";
pub const SELECT_OPTION_CLASS: &str = "select_option";
pub const SELECTED_CLASS: &str = "selected";
pub const DISABLED_CLASS: &str = "disabled";
pub const ACTIVE_CLASS: &str = "active";

/// Attribute on option rows holding the option's position in the control.
pub const OPTION_INDEX_ATTR: &str = "option_index";

/// Select root attributes read when the config leaves a field unset.
pub const SELECT_KIND_ATTR: &str = "select_type";
pub const SELECT_MODE_ATTR: &str = "select_mode";
pub const SELECT_FILTERABLE_ATTR: &str = "select_filterable";
