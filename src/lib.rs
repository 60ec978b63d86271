//! Floating dropdown menus and select controls for terminal UIs.
//!
//! The toolkit works on a headless [`document::Document`]: the host lays out
//! elements, feeds terminal input through [`events::translate`], and lets the
//! [`dropdown::DropdownManager`] and [`select::SelectControl`]s react. Panels
//! are positioned by [`layout::calculate_position`] and mounted in the
//! [`portal`] so they paint above page content.

pub mod app;
pub mod click_outside;
pub mod config;
pub mod constants;
pub mod document;
pub mod drivers;
pub mod dropdown;
pub mod error;
pub mod event_loop;
pub mod events;
pub mod layout;
pub mod portal;
pub mod render;
pub mod select;
pub mod templates;
pub mod theme;
pub mod tracing_sub;
pub mod ui;
pub mod viewport;
