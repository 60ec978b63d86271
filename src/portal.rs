//! Layered mount surface for floating content.
//!
//! Floating panels are moved out of their natural place in the document into
//! a shared `ui_portal` root appended after all page content. The root holds
//! one child per [`Layer`]; since later siblings paint above earlier ones,
//! layer order is stacking order, and inside a layer later mounts land on
//! top.

use std::collections::BTreeMap;
use std::fmt;

use tracing::warn;

use crate::constants::PORTAL_ROOT_ID;
use crate::document::{Document, ElementId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Tooltips,
    Toasts,
    Dropdowns,
    Dialogs,
    Sidebars,
}

impl Layer {
    /// Bottom to top.
    pub const ALL: [Layer; 5] = [
        Layer::Tooltips,
        Layer::Toasts,
        Layer::Dropdowns,
        Layer::Dialogs,
        Layer::Sidebars,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Layer::Tooltips => "tooltips_portal",
            Layer::Toasts => "toasts_portal",
            Layer::Dropdowns => "dropdowns_portal",
            Layer::Dialogs => "dialogs_portal",
            Layer::Sidebars => "sidebars_portal",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Default)]
pub struct MountSurface {
    root: Option<ElementId>,
    layers: BTreeMap<Layer, ElementId>,
}

impl MountSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<ElementId> {
        self.root
    }

    pub fn layer(&self, layer: Layer) -> Option<ElementId> {
        self.layers.get(&layer).copied()
    }

    /// Create the portal root and every layer on first use; later calls
    /// reuse them. A root that was detached from the document is put back.
    pub fn ensure(&mut self, doc: &mut Document) -> ElementId {
        let root = match self.root.filter(|r| doc.exists(*r)) {
            Some(root) => root,
            None => {
                let root = doc.find_by_id(PORTAL_ROOT_ID).unwrap_or_else(|| {
                    let root = doc.create_element();
                    doc.set_attr(root, "id", PORTAL_ROOT_ID);
                    root
                });
                self.root = Some(root);
                self.layers.clear();
                for layer in Layer::ALL {
                    let el = self.create_layer(doc, root, layer);
                    self.layers.insert(layer, el);
                }
                root
            }
        };
        if !doc.is_attached(root) {
            let doc_root = doc.root();
            doc.append_child(doc_root, root);
        }
        root
    }

    fn create_layer(&self, doc: &mut Document, root: ElementId, layer: Layer) -> ElementId {
        if let Some(existing) = doc
            .children(root)
            .iter()
            .copied()
            .find(|c| doc.attr(*c, "id") == Some(layer.name()))
        {
            return existing;
        }
        let el = doc.create_element();
        doc.set_attr(el, "id", layer.name());
        doc.append_child(root, el);
        el
    }

    /// Append `element` as the topmost child of `layer`. A layer that has
    /// gone missing is recreated in its stacking position.
    pub fn mount_to_layer(&mut self, doc: &mut Document, element: ElementId, layer: Layer) {
        let root = self.ensure(doc);
        let layer_el = match self.layers.get(&layer).copied() {
            Some(el) if doc.parent(el) == Some(root) => el,
            _ => {
                warn!(layer = %layer, "portal layer not found, creating it");
                let el = doc.create_element();
                doc.set_attr(el, "id", layer.name());
                doc.append_child(root, el);
                self.layers.insert(layer, el);
                self.restore_layer_order(doc, root);
                el
            }
        };
        doc.append_child(layer_el, element);
    }

    fn restore_layer_order(&self, doc: &mut Document, root: ElementId) {
        for layer in Layer::ALL {
            if let Some(el) = self.layers.get(&layer).copied()
                && doc.parent(el) == Some(root)
            {
                doc.append_child(root, el);
            }
        }
    }

    /// Detach `element` from wherever it is mounted. Safe on elements that
    /// are not mounted.
    pub fn unmount(&mut self, doc: &mut Document, element: ElementId) {
        doc.detach(element);
    }

    /// Which layer, if any, currently holds `element`.
    pub fn layer_of(&self, doc: &Document, element: ElementId) -> Option<Layer> {
        self.layers
            .iter()
            .find(|(_, el)| **el != element && doc.contains(**el, element))
            .map(|(layer, _)| *layer)
    }
}
