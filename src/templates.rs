//! Menu templates: declarative subtrees that dropdown triggers clone on open.
//!
//! Templates live under one hidden `templates` container in the document.
//! Each template is an element carrying the template id whose first child is
//! the content root; cloning copies that child, never the template itself.
//!
//! External template files use TOML:
//!
//! ```toml
//! [[template]]
//! id = "file_menu"
//! [template.root]
//! class = ["menu"]
//! [[template.root.children]]
//! label = "Recent"
//! class = ["dropdown_trigger"]
//! attrs = { dropdown_id = "recent_menu" }
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::constants::TEMPLATES_ID;
use crate::document::{Document, ElementId};
use crate::error::TemplateError;
use crate::layout::FloatRect;

/// Where template markup comes from.
pub trait TemplateSource {
    fn fetch(&mut self, url: &str) -> Result<String, TemplateError>;
}

/// Reads template files relative to a base directory.
#[derive(Debug, Clone, Default)]
pub struct FsTemplateSource {
    base: PathBuf,
}

impl FsTemplateSource {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }
}

impl TemplateSource for FsTemplateSource {
    fn fetch(&mut self, url: &str) -> Result<String, TemplateError> {
        let path = self.base.join(url);
        fs::read_to_string(&path).map_err(|err| TemplateError::Fetch {
            url: url.to_string(),
            reason: err.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct TemplateFile {
    #[serde(default, rename = "template")]
    templates: Vec<TemplateSpec>,
}

#[derive(Debug, Deserialize)]
struct TemplateSpec {
    id: String,
    root: Option<NodeSpec>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NodeSpec {
    pub label: String,
    pub class: Vec<String>,
    pub attrs: BTreeMap<String, String>,
    pub width: Option<u16>,
    pub height: Option<u16>,
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    /// Create the described subtree as a detached element.
    pub fn build(&self, doc: &mut Document) -> ElementId {
        let el = doc.create_element();
        doc.set_label(el, self.label.clone());
        for class in &self.class {
            doc.add_class(el, class);
        }
        for (name, value) in &self.attrs {
            doc.set_attr(el, name, value.clone());
        }
        doc.set_bounds(
            el,
            FloatRect::new(0, 0, self.width.unwrap_or(0), self.height.unwrap_or(0)),
        );
        for child in &self.children {
            let child_el = child.build(doc);
            doc.append_child(el, child_el);
        }
        el
    }
}

#[derive(Debug, Default)]
pub struct TemplateLoader {
    loaded_urls: HashSet<String>,
    container: Option<ElementId>,
}

impl TemplateLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared hidden container, created on first use.
    pub fn container(&mut self, doc: &mut Document) -> ElementId {
        if let Some(container) = self.container.filter(|c| doc.is_attached(*c)) {
            return container;
        }
        let container = doc.find_by_id(TEMPLATES_ID).unwrap_or_else(|| {
            let container = doc.create_element();
            doc.set_attr(container, "id", TEMPLATES_ID);
            doc.set_hidden(container, true);
            let root = doc.root();
            doc.append_child(root, container);
            container
        });
        self.container = Some(container);
        container
    }

    /// Register `content` (detached) as the template `id`.
    pub fn define(&mut self, doc: &mut Document, id: &str, content: ElementId) -> ElementId {
        let container = self.container(doc);
        let template = doc.create_element();
        doc.set_attr(template, "id", id);
        doc.append_child(template, content);
        doc.append_child(container, template);
        template
    }

    /// Clone the content of template `id`. The template is left untouched.
    pub fn load_from_dom(&self, doc: &mut Document, id: &str) -> Option<ElementId> {
        match self.try_load_from_dom(doc, id) {
            Ok(content) => Some(content),
            Err(err) => {
                warn!(template = id, "{err}");
                None
            }
        }
    }

    pub fn try_load_from_dom(&self, doc: &mut Document, id: &str) -> Result<ElementId, TemplateError> {
        let template = doc
            .find_by_id(id)
            .ok_or_else(|| TemplateError::NotFound(id.to_string()))?;
        let content = doc
            .children(template)
            .first()
            .copied()
            .ok_or_else(|| TemplateError::Empty(id.to_string()))?;
        doc.deep_clone(content)
            .ok_or_else(|| TemplateError::Empty(id.to_string()))
    }

    pub fn is_loaded(&self, url: &str) -> bool {
        self.loaded_urls.contains(url)
    }

    /// Fetch a template file and add its templates to the document.
    ///
    /// Each url is loaded at most once; repeated calls return `Ok(0)`.
    /// Failures are logged and leave the document unchanged.
    pub fn load_external(
        &mut self,
        doc: &mut Document,
        source: &mut dyn TemplateSource,
        url: &str,
    ) -> Result<usize, TemplateError> {
        if self.is_loaded(url) {
            debug!(url, "templates already loaded");
            return Ok(0);
        }
        let markup = source.fetch(url).inspect_err(|err| {
            error!(url, "{err}");
        })?;
        self.load_markup(doc, url, &markup)
    }

    /// Parse template markup already in memory, recording it under `url`.
    pub fn load_markup(
        &mut self,
        doc: &mut Document,
        url: &str,
        markup: &str,
    ) -> Result<usize, TemplateError> {
        if self.is_loaded(url) {
            return Ok(0);
        }
        let file: TemplateFile = toml::from_str(markup).map_err(|source| {
            let err = TemplateError::Parse {
                url: url.to_string(),
                source,
            };
            error!(url, "{err}");
            err
        })?;
        let mut count = 0;
        for spec in &file.templates {
            let Some(root) = &spec.root else {
                warn!(template = %spec.id, url, "template has no root, skipping");
                continue;
            };
            let content = root.build(doc);
            self.define(doc, &spec.id, content);
            count += 1;
        }
        self.loaded_urls.insert(url.to_string());
        debug!(url, count, "templates loaded");
        Ok(count)
    }
}
