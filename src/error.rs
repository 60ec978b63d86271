//! Error types for the toolkit.
//!
//! Interaction paths (`open`, `close`, selection) never surface errors: they
//! log and leave state untouched. These types cover the fallible edges,
//! loading templates and configuration.

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("template `{0}` not found")]
    NotFound(String),

    #[error("template `{0}` has no content")]
    Empty(String),

    #[error("failed to load templates from `{url}`: {reason}")]
    Fetch { url: String, reason: String },

    #[error("failed to parse templates from `{url}`: {source}")]
    Parse {
        url: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum MenuError {
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, MenuError>;
