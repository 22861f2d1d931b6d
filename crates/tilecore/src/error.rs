use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DefinitionError {
    #[error("failed to set up definition '{name}': {source}")]
    Definition {
        name: String,
        #[source]
        source: Box<DefinitionError>,
    },

    #[error("malformed descriptor at {path}: {source}")]
    Descriptor {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("event handler for tile definition '{definition}' must specify an event name")]
    MissingEventName { definition: String },

    #[error("event handler for tile definition '{definition}' must specify a function handler")]
    MissingEventHandler { definition: String },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store backend failure: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
