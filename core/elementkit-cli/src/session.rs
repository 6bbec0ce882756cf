//! Loads a manifest and settings, then registers the bundled components.

use std::path::Path;

use elementkit_core::{
    load_manifest, load_settings, ComponentRegistry, ConfigError, Diagnostics, Document,
    ElementError, FrameworkSettings, Registration,
};
use thiserror::Error;

use crate::catalog;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Element(#[from] ElementError),

    #[error("Invalid component configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
}

pub struct Session {
    pub document: Document,
    pub registry: ComponentRegistry,
}

impl Session {
    pub fn open(manifest: &Path, settings: Option<&Path>) -> Result<Self, CliError> {
        let settings = match settings {
            Some(path) => load_settings(path)?,
            None => FrameworkSettings::default(),
        };
        let diagnostics = Diagnostics::with_limit(settings.diagnostic_history_limit);
        let document = load_manifest(manifest)?.into_document_with(diagnostics);

        let mut registry = ComponentRegistry::new(settings);
        for config in catalog::components() {
            let tag = config.tag_identifier.clone();
            match registry.register(&document, config)? {
                Registration::Registered => tracing::debug!(tag = %tag, "Registered"),
                Registration::AlreadyRegistered => {}
                Registration::Skipped => tracing::debug!(tag = %tag, "Not on page, skipped"),
            }
        }
        Ok(Self { document, registry })
    }
}
