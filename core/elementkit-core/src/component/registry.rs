//! Tag-to-definition bindings for one host environment.
//!
//! One registry per document keeps tests isolated; there is no process-wide
//! table. Registration is idempotent per tag and lazy: a tag with no host in
//! the document is skipped unless settings disable lazy registration.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{ConfigError, ElementError, Result};
use crate::host::{Document, HostNode};
use crate::settings::FrameworkSettings;

use super::configuration::ComponentConfiguration;
use super::definition::ComponentDefinition;
use super::instance::ComponentInstance;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Registered,
    /// The tag was already bound; the new configuration was ignored.
    AlreadyRegistered,
    /// No host with this tag exists in the document.
    Skipped,
}

#[derive(Debug, Default)]
pub struct ComponentRegistry {
    settings: FrameworkSettings,
    definitions: IndexMap<String, Arc<ComponentDefinition>>,
}

impl ComponentRegistry {
    pub fn new(settings: FrameworkSettings) -> Self {
        Self {
            settings,
            definitions: IndexMap::new(),
        }
    }

    pub fn settings(&self) -> &FrameworkSettings {
        &self.settings
    }

    /// Binds and registers a configuration against the document.
    ///
    /// The configuration is always validated first, so a malformed one fails
    /// even when registration would otherwise be a no-op.
    pub fn register(
        &mut self,
        document: &Document,
        config: ComponentConfiguration,
    ) -> std::result::Result<Registration, ConfigError> {
        config.validate()?;
        let tag = config.tag_identifier.clone();

        if self.definitions.contains_key(&tag) {
            tracing::debug!(tag = %tag, "Component already registered");
            return Ok(Registration::AlreadyRegistered);
        }
        if self.settings.lazy_registration && !document.contains_tag(&tag) {
            tracing::debug!(tag = %tag, "No instance in document; registration skipped");
            return Ok(Registration::Skipped);
        }

        let definition = ComponentDefinition::bind(config, &self.settings)?;
        self.definitions.insert(tag.clone(), Arc::new(definition));
        tracing::info!(tag = %tag, "Registered component");
        Ok(Registration::Registered)
    }

    pub fn definition(&self, tag: &str) -> Option<&Arc<ComponentDefinition>> {
        self.definitions.get(tag)
    }

    pub fn is_registered(&self, tag: &str) -> bool {
        self.definitions.contains_key(tag)
    }

    pub fn observed_attributes(&self, tag: &str) -> Vec<&str> {
        self.definitions
            .get(tag)
            .map(|d| d.observed_attributes())
            .unwrap_or_default()
    }

    /// Registered tags in registration order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Creates an instance for a single host.
    pub fn instantiate(&self, host: HostNode) -> Result<ComponentInstance> {
        let definition = self
            .definitions
            .get(host.tag_name())
            .ok_or_else(|| ElementError::UnknownTag(host.tag_name().to_string()))?;
        Ok(ComponentInstance::new(Arc::clone(definition), host))
    }

    /// Moves every host with a registered tag out of the document into a new
    /// instance, grouped by registration order.
    pub fn connect(&self, document: &mut Document) -> Vec<ComponentInstance> {
        let mut instances = Vec::new();
        for (tag, definition) in &self.definitions {
            for host in document.take_tag(tag) {
                instances.push(ComponentInstance::new(Arc::clone(definition), host));
            }
        }
        tracing::debug!(instances = instances.len(), "Connected document hosts");
        instances
    }
}
