//! A validated configuration bound to the engine.
//!
//! Binding is the construction gate: the configuration's shape is checked
//! once, and the observer dispatch table is built once and shared read-only
//! by every instance.

use std::fmt;

use crate::attributes::DispatchTable;
use crate::error::ConfigError;
use crate::settings::FrameworkSettings;
use crate::slots::{SlotContract, SlotValidator};

use super::configuration::{ComponentConfiguration, Factory, LifecycleHooks};

pub struct ComponentDefinition {
    tag: String,
    factory: Factory,
    slot_contract: SlotContract,
    dispatch: DispatchTable,
    hooks: LifecycleHooks,
    validator: SlotValidator,
}

impl ComponentDefinition {
    pub fn bind(
        config: ComponentConfiguration,
        settings: &FrameworkSettings,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let ComponentConfiguration {
            tag_identifier,
            factory,
            slot_contract,
            attribute_observers,
            lifecycle_hooks,
        } = config;
        let factory = factory.ok_or_else(|| ConfigError::MissingFactory {
            tag: tag_identifier.clone(),
        })?;

        let dispatch = DispatchTable::from_observers(attribute_observers);
        tracing::debug!(
            tag = %tag_identifier,
            slots = slot_contract.len(),
            observed = dispatch.len(),
            "Bound component definition"
        );

        Ok(Self {
            tag: tag_identifier,
            factory,
            slot_contract,
            dispatch,
            hooks: lifecycle_hooks,
            validator: SlotValidator::new(settings.deprecated_slots.iter().cloned()),
        })
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    pub fn slot_contract(&self) -> &SlotContract {
        &self.slot_contract
    }

    pub fn dispatch(&self) -> &DispatchTable {
        &self.dispatch
    }

    pub fn hooks(&self) -> &LifecycleHooks {
        &self.hooks
    }

    pub fn validator(&self) -> &SlotValidator {
        &self.validator
    }

    pub fn observed_attributes(&self) -> Vec<&str> {
        self.dispatch.observed_attributes()
    }
}

impl fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("tag", &self.tag)
            .field("slot_contract", &self.slot_contract)
            .field("dispatch", &self.dispatch)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}
