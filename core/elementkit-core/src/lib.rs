//! # elementkit-core
//!
//! Declarative component framework: a component module supplies a
//! `ComponentConfiguration` (tag, factory, slot contract, attribute observers,
//! lifecycle hooks) and the engine turns it into a live, observable,
//! lifecycle-managed unit.
//!
//! ## Design Principles
//!
//! - **Graduated severity**: malformed configurations fail at binding time;
//!   slot violations are advisory; a failed factory aborts only that mount;
//!   hook failures are isolated per hook.
//! - **One error channel**: every reported failure reaches the document's
//!   `Diagnostics` listeners, so tooling can watch without try/catch.
//! - **No runtime dependency**: hooks may be async, but mounts are plain
//!   futures; drive them with any executor.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use elementkit_core::{ComponentConfiguration, ComponentRegistry, ElementRef, RenderedNode};
//!
//! let mut registry = ComponentRegistry::default();
//! registry.register(&document, ComponentConfiguration::new("ek-card").factory(|host| {
//!     Ok(ElementRef::new(RenderedNode::element("div")))
//! }))?;
//! for mut instance in registry.connect(&mut document) {
//!     futures::executor::block_on(instance.mount());
//! }
//! ```

pub mod attributes;
pub mod component;
pub mod diagnostics;
pub mod error;
pub mod host;
pub mod manifest;
pub mod render;
pub mod settings;
pub mod slots;

// Re-export commonly used items at crate root
pub use attributes::{
    check_deprecated_attribute, combine, create_attribute_check, create_value_getter,
    AttributeFlag, AttributeObserver, DeprecatedAttribute, DispatchEntry, DispatchTable,
    ValueGetter,
};
pub use component::{
    ComponentConfiguration, ComponentDefinition, ComponentInstance, ComponentRegistry,
    HookContext, HookPhase, LifecycleHook, LifecycleState, MountReport, Registration,
};
pub use diagnostics::{Diagnostic, DiagnosticLevel, Diagnostics, ErrorEvent};
pub use error::{BoxError, ComponentError, ConfigError, ElementError, Result};
pub use host::{Document, HostNode, RenderScope, SlotContent};
pub use manifest::{load_manifest, parse_manifest, PageManifest};
pub use render::{ElementRef, NodeHandle, RenderedNode};
pub use settings::{load_settings, load_settings_or_default, FrameworkSettings};
pub use slots::{
    validate_slots, FindingKind, SlotConfig, SlotContract, SlotValidation, SlotValidator,
    ValidationFinding,
};
