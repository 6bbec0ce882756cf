//! Component configuration, binding, registration and lifecycle.
//! Component modules only supply a `ComponentConfiguration`; everything else lives here.

mod configuration;
mod definition;
mod instance;
mod registry;
mod transition;

pub use configuration::{
    ComponentConfiguration, Factory, HookContext, HookPhase, LifecycleHook, LifecycleHooks,
};
pub use definition::ComponentDefinition;
pub use instance::{ComponentInstance, MountReport};
pub use registry::{ComponentRegistry, Registration};
pub use transition::{next_state, LifecycleEvent, LifecycleState};
