//! Declarative component configuration, authored once per component kind.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{self, BoxFuture};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::attributes::AttributeObserver;
use crate::error::{BoxError, ConfigError};
use crate::host::{HostNode, RenderScope};
use crate::render::ElementRef;
use crate::slots::{SlotConfig, SlotContract};

/// Lowercase, letter first, at least one hyphen.
static TAG_IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z][a-z0-9._]*-[a-z0-9._-]*$").expect("tag identifier pattern is valid")
});

/// Produces the rendered output for a host. Must not retain the host.
pub type Factory = Arc<dyn Fn(&HostNode) -> Result<ElementRef, BoxError> + Send + Sync>;

/// Arguments handed to a lifecycle hook.
#[derive(Debug, Clone)]
pub struct HookContext {
    pub tag: String,
    pub element: ElementRef,
    pub scope: RenderScope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPhase {
    BeforeMount,
    AfterMount,
    OnReady,
}

impl HookPhase {
    /// Fixed execution order.
    pub const ALL: [HookPhase; 3] = [HookPhase::BeforeMount, HookPhase::AfterMount, HookPhase::OnReady];
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookPhase::BeforeMount => write!(f, "before_mount"),
            HookPhase::AfterMount => write!(f, "after_mount"),
            HookPhase::OnReady => write!(f, "on_ready"),
        }
    }
}

type HookFn = dyn Fn(HookContext) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync;

/// A lifecycle hook; either synchronous or returning a future.
#[derive(Clone)]
pub struct LifecycleHook(Arc<HookFn>);

impl LifecycleHook {
    /// Wraps a hook that returns a future; the engine awaits it before the next hook.
    pub fn new<F, Fut>(hook: F) -> Self
    where
        F: Fn(HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        Self(Arc::new(
            move |ctx: HookContext| -> BoxFuture<'static, Result<(), BoxError>> {
                Box::pin(hook(ctx))
            },
        ))
    }

    /// Wraps a hook that completes immediately.
    pub fn sync<F>(hook: F) -> Self
    where
        F: Fn(&HookContext) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self(Arc::new(
            move |ctx: HookContext| -> BoxFuture<'static, Result<(), BoxError>> {
                Box::pin(future::ready(hook(&ctx)))
            },
        ))
    }

    pub fn call(&self, ctx: HookContext) -> BoxFuture<'static, Result<(), BoxError>> {
        (self.0)(ctx)
    }
}

impl fmt::Debug for LifecycleHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LifecycleHook")
    }
}

#[derive(Debug, Clone, Default)]
pub struct LifecycleHooks {
    pub before_mount: Option<LifecycleHook>,
    pub after_mount: Option<LifecycleHook>,
    pub on_ready: Option<LifecycleHook>,
}

impl LifecycleHooks {
    pub fn get(&self, phase: HookPhase) -> Option<&LifecycleHook> {
        match phase {
            HookPhase::BeforeMount => self.before_mount.as_ref(),
            HookPhase::AfterMount => self.after_mount.as_ref(),
            HookPhase::OnReady => self.on_ready.as_ref(),
        }
    }

    /// Present hooks in execution order.
    pub fn in_order(&self) -> impl Iterator<Item = (HookPhase, &LifecycleHook)> {
        HookPhase::ALL
            .into_iter()
            .filter_map(move |phase| self.get(phase).map(|hook| (phase, hook)))
    }
}

/// Everything a component author declares.
///
/// `tag_identifier` and `factory` are mandatory; `validate` rejects a
/// configuration lacking either before any instance exists.
#[derive(Clone, Default)]
pub struct ComponentConfiguration {
    pub tag_identifier: String,
    pub factory: Option<Factory>,
    pub slot_contract: SlotContract,
    pub attribute_observers: Vec<AttributeObserver>,
    pub lifecycle_hooks: LifecycleHooks,
}

impl ComponentConfiguration {
    pub fn new(tag_identifier: impl Into<String>) -> Self {
        Self {
            tag_identifier: tag_identifier.into(),
            ..Self::default()
        }
    }

    pub fn factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&HostNode) -> Result<ElementRef, BoxError> + Send + Sync + 'static,
    {
        self.factory = Some(Arc::new(factory));
        self
    }

    pub fn slot(mut self, name: impl Into<String>, config: SlotConfig) -> Self {
        self.slot_contract.insert(name.into(), config);
        self
    }

    pub fn observer(mut self, observer: AttributeObserver) -> Self {
        self.attribute_observers.push(observer);
        self
    }

    pub fn observers(mut self, observers: impl IntoIterator<Item = AttributeObserver>) -> Self {
        self.attribute_observers.extend(observers);
        self
    }

    pub fn before_mount(mut self, hook: LifecycleHook) -> Self {
        self.lifecycle_hooks.before_mount = Some(hook);
        self
    }

    pub fn after_mount(mut self, hook: LifecycleHook) -> Self {
        self.lifecycle_hooks.after_mount = Some(hook);
        self
    }

    pub fn on_ready(mut self, hook: LifecycleHook) -> Self {
        self.lifecycle_hooks.on_ready = Some(hook);
        self
    }

    /// Checks the configuration's shape.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tag = self.tag_identifier.as_str();
        if tag.trim().is_empty() {
            return Err(ConfigError::MissingTagIdentifier);
        }
        if !TAG_IDENTIFIER.is_match(tag) {
            return Err(ConfigError::InvalidTagIdentifier(tag.to_string()));
        }
        if self.factory.is_none() {
            return Err(ConfigError::MissingFactory {
                tag: tag.to_string(),
            });
        }
        if let Some(index) = self
            .attribute_observers
            .iter()
            .position(|o| o.attribute_name.trim().is_empty())
        {
            return Err(ConfigError::ObserverMissingName {
                tag: tag.to_string(),
                index,
            });
        }
        Ok(())
    }
}

impl fmt::Debug for ComponentConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentConfiguration")
            .field("tag_identifier", &self.tag_identifier)
            .field("factory", &self.factory.is_some())
            .field("slot_contract", &self.slot_contract)
            .field("attribute_observers", &self.attribute_observers)
            .field("lifecycle_hooks", &self.lifecycle_hooks)
            .finish()
    }
}
