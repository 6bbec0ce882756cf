//! Per-host lifecycle engine.
//!
//! Mount runs four phases in order: slot validation, factory, install,
//! lifecycle hooks. Only a failed factory stops the sequence; every other
//! failure is reported through the host's diagnostics channel and the
//! sequence continues. Hooks are the only suspension points.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::FutureExt;

use crate::diagnostics::ErrorEvent;
use crate::error::{ComponentError, ConfigError};
use crate::host::HostNode;
use crate::render::ElementRef;
use crate::settings::FrameworkSettings;
use crate::slots::ValidationFinding;

use super::configuration::{ComponentConfiguration, HookContext, HookPhase};
use super::definition::ComponentDefinition;
use super::transition::{next_state, LifecycleEvent, LifecycleState};

/// What happened during one mount attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct MountReport {
    pub state: LifecycleState,
    /// True when the instance was not in a mountable state.
    pub skipped: bool,
    pub findings: Vec<ValidationFinding>,
    pub errors: Vec<ComponentError>,
    /// Hooks that ran to completion without failing.
    pub hooks_completed: Vec<HookPhase>,
}

impl MountReport {
    fn new(state: LifecycleState) -> Self {
        Self {
            state,
            skipped: false,
            findings: Vec::new(),
            errors: Vec::new(),
            hooks_completed: Vec::new(),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.state == LifecycleState::Mounted
    }

    /// The error that stopped this attempt, if any.
    pub fn fatal_error(&self) -> Option<&ComponentError> {
        self.errors.iter().find(|error| error.is_fatal_for_mount())
    }
}

pub struct ComponentInstance {
    definition: Arc<ComponentDefinition>,
    host: HostNode,
    state: LifecycleState,
    element: Option<ElementRef>,
}

impl ComponentInstance {
    pub fn new(definition: Arc<ComponentDefinition>, host: HostNode) -> Self {
        Self {
            definition,
            host,
            state: LifecycleState::Constructed,
            element: None,
        }
    }

    /// Binds `config` with default settings and constructs an instance.
    ///
    /// A malformed configuration fails here and never reaches a mount.
    pub fn construct(config: ComponentConfiguration, host: HostNode) -> Result<Self, ConfigError> {
        let definition = ComponentDefinition::bind(config, &FrameworkSettings::default())?;
        Ok(Self::new(Arc::new(definition), host))
    }

    pub fn tag(&self) -> &str {
        self.definition.tag()
    }

    pub fn definition(&self) -> &Arc<ComponentDefinition> {
        &self.definition
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn host(&self) -> &HostNode {
        &self.host
    }

    pub fn element(&self) -> Option<&ElementRef> {
        self.element.as_ref()
    }

    fn report(&self, message: &str, error: ComponentError) {
        self.host
            .diagnostics()
            .report(ErrorEvent::new(self.definition.tag(), message, error));
    }

    /// Runs the mount sequence. Never returns an error; see `MountReport`.
    pub async fn mount(&mut self) -> MountReport {
        let Some(mounting) = next_state(self.state, LifecycleEvent::Attach) else {
            tracing::debug!(tag = %self.tag(), state = %self.state, "Mount ignored");
            let mut report = MountReport::new(self.state);
            report.skipped = true;
            return report;
        };
        self.state = mounting;
        // A remount starts from an empty scope; a failed factory displays nothing
        self.host.scope_mut().clear();
        let definition = Arc::clone(&self.definition);
        let tag = definition.tag().to_string();
        let mut report = MountReport::new(self.state);

        // 1. Slot contract: advisory only
        let validation = definition
            .validator()
            .validate(&self.host, definition.slot_contract());
        for finding in &validation.findings {
            self.host.diagnostics().warn(&tag, finding.message.clone());
            let error = ComponentError::SlotContract(finding.clone());
            self.report("Slot validation failed", error.clone());
            report.errors.push(error);
        }
        report.findings = validation.findings;

        // 2. Factory
        let factory = definition.factory();
        let produced = panic::catch_unwind(AssertUnwindSafe(|| factory(&self.host)));
        let element = match produced {
            Ok(Ok(element)) if element.is_complete() => element,
            Ok(Ok(_)) => return self.abort_mount(report, ComponentError::IncompleteRender),
            Ok(Err(err)) => {
                return self.abort_mount(report, ComponentError::FactoryFailed(err.to_string()))
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                return self.abort_mount(report, ComponentError::FactoryFailed(message));
            }
        };

        // 3 + 4. Own the ref, install output into the render scope
        self.host.scope_mut().install(&element);
        self.element = Some(element.clone());
        tracing::debug!(tag = %tag, "Rendered output installed");

        // 5. Hooks, in order, each isolated from the others
        for (phase, hook) in definition.hooks().in_order() {
            let ctx = HookContext {
                tag: tag.clone(),
                element: element.clone(),
                scope: self.host.scope().clone(),
            };
            let outcome = match panic::catch_unwind(AssertUnwindSafe(|| hook.call(ctx))) {
                Ok(pending) => match AssertUnwindSafe(pending).catch_unwind().await {
                    Ok(result) => result.map_err(|err| err.to_string()),
                    Err(payload) => Err(panic_message(payload.as_ref())),
                },
                Err(payload) => Err(panic_message(payload.as_ref())),
            };

            match outcome {
                Ok(()) => report.hooks_completed.push(phase),
                Err(message) => {
                    let error = ComponentError::HookFailed { phase, message };
                    self.report("Lifecycle hook failed", error.clone());
                    report.errors.push(error);
                }
            }
        }

        if let Some(mounted) = next_state(self.state, LifecycleEvent::HooksSettled) {
            self.state = mounted;
        }
        report.state = self.state;
        tracing::debug!(
            tag = %tag,
            findings = report.findings.len(),
            errors = report.errors.len(),
            "Mount complete"
        );
        report
    }

    fn abort_mount(&mut self, mut report: MountReport, error: ComponentError) -> MountReport {
        self.report("Component factory failed", error.clone());
        report.errors.push(error);
        if let Some(failed) = next_state(self.state, LifecycleEvent::FactoryFailed) {
            self.state = failed;
        }
        report.state = self.state;
        report
    }

    /// Dispatches an observed attribute change.
    ///
    /// Returns true when handlers ran. Unchanged values, unobserved names and
    /// changes arriving before a successful mount are dropped, not queued.
    pub fn attribute_changed(
        &self,
        name: &str,
        old_value: Option<&str>,
        new_value: Option<&str>,
    ) -> bool {
        if old_value == new_value {
            return false;
        }
        let Some(entry) = self.definition.dispatch().get(name) else {
            return false;
        };
        let Some(element) = self.element.as_ref() else {
            tracing::debug!(tag = %self.tag(), attribute = name, "Attribute change before mount ignored");
            return false;
        };
        entry.invoke(element, old_value, new_value);
        true
    }

    /// Updates the host attribute and dispatches the change.
    pub fn set_attribute(&mut self, name: &str, value: Option<&str>) -> bool {
        let old_value = self.host.set_attribute(name, value);
        self.attribute_changed(name, old_value.as_deref(), value)
    }

    /// Releases the owned element ref and empties the render scope.
    pub fn unmount(&mut self) -> bool {
        match next_state(self.state, LifecycleEvent::Detach) {
            Some(unmounted) => {
                self.state = unmounted;
                self.element = None;
                self.host.scope_mut().clear();
                tracing::debug!(tag = %self.tag(), "Unmounted");
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for ComponentInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentInstance")
            .field("tag", &self.definition.tag())
            .field("state", &self.state)
            .field("element", &self.element)
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{state_open, visually_position};
    use crate::component::LifecycleHook;
    use crate::diagnostics::DiagnosticLevel;
    use crate::error::BoxError;
    use crate::host::SlotContent;
    use crate::render::RenderedNode;
    use crate::slots::{FindingKind, SlotConfig};
    use futures::executor::block_on;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn card_config() -> ComponentConfiguration {
        ComponentConfiguration::new("ek-card").factory(|host| {
            let headline = host
                .slot("headline")
                .map(|c| c.to_node())
                .unwrap_or_else(|| RenderedNode::text(""));
            Ok(ElementRef::new(RenderedNode::element("div").attr("class", "card").child(headline))
                .with_styles(".card { display: block; }"))
        })
    }

    fn logging_hook(log: &Arc<Mutex<Vec<&'static str>>>, label: &'static str) -> LifecycleHook {
        let log = log.clone();
        LifecycleHook::sync(move |_| {
            log.lock().unwrap().push(label);
            Ok(())
        })
    }

    #[test]
    fn test_mount_installs_output() {
        let host = HostNode::new("ek-card").with_child(SlotContent::slotted("headline", "h2", "Hello"));
        let mut instance = ComponentInstance::construct(card_config(), host).unwrap();
        assert_eq!(instance.state(), LifecycleState::Constructed);

        let report = block_on(instance.mount());
        assert!(report.is_mounted());
        assert!(report.errors.is_empty());
        assert_eq!(
            instance.host().scope().to_markup(),
            "<style>.card { display: block; }</style><div class=\"card\"><h2>Hello</h2></div>"
        );
        assert!(instance.element().is_some());
    }

    #[test]
    fn test_missing_required_slot_still_mounts() {
        let config = card_config().slot("headline", SlotConfig::required());
        let mut instance = ComponentInstance::construct(config, HostNode::new("ek-card")).unwrap();

        let report = block_on(instance.mount());
        assert!(report.is_mounted());
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].kind, FindingKind::Missing);
        assert!(instance.element().unwrap().markup().unwrap().contains("card"));

        let warnings = instance.host().diagnostics().entries_at(DiagnosticLevel::Warning);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].to_string().starts_with("[ek-card] "));
    }

    #[test]
    fn test_factory_error_aborts_mount_without_hooks() {
        let ran = Arc::new(AtomicUsize::new(0));
        let counter = ran.clone();
        let config = ComponentConfiguration::new("ek-card")
            .factory(|_| Err("no data".into()))
            .before_mount(LifecycleHook::sync(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }));
        let mut instance = ComponentInstance::construct(config, HostNode::new("ek-card")).unwrap();

        let report = block_on(instance.mount());
        assert_eq!(report.state, LifecycleState::Failed);
        assert_eq!(report.errors, vec![ComponentError::FactoryFailed("no data".into())]);
        assert_eq!(ran.load(Ordering::SeqCst), 0);
        assert!(instance.element().is_none());
        assert!(instance.host().scope().is_empty());
    }

    #[test]
    fn test_incomplete_render_aborts_mount() {
        let config = ComponentConfiguration::new("ek-card").factory(|_| Ok(ElementRef::default()));
        let mut instance = ComponentInstance::construct(config, HostNode::new("ek-card")).unwrap();

        let report = block_on(instance.mount());
        assert_eq!(report.state, LifecycleState::Failed);
        assert_eq!(report.errors, vec![ComponentError::IncompleteRender]);
    }

    #[test]
    fn test_factory_panic_is_reported() {
        let config = ComponentConfiguration::new("ek-card").factory(|_| panic!("kaboom"));
        let mut instance = ComponentInstance::construct(config, HostNode::new("ek-card")).unwrap();

        let report = block_on(instance.mount());
        assert_eq!(report.state, LifecycleState::Failed);
        match &report.errors[0] {
            ComponentError::FactoryFailed(message) => assert!(message.contains("kaboom")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_hooks_run_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let config = card_config()
            .on_ready(logging_hook(&log, "on_ready"))
            .after_mount(logging_hook(&log, "after_mount"))
            .before_mount(logging_hook(&log, "before_mount"));
        let mut instance = ComponentInstance::construct(config, HostNode::new("ek-card")).unwrap();

        let report = block_on(instance.mount());
        assert_eq!(*log.lock().unwrap(), vec!["before_mount", "after_mount", "on_ready"]);
        assert_eq!(
            report.hooks_completed,
            vec![HookPhase::BeforeMount, HookPhase::AfterMount, HookPhase::OnReady]
        );
    }

    #[test]
    fn test_failing_hook_does_not_block_the_rest() {
        let count = Arc::new(AtomicUsize::new(0));
        let after = count.clone();
        let ready = count.clone();
        let config = card_config()
            .before_mount(LifecycleHook::sync(|_| Err("before failed".into())))
            .after_mount(LifecycleHook::sync(move |_| {
                after.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }))
            .on_ready(LifecycleHook::new(move |_| {
                let ready = ready.clone();
                async move {
                    ready.fetch_add(1, Ordering::SeqCst);
                    Ok::<(), BoxError>(())
                }
            }));
        let mut instance = ComponentInstance::construct(config, HostNode::new("ek-card")).unwrap();

        let report = block_on(instance.mount());
        assert!(report.is_mounted());
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(
            report.errors,
            vec![ComponentError::HookFailed {
                phase: HookPhase::BeforeMount,
                message: "before failed".into()
            }]
        );
    }

    #[test]
    fn test_panicking_hook_is_isolated() {
        let count = Arc::new(AtomicUsize::new(0));
        let ready = count.clone();
        let config = card_config()
            .after_mount(LifecycleHook::sync(|_| panic!("hook exploded")))
            .on_ready(LifecycleHook::sync(move |_| {
                ready.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }));
        let mut instance = ComponentInstance::construct(config, HostNode::new("ek-card")).unwrap();

        let report = block_on(instance.mount());
        assert!(report.is_mounted());
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(report.hooks_completed, vec![HookPhase::OnReady]);
    }

    #[test]
    fn test_hook_sees_installed_scope() {
        let seen = Arc::new(Mutex::new(String::new()));
        let sink = seen.clone();
        let config = card_config().after_mount(LifecycleHook::sync(move |ctx| {
            *sink.lock().unwrap() = ctx.scope.to_markup();
            Ok(())
        }));
        let mut instance = ComponentInstance::construct(config, HostNode::new("ek-card")).unwrap();
        block_on(instance.mount());

        assert!(seen.lock().unwrap().contains("class=\"card\""));
    }

    #[test]
    fn test_attribute_change_before_mount_is_dropped() {
        let count = Arc::new(AtomicUsize::new(0));
        let sink = count.clone();
        let config = card_config().observer(state_open(move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
        }));
        let mut instance = ComponentInstance::construct(
            config,
            HostNode::new("ek-card").with_attribute("state", "closed"),
        )
        .unwrap();

        assert!(!instance.set_attribute("state", Some("open")));
        assert_eq!(count.load(Ordering::SeqCst), 0);

        // No replay once mounted
        block_on(instance.mount());
        assert_eq!(count.load(Ordering::SeqCst), 0);

        assert!(instance.set_attribute("state", Some("closed")));
        assert!(instance.set_attribute("state", Some("open")));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unchanged_or_unobserved_attribute_is_ignored() {
        let count = Arc::new(AtomicUsize::new(0));
        let sink = count.clone();
        let config = card_config().observer(visually_position(move |_, _| {
            sink.fetch_add(1, Ordering::SeqCst);
        }));
        let mut instance = ComponentInstance::construct(config, HostNode::new("ek-card")).unwrap();
        block_on(instance.mount());

        assert!(!instance.attribute_changed("data-visual-position", Some("2"), Some("2")));
        assert!(!instance.attribute_changed("data-other", None, Some("2")));
        assert!(instance.attribute_changed("data-visual-position", None, Some("2")));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_observer_can_mutate_installed_node() {
        let config = card_config().observer(state_open(|element| {
            if let Some(node) = &element.rendered_node {
                node.update(|n| n.set_attribute("aria-expanded", "true"));
            }
        }));
        let mut instance = ComponentInstance::construct(config, HostNode::new("ek-card")).unwrap();
        block_on(instance.mount());

        instance.attribute_changed("state", Some("closed"), Some("open"));
        assert!(instance
            .host()
            .scope()
            .to_markup()
            .contains("aria-expanded=\"true\""));
    }

    #[test]
    fn test_unmount_releases_element_and_allows_remount() {
        let mut instance = ComponentInstance::construct(card_config(), HostNode::new("ek-card")).unwrap();
        assert!(!instance.unmount());

        block_on(instance.mount());
        assert!(instance.unmount());
        assert_eq!(instance.state(), LifecycleState::Unmounted);
        assert!(instance.element().is_none());
        assert!(!instance.attribute_changed("state", Some("closed"), Some("open")));

        let report = block_on(instance.mount());
        assert!(report.is_mounted());
    }

    #[test]
    fn test_unmount_clears_scope_and_remount_does_not_duplicate_styles() {
        let mut instance = ComponentInstance::construct(card_config(), HostNode::new("ek-card")).unwrap();
        block_on(instance.mount());
        let first = instance.host().scope().to_markup();

        assert!(instance.unmount());
        assert!(instance.host().scope().is_empty());
        assert!(instance.host().scope().node.is_none());

        block_on(instance.mount());
        assert_eq!(instance.host().scope().to_markup(), first);
        instance.unmount();
        block_on(instance.mount());
        assert_eq!(instance.host().scope().to_markup(), first);
    }

    #[test]
    fn test_failed_remount_displays_nothing() {
        let fail = Arc::new(AtomicUsize::new(0));
        let switch = fail.clone();
        let config = ComponentConfiguration::new("ek-card").factory(move |_| {
            if switch.load(Ordering::SeqCst) > 0 {
                return Err("gone".into());
            }
            Ok(ElementRef::new(RenderedNode::element("div")).with_styles(".c{}"))
        });
        let mut instance = ComponentInstance::construct(config, HostNode::new("ek-card")).unwrap();
        block_on(instance.mount());
        assert_eq!(instance.host().scope().to_markup(), "<style>.c{}</style><div></div>");

        instance.unmount();
        fail.store(1, Ordering::SeqCst);
        let report = block_on(instance.mount());

        assert_eq!(report.state, LifecycleState::Failed);
        assert_eq!(report.fatal_error(), Some(&ComponentError::FactoryFailed("gone".into())));
        assert!(instance.host().scope().is_empty());
        assert_eq!(instance.host().scope().to_markup(), "");
    }

    #[test]
    fn test_second_mount_is_skipped() {
        let mut instance = ComponentInstance::construct(card_config(), HostNode::new("ek-card")).unwrap();
        block_on(instance.mount());

        let report = block_on(instance.mount());
        assert!(report.skipped);
        assert_eq!(report.state, LifecycleState::Mounted);
    }

    #[test]
    fn test_errors_bubble_to_listeners() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let host = HostNode::new("ek-card");
        host.diagnostics().subscribe(move |event| {
            sink.lock().unwrap().push(event.message.clone());
        });
        let config = card_config()
            .slot("headline", SlotConfig::required())
            .on_ready(LifecycleHook::sync(|_| Err("late".into())));
        let mut instance = ComponentInstance::construct(config, host).unwrap();

        block_on(instance.mount());
        assert_eq!(
            *events.lock().unwrap(),
            vec!["Slot validation failed", "Lifecycle hook failed"]
        );
    }
}
