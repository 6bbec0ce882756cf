//! Named content slot validation.
//!
//! Compares a component's declared slot contract against the content a host
//! actually carries and produces findings.
//!
//! Validation is advisory: findings are reported, but never stop a mount.
//! Pages keep rendering when a content author breaks a contract; strict
//! enforcement belongs to tooling.

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;

use crate::host::{HostNode, SlotContent};
use crate::settings::DEFAULT_DEPRECATED_SLOTS;

/// Expectations on one named slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotConfig {
    pub required: bool,
    /// Migration message reported whenever the slot is used.
    pub deprecated: Option<String>,
    /// Permitted content kinds; empty means anything goes.
    pub allowed_content_kinds: Vec<String>,
}

impl SlotConfig {
    pub fn optional() -> Self {
        Self::default()
    }

    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }

    pub fn deprecated(mut self, message: impl Into<String>) -> Self {
        self.deprecated = Some(message.into());
        self
    }

    pub fn allow<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_content_kinds
            .extend(kinds.into_iter().map(|k| k.into().to_ascii_lowercase()));
        self
    }
}

/// Declared slots in authoring order.
pub type SlotContract = IndexMap<String, SlotConfig>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindingKind {
    Missing,
    Deprecated,
    InvalidContent,
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingKind::Missing => write!(f, "missing"),
            FindingKind::Deprecated => write!(f, "deprecated"),
            FindingKind::InvalidContent => write!(f, "invalid-content"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFinding {
    pub slot_name: String,
    pub kind: FindingKind,
    pub message: String,
    pub offending_content: Option<SlotContent>,
}

impl fmt::Display for ValidationFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.slot_name, self.kind, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotValidation {
    pub is_valid: bool,
    pub findings: Vec<ValidationFinding>,
}

impl SlotValidation {
    fn from_findings(findings: Vec<ValidationFinding>) -> Self {
        Self {
            is_valid: findings.is_empty(),
            findings,
        }
    }

    pub fn count(&self, kind: FindingKind) -> usize {
        self.findings.iter().filter(|f| f.kind == kind).count()
    }
}

/// Validator holding the global deprecated-slot registry.
#[derive(Debug, Clone)]
pub struct SlotValidator {
    deprecated_slots: HashSet<String>,
}

impl Default for SlotValidator {
    fn default() -> Self {
        Self::new(DEFAULT_DEPRECATED_SLOTS.iter().cloned())
    }
}

impl SlotValidator {
    pub fn new(deprecated_slots: impl IntoIterator<Item = String>) -> Self {
        Self {
            deprecated_slots: deprecated_slots.into_iter().collect(),
        }
    }

    pub fn is_globally_deprecated(&self, slot_name: &str) -> bool {
        self.deprecated_slots.contains(slot_name)
    }

    pub fn validate(&self, host: &HostNode, contract: &SlotContract) -> SlotValidation {
        let findings = contract
            .iter()
            .flat_map(|(slot_name, config)| self.check_slot(host, slot_name, config))
            .collect();
        SlotValidation::from_findings(findings)
    }

    fn check_slot(&self, host: &HostNode, slot_name: &str, config: &SlotConfig) -> Vec<ValidationFinding> {
        let mut findings = Vec::new();
        let content = host.slot(slot_name);

        let Some(content) = content else {
            if config.required {
                findings.push(ValidationFinding {
                    slot_name: slot_name.to_string(),
                    kind: FindingKind::Missing,
                    message: format!("Required slot \"{}\" has no content.", slot_name),
                    offending_content: None,
                });
            }
            return findings;
        };

        let deprecation = config.deprecated.clone().or_else(|| {
            self.is_globally_deprecated(slot_name).then(|| {
                format!(
                    "Slot \"{}\" is deprecated and will be removed in a future version.",
                    slot_name
                )
            })
        });
        if let Some(message) = deprecation {
            findings.push(ValidationFinding {
                slot_name: slot_name.to_string(),
                kind: FindingKind::Deprecated,
                message,
                offending_content: Some(content.clone()),
            });
        }

        let allowed = &config.allowed_content_kinds;
        if !allowed.is_empty() && !allowed.iter().any(|k| k.eq_ignore_ascii_case(&content.kind)) {
            findings.push(ValidationFinding {
                slot_name: slot_name.to_string(),
                kind: FindingKind::InvalidContent,
                message: format!(
                    "Slot \"{}\" contains <{}>; allowed: {}.",
                    slot_name,
                    content.kind,
                    allowed.join(", ")
                ),
                offending_content: Some(content.clone()),
            });
        }

        findings
    }
}

/// Validates against the default deprecated-slot registry.
pub fn validate_slots(host: &HostNode, contract: &SlotContract) -> SlotValidation {
    SlotValidator::default().validate(host, contract)
}
