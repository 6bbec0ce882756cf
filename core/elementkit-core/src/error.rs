//! Error types for elementkit-core operations.
//!
//! Severity is graduated: `ConfigError` is the only failure that is ever
//! returned to a component author. `ComponentError` values describe runtime
//! failures that are reported through the diagnostics channel and never
//! propagate out of a mount.

use std::path::PathBuf;

use crate::component::HookPhase;
use crate::slots::ValidationFinding;

/// Boxed error returned by user-supplied factories and lifecycle hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// ═══════════════════════════════════════════════════════════════════════════════
// Configuration Errors (fatal, binding/construction time)
// ═══════════════════════════════════════════════════════════════════════════════

/// A malformed `ComponentConfiguration`.
///
/// These indicate a programming error in the component module, so they are
/// raised before any instance exists.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("component configuration is missing a tag identifier")]
    MissingTagIdentifier,

    #[error("invalid tag identifier \"{0}\": expected lowercase, starting with a letter and containing a hyphen")]
    InvalidTagIdentifier(String),

    #[error("[{tag}] component configuration is missing a factory")]
    MissingFactory { tag: String },

    #[error("[{tag}] attribute observer #{index} has no attribute name")]
    ObserverMissingName { tag: String, index: usize },
}

// ═══════════════════════════════════════════════════════════════════════════════
// Reported Errors (never thrown across the mount boundary)
// ═══════════════════════════════════════════════════════════════════════════════

/// A runtime failure funneled into the error event channel.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComponentError {
    #[error("slot contract violation: {0}")]
    SlotContract(ValidationFinding),

    #[error("factory failed: {0}")]
    FactoryFailed(String),

    #[error("factory returned an element without a rendered node")]
    IncompleteRender,

    #[error("{phase} hook failed: {message}")]
    HookFailed { phase: HookPhase, message: String },
}

impl ComponentError {
    /// Whether this failure stopped the mount sequence.
    pub fn is_fatal_for_mount(&self) -> bool {
        matches!(
            self,
            ComponentError::FactoryFailed(_) | ComponentError::IncompleteRender
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Crate Error
// ═══════════════════════════════════════════════════════════════════════════════

/// All errors that elementkit-core operations can return.
#[derive(Debug, thiserror::Error)]
pub enum ElementError {
    // ─────────────────────────────────────────────────────────────────────
    // Component Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("No component registered for tag: {0}")]
    UnknownTag(String),

    // ─────────────────────────────────────────────────────────────────────
    // I/O Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parsing error: {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using ElementError.
pub type Result<T> = std::result::Result<T, ElementError>;
