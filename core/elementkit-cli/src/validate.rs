//! `elementkit validate`: slot contract checks without mounting anything.

use std::path::Path;

use elementkit_core::ValidationFinding;

use crate::session::{CliError, Session};

/// Findings for every registered host on the page, in document order.
pub fn validate_page(
    manifest: &Path,
    settings: Option<&Path>,
) -> Result<Vec<(String, ValidationFinding)>, CliError> {
    let session = Session::open(manifest, settings)?;
    let mut findings = Vec::new();
    for host in session.document.hosts() {
        let Some(definition) = session.registry.definition(host.tag_name()) else {
            continue;
        };
        let validation = definition
            .validator()
            .validate(host, definition.slot_contract());
        findings.extend(
            validation
                .findings
                .into_iter()
                .map(|finding| (host.tag_name().to_string(), finding)),
        );
    }
    Ok(findings)
}

pub fn format_findings(findings: &[(String, ValidationFinding)]) -> String {
    findings
        .iter()
        .map(|(tag, finding)| format!("[{}] {}", tag, finding))
        .collect::<Vec<_>>()
        .join("\n")
}
