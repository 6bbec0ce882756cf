//! `elementkit render`: connect, mount and print every component on a page.

use std::path::Path;

use futures::executor::block_on;
use serde::Serialize;

use crate::session::{CliError, Session};

#[derive(Debug, Serialize)]
pub struct RenderedComponent {
    pub tag: String,
    pub state: String,
    pub markup: Option<String>,
    /// The error that stopped the mount, when the factory failed.
    pub failure: Option<String>,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DiagnosticLine {
    pub level: String,
    pub tag: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct RenderOutput {
    pub components: Vec<RenderedComponent>,
    /// Tags on the page with no registered component.
    pub unregistered: Vec<String>,
    pub diagnostics: Vec<DiagnosticLine>,
}

pub fn render_page(manifest: &Path, settings: Option<&Path>) -> Result<RenderOutput, CliError> {
    let Session {
        mut document,
        registry,
    } = Session::open(manifest, settings)?;

    let mut components = Vec::new();
    for mut instance in registry.connect(&mut document) {
        let report = block_on(instance.mount());
        let scope = instance.host().scope();
        let markup = (!scope.is_empty()).then(|| scope.to_markup());
        components.push(RenderedComponent {
            tag: instance.tag().to_string(),
            state: report.state.to_string(),
            markup,
            failure: report.fatal_error().map(ToString::to_string),
            errors: report.errors.iter().map(ToString::to_string).collect(),
        });
    }

    let unregistered = document
        .hosts()
        .iter()
        .map(|host| host.tag_name().to_string())
        .collect();
    let diagnostics = document
        .diagnostics()
        .entries()
        .into_iter()
        .map(|entry| DiagnosticLine {
            level: entry.level.to_string(),
            tag: entry.tag,
            message: entry.message,
        })
        .collect();

    Ok(RenderOutput {
        components,
        unregistered,
        diagnostics,
    })
}

pub fn format_text(output: &RenderOutput) -> String {
    let mut lines = Vec::new();
    for component in &output.components {
        lines.push(format!("<!-- {} ({}) -->", component.tag, component.state));
        if let Some(markup) = &component.markup {
            lines.push(markup.clone());
        }
        if let Some(failure) = &component.failure {
            lines.push(format!("<!-- {} -->", failure));
        }
    }
    for tag in &output.unregistered {
        lines.push(format!("<!-- {} (unregistered) -->", tag));
    }
    for line in &output.diagnostics {
        lines.push(format!("{}: [{}] {}", line.level, line.tag, line.message));
    }
    lines.join("\n")
}

pub fn run(manifest: &Path, settings: Option<&Path>, json: bool) -> Result<String, CliError> {
    let output = render_page(manifest, settings)?;
    if json {
        Ok(serde_json::to_string_pretty(&output)?)
    } else {
        Ok(format_text(&output))
    }
}
