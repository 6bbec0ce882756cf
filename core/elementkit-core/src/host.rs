//! Host nodes, their declared content, and the document that holds them.

use indexmap::IndexMap;

use crate::diagnostics::Diagnostics;
use crate::render::{ElementRef, NodeHandle, RenderedNode};

/// A piece of declared child content, associated with a slot by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotContent {
    pub slot: Option<String>,
    /// Lower-cased element kind, e.g. `h2` or `img`.
    pub kind: String,
    pub text: String,
}

impl SlotContent {
    pub fn new(kind: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            slot: None,
            kind: kind.into().to_ascii_lowercase(),
            text: text.into(),
        }
    }

    pub fn slotted(slot: impl Into<String>, kind: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            slot: Some(slot.into()),
            ..Self::new(kind, text)
        }
    }

    pub fn to_node(&self) -> RenderedNode {
        RenderedNode::element(self.kind.clone()).child(RenderedNode::text(self.text.clone()))
    }
}

/// Isolated subtree where a component's output and styling live.
#[derive(Debug, Clone, Default)]
pub struct RenderScope {
    pub node: Option<NodeHandle>,
    pub styles: String,
}

impl RenderScope {
    pub fn install(&mut self, element: &ElementRef) {
        self.node = element.rendered_node.clone();
        if !element.presentation_rules.is_empty() {
            if !self.styles.is_empty() {
                self.styles.push('\n');
            }
            self.styles.push_str(&element.presentation_rules);
        }
    }

    /// Drops the installed node handle and styles.
    pub fn clear(&mut self) {
        self.node = None;
        self.styles.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.node.is_none() && self.styles.is_empty()
    }

    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        if !self.styles.is_empty() {
            out.push_str("<style>");
            out.push_str(&self.styles);
            out.push_str("</style>");
        }
        if let Some(node) = &self.node {
            out.push_str(&node.to_markup());
        }
        out
    }
}

/// The UI element a component configuration is bound to.
#[derive(Debug, Clone)]
pub struct HostNode {
    tag_name: String,
    attributes: IndexMap<String, String>,
    children: Vec<SlotContent>,
    scope: RenderScope,
    diagnostics: Diagnostics,
}

impl HostNode {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into().to_ascii_lowercase(),
            attributes: IndexMap::new(),
            children: Vec::new(),
            scope: RenderScope::default(),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: SlotContent) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Sets or removes an attribute, returning the previous value.
    pub fn set_attribute(&mut self, name: &str, value: Option<&str>) -> Option<String> {
        match value {
            Some(value) => self.attributes.insert(name.to_string(), value.to_string()),
            None => self.attributes.shift_remove(name),
        }
    }

    pub fn children(&self) -> &[SlotContent] {
        &self.children
    }

    /// First declared child assigned to the named slot.
    pub fn slot(&self, name: &str) -> Option<&SlotContent> {
        self.children
            .iter()
            .find(|child| child.slot.as_deref() == Some(name))
    }

    pub fn scope(&self) -> &RenderScope {
        &self.scope
    }

    pub fn scope_mut(&mut self) -> &mut RenderScope {
        &mut self.scope
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}

/// Ordered collection of host nodes sharing one diagnostics channel.
#[derive(Debug, Default)]
pub struct Document {
    hosts: Vec<HostNode>,
    diagnostics: Diagnostics,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_diagnostics(diagnostics: Diagnostics) -> Self {
        Self {
            hosts: Vec::new(),
            diagnostics,
        }
    }

    /// Adds a host and reroutes its diagnostics to the document channel.
    ///
    /// Listeners and history already on the host's channel move to the
    /// document channel, so those listeners now see every host's errors.
    pub fn insert(&mut self, host: HostNode) {
        self.diagnostics.absorb(host.diagnostics());
        let host = host.with_diagnostics(self.diagnostics.clone());
        self.hosts.push(host);
    }

    pub fn contains_tag(&self, tag: &str) -> bool {
        self.hosts.iter().any(|h| h.tag_name() == tag)
    }

    pub fn hosts(&self) -> &[HostNode] {
        &self.hosts
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Removes and returns every host with the given tag, in document order.
    pub fn take_tag(&mut self, tag: &str) -> Vec<HostNode> {
        let (taken, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.hosts)
            .into_iter()
            .partition(|h| h.tag_name() == tag);
        self.hosts = kept;
        taken
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}
