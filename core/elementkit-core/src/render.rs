//! Rendered output produced by component factories.
//!
//! The engine treats `RenderedNode` as opaque; it only moves the handle into
//! the host's render scope and hands the `ElementRef` to hooks and observers.

use std::fmt::{self, Write as _};
use std::sync::{Arc, Mutex};

use indexmap::IndexMap;
use serde_json::Value;

/// Markup tree emitted by a factory.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedNode {
    Element {
        tag: String,
        attributes: IndexMap<String, String>,
        children: Vec<RenderedNode>,
    },
    Text(String),
}

impl RenderedNode {
    pub fn element(tag: impl Into<String>) -> Self {
        RenderedNode::Element {
            tag: tag.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        RenderedNode::Text(content.into())
    }

    /// Adds an attribute; ignored on text nodes.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Appends a child; ignored on text nodes.
    pub fn child(mut self, child: RenderedNode) -> Self {
        if let RenderedNode::Element { children, .. } = &mut self {
            children.push(child);
        }
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = RenderedNode>) -> Self {
        if let RenderedNode::Element { children, .. } = &mut self {
            children.extend(nodes);
        }
        self
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        if let RenderedNode::Element { attributes, .. } = self {
            attributes.insert(name.into(), value.into());
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        match self {
            RenderedNode::Element { attributes, .. } => attributes.shift_remove(name),
            RenderedNode::Text(_) => None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self {
            RenderedNode::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            RenderedNode::Text(_) => None,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            RenderedNode::Element { tag, .. } => Some(tag),
            RenderedNode::Text(_) => None,
        }
    }

    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    fn write_markup(&self, out: &mut String) {
        match self {
            RenderedNode::Text(text) => out.push_str(&escape(text)),
            RenderedNode::Element {
                tag,
                attributes,
                children,
            } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    let _ = write!(out, " {}=\"{}\"", name, escape(value));
                }
                out.push('>');
                for child in children {
                    child.write_markup(out);
                }
                let _ = write!(out, "</{}>", tag);
            }
        }
    }
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Shared handle to a rendered node.
///
/// The element ref and the render scope hold the same handle, so mutations
/// made through either are visible in the installed output.
#[derive(Clone)]
pub struct NodeHandle(Arc<Mutex<RenderedNode>>);

impl NodeHandle {
    pub fn new(node: RenderedNode) -> Self {
        Self(Arc::new(Mutex::new(node)))
    }

    pub fn read<R>(&self, f: impl FnOnce(&RenderedNode) -> R) -> R {
        let guard = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&guard)
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut RenderedNode) -> R) -> R {
        let mut guard = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }

    pub fn to_markup(&self) -> String {
        self.read(RenderedNode::to_markup)
    }

    pub fn ptr_eq(&self, other: &NodeHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.read(|node| f.debug_tuple("NodeHandle").field(node).finish())
    }
}

impl From<RenderedNode> for NodeHandle {
    fn from(node: RenderedNode) -> Self {
        NodeHandle::new(node)
    }
}

/// Public callable exposed on an element ref.
pub type EventCallback = Arc<dyn Fn(Option<Value>) + Send + Sync>;

/// The engine's sole owned handle to a mounted component's output.
#[derive(Clone, Default)]
pub struct ElementRef {
    pub rendered_node: Option<NodeHandle>,
    pub presentation_rules: String,
    pub events: IndexMap<String, EventCallback>,
}

impl ElementRef {
    pub fn new(node: RenderedNode) -> Self {
        Self {
            rendered_node: Some(NodeHandle::new(node)),
            presentation_rules: String::new(),
            events: IndexMap::new(),
        }
    }

    pub fn with_styles(mut self, rules: impl Into<String>) -> Self {
        self.presentation_rules = rules.into();
        self
    }

    pub fn with_event(
        mut self,
        name: impl Into<String>,
        callback: impl Fn(Option<Value>) + Send + Sync + 'static,
    ) -> Self {
        self.events.insert(name.into(), Arc::new(callback));
        self
    }

    /// A factory result is only usable when it carries a rendered node.
    pub fn is_complete(&self) -> bool {
        self.rendered_node.is_some()
    }

    /// Invokes a named event; returns false when the event is not exposed.
    pub fn call_event(&self, name: &str, argument: Option<Value>) -> bool {
        match self.events.get(name) {
            Some(callback) => {
                callback(argument);
                true
            }
            None => false,
        }
    }

    pub fn has_event(&self, name: &str) -> bool {
        self.events.contains_key(name)
    }

    pub fn markup(&self) -> Option<String> {
        self.rendered_node.as_ref().map(NodeHandle::to_markup)
    }
}

impl fmt::Debug for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRef")
            .field("rendered_node", &self.rendered_node)
            .field("presentation_rules", &self.presentation_rules)
            .field("events", &self.events.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    #[test]
    fn test_markup_escapes_text_and_attributes() {
        let node = RenderedNode::element("div")
            .attr("data-title", "a \"quoted\" <b>")
            .child(RenderedNode::text("Fish & chips"));
        assert_eq!(
            node.to_markup(),
            "<div data-title=\"a &quot;quoted&quot; &lt;b&gt;\">Fish &amp; chips</div>"
        );
    }

    #[test]
    fn test_attributes_keep_insertion_order() {
        let node = RenderedNode::element("a").attr("href", "/").attr("class", "link");
        assert_eq!(node.to_markup(), "<a href=\"/\" class=\"link\"></a>");
    }

    #[test]
    fn test_text_nodes_ignore_element_builders() {
        let node = RenderedNode::text("plain").attr("class", "x");
        assert_eq!(node.attribute("class"), None);
        assert_eq!(node.tag(), None);
    }

    #[test]
    fn test_node_handle_shares_mutation() {
        let handle = NodeHandle::new(RenderedNode::element("section"));
        let clone = handle.clone();
        clone.update(|node| node.set_attribute("data-open", "true"));

        assert_eq!(
            handle.read(|node| node.attribute("data-open").map(str::to_string)),
            Some("true".to_string())
        );
        assert!(handle.ptr_eq(&clone));
    }

    #[test]
    fn test_element_ref_events() {
        let position = Arc::new(AtomicI64::new(0));
        let sink = position.clone();
        let element = ElementRef::new(RenderedNode::element("div")).with_event(
            "setPosition",
            move |arg| {
                let value = arg.and_then(|v| v.as_i64()).unwrap_or(-1);
                sink.store(value, Ordering::SeqCst);
            },
        );

        assert!(element.call_event("setPosition", Some(Value::from(4))));
        assert_eq!(position.load(Ordering::SeqCst), 4);
        assert!(!element.call_event("missing", None));
    }

    #[test]
    fn test_default_element_ref_is_incomplete() {
        assert!(!ElementRef::default().is_complete());
        assert!(ElementRef::new(RenderedNode::element("div")).is_complete());
    }
}
