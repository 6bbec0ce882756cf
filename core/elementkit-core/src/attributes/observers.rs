//! Attribute observers and the merged dispatch table.
//!
//! Observers are authored independently; `combine` groups them by attribute
//! name so several handlers can cooperate on one attribute. The table is
//! built once per component definition and is read-only afterwards.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use super::access::{NEGATION_TOKEN, TRUE_TOKEN};
use crate::render::ElementRef;

/// Change handler: `(element, old_value, new_value)`.
pub type ObserverHandler = Arc<dyn Fn(&ElementRef, Option<&str>, Option<&str>) + Send + Sync>;

pub const ATTRIBUTE_STATE: &str = "state";
pub const ATTRIBUTE_VISUAL_POSITION: &str = "data-visual-position";
pub const ATTRIBUTE_VISUAL_SHOW: &str = "data-visual-show";
pub const ATTRIBUTE_VISUAL_OPEN: &str = "data-visual-open";
pub const ATTRIBUTE_RESIZE: &str = "resize";

pub const STATE_OPEN: &str = "open";
pub const STATE_CLOSED: &str = "closed";

#[derive(Clone)]
pub struct AttributeObserver {
    pub attribute_name: String,
    pub handler: ObserverHandler,
}

impl AttributeObserver {
    pub fn new(
        attribute_name: impl Into<String>,
        handler: impl Fn(&ElementRef, Option<&str>, Option<&str>) + Send + Sync + 'static,
    ) -> Self {
        Self {
            attribute_name: attribute_name.into(),
            handler: Arc::new(handler),
        }
    }
}

impl fmt::Debug for AttributeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeObserver")
            .field("attribute_name", &self.attribute_name)
            .finish_non_exhaustive()
    }
}

/// One merged entry per distinct attribute name.
#[derive(Clone)]
pub struct DispatchEntry {
    pub attribute_name: String,
    pub handler: ObserverHandler,
    handler_count: usize,
}

impl DispatchEntry {
    pub fn handler_count(&self) -> usize {
        self.handler_count
    }

    pub fn invoke(&self, element: &ElementRef, old_value: Option<&str>, new_value: Option<&str>) {
        (self.handler)(element, old_value, new_value)
    }
}

impl fmt::Debug for DispatchEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchEntry")
            .field("attribute_name", &self.attribute_name)
            .field("handler_count", &self.handler_count)
            .finish()
    }
}

/// Merges observers by attribute name.
///
/// Entries follow the first-seen order of names; each entry calls its
/// handlers in registration order with the same arguments.
pub fn combine(observers: impl IntoIterator<Item = AttributeObserver>) -> Vec<DispatchEntry> {
    let mut grouped: IndexMap<String, Vec<ObserverHandler>> = IndexMap::new();
    for observer in observers {
        grouped
            .entry(observer.attribute_name)
            .or_default()
            .push(observer.handler);
    }

    grouped
        .into_iter()
        .map(|(attribute_name, handlers)| {
            let handler_count = handlers.len();
            let handler: ObserverHandler = Arc::new(
                move |element: &ElementRef, old_value: Option<&str>, new_value: Option<&str>| {
                    for handler in &handlers {
                        handler(element, old_value, new_value);
                    }
                },
            );
            DispatchEntry {
                attribute_name,
                handler,
                handler_count,
            }
        })
        .collect()
}

/// Read-only lookup from attribute name to merged entry.
#[derive(Debug, Clone, Default)]
pub struct DispatchTable {
    entries: IndexMap<String, DispatchEntry>,
}

impl DispatchTable {
    pub fn from_observers(observers: impl IntoIterator<Item = AttributeObserver>) -> Self {
        combine(observers).into_iter().collect()
    }

    pub fn get(&self, attribute_name: &str) -> Option<&DispatchEntry> {
        self.entries.get(attribute_name)
    }

    pub fn observes(&self, attribute_name: &str) -> bool {
        self.entries.contains_key(attribute_name)
    }

    /// Observed names in first-seen order.
    pub fn observed_attributes(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<DispatchEntry> for DispatchTable {
    fn from_iter<I: IntoIterator<Item = DispatchEntry>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|entry| (entry.attribute_name.clone(), entry))
                .collect(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Built-in observers
// ─────────────────────────────────────────────────────────────────────────────

fn transition_observer(
    attribute_name: &str,
    from: &'static str,
    to: &'static str,
    callback: impl Fn(&ElementRef) + Send + Sync + 'static,
) -> AttributeObserver {
    AttributeObserver::new(attribute_name, move |element, old_value, new_value| {
        if old_value == Some(from) && new_value == Some(to) {
            callback(element);
        }
    })
}

/// Fires on an exact `closed → open` transition of `state`.
pub fn state_open(callback: impl Fn(&ElementRef) + Send + Sync + 'static) -> AttributeObserver {
    transition_observer(ATTRIBUTE_STATE, STATE_CLOSED, STATE_OPEN, callback)
}

/// Fires on an exact `open → closed` transition of `state`.
pub fn state_closed(callback: impl Fn(&ElementRef) + Send + Sync + 'static) -> AttributeObserver {
    transition_observer(ATTRIBUTE_STATE, STATE_OPEN, STATE_CLOSED, callback)
}

pub fn visually_show(callback: impl Fn(&ElementRef) + Send + Sync + 'static) -> AttributeObserver {
    transition_observer(ATTRIBUTE_VISUAL_SHOW, NEGATION_TOKEN, TRUE_TOKEN, callback)
}

pub fn visually_hide(callback: impl Fn(&ElementRef) + Send + Sync + 'static) -> AttributeObserver {
    transition_observer(ATTRIBUTE_VISUAL_SHOW, TRUE_TOKEN, NEGATION_TOKEN, callback)
}

pub fn visually_open(callback: impl Fn(&ElementRef) + Send + Sync + 'static) -> AttributeObserver {
    transition_observer(ATTRIBUTE_VISUAL_OPEN, NEGATION_TOKEN, TRUE_TOKEN, callback)
}

pub fn visually_closed(
    callback: impl Fn(&ElementRef) + Send + Sync + 'static,
) -> AttributeObserver {
    transition_observer(ATTRIBUTE_VISUAL_OPEN, TRUE_TOKEN, NEGATION_TOKEN, callback)
}

/// Fires on any change; a zero or unparsable value clears the position.
pub fn visually_position(
    callback: impl Fn(&ElementRef, Option<i64>) + Send + Sync + 'static,
) -> AttributeObserver {
    AttributeObserver::new(ATTRIBUTE_VISUAL_POSITION, move |element, old_value, new_value| {
        if old_value == new_value {
            return;
        }
        let position = new_value.and_then(parse_leading_int).filter(|&n| n != 0);
        callback(element, position);
    })
}

/// Fires whenever `resize` becomes the true token, whatever it was before.
pub fn resize(callback: impl Fn(&ElementRef) + Send + Sync + 'static) -> AttributeObserver {
    AttributeObserver::new(ATTRIBUTE_RESIZE, move |element, _old_value, new_value| {
        if new_value == Some(TRUE_TOKEN) {
            callback(element);
        }
    })
}

/// Parses an optional sign and the leading decimal digits ("12px" → 12).
fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];
    if digits.is_empty() {
        return None;
    }
    // Only overflow can fail here; saturate so a long run still counts as a position
    let magnitude = digits.parse::<i128>().unwrap_or(i128::MAX);
    let value = (sign as i128).saturating_mul(magnitude);
    Some(value.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderedNode;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn element() -> ElementRef {
        ElementRef::new(RenderedNode::element("div"))
    }

    fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, label: &'static str) -> AttributeObserver {
        let log = log.clone();
        AttributeObserver::new("placeholder", move |_, _, _| {
            log.lock().unwrap().push(label);
        })
    }

    fn named(mut observer: AttributeObserver, name: &str) -> AttributeObserver {
        observer.attribute_name = name.to_string();
        observer
    }

    fn counting(
        factory: fn(Box<dyn Fn(&ElementRef) + Send + Sync>) -> AttributeObserver,
    ) -> (AttributeObserver, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let sink = count.clone();
        let observer = factory(Box::new(move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
        }));
        (observer, count)
    }

    #[test]
    fn test_combine_preserves_first_seen_order_and_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = named(recorder(&log, "A"), "x");
        let b = named(recorder(&log, "B"), "y");
        let c = named(recorder(&log, "C"), "x");

        let entries = combine(vec![a, b, c]);
        let names: Vec<_> = entries.iter().map(|e| e.attribute_name.as_str()).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert_eq!(entries[0].handler_count(), 2);

        entries[0].invoke(&element(), Some("1"), Some("2"));
        assert_eq!(*log.lock().unwrap(), vec!["A", "C"]);
    }

    #[test]
    fn test_combined_handlers_receive_same_arguments() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let first = seen.clone();
        let second = seen.clone();
        let entries = combine(vec![
            AttributeObserver::new("x", move |_, old, new| {
                first.lock().unwrap().push((old.map(str::to_string), new.map(str::to_string)));
            }),
            AttributeObserver::new("x", move |_, old, new| {
                second.lock().unwrap().push((old.map(str::to_string), new.map(str::to_string)));
            }),
        ]);

        entries[0].invoke(&element(), None, Some("on"));
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], seen[1]);
        assert_eq!(seen[0], (None, Some("on".to_string())));
    }

    #[test]
    fn test_dispatch_table_lookup() {
        let table = DispatchTable::from_observers(vec![
            state_open(|_| {}),
            resize(|_| {}),
            state_closed(|_| {}),
        ]);
        assert_eq!(table.observed_attributes(), vec!["state", "resize"]);
        assert_eq!(table.get("state").unwrap().handler_count(), 2);
        assert!(!table.observes("data-visual-show"));
    }

    #[test]
    fn test_state_open_requires_exact_transition() {
        let (observer, count) = counting(|cb| state_open(cb));
        let el = element();

        (observer.handler)(&el, Some("closed"), Some("open"));
        assert_eq!(count.load(Ordering::SeqCst), 1);

        (observer.handler)(&el, Some("open"), Some("open"));
        (observer.handler)(&el, None, Some("open"));
        (observer.handler)(&el, Some("open"), Some("closed"));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_state_closed_requires_exact_transition() {
        let (observer, count) = counting(|cb| state_closed(cb));
        let el = element();

        (observer.handler)(&el, Some("open"), Some("closed"));
        (observer.handler)(&el, None, Some("closed"));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_visual_show_and_hide_are_symmetric() {
        let (show, shown) = counting(|cb| visually_show(cb));
        let (hide, hidden) = counting(|cb| visually_hide(cb));
        assert_eq!(show.attribute_name, hide.attribute_name);
        let el = element();

        for handler in [&show.handler, &hide.handler] {
            handler(&el, Some("false"), Some("true"));
            handler(&el, Some("true"), Some("false"));
            handler(&el, None, Some("true"));
            handler(&el, Some("true"), Some("yes"));
        }
        assert_eq!(shown.load(Ordering::SeqCst), 1);
        assert_eq!(hidden.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_visual_open_and_closed() {
        let (open, opened) = counting(|cb| visually_open(cb));
        let (closed, closes) = counting(|cb| visually_closed(cb));
        let el = element();

        (open.handler)(&el, Some("false"), Some("true"));
        (closed.handler)(&el, Some("true"), Some("false"));
        (closed.handler)(&el, Some("false"), Some("true"));
        assert_eq!(opened.load(Ordering::SeqCst), 1);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_visually_position_parses_or_clears() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = calls.clone();
        let observer = visually_position(move |_, position| sink.lock().unwrap().push(position));
        let el = element();

        (observer.handler)(&el, None, Some("3"));
        (observer.handler)(&el, Some("3"), Some("12px"));
        (observer.handler)(&el, Some("12px"), Some("0"));
        (observer.handler)(&el, Some("0"), Some("abc"));
        (observer.handler)(&el, Some("abc"), None);
        (observer.handler)(&el, Some("5"), Some("5"));

        assert_eq!(
            *calls.lock().unwrap(),
            vec![Some(3), Some(12), None, None, None]
        );
    }

    #[test]
    fn test_resize_ignores_old_value() {
        let (observer, count) = counting(|cb| resize(cb));
        let el = element();

        (observer.handler)(&el, None, Some("true"));
        (observer.handler)(&el, Some("true"), Some("true"));
        (observer.handler)(&el, Some("true"), Some("false"));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int(" 42"), Some(42));
        assert_eq!(parse_leading_int("-7rem"), Some(-7));
        assert_eq!(parse_leading_int("+2"), Some(2));
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("-"), None);
        assert_eq!(parse_leading_int("99999999999999999999px"), Some(i64::MAX));
        assert_eq!(parse_leading_int("-99999999999999999999"), Some(i64::MIN));
        assert_eq!(parse_leading_int("-9223372036854775808"), Some(i64::MIN));
    }
}
