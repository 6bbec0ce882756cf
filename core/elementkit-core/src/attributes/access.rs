//! Boolean checks and value getters over a host's declared attributes.
//!
//! Every configuration flag funnels through `create_attribute_check` or
//! `create_value_getter`, so default values and deprecated-name handling are
//! defined once.

use crate::host::HostNode;

/// Literal value that forces a boolean check to `false`, distinct from absence.
pub const NEGATION_TOKEN: &str = "false";
pub const TRUE_TOKEN: &str = "true";

fn deprecation_message(old_name: &str, new_name: &str) -> String {
    format!(
        "Attribute \"{}\" is deprecated; use \"{}\" instead. The old name will be removed in a future version.",
        old_name, new_name
    )
}

/// Builds a predicate over one attribute.
///
/// Absent → `default_value`; the negation token → `false`; otherwise the
/// attribute must equal `expected_value`.
pub fn create_attribute_check(
    name: impl Into<String>,
    expected_value: impl Into<String>,
    default_value: bool,
) -> impl Fn(&HostNode) -> bool {
    let name = name.into();
    let expected_value = expected_value.into();
    move |host: &HostNode| match host.attribute(&name) {
        None => default_value,
        Some(NEGATION_TOKEN) => false,
        Some(value) => value == expected_value,
    }
}

/// Arguments for `check_deprecated_attribute`.
#[derive(Debug, Clone, Copy)]
pub struct DeprecatedAttribute<'a> {
    pub host: &'a HostNode,
    pub old_name: &'a str,
    pub new_name: &'a str,
    pub expected_value: &'a str,
}

/// Reads `old_name`; when it matches, emits a notice naming both names and
/// returns true. OR the result with the current-name check.
pub fn check_deprecated_attribute(args: DeprecatedAttribute<'_>) -> bool {
    match args.host.attribute(args.old_name) {
        Some(value) if value == args.expected_value => {
            args.host.diagnostics().notice(
                args.host.tag_name(),
                deprecation_message(args.old_name, args.new_name),
            );
            true
        }
        _ => false,
    }
}

/// Arguments for `create_value_getter`.
#[derive(Debug, Clone, Default)]
pub struct ValueGetter {
    pub current_name: String,
    pub deprecated_name: Option<String>,
}

impl ValueGetter {
    pub fn new(current_name: impl Into<String>) -> Self {
        Self {
            current_name: current_name.into(),
            deprecated_name: None,
        }
    }

    pub fn deprecated(mut self, name: impl Into<String>) -> Self {
        self.deprecated_name = Some(name.into());
        self
    }
}

/// Builds a getter for the current attribute's value.
///
/// When the deprecated name is present a notice is emitted, but its value is
/// never returned; only `current_name` is read for the result.
pub fn create_value_getter(getter: ValueGetter) -> impl Fn(&HostNode) -> Option<String> {
    let ValueGetter {
        current_name,
        deprecated_name,
    } = getter;
    move |host: &HostNode| {
        if let Some(old_name) = deprecated_name.as_deref() {
            if host.has_attribute(old_name) {
                host.diagnostics()
                    .notice(host.tag_name(), deprecation_message(old_name, &current_name));
            }
        }
        host.attribute(&current_name).map(str::to_string)
    }
}

/// A named boolean flag with an optional deprecated alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeFlag {
    pub name: &'static str,
    pub expected_value: &'static str,
    pub default_value: bool,
    pub deprecated_name: Option<&'static str>,
}

impl AttributeFlag {
    /// Either the deprecated or the current name satisfies the flag.
    pub fn check(&self, host: &HostNode) -> bool {
        let deprecated = self.deprecated_name.is_some_and(|old_name| {
            check_deprecated_attribute(DeprecatedAttribute {
                host,
                old_name,
                new_name: self.name,
                expected_value: self.expected_value,
            })
        });
        deprecated || create_attribute_check(self.name, self.expected_value, self.default_value)(host)
    }
}

pub const ATTRIBUTE_THEME: &str = "data-theme";
pub const ATTRIBUTE_ANIMATION: &str = "data-animation";

pub const THEME_DARK: AttributeFlag = AttributeFlag {
    name: ATTRIBUTE_THEME,
    expected_value: "dark",
    default_value: false,
    deprecated_name: Some("theme"),
};

pub const INCLUDES_ANIMATION: AttributeFlag = AttributeFlag {
    name: ATTRIBUTE_ANIMATION,
    expected_value: TRUE_TOKEN,
    default_value: false,
    deprecated_name: Some("animation"),
};

/// `data-theme` value, warning on the legacy `theme` attribute.
pub fn theme_value(host: &HostNode) -> Option<String> {
    create_value_getter(ValueGetter::new(ATTRIBUTE_THEME).deprecated("theme"))(host)
}
