//! Demo components bundled with the CLI.
//!
//! `ek-hero` and `ek-card` exercise every configuration surface: slot
//! contracts, deprecated attribute aliases, built-in observers and hooks.

use elementkit_core::attributes::{
    resize, state_closed, state_open, theme_value, visually_position, ATTRIBUTE_ANIMATION,
    ATTRIBUTE_THEME, INCLUDES_ANIMATION, THEME_DARK, TRUE_TOKEN,
};
use elementkit_core::{
    BoxError, ComponentConfiguration, ElementRef, HostNode, LifecycleHook, RenderedNode,
    SlotConfig, SlotContent,
};

pub const HERO_TAG: &str = "ek-hero";
pub const CARD_TAG: &str = "ek-card";

const HERO_STYLES: &str = ".ek-hero { display: grid; gap: 1rem; }";
const CARD_STYLES: &str = ".ek-card { display: flex; flex-direction: column; }";

/// Every bundled configuration, in registration order.
pub fn components() -> Vec<ComponentConfiguration> {
    vec![hero(), card()]
}

fn mark(element: &ElementRef, name: &str, value: &str) {
    if let Some(node) = &element.rendered_node {
        node.update(|node| node.set_attribute(name, value));
    }
}

fn unmark(element: &ElementRef, name: &str) {
    if let Some(node) = &element.rendered_node {
        node.update(|node| node.remove_attribute(name));
    }
}

fn apply_flags(host: &HostNode, node: &mut RenderedNode) {
    if THEME_DARK.check(host) {
        node.set_attribute(ATTRIBUTE_THEME, "dark");
    }
    if INCLUDES_ANIMATION.check(host) {
        node.set_attribute(ATTRIBUTE_ANIMATION, TRUE_TOKEN);
    }
}

fn slotted<'a>(host: &'a HostNode, names: &'a [&'a str]) -> impl Iterator<Item = RenderedNode> + 'a {
    names
        .iter()
        .filter_map(move |name| host.slot(name))
        .map(SlotContent::to_node)
}

fn hero() -> ComponentConfiguration {
    ComponentConfiguration::new(HERO_TAG)
        .slot("headline", SlotConfig::required().allow(["h1", "h2"]))
        .slot("text", SlotConfig::optional())
        .slot("actions", SlotConfig::optional().allow(["a", "button"]))
        .factory(|host| {
            let mut section = RenderedNode::element("section").attr("class", "ek-hero");
            apply_flags(host, &mut section);
            let section = section.children(slotted(host, &["headline", "text", "actions"]));
            Ok(ElementRef::new(section).with_styles(HERO_STYLES))
        })
        .observer(state_open(|element| mark(element, "data-expanded", TRUE_TOKEN)))
        .observer(state_closed(|element| unmark(element, "data-expanded")))
        .after_mount(LifecycleHook::sync(|ctx| {
            tracing::debug!(tag = %ctx.tag, "Hero mounted");
            Ok(())
        }))
}

fn card() -> ComponentConfiguration {
    ComponentConfiguration::new(CARD_TAG)
        .slot("title", SlotConfig::required())
        .slot("body", SlotConfig::optional())
        .slot("media", SlotConfig::optional().allow(["img", "picture"]))
        .slot(
            "footer",
            SlotConfig::optional().deprecated("Slot \"footer\" is deprecated; use \"actions\" instead."),
        )
        .slot("actions", SlotConfig::optional())
        .factory(|host| {
            let mut article = RenderedNode::element("article").attr("class", "ek-card");
            apply_flags(host, &mut article);
            // Cards carry any explicit theme, not only "dark"
            if let Some(theme) = theme_value(host) {
                article.set_attribute(ATTRIBUTE_THEME, theme);
            }
            if let Some(position) = host.attribute("data-visual-position") {
                article.set_attribute("data-position", position);
            }
            let article = article.children(slotted(
                host,
                &["media", "title", "body", "footer", "actions"],
            ));
            Ok(ElementRef::new(article)
                .with_styles(CARD_STYLES)
                .with_event("toggle", |_| tracing::debug!("Card toggled")))
        })
        .observer(visually_position(|element, position| match position {
            Some(position) => mark(element, "data-position", &position.to_string()),
            None => unmark(element, "data-position"),
        }))
        .observer(resize(|element| mark(element, "data-resized", TRUE_TOKEN)))
        .on_ready(LifecycleHook::new(|ctx| async move {
            if !ctx.element.has_event("toggle") {
                return Err::<(), BoxError>(format!("{} is missing its toggle event", ctx.tag).into());
            }
            tracing::debug!(tag = %ctx.tag, "Card ready");
            Ok(())
        }))
}
