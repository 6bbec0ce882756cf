//! Attribute access and observation.
//!
//! `access` reads configuration flags off a host (with deprecated-name
//! aliasing); `observers` turns "when X changes, call Y" declarations into a
//! merged dispatch table.

mod access;
mod observers;

pub use access::{
    check_deprecated_attribute, create_attribute_check, create_value_getter, theme_value,
    AttributeFlag, DeprecatedAttribute, ValueGetter, ATTRIBUTE_ANIMATION, ATTRIBUTE_THEME,
    INCLUDES_ANIMATION, NEGATION_TOKEN, THEME_DARK, TRUE_TOKEN,
};
pub use observers::{
    combine, resize, state_closed, state_open, visually_closed, visually_hide, visually_open,
    visually_position, visually_show, AttributeObserver, DispatchEntry, DispatchTable,
    ObserverHandler, ATTRIBUTE_RESIZE, ATTRIBUTE_STATE, ATTRIBUTE_VISUAL_OPEN,
    ATTRIBUTE_VISUAL_POSITION, ATTRIBUTE_VISUAL_SHOW, STATE_CLOSED, STATE_OPEN,
};
