//! Node properties: attributes, boolean attributes, inline styles, event handlers.
//!
//! Properties live in an insertion-ordered map keyed by [`PropertyKey`].
//! Attributes and boolean attributes share the HTML attribute namespace, so
//! `attribute("disabled", ..)` followed by `boolean_attribute("disabled", ..)`
//! overwrites in place.

use std::fmt;

use indexmap::IndexMap;

use crate::event::HandlerId;

// ---------------------------------------------------------------------------
// PropertyKey
// ---------------------------------------------------------------------------

/// Identity of a property slot on a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyKey {
    /// An HTML attribute (plain or boolean).
    Attribute(String),
    /// An inline style declaration.
    Style(String),
    /// An event listener for the named DOM event.
    Event(String),
}

impl PropertyKey {
    /// The bare name without namespace.
    pub fn name(&self) -> &str {
        match self {
            Self::Attribute(name) | Self::Style(name) | Self::Event(name) => name,
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attribute(name) => write!(f, "{name}"),
            Self::Style(name) => write!(f, "style.{name}"),
            Self::Event(name) => write!(f, "on{name}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Property
// ---------------------------------------------------------------------------

/// A single property value attached to a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Property {
    Attribute { name: String, value: String },
    BooleanAttribute { name: String, value: bool },
    Style { name: String, value: String },
    /// Event handlers compare by handler id; callbacks are never compared.
    EventHandler { event: String, handler: HandlerId },
}

impl Property {
    pub fn attribute(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Attribute {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn boolean_attribute(name: impl Into<String>, value: bool) -> Self {
        Self::BooleanAttribute {
            name: name.into(),
            value,
        }
    }

    pub fn style(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Style {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn event_handler(event: impl Into<String>, handler: HandlerId) -> Self {
        Self::EventHandler {
            event: event.into(),
            handler,
        }
    }

    /// The slot this property occupies.
    pub fn key(&self) -> PropertyKey {
        match self {
            Self::Attribute { name, .. } | Self::BooleanAttribute { name, .. } => {
                PropertyKey::Attribute(name.clone())
            }
            Self::Style { name, .. } => PropertyKey::Style(name.clone()),
            Self::EventHandler { event, .. } => PropertyKey::Event(event.clone()),
        }
    }

    /// Handler id, for event handler properties.
    pub fn handler(&self) -> Option<HandlerId> {
        match self {
            Self::EventHandler { handler, .. } => Some(*handler),
            _ => None,
        }
    }

    /// Whether this property has no observable effect in markup
    /// (a boolean attribute set to `false`).
    pub fn is_absent_in_markup(&self) -> bool {
        matches!(self, Self::BooleanAttribute { value: false, .. })
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

/// Insertion-ordered property map. Equality ignores ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties(IndexMap<PropertyKey, Property>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. An overwrite keeps the original position.
    pub fn insert(&mut self, property: Property) -> Option<Property> {
        self.0.insert(property.key(), property)
    }

    pub fn get(&self, key: &PropertyKey) -> Option<&Property> {
        self.0.get(key)
    }

    /// Remove while preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &PropertyKey) -> Option<Property> {
        self.0.shift_remove(key)
    }

    pub fn contains(&self, key: &PropertyKey) -> bool {
        self.0.contains_key(key)
    }

    /// Look up a plain or boolean attribute's rendered value.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self.0.get(&PropertyKey::Attribute(name.to_owned()))? {
            Property::Attribute { value, .. } => Some(value),
            Property::BooleanAttribute { value: true, .. } => Some(""),
            _ => None,
        }
    }

    /// The handler bound to `event`, if any.
    pub fn listener(&self, event: &str) -> Option<HandlerId> {
        self.0
            .get(&PropertyKey::Event(event.to_owned()))
            .and_then(Property::handler)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.0.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &PropertyKey> {
        self.0.keys()
    }

    /// All handler ids referenced by event handler properties.
    pub fn handlers(&self) -> impl Iterator<Item = HandlerId> + '_ {
        self.0.values().filter_map(Property::handler)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Property> for Properties {
    fn from_iter<I: IntoIterator<Item = Property>>(iter: I) -> Self {
        let mut props = Self::new();
        for property in iter {
            props.insert(property);
        }
        props
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_order_preserved() {
        let props: Properties = [
            Property::attribute("id", "main"),
            Property::style("color", "red"),
            Property::attribute("class", "card"),
        ]
        .into_iter()
        .collect();
        let names: Vec<_> = props.keys().map(PropertyKey::name).collect();
        assert_eq!(names, vec!["id", "color", "class"]);
    }

    #[test]
    fn duplicate_name_overwrites_in_place() {
        let mut props = Properties::new();
        props.insert(Property::attribute("id", "a"));
        props.insert(Property::attribute("title", "t"));
        let old = props.insert(Property::attribute("id", "b"));
        assert_eq!(old, Some(Property::attribute("id", "a")));
        assert_eq!(props.len(), 2);
        assert_eq!(props.attribute("id"), Some("b"));
        assert_eq!(props.keys().next(), Some(&PropertyKey::Attribute("id".into())));
    }

    #[test]
    fn boolean_and_plain_attribute_share_slot() {
        let mut props = Properties::new();
        props.insert(Property::attribute("disabled", "disabled"));
        props.insert(Property::boolean_attribute("disabled", false));
        assert_eq!(props.len(), 1);
        assert_eq!(props.attribute("disabled"), None);
    }

    #[test]
    fn style_and_attribute_do_not_collide() {
        let mut props = Properties::new();
        props.insert(Property::attribute("color", "x"));
        props.insert(Property::style("color", "red"));
        assert_eq!(props.len(), 2);
    }

    #[test]
    fn equality_ignores_order() {
        let a: Properties = [Property::attribute("a", "1"), Property::attribute("b", "2")]
            .into_iter()
            .collect();
        let b: Properties = [Property::attribute("b", "2"), Property::attribute("a", "1")]
            .into_iter()
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn listener_lookup() {
        let mut props = Properties::new();
        props.insert(Property::event_handler("click", HandlerId::from_raw(7)));
        assert_eq!(props.listener("click"), Some(HandlerId::from_raw(7)));
        assert_eq!(props.listener("input"), None);
        assert_eq!(props.handlers().count(), 1);
    }

    #[test]
    fn remove_keeps_remaining_order() {
        let mut props: Properties = [
            Property::attribute("a", "1"),
            Property::attribute("b", "2"),
            Property::attribute("c", "3"),
        ]
        .into_iter()
        .collect();
        props.remove(&PropertyKey::Attribute("a".into()));
        let names: Vec<_> = props.keys().map(PropertyKey::name).collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[test]
    fn key_display() {
        assert_eq!(PropertyKey::Attribute("id".into()).to_string(), "id");
        assert_eq!(PropertyKey::Style("color".into()).to_string(), "style.color");
        assert_eq!(PropertyKey::Event("click".into()).to_string(), "onclick");
    }
}
