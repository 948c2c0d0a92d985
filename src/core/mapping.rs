//! Purpose: Best-effort projection of section elements onto arbitrary targets by key path.
//! Exports: `DisplayValue`, `KeyPathTarget`, `apply_mapping`.
//! Role: Lightweight alternative to strict decoding for display-oriented consumers.
//! Invariants: Never fails; elements missing from the section are skipped silently.
//! Invariants: Dotted key paths create intermediate objects on JSON targets.
use serde_json::{Map, Value};
use time::OffsetDateTime;

use crate::core::content::Section;
use crate::core::element::{Element, ElementKind};

#[derive(Clone, Debug, PartialEq)]
pub enum DisplayValue {
    Text(String),
    Bool(bool),
    Timestamp(OffsetDateTime),
    Element(Element),
}

impl DisplayValue {
    pub fn of(element: &Element) -> Self {
        match element.kind() {
            ElementKind::Text(value) => DisplayValue::Text(value.text.clone()),
            ElementKind::Markdown(value) => DisplayValue::Text(value.text.clone()),
            ElementKind::Color(value) => DisplayValue::Text(value.color_hex.clone()),
            ElementKind::Checkbox(value) => DisplayValue::Bool(value.checked),
            ElementKind::Date(value) => DisplayValue::Timestamp(value.date),
            _ => DisplayValue::Element(element.clone()),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            DisplayValue::Text(text) => Value::String(text.clone()),
            DisplayValue::Bool(flag) => Value::Bool(*flag),
            DisplayValue::Timestamp(date) => Value::from(date.unix_timestamp()),
            DisplayValue::Element(element) => serde_json::to_value(element).unwrap_or(Value::Null),
        }
    }
}

pub trait KeyPathTarget {
    fn set_value(&mut self, key_path: &str, value: DisplayValue);
}

impl KeyPathTarget for Map<String, Value> {
    fn set_value(&mut self, key_path: &str, value: DisplayValue) {
        let mut segments = key_path.split('.').peekable();
        let mut current = self;
        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                current.insert(segment.to_string(), value.to_json());
                return;
            }
            let slot = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Value::Object(next) = slot else {
                return;
            };
            current = next;
        }
    }
}

impl KeyPathTarget for Value {
    /// Non-object values are replaced by an object before assignment.
    fn set_value(&mut self, key_path: &str, value: DisplayValue) {
        if !self.is_object() {
            *self = Value::Object(Map::new());
        }
        if let Value::Object(map) = self {
            map.set_value(key_path, value);
        }
    }
}

/// `mapping` is element name → target key path.
pub fn apply_mapping<'m, T, I>(section: &Section, mapping: I, mut target: T) -> T
where
    T: KeyPathTarget,
    I: IntoIterator<Item = (&'m str, &'m str)>,
{
    for (element_name, key_path) in mapping {
        match section.element(element_name) {
            Some(element) => target.set_value(key_path, DisplayValue::of(element)),
            None => tracing::trace!(
                section_id = section.section_id,
                element = element_name,
                "mapping skipped missing element"
            ),
        }
    }
    target
}
