//! Purpose: Build elements from raw CMS element descriptors.
//! Exports: `create`, `elements_from_map`.
//! Role: Total dispatch from the wire `type` string to a variant payload parser.
//! Invariants: Never fails; unrecognized types yield `ElementKind::General`.
//! Invariants: Missing shared fields default to `id = -1`, `order = -1`, `name = ""`.
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::kind::{ElementType, classify};
use super::value::{
    AddressValue, CheckboxValue, ColorValue, DateValue, DropdownValue, GeneralValue, ImagesValue,
    MarkdownValue, MediaValue, MultipleValue, PollValue, RelationValue, TextValue,
};
use super::{Element, ElementKind};
use crate::core::payload::Fields;

pub fn create(payload: &Value) -> Element {
    let fields = Fields::new(payload);
    let type_string = fields.string("type");
    let kind = match classify(&type_string) {
        ElementType::Text => ElementKind::Text(TextValue::from_payload(fields)),
        ElementType::Images => ElementKind::Images(ImagesValue::from_payload(fields)),
        ElementType::Media => ElementKind::Media(MediaValue::from_payload(fields)),
        ElementType::Checkbox => ElementKind::Checkbox(CheckboxValue::from_payload(fields)),
        ElementType::Date => ElementKind::Date(DateValue::from_payload(fields)),
        ElementType::Address => ElementKind::Address(AddressValue::from_payload(fields)),
        ElementType::Dropdown => ElementKind::Dropdown(DropdownValue::from_payload(fields)),
        ElementType::Poll => ElementKind::Poll(PollValue::from_payload(fields)),
        ElementType::Markdown => ElementKind::Markdown(MarkdownValue::from_payload(fields)),
        ElementType::Relation => ElementKind::Relation(RelationValue::from_payload(fields)),
        ElementType::Color => ElementKind::Color(ColorValue::from_payload(fields)),
        ElementType::Multiple => ElementKind::Multiple(MultipleValue::from_payload(fields)),
        ElementType::Undefined => {
            tracing::trace!(type_string = %type_string, "unrecognized element type");
            ElementKind::General(GeneralValue::from_payload(fields))
        }
    };
    Element::new(
        fields.int_or("id", -1),
        fields.string("name"),
        fields.int_or("order", -1),
        kind,
    )
}

/// Name-keyed descriptors to elements; non-object descriptors are skipped.
pub fn elements_from_map(items: &Map<String, Value>) -> HashMap<String, Element> {
    items
        .iter()
        .filter(|(_, descriptor)| descriptor.is_object())
        .map(|(key, descriptor)| (key.clone(), create(descriptor)))
        .collect()
}
