//! Purpose: Tagged-union model for CMS content elements.
//! Exports: `Element`, `ElementKind`, `TypedElement`, variant payloads, `ElementType`,
//! `classify`, `create`.
//! Role: Leaf data model shared by the factory, content aggregates, and the decoder.
//! Invariants: Shared fields (`id`, `name`, `order`) live on `Element`; payloads on `ElementKind`.
//! Invariants: `element_type()` is derived from the kind and cannot disagree with it.
//! Invariants: Equality and hashing are by `id`; only `name` is mutable after construction.
mod factory;
mod file;
mod kind;
mod value;

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

pub use factory::{create, elements_from_map};
pub use file::File;
pub use kind::{ElementType, MediaType, classify};
pub use value::{
    AddressValue, CheckboxValue, ChoiceOption, ColorValue, Coordinate, DateValue, DropdownValue,
    GeneralValue, ImagesValue, MarkdownValue, MediaValue, MultipleValue, PollValue, Relation,
    RelationValue, TextValue,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ElementKind {
    Text(TextValue),
    Images(ImagesValue),
    Media(MediaValue),
    Checkbox(CheckboxValue),
    Date(DateValue),
    Address(AddressValue),
    Dropdown(DropdownValue),
    Poll(PollValue),
    Markdown(MarkdownValue),
    Relation(RelationValue),
    Color(ColorValue),
    Multiple(MultipleValue),
    General(GeneralValue),
}

impl ElementKind {
    pub fn element_type(&self) -> ElementType {
        match self {
            ElementKind::Text(_) => ElementType::Text,
            ElementKind::Images(_) => ElementType::Images,
            ElementKind::Media(_) => ElementType::Media,
            ElementKind::Checkbox(_) => ElementType::Checkbox,
            ElementKind::Date(_) => ElementType::Date,
            ElementKind::Address(_) => ElementType::Address,
            ElementKind::Dropdown(_) => ElementType::Dropdown,
            ElementKind::Poll(_) => ElementType::Poll,
            ElementKind::Markdown(_) => ElementType::Markdown,
            ElementKind::Relation(_) => ElementType::Relation,
            ElementKind::Color(_) => ElementType::Color,
            ElementKind::Multiple(_) => ElementType::Multiple,
            ElementKind::General(_) => ElementType::Undefined,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Element {
    id: i64,
    name: String,
    order: i64,
    kind: ElementKind,
}

impl Element {
    pub fn new(id: i64, name: impl Into<String>, order: i64, kind: ElementKind) -> Self {
        Self {
            id,
            name: name.into(),
            order,
            kind,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn order(&self) -> i64 {
        self.order
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn into_kind(self) -> ElementKind {
        self.kind
    }

    pub fn element_type(&self) -> ElementType {
        self.kind.element_type()
    }

    /// Text of a text or markdown element.
    pub fn as_text(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Text(value) => Some(&value.text),
            ElementKind::Markdown(value) => Some(&value.text),
            _ => None,
        }
    }

    /// Files of an images or media element.
    pub fn files(&self) -> Option<&[File]> {
        match &self.kind {
            ElementKind::Images(value) => Some(&value.images),
            ElementKind::Media(value) => Some(&value.medias),
            _ => None,
        }
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Element {}

impl Hash for Element {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// An element known to carry payload `V`, keeping its `id`, `name`, and `order`.
///
/// Equality follows the wrapped element's identity.
#[derive(Clone, Debug)]
pub struct TypedElement<V> {
    element: Element,
    value: V,
}

pub type TextElement = TypedElement<TextValue>;
pub type ImagesElement = TypedElement<ImagesValue>;
pub type MediaElement = TypedElement<MediaValue>;
pub type CheckboxElement = TypedElement<CheckboxValue>;
pub type DateElement = TypedElement<DateValue>;
pub type AddressElement = TypedElement<AddressValue>;
pub type DropdownElement = TypedElement<DropdownValue>;
pub type PollElement = TypedElement<PollValue>;
pub type MarkdownElement = TypedElement<MarkdownValue>;
pub type RelationElement = TypedElement<RelationValue>;
pub type ColorElement = TypedElement<ColorValue>;
pub type MultipleElement = TypedElement<MultipleValue>;
pub type GeneralElement = TypedElement<GeneralValue>;

impl<V> TypedElement<V> {
    /// `None` when `project` rejects the element's variant.
    pub fn from_element(
        element: &Element,
        project: impl Fn(&ElementKind) -> Option<&V>,
    ) -> Option<Self>
    where
        V: Clone,
    {
        let value = project(element.kind())?.clone();
        Some(Self {
            element: element.clone(),
            value,
        })
    }

    pub fn id(&self) -> i64 {
        self.element.id
    }

    pub fn name(&self) -> &str {
        &self.element.name
    }

    pub fn order(&self) -> i64 {
        self.element.order
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn into_element(self) -> Element {
        self.element
    }
}

impl<V> PartialEq for TypedElement<V> {
    fn eq(&self, other: &Self) -> bool {
        self.element == other.element
    }
}

impl<V> Eq for TypedElement<V> {}

impl<V> Hash for TypedElement<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.element.hash(state);
    }
}
