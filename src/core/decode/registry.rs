//! Purpose: Type-directed extractor table used by the strict decoder.
//! Exports: `ExtractorRegistry`.
//! Role: Maps a requested Rust type to either an element extractor or a record decoder.
//! Invariants: Each variant registers its payload and a `TypedElement` view of the element.
//! Invariants: Lookups are keyed by `TypeId`; adding a shape means one `register` call.
//! Invariants: The registry is immutable once handed to a `Decoder`.
use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::sync::OnceLock;

use time::OffsetDateTime;

use super::{Decoder, DecodingError, ElementDecodable};
use crate::core::element::{
    AddressValue, CheckboxValue, ColorValue, DateValue, DropdownValue, Element, ElementKind, File,
    GeneralValue, ImagesValue, MarkdownValue, MediaValue, MultipleValue, PollValue, RelationValue,
    TextValue, TypedElement,
};

type ElementExtractor = Box<dyn Fn(&Element) -> Option<Box<dyn Any>> + Send + Sync>;
type RecordDecoder = fn(&Decoder<'_>) -> Result<Box<dyn Any>, DecodingError>;

pub(crate) enum Entry {
    Element(ElementExtractor),
    Record(RecordDecoder),
}

pub(crate) struct Registered {
    pub(crate) type_name: &'static str,
    pub(crate) entry: Entry,
}

pub struct ExtractorRegistry {
    entries: HashMap<TypeId, Registered>,
}

macro_rules! register_variants {
    ($registry:ident, $($variant:ident => $value:ty),+ $(,)?) => {
        $(
            $registry.register::<$value, _>(|element| match element.kind() {
                ElementKind::$variant(value) => Some(value.clone()),
                _ => None,
            });
            $registry.register::<TypedElement<$value>, _>(|element| {
                TypedElement::from_element(element, |kind| match kind {
                    ElementKind::$variant(value) => Some(value),
                    _ => None,
                })
            });
        )+
    };
}

impl ExtractorRegistry {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Primitive projections, `Element` itself, and for every variant both its payload
    /// and its `TypedElement`.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register::<String, _>(|element| element.as_text().map(str::to_string));
        registry.register::<bool, _>(|element| match element.kind() {
            ElementKind::Checkbox(value) => Some(value.checked),
            _ => None,
        });
        registry.register::<OffsetDateTime, _>(|element| match element.kind() {
            ElementKind::Date(value) => Some(value.date),
            _ => None,
        });
        registry.register::<Vec<File>, _>(|element| element.files().map(<[File]>::to_vec));
        registry.register::<Option<File>, _>(|element| {
            element.files().map(|files| files.first().cloned())
        });
        registry.register::<Element, _>(|element| Some(element.clone()));
        register_variants!(
            registry,
            Text => TextValue,
            Images => ImagesValue,
            Media => MediaValue,
            Checkbox => CheckboxValue,
            Date => DateValue,
            Address => AddressValue,
            Dropdown => DropdownValue,
            Poll => PollValue,
            Markdown => MarkdownValue,
            Relation => RelationValue,
            Color => ColorValue,
            Multiple => MultipleValue,
            General => GeneralValue,
        );
        registry
    }

    /// Process-wide standard table, built on first use and never mutated.
    pub fn shared() -> &'static ExtractorRegistry {
        static STANDARD: OnceLock<ExtractorRegistry> = OnceLock::new();
        STANDARD.get_or_init(ExtractorRegistry::standard)
    }

    /// `extract` returns `None` when the element's variant cannot produce `V`.
    pub fn register<V, F>(&mut self, extract: F)
    where
        V: Any,
        F: Fn(&Element) -> Option<V> + Send + Sync + 'static,
    {
        let extractor: ElementExtractor =
            Box::new(move |element| extract(element).map(|value| Box::new(value) as Box<dyn Any>));
        self.entries.insert(
            TypeId::of::<V>(),
            Registered {
                type_name: type_name::<V>(),
                entry: Entry::Element(extractor),
            },
        );
    }

    pub fn with<V, F>(mut self, extract: F) -> Self
    where
        V: Any,
        F: Fn(&Element) -> Option<V> + Send + Sync + 'static,
    {
        self.register(extract);
        self
    }

    /// Registered records can be requested by key or at the top level; they decode
    /// against the same element map as their parent.
    pub fn register_record<R>(&mut self)
    where
        R: ElementDecodable + Any,
    {
        self.entries.insert(
            TypeId::of::<R>(),
            Registered {
                type_name: type_name::<R>(),
                entry: Entry::Record(decode_record::<R>),
            },
        );
    }

    pub fn with_record<R>(mut self) -> Self
    where
        R: ElementDecodable + Any,
    {
        self.register_record::<R>();
        self
    }

    pub fn contains<V: Any>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<V>())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn lookup<V: Any>(&self) -> Result<&Registered, DecodingError> {
        self.entries
            .get(&TypeId::of::<V>())
            .ok_or_else(|| DecodingError::unsupported(type_name::<V>()))
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

fn decode_record<R>(decoder: &Decoder<'_>) -> Result<Box<dyn Any>, DecodingError>
where
    R: ElementDecodable + Any,
{
    R::decode(decoder).map(|record| Box::new(record) as Box<dyn Any>)
}

pub(crate) fn downcast<V: Any>(boxed: Box<dyn Any>) -> Result<V, DecodingError> {
    boxed
        .downcast::<V>()
        .map(|value| *value)
        .map_err(|_| DecodingError::unsupported(type_name::<V>()))
}
