//! Purpose: Strict, type-directed decoding of user records from a section's element map.
//! Exports: `ElementDecodable`, `Decoder`, `KeyedContainer`, `UnkeyedContainer`,
//! `ExtractorRegistry`, `DecodingError`, `decode`.
//! Role: One generic dispatch point replacing hand-written per-record decoders.
//! Invariants: Failures surface as `DecodingError`; there is no default-and-continue.
//! Invariants: Decoding is pure and synchronous; the element map is only borrowed.
//! Invariants: Nested records decode against the same element map as their parent.
mod error;
mod registry;

use std::any::Any;
use std::collections::HashMap;

use crate::core::element::Element;
use registry::{Entry, downcast};

pub use error::DecodingError;
pub use registry::ExtractorRegistry;

/// Records that know how to read themselves out of an element map.
///
/// ```
/// use cmskit::core::decode::{Decoder, DecodingError, ElementDecodable};
/// use cmskit::core::element::File;
///
/// struct Article {
///     title: String,
///     cover: Option<File>,
///     featured: Option<bool>,
/// }
///
/// impl ElementDecodable for Article {
///     fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodingError> {
///         let container = decoder.container();
///         Ok(Self {
///             title: container.decode("title")?,
///             cover: container.decode("cover")?,
///             featured: container.decode_if_present("featured")?,
///         })
///     }
/// }
/// ```
pub trait ElementDecodable: Sized {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodingError>;
}

pub fn decode<T: ElementDecodable>(
    elements: &HashMap<String, Element>,
) -> Result<T, DecodingError> {
    Decoder::new(elements).decode()
}

#[derive(Clone, Copy)]
pub struct Decoder<'a> {
    elements: &'a HashMap<String, Element>,
    registry: &'a ExtractorRegistry,
}

impl<'a> Decoder<'a> {
    /// Decoder over the shared standard registry.
    pub fn new(elements: &'a HashMap<String, Element>) -> Self {
        Self::with_registry(elements, ExtractorRegistry::shared())
    }

    pub fn with_registry(
        elements: &'a HashMap<String, Element>,
        registry: &'a ExtractorRegistry,
    ) -> Self {
        Self { elements, registry }
    }

    pub fn elements(&self) -> &'a HashMap<String, Element> {
        self.elements
    }

    pub fn registry(&self) -> &'a ExtractorRegistry {
        self.registry
    }

    pub fn decode<T: ElementDecodable>(&self) -> Result<T, DecodingError> {
        T::decode(self)
    }

    /// Top-level decode of a type known only through the registry.
    pub fn decode_registered<T: Any>(&self) -> Result<T, DecodingError> {
        let registered = self.registry.lookup::<T>()?;
        match &registered.entry {
            Entry::Record(decode_record) => downcast(decode_record(self)?),
            Entry::Element(_) => Err(DecodingError::unsupported(registered.type_name)),
        }
    }

    pub fn container(&self) -> KeyedContainer<'a> {
        KeyedContainer { decoder: *self }
    }

    pub fn unkeyed_container(&self) -> UnkeyedContainer<'a> {
        UnkeyedContainer { decoder: *self }
    }

    pub fn single_value_container(&self) -> UnkeyedContainer<'a> {
        UnkeyedContainer { decoder: *self }
    }
}

/// Field-by-name access over the element map.
#[derive(Clone, Copy)]
pub struct KeyedContainer<'a> {
    decoder: Decoder<'a>,
}

impl<'a> KeyedContainer<'a> {
    /// Element names, sorted.
    pub fn all_keys(&self) -> Vec<&'a str> {
        let mut keys: Vec<&'a str> = self.decoder.elements.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn contains(&self, key: &str) -> bool {
        self.decoder.elements.contains_key(key)
    }

    pub fn decode<V: Any>(&self, key: &str) -> Result<V, DecodingError> {
        let registered = self.decoder.registry.lookup::<V>()?;
        match &registered.entry {
            Entry::Element(extract) => {
                let element = self
                    .decoder
                    .elements
                    .get(key)
                    .ok_or_else(|| DecodingError::entry_missing(key))?;
                let value = extract(element).ok_or_else(|| {
                    DecodingError::type_mismatch(registered.type_name, element.element_type())
                        .at_key(key)
                })?;
                downcast(value)
            }
            Entry::Record(decode_record) => downcast(decode_record(&self.decoder)?),
        }
    }

    /// A missing key is `None`; a present key with the wrong variant is still an error.
    pub fn decode_if_present<V: Any>(&self, key: &str) -> Result<Option<V>, DecodingError> {
        let registered = self.decoder.registry.lookup::<V>()?;
        if matches!(registered.entry, Entry::Element(_)) && !self.contains(key) {
            return Ok(None);
        }
        self.decode(key).map(Some)
    }

    /// Decode a nested record from the same element map.
    pub fn nested<R: ElementDecodable>(&self) -> Result<R, DecodingError> {
        self.decoder.decode()
    }

    pub fn decoder(&self) -> Decoder<'a> {
        self.decoder
    }
}

/// Positional access. The element wire format has no top-level arrays, so this
/// never reaches an end and decodes by deferring to the record path.
#[derive(Clone, Copy)]
pub struct UnkeyedContainer<'a> {
    decoder: Decoder<'a>,
}

impl<'a> UnkeyedContainer<'a> {
    pub fn count(&self) -> Option<usize> {
        None
    }

    pub fn current_index(&self) -> usize {
        0
    }

    pub fn is_at_end(&self) -> bool {
        false
    }

    pub fn decode<T: ElementDecodable>(&self) -> Result<T, DecodingError> {
        self.decoder.decode()
    }

    pub fn decode_registered<T: Any>(&self) -> Result<T, DecodingError> {
        self.decoder.decode_registered()
    }

    pub fn nested_container(&self) -> KeyedContainer<'a> {
        self.decoder.container()
    }
}

#[cfg(test)]
mod tests {
    use super::{Decoder, DecodingError, ElementDecodable, ExtractorRegistry, decode};
    use crate::core::element::{Element, ElementType, File, PollElement, PollValue, create};
    use serde_json::json;
    use std::collections::HashMap;
    use time::OffsetDateTime;

    fn elements(items: serde_json::Value) -> HashMap<String, Element> {
        crate::core::element::elements_from_map(items.as_object().expect("object"))
    }

    fn sample() -> HashMap<String, Element> {
        elements(json!({
            "title": {"id": 1, "name": "title", "order": 1, "type": "text", "value": "Hello"},
            "body": {"id": 2, "name": "body", "order": 2, "type": "markdown", "value": "*md*"},
            "published": {"id": 3, "name": "published", "order": 3, "type": "checkbox",
                          "value": true},
            "when": {"id": 4, "name": "when", "order": 4, "type": "datetime",
                     "value": 1586526060},
            "gallery": {"id": 5, "name": "gallery", "order": 5, "type": "image", "value": [
                {"id": 50, "url": "https://cdn/a.png", "mime_type": "image/png", "size": 1},
                {"id": 51, "url": "https://cdn/b.png", "mime_type": "image/png", "size": 2}
            ]},
            "survey": {"id": 6, "name": "survey", "order": 6, "type": "poll", "value": {
                "answers": ["a", "b"], "results": [1, 2, 3], "ends_at": 10
            }}
        }))
    }

    #[derive(Debug, PartialEq)]
    struct Headline {
        title: String,
        published: bool,
    }

    impl ElementDecodable for Headline {
        fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodingError> {
            let container = decoder.container();
            Ok(Self {
                title: container.decode("title")?,
                published: container.decode("published")?,
            })
        }
    }

    #[derive(Debug, PartialEq)]
    struct Story {
        headline: Headline,
        body: String,
        when: OffsetDateTime,
        cover: Option<File>,
        gallery: Vec<File>,
        survey: PollValue,
        subtitle: Option<String>,
    }

    impl ElementDecodable for Story {
        fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodingError> {
            let container = decoder.container();
            Ok(Self {
                headline: container.nested()?,
                body: container.decode("body")?,
                when: container.decode("when")?,
                cover: container.decode("gallery")?,
                gallery: container.decode("gallery")?,
                survey: container.decode("survey")?,
                subtitle: container.decode_if_present("subtitle")?,
            })
        }
    }

    #[test]
    fn decodes_primitives_files_variants_and_nested_records() {
        let story: Story = decode(&sample()).expect("decode");
        assert_eq!(story.headline.title, "Hello");
        assert!(story.headline.published);
        assert_eq!(story.body, "*md*");
        assert_eq!(story.when.unix_timestamp(), 1586526060);
        assert_eq!(story.cover.map(|file| file.file_id), Some(50));
        assert_eq!(story.gallery.len(), 2);
        assert_eq!(story.survey.results, Some(vec![1, 2]));
        assert!(story.subtitle.is_none());
    }

    #[test]
    fn missing_required_key_is_entry_missing() {
        let mut map = sample();
        map.remove("published");
        let err = decode::<Headline>(&map).expect_err("missing");
        assert_eq!(err, DecodingError::entry_missing("published"));
    }

    #[test]
    fn wrong_variant_is_type_mismatch() {
        let mut map = sample();
        map.insert(
            "published".to_string(),
            create(&json!({"id": 9, "name": "published", "type": "text", "value": "yes"})),
        );
        let err = decode::<Headline>(&map).expect_err("mismatch");
        match err {
            DecodingError::TypeMismatch { key, expected, found } => {
                assert_eq!(key.as_deref(), Some("published"));
                assert_eq!(expected, "bool");
                assert_eq!(found, ElementType::Text);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn decode_if_present_still_checks_variant() {
        let map = sample();
        let container = Decoder::new(&map).container();
        assert_eq!(container.decode_if_present::<bool>("nope"), Ok(None));
        assert!(
            container
                .decode_if_present::<bool>("title")
                .expect_err("mismatch")
                .is_type_mismatch()
        );
    }

    #[test]
    fn unregistered_field_type_is_unsupported() {
        let map = sample();
        let err = Decoder::new(&map)
            .container()
            .decode::<u32>("title")
            .expect_err("unsupported");
        assert!(err.is_unsupported_target());
    }

    #[test]
    fn registered_records_decode_by_type() {
        let map = sample();
        let registry = ExtractorRegistry::standard().with_record::<Headline>();
        let decoder = Decoder::with_registry(&map, &registry);
        let headline: Headline = decoder.decode_registered().expect("record");
        assert_eq!(headline.title, "Hello");
        let keyed: Headline = decoder.container().decode("anything").expect("keyed record");
        assert_eq!(keyed, headline);

        let err = Decoder::new(&map)
            .decode_registered::<Headline>()
            .expect_err("not registered");
        assert!(err.is_unsupported_target());
        let err = Decoder::new(&map)
            .decode_registered::<String>()
            .expect_err("element types are not records");
        assert!(err.is_unsupported_target());
    }

    #[test]
    fn unkeyed_container_defers_to_record_path() {
        let map = sample();
        let unkeyed = Decoder::new(&map).unkeyed_container();
        assert!(!unkeyed.is_at_end());
        assert_eq!(unkeyed.count(), None);
        assert_eq!(unkeyed.current_index(), 0);
        let headline: Headline = unkeyed.decode().expect("decode");
        assert_eq!(headline.title, "Hello");
        assert!(unkeyed.nested_container().contains("survey"));
    }

    #[test]
    fn decoding_is_deterministic() {
        let map = sample();
        let first: Story = decode(&map).expect("first");
        let second: Story = decode(&map).expect("second");
        assert_eq!(first, second);
    }

    #[test]
    fn keyed_container_lists_sorted_keys() {
        let map = sample();
        let keys = Decoder::new(&map).container().all_keys();
        assert_eq!(keys, vec!["body", "gallery", "published", "survey", "title", "when"]);
    }

    #[test]
    fn typed_elements_keep_identity() {
        let map = sample();
        let container = Decoder::new(&map).container();
        let survey: PollElement = container.decode("survey").expect("poll element");
        assert_eq!(survey.id(), 6);
        assert_eq!(survey.name(), "survey");
        assert_eq!(survey.order(), 6);
        assert_eq!(survey.value().answers, vec!["a".to_string(), "b".to_string()]);

        let err = container.decode::<PollElement>("title").expect_err("mismatch");
        match err {
            DecodingError::TypeMismatch { key, found, .. } => {
                assert_eq!(key.as_deref(), Some("title"));
                assert_eq!(found, ElementType::Text);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn shared_registry_decodes_across_threads() {
        let map = sample();
        let expected: Story = decode(&map).expect("decode");
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        Decoder::with_registry(&map, ExtractorRegistry::shared()).decode::<Story>()
                    })
                })
                .collect();
            for handle in handles {
                let story = handle.join().expect("thread").expect("decode");
                assert_eq!(story, expected);
            }
        });
    }
}
