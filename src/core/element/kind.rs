//! Purpose: Classify wire `type` strings into element and media discriminators.
//! Exports: `ElementType`, `MediaType`, `classify`.
//! Role: Single mapping table consulted by the factory and by generic consumers.
//! Invariants: Classification is total and case-insensitive; unknown strings are `Undefined`.
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementType {
    Undefined,
    Text,
    Images,
    Media,
    Checkbox,
    Date,
    Address,
    Dropdown,
    Poll,
    Markdown,
    Relation,
    Color,
    Multiple,
}

impl ElementType {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementType::Undefined => "undefined",
            ElementType::Text => "text",
            ElementType::Images => "images",
            ElementType::Media => "media",
            ElementType::Checkbox => "checkbox",
            ElementType::Date => "date",
            ElementType::Address => "address",
            ElementType::Dropdown => "dropdown",
            ElementType::Poll => "poll",
            ElementType::Markdown => "markdown",
            ElementType::Relation => "relation",
            ElementType::Color => "color",
            ElementType::Multiple => "multiple",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn classify(type_string: &str) -> ElementType {
    match type_string.to_ascii_lowercase().as_str() {
        "text" | "textarea" => ElementType::Text,
        "image" => ElementType::Images,
        "media" | "audio" | "video" | "file" | "document" => ElementType::Media,
        "checkbox" => ElementType::Checkbox,
        "datetime" => ElementType::Date,
        "address" => ElementType::Address,
        "dropdown" => ElementType::Dropdown,
        "poll" => ElementType::Poll,
        "markdown" => ElementType::Markdown,
        "relation" => ElementType::Relation,
        "color" => ElementType::Color,
        "multiple" => ElementType::Multiple,
        _ => ElementType::Undefined,
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaType {
    #[default]
    File,
    Audio,
    Video,
    Document,
}

impl MediaType {
    /// `media` and unknown strings fall back to `File`.
    pub fn from_type_string(type_string: &str) -> Self {
        match type_string.to_ascii_lowercase().as_str() {
            "audio" => MediaType::Audio,
            "video" => MediaType::Video,
            "document" => MediaType::Document,
            _ => MediaType::File,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ElementType, MediaType, classify};

    #[test]
    fn classify_covers_the_wire_table() {
        let cases = [
            ("text", ElementType::Text),
            ("textarea", ElementType::Text),
            ("image", ElementType::Images),
            ("media", ElementType::Media),
            ("audio", ElementType::Media),
            ("video", ElementType::Media),
            ("file", ElementType::Media),
            ("document", ElementType::Media),
            ("checkbox", ElementType::Checkbox),
            ("datetime", ElementType::Date),
            ("address", ElementType::Address),
            ("dropdown", ElementType::Dropdown),
            ("poll", ElementType::Poll),
            ("markdown", ElementType::Markdown),
            ("relation", ElementType::Relation),
            ("color", ElementType::Color),
            ("multiple", ElementType::Multiple),
        ];
        for (input, expected) in cases {
            assert_eq!(classify(input), expected, "{input}");
        }
    }

    #[test]
    fn classify_is_case_insensitive() {
        assert_eq!(classify("TextArea"), ElementType::Text);
        assert_eq!(classify("DATETIME"), ElementType::Date);
    }

    #[test]
    fn unknown_strings_are_undefined() {
        assert_eq!(classify(""), ElementType::Undefined);
        assert_eq!(classify("hologram"), ElementType::Undefined);
    }

    #[test]
    fn media_type_defaults_to_file() {
        assert_eq!(MediaType::from_type_string("Video"), MediaType::Video);
        assert_eq!(MediaType::from_type_string("media"), MediaType::File);
        assert_eq!(MediaType::from_type_string("???"), MediaType::File);
    }
}
