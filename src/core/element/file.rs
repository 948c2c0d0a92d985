//! Purpose: Uploaded file descriptor shared by image and media elements.
//! Exports: `File`.
//! Invariants: Identity is `file_id`; two files with the same id compare equal.
use serde::{Deserialize, Serialize};

use crate::core::payload::Fields;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    pub file_id: i64,
    /// Kept verbatim; the CMS may send relative or empty URLs.
    pub url: String,
    pub mime_type: String,
    pub size: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl File {
    pub fn new(
        file_id: i64,
        url: impl Into<String>,
        mime_type: impl Into<String>,
        size: i64,
    ) -> Self {
        Self {
            file_id,
            url: url.into(),
            mime_type: mime_type.into(),
            size,
            file_name: None,
        }
    }

    pub(crate) fn from_fields(fields: Fields<'_>) -> Self {
        Self {
            file_id: fields.int_or("id", 0),
            url: fields.string("url"),
            mime_type: fields.string("mime_type"),
            size: fields.int_or("size", 0),
            file_name: fields.opt_string("file_name"),
        }
    }

    pub(crate) fn list_from_value(fields: Fields<'_>, key: &str) -> Vec<File> {
        fields
            .objects(key)
            .unwrap_or_default()
            .into_iter()
            .map(File::from_fields)
            .collect()
    }
}

impl PartialEq for File {
    fn eq(&self, other: &Self) -> bool {
        self.file_id == other.file_id
    }
}

impl Eq for File {}
