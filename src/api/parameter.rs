//! Purpose: Typed query parameters accepted by list and detail requests.
//! Exports: `Parameter`, `ImageFormat`, `query_pairs`.
//! Role: Each parameter renders to one or more query pairs; the client merges them.
//! Invariants: Merging is last-writer-wins per key, in the order parameters are given.
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ImageFormat {
    Original,
    Thumb,
    Medium,
    Large,
}

impl ImageFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageFormat::Original => "original",
            ImageFormat::Thumb => "thumb",
            ImageFormat::Medium => "medium",
            ImageFormat::Large => "large",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Parameter {
    Filter { field: String, value: String },
    Sort { field: String, ascending: bool },
    Pagination { skip: u64, take: u64 },
    ImageFormat(ImageFormat),
    OriginalMedia,
    ForceLocaleFallback,
    /// Bounding box given by its north-east and south-west corners as `(lat, lon)`.
    Geofence { north_east: (f64, f64), south_west: (f64, f64) },
    General { key: String, value: String },
}

impl Parameter {
    pub fn filter(field: impl Into<String>, value: impl Into<String>) -> Self {
        Parameter::Filter {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Filter on a named sub-value, rendered as `name|value`.
    pub fn filter_named(field: impl Into<String>, name: &str, value: &str) -> Self {
        Parameter::Filter {
            field: field.into(),
            value: format!("{name}|{value}"),
        }
    }

    pub fn sort(field: impl Into<String>, ascending: bool) -> Self {
        Parameter::Sort {
            field: field.into(),
            ascending,
        }
    }

    pub fn general(key: impl Into<String>, value: impl Into<String>) -> Self {
        Parameter::General {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn to_pairs(&self) -> Vec<(String, String)> {
        match self {
            Parameter::Filter { field, value } => vec![(format!("filter[{field}]"), value.clone())],
            Parameter::Sort { field, ascending } => {
                let value = if *ascending {
                    field.clone()
                } else {
                    format!("-{field}")
                };
                vec![("sort".to_string(), value)]
            }
            Parameter::Pagination { skip, take } => vec![
                ("skip".to_string(), skip.to_string()),
                ("take".to_string(), take.to_string()),
            ],
            Parameter::ImageFormat(format) => {
                vec![("image_format".to_string(), format.as_str().to_string())]
            }
            Parameter::OriginalMedia => vec![("original_media".to_string(), "true".to_string())],
            Parameter::ForceLocaleFallback => {
                vec![("force_locale_fallback".to_string(), "true".to_string())]
            }
            Parameter::Geofence {
                north_east,
                south_west,
            } => vec![(
                "filter[elements.geofence]".to_string(),
                format!(
                    "{},{},{},{}",
                    north_east.0, south_west.0, north_east.1, south_west.1
                ),
            )],
            Parameter::General { key, value } => vec![(key.clone(), value.clone())],
        }
    }
}

/// Flattens parameters into query pairs, keeping the first position of each key
/// and the last value written to it.
pub fn query_pairs<'a, I>(parameters: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = &'a Parameter>,
{
    let mut merged: Vec<(String, String)> = Vec::new();
    for parameter in parameters {
        for (key, value) in parameter.to_pairs() {
            merge_pair(&mut merged, key, value);
        }
    }
    merged
}

pub(crate) fn merge_pair(pairs: &mut Vec<(String, String)>, key: String, value: String) {
    match pairs.iter_mut().find(|(existing, _)| *existing == key) {
        Some(slot) => slot.1 = value,
        None => pairs.push((key, value)),
    }
}
