//! Purpose: Variant payloads carried by elements and their wire parsers.
//! Exports: one `*Value` struct per element kind plus `ChoiceOption`, `Coordinate`, `Relation`.
//! Role: Each `from_payload` reads the full element descriptor with default-on-absence.
//! Invariants: Parsers never fail; `Poll` results never outnumber answers.
//! Invariants: `Relation` payloads always yield a list, even for a single object.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{OffsetDateTime, PrimitiveDateTime};

use super::file::File;
use super::kind::MediaType;
use crate::core::payload::{Fields, representable_or_epoch, timestamp_from_value};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextValue {
    pub text: String,
}

impl TextValue {
    pub(crate) fn from_payload(fields: Fields<'_>) -> Self {
        Self {
            text: fields.string("value"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkdownValue {
    pub text: String,
}

impl MarkdownValue {
    pub(crate) fn from_payload(fields: Fields<'_>) -> Self {
        Self {
            text: fields.string("value"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagesValue {
    pub images: Vec<File>,
}

impl ImagesValue {
    pub(crate) fn from_payload(fields: Fields<'_>) -> Self {
        Self {
            images: File::list_from_value(fields, "value"),
        }
    }

    pub fn first(&self) -> Option<&File> {
        self.images.first()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaValue {
    pub media_type: MediaType,
    pub medias: Vec<File>,
}

impl MediaValue {
    pub(crate) fn from_payload(fields: Fields<'_>) -> Self {
        Self {
            media_type: MediaType::from_type_string(&fields.string("type")),
            medias: File::list_from_value(fields, "value"),
        }
    }

    pub fn first(&self) -> Option<&File> {
        self.medias.first()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckboxValue {
    pub checked: bool,
}

impl CheckboxValue {
    pub(crate) fn from_payload(fields: Fields<'_>) -> Self {
        Self {
            checked: fields.bool("value"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateValue {
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

impl DateValue {
    pub(crate) fn from_payload(fields: Fields<'_>) -> Self {
        let date = fields
            .get("value")
            .map(parse_date_value)
            .unwrap_or(OffsetDateTime::UNIX_EPOCH);
        Self { date }
    }
}

/// Numbers are unix seconds; strings are RFC 3339 or `dd/MM/yyyy HH:mm` in UTC.
fn parse_date_value(value: &Value) -> OffsetDateTime {
    use time::format_description::well_known::Rfc3339;

    let Some(text) = value.as_str() else {
        return timestamp_from_value(value);
    };
    if let Ok(date) = OffsetDateTime::parse(text, &Rfc3339) {
        return representable_or_epoch(date);
    }
    let Ok(format) = time::format_description::parse("[day]/[month]/[year] [hour]:[minute]")
    else {
        return OffsetDateTime::UNIX_EPOCH;
    };
    PrimitiveDateTime::parse(text, format.as_slice())
        .map(|date| representable_or_epoch(date.assume_utc()))
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AddressValue {
    pub address: String,
    pub coordinate: Coordinate,
}

impl AddressValue {
    pub(crate) fn from_payload(fields: Fields<'_>) -> Self {
        let value = fields.object("value");
        Self {
            address: value.string("address"),
            coordinate: Coordinate {
                latitude: value.float("latitude"),
                longitude: value.float("longitude"),
            },
        }
    }

    pub fn latitude(&self) -> f64 {
        self.coordinate.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.coordinate.longitude
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub key: String,
    pub value: String,
}

impl ChoiceOption {
    fn list_from_payload(fields: Fields<'_>) -> Vec<ChoiceOption> {
        fields
            .objects("options")
            .unwrap_or_default()
            .into_iter()
            .map(|option| ChoiceOption {
                key: option.string("key"),
                value: option.string("value"),
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropdownValue {
    pub options: Vec<ChoiceOption>,
    #[serde(default)]
    pub selected_option: Option<String>,
}

impl DropdownValue {
    pub(crate) fn from_payload(fields: Fields<'_>) -> Self {
        Self {
            options: ChoiceOption::list_from_payload(fields),
            selected_option: fields.opt_string("value"),
        }
    }

    /// The option whose key matches the selection, if any.
    pub fn selected(&self) -> Option<&ChoiceOption> {
        let selected = self.selected_option.as_deref()?;
        self.options.iter().find(|option| option.key == selected)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipleValue {
    pub options: Vec<ChoiceOption>,
    #[serde(default)]
    pub selected_options: Option<Vec<String>>,
}

impl MultipleValue {
    pub(crate) fn from_payload(fields: Fields<'_>) -> Self {
        Self {
            options: ChoiceOption::list_from_payload(fields),
            selected_options: fields.strings("value"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollValue {
    pub answers: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub expiration_date: OffsetDateTime,
    #[serde(default)]
    pub results: Option<Vec<i64>>,
    pub answered: bool,
    #[serde(default)]
    pub answer: Option<i64>,
}

impl PollValue {
    pub(crate) fn from_payload(fields: Fields<'_>) -> Self {
        let value = fields.object("value");
        let answers = value.strings("answers").unwrap_or_default();
        let results = value.ints("results").map(|mut results| {
            results.truncate(answers.len());
            results
        });
        Self {
            answers,
            expiration_date: value.timestamp("ends_at"),
            results,
            answered: value.bool("answered"),
            answer: value.opt_int("answer"),
        }
    }

    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now >= self.expiration_date
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    pub block_id: i64,
    pub section_id: i64,
}

impl Relation {
    fn from_fields(fields: Fields<'_>) -> Self {
        Self {
            block_id: fields.int_or("block_id", 0),
            section_id: fields.int_or("section_id", 0),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationValue {
    pub relations: Vec<Relation>,
}

impl RelationValue {
    pub(crate) fn from_payload(fields: Fields<'_>) -> Self {
        let relations = match fields.get("value") {
            Some(Value::Object(map)) => vec![Relation::from_fields(Fields::from_map(map))],
            Some(Value::Array(_)) => fields
                .objects("value")
                .unwrap_or_default()
                .into_iter()
                .map(Relation::from_fields)
                .collect(),
            _ => Vec::new(),
        };
        Self { relations }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorValue {
    pub color_hex: String,
}

impl ColorValue {
    pub(crate) fn from_payload(fields: Fields<'_>) -> Self {
        Self {
            color_hex: fields.string("value"),
        }
    }

    /// `#RRGGBB` or `RRGGBB` as 8-bit channels.
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        let hex = self.color_hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralValue {
    /// JSON encoding of the descriptor's `value`, when present.
    #[serde(default)]
    pub raw_value: Option<Vec<u8>>,
    #[serde(default)]
    pub raw_type: Option<String>,
}

impl GeneralValue {
    pub(crate) fn from_payload(fields: Fields<'_>) -> Self {
        Self {
            raw_value: fields
                .get("value")
                .and_then(|value| serde_json::to_vec(value).ok()),
            raw_type: fields.opt_string("type"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AddressValue, ColorValue, DateValue, DropdownValue, GeneralValue, MediaValue,
        MultipleValue, PollValue, RelationValue,
    };
    use crate::core::element::MediaType;
    use crate::core::payload::Fields;
    use serde_json::json;
    use time::OffsetDateTime;

    #[test]
    fn poll_results_are_truncated_to_answers() {
        let payload = json!({
            "type": "poll",
            "value": {
                "answers": ["yes", "no"],
                "results": [4, 2, 9, 1],
                "ends_at": 1600000000,
                "answered": true,
                "answer": 1
            }
        });
        let poll = PollValue::from_payload(Fields::new(&payload));
        assert_eq!(poll.results, Some(vec![4, 2]));
        assert!(poll.answered);
        assert_eq!(poll.answer, Some(1));
        assert_eq!(poll.expiration_date.unix_timestamp(), 1600000000);
    }

    #[test]
    fn poll_short_results_are_not_padded() {
        let payload = json!({"value": {"answers": ["a", "b", "c"], "results": [1]}});
        let poll = PollValue::from_payload(Fields::new(&payload));
        assert_eq!(poll.results, Some(vec![1]));
        assert_eq!(poll.expiration_date, OffsetDateTime::UNIX_EPOCH);
    }

    #[test]
    fn relation_single_object_becomes_singleton() {
        let payload = json!({"value": {"block_id": 3, "section_id": 44}});
        let relation = RelationValue::from_payload(Fields::new(&payload));
        assert_eq!(relation.relations.len(), 1);
        assert_eq!(relation.relations[0].block_id, 3);
        assert_eq!(relation.relations[0].section_id, 44);
    }

    #[test]
    fn relation_array_keeps_every_object() {
        let payload = json!({"value": [
            {"block_id": 1, "section_id": 10},
            {"block_id": 2, "section_id": 20}
        ]});
        let relation = RelationValue::from_payload(Fields::new(&payload));
        assert_eq!(relation.relations.len(), 2);
        assert_eq!(relation.relations[1].section_id, 20);
    }

    #[test]
    fn relation_without_value_is_empty_list() {
        let relation = RelationValue::from_payload(Fields::new(&json!({})));
        assert!(relation.relations.is_empty());
    }

    #[test]
    fn media_type_follows_wire_type() {
        let payload = json!({
            "type": "audio",
            "value": [{"id": 5, "url": "u", "mime_type": "audio/mpeg", "size": 1}]
        });
        let media = MediaValue::from_payload(Fields::new(&payload));
        assert_eq!(media.media_type, MediaType::Audio);
        assert_eq!(media.first().map(|file| file.file_id), Some(5));
    }

    #[test]
    fn date_accepts_numbers_and_both_string_formats() {
        let numeric = DateValue::from_payload(Fields::new(&json!({"value": 60})));
        assert_eq!(numeric.date.unix_timestamp(), 60);

        let rfc = DateValue::from_payload(Fields::new(&json!({"value": "2020-04-10T13:41:00Z"})));
        assert_eq!(rfc.date.unix_timestamp(), 1586526060);

        let legacy = DateValue::from_payload(Fields::new(&json!({"value": "10/04/2020 13:41"})));
        assert_eq!(legacy.date.unix_timestamp(), 1586526060);

        let garbage = DateValue::from_payload(Fields::new(&json!({"value": "tomorrow"})));
        assert_eq!(garbage.date, OffsetDateTime::UNIX_EPOCH);
    }

    #[test]
    fn address_reads_nested_coordinates() {
        let payload = json!({
            "value": {"address": "Via Roma 1", "latitude": 45.5, "longitude": 9.25}
        });
        let address = AddressValue::from_payload(Fields::new(&payload));
        assert_eq!(address.address, "Via Roma 1");
        assert_eq!(address.latitude(), 45.5);
        assert_eq!(address.longitude(), 9.25);
    }

    #[test]
    fn dropdown_and_multiple_read_options() {
        let payload = json!({
            "options": [{"key": "r", "value": "Red"}, {"key": "g", "value": "Green"}],
            "value": "g"
        });
        let dropdown = DropdownValue::from_payload(Fields::new(&payload));
        assert_eq!(dropdown.options.len(), 2);
        assert_eq!(dropdown.selected().map(|option| option.value.as_str()), Some("Green"));

        let payload = json!({"options": [{"key": "r", "value": "Red"}], "value": ["r"]});
        let multiple = MultipleValue::from_payload(Fields::new(&payload));
        assert_eq!(multiple.selected_options, Some(vec!["r".to_string()]));
    }

    #[test]
    fn color_hex_parses_to_rgb() {
        let color = ColorValue {
            color_hex: "#FF8000".to_string(),
        };
        assert_eq!(color.rgb(), Some((255, 128, 0)));
        let bad = ColorValue {
            color_hex: "#F80".to_string(),
        };
        assert_eq!(bad.rgb(), None);
    }

    #[test]
    fn general_keeps_raw_value_and_type() {
        let payload = json!({"type": "hologram", "value": {"depth": 3}});
        let general = GeneralValue::from_payload(Fields::new(&payload));
        assert_eq!(general.raw_type.as_deref(), Some("hologram"));
        let raw = general.raw_value.expect("raw value");
        let decoded: serde_json::Value = serde_json::from_slice(&raw).expect("json");
        assert_eq!(decoded, json!({"depth": 3}));
    }
}
