//! Purpose: Aggregate content entities built from CMS payloads.
//! Exports: `Section`, `Block`, `Project`, `LegalContract`, `PaginationInfo`.
//! Role: Owners of element maps and section lists; the unit the decoder runs against.
//! Invariants: Entities are built once from a payload and never updated in place.
//! Invariants: Absent `elements`/`sections`/`contracts` stay `None`, never empty collections.
//! Invariants: Equality is identity-based (`section_id`, `block_id`, ...).
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use time::OffsetDateTime;

use crate::core::decode::{self, DecodingError, ElementDecodable};
use crate::core::element::{Element, elements_from_map};
use crate::core::payload::Fields;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub section_id: i64,
    pub order: i64,
    #[serde(default)]
    pub elements: Option<HashMap<String, Element>>,
    #[serde(with = "time::serde::rfc3339")]
    pub available_at: OffsetDateTime,
    pub in_evidence: bool,
}

impl Section {
    pub fn from_payload(payload: &Value) -> Self {
        let fields = Fields::new(payload);
        let elements = fields
            .get("elements")
            .and_then(Value::as_object)
            .map(elements_from_map);
        Self {
            section_id: fields.int_or("id", -1),
            order: fields.int_or("order", -1),
            elements,
            available_at: fields.timestamp("available_at"),
            in_evidence: fields.bool("in_evidence"),
        }
    }

    pub fn element(&self, name: &str) -> Option<&Element> {
        self.elements.as_ref()?.get(name)
    }

    /// Strict decode of this section's elements; a section without elements decodes
    /// against an empty map.
    pub fn decode<T: ElementDecodable>(&self) -> Result<T, DecodingError> {
        match &self.elements {
            Some(elements) => decode::decode(elements),
            None => decode::decode(&HashMap::new()),
        }
    }
}

impl PartialEq for Section {
    fn eq(&self, other: &Self) -> bool {
        self.section_id == other.section_id
    }
}

impl Eq for Section {}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub block_id: i64,
    pub title: String,
    pub subtitle: String,
    pub order: i64,
    #[serde(default)]
    pub sections: Option<Vec<Section>>,
}

impl Block {
    pub fn from_payload(payload: &Value) -> Self {
        let fields = Fields::new(payload);
        let sections = fields.get("sections").and_then(Value::as_array).map(|items| {
            items
                .iter()
                .filter(|item| item.is_object())
                .map(Section::from_payload)
                .collect()
        });
        Self {
            block_id: fields.int_or("id", -1),
            title: fields.string("title"),
            subtitle: fields.string("subtitle"),
            order: fields.int_or("order", -1),
            sections,
        }
    }

    /// Sections ordered by their `order` field; ties keep payload order.
    pub fn sorted_sections(&self) -> Vec<&Section> {
        let mut sections: Vec<&Section> = self.sections.iter().flatten().collect();
        sections.sort_by_key(|section| section.order);
        sections
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.block_id == other.block_id
    }
}

impl Eq for Block {}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalContract {
    pub contract_id: i64,
    pub name: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    pub active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl LegalContract {
    pub fn from_payload(payload: &Value) -> Self {
        let fields = Fields::new(payload);
        Self {
            contract_id: fields.int_or("id", -1),
            name: fields.string("name"),
            link: fields.opt_string("link"),
            text: fields.opt_string("text"),
            active: fields.bool("active"),
            created_at: fields.timestamp("created_at"),
            updated_at: fields.timestamp("updated_at"),
        }
    }
}

impl PartialEq for LegalContract {
    fn eq(&self, other: &Self) -> bool {
        self.contract_id == other.contract_id
    }
}

impl Eq for LegalContract {}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub project_id: i64,
    pub project_name: String,
    #[serde(default)]
    pub contracts: Option<Vec<LegalContract>>,
}

impl Project {
    pub fn from_payload(payload: &Value) -> Self {
        let fields = Fields::new(payload);
        let contracts = fields.get("contracts").and_then(Value::as_array).map(|items| {
            items
                .iter()
                .filter(|item| item.is_object())
                .map(LegalContract::from_payload)
                .collect()
        });
        Self {
            project_id: fields.int_or("id", 0),
            project_name: fields.string("name"),
            contracts,
        }
    }
}

impl PartialEq for Project {
    fn eq(&self, other: &Self) -> bool {
        self.project_id == other.project_id
    }
}

impl Eq for Project {}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub from: i64,
    pub to: i64,
    pub total: i64,
}

impl PaginationInfo {
    pub fn from_payload(payload: &Value) -> Self {
        let fields = Fields::new(payload);
        Self {
            from: fields.int_or("from", 0),
            to: fields.int_or("to", 0),
            total: fields.int_or("total", 0),
        }
    }

    pub fn has_more(&self) -> bool {
        self.to < self.total
    }
}
