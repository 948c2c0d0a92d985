//! Purpose: Lenient field readers over untyped JSON payloads returned by the CMS.
//! Exports: `Fields`, `timestamp_from_value`, `representable_or_epoch`.
//! Role: Shared default-on-absence policy for the factory and content constructors.
//! Invariants: Readers never fail; missing or wrong-typed fields become zero values.
//! Invariants: Timestamps default to the unix epoch and always fall in years 0..=9999.
use serde_json::{Map, Value};
use time::OffsetDateTime;

static EMPTY: std::sync::LazyLock<Map<String, Value>> = std::sync::LazyLock::new(Map::new);

#[derive(Clone, Copy, Debug)]
pub struct Fields<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    /// Non-object values read as an empty object.
    pub fn new(value: &'a Value) -> Self {
        match value.as_object() {
            Some(map) => Self { map },
            None => Self { map: &EMPTY },
        }
    }

    pub fn from_map(map: &'a Map<String, Value>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn int_or(&self, key: &str, default: i64) -> i64 {
        self.get(key).and_then(Value::as_i64).unwrap_or(default)
    }

    pub fn opt_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    pub fn float(&self, key: &str) -> f64 {
        self.get(key).and_then(Value::as_f64).unwrap_or(0.0)
    }

    pub fn string(&self, key: &str) -> String {
        self.opt_string(key).unwrap_or_default()
    }

    pub fn opt_string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(Value::as_str).map(str::to_string)
    }

    pub fn bool(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Nested object; absent or non-object reads as empty.
    pub fn object(&self, key: &str) -> Fields<'a> {
        match self.get(key).and_then(Value::as_object) {
            Some(map) => Fields { map },
            None => Fields { map: &EMPTY },
        }
    }

    pub fn opt_object(&self, key: &str) -> Option<Fields<'a>> {
        self.get(key).and_then(Value::as_object).map(|map| Fields { map })
    }

    /// Object entries of an array; non-object entries are dropped. `None` when not an array.
    pub fn objects(&self, key: &str) -> Option<Vec<Fields<'a>>> {
        let items = self.get(key)?.as_array()?;
        Some(
            items
                .iter()
                .filter_map(Value::as_object)
                .map(|map| Fields { map })
                .collect(),
        )
    }

    /// All-or-nothing: any non-string entry discards the list.
    pub fn strings(&self, key: &str) -> Option<Vec<String>> {
        self.get(key)?
            .as_array()?
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect()
    }

    pub fn ints(&self, key: &str) -> Option<Vec<i64>> {
        self.get(key)?.as_array()?.iter().map(Value::as_i64).collect()
    }

    pub fn timestamp(&self, key: &str) -> OffsetDateTime {
        self.get(key)
            .map(timestamp_from_value)
            .unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }
}

/// Unix seconds (integer or fractional); anything else is the epoch.
pub fn timestamp_from_value(value: &Value) -> OffsetDateTime {
    let parsed = if let Some(secs) = value.as_i64() {
        OffsetDateTime::from_unix_timestamp(secs).ok()
    } else {
        match value.as_f64() {
            Some(secs) if secs.is_finite() => {
                let nanos = (secs * 1_000_000_000.0).round() as i128;
                OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()
            }
            _ => None,
        }
    };
    parsed.map_or(OffsetDateTime::UNIX_EPOCH, representable_or_epoch)
}

/// Instants RFC 3339 cannot write (years outside 0..=9999) read as the epoch.
pub fn representable_or_epoch(date: OffsetDateTime) -> OffsetDateTime {
    if (0..=9999).contains(&date.year()) {
        date
    } else {
        OffsetDateTime::UNIX_EPOCH
    }
}
