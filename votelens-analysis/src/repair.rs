//! Structural checks and gap filling for model output.
//!
//! Repair is deliberately lopsided: a missing top-level key or a missing
//! field on a news item is patched with a placeholder, while a missing or
//! empty news bucket rejects the whole result.

use chrono::Utc;
use serde_json::{json, Map, Value};
use votelens_common::{Result, VotelensError};

/// Default inserted for a missing top-level key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDefault {
    Array,
    Text,
    Object,
}

impl KeyDefault {
    fn value(self) -> Value {
        match self {
            KeyDefault::Array => Value::Array(Vec::new()),
            KeyDefault::Text => Value::String(String::new()),
            KeyDefault::Object => Value::Object(Map::new()),
        }
    }
}

/// A news bucket that came back with fewer items than asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortfall {
    pub bucket: &'static str,
    pub expected: usize,
    pub got: usize,
}

/// What the rules changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepairReport {
    pub filled_keys: Vec<String>,
    /// Item fields filled with placeholders, e.g. `news.negative[3].key_phrases`.
    pub filled_fields: Vec<String>,
    /// Items that were not objects and had to be rebuilt.
    pub coerced_items: usize,
    pub shortfalls: Vec<Shortfall>,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        self.filled_keys.is_empty()
            && self.filled_fields.is_empty()
            && self.coerced_items == 0
            && self.shortfalls.is_empty()
    }
}

pub trait RepairRule: Send + Sync {
    fn name(&self) -> &'static str;

    /// Patch `value` in place or reject it with [`VotelensError::Validation`].
    fn apply(&self, value: &mut Value, report: &mut RepairReport) -> Result<()>;
}

/// Apply `rules` in order, stopping at the first hard failure.
pub fn repair(value: &mut Value, rules: &[Box<dyn RepairRule>]) -> Result<RepairReport> {
    let mut report = RepairReport::default();
    for rule in rules {
        rule.apply(value, &mut report)?;
    }
    if !report.is_clean() {
        tracing::debug!(
            filled_keys = ?report.filled_keys,
            filled_fields = report.filled_fields.len(),
            coerced_items = report.coerced_items,
            shortfalls = report.shortfalls.len(),
            "repair.applied"
        );
    }
    Ok(report)
}

fn root_object<'a>(value: &'a mut Value, rule: &str) -> Result<&'a mut Map<String, Value>> {
    value.as_object_mut().ok_or_else(|| {
        VotelensError::Validation(format!("{rule}: expected a JSON object at the top level"))
    })
}

/// Insert defaults for missing (or null) top-level keys.
#[derive(Debug, Clone)]
pub struct RequiredKeys {
    keys: Vec<(&'static str, KeyDefault)>,
}

impl RequiredKeys {
    pub fn new(keys: Vec<(&'static str, KeyDefault)>) -> Self {
        Self { keys }
    }
}

impl RepairRule for RequiredKeys {
    fn name(&self) -> &'static str {
        "required_keys"
    }

    fn apply(&self, value: &mut Value, report: &mut RepairReport) -> Result<()> {
        let obj = root_object(value, self.name())?;
        for (key, default) in &self.keys {
            if obj.get(*key).map_or(true, Value::is_null) {
                obj.insert((*key).to_string(), default.value());
                report.filled_keys.push((*key).to_string());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct Bucket {
    name: &'static str,
    min: usize,
    score: f64,
}

const BUCKETS: [Bucket; 3] = [
    Bucket {
        name: "positive",
        min: 10,
        score: 0.7,
    },
    Bucket {
        name: "negative",
        min: 10,
        score: -0.7,
    },
    Bucket {
        name: "neutral",
        min: 5,
        score: 0.0,
    },
];

/// Validate the `news` buckets and fill gaps in their items.
#[derive(Debug, Clone)]
pub struct NewsBuckets {
    key: &'static str,
    /// Date stamped on items without one; `None` means today (UTC).
    today: Option<String>,
}

impl Default for NewsBuckets {
    fn default() -> Self {
        Self {
            key: "news",
            today: None,
        }
    }
}

impl NewsBuckets {
    pub fn with_today(mut self, date: impl Into<String>) -> Self {
        self.today = Some(date.into());
        self
    }

    fn today(&self) -> String {
        self.today
            .clone()
            .unwrap_or_else(|| Utc::now().format("%Y-%m-%d").to_string())
    }

    fn fill_item(
        &self,
        item: &mut Value,
        bucket: Bucket,
        path: String,
        today: &str,
        report: &mut RepairReport,
    ) {
        match item {
            Value::Object(_) => {}
            Value::String(s) => {
                let headline = std::mem::take(s);
                *item = json!({ "headline": headline });
                report.coerced_items += 1;
            }
            _ => {
                *item = Value::Object(Map::new());
                report.coerced_items += 1;
            }
        }
        let Some(obj) = item.as_object_mut() else {
            return;
        };
        let defaults = [
            ("headline", json!("Headline unavailable")),
            ("source", json!("Unknown source")),
            ("date", json!(today)),
            ("summary", json!("Summary unavailable.")),
            ("sentiment_score", json!(bucket.score)),
            ("key_phrases", json!(["general"])),
        ];
        for (field, default) in defaults {
            if obj.get(field).map_or(true, Value::is_null) {
                obj.insert(field.to_string(), default);
                report.filled_fields.push(format!("{path}.{field}"));
            }
        }
    }
}

impl RepairRule for NewsBuckets {
    fn name(&self) -> &'static str {
        "news_buckets"
    }

    fn apply(&self, value: &mut Value, report: &mut RepairReport) -> Result<()> {
        let key = self.key;
        let root = root_object(value, self.name())?;
        let news = root
            .get_mut(key)
            .ok_or_else(|| VotelensError::Validation(format!("`{key}` is missing")))?
            .as_object_mut()
            .ok_or_else(|| VotelensError::Validation(format!("`{key}` is not an object")))?;

        // Validate every bucket before touching any item.
        for bucket in BUCKETS {
            match news.get(bucket.name) {
                Some(Value::Array(items)) if !items.is_empty() => {}
                Some(Value::Array(_)) => {
                    return Err(VotelensError::Validation(format!(
                        "`{key}.{}` is empty",
                        bucket.name
                    )))
                }
                _ => {
                    return Err(VotelensError::Validation(format!(
                        "`{key}.{}` is missing or not an array",
                        bucket.name
                    )))
                }
            }
        }

        let today = self.today();
        for bucket in BUCKETS {
            let Some(items) = news.get_mut(bucket.name).and_then(Value::as_array_mut) else {
                continue;
            };
            if items.len() < bucket.min {
                tracing::warn!(
                    bucket = bucket.name,
                    expected = bucket.min,
                    got = items.len(),
                    "repair.news.shortfall"
                );
                report.shortfalls.push(Shortfall {
                    bucket: bucket.name,
                    expected: bucket.min,
                    got: items.len(),
                });
            }
            for (idx, item) in items.iter_mut().enumerate() {
                let path = format!("{key}.{}[{idx}]", bucket.name);
                self.fill_item(item, bucket, path, &today, report);
            }
        }
        Ok(())
    }
}
