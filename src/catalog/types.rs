use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::shopping::quantity::Quantity;

pub const DEFAULT_CATEGORY: &str = "Other";

fn default_serves() -> f64 { 1.0 }

/// One catalog record. Fields the planner does not interpret (instructions, notes, ...)
/// ride along in `extra` so search results return the record as stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    pub name: String,
    #[serde(default = "default_serves")]
    pub serves: f64,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ingredient {
    pub name: String,
    #[serde(default)]
    pub quantity: Quantity,
    #[serde(default, deserialize_with = "scalar_label")]
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "scalar_label")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Ingredient {
    /// Category with the "Other" fallback applied (absent and null both fall back).
    pub fn category_or_default(&self) -> &str {
        self.category.as_deref().unwrap_or(DEFAULT_CATEGORY)
    }
}

/// Unit and category labels: strings as-is, numbers and booleans in their JSON
/// spelling, null as absent. Arrays and objects make the catalog corrupt.
fn scalar_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(D::Error::custom(format!("expected a text label, found {other}"))),
    }
}
