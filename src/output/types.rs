use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

pub const SCHEMA_VERSION: &str = "meal.v1";

/// Timing attached to CLI results.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Meta {
    pub duration_ms: u128,
}

impl Meta {
    pub fn elapsed(since: std::time::Instant) -> Self {
        Meta { duration_ms: since.elapsed().as_millis() }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub schema_version: &'static str,
    pub time: DateTime<Utc>,
    pub request_id: Uuid,
    pub op: &'static str,
    pub result: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl Envelope {
    pub fn result<T: Serialize>(op: &'static str, result: &T, meta: Option<Meta>) -> Result<Self, serde_json::Error> {
        let result = serde_json::to_value(result)?;
        Ok(Envelope {
            schema_version: SCHEMA_VERSION,
            time: Utc::now(),
            request_id: Uuid::new_v4(),
            op,
            result,
            meta,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serialize_result_envelope() {
        let result = json!({"rows": 3});
        let env = Envelope::result("shop", &result, None).expect("to serialize result");
        let s = serde_json::to_string(&env).unwrap();
        assert!(s.contains("\"schema_version\":\"meal.v1\""));
        assert!(s.contains("\"result\""));
        assert!(s.contains("\"shop\""));
        assert!(!s.contains("\"meta\""));
    }

    #[test]
    fn meta_carries_duration() {
        let env = Envelope::result("recipes", &json!([]), Some(Meta { duration_ms: 12 })).unwrap();
        let v = serde_json::to_value(&env).unwrap();
        assert_eq!(v["meta"], json!({"duration_ms": 12}));
    }
}
