use std::collections::HashMap;

use derive_more::From;
use serde::{Deserialize, Serialize};

/// Response of `POST /toggle/evaluate`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResponse {
    /// Evaluated toggles by key.
    #[serde(default)]
    pub toggles: HashMap<String, Evaluation>,
}

/// A single evaluated toggle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    #[serde(default)]
    #[allow(missing_docs)]
    pub key: String,
    /// Raw value. Its type is only known in combination with [`Evaluation::toggle_type`].
    #[serde(default)]
    pub value: serde_json::Value,
    /// Declared type of the value.
    #[serde(rename = "type", default)]
    pub toggle_type: ToggleType,
    /// Diagnostic reason reported by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<serde_json::Value>,
    /// Diagnostic error reported by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl Evaluation {
    /// Typed value, or `None` if the value does not match the declared type.
    pub fn toggle_value(&self) -> Option<ToggleValue> {
        ToggleValue::from_typed(self.toggle_type, &self.value)
    }
}

/// Declared type of a toggle value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleType {
    #[allow(missing_docs)]
    Boolean,
    #[allow(missing_docs)]
    String,
    #[allow(missing_docs)]
    Number,
    /// Structured value. The server may call it `object` or `json`.
    #[serde(alias = "json")]
    Object,
    /// A type this SDK does not know about, or no type at all. The value's JSON shape decides.
    #[default]
    #[serde(other)]
    Unknown,
}

/// A typed toggle value.
///
/// Conveniently implements `From` conversions for `bool`, `String`, `&str`, `f64` and JSON
/// objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, From)]
#[serde(untagged)]
pub enum ToggleValue {
    #[allow(missing_docs)]
    Boolean(bool),
    #[allow(missing_docs)]
    String(String),
    #[allow(missing_docs)]
    Number(f64),
    #[allow(missing_docs)]
    Object(serde_json::Map<String, serde_json::Value>),
}

impl From<&str> for ToggleValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl ToggleValue {
    /// Convert `value` under the declared `ty`. Returns `None` on mismatch.
    pub fn from_typed(ty: ToggleType, value: &serde_json::Value) -> Option<ToggleValue> {
        Some(match ty {
            ToggleType::Boolean => ToggleValue::Boolean(value.as_bool()?),
            ToggleType::String => ToggleValue::String(value.as_str()?.to_owned()),
            ToggleType::Number => ToggleValue::Number(value.as_f64()?),
            ToggleType::Object => ToggleValue::Object(value.as_object()?.clone()),
            ToggleType::Unknown => return Self::from_json(value),
        })
    }

    /// Infer the variant from the JSON shape. Arrays and `null` have no toggle representation.
    pub fn from_json(value: &serde_json::Value) -> Option<ToggleValue> {
        use serde_json::Value;
        match value {
            Value::Bool(b) => Some(ToggleValue::Boolean(*b)),
            Value::String(s) => Some(ToggleValue::String(s.clone())),
            Value::Number(n) => n.as_f64().map(ToggleValue::Number),
            Value::Object(o) => Some(ToggleValue::Object(o.clone())),
            Value::Null | Value::Array(_) => None,
        }
    }

    #[allow(missing_docs)]
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            ToggleValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[allow(missing_docs)]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ToggleValue::String(s) => Some(s),
            _ => None,
        }
    }

    #[allow(missing_docs)]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ToggleValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[allow(missing_docs)]
    pub fn as_object(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        match self {
            ToggleValue::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Owned variants of the accessors above.
    pub fn into_string(self) -> Option<String> {
        match self {
            ToggleValue::String(s) => Some(s),
            _ => None,
        }
    }

    #[allow(missing_docs)]
    pub fn into_object(self) -> Option<serde_json::Map<String, serde_json::Value>> {
        match self {
            ToggleValue::Object(o) => Some(o),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parse_evaluation_response() {
        let response: EvaluationResponse = serde_json::from_value(json!({
            "toggles": {
                "feature-flag": {"key": "feature-flag", "value": true, "type": "boolean"},
                "banner": {
                    "key": "banner",
                    "value": "hello",
                    "type": "string",
                    "reason": "TARGETING_MATCH"
                },
                "limits": {"key": "limits", "value": {"max": 3}, "type": "json"},
                "broken": {
                    "key": "broken",
                    "value": null,
                    "type": "number",
                    "errorMessage": "rule failed"
                }
            }
        }))
        .unwrap();

        let flag = &response.toggles["feature-flag"];
        assert_eq!(flag.toggle_type, ToggleType::Boolean);
        assert_eq!(flag.toggle_value(), Some(ToggleValue::Boolean(true)));

        let banner = &response.toggles["banner"];
        assert_eq!(banner.reason, Some(json!("TARGETING_MATCH")));
        assert_eq!(banner.toggle_value().unwrap().as_str(), Some("hello"));

        let limits = &response.toggles["limits"];
        assert_eq!(limits.toggle_type, ToggleType::Object);
        assert_eq!(
            limits.toggle_value().unwrap().as_object().unwrap()["max"],
            json!(3)
        );

        let broken = &response.toggles["broken"];
        assert_eq!(broken.error_message.as_deref(), Some("rule failed"));
        assert_eq!(broken.toggle_value(), None);
    }

    #[test]
    fn declared_type_mismatch_yields_none() {
        assert_eq!(ToggleValue::from_typed(ToggleType::Boolean, &json!("true")), None);
        assert_eq!(ToggleValue::from_typed(ToggleType::String, &json!(1)), None);
        assert_eq!(ToggleValue::from_typed(ToggleType::Number, &json!(false)), None);
        assert_eq!(ToggleValue::from_typed(ToggleType::Object, &json!([1, 2])), None);
    }

    #[test]
    fn unknown_type_uses_json_shape() {
        let evaluation: Evaluation = serde_json::from_value(json!({
            "key": "k",
            "value": 2.5,
            "type": "decimal"
        }))
        .unwrap();

        assert_eq!(evaluation.toggle_type, ToggleType::Unknown);
        assert_eq!(evaluation.toggle_value(), Some(ToggleValue::Number(2.5)));

        let untyped: Evaluation = serde_json::from_value(json!({"key": "k", "value": "x"})).unwrap();
        assert_eq!(untyped.toggle_value(), Some(ToggleValue::String("x".to_owned())));

        assert_eq!(ToggleValue::from_json(&json!(null)), None);
        assert_eq!(ToggleValue::from_json(&json!([true])), None);
    }

    #[test]
    fn integers_are_numbers() {
        assert_eq!(
            ToggleValue::from_typed(ToggleType::Number, &json!(42)),
            Some(ToggleValue::Number(42.0))
        );
    }
}
