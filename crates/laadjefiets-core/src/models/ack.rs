use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Acknowledgement for mutating calls whose body shape the backend does not fix.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Ack {
    /// Build from a response body; empty bodies and non-object bodies are accepted.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => {
                serde_json::from_value(Value::Object(map)).unwrap_or_default()
            }
            _ => Self::default(),
        }
    }
}
