use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Status value a remote collaborator uses to mark a successful lookup.
pub const STATUS_OK: &str = "OK";

/// Description of a deployed model and the shape of its output.
///
/// Every field besides `output`, including the opaque `id`, is kept verbatim
/// in `extra` so payloads pass through intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub output: ModelOutput,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Output section of a descriptor. The dispatch tag lives under `type`
/// alongside the type-specific fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOutput {
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl ModelOutput {
    /// Dispatch tag, e.g. `IMG_CLASSIFIER`. `None` when absent or not a string.
    pub fn kind(&self) -> Option<&str> {
        self.payload.get("type").and_then(Value::as_str)
    }
}

impl ModelDescriptor {
    pub fn id(&self) -> Option<&Value> {
        self.extra.get("id")
    }

    pub fn output_type(&self) -> Option<&str> {
        self.output.kind()
    }
}

/// Response body of `GET /api/app/{id}/`.
///
/// `status` is left untyped: successful lookups carry the string `"OK"`,
/// misses carry a numeric HTTP status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppEnvelope {
    pub status: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<Value>,
}

impl AppEnvelope {
    pub fn ok(model: Value) -> Self {
        Self {
            status: Value::String(STATUS_OK.to_string()),
            model: Some(model),
        }
    }

    pub fn with_status(status: impl Into<Value>) -> Self {
        Self {
            status: status.into(),
            model: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status.as_str() == Some(STATUS_OK)
    }
}
