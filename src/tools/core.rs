use serde::Serialize;
use serde_json::{Map, Value};

use super::errors::SkillError;

/// The single JSON object printed for every invocation.
#[derive(Debug, Clone, Serialize)]
pub struct ToolResult {
    pub success: bool,
    #[serde(flatten)]
    pub body: Map<String, Value>,
    #[serde(skip)]
    exit_code: i32,
}

impl ToolResult {
    /// Wraps a report; any `success` field inside the report is superseded
    /// by `success`.
    pub fn new<T: Serialize>(success: bool, report: &T) -> Self {
        let mut body = match serde_json::to_value(report) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                let mut map = Map::new();
                map.insert("result".to_string(), other);
                map
            }
            Err(e) => return Self::failure(&SkillError::other("SerializeError", e)),
        };
        body.remove("success");

        Self {
            success,
            body,
            exit_code: if success { 0 } else { 1 },
        }
    }

    pub fn ok<T: Serialize>(report: &T) -> Self {
        Self::new(true, report)
    }

    pub fn failure(error: &SkillError) -> Self {
        let mut body = Map::new();
        body.insert("error".to_string(), Value::String(error.to_string()));
        body.insert(
            "error_kind".to_string(),
            serde_json::to_value(error.kind()).unwrap_or(Value::Null),
        );
        if let Some(code) = error.status_code() {
            body.insert("status_code".to_string(), Value::from(code));
        }

        Self {
            success: false,
            body,
            exit_code: error.exit_code(),
        }
    }

    /// Names the query, url, ids or title that triggered a failure.
    pub fn with_context(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.body.insert(key.to_string(), value.into());
        self
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    pub fn to_json(&self, pretty: bool) -> String {
        let rendered = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        rendered.unwrap_or_else(|e| {
            format!(
                r#"{{"success":false,"error":"failed to render result: {}","error_kind":"Other"}}"#,
                e.to_string().replace('"', "'")
            )
        })
    }
}
