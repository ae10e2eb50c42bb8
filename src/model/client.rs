use serde::Deserialize;
use serde_json::Value;

/// Fields are kept as raw JSON: a missing, null or wrongly typed field is
/// treated as absent and rejected by the route with a 400.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGameRequest {
    #[serde(default)]
    pub session_id: Option<Value>,
}

impl NewGameRequest {
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_ref().and_then(Value::as_str)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickRequest {
    #[serde(default)]
    pub session_id: Option<Value>,
    #[serde(default)]
    pub row: Option<Value>,
    #[serde(default)]
    pub col: Option<Value>,
}

impl ClickRequest {
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_ref().and_then(Value::as_str)
    }

    pub fn row(&self) -> Option<i64> {
        self.row.as_ref().and_then(Value::as_i64)
    }

    pub fn col(&self) -> Option<i64> {
        self.col.as_ref().and_then(Value::as_i64)
    }
}
