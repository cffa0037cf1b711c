use rocket::{
    http::Status,
    response::{status, Responder},
    serde::json::{serde_json, Json, Value},
    Request,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The discriminator of every reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Success,
    Failure,
}

/// The uniform JSON wrapper returned by every endpoint:
/// `{ "result": "success" | "failure", "data"?: <any>, "error"?: <string> }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub result: ResultKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    /// Build an envelope. Falsy `data` (null, false, 0, "") and falsy `error`
    /// (the empty string) are dropped, and the result is a failure exactly
    /// when an error remains.
    pub fn new(data: Option<Value>, error: Option<String>) -> Self {
        let data = data.filter(is_truthy);
        let error = error.filter(|error| !error.is_empty());
        Self {
            result: if error.is_some() {
                ResultKind::Failure
            } else {
                ResultKind::Success
            },
            data,
            error,
        }
    }

    /// A bare success.
    pub fn success() -> Self {
        Self::new(None, None)
    }

    /// A success carrying `data`.
    pub fn with_data<T: Serialize>(data: &T) -> Result<Self> {
        Ok(Self::new(Some(serde_json::to_value(data)?), None))
    }

    /// A failure carrying `error`.
    pub fn failure(error: impl Into<String>) -> Self {
        Self::new(None, Some(error.into()))
    }
}

/// JavaScript truthiness of a JSON value.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Envelope {
    fn respond_to(self, req: &'r Request<'_>) -> rocket::response::Result<'o> {
        Json(self).respond_to(req)
    }
}

/// A terminal response: a status plus the envelope to send with it.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: Status,
    pub body: Envelope,
}

impl Reply {
    pub fn new(status: Status, body: Envelope) -> Self {
        Self { status, body }
    }

    pub fn failure(status: Status, error: impl Into<String>) -> Self {
        Self::new(status, Envelope::failure(error))
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Reply {
    fn respond_to(self, req: &'r Request<'_>) -> rocket::response::Result<'o> {
        status::Custom(self.status, Json(self.body)).respond_to(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rocket::serde::json::json;

    #[test]
    fn data_only_is_success() {
        let envelope = Envelope::new(Some(json!({"id": 1})), None);
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"result": "success", "data": {"id": 1}})
        );
    }

    #[test]
    fn error_only_is_failure() {
        let envelope = Envelope::new(None, Some("boom".to_string()));
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"result": "failure", "error": "boom"})
        );
    }

    #[test]
    fn nothing_is_bare_success() {
        assert_eq!(
            serde_json::to_value(Envelope::new(None, None)).unwrap(),
            json!({"result": "success"})
        );
    }

    #[test]
    fn falsy_values_are_dropped() {
        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            let envelope = Envelope::new(Some(falsy), Some(String::new()));
            assert_eq!(envelope, Envelope::success());
        }
    }

    #[test]
    fn empty_containers_are_kept() {
        let envelope = Envelope::new(Some(json!([])), None);
        assert_eq!(envelope.data, Some(json!([])));
        let envelope = Envelope::new(Some(json!({})), None);
        assert_eq!(envelope.data, Some(json!({})));
    }

    #[test]
    fn failure_may_carry_data() {
        let envelope = Envelope::new(Some(json!({"userName": true})), Some("bad".to_string()));
        assert_eq!(envelope.result, ResultKind::Failure);
        assert_eq!(envelope.data, Some(json!({"userName": true})));
    }
}
