use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Report detail level understood by the evaluation API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportType(pub u8);

impl ReportType {
    pub const DEFAULT: ReportType = ReportType(3);
}

impl Default for ReportType {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of evaluating a single URL. The payload is passed through uninterpreted.
///
/// Encoded on the wire as `{"ok":true,"payload":...}` or `{"ok":false,"reason":"..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "OutcomeWire", from = "OutcomeWire")]
pub enum EvaluationOutcome {
    Success(Value),
    Failure(String),
}

impl EvaluationOutcome {
    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure(reason.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Success(payload) => Some(payload),
            Self::Failure(_) => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure(reason) => Some(reason),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct OutcomeWire {
    ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

impl From<EvaluationOutcome> for OutcomeWire {
    fn from(outcome: EvaluationOutcome) -> Self {
        match outcome {
            EvaluationOutcome::Success(payload) => Self {
                ok: true,
                payload: Some(payload),
                reason: None,
            },
            EvaluationOutcome::Failure(reason) => Self {
                ok: false,
                payload: None,
                reason: Some(reason),
            },
        }
    }
}

impl From<OutcomeWire> for EvaluationOutcome {
    fn from(wire: OutcomeWire) -> Self {
        if wire.ok {
            Self::Success(wire.payload.unwrap_or(Value::Null))
        } else {
            Self::Failure(wire.reason.unwrap_or_default())
        }
    }
}

/// Fully settled outcomes of one fan-out, index-aligned with the URLs that produced it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateBatch(Vec<EvaluationOutcome>);

impl AggregateBatch {
    pub fn new(outcomes: Vec<EvaluationOutcome>) -> Self {
        Self(outcomes)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&EvaluationOutcome> {
        self.0.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EvaluationOutcome> {
        self.0.iter()
    }

    pub fn failures(&self) -> usize {
        self.0.iter().filter(|outcome| !outcome.is_success()).count()
    }

    pub fn into_outcomes(self) -> Vec<EvaluationOutcome> {
        self.0
    }

    /// JSON array of outcome objects, as pushed to real-time clients.
    pub fn to_message(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<Vec<EvaluationOutcome>> for AggregateBatch {
    fn from(outcomes: Vec<EvaluationOutcome>) -> Self {
        Self(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_encodes_ok_and_payload_only() {
        let outcome = EvaluationOutcome::Success(json!({"status": "ok"}));
        assert_eq!(
            serde_json::to_string(&outcome).unwrap(),
            r#"{"ok":true,"payload":{"status":"ok"}}"#
        );
    }

    #[test]
    fn failure_encodes_ok_and_reason_only() {
        let outcome = EvaluationOutcome::failure("timeout");
        assert_eq!(
            serde_json::to_string(&outcome).unwrap(),
            r#"{"ok":false,"reason":"timeout"}"#
        );
    }

    #[test]
    fn batch_message_is_a_plain_array() {
        let batch = AggregateBatch::new(vec![
            EvaluationOutcome::Success(json!(1)),
            EvaluationOutcome::failure("nope"),
        ]);
        assert_eq!(
            batch.to_message().unwrap(),
            r#"[{"ok":true,"payload":1},{"ok":false,"reason":"nope"}]"#
        );
        assert_eq!(batch.failures(), 1);
    }

    #[test]
    fn wire_form_decodes_back() {
        let decoded: AggregateBatch =
            serde_json::from_str(r#"[{"ok":false,"reason":"x"},{"ok":true,"payload":[1,2]}]"#)
                .unwrap();
        assert_eq!(decoded.get(0).and_then(|o| o.reason()), Some("x"));
        assert_eq!(decoded.get(1).and_then(|o| o.payload()), Some(&json!([1, 2])));
    }
}
