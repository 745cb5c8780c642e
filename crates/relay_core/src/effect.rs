use crate::AggregateBatch;

/// Pushed to the client when the fan-out task fails as a whole.
pub const FAN_OUT_ERROR_MESSAGE: &str = r#"{"error":"Failed to fetch data"}"#;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Snapshot the working set and evaluate every URL in it.
    StartFanOut,
    ArmFollowUp,
    CancelFollowUp,
    Push(Outbound),
    LogInbound(String),
}

/// A message the session sends to its client.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Batch(AggregateBatch),
    FanOutError,
    FollowUp,
}

impl Outbound {
    /// Text frame for this message. `follow_up` is the configured diagnostic text.
    pub fn render(&self, follow_up: &str) -> String {
        match self {
            Outbound::Batch(batch) => batch
                .to_message()
                .unwrap_or_else(|_| FAN_OUT_ERROR_MESSAGE.to_string()),
            Outbound::FanOutError => FAN_OUT_ERROR_MESSAGE.to_string(),
            Outbound::FollowUp => follow_up.to_string(),
        }
    }
}
