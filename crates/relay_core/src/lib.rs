//! Relay core: evaluation result types and the pure real-time session state machine.
mod effect;
mod msg;
mod outcome;
mod state;
mod update;

pub use effect::{Effect, Outbound, FAN_OUT_ERROR_MESSAGE};
pub use msg::Msg;
pub use outcome::{AggregateBatch, EvaluationOutcome, ReportType};
pub use state::{Session, SessionState};
pub use update::update;
