use crate::AggregateBatch;

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Transport handshake finished.
    Connected,
    /// Every evaluation of the fan-out reached an outcome.
    BatchSettled(AggregateBatch),
    /// The fan-out itself failed, as opposed to an individual URL.
    FanOutFailed(String),
    /// The one-shot follow-up delay elapsed.
    FollowUpElapsed,
    /// Text frame received from the client.
    InboundText(String),
    /// Client closed the connection.
    TransportClosed,
    /// Reading from or writing to the transport failed.
    TransportFailed(String),
}
