use crate::{Effect, Msg, Outbound, Session, SessionState};

/// Pure update function: applies a message to a session and returns any effects.
///
/// Once closed, a session ignores everything, so late fan-out results and
/// timers that raced the close produce no effects.
pub fn update(mut session: Session, msg: Msg) -> (Session, Vec<Effect>) {
    if session.is_closed() {
        return (session, Vec::new());
    }

    let effects = match msg {
        Msg::Connected => {
            if session.state() == SessionState::Connecting {
                session.activate();
                vec![Effect::StartFanOut, Effect::ArmFollowUp]
            } else {
                Vec::new()
            }
        }
        Msg::BatchSettled(batch) => {
            if session.is_active() && session.take_batch_slot() {
                vec![Effect::Push(Outbound::Batch(batch))]
            } else {
                Vec::new()
            }
        }
        Msg::FanOutFailed(_) => {
            if session.is_active() && session.take_batch_slot() {
                vec![Effect::Push(Outbound::FanOutError)]
            } else {
                Vec::new()
            }
        }
        Msg::FollowUpElapsed => {
            if session.is_active() && session.disarm_follow_up() {
                vec![Effect::Push(Outbound::FollowUp)]
            } else {
                Vec::new()
            }
        }
        Msg::InboundText(text) => {
            if session.is_active() {
                vec![Effect::LogInbound(text)]
            } else {
                Vec::new()
            }
        }
        Msg::TransportClosed | Msg::TransportFailed(_) => {
            session.close();
            if session.disarm_follow_up() {
                vec![Effect::CancelFollowUp]
            } else {
                Vec::new()
            }
        }
    };

    (session, effects)
}
