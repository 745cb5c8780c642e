use pretty_assertions::assert_eq;
use relay_core::{
    update, AggregateBatch, Effect, EvaluationOutcome, Msg, Outbound, Session, SessionState,
};
use serde_json::json;

fn connected() -> Session {
    let (session, effects) = update(Session::new(), Msg::Connected);
    assert_eq!(effects, vec![Effect::StartFanOut, Effect::ArmFollowUp]);
    session
}

fn sample_batch() -> AggregateBatch {
    AggregateBatch::new(vec![
        EvaluationOutcome::Success(json!({"status": "ok"})),
        EvaluationOutcome::failure("timeout"),
    ])
}

#[test]
fn connect_activates_and_starts_fan_out_with_follow_up() {
    relay_logging::initialize_for_tests();
    let session = connected();
    assert_eq!(session.state(), SessionState::Active);
    assert!(session.follow_up_armed());
    assert!(!session.batch_delivered());
}

#[test]
fn second_connect_does_nothing() {
    let (session, effects) = update(connected(), Msg::Connected);
    assert!(effects.is_empty());
    assert!(session.is_active());
}

#[test]
fn settled_batch_is_pushed_exactly_once() {
    let batch = sample_batch();
    let (session, effects) = update(connected(), Msg::BatchSettled(batch.clone()));
    assert_eq!(effects, vec![Effect::Push(Outbound::Batch(batch.clone()))]);
    assert!(session.batch_delivered());

    let (_, effects) = update(session, Msg::BatchSettled(batch));
    assert!(effects.is_empty());
}

#[test]
fn fan_out_failure_pushes_error_indicator_instead_of_batch() {
    let (session, effects) = update(connected(), Msg::FanOutFailed("task panicked".into()));
    assert_eq!(effects, vec![Effect::Push(Outbound::FanOutError)]);

    let (_, effects) = update(session, Msg::BatchSettled(sample_batch()));
    assert!(effects.is_empty());
}

#[test]
fn follow_up_fires_once_while_active() {
    let (session, effects) = update(connected(), Msg::FollowUpElapsed);
    assert_eq!(effects, vec![Effect::Push(Outbound::FollowUp)]);
    assert!(!session.follow_up_armed());

    let (_, effects) = update(session, Msg::FollowUpElapsed);
    assert!(effects.is_empty());
}

#[test]
fn inbound_text_is_only_logged() {
    let (session, effects) = update(connected(), Msg::InboundText("rescan please".into()));
    assert_eq!(effects, vec![Effect::LogInbound("rescan please".into())]);
    assert!(!session.batch_delivered());
    assert!(session.is_active());
}

#[test]
fn close_cancels_armed_follow_up() {
    let (session, effects) = update(connected(), Msg::TransportClosed);
    assert_eq!(effects, vec![Effect::CancelFollowUp]);
    assert!(session.is_closed());
}

#[test]
fn transport_error_closes_like_close() {
    let (session, effects) = update(connected(), Msg::TransportFailed("reset".into()));
    assert_eq!(effects, vec![Effect::CancelFollowUp]);
    assert_eq!(session.state(), SessionState::Closed);
}

#[test]
fn close_after_follow_up_fired_has_nothing_to_cancel() {
    let (session, _) = update(connected(), Msg::FollowUpElapsed);
    let (session, effects) = update(session, Msg::TransportClosed);
    assert!(effects.is_empty());
    assert!(session.is_closed());
}

#[test]
fn closed_session_discards_late_results_and_timers() {
    let (closed, _) = update(connected(), Msg::TransportClosed);

    for msg in [
        Msg::BatchSettled(sample_batch()),
        Msg::FanOutFailed("late".into()),
        Msg::FollowUpElapsed,
        Msg::InboundText("late".into()),
        Msg::Connected,
        Msg::TransportClosed,
    ] {
        let (next, effects) = update(closed.clone(), msg);
        assert!(effects.is_empty());
        assert!(next.is_closed());
    }
}

#[test]
fn close_before_connect_needs_no_cancel() {
    let (session, effects) = update(Session::new(), Msg::TransportClosed);
    assert!(effects.is_empty());
    assert!(session.is_closed());
}

#[test]
fn outbound_render_uses_wire_forms() {
    assert_eq!(
        Outbound::Batch(sample_batch()).render("still here"),
        r#"[{"ok":true,"payload":{"status":"ok"}},{"ok":false,"reason":"timeout"}]"#
    );
    assert_eq!(
        Outbound::FanOutError.render("still here"),
        r#"{"error":"Failed to fetch data"}"#
    );
    assert_eq!(Outbound::FollowUp.render("still here"), "still here");
}
