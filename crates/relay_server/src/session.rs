//! Drives one real-time client connection through the session state machine.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use relay_core::{update, Effect, Msg, Session};
use relay_engine::{FanOutEvaluator, UrlRegistry};
use relay_logging::{relay_debug, relay_error, relay_info, relay_warn};
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};

pub type SessionId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Delay before the one-shot diagnostic push.
    pub follow_up_delay: Duration,
    pub follow_up_message: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            follow_up_delay: Duration::from_secs(5),
            follow_up_message: "connection still open".to_string(),
        }
    }
}

/// Transport events as seen by a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Text(String),
    Closed,
    Error(String),
}

pub struct RealtimeSession {
    id: SessionId,
    registry: Arc<UrlRegistry>,
    fan_out: Arc<FanOutEvaluator>,
    settings: SessionSettings,
}

impl RealtimeSession {
    pub fn new(
        id: SessionId,
        registry: Arc<UrlRegistry>,
        fan_out: Arc<FanOutEvaluator>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            id,
            registry,
            fan_out,
            settings,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Run until the transport closes or fails. Returns the final session state.
    ///
    /// The end of the inbound stream counts as a close. Send failures are
    /// logged and close the session; they are never returned.
    pub async fn run<I, O>(self, mut inbound: I, mut outbound: O) -> Session
    where
        I: Stream<Item = Inbound> + Unpin,
        O: Sink<String> + Unpin,
        O::Error: fmt::Display,
    {
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let mut session = Session::new();
        let mut follow_up: Option<DropGuard> = None;
        let mut pending = VecDeque::from([Msg::Connected]);

        relay_info!("Session {} connected", self.id);

        loop {
            while let Some(msg) = pending.pop_front() {
                let (next, effects) = update(session, msg);
                session = next;
                for effect in effects {
                    if let Some(msg) = self
                        .apply(effect, &events_tx, &mut follow_up, &mut outbound)
                        .await
                    {
                        pending.push_back(msg);
                    }
                }
            }

            if session.is_closed() {
                break;
            }

            let msg = tokio::select! {
                Some(msg) = events_rx.recv() => msg,
                frame = inbound.next() => match frame {
                    Some(Inbound::Text(text)) => Msg::InboundText(text),
                    Some(Inbound::Error(reason)) => {
                        relay_warn!("Session {} transport error: {}", self.id, reason);
                        Msg::TransportFailed(reason)
                    }
                    Some(Inbound::Closed) | None => Msg::TransportClosed,
                },
            };
            pending.push_back(msg);
        }

        relay_info!("Session {} closed", self.id);
        session
    }

    async fn apply<O>(
        &self,
        effect: Effect,
        events: &mpsc::UnboundedSender<Msg>,
        follow_up: &mut Option<DropGuard>,
        outbound: &mut O,
    ) -> Option<Msg>
    where
        O: Sink<String> + Unpin,
        O::Error: fmt::Display,
    {
        match effect {
            Effect::StartFanOut => {
                self.start_fan_out(events.clone());
                None
            }
            Effect::ArmFollowUp => {
                *follow_up = Some(self.arm_follow_up(events.clone()));
                None
            }
            Effect::CancelFollowUp => {
                if follow_up.take().is_some() {
                    relay_debug!("Session {} follow-up cancelled", self.id);
                }
                None
            }
            Effect::Push(message) => {
                let text = message.render(&self.settings.follow_up_message);
                match outbound.send(text).await {
                    Ok(()) => None,
                    Err(err) => {
                        relay_warn!("Session {} push failed: {}", self.id, err);
                        Some(Msg::TransportFailed(err.to_string()))
                    }
                }
            }
            Effect::LogInbound(text) => {
                relay_info!(
                    "Session {} inbound message ({} bytes) ignored: {}",
                    self.id,
                    text.len(),
                    text
                );
                None
            }
        }
    }

    // Runs detached: a session that closes early does not cancel in-flight
    // evaluations, their result is dropped when the send below fails.
    fn start_fan_out(&self, events: mpsc::UnboundedSender<Msg>) {
        let id = self.id;
        let snapshot = self.registry.get();
        let fan_out = Arc::clone(&self.fan_out);
        relay_info!("Session {} evaluating {} urls", id, snapshot.len());

        let task = tokio::spawn(async move { fan_out.run(&snapshot).await });
        tokio::spawn(async move {
            let msg = match task.await {
                Ok(batch) => Msg::BatchSettled(batch),
                Err(err) => {
                    relay_error!("Session {} fan-out task failed: {}", id, err);
                    Msg::FanOutFailed(err.to_string())
                }
            };
            let _ = events.send(msg);
        });
    }

    fn arm_follow_up(&self, events: mpsc::UnboundedSender<Msg>) -> DropGuard {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let delay = self.settings.follow_up_delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let _ = events.send(Msg::FollowUpElapsed);
                }
            }
        });
        token.drop_guard()
    }
}
