#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Connecting,
    Active,
    Closed,
}

/// Lifecycle of one real-time client connection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    state: SessionState,
    batch_delivered: bool,
    follow_up_armed: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn is_closed(&self) -> bool {
        self.state == SessionState::Closed
    }

    pub fn batch_delivered(&self) -> bool {
        self.batch_delivered
    }

    pub fn follow_up_armed(&self) -> bool {
        self.follow_up_armed
    }

    pub(crate) fn activate(&mut self) {
        self.state = SessionState::Active;
        self.follow_up_armed = true;
    }

    /// Marks the batch slot as used. Returns false if it already was.
    pub(crate) fn take_batch_slot(&mut self) -> bool {
        !std::mem::replace(&mut self.batch_delivered, true)
    }

    /// Disarms the follow-up. Returns whether it was armed.
    pub(crate) fn disarm_follow_up(&mut self) -> bool {
        std::mem::replace(&mut self.follow_up_armed, false)
    }

    pub(crate) fn close(&mut self) {
        self.state = SessionState::Closed;
    }
}
