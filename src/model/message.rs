use std::time::{Duration, Instant};

use crate::model::denial::{DenialReason, Operation};

/// Something the renderer should tell the player once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// An operation failed; state was left as it was
    Failed {
        operation: Operation,
        message: String,
        denial: Option<DenialReason>,
    },

    /// The age gate was left unticked; nothing was sent
    AgeGateBlocked,

    /// The worker thread is gone; nothing more can be sent
    EngineStopped,
}

/// A short-lived confirmation (e.g. after a debug grant) that clears itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acknowledgement {
    pub text: String,
    pub expires_at: Instant,
}

impl Acknowledgement {
    pub fn new(text: impl Into<String>, ttl: Duration) -> Self {
        Self {
            text: text.into(),
            expires_at: Instant::now() + ttl,
        }
    }

    pub fn is_visible_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }
}
