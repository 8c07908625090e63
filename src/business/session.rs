//! Logged in session and idle autoclose

use std::time::{Duration, Instant};
use crate::crypto::SecretKey;

/// Idle timer that closes the session after `timeout` without activity
#[derive(Debug, Clone)]
pub struct AutoClose {
    timeout: Option<Duration>,
    last_activity: Instant,
}

impl AutoClose {
    /// Start the timer; `None` disables autoclose
    pub fn new(timeout: Option<Duration>, now: Instant) -> Self {
        Self { timeout, last_activity: now }
    }

    /// Record activity
    pub fn touch(&mut self, now: Instant) {
        if now > self.last_activity {
            self.last_activity = now;
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        match self.timeout {
            Some(timeout) => now.saturating_duration_since(self.last_activity) >= timeout,
            None => false,
        }
    }

    /// Time left before the session closes, `None` when autoclose is off
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.timeout
            .map(|timeout| timeout.saturating_sub(now.saturating_duration_since(self.last_activity)))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }
}

/// The logged in user and their decrypted secret key
pub(crate) struct Session {
    pub(crate) username: String,
    pub(crate) key: SecretKey,
    pub(crate) autoclose: AutoClose,
}

impl Session {
    pub(crate) fn new(username: &str, key: SecretKey, timeout: Option<Duration>) -> Self {
        Self {
            username: username.to_string(),
            key,
            autoclose: AutoClose::new(timeout, Instant::now()),
        }
    }
}
