//! Aggregate reachability of the market data service.
//!
//! Health is derived solely from the rates fetch, which runs on every refresh
//! cycle and acts as the heartbeat. A fetch answered by fallback data still
//! counts as connected: the session holds renderable data either way.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl ConnectionStatus {
    /// A rates fetch was just issued.
    pub fn begin_attempt(&mut self) {
        *self = ConnectionStatus::Connecting;
    }

    /// A rates fetch produced usable data, live or fallback.
    pub fn complete_attempt(&mut self) {
        *self = ConnectionStatus::Connected;
    }

    /// The fetch could not produce even fallback data. Expected to be
    /// unreachable with a correct fallback generator.
    pub fn fault(&mut self) {
        *self = ConnectionStatus::Error;
    }
}

impl Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::Disconnected => write!(f, "disconnected"),
            ConnectionStatus::Connecting => write!(f, "connecting"),
            ConnectionStatus::Connected => write!(f, "connected"),
            ConnectionStatus::Error => write!(f, "error"),
        }
    }
}
