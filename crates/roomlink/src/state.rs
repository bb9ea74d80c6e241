//! Connection state machine.

/// The lifecycle state of a connection.
///
/// ```text
///            connect                handshake ok
///   Idle ───────────► Connecting ─────────────► Open
///    ▲                 │     ▲                   │
///    │       open fail │     │ backoff elapsed   │ unexpected close / stale
///    │                 ▼     │                   ▼
///    │               Reconnecting ◄──────────────┘
///    │                 │
///    │                 │ attempts exhausted
///    │                 ▼
///    │               Failed ──connect──► Connecting
///    │
///    └── Closing ◄── disconnect (from any live state)
/// ```
///
/// - **Idle**: no connection exists.
/// - **Connecting**: a transport handshake is in flight.
/// - **Open**: a live channel exists; sends go straight out.
/// - **Reconnecting**: a retry is scheduled after a backoff delay.
/// - **Closing**: an intentional teardown is in progress.
/// - **Failed**: retries exhausted. Terminal until the next `connect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    #[default]
    Idle,
    Connecting,
    Open,
    Reconnecting,
    Closing,
    Failed,
}

impl ConnectionState {
    /// Returns `true` while a live channel exists.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Returns `true` while the manager is trying to reach a destination.
    pub fn is_connecting(&self) -> bool {
        matches!(self, Self::Connecting | Self::Reconnecting)
    }

    /// Returns `true` if transitioning to `target` is valid.
    pub fn can_transition_to(self, target: Self) -> bool {
        use ConnectionState::*;
        matches!(
            (self, target),
            (Idle, Connecting)
                | (Connecting, Open | Reconnecting | Closing)
                | (Open, Reconnecting | Closing)
                | (Reconnecting, Connecting | Failed | Closing)
                | (Closing, Idle)
                | (Failed, Connecting | Closing)
        )
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Open => write!(f, "Open"),
            Self::Reconnecting => write!(f, "Reconnecting"),
            Self::Closing => write!(f, "Closing"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}
