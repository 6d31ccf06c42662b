use thiserror::Error;

/// Errors surfaced by session construction and the session API.
///
/// Nothing in here is raised from inside a tick: the per-step simulation is
/// total, and recoverable failures (missing sprites, no question available)
/// are handled locally and logged.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("malformed config field `{field}`: {reason}")]
    MalformedConfig { field: &'static str, reason: String },
    #[error("failed to parse config: {0}")]
    ConfigParse(#[source] serde_json::Error),
    #[error("session has already been started")]
    AlreadyStarted,
    #[error("session is not running")]
    NotRunning,
    #[error("no interrupt is pending")]
    NoPendingInterrupt,
    #[error("no bonus choice is pending")]
    NoBonusPending,
    #[error("session has not finished")]
    NotFinished,
    #[error("score was already submitted for this session")]
    AlreadySubmitted,
    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl SessionError {
    pub(crate) fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedConfig {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors from sprite manifest loading and lookup.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("sprite `{0}` is not in the manifest")]
    Missing(String),
    #[error("sprite `{name}` has invalid {field}")]
    Invalid { name: String, field: &'static str },
    #[error("failed to parse manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

/// Failure reported by a score sink. Logged by the outbox worker, never retried.
#[derive(Debug, Error)]
#[error("score sink failed: {0}")]
pub struct SinkError(pub String);

pub type Result<T, E = SessionError> = std::result::Result<T, E>;
