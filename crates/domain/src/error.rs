use crate::trace::TraceEvent;

/// Shared error type used across all zweb crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config: {0}")]
    Config(String),

    /// An operation was invoked on an absent session, context or registry.
    #[error("missing receiver: {0}")]
    MissingReceiver(&'static str),

    #[error("invalid argument {name}: {value:?}")]
    InvalidArgument { name: &'static str, value: String },

    #[error("session id generation: {0}")]
    IdGeneration(String),

    #[error("request {seq} already replied")]
    AlreadyReplied { seq: u64 },

    #[error("transport: {0}")]
    Transport(String),

    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Short machine-readable name of the condition.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Json(_) => "json",
            Self::Config(_) => "config",
            Self::MissingReceiver(_) => "missing_receiver",
            Self::InvalidArgument { .. } => "invalid_argument",
            Self::IdGeneration(_) => "id_generation",
            Self::AlreadyReplied { .. } => "already_replied",
            Self::Transport(_) => "transport",
            Self::PayloadTooLarge { .. } => "payload_too_large",
            Self::Other(_) => "other",
        }
    }

    /// Report a recoverable condition on the diagnostic channel.
    ///
    /// Callers continue with a zero value afterwards; nothing here panics.
    pub fn report(&self) {
        tracing::warn!(kind = self.kind(), error = %self, "recoverable condition");
        TraceEvent::ConditionReported {
            kind: self.kind().to_owned(),
            detail: self.to_string(),
        }
        .emit();
    }
}

pub type Result<T> = std::result::Result<T, Error>;
