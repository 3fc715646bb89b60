use thiserror::Error;

/// Failures raised by the translation engine. Contract violations and
/// not-found conditions fail fast and are never retried; adapter failures
/// pass through transparently.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("called without an event")]
    MissingEvent,
    #[error("unsupported event type `{0}`")]
    UnsupportedEventType(String),
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("missing text on the message, nothing to translate")]
    MissingText,
    #[error("message not found, nothing to translate")]
    MessageNotFound,
    #[error("failed to resolve user `{0}`")]
    UserResolution(String),
    #[error("event {channel}/{event_ts} was already processed")]
    DuplicateEvent { channel: String, event_ts: String },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Messenger(#[from] MessengerError),
    #[error(transparent)]
    Translator(#[from] TranslatorError),
}

impl EngineError {
    /// Duplicate deliveries are an expected outcome of webhook retries;
    /// callers use this to drop them without treating the event as failed.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateEvent { .. })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("preference store failure: {0}")]
    Backend(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessengerError {
    #[error("slack transport failure: {0}")]
    Transport(String),
    #[error("slack api call failed: {0}")]
    Api(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranslatorError {
    #[error("translation transport failure: {0}")]
    Transport(String),
    #[error("translation provider returned status {status}: {body}")]
    UpstreamStatus { status: u16, body: String },
    #[error("translation response carried no translations")]
    EmptyResponse,
}
