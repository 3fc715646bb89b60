//! Core event dispatch and translation orchestration for kotoba.
//!
//! Everything with branching logic lives here: event classification, the
//! reaction/command/auto-translate handlers, the idempotency guard, and the
//! shared translate-and-post pipeline. Slack, DeepL, and the preference
//! store are reached only through the capability traits in [`engine`], so
//! any adapter (or test double) satisfying them is substitutable.

pub mod commands;
pub mod config;
pub mod engine;
pub mod errors;
pub mod event;
pub mod languages;
pub mod message;

pub use commands::{parse_mention_command, MentionCommand};
pub use engine::{
    event_marker_key, subscription_key, Messenger, PreferenceStore, TranslationEngine, Translator,
};
pub use errors::{EngineError, MessengerError, StoreError, TranslatorError};
pub use event::{AppMentionEvent, InboundEvent, MessageEvent, ReactionAddedEvent, ReactionItem};
pub use languages::Language;
pub use message::{
    Attachment, IncomingMessage, MessageKind, OutgoingAttachment, OutgoingMessage, UserInfo,
};
