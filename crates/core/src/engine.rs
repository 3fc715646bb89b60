use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::commands::{parse_mention_command, MentionCommand};
use crate::errors::{EngineError, MessengerError, StoreError, TranslatorError};
use crate::event::{AppMentionEvent, InboundEvent, MessageEvent, ReactionAddedEvent};
use crate::languages::Language;
use crate::message::{
    Attachment, IncomingMessage, MessageKind, OutgoingAttachment, OutgoingMessage, UserInfo,
};

/// Key/value persistence for idempotency markers and auto-translate
/// subscriptions. Keys are path-like; values are JSON. The engine assumes
/// read-your-write ordering on a single connection and nothing more.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn select(&self, key: &str) -> Result<Option<Value>, StoreError>;
    async fn upsert(&self, key: &str, value: Value) -> Result<(), StoreError>;
}

/// The Slack-facing surface the engine needs: fetch a message or reply by
/// channel and timestamp, post a message, resolve a user or bot identity.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn fetch_message(
        &self,
        channel: &str,
        ts: &str,
    ) -> Result<Option<IncomingMessage>, MessengerError>;

    async fn post_message(
        &self,
        channel: &str,
        message: &OutgoingMessage,
    ) -> Result<(), MessengerError>;

    async fn fetch_user(&self, user_id: &str) -> Result<Option<UserInfo>, MessengerError>;
}

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target: Language) -> Result<String, TranslatorError>;
}

pub fn subscription_key(user_or_bot_id: &str) -> String {
    format!("/autotranslate/{user_or_bot_id}")
}

pub fn event_marker_key(channel: &str, event_ts: &str) -> String {
    format!("/channels/{channel}/{}", event_ts.replacen('.', "_", 1))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// The event dispatch and translation-orchestration engine. Collaborators
/// are injected once at construction and shared immutably across concurrent
/// event invocations; the idempotency marker in the store is the only
/// cross-event coordination.
pub struct TranslationEngine {
    store: Arc<dyn PreferenceStore>,
    messenger: Arc<dyn Messenger>,
    translator: Arc<dyn Translator>,
}

impl TranslationEngine {
    pub fn new(
        store: Arc<dyn PreferenceStore>,
        messenger: Arc<dyn Messenger>,
        translator: Arc<dyn Translator>,
    ) -> Self {
        Self { store, messenger, translator }
    }

    /// Classifies an inbound event and routes it to its handler. The full
    /// serialized event is logged first as the audit trail.
    pub async fn handle_event(&self, event: Option<InboundEvent>) -> Result<(), EngineError> {
        let Some(event) = event else {
            error!("called without an event");
            return Err(EngineError::MissingEvent);
        };

        if let Ok(payload) = serde_json::to_string(&event) {
            info!(event = %payload, "handling inbound event");
        }

        match event {
            InboundEvent::ReactionAdded(event) => self.handle_reaction_added(&event).await,
            InboundEvent::AppMention(event) => self.handle_app_mention(&event).await,
            InboundEvent::Message(event) => self.handle_auto_translate(&event).await,
            InboundEvent::Unsupported { event_type } => {
                Err(EngineError::UnsupportedEventType(event_type))
            }
        }
    }

    /// On-demand translation: a reaction whose name is a language trigger
    /// translates the message it was attached to.
    pub async fn handle_reaction_added(
        &self,
        event: &ReactionAddedEvent,
    ) -> Result<(), EngineError> {
        let reaction =
            event.reaction.as_deref().ok_or(EngineError::MissingField("reaction"))?;

        let Some(language) = Language::from_trigger(reaction) else {
            info!(reaction, "not a translation reaction, ignoring");
            return Ok(());
        };

        let event_ts = event.event_ts.as_deref().ok_or(EngineError::MissingField("event_ts"))?;
        let channel = event
            .item
            .as_ref()
            .and_then(|item| item.channel.as_deref())
            .or(event.channel.as_deref())
            .ok_or(EngineError::MissingField("channel"))?;
        let message_ts = event
            .item
            .as_ref()
            .and_then(|item| item.ts.as_deref())
            .ok_or(EngineError::MissingField("item.ts"))?;

        self.mark_event_processed(channel, event_ts).await?;

        let message = self
            .messenger
            .fetch_message(channel, message_ts)
            .await?
            .ok_or(EngineError::MessageNotFound)?;

        self.translate_and_post(channel, &message, language).await
    }

    /// Subscription management: `enable autotranslate <@id> into <lang>` and
    /// `disable autotranslate <@id>`. Anything else is logged and ignored.
    pub async fn handle_app_mention(&self, event: &AppMentionEvent) -> Result<(), EngineError> {
        let text = event.text.as_deref().ok_or(EngineError::MissingField("text"))?;

        match parse_mention_command(text) {
            Some(MentionCommand::Enable { target, language }) => {
                self.enable_auto_translate(event, &target, language).await
            }
            Some(MentionCommand::Disable { target }) => {
                self.disable_auto_translate(event, &target).await
            }
            None => {
                warn!("mention text matched no command, ignoring");
                Ok(())
            }
        }
    }

    async fn enable_auto_translate(
        &self,
        event: &AppMentionEvent,
        target: &str,
        language: Language,
    ) -> Result<(), EngineError> {
        let user = self.resolve_user(target).await?;
        let key = subscription_key(user.subscription_id());
        self.store.upsert(&key, Value::String(language.code().to_owned())).await?;
        info!(subject = %user.name, language = %language, "auto-translate enabled");

        self.acknowledge(
            event,
            format!(
                "You got it! All messages from {} will be automatically translated to {}",
                user.name,
                language.display_name()
            ),
        )
        .await
    }

    async fn disable_auto_translate(
        &self,
        event: &AppMentionEvent,
        target: &str,
    ) -> Result<(), EngineError> {
        let user = self.resolve_user(target).await?;
        let key = subscription_key(user.subscription_id());
        self.store.upsert(&key, Value::Bool(false)).await?;
        info!(subject = %user.name, "auto-translate disabled");

        self.acknowledge(event, format!("You got it! Auto-translate disabled for {}", user.name))
            .await
    }

    async fn resolve_user(&self, target: &str) -> Result<UserInfo, EngineError> {
        self.messenger
            .fetch_user(target)
            .await?
            .ok_or_else(|| EngineError::UserResolution(target.to_owned()))
    }

    async fn acknowledge(&self, event: &AppMentionEvent, text: String) -> Result<(), EngineError> {
        let Some(channel) = event.channel.as_deref() else {
            return Ok(());
        };

        let acknowledgement = OutgoingMessage {
            thread_ts: None,
            reply_broadcast: false,
            text,
            attachments: None,
        };
        self.messenger.post_message(channel, &acknowledgement).await?;
        Ok(())
    }

    /// Auto-translation: a plain message from a subscribed user or bot is
    /// translated in place. Messages without a sender and senders without a
    /// subscription are routine no-ops.
    pub async fn handle_auto_translate(&self, event: &MessageEvent) -> Result<(), EngineError> {
        let Some(sender) = event.user.as_deref().or(event.bot_id.as_deref()) else {
            info!("not a message sent by a user or bot, ignoring");
            return Ok(());
        };

        let channel = event.channel.as_deref().ok_or(EngineError::MissingField("channel"))?;
        let event_ts = event.event_ts.as_deref().ok_or(EngineError::MissingField("event_ts"))?;

        let Some(language) = self.subscribed_language(sender).await? else {
            info!(sender, "sender not registered for auto-translate, ignoring");
            return Ok(());
        };

        let message = IncomingMessage {
            kind: MessageKind::Message,
            thread_ts: Some(event_ts.to_owned()),
            text: event.text.clone(),
            attachments: event.attachments.clone(),
        };

        self.mark_event_processed(channel, event_ts).await?;
        self.translate_and_post(channel, &message, language).await
    }

    async fn subscribed_language(&self, sender: &str) -> Result<Option<Language>, EngineError> {
        let value = self.store.select(&subscription_key(sender)).await?;
        Ok(value.as_ref().and_then(Language::from_stored))
    }

    /// The idempotency guard. The marker is written before any translation
    /// work, so a re-delivered event is rejected even if the first delivery
    /// is still in flight or failed downstream.
    async fn mark_event_processed(
        &self,
        channel: &str,
        event_ts: &str,
    ) -> Result<(), EngineError> {
        let key = event_marker_key(channel, event_ts);

        if self.store.select(&key).await?.is_some_and(|value| is_truthy(&value)) {
            return Err(EngineError::DuplicateEvent {
                channel: channel.to_owned(),
                event_ts: event_ts.to_owned(),
            });
        }

        self.store.upsert(&key, Value::Bool(true)).await?;
        Ok(())
    }

    async fn translate_and_post(
        &self,
        channel: &str,
        message: &IncomingMessage,
        language: Language,
    ) -> Result<(), EngineError> {
        let outgoing = self.translate_message(message, language).await?;
        self.messenger.post_message(channel, &outgoing).await?;
        Ok(())
    }

    async fn translate_message(
        &self,
        message: &IncomingMessage,
        language: Language,
    ) -> Result<OutgoingMessage, EngineError> {
        let text = message.text.as_deref().ok_or(EngineError::MissingText)?;
        info!(language = %language, "translating message body");

        let translation = self.translator.translate(text, language).await?;
        let attachments =
            self.translate_attachments(message.attachments.as_deref(), language).await?;

        Ok(OutgoingMessage {
            thread_ts: message.thread_ts.clone(),
            reply_broadcast: message.kind == MessageKind::Message,
            text: translation,
            attachments,
        })
    }

    /// Attachments translate strictly in order, one in-flight call at a
    /// time. Attachments without any text are dropped; an absent list stays
    /// absent rather than becoming empty.
    async fn translate_attachments(
        &self,
        attachments: Option<&[Attachment]>,
        language: Language,
    ) -> Result<Option<Vec<OutgoingAttachment>>, EngineError> {
        let Some(attachments) = attachments else {
            return Ok(None);
        };

        let mut translated = Vec::new();
        for attachment in attachments {
            let Some(text) = attachment.body() else {
                continue;
            };
            translated
                .push(OutgoingAttachment { text: self.translator.translate(text, language).await? });
        }

        Ok(Some(translated))
    }
}
