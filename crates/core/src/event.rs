use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::message::Attachment;

/// A single event delivered by the Slack Events API, classified by its
/// `type` tag. Payload fields mirror the wire format, so anything Slack may
/// omit is an `Option` and the engine enforces presence where it matters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    ReactionAdded(ReactionAddedEvent),
    AppMention(AppMentionEvent),
    Message(MessageEvent),
    Unsupported { event_type: String },
}

impl InboundEvent {
    /// Classifies a raw JSON event body. Parsing is total: an unknown or
    /// absent `type` tag yields `Unsupported`, which the engine rejects with
    /// the offending type name instead of a deserialization error.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let event_type =
            value.get("type").and_then(Value::as_str).unwrap_or("unknown").to_owned();

        match event_type.as_str() {
            "reaction_added" => serde_json::from_value(value).map(Self::ReactionAdded),
            "app_mention" => serde_json::from_value(value).map(Self::AppMention),
            "message" => serde_json::from_value(value).map(Self::Message),
            _ => Ok(Self::Unsupported { event_type }),
        }
    }

    pub fn event_type(&self) -> &str {
        match self {
            Self::ReactionAdded(_) => "reaction_added",
            Self::AppMention(_) => "app_mention",
            Self::Message(_) => "message",
            Self::Unsupported { event_type } => event_type,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionAddedEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reaction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_ts: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<ReactionItem>,
}

/// Pointer to the message the reaction was attached to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppMentionEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

/// A plain channel message. Exactly one of `user`/`bot_id` identifies the
/// sender; messages with neither are system noise and are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_ts: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::InboundEvent;

    #[test]
    fn classifies_reaction_added_events() {
        let event = InboundEvent::from_value(json!({
            "type": "reaction_added",
            "reaction": "english",
            "event_ts": "1234",
            "item": { "channel": "test", "ts": "1234" },
        }))
        .expect("parse reaction event");

        let InboundEvent::ReactionAdded(event) = event else {
            panic!("expected reaction_added variant");
        };
        assert_eq!(event.reaction.as_deref(), Some("english"));
        assert_eq!(event.item.as_ref().and_then(|i| i.ts.as_deref()), Some("1234"));
    }

    #[test]
    fn classifies_app_mention_events() {
        let event = InboundEvent::from_value(json!({
            "type": "app_mention",
            "text": "enable autotranslate <@U1234567890> into en",
            "channel": "C1",
        }))
        .expect("parse mention event");

        assert!(matches!(event, InboundEvent::AppMention(_)));
    }

    #[test]
    fn classifies_message_events_with_attachments() {
        let event = InboundEvent::from_value(json!({
            "type": "message",
            "text": "hello",
            "channel": "C1",
            "event_ts": "1.2",
            "user": "U1",
            "attachments": [{ "text": "primary" }, { "fallback": "secondary" }],
        }))
        .expect("parse message event");

        let InboundEvent::Message(event) = event else {
            panic!("expected message variant");
        };
        let attachments = event.attachments.expect("attachments present");
        assert_eq!(attachments.len(), 2);
        assert_eq!(attachments[0].text.as_deref(), Some("primary"));
        assert_eq!(attachments[1].fallback.as_deref(), Some("secondary"));
    }

    #[test]
    fn unknown_event_type_is_preserved_for_rejection() {
        let event = InboundEvent::from_value(json!({ "type": "channel_created" }))
            .expect("parse unknown event");

        assert!(matches!(
            event,
            InboundEvent::Unsupported { ref event_type } if event_type == "channel_created"
        ));
    }

    #[test]
    fn missing_type_tag_is_unsupported() {
        let event =
            InboundEvent::from_value(json!({ "text": "hi" })).expect("parse untagged event");
        assert_eq!(event.event_type(), "unknown");
    }
}
