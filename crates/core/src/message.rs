use serde::{Deserialize, Serialize};

/// Whether a fetched message is a top-level channel message or a threaded
/// reply. Only translations of top-level messages are broadcast back into
/// the channel feed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Message,
    Reply,
}

/// Attachment text may live in the primary `text` field or the `fallback`
/// field, depending on what produced the attachment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

impl Attachment {
    /// The translatable text blob, if the attachment carries one.
    pub fn body(&self) -> Option<&str> {
        self.text.as_deref().or(self.fallback.as_deref())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncomingMessage {
    pub kind: MessageKind,
    pub thread_ts: Option<String>,
    pub text: Option<String>,
    pub attachments: Option<Vec<Attachment>>,
}

/// The translated message posted back to Slack. Serializes directly into
/// the `chat.postMessage` payload, so absent fields must be omitted rather
/// than sent as null.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutgoingMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
    pub reply_broadcast: bool,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<OutgoingAttachment>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutgoingAttachment {
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserInfo {
    pub id: String,
    pub is_bot: bool,
    pub bot_id: Option<String>,
    pub name: String,
}

impl UserInfo {
    /// The identity a subscription is keyed on: the bot id for bot users,
    /// the user id otherwise. Bots and users never collide in the registry.
    pub fn subscription_id(&self) -> &str {
        if self.is_bot {
            self.bot_id.as_deref().unwrap_or(&self.id)
        } else {
            &self.id
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Attachment, OutgoingAttachment, OutgoingMessage, UserInfo};

    #[test]
    fn attachment_body_prefers_primary_text() {
        let attachment = Attachment {
            text: Some("primary".to_owned()),
            fallback: Some("fallback".to_owned()),
        };
        assert_eq!(attachment.body(), Some("primary"));

        let fallback_only = Attachment { text: None, fallback: Some("fallback".to_owned()) };
        assert_eq!(fallback_only.body(), Some("fallback"));

        assert_eq!(Attachment::default().body(), None);
    }

    #[test]
    fn subscription_id_uses_bot_id_for_bots() {
        let bot = UserInfo {
            id: "U03J9FTHH8B".to_owned(),
            is_bot: true,
            bot_id: Some("B03J6LUQCFP".to_owned()),
            name: "PandaBot".to_owned(),
        };
        assert_eq!(bot.subscription_id(), "B03J6LUQCFP");

        let user = UserInfo {
            id: "U1234567890".to_owned(),
            is_bot: false,
            bot_id: None,
            name: "Yusuke".to_owned(),
        };
        assert_eq!(user.subscription_id(), "U1234567890");
    }

    #[test]
    fn outgoing_message_omits_absent_fields_on_the_wire() {
        let message = OutgoingMessage {
            thread_ts: None,
            reply_broadcast: false,
            text: "done".to_owned(),
            attachments: None,
        };
        let wire = serde_json::to_value(&message).expect("serialize");
        assert!(wire.get("thread_ts").is_none());
        assert!(wire.get("attachments").is_none());

        let with_attachments = OutgoingMessage {
            thread_ts: Some("1234".to_owned()),
            reply_broadcast: true,
            text: "done".to_owned(),
            attachments: Some(vec![OutgoingAttachment { text: "also done".to_owned() }]),
        };
        let wire = serde_json::to_value(&with_attachments).expect("serialize");
        assert_eq!(wire["thread_ts"], "1234");
        assert_eq!(wire["attachments"][0]["text"], "also done");
    }
}
