use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;

use kotoba_core::{Attachment, MessengerError, OutgoingMessage};

const SLACK_API_BASE_URL: &str = "https://slack.com/api";

/// Thin client over the Slack Web API methods the bot needs. Every call
/// authenticates with the bot token; Slack signals application errors with
/// `ok: false` on an HTTP 200, so callers inspect the envelope.
pub struct SlackApiClient {
    client: Client,
    bot_token: SecretString,
    base_url: String,
}

impl SlackApiClient {
    pub fn new(bot_token: SecretString) -> Result<Self, MessengerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|error| MessengerError::Transport(error.to_string()))?;

        Ok(Self { client, bot_token, base_url: SLACK_API_BASE_URL.to_owned() })
    }

    pub(crate) async fn conversations_history(
        &self,
        channel: &str,
        latest: &str,
    ) -> Result<HistoryResponse, MessengerError> {
        self.get(
            "conversations.history",
            &[("channel", channel), ("latest", latest), ("inclusive", "true"), ("limit", "1")],
        )
        .await
    }

    pub(crate) async fn conversations_replies(
        &self,
        channel: &str,
        ts: &str,
    ) -> Result<HistoryResponse, MessengerError> {
        self.get(
            "conversations.replies",
            &[("channel", channel), ("ts", ts), ("inclusive", "true"), ("limit", "1")],
        )
        .await
    }

    pub(crate) async fn users_info(&self, user: &str) -> Result<UsersInfoResponse, MessengerError> {
        self.get("users.info", &[("user", user)]).await
    }

    pub(crate) async fn chat_post_message(
        &self,
        channel: &str,
        message: &OutgoingMessage,
    ) -> Result<(), MessengerError> {
        let payload = post_message_payload(channel, message)
            .map_err(|error| MessengerError::Api(error.to_string()))?;

        let response: ApiAck = self
            .client
            .post(format!("{}/chat.postMessage", self.base_url))
            .bearer_auth(self.bot_token.expose_secret())
            .json(&payload)
            .send()
            .await
            .map_err(|error| MessengerError::Transport(error.to_string()))?
            .json()
            .await
            .map_err(|error| MessengerError::Transport(error.to_string()))?;

        if !response.ok {
            return Err(MessengerError::Api(
                response.error.unwrap_or_else(|| "unknown_error".to_owned()),
            ));
        }

        Ok(())
    }

    async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        query: &[(&str, &str)],
    ) -> Result<T, MessengerError> {
        self.client
            .get(format!("{}/{method}", self.base_url))
            .bearer_auth(self.bot_token.expose_secret())
            .query(query)
            .send()
            .await
            .map_err(|error| MessengerError::Transport(error.to_string()))?
            .json()
            .await
            .map_err(|error| MessengerError::Transport(error.to_string()))
    }
}

/// The `chat.postMessage` body: the outgoing message with the channel
/// spliced in alongside its own fields.
pub(crate) fn post_message_payload(
    channel: &str,
    message: &OutgoingMessage,
) -> Result<Value, serde_json::Error> {
    let mut payload = serde_json::to_value(message)?;
    if let Some(fields) = payload.as_object_mut() {
        fields.insert("channel".to_owned(), Value::String(channel.to_owned()));
    }
    Ok(payload)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiAck {
    pub ok: bool,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryResponse {
    #[allow(dead_code)]
    pub ok: bool,
    pub messages: Option<Vec<WireMessage>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WireMessage {
    pub ts: Option<String>,
    pub thread_ts: Option<String>,
    pub text: Option<String>,
    pub attachments: Option<Vec<Attachment>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UsersInfoResponse {
    pub ok: bool,
    pub user: Option<WireUser>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WireUser {
    pub is_bot: Option<bool>,
    pub profile: Option<WireProfile>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WireProfile {
    pub bot_id: Option<String>,
    pub real_name_normalized: Option<String>,
}

#[cfg(test)]
mod tests {
    use kotoba_core::{OutgoingAttachment, OutgoingMessage};

    use super::post_message_payload;

    #[test]
    fn post_payload_carries_channel_and_omits_absent_fields() {
        let message = OutgoingMessage {
            thread_ts: Some("1234".to_owned()),
            reply_broadcast: true,
            text: "Hello, baby".to_owned(),
            attachments: None,
        };

        let payload = post_message_payload("test", &message).expect("payload");

        assert_eq!(payload["channel"], "test");
        assert_eq!(payload["thread_ts"], "1234");
        assert_eq!(payload["reply_broadcast"], true);
        assert_eq!(payload["text"], "Hello, baby");
        assert!(payload.get("attachments").is_none());
    }

    #[test]
    fn post_payload_serializes_attachments() {
        let message = OutgoingMessage {
            thread_ts: None,
            reply_broadcast: false,
            text: "done".to_owned(),
            attachments: Some(vec![OutgoingAttachment { text: "really done".to_owned() }]),
        };

        let payload = post_message_payload("C1", &message).expect("payload");

        assert!(payload.get("thread_ts").is_none());
        assert_eq!(payload["attachments"][0]["text"], "really done");
    }
}
