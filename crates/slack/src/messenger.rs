use async_trait::async_trait;
use secrecy::SecretString;
use tracing::debug;

use kotoba_core::{
    IncomingMessage, MessageKind, Messenger, MessengerError, OutgoingMessage, UserInfo,
};

use crate::api::{SlackApiClient, WireMessage};

/// [`Messenger`] backed by the Slack Web API.
///
/// Fetching works in two steps: a history lookup pinned at the target
/// timestamp answers for top-level messages; anything else is retried as a
/// thread reply. A reply's own thread anchor is preserved so the
/// translation lands in the same thread.
pub struct SlackMessenger {
    api: SlackApiClient,
}

impl SlackMessenger {
    pub fn new(bot_token: SecretString) -> Result<Self, MessengerError> {
        Ok(Self { api: SlackApiClient::new(bot_token)? })
    }
}

#[async_trait]
impl Messenger for SlackMessenger {
    async fn fetch_message(
        &self,
        channel: &str,
        ts: &str,
    ) -> Result<Option<IncomingMessage>, MessengerError> {
        let history = self.api.conversations_history(channel, ts).await?;
        let Some(message) = history.messages.and_then(|m| m.into_iter().next()) else {
            return Ok(None);
        };

        if message.ts.as_deref() == Some(ts) {
            return Ok(Some(top_level_message(message)));
        }

        debug!(channel, ts, "timestamp is not a top-level message, trying replies");
        let replies = self.api.conversations_replies(channel, ts).await?;
        Ok(replies
            .messages
            .and_then(|m| m.into_iter().next())
            .and_then(|reply| reply_message(ts, reply)))
    }

    async fn post_message(
        &self,
        channel: &str,
        message: &OutgoingMessage,
    ) -> Result<(), MessengerError> {
        self.api.chat_post_message(channel, message).await
    }

    async fn fetch_user(&self, user_id: &str) -> Result<Option<UserInfo>, MessengerError> {
        let response = self.api.users_info(user_id).await?;
        if !response.ok {
            return Ok(None);
        }

        Ok(response.user.map(|user| {
            let profile = user.profile.unwrap_or_default();
            UserInfo {
                id: user_id.to_owned(),
                is_bot: user.is_bot.unwrap_or(false),
                bot_id: profile.bot_id,
                name: profile.real_name_normalized.unwrap_or_else(|| "(noname)".to_owned()),
            }
        }))
    }
}

/// A history hit at the exact timestamp is a top-level message; its own ts
/// is the thread anchor replies attach to.
fn top_level_message(message: WireMessage) -> IncomingMessage {
    IncomingMessage {
        kind: MessageKind::Message,
        thread_ts: message.ts,
        text: message.text,
        attachments: message.attachments,
    }
}

/// A replies hit only counts when its ts matches the target; the reply
/// keeps its parent's thread anchor.
fn reply_message(target_ts: &str, message: WireMessage) -> Option<IncomingMessage> {
    (message.ts.as_deref() == Some(target_ts)).then(|| IncomingMessage {
        kind: MessageKind::Reply,
        thread_ts: message.thread_ts,
        text: message.text,
        attachments: message.attachments,
    })
}
