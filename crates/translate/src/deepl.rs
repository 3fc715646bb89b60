use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use kotoba_core::{Language, Translator, TranslatorError};

/// [`Translator`] backed by the DeepL `v2/translate` endpoint.
///
/// Requests are form-encoded with the text and target language code and
/// authenticated with the `DeepL-Auth-Key` header. A non-success status is
/// an error carrying the upstream body; the first translation in the
/// response is the result.
pub struct DeepLTranslator {
    client: Client,
    api_key: SecretString,
    base_url: String,
}

impl DeepLTranslator {
    pub fn new(api_key: SecretString, base_url: impl Into<String>) -> Result<Self, TranslatorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|error| TranslatorError::Transport(error.to_string()))?;

        Ok(Self { client, api_key, base_url: base_url.into() })
    }
}

#[async_trait]
impl Translator for DeepLTranslator {
    async fn translate(&self, text: &str, target: Language) -> Result<String, TranslatorError> {
        debug!(target = %target, "requesting translation");

        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key.expose_secret()))
            .form(&[("text", text), ("target_lang", target.code())])
            .send()
            .await
            .map_err(|error| TranslatorError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslatorError::UpstreamStatus { status: status.as_u16(), body });
        }

        let payload: TranslateResponse = response
            .json()
            .await
            .map_err(|error| TranslatorError::Transport(error.to_string()))?;

        first_translation(payload)
    }
}

fn first_translation(payload: TranslateResponse) -> Result<String, TranslatorError> {
    payload
        .translations
        .into_iter()
        .next()
        .map(|translation| translation.text)
        .ok_or(TranslatorError::EmptyResponse)
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(default)]
    translations: Vec<TranslationPayload>,
}

#[derive(Debug, Deserialize)]
struct TranslationPayload {
    text: String,
}

#[cfg(test)]
mod tests {
    use kotoba_core::TranslatorError;

    use super::{first_translation, TranslateResponse};

    #[test]
    fn first_translation_wins_when_several_are_returned() {
        let payload: TranslateResponse = serde_json::from_value(serde_json::json!({
            "translations": [
                { "detected_source_language": "JA", "text": "Hello, baby" },
                { "detected_source_language": "JA", "text": "Hi, baby" },
            ],
        }))
        .expect("parse response");

        assert_eq!(first_translation(payload).expect("translation"), "Hello, baby");
    }

    #[test]
    fn empty_translation_lists_are_an_error() {
        let payload: TranslateResponse =
            serde_json::from_value(serde_json::json!({ "translations": [] }))
                .expect("parse response");

        assert_eq!(first_translation(payload), Err(TranslatorError::EmptyResponse));

        let missing: TranslateResponse =
            serde_json::from_value(serde_json::json!({})).expect("parse response");
        assert!(first_translation(missing).is_err());
    }
}
