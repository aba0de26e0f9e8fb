

use anyhow::{bail, Context, Result};
use reqwest::{header::{HeaderMap, HeaderValue, CONTENT_TYPE}, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Config;

const SEND_MESSAGE_METHOD: &str = "sendMessage";


#[derive(Debug, Clone)]
pub struct TelegramService {
    client: Client,
    headers: HeaderMap,
    send_message_endpoint: String,
    chat_id: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SendMessageRequest {
    pub chat_id: String,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BotApiResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}


impl TelegramService {
    pub fn new(config: &Config) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json;charset=UTF-8"));

        let base = config.telegram_api_url.trim_end_matches('/');
        Self {
            client: Client::new(),
            headers,
            send_message_endpoint: format!("{}/bot{}/{}", base, config.telegram_token, SEND_MESSAGE_METHOD),
            chat_id: config.telegram_chat_id.clone(),
        }
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    /// Posts `text` to the configured chat.
    ///
    /// A transport error, a non-success status or an `"ok": false` reply are all errors.
    pub async fn send_message(&self, text: &str) -> Result<()> {
        let body = SendMessageRequest {
            chat_id: self.chat_id.clone(),
            text: text.to_owned(),
        };

        // the endpoint embeds the bot token, so keep it out of error messages
        let response = self.client
            .post(&self.send_message_endpoint)
            .headers(self.headers.clone())
            .body(serde_json::to_string(&body)?)
            .send()
            .await
            .map_err(|error| error.without_url())
            .context("sendMessage request failed")?;

        let status = response.status();
        let body_string = response.text().await.map_err(|error| error.without_url())?;
        let reply = serde_json::from_str::<BotApiResponse>(&body_string)
            .with_context(|| format!("unexpected sendMessage response ({}): {}", status, body_string))?;

        if !status.is_success() || !reply.ok {
            bail!(
                "sendMessage rejected ({}): {}",
                status,
                reply.description.unwrap_or(body_string)
            );
        }

        Ok(())
    }
}
