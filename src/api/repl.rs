//! Dialogue service client
//!
//! Two remote operations over HTTPS with JSON bodies: `register` issues a
//! user identifier for this installation, `dialogue` exchanges one
//! conversational turn. Every request carries the service's fixed
//! `x-api-key` header.

use crate::config::Config;
use crate::{Error, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Registration request body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    /// Bot to register against
    pub bot_id: String,
}

/// Registration response; unknown extra fields are ignored
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// Server-issued user identifier
    pub app_user_id: String,
}

/// One outbound dialogue turn
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DialogueRequest {
    /// Registered user identifier (plaintext, decrypted for this request)
    pub app_user_id: String,
    /// Bot to talk to
    pub bot_id: String,
    /// Utterance text
    pub voice_text: String,
    /// True only on the first turn of a conversation
    pub init_talking_flag: bool,
    /// Conversation-starting-point scenario, sent only on the first turn
    pub init_topic_id: Option<String>,
}

impl DialogueRequest {
    /// Build the first turn of a conversation (initial utterance + scenario)
    pub fn for_start(app_user_id: impl Into<String>, config: &Config) -> Self {
        Self {
            app_user_id: app_user_id.into(),
            bot_id: config.bot_id.clone(),
            voice_text: config.init_utterance.clone(),
            init_talking_flag: true,
            init_topic_id: Some(config.init_topic_id.clone()),
        }
    }

    /// Build a continuing turn carrying free text
    pub fn for_talk(app_user_id: impl Into<String>, config: &Config, body: impl Into<String>) -> Self {
        Self {
            app_user_id: app_user_id.into(),
            bot_id: config.bot_id.clone(),
            voice_text: body.into(),
            init_talking_flag: false,
            init_topic_id: None,
        }
    }
}

/// The bot's reply to one dialogue turn
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dialogue {
    /// Response from the dialogue engine
    pub system_text: SystemText,
    /// Time the server sent the response
    #[serde(with = "server_time")]
    pub server_send_time: NaiveDateTime,
}

impl Dialogue {
    /// The reply text to render in the conversation view
    pub fn expression(&self) -> &str {
        &self.system_text.expression
    }
}

/// Reply text wrapper as the service ships it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SystemText {
    /// Reply text
    pub expression: String,
}

/// `yyyy-MM-dd HH:mm:ss` timestamps as used on the wire
mod server_time {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&dt.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, FORMAT).map_err(de::Error::custom)
    }
}

/// Client-side view of the two remote dialogue operations
///
/// Kept as a trait so the session orchestrator can be driven against a test
/// double. Failures are reported as `None`, never as an error the caller has
/// to surface.
#[allow(async_fn_in_trait)]
pub trait DialogueApi {
    /// Register this installation; `None` means no identifier was produced
    /// and the caller should try again next time
    async fn register(&self, bot_id: &str) -> Option<String>;

    /// Exchange one turn; `None` means skip this turn
    async fn dialogue(&self, request: &DialogueRequest) -> Option<Dialogue>;
}

/// HTTP client for the dialogue service
#[derive(Debug, Clone)]
pub struct ReplClient {
    client: reqwest::Client,
    origin: String,
    api_key: String,
}

impl ReplClient {
    /// Build a client from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let client = super::http_client(config.connect_timeout(), config.request_timeout())?;

        Ok(Self {
            client,
            origin: config.dialogue_origin.clone(),
            api_key: config.api_key.clone(),
        })
    }

    async fn try_register(&self, bot_id: &str) -> Result<String> {
        let url = format!("{}/v1/registration", self.origin);
        debug!("POST {}", url);

        let response: Registration = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(&RegistrationRequest {
                bot_id: bot_id.to_string(),
            })
            .send()
            .await
            .map_err(|e| Error::Transport(format!("Registration request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| Error::Transport(format!("Registration rejected: {}", e)))?
            .json()
            .await
            .map_err(|e| Error::Transport(format!("Invalid registration response: {}", e)))?;

        Ok(response.app_user_id)
    }

    async fn try_dialogue(&self, request: &DialogueRequest) -> Result<Dialogue> {
        let url = format!("{}/v1/dialogue", self.origin);
        debug!("POST {}", url);

        self.client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("Dialogue request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| Error::Transport(format!("Dialogue rejected: {}", e)))?
            .json()
            .await
            .map_err(|e| Error::Transport(format!("Invalid dialogue response: {}", e)))
    }
}

impl DialogueApi for ReplClient {
    async fn register(&self, bot_id: &str) -> Option<String> {
        match self.try_register(bot_id).await {
            Ok(user_id) => Some(user_id),
            Err(e) => {
                warn!("Registration produced no identifier: {}", e);
                None
            }
        }
    }

    async fn dialogue(&self, request: &DialogueRequest) -> Option<Dialogue> {
        match self.try_dialogue(request).await {
            Ok(reply) => Some(reply),
            Err(e) => {
                warn!("Dialogue turn skipped: {}", e);
                None
            }
        }
    }
}
