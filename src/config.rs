//! Application configuration
//!
//! Persistent configuration for the Kaiwa core, stored as JSON and
//! loadable/savable from disk. Defaults match the hosted dialogue service;
//! the embedding application injects its API key.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Core configuration
///
/// # Example
/// ```rust,no_run
/// use kaiwa::config::Config;
///
/// // Load configuration (returns defaults if the file doesn't exist)
/// let mut config = Config::load("kaiwa.json").expect("Failed to load");
/// config.api_key = "my-api-key".to_string();
/// config.save("kaiwa.json").expect("Failed to save");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Dialogue service origin
    pub dialogue_origin: String,
    /// Fixed API key attached to every dialogue-service request
    pub api_key: String,
    /// Bot to register against and talk to
    pub bot_id: String,
    /// Utterance sent on the first turn of a conversation
    pub init_utterance: String,
    /// Scenario id sent on the first turn of a conversation
    pub init_topic_id: String,
    /// Profile-list service origin
    pub profile_origin: String,
    /// TCP connect timeout in seconds; keep below the request timeout
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds (covers the read window)
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dialogue_origin: "https://api.repl-ai.jp".to_string(),
            api_key: String::new(),
            bot_id: "sample".to_string(),
            init_utterance: "init".to_string(),
            init_topic_id: "aisatsu".to_string(),
            profile_origin: "https://randomuser.me".to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 20,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    ///
    /// Returns defaults if the file doesn't exist or is empty.
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let data = std::fs::read_to_string(path)
            .map_err(|e| Error::Storage(format!("Failed to read config: {}", e)))?;

        if data.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_json::from_str(&data)
            .map_err(|e| Error::Storage(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to a JSON file
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Storage(format!("Failed to create config dir: {}", e)))?;
        }

        let json = serde_json::to_string_pretty(self)?;

        std::fs::write(path, json)
            .map_err(|e| Error::Storage(format!("Failed to write config: {}", e)))
    }

    /// TCP connect timeout
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Whole-request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
