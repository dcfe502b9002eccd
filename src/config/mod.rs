use serde::Deserialize;
use std::time::Duration;

use crate::models::settings::{AspectRatio, GenerationSettings};
use crate::services::queue::DEFAULT_COOLDOWN;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "127.0.0.1:3000")
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Gemini API key
    pub gemini_api_key: String,

    /// Image model name
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Gemini API base URL
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,

    /// Delay between two generation calls, in milliseconds
    #[serde(default = "default_queue_cooldown_ms")]
    pub queue_cooldown_ms: u64,

    /// Aspect ratio used until a batch sets another one
    #[serde(default)]
    pub default_aspect_ratio: AspectRatio,
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash-image".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_queue_cooldown_ms() -> u64 {
    DEFAULT_COOLDOWN.as_millis() as u64
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    pub fn queue_cooldown(&self) -> Duration {
        Duration::from_millis(self.queue_cooldown_ms)
    }

    pub fn default_settings(&self) -> GenerationSettings {
        GenerationSettings::with_aspect_ratio(self.default_aspect_ratio)
    }
}
