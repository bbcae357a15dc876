use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::engine::session::SessionOptions;

pub const API_URL_ENV: &str = "LOVE_PATHS_API_URL";
pub const INIT_DATA_ENV: &str = "LOVE_PATHS_INIT_DATA";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Origin the `/api/...` paths are resolved against
    pub api_base: String,
    pub story_code: String,
    pub lang: String,
    pub languages: Vec<String>,

    /// Sent as the debug identity when no host token is present
    pub debug_user_id: String,

    pub default_item_price: u32,
    pub ack_seconds: u64,
    pub request_timeout_secs: u64,

    /// Send `bypass-tunnel-reminder: 1` with every request
    pub tunnel_bypass: bool,

    pub ui_scale: f32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: "http://127.0.0.1:8080".into(),
            story_code: "office_flirt".into(),
            lang: "ru".into(),
            languages: ["ru", "en", "es", "de", "fr"]
                .iter()
                .map(|l| l.to_string())
                .collect(),
            debug_user_id: "12345".into(),
            default_item_price: 10,
            ack_seconds: 2,
            request_timeout_secs: 30,
            tunnel_bypass: true,
            ui_scale: 1.0,
        }
    }
}

impl ClientConfig {
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("love_paths");
        path.push("client.json");
        path
    }

    /// Read the config at `path`. A missing or unreadable file gives defaults.
    pub fn load_from(path: &Path) -> Self {
        let config = match fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                warn!("Ignoring invalid config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => {
                debug!("No config at {}; using defaults", path.display());
                Self::default()
            }
        };
        config.with_env_overrides()
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_base = url.trim().to_string();
            }
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            default_item_price: self.default_item_price,
            ack_ttl: Duration::from_secs(self.ack_seconds),
        }
    }
}
