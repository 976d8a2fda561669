use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use proxalert_core::shared::constants::{COOLDOWN_SECONDS, MATCH_THRESHOLD};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub gallery_dir: PathBuf,
    pub camera_url: String,
    pub domain_id: u32,
    pub cooldown_seconds: u64,
    pub match_threshold: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gallery_dir: PathBuf::from("gallery"),
            camera_url: "http://127.0.0.1:8080/video".to_string(),
            domain_id: 0,
            cooldown_seconds: COOLDOWN_SECONDS,
            match_threshold: MATCH_THRESHOLD,
        }
    }
}

impl Settings {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("ProxAlert").join("settings.json"))
    }

    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| fs::read_to_string(path).ok())
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default()
    }

    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            if let Ok(json) = serde_json::to_string_pretty(self) {
                let _ = fs::write(path, json);
            }
        }
    }
}
