use crate::error::{Error, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AppSettings {
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    #[serde(default)]
    pub selected_microphone: Option<String>,
    #[serde(default = "default_speech_language")]
    pub speech_language: String,
    /// Raw bearer token as handed out by the backend. Stored verbatim,
    /// never validated or refreshed here.
    #[serde(default)]
    pub auth_token: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            selected_microphone: None,
            speech_language: default_speech_language(),
            auth_token: None,
        }
    }
}

fn default_backend_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_speech_language() -> String {
    "en-US".to_string()
}

pub fn settings_path() -> Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| Error::Config("no config directory".into()))?;
    Ok(base.join("bolo").join("settings.json"))
}

pub fn load_settings_from(path: &Path) -> Result<AppSettings> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let settings: AppSettings = serde_json::from_str(&content)?;
        Ok(settings)
    } else {
        Ok(AppSettings::default())
    }
}

pub fn save_settings_to(path: &Path, settings: &AppSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Current settings, falling back to defaults if the file is missing or
/// unreadable.
pub fn get_settings() -> AppSettings {
    match settings_path().and_then(|path| load_settings_from(&path)) {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Failed to load settings, using defaults: {}", e);
            AppSettings::default()
        }
    }
}

pub fn write_settings(settings: &AppSettings) -> Result<()> {
    let path = settings_path()?;
    save_settings_to(&path, settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings_from(&dir.path().join("settings.json")).unwrap();
        assert_eq!(settings.backend_url, "http://localhost:8000");
        assert_eq!(settings.speech_language, "en-US");
        assert!(settings.selected_microphone.is_none());
        assert!(settings.auth_token.is_none());
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = AppSettings::default();
        settings.backend_url = "http://api.example.com:9000".to_string();
        settings.selected_microphone = Some("USB Mic".to_string());
        settings.auth_token = Some("abc.def.ghi".to_string());

        save_settings_to(&path, &settings).unwrap();
        let loaded = load_settings_from(&path).unwrap();
        assert_eq!(loaded.backend_url, settings.backend_url);
        assert_eq!(loaded.selected_microphone, settings.selected_microphone);
        assert_eq!(loaded.auth_token, settings.auth_token);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"backend_url":"http://10.0.0.2:8000"}"#).unwrap();

        let settings = load_settings_from(&path).unwrap();
        assert_eq!(settings.backend_url, "http://10.0.0.2:8000");
        assert_eq!(settings.speech_language, "en-US");
    }
}
