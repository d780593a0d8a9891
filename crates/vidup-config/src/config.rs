//! Configuration structures and loading.

use crate::error::{ConfigError, ConfigResult};
use crate::paths::AppPaths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub openrouter: OpenRouterConfig,

    #[serde(default)]
    pub deps: DepsConfig,

    #[serde(default)]
    pub video: VideoConfig,

    #[serde(default)]
    pub icon: IconConfig,
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> ConfigResult<Self> {
        let paths = AppPaths::new().ok_or(ConfigError::NoConfigDir)?;
        Self::load_from(&paths.config_file)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            tracing::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Create a default config file with comments.
    pub fn create_default_file(path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, Self::default_config_string())?;
        Ok(())
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.icon.sizes.is_empty() {
            return Err(ConfigError::Invalid("icon.sizes must not be empty".to_string()));
        }
        if let Some(bad) = self.icon.sizes.iter().find(|s| **s == 0 || **s > 256) {
            return Err(ConfigError::Invalid(format!(
                "icon size {} is outside 1..=256",
                bad
            )));
        }
        if self.video.frame_count == 0 {
            return Err(ConfigError::Invalid("video.frame_count must be at least 1".to_string()));
        }
        if self.deps.timeout_seconds == 0 || self.openrouter.timeout_seconds == 0 {
            return Err(ConfigError::Invalid("timeouts must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Directory tools are installed under, if one is configured.
    pub fn app_dir(&self) -> Option<PathBuf> {
        self.general.app_dir.as_ref().map(PathBuf::from)
    }

    /// Generate a default config file with helpful comments.
    pub fn default_config_string() -> String {
        r#"# vidup configuration

[general]
# Directory that holds ffmpeg/ and realesrgan-engine/.
# Defaults to the directory of the vidup executable.
# app_dir = "C:/Program Files/vidup"

[openrouter]
base_url = "https://openrouter.ai/api/v1"
model = "openai/gpt-4o-mini"
max_tokens = 32
temperature = 0.2
timeout_seconds = 60

# Sent as HTTP-Referer / X-Title on the first probe attempt
referer = "https://github.com/vidup/vidup"
title = "vidup"

# Prefer the OPENROUTER_API_KEY environment variable over storing a key here
# api_key = "sk-or-..."

[deps]
ffmpeg_url = "https://github.com/BtbN/FFmpeg-Builds/releases/download/latest/ffmpeg-master-latest-win64-gpl.zip"
realesrgan_url = "https://github.com/xinntao/Real-ESRGAN/releases/download/v0.2.5.0/realesrgan-ncnn-vulkan-20220424-windows.zip"
user_agent = "vidup-deps/0.1"

# Request timeout in seconds
timeout_seconds = 120

[video]
# Frames sampled by `vidup frames`
frame_count = 5

# Bounding box for `vidup thumbnail`
thumbnail_width = 320
thumbnail_height = 180

[icon]
# Square resolutions written into the .ico, largest first
sizes = [256, 128, 64, 48, 32, 24, 16]
"#
        .to_string()
    }
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    pub app_dir: Option<String>,
}

/// OpenRouter chat-completion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenRouterConfig {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_seconds: u64,
    pub referer: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "openai/gpt-4o-mini".to_string(),
            max_tokens: 32,
            temperature: 0.2,
            timeout_seconds: 60,
            referer: "https://github.com/vidup/vidup".to_string(),
            title: "vidup".to_string(),
            api_key: None,
        }
    }
}

/// External tool download settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DepsConfig {
    pub ffmpeg_url: String,
    pub realesrgan_url: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
}

impl Default for DepsConfig {
    fn default() -> Self {
        Self {
            ffmpeg_url: "https://github.com/BtbN/FFmpeg-Builds/releases/download/latest/ffmpeg-master-latest-win64-gpl.zip".to_string(),
            realesrgan_url: "https://github.com/xinntao/Real-ESRGAN/releases/download/v0.2.5.0/realesrgan-ncnn-vulkan-20220424-windows.zip".to_string(),
            user_agent: format!("vidup-deps/{}", env!("CARGO_PKG_VERSION")),
            timeout_seconds: 120,
        }
    }
}

/// Frame extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub frame_count: usize,
    pub thumbnail_width: u32,
    pub thumbnail_height: u32,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            frame_count: 5,
            thumbnail_width: 320,
            thumbnail_height: 180,
        }
    }
}

/// Icon packing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IconConfig {
    pub sizes: Vec<u32>,
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            sizes: vec![256, 128, 64, 48, 32, 24, 16],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.openrouter.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.deps.timeout_seconds, 120);
        assert_eq!(config.icon.sizes.len(), 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_string_parses() {
        let config: Config = toml::from_str(&Config::default_config_string()).unwrap();
        assert_eq!(config.video.frame_count, 5);
        assert_eq!(config.icon.sizes, IconConfig::default().sizes);
        assert!(config.general.app_dir.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
            [openrouter]
            model = "anthropic/claude-3-haiku"
            "#
        )
        .unwrap();

        let config = Config::load_from(temp_file.path()).unwrap();

        assert_eq!(config.openrouter.model, "anthropic/claude-3-haiku");
        // Defaults should still work
        assert_eq!(config.openrouter.max_tokens, 32);
        assert_eq!(config.deps.timeout_seconds, 120);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.video.thumbnail_width, 320);
    }

    #[test]
    fn test_rejects_oversized_icon() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[icon]\nsizes = [512, 256]").unwrap();

        let err = Config::load_from(temp_file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_save_roundtrip_keeps_app_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.general.app_dir = Some("/opt/vidup".to_string());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.app_dir(), Some(PathBuf::from("/opt/vidup")));
    }
}
