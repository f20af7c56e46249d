//! TOML configuration file loading
//!
//! Supports `~/.config/avatar-gateway/config.toml` as a persistent config
//! source. All fields are optional; the file is a partial overlay that
//! environment variables override.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct AvatarConfigFile {
    /// Server/runtime configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Language-model configuration
    #[serde(default)]
    pub model: ModelFileConfig,

    /// Speech-synthesis configuration
    #[serde(default)]
    pub tts: TtsFileConfig,

    /// Object storage configuration
    #[serde(default)]
    pub storage: StorageFileConfig,

    /// Push notification configuration
    #[serde(default)]
    pub push: PushFileConfig,

    /// Lip-sync transform tuning
    #[serde(default)]
    pub lipsync: LipSyncFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// API server port
    pub port: Option<u16>,
}

/// Language-model configuration
#[derive(Debug, Default, Deserialize)]
pub struct ModelFileConfig {
    /// Completion API base URL
    pub base_url: Option<String>,

    /// Model identifier (e.g. "claude-2.1")
    pub model: Option<String>,

    /// Output-token budget per reply
    pub max_tokens: Option<u32>,

    /// Sampling temperature
    pub temperature: Option<f32>,
}

/// Speech-synthesis configuration
#[derive(Debug, Default, Deserialize)]
pub struct TtsFileConfig {
    /// Provider backend ("openai" or "elevenlabs")
    pub provider: Option<String>,

    /// Voice identity
    pub voice: Option<String>,

    /// Synthesis model
    pub model: Option<String>,

    /// Speed multiplier
    pub speed: Option<f32>,

    /// Output container format ("mp3" or "wav")
    pub format: Option<String>,
}

/// Object storage configuration
#[derive(Debug, Default, Deserialize)]
pub struct StorageFileConfig {
    /// S3-compatible endpoint URL
    pub endpoint: Option<String>,

    /// Bucket receiving audio objects
    pub bucket: Option<String>,

    /// Public base URL for retrievable audio links
    pub public_base_url: Option<String>,
}

/// Push notification configuration
#[derive(Debug, Default, Deserialize)]
pub struct PushFileConfig {
    /// GraphQL push endpoint URL
    pub endpoint: Option<String>,

    /// Channel identifier, bare or fully qualified
    pub channel: Option<String>,
}

/// Lip-sync transform tuning
#[derive(Debug, Default, Deserialize)]
pub struct LipSyncFileConfig {
    /// Analysis window duration in seconds
    pub frame_secs: Option<f32>,

    /// Step between consecutive windows in seconds
    pub hop_secs: Option<f32>,

    /// Peak-normalized loudness threshold
    pub threshold: Option<f32>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub anthropic: Option<String>,
    pub openai: Option<String>,
    pub elevenlabs: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `AvatarConfigFile::default()` if the file doesn't exist or can't
/// be parsed.
pub fn load_config_file() -> AvatarConfigFile {
    let Some(path) = config_file_path() else {
        return AvatarConfigFile::default();
    };

    if !path.exists() {
        return AvatarConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                AvatarConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            AvatarConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/avatar-gateway/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("avatar-gateway").join("config.toml"))
}
