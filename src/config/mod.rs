//! Configuration management for the avatar gateway
//!
//! Values resolve env > TOML file > default. Everything needed to build the
//! service clients is validated here, at process start, so a malformed
//! deployment fails before it takes traffic.

pub mod file;

use std::path::PathBuf;

use crate::audio::AudioFormat;
use crate::lipsync::LipSyncConfig;
use crate::{Error, Result};

/// Avatar gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API server configuration
    pub server: ServerConfig,

    /// Language-model collaborator configuration
    pub model: ModelConfig,

    /// Speech-synthesis collaborator configuration
    pub tts: TtsConfig,

    /// Object storage configuration
    pub storage: StorageConfig,

    /// Push notification configuration
    pub push: PushConfig,

    /// Lip-sync transform tuning
    pub lipsync: LipSyncConfig,

    /// Path to data directory (database)
    pub data_dir: PathBuf,
}

/// HTTP API server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
}

/// Language-model collaborator configuration
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Completion API base URL
    pub base_url: String,

    /// API key (from `ANTHROPIC_API_KEY`)
    pub api_key: String,

    /// Model identifier
    pub model: String,

    /// Output-token budget per reply
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,
}

/// Speech-synthesis provider backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtsProvider {
    OpenAi,
    ElevenLabs,
}

impl TtsProvider {
    /// Human-readable provider name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::ElevenLabs => "ElevenLabs",
        }
    }

    /// Parse a provider name
    ///
    /// # Errors
    ///
    /// Returns error on an unknown provider name
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "elevenlabs" => Ok(Self::ElevenLabs),
            other => Err(Error::Config(format!("unknown TTS provider: {other}"))),
        }
    }

    /// Default synthesis model for the provider
    const fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "tts-1",
            Self::ElevenLabs => "eleven_monolingual_v1",
        }
    }
}

/// Speech-synthesis collaborator configuration
#[derive(Debug, Clone)]
pub struct TtsConfig {
    /// Provider backend
    pub provider: TtsProvider,

    /// Provider API key
    pub api_key: String,

    /// Voice identity (OpenAI voice name or ElevenLabs voice id)
    pub voice: String,

    /// Synthesis model
    pub model: String,

    /// Speed multiplier
    pub speed: f32,

    /// Output container format
    pub format: AudioFormat,
}

/// Object storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// S3-compatible endpoint URL
    pub endpoint: String,

    /// Bucket receiving audio objects
    pub bucket: String,

    /// Optional bearer token for uploads
    pub token: Option<String>,

    /// Optional public base URL for retrievable audio links; already scoped
    /// to the bucket
    pub public_base_url: Option<String>,
}

/// Push notification configuration
#[derive(Debug, Clone)]
pub struct PushConfig {
    /// GraphQL push endpoint URL
    pub endpoint: String,

    /// Push API key
    pub api_key: String,

    /// Resolved channel identifier (see [`resolve_channel_id`])
    pub channel: String,
}

impl Config {
    /// Load configuration from environment and the optional TOML file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when a required value is missing or a
    /// supplied value is malformed.
    pub fn load() -> Result<Self> {
        let fc = file::load_config_file();

        let server = ServerConfig {
            port: std::env::var("AVATAR_PORT")
                .or_else(|_| std::env::var("PORT"))
                .ok()
                .and_then(|s| s.parse().ok())
                .or(fc.server.port)
                .unwrap_or(18790),
        };

        let model = ModelConfig {
            base_url: std::env::var("AVATAR_MODEL_URL")
                .ok()
                .or(fc.model.base_url)
                .unwrap_or_else(|| "https://api.anthropic.com".to_string()),
            api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .or(fc.api_keys.anthropic)
                .unwrap_or_default(),
            model: std::env::var("AVATAR_MODEL")
                .ok()
                .or(fc.model.model)
                .unwrap_or_else(|| "claude-2.1".to_string()),
            max_tokens: std::env::var("AVATAR_MODEL_MAX_TOKENS")
                .ok()
                .and_then(|s| s.parse().ok())
                .or(fc.model.max_tokens)
                .unwrap_or(300),
            temperature: std::env::var("AVATAR_MODEL_TEMPERATURE")
                .ok()
                .and_then(|s| s.parse().ok())
                .or(fc.model.temperature)
                .unwrap_or(0.7),
        };

        let provider = TtsProvider::parse(
            &std::env::var("AVATAR_TTS_PROVIDER")
                .ok()
                .or(fc.tts.provider)
                .unwrap_or_else(|| "openai".to_string()),
        )?;
        let tts_key_env = match provider {
            TtsProvider::OpenAi => "OPENAI_API_KEY",
            TtsProvider::ElevenLabs => "ELEVENLABS_API_KEY",
        };
        let tts_key_file = match provider {
            TtsProvider::OpenAi => fc.api_keys.openai,
            TtsProvider::ElevenLabs => fc.api_keys.elevenlabs,
        };
        let format_name = std::env::var("AVATAR_TTS_FORMAT")
            .ok()
            .or(fc.tts.format)
            .unwrap_or_else(|| "mp3".to_string());
        let format = AudioFormat::from_name(&format_name)
            .ok_or_else(|| Error::Config(format!("unknown TTS output format: {format_name}")))?;

        let tts = TtsConfig {
            provider,
            api_key: std::env::var(tts_key_env)
                .ok()
                .or(tts_key_file)
                .unwrap_or_default(),
            voice: std::env::var("AVATAR_TTS_VOICE")
                .ok()
                .or(fc.tts.voice)
                .unwrap_or_else(|| "alloy".to_string()),
            model: std::env::var("AVATAR_TTS_MODEL")
                .ok()
                .or(fc.tts.model)
                .unwrap_or_else(|| provider.default_model().to_string()),
            speed: std::env::var("AVATAR_TTS_SPEED")
                .ok()
                .and_then(|s| s.parse().ok())
                .or(fc.tts.speed)
                .unwrap_or(1.0),
            format,
        };

        let storage = StorageConfig {
            endpoint: require("AVATAR_STORAGE_ENDPOINT", fc.storage.endpoint)?,
            bucket: std::env::var("AVATAR_AUDIO_BUCKET")
                .ok()
                .or(fc.storage.bucket)
                .unwrap_or_else(|| "avatar-audio".to_string()),
            token: std::env::var("AVATAR_STORAGE_TOKEN").ok(),
            public_base_url: std::env::var("AVATAR_AUDIO_BASE_URL")
                .ok()
                .or(fc.storage.public_base_url),
        };

        let push = PushConfig {
            endpoint: require("AVATAR_PUSH_URL", fc.push.endpoint)?,
            api_key: require("AVATAR_PUSH_API_KEY", None)?,
            channel: resolve_channel_id(&require("AVATAR_PUSH_CHANNEL", fc.push.channel)?)?,
        };

        let lipsync = LipSyncConfig {
            frame_secs: fc.lipsync.frame_secs.unwrap_or(0.05),
            hop_secs: fc.lipsync.hop_secs.unwrap_or(0.025),
            threshold: std::env::var("AVATAR_LIPSYNC_THRESHOLD")
                .ok()
                .and_then(|s| s.parse().ok())
                .or(fc.lipsync.threshold)
                .unwrap_or(0.2),
        };
        validate_lipsync(&lipsync)?;

        // Data directory (~/.local/share/avatar-gateway on Linux)
        let data_dir = directories::BaseDirs::new()
            .map_or_else(|| PathBuf::from("."), |d| d.data_dir().join("avatar-gateway"));
        std::fs::create_dir_all(&data_dir).ok();

        Ok(Self {
            server,
            model,
            tts,
            storage,
            push,
            lipsync,
            data_dir,
        })
    }

    /// Path to the SQLite database file
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("avatar.db")
    }
}

/// Read a required value from the environment with a TOML fallback
fn require(name: &str, fallback: Option<String>) -> Result<String> {
    std::env::var(name)
        .ok()
        .or(fallback)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| Error::Config(format!("{name} is required")))
}

/// Validate lip-sync tuning at load time
///
/// Duration-to-sample resolution is re-checked against each waveform's
/// actual sample rate inside the transform; this catches values that can
/// never be valid.
fn validate_lipsync(config: &LipSyncConfig) -> Result<()> {
    if !(config.threshold > 0.0 && config.threshold <= 1.0) {
        return Err(Error::Config(format!(
            "lip-sync threshold must be in (0, 1], got {}",
            config.threshold
        )));
    }
    if config.frame_secs <= 0.0 || config.hop_secs <= 0.0 {
        return Err(Error::Config(
            "lip-sync frame and hop durations must be positive".to_string(),
        ));
    }
    if config.frame_secs < config.hop_secs {
        return Err(Error::Config(
            "lip-sync frame duration must be at least the hop duration".to_string(),
        ));
    }
    Ok(())
}

/// Resolve the push channel identifier
///
/// Accepts either a bare identifier or a fully-qualified resource name such
/// as `channels/staging/avatar-main`, whose trailing segment is the
/// identifier. Malformed values fail instead of passing through.
///
/// # Errors
///
/// Returns [`Error::Config`] for empty values, resource names with empty
/// segments, or identifiers with characters outside `[A-Za-z0-9_-]`.
pub fn resolve_channel_id(raw: &str) -> Result<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::Config("push channel identifier is empty".to_string()));
    }

    let id = if raw.contains('/') {
        let segments: Vec<&str> = raw.split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(Error::Config(format!(
                "malformed channel resource name: {raw}"
            )));
        }
        segments.last().copied().unwrap_or(raw)
    } else {
        raw
    };

    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(Error::Config(format!(
            "channel identifier contains invalid characters: {id}"
        )));
    }

    Ok(id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_channel_id_passes_through() {
        assert_eq!(resolve_channel_id("avatar-main").unwrap(), "avatar-main");
        assert_eq!(resolve_channel_id("  team_42  ").unwrap(), "team_42");
    }

    #[test]
    fn qualified_name_yields_trailing_segment() {
        assert_eq!(
            resolve_channel_id("channels/staging/avatar-main").unwrap(),
            "avatar-main"
        );
    }

    #[test]
    fn malformed_names_fail() {
        assert!(resolve_channel_id("").is_err());
        assert!(resolve_channel_id("   ").is_err());
        assert!(resolve_channel_id("channels//avatar-main").is_err());
        assert!(resolve_channel_id("channels/avatar-main/").is_err());
        assert!(resolve_channel_id("avatar main").is_err());
        assert!(resolve_channel_id("channels/bad id").is_err());
    }

    #[test]
    fn lipsync_validation_bounds() {
        let ok = LipSyncConfig::default();
        assert!(validate_lipsync(&ok).is_ok());

        let bad_threshold = LipSyncConfig { threshold: 0.0, ..ok };
        assert!(validate_lipsync(&bad_threshold).is_err());

        let bad_hop = LipSyncConfig { hop_secs: 0.1, ..ok };
        assert!(validate_lipsync(&bad_hop).is_err());
    }
}
