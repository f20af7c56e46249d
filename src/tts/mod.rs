//! Speech synthesis for assistant replies

use async_trait::async_trait;
use reqwest::Client;

use crate::audio::AudioFormat;
use crate::config::{TtsConfig, TtsProvider};
use crate::{Error, Result};

/// Synthesized speech plus its container format
#[derive(Debug, Clone)]
pub struct SpeechAudio {
    /// Encoded audio bytes
    pub bytes: Vec<u8>,

    /// Container format, also selecting the upload content type
    pub format: AudioFormat,
}

/// Converts reply text into speech audio
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize one reply
    ///
    /// # Errors
    ///
    /// Returns error if synthesis fails
    async fn synthesize(&self, text: &str) -> Result<SpeechAudio>;
}

/// HTTP speech-synthesis client
pub struct SpeechClient {
    client: Client,
    provider: TtsProvider,
    api_key: String,
    voice: String,
    model: String,
    speed: f32,
    format: AudioFormat,
}

impl SpeechClient {
    /// Create a new speech client from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing or the provider cannot
    /// produce the configured output format
    pub fn new(config: &TtsConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(Error::Config(format!(
                "{} API key required for TTS",
                config.provider.name()
            )));
        }
        if config.provider == TtsProvider::ElevenLabs && config.format != AudioFormat::Mp3 {
            return Err(Error::Config(
                "ElevenLabs synthesis only produces MP3".to_string(),
            ));
        }

        Ok(Self {
            client: Client::new(),
            provider: config.provider,
            api_key: config.api_key.clone(),
            voice: config.voice.clone(),
            model: config.model.clone(),
            speed: config.speed,
            format: config.format,
        })
    }

    /// Synthesize using the OpenAI speech endpoint
    async fn synthesize_openai(&self, text: &str) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct SpeechRequest<'a> {
            model: &'a str,
            input: &'a str,
            voice: &'a str,
            speed: f32,
            response_format: &'a str,
        }

        let request = SpeechRequest {
            model: &self.model,
            input: text,
            voice: &self.voice,
            speed: self.speed,
            response_format: self.format.extension(),
        };

        let response = self
            .client
            .post("https://api.openai.com/v1/audio/speech")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Tts(format!("OpenAI TTS error {status}: {body}")));
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Synthesize using the ElevenLabs voice endpoint
    async fn synthesize_elevenlabs(&self, text: &str) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct ElevenLabsRequest<'a> {
            text: &'a str,
            model_id: &'a str,
        }

        let url = format!("https://api.elevenlabs.io/v1/text-to-speech/{}", self.voice);
        let request = ElevenLabsRequest {
            text,
            model_id: &self.model,
        };

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Tts(format!("ElevenLabs TTS error {status}: {body}")));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl SpeechSynthesizer for SpeechClient {
    async fn synthesize(&self, text: &str) -> Result<SpeechAudio> {
        let bytes = match self.provider {
            TtsProvider::OpenAi => self.synthesize_openai(text).await?,
            TtsProvider::ElevenLabs => self.synthesize_elevenlabs(text).await?,
        };

        Ok(SpeechAudio {
            bytes,
            format: self.format,
        })
    }
}
