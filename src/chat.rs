//! Per-request pipeline: reply generation, speech, lip sync, fan-out
//!
//! One [`ChatPipeline`] is constructed at process start with already-built
//! service clients and reused across requests; nothing is recreated per
//! request. Each invocation is independent and stateless, so concurrent
//! requests simply run through the same pipeline in parallel.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::audio;
use crate::db::ExchangeRepo;
use crate::lipsync::{self, LipSyncConfig};
use crate::model::ReplyModel;
use crate::notify::Publisher;
use crate::storage::AudioStore;
use crate::tts::SpeechSynthesizer;
use crate::{Error, Result};

/// Result of one handled message
#[derive(Debug, Clone, Serialize)]
pub struct ChatOutcome {
    /// Request identifier, also the key stem of the stored audio
    pub request_id: String,

    /// Generated reply text
    pub reply: String,

    /// Retrievable URL of the synthesized audio
    pub audio_url: String,

    /// Number of lip-sync events pushed to subscribers
    pub events: usize,
}

/// Sequences one chat message through all collaborators
pub struct ChatPipeline {
    model: Arc<dyn ReplyModel>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    store: Arc<dyn AudioStore>,
    publisher: Arc<dyn Publisher>,
    exchanges: ExchangeRepo,
    lipsync: LipSyncConfig,
}

impl ChatPipeline {
    /// Create a new pipeline from already-constructed collaborator handles
    #[must_use]
    pub fn new(
        model: Arc<dyn ReplyModel>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        store: Arc<dyn AudioStore>,
        publisher: Arc<dyn Publisher>,
        exchanges: ExchangeRepo,
        lipsync: LipSyncConfig,
    ) -> Self {
        Self {
            model,
            synthesizer,
            store,
            publisher,
            exchanges,
            lipsync,
        }
    }

    /// Handle one inbound message end to end
    ///
    /// Completed side effects are not rolled back when a later step fails;
    /// the exchange record is the source of truth for what was generated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Input`] for an empty message (before any
    /// collaborator is invoked) and the failing collaborator's error for
    /// anything downstream.
    pub async fn handle(&self, message: &str) -> Result<ChatOutcome> {
        let message = message.trim();
        if message.is_empty() {
            return Err(Error::Input("message must not be empty".to_string()));
        }

        let request_id = Uuid::new_v4().to_string();
        tracing::info!(request_id = %request_id, "handling chat message");

        let reply = self.model.reply(message).await?;
        tracing::debug!(request_id = %request_id, chars = reply.len(), "model reply received");

        let speech = self.synthesizer.synthesize(&reply).await?;
        let format = speech.format;

        let waveform = audio::decode(&speech.bytes, format)?;
        let track = lipsync::extract(&waveform, &self.lipsync)?;
        tracing::debug!(
            request_id = %request_id,
            samples = waveform.samples.len(),
            events = track.len(),
            "lip-sync track extracted"
        );

        let key = format!("reply_{request_id}.{}", format.extension());
        let audio_url = self
            .store
            .put(&key, speech.bytes, format.content_type())
            .await?;

        self.exchanges.insert(&request_id, message, &reply, &key)?;

        if let Err(e) = self.publisher.publish(&reply, &audio_url, &track).await {
            tracing::warn!(
                request_id = %request_id,
                audio_key = %key,
                "publish failed after upload, audio object left in place"
            );
            return Err(e);
        }

        tracing::info!(request_id = %request_id, events = track.len(), "chat message completed");

        Ok(ChatOutcome {
            request_id,
            reply,
            audio_url,
            events: track.len(),
        })
    }
}
