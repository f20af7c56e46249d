//! Real-time push notifications to subscribed avatar clients
//!
//! Each completed exchange is published once as a GraphQL mutation carrying
//! the reply text, the audio URL, and the lip-sync track. Delivery is
//! best-effort on the service side, but a failed publish surfaces as an
//! error to the caller rather than being swallowed.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::config::PushConfig;
use crate::lipsync::LipSyncTrack;
use crate::{Error, Result};

/// GraphQL mutation published once per completed exchange
const PUBLISH_MUTATION: &str = "\
mutation PublishReply($channel: String!, $response: String!, $audioUrl: String!, $lipSync: String!) {
  publishReply(channel: $channel, response: $response, audioUrl: $audioUrl, lipSync: $lipSync) {
    response
  }
}";

/// Pushes one reply to subscribed clients
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish one reply
    ///
    /// # Errors
    ///
    /// Returns error if delivery fails
    async fn publish(&self, reply: &str, audio_url: &str, track: &LipSyncTrack) -> Result<()>;
}

/// GraphQL push endpoint client
#[derive(Debug, Clone)]
pub struct GraphQlPublisher {
    client: Client,
    endpoint: String,
    api_key: String,
    channel: String,
}

impl GraphQlPublisher {
    /// Create a new publisher; the channel identifier in `config` has
    /// already been validated during configuration resolution
    #[must_use]
    pub fn new(config: &PushConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            channel: config.channel.clone(),
        }
    }
}

#[derive(Serialize)]
struct MutationBody<'a> {
    query: &'a str,
    variables: Variables<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Variables<'a> {
    channel: &'a str,
    response: &'a str,
    audio_url: &'a str,
    /// The lip-sync track as a JSON-encoded array of events
    lip_sync: String,
}

#[async_trait]
impl Publisher for GraphQlPublisher {
    async fn publish(&self, reply: &str, audio_url: &str, track: &LipSyncTrack) -> Result<()> {
        let body = MutationBody {
            query: PUBLISH_MUTATION,
            variables: Variables {
                channel: &self.channel,
                response: reply,
                audio_url,
                lip_sync: serde_json::to_string(track)?,
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Publish(format!("push error {status}: {text}")));
        }

        // GraphQL transports field errors in-band with a 200
        let payload: serde_json::Value = response.json().await?;
        if let Some(errors) = payload.get("errors") {
            if errors.as_array().is_some_and(|e| !e.is_empty()) {
                return Err(Error::Publish(format!("mutation rejected: {errors}")));
            }
        }

        Ok(())
    }
}
