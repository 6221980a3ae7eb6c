use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

use super::base::{ChunkStream, Provider};
use super::configs::VertexProviderConfig;
use super::utils::{build_payload, vertex_response_to_chunk, SseDecoder};
use crate::models::content::Conversation;

pub const VERTEX_MODEL: &str = "gemini-2.5-pro-preview-06-05";

pub struct VertexProvider {
    client: Client,
    config: VertexProviderConfig,
}

impl VertexProvider {
    pub fn new(config: VertexProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()?;

        Ok(Self { client, config })
    }

    async fn post(&self, payload: &Value) -> Result<reqwest::Response> {
        let mut request = self.client.post(self.config.stream_url()).json(payload);
        if let Some(token) = &self.config.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        match response.status() {
            StatusCode::OK => Ok(response),
            status if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() >= 500 => {
                Err(anyhow!("Server error: {}", status))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(anyhow!("Request failed: {}\nResponse: {}", status, body))
            }
        }
    }
}

#[async_trait]
impl Provider for VertexProvider {
    async fn stream(&self, conversation: &Conversation) -> Result<ChunkStream> {
        let payload = build_payload(conversation, &self.config);
        tracing::debug!(
            model = %self.config.model,
            contents = conversation.len(),
            "Submitting conversation"
        );

        let mut body = self.post(&payload).await?.bytes_stream();

        Ok(Box::pin(async_stream::try_stream! {
            let mut decoder = SseDecoder::new();
            while let Some(bytes) = body.next().await {
                for event in decoder.push(&bytes?) {
                    let response: Value = serde_json::from_str(&event)?;
                    yield vertex_response_to_chunk(&response)?;
                }
            }
            if let Some(event) = decoder.finish() {
                let response: Value = serde_json::from_str(&event)?;
                yield vertex_response_to_chunk(&response)?;
            }
        }))
    }
}
