use anyhow::Result;
use futures::stream::BoxStream;
use futures::StreamExt;

use crate::adapter::message::{MessageAdapter, DEFAULT_UPLOAD_PREFIX};
use crate::adapter::response::{to_elements, ImageRendering};
use crate::errors::AdapterResult;
use crate::models::content::Conversation;
use crate::models::element::UiElement;
use crate::models::inbound::{HistoryEntry, InboundMessage};
use crate::providers::base::{Provider, Usage};

pub const DEFAULT_PREAMBLE: &str = "give me goatfarm info";

/// Per-process chat settings, fixed at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Instruction sent as the first user turn of every conversation
    pub preamble: String,
    pub upload_prefix: String,
    pub image_rendering: ImageRendering,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            preamble: DEFAULT_PREAMBLE.to_string(),
            upload_prefix: DEFAULT_UPLOAD_PREFIX.to_string(),
            image_rendering: ImageRendering::default(),
        }
    }
}

/// Chat drives a single turn: adapt the messages, call the model, adapt the reply
pub struct Chat {
    provider: Box<dyn Provider>,
    adapter: MessageAdapter,
    rendering: ImageRendering,
}

impl Chat {
    pub fn new(provider: Box<dyn Provider>, config: &ChatConfig) -> Self {
        Self {
            provider,
            adapter: MessageAdapter::new(config.preamble.as_str(), config.upload_prefix.as_str()),
            rendering: config.image_rendering,
        }
    }

    /// Build the conversation for a turn without calling the model
    ///
    /// Fails on anything the client sent that cannot be adapted, such as an upload
    /// outside the upload directory.
    pub fn prepare(
        &self,
        history: &[HistoryEntry],
        current: Option<&InboundMessage>,
    ) -> AdapterResult<Conversation> {
        self.adapter.to_conversation(history, current)
    }

    /// Reply to the current message given the prior history
    ///
    /// Each item is the full list of elements produced so far in this turn. The stream
    /// cannot be restarted; dropping it abandons the model request.
    pub async fn reply(
        &self,
        history: &[HistoryEntry],
        current: Option<&InboundMessage>,
    ) -> Result<BoxStream<'static, Result<Vec<UiElement>>>> {
        let conversation = self.prepare(history, current)?;
        self.respond(&conversation).await
    }

    /// Stream the model's reply to an already prepared conversation
    pub async fn respond(
        &self,
        conversation: &Conversation,
    ) -> Result<BoxStream<'static, Result<Vec<UiElement>>>> {
        let mut chunks = self.provider.stream(conversation).await?;
        let rendering = self.rendering;

        Ok(Box::pin(async_stream::try_stream! {
            let mut results: Vec<UiElement> = Vec::new();
            let mut usage: Option<Usage> = None;
            while let Some(chunk) = chunks.next().await {
                let chunk = chunk?;
                // usage metadata is cumulative, the last one seen covers the turn
                if chunk.usage.is_some() {
                    usage = chunk.usage;
                }
                // chunks without a candidate (usage, finish reason) change nothing on screen
                if let Some(content) = &chunk.content {
                    results.extend(to_elements(Some(content), rendering)?);
                    if !results.is_empty() {
                        yield results.clone();
                    }
                }
            }
            if let Some(usage) = usage {
                tracing::info!(
                    input_tokens = ?usage.input_tokens,
                    output_tokens = ?usage.output_tokens,
                    total_tokens = ?usage.total_tokens,
                    elements = results.len(),
                    "Turn complete"
                );
            }
        }))
    }
}
