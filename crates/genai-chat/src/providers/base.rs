use anyhow::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::models::content::{ContentItem, Conversation};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
/// One increment of streamed model output
pub struct Chunk {
    /// Content of the first candidate, if the chunk carried one
    pub content: Option<ContentItem>,
    pub usage: Option<Usage>,
}

impl Chunk {
    pub fn new(content: Option<ContentItem>) -> Self {
        Self {
            content,
            usage: None,
        }
    }
}

/// Lazy, finite sequence of chunks; dropping it abandons the request
pub type ChunkStream = BoxStream<'static, Result<Chunk>>;

/// Base trait for hosted generative models
#[async_trait]
pub trait Provider: Send + Sync {
    /// Submit the conversation and stream back the model's reply
    async fn stream(&self, conversation: &Conversation) -> Result<ChunkStream>;
}
