use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::stream;
use std::sync::{Arc, Mutex};

use crate::models::content::Conversation;
use crate::providers::base::{Chunk, ChunkStream, Provider};

/// A mock provider that streams pre-configured chunks and records what it was sent
pub struct MockProvider {
    chunks: Vec<Chunk>,
    fail_after: Option<usize>,
    received: Arc<Mutex<Vec<Conversation>>>,
}

impl MockProvider {
    /// Create a new mock provider streaming the given chunks
    pub fn new(chunks: Vec<Chunk>) -> Self {
        Self {
            chunks,
            fail_after: None,
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fail the stream once this many chunks were delivered
    pub fn failing_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    pub fn received(&self) -> Arc<Mutex<Vec<Conversation>>> {
        self.received.clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn stream(&self, conversation: &Conversation) -> Result<ChunkStream> {
        self.received.lock().unwrap().push(conversation.clone());

        let mut items: Vec<Result<Chunk>> = self.chunks.iter().cloned().map(Ok).collect();
        if let Some(count) = self.fail_after {
            items.truncate(count);
            items.push(Err(anyhow!("mock stream failure")));
        }
        Ok(Box::pin(stream::iter(items)))
    }
}
