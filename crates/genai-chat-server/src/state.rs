use genai_chat::{chat::Chat, guard::AccessGuard};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<Chat>,
    pub guard: Arc<AccessGuard>,
}

impl AppState {
    pub fn new(chat: Chat, guard: AccessGuard) -> Self {
        Self {
            chat: Arc::new(chat),
            guard: Arc::new(guard),
        }
    }
}
