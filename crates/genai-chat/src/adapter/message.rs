use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};

use super::mime;
use crate::errors::{AdapterError, AdapterResult};
use crate::models::content::{ContentItem, Conversation, EMPTY_TURN_TEXT};
use crate::models::inbound::{HistoryEntry, ImageInput, InboundMessage};
use crate::models::part::Part;
use crate::models::role::Role;

/// Directory the chat UI stores uploaded files under
pub const DEFAULT_UPLOAD_PREFIX: &str = "/tmp/gradio";

/// Builds the conversation sent to the model from UI messages
#[derive(Debug, Clone)]
pub struct MessageAdapter {
    preamble: String,
    upload_prefix: String,
}

impl MessageAdapter {
    pub fn new<S: Into<String>, T: Into<String>>(preamble: S, upload_prefix: T) -> Self {
        Self {
            preamble: preamble.into(),
            upload_prefix: upload_prefix.into(),
        }
    }

    /// Convert one UI message into parts, never returning an empty list
    pub fn to_parts(&self, message: &InboundMessage) -> AdapterResult<Vec<Part>> {
        let mut parts = Vec::new();

        match message {
            InboundMessage::Multimodal { text, files } => {
                if let Some(text) = text.as_deref().filter(|t| !t.is_empty()) {
                    parts.push(Part::text(text));
                }
                for file in files {
                    parts.push(part_from_file(&self.upload_path(file)?)?);
                }
            }
            InboundMessage::Text(text) => {
                if !text.is_empty() {
                    parts.push(Part::text(text.as_str()));
                }
            }
            InboundMessage::Image(ImageInput::Pixels { image, format }) => {
                let data = get_bytes_from_image(image, *format)?;
                parts.push(Part::blob(data, mime::from_image_format(*format)));
            }
            InboundMessage::Image(ImageInput::Path(path)) => {
                parts.push(part_from_file(&self.upload_path(path)?)?);
            }
            InboundMessage::Tokens(tokens) => {
                for token in tokens {
                    if self.is_upload(token) {
                        parts.push(part_from_file(&self.upload_path(Path::new(token))?)?);
                    } else if !token.is_empty() {
                        parts.push(Part::text(token.as_str()));
                    }
                }
            }
        }

        // The model rejects turns without any parts
        if parts.is_empty() {
            parts.push(Part::text(EMPTY_TURN_TEXT));
        }

        Ok(parts)
    }

    /// Build the full conversation: preamble, then history, then the current message
    pub fn to_conversation(
        &self,
        history: &[HistoryEntry],
        current: Option<&InboundMessage>,
    ) -> AdapterResult<Conversation> {
        let mut conversation = Conversation::new();
        conversation.push(ContentItem::user().with_text(self.preamble.as_str()));

        for entry in history {
            let parts = self.to_parts(&entry.content)?;
            if !parts.is_empty() {
                conversation.push(ContentItem::new(Role::from_history(&entry.role), parts));
            }
        }

        // only an empty string or token list counts as no message
        if let Some(message) = current.filter(|m| !m.is_empty()) {
            conversation.push(ContentItem::new(Role::User, self.to_parts(message)?));
        }

        Ok(conversation)
    }

    fn is_upload(&self, token: &str) -> bool {
        !self.upload_prefix.is_empty() && token.starts_with(&self.upload_prefix)
    }

    /// Resolve a path sent by the client, refusing anything outside the upload directory
    ///
    /// Both sides are canonicalized so `..` segments and symlinks cannot escape. A missing
    /// file reports the same error as a forbidden one.
    fn upload_path(&self, path: &Path) -> AdapterResult<PathBuf> {
        let invalid = || AdapterError::InvalidUpload(path.to_path_buf());
        if self.upload_prefix.is_empty() {
            return Err(invalid());
        }

        let root = fs::canonicalize(&self.upload_prefix).map_err(|_| invalid())?;
        let resolved = fs::canonicalize(path).map_err(|_| invalid())?;
        if resolved.starts_with(&root) {
            Ok(resolved)
        } else {
            Err(invalid())
        }
    }
}

/// Read a file fully into a blob part, typed by its extension
pub fn part_from_file(path: &Path) -> AdapterResult<Part> {
    let data = fs::read(path).map_err(|source| AdapterError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Part::blob(data, mime::from_path(path)))
}

/// Encode an in-memory image in the requested format
pub fn get_bytes_from_image(image: &DynamicImage, format: ImageFormat) -> AdapterResult<Vec<u8>> {
    let mut bytes = Cursor::new(Vec::new());
    let result = if format == ImageFormat::Jpeg && image.color().has_alpha() {
        // jpeg has no alpha channel
        DynamicImage::ImageRgb8(image.to_rgb8()).write_to(&mut bytes, format)
    } else {
        image.write_to(&mut bytes, format)
    };
    result.map_err(|source| AdapterError::EncodeImage { format, source })?;
    Ok(bytes.into_inner())
}
