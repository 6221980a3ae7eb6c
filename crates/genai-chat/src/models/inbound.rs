use std::path::PathBuf;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat};
use serde::Deserialize;

use crate::errors::{AdapterError, AdapterResult};

#[derive(Debug, Clone, PartialEq)]
/// An image attached to a message, either already decoded or still on disk
pub enum ImageInput {
    Pixels {
        image: DynamicImage,
        format: ImageFormat,
    },
    Path(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
/// One message as received from the chat UI
pub enum InboundMessage {
    Text(String),
    Multimodal {
        text: Option<String>,
        files: Vec<PathBuf>,
    },
    Image(ImageInput),
    Tokens(Vec<String>),
}

impl InboundMessage {
    pub fn text<S: Into<String>>(text: S) -> Self {
        InboundMessage::Text(text.into())
    }

    /// True only for an empty string or an empty token list
    ///
    /// A multimodal message counts as present even with no text and no files; the UI
    /// still expects a (whitespace) turn for it.
    pub fn is_empty(&self) -> bool {
        match self {
            InboundMessage::Text(text) => text.is_empty(),
            InboundMessage::Tokens(tokens) => tokens.is_empty(),
            InboundMessage::Multimodal { .. } | InboundMessage::Image(_) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// A previous turn as remembered by the chat UI
pub struct HistoryEntry {
    pub role: String,
    pub content: InboundMessage,
}

impl HistoryEntry {
    pub fn new<S: Into<String>>(role: S, content: InboundMessage) -> Self {
        HistoryEntry {
            role: role.into(),
            content,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireFile {
    Path(String),
    Object { path: String },
}

impl WireFile {
    fn into_path(self) -> PathBuf {
        match self {
            WireFile::Path(path) | WireFile::Object { path } => PathBuf::from(path),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireImage {
    Path {
        path: String,
    },
    Data {
        /// base64, optionally wrapped in a data uri
        data: String,
        #[serde(default)]
        format: Option<String>,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
/// Message json as posted by the browser
///
/// Variant order matters: any object without an `image` key is read as multimodal.
pub enum WireMessage {
    Text(String),
    Tokens(Vec<String>),
    Image {
        image: WireImage,
    },
    Multimodal {
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        files: Vec<WireFile>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireHistoryEntry {
    pub role: String,
    pub content: WireMessage,
}

impl TryFrom<WireMessage> for InboundMessage {
    type Error = AdapterError;

    fn try_from(wire: WireMessage) -> AdapterResult<Self> {
        Ok(match wire {
            WireMessage::Text(text) => InboundMessage::Text(text),
            WireMessage::Tokens(tokens) => InboundMessage::Tokens(tokens),
            WireMessage::Multimodal { text, files } => InboundMessage::Multimodal {
                text,
                files: files.into_iter().map(WireFile::into_path).collect(),
            },
            WireMessage::Image { image } => InboundMessage::Image(decode_wire_image(image)?),
        })
    }
}

impl TryFrom<WireHistoryEntry> for HistoryEntry {
    type Error = AdapterError;

    fn try_from(wire: WireHistoryEntry) -> AdapterResult<Self> {
        Ok(HistoryEntry {
            role: wire.role,
            content: wire.content.try_into()?,
        })
    }
}

fn decode_wire_image(image: WireImage) -> AdapterResult<ImageInput> {
    match image {
        WireImage::Path { path } => Ok(ImageInput::Path(PathBuf::from(path))),
        WireImage::Data { data, format } => {
            let encoded = match data.strip_prefix("data:") {
                Some(uri) => uri
                    .split_once(',')
                    .map(|(_, payload)| payload)
                    .ok_or_else(|| AdapterError::InvalidInlineData("malformed data uri".into()))?,
                None => data.as_str(),
            };
            let bytes = STANDARD
                .decode(encoded.trim())
                .map_err(|e| AdapterError::InvalidInlineData(e.to_string()))?;

            let format = match format {
                Some(name) => ImageFormat::from_extension(name.to_lowercase()).ok_or_else(|| {
                    AdapterError::InvalidInlineData(format!("unknown image format {}", name))
                })?,
                None => image::guess_format(&bytes)?,
            };
            let image = image::load_from_memory_with_format(&bytes, format)?;
            Ok(ImageInput::Pixels { image, format })
        }
    }
}
