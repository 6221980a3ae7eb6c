use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat};
use serde::ser::{Error as _, SerializeStruct};
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq)]
/// Something the chat UI knows how to display
pub enum UiElement {
    Text(String),
    Image(DynamicImage),
}

impl UiElement {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            UiElement::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&DynamicImage> {
        match self {
            UiElement::Image(image) => Some(image),
            _ => None,
        }
    }
}

/// Images are re-encoded as png for the browser
impl Serialize for UiElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            UiElement::Text(text) => {
                let mut state = serializer.serialize_struct("UiElement", 2)?;
                state.serialize_field("type", "text")?;
                state.serialize_field("text", text)?;
                state.end()
            }
            UiElement::Image(image) => {
                let mut bytes = Cursor::new(Vec::new());
                image
                    .write_to(&mut bytes, ImageFormat::Png)
                    .map_err(S::Error::custom)?;

                let mut state = serializer.serialize_struct("UiElement", 3)?;
                state.serialize_field("type", "image")?;
                state.serialize_field("mimeType", "image/png")?;
                state.serialize_field("data", &STANDARD.encode(bytes.into_inner()))?;
                state.end()
            }
        }
    }
}
