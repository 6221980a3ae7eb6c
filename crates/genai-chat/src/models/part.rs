#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPart {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobPart {
    pub data: Vec<u8>,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A single unit of content passed to or from the model
pub enum Part {
    Text(TextPart),
    Blob(BlobPart),
}

impl Part {
    pub fn text<S: Into<String>>(text: S) -> Self {
        Part::Text(TextPart { text: text.into() })
    }

    pub fn blob<T: Into<String>>(data: Vec<u8>, mime_type: T) -> Self {
        Part::Blob(BlobPart {
            data,
            mime_type: mime_type.into(),
        })
    }

    /// Get the text if this is a Text variant
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text(part) => Some(&part.text),
            _ => None,
        }
    }

    /// Get the blob if this is a Blob variant
    pub fn as_blob(&self) -> Option<&BlobPart> {
        match self {
            Part::Blob(blob) => Some(blob),
            _ => None,
        }
    }
}
