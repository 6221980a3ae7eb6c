//! Conversion between chat UI payloads and model content, in both directions
pub mod message;
pub mod mime;
pub mod response;

pub use message::{get_bytes_from_image, part_from_file, MessageAdapter, DEFAULT_UPLOAD_PREFIX};
pub use response::{to_elements, ImageRendering};
