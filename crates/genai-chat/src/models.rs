//! These models represent the objects passed around during a chat turn
//!
//! There are three different formats we need to interact with:
//! - chat UI messages (strings, text + files, images, token lists), sent from the browser
//! - vertex content/part json, sent to and streamed back from the model
//! - displayable elements (text or image), sent back to the browser
//!
//! We always immediately convert those data models into the internal structs at the
//! boundary, so the adapters only ever see the types in this module.
pub mod content;
pub mod element;
pub mod inbound;
pub mod part;
pub mod role;
