use super::part::Part;
use super::role::Role;

/// Text substituted for a turn that would otherwise carry no parts
pub const EMPTY_TURN_TEXT: &str = " ";

#[derive(Debug, Clone, PartialEq, Eq)]
/// One role-tagged turn, parts in presentation order
pub struct ContentItem {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl ContentItem {
    pub fn new(role: Role, parts: Vec<Part>) -> Self {
        ContentItem { role, parts }
    }

    /// Create an empty user turn
    pub fn user() -> Self {
        Self::new(Role::User, Vec::new())
    }

    /// Create an empty model turn
    pub fn model() -> Self {
        Self::new(Role::Model, Vec::new())
    }

    /// Add any Part to the turn
    pub fn with_part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    /// Add text to the turn
    pub fn with_text<S: Into<String>>(self, text: S) -> Self {
        self.with_part(Part::text(text))
    }

    /// Add binary data to the turn
    pub fn with_blob<T: Into<String>>(self, data: Vec<u8>, mime_type: T) -> Self {
        self.with_part(Part::blob(data, mime_type))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// The full dialogue submitted to the model, oldest first
///
/// Every item held here has at least one part.
pub struct Conversation {
    contents: Vec<ContentItem>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mut item: ContentItem) {
        if item.parts.is_empty() {
            item.parts.push(Part::text(EMPTY_TURN_TEXT));
        }
        self.contents.push(item);
    }

    pub fn contents(&self) -> &[ContentItem] {
        &self.contents
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ContentItem> {
        self.contents.iter()
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a ContentItem;
    type IntoIter = std::slice::Iter<'a, ContentItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
