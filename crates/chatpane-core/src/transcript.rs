//! Ordered list of rendered messages plus the pending placeholder.

use std::collections::HashMap;

use crate::state::{ChatMessage, ChatRole, MessageId};

#[derive(Debug, Default, Clone)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    pending: bool,
    next_id: u64,
    // Bumped whenever the view should snap to its bottom edge
    scroll_requests: u64,
    // Messages being animated, with their current length in characters
    revealing: HashMap<MessageId, usize>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and ask the view to scroll to the bottom.
    pub fn append(&mut self, content: impl Into<String>, role: ChatRole) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        self.messages.push(ChatMessage {
            id,
            role,
            content: content.into(),
        });
        self.request_scroll();
        id
    }

    /// Show the placeholder. Returns false if one was already showing.
    pub fn show_pending(&mut self) -> bool {
        if self.pending {
            return false;
        }
        self.pending = true;
        self.request_scroll();
        true
    }

    /// Remove the placeholder. Returns false if there was nothing to remove.
    pub fn hide_pending(&mut self) -> bool {
        std::mem::replace(&mut self.pending, false)
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    // Ids are handed out in increasing order, so the list stays sorted by id
    fn position(&self, id: MessageId) -> Option<usize> {
        self.messages.binary_search_by_key(&id, |m| m.id).ok()
    }

    pub fn get(&self, id: MessageId) -> Option<&ChatMessage> {
        self.position(id).map(|i| &self.messages[i])
    }

    pub fn set_content(&mut self, id: MessageId, content: &str) -> bool {
        let Some(i) = self.position(id) else {
            return false;
        };
        let msg = &mut self.messages[i];
        msg.content.clear();
        msg.content.push_str(content);
        if let Some(revealed) = self.revealing.get_mut(&id) {
            *revealed = content.chars().count();
        }
        true
    }

    /// Append one character to a message and follow the bottom edge.
    pub fn push_char(&mut self, id: MessageId, ch: char) -> Option<usize> {
        let i = self.position(id)?;
        let content = &mut self.messages[i].content;
        content.push(ch);
        let len = match self.revealing.get_mut(&id) {
            Some(revealed) => {
                *revealed += 1;
                *revealed
            }
            None => content.chars().count(),
        };
        self.request_scroll();
        Some(len)
    }

    /// Mark a message as animating. Returns false if it already is.
    pub fn begin_reveal(&mut self, id: MessageId) -> bool {
        if self.revealing.contains_key(&id) {
            return false;
        }
        let len = self.get(id).map_or(0, |m| m.content.chars().count());
        self.revealing.insert(id, len);
        true
    }

    pub fn end_reveal(&mut self, id: MessageId) {
        self.revealing.remove(&id);
    }

    pub fn is_revealing(&self, id: MessageId) -> bool {
        self.revealing.contains_key(&id)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn scroll_requests(&self) -> u64 {
        self.scroll_requests
    }

    fn request_scroll(&mut self) {
        self.scroll_requests = self.scroll_requests.wrapping_add(1);
    }
}
