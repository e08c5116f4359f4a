//! UI-agnostic chat state types
//!
//! This module contains data structures that are shared between the widget
//! controller and whatever renders it, and don't depend on any specific UI
//! framework.

use serde::{Deserialize, Serialize};

/// Identifies a message within one transcript. Ids only ever grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(pub u64);

/// A chat message in the transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: ChatRole,
    pub content: String,
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    User,
    Assistant,
}

/// Where keyboard focus sits inside the chat pane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Input,
    Transcript,
}

/// Lifecycle of a single exchange: `Idle -> Sending -> {Succeeded, Failed} -> Idle`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExchangeState {
    #[default]
    Idle,
    Sending,
    Succeeded,
    Failed,
}
