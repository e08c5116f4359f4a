pub mod client;
pub mod config;
pub mod error;
pub mod state;
pub mod strings;
pub mod transcript;
pub mod typewriter;
pub mod widget;

// Re-export main types for convenience
pub use client::{extract_reply, ChatClient, ReplyBackend};
pub use config::{Config, Settings};
pub use error::{ChatError, ConfigError, RevealError};
pub use state::{ChatMessage, ChatRole, ExchangeState, Focus, MessageId};
pub use strings::{Locale, Strings};
pub use transcript::Transcript;
pub use typewriter::Typewriter;
pub use widget::{ChatWidget, PendingExchange, WidgetConfig, WidgetEvent, WidgetSnapshot};
