//! The chat pane controller.
//!
//! [`ChatWidget`] owns the transcript, the input line and the enabled flag of
//! the input controls. It is UI-agnostic: every mutation is announced as a
//! [`WidgetEvent`] on the channel returned by [`ChatWidget::new`], and a
//! renderer reads [`ChatWidget::snapshot`] whenever an event arrives.
//!
//! Sending is split in two so the controls are disabled synchronously:
//!
//! ```ignore
//! if let Some(exchange) = widget.begin_exchange() {
//!     let widget = widget.clone();
//!     tokio::spawn(async move { widget.complete_exchange(exchange).await });
//! }
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::client::ReplyBackend;
use crate::config::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::error::{ChatError, RevealError};
use crate::state::{ChatMessage, ChatRole, ExchangeState, Focus, MessageId};
use crate::strings::{Locale, Strings};
use crate::transcript::Transcript;
use crate::typewriter::Typewriter;

#[derive(Debug, Clone)]
pub struct WidgetConfig {
    pub locale: Locale,
    pub typewriter: Typewriter,
    /// Upper bound on one round trip to the backend.
    pub request_timeout: Duration,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            typewriter: Typewriter::default(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

/// Change notifications for the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    MessageAppended(MessageId),
    /// A reveal step; `len` is the message length in characters.
    MessageUpdated { id: MessageId, len: usize },
    PendingShown,
    PendingHidden,
    ControlsChanged { enabled: bool },
    InputChanged,
    ExchangeFinished(ExchangeState),
}

/// Copy of the widget state at one instant.
#[derive(Debug, Clone)]
pub struct WidgetSnapshot {
    pub messages: Vec<ChatMessage>,
    pub pending: bool,
    pub input: String,
    /// Cursor position in characters.
    pub cursor: usize,
    pub controls_enabled: bool,
    pub focus: Focus,
    pub exchange: ExchangeState,
    pub scroll_requests: u64,
}

#[derive(Debug)]
struct WidgetState {
    transcript: Transcript,
    input: String,
    cursor: usize,
    controls_enabled: bool,
    focus: Focus,
    exchange: ExchangeState,
}

impl Default for WidgetState {
    fn default() -> Self {
        Self {
            transcript: Transcript::new(),
            input: String::new(),
            cursor: 0,
            controls_enabled: true,
            focus: Focus::Input,
            exchange: ExchangeState::Idle,
        }
    }
}

#[derive(Clone)]
pub struct ChatWidget {
    state: Arc<Mutex<WidgetState>>,
    backend: Arc<dyn ReplyBackend>,
    config: WidgetConfig,
    events: mpsc::UnboundedSender<WidgetEvent>,
}

/// The single in-flight exchange.
///
/// Only [`ChatWidget::begin_exchange`] creates one, and only while the
/// controls are enabled. Dropping it re-enables the controls, so cleanup
/// runs even if the exchange future is cancelled.
#[must_use = "an exchange keeps the controls disabled until it is completed or dropped"]
pub struct PendingExchange {
    message: String,
    outcome: ExchangeState,
    widget: ChatWidget,
}

impl PendingExchange {
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Drop for PendingExchange {
    fn drop(&mut self) {
        self.widget.finish_exchange(self.outcome);
    }
}

/// Releases the per-message reveal claim when the animation ends or is dropped.
struct RevealClaim<'a> {
    widget: &'a ChatWidget,
    id: MessageId,
}

impl Drop for RevealClaim<'_> {
    fn drop(&mut self) {
        self.widget.lock().transcript.end_reveal(self.id);
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

impl ChatWidget {
    pub fn new(
        backend: Arc<dyn ReplyBackend>,
        config: WidgetConfig,
    ) -> (Self, mpsc::UnboundedReceiver<WidgetEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let widget = Self {
            state: Arc::new(Mutex::new(WidgetState::default())),
            backend,
            config,
            events,
        };
        (widget, rx)
    }

    fn lock(&self) -> MutexGuard<'_, WidgetState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: WidgetEvent) {
        // Nobody listening is fine; the state is still current.
        let _ = self.events.send(event);
    }

    pub fn strings(&self) -> &'static Strings {
        self.config.locale.strings()
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn snapshot(&self) -> WidgetSnapshot {
        let state = self.lock();
        WidgetSnapshot {
            messages: state.transcript.messages().to_vec(),
            pending: state.transcript.is_pending(),
            input: state.input.clone(),
            cursor: state.cursor,
            controls_enabled: state.controls_enabled,
            focus: state.focus,
            exchange: state.exchange,
            scroll_requests: state.transcript.scroll_requests(),
        }
    }

    pub fn controls_enabled(&self) -> bool {
        self.lock().controls_enabled
    }

    pub fn exchange_state(&self) -> ExchangeState {
        self.lock().exchange
    }

    pub fn message(&self, id: MessageId) -> Option<ChatMessage> {
        self.lock().transcript.get(id).cloned()
    }

    // Transcript operations

    /// Append a message to the transcript and scroll to its bottom edge.
    pub fn append_message(&self, text: &str, role: ChatRole) -> MessageId {
        let id = self.lock().transcript.append(text, role);
        self.emit(WidgetEvent::MessageAppended(id));
        id
    }

    pub fn show_pending(&self) {
        if self.lock().transcript.show_pending() {
            self.emit(WidgetEvent::PendingShown);
        }
    }

    /// No-op when no placeholder is showing.
    pub fn hide_pending(&self) {
        if self.lock().transcript.hide_pending() {
            self.emit(WidgetEvent::PendingHidden);
        }
    }

    /// Replace the content of `id` with `text`, one character at a time.
    ///
    /// A message can only be animated by one reveal at a time; a second call
    /// while the first is running fails with [`RevealError::InProgress`].
    pub async fn animate_reveal(&self, id: MessageId, text: &str) -> Result<(), RevealError> {
        {
            let mut state = self.lock();
            if state.transcript.get(id).is_none() {
                return Err(RevealError::UnknownMessage(id));
            }
            if !state.transcript.begin_reveal(id) {
                return Err(RevealError::InProgress(id));
            }
            state.transcript.set_content(id, "");
        }
        let _claim = RevealClaim { widget: self, id };
        self.emit(WidgetEvent::MessageUpdated { id, len: 0 });

        let typewriter = self.config.typewriter;
        typewriter
            .reveal(text, |ch| {
                let len = self.lock().transcript.push_char(id, ch);
                match len {
                    Some(len) => {
                        self.emit(WidgetEvent::MessageUpdated { id, len });
                        true
                    }
                    None => false,
                }
            })
            .await;

        Ok(())
    }

    /// Emit the greeting through the same animation path as a reply.
    pub async fn greet(&self) -> MessageId {
        let id = self.append_message("", ChatRole::Assistant);
        if let Err(e) = self.animate_reveal(id, self.strings().greeting).await {
            warn!(error = %e, "greeting reveal rejected");
        }
        id
    }

    // Exchange

    /// Steps 1-4 of a send: take the trimmed input, append it, disable the
    /// controls and show the placeholder.
    ///
    /// Returns `None` for blank input and while another exchange holds the
    /// controls.
    pub fn begin_exchange(&self) -> Option<PendingExchange> {
        let (message, id) = {
            let mut state = self.lock();
            if !state.controls_enabled {
                debug!("send ignored, controls are disabled");
                return None;
            }
            let message = state.input.trim().to_string();
            if message.is_empty() {
                return None;
            }

            let id = state.transcript.append(message.as_str(), ChatRole::User);
            state.input.clear();
            state.cursor = 0;
            state.controls_enabled = false;
            state.exchange = ExchangeState::Sending;
            state.transcript.show_pending();
            (message, id)
        };

        self.emit(WidgetEvent::MessageAppended(id));
        self.emit(WidgetEvent::InputChanged);
        self.emit(WidgetEvent::ControlsChanged { enabled: false });
        self.emit(WidgetEvent::PendingShown);
        debug!(chars = message.chars().count(), "exchange started");

        Some(PendingExchange {
            message,
            outcome: ExchangeState::Failed,
            widget: self.clone(),
        })
    }

    /// Steps 5-8: fetch the reply, render it or the error message, and
    /// restore the controls.
    pub async fn complete_exchange(&self, mut exchange: PendingExchange) -> ExchangeState {
        let strings = self.strings();
        let timeout = self.config.request_timeout;

        let reply = match tokio::time::timeout(
            timeout,
            self.backend.fetch_reply(&exchange.message, strings.not_understood),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ChatError::Timeout(timeout)),
        };

        match reply {
            Ok(text) => {
                self.hide_pending();
                self.lock().exchange = ExchangeState::Succeeded;
                let id = self.append_message("", ChatRole::Assistant);
                if let Err(e) = self.animate_reveal(id, &text).await {
                    warn!(error = %e, "reply reveal rejected");
                }
                info!(chars = text.chars().count(), "exchange succeeded");
                exchange.outcome = ExchangeState::Succeeded;
            }
            Err(err) => {
                error!(error = %err, "exchange failed");
                self.hide_pending();
                self.lock().exchange = ExchangeState::Failed;
                self.append_message(strings.error, ChatRole::Assistant);
                exchange.outcome = ExchangeState::Failed;
            }
        }

        let outcome = exchange.outcome;
        drop(exchange);
        outcome
    }

    /// The whole send workflow. `None` when nothing was sent.
    pub async fn send_message(&self) -> Option<ExchangeState> {
        let exchange = self.begin_exchange()?;
        Some(self.complete_exchange(exchange).await)
    }

    fn finish_exchange(&self, outcome: ExchangeState) {
        let hid_pending = {
            let mut state = self.lock();
            state.controls_enabled = true;
            state.focus = Focus::Input;
            state.exchange = ExchangeState::Idle;
            state.transcript.hide_pending()
        };
        if hid_pending {
            self.emit(WidgetEvent::PendingHidden);
        }
        self.emit(WidgetEvent::ControlsChanged { enabled: true });
        self.emit(WidgetEvent::ExchangeFinished(outcome));
    }

    // Input editing, ignored while the controls are disabled

    fn edit_input<F>(&self, edit: F)
    where
        F: FnOnce(&mut WidgetState) -> bool,
    {
        let changed = {
            let mut state = self.lock();
            state.controls_enabled && edit(&mut *state)
        };
        if changed {
            self.emit(WidgetEvent::InputChanged);
        }
    }

    pub fn set_input(&self, text: &str) {
        self.edit_input(|state| {
            state.input = text.to_string();
            state.cursor = state.input.chars().count();
            true
        });
    }

    pub fn insert_char(&self, c: char) {
        self.edit_input(|state| {
            let byte_pos = char_to_byte_index(&state.input, state.cursor);
            state.input.insert(byte_pos, c);
            state.cursor += 1;
            true
        });
    }

    pub fn insert_newline(&self) {
        self.insert_char('\n');
    }

    pub fn delete_backward(&self) {
        self.edit_input(|state| {
            if state.cursor == 0 {
                return false;
            }
            state.cursor -= 1;
            let byte_pos = char_to_byte_index(&state.input, state.cursor);
            state.input.remove(byte_pos);
            true
        });
    }

    pub fn delete_forward(&self) {
        self.edit_input(|state| {
            if state.cursor >= state.input.chars().count() {
                return false;
            }
            let byte_pos = char_to_byte_index(&state.input, state.cursor);
            state.input.remove(byte_pos);
            true
        });
    }

    pub fn move_cursor_left(&self) {
        self.edit_input(|state| {
            state.cursor = state.cursor.saturating_sub(1);
            true
        });
    }

    pub fn move_cursor_right(&self) {
        self.edit_input(|state| {
            let char_count = state.input.chars().count();
            state.cursor = (state.cursor + 1).min(char_count);
            true
        });
    }

    pub fn move_cursor_home(&self) {
        self.edit_input(|state| {
            state.cursor = 0;
            true
        });
    }

    pub fn move_cursor_end(&self) {
        self.edit_input(|state| {
            state.cursor = state.input.chars().count();
            true
        });
    }

    pub fn set_focus(&self, focus: Focus) {
        self.edit_input(|state| {
            state.focus = focus;
            true
        });
    }
}
