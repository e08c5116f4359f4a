use chatpane_core::{ChatWidget, ExchangeState};
use ratatui::layout::Rect;
use tracing::debug;

pub struct App {
    // Core state
    pub should_quit: bool,
    pub widget: ChatWidget,
    pub endpoint: String,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Transcript scrolling
    pub transcript_scroll: u16,
    pub follow_bottom: bool,
    pub transcript_height: u16, // inner height, updated during render
    pub transcript_lines: u16,  // wrapped line count, updated during render
    seen_scroll_requests: u64,

    // Panel areas for mouse hit-testing (updated during render)
    pub transcript_area: Option<Rect>,
    pub input_area: Option<Rect>,
    pub send_area: Option<Rect>,
}

impl App {
    pub fn new(widget: ChatWidget, endpoint: impl Into<String>) -> Self {
        Self {
            should_quit: false,
            widget,
            endpoint: endpoint.into(),
            animation_frame: 0,
            transcript_scroll: 0,
            follow_bottom: true,
            transcript_height: 0,
            transcript_lines: 0,
            seen_scroll_requests: 0,
            transcript_area: None,
            input_area: None,
            send_area: None,
        }
    }

    /// Start an exchange if the controls allow it and finish it in the
    /// background. The controls are already disabled when this returns.
    pub fn submit(&mut self) -> bool {
        let Some(exchange) = self.widget.begin_exchange() else {
            return false;
        };
        debug!("spawning exchange task");

        let widget = self.widget.clone();
        tokio::spawn(async move {
            let outcome = widget.complete_exchange(exchange).await;
            debug!(?outcome, "exchange task finished");
        });
        self.follow_bottom = true;
        true
    }

    pub fn is_waiting(&self) -> bool {
        self.widget.exchange_state() == ExchangeState::Sending
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_waiting() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    fn max_scroll(&self) -> u16 {
        self.transcript_lines.saturating_sub(self.transcript_height)
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.transcript_scroll = self.transcript_scroll.saturating_sub(lines);
        self.follow_bottom = self.transcript_scroll >= self.max_scroll();
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let max_scroll = self.max_scroll();
        self.transcript_scroll = self.transcript_scroll.saturating_add(lines).min(max_scroll);
        self.follow_bottom = self.transcript_scroll >= max_scroll;
    }

    pub fn page_size(&self) -> u16 {
        (self.transcript_height / 2).max(1)
    }

    /// Reconcile the scroll offset with the latest layout.
    ///
    /// Any new scroll request from the widget (a message appended or grown)
    /// snaps back to the bottom edge.
    pub fn sync_scroll(&mut self, scroll_requests: u64, total_lines: u16, visible_height: u16) {
        if scroll_requests != self.seen_scroll_requests {
            self.seen_scroll_requests = scroll_requests;
            self.follow_bottom = true;
        }
        self.transcript_lines = total_lines;
        self.transcript_height = visible_height;

        let max_scroll = self.max_scroll();
        self.transcript_scroll = if self.follow_bottom {
            max_scroll
        } else {
            self.transcript_scroll.min(max_scroll)
        };
    }
}
