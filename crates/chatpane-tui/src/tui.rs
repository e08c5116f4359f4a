use std::io::{self, Stderr};
use std::time::Duration;

use anyhow::{Context, Result};
use chatpane_core::WidgetEvent;
use crossterm::{
    cursor::Show,
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, KeyEventKind, MouseEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{error, warn};

pub type Tui = Terminal<CrosstermBackend<Stderr>>;

/// Interval of the "thinking" ellipsis animation.
const TICK_INTERVAL: Duration = Duration::from_millis(300);

#[derive(Debug)]
#[allow(dead_code)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    Tick,
    Widget(WidgetEvent),
}

pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<AppEvent>,
    _tx: mpsc::UnboundedSender<AppEvent>,
}

impl EventHandler {
    /// Merge terminal input, the tick timer and widget notifications into
    /// one stream handled by the main loop.
    pub fn new(mut widget_events: mpsc::UnboundedReceiver<WidgetEvent>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let _tx = tx.clone();

        // Spawn event reader task
        let tx_events = tx.clone();
        tokio::spawn(async move {
            let mut reader = event::EventStream::new();
            while let Some(evt) = reader.next().await {
                let evt = match evt {
                    Ok(evt) => evt,
                    Err(e) => {
                        warn!(error = %e, "terminal event stream failed");
                        break;
                    }
                };
                let app_event = match evt {
                    // Only handle key press events, not release
                    Event::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
                    Event::Mouse(mouse) => Some(AppEvent::Mouse(mouse)),
                    Event::Resize(w, h) => Some(AppEvent::Resize(w, h)),
                    _ => None,
                };

                if let Some(event) = app_event {
                    if tx_events.send(event).is_err() {
                        break;
                    }
                }
            }
        });

        let tx_tick = tx.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            loop {
                interval.tick().await;
                if tx_tick.send(AppEvent::Tick).is_err() {
                    break;
                }
            }
        });

        let tx_widget = tx.clone();
        tokio::spawn(async move {
            while let Some(event) = widget_events.recv().await {
                if tx_widget.send(AppEvent::Widget(event)).is_err() {
                    break;
                }
            }
        });

        Self { rx, _tx }
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }

    /// An event that is already queued, without waiting.
    pub fn try_next(&mut self) -> Option<AppEvent> {
        self.rx.try_recv().ok()
    }
}

/// Raw mode, alternate screen and mouse capture, all on stderr.
pub fn init() -> Result<Tui> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stderr = io::stderr();
    execute!(stderr, EnterAlternateScreen, EnableMouseCapture)
        .context("failed to enter the alternate screen")?;

    let mut terminal = Terminal::new(CrosstermBackend::new(stderr))?;
    terminal.clear()?;
    Ok(terminal)
}

/// Undo [`init`]. Calling it twice is harmless.
pub fn restore() -> Result<()> {
    execute!(io::stderr(), DisableMouseCapture, LeaveAlternateScreen, Show)?;
    disable_raw_mode()?;
    Ok(())
}

/// Give the terminal back before the panic message is printed, and keep a
/// copy of the message in the log file.
pub fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore();
        error!(panic = %info, "chatpane panicked");
        default_hook(info);
    }));
}
