use std::sync::Arc;

use anyhow::Result;
use chatpane_core::{ChatClient, ChatWidget};
use clap::Parser;
use tracing::{error, info};

mod app;
mod cli;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use cli::Cli;
use tui::{EventHandler, Tui};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = cli.settings()?;

    let _log_guard = logging::init(cli.log_dir.clone())?;
    info!(
        endpoint = %settings.endpoint,
        locale = settings.widget.locale.as_str(),
        timeout_secs = settings.widget.request_timeout.as_secs(),
        "starting chatpane"
    );

    let client = ChatClient::new(&settings.endpoint);
    let (widget, widget_events) = ChatWidget::new(Arc::new(client), settings.widget);
    let mut app = App::new(widget.clone(), settings.endpoint);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new(widget_events);

    // Greeting runs alongside input, like any other reveal
    tokio::spawn(async move {
        widget.greet().await;
    });

    let result = run(&mut terminal, &mut app, &mut events).await;
    tui::restore()?;

    if let Err(e) = &result {
        error!(error = %e, "chatpane exited with an error");
    }
    result
}

async fn run(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
        // A reveal queues one event per character; draw once for the batch
        while let Some(event) = events.try_next() {
            handler::handle_event(app, event)?;
        }
    }
    info!("chatpane shutting down");
    Ok(())
}
