use anyhow::Result;
use chatpane_core::{Focus, WidgetEvent};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tracing::trace;

use crate::app::App;
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Widget(event) => handle_widget_event(app, event),
    }
    Ok(())
}

fn handle_widget_event(app: &mut App, event: WidgetEvent) {
    trace!(?event, "widget changed");
    if let WidgetEvent::ExchangeFinished(_) = event {
        app.animation_frame = 0;
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any state
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::PageUp => app.scroll_up(app.page_size()),
        KeyCode::PageDown => app.scroll_down(app.page_size()),
        KeyCode::Tab => {
            let next = match app.widget.snapshot().focus {
                Focus::Input => Focus::Transcript,
                Focus::Transcript => Focus::Input,
            };
            app.widget.set_focus(next);
        }
        _ => match app.widget.snapshot().focus {
            Focus::Input => handle_input_key(app, key),
            Focus::Transcript => handle_transcript_key(app, key),
        },
    }
}

fn handle_transcript_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.scroll_up(1),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_down(1),
        KeyCode::Enter | KeyCode::Char('i') => app.widget.set_focus(Focus::Input),
        _ => {}
    }
}

/// Editing keys go to the widget, which ignores them while a reply is pending.
fn handle_input_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter
            if key
                .modifiers
                .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) =>
        {
            app.widget.insert_newline();
        }
        KeyCode::Enter => {
            app.submit();
        }
        KeyCode::Backspace => app.widget.delete_backward(),
        KeyCode::Delete => app.widget.delete_forward(),
        KeyCode::Left => app.widget.move_cursor_left(),
        KeyCode::Right => app.widget.move_cursor_right(),
        KeyCode::Home => app.widget.move_cursor_home(),
        KeyCode::End => app.widget.move_cursor_end(),
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::Char(c) => app.widget.insert_char(c),
        _ => {}
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let (x, y) = (mouse.column, mouse.row);
    let over = |area: Option<Rect>| area.map_or(false, |rect| point_in_rect(x, y, rect));

    match mouse.kind {
        MouseEventKind::ScrollUp if over(app.transcript_area) => app.scroll_up(3),
        MouseEventKind::ScrollDown if over(app.transcript_area) => app.scroll_down(3),
        MouseEventKind::Down(MouseButton::Left) => {
            if over(app.send_area) {
                app.submit();
            } else if over(app.input_area) {
                app.widget.set_focus(Focus::Input);
            } else if over(app.transcript_area) {
                app.widget.set_focus(Focus::Transcript);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_app;
    use chatpane_core::ChatRole;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn key(code: KeyCode) -> AppEvent {
        key_with(code, KeyModifiers::NONE)
    }

    fn key_with(code: KeyCode, modifiers: KeyModifiers) -> AppEvent {
        AppEvent::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn click(column: u16, row: u16) -> AppEvent {
        AppEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_event(app, key(KeyCode::Char(c))).unwrap();
        }
    }

    #[tokio::test]
    async fn enter_sends_and_disables_until_reply() {
        let mut app = test_app();
        type_text(&mut app, "hi there");
        handle_event(&mut app, key(KeyCode::Enter)).unwrap();

        let snap = app.widget.snapshot();
        assert_eq!(snap.messages.len(), 1);
        assert_eq!(snap.messages[0].role, ChatRole::User);
        assert_eq!(snap.messages[0].content, "hi there");
        assert!(!snap.controls_enabled);
        assert!(snap.pending);

        // Second trigger and typing are inert while the reply is pending
        type_text(&mut app, "again");
        handle_event(&mut app, key(KeyCode::Enter)).unwrap();
        let snap = app.widget.snapshot();
        assert_eq!(snap.messages.len(), 1);
        assert_eq!(snap.input, "");
    }

    #[tokio::test]
    async fn blank_enter_does_nothing() {
        let mut app = test_app();
        type_text(&mut app, "   ");
        handle_event(&mut app, key(KeyCode::Enter)).unwrap();

        let snap = app.widget.snapshot();
        assert!(snap.messages.is_empty());
        assert!(snap.controls_enabled);
        assert_eq!(snap.input, "   ");
    }

    #[test]
    fn alt_enter_inserts_newline() {
        let mut app = test_app();
        type_text(&mut app, "a");
        handle_event(&mut app, key_with(KeyCode::Enter, KeyModifiers::ALT)).unwrap();
        type_text(&mut app, "b");

        assert_eq!(app.widget.snapshot().input, "a\nb");
    }

    #[tokio::test]
    async fn clicking_send_submits() {
        let mut app = test_app();
        app.send_area = Some(Rect::new(60, 17, 10, 3));
        app.input_area = Some(Rect::new(0, 17, 60, 3));
        type_text(&mut app, "via mouse");

        handle_event(&mut app, click(1, 18)).unwrap();
        assert!(app.widget.snapshot().messages.is_empty());

        handle_event(&mut app, click(62, 18)).unwrap();
        assert_eq!(app.widget.snapshot().messages.len(), 1);
        assert!(!app.widget.controls_enabled());
    }

    #[test]
    fn tab_moves_focus_and_esc_quits() {
        let mut app = test_app();
        handle_event(&mut app, key(KeyCode::Tab)).unwrap();
        assert_eq!(app.widget.snapshot().focus, Focus::Transcript);

        // Characters no longer reach the input
        type_text(&mut app, "x");
        assert_eq!(app.widget.snapshot().input, "");

        handle_event(&mut app, key(KeyCode::Enter)).unwrap();
        assert_eq!(app.widget.snapshot().focus, Focus::Input);

        handle_event(&mut app, key(KeyCode::Esc)).unwrap();
        assert!(app.should_quit);
    }
}
