use chatpane_core::{ChatRole, Focus, Strings, WidgetSnapshot};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::App;

/// Input box grows with newlines up to this many rows.
const MAX_INPUT_ROWS: usize = 4;

/// Wrap text to fit within a given display width, returning multiple lines.
///
/// Breaks at whitespace and keeps the original spacing between words, so
/// indentation in code replies survives. Words wider than a line (including
/// CJK runs, which have no spaces) are split at character boundaries.
/// Explicit newlines are kept, so blank lines survive.
pub fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();

    for raw_line in text.split('\n') {
        let mut current_line = String::new();
        let mut current_width = 0;

        for (i, (gap, word)) in segments(raw_line).into_iter().enumerate() {
            let gap_width = gap.width();
            let word_width = word.width();

            if current_width > 0 && current_width + gap_width + word_width > width {
                // Word doesn't fit; the gap is consumed by the line break
                lines.push(std::mem::take(&mut current_line));
                current_width = 0;
                push_split(&mut lines, &mut current_line, &mut current_width, word, width);
            } else if current_width == 0 {
                // Indentation only counts at the start of a source line
                let lead = if i == 0 { gap } else { "" };
                push_split(&mut lines, &mut current_line, &mut current_width, lead, width);
                push_split(&mut lines, &mut current_line, &mut current_width, word, width);
            } else {
                current_line.push_str(gap);
                current_line.push_str(word);
                current_width += gap_width + word_width;
            }
        }

        lines.push(current_line);
    }

    lines
}

/// Split a line into (preceding whitespace, word) pairs. Trailing
/// whitespace is dropped.
fn segments(line: &str) -> Vec<(&str, &str)> {
    let mut out = Vec::new();
    let mut rest = line;
    while let Some(word_start) = rest.find(|c: char| !c.is_whitespace()) {
        let (gap, tail) = rest.split_at(word_start);
        let word_end = tail.find(char::is_whitespace).unwrap_or(tail.len());
        let (word, next) = tail.split_at(word_end);
        out.push((gap, word));
        rest = next;
    }
    out
}

/// Append `text`, starting a new line whenever the next character would
/// overflow `width`.
fn push_split(
    lines: &mut Vec<String>,
    current_line: &mut String,
    current_width: &mut usize,
    text: &str,
    width: usize,
) {
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if *current_width + ch_width > width && *current_width > 0 {
            lines.push(std::mem::take(current_line));
            *current_width = 0;
        }
        current_line.push(ch);
        *current_width += ch_width;
    }
}

/// Row and display column of a character cursor inside multi-line input.
fn cursor_position(input: &str, cursor: usize) -> (usize, usize) {
    let mut row = 0;
    let mut col = 0;
    for ch in input.chars().take(cursor) {
        if ch == '\n' {
            row += 1;
            col = 0;
        } else {
            col += ch.width().unwrap_or(0);
        }
    }
    (row, col)
}

/// The part of `line` starting `offset` columns in, at most `max_width` wide.
fn visible_slice(line: &str, offset: usize, max_width: usize) -> String {
    let mut skipped = 0;
    let mut taken = 0;
    let mut out = String::new();
    for ch in line.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if skipped < offset {
            skipped += ch_width;
            continue;
        }
        if taken + ch_width > max_width {
            break;
        }
        out.push(ch);
        taken += ch_width;
    }
    out
}

fn input_rows(input: &str) -> usize {
    input.split('\n').count().clamp(1, MAX_INPUT_ROWS)
}

pub fn transcript_lines(
    snapshot: &WidgetSnapshot,
    strings: &Strings,
    width: usize,
    animation_frame: u8,
) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();

    for msg in &snapshot.messages {
        let (label, color) = match msg.role {
            ChatRole::User => (strings.user_label, Color::Cyan),
            ChatRole::Assistant => (strings.assistant_label, Color::Yellow),
        };
        lines.push(Line::from(Span::styled(
            label,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        for row in wrap_text_to_width(&msg.content, width) {
            lines.push(Line::from(row));
        }
        lines.push(Line::default());
    }

    if snapshot.pending {
        lines.push(Line::from(Span::styled(
            strings.assistant_label,
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((animation_frame as usize % 3) + 1);
        lines.push(Line::from(Span::styled(
            format!("{}{}", strings.pending, dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let snapshot = app.widget.snapshot();
    let strings = app.widget.strings();
    let area = frame.area();

    // Main layout: header, transcript, input row, footer
    let [header_area, transcript_area, input_row_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(input_rows(&snapshot.input) as u16 + 2),
        Constraint::Length(1),
    ])
    .areas(area);

    let send_width = strings.send_label.width() as u16 + 6;
    let [input_area, send_area] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(send_width)])
            .areas(input_row_area);

    // Store areas for mouse hit-testing
    app.transcript_area = Some(transcript_area);
    app.input_area = Some(input_area);
    app.send_area = Some(send_area);

    render_header(app, frame, header_area);
    render_transcript(app, &snapshot, strings, frame, transcript_area);
    render_input(&snapshot, strings, frame, input_area);
    render_send_button(&snapshot, strings, frame, send_area);
    render_footer(&snapshot, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" chatpane ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(app.endpoint.clone(), Style::default().fg(Color::DarkGray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(title), area);
}

fn render_transcript(
    app: &mut App,
    snapshot: &WidgetSnapshot,
    strings: &Strings,
    frame: &mut Frame,
    area: Rect,
) {
    let focused = snapshot.focus == Focus::Transcript;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    // Inner size minus borders
    let inner_width = area.width.saturating_sub(2) as usize;
    let inner_height = area.height.saturating_sub(2);

    let lines = transcript_lines(snapshot, strings, inner_width, app.animation_frame);
    let total_lines = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    app.sync_scroll(snapshot.scroll_requests, total_lines, inner_height);

    let chat = Paragraph::new(Text::from(lines))
        .block(block)
        .scroll((app.transcript_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(snapshot: &WidgetSnapshot, strings: &Strings, frame: &mut Frame, area: Rect) {
    let enabled = snapshot.controls_enabled;
    let focused = enabled && snapshot.focus == Focus::Input;
    let border_color = if focused { Color::Yellow } else { Color::DarkGray };
    let title = if enabled {
        strings.input_title
    } else {
        strings.waiting_title
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" {} ", title));

    // Calculate visible portion of input with horizontal scrolling
    let inner_width = area.width.saturating_sub(2) as usize;
    let (cursor_row, cursor_col) = cursor_position(&snapshot.input, snapshot.cursor);
    let first_row = cursor_row.saturating_sub(MAX_INPUT_ROWS - 1);
    let scroll_offset = if inner_width == 0 || cursor_col < inner_width {
        0
    } else {
        cursor_col - inner_width + 1
    };

    let text = if snapshot.input.is_empty() && enabled {
        Text::from(Span::styled(
            strings.input_placeholder,
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let rows: Vec<Line> = snapshot
            .input
            .split('\n')
            .skip(first_row)
            .take(MAX_INPUT_ROWS)
            .map(|row| Line::from(visible_slice(row, scroll_offset, inner_width)))
            .collect();
        Text::from(rows)
    };

    let text_color = if enabled { Color::Cyan } else { Color::DarkGray };
    let input = Paragraph::new(text)
        .style(Style::default().fg(text_color))
        .block(input_block);

    frame.render_widget(input, area);

    if focused {
        let cursor_x = (cursor_col - scroll_offset) as u16;
        let cursor_y = (cursor_row - first_row) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + cursor_y + 1));
    }
}

fn render_send_button(snapshot: &WidgetSnapshot, strings: &Strings, frame: &mut Frame, area: Rect) {
    let (label_style, border_color) = if snapshot.controls_enabled {
        (
            Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD),
            Color::Green,
        )
    } else {
        (Style::default().fg(Color::DarkGray), Color::DarkGray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    let button = Paragraph::new(Line::from(Span::styled(
        format!(" {} ", strings.send_label),
        label_style,
    )))
    .alignment(Alignment::Center)
    .block(block);

    frame.render_widget(button, area);
}

fn render_footer(snapshot: &WidgetSnapshot, frame: &mut Frame, area: Rect) {
    let help = if snapshot.controls_enabled {
        " Enter: send | Alt+Enter: newline | PgUp/PgDn: scroll | Tab: focus | Esc: quit "
    } else {
        " PgUp/PgDn: scroll | Esc: quit "
    };
    frame.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_app;
    use chatpane_core::Locale;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(70, 20)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();

        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn wraps_on_words_and_splits_long_runs() {
        assert_eq!(
            wrap_text_to_width("the quick brown fox", 10),
            vec!["the quick", "brown fox"]
        );
        assert_eq!(wrap_text_to_width("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        // Each CJK char is two columns wide
        assert_eq!(wrap_text_to_width("您好世界", 4), vec!["您好", "世界"]);
        assert_eq!(wrap_text_to_width("a\n\nb", 10), vec!["a", "", "b"]);
        assert_eq!(wrap_text_to_width("", 10), vec![""]);
    }

    #[test]
    fn wrapping_keeps_indentation_and_inner_spacing() {
        assert_eq!(
            wrap_text_to_width("fn main() {\n    let  x = 1;\n}", 40),
            vec!["fn main() {", "    let  x = 1;", "}"]
        );
        // The gap at a break is dropped, later gaps are kept
        assert_eq!(
            wrap_text_to_width("aaaa  bb  cc", 6),
            vec!["aaaa", "bb  cc"]
        );
    }

    #[test]
    fn cursor_tracks_rows_and_wide_chars() {
        assert_eq!(cursor_position("ab\n您x", 5), (1, 3));
        assert_eq!(cursor_position("ab", 0), (0, 0));
        assert_eq!(visible_slice("abcdef", 2, 3), "cde");
    }

    #[test]
    fn pending_line_counts_dots() {
        let app = test_app();
        let mut snapshot = app.widget.snapshot();
        snapshot.pending = true;
        let strings = Locale::English.strings();

        let lines = transcript_lines(&snapshot, strings, 40, 2);
        let last = lines.last().unwrap().to_string();
        assert_eq!(last, format!("{}...", strings.pending));
    }

    #[test]
    fn renders_transcript_and_idle_input() {
        let mut app = test_app();
        app.widget.append_message("hello there", ChatRole::User);
        app.widget.append_message("hi", ChatRole::Assistant);

        let screen = draw(&mut app);
        assert!(screen.contains("You:"));
        assert!(screen.contains("hello there"));
        assert!(screen.contains("AI:"));
        assert!(screen.contains("Type a message..."));
        assert!(screen.contains("Send"));
        assert!(app.send_area.is_some());
    }

    #[test]
    fn renders_waiting_state_while_exchange_is_pending() {
        let mut app = test_app();
        app.widget.set_input("question");
        let _exchange = app.widget.begin_exchange().unwrap();

        let screen = draw(&mut app);
        assert!(screen.contains("question"));
        assert!(screen.contains("AI is thinking."));
        assert!(screen.contains("Waiting for reply..."));
        assert!(!screen.contains("Type a message..."));
    }

    #[test]
    fn long_transcript_follows_bottom() {
        let mut app = test_app();
        for i in 0..30 {
            app.widget
                .append_message(&format!("message number {}", i), ChatRole::User);
        }

        let screen = draw(&mut app);
        assert!(screen.contains("message number 29"));
        assert!(!screen.contains("message number 0 "));
        assert!(app.transcript_scroll > 0);
    }
}
