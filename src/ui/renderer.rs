//! Frame rendering: transcript, mode tabs, input, footer, and the model
//! picker overlay.

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::api::RelayMode;
use crate::core::catalog::find_model;
use crate::core::message::MessageKind;
use crate::ui::app::ChatApp;
use crate::ui::markdown::render_markdown;

const EMPTY_STATE_GREETING: &str = "Ask me a question, or describe an image!";
const CHAT_DISCLAIMER: &str = "Answers can contain inaccuracies; double-check important facts.";
const IMAGE_DISCLAIMER: &str = "Generated images can differ from the description.";
const TYPING_INDICATOR: &str = "Assistant is typing…";

pub fn ui(f: &mut Frame, app: &mut ChatApp) {
    let input_height = (app.input.lines().len() as u16).clamp(1, 5) + 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(input_height),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_transcript(f, app, chunks[0]);
    draw_mode_tabs(f, app, chunks[1]);
    draw_input(f, app, chunks[2]);
    draw_footer(f, app, chunks[3]);

    if app.picker.is_some() {
        draw_picker(f, app);
    }
}

fn title_line(app: &ChatApp) -> String {
    let model_label = find_model(&app.selected_model)
        .map(|m| m.display_name)
        .unwrap_or(app.selected_model.as_str());
    format!(" causerie · {model_label} ")
}

fn draw_transcript(f: &mut Frame, app: &mut ChatApp, area: Rect) {
    let block = Block::default().title(title_line(app));

    if app.conversation.is_empty() && !app.is_loading() {
        let top_padding = area.height / 3;
        let mut lines: Vec<Line> = (0..top_padding).map(|_| Line::from("")).collect();
        lines.push(Line::from(Span::styled(
            EMPTY_STATE_GREETING,
            Style::default().add_modifier(Modifier::BOLD),
        )));
        let greeting = Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center);
        f.render_widget(greeting, area);
        return;
    }

    let content_width = area.width.saturating_sub(1) as usize;
    let lines = transcript_lines(app, content_width);

    // Title row eats one line of height.
    let available_height = area.height.saturating_sub(1);
    let total_lines = lines.len() as u16;
    let max_offset = total_lines.saturating_sub(available_height);
    app.max_scroll = max_offset;
    let offset = if app.auto_scroll {
        max_offset
    } else {
        app.scroll_offset.min(max_offset)
    };
    app.scroll_offset = offset;

    let transcript = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((offset, 0));
    f.render_widget(transcript, area);
}

fn transcript_lines(app: &ChatApp, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for message in app.conversation.messages() {
        if message.is_user() {
            let mut content_lines = message.content.lines();
            let first = content_lines.next().unwrap_or_default().to_string();
            lines.push(Line::from(vec![
                Span::styled(
                    "You: ",
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(first, Style::default().fg(Color::Cyan)),
            ]));
            for rest in content_lines {
                lines.push(Line::from(Span::styled(
                    rest.to_string(),
                    Style::default().fg(Color::Cyan),
                )));
            }
        } else if message.kind == MessageKind::Image {
            lines.push(Line::from(vec![
                Span::styled(
                    "[image] ",
                    Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    message.content.clone(),
                    Style::default().add_modifier(Modifier::UNDERLINED),
                ),
            ]));
        } else {
            lines.extend(render_markdown(&message.content, width));
        }
        lines.push(Line::from(""));
    }

    if app.is_loading() {
        lines.push(Line::from(Span::styled(
            TYPING_INDICATOR,
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

fn draw_mode_tabs(f: &mut Frame, app: &ChatApp, area: Rect) {
    let selected = Style::default()
        .add_modifier(Modifier::BOLD)
        .add_modifier(Modifier::REVERSED);
    let idle = Style::default().fg(Color::DarkGray);

    let (chat_style, image_style) = match app.mode {
        RelayMode::Chat => (selected, idle),
        RelayMode::Image => (idle, selected),
    };

    let tabs = Line::from(vec![
        Span::styled(" Chat ", chat_style),
        Span::raw(" "),
        Span::styled(" Image ", image_style),
        Span::styled("  (Tab switches mode)", idle),
    ]);
    f.render_widget(Paragraph::new(tabs), area);
}

fn draw_input(f: &mut Frame, app: &mut ChatApp, area: Rect) {
    app.input.set_block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Enter send · Shift+Enter newline · Ctrl+P models · Ctrl+L clear · Ctrl+C quit "),
    );
    f.render_widget(&app.input, area);
}

fn draw_footer(f: &mut Frame, app: &ChatApp, area: Rect) {
    let disclaimer = match app.mode {
        RelayMode::Chat => CHAT_DISCLAIMER,
        RelayMode::Image => IMAGE_DISCLAIMER,
    };
    let footer = Paragraph::new(Span::styled(
        disclaimer,
        Style::default().fg(Color::DarkGray),
    ))
    .alignment(Alignment::Center);
    f.render_widget(footer, area);
}

fn draw_picker(f: &mut Frame, app: &ChatApp) {
    let Some(picker) = &app.picker else {
        return;
    };

    let area = centered_rect(f.area(), 44, (picker.items.len() as u16 * 2) + 2);
    f.render_widget(Clear, area);

    let items: Vec<ListItem> = picker
        .items
        .iter()
        .map(|item| {
            ListItem::new(vec![
                Line::from(Span::styled(
                    item.label.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("  {}", item.description),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} · Enter choose · Esc close ", picker.title)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    state.select(Some(picker.selected));
    f.render_stateful_widget(list, area, &mut state);
}

/// A fixed-size rect centered in the containing area, clamped to fit.
fn centered_rect(container: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(container.width);
    let height = height.min(container.height);
    Rect {
        x: container.x + (container.width - width) / 2,
        y: container.y + (container.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RelayMode;
    use crate::core::message::Message;
    use crate::utils::logging::TranscriptLog;

    fn test_app() -> ChatApp {
        ChatApp::new(
            "gpt-4o".to_string(),
            RelayMode::Chat,
            TranscriptLog::disabled(),
        )
    }

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn user_and_assistant_messages_are_visually_distinct() {
        let mut app = test_app();
        app.conversation.push(Message::user("2+2?", "gpt-4o"));
        app.conversation
            .push(Message::assistant("4").with_model("gpt-4o"));

        let lines = transcript_lines(&app, 80);
        assert!(line_text(&lines[0]).starts_with("You: 2+2?"));
        assert_eq!(lines[0].spans[0].style.fg, Some(Color::Cyan));
        assert!(lines.iter().any(|l| line_text(l) == "4"));
    }

    #[test]
    fn image_messages_render_as_a_source_block_not_markdown() {
        let mut app = test_app();
        app.conversation
            .push(Message::image("https://img.example/*emphasis*.png"));

        let lines = transcript_lines(&app, 80);
        let rendered = line_text(&lines[0]);
        // The URL is shown verbatim; markdown emphasis must not be applied.
        assert_eq!(rendered, "[image] https://img.example/*emphasis*.png");
    }

    #[test]
    fn typing_indicator_appears_only_while_loading() {
        let mut app = test_app();
        app.input.insert_str("hello");
        assert!(!transcript_lines(&app, 80)
            .iter()
            .any(|l| line_text(l) == TYPING_INDICATOR));

        app.submit().unwrap();
        assert!(transcript_lines(&app, 80)
            .iter()
            .any(|l| line_text(l) == TYPING_INDICATOR));
    }

    #[test]
    fn centered_rect_stays_inside_the_container() {
        let container = Rect::new(0, 0, 80, 24);
        let rect = centered_rect(container, 44, 10);
        assert!(rect.x + rect.width <= 80);
        assert!(rect.y + rect.height <= 24);

        let tiny = centered_rect(Rect::new(0, 0, 10, 4), 44, 10);
        assert_eq!(tiny.width, 10);
        assert_eq!(tiny.height, 4);
    }
}
