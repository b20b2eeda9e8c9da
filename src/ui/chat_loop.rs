//! The interactive event loop.
//!
//! One cooperative loop owns the terminal and the app state: it draws a
//! frame, routes key and mouse events, and drains relay completions from an
//! mpsc channel. The relay call itself runs on a spawned task so the UI
//! stays responsive while exactly one submission is pending.

use ratatui::backend::CrosstermBackend;
use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::Terminal;
use std::error::Error;
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::api::client::{RelayClient, RelayClientError};
use crate::api::{RelayMode, RelayResponse};
use crate::ui::app::{ChatApp, RelaySubmission};
use crate::ui::renderer::ui;
use crate::utils::logging::TranscriptLog;

struct RelayOutcome {
    ticket: u64,
    result: Result<RelayResponse, RelayClientError>,
}

#[derive(Debug)]
enum KeyOutcome {
    Quit,
    Submit(RelaySubmission),
    Continue,
}

pub async fn run_chat(
    model: String,
    mode: RelayMode,
    relay_url: String,
    log_file: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let transcript = TranscriptLog::new(log_file)?;
    let mut app = ChatApp::new(model, mode, transcript);
    let relay = RelayClient::new(&relay_url);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app, &relay).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut ChatApp,
    relay: &RelayClient,
) -> Result<(), Box<dyn Error>> {
    let (tx, mut rx) = mpsc::unbounded_channel::<RelayOutcome>();

    loop {
        terminal.draw(|f| ui(f, app))?;

        while let Ok(outcome) = rx.try_recv() {
            app.complete(outcome.ticket, outcome.result);
        }

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match handle_key(app, key) {
                KeyOutcome::Quit => return Ok(()),
                KeyOutcome::Submit(submission) => dispatch(relay, &tx, submission),
                KeyOutcome::Continue => {}
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollUp => app.scroll_up(3),
                MouseEventKind::ScrollDown => app.scroll_down(3),
                _ => {}
            },
            _ => {}
        }
    }
}

/// Fire one relay call on its own task; the outcome comes back over the
/// channel tagged with the submission's ticket.
fn dispatch(
    relay: &RelayClient,
    tx: &mpsc::UnboundedSender<RelayOutcome>,
    submission: RelaySubmission,
) {
    let relay = relay.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let RelaySubmission { ticket, request } = submission;
        let result = relay
            .send(request.messages, request.mode, &request.model)
            .await;
        let _ = tx.send(RelayOutcome { ticket, result });
    });
}

/// Shift+Enter inserts a newline; Alt+Enter is the synonym for terminals
/// that do not report shift with Enter.
fn is_newline_chord(modifiers: KeyModifiers) -> bool {
    modifiers.contains(KeyModifiers::SHIFT) || modifiers.contains(KeyModifiers::ALT)
}

fn handle_key(app: &mut ChatApp, key: KeyEvent) -> KeyOutcome {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return KeyOutcome::Quit;
    }

    if app.picker.is_some() {
        match key.code {
            KeyCode::Up => {
                if let Some(picker) = &mut app.picker {
                    picker.move_up();
                }
            }
            KeyCode::Down => {
                if let Some(picker) = &mut app.picker {
                    picker.move_down();
                }
            }
            KeyCode::Enter => app.apply_picker_selection(),
            KeyCode::Esc => app.close_picker(),
            _ => {}
        }
        return KeyOutcome::Continue;
    }

    match key.code {
        KeyCode::Enter if is_newline_chord(key.modifiers) => {
            app.input.insert_newline();
        }
        KeyCode::Enter => {
            if let Some(submission) = app.submit() {
                return KeyOutcome::Submit(submission);
            }
        }
        KeyCode::Tab => app.toggle_mode(),
        KeyCode::Char('l') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.clear_conversation();
        }
        KeyCode::Char('p') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.open_model_picker();
        }
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(10),
        KeyCode::PageDown => app.scroll_down(10),
        _ => {
            app.input.input(tui_textarea::Input::from(key));
        }
    }
    KeyOutcome::Continue
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> ChatApp {
        ChatApp::new(
            "gpt-4o".to_string(),
            RelayMode::Chat,
            TranscriptLog::disabled(),
        )
    }

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    fn type_text(app: &mut ChatApp, text: &str) {
        for ch in text.chars() {
            handle_key(app, press(KeyCode::Char(ch), KeyModifiers::NONE));
        }
    }

    #[test]
    fn plain_enter_submits() {
        let mut app = test_app();
        type_text(&mut app, "2+2?");
        let outcome = handle_key(&mut app, press(KeyCode::Enter, KeyModifiers::NONE));
        assert!(matches!(outcome, KeyOutcome::Submit(_)));
        assert_eq!(app.conversation.len(), 1);
    }

    #[test]
    fn shift_enter_inserts_a_newline_instead_of_submitting() {
        let mut app = test_app();
        type_text(&mut app, "line one");
        let outcome = handle_key(&mut app, press(KeyCode::Enter, KeyModifiers::SHIFT));
        assert!(matches!(outcome, KeyOutcome::Continue));
        type_text(&mut app, "line two");

        assert!(app.conversation.is_empty());
        assert_eq!(app.input_text(), "line one\nline two");
    }

    #[test]
    fn alt_enter_is_a_newline_synonym() {
        let mut app = test_app();
        type_text(&mut app, "x");
        handle_key(&mut app, press(KeyCode::Enter, KeyModifiers::ALT));
        assert!(app.conversation.is_empty());
        assert!(app.input_text().contains('\n'));
    }

    #[test]
    fn enter_on_blank_input_does_nothing() {
        let mut app = test_app();
        let outcome = handle_key(&mut app, press(KeyCode::Enter, KeyModifiers::NONE));
        assert!(matches!(outcome, KeyOutcome::Continue));
        assert!(app.conversation.is_empty());
        assert!(!app.is_loading());
    }

    #[test]
    fn enter_while_loading_does_nothing() {
        let mut app = test_app();
        type_text(&mut app, "first");
        handle_key(&mut app, press(KeyCode::Enter, KeyModifiers::NONE));
        type_text(&mut app, "second");
        let outcome = handle_key(&mut app, press(KeyCode::Enter, KeyModifiers::NONE));
        assert!(matches!(outcome, KeyOutcome::Continue));
        assert_eq!(app.conversation.len(), 1);
    }

    #[test]
    fn ctrl_l_clears_the_conversation() {
        let mut app = test_app();
        app.conversation
            .push(crate::core::message::Message::user("hi", "gpt-4o"));
        handle_key(&mut app, press(KeyCode::Char('l'), KeyModifiers::CONTROL));
        assert!(app.conversation.is_empty());
    }

    #[test]
    fn tab_toggles_mode() {
        let mut app = test_app();
        handle_key(&mut app, press(KeyCode::Tab, KeyModifiers::NONE));
        assert_eq!(app.mode, RelayMode::Image);
    }

    #[test]
    fn picker_keys_navigate_select_and_close() {
        let mut app = test_app();
        handle_key(&mut app, press(KeyCode::Char('p'), KeyModifiers::CONTROL));
        assert!(app.picker.is_some());

        handle_key(&mut app, press(KeyCode::Down, KeyModifiers::NONE));
        handle_key(&mut app, press(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(app.selected_model, "o3");
        assert!(app.picker.is_none());

        handle_key(&mut app, press(KeyCode::Char('p'), KeyModifiers::CONTROL));
        handle_key(&mut app, press(KeyCode::Esc, KeyModifiers::NONE));
        assert!(app.picker.is_none());
        assert_eq!(app.selected_model, "o3");
    }

    #[test]
    fn ctrl_c_quits_even_with_the_picker_open() {
        let mut app = test_app();
        handle_key(&mut app, press(KeyCode::Char('p'), KeyModifiers::CONTROL));
        let outcome = handle_key(&mut app, press(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(matches!(outcome, KeyOutcome::Quit));
    }
}
