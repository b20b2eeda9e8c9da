//! Chat client state.
//!
//! All conversation mutations flow through the discrete transitions below
//! (submit, completion, clear, model/mode selection); the event loop and the
//! renderer only ever observe the resulting snapshots. One relay call may be
//! outstanding at a time: the in-flight gate is a single-slot queue that
//! rejects submissions while occupied, and each occupancy carries a ticket
//! so a completion that outlived a clear is dropped instead of resurrected.

use tui_textarea::TextArea;

use crate::api::client::RelayClientError;
use crate::api::{RelayMode, RelayRequest, RelayResponse};
use crate::core::catalog::MODEL_CATALOG;
use crate::core::conversation::Conversation;
use crate::core::message::{Message, MessageKind};
use crate::ui::picker::{PickerItem, PickerState};
use crate::utils::logging::TranscriptLog;

/// Shown in place of a reply when the round-trip fails for any reason.
pub const APOLOGY_MESSAGE: &str = "Sorry, something went wrong. Please try again!";

const CHAT_PLACEHOLDER: &str = "Type your question…";
const IMAGE_PLACEHOLDER: &str = "Describe the image you want…";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InFlight {
    ticket: u64,
    /// Set when the conversation was cleared underneath the request; the
    /// completion then frees the slot without appending anything.
    stale: bool,
}

/// Everything the event loop needs to fire one relay call.
#[derive(Debug, Clone)]
pub struct RelaySubmission {
    pub ticket: u64,
    pub request: RelayRequest,
}

pub struct ChatApp {
    pub conversation: Conversation,
    pub input: TextArea<'static>,
    pub mode: RelayMode,
    pub selected_model: String,
    pub picker: Option<PickerState>,
    pub scroll_offset: u16,
    pub auto_scroll: bool,
    /// Largest valid scroll offset, recorded by the renderer each frame so
    /// scroll keys arriving between frames have a bound to clamp against.
    pub max_scroll: u16,
    pub transcript: TranscriptLog,
    in_flight: Option<InFlight>,
    next_ticket: u64,
}

impl ChatApp {
    pub fn new(model: String, mode: RelayMode, transcript: TranscriptLog) -> Self {
        let mut app = ChatApp {
            conversation: Conversation::new(),
            input: TextArea::default(),
            mode,
            selected_model: model,
            picker: None,
            scroll_offset: 0,
            auto_scroll: true,
            max_scroll: 0,
            transcript,
            in_flight: None,
            next_ticket: 0,
        };
        app.input.set_cursor_line_style(Default::default());
        app.input.set_placeholder_text(app.placeholder());
        app
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn input_text(&self) -> String {
        self.input.lines().join("\n")
    }

    pub fn placeholder(&self) -> &'static str {
        match self.mode {
            RelayMode::Chat => CHAT_PLACEHOLDER,
            RelayMode::Image => IMAGE_PLACEHOLDER,
        }
    }

    /// Try to turn the current input into a relay call. A blank input or an
    /// occupied in-flight slot makes this a no-op.
    pub fn submit(&mut self) -> Option<RelaySubmission> {
        if self.in_flight.is_some() {
            return None;
        }
        let content = self.input_text();
        if content.trim().is_empty() {
            return None;
        }

        self.append(Message::user(content, self.selected_model.clone()));
        self.input = TextArea::default();
        self.input.set_cursor_line_style(Default::default());
        self.input.set_placeholder_text(self.placeholder());

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.in_flight = Some(InFlight {
            ticket,
            stale: false,
        });

        Some(RelaySubmission {
            ticket,
            request: RelayRequest {
                messages: self.conversation.wire_history(),
                mode: self.mode,
                model: self.selected_model.clone(),
            },
        })
    }

    /// Land the outcome of a relay call. Unknown tickets are ignored; a
    /// stale ticket frees the slot without touching the conversation.
    pub fn complete(&mut self, ticket: u64, outcome: Result<RelayResponse, RelayClientError>) {
        let Some(in_flight) = self.in_flight else {
            return;
        };
        if in_flight.ticket != ticket {
            return;
        }
        self.in_flight = None;
        if in_flight.stale {
            return;
        }

        let message = match outcome {
            Ok(response) => {
                let mut message = match response.kind {
                    Some(MessageKind::Image) => Message::image(response.content),
                    _ => Message::assistant(response.content),
                };
                message.model = Some(self.selected_model.clone());
                message
            }
            Err(_) => Message::assistant(APOLOGY_MESSAGE).with_model(self.selected_model.clone()),
        };
        self.append(message);
    }

    /// Empty the transcript. Mode and model selection are untouched, and an
    /// in-flight request keeps its slot but is marked stale so its eventual
    /// completion is dropped.
    pub fn clear_conversation(&mut self) {
        self.conversation.clear();
        self.scroll_offset = 0;
        self.auto_scroll = true;
        if let Some(in_flight) = &mut self.in_flight {
            in_flight.stale = true;
        }
    }

    pub fn set_mode(&mut self, mode: RelayMode) {
        self.mode = mode;
        self.input.set_placeholder_text(self.placeholder());
    }

    pub fn toggle_mode(&mut self) {
        let next = match self.mode {
            RelayMode::Chat => RelayMode::Image,
            RelayMode::Image => RelayMode::Chat,
        };
        self.set_mode(next);
    }

    pub fn open_model_picker(&mut self) {
        let items: Vec<PickerItem> = MODEL_CATALOG.iter().map(PickerItem::from).collect();
        let selected = items
            .iter()
            .position(|item| item.id == self.selected_model)
            .unwrap_or(0);
        self.picker = Some(PickerState::new("Select model", items, selected));
    }

    pub fn close_picker(&mut self) {
        self.picker = None;
    }

    /// Apply the picker's current selection and close it. Never cancels an
    /// in-flight request.
    pub fn apply_picker_selection(&mut self) {
        if let Some(id) = self.picker.as_ref().and_then(|p| p.selected_id()) {
            self.selected_model = id.to_string();
        }
        self.picker = None;
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.auto_scroll = false;
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll_offset = self
            .scroll_offset
            .saturating_add(lines)
            .min(self.max_scroll);
        if self.scroll_offset >= self.max_scroll {
            self.auto_scroll = true;
        }
    }

    fn append(&mut self, message: Message) {
        let speaker = if message.is_user() { "You" } else { "Assistant" };
        if let Err(err) = self.transcript.record(speaker, &message.content) {
            tracing::warn!("transcript write failed: {err}");
        }
        self.conversation.push(message);
        // Follow the newest message unless the user scrolled away.
        if self.auto_scroll {
            self.scroll_offset = u16::MAX;
        }
    }
}
