//! The in-memory conversation.
//!
//! Append-only for the lifetime of a session: every round-trip adds one user
//! message and one assistant message, and the only other transition is a
//! wholesale clear. Rendering and relay payloads both work from read-only
//! snapshots; nothing mutates a message after it is appended.

use crate::api::WireMessage;
use crate::core::message::Message;

#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only snapshot in conversation order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// The role/content pairs a relay request carries. Presentation fields
    /// (kind, model tag) stay local.
    pub fn wire_history(&self) -> Vec<WireMessage> {
        self.messages
            .iter()
            .map(|m| WireMessage {
                role: m.role,
                content: m.content.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Role;

    #[test]
    fn a_round_trip_appends_two_messages_in_order() {
        let mut conversation = Conversation::new();
        conversation.push(Message::user("2+2?", "gpt-4o"));
        conversation.push(Message::assistant("4").with_model("gpt-4o"));

        let snapshot = conversation.messages();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].role, Role::User);
        assert_eq!(snapshot[1].role, Role::Assistant);
    }

    #[test]
    fn clear_empties_the_transcript() {
        let mut conversation = Conversation::new();
        conversation.push(Message::user("hello", "o3"));
        conversation.clear();
        assert!(conversation.is_empty());
    }

    #[test]
    fn wire_history_strips_presentation_fields() {
        let mut conversation = Conversation::new();
        conversation.push(Message::user("a fox", "gpt-4o"));
        conversation.push(Message::image("https://img.example/fox.png"));

        let wire = conversation.wire_history();
        assert_eq!(wire.len(), 2);
        assert_eq!(wire[0].role, Role::User);
        assert_eq!(wire[1].content, "https://img.example/fox.png");
        let json = serde_json::to_value(&wire[1]).unwrap();
        assert!(json.get("type").is_none());
        assert!(json.get("model").is_none());
    }
}
