use serde::{Deserialize, Serialize};

/// Who authored a message. These are the only roles that travel over the
/// relay wire; everything else the UI shows is derived presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    pub fn is_user(self) -> bool {
        self == Role::User
    }

    pub fn is_assistant(self) -> bool {
        self == Role::Assistant
    }
}

impl AsRef<str> for Role {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// How a message's content should be interpreted: markdown-ish text, or a
/// locator for a generated image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
    Image,
}

impl MessageKind {
    pub fn is_text(&self) -> bool {
        matches!(self, MessageKind::Text)
    }

    pub fn is_image(&self) -> bool {
        matches!(self, MessageKind::Image)
    }
}

/// One entry in the conversation. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(rename = "type", default, skip_serializing_if = "MessageKind::is_text")]
    pub kind: MessageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Message {
    pub fn user(content: impl Into<String>, model: impl Into<String>) -> Self {
        Message {
            role: Role::User,
            content: content.into(),
            kind: MessageKind::Text,
            model: Some(model.into()),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Message {
            role: Role::Assistant,
            content: content.into(),
            kind: MessageKind::Text,
            model: None,
        }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Message {
            role: Role::Assistant,
            content: url.into(),
            kind: MessageKind::Image,
            model: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn is_user(&self) -> bool {
        self.role.is_user()
    }

    pub fn is_assistant(&self) -> bool {
        self.role.is_assistant()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_as_lowercase_strings() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
        assert!(serde_json::from_str::<Role>("\"system\"").is_err());
    }

    #[test]
    fn text_messages_omit_the_kind_field() {
        let json = serde_json::to_value(Message::assistant("hello")).unwrap();
        assert!(json.get("type").is_none());
        assert!(json.get("model").is_none());
    }

    #[test]
    fn image_messages_carry_the_wire_type() {
        let json = serde_json::to_value(Message::image("https://img.example/a.png")).unwrap();
        assert_eq!(json["type"], "image");
        assert_eq!(json["role"], "assistant");
    }

    #[test]
    fn missing_kind_deserializes_as_text() {
        let msg: Message =
            serde_json::from_str(r#"{"role":"assistant","content":"hi"}"#).unwrap();
        assert!(msg.kind.is_text());
    }
}
