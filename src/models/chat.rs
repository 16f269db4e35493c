//! Chatbot conversation types.

use super::Extra;
use serde::{Deserialize, Serialize};

/// Number of previous turns sent along with a new question.
pub const HISTORY_WINDOW: usize = 10;

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

/// Body of `POST /chatbot/ask`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChatRequest<'a> {
    pub message: &'a str,
    pub conversation_history: &'a [ChatTurn],
}

/// Chatbot answer. The server has used both `response` and `message`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl ChatReply {
    pub const FALLBACK_TEXT: &'static str = "I received your message.";

    /// Text to show for this reply.
    pub fn text(&self) -> &str {
        self.response
            .as_deref()
            .or(self.message.as_deref())
            .filter(|t| !t.is_empty())
            .unwrap_or(Self::FALLBACK_TEXT)
    }
}

/// Local transcript of a chatbot conversation.
#[derive(Debug, Clone, Default)]
pub struct ChatHistory {
    turns: Vec<ChatTurn>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: ChatRole, content: impl Into<String>) {
        self.turns.push(ChatTurn {
            role,
            content: content.into(),
        });
    }

    /// The most recent turns, oldest first, bounded by [`HISTORY_WINDOW`].
    pub fn recent(&self) -> &[ChatTurn] {
        let start = self.turns.len().saturating_sub(HISTORY_WINDOW);
        &self.turns[start..]
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_recent_window() {
        let mut history = ChatHistory::new();
        for i in 0..15 {
            history.push(ChatRole::User, format!("q{}", i));
        }
        let recent = history.recent();
        assert_eq!(recent.len(), HISTORY_WINDOW);
        assert_eq!(recent[0].content, "q5");
        assert_eq!(recent[9].content, "q14");
    }

    #[test]
    fn test_reply_text_fallbacks() {
        let reply: ChatReply = serde_json::from_value(json!({"response": "Library opens at 9"})).unwrap();
        assert_eq!(reply.text(), "Library opens at 9");

        let reply: ChatReply = serde_json::from_value(json!({"message": "Try again"})).unwrap();
        assert_eq!(reply.text(), "Try again");

        let reply: ChatReply = serde_json::from_value(json!({})).unwrap();
        assert_eq!(reply.text(), ChatReply::FALLBACK_TEXT);
    }

    #[test]
    fn test_turn_wire_format() {
        let turn = ChatTurn {
            role: ChatRole::Assistant,
            content: "Hello".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&turn).unwrap(),
            json!({"role": "assistant", "content": "Hello"})
        );
    }
}
