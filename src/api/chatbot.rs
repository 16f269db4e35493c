//! Chatbot endpoints.

use super::client::file_part;
use super::ApiClient;
use crate::error::Result;
use crate::models::chat::ChatRequest;
use crate::models::{ChatHistory, ChatReply, ChatRole, ChatTurn, Upload};
use reqwest::multipart::Form;
use serde_json::Value;

impl ApiClient {
    /// Ask a question with the given prior turns as context.
    pub async fn ask_chatbot(&self, message: &str, history: &[ChatTurn]) -> Result<ChatReply> {
        self.post(
            "/chatbot/ask",
            &ChatRequest {
                message,
                conversation_history: history,
            },
        )
        .await
    }

    /// Ask a question about an attached document.
    pub async fn ask_chatbot_with_document(
        &self,
        message: &str,
        document: &Upload,
    ) -> Result<ChatReply> {
        let form = Form::new()
            .text("message", message.to_string())
            .part("document", file_part(document)?);
        self.post_multipart("/chatbot/ask-with-document", form)
            .await
    }

    /// Ask a question and record both sides in `history`.
    ///
    /// The question is sent with the recent window of `history` as context.
    /// Nothing is recorded if the request fails.
    pub async fn converse(&self, history: &mut ChatHistory, message: &str) -> Result<String> {
        let reply = self.ask_chatbot(message, history.recent()).await?;
        let text = reply.text().to_string();
        history.push(ChatRole::User, message);
        history.push(ChatRole::Assistant, text.clone());
        Ok(text)
    }

    pub async fn clear_chat_history(&self) -> Result<Value> {
        self.delete("/chatbot/history").await
    }
}
