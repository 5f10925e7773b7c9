//! Test-only mock LLM provider.

use std::sync::{Arc, Mutex};

use crate::provider::{LlmProvider, Message};

#[derive(Debug, Clone)]
pub struct MockProvider {
    responses: Arc<Mutex<Vec<String>>>,
    received: Arc<Mutex<Vec<Vec<Message>>>>,
    batches: Arc<Mutex<usize>>,
    pub default_response: String,
    pub fail_chat: bool,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            received: Arc::new(Mutex::new(Vec::new())),
            batches: Arc::new(Mutex::new(0)),
            default_response: "mock response".into(),
            fail_chat: false,
        }
    }
}

impl MockProvider {
    /// Responses are handed out in order; once drained, `default_response` is used.
    #[must_use]
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_chat: true,
            ..Self::default()
        }
    }

    /// Every prompt this provider (or any clone of it) has received, in call order.
    #[must_use]
    pub fn received(&self) -> Vec<Vec<Message>> {
        self.received.lock().unwrap().clone()
    }

    /// Number of `chat_batch` submissions seen.
    #[must_use]
    pub fn batch_count(&self) -> usize {
        *self.batches.lock().unwrap()
    }
}

impl LlmProvider for MockProvider {
    async fn chat(&self, messages: &[Message]) -> Result<String, crate::LlmError> {
        self.received.lock().unwrap().push(messages.to_vec());
        if self.fail_chat {
            return Err(crate::LlmError::Other("mock LLM error".into()));
        }
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(self.default_response.clone())
        } else {
            Ok(responses.remove(0))
        }
    }

    async fn chat_batch(&self, prompts: &[Vec<Message>]) -> Result<Vec<String>, crate::LlmError> {
        *self.batches.lock().unwrap() += 1;
        let mut outputs = Vec::with_capacity(prompts.len());
        for messages in prompts {
            outputs.push(self.chat(messages).await?);
        }
        Ok(outputs)
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "mock"
    }
}
