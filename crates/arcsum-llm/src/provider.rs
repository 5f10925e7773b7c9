use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::LlmError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

pub trait LlmProvider: Send + Sync {
    /// Send one rendered prompt to the LLM and return the generated text.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider fails to communicate or the response is invalid.
    fn chat(&self, messages: &[Message]) -> impl Future<Output = Result<String, LlmError>> + Send;

    /// Send several rendered prompts and return one generated text per prompt.
    ///
    /// Results are in the same order as `prompts`. The default implementation
    /// issues the calls one after another; the first failure aborts the batch.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by [`LlmProvider::chat`].
    fn chat_batch(
        &self,
        prompts: &[Vec<Message>],
    ) -> impl Future<Output = Result<Vec<String>, LlmError>> + Send {
        async move {
            let mut outputs = Vec::with_capacity(prompts.len());
            for messages in prompts {
                outputs.push(self.chat(messages).await?);
            }
            Ok(outputs)
        }
    }

    fn name(&self) -> &str;
}
