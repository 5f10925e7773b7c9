use crate::claude::ClaudeProvider;
#[cfg(feature = "mock")]
use crate::mock::MockProvider;
use crate::ollama::OllamaProvider;
use crate::openai::OpenAiProvider;
use crate::provider::{LlmProvider, Message};

/// Generates a match over all `AnyProvider` variants, binding the inner provider
/// and evaluating the given expression for each arm.
macro_rules! delegate_provider {
    ($self:expr, |$p:ident| $expr:expr) => {
        match $self {
            AnyProvider::Ollama($p) => $expr,
            AnyProvider::Claude($p) => $expr,
            AnyProvider::OpenAi($p) => $expr,
            #[cfg(feature = "mock")]
            AnyProvider::Mock($p) => $expr,
        }
    };
}

#[derive(Debug, Clone)]
pub enum AnyProvider {
    Ollama(OllamaProvider),
    Claude(ClaudeProvider),
    OpenAi(OpenAiProvider),
    #[cfg(feature = "mock")]
    Mock(MockProvider),
}

impl LlmProvider for AnyProvider {
    async fn chat(&self, messages: &[Message]) -> Result<String, crate::LlmError> {
        delegate_provider!(self, |p| p.chat(messages).await)
    }

    async fn chat_batch(&self, prompts: &[Vec<Message>]) -> Result<Vec<String>, crate::LlmError> {
        delegate_provider!(self, |p| p.chat_batch(prompts).await)
    }

    fn name(&self) -> &str {
        delegate_provider!(self, |p| p.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_delegates_to_inner() {
        let ollama = AnyProvider::Ollama(OllamaProvider::new("http://localhost", "m".into()));
        assert_eq!(ollama.name(), "ollama");

        let claude = AnyProvider::Claude(ClaudeProvider::new(
            reqwest::Client::new(),
            "k".into(),
            "m".into(),
            1,
        ));
        assert_eq!(claude.name(), "claude");

        let openai = AnyProvider::OpenAi(OpenAiProvider::new(
            reqwest::Client::new(),
            "k".into(),
            "http://localhost".into(),
            "gpt-4o".into(),
            1,
        ));
        assert_eq!(openai.name(), "openai");
    }

    #[cfg(feature = "mock")]
    #[tokio::test]
    async fn chat_batch_delegates_to_mock() {
        let mock = MockProvider::with_responses(vec!["one".into(), "two".into()]);
        let provider = AnyProvider::Mock(mock.clone());
        let out = provider
            .chat_batch(&[vec![Message::user("a")], vec![Message::user("b")]])
            .await
            .unwrap();
        assert_eq!(out, vec!["one", "two"]);
        assert_eq!(mock.batch_count(), 1);
    }
}
