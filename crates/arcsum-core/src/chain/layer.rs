use arcsum_llm::LlmProvider;

use super::Chain;
use crate::prompt::{ChatPromptTemplate, layer_summary_prompt};

/// Input key of the layer prompt: the tagged row summaries.
pub const LAYER_INPUT_KEY: &str = "summaries";

/// Produces a narrative summary of a whole layer from its row summaries.
#[derive(Debug, Clone)]
pub struct LayerSummaryChain<P> {
    provider: P,
    prompt: ChatPromptTemplate,
}

impl<P: LlmProvider> LayerSummaryChain<P> {
    #[must_use]
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            prompt: layer_summary_prompt(),
        }
    }

    /// Replace the default prompt. It must take a single variable for
    /// [`Chain::run`] to work.
    #[must_use]
    pub fn with_prompt(mut self, prompt: ChatPromptTemplate) -> Self {
        self.prompt = prompt;
        self
    }
}

impl<P: LlmProvider> Chain for LayerSummaryChain<P> {
    type Provider = P;

    fn provider(&self) -> &P {
        &self.provider
    }

    fn prompt(&self) -> &ChatPromptTemplate {
        &self.prompt
    }

    fn chain_type(&self) -> &'static str {
        "arcgis_layer_summary_chain"
    }
}

#[cfg(test)]
mod tests {
    use arcsum_llm::mock::MockProvider;

    use super::*;
    use crate::chain::ChainInput;

    #[test]
    fn input_keys_is_summaries() {
        let chain = LayerSummaryChain::new(MockProvider::default());
        assert_eq!(chain.input_keys(), [LAYER_INPUT_KEY]);
        assert_eq!(chain.chain_type(), "arcgis_layer_summary_chain");
    }

    #[tokio::test]
    async fn invoke_with_explicit_map() {
        let mock = MockProvider::with_responses(vec!["overview".into()]);
        let chain = LayerSummaryChain::new(mock.clone());
        let input = ChainInput::from([(LAYER_INPUT_KEY.to_owned(), "tagged".to_owned())]);

        let out = chain.invoke(&input).await.unwrap();
        assert_eq!(out.text, "overview");
        assert_eq!(mock.received()[0].len(), 2);
    }
}
