use arcsum_llm::LlmProvider;

use super::{Chain, ChainInput};
use crate::prompt::{ChatPromptTemplate, row_summary_prompt};

/// Fields of one row-summary prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSummaryInput {
    pub name: String,
    pub description: String,
    /// The row's attribute record, serialized as JSON.
    pub json_str: String,
}

impl From<RowSummaryInput> for ChainInput {
    fn from(input: RowSummaryInput) -> Self {
        ChainInput::from([
            ("name".to_owned(), input.name),
            ("description".to_owned(), input.description),
            ("json_str".to_owned(), input.json_str),
        ])
    }
}

/// Produces a bullet-point summary of a single feature row.
#[derive(Debug, Clone)]
pub struct RowSummaryChain<P> {
    provider: P,
    prompt: ChatPromptTemplate,
}

impl<P: LlmProvider> RowSummaryChain<P> {
    #[must_use]
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            prompt: row_summary_prompt(),
        }
    }

    /// Replace the default prompt. It should still take `name`, `description`
    /// and `json_str`, since the row transformer supplies exactly those keys.
    #[must_use]
    pub fn with_prompt(mut self, prompt: ChatPromptTemplate) -> Self {
        self.prompt = prompt;
        self
    }
}

impl<P: LlmProvider> Chain for RowSummaryChain<P> {
    type Provider = P;

    fn provider(&self) -> &P {
        &self.provider
    }

    fn prompt(&self) -> &ChatPromptTemplate {
        &self.prompt
    }

    fn chain_type(&self) -> &'static str {
        "arcgis_row_summary_chain"
    }
}

#[cfg(test)]
mod tests {
    use arcsum_llm::Role;
    use arcsum_llm::mock::MockProvider;

    use super::*;

    #[test]
    fn input_keys_follow_prompt() {
        let chain = RowSummaryChain::new(MockProvider::default());
        assert_eq!(chain.input_keys(), ["description", "json_str", "name"]);
        assert_eq!(chain.chain_type(), "arcgis_row_summary_chain");
    }

    #[test]
    fn row_input_converts_to_named_fields() {
        let input: ChainInput = RowSummaryInput {
            name: "Fire Stations".into(),
            description: "City assets\nStations layer".into(),
            json_str: "{\"STATION\": 12}".into(),
        }
        .into();
        assert_eq!(input["name"], "Fire Stations");
        assert_eq!(input["description"], "City assets\nStations layer");
        assert_eq!(input["json_str"], "{\"STATION\": 12}");
    }

    #[tokio::test]
    async fn rendered_prompt_embeds_row_fields() {
        let mock = MockProvider::default();
        let chain = RowSummaryChain::new(mock.clone());
        let input: ChainInput = RowSummaryInput {
            name: "Fire Stations".into(),
            description: "City assets".into(),
            json_str: "{\"STATION\": 12}".into(),
        }
        .into();

        chain.invoke(&input).await.unwrap();

        let sent = &mock.received()[0];
        assert_eq!(sent[0].role, Role::System);
        assert_eq!(sent[1].role, Role::User);
        assert!(sent[1].content.contains("Dataset name: Fire Stations"));
        assert!(sent[1].content.contains("City assets"));
        assert!(sent[1].content.contains("{\"STATION\": 12}"));
    }

    #[tokio::test]
    async fn custom_prompt_is_used() {
        let mock = MockProvider::default();
        let prompt = ChatPromptTemplate::from_messages(&[(
            Role::User,
            "{name}|{description}|{json_str}",
        )]);
        let chain = RowSummaryChain::new(mock.clone()).with_prompt(prompt);
        let input: ChainInput = RowSummaryInput {
            name: "n".into(),
            description: "d".into(),
            json_str: "j".into(),
        }
        .into();

        chain.invoke(&input).await.unwrap();
        assert_eq!(mock.received()[0][0].content, "n|d|j");
    }
}
