//! Chat prompt templates with `{variable}` placeholders.
//!
//! `{{` and `}}` render as literal braces. A `{` that does not open a valid
//! placeholder is kept as text, so any template string is accepted.

use std::collections::BTreeMap;

use arcsum_llm::{Message, Role};

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("missing value for prompt variable '{0}'")]
    MissingVariable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Variable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct MessageTemplate {
    role: Role,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPromptTemplate {
    messages: Vec<MessageTemplate>,
    input_variables: Vec<String>,
}

impl ChatPromptTemplate {
    #[must_use]
    pub fn from_messages(messages: &[(Role, &str)]) -> Self {
        let messages: Vec<MessageTemplate> = messages
            .iter()
            .map(|(role, template)| MessageTemplate {
                role: *role,
                segments: parse_template(template),
            })
            .collect();

        let mut input_variables: Vec<String> = messages
            .iter()
            .flat_map(|m| m.segments.iter())
            .filter_map(|s| match s {
                Segment::Variable(name) => Some(name.clone()),
                Segment::Text(_) => None,
            })
            .collect();
        input_variables.sort();
        input_variables.dedup();

        Self {
            messages,
            input_variables,
        }
    }

    /// Sorted, de-duplicated placeholder names across all messages.
    #[must_use]
    pub fn input_variables(&self) -> &[String] {
        &self.input_variables
    }

    /// Render every message, substituting placeholder values verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::MissingVariable`] for the first placeholder without a value.
    pub fn format_messages(
        &self,
        values: &BTreeMap<String, String>,
    ) -> Result<Vec<Message>, PromptError> {
        self.messages
            .iter()
            .map(|m| {
                let mut content = String::new();
                for segment in &m.segments {
                    match segment {
                        Segment::Text(text) => content.push_str(text),
                        Segment::Variable(name) => content.push_str(
                            values
                                .get(name)
                                .ok_or_else(|| PromptError::MissingVariable(name.clone()))?,
                        ),
                    }
                }
                Ok(Message {
                    role: m.role,
                    content,
                })
            })
            .collect()
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_template(template: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut text = String::new();
    let mut rest = template;

    while let Some(c) = rest.chars().next() {
        if rest.starts_with("{{") {
            text.push('{');
            rest = &rest[2..];
        } else if rest.starts_with("}}") {
            text.push('}');
            rest = &rest[2..];
        } else if c == '{'
            && let Some(end) = rest.find('}')
            && is_identifier(&rest[1..end])
        {
            if !text.is_empty() {
                segments.push(Segment::Text(std::mem::take(&mut text)));
            }
            segments.push(Segment::Variable(rest[1..end].to_owned()));
            rest = &rest[end + 1..];
        } else {
            text.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }

    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }
    segments
}

const ROW_SYSTEM: &str = "\
You are a GIS analyst describing individual features of a geospatial dataset.
You receive the dataset name, its description, and one row of the dataset's
attribute table as JSON. Write a short bullet-point summary of that single
feature in plain language. Mention only facts present in the attributes,
translate coded or abbreviated field names into readable terms where the
description makes their meaning clear, and skip empty or null values.
Respond with the bullet points only.";

const ROW_HUMAN: &str = "\
Dataset name: {name}

Dataset description:
{description}

Row attributes (JSON):
{json_str}";

const LAYER_SYSTEM: &str = "\
You are a GIS analyst writing an overview of a geospatial data layer.
You receive the summaries of the layer's rows, each wrapped in
<row_summary></row_summary> tags, all inside one <layer_summary></layer_summary>
block. Write a concise narrative that describes what the layer contains as a
whole: the kinds of features, notable patterns, ranges and outliers.
Do not list rows one by one and do not repeat the tags in your answer.";

const LAYER_HUMAN: &str = "{summaries}";

/// Prompt used by [`crate::chain::RowSummaryChain`]; variables `name`, `description`, `json_str`.
#[must_use]
pub fn row_summary_prompt() -> ChatPromptTemplate {
    ChatPromptTemplate::from_messages(&[(Role::System, ROW_SYSTEM), (Role::User, ROW_HUMAN)])
}

/// Prompt used by [`crate::chain::LayerSummaryChain`]; single variable `summaries`.
#[must_use]
pub fn layer_summary_prompt() -> ChatPromptTemplate {
    ChatPromptTemplate::from_messages(&[(Role::System, LAYER_SYSTEM), (Role::User, LAYER_HUMAN)])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn input_variables_sorted_and_deduplicated() {
        let t = ChatPromptTemplate::from_messages(&[
            (Role::System, "{b} and {a}"),
            (Role::User, "{a} again"),
        ]);
        assert_eq!(t.input_variables(), ["a", "b"]);
    }

    #[test]
    fn format_substitutes_values() {
        let t = ChatPromptTemplate::from_messages(&[(Role::User, "Hello {who}!")]);
        let msgs = t.format_messages(&values(&[("who", "world")])).unwrap();
        assert_eq!(msgs, vec![Message::user("Hello world!")]);
    }

    #[test]
    fn escaped_braces_render_literally() {
        let t = ChatPromptTemplate::from_messages(&[(Role::User, "{{\"k\": {v}}}")]);
        assert_eq!(t.input_variables(), ["v"]);
        let msgs = t.format_messages(&values(&[("v", "1")])).unwrap();
        assert_eq!(msgs[0].content, "{\"k\": 1}");
    }

    #[test]
    fn json_values_are_not_reinterpreted() {
        let t = ChatPromptTemplate::from_messages(&[(Role::User, "{json_str}")]);
        let raw = "{\"name\": \"{not_a_var}\"}";
        let msgs = t.format_messages(&values(&[("json_str", raw)])).unwrap();
        assert_eq!(msgs[0].content, raw);
    }

    #[test]
    fn stray_brace_is_text() {
        let t = ChatPromptTemplate::from_messages(&[(Role::User, "a { b } c {")]);
        assert!(t.input_variables().is_empty());
        let msgs = t.format_messages(&BTreeMap::new()).unwrap();
        assert_eq!(msgs[0].content, "a { b } c {");
    }

    #[test]
    fn missing_value_is_error() {
        let t = ChatPromptTemplate::from_messages(&[(Role::User, "{x}")]);
        let err = t.format_messages(&BTreeMap::new()).unwrap_err();
        assert!(matches!(err, PromptError::MissingVariable(ref v) if v == "x"));
    }

    #[test]
    fn row_prompt_variables() {
        assert_eq!(
            row_summary_prompt().input_variables(),
            ["description", "json_str", "name"]
        );
    }

    #[test]
    fn layer_prompt_has_single_variable() {
        let prompt = layer_summary_prompt();
        assert_eq!(prompt.input_variables(), ["summaries"]);
        let msgs = prompt
            .format_messages(&values(&[("summaries", "<layer_summary>\n\n</layer_summary>")]))
            .unwrap();
        assert_eq!(msgs[0].role, Role::System);
        assert_eq!(msgs[1].content, "<layer_summary>\n\n</layer_summary>");
    }
}
