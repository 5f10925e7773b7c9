use super::{Config, Secret};

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("ARCSUM_LLM_PROVIDER") {
            if let Ok(kind) = serde_json::from_value(serde_json::Value::String(v.clone())) {
                self.llm.provider = kind;
            } else {
                tracing::warn!("ignoring invalid ARCSUM_LLM_PROVIDER value: {v}");
            }
        }
        if let Ok(v) = std::env::var("ARCSUM_LLM_BASE_URL") {
            self.llm.base_url = Some(v);
        }
        if let Ok(v) = std::env::var("ARCSUM_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("ARCSUM_LLM_MAX_TOKENS") {
            if let Ok(n) = v.parse::<u32>() {
                self.llm.max_tokens = n;
            } else {
                tracing::warn!("ignoring invalid ARCSUM_LLM_MAX_TOKENS value: {v}");
            }
        }
        if let Ok(v) = std::env::var("ARCSUM_LLM_TIMEOUT") {
            if let Ok(n) = v.parse::<u64>() {
                self.llm.timeout_secs = n;
            } else {
                tracing::warn!("ignoring invalid ARCSUM_LLM_TIMEOUT value: {v}");
            }
        }
        if let Ok(v) = std::env::var("ARCSUM_MAX_ROWS") {
            if let Ok(n) = v.parse::<usize>() {
                self.summarize.max_rows = Some(n);
            } else {
                tracing::warn!("ignoring invalid ARCSUM_MAX_ROWS value: {v}");
            }
        }
    }

    pub(crate) fn read_secrets(&mut self) {
        if let Some(key) = Secret::from_env("ARCSUM_CLAUDE_API_KEY") {
            self.secrets.claude_api_key = Some(key);
        }
        if let Some(key) = Secret::from_env("ARCSUM_OPENAI_API_KEY") {
            self.secrets.openai_api_key = Some(key);
        }
    }
}
