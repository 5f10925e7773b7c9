//! Prompt → model → text chains.
//!
//! A chain renders its [`ChatPromptTemplate`] from a [`ChainInput`], submits the
//! resulting messages to its provider and wraps the reply as a [`ChainOutput`].
//! Every operation exists in a suspending (`async`) and a thread-blocking form;
//! both share the same rendering and produce the same result.

mod layer;
mod row;

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Instant;

use arcsum_llm::{LlmError, LlmProvider, Message};
use serde::{Deserialize, Serialize};
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::Instrument;

use crate::prompt::{ChatPromptTemplate, PromptError};

pub use layer::{LAYER_INPUT_KEY, LayerSummaryChain};
pub use row::{RowSummaryChain, RowSummaryInput};

/// Named string fields fed to a prompt template.
pub type ChainInput = BTreeMap<String, String>;

/// Key under which a chain reports the model's text.
pub const OUTPUT_KEY: &str = "text";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainOutput {
    pub text: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error("chain input is missing key '{key}'")]
    MissingInput { key: String },

    #[error("chain expects {expected} input keys, `run` needs exactly one")]
    NotSingleInput { expected: usize },

    #[error("provider returned {actual} results for a batch of {expected}")]
    BatchLength { expected: usize, actual: usize },

    #[error("blocking call made from inside a current-thread async runtime")]
    BlockingInAsyncContext,

    #[error("failed to start runtime for blocking call: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Shared behaviour of the row and layer chains.
pub trait Chain: Send + Sync {
    type Provider: LlmProvider;

    fn provider(&self) -> &Self::Provider;

    fn prompt(&self) -> &ChatPromptTemplate;

    /// Stable identifier used as the tracing span name.
    fn chain_type(&self) -> &'static str;

    fn input_keys(&self) -> &[String] {
        self.prompt().input_variables()
    }

    fn output_keys(&self) -> [&'static str; 1] {
        [OUTPUT_KEY]
    }

    /// Validate `input` against [`Chain::input_keys`] and render the prompt.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::MissingInput`] for the first absent key.
    fn prepare(&self, input: &ChainInput) -> Result<Vec<Message>, ChainError> {
        if let Some(key) = self.input_keys().iter().find(|k| !input.contains_key(*k)) {
            return Err(ChainError::MissingInput { key: key.clone() });
        }
        Ok(self.prompt().format_messages(input)?)
    }

    /// Render `input` and make one model call.
    ///
    /// # Errors
    ///
    /// Input validation errors, or the provider error unchanged.
    fn invoke(
        &self,
        input: &ChainInput,
    ) -> impl Future<Output = Result<ChainOutput, ChainError>> + Send {
        async move {
            let messages = self.prepare(input)?;
            let span = tracing::debug_span!("chain", chain_type = self.chain_type());
            let started = Instant::now();
            let text = self.provider().chat(&messages).instrument(span).await?;
            tracing::debug!(
                chain_type = self.chain_type(),
                provider = self.provider().name(),
                elapsed = ?started.elapsed(),
                "chain call finished"
            );
            Ok(ChainOutput { text })
        }
    }

    /// Blocking form of [`Chain::invoke`].
    ///
    /// # Errors
    ///
    /// Same as [`Chain::invoke`], plus the errors of [`block_on`].
    fn invoke_blocking(&self, input: &ChainInput) -> Result<ChainOutput, ChainError> {
        block_on(self.invoke(input))?
    }

    /// Render every input and submit them as one batch; outputs follow input order.
    ///
    /// All inputs are validated before anything is sent to the model.
    ///
    /// # Errors
    ///
    /// The first validation error, or the provider error unchanged.
    fn apply(
        &self,
        inputs: &[ChainInput],
    ) -> impl Future<Output = Result<Vec<ChainOutput>, ChainError>> + Send {
        async move {
            let prompts = inputs
                .iter()
                .map(|input| self.prepare(input))
                .collect::<Result<Vec<_>, _>>()?;
            if prompts.is_empty() {
                return Ok(Vec::new());
            }

            let span = tracing::debug_span!(
                "chain_batch",
                chain_type = self.chain_type(),
                size = prompts.len()
            );
            let started = Instant::now();
            let texts = self.provider().chat_batch(&prompts).instrument(span).await?;
            if texts.len() != prompts.len() {
                return Err(ChainError::BatchLength {
                    expected: prompts.len(),
                    actual: texts.len(),
                });
            }
            tracing::debug!(
                chain_type = self.chain_type(),
                provider = self.provider().name(),
                size = texts.len(),
                elapsed = ?started.elapsed(),
                "chain batch finished"
            );
            Ok(texts.into_iter().map(|text| ChainOutput { text }).collect())
        }
    }

    /// Blocking form of [`Chain::apply`].
    ///
    /// # Errors
    ///
    /// Same as [`Chain::apply`], plus the errors of [`block_on`].
    fn apply_blocking(&self, inputs: &[ChainInput]) -> Result<Vec<ChainOutput>, ChainError> {
        block_on(self.apply(inputs))?
    }

    /// Invoke a single-input chain with a bare string and return the text.
    ///
    /// # Errors
    ///
    /// [`ChainError::NotSingleInput`] if the prompt has more or fewer than one variable.
    fn run(&self, input: &str) -> impl Future<Output = Result<String, ChainError>> + Send {
        async move {
            let [key] = self.input_keys() else {
                return Err(ChainError::NotSingleInput {
                    expected: self.input_keys().len(),
                });
            };
            let input = ChainInput::from([(key.clone(), input.to_owned())]);
            Ok(self.invoke(&input).await?.text)
        }
    }

    /// Blocking form of [`Chain::run`].
    ///
    /// # Errors
    ///
    /// Same as [`Chain::run`], plus the errors of [`block_on`].
    fn run_blocking(&self, input: &str) -> Result<String, ChainError> {
        block_on(self.run(input))?
    }
}

/// Drive `future` to completion on the calling thread.
///
/// Inside a multi-thread tokio runtime the worker is handed off with
/// `block_in_place`; outside any runtime a current-thread runtime is built for
/// the call.
///
/// # Errors
///
/// [`ChainError::BlockingInAsyncContext`] when called from a current-thread
/// runtime, where blocking would deadlock, and [`ChainError::Runtime`] if a
/// runtime cannot be created.
pub fn block_on<F: Future>(future: F) -> Result<F::Output, ChainError> {
    match Handle::try_current() {
        Ok(handle) => match handle.runtime_flavor() {
            RuntimeFlavor::CurrentThread => Err(ChainError::BlockingInAsyncContext),
            _ => Ok(tokio::task::block_in_place(|| handle.block_on(future))),
        },
        Err(_) => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(ChainError::Runtime)?;
            Ok(runtime.block_on(future))
        }
    }
}
