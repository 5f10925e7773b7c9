use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use arcsum_core::chain::{LayerSummaryChain, RowSummaryChain};
use arcsum_core::config::{Config, ProviderKind};
use arcsum_core::document::{Document, DocumentLoader, JsonlLoader, write_jsonl};
use arcsum_core::transform::{LayerSummarizer, RowSummaryTransformer, promote_summaries};
use arcsum_llm::LlmProvider;
use arcsum_llm::any::AnyProvider;
use arcsum_llm::claude::ClaudeProvider;
use arcsum_llm::http::build_client;
use arcsum_llm::ollama::OllamaProvider;
use arcsum_llm::openai::OpenAiProvider;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "arcsum", about = "Summarize ArcGIS feature rows and layers with an LLM")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(long, global = true, env = "ARCSUM_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replace each row's JSON attributes with a bullet-point summary
    Rows {
        /// JSONL file of row documents
        #[arg(long)]
        input: PathBuf,
        /// Output JSONL file; stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Summarize a layer from documents that already carry `metadata.summary`
    Layer {
        #[arg(long)]
        input: PathBuf,
        /// Output JSON file; stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Summarize rows, then the layer they belong to
    Run {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_subscriber();

    let config_path = resolve_config_path(cli.config.as_deref());
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    config.validate()?;

    let provider = create_provider(&config)?;
    if let AnyProvider::Ollama(ref ollama) = provider
        && let Err(e) = ollama.health_check().await
    {
        tracing::warn!("{e}");
    }
    tracing::info!(
        provider = provider.name(),
        model = %config.llm.model,
        "using LLM provider"
    );

    match cli.command {
        Command::Rows { input, output } => {
            let rows = load_rows(&input, config.summarize.max_rows).await?;
            let rows = summarize_rows(&provider, rows).await?;
            write_rows(output.as_deref(), &rows).await?;
        }
        Command::Layer { input, output } => {
            let docs = load_rows(&input, None).await?;
            let layer = summarize_layer(&provider, docs).await?;
            write_layer(output.as_deref(), &layer).await?;
        }
        Command::Run { input, output } => {
            let rows = load_rows(&input, config.summarize.max_rows).await?;
            let layer = run_pipeline(&provider, rows).await?;
            write_layer(output.as_deref(), &layer).await?;
        }
    }

    Ok(())
}

fn init_subscriber() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

/// `--config` (or `ARCSUM_CONFIG`, which clap folds into the same flag), then the default path.
fn resolve_config_path(flag: Option<&Path>) -> PathBuf {
    flag.map_or_else(|| PathBuf::from("config/default.toml"), Path::to_path_buf)
}

fn create_provider(config: &Config) -> anyhow::Result<AnyProvider> {
    let llm = &config.llm;
    match llm.provider {
        ProviderKind::Ollama => {
            let base_url = llm.effective_base_url().unwrap_or("http://localhost:11434");
            Ok(AnyProvider::Ollama(OllamaProvider::new(
                base_url,
                llm.model.clone(),
            )))
        }
        ProviderKind::Claude => {
            let client = build_client(Duration::from_secs(llm.timeout_secs))?;
            let api_key = config
                .secrets
                .claude_api_key
                .as_ref()
                .context("ARCSUM_CLAUDE_API_KEY not set")?
                .expose()
                .to_owned();
            let mut provider =
                ClaudeProvider::new(client, api_key, llm.model.clone(), llm.max_tokens);
            if let Some(url) = llm.effective_base_url() {
                provider = provider.with_api_url(url);
            }
            Ok(AnyProvider::Claude(provider))
        }
        ProviderKind::OpenAi => {
            let client = build_client(Duration::from_secs(llm.timeout_secs))?;
            let api_key = config
                .secrets
                .openai_api_key
                .as_ref()
                .context("ARCSUM_OPENAI_API_KEY not set")?
                .expose()
                .to_owned();
            let Some(base_url) = llm.effective_base_url() else {
                bail!("llm.base_url required for openai provider");
            };
            Ok(AnyProvider::OpenAi(OpenAiProvider::new(
                client,
                api_key,
                base_url.to_owned(),
                llm.model.clone(),
                llm.max_tokens,
            )))
        }
    }
}

async fn load_rows(path: &Path, max_rows: Option<usize>) -> anyhow::Result<Vec<Document>> {
    let mut docs = JsonlLoader::default()
        .load(path)
        .await
        .with_context(|| format!("failed to load documents from {}", path.display()))?;
    if let Some(max) = max_rows
        && docs.len() > max
    {
        tracing::info!(total = docs.len(), max, "truncating input rows");
        docs.truncate(max);
    }
    Ok(docs)
}

async fn summarize_rows<P: LlmProvider + Clone>(
    provider: &P,
    rows: Vec<Document>,
) -> anyhow::Result<Vec<Document>> {
    let transformer = RowSummaryTransformer::new(RowSummaryChain::new(provider.clone()));
    Ok(transformer.transform_documents(rows).await?)
}

async fn summarize_layer<P: LlmProvider + Clone>(
    provider: &P,
    docs: Vec<Document>,
) -> anyhow::Result<Document> {
    let summarizer = LayerSummarizer::new(LayerSummaryChain::new(provider.clone()));
    Ok(summarizer.transform_documents(docs).await?)
}

async fn run_pipeline<P: LlmProvider + Clone>(
    provider: &P,
    rows: Vec<Document>,
) -> anyhow::Result<Document> {
    let mut rows = summarize_rows(provider, rows).await?;
    promote_summaries(&mut rows);
    summarize_layer(provider, rows).await
}

async fn write_rows(output: Option<&Path>, rows: &[Document]) -> anyhow::Result<()> {
    if let Some(path) = output {
        write_jsonl(path, rows)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        return Ok(());
    }
    let mut stdout = std::io::stdout().lock();
    for doc in rows {
        serde_json::to_writer(&mut stdout, doc)?;
        writeln!(stdout)?;
    }
    Ok(())
}

async fn write_layer(output: Option<&Path>, layer: &Document) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(layer)?;
    if let Some(path) = output {
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
    } else {
        println!("{json}");
    }
    Ok(())
}
