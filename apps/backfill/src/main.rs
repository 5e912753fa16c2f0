mod agent;
mod config;
mod errors;
mod llm_client;
mod models;
mod processor;
mod prompting;
mod retrieval;
mod table;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::agent::{Agent, ClaudeAgent, StubAgent};
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::processor::{run, BatchProcessor, Enrichment, RunOptions, WriteMode};
use crate::prompting::{load_template, ColumnRef, PromptSource};
use crate::retrieval::{
    KnowledgeBaseRetriever, Retriever, StubRetriever, DEFAULT_KNOWLEDGE_BASE, DEFAULT_TOP_K,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AgentKind {
    /// Anthropic Messages API (needs ANTHROPIC_API_KEY)
    Claude,
    /// Placeholder predictions, no network
    Stub,
}

#[derive(Debug, Parser)]
#[command(name = "backfill")]
#[command(
    version,
    about = "Fill a CSV of products with model responses, one row at a time",
    long_about = None
)]
struct Cli {
    /// Input CSV file (first row is the header)
    input: PathBuf,

    /// Output CSV file; defaults to overwriting the input
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Process only this 0-based row
    #[arg(short, long)]
    row: Option<usize>,

    /// System instruction sent with every request
    #[arg(short, long)]
    system: Option<String>,

    /// JSON prompt template; renders each row into the template
    #[arg(short, long, conflicts_with = "product")]
    template: Option<PathBuf>,

    /// Build a dimension/weight request from name, description and category
    #[arg(long)]
    product: bool,

    /// Column holding the prompt in raw mode, by name or 0-based index
    #[arg(long, default_value = "0")]
    prompt_column: ColumnRef,

    /// Append similar reference products to each prompt
    #[arg(long)]
    enrich: bool,

    /// Maximum number of reference products per prompt
    #[arg(long, requires = "enrich", default_value_t = DEFAULT_TOP_K)]
    top_k: usize,

    /// Knowledge base of reference products; the built-in examples are used when omitted
    #[arg(long, requires = "enrich", num_args = 0..=1, default_missing_value = DEFAULT_KNOWLEDGE_BASE)]
    knowledge_base: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = AgentKind::Claude)]
    agent: AgentKind,

    /// Rewrite the output after every row instead of once at the end
    #[arg(long)]
    flush_each_row: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting backfill v{}", env!("CARGO_PKG_VERSION"));

    // Everything that can fail at startup fails here, before the table is read
    let agent: Arc<dyn Agent> = match cli.agent {
        AgentKind::Claude => {
            let llm = LlmClient::new(&config)?;
            info!("LLM client initialized (model: {})", llm.model());
            Arc::new(ClaudeAgent(llm))
        }
        AgentKind::Stub => Arc::new(StubAgent::default()),
    };

    let source = if let Some(path) = &cli.template {
        let template = load_template(path)
            .with_context(|| format!("Failed to load template {}", path.display()))?;
        PromptSource::Templated(template)
    } else if cli.product {
        PromptSource::Product
    } else {
        PromptSource::Raw {
            column: cli.prompt_column.clone(),
        }
    };

    let mut processor = BatchProcessor::new(agent, source).with_system(cli.system.clone());

    if cli.enrich {
        let retriever: Arc<dyn Retriever> = match &cli.knowledge_base {
            Some(path) => Arc::new(KnowledgeBaseRetriever::load(path)),
            None => Arc::new(StubRetriever::default()),
        };
        processor = processor.with_enrichment(Enrichment {
            retriever,
            top_k: cli.top_k,
        });
    }

    let options = RunOptions {
        input: cli.input.clone(),
        output: cli.output.clone(),
        target_row: cli.row,
        write_mode: if cli.flush_each_row {
            WriteMode::EachRow
        } else {
            WriteMode::AtEnd
        },
    };

    run(&processor, &options)
        .await
        .with_context(|| format!("Failed to process {}", cli.input.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["backfill", "prompts.csv"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("prompts.csv"));
        assert_eq!(cli.prompt_column, ColumnRef::Index(0));
        assert_eq!(cli.agent, AgentKind::Claude);
        assert_eq!(cli.top_k, DEFAULT_TOP_K);
        assert!(cli.output.is_none() && cli.row.is_none());
        assert!(!cli.flush_each_row);
    }

    #[test]
    fn test_cli_full_options() {
        let cli = Cli::try_parse_from([
            "backfill",
            "products.csv",
            "--output",
            "out.csv",
            "--row",
            "2",
            "--system",
            "Be concise",
            "--product",
            "--enrich",
            "--top-k",
            "3",
            "--knowledge-base",
            "--agent",
            "stub",
            "--flush-each-row",
        ])
        .unwrap();
        assert_eq!(cli.row, Some(2));
        assert_eq!(cli.system.as_deref(), Some("Be concise"));
        assert!(cli.product && cli.enrich && cli.flush_each_row);
        assert_eq!(cli.top_k, 3);
        assert_eq!(
            cli.knowledge_base,
            Some(PathBuf::from(DEFAULT_KNOWLEDGE_BASE))
        );
        assert_eq!(cli.agent, AgentKind::Stub);
    }

    #[test]
    fn test_cli_template_conflicts_with_product() {
        let result =
            Cli::try_parse_from(["backfill", "p.csv", "--template", "t.json", "--product"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_prompt_column_by_name() {
        let cli = Cli::try_parse_from(["backfill", "p.csv", "--prompt-column", "question"]).unwrap();
        assert_eq!(cli.prompt_column, ColumnRef::Name("question".to_string()));
    }

    #[test]
    fn test_cli_enrichment_options_require_enrich() {
        for args in [
            ["backfill", "p.csv", "--top-k", "3"].as_slice(),
            ["backfill", "p.csv", "--knowledge-base"].as_slice(),
        ] {
            let err = Cli::try_parse_from(args).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
        }
        let cli = Cli::try_parse_from(["backfill", "p.csv", "--enrich", "--top-k", "3"]).unwrap();
        assert_eq!(cli.top_k, 3);
    }
}
