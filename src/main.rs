//! Waypoint command-line entrypoint.

use std::sync::Arc;

use anyhow::{Context, bail};
use mimalloc::MiMalloc;

use waypoint::config::Config;
use waypoint::embedding::{E5Embedder, EmbeddingError, LazyModel, Reranker, RerankerError};
use waypoint::retrieval::Retriever;
use waypoint::vectordb::{DEFAULT_SAMPLE_SIZE, QdrantIndex, inspect_store};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

type EmbedHandle = LazyModel<E5Embedder, EmbeddingError>;
type RerankHandle = LazyModel<Reranker, RerankerError>;

const USAGE: &str = "usage:
  waypoint search <query> [--airline <name>]
  waypoint check-store [--sample <n>]
  waypoint warmup";

#[derive(Debug, PartialEq)]
enum Command {
    Search {
        query: String,
        airline: Option<String>,
    },
    CheckStore {
        sample: usize,
    },
    Warmup,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Command> {
    let Some(command) = args.next() else {
        bail!("missing command\n{USAGE}");
    };

    match command.as_str() {
        "search" => {
            let mut query_parts = Vec::new();
            let mut airline = None;
            while let Some(arg) = args.next() {
                if arg == "--airline" {
                    airline = Some(args.next().context("--airline requires a value")?);
                } else {
                    query_parts.push(arg);
                }
            }
            if query_parts.is_empty() {
                bail!("search requires a query\n{USAGE}");
            }
            Ok(Command::Search {
                query: query_parts.join(" "),
                airline,
            })
        }
        "check-store" => {
            let mut sample = DEFAULT_SAMPLE_SIZE;
            while let Some(arg) = args.next() {
                if arg == "--sample" {
                    let value = args.next().context("--sample requires a value")?;
                    sample = value
                        .parse()
                        .with_context(|| format!("invalid --sample value '{value}'"))?;
                } else {
                    bail!("unexpected argument '{arg}'\n{USAGE}");
                }
            }
            Ok(Command::CheckStore { sample })
        }
        "warmup" => Ok(Command::Warmup),
        other => bail!("unknown command '{other}'\n{USAGE}"),
    }
}

fn build_retriever(
    config: &Config,
    index: Arc<QdrantIndex>,
) -> anyhow::Result<Retriever<EmbedHandle, RerankHandle, QdrantIndex>> {
    let encoder_config = config.encoder_config();
    if encoder_config.is_stub() {
        tracing::warn!("No WAYPOINT_EMBED_MODEL_PATH configured, running embedder in stub mode");
    }
    let embedder = Arc::new(LazyModel::new("embedder", move || {
        E5Embedder::load(encoder_config.clone())
    }));

    let reranker_config = config.reranker_config();
    if reranker_config.model_path.is_none() {
        tracing::warn!("No WAYPOINT_RERANKER_PATH configured, running reranker in stub mode");
    }
    let reranker = Arc::new(LazyModel::new("reranker", move || {
        Reranker::load(reranker_config.clone())
    }));

    Ok(Retriever::new(
        embedder,
        reranker,
        index,
        config.retriever_config(),
    )?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let command = parse_args(std::env::args().skip(1))?;

    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!(
        qdrant_url = %config.qdrant_url,
        collection = %config.collection,
        embed_model = %config.embed_model_id,
        reranker_model = %config.reranker_model_id,
        "Waypoint starting"
    );

    let index = Arc::new(QdrantIndex::new(&config.qdrant_url)?);

    match command {
        Command::Search { query, airline } => {
            let retriever = build_retriever(&config, index)?;
            retriever.warmup().await;
            let outcome = retriever.search(&query, airline.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::CheckStore { sample } => {
            let report = inspect_store(index.as_ref(), &config.collection, sample).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if report.is_empty() {
                bail!("vector store '{}' is empty", config.collection);
            }
        }
        Command::Warmup => {
            let retriever = build_retriever(&config, index)?;
            let report = retriever.warmup().await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
