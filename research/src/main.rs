mod error;
mod planner;
mod reporter;
mod researcher;
mod state;
mod workflow;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;

use clap::Parser;
use providers::llm::OpenAI;
use providers::retrieval::{LocalIndex, LocalRetriever, OpenAIEmbedder};
use providers::search::TavilySearch;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use workflow::Workflow;

#[derive(Parser)]
#[command(about = "Multi-step research pipeline: plan, search, synthesize")]
struct Args {
    /// Research topic
    topic: String,

    /// Extra notes (e.g. clarification answers) folded into the task before planning
    #[arg(long)]
    notes: Option<String>,

    /// Chat model for planning, routing, and report writing
    #[arg(long, default_value = "gpt-4o-mini")]
    model: String,

    /// Embedding model for local retrieval
    #[arg(long, default_value = "text-embedding-3-small")]
    embedding_model: String,

    /// JSON index of pre-embedded document chunks
    #[arg(long, default_value = "data/index.json")]
    index: std::path::PathBuf,

    /// Stop researching after this many steps even if the plan is longer
    #[arg(long)]
    max_steps: Option<usize>,

    /// Write the report to this file as well as stdout
    #[arg(long)]
    output: Option<std::path::PathBuf>,

    #[arg(long, env = "TAVILY_API_KEY", hide_env_values = true)]
    tavily_api_key: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let index = match LocalIndex::load(&args.index) {
        Ok(index) => index,
        Err(err) => {
            warn!(path = %args.index.display(), %err, "no local index, retrieval will return no results");
            LocalIndex::default()
        }
    };

    let llm = OpenAI::new(args.model);
    let embedder = OpenAIEmbedder::new(args.embedding_model);

    let mut builder = Workflow::builder()
        .llm(llm)
        .search(Box::new(TavilySearch::new(args.tavily_api_key)))
        .retrieval(Box::new(LocalRetriever::new(embedder, index, 3)));
    if let Some(max_steps) = args.max_steps {
        builder = builder.max_steps(max_steps);
    }
    let workflow = builder.build()?;

    let task = match args.notes {
        Some(notes) => format!("{}\n\nAdditional notes:\n{}", args.topic, notes),
        None => args.topic,
    };

    let state = workflow.run(task).await?;

    let report = state.report.unwrap_or_default();
    println!("{report}");

    if let Some(path) = args.output {
        std::fs::write(&path, &report)?;
    }

    Ok(())
}
