pub mod config;
pub mod logging;
pub mod model;
pub mod search;
pub mod storage;

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use tracing::{debug, info};

use config::SearchConfig;
use search::api::{SearchRequest, SearchResponse};
use search::embedder_registry::EmbedderRegistry;
use search::engine::{SearchEngine, SearchError};
use search::semantic::EmbeddingScorer;

/// Command-line interface.
#[derive(Parser, Debug)]
#[command(
    name = "case-search",
    version,
    about = "Ranked search over legal case documents, semantic first with keyword fallback"
)]
pub struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Override data dir (holds the default model directory)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search the corpus and print a JSON response
    Search(SearchArgs),
    /// List registered embedders and whether their model files are present
    Models {
        /// Override the model root directory
        #[arg(long)]
        model_dir: Option<PathBuf>,

        /// Pretty-print JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Generate shell completions to stdout
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate man page to stdout
    Man,
}

#[derive(Args, Debug, Default)]
pub struct SearchArgs {
    /// Query text
    #[arg(required_unless_present = "stdin", conflicts_with = "stdin")]
    pub query: Option<String>,

    /// Read the request from stdin (JSON object or plain text)
    #[arg(long)]
    pub stdin: bool,

    /// Maximum number of results
    #[arg(long, short = 'k', alias = "top_k")]
    pub top_k: Option<usize>,

    /// Minimum similarity for semantic results
    #[arg(long, alias = "min_score", allow_negative_numbers = true)]
    pub min_score: Option<f32>,

    /// Embedder name (`minilm`, `hash`, or `none`)
    #[arg(long)]
    pub model: Option<String>,

    /// Override the model root directory
    #[arg(long)]
    pub model_dir: Option<PathBuf>,

    /// JSON corpus file
    #[arg(long)]
    pub corpus: Option<PathBuf>,

    /// SQLite database with a legal_resources table
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Skip the embedding model entirely
    #[arg(long)]
    pub keyword_only: bool,

    /// Pretty-print JSON
    #[arg(long)]
    pub pretty: bool,
}

impl SearchArgs {
    fn apply_to(&self, config: &mut SearchConfig) {
        if let Some(top_k) = self.top_k {
            config.top_k = top_k;
        }
        if let Some(min_score) = self.min_score {
            config.min_score = min_score;
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if self.keyword_only {
            config.model = config::MODEL_DISABLED.to_string();
        }
        if self.model_dir.is_some() {
            config.model_dir = self.model_dir.clone();
        }
        if self.corpus.is_some() {
            config.corpus_path = self.corpus.clone();
        }
        if self.db.is_some() {
            config.db_path = self.db.clone();
        }
    }
}

pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = SearchConfig::load(cli.config.as_deref())?;
    if cli.log_file.is_some() {
        config.log_file = cli.log_file.clone();
    }
    let data_dir = cli.data_dir.clone().unwrap_or_else(default_data_dir);

    match cli.command {
        Commands::Search(args) => {
            args.apply_to(&mut config);
            let _guard = logging::init_logging(config.log_file.as_deref());
            run_search(&args, &config, &data_dir)
        }
        Commands::Models { model_dir, pretty } => {
            if model_dir.is_some() {
                config.model_dir = model_dir;
            }
            let _guard = logging::init_logging(config.log_file.as_deref());
            let registry = EmbedderRegistry::new(&config.model_root(&data_dir));
            let status = registry.status();
            let body = if pretty {
                serde_json::to_string_pretty(&status)?
            } else {
                serde_json::to_string(&status)?
            };
            println!("{body}");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "case-search", &mut std::io::stdout());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Man => {
            let cmd = Cli::command();
            let man = clap_mangen::Man::new(cmd);
            let mut out = std::io::stdout();
            man.render(&mut out)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_search(args: &SearchArgs, config: &SearchConfig, data_dir: &Path) -> Result<ExitCode> {
    let defaults = SearchRequest::new(String::new(), config.top_k, config.min_score);
    let request = if args.stdin {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("reading request from stdin")?;
        SearchRequest::from_stdin(&input, &defaults)
    } else {
        Ok(SearchRequest {
            query: args.query.clone().unwrap_or_default(),
            ..defaults
        })
    };

    let response = match request {
        Ok(request) if !request.query.trim().is_empty() => {
            let engine = build_engine(config, data_dir);
            let result = engine.search(&request.query, request.top_k, request.min_score);
            SearchResponse::from_result(result, &request.query)
        }
        Ok(request) => SearchResponse::from_result(Err(SearchError::InvalidQuery), &request.query),
        Err(e) => SearchResponse::error(e.to_string(), None),
    };

    emit(&response, args.pretty)?;
    Ok(if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Load the configured corpus and, unless disabled, the embedding model.
pub fn build_engine(config: &SearchConfig, data_dir: &Path) -> SearchEngine {
    let corpus = storage::load_configured_corpus(config);

    let engine = if config.semantic_enabled() {
        let registry = EmbedderRegistry::new(&config.model_root(data_dir));
        let scorer = EmbeddingScorer::initialize(&registry, &config.model);
        SearchEngine::from_initialization(corpus, scorer)
    } else {
        debug!("embedding model disabled");
        SearchEngine::keyword_only(corpus)
    };

    info!(
        documents = engine.corpus().len(),
        source = engine.corpus().source().unwrap_or("none"),
        semantic = engine.semantic_ready(),
        "search engine ready"
    );
    engine.with_summary_chars(config.summary_chars)
}

/// Write a response as one JSON document on stdout.
pub fn emit(response: &SearchResponse, pretty: bool) -> Result<()> {
    let body = response.to_json(pretty)?;
    let mut out = std::io::stdout().lock();
    writeln!(out, "{body}")?;
    out.flush()?;
    Ok(())
}

pub fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "case-search", "case-search")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".case-search"))
}
