//! qaroute CLI - answer known questions from a curated list.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use qaroute_core::{KnowledgeBase, ResolveError, RouterConfig};
use qaroute_knowledge::{embed_all, HfEmbeddingClient, Resolver, SimilarityMatrix};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Probes used by `diagnose` when none are given: close paraphrases plus
/// unrelated questions that share vocabulary with the curated ones.
const DEFAULT_PROBES: &[&str] = &[
    "What does EVA do?",
    "How does PHIL work?",
    "Thoughtful AI",
    "Who is the CEO of Thoughtful AI?",
    "How much does Thoughtful AI pay for its ML engineers?",
    "What's Evangelion (EVA)?",
];

#[derive(Parser)]
#[command(name = "qaroute")]
#[command(about = "Route questions to curated answers before falling back to a general model", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Curated questions file (overrides config)
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    /// Minimum score (exclusive) for using a curated answer
    #[arg(long, global = true)]
    cutoff: Option<f64>,

    /// Load the curated questions once per process
    #[arg(long, global = true)]
    cache: bool,

    /// Inference request timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a question from the curated list, if one matches
    Ask {
        /// Question text
        question: String,
    },
    /// Print the curated questions and answers
    List,
    /// Inspect embeddings and resolution outcomes for probe questions
    Diagnose {
        /// Extra probe question (repeatable)
        #[arg(long = "probe")]
        probes: Vec<String>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // stdout carries answers only
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(cli: &Cli) -> Result<RouterConfig> {
    let base = match &cli.config {
        Some(path) => RouterConfig::from_file(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => RouterConfig::default(),
    };

    let mut config = base.from_env();

    if let Some(source) = &cli.source {
        config.knowledge_path = source.clone();
    }
    if let Some(cutoff) = cli.cutoff {
        config.cutoff = cutoff;
    }
    if cli.cache {
        config.cache_knowledge = true;
    }
    if let Some(ms) = cli.timeout_ms {
        config.classifier.timeout_ms = ms;
        config.embedding.timeout_ms = ms;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = build_config(&cli)?;
    let resolver = Resolver::from_config(&config);

    match cli.command {
        Commands::Ask { question } => {
            match resolver.resolve_default(&question).await {
                Ok(Some(answer)) => println!("{}", answer),
                Ok(None) => {
                    info!("No curated answer; caller should fall back");
                    println!("No confident match among curated questions.");
                }
                Err(err) => {
                    return Err(err).context("Failed to resolve question");
                }
            }
        }
        Commands::List => {
            let kb = resolver
                .knowledge()
                .await
                .with_context(|| format!("Failed to load {}", config.knowledge_path.display()))?;
            print_knowledge(&kb);
        }
        Commands::Diagnose { probes } => {
            diagnose(&config, &resolver, probes).await?;
        }
    }

    Ok(())
}

fn print_knowledge(kb: &KnowledgeBase) {
    println!("Curated questions ({})", kb.len());
    for (question, answer) in kb.iter() {
        println!("  Q: {}", question);
        println!("  A: {}", answer);
    }
}

async fn diagnose(config: &RouterConfig, resolver: &Resolver, probes: Vec<String>) -> Result<()> {
    let kb = resolver
        .knowledge()
        .await
        .with_context(|| format!("Failed to load {}", config.knowledge_path.display()))?;
    print_knowledge(&kb);

    let known = kb.labels();
    let probes: Vec<String> = if probes.is_empty() {
        DEFAULT_PROBES.iter().map(|p| p.to_string()).collect()
    } else {
        probes
    };

    let embedder = HfEmbeddingClient::new(&config.embedding);
    match embed_all(&embedder, &known).await {
        Ok(known_vectors) => {
            let probe_vectors = embed_all(&embedder, &probes)
                .await
                .context("Failed to embed probe questions")?;

            println!();
            println!("Embedding dimensions");
            let texts = known.iter().chain(&probes);
            let vectors = known_vectors.iter().chain(&probe_vectors);
            for (text, vector) in texts.zip(vectors) {
                println!("  {:>5}  {}", vector.dimension(), text);
            }

            let matrix = SimilarityMatrix::cosine(&probes, &probe_vectors, &known, &known_vectors);
            println!();
            println!("Nearest curated question (cosine)");
            for (row, probe) in probes.iter().enumerate() {
                if let Some((nearest, score)) = matrix.nearest(row) {
                    println!("  {:.3}  {} -> {}", score, probe, nearest);
                }
            }
        }
        Err(err) => warn!("Skipping embedding diagnostics: {}", err),
    }

    println!();
    println!("Resolution (cutoff {:.2})", resolver.cutoff());
    for question in known.iter().chain(&probes) {
        println!("  question: {}", question);
        match resolver.resolve_detailed(question, resolver.cutoff()).await {
            Ok(resolution) => {
                if let Some(best) = &resolution.best {
                    println!("  best:     {} ({:.3})", best.label, best.score);
                }
                match &resolution.answer {
                    Some(answer) => println!("  answer:   {}", answer),
                    None => println!("  answer:   <fallback>"),
                }
            }
            Err(ResolveError::Timeout(after)) => println!("  error:    timed out after {:?}", after),
            Err(err) => println!("  error:    {}", err),
        }
        println!();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_build_config_precedence() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"knowledge_path": "from_file.json", "cutoff": 0.6, "classifier": {{"timeout_ms": 1500}}}}"#
        )
        .unwrap();
        let config_path = file.path().to_str().unwrap();

        std::env::set_var("QAROUTE_KNOWLEDGE_PATH", "from_env.json");
        std::env::set_var("QAROUTE_CUTOFF", "0.7");

        // Environment overrides the file
        let cli = Cli::try_parse_from(["qaroute", "--config", config_path, "list"]).unwrap();
        let config = build_config(&cli).unwrap();
        assert_eq!(config.knowledge_path, PathBuf::from("from_env.json"));
        assert_eq!(config.cutoff, 0.7);
        assert_eq!(config.classifier.timeout_ms, 1500);
        assert!(!config.cache_knowledge);

        // Flags override both
        let cli = Cli::try_parse_from([
            "qaroute",
            "--config",
            config_path,
            "--source",
            "from_flag.json",
            "--cutoff",
            "0.8",
            "--cache",
            "ask",
            "What does EVA do?",
        ])
        .unwrap();
        let config = build_config(&cli).unwrap();
        assert_eq!(config.knowledge_path, PathBuf::from("from_flag.json"));
        assert_eq!(config.cutoff, 0.8);
        assert!(config.cache_knowledge);
        assert_eq!(config.classifier.timeout_ms, 1500);

        // Invalid values are rejected after merging
        let cli = Cli::try_parse_from(["qaroute", "--timeout-ms", "0", "list"]).unwrap();
        assert!(build_config(&cli).is_err());

        std::env::remove_var("QAROUTE_KNOWLEDGE_PATH");
        std::env::remove_var("QAROUTE_CUTOFF");
    }
}
