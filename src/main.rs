//! jdm-infer CLI: two-hop relation inference over JeuxDeMots.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use jdm_infer::config::JdmConfig;
use jdm_infer::graph::cache::{ResponseCache, max_age_from_days};
use jdm_infer::graph::memory::MemoryGraph;
use jdm_infer::graph::remote::JdmClient;
use jdm_infer::graph::{GraphAccessor, Node, NodeId, RelationType};
use jdm_infer::infer::Query;
use jdm_infer::infer::engine::InferEngine;
use jdm_infer::paths::JdmPaths;

#[derive(Parser)]
#[command(
    name = "jdm-infer",
    version,
    about = "Relation inference over the JeuxDeMots lexical network"
)]
struct Cli {
    /// Config file (defaults to $XDG_CONFIG_HOME/jdm-infer/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JDM API base URL.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Pattern catalog JSON file.
    #[arg(long, global = true)]
    patterns: Option<PathBuf>,

    /// Bypass the disk response cache.
    #[arg(long, global = true)]
    no_cache: bool,

    /// Answer from a JSON graph fixture instead of the API.
    #[arg(long, global = true)]
    fixture: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Infer whether `word1 relation word2` holds.
    Query {
        word1: String,
        relation: String,
        /// Second word; several arguments are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        word2: Vec<String>,

        /// Print the structured outcome as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Read `word1 relation word2` queries from stdin until `exit`.
    Repl,

    /// Show a node (by name or numeric id).
    Node { name_or_id: String },

    /// List the refinements (word senses) of a term.
    Refinements { term: String },

    /// List relation types.
    Relations,

    /// List node types.
    NodeTypes,

    /// Manage the disk response cache.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Inspect or create the config file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the default config file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration.
    Show,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Remove stale, unreadable and muted responses.
    Prune {
        /// Maximum age in days (defaults to the configured value).
        #[arg(long)]
        max_age_days: Option<u64>,
    },
}

/// Where lookups are answered from.
enum Backend {
    Remote(Arc<JdmClient>),
    Fixture(Arc<MemoryGraph>),
}

impl Backend {
    fn open(cli: &Cli, config: &JdmConfig, paths: &JdmPaths) -> Result<Self> {
        if let Some(fixture) = &cli.fixture {
            let graph = MemoryGraph::load(fixture)?;
            tracing::info!(
                fixture = %fixture.display(),
                nodes = graph.node_count(),
                "loaded graph fixture"
            );
            return Ok(Backend::Fixture(Arc::new(graph)));
        }
        let client = JdmClient::new(config.client_config(paths))?;
        Ok(Backend::Remote(Arc::new(client)))
    }

    fn accessor(&self) -> Arc<dyn GraphAccessor> {
        match self {
            Backend::Remote(client) => client.clone(),
            Backend::Fixture(graph) => graph.clone(),
        }
    }

    fn node(&self, name_or_id: &str) -> Option<Node> {
        if let Ok(id) = name_or_id.parse::<i64>() {
            return self.accessor().node_by_id(NodeId(id));
        }
        match self {
            Backend::Remote(client) => client.node_by_name(name_or_id),
            Backend::Fixture(graph) => graph.node_by_name(name_or_id),
        }
    }

    fn relation_types(&self) -> Vec<RelationType> {
        match self {
            Backend::Remote(client) => client.relation_types(),
            Backend::Fixture(graph) => graph.relation_types(),
        }
    }
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = JdmPaths::resolve()?;
    let config_path = cli.config.clone().unwrap_or_else(|| paths.config_file());
    let mut config = JdmConfig::load_or_default(&config_path)?;
    if let Some(url) = &cli.base_url {
        config.api.base_url = url.clone();
    }
    if let Some(patterns) = &cli.patterns {
        config.catalog.file = Some(patterns.clone());
    }
    if cli.no_cache {
        config.cache.enabled = false;
    }
    config.validate()?;

    match &cli.command {
        Commands::Query {
            word1,
            relation,
            word2,
            json,
        } => {
            let engine = build_engine(&cli, &config, &paths)?;
            let outcome = engine.run(word1, relation, &word2.join(" "));
            if *json {
                let text = serde_json::to_string_pretty(&outcome).into_diagnostic()?;
                println!("{text}");
            } else {
                for line in outcome.lines() {
                    println!("{line}");
                }
            }
        }

        Commands::Repl => {
            let engine = build_engine(&cli, &config, &paths)?;
            repl(&engine)?;
        }

        Commands::Node { name_or_id } => {
            let backend = Backend::open(&cli, &config, &paths)?;
            match backend.node(name_or_id) {
                Some(node) => {
                    let text = serde_json::to_string_pretty(&node).into_diagnostic()?;
                    println!("{text}");
                }
                None => println!("Node '{name_or_id}' not found."),
            }
        }

        Commands::Refinements { term } => {
            let backend = Backend::open(&cli, &config, &paths)?;
            let Backend::Remote(client) = &backend else {
                miette::bail!("refinements are only available from the JDM API");
            };
            match client.refinements(term) {
                Some(nodes) if !nodes.is_empty() => {
                    for node in nodes {
                        println!("{}\t{}", node.id, node.name);
                    }
                }
                _ => println!("No refinements for '{term}'."),
            }
        }

        Commands::Relations => {
            let backend = Backend::open(&cli, &config, &paths)?;
            let types = backend.relation_types();
            if types.is_empty() {
                println!("No relation types available.");
            }
            for rt in types {
                match &rt.display_name {
                    Some(display) => println!("{}\t{}\t{}", rt.id, rt.name, display),
                    None => println!("{}\t{}", rt.id, rt.name),
                }
            }
        }

        Commands::NodeTypes => {
            let backend = Backend::open(&cli, &config, &paths)?;
            let Backend::Remote(client) = &backend else {
                miette::bail!("node types are only available from the JDM API");
            };
            match client.node_types() {
                Some(types) => {
                    for nt in types {
                        println!("{}\t{}", nt.id, nt.name);
                    }
                }
                None => println!("No node types available."),
            }
        }

        Commands::Cache { action } => match action {
            CacheAction::Prune { max_age_days } => {
                let dir = config
                    .cache
                    .dir
                    .clone()
                    .unwrap_or_else(|| paths.responses_dir());
                let cache = ResponseCache::open(dir)?;
                let days = max_age_days.unwrap_or(config.cache.max_age_days);
                let removed = cache.prune(max_age_from_days(days))?;
                println!(
                    "Removed {removed} cached responses from {}",
                    cache.dir().display()
                );
            }
        },

        Commands::Config { action } => match action {
            ConfigAction::Init { force } => {
                if config_path.exists() && !force {
                    miette::bail!(
                        "config file already exists: {} (use --force to overwrite)",
                        config_path.display()
                    );
                }
                paths.ensure_dirs()?;
                JdmConfig::default().save(&config_path)?;
                println!("Wrote default config to {}", config_path.display());
            }
            ConfigAction::Show => {
                let text = toml::to_string_pretty(&config).into_diagnostic()?;
                print!("{text}");
            }
        },
    }

    Ok(())
}

fn build_engine(cli: &Cli, config: &JdmConfig, paths: &JdmPaths) -> Result<InferEngine> {
    let backend = Backend::open(cli, config, paths)?;
    let catalog = config.load_catalog()?;
    Ok(InferEngine::new(
        backend.accessor(),
        catalog,
        config.inference.clone(),
    ))
}

fn repl(engine: &InferEngine) -> Result<()> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    println!("Enter queries as `word1 relation word2`, `exit` to quit.");

    loop {
        print!(">>> ");
        stdout.flush().into_diagnostic()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).into_diagnostic()? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        let Some(query) = Query::parse(line) else {
            println!("Expected `word1 relation word2`, got: {line}");
            continue;
        };
        for out in engine.infer(&query.word1, &query.relation, &query.word2) {
            println!("{out}");
        }
    }
    Ok(())
}
