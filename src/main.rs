use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use genealogy_graph::{
    config::Config,
    graph::GraphStore,
    loader::GraphLoader,
    query::QueryEngine,
    reports::{QueryReport, ReportGenerator},
    types::NodeId,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "genealogy-query")]
#[command(about = "Ancestry, common-ancestry and kinship-path queries over a genealogy graph")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Graph document ({"nodes": {...}, "edges": [...]})
    #[arg(short, long, default_value = "genealogy_graph.json")]
    graph: PathBuf,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// A person given either by id or by exact display name
#[derive(Args, Clone)]
struct PersonArg {
    /// Person id
    #[arg(long, conflicts_with = "name")]
    id: Option<NodeId>,

    /// Exact display name
    #[arg(long)]
    name: Option<String>,
}

/// Two people, each given by id or by exact display name
#[derive(Args, Clone)]
struct PairArgs {
    /// First person id
    #[arg(short = 'a', long, conflicts_with = "name_a")]
    a: Option<NodeId>,

    /// First person name
    #[arg(long)]
    name_a: Option<String>,

    /// Second person id
    #[arg(short = 'b', long, conflicts_with = "name_b")]
    b: Option<NodeId>,

    /// Second person name
    #[arg(long)]
    name_b: Option<String>,
}

#[derive(Args, Clone)]
struct OutputArgs {
    /// Output format (dot, json, text)
    #[arg(short, long, default_value = "dot")]
    format: String,

    /// Output file path (defaults to stdout)
    #[arg(short = 'o', long)]
    output_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ancestors of one person, with descendants when the family is small enough
    Ancestry {
        #[command(flatten)]
        person: PersonArg,

        /// Never add the descendant half
        #[arg(long)]
        parents_only: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Lineages connecting two people to their common ancestors
    Common {
        #[command(flatten)]
        pair: PairArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Closest common ancestor of two people
    Closest {
        #[command(flatten)]
        pair: PairArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Shortest kinship path between two people
    Path {
        #[command(flatten)]
        pair: PairArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Look up the ids carrying a display name
    Lookup {
        #[arg(short, long)]
        name: String,
    },

    /// Graph statistics and structural diagnostics
    Stats,

    /// Initialize configuration file
    Init {
        /// Configuration file path
        #[arg(long, default_value = "genealogy.yml")]
        config_file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level)?;

    let config = load_config(cli.config.as_ref()).await?;

    if let Commands::Init { config_file } = &cli.command {
        return init_config(config_file, &config).await;
    }

    let loader = GraphLoader::new(&cli.graph);
    let report = loader.load()?;
    let engine = QueryEngine::new(Arc::new(report.store), config.limits);
    let generator = ReportGenerator::new(config.render.clone());

    let outcome = match cli.command {
        Commands::Ancestry {
            person,
            parents_only,
            output,
        } => {
            let root = resolve_person(engine.store(), person.id, person.name.as_deref())?;
            let result = engine.ancestry(root, parents_only).map(QueryReport::from);
            render(&engine, &generator, result, &output).await
        }

        Commands::Common { pair, output } => {
            let (first, second) = resolve_pair(engine.store(), &pair)?;
            let result = engine
                .common_ancestry(first, second)
                .map(|edges| QueryReport::CommonAncestry { first, second, edges });
            render(&engine, &generator, result, &output).await
        }

        Commands::Closest { pair, output } => {
            let (first, second) = resolve_pair(engine.store(), &pair)?;
            let result = engine
                .closest_ancestor(first, second)
                .map(|ancestor| QueryReport::ClosestAncestor { first, second, ancestor });
            render(&engine, &generator, result, &output).await
        }

        Commands::Path { pair, output } => {
            let (first, second) = resolve_pair(engine.store(), &pair)?;
            let result = engine
                .shortest_path(first, second)
                .map(|path| QueryReport::Path { first, second, path });
            render(&engine, &generator, result, &output).await
        }

        Commands::Lookup { name } => {
            lookup(engine.store(), &name);
            Ok(())
        }

        Commands::Stats => {
            print_statistics(engine.store(), report.issues.len());
            Ok(())
        }

        Commands::Init { .. } => Ok(()),
    };

    if let Err(e) = outcome {
        error!("Query failed: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Initialize tracing with the specified log level
fn init_tracing(log_level: &str) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(log_level))
        .context("Failed to create env filter")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_level(true),
        )
        .with(env_filter)
        .init();

    Ok(())
}

/// Environment overrides, then the configuration file on top
async fn load_config(config_path: Option<&PathBuf>) -> Result<Config> {
    let mut config = Config::load_from_env().context("Invalid configuration in environment")?;

    if let Some(path) = config_path {
        if path.exists() {
            info!("Loading configuration from: {:?}", path);
            let file_config = Config::load_from_file(path)
                .await
                .with_context(|| format!("Failed to load configuration file: {:?}", path))?;
            config.merge_with(file_config);
        } else {
            warn!("Configuration file not found: {:?}. Using defaults.", path);
        }
    }

    config.validate()?;
    Ok(config)
}

fn resolve_person(store: &GraphStore, id: Option<NodeId>, name: Option<&str>) -> Result<NodeId> {
    match (id, name) {
        (Some(id), _) => Ok(id),
        (None, Some(name)) => store
            .id_for_name(name)
            .with_context(|| format!("Name '{}' not found.", name.trim())),
        (None, None) => Err(anyhow::anyhow!("Either an id or a name is required")),
    }
}

fn resolve_pair(store: &GraphStore, pair: &PairArgs) -> Result<(NodeId, NodeId)> {
    let first = resolve_person(store, pair.a, pair.name_a.as_deref())?;
    let second = resolve_person(store, pair.b, pair.name_b.as_deref())?;
    Ok((first, second))
}

/// Render a query outcome; query errors become the user-facing message
async fn render(
    engine: &QueryEngine,
    generator: &ReportGenerator,
    result: Result<QueryReport, genealogy_graph::QueryError>,
    output: &OutputArgs,
) -> Result<()> {
    let report = match result {
        Ok(report) => report,
        Err(e) => {
            println!("{}", e);
            return Ok(());
        }
    };

    let content = generator.generate(&report, engine.store(), &output.format)?;

    if let Some(file_path) = &output.output_file {
        tokio::fs::write(file_path, &content)
            .await
            .with_context(|| format!("Failed to write output to: {:?}", file_path))?;
        info!("Report written to: {:?}", file_path);
    } else {
        println!("{}", content);
    }

    Ok(())
}

fn lookup(store: &GraphStore, name: &str) {
    let ids = store.ids_for_name(name);
    if ids.is_empty() {
        println!("Name '{}' not found.", name.trim());
        return;
    }

    for id in ids {
        println!("{}\t{}", id, name.trim());
    }
}

fn print_statistics(store: &GraphStore, issue_count: usize) {
    let stats = store.statistics();
    let cycles = store.find_cycles();

    println!("People:          {}", stats.total_people);
    println!("Edges:           {}", stats.total_edges);
    println!("Id space:        {}", stats.capacity);
    println!("Roots:           {}", stats.root_people);
    println!("Leaves:          {}", stats.leaf_people);
    println!("Self-loops:      {}", stats.self_loops);
    println!("Average degree:  {:.2}", stats.average_degree);
    println!("Input issues:    {}", issue_count);
    println!("Cyclic groups:   {}", cycles.len());

    for cycle in cycles.iter().take(10) {
        let members: Vec<String> = cycle.iter().map(|id| id.to_string()).collect();
        println!("  {}", members.join(", "));
    }
}

/// Initialize configuration file
async fn init_config(config_file: &Path, config: &Config) -> Result<()> {
    info!("Initializing configuration file: {:?}", config_file);

    if config_file.exists() {
        warn!("Configuration file already exists: {:?}", config_file);
        println!("Configuration file already exists: {:?}", config_file);
        return Ok(());
    }

    config
        .save_to_file(config_file)
        .await
        .with_context(|| format!("Failed to write configuration file: {:?}", config_file))?;

    info!("Configuration file created successfully: {:?}", config_file);
    println!("Configuration file created: {:?}", config_file);
    println!("Edit this file to tune query limits and highlight colours.");

    Ok(())
}
