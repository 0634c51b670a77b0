//! Command-line front end for classdex.
//!
//! Builds the class index, ingests call graph dumps, and answers index and
//! call graph queries as text or JSON.

use anyhow::Context;
use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Parser, Subcommand};
use classdex::callgraph::CallGraphSession;
use classdex::config::CONFIG_DIR;
use classdex::display::StageProgress;
use classdex::error::CallGraphError;
use classdex::indexing::{CorpusRoots, CorpusVersions, IndexBuilder, ProgressCallback};
use classdex::io::{ErrorReport, ExitCode, OutputFormat, OutputManager};
use classdex::query::{HierarchyDirection, QueryService, SymbolKind};
use classdex::types::Namespace;
use classdex::Settings;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Class index and call graph explorer
#[derive(Parser)]
#[command(
    name = "classdex",
    version = env!("CARGO_PKG_VERSION"),
    about = "Index decompiled Java sources and query classes, methods and call graphs",
    next_line_help = true,
    styles = clap_cargo_style()
)]
struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Initialize project
    #[command(about = "Set up .classdex directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show current configuration settings
    #[command(about = "Display active settings")]
    Config,

    /// Build the class index
    #[command(
        about = "Build the class index from the configured source trees",
        after_help = "Examples:\n  classdex index\n  classdex index --primary sources/1.21.4 --corpus-version 1.21.4\n  classdex index --secondary sources/fabric --threads 4"
    )]
    Index {
        /// Primary source tree (overrides corpus.primary_root)
        #[arg(long)]
        primary: Option<PathBuf>,

        /// Secondary source tree (overrides corpus.secondary_root)
        #[arg(long)]
        secondary: Option<PathBuf>,

        /// Primary corpus version label
        #[arg(long)]
        corpus_version: Option<String>,

        /// Secondary corpus version label
        #[arg(long)]
        secondary_version: Option<String>,

        /// Number of parser threads (overrides config)
        #[arg(short, long)]
        threads: Option<usize>,
    },

    /// Load a call graph dump
    #[command(about = "Replace the call graph store with the records of a dump file")]
    Ingest {
        /// TAB-delimited call dump
        dump: PathBuf,

        /// Rows per insert transaction (overrides config)
        #[arg(long)]
        batch_size: Option<usize>,
    },

    /// Search class, field and method names
    #[command(
        about = "Case-insensitive substring search over indexed symbol names",
        after_help = "Examples:\n  classdex search Minecraft\n  classdex search tick --kind method\n  classdex search entity --limit 10"
    )]
    Search {
        query: String,

        /// Restrict hits to class, field or method
        #[arg(short, long)]
        kind: Option<SymbolKind>,

        /// Maximum number of hits (overrides config)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show a class and its source
    #[command(about = "Show a class declaration and its source file")]
    Class {
        /// Fully qualified class name
        name: String,
    },

    /// Show a method and its source excerpt
    #[command(about = "Show a method signature with surrounding source lines")]
    Method {
        /// Fully qualified class name
        class: String,

        /// Method name (exact, then case-insensitive)
        method: String,
    },

    /// List classes under a package
    #[command(about = "List classes in a package and its sub-packages")]
    Classes {
        /// Package prefix; empty lists every class
        #[arg(default_value = "")]
        prefix: String,
    },

    /// List indexed packages
    #[command(about = "List packages recorded in the manifest")]
    Packages {
        /// primary or secondary; both when omitted
        #[arg(short, long)]
        namespace: Option<Namespace>,
    },

    /// Find subclasses or implementors
    #[command(
        about = "List classes extending or implementing a type",
        after_help = "Examples:\n  classdex hierarchy LivingEntity\n  classdex hierarchy Attackable --direction implementors"
    )]
    Hierarchy {
        /// Simple type name as written in declarations
        name: String,

        /// subclasses or implementors
        #[arg(short, long, default_value = "subclasses")]
        direction: HierarchyDirection,
    },

    /// Methods calling the given method
    #[command(about = "Find callers of a method in the call graph")]
    Callers {
        /// Fully qualified owner type
        type_name: String,
        method: String,
    },

    /// Methods called by the given method
    #[command(about = "Find callees of a method in the call graph")]
    Callees {
        /// Fully qualified owner type
        type_name: String,
        method: String,
    },

    /// Search call graph methods
    #[command(about = "Substring search over Type.method names in the call graph")]
    Methods {
        query: String,

        /// Maximum number of results (capped by call_graph.result_limit)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Call graph totals
    #[command(about = "Show call graph edge and method counts")]
    Stats,
}

/// Entry point.
///
/// Loads layered configuration, installs logging and dispatches the command.
/// The process exit code follows [`ExitCode`].
#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let settings = if let Some(config_path) = &cli.config {
        Settings::load_from(config_path).unwrap_or_else(|e| {
            eprintln!(
                "Configuration error loading from {}: {}",
                config_path.display(),
                e
            );
            std::process::exit(ExitCode::ConfigError as i32);
        })
    } else {
        Settings::load().unwrap_or_else(|e| {
            eprintln!("Configuration error: {e}");
            Settings::default()
        })
    };

    init_tracing(cli.verbose || settings.debug);

    let mut output = OutputManager::new(OutputFormat::from_json_flag(cli.json));
    let code = match run(cli.command, settings, &mut output).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::GeneralError
        }
    };

    if code != ExitCode::Success {
        tracing::debug!("exit {}: {}", code as u8, code.description());
    }
    std::process::exit(code.into());
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "classdex=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

async fn run(
    command: Commands,
    mut settings: Settings,
    output: &mut OutputManager,
) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Init { force } => {
            let config_path = PathBuf::from(CONFIG_DIR).join("settings.toml");
            if config_path.exists() && !force {
                eprintln!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
                eprintln!("Use --force to overwrite");
                return Ok(ExitCode::GeneralError);
            }

            match Settings::init_config_file(force) {
                Ok(path) => {
                    output.info(&format!("Created configuration file at: {}", path.display()))?;
                    output.info("Edit this file to point corpus.primary_root at your sources.")?;
                    Ok(ExitCode::Success)
                }
                Err(e) => {
                    eprintln!("Error: {e}");
                    Ok(ExitCode::ConfigError)
                }
            }
        }

        Commands::Config => {
            if output.format().is_json() {
                println!("{}", serde_json::to_string_pretty(&settings)?);
            } else {
                println!("Current Configuration:");
                println!("{}", "=".repeat(50));
                println!("{}", toml::to_string_pretty(&settings)?);
            }
            Ok(ExitCode::Success)
        }

        Commands::Index {
            primary,
            secondary,
            corpus_version,
            secondary_version,
            threads,
        } => {
            if let Some(primary) = primary {
                settings.corpus.primary_root = primary;
            }
            if secondary.is_some() {
                settings.corpus.secondary_root = secondary;
            }
            if let Some(version) = corpus_version {
                settings.corpus.version = version;
            }
            if secondary_version.is_some() {
                settings.corpus.secondary_version = secondary_version;
            }
            if let Some(threads) = threads {
                settings.indexing.parallel_threads = threads;
            }
            index(Arc::new(settings), output).await
        }

        Commands::Ingest { dump, batch_size } => {
            if let Some(batch_size) = batch_size {
                settings.call_graph.batch_size = batch_size;
            }
            ingest(settings, dump, output).await
        }

        Commands::Search {
            limit: Some(limit), ..
        } => {
            settings.query.search_limit = limit;
            query_index(command, settings, output).await
        }

        Commands::Search { .. }
        | Commands::Class { .. }
        | Commands::Method { .. }
        | Commands::Classes { .. }
        | Commands::Packages { .. }
        | Commands::Hierarchy { .. } => query_index(command, settings, output).await,

        Commands::Callers { type_name, method } => {
            let session = CallGraphSession::new(&settings);
            let query = format!("{type_name}.{method}");
            match session.find_callers(&type_name, &method) {
                Ok(callers) => Ok(output.collection(callers, "callers", &query)?),
                Err(e) => Ok(output.error(&ErrorReport::from(&e))?),
            }
        }

        Commands::Callees { type_name, method } => {
            let session = CallGraphSession::new(&settings);
            let query = format!("{type_name}.{method}");
            match session.find_callees(&type_name, &method) {
                Ok(callees) => Ok(output.collection(callees, "callees", &query)?),
                Err(e) => Ok(output.error(&ErrorReport::from(&e))?),
            }
        }

        Commands::Methods { query, limit } => {
            let session = CallGraphSession::new(&settings);
            match session.search_methods(&query, limit) {
                Ok(methods) => Ok(output.collection(methods, "methods", &query)?),
                Err(e) => Ok(output.error(&ErrorReport::from(&e))?),
            }
        }

        Commands::Stats => {
            let session = CallGraphSession::new(&settings);
            match session.stats() {
                Ok(Some(stats)) => Ok(output.success(stats)?),
                Ok(None) => {
                    let error = CallGraphError::NotInitialized {
                        path: session.path().to_path_buf(),
                    };
                    Ok(output.error(&ErrorReport::from(&error))?)
                }
                Err(e) => Ok(output.error(&ErrorReport::from(&e))?),
            }
        }
    }
}

fn stage_progress(output: &OutputManager, message: &str) -> StageProgress {
    if output.format().is_json() {
        StageProgress::hidden()
    } else {
        StageProgress::new(message)
    }
}

async fn index(settings: Arc<Settings>, output: &mut OutputManager) -> anyhow::Result<ExitCode> {
    let roots = CorpusRoots::from_settings(&settings);
    let versions = CorpusVersions::from_settings(&settings);
    let builder = IndexBuilder::new(settings.clone());

    output.info(&format!(
        "Indexing {} into {}",
        roots.primary.display(),
        builder.persistence().base_path().display()
    ))?;

    let progress = stage_progress(output, "Indexing");
    let reporter = progress.clone();
    let result = tokio::task::spawn_blocking(move || {
        let callback = move |stage: &str, percent: u8, message: &str| {
            reporter.report(stage, percent, message)
        };
        builder.build(&roots, &versions, Some(&callback as &ProgressCallback<'_>))
    })
    .await
    .context("index build task panicked")?;
    progress.finish_and_clear();

    match result {
        Ok(summary) => {
            tracing::info!(
                "[index] {} classes in {} packages",
                summary.class_count,
                summary.packages_indexed
            );
            Ok(output.success(summary)?)
        }
        Err(e) => Ok(output.error(&ErrorReport::from(&e))?),
    }
}

async fn ingest(
    settings: Settings,
    dump: PathBuf,
    output: &mut OutputManager,
) -> anyhow::Result<ExitCode> {
    let session = CallGraphSession::new(&settings);
    output.info(&format!(
        "Ingesting {} into {}",
        dump.display(),
        session.path().display()
    ))?;

    let progress = stage_progress(output, "Ingesting");
    let reporter = progress.clone();
    let result = tokio::task::spawn_blocking(move || {
        let callback = move |stage: &str, percent: u8, message: &str| {
            reporter.report(stage, percent, message)
        };
        session.reingest(&dump, Some(&callback as &ProgressCallback<'_>))
    })
    .await
    .context("ingest task panicked")?;
    progress.finish_and_clear();

    match result {
        Ok(summary) => Ok(output.success(summary)?),
        Err(e) => Ok(output.error(&ErrorReport::from(&e))?),
    }
}

/// Answer an index query, building the index first when it is missing
async fn query_index(
    command: Commands,
    settings: Settings,
    output: &mut OutputManager,
) -> anyhow::Result<ExitCode> {
    let service = QueryService::new(Arc::new(settings));
    let session = match service.session().await {
        Ok(session) => session,
        Err(e) => return Ok(output.error(&ErrorReport::from(&e))?),
    };

    let code = match command {
        Commands::Search { query, kind, .. } => {
            output.collection(session.search(&query, kind), "symbols", &query)?
        }
        Commands::Class { name } => output.item(session.get_class(&name), "class", &name)?,
        Commands::Method { class, method } => {
            let view = session.get_method(&class, &method);
            output.item(view, "method", &format!("{class}.{method}"))?
        }
        Commands::Classes { prefix } => {
            output.collection(session.list_classes(&prefix), "classes", &prefix)?
        }
        Commands::Packages { namespace } => {
            let label = namespace.map_or("all", |ns| ns.as_str());
            output.collection(session.list_packages(namespace), "packages", label)?
        }
        Commands::Hierarchy { name, direction } => {
            let entity = match direction {
                HierarchyDirection::Subclasses => "subclasses",
                HierarchyDirection::Implementors => "implementors",
            };
            output.collection(session.find_hierarchy(&name, direction), entity, &name)?
        }
        _ => anyhow::bail!("not an index query"),
    };
    Ok(code)
}
