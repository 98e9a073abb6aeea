//! Template Trace CLI
//!
//! Developer tooling around the template rendering profiler panel.
//! Renders a sample site with instrumentation enabled and inspects
//! recorded stats payloads.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use template_trace_panel::commands::{execute_demo, validate_args, DemoArgs};
use template_trace_panel::output::read_stats;
use template_trace_panel::utils::config::SCHEMA_VERSION;

/// Template Trace - render timeline profiling for template engines
#[derive(Parser, Debug)]
#[command(name = "template-trace")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Render the built-in sample site and print its timeline
    Demo {
        /// Output path for the JSON stats payload (optional)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of times to render the sample page
        #[arg(long, default_value = "1")]
        iterations: usize,

        /// Template-name prefix to exclude from recording (repeatable)
        #[arg(long = "skip-prefix")]
        skip_prefixes: Vec<String>,
    },

    /// Validate a stats JSON file
    Validate {
        /// Path to stats JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Demo {
            output,
            iterations,
            skip_prefixes,
        } => {
            let args = DemoArgs {
                output_json: output,
                iterations,
                skip_prefixes,
            };

            validate_args(&args)?;
            execute_demo(args)?;
        }

        Commands::Validate { file } => {
            validate_stats_file(file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Validate a stats JSON file
fn validate_stats_file(file_path: PathBuf) -> Result<()> {
    println!("Validating stats: {}", file_path.display());

    let payload = read_stats(&file_path)?;

    println!("✓ Valid stats JSON");
    println!("  Version: {}", payload.version);
    println!("  Generated: {}", payload.generated_at);
    println!("  Render calls: {}", payload.total_calls);
    println!("  Window: {:.2} ms", payload.window_ms);
    println!("  Summary entries: {}", payload.summary.len());

    Ok(())
}

/// Display schema information
fn display_schema(show_details: bool) {
    println!("Template Trace Stats Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string          - Schema version (e.g., '1.0.0')");
        println!("  generated_at: string     - ISO 8601 timestamp");
        println!("  total_calls: number      - Recorded render calls");
        println!("  window_ms: number        - Width of the render window");
        println!("  templates: array         - Render calls, ascending by start");
        println!("    engine: string         - Originating engine id");
        println!("    name: string?          - Template display name");
        println!("    start, end: number     - Timestamps in seconds");
        println!("    time_ms: number        - Render duration");
        println!("    level: number          - Nesting level");
        println!("    color: object          - bg/text display colors");
        println!("    offset_p: number       - Start offset, % of window");
        println!("    duration_p: number     - Duration, % of window");
        println!("    rel_duration_p: number - Duration, % of remaining window");
        println!("    nodes: array?          - Per-node spans (built-in engine)");
        println!("    max_node_level: number? - Deepest node nesting level");
        println!("  summary: array           - Per-name totals, descending");
        println!("    name: string           - Template name");
        println!("    total_time_ms: number  - Aggregate render time");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
fn display_version() {
    println!("Template Trace v{}", env!("CARGO_PKG_VERSION"));
    println!("Stats Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Render timeline profiling for template engines.");
}
