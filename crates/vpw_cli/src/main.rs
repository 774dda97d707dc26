//! vpw CLI: the command-line interface for the vpw simulation harness.
//!
//! Provides `vpw parse` to generate a port registry from a Verilator model
//! header, `vpw ports` to list the ports a header declares, `vpw sim` to
//! run a reference model for a number of ticks, and `vpw init` to write a
//! starter `vpw.toml`.

#![warn(missing_docs)]

mod init;
mod parse;
mod pipeline;
mod ports;
mod sim;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// vpw: clock-stepped harness for cycle-accurate circuit models.
#[derive(Parser, Debug)]
#[command(name = "vpw", version, about = "vpw simulation harness")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `vpw.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a starter `vpw.toml`.
    Init {
        /// Directory to initialize (created if missing). Defaults to the
        /// current directory.
        dir: Option<String>,

        /// Package name; defaults to the directory name.
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Generate the port registry source for a model header.
    Parse(ParseArgs),
    /// List the ports declared in a model header.
    Ports(PortsArgs),
    /// Run a reference model.
    Sim(SimArgs),
}

/// Arguments for the `vpw parse` subcommand.
#[derive(Parser, Debug)]
pub struct ParseArgs {
    /// Path to the Verilator model header (`V<module>.h`).
    pub header: String,

    /// Model type name (default: derived from the header file name).
    #[arg(short, long)]
    pub module: Option<String>,

    /// Clock port name (default: `package.clock` from `vpw.toml`, else `clk`).
    #[arg(long)]
    pub clock: Option<String>,

    /// Output file for the generated source (default: stdout).
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Arguments for the `vpw ports` subcommand.
#[derive(Parser, Debug)]
pub struct PortsArgs {
    /// Path to the Verilator model header (`V<module>.h`).
    pub header: String,

    /// Clock port name (default: `package.clock` from `vpw.toml`, else `clk`).
    #[arg(long)]
    pub clock: Option<String>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `vpw sim` subcommand.
#[derive(Parser, Debug)]
pub struct SimArgs {
    /// Reference model name: `bram`, `counter`, `loopback`, `regfile` or `axi_bridge`.
    pub model: String,

    /// Number of clock ticks to run.
    #[arg(short, long, default_value_t = 10)]
    pub ticks: u64,

    /// Port assignments applied before the first tick, as `NAME=V[,V...]`.
    #[arg(long = "set", value_name = "NAME=VALUES")]
    pub assignments: Vec<String>,

    /// Disable waveform recording.
    #[arg(long)]
    pub no_trace: bool,

    /// Output directory for the waveform file.
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Output format for listings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };
    init_tracing(&global);

    let result = match cli.command {
        Command::Init { dir, name } => init::run(dir, name, &global),
        Command::Parse(ref args) => parse::run(args, &global),
        Command::Ports(ref args) => ports::run(args, &global),
        Command::Sim(ref args) => sim::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Returns the log filter used when `RUST_LOG` is not set.
fn default_filter(global: &GlobalArgs) -> &'static str {
    if global.quiet {
        "error"
    } else if global.verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` overrides the flags.
fn init_tracing(global: &GlobalArgs) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(global)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
