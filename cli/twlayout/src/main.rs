//! twlayout CLI: inspect and validate protocol struct layouts per platform.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "twlayout", version, about = "Protocol struct layout engine")]
struct Cli {
    #[command(flatten)]
    target: TargetArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Environment facts selecting the platform profile.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// OS family (windows, linux, macos); defaults to the host
    #[arg(long, global = true)]
    pub os: Option<String>,
    /// Processor word size in bits (32, 64); defaults to the host
    #[arg(long, global = true)]
    pub word_bits: Option<u32>,
    /// Toolchain convention (msvc, gnu, apple); required where several exist
    #[arg(long, global = true)]
    pub toolchain: Option<String>,
    /// Extra platform rule file (.toml), appended to the built-in table
    #[arg(long, global = true)]
    pub rules: Option<PathBuf>,
    /// Descriptor file (.toml) to use instead of the protocol catalog
    #[arg(long, global = true)]
    pub schema: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Describe the resolved platform profile
    Platform {
        /// Output format (text, json)
        #[arg(long)]
        format: Option<String>,
    },
    /// List catalog typedefs and records
    List,
    /// Show the layout of one type
    Show {
        /// Type name (e.g., TW_CAPABILITY)
        name: String,
        /// Output format (text, json)
        #[arg(long)]
        format: Option<String>,
    },
    /// Export every layout as an oracle snapshot
    Export {
        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Validate computed layouts against a native snapshot
    Validate {
        /// Oracle snapshot produced by the native harness (.json)
        #[arg(long)]
        oracle: PathBuf,
        /// Report format (human, json)
        #[arg(long)]
        report: Option<String>,
        /// Treat types only the oracle reports as failures
        #[arg(long)]
        strict: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let target = &cli.target;
    match cli.command {
        Commands::Platform { format } => commands::platform::run(target, format.as_deref()),
        Commands::List => commands::inspect::list(target),
        Commands::Show { name, format } => commands::inspect::show(target, &name, format.as_deref()),
        Commands::Export { output } => commands::inspect::export(target, output.as_deref()),
        Commands::Validate {
            oracle,
            report,
            strict,
        } => commands::validate::run(target, &oracle, report.as_deref(), strict),
    }
}
