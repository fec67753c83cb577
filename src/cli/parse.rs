//! CLI parse: clap types for appsettings. No behavior; definitions only.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// appsettings CLI - inspect the default configuration layering
#[derive(Parser, Debug)]
#[command(name = "appsettings")]
#[command(
    about = "Show configuration layered from appsettings files, user secrets, environment variables and arguments"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding appsettings.json
    #[arg(long, default_value = ".", global = true)]
    pub dir: PathBuf,

    /// User secrets id (consulted in the Development environment only)
    #[arg(long, global = true)]
    pub secrets_id: Option<String>,

    /// Load files once instead of watching them
    #[arg(long, global = true)]
    pub no_reload: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

/// Tokens after `--`, handed to the command-line source.
#[derive(Args, Debug, Clone, Default)]
pub struct ForwardedArgs {
    #[arg(last = true, value_name = "ARGS")]
    pub args: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the merged configuration, or a single key
    Show {
        /// Key to print (`:` or `.` separated, case-insensitive)
        #[arg(long)]
        key: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,

        #[command(flatten)]
        forwarded: ForwardedArgs,
    },
    /// List the composed sources in precedence order (last wins)
    Sources {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,

        #[command(flatten)]
        forwarded: ForwardedArgs,
    },
    /// Print the configuration and print it again after every reload
    Watch {
        /// Key to print (`:` or `.` separated, case-insensitive)
        #[arg(long)]
        key: Option<String>,

        #[command(flatten)]
        forwarded: ForwardedArgs,
    },
}

impl Commands {
    /// Arguments forwarded to the command-line source.
    pub fn forwarded_args(&self) -> &[String] {
        match self {
            Commands::Show { forwarded, .. }
            | Commands::Sources { forwarded, .. }
            | Commands::Watch { forwarded, .. } => &forwarded.args,
        }
    }
}
