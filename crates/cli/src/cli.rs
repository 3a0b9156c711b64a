use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "librarian", about = "Librarian archive lookup CLI")]
pub struct Cli {
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    pub verbose: bool,
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[arg(long = "tool-dir", global = true)]
    pub tool_dir: Option<PathBuf>,
    #[arg(long = "tool-name", global = true)]
    pub tool_name: Option<String>,
    /// Run the tool through `sh -c` with the unescaped command line.
    #[arg(long = "shell-compat", global = true, action = ArgAction::SetTrue)]
    pub shell_compat: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List categories and field ids in argument order.
    Schema {
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
    /// Print the argument vector a submission would produce.
    Argv {
        #[arg(value_parser = parse_pair)]
        fields: Vec<(String, String)>,
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
    Run {
        #[arg(value_parser = parse_pair)]
        fields: Vec<(String, String)>,
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
    /// Write the redrawn form page to stdout.
    Render {
        #[arg(value_parser = parse_pair)]
        fields: Vec<(String, String)>,
        #[arg(long = "cache-bust")]
        cache_bust: Option<u64>,
    },
}

/// Parses `name=value`; the value may be empty or contain `=`.
pub fn parse_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected FIELD=VALUE, got {raw:?}")),
    }
}
