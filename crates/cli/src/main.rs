mod cli;
mod logging;

use std::env;
use std::io::{self, Write};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use tracing::{debug, warn};

use librarian_core::{
    Diagnostics, FieldSchema, FormView, LibrarianConfig, LibrarianPage, Submission, ToolCommand,
};

use crate::cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose || logging::env_flag());
    let config = load_config(&cli)?;
    let schema = FieldSchema::global();
    match cli.command {
        Command::Schema { json } => print_schema(schema, json),
        Command::Argv { fields, json } => {
            let command = tool_command(&config, schema, &fields)?;
            if json {
                println!("{}", serde_json::to_string_pretty(command.argv())?);
            } else {
                for token in command.argv() {
                    println!("{token}");
                }
            }
            Ok(())
        }
        Command::Run { fields, json } => run_tool(&config, schema, &fields, json),
        Command::Render { fields, cache_bust } => {
            let submission = Submission::from_pairs(fields);
            let form = FormView::build(schema, &submission.decode_all(schema))?;
            let mut page = LibrarianPage::new(&form, &config.image_name);
            if let Some(token) = cache_bust {
                page = page.cache_bust(token);
            }
            io::stdout().write_all(page.to_html()?.as_bytes())?;
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> Result<LibrarianConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = LibrarianConfig::load(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            config.apply_overrides(|key| env::var(key).ok());
            config
        }
        None => LibrarianConfig::load_from_env().context("failed to load librarian config")?,
    };
    if let Some(dir) = &cli.tool_dir {
        config.tool_dir = dir.clone();
    }
    if let Some(name) = &cli.tool_name {
        config.tool_name = name.clone();
    }
    if cli.shell_compat {
        config.shell_compat = true;
    }
    debug!(?config, "resolved config");
    Ok(config)
}

fn tool_command(
    config: &LibrarianConfig,
    schema: &FieldSchema,
    fields: &[(String, String)],
) -> Result<ToolCommand> {
    let submission = Submission::from_pairs(fields.iter().cloned());
    let known = schema.field_ids();
    for (key, _) in fields {
        let base = key.strip_suffix("_exact").unwrap_or(key);
        if !known.iter().any(|id| id == base) {
            warn!(field = %key, "not a schema field; ignored");
        }
    }
    Ok(ToolCommand::for_schema(
        schema,
        &config.tool_dir,
        &config.tool_name,
        &submission.decode_all(schema),
    )?)
}

fn run_tool(
    config: &LibrarianConfig,
    schema: &FieldSchema,
    fields: &[(String, String)],
    json: bool,
) -> Result<()> {
    if config.shell_compat {
        warn!("shell_compat enabled: field text reaches `sh -c` unescaped");
    }
    let command = tool_command(config, schema, fields)?;
    let outcome = config.runner().run(&command)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        for line in Diagnostics::from_outcome(&outcome).lines() {
            println!("{line}");
        }
    }
    if !outcome.success() {
        process::exit(outcome.status_code.unwrap_or(1));
    }
    Ok(())
}

fn print_schema(schema: &FieldSchema, json: bool) -> Result<()> {
    if json {
        let categories: Vec<_> = schema
            .categories()
            .iter()
            .map(|category| {
                json!({
                    "name": category.name(),
                    "fields": category.fields(),
                    "forced_exact": category.is_forced_exact(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&categories)?);
        return Ok(());
    }
    for (position, field) in schema.fields().enumerate() {
        let marker = if field.is_forced_exact() { " (exact)" } else { "" };
        println!("{:>2} {}{marker}", position + 1, field.id());
    }
    Ok(())
}
