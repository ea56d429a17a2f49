use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::debug;
use serde_json::json;

use rdfmap::config::RdfMapConfig;
use rdfmap::query::QueryShape;
use rdfmap::{namespaces, normalize, Dialect};

/// rdfmap - normalize and check graph queries
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// YAML configuration file (defaults to RDFMAP_* environment variables)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Turn a query or bare pattern into a complete, validated query
    Normalize {
        /// Dialect tag (sparql, serql, ...)
        #[arg(long)]
        dialect: Option<String>,

        /// Projection variable for bare patterns
        #[arg(long)]
        variable: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Query text, or `-` to read standard input
        query: String,
    },

    /// List the supported dialects and their rules
    Dialects,

    /// Validate a complete query
    Check {
        /// Dialect tag (sparql, serql, ...)
        #[arg(long)]
        dialect: Option<String>,

        /// Query text, or `-` to read standard input
        query: String,
    },
}

fn main() -> ExitCode {
    // Defaults to WARN; override with RUST_LOG
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_ref())?;
    config.apply_namespaces();
    debug!(
        "{} namespace(s) registered from configuration",
        namespaces::snapshot().len()
    );

    match cli.command {
        Command::Normalize {
            dialect,
            variable,
            json,
            query,
        } => {
            let dialect = pick_dialect(dialect.as_deref(), &config)?;
            let variable = variable.unwrap_or_else(|| config.default_variable.clone());
            let normalized = normalize(&read_query(&query)?, dialect, &variable)?;
            if json {
                let out = json!({
                    "dialect": dialect,
                    "shape": normalized.shape,
                    "query": normalized.text,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{}", normalized.text);
            }
        }
        Command::Dialects => {
            let dialects: Vec<_> = Dialect::ALL
                .iter()
                .map(|d| {
                    let rules = d.rules();
                    json!({
                        "name": rules.name,
                        "tags": d.tags(),
                        "pattern_keyword": rules.pattern_keyword,
                        "query_keywords": rules.query_keywords,
                        "projection_variable": d.projection_variable("name"),
                        "anonymous_variable": rules.anonymous_variable,
                        "stable_anonymous_ids": rules.stable_anonymous_ids,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&dialects)?);
        }
        Command::Check { dialect, query } => {
            let dialect = pick_dialect(dialect.as_deref(), &config)?;
            let normalized = normalize(&read_query(&query)?, dialect, &config.default_variable)?;
            if normalized.shape == QueryShape::Fragment {
                bail!(
                    "not a complete {} query: expected it to start with one of {:?}",
                    dialect,
                    dialect.query_keywords()
                );
            }
            println!("ok: {:?} query", normalized.parsed.form);
        }
    }
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<RdfMapConfig> {
    match path {
        Some(path) => RdfMapConfig::from_yaml_file(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => RdfMapConfig::from_env().context("loading configuration from environment"),
    }
}

fn pick_dialect(tag: Option<&str>, config: &RdfMapConfig) -> anyhow::Result<Dialect> {
    match tag {
        Some(tag) => Ok(Dialect::from_tag(tag)?),
        None => Ok(config.default_dialect),
    }
}

fn read_query(arg: &str) -> anyhow::Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("reading query from standard input")?;
    Ok(buf)
}
