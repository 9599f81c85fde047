//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod annotate;
mod models;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings_with_options, LoadOptions};

pub use annotate::Task;

#[derive(Parser)]
#[command(name = "nlpd")]
#[command(about = "HTTP gateway for linguistic annotation")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Pipeline model to load (overrides config and NLP_GATEWAY_MODEL)
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Maximum text length in characters
    #[arg(long, global = true)]
    max_length: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the annotation HTTP server
    Serve {
        /// Address to bind: "port", "host" or "host:port" (default from config)
        bind: Option<String>,
    },

    /// Run one annotation over text and print the JSON response
    Annotate {
        /// Operation to run
        #[arg(value_enum)]
        task: Task,
        /// Input text (two texts for similarity)
        #[arg(required = true)]
        texts: Vec<String>,
        /// Pretty-print the JSON output
        #[arg(short, long)]
        pretty: bool,
    },

    /// List the pipeline models this build can load
    Models,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
    };
    let mut settings = load_settings_with_options(options).await?;

    // Command-line flags take precedence over everything else
    if let Some(model) = cli.model {
        settings.model = model;
    }
    if let Some(max_length) = cli.max_length {
        settings.max_length = max_length;
    }

    match cli.command {
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| settings.bind.clone());
            serve::cmd_serve(&settings, &bind).await
        }
        Commands::Annotate {
            task,
            texts,
            pretty,
        } => annotate::cmd_annotate(&settings, task, texts, pretty).await,
        Commands::Models => models::cmd_models(&settings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_annotate() {
        let cli = Cli::try_parse_from(["nlpd", "annotate", "similarity", "a", "b", "--pretty"])
            .unwrap();
        match cli.command {
            Commands::Annotate {
                task,
                texts,
                pretty,
            } => {
                assert_eq!(task, Task::Similarity);
                assert_eq!(texts, vec!["a", "b"]);
                assert!(pretty);
            }
            _ => panic!("expected annotate"),
        }
    }

    #[test]
    fn test_parse_serve_with_globals() {
        let cli = Cli::try_parse_from(["nlpd", "-v", "serve", "0.0.0.0:9000", "--model", "x"])
            .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.model.as_deref(), Some("x"));
        assert!(matches!(cli.command, Commands::Serve { bind: Some(ref b) } if b == "0.0.0.0:9000"));
    }
}
