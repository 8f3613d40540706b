//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod config_cmd;
mod run;
mod standardize;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use foodlabel::config::Config;

#[derive(Parser)]
#[command(name = "foodlabel")]
#[command(about = "Standardize food descriptions and extract entities with an LLM")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

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
    /// Run the full pipeline: standardize, annotate, and write chunk files
    Run {
        /// Input CSV file
        input: PathBuf,

        #[command(flatten)]
        overrides: PipelineOverrides,

        #[command(flatten)]
        llm: LlmOverrides,

        /// Only process the first N input rows
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Standardize descriptions without calling the API
    Standardize {
        /// Input CSV file
        input: PathBuf,

        /// Output CSV file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Input column holding the row identifier
        #[arg(long)]
        id_column: Option<String>,

        /// Input column holding the description
        #[arg(long)]
        description_column: Option<String>,

        /// Only process the first N input rows
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration (API key redacted)
    Show,
}

/// Pipeline settings that override the config file.
#[derive(Args, Debug, Default)]
struct PipelineOverrides {
    /// Descriptions per API call
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Input rows per output file
    #[arg(long)]
    rows_per_chunk: Option<usize>,

    /// Ceiling on API calls per minute
    #[arg(long)]
    calls_per_minute: Option<u32>,

    /// Output directory for chunk files
    #[arg(short, long)]
    output_dir: Option<String>,

    /// Input column holding the row identifier
    #[arg(long)]
    id_column: Option<String>,

    /// Input column holding the description
    #[arg(long)]
    description_column: Option<String>,

    /// Extra abbreviations CSV (token,expansion)
    #[arg(long)]
    abbreviations: Option<String>,

    /// Skip chunks whose output file already exists
    #[arg(long)]
    skip_existing: bool,
}

impl PipelineOverrides {
    fn apply(self, config: &mut Config) {
        let p = &mut config.pipeline;
        if let Some(v) = self.batch_size {
            p.batch_size = v;
        }
        if let Some(v) = self.rows_per_chunk {
            p.rows_per_chunk = v;
        }
        if let Some(v) = self.calls_per_minute {
            p.calls_per_minute = v;
        }
        if let Some(v) = self.output_dir {
            // CLI paths are relative to the working directory, not the config file.
            p.output_dir = absolute_from_cwd(&v);
        }
        if let Some(v) = self.id_column {
            p.id_column = v;
        }
        if let Some(v) = self.description_column {
            p.description_column = v;
        }
        if let Some(v) = self.abbreviations {
            p.abbreviations = Some(absolute_from_cwd(&v));
        }
        if self.skip_existing {
            p.skip_existing = true;
        }
    }
}

/// LLM settings that override the config file and environment.
#[derive(Args, Debug, Default)]
struct LlmOverrides {
    /// API endpoint
    #[arg(long)]
    endpoint: Option<String>,

    /// Model identifier
    #[arg(short, long)]
    model: Option<String>,

    /// Maximum tokens per response
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Sampling temperature
    #[arg(long)]
    temperature: Option<f32>,

    /// Nucleus sampling mass
    #[arg(long)]
    top_p: Option<f32>,
}

impl LlmOverrides {
    fn apply(self, config: &mut Config) {
        let llm = &mut config.llm;
        if let Some(v) = self.endpoint {
            llm.endpoint = v;
        }
        if let Some(v) = self.model {
            llm.model = v;
        }
        if let Some(v) = self.max_tokens {
            llm.max_tokens = v;
        }
        if let Some(v) = self.temperature {
            llm.temperature = v;
        }
        if let Some(v) = self.top_p {
            llm.top_p = v;
        }
    }
}

fn absolute_from_cwd(path: &str) -> String {
    let expanded = shellexpand::tilde(path).into_owned();
    match std::env::current_dir() {
        Ok(cwd) if !std::path::Path::new(&expanded).is_absolute() => {
            cwd.join(&expanded).display().to_string()
        }
        _ => expanded,
    }
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Run {
            input,
            overrides,
            llm,
            limit,
        } => {
            overrides.apply(&mut config);
            llm.apply(&mut config);
            run::cmd_run(&config, &input, limit).await
        }
        Commands::Standardize {
            input,
            output,
            id_column,
            description_column,
            limit,
        } => {
            PipelineOverrides {
                id_column,
                description_column,
                ..Default::default()
            }
            .apply(&mut config);
            standardize::cmd_standardize(&config, &input, output.as_deref(), limit)
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => config_cmd::cmd_config_show(&config),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_run_overrides() {
        let cli = Cli::try_parse_from([
            "foodlabel",
            "run",
            "foods.csv",
            "--batch-size",
            "5",
            "--rows-per-chunk",
            "50",
            "--model",
            "gpt-4o",
            "--skip-existing",
            "--limit",
            "10",
        ])
        .unwrap();

        let Commands::Run {
            input,
            overrides,
            llm,
            limit,
        } = cli.command
        else {
            panic!("expected run command");
        };

        assert_eq!(input, PathBuf::from("foods.csv"));
        assert_eq!(limit, Some(10));

        let mut config = Config::default();
        overrides.apply(&mut config);
        llm.apply(&mut config);
        assert_eq!(config.pipeline.batch_size, 5);
        assert_eq!(config.pipeline.rows_per_chunk, 50);
        assert!(config.pipeline.skip_existing);
        assert_eq!(config.llm.model, "gpt-4o");
    }

    #[test]
    fn test_cli_verify() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
