//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use super::{fingerprint_cmd, naming_cmd, records, sheet_cmd};
use crate::domain::ModelType;
use crate::storage::{Config, Project};

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "BOOKDB_LOG";

#[derive(Parser)]
#[command(name = "bookdb")]
#[command(author, version, about = "Audiobook catalog storage and change detection")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new bookdb project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// List stored records of a type
    List {
        /// Record type (book, author, narrator, series, tag, watch)
        model_type: ModelType,
    },

    /// Show one stored record
    Show {
        model_type: ModelType,

        /// Record identity token
        id: String,
    },

    /// Save a JSON record if it differs from the stored copy
    Put {
        model_type: ModelType,

        /// JSON file, or `-` for stdin
        file: String,
    },

    /// Diff two JSON records of a type
    Diff {
        model_type: ModelType,
        before: PathBuf,
        after: PathBuf,
    },

    /// Print the file token for identity parts
    Token {
        #[arg(required = true)]
        parts: Vec<String>,
    },

    /// Print the field label for header texts
    Label {
        #[arg(required = true)]
        texts: Vec<String>,
    },

    /// Spreadsheet mirror
    #[command(subcommand)]
    Sheet(sheet_cmd::SheetCommands),

    /// Show a stored record's fingerprint
    Fingerprint {
        model_type: ModelType,
        id: String,

        /// Fingerprint bucket
        #[arg(long, default_value = sheet_cmd::DEFAULT_BUCKET)]
        bucket: String,
    },
}

/// Installs the stderr log subscriber
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Resolves the output format: flag first, then the global config
fn resolve_format(flag: Option<OutputFormat>) -> Result<OutputFormat> {
    match flag {
        Some(format) => Ok(format),
        None => Ok(Config::load()?.global.default_format.into()),
    }
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let output = Output::new(resolve_format(cli.format)?, cli.verbose);

    match cli.command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing project at: {}", path.display()));
            let project = Project::init(&path)?;
            output.verbose_ctx("init", &format!("Records go to: {}", project.db_root().display()));
            output.success(&format!("Initialized bookdb project at {}", project.root().display()));
            Ok(())
        }

        Commands::List { model_type } => {
            let project = Project::open_current()?;
            with_model!(model_type, M => records::list::<M>(&project, &output))
        }
        Commands::Show { model_type, id } => {
            let project = Project::open_current()?;
            with_model!(model_type, M => records::show::<M>(&project, &output, &id))
        }
        Commands::Put { model_type, file } => {
            let project = Project::open_current()?;
            with_model!(model_type, M => records::put::<M>(&project, &output, &file))
        }
        Commands::Diff { model_type, before, after } => records::diff(&output, model_type, &before, &after),

        Commands::Token { parts } => {
            naming_cmd::token(&output, &parts);
            Ok(())
        }
        Commands::Label { texts } => naming_cmd::label(&output, &texts),

        Commands::Sheet(cmd) => sheet_cmd::run(cmd, &output),

        Commands::Fingerprint { model_type, id, bucket } => {
            let project = Project::open_current()?;
            with_model!(model_type, M => fingerprint_cmd::show::<M>(&project, &output, &id, &bucket))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_model_types() {
        let cli = Cli::try_parse_from(["bookdb", "show", "book", "ana-example-2019-the-fish"]).unwrap();
        match cli.command {
            Commands::Show { model_type, id } => {
                assert_eq!(model_type, ModelType::Book);
                assert_eq!(id, "ana-example-2019-the-fish");
            }
            _ => panic!("expected show"),
        }

        assert!(Cli::try_parse_from(["bookdb", "list", "movie"]).is_err());
    }

    #[test]
    fn format_flag_is_global() {
        let cli = Cli::try_parse_from(["bookdb", "token", "a", "--format", "json"]).unwrap();
        assert_eq!(cli.format, Some(OutputFormat::Json));
    }
}
