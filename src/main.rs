use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use dacpac_scaffold::{scaffold_dacpac, ScaffoldError, ScaffoldOptions};

#[derive(Parser)]
#[command(name = "dacpac-scaffold")]
#[command(author, version, about = "Read a SQL Server .dacpac into a relational model for code generation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the database model of a .dacpac and print it as JSON
    Scaffold {
        /// Path to the .dacpac file
        #[arg(short, long)]
        dacpac: PathBuf,

        /// Only include tables in this schema (repeatable; the first is the default schema)
        #[arg(short, long = "schema")]
        schemas: Vec<String>,

        /// Only include this [schema].[name] table or view (repeatable)
        #[arg(short, long = "table")]
        tables: Vec<String>,

        /// Write the JSON model to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Enable debug logging
        #[arg(short, long)]
        verbose: bool,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scaffold {
            dacpac,
            schemas,
            tables,
            output,
            verbose,
        } => {
            init_tracing(verbose);

            let options = ScaffoldOptions {
                package_path: dacpac,
                schemas,
                tables,
            };
            let model = scaffold_dacpac(&options)?;
            let json = serde_json::to_string_pretty(&model)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, json).map_err(|e| ScaffoldError::OutputWriteError {
                        path: path.clone(),
                        source: e,
                    })?;
                    tracing::info!(path = %path.display(), "wrote model");
                }
                None => println!("{}", json),
            }
        }
    }

    Ok(())
}
