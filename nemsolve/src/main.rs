use clap::{Args, Parser, Subcommand, ValueEnum};
use nem_core::{
    models::{Registry, RegistryDto},
    ports::Solver as _,
};
use nem_solver::{
    DispatchModel, DispatchSolver,
    clarabel::ClarabelBackend,
    export::{export_lp, export_mps},
};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write, stdin, stdout},
    path::PathBuf,
};
use tracing::{Level, event};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

mod config;
mod loader;
mod report;

use crate::config::AppConfig;

// The top-level arguments: an optional config file and the subcommand to execute
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct BaseArgs {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "APP_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clear the market and report dispatch, flows and prices
    Solve {
        #[command(flatten)]
        io: IOArgs,

        /// How the market data is laid out
        #[arg(long, default_value = "json")]
        from: InputFormat,

        /// How the outcome is reported
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },

    /// Construct the dispatch linear program and export to a standard format
    Export {
        #[command(flatten)]
        io: IOArgs,

        /// How the market data is laid out
        #[arg(long, default_value = "json")]
        from: InputFormat,

        /// The file format to use (if omitted, will infer based on filename)
        #[arg(short, long)]
        format: Option<ExportFormat>,
    },

    /// Print the JSON schema of the market data
    Schema {
        /// The output file (defaults to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

// Most subcommands have a notion of input and output.
// This struct standardizes their implementation.
#[derive(Args)]
struct IOArgs {
    /// The market JSON file, or CSV directory (JSON defaults to stdin if omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// The output file (defaults to stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl IOArgs {
    fn read(&self) -> anyhow::Result<Box<dyn Read>> {
        if let Some(path) = &self.input {
            Ok(Box::new(BufReader::new(File::open(path)?)))
        } else {
            Ok(Box::new(stdin().lock()))
        }
    }

    fn write(&self) -> anyhow::Result<Box<dyn Write>> {
        write_to(self.output.as_ref())
    }

    fn extension(&self) -> Option<&str> {
        self.output
            .as_ref()
            .and_then(|path| path.extension())
            .and_then(|ext| ext.to_str())
    }

    // Read and validate the market in the requested layout
    fn registry(&self, from: InputFormat, config: &AppConfig) -> anyhow::Result<Registry> {
        let segments = config.input.bid_segments;
        let registry = match from {
            InputFormat::Json => {
                let registry = serde_json::from_reader::<_, Registry>(self.read()?)?;
                loader::check_arity(&registry, segments)?;
                registry
            }
            InputFormat::Csv => {
                let dir = self.input.as_deref().ok_or(CliError::CsvDirectory)?;
                loader::load(loader::open(dir)?, segments)?
            }
        };
        event!(
            Level::INFO,
            regions = registry.regions().len(),
            generators = registry.generators().len(),
            links = registry.links().len(),
            "loaded market"
        );
        Ok(registry)
    }
}

fn write_to(path: Option<&PathBuf>) -> anyhow::Result<Box<dyn Write>> {
    if let Some(path) = path {
        Ok(Box::new(BufWriter::new(File::create(path)?)))
    } else {
        Ok(Box::new(stdout().lock()))
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum InputFormat {
    Json,
    Csv,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Mps,
    Lp,
}

pub fn main() -> anyhow::Result<()> {
    // Output goes to stdout, so the log events go to stderr
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = BaseArgs::parse();
    let config = AppConfig::load(args.config.as_deref())?;

    match args.command {
        Commands::Solve { io, from, format } => {
            let registry = io.registry(from, &config)?;
            let solver =
                DispatchSolver::new(ClarabelBackend::from(&config.solver), config.dispatch);
            let outcome = solver.solve(&registry)?;

            let mut output = io.write()?;
            match format {
                OutputFormat::Json => serde_json::to_writer_pretty(&mut output, &outcome)?,
                OutputFormat::Table => report::write_table(&outcome, &mut output)?,
            }
            output.flush()?;
        }
        Commands::Export { io, from, format } => {
            let format = format
                .or_else(|| match io.extension() {
                    Some("mps") => Some(ExportFormat::Mps),
                    Some("lp") => Some(ExportFormat::Lp),
                    _ => None,
                })
                .ok_or(CliError::ExportExtension)?;

            let registry = io.registry(from, &config)?;
            let model = DispatchModel::build(&registry)?;

            let mut output = io.write()?;
            match format {
                ExportFormat::Mps => export_mps(model.program(), &mut output)?,
                ExportFormat::Lp => export_lp(model.program(), &mut output)?,
            }
            output.flush()?;
        }
        Commands::Schema { output } => {
            let schema = schemars::schema_for!(RegistryDto);
            let mut output = write_to(output.as_ref())?;
            serde_json::to_writer_pretty(&mut output, &schema)?;
            output.flush()?;
        }
    }

    Ok(())
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("Unsupported export format")]
    ExportExtension,
    #[error("CSV input requires a directory given with --input")]
    CsvDirectory,
}
