use crate::config::{Config, ConfigError};
use clap::{CommandFactory, Parser};
use gendef_lang::generator::write_definitions;
use gendef_lang::parser::parse_file;
use gendef_lang::{EmitError, LoadError};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod config;

const EXIT_USAGE: u8 = 1;
const EXIT_OPEN: u8 = 2;
const EXIT_LOAD: u8 = 3;
const EXIT_EMIT: u8 = 4;
const EXIT_CONFIG: u8 = 5;

/// Generate the `tree.def' file from a language description
#[derive(Parser)]
#[clap(
    name = "gendef",
    version,
    after_help = "Where LANG_DESC_FILE is a language description file."
)]
struct Options {
    /// Set output filename [default: tree.def]
    #[clap(long, short)]
    output: Option<PathBuf>,

    /// Read settings from a TOML config file
    #[clap(long, short)]
    config: Option<PathBuf>,

    /// Keep a partially written output file when writing fails
    #[clap(long)]
    keep_partial: bool,

    /// Set input language description file
    #[clap(value_name = "LANG_DESC_FILE")]
    filename: PathBuf,
}

#[derive(Debug, Error)]
enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Emit(#[from] EmitError),
}

impl RunError {
    fn exit_code(&self) -> u8 {
        match self {
            RunError::Config(_) => EXIT_CONFIG,
            RunError::Load(LoadError::Open { .. }) => EXIT_OPEN,
            RunError::Load(_) => EXIT_LOAD,
            RunError::Emit(_) => EXIT_EMIT,
        }
    }
}

fn run(options: Options) -> Result<(), RunError> {
    let config = match &options.config {
        Some(p) => Config::from_file(p)?,
        None => Config::default(),
    };

    // command line wins over the config file
    let mut output = config.output_options();
    if let Some(p) = options.output {
        output.path(p);
    }
    if options.keep_partial {
        output.remove_on_failure(false);
    }

    debug!(
        input = %options.filename.display(),
        output = %output.output_path().display(),
        "generating definitions"
    );

    let lang = parse_file(&options.filename)?;
    write_definitions(&lang, &output)?;

    Ok(())
}

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let options = match Options::try_parse() {
        Ok(o) => o,
        Err(e) => {
            let _ = e.print();
            // --help and --version also land here
            return if e.use_stderr() {
                ExitCode::from(EXIT_USAGE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let RunError::Load(LoadError::Open { .. }) = &e {
                eprintln!("{}", Options::command().render_usage());
            }
            ExitCode::from(e.exit_code())
        }
    }
}
