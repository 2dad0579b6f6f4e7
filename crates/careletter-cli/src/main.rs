mod assets;
mod config;
mod error;
mod generate;
mod report;
mod request;

use std::path::PathBuf;
use std::process;

use careletter_core::{log_diagnostics, parse};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::Loader;
use crate::error::{AppError, error_chain};
use crate::report::DiagnosticsMode;
use crate::request::Request;

/// Client-care letter generator.
#[derive(Parser)]
#[command(name = "careletter", version, about = "Client-care letter generator")]
struct Cli {
    /// Configuration file layered over the built-in defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Precedent file to use instead of the configured one
    #[arg(long, global = true)]
    precedent: Option<PathBuf>,

    /// Print diagnostics to stderr in this format
    #[arg(long, global = true, value_enum)]
    diagnostics: Option<DiagnosticsMode>,

    /// Log debug detail to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the letter and advice summary bundle for a request file
    Generate {
        /// Path to the request TOML file
        request: PathBuf,
        /// Directory the bundle is written to
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Also write an HTML preview of the letter
        #[arg(long)]
        preview: bool,
    },

    /// Parse a precedent and print its element outline
    Check {
        /// Path to the precedent; the configured one when omitted
        file: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %error_chain(&err), "careletter failed");
            eprintln!("error: {}", err.user_message());
            1
        }
    };
    process::exit(code);
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<i32, AppError> {
    let mut loader = Loader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_file(path);
    }
    if let Some(path) = &cli.precedent {
        loader = loader.set_override("precedent.path", path.to_string_lossy().into_owned())?;
    }

    match cli.command {
        Commands::Generate {
            request,
            out_dir,
            preview,
        } => {
            if let Some(dir) = &out_dir {
                loader = loader.set_override("output.dir", dir.to_string_lossy().into_owned())?;
            }
            if preview {
                loader = loader.set_override("output.preview", true)?;
            }
            let config = config::load_once(loader)?;
            let precedent = assets::precedent(config.precedent.path.as_deref())?;
            let request = Request::from_path(&request)?;

            let documents = generate::generate(config, &request, precedent)?;
            if let Some(mode) = cli.diagnostics {
                report::emit_diagnostics(&documents.diagnostics, mode);
            }
            let written =
                generate::write_outputs(&documents, &config.output.dir, config.output.preview)?;
            for path in &written {
                println!("{}", path.display());
            }
            Ok(0)
        }
        Commands::Check { file } => {
            let config = config::load_once(loader)?;
            let path = file.or_else(|| config.precedent.path.clone());
            let precedent = assets::precedent(path.as_deref())?;

            let parsed = parse(precedent);
            log_diagnostics(&parsed.diagnostics);
            if let Some(mode) = cli.diagnostics {
                report::emit_diagnostics(&parsed.diagnostics, mode);
            }
            print!("{}", report::outline(&parsed.document.elements));
            let keys = report::placeholders_used(&parsed.document.elements);
            if !keys.is_empty() {
                println!("placeholders: {}", keys.join(", "));
            }
            Ok(exit_code(&parsed.diagnostics))
        }
    }
}

fn exit_code(diagnostics: &[careletter_core::Diagnostic]) -> i32 {
    if report::has_errors(diagnostics) { 1 } else { 0 }
}
