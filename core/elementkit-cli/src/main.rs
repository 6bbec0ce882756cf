//! elementkit: render and check page manifests with the bundled components.
//!
//! ## Subcommands
//!
//! - `render`: mount every registered component and print its markup
//! - `validate`: run slot contract checks only; exits 2 when anything is found

mod catalog;
mod logging;
mod render;
mod session;
mod validate;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "elementkit")]
#[command(about = "Component lifecycle engine demo renderer")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Mount every component on the page and print the result
    Render {
        /// Page manifest (JSON)
        #[arg(value_name = "MANIFEST")]
        manifest: PathBuf,

        /// Framework settings (JSON)
        #[arg(long, value_name = "FILE")]
        settings: Option<PathBuf>,

        /// Print JSON instead of markup
        #[arg(long)]
        json: bool,
    },

    /// Check slot contracts without mounting
    Validate {
        /// Page manifest (JSON)
        #[arg(value_name = "MANIFEST")]
        manifest: PathBuf,

        /// Framework settings (JSON)
        #[arg(long, value_name = "FILE")]
        settings: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    let logging_guard = logging::init(cli.log_file.as_deref());

    let code = match cli.command {
        Commands::Render {
            manifest,
            settings,
            json,
        } => match render::run(&manifest, settings.as_deref(), json) {
            Ok(output) => {
                println!("{}", output);
                0
            }
            Err(e) => {
                tracing::error!(error = %e, "elementkit render failed");
                eprintln!("error: {}", e);
                1
            }
        },
        Commands::Validate { manifest, settings } => {
            match validate::validate_page(&manifest, settings.as_deref()) {
                Ok(findings) if findings.is_empty() => {
                    println!("No slot findings.");
                    0
                }
                Ok(findings) => {
                    println!("{}", validate::format_findings(&findings));
                    2
                }
                Err(e) => {
                    tracing::error!(error = %e, "elementkit validate failed");
                    eprintln!("error: {}", e);
                    1
                }
            }
        }
    };

    // Flush buffered file logs before exiting
    drop(logging_guard);
    std::process::exit(code);
}
