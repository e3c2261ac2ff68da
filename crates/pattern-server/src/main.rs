//! Pattern Formatter — academic document structuring and Word output server.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use pattern_core::{FormatPolicy, FormatterConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;
mod routes;
mod state;

use state::AppState;

fn resolve_data_dir() -> PathBuf {
    std::env::var("PATTERN_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

fn cli_policy() -> FormatPolicy {
    FormatPolicy::load(&resolve_data_dir().join("policy.json"))
}

fn print_usage() {
    println!("Pattern Formatter — academic document formatting server");
    println!();
    println!("Usage: pattern-formatter [command]");
    println!();
    println!("Commands:");
    println!("  (none)                    Start the server");
    println!("  analyze <input>           Print the document analysis as JSON");
    println!("  format <input> [output]   Write a formatted .docx");
    println!("  help                      Show this help message");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    // Handle CLI subcommands
    if args.len() > 1 {
        match args[1].as_str() {
            "analyze" => {
                if args.len() < 3 {
                    eprintln!("Usage: pattern-formatter analyze <input>");
                    std::process::exit(1);
                }
                cli::analyze(Path::new(&args[2]), cli_policy())?;
                return Ok(());
            }
            "format" => {
                if args.len() < 3 {
                    eprintln!("Usage: pattern-formatter format <input> [output]");
                    std::process::exit(1);
                }
                let output = args.get(3).map(Path::new);
                let written = cli::format(Path::new(&args[2]), output, cli_policy())?;
                println!("{}", written.display());
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                print_usage();
                return Ok(());
            }
            _ => {
                eprintln!(
                    "Unknown command: {}. Use 'pattern-formatter help' for usage.",
                    args[1]
                );
                std::process::exit(1);
            }
        }
    }

    // Normal server startup
    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    let config = FormatterConfig::from_env(&data_dir)?;
    let port = config.port;

    let state = Arc::new(AppState::new(config));
    let app = routes::build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Pattern Formatter listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
