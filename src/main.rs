use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use ecologic::constants::{DEFAULT_PORT, GENERATION_FAILED_MESSAGE, SMBP_FILE_NAME};
use ecologic::{smbp, web_server, GeminiClient, GeminiConfig, LogicResponse};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Gemini model used for generation (overrides GEMINI_MODEL).
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

// Define the available subcommands
#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the generator web UI.
    Serve {
        #[arg(long, default_value_t = DEFAULT_PORT, help = "Port for the web server.")]
        port: u16,
    },
    /// Generate ladder logic for a prompt and write the .smbp file.
    Generate {
        #[arg(long, help = "Plain-language description of the logic.")]
        prompt: String,
        #[arg(long, short, default_value = SMBP_FILE_NAME, help = "Where to write the .smbp file.")]
        output: PathBuf,
    },
    /// Convert a saved logic JSON document into a .smbp file.
    Export {
        #[arg(help = "Logic JSON as returned by the generator.")]
        input: PathBuf,
        #[arg(long, short, default_value = SMBP_FILE_NAME, help = "Where to write the .smbp file.")]
        output: PathBuf,
    },
}

fn gemini_config(model: Option<String>) -> GeminiConfig {
    let mut config = GeminiConfig::from_env();
    if let Some(model) = model {
        config.model = model;
    }
    config
}

fn write_smbp(logic: &LogicResponse, output: &Path) -> Result<()> {
    std::fs::write(output, smbp::to_download_bytes(logic))
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!(
        "Wrote {} ({} rungs, {} variables)",
        output.display(),
        logic.rungs.len(),
        logic.variables.len()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for GEMINI_API_KEY)
    dotenvy::dotenv().ok();

    // Reads log level from RUST_LOG environment variable (e.g., RUST_LOG=info,ecologic=debug)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    info!("EcoLogic starting with command: {:?}", cli.command);

    let config = gemini_config(cli.model);

    match cli.command {
        Commands::Serve { port } => {
            if config.api_key.is_empty() {
                warn!("GEMINI_API_KEY is not set; every generation will fail");
            }
            info!(model = %config.model, "Starting web UI on port {}...", port);

            let state = web_server::WebState::new(GeminiClient::new(config))?;
            let mut web_server_handle = tokio::spawn(async move {
                if let Err(e) = web_server::start_web_server(port, state).await {
                    error!("Web server failed: {:?}", e);
                }
            });

            let ctrl_c = tokio::signal::ctrl_c();
            tokio::pin!(ctrl_c);

            tokio::select! {
                _ = &mut ctrl_c => {
                    info!("Ctrl-C received, initiating shutdown...");
                }
                res = &mut web_server_handle => {
                    match res {
                        Ok(_) => info!("Web server task completed unexpectedly."),
                        Err(e) if e.is_panic() => error!("Web server task panicked: {:?}", e),
                        Err(e) => error!("Web server task failed: {:?}", e),
                    }
                }
            }

            if !web_server_handle.is_finished() {
                info!("Aborting web server task...");
                web_server_handle.abort();
            }
            info!("Shutdown complete.");
        }
        Commands::Generate { prompt, output } => {
            let client = GeminiClient::new(config);
            let logic = client
                .generate(&prompt)
                .await
                .context(GENERATION_FAILED_MESSAGE)?;
            println!("{}\n", logic.description);
            println!("{}\n", logic.joined_instruction_lines());
            write_smbp(&logic, &output)?;
        }
        Commands::Export { input, output } => {
            let text = std::fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let logic = LogicResponse::from_json(&text)
                .with_context(|| format!("{} is not a valid logic document", input.display()))?;
            write_smbp(&logic, &output)?;
        }
    }

    Ok(())
}
