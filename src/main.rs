use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use stepguide::config::Config;
use stepguide::logging;
use stepguide::rest;
use stepguide::steps::{sort_identifiers, StatusFilter, StepIdentifier, StepStatus};
use stepguide::store::Guide;

#[derive(Parser)]
#[command(name = "stepguide")]
#[command(about = "Step-by-step guides disclosed one step at a time")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST API server over the configured guide and state directories
    Serve {
        /// Port to listen on (default: 7010)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print step identifiers in guide order
    Sort {
        /// Identifiers such as 1, 1a, 2, 10
        #[arg(required = true)]
        identifiers: Vec<String>,
    },

    /// Validate a guide file and summarize its steps
    Check {
        /// Path to a guide JSON document
        path: String,
    },

    /// Write the active configuration to .stepguide/config.toml
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Print the OpenAPI document
    Openapi {
        /// Emit YAML instead of JSON
        #[arg(long)]
        yaml: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;

    let is_server = matches!(cli.command, Commands::Serve { .. });
    let logging_handle = logging::init_logging(&config, is_server, cli.debug)?;

    match cli.command {
        Commands::Serve { port } => {
            if let Some(log_path) = &logging_handle.log_file_path {
                eprintln!("Logging to {}", log_path.display());
            }
            cmd_serve(&config, port).await?;
        }
        Commands::Sort { identifiers } => {
            cmd_sort(&identifiers)?;
        }
        Commands::Check { path } => {
            cmd_check(&path)?;
        }
        Commands::Init { force } => {
            cmd_init(&config, force)?;
        }
        Commands::Openapi { yaml } => {
            cmd_openapi(yaml)?;
        }
    }

    Ok(())
}

async fn cmd_serve(config: &Config, port: Option<u16>) -> Result<()> {
    let port = port.unwrap_or(config.api.port);

    println!("Starting REST API server...");
    println!("  Port:   {}", port);
    println!("  Guides: {}", config.guides_path().display());
    println!("  State:  {}", config.state_path().display());
    println!("  Endpoints:");
    println!("    GET  /api/v1/health                          Health check");
    println!("    POST /api/v1/sessions                        Start a session");
    println!("    GET  /api/v1/sessions/:id/current            Current step");
    println!("    POST /api/v1/sessions/:id/advance            Complete current step");
    println!("    POST /api/v1/sessions/:id/retreat            Previous step");
    println!("    POST /api/v1/sessions/:id/jump               Jump to section");
    println!("    GET  /api/v1/sessions/:id/progress           Progress");
    println!("    GET  /api/v1/sessions/:id/sections/:section  Section overview");
    println!("    POST /api/v1/guides/:guide_id/adaptations    Block a step");
    println!();

    tokio::fs::create_dir_all(config.sessions_path())
        .await
        .context("Failed to create session state directory")?;

    let state = rest::ApiState::from_config(config);
    rest::serve(state, port).await?;

    Ok(())
}

fn cmd_sort(identifiers: &[String]) -> Result<()> {
    let sorted = sort_identifiers(identifiers)?;
    let line: Vec<String> = sorted.iter().map(StepIdentifier::format).collect();
    println!("{}", line.join(" "));
    Ok(())
}

fn cmd_check(path: &str) -> Result<()> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
    let guide: Guide =
        serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path))?;

    let collection = match guide.collection() {
        Ok(collection) => collection,
        Err(e) => bail!("Guide '{}' is invalid: {}", guide.guide_id, e),
    };

    println!("Guide: {} ({})", guide.title, guide.guide_id);
    println!("  Steps:        {}", collection.len());
    println!(
        "  Navigable:    {}",
        collection.filtered(StatusFilter::NAVIGABLE).count()
    );
    println!(
        "  Blocked:      {}",
        collection.filtered(StatusFilter::BLOCKED).count()
    );
    println!("  Adaptations:  {}", guide.adaptation_history.len());
    println!();

    let mut sections = guide.sections.clone();
    sections.sort_by_key(|s| s.order);
    for section in &sections {
        println!("[{}] {}", section.section_id, section.title);
        for step in collection.in_section(&section.section_id) {
            let marker = match step.status {
                StepStatus::Active => "  ",
                StepStatus::Blocked => "x ",
                StepStatus::Alternative => "~ ",
            };
            println!("  {}{:<6} {}", marker, step.identifier.format(), step.title);
        }
    }

    let undeclared = guide.undeclared_sections();
    if !undeclared.is_empty() {
        let names: Vec<&str> = undeclared.into_iter().collect();
        eprintln!();
        eprintln!(
            "warning: steps reference undeclared sections: {}",
            names.join(", ")
        );
    }

    Ok(())
}

fn cmd_init(config: &Config, force: bool) -> Result<()> {
    let path = Config::local_config_path();
    config.init_at(&path, force)?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn cmd_openapi(yaml: bool) -> Result<()> {
    let document = if yaml {
        rest::ApiDoc::yaml().context("Failed to render OpenAPI YAML")?
    } else {
        rest::ApiDoc::json().context("Failed to render OpenAPI JSON")?
    };
    println!("{}", document);
    Ok(())
}
