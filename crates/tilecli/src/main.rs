use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tilecore::{DefinitionStore, DefinitionStores, EventRegistry, DEFAULT_GLOBAL_EVENTS};
use tilewire::{
    load_definition_metadata, DefinitionWirer, MountPlan, NoopRouteSetup, NoopServiceSetup,
};

#[derive(Parser)]
#[command(name = "tile")]
#[command(about = "Tile Host CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dry-run discovery over a definitions root and show what would be wired
    Scan {
        /// Path to the definitions root directory
        #[arg(short, long, default_value = "./definitions")]
        root: PathBuf,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate a single definition directory's descriptor
    Validate {
        /// Path to a definition directory
        dir: PathBuf,
    },

    /// List the global (system-wide) event names
    Events,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan { root, verbose } => {
            let level = if verbose {
                tracing::Level::DEBUG
            } else {
                tracing::Level::WARN
            };
            tracing_subscriber::fmt().with_max_level(level).init();

            scan(root).await?;
        }

        Commands::Validate { dir } => {
            validate(dir).await?;
        }

        Commands::Events => {
            println!("Global event names:");
            for event in DEFAULT_GLOBAL_EVENTS {
                println!("  - {}", event);
            }
        }
    }

    Ok(())
}

async fn scan(root: PathBuf) -> Result<()> {
    println!("Scanning definitions root: {}", root.display());

    let stores = DefinitionStores::in_memory();
    let plan = Arc::new(MountPlan::new());
    let wirer = DefinitionWirer::new(
        stores.clone(),
        Arc::new(EventRegistry::new()),
        plan.clone(),
        Arc::new(NoopRouteSetup),
        Arc::new(NoopServiceSetup),
    );

    wirer.wire_all_definitions(&root).await?;

    let mounts = plan.static_mounts();
    println!();
    println!("Static mounts ({}):", mounts.len());
    for mount in &mounts {
        println!("  {} -> {}", mount.url_prefix, mount.dir.display());
    }

    let tiles = stores.tiles.find_all().await?;
    println!();
    println!("Tile definitions ({}):", tiles.len());
    for tile in &tiles {
        println!(
            "  {} (id: {})",
            tile.definition_dir_name.as_deref().unwrap_or("?"),
            tile.id.as_deref().unwrap_or("-")
        );
    }

    let streams = stores.activity_streams.find_all().await?;
    println!();
    println!("Activity-stream definitions ({}):", streams.len());
    for stream in &streams {
        println!(
            "  {} (id: {})",
            stream.definition_dir_name.as_deref().unwrap_or("?"),
            stream.id.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}

async fn validate(dir: PathBuf) -> Result<()> {
    println!("Validating definition: {}", dir.display());

    let meta = tokio::fs::metadata(&dir).await?;
    if !meta.is_dir() {
        anyhow::bail!("{} is not a directory", dir.display());
    }

    let stores = DefinitionStores::in_memory();
    match load_definition_metadata(&stores, &dir.join("definition.json")).await? {
        Some(definition) => {
            println!("Descriptor is valid:");
            println!("{}", serde_json::to_string_pretty(&definition)?);
        }
        None => {
            println!("No definition.json present (valid; contributes no metadata)");
        }
    }

    if !dir.join("public").is_dir() {
        println!("Note: no public/ directory; nothing will be served for this definition");
    }

    Ok(())
}
