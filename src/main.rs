//! CLI entry point for spacetraveling

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "spacetraveling")]
#[command(version = "0.1.0")]
#[command(about = "Server-rendered blog front-end over a headless content API", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the blog server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to (overrides config)
        #[arg(short, long)]
        ip: Option<String>,
    },

    /// Fetch the first page of posts and print their titles
    Check,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "spacetraveling=debug,info"
    } else {
        "spacetraveling=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = cli.cwd.unwrap_or_else(|| std::env::current_dir().unwrap());

    match cli.command {
        Commands::Serve { port, ip } => {
            let app = spacetraveling::SpaceTraveling::new(&base_dir)?;
            let ip = ip.unwrap_or_else(|| app.config.server.ip.clone());
            let port = port.unwrap_or(app.config.server.port);

            tracing::info!("Starting server at http://{}:{}", ip, port);
            spacetraveling::server::start(&app, &ip, port).await?;
        }

        Commands::Check => {
            let app = spacetraveling::SpaceTraveling::new(&base_dir)?;
            tracing::info!("Fetching first page from {}", app.config.content_api);

            let posts = spacetraveling::content::list::fetch_first_page(
                app.source.as_ref(),
                app.config.page_size,
                None,
            )
            .await?;

            for post in &posts.items {
                println!("{}  {}", post.uid, post.title);
            }
            if posts.has_more() {
                println!("... more pages available");
            }
        }

        Commands::Version => {
            println!("spacetraveling version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
