//! CLI entry point for spacetraveling

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spacetraveling::server::ServerOptions;
use spacetraveling::Blog;

#[derive(Parser)]
#[command(name = "spacetraveling")]
#[command(version)]
#[command(about = "A static blog generator for posts kept in a headless CMS", long_about = None)]
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
    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Generate static files
    #[command(alias = "g")]
    Generate {
        /// Read posts from a JSON file of raw documents instead of the API
        #[arg(short, long)]
        fixture: Option<PathBuf>,
    },

    /// Start a local server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Enable static mode (no periodic regeneration)
        #[arg(long)]
        r#static: bool,

        /// Read posts from a JSON file of raw documents instead of the API
        #[arg(short, long)]
        fixture: Option<PathBuf>,
    },

    /// List posts from the content source
    List {
        /// Walk every listing page instead of the first one
        #[arg(short, long)]
        all: bool,

        /// Read posts from a JSON file of raw documents instead of the API
        #[arg(short, long)]
        fixture: Option<PathBuf>,
    },

    /// Clean the public folder
    Clean,

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
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            spacetraveling::commands::init::init_site(&target_dir)?;
            println!("Initialized site in {:?}", target_dir);
        }

        Commands::Generate { fixture } => {
            let blog = Blog::new(&base_dir)?;
            tracing::info!("Generating static files...");

            let report = blog.generate(fixture.as_deref()).await?;
            println!(
                "Generated successfully! {} listing pages, {} posts ({} skipped)",
                report.listing_pages, report.posts_written, report.posts_skipped
            );
        }

        Commands::Server {
            port,
            ip,
            open,
            r#static,
            fixture,
        } => {
            let blog = Blog::new(&base_dir)?;

            // Generate first
            tracing::info!("Generating static files...");
            blog.generate(fixture.as_deref()).await?;

            tracing::info!("Starting server at http://{}:{}", ip, port);
            let options = ServerOptions {
                ip,
                port,
                revalidate: !r#static,
                open,
                fixture,
            };
            spacetraveling::server::start(&blog, options).await?;
        }

        Commands::List { all, fixture } => {
            let blog = Blog::new(&base_dir)?;
            let source = blog.source(fixture.as_deref())?;
            spacetraveling::commands::list::run(&blog, source.as_ref(), all).await?;
        }

        Commands::Clean => {
            let blog = Blog::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            blog.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::Version => {
            println!("spacetraveling version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
