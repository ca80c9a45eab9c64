//! quire CLI - static-site build configuration resolver.

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use quire_config::BuildMode;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "quire")]
#[command(about = "Resolve layouts, blog routes and build settings for a static site")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to site.toml config file
    #[arg(short, long, default_value = "site.toml", global = true)]
    config: PathBuf,

    /// Build mode: dev or build
    #[arg(short, long, env = "QUIRE_MODE", default_value = "dev", global = true)]
    mode: BuildMode,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter site.toml and source tree
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,

        /// Source directory to create
        #[arg(short, long, default_value = "source")]
        source: PathBuf,
    },

    /// Show the settings resolved for an output path
    Resolve {
        /// Output path, e.g. /blog/index.html
        path: String,

        /// Treat the page as a blog article
        #[arg(long)]
        article: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Match a source path against the blog sources pattern
    Route {
        /// Source path, e.g. blog/2024-01-15-hello-world.html
        path: String,
    },

    /// Resolve every file of the source tree into a JSON build plan
    Plan {
        /// Source directory
        #[arg(short, long, default_value = "source")]
        source: PathBuf,

        /// Write the plan to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Fail when a page has no layout and no default layout exists
        #[arg(long)]
        require_layout: bool,
    },

    /// Render a markdown file with the site's markdown options
    Render {
        /// Markdown file
        file: PathBuf,
    },

    /// Create a new blog article
    Article {
        /// Article title
        title: String,

        /// Publication date (defaults to today)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Tag to attach (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Source directory
        #[arg(short, long, default_value = "source")]
        source: PathBuf,

        /// Overwrite an existing article
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Init { yes, source } => {
            commands::init::run(&cli.config, &source, yes)?;
        }
        Commands::Resolve {
            path,
            article,
            json,
        } => {
            commands::resolve::run(&cli.config, cli.mode, &path, article, json)?;
        }
        Commands::Route { path } => {
            commands::route::run(&cli.config, &path)?;
        }
        Commands::Plan {
            source,
            output,
            require_layout,
        } => {
            commands::plan::run(&cli.config, cli.mode, &source, output, require_layout)?;
        }
        Commands::Render { file } => {
            commands::render::run(&cli.config, &file)?;
        }
        Commands::Article {
            title,
            date,
            tags,
            source,
            force,
        } => {
            commands::article::run(&cli.config, &source, &title, date, &tags, force)?;
        }
    }

    Ok(())
}
