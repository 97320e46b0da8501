//! fastadoc CLI - AsciiDoc blog generator with a local settings editor.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "fastadoc")]
#[command(about = "AsciiDoc blog generator")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to fastadoc.toml config file
    #[arg(short, long, default_value = "fastadoc.toml", global = true)]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold a blog in the current directory
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },

    /// Start development server with live reload and the settings page
    Dev {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Listen on all interfaces instead of loopback
        #[arg(long)]
        host: bool,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,

        /// Save settings through this server instead of the local config.json
        #[arg(long)]
        save_endpoint: Option<String>,
    },

    /// Build the static site
    Build {
        /// Output directory (defaults to config or "_site")
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Build with development-only links and scripts
        #[arg(long)]
        dev: bool,

        /// Skip minification
        #[arg(long)]
        no_minify: bool,
    },

    /// Preview the built site
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// Directory to serve (defaults to config or "_site")
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Accept config saves and commit them to the repository
        #[arg(long)]
        hosted: bool,

        /// Token for the repository contents API
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        github_token: Option<String>,

        /// Repository as owner/name
        #[arg(long, env = "GITHUB_REPO")]
        github_repo: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(&cli.config, yes).await?;
        }
        Commands::Dev {
            port,
            host,
            no_open,
            save_endpoint,
        } => {
            let options = commands::dev::DevOptions {
                port,
                all_interfaces: host,
                open: !no_open,
                save_endpoint,
            };
            commands::dev::run(&cli.config, options).await?;
        }
        Commands::Build {
            output,
            dev,
            no_minify,
        } => {
            let minify = if no_minify { Some(false) } else { None };
            commands::build::run(&cli.config, output, dev, minify).await?;
        }
        Commands::Serve {
            port,
            dir,
            hosted,
            github_token,
            github_repo,
        } => {
            let hosted = hosted.then(|| {
                let token = github_token.or_else(|| std::env::var("VERCEL_GITHUB_TOKEN").ok());
                fastadoc_server::HostedConfig::new(token, github_repo)
            });
            commands::serve::run(&cli.config, port, dir, hosted).await?;
        }
    }

    Ok(())
}
