//! Development server command.

use std::path::Path;

use anyhow::Result;
use fastadoc_server::{DevServer, DevServerConfig};
use fastadoc_static::BuildMode;

use super::config::ConfigFile;

/// Command-line options of `fastadoc dev`.
#[derive(Debug, Clone)]
pub struct DevOptions {
    pub port: u16,
    pub all_interfaces: bool,
    pub open: bool,
    pub save_endpoint: Option<String>,
}

/// Run the dev server.
pub async fn run(config_path: &Path, options: DevOptions) -> Result<()> {
    let file_config = ConfigFile::load(config_path)?;

    let host = if options.all_interfaces {
        tracing::warn!("Listening on all interfaces; settings routes stay loopback-only");
        "0.0.0.0"
    } else {
        "127.0.0.1"
    };

    tracing::info!("Starting development server on port {}", options.port);

    let config = DevServerConfig {
        build: file_config.build_config(BuildMode::Development),
        port: options.port,
        host: host.to_string(),
        open: options.open,
        save_endpoint: options.save_endpoint,
    };

    DevServer::new(config).start().await?;

    Ok(())
}
