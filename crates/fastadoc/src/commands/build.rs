//! Static site build command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use fastadoc_static::{BuildMode, StaticBuilder};

use super::config::ConfigFile;

/// Run the build command.
pub async fn run(
    config_path: &Path,
    output: Option<PathBuf>,
    dev: bool,
    minify: Option<bool>,
) -> Result<()> {
    let mode = if dev {
        BuildMode::Development
    } else {
        BuildMode::Production
    };
    tracing::info!("Building static site ({:?})...", mode);

    let file_config = ConfigFile::load(config_path)?;
    let mut config = file_config.build_config(mode);
    if let Some(output) = output {
        config.output_dir = output;
    }
    if let Some(minify) = minify {
        config.minify = minify;
    }

    let result = tokio::task::spawn_blocking(move || StaticBuilder::new(config).build()).await??;

    tracing::info!(
        "Built {} pages ({} posts, {} tags) in {}ms",
        result.pages,
        result.posts,
        result.tags,
        result.duration_ms
    );

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
