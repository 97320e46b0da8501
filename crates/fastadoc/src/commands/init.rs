//! Scaffold a blog in a project.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use fastadoc_settings::SiteConfig;

/// Run the init command.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing fastadoc...");

    scaffold(Path::new("."), config_path, yes)?;

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'fastadoc dev' to start the development server.");

    Ok(())
}

/// Write the starter files under `root`, keeping existing ones unless `yes`.
fn scaffold(root: &Path, config_path: &Path, yes: bool) -> Result<()> {
    let src_dir = root.join("src");

    if src_dir.exists() && !yes {
        tracing::warn!("src/ directory already exists. Use --yes to overwrite.");
        return Ok(());
    }

    let posts_dir = src_dir.join("posts");
    fs::create_dir_all(&posts_dir).context("Failed to create src/posts")?;
    fs::create_dir_all(src_dir.join("_includes")).context("Failed to create src/_includes")?;
    fs::create_dir_all(root.join("public")).context("Failed to create public")?;

    write_file(&root.join(config_path), DEFAULT_TOOL_CONFIG, yes)?;
    write_file(&posts_dir.join("hello.adoc"), DEFAULT_POST, yes)?;
    write_file(&src_dir.join("about.adoc"), DEFAULT_ABOUT, yes)?;

    let site_config = root.join("config.json");
    if !site_config.exists() || yes {
        SiteConfig::default()
            .save(&site_config)
            .context("Failed to write config.json")?;
        tracing::info!("Created config.json");
    }

    Ok(())
}

fn write_file(path: &Path, content: &str, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        return Ok(());
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Created {}", path.display());
    Ok(())
}

const DEFAULT_TOOL_CONFIG: &str = r#"# fastadoc configuration

[site]
title = "My Blog"
base_url = "/"

[paths]
# Source documents; posts live in <input>/posts
input = "src"
# Built site
output = "_site"
# Copied verbatim into the output
public = "public"
# Theme and comments settings, edited at /setup/ by 'fastadoc dev'
config = "config.json"

[build]
minify = true
"#;

const DEFAULT_POST: &str = r#"= Hello, fastadoc
:revdate: 2024-01-01
:tags: meta
:description: The first post of this blog.

Welcome to your new blog.

== Writing posts

Add `.adoc` or `.md` files to `src/posts/`. The document title, `:revdate:`,
`:tags:` and `:description:` attributes become the post's metadata.

== Settings

Run `fastadoc dev` and open `/setup/` to pick a theme and a comments provider.
"#;

const DEFAULT_ABOUT: &str = r#"= About

Something about the author.
"#;
