//! Static site builder.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use walkdir::WalkDir;

use fastadoc_meta::{
    excerpt, reading_time, slugify, tag_universe, AttributeCache, Document, ResolvedMetadata,
    Resolver, SENTINEL_TAGS,
};
use fastadoc_settings::{CommentsEmbed, Loaded, SiteConfig};

use crate::assets::AssetPipeline;
use crate::markup::RendererRegistry;
use crate::templates::{PageContext, PostSummary, SiteContext, TagLink, TemplateEngine, DEFAULT_LAYOUT};

/// Whether a build is for local development or for publishing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildMode {
    /// Adds the settings link and the live reload client
    Development,
    #[default]
    Production,
}

impl BuildMode {
    pub fn is_development(self) -> bool {
        self == Self::Development
    }
}

/// Configuration for building a static site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Source documents directory
    pub input_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Files copied verbatim to the output root
    pub public_dir: PathBuf,

    /// Site configuration (`config.json`)
    pub config_path: PathBuf,

    /// Base URL for the site
    pub base_url: String,

    /// Site title
    pub title: String,

    /// Minify CSS output
    pub minify: bool,

    pub mode: BuildMode,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("src"),
            output_dir: PathBuf::from("_site"),
            public_dir: PathBuf::from("public"),
            config_path: PathBuf::from("config.json"),
            base_url: "/".to_string(),
            title: "Blog".to_string(),
            minify: true,
            mode: BuildMode::Production,
        }
    }
}

impl BuildConfig {
    /// Documents under this directory are posts.
    pub fn posts_dir(&self) -> PathBuf {
        self.input_dir.join("posts")
    }

    /// User layouts and partials.
    pub fn includes_dir(&self) -> PathBuf {
        self.input_dir.join("_includes")
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of pages generated, tag pages included
    pub pages: usize,

    /// Number of posts among them
    pub posts: usize,

    /// Number of distinct tags
    pub tags: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read input: {0}")]
    ReadError(String),

    #[error("Failed to render template {name}: {message}")]
    TemplateError { name: String, message: String },

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

/// A document ready to be written.
#[derive(Debug)]
struct PageInfo {
    /// Source file path
    source_path: PathBuf,

    /// Output path
    output_path: PathBuf,

    url: String,

    /// Rendered body HTML
    content: String,

    meta: ResolvedMetadata,

    reading_time: String,

    is_post: bool,

    /// The root `index` document, rendered as the home page
    is_home: bool,

    /// Collections the page belongs to: the sentinel tags plus its own tags
    collections: Vec<String>,
}

/// Static site builder.
pub struct StaticBuilder {
    config: BuildConfig,
    registry: RendererRegistry,
    templates: TemplateEngine,
    resolver: Resolver,
}

impl StaticBuilder {
    /// Create a new static builder.
    pub fn new(config: BuildConfig) -> Self {
        let includes = config.includes_dir();
        let templates = TemplateEngine::new(includes.is_dir().then_some(includes.as_path()));
        let resolver = Resolver::new(config.posts_dir());

        Self {
            config,
            registry: RendererRegistry::new(),
            templates,
            resolver,
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Build the static site.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        if !self.config.input_dir.is_dir() {
            return Err(BuildError::ReadError(format!(
                "Input directory not found: {}",
                self.config.input_dir.display()
            )));
        }

        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let site_config = self.load_site_config();
        let site = SiteContext {
            title: self.config.title.clone(),
            base_url: self.config.base_url.clone(),
            theme: site_config.theme.clone(),
            dev: self.config.mode.is_development(),
        };

        let mut pages = self.discover_pages();
        pages.sort_by(|a, b| newest_first(&a.meta, &b.meta));

        let tags = group_tags(&tag_universe(pages.iter().map(|p| &p.meta)));
        let posts: Vec<PostSummary> = pages
            .iter()
            .filter(|p| p.is_post)
            .map(|p| self.summary(p))
            .collect();

        // Public files first so generated pages win on conflicts
        self.copy_public()?;

        let comments = CommentsEmbed::from_config(&site_config).page_html();

        let results: Vec<Result<(), BuildError>> = pages
            .par_iter()
            .map(|page| self.build_page(page, &site, &site_config, comments.as_deref(), &posts))
            .collect();

        let mut total_pages = 0;
        for result in results {
            result?;
            total_pages += 1;
        }

        if !pages.iter().any(|p| p.is_home) {
            self.build_home(&site, &posts)?;
            total_pages += 1;
        }

        total_pages += self.build_tag_pages(&site, &pages, &tags)?;

        self.generate_assets()?;

        let duration = start.elapsed();

        Ok(BuildResult {
            pages: total_pages,
            posts: posts.len(),
            tags: tags.len(),
            duration_ms: duration.as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    fn load_site_config(&self) -> SiteConfig {
        match SiteConfig::load(&self.config.config_path) {
            Loaded::Read(config) => config,
            Loaded::Fallback(config, e) => {
                tracing::warn!("Using default site configuration: {}", e);
                config
            }
        }
    }

    /// Discover, render and resolve every document in the input directory.
    fn discover_pages(&self) -> Vec<PageInfo> {
        let mut cache = AttributeCache::new();
        let mut pages = Vec::new();

        let walker = WalkDir::new(&self.config.input_dir)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_private(e.path()));

        for entry in walker.filter_map(|e| e.ok()) {
            let path = entry.path();

            if !path.is_file() || !self.registry.handles(path) {
                continue;
            }

            let source = match fs::read_to_string(path) {
                Ok(source) => source,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };

            let derived = Document::from_source(path, &source);
            if let Some(reason) = derived.reason() {
                tracing::debug!("{}", reason);
            }
            let doc = derived.into_value();

            let body = doc.body.as_deref().unwrap_or_default();
            let content = match self.registry.render(path, body) {
                Ok(html) => html,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };

            let doc = doc.with_excerpt(excerpt(&content));
            let meta = self.resolver.resolve(&doc, &mut cache);
            if cache.is_degraded(path) {
                tracing::debug!("No attributes read for {}", path.display());
            }

            let relative_path = path
                .strip_prefix(&self.config.input_dir)
                .unwrap_or(path)
                .to_path_buf();
            let output_path = self.calculate_output_path(&relative_path);
            let is_home = relative_path.parent() == Some(Path::new(""))
                && relative_path.file_stem().and_then(|s| s.to_str()) == Some("index");

            let mut collections: Vec<String> = vec![SENTINEL_TAGS[0].to_string()];
            if self.registry.for_path(path).map(|r| r.name()) == Some("asciidoc") {
                collections.push(SENTINEL_TAGS[1].to_string());
            }
            collections.extend(meta.tags.iter().cloned());

            pages.push(PageInfo {
                source_path: path.to_path_buf(),
                url: self.path_to_url(&output_path),
                output_path,
                reading_time: reading_time(&content),
                content,
                is_post: self.resolver.is_post(&doc),
                is_home,
                collections,
                meta,
            });
        }

        pages
    }

    /// Calculate output path for a page.
    fn calculate_output_path(&self, relative: &Path) -> PathBuf {
        let stem = relative
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("index");
        let parent = relative.parent().unwrap_or(Path::new(""));

        if stem == "index" {
            // src/index.adoc -> _site/index.html
            self.config.output_dir.join(parent).join("index.html")
        } else {
            // src/posts/hello.adoc -> _site/posts/hello/index.html
            self.config
                .output_dir
                .join(parent)
                .join(stem)
                .join("index.html")
        }
    }

    /// Convert output path to URL.
    fn path_to_url(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.config.output_dir).unwrap_or(path);
        let url = relative
            .parent()
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .unwrap_or_default();

        if url.is_empty() {
            self.config.base_url.clone()
        } else {
            format!("{}{}/", self.config.base_url, url)
        }
    }

    fn tag_url(&self, tag: &str) -> String {
        format!("{}tags/{}/", self.config.base_url, slugify(tag))
    }

    fn tag_links(&self, tags: &[String]) -> Vec<TagLink> {
        tags.iter()
            .map(|tag| TagLink {
                name: tag.clone(),
                url: self.tag_url(tag),
            })
            .collect()
    }

    fn summary(&self, page: &PageInfo) -> PostSummary {
        PostSummary {
            title: page.meta.title.clone(),
            url: page.url.clone(),
            date: page.meta.date.clone(),
            description: page.meta.description.clone(),
            reading_time: page.reading_time.clone(),
            tags: self.tag_links(&page.meta.tags),
        }
    }

    /// Pick the template for a page, falling back to the default layout.
    fn layout_for(&self, page: &PageInfo) -> String {
        if page.is_home {
            return "index.html".to_string();
        }

        match page.meta.layout.as_deref() {
            Some(layout) if self.templates.has_layout(layout) => layout.to_string(),
            Some(layout) => {
                tracing::warn!(
                    "Unknown layout '{}' in {}, using {}",
                    layout,
                    page.source_path.display(),
                    DEFAULT_LAYOUT
                );
                DEFAULT_LAYOUT.to_string()
            }
            None => DEFAULT_LAYOUT.to_string(),
        }
    }

    /// Build a single page.
    fn build_page(
        &self,
        page: &PageInfo,
        site: &SiteContext,
        site_config: &SiteConfig,
        comments: Option<&str>,
        posts: &[PostSummary],
    ) -> Result<(), BuildError> {
        let layout = self.layout_for(page);

        // An author key from the site config expands to the full profile
        let author = page
            .meta
            .author
            .as_ref()
            .map(|key| (key, site_config.authors.get(key)));

        let context = PageContext {
            meta: page.meta.clone(),
            url: page.url.clone(),
            content: page.content.clone(),
            reading_time: page.reading_time.clone(),
            tags: self.tag_links(&page.meta.tags),
            author_name: author.map(|(key, profile)| {
                profile
                    .and_then(|p| p.name.clone())
                    .unwrap_or_else(|| key.clone())
            }),
            author_url: author.and_then(|(_, profile)| profile?.url.clone()),
            author_avatar: author.and_then(|(_, profile)| profile?.avatar.clone()),
            comments: page.is_post.then(|| comments.map(str::to_string)).flatten(),
        };

        let html = self
            .templates
            .render_page(&layout, site, &context, posts)
            .map_err(|e| BuildError::TemplateError {
                name: layout.clone(),
                message: e.to_string(),
            })?;

        write_file(&page.output_path, &html)
    }

    /// Home page when the input has no root `index` document.
    fn build_home(&self, site: &SiteContext, posts: &[PostSummary]) -> Result<(), BuildError> {
        let context = PageContext {
            meta: ResolvedMetadata {
                title: self.config.title.clone(),
                ..Default::default()
            },
            url: self.config.base_url.clone(),
            content: String::new(),
            reading_time: String::new(),
            tags: Vec::new(),
            author_name: None,
            author_url: None,
            author_avatar: None,
            comments: None,
        };

        let html = self
            .templates
            .render_page("index.html", site, &context, posts)
            .map_err(|e| BuildError::TemplateError {
                name: "index.html".to_string(),
                message: e.to_string(),
            })?;

        write_file(&self.config.output_dir.join("index.html"), &html)
    }

    /// Write `/tags/` and one page per tag slug. Returns the number of pages written.
    fn build_tag_pages(
        &self,
        site: &SiteContext,
        pages: &[PageInfo],
        groups: &[TagGroup],
    ) -> Result<usize, BuildError> {
        let links: Vec<TagLink> = groups
            .iter()
            .map(|group| TagLink {
                name: group.name().to_string(),
                url: self.tag_url(&group.slug),
            })
            .collect();

        let tags_dir = self.config.output_dir.join("tags");
        let html = self
            .templates
            .render_tags(site, &links)
            .map_err(|e| BuildError::TemplateError {
                name: "tags.html".to_string(),
                message: e.to_string(),
            })?;
        write_file(&tags_dir.join("index.html"), &html)?;

        for group in groups {
            let tagged: Vec<PostSummary> = pages
                .iter()
                .filter(|p| p.collections.iter().any(|c| group.names.contains(c)))
                .map(|p| self.summary(p))
                .collect();

            let html = self
                .templates
                .render_tag(site, group.name(), &tagged)
                .map_err(|e| BuildError::TemplateError {
                    name: "tag.html".to_string(),
                    message: e.to_string(),
                })?;
            write_file(&tags_dir.join(&group.slug).join("index.html"), &html)?;
        }

        Ok(groups.len() + 1)
    }

    /// Copy the public directory verbatim into the output root.
    fn copy_public(&self) -> Result<(), BuildError> {
        let public = &self.config.public_dir;
        if !public.is_dir() {
            return Ok(());
        }

        for entry in WalkDir::new(public).follow_links(true).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(public).unwrap_or(path);
            let target = self.config.output_dir.join(relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
            }
            fs::copy(path, &target).map_err(|e| {
                BuildError::WriteError(format!("{}: {}", target.display(), e))
            })?;
        }

        Ok(())
    }

    /// Generate static assets.
    fn generate_assets(&self) -> Result<(), BuildError> {
        let css = AssetPipeline::generate_css();
        let css = if self.config.minify {
            AssetPipeline::minify_css(&css).unwrap_or_else(|e| {
                tracing::warn!("{}", e);
                css
            })
        } else {
            css
        };

        write_file(&self.config.output_dir.join("assets").join("main.css"), &css)
    }
}

/// Directories starting with `_` hold layouts and data, not pages.
fn is_private(path: &Path) -> bool {
    path.is_dir()
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('_'))
}

/// Tags that share one page because they slugify alike (`Rust`, `rust`).
#[derive(Debug, Clone, PartialEq)]
struct TagGroup {
    slug: String,
    /// Spellings in universe order; the first one names the page
    names: Vec<String>,
}

impl TagGroup {
    fn name(&self) -> &str {
        &self.names[0]
    }
}

fn group_tags(tags: &[String]) -> Vec<TagGroup> {
    let mut groups: Vec<TagGroup> = Vec::new();
    for tag in tags {
        let slug = slugify(tag);
        if slug.is_empty() {
            tracing::warn!("Tag '{}' has no usable slug, skipping its page", tag);
            continue;
        }
        match groups.iter_mut().find(|g| g.slug == slug) {
            Some(group) => group.names.push(tag.clone()),
            None => groups.push(TagGroup {
                slug,
                names: vec![tag.clone()],
            }),
        }
    }
    groups
}

/// Newest date first, undated last, ties by title.
fn newest_first(a: &ResolvedMetadata, b: &ResolvedMetadata) -> std::cmp::Ordering {
    b.date.cmp(&a.date).then_with(|| a.title.cmp(&b.title))
}

fn write_file(path: &Path, contents: &str) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
    }
    fs::write(path, contents).map_err(|e| BuildError::WriteError(format!("{}: {}", path.display(), e)))
}
