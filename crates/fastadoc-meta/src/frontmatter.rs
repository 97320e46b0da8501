//! Frontmatter extraction and parsing.

use serde::Deserialize;

/// Tags as written in front matter: either a YAML sequence or one
/// comma-separated string.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TagField {
    List(Vec<String>),
    Text(String),
}

/// Explicit page fields from a YAML front matter block.
///
/// Every field is optional; whatever is set here wins over anything
/// derived from the attribute block.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Frontmatter {
    /// Page title
    #[serde(default)]
    pub title: Option<String>,

    /// Template identifier
    #[serde(default)]
    pub layout: Option<String>,

    #[serde(default)]
    pub author: Option<String>,

    /// Page description for SEO
    #[serde(default)]
    pub description: Option<String>,

    /// Hero image URL or path
    #[serde(default)]
    pub image: Option<String>,

    /// External profile handle of the author
    #[serde(default)]
    pub profile: Option<String>,

    #[serde(default)]
    pub tags: Option<TagField>,

    /// Publication date, kept verbatim
    #[serde(default)]
    pub date: Option<String>,
}

/// Extract frontmatter from a document.
///
/// Returns the parsed frontmatter and the remaining content after the frontmatter block.
pub fn extract_frontmatter(source: &str) -> Result<(Option<Frontmatter>, &str), FrontmatterError> {
    let Some((yaml_content, remaining)) = split_frontmatter(source)? else {
        return Ok((None, source));
    };

    let frontmatter: Frontmatter = serde_yaml::from_str(yaml_content)
        .map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?;

    Ok((Some(frontmatter), remaining))
}

/// Strip a leading frontmatter block without parsing it.
///
/// An unclosed block yields an empty body.
pub fn body_of(source: &str) -> &str {
    match split_frontmatter(source) {
        Ok(Some((_, remaining))) => remaining,
        Ok(None) => source,
        Err(_) => "",
    }
}

fn split_frontmatter(source: &str) -> Result<Option<(&str, &str)>, FrontmatterError> {
    let trimmed = source.trim_start();

    if !trimmed.starts_with("---") {
        return Ok(None);
    }

    // Find the closing ---
    let after_open = &trimmed[3..];
    let Some(close_pos) = after_open.find("\n---") else {
        return Err(FrontmatterError::Unclosed);
    };

    let yaml_content = after_open[..close_pos].trim();
    let remaining = &after_open[close_pos + 4..];

    Ok(Some((yaml_content, remaining.trim_start())))
}

/// Errors that can occur when parsing frontmatter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Unclosed frontmatter block - missing closing ---")]
    Unclosed,

    #[error("Invalid YAML in frontmatter: {0}")]
    InvalidYaml(String),
}
