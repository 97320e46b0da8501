//! Template engine for rendering blog pages.

use std::path::Path;

use minijinja::{context, path_loader, Environment};
use serde::Serialize;

use fastadoc_meta::ResolvedMetadata;

/// Template used when a page names no layout or an unknown one.
pub const DEFAULT_LAYOUT: &str = "page.html";

/// A post as listed on the home and tag pages.
#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub title: String,
    pub url: String,
    pub date: Option<String>,
    pub description: Option<String>,
    pub reading_time: String,
    pub tags: Vec<TagLink>,
}

/// A tag with the URL of its page.
#[derive(Debug, Clone, Serialize)]
pub struct TagLink {
    pub name: String,
    pub url: String,
}

/// Site-wide values every template sees.
#[derive(Debug, Clone, Serialize)]
pub struct SiteContext {
    pub title: String,
    pub base_url: String,
    pub theme: String,
    /// Development build: settings link and live reload
    pub dev: bool,
}

/// Context for rendering one document.
#[derive(Debug, Clone, Serialize)]
pub struct PageContext {
    pub meta: ResolvedMetadata,
    pub url: String,
    pub content: String,
    pub reading_time: String,
    pub tags: Vec<TagLink>,
    pub author_name: Option<String>,
    pub author_url: Option<String>,
    pub author_avatar: Option<String>,
    /// Comments embed HTML, posts only
    pub comments: Option<String>,
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with the built-in layouts.
    ///
    /// Layout names not built in are looked up in `includes_dir`.
    pub fn new(includes_dir: Option<&Path>) -> Self {
        let mut env = Environment::new();

        for (name, source) in [
            ("base.html", BASE_TEMPLATE),
            ("page.html", PAGE_TEMPLATE),
            ("post.html", POST_TEMPLATE),
            ("index.html", INDEX_TEMPLATE),
            ("tags.html", TAGS_TEMPLATE),
            ("tag.html", TAG_TEMPLATE),
            ("post_list.html", POST_LIST_TEMPLATE),
        ] {
            env.add_template_owned(name.to_string(), source.to_string())
                .expect("built-in templates are valid");
        }

        if let Some(dir) = includes_dir {
            env.set_loader(path_loader(dir));
        }

        Self { env }
    }

    /// Whether `name` resolves to a template.
    pub fn has_layout(&self, name: &str) -> bool {
        self.env.get_template(name).is_ok()
    }

    /// Render a document with `layout`.
    pub fn render_page(
        &self,
        layout: &str,
        site: &SiteContext,
        page: &PageContext,
        posts: &[PostSummary],
    ) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(layout)?;

        tmpl.render(context! {
            site => site,
            page => page,
            title => &page.meta.title,
            description => &page.meta.description,
            image => &page.meta.image,
            content => &page.content,
            posts => posts,
        })
    }

    /// Render the tag index.
    pub fn render_tags(&self, site: &SiteContext, tags: &[TagLink]) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("tags.html")?;

        tmpl.render(context! {
            site => site,
            title => "Tags",
            tags => tags,
        })
    }

    /// Render the page listing the posts of one tag.
    pub fn render_tag(
        &self,
        site: &SiteContext,
        tag: &str,
        posts: &[PostSummary],
    ) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("tag.html")?;

        tmpl.render(context! {
            site => site,
            title => format!("Tagged \u{201c}{}\u{201d}", tag),
            tag => tag,
            posts => posts,
        })
    }
}

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en" data-theme="{{ site.theme }}">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{% if title and title != site.title %}{{ title }} - {% endif %}{{ site.title }}</title>
  {% if description %}<meta name="description" content="{{ description }}">
  {% endif %}{% if image %}<meta property="og:image" content="{{ image }}">
  {% endif %}<link rel="stylesheet" href="{{ site.base_url }}assets/main.css">
</head>
<body data-theme="{{ site.theme }}">
  <header class="site-header">
    <a href="{{ site.base_url }}" class="site-title">{{ site.title }}</a>
    <nav class="site-nav">
      <a href="{{ site.base_url }}">Home</a>
      <a href="{{ site.base_url }}tags/">Tags</a>
      {% if site.dev %}<a href="/setup/" class="dev-only">Setup</a>{% endif %}
    </nav>
  </header>
  <main class="main">
    {% block content %}{% endblock %}
  </main>
  {% if site.dev %}<script src="/__reload.js"></script>{% endif %}
</body>
</html>"##;

const PAGE_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<article class="page">
  <h1>{{ title }}</h1>
  <div class="content">
    {{ content | safe }}
  </div>
</article>
{% endblock %}"##;

const POST_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<article class="post">
  <header class="post-header">
    {% if image %}<img class="hero" src="{{ image }}" alt="">{% endif %}
    <h1>{{ title }}</h1>
    <p class="post-meta">
      {% if page.meta.date %}<time datetime="{{ page.meta.date }}">{{ page.meta.date }}</time> &middot; {% endif %}
      {{ page.reading_time }}
      {% if page.author_name %} &middot; by
        {% if page.author_avatar %}<img class="avatar" src="{{ page.author_avatar }}" alt="" width="24" height="24">{% endif %}
        {% if page.author_url %}<a href="{{ page.author_url }}" rel="author">{{ page.author_name }}</a>{% else %}{{ page.author_name }}{% endif %}
      {% endif %}
      {% if page.meta.profile %} (<a href="https://github.com/{{ page.meta.profile }}">@{{ page.meta.profile }}</a>){% endif %}
    </p>
    {% if page.tags %}
    <ul class="tag-list">
      {% for tag in page.tags %}<li><a href="{{ tag.url }}">{{ tag.name }}</a></li>{% endfor %}
    </ul>
    {% endif %}
  </header>
  <div class="content">
    {{ content | safe }}
  </div>
  {% if page.comments %}
  <section class="comments">
    {{ page.comments | safe }}
  </section>
  {% endif %}
</article>
{% endblock %}"##;

const POST_LIST_TEMPLATE: &str = r##"<ul class="post-list">
{% for post in posts %}
  <li>
    <a href="{{ post.url }}">{{ post.title }}</a>
    <span class="post-meta">{% if post.date %}{{ post.date }} &middot; {% endif %}{{ post.reading_time }}</span>
    {% if post.description %}<p>{{ post.description }}</p>{% endif %}
    {% if post.tags %}<ul class="tag-list">{% for tag in post.tags %}<li><a href="{{ tag.url }}">{{ tag.name }}</a></li>{% endfor %}</ul>{% endif %}
  </li>
{% endfor %}
</ul>"##;

const INDEX_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
{% if content %}
<section class="intro content">
  {{ content | safe }}
</section>
{% endif %}
<section class="posts">
  <h2>Posts</h2>
  {% include "post_list.html" %}
</section>
{% endblock %}"##;

const TAGS_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<h1>Tags</h1>
<ul class="tag-list">
{% for tag in tags %}
  <li><a href="{{ tag.url }}">{{ tag.name }}</a></li>
{% endfor %}
</ul>
{% endblock %}"##;

const TAG_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<h1>{{ title }}</h1>
{% include "post_list.html" %}
{% endblock %}"##;
