//! Build plans: the per-page settings handed to the external renderer.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use quire_config::{AutoprefixerConfig, BuildMode, BuildModeFlags, MarkdownConfig};
use quire_markdown::{extract_frontmatter, Frontmatter};
use rayon::prelude::*;
use serde::Serialize;
use walkdir::WalkDir;

use crate::resolver::{ResolveError, Resolver};

/// What kind of output a source file produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    /// Templated page that is not a blog article
    Page,
    /// Dated blog article
    Article,
    /// File copied through untouched (besides minification)
    Asset,
}

/// A tag and the path of its tag page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagLink {
    pub name: String,
    pub path: String,
}

/// Article details for blog pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticlePlan {
    pub date: NaiveDate,
    /// Title slug taken from the source path
    pub slug: String,
    /// Display title (frontmatter title, else the slug)
    pub title: String,
    /// Summary for feeds and meta tags
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// One link per distinct tag page
    pub tags: Vec<TagLink>,
}

/// Resolved settings for one source file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PagePlan {
    /// Path relative to the source directory
    pub source: String,
    /// Output path relative to the build directory
    pub destination: String,
    pub kind: PageKind,
    /// Layout to wrap the page in; `None` for no layout
    pub layout: Option<String>,
    /// Whether the output should be minified
    pub minify: bool,
    pub article: Option<ArticlePlan>,
}

/// A generated tag index page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagPage {
    pub tag: String,
    pub path: String,
    pub template: String,
    /// Destinations of the articles carrying this tag
    pub articles: Vec<String>,
}

/// Everything the renderer needs for one build pass.
#[derive(Debug, Clone, Serialize)]
pub struct BuildPlan {
    pub mode: BuildMode,
    pub markdown: MarkdownConfig,
    pub autoprefixer: Option<AutoprefixerConfig>,
    pub flags: BuildModeFlags,
    pub pages: Vec<PagePlan>,
    pub tag_pages: Vec<TagPage>,
}

impl BuildPlan {
    /// Serialize the plan as pretty JSON.
    pub fn to_json(&self) -> Result<String, PlanError> {
        serde_json::to_string_pretty(self).map_err(|e| PlanError::SerializeError(e.to_string()))
    }

    /// Find the plan for a destination path.
    pub fn page(&self, destination: &str) -> Option<&PagePlan> {
        self.pages.iter().find(|page| page.destination == destination)
    }
}

/// Options for a planning pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanOptions {
    pub mode: BuildMode,
    /// Fail when a page has no layout and no default exists
    pub require_layout: bool,
}

/// A discovered source file.
#[derive(Debug)]
struct SourceFile {
    path: PathBuf,
    relative: String,
}

/// Walks a source tree and resolves every file.
pub struct Planner<'a> {
    resolver: &'a Resolver<'a>,
    options: PlanOptions,
}

impl<'a> Planner<'a> {
    pub fn new(resolver: &'a Resolver<'a>, options: PlanOptions) -> Self {
        Self { resolver, options }
    }

    /// Plan a build of `source_dir`.
    pub fn plan(&self, source_dir: &Path) -> Result<BuildPlan, PlanError> {
        let files = self.discover(source_dir)?;

        let results: Vec<Result<Option<PagePlan>, PlanError>> =
            files.par_iter().map(|file| self.plan_file(file)).collect();

        let mut pages = Vec::with_capacity(results.len());
        for result in results {
            if let Some(page) = result? {
                pages.push(page);
            }
        }
        pages.sort_by(|a, b| {
            a.destination
                .cmp(&b.destination)
                .then_with(|| a.source.cmp(&b.source))
        });

        if let Some(pair) = pages.windows(2).find(|w| w[0].destination == w[1].destination) {
            let destination = pair[0].destination.clone();
            let sources = pages
                .iter()
                .filter(|page| page.destination == destination)
                .map(|page| page.source.clone())
                .collect();
            return Err(PlanError::DuplicateDestination {
                destination,
                sources,
            });
        }

        let tag_pages = self.tag_pages(&pages);
        let settings = self.resolver.settings();

        tracing::info!(
            "Planned {} files and {} tag pages for {} mode",
            pages.len(),
            tag_pages.len(),
            self.options.mode
        );

        Ok(BuildPlan {
            mode: self.options.mode,
            markdown: settings.markdown.clone(),
            autoprefixer: settings.autoprefixer.clone(),
            flags: self.resolver.build_flags(self.options.mode),
            pages,
            tag_pages,
        })
    }

    /// Output path for a source path, and whether the source is a template.
    ///
    /// `about.md` becomes `about.html`; `feed.xml.erb` becomes `feed.xml`.
    pub fn destination_for(&self, relative: &str) -> (String, bool) {
        let (stem, ext) = match relative.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !stem.ends_with('/') => (stem, ext),
            _ => return (relative.to_string(), false),
        };

        let is_template = self
            .resolver
            .settings()
            .template_extensions
            .iter()
            .any(|t| t.eq_ignore_ascii_case(ext));
        if !is_template {
            return (relative.to_string(), false);
        }

        let file_name = stem.rsplit('/').next().unwrap_or(stem);
        if file_name.contains('.') {
            (stem.to_string(), true)
        } else {
            (format!("{}.html", stem), true)
        }
    }

    /// Find every renderable file, skipping hidden files, partials and layouts.
    fn discover(&self, source_dir: &Path) -> Result<Vec<SourceFile>, PlanError> {
        if !source_dir.exists() {
            return Err(PlanError::ReadError(format!(
                "Source directory not found: {}",
                source_dir.display()
            )));
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(source_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_skipped(entry));

        for entry in walker {
            let entry = entry.map_err(|e| PlanError::ReadError(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let relative = path
                .strip_prefix(source_dir)
                .unwrap_or(path)
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            files.push(SourceFile {
                path: path.to_path_buf(),
                relative,
            });
        }

        Ok(files)
    }

    fn plan_file(&self, file: &SourceFile) -> Result<Option<PagePlan>, PlanError> {
        let (destination, is_template) = self.destination_for(&file.relative);
        let flags = self.resolver.build_flags(self.options.mode);
        let is_page = is_template || extension(&destination) == Some("html");

        if !is_page {
            let minify = match extension(&destination) {
                Some("css") => flags.minify_css,
                Some("js") => flags.minify_js,
                _ => false,
            };
            return Ok(Some(PagePlan {
                source: file.relative.clone(),
                destination,
                kind: PageKind::Asset,
                layout: None,
                minify,
                article: None,
            }));
        }

        let route = match self.resolver.resolve_blog_route(&destination) {
            Ok(route) => Some(route),
            Err(e) if e.is_route_mismatch() => {
                if matches!(e, ResolveError::InvalidDate { .. }) {
                    tracing::warn!("{}; rendering it as a normal page", e);
                }
                None
            }
            Err(e) => return Err(e.into()),
        };

        let (destination, article) = match route {
            Some(route) => {
                let frontmatter = self.read_frontmatter(file)?.unwrap_or_default();
                if !frontmatter.published && self.options.mode == BuildMode::Build {
                    tracing::info!("Skipping unpublished article {}", file.relative);
                    return Ok(None);
                }
                if let Some(date) = frontmatter.date {
                    if date != route.date {
                        tracing::warn!(
                            "{}: frontmatter date {} differs from file name date {}",
                            file.relative,
                            date,
                            route.date
                        );
                    }
                }

                let permalink = self.resolver.render_permalink(route.date, &route.title)?;
                // `Rust` and `rust` share a tag page; the first spelling names it.
                let mut tags: Vec<TagLink> = Vec::with_capacity(frontmatter.tags.len());
                for tag in &frontmatter.tags {
                    let path = self.resolver.render_tag_link(tag)?;
                    if !tags.iter().any(|link| link.path == path) {
                        tags.push(TagLink {
                            name: tag.clone(),
                            path,
                        });
                    }
                }

                let article = ArticlePlan {
                    date: route.date,
                    title: frontmatter.title.unwrap_or_else(|| route.title.clone()),
                    slug: route.title,
                    description: frontmatter.description,
                    tags,
                };
                (permalink, Some(article))
            }
            None => (destination, None),
        };

        let layout = match self.resolver.effective_layout(&destination, article.is_some()) {
            Ok(layout) => layout.map(str::to_string),
            Err(ResolveError::UnresolvedLayout(path)) if !self.options.require_layout => {
                tracing::debug!("No layout for {}", path);
                None
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Some(PagePlan {
            source: file.relative.clone(),
            destination,
            kind: if article.is_some() {
                PageKind::Article
            } else {
                PageKind::Page
            },
            layout,
            minify: flags.minify_html,
            article,
        }))
    }

    fn read_frontmatter(&self, file: &SourceFile) -> Result<Option<Frontmatter>, PlanError> {
        let content = fs::read_to_string(&file.path)
            .map_err(|e| PlanError::ReadError(format!("{}: {}", file.path.display(), e)))?;

        let (frontmatter, _) = extract_frontmatter(&content).map_err(|e| PlanError::Frontmatter {
            path: file.relative.clone(),
            message: e.to_string(),
        })?;

        Ok(frontmatter)
    }

    /// One tag page per distinct tag slug, in slug order.
    fn tag_pages(&self, pages: &[PagePlan]) -> Vec<TagPage> {
        let Some(blog) = self.resolver.blog_config() else {
            return Vec::new();
        };

        let mut by_path: BTreeMap<&str, TagPage> = BTreeMap::new();
        for page in pages {
            let Some(article) = &page.article else {
                continue;
            };
            for tag in &article.tags {
                by_path
                    .entry(tag.path.as_str())
                    .or_insert_with(|| TagPage {
                        tag: tag.name.clone(),
                        path: tag.path.clone(),
                        template: blog.tag_template_name.clone(),
                        articles: Vec::new(),
                    })
                    .articles
                    .push(page.destination.clone());
            }
        }

        by_path.into_values().collect()
    }
}

fn is_skipped(entry: &walkdir::DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.')
        || name.starts_with('_')
        || (entry.depth() == 1 && entry.file_type().is_dir() && name == "layouts")
}

fn extension(path: &str) -> Option<&str> {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    file_name.rsplit_once('.').map(|(_, ext)| ext)
}

/// Errors that can occur while planning a build.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("Failed to read source: {0}")]
    ReadError(String),

    #[error("Invalid frontmatter in {path}: {message}")]
    Frontmatter { path: String, message: String },

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Several sources produce {destination}: {}", .sources.join(", "))]
    DuplicateDestination {
        destination: String,
        sources: Vec<String>,
    },

    #[error("Failed to serialize plan: {0}")]
    SerializeError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quire_config::{Settings, STARTER_CONFIG};
    use tempfile::tempdir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn site(root: &Path) {
        write(root, "index.html.md", "# Home\n");
        write(root, "about.md", "---\ntitle: About\n---\nAbout us.\n");
        write(root, "feed.xml.erb", "<feed/>\n");
        write(root, "css/site.css", "body { color: red; }\n");
        write(root, "js/app.js", "console.log(1);\n");
        write(
            root,
            "blog/2024-01-15-hello-world.html.md",
            "---\ntitle: Hello, World\ndescription: First post\ntags: [Rust, static sites, rust]\n---\nHi.\n",
        );
        write(
            root,
            "blog/2024-02-01-second.html.md",
            "---\ntitle: Second\ntags: rust\n---\nAgain.\n",
        );
        write(
            root,
            "blog/2024-03-01-draft.html.md",
            "---\ntitle: Draft\npublished: false\n---\nWIP.\n",
        );
        write(root, "layouts/layout.erb", "<%= yield %>\n");
        write(root, "_partial.erb", "partial\n");
        write(root, ".DS_Store", "");
    }

    fn plan(mode: BuildMode) -> BuildPlan {
        let temp = tempdir().unwrap();
        site(temp.path());

        let settings = Settings::from_toml(STARTER_CONFIG).unwrap();
        let resolver = Resolver::new(&settings).unwrap();
        let planner = Planner::new(
            &resolver,
            PlanOptions {
                mode,
                require_layout: false,
            },
        );
        planner.plan(temp.path()).unwrap()
    }

    #[test]
    fn maps_sources_to_destinations() {
        let settings = Settings::from_toml(STARTER_CONFIG).unwrap();
        let resolver = Resolver::new(&settings).unwrap();
        let planner = Planner::new(&resolver, PlanOptions::default());

        assert_eq!(planner.destination_for("about.md"), ("about.html".to_string(), true));
        assert_eq!(
            planner.destination_for("blog/x.html.markdown"),
            ("blog/x.html".to_string(), true)
        );
        assert_eq!(planner.destination_for("feed.xml.erb"), ("feed.xml".to_string(), true));
        assert_eq!(planner.destination_for("css/site.css"), ("css/site.css".to_string(), false));
        assert_eq!(planner.destination_for("LICENSE"), ("LICENSE".to_string(), false));
        assert_eq!(planner.destination_for(".md"), (".md".to_string(), false));
    }

    #[test]
    fn plans_pages_articles_and_assets() {
        let plan = plan(BuildMode::Dev);

        let destinations: Vec<_> = plan.pages.iter().map(|p| p.destination.as_str()).collect();
        assert_eq!(
            destinations,
            vec![
                "about.html",
                "blog/2024/01/15/hello-world.html",
                "blog/2024/02/01/second.html",
                "blog/2024/03/01/draft.html",
                "css/site.css",
                "feed.xml",
                "index.html",
                "js/app.js",
            ]
        );

        let about = plan.page("about.html").unwrap();
        assert_eq!(about.kind, PageKind::Page);
        assert_eq!(about.layout.as_deref(), Some("layout"));

        let feed = plan.page("feed.xml").unwrap();
        assert_eq!(feed.kind, PageKind::Page);
        assert_eq!(feed.layout, None);

        let css = plan.page("css/site.css").unwrap();
        assert_eq!(css.kind, PageKind::Asset);
        assert!(!css.minify);
    }

    #[test]
    fn articles_get_permalinks_and_tags() {
        let plan = plan(BuildMode::Dev);

        let hello = plan.page("blog/2024/01/15/hello-world.html").unwrap();
        assert_eq!(hello.kind, PageKind::Article);
        assert_eq!(hello.source, "blog/2024-01-15-hello-world.html.md");
        assert_eq!(hello.layout.as_deref(), Some("blog_article"));

        let article = hello.article.as_ref().unwrap();
        assert_eq!(article.title, "Hello, World");
        assert_eq!(article.slug, "hello-world");
        assert_eq!(article.description.as_deref(), Some("First post"));
        assert_eq!(
            article.tags,
            vec![
                TagLink {
                    name: "Rust".to_string(),
                    path: "tags/rust.html".to_string(),
                },
                TagLink {
                    name: "static sites".to_string(),
                    path: "tags/static-sites.html".to_string(),
                },
            ]
        );
    }

    #[test]
    fn groups_tag_pages_by_slug() {
        let plan = plan(BuildMode::Dev);

        assert_eq!(plan.tag_pages.len(), 2);
        let rust = &plan.tag_pages[0];
        assert_eq!(rust.path, "tags/rust.html");
        assert_eq!(rust.template, "tag");
        assert_eq!(
            rust.articles,
            vec![
                "blog/2024/01/15/hello-world.html".to_string(),
                "blog/2024/02/01/second.html".to_string(),
            ]
        );
    }

    #[test]
    fn tag_spellings_share_one_entry() {
        let plan = plan(BuildMode::Dev);

        let rust = plan
            .tag_pages
            .iter()
            .find(|page| page.path == "tags/rust.html")
            .unwrap();
        assert_eq!(rust.tag, "Rust");
        assert_eq!(
            rust.articles
                .iter()
                .filter(|dest| dest.as_str() == "blog/2024/01/15/hello-world.html")
                .count(),
            1
        );
    }

    #[test]
    fn rejects_two_sources_for_one_destination() {
        let temp = tempdir().unwrap();
        write(temp.path(), "about.html", "<p>About</p>\n");
        write(temp.path(), "about.md", "About\n");

        let settings = Settings::from_toml(STARTER_CONFIG).unwrap();
        let resolver = Resolver::new(&settings).unwrap();
        let planner = Planner::new(&resolver, PlanOptions::default());

        match planner.plan(temp.path()) {
            Err(PlanError::DuplicateDestination {
                destination,
                sources,
            }) => {
                assert_eq!(destination, "about.html");
                assert_eq!(sources, vec!["about.html", "about.md"]);
            }
            other => panic!("expected a duplicate destination, got {:?}", other),
        }
    }

    #[test]
    fn rejects_one_article_in_two_formats() {
        let temp = tempdir().unwrap();
        write(temp.path(), "blog/2024-01-15-a.html.md", "A\n");
        write(temp.path(), "blog/2024-01-15-a.html.erb", "A\n");

        let settings = Settings::from_toml(STARTER_CONFIG).unwrap();
        let resolver = Resolver::new(&settings).unwrap();
        let planner = Planner::new(&resolver, PlanOptions::default());

        assert!(matches!(
            planner.plan(temp.path()),
            Err(PlanError::DuplicateDestination { destination, .. })
                if destination == "blog/2024/01/15/a.html"
        ));
    }

    #[test]
    fn build_mode_minifies_and_skips_drafts() {
        let plan = plan(BuildMode::Build);

        assert!(plan.flags.minify_css);
        assert!(plan.page("blog/2024/03/01/draft.html").is_none());
        assert!(plan.page("css/site.css").unwrap().minify);
        assert!(plan.page("js/app.js").unwrap().minify);
        assert!(plan.page("about.html").unwrap().minify);
    }

    #[test]
    fn dev_mode_keeps_drafts_unminified() {
        let plan = plan(BuildMode::Dev);

        assert_eq!(plan.flags, BuildModeFlags::default());
        assert!(plan.page("blog/2024/03/01/draft.html").is_some());
        assert!(plan.pages.iter().all(|p| !p.minify));
    }

    #[test]
    fn require_layout_fails_without_default() {
        let temp = tempdir().unwrap();
        write(temp.path(), "about.md", "About\n");

        let settings = Settings::builder().default_layout(None).build().unwrap();
        let resolver = Resolver::new(&settings).unwrap();

        let lenient = Planner::new(&resolver, PlanOptions::default());
        let plan = lenient.plan(temp.path()).unwrap();
        assert_eq!(plan.page("about.html").unwrap().layout, None);

        let strict = Planner::new(
            &resolver,
            PlanOptions {
                mode: BuildMode::Dev,
                require_layout: true,
            },
        );
        assert!(matches!(
            strict.plan(temp.path()),
            Err(PlanError::Resolve(ResolveError::UnresolvedLayout(_)))
        ));
    }

    #[test]
    fn reports_bad_frontmatter() {
        let temp = tempdir().unwrap();
        write(temp.path(), "blog/2024-01-15-broken.html.md", "---\ntitle: x\n");

        let settings = Settings::from_toml(STARTER_CONFIG).unwrap();
        let resolver = Resolver::new(&settings).unwrap();
        let planner = Planner::new(&resolver, PlanOptions::default());

        assert!(matches!(
            planner.plan(temp.path()),
            Err(PlanError::Frontmatter { .. })
        ));
    }

    #[test]
    fn serializes_plan_to_json() {
        let plan = plan(BuildMode::Build);
        let json = plan.to_json().unwrap();

        assert!(json.contains("\"mode\": \"build\""));
        assert!(json.contains("\"kind\": \"article\""));
        assert!(json.contains("\"css_class\": \"highlight\""));
    }

    #[test]
    fn missing_source_directory_is_an_error() {
        let settings = Settings::default();
        let resolver = Resolver::new(&settings).unwrap();
        let planner = Planner::new(&resolver, PlanOptions::default());

        assert!(matches!(
            planner.plan(Path::new("/nonexistent/quire/source")),
            Err(PlanError::ReadError(_))
        ));
    }
}
