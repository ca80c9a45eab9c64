//! Build configuration resolver.
//!
//! Compiles the page rules and blog patterns of a [`quire_config::Settings`]
//! once, then answers per-page questions for the external renderer: which
//! layout wraps a page, whether a source file is a dated article and where it
//! is published, and which minifiers the current build mode switches on.
//! Every lookup is pure, so callers may resolve pages in parallel.

pub mod glob;
pub mod plan;
pub mod resolver;
pub mod route;
pub mod slug;

pub use glob::GlobPattern;
pub use plan::{ArticlePlan, BuildPlan, PageKind, PagePlan, PlanError, PlanOptions, Planner, TagLink, TagPage};
pub use resolver::{is_minification_active, BlogRoute, ResolveError, Resolver};
pub use route::RoutePattern;
pub use slug::slugify;
