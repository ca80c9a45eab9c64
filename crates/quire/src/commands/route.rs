//! Match a source path against the blog sources pattern.

use std::path::Path;

use anyhow::Result;
use quire_resolve::Resolver;

/// Run the route command.
pub fn run(config: &Path, path: &str) -> Result<()> {
    let settings = super::load_settings(config)?;
    let resolver = Resolver::new(settings)?;

    match resolver.resolve_blog_route(path) {
        Ok(route) => {
            let permalink = resolver.render_permalink(route.date, &route.title)?;
            println!("date:      {}", route.date);
            println!("title:     {}", route.title);
            println!("permalink: {}", permalink);
        }
        Err(e) if e.is_route_mismatch() => {
            tracing::info!("{}", e);
            println!("{} is not a blog article; it is rendered as a normal page", path);
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
