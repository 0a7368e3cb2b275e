//! `segue search`: fuzzy or tag search over a version.

use serde::Serialize;

use crate::pipeline::{print_json, Services};
use crate::{OutputFormat, SearchArgs};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Hit<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    content_type: &'a str,
    title: Option<&'a str>,
    source_file: Option<&'a str>,
}

/// Runs the `segue search` command.
pub fn run(args: &SearchArgs, services: &Services) -> Result<i32, Box<dyn std::error::Error>> {
    let version = services.resolve_version(&args.version)?;
    let found = if args.tags {
        let tags: Vec<String> = args
            .query
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        services.manager.get_content_by_tags(&version, &tags)?
    } else {
        services.manager.search_for_content(&version, &args.query)?
    };

    let hits: Vec<Hit<'_>> = found
        .iter()
        .take(args.limit)
        .map(|node| Hit {
            id: node.id.as_deref().unwrap_or(""),
            content_type: node.content_type().discriminator(),
            title: node.title.as_deref(),
            source_file: node.canonical_source_file.as_deref(),
        })
        .collect();

    match args.format {
        OutputFormat::Text => {
            for hit in &hits {
                println!(
                    "{:<40} {:<32} {}",
                    hit.id,
                    hit.content_type,
                    hit.title.unwrap_or("")
                );
            }
        }
        OutputFormat::Json => print_json(&hits)?,
    }
    Ok(if hits.is_empty() { 1 } else { 0 })
}
