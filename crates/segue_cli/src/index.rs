//! `segue index`: build and summarise one content version.

use serde::Serialize;

use crate::pipeline::{print_json, Services};
use crate::{GlobalArgs, OutputFormat, VersionArgs};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IndexSummary {
    version: String,
    files: usize,
    nodes: usize,
    tags: usize,
    problems: usize,
}

/// Runs the `segue index` command.
///
/// Returns exit code 0 when the version is ready, 1 when it could not be
/// built. Content problems are reported but do not fail the command.
pub fn run(
    args: &VersionArgs,
    services: &Services,
    global: &GlobalArgs,
) -> Result<i32, Box<dyn std::error::Error>> {
    let version = services.resolve_version(&args.version)?;
    let manager = &services.manager;

    if !manager.ensure_cache(&version) {
        eprintln!("error: content version '{version}' could not be indexed");
        return Ok(1);
    }
    let cache = manager
        .cache(&version)
        .ok_or_else(|| format!("content version '{version}' was evicted while indexing"))?;

    let summary = IndexSummary {
        files: cache.files_read(),
        nodes: cache.len(),
        tags: cache.tags().len(),
        problems: manager.problems().problem_count(&version),
        version,
    };

    match args.format {
        OutputFormat::Text => {
            if !global.quiet {
                println!(
                    "   Indexed {}: {} file(s), {} node(s), {} tag(s)",
                    summary.version, summary.files, summary.nodes, summary.tags
                );
                if summary.problems > 0 {
                    println!(
                        "   {} content problem(s); run `segue problems {}` for details",
                        summary.problems, summary.version
                    );
                }
            }
        }
        OutputFormat::Json => print_json(&summary)?,
    }
    Ok(0)
}
