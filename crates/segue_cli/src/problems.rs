//! `segue problems`: list the content problems recorded for a version.

use crate::pipeline::{print_json, Services};
use crate::{GlobalArgs, OutputFormat, VersionArgs};

/// Runs the `segue problems` command.
///
/// Returns exit code 0 when the version has no problems and 2 when it has
/// some, so scripts can gate on content quality.
pub fn run(
    args: &VersionArgs,
    services: &Services,
    global: &GlobalArgs,
) -> Result<i32, Box<dyn std::error::Error>> {
    let version = services.resolve_version(&args.version)?;
    if !services.manager.ensure_cache(&version) {
        eprintln!("error: content version '{version}' could not be indexed");
        return Ok(1);
    }
    let entries = services.manager.problem_map(&version);

    match args.format {
        OutputFormat::Text => {
            for entry in &entries {
                let id = entry.content.id.as_deref().unwrap_or("<no id>");
                println!("{} ({id})", entry.source_file());
                for problem in &entry.problems {
                    println!("  [{}] {}", problem.code, problem.message);
                }
            }
            if !global.quiet {
                eprintln!("   {} file(s) with problems", entries.len());
            }
        }
        OutputFormat::Json => print_json(&entries)?,
    }
    Ok(if entries.is_empty() { 0 } else { 2 })
}
