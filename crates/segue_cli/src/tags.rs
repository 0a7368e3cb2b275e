//! `segue tags`: list every tag used in a version.

use crate::pipeline::{print_json, Services};
use crate::{OutputFormat, VersionArgs};

/// Runs the `segue tags` command.
pub fn run(args: &VersionArgs, services: &Services) -> Result<i32, Box<dyn std::error::Error>> {
    let version = services.resolve_version(&args.version)?;
    let tags = services.manager.get_tags_list(&version)?;
    match args.format {
        OutputFormat::Text => {
            for tag in &tags {
                println!("{tag}");
            }
        }
        OutputFormat::Json => print_json(&tags)?,
    }
    Ok(0)
}
