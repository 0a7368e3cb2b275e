//! `segue alias`: show or set named content versions.

use crate::pipeline::{print_json, Services};
use crate::{AliasArgs, OutputFormat};

/// Runs the `segue alias` command.
///
/// With a name and version, indexes the version and points the alias at it.
/// Prints every alias afterwards.
pub fn run(args: &AliasArgs, services: &Services) -> Result<i32, Box<dyn std::error::Error>> {
    let etl = services.index_manager()?;

    if let Some(name) = &args.name {
        match &args.version {
            Some(version) => {
                etl.set_named_version(name, version)?;
                if args.prune {
                    etl.delete_unaliased_versions();
                }
            }
            None => {
                return match etl.named_version(name) {
                    Some(version) => {
                        println!("{version}");
                        Ok(0)
                    }
                    None => {
                        eprintln!("error: no alias named '{name}'");
                        Ok(1)
                    }
                };
            }
        }
    }

    let aliases = etl.aliases();
    match args.format {
        OutputFormat::Text => {
            for (alias, version) in &aliases {
                println!("{alias:<16} {version}");
            }
        }
        OutputFormat::Json => print_json(&aliases)?,
    }
    Ok(0)
}
