//! `segue sync`: bring the newest content version, or a given one, in.

use segue_cache::{ContentSynchroniser, SyncOutcome};

use crate::pipeline::{print_json, Services};
use crate::{GlobalArgs, OutputFormat, SyncArgs};

/// Runs the `segue sync` command.
pub fn run(
    args: &SyncArgs,
    services: &Services,
    global: &GlobalArgs,
) -> Result<i32, Box<dyn std::error::Error>> {
    let synchroniser = ContentSynchroniser::new(services.manager.clone());
    let outcome = synchroniser.synchronise(args.version.as_deref());

    if let (true, SyncOutcome::Ready { version, .. }) = (args.alias, &outcome) {
        let etl = services.index_manager()?;
        etl.set_named_version(etl.latest_alias(), version)?;
    }

    match args.format {
        OutputFormat::Text => match &outcome {
            SyncOutcome::Ready {
                version,
                nodes,
                problems,
            } => {
                if !global.quiet {
                    println!("   Synchronised {version}: {nodes} node(s), {problems} problem(s)");
                }
            }
            SyncOutcome::Failed { reason, .. } => {
                eprintln!("error: {reason}");
            }
        },
        OutputFormat::Json => print_json(&outcome)?,
    }
    Ok(if outcome.is_ready() { 0 } else { 1 })
}
