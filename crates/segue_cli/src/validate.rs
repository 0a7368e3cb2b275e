//! `segue validate`: mark a submitted answer against a question.

use std::io::Read;

use segue_validate::validate_by_id;

use crate::pipeline::{print_json, Services};
use crate::{OutputFormat, ValidateArgs};

/// Runs the `segue validate` command.
///
/// Returns exit code 0 for a correct answer and 1 for an incorrect one.
pub fn run(args: &ValidateArgs, services: &Services) -> Result<i32, Box<dyn std::error::Error>> {
    let bytes = if args.answer == "-" {
        let mut buffer = Vec::new();
        std::io::stdin().read_to_end(&mut buffer)?;
        buffer
    } else {
        std::fs::read(&args.answer)
            .map_err(|e| format!("failed to read answer file {}: {e}", args.answer))?
    };
    let answer = services.manager.deserializer().parse_choice(&bytes)?;
    let version = services.resolve_version(&args.version)?;

    let response = validate_by_id(
        &services.manager,
        &services.validators,
        &version,
        &args.question_id,
        &answer,
    )?;

    match args.format {
        OutputFormat::Text => {
            println!(
                "{}: {}",
                args.question_id,
                if response.correct { "correct" } else { "incorrect" }
            );
            if let Some(feedback) = response.feedback_text() {
                println!("  {feedback}");
            }
            if let (Some(value), Some(units)) = (response.correct_value, response.correct_units) {
                println!("  value: {value}, units: {units}");
            }
        }
        OutputFormat::Json => print_json(&response)?,
    }
    Ok(if response.correct { 0 } else { 1 })
}
