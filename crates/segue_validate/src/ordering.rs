//! The order in which a question's choices are tried.

use segue_content::Choice;

/// Returns the choices with every correct choice ahead of every incorrect
/// one, keeping authored order within each group.
///
/// Validators that stop at the first match use this so that a submission
/// equal to both a correct and an incorrect choice is marked right.
pub fn order_choices(choices: &[Choice]) -> Vec<&Choice> {
    let mut ordered: Vec<&Choice> = choices.iter().collect();
    ordered.sort_by_key(|choice| !choice.correct);
    ordered
}
