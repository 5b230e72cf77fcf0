//! Terminal prompts used by commands that need an answer from the operator.

use std::io::{self, Write};

use crate::error::{DeskError, Result};

/// Prompt for yes/no confirmation
///
/// # Arguments
/// * `prompt` - The prompt message to display (without [y/N] suffix)
///
/// # Returns
/// * `true` if the operator answers 'y' or 'Y'
/// * `false` otherwise, including on empty input
///
/// # Example
/// ```no_run
/// # use certdesk::commands::interactive::confirm;
/// if confirm("Delete ship 'Ocean Star (IMO 9074729)'").unwrap() {
///     // proceed with deletion
/// }
/// ```
pub fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt}? [y/N] ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Prompt the operator to pick one of `options`
///
/// Returns the 0-based index of the chosen option. Empty input selects
/// `default` when one is given; invalid input asks again.
pub fn select_option(prompt: &str, options: &[String], default: Option<usize>) -> Result<usize> {
    if options.is_empty() {
        return Err(DeskError::Validation("nothing to choose from".to_string()));
    }

    for (idx, option) in options.iter().enumerate() {
        println!("  [{idx}] {option}");
    }

    loop {
        if let Some(idx) = default {
            print!("{} [0-{}] (default {}): ", prompt, options.len() - 1, idx);
        } else {
            print!("{} [0-{}]: ", prompt, options.len() - 1);
        }
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Err(DeskError::Validation(
                "no selection made (end of input)".to_string(),
            ));
        }
        let input = input.trim();

        if input.is_empty() {
            if let Some(idx) = default {
                return Ok(idx);
            }
            println!("Please enter a number.");
            continue;
        }

        if let Ok(idx) = input.parse::<usize>()
            && idx < options.len()
        {
            return Ok(idx);
        }

        println!(
            "Invalid input. Please enter a number between 0 and {}.",
            options.len() - 1
        );
    }
}
