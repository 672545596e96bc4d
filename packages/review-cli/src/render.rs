//! Terminal output for statuses and step reports.
//!
//! Reports are printed as the backend rendered them; no markdown styling.

use anyhow::Result;
use colored::{ColoredString, Colorize};
use review_client::CategorizedResult;
use review_workflow::{ServerStatus, StatusTone, Step, StepReport};

pub fn status_badge(status: &ServerStatus) -> ColoredString {
    let text = format!("● Server: {}", status);
    match status.tone() {
        StatusTone::Healthy => text.bright_green(),
        StatusTone::Unhealthy => text.bright_red(),
        StatusTone::Pending => text.bright_yellow(),
    }
}

pub fn step_number(step: Step) -> usize {
    Step::all().iter().position(|s| *s == step).map_or(0, |i| i + 1)
}

fn noun(step: Step) -> &'static str {
    match step {
        Step::Extract => "Extraction",
        Step::Match => "Matching",
        Step::Categorize => "Categorization",
    }
}

/// Shown while a step's request is in flight.
pub fn progress_label(step: Step) -> &'static str {
    match step {
        Step::Extract => "Extracting...",
        Step::Match => "Matching...",
        Step::Categorize => "Categorizing...",
    }
}

/// Label of the control that triggers `step`.
pub fn action_label(step: Step, loading: bool, complete: bool) -> String {
    if loading {
        progress_label(step).to_string()
    } else if complete {
        format!("{} Complete", noun(step))
    } else {
        format!("Start {}", noun(step))
    }
}

pub fn print_report<R: StepReport>(report: &R) -> Result<()> {
    let step = R::STEP;
    println!();
    println!(
        "{}",
        format!("{}. {}", step_number(step), step.title()).bright_cyan().bold()
    );
    println!();
    if report.markdown().is_empty() {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", report.markdown());
    }
    Ok(())
}

pub fn print_categorized(results: &CategorizedResult) {
    if results.is_empty() {
        println!("{}", "No attributes could be categorized.".dimmed());
        return;
    }
    for (status, categories) in results {
        println!("{}", status.replace('_', " ").bold());
        if categories.is_empty() {
            println!("  {}", "(none)".dimmed());
        }
        for (category, items) in categories {
            println!("  {} ({})", category.bright_blue(), items.len());
            for item in items {
                match item.evidence() {
                    Some(evidence) => println!(
                        "    - {}: {} {}",
                        item.attribute,
                        item.value_text(),
                        format!("({})", evidence).dimmed()
                    ),
                    None => println!("    - {}: {}", item.attribute, item.value_text()),
                }
            }
        }
    }
}

pub fn print_error(message: impl std::fmt::Display) {
    eprintln!("{} {}", "✗".bright_red(), message.to_string().bright_red());
}

pub fn print_success(message: impl std::fmt::Display) {
    println!("{} {}", "✓".bright_green(), message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_labels() {
        assert_eq!(action_label(Step::Extract, false, false), "Start Extraction");
        assert_eq!(action_label(Step::Match, true, false), "Matching...");
        assert_eq!(action_label(Step::Categorize, false, true), "Categorization Complete");
    }

    #[test]
    fn test_step_numbers() {
        assert_eq!(step_number(Step::Extract), 1);
        assert_eq!(step_number(Step::Categorize), 3);
    }

    #[test]
    fn test_badge_text() {
        colored::control::set_override(false);
        assert_eq!(status_badge(&ServerStatus::Online).to_string(), "● Server: Online");
    }
}
