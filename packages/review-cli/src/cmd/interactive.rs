//! Guided, menu-driven analysis.
//!
//! The menu only offers what the workflow currently allows: input is offered
//! once the backend is configured, steps once a session exists, and each step
//! only after the one before it has completed.

use anyhow::{Context, Result};
use colored::Colorize;
use console::Term;
use dialoguer::{theme::ColorfulTheme, Confirm, Editor, Input, Select};
use review_workflow::{AnalysisBackend, Step, WorkflowController};

use super::{configure_backend, connect, export_step, prompt_api_key, read_text_arg, show_step};
use crate::config::Config;
use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Configure,
    SubmitInput,
    RunStep(Step),
    ViewStep(Step),
    Export(Step),
    ToggleWorkers,
    Exit,
}

/// Actions available in the current workflow state, in display order.
pub fn menu_actions<B: AnalysisBackend>(workflow: &WorkflowController<B>) -> Vec<MenuAction> {
    let mut actions = vec![MenuAction::Configure];

    if workflow.is_configured() {
        actions.push(MenuAction::SubmitInput);

        if workflow.has_session() {
            for &step in Step::all() {
                if workflow.can_run(step) {
                    actions.push(MenuAction::RunStep(step));
                }
                if workflow.is_complete(step) {
                    actions.push(MenuAction::ViewStep(step));
                    actions.push(MenuAction::Export(step));
                }
            }
        }
    }

    actions.push(MenuAction::ToggleWorkers);
    actions.push(MenuAction::Exit);
    actions
}

/// The action the cursor starts on.
pub fn suggested_action<B: AnalysisBackend>(workflow: &WorkflowController<B>) -> MenuAction {
    if !workflow.is_configured() {
        MenuAction::Configure
    } else if !workflow.has_session() {
        MenuAction::SubmitInput
    } else if let Some(step) = workflow.next_step() {
        MenuAction::RunStep(step)
    } else {
        MenuAction::Export(Step::Categorize)
    }
}

pub fn menu_label<B: AnalysisBackend>(workflow: &WorkflowController<B>, action: MenuAction) -> String {
    match action {
        MenuAction::Configure if workflow.is_configured() => {
            "🔑 Reconfigure API key (discards the current session)".to_string()
        }
        MenuAction::Configure => "🔑 Configure API key & check server".to_string(),
        MenuAction::SubmitInput if workflow.has_session() => {
            "📝 Submit new input (discards current results)".to_string()
        }
        MenuAction::SubmitInput => "📝 Start analysis (seller description & reviews)".to_string(),
        MenuAction::RunStep(step) => format!(
            "▶️  {}. {}",
            render::step_number(step),
            render::action_label(step, workflow.is_loading(step), workflow.is_complete(step))
        ),
        MenuAction::ViewStep(step) => format!("📄 View {}", step.title()),
        MenuAction::Export(step) => format!("💾 Export {} results (JSON + Markdown)", step),
        MenuAction::ToggleWorkers => "⚙️  Toggle parallel processing".to_string(),
        MenuAction::Exit => "🛑 Exit".to_string(),
    }
}

pub async fn run(config: &Config) -> Result<()> {
    let term = Term::stdout();
    print_banner(&term)?;

    let mut workflow = connect(config);

    loop {
        println!();
        println!("{}", render::status_badge(workflow.status()));
        if let Some(session_id) = workflow.session_id() {
            println!("{}", format!("Session: {}", session_id).dimmed());
        }

        let actions = menu_actions(&workflow);
        let labels: Vec<String> = actions
            .iter()
            .map(|action| menu_label(&workflow, *action))
            .collect();
        let suggested = suggested_action(&workflow);
        let default = actions.iter().position(|a| *a == suggested).unwrap_or(0);

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(default)
            .interact_on(&term)?;

        let outcome = match actions[selection] {
            MenuAction::Configure => configure(config, &mut workflow).await,
            MenuAction::SubmitInput => submit_input(&term, &mut workflow).await,
            MenuAction::RunStep(step) => run_step(&mut workflow, step).await,
            MenuAction::ViewStep(step) => show_step(&workflow, step),
            MenuAction::Export(step) => export(config, &workflow, step),
            MenuAction::ToggleWorkers => toggle_workers(&workflow).await,
            MenuAction::Exit => {
                println!("{}", "👋 Goodbye!".bright_blue());
                break;
            }
        };

        // Failures are shown and the user decides what to do next.
        if let Err(err) = outcome {
            render::print_error(format!("{:#}", err));
        }
    }

    Ok(())
}

fn print_banner(term: &Term) -> Result<()> {
    term.clear_screen()?;
    println!("{}", "╔════════════════════════════════════════╗".bright_cyan());
    println!("{}", "║        Review Insight Analysis         ║".bright_cyan());
    println!("{}", "╚════════════════════════════════════════╝".bright_cyan());
    Ok(())
}

async fn configure<B: AnalysisBackend>(config: &Config, workflow: &mut WorkflowController<B>) -> Result<()> {
    let api_key = match &config.api_key {
        Some(key) if use_env_key()? => key.clone(),
        _ => prompt_api_key()?,
    };
    configure_backend(workflow, &api_key).await
}

fn use_env_key() -> Result<bool> {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Use the API key from GEMINI_API_KEY?")
        .default(true)
        .interact()
        .context("Failed to read answer")
}

async fn submit_input<B: AnalysisBackend>(term: &Term, workflow: &mut WorkflowController<B>) -> Result<()> {
    let theme = ColorfulTheme::default();
    let (previous_description, previous_reviews) = workflow
        .input()
        .map(|input| (input.seller_description.clone(), input.reviews.join("\n")))
        .unwrap_or_default();

    let description: String = Input::with_theme(&theme)
        .with_prompt("Seller description (or @file)")
        .with_initial_text(previous_description)
        .interact_text_on(term)?;
    let description = read_text_arg(&description)?;

    let sources = ["Type or paste reviews in an editor", "Load reviews from a file"];
    let source = Select::with_theme(&theme)
        .with_prompt("Reviews (as JSON array or one per line)")
        .items(&sources)
        .default(0)
        .interact_on(term)?;

    let reviews_text = if source == 0 {
        match Editor::new().extension(".txt").edit(&previous_reviews)? {
            Some(text) => text,
            None => {
                println!("{}", "No reviews entered.".dimmed());
                return Ok(());
            }
        }
    } else {
        let path: String = Input::with_theme(&theme)
            .with_prompt("Reviews file")
            .interact_text_on(term)?;
        read_text_arg(&format!("@{}", path.trim()))?
    };

    eprintln!("{}", "Starting analysis session...".dimmed());
    let session_id = workflow.submit_input(&description, &reviews_text).await?;
    render::print_success(format!("Session {} started", session_id));
    Ok(())
}

async fn run_step<B: AnalysisBackend>(workflow: &mut WorkflowController<B>, step: Step) -> Result<()> {
    eprintln!("{}", render::progress_label(step).dimmed());
    workflow.run_step(step).await?;
    show_step(workflow, step)
}

fn export<B: AnalysisBackend>(config: &Config, workflow: &WorkflowController<B>, step: Step) -> Result<()> {
    for path in export_step(workflow, step, &config.export_dir)? {
        render::print_success(format!("Saved {}", path.display()));
    }
    Ok(())
}

async fn toggle_workers<B: AnalysisBackend>(workflow: &WorkflowController<B>) -> Result<()> {
    let message = workflow.toggle_parallel_processing().await?;
    render::print_success(message);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use review_workflow::testing::{Endpoint, MockBackend};
    use review_workflow::ApiKey;

    #[tokio::test]
    async fn test_menu_before_configuration() {
        let workflow = WorkflowController::new(MockBackend::new());

        assert_eq!(
            menu_actions(&workflow),
            vec![MenuAction::Configure, MenuAction::ToggleWorkers, MenuAction::Exit]
        );
        assert_eq!(suggested_action(&workflow), MenuAction::Configure);
    }

    #[tokio::test]
    async fn test_failed_heartbeat_hides_input() {
        let backend = MockBackend::new().with_failure(Endpoint::Heartbeat, 500, "down");
        let mut workflow = WorkflowController::new(backend);
        workflow.configure(&ApiKey::new("key")).await.unwrap_err();

        assert!(!menu_actions(&workflow).contains(&MenuAction::SubmitInput));
    }

    #[tokio::test]
    async fn test_menu_follows_step_order() {
        let mut workflow = WorkflowController::new(MockBackend::new());
        workflow.configure(&ApiKey::new("key")).await.unwrap();
        assert_eq!(suggested_action(&workflow), MenuAction::SubmitInput);
        assert!(!menu_actions(&workflow).contains(&MenuAction::RunStep(Step::Extract)));

        workflow.start_session("desc", vec!["review".into()]).await.unwrap();
        let actions = menu_actions(&workflow);
        assert!(actions.contains(&MenuAction::RunStep(Step::Extract)));
        assert!(!actions.contains(&MenuAction::RunStep(Step::Match)));
        assert_eq!(suggested_action(&workflow), MenuAction::RunStep(Step::Extract));

        workflow.extract().await.unwrap();
        let actions = menu_actions(&workflow);
        assert!(!actions.contains(&MenuAction::RunStep(Step::Extract)));
        assert!(actions.contains(&MenuAction::ViewStep(Step::Extract)));
        assert!(actions.contains(&MenuAction::Export(Step::Extract)));
        assert!(actions.contains(&MenuAction::RunStep(Step::Match)));
        assert!(!actions.contains(&MenuAction::RunStep(Step::Categorize)));
    }

    #[tokio::test]
    async fn test_labels_reflect_state() {
        let mut workflow = WorkflowController::new(MockBackend::new());
        assert!(menu_label(&workflow, MenuAction::Configure).contains("Configure API key"));

        workflow.configure(&ApiKey::new("key")).await.unwrap();
        workflow.start_session("desc", vec!["review".into()]).await.unwrap();

        assert!(menu_label(&workflow, MenuAction::Configure).contains("Reconfigure"));
        assert!(menu_label(&workflow, MenuAction::SubmitInput).contains("discards"));
        assert!(menu_label(&workflow, MenuAction::RunStep(Step::Extract)).ends_with("1. Start Extraction"));
    }
}
