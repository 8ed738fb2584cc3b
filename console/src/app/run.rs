//! Command execution for the `lambdactl` binary

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use api_models::{LambdaApplication, LambdaInstance};
use colored::Colorize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::app::options::ConsoleOptions;
use crate::app::state::AppState;
use crate::authn::authorizer::Authorizer;
use crate::controllers::delete::{
    confirmation_channel, ConfirmationRequest, Decision, DeleteOutcome,
};
use crate::controllers::navigation::Navigator;
use crate::controllers::pagination::Page;
use crate::errors::ConsoleError;
use crate::http::client::Transport;

/// A single console action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// One page of the instance list; carries the `page`/`perPage` query
    ListInstances { query: String },
    ListApps,
    DeleteInstance { id: String },
    DeleteApp { id: String },
}

/// How delete confirmations are answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmMode {
    /// Ask on stdin
    Prompt,

    /// Confirm everything
    AssumeYes,
}

/// Execute `command` against the backend
pub async fn run(
    options: ConsoleOptions,
    command: Command,
    transport: Arc<dyn Transport>,
    authorizer: Arc<dyn Authorizer>,
    navigator: Arc<dyn Navigator>,
    confirm: ConfirmMode,
) -> Result<(), ConsoleError> {
    let (confirmations, requests) = confirmation_channel(1);
    let responder = spawn_responder(requests, confirm);

    let state = AppState::new(&options, transport, authorizer, navigator, confirmations);
    let result = execute(&state, &options, command).await;

    drop(state);
    if let Err(e) = responder.await {
        warn!("Confirmation responder ended abnormally: {}", e);
    }
    result
}

async fn execute(
    state: &AppState,
    options: &ConsoleOptions,
    command: Command,
) -> Result<(), ConsoleError> {
    match command {
        Command::ListInstances { query } => {
            let controller = state.lambda_instances();
            controller.apply_query(&query)?;
            controller.refresh().await?;
            print_instances(&controller.paged());
            Ok(())
        }
        Command::ListApps => {
            let apps = state.store.find_all::<LambdaApplication>().await?;
            print_apps(&apps);
            Ok(())
        }
        Command::DeleteInstance { id } => {
            let controller = state.lambda_instances();
            let outcome = controller.delete_instance(&id).await?;
            report(&outcome, &controller.ui().message)
        }
        Command::DeleteApp { id } => {
            let controller = state.lambda_app();
            let outcome = controller.delete_app(&id).await?;
            let reported = report(&outcome, &controller.ui().message);
            if outcome == DeleteOutcome::Succeeded {
                // Stay alive until the banner deadline so the follow-up
                // navigation runs.
                let deadline = options.alerts.app_delete_success.duration;
                tokio::time::sleep(deadline + Duration::from_millis(50)).await;
            }
            reported
        }
    }
}

fn report(outcome: &DeleteOutcome, banner: &str) -> Result<(), ConsoleError> {
    match outcome {
        DeleteOutcome::Cancelled => {
            println!("{}", "Delete cancelled".yellow());
            Ok(())
        }
        DeleteOutcome::Succeeded => {
            println!("{}", banner.green());
            Ok(())
        }
        DeleteOutcome::Failed(message) => {
            println!("{}", message.red());
            Err(ConsoleError::Internal(message.clone()))
        }
    }
}

fn spawn_responder(
    mut requests: mpsc::Receiver<ConfirmationRequest>,
    mode: ConfirmMode,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(request) = requests.recv().await {
            let decision = match mode {
                ConfirmMode::AssumeYes => {
                    info!("Auto-confirming: {}", request.prompt());
                    Decision::Confirm
                }
                ConfirmMode::Prompt => {
                    let prompt = request.prompt().to_string();
                    match tokio::task::spawn_blocking(move || ask_stdin(&prompt)).await {
                        Ok(decision) => decision,
                        Err(e) => {
                            error!("Confirmation prompt failed: {}", e);
                            Decision::Decline
                        }
                    }
                }
            };
            request.respond(decision);
        }
    })
}

fn ask_stdin(prompt: &str) -> Decision {
    print!("{} [y/N] ", prompt.bold());
    if io::stdout().flush().is_err() {
        return Decision::Decline;
    }

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return Decision::Decline;
    }
    parse_answer(&answer)
}

fn parse_answer(answer: &str) -> Decision {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Decision::Confirm,
        _ => Decision::Decline,
    }
}

fn print_instances(page: &Page<LambdaInstance>) {
    if page.total_items == 0 {
        println!("{}", "No lambda instances".dimmed());
        return;
    }

    for instance in &page.items {
        let message = instance.status_message.as_deref().unwrap_or("");
        let status = if instance.is_ready() {
            message.green()
        } else {
            message.yellow()
        };
        println!("{}  {}  {}", instance.id.bold(), instance.name, status);
    }
    println!(
        "{}",
        format!(
            "Showing {}-{} of {} (page {}/{})",
            page.first_of_current_page,
            page.last_of_current_page,
            page.total_items,
            page.page,
            page.total_pages
        )
        .dimmed()
    );
}

fn print_apps(apps: &[LambdaApplication]) {
    if apps.is_empty() {
        println!("{}", "No lambda applications".dimmed());
        return;
    }
    for app in apps {
        let description = app.description.as_deref().unwrap_or("");
        println!("{}  {}  {}", app.id.bold(), app.name, description.dimmed());
    }
}
