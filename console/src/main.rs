//! Lambda Console - Entry Point
//!
//! Command-line surface over the console controllers: list and delete
//! lambda instances and applications on the backend.

use std::collections::HashMap;
use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use lambda_console::app::options::ConsoleOptions;
use lambda_console::app::run::{run, Command, ConfirmMode};
use lambda_console::authn::authorizer::TokenAuthorizer;
use lambda_console::controllers::navigation::LogNavigator;
use lambda_console::filesys::file::File;
use lambda_console::http::client::HttpClient;
use lambda_console::logs::{bootstrap_logging, init_logging, LogOptions};
use lambda_console::storage::settings::{Settings, DEFAULT_SETTINGS_PATH};
use lambda_console::utils::version_info;
use secrecy::SecretString;

use tracing::{debug, error};

const TOKEN_ENV: &str = "LAMBDA_CONSOLE_TOKEN";

#[tokio::main]
async fn main() -> ExitCode {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut cli_args: HashMap<String, String> = HashMap::new();

    for arg in args.iter().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            // Handle --key=value format
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            // Handle standalone flags like --version
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    // Print version and exit
    if cli_args.contains_key("version") {
        match serde_json::to_string_pretty(&version_info()) {
            Ok(version) => println!("{}", version),
            Err(e) => eprintln!("Unable to print version: {e}"),
        }
        return ExitCode::SUCCESS;
    }

    let Some(command) = parse_command(&cli_args) else {
        print_usage();
        return ExitCode::FAILURE;
    };

    // Retrieve the settings file; its warnings go to stderr until logging
    // is configured from it
    let settings_path = cli_args
        .get("settings")
        .cloned()
        .unwrap_or_else(|| DEFAULT_SETTINGS_PATH.to_string());
    let bootstrap = bootstrap_logging();
    let loaded = Settings::load(&File::new(&settings_path)).await;
    drop(bootstrap);
    let mut settings = match loaded {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Unable to read settings file {settings_path}: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging
    let log_options = LogOptions {
        log_level: settings.log_level.clone(),
        log_dir: settings.log_dir.clone(),
        json_format: settings.json_logs,
        ..Default::default()
    };
    if let Err(e) = init_logging(log_options) {
        eprintln!("Failed to initialize logging: {e}");
    }

    // The environment overrides the token of the settings file
    if let Ok(token) = env::var(TOKEN_ENV) {
        if !token.is_empty() {
            debug!("Using session token from {}", TOKEN_ENV);
            settings.auth.token = Some(SecretString::from(token));
        }
    }

    let mut options = match ConsoleOptions::from_settings(settings) {
        Ok(options) => options,
        Err(e) => {
            error!("Invalid settings: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let transport = match HttpClient::new(options.request_timeout) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let authorizer = Arc::new(TokenAuthorizer::new(options.token.take()));
    let confirm = if cli_args.contains_key("yes") {
        ConfirmMode::AssumeYes
    } else {
        ConfirmMode::Prompt
    };

    let navigator = Arc::new(LogNavigator);
    match run(options, command, transport, authorizer, navigator, confirm).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Command failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn parse_command(cli_args: &HashMap<String, String>) -> Option<Command> {
    if let Some(id) = cli_args.get("delete-instance") {
        return Some(Command::DeleteInstance { id: id.clone() });
    }
    if let Some(id) = cli_args.get("delete-app") {
        return Some(Command::DeleteApp { id: id.clone() });
    }
    if cli_args.contains_key("list-apps") {
        return Some(Command::ListApps);
    }
    if cli_args.contains_key("list-instances") {
        let query = ["page", "perPage"]
            .iter()
            .filter_map(|key| cli_args.get(*key).map(|value| format!("{key}={value}")))
            .collect::<Vec<_>>()
            .join("&");
        return Some(Command::ListInstances { query });
    }
    None
}

fn print_usage() {
    eprintln!("Usage: lambdactl [--settings=<path>] <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  --list-instances [--page=N] [--perPage=M]");
    eprintln!("  --list-apps");
    eprintln!("  --delete-instance=<id> [--yes]");
    eprintln!("  --delete-app=<id> [--yes]");
    eprintln!("  --version");
}
