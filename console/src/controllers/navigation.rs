//! Route transitions requested by controllers

use tracing::info;

/// Listing of lambda applications
pub const LAMBDA_APPS_ROUTE: &str = "lambda-apps";

/// Moves the operator to another console view
pub trait Navigator: Send + Sync {
    fn transition_to(&self, route: &str);
}

/// Navigator for surfaces without views; records the transition in the log
#[derive(Debug, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn transition_to(&self, route: &str) {
        info!("Transition to route {}", route);
    }
}
