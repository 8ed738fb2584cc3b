//! Delete flows through the application and instance controllers

#![allow(clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use api_models::{LambdaApplication, LambdaInstance};
use http::{Method, StatusCode};
use tokio_test::assert_ok;

use lambda_console::controllers::delete::{Decision, DeleteOutcome, DeleteState};
use lambda_console::controllers::lambda_app::{LambdaAppController, DELETE_APP_SUCCESS};
use lambda_console::controllers::lambda_instances::{
    LambdaInstancesController, DELETE_INSTANCE_SUCCESS,
};
use lambda_console::controllers::navigation::LAMBDA_APPS_ROUTE;
use lambda_console::controllers::pagination::PaginationState;
use lambda_console::errors::ConsoleError;
use lambda_console::ui::alert::AlertPolicies;
use lambda_console::ui::busy::BusyTimings;

use crate::mocks::{advance_ms, harness, instance, settle, Harness, RecordingNavigator, HOST};

fn app_controller(h: &Harness, navigator: Arc<RecordingNavigator>) -> LambdaAppController {
    LambdaAppController::new(
        h.store.clone(),
        h.deletes.clone(),
        navigator,
        AlertPolicies::default(),
        BusyTimings::default(),
    )
}

fn instances_controller(h: &Harness) -> LambdaInstancesController {
    LambdaInstancesController::new(
        h.store.clone(),
        h.deletes.clone(),
        PaginationState::default(),
        AlertPolicies::default(),
        BusyTimings::default(),
    )
}

#[tokio::test(start_paused = true)]
async fn test_app_delete_success_banner_and_navigation() {
    let h = harness(vec![instance("li-1", 0)], Decision::Confirm);
    h.transport.respond(StatusCode::NO_CONTENT, "");
    let navigator = Arc::new(RecordingNavigator::default());
    let controller = app_controller(&h, navigator.clone());

    let _: Vec<LambdaApplication> = assert_ok!(h.store.find_all().await);
    assert_eq!(h.store.peek_all::<LambdaApplication>().len(), 1);

    let outcome = assert_ok!(controller.delete_app("app-42").await);
    assert_eq!(outcome, DeleteOutcome::Succeeded);

    let requests = h.transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::DELETE);
    assert_eq!(requests[0].url, format!("{}/api/apps/app-42/", HOST));
    assert_eq!(
        requests[0].headers,
        vec![("Authorization".to_string(), "Token test-token".to_string())]
    );

    // Every cached application is gone, not only app-42.
    assert!(h.store.peek_all::<LambdaApplication>().is_empty());

    let ui = controller.ui();
    assert!(ui.success_delete);
    assert_eq!(ui.message, DELETE_APP_SUCCESS);
    assert_eq!(controller.delete_state(), DeleteState::Succeeded);

    advance_ms(2999).await;
    assert!(controller.ui().success_delete);
    assert!(navigator.routes().is_empty());

    advance_ms(1).await;
    assert!(!controller.ui().success_delete);
    assert_eq!(navigator.routes(), vec![LAMBDA_APPS_ROUTE.to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_declined_delete_sends_nothing() {
    let h = harness(vec![], Decision::Decline);
    let navigator = Arc::new(RecordingNavigator::default());
    let controller = app_controller(&h, navigator.clone());

    let outcome = assert_ok!(controller.delete_app("app-42").await);
    assert_eq!(outcome, DeleteOutcome::Cancelled);
    assert!(h.transport.requests().is_empty());
    assert_eq!(controller.delete_state(), DeleteState::Idle);

    let ui = controller.ui();
    assert!(!ui.success_delete);
    assert!(!ui.failed_delete);
    assert!(ui.message.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_instance_delete_conflict_stays_until_closed() {
    let h = harness(vec![instance("li-1", 0), instance("li-2", 3)], Decision::Confirm);
    h.transport.respond(
        StatusCode::CONFLICT,
        r#"{"errors":[{"detail":"instance is running"}]}"#,
    );
    let controller = instances_controller(&h);
    assert_ok!(controller.refresh().await);

    let outcome = assert_ok!(controller.delete_instance("li-1").await);
    assert_eq!(outcome, DeleteOutcome::Failed("instance is running".to_string()));
    assert_eq!(
        h.transport.requests()[0].url,
        format!("{}/api/lambda-instances/li-1/", HOST)
    );

    // The store is untouched by a failed delete.
    assert_eq!(h.store.peek_all::<LambdaInstance>().len(), 2);

    let ui = controller.ui();
    assert!(ui.failed_delete);
    assert_eq!(ui.message, "instance is running");

    advance_ms(60_000).await;
    assert!(controller.ui().failed_delete);

    controller.close_alert();
    let ui = controller.ui();
    assert!(!ui.failed_delete);
    assert!(ui.alert_hidden);
}

#[tokio::test(start_paused = true)]
async fn test_instance_delete_success_evicts_and_refetches() {
    let h = harness(vec![instance("li-1", 0), instance("li-2", 0)], Decision::Confirm);
    h.transport.respond(StatusCode::NO_CONTENT, "");
    let controller = instances_controller(&h);
    assert_eq!(assert_ok!(controller.refresh().await), 2);
    assert_eq!(h.adapter.fetches(), 1);

    let outcome = assert_ok!(controller.delete_instance("li-1").await);
    assert_eq!(outcome, DeleteOutcome::Succeeded);
    assert!(h.store.peek_all::<LambdaInstance>().is_empty());
    assert_eq!(controller.ui().message, DELETE_INSTANCE_SUCCESS);

    advance_ms(3999).await;
    assert!(controller.ui().success_delete);
    advance_ms(1).await;
    assert!(!controller.ui().success_delete);

    assert_ok!(controller.refresh().await);
    assert_eq!(h.adapter.fetches(), 2);
    assert_eq!(controller.paged().total_items, 2);
}

#[tokio::test(start_paused = true)]
async fn test_network_failure_message() {
    let h = harness(vec![], Decision::Confirm);
    h.transport
        .fail(ConsoleError::Internal("connection refused".to_string()));
    let controller = instances_controller(&h);

    let outcome = assert_ok!(controller.delete_instance("li-9").await);
    let DeleteOutcome::Failed(message) = outcome else {
        panic!("expected a failed delete");
    };
    assert!(message.starts_with("Unable to reach the server:"));
    assert!(message.contains("connection refused"));
    assert!(controller.ui().failed_delete);
}

#[tokio::test(start_paused = true)]
async fn test_torn_down_controller_does_not_navigate() {
    let h = harness(vec![], Decision::Confirm);
    h.transport.respond(StatusCode::OK, "{}");
    let navigator = Arc::new(RecordingNavigator::default());
    let controller = app_controller(&h, navigator.clone());

    assert_ok!(controller.delete_app("app-42").await);
    drop(controller);

    advance_ms(5000).await;
    settle().await;
    assert!(navigator.routes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_withdraw_unloads_instances_after_delay() {
    let h = harness(vec![instance("li-1", 0)], Decision::Confirm);
    let navigator = Arc::new(RecordingNavigator::default());
    let controller = app_controller(&h, navigator);
    let _: Vec<LambdaInstance> = assert_ok!(h.store.find_all().await);

    controller.withdraw();
    assert!(controller.ui().request);

    advance_ms(1999).await;
    assert_eq!(h.store.peek_all::<LambdaInstance>().len(), 1);
    assert!(controller.ui().request);

    advance_ms(1).await;
    assert!(h.store.peek_all::<LambdaInstance>().is_empty());
    assert!(!controller.ui().request);
}

#[tokio::test(start_paused = true)]
async fn test_start_stop_busy_period() {
    let h = harness(vec![], Decision::Confirm);
    let controller = instances_controller(&h);

    let first = controller.start_stop();
    advance_ms(1000).await;
    let second = controller.start_stop();

    // The first operation finishing late must not clear the second one.
    assert!(!first.complete());
    assert!(controller.ui().request);

    advance_ms(3000).await;
    assert!(controller.ui().request);
    advance_ms(1000).await;
    assert!(!controller.ui().request);
    assert!(!second.complete());
}

#[tokio::test(start_paused = true)]
async fn test_delete_abandoned_while_confirming_can_be_retried() {
    let h = harness(vec![instance("li-1", 0)], Decision::Confirm);
    let controller = instances_controller(&h);

    let abandoned =
        tokio::time::timeout(Duration::ZERO, controller.delete_instance("li-1")).await;
    assert!(abandoned.is_err());
    assert_eq!(controller.delete_state(), DeleteState::Idle);
    assert!(h.transport.requests().is_empty());

    h.transport.respond(StatusCode::NO_CONTENT, "");
    let outcome = assert_ok!(controller.delete_instance("li-1").await);
    assert_eq!(outcome, DeleteOutcome::Succeeded);
    assert_eq!(controller.delete_state(), DeleteState::Succeeded);
}

#[tokio::test(start_paused = true)]
async fn test_delete_abandoned_in_flight_ends_failed() {
    let h = harness(vec![instance("li-1", 0)], Decision::Confirm);
    let controller = instances_controller(&h);
    h.transport.stall(true);

    let abandoned = tokio::time::timeout(
        Duration::from_millis(100),
        controller.delete_instance("li-1"),
    )
    .await;
    assert!(abandoned.is_err());
    assert_eq!(h.transport.requests().len(), 1);
    assert_eq!(controller.delete_state(), DeleteState::Failed);

    h.transport.stall(false);
    h.transport.respond(StatusCode::NO_CONTENT, "");
    let outcome = assert_ok!(controller.delete_instance("li-1").await);
    assert_eq!(outcome, DeleteOutcome::Succeeded);
    assert_eq!(h.transport.requests().len(), 2);
}
