//! Deployment poller behavior against a live store

#![allow(clippy::expect_used)]

use std::time::Duration;

use api_models::LambdaInstance;
use tokio_test::assert_ok;

use lambda_console::controllers::delete::Decision;
use lambda_console::controllers::deploy::{DeployController, Options};
use lambda_console::errors::ConsoleError;

use crate::mocks::{advance_ms, harness, instance};

fn options(prune_ready: bool) -> Options {
    Options {
        prune_ready,
        ..Options::default()
    }
}

fn ready(id: &str) -> LambdaInstance {
    LambdaInstance {
        id: id.to_string(),
        name: id.to_string(),
        status_code: 0,
        status_message: None,
        application_id: None,
        updated_at: None,
    }
}

#[tokio::test(start_paused = true)]
async fn test_query_is_deferred_by_evaluation_delay() {
    let h = harness(vec![], Decision::Confirm);
    let deploy = DeployController::new(h.store.clone(), options(true));

    let _ticket = assert_ok!(deploy.on_deploy_triggered("app-1", "li-7"));
    assert_eq!(deploy.pending_ids(), vec!["li-7".to_string()]);
    assert!(deploy.ui().request);

    advance_ms(999).await;
    assert_eq!(deploy.pending_ids(), vec!["li-7".to_string()]);
    assert!(deploy.live_instances().is_none());

    advance_ms(1).await;
    assert!(deploy.live_instances().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_live_query_excludes_tracked_instances() {
    let h = harness(vec![], Decision::Confirm);
    let deploy = DeployController::new(h.store.clone(), options(false));

    h.store.create_record(ready("li-1"));
    h.store.create_record(ready("li-2"));
    assert_ok!(deploy.on_deploy_triggered("app-1", "li-2"));
    advance_ms(1000).await;

    // Ready instances still tracked as pending are filtered out.
    let ids: Vec<String> = deploy
        .live_instances()
        .expect("query registered")
        .into_iter()
        .map(|li| li.id)
        .collect();
    assert_eq!(ids, vec!["li-1".to_string()]);

    // A refresh after the deploy reports it; without pruning it stays hidden.
    h.store.create_record(ready("li-2"));
    advance_ms(0).await;
    assert_eq!(deploy.ready_ids(), vec!["li-2".to_string()]);
    assert_eq!(deploy.pending_ids(), vec!["li-2".to_string()]);
    assert_eq!(deploy.live_instances().map(|l| l.len()), Some(1));
}

#[tokio::test(start_paused = true)]
async fn test_redeploy_ignores_stale_ready_record() {
    let h = harness(vec![], Decision::Confirm);
    let deploy = DeployController::new(h.store.clone(), options(true));

    // Cached from before the redeploy; the store is not refreshed afterwards.
    h.store.create_record(ready("li-5"));
    let revision = h.store.revision();
    assert_ok!(deploy.on_deploy_triggered("app-1", "li-5"));
    advance_ms(1000).await;

    assert_eq!(h.store.revision(), revision);
    assert_eq!(deploy.pending_ids(), vec!["li-5".to_string()]);
    assert!(deploy.ready_ids().is_empty());
    assert_eq!(deploy.live_instances().map(|l| l.len()), Some(0));

    // The next refresh carries the post-deploy status.
    h.store.push(vec![ready("li-5")]);
    advance_ms(0).await;
    assert!(deploy.pending_ids().is_empty());
    assert_eq!(deploy.ready_ids(), vec!["li-5".to_string()]);
    assert_eq!(deploy.live_instances().map(|l| l.len()), Some(1));
}

#[tokio::test(start_paused = true)]
async fn test_ready_instance_is_pruned_on_store_change() {
    let h = harness(vec![instance("li-3", 2)], Decision::Confirm);
    let deploy = DeployController::new(h.store.clone(), options(true));
    let _: Vec<LambdaInstance> = assert_ok!(h.store.find_all().await);

    assert_ok!(deploy.on_deploy_triggered("app-1", "li-3"));
    advance_ms(1000).await;
    assert!(deploy.ready_ids().is_empty());
    assert_eq!(deploy.live_instances().map(|l| l.len()), Some(0));

    h.store.create_record(ready("li-3"));
    advance_ms(0).await;

    assert_eq!(deploy.ready_ids(), vec!["li-3".to_string()]);
    assert!(deploy.pending_ids().is_empty());
    assert_eq!(deploy.live_instances().map(|l| l.len()), Some(1));
}

#[tokio::test(start_paused = true)]
async fn test_closed_store_faults_the_poller() {
    let h = harness(vec![], Decision::Confirm);
    let deploy = DeployController::new(h.store.clone(), options(true));

    h.store.close();
    assert_ok!(deploy.on_deploy_triggered("app-1", "li-1"));
    advance_ms(1000).await;

    assert!(deploy.fault().is_some());
    assert!(deploy.live_instances().is_none());
    assert!(matches!(
        deploy.on_deploy_triggered("app-1", "li-2"),
        Err(ConsoleError::PollerError(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_deploy_with_clears_busy_on_result() {
    let h = harness(vec![], Decision::Confirm);
    let deploy = DeployController::new(h.store.clone(), options(true));

    let result = deploy
        .deploy_with("app-1", "li-1", async {
            tokio::time::sleep(Duration::from_millis(300)).await;
            Ok::<_, ConsoleError>("accepted")
        })
        .await;
    assert_eq!(assert_ok!(result), "accepted");
    assert!(!deploy.ui().request);
}

#[tokio::test(start_paused = true)]
async fn test_busy_fallback_clears_after_deploy_delay() {
    let h = harness(vec![], Decision::Confirm);
    let deploy = DeployController::new(h.store.clone(), options(true));

    let _ticket = assert_ok!(deploy.on_deploy_triggered("app-1", "li-1"));
    advance_ms(2499).await;
    assert!(deploy.ui().request);
    advance_ms(1).await;
    assert!(!deploy.ui().request);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_controller_defuses_evaluation() {
    let h = harness(vec![], Decision::Confirm);
    let deploy = DeployController::new(h.store.clone(), options(true));
    h.store.close();

    assert_ok!(deploy.on_deploy_triggered("app-1", "li-1"));
    drop(deploy);

    // Nothing left to run; advancing must not panic or touch the store.
    advance_ms(5000).await;
    assert!(h.store.is_closed());
}
