//! Store loads through the HTTP adapter

#![allow(clippy::expect_used)]

use std::sync::Arc;

use api_models::{LambdaApplication, LambdaInstance};
use http::{Method, StatusCode};
use tokio_test::assert_ok;

use lambda_console::authn::authorizer::DJANGO_SCHEME;
use lambda_console::errors::ConsoleError;
use lambda_console::http::adapter::HttpAdapter;
use lambda_console::http::endpoints::ResourceEndpoint;
use lambda_console::store::resource_store::ResourceStore;

use crate::mocks::{ScriptedTransport, StaticAuthorizer, HOST, NAMESPACE};

fn store(transport: Arc<ScriptedTransport>) -> ResourceStore {
    let adapter = HttpAdapter::new(
        transport,
        Arc::new(StaticAuthorizer),
        ResourceEndpoint::new(HOST, NAMESPACE),
        DJANGO_SCHEME,
    );
    ResourceStore::new(Arc::new(adapter))
}

#[tokio::test]
async fn test_instances_are_fetched_once() {
    let transport = ScriptedTransport::new();
    transport.respond(
        StatusCode::OK,
        r#"{"data":[{"id":"li-1","status_code":0},{"id":"li-2","status_code":1}]}"#,
    );
    let store = store(transport.clone());

    let instances: Vec<LambdaInstance> = assert_ok!(store.find_all().await);
    assert_eq!(instances.len(), 2);
    let _: Vec<LambdaInstance> = assert_ok!(store.find_all().await);

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::GET);
    assert_eq!(requests[0].url, format!("{}/api/lambda-instances/", HOST));
}

#[tokio::test]
async fn test_applications_use_the_namespace() {
    let transport = ScriptedTransport::new();
    transport.respond(StatusCode::OK, r#"{"data":[{"id":"app-42","name":"demo"}]}"#);
    let store = store(transport.clone());

    let apps: Vec<LambdaApplication> = assert_ok!(store.find_all().await);
    assert_eq!(apps[0].id, "app-42");
    assert_eq!(transport.requests()[0].url, format!("{}/api/apps/", HOST));
}

#[tokio::test]
async fn test_error_status_leaves_store_unloaded() {
    let transport = ScriptedTransport::new();
    transport.respond(StatusCode::FORBIDDEN, r#"{"errors":[{"detail":"forbidden"}]}"#);
    let store = store(transport);

    let result = store.find_all::<LambdaInstance>().await;
    assert!(matches!(
        result,
        Err(ConsoleError::RequestFailed { status: 403, .. })
    ));
    assert!(store.peek_all::<LambdaInstance>().is_empty());
}
