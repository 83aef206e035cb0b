//! # Query Integration Tests
//!
//! Request/response over the facade: result shapes, ordering, call
//! isolation under concurrency, timeouts and failures.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use coffee_core::{
    Command, CommandFactory, Facade, FacadeConfig, FacadeError, HandlerError, Notification,
    NotificationHandler, QueryResponse,
};

/// Answers after sleeping `body` milliseconds.
struct SlowDoubler;

#[async_trait]
impl NotificationHandler<u64, u64> for SlowDoubler {
    async fn handle(&self, notification: &mut Notification<'_, u64>) -> Result<u64, HandlerError> {
        let value = *notification.body();
        tokio::time::sleep(Duration::from_millis(value)).await;
        Ok(value * 2)
    }
}

#[derive(Default)]
struct SquareCommand;

#[async_trait]
impl Command<u64, u64> for SquareCommand {
    async fn execute(&mut self, notification: &mut Notification<'_, u64>) -> Result<u64, HandlerError> {
        let value = *notification.body();
        Ok(value * value)
    }
}

struct ZeroCommand;

#[async_trait]
impl Command<u64, u64> for ZeroCommand {
    async fn execute(&mut self, _notification: &mut Notification<'_, u64>) -> Result<u64, HandlerError> {
        Ok(0)
    }
}

#[tokio::test]
async fn test_single_responder_yields_single() {
    let facade = Facade::<u64, u64>::with_defaults();
    facade.register_command("SQUARE", CommandFactory::of::<SquareCommand>());

    let response = facade.query("SQUARE", 7).await.unwrap();

    assert_eq!(response, QueryResponse::Single(49));
}

#[tokio::test]
async fn test_several_responders_yield_ordered_many() {
    let facade = Facade::<u64, u64>::with_defaults();
    facade.register_command("CALC", CommandFactory::of::<SquareCommand>());
    facade.subscribe_fn("CALC", |n: &mut Notification<'_, u64>| Ok(*n.body() + 1));
    facade.subscribe("CALC", Arc::new(SlowDoubler));

    let response = facade.query("CALC", 3).await.unwrap();

    assert_eq!(response, QueryResponse::Many(vec![9, 4, 6]));
}

#[tokio::test]
async fn test_query_without_responders_is_empty_many() {
    let facade = Facade::<u64, u64>::with_defaults();

    let response = facade.query("NOBODY", 1).await.unwrap();

    assert_eq!(response, QueryResponse::Many(vec![]));
    assert!(response.is_empty());
}

#[tokio::test]
async fn test_handlers_see_correlation_id() {
    let facade = Facade::<u64, bool>::with_defaults();
    facade.subscribe_fn("CHECK", |n: &mut Notification<'_, u64>| Ok(n.is_query()));

    let queried = facade.query("CHECK", 0).await.unwrap();
    assert_eq!(queried, QueryResponse::Single(true));

    // Plain notifications carry no correlation id.
    let seen = Arc::new(parking_lot::Mutex::new(None));
    let sink = Arc::clone(&seen);
    facade.subscribe_fn("PLAIN", move |n: &mut Notification<'_, u64>| {
        *sink.lock() = Some(n.is_query());
        Ok(false)
    });
    facade.send_notification("PLAIN", &mut 0).await.unwrap();
    assert_eq!(*seen.lock(), Some(false));
}

#[tokio::test]
async fn test_overlapping_queries_do_not_cross_resolve() {
    let facade = Facade::<u64, u64>::with_defaults();
    facade.subscribe("DOUBLE", Arc::new(SlowDoubler));

    // The slow query starts first and finishes last.
    let (slow, fast) = tokio::join!(facade.query("DOUBLE", 40), facade.query("DOUBLE", 5));

    assert_eq!(slow.unwrap(), QueryResponse::Single(80));
    assert_eq!(fast.unwrap(), QueryResponse::Single(10));
}

#[tokio::test]
async fn test_concurrent_queries_across_tasks() {
    let facade = Facade::<u64, u64>::with_defaults();
    facade.subscribe("DOUBLE", Arc::new(SlowDoubler));

    let mut tasks = Vec::new();
    for value in 1..=8u64 {
        let facade = Arc::clone(&facade);
        tasks.push(tokio::spawn(async move {
            (value, facade.query("DOUBLE", value).await)
        }));
    }

    for task in tasks {
        let (value, response) = task.await.unwrap();
        assert_eq!(response.unwrap(), QueryResponse::Single(value * 2));
    }
}

#[tokio::test]
async fn test_query_times_out() {
    let facade = Facade::<u64, u64>::with_defaults();
    facade.subscribe("DOUBLE", Arc::new(SlowDoubler));

    let err = facade
        .query_with_timeout("DOUBLE", 500, Duration::from_millis(20))
        .await
        .unwrap_err();

    match err {
        FacadeError::QueryTimeout { name, timeout, .. } => {
            assert_eq!(name, "DOUBLE");
            assert_eq!(timeout, Duration::from_millis(20));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_configured_timeout_applies_to_query() {
    let config = FacadeConfig::default().with_query_timeout(Duration::from_millis(20));
    let facade = Facade::<u64, u64>::new(config).unwrap();
    facade.subscribe("DOUBLE", Arc::new(SlowDoubler));

    let result = facade.query("DOUBLE", 500).await;

    assert!(matches!(result, Err(FacadeError::QueryTimeout { .. })));
}

#[tokio::test]
async fn test_query_surfaces_handler_failure() {
    let facade = Facade::<u64, u64>::with_defaults();
    facade.subscribe_fn("CALC", |_n: &mut Notification<'_, u64>| {
        Err(HandlerError::from(anyhow::anyhow!("division by zero")))
    });

    let result = facade.query("CALC", 1).await;

    assert!(matches!(result, Err(FacadeError::Dispatch(_))));
}

#[tokio::test]
async fn test_query_result_follows_command_replacement() {
    let facade = Facade::<u64, u64>::with_defaults();
    facade.register_command("CALC", CommandFactory::of::<SquareCommand>());
    facade.register_command("CALC", CommandFactory::new(|| ZeroCommand));

    assert_eq!(facade.query("CALC", 9).await.unwrap(), QueryResponse::Single(0));
}
