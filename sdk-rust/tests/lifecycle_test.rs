use risk_sdk::{
    risk_sdk_test::MockTransport, ApiRequest, CallLifecycle, CallState, RiskApiClient,
    RiskApiError, RiskApiResult, Transport,
};
use serde_json::json;
use std::{future::Future, pin::Pin, sync::Arc, task::Poll};
use tokio::sync::oneshot;

#[tokio::test]
async fn loading_is_set_only_while_the_call_is_in_flight() {
    let lifecycle = Arc::new(CallLifecycle::new());
    assert_eq!(lifecycle.state(), CallState::default());

    let (release_tx, release_rx) = oneshot::channel::<RiskApiResult<u32>>();
    let (started_tx, started_rx) = oneshot::channel::<()>();

    let task = tokio::spawn({
        let lifecycle = lifecycle.clone();
        async move {
            lifecycle
                .run(|| async move {
                    let _ = started_tx.send(());
                    release_rx
                        .await
                        .unwrap_or_else(|_| Err(RiskApiError::Protocol("dropped".to_string())))
                })
                .await
        }
    });

    started_rx.await.expect("operation should start");
    assert_eq!(
        lifecycle.state(),
        CallState {
            loading: true,
            error: None,
        }
    );

    release_tx.send(Ok(7)).expect("operation should be waiting");
    let value = task.await.expect("task should join").expect("call should succeed");

    assert_eq!(value, 7);
    assert_eq!(lifecycle.state(), CallState::default());
}

#[tokio::test]
async fn failure_is_recorded_and_returned_unchanged() {
    let lifecycle = CallLifecycle::new();

    let err = lifecycle
        .run(|| async {
            Err::<(), _>(RiskApiError::Http(
                reqwest::StatusCode::NOT_FOUND,
                "not found".to_string(),
            ))
        })
        .await
        .expect_err("call should fail");

    match err {
        RiskApiError::Http(status, message) => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(message, "not found");
        }
        other => panic!("unexpected error variant: {other:?}"),
    }
    assert_eq!(
        lifecycle.state(),
        CallState {
            loading: false,
            error: Some("not found".to_string()),
        }
    );
}

#[tokio::test]
async fn a_new_call_clears_the_previous_error() {
    let lifecycle = CallLifecycle::new();

    let _ = lifecycle
        .run(|| async { Err::<(), _>(RiskApiError::Protocol("bad body".to_string())) })
        .await;
    assert_eq!(
        lifecycle.error().as_deref(),
        Some("Protocol error: bad body")
    );

    let (release_tx, release_rx) = oneshot::channel::<()>();
    let call = lifecycle.run(|| async move {
        let _ = release_rx.await;
        Ok::<_, RiskApiError>("done")
    });
    tokio::pin!(call);

    // Poll once so the call starts, then observe the reset state.
    assert!(poll_once(call.as_mut()).await.is_none());
    assert_eq!(
        lifecycle.state(),
        CallState {
            loading: true,
            error: None,
        }
    );

    release_tx.send(()).expect("call should be waiting");
    assert_eq!(call.await.expect("call should succeed"), "done");
    assert_eq!(lifecycle.state(), CallState::default());
}

#[tokio::test]
async fn dropping_an_in_flight_call_clears_loading() {
    let lifecycle = CallLifecycle::new();
    let (_release_tx, release_rx) = oneshot::channel::<()>();

    {
        let call = lifecycle.run(|| async move {
            let _ = release_rx.await;
            Ok::<_, RiskApiError>(())
        });
        tokio::pin!(call);
        assert!(poll_once(call.as_mut()).await.is_none());
        assert!(lifecycle.is_loading());
    }

    assert_eq!(lifecycle.state(), CallState::default());
}

#[tokio::test]
async fn last_completed_call_wins() {
    let lifecycle = Arc::new(CallLifecycle::new());
    let (first_tx, first_rx) = oneshot::channel::<()>();
    let (second_tx, second_rx) = oneshot::channel::<()>();

    let first = tokio::spawn({
        let lifecycle = lifecycle.clone();
        async move {
            lifecycle
                .run(|| async move {
                    let _ = first_rx.await;
                    Err::<(), _>(RiskApiError::InvalidInput("first failed".to_string()))
                })
                .await
        }
    });
    let second = tokio::spawn({
        let lifecycle = lifecycle.clone();
        async move {
            lifecycle
                .run(|| async move {
                    let _ = second_rx.await;
                    Ok::<_, RiskApiError>(())
                })
                .await
        }
    });

    tokio::task::yield_now().await;
    second_tx.send(()).expect("second call waiting");
    second.await.expect("join").expect("second call succeeds");
    first_tx.send(()).expect("first call waiting");
    let _ = first.await.expect("join");

    assert_eq!(
        lifecycle.state(),
        CallState {
            loading: false,
            error: Some("Invalid input: first failed".to_string()),
        }
    );
}

#[tokio::test]
async fn wraps_catalog_operations() {
    let transport = Arc::new(MockTransport::new());
    transport.enqueue(RiskApiError::Http(
        reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        "database unavailable".to_string(),
    ));
    let client = RiskApiClient::new(transport.clone());
    let lifecycle = CallLifecycle::new();

    let result = lifecycle.run(|| client.list_companies()).await;
    assert!(result.is_err());
    assert_eq!(lifecycle.error().as_deref(), Some("database unavailable"));
    assert!(!lifecycle.is_loading());

    transport.enqueue(json!([]));
    let companies = lifecycle
        .run(|| client.list_companies())
        .await
        .expect("second call succeeds");
    assert!(companies.is_empty());
    assert_eq!(lifecycle.state(), CallState::default());
    assert_eq!(
        transport.tracked_requests(),
        vec![ApiRequest::get("/companies"), ApiRequest::get("/companies")]
    );

    lifecycle.set_error(Some("shown to the user".to_string()));
    assert_eq!(lifecycle.error().as_deref(), Some("shown to the user"));
    lifecycle.clear_error();
    assert_eq!(lifecycle.error(), None);

    // The transport is usable directly as well.
    transport.enqueue(json!({ "ok": true }));
    assert_eq!(
        transport
            .send(ApiRequest::get("/health"))
            .await
            .expect("mocked"),
        json!({ "ok": true })
    );
}

/// Poll a future exactly once, returning its output if it completed.
async fn poll_once<F: Future + Unpin>(mut future: F) -> Option<F::Output> {
    std::future::poll_fn(|cx| {
        Poll::Ready(match Pin::new(&mut future).poll(cx) {
            Poll::Ready(output) => Some(output),
            Poll::Pending => None,
        })
    })
    .await
}
