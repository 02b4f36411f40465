use std::{collections::VecDeque, sync::Mutex};

use serde_json::Value;

use crate::{
    errors::{RiskApiError, RiskApiResult},
    transport::{ApiRequest, Transport},
};

/// Result for a mocked `send` call.
/// It can either be a JSON body or an error to return.
pub enum MockResult {
    Response(Value),
    Error(RiskApiError),
}

impl MockResult {
    /// Construct a result that yields the provided body.
    pub fn response(body: Value) -> Self {
        Self::Response(body)
    }

    /// Construct a result that yields the provided error.
    pub fn error(error: RiskApiError) -> Self {
        Self::Error(error)
    }
}

impl From<Value> for MockResult {
    fn from(body: Value) -> Self {
        Self::response(body)
    }
}

impl From<RiskApiError> for MockResult {
    fn from(error: RiskApiError) -> Self {
        Self::error(error)
    }
}

impl From<RiskApiResult<Value>> for MockResult {
    fn from(result: RiskApiResult<Value>) -> Self {
        match result {
            Ok(body) => Self::Response(body),
            Err(error) => Self::Error(error),
        }
    }
}

#[derive(Default)]
struct MockTransportState {
    mocked_results: VecDeque<MockResult>,
    tracked_requests: Vec<ApiRequest>,
}

impl MockTransportState {
    fn reset(&mut self) {
        self.tracked_requests.clear();
    }

    fn restore(&mut self) {
        self.mocked_results.clear();
        self.reset();
    }
}

/// A mock transport for testing that tracks requests and yields predefined
/// results in order.
#[derive(Default)]
pub struct MockTransport {
    state: Mutex<MockTransportState>,
}

impl MockTransport {
    /// Construct a new mock transport instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue one or more mocked results.
    pub fn enqueue_results<I>(&self, results: I) -> &Self
    where
        I: IntoIterator<Item = MockResult>,
    {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.mocked_results.extend(results);
        drop(state);
        self
    }

    /// Convenience to enqueue a single mocked result.
    pub fn enqueue<R>(&self, result: R) -> &Self
    where
        R: Into<MockResult>,
    {
        self.enqueue_results(std::iter::once(result.into()))
    }

    /// Retrieve the requests sent so far.
    pub fn tracked_requests(&self) -> Vec<ApiRequest> {
        let state = self.state.lock().expect("mock state poisoned");
        state.tracked_requests.clone()
    }

    /// Number of results not consumed yet.
    pub fn pending_results(&self) -> usize {
        let state = self.state.lock().expect("mock state poisoned");
        state.mocked_results.len()
    }

    /// Reset tracked requests without touching enqueued results.
    pub fn reset(&self) {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.reset();
    }

    /// Clear both tracked requests and enqueued results.
    pub fn restore(&self) {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.restore();
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> RiskApiResult<Value> {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.tracked_requests.push(request);

        let result = state.mocked_results.pop_front().ok_or_else(|| {
            RiskApiError::InvalidInput("no mocked results available".to_string())
        })?;

        match result {
            MockResult::Response(body) => Ok(body),
            MockResult::Error(error) => Err(error),
        }
    }
}
