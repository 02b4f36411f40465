use crate::{client_utils::ApiResponse, RiskApiError, RiskApiResult};
use opentelemetry::trace::Status;
use reqwest::{Method, StatusCode};
use std::{future::Future, time::Instant};
use tracing::{debug, info_span, Span};
use tracing_futures::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

pub struct RequestSpan {
    span: Span,
    start_time: Instant,
    status: Option<StatusCode>,
}

impl RequestSpan {
    pub fn new(method: &Method, url: &str) -> Self {
        let span = info_span!("risk_sdk.request");
        span.set_attribute("http.request.method", method.to_string());
        span.set_attribute("url.full", url.to_string());

        Self {
            span,
            start_time: Instant::now(),
            status: None,
        }
    }

    fn span(&self) -> Span {
        self.span.clone()
    }

    pub async fn instrument_future<F>(&self, future: F) -> F::Output
    where
        F: Future,
    {
        future.instrument(self.span()).await
    }

    pub fn on_response(&mut self, response: &ApiResponse) {
        self.status = Some(response.status);
    }

    pub fn on_error(&mut self, error: &RiskApiError) {
        if let Some(status) = error.status() {
            self.status = Some(status);
        }
        self.span.set_attribute("exception.message", error.to_string());
        self.span.set_status(Status::error(error.to_string()));
    }

    fn on_end(&self) {
        let duration = self.start_time.elapsed().as_secs_f64();
        if let Some(status) = self.status {
            self.span
                .set_attribute("http.response.status_code", i64::from(status.as_u16()));
        }
        self.span.set_attribute("risk_sdk.duration_seconds", duration);
    }
}

impl Drop for RequestSpan {
    fn drop(&mut self) {
        self.on_end();
    }
}

/// Run one HTTP exchange inside a `risk_sdk.request` span.
pub async fn trace_request<F, Fut>(
    method: &Method,
    url: &str,
    f: F,
) -> RiskApiResult<ApiResponse>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = RiskApiResult<ApiResponse>>,
{
    let mut span = RequestSpan::new(method, url);
    let result = span.instrument_future(f()).await;

    match &result {
        Ok(response) => {
            span.on_response(response);
            span.span.in_scope(|| debug!(status = %response.status, "request completed"));
        }
        Err(error) => {
            span.on_error(error);
            span.span.in_scope(|| debug!(%error, "request failed"));
        }
    }

    result
}
