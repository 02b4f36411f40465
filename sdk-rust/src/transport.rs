use crate::{client_utils, RiskApiError, RiskApiResult};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client, Method,
};
use serde_json::Value;
use std::{collections::HashMap, fmt};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5001/api";
/// Environment variable read by [`TransportOptions::from_env`].
pub const BASE_URL_ENV: &str = "RISK_API_BASE_URL";

/// A request against the risk analysis service, relative to the base
/// address.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: RequestBody::Empty,
        }
    }

    pub fn post(path: impl Into<String>, body: RequestBody) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    /// Sent as JSON text.
    Json(Value),
    /// Sent as a multipart form with a single `file` field.
    File(FilePayload),
}

/// A file to upload.
#[derive(Clone, PartialEq)]
pub struct FilePayload {
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl FilePayload {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for FilePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilePayload")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Executes requests against the service. One attempt per call, no retries.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> RiskApiResult<Value>;
}

#[derive(Clone, Default)]
pub struct TransportOptions {
    /// Defaults to [`DEFAULT_BASE_URL`].
    pub base_url: Option<String>,
    /// Extra headers attached to every request.
    pub headers: Option<HashMap<String, String>>,
    pub client: Option<Client>,
}

impl TransportOptions {
    /// Options with the base address taken from `RISK_API_BASE_URL`, if set.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var(BASE_URL_ENV)
                .ok()
                .filter(|value| !value.trim().is_empty()),
            ..Self::default()
        }
    }
}

/// [`Transport`] over HTTP.
pub struct HttpTransport {
    base_url: String,
    client: Client,
    headers: HashMap<String, String>,
}

impl HttpTransport {
    #[must_use]
    pub fn new(mut options: TransportOptions) -> Self {
        let base_url = options
            .base_url
            .take()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let client = options.client.take().unwrap_or_default();

        let headers = options.headers.unwrap_or_default();

        Self {
            base_url,
            client,
            headers,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn request_headers(&self) -> RiskApiResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        for (key, value) in &self.headers {
            let header_name = HeaderName::from_bytes(key.as_bytes()).map_err(|error| {
                RiskApiError::InvalidInput(format!("Invalid header name '{key}': {error}"))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|error| {
                RiskApiError::InvalidInput(format!("Invalid header value for '{key}': {error}"))
            })?;
            headers.insert(header_name, header_value);
        }

        Ok(headers)
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(TransportOptions::default())
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> RiskApiResult<Value> {
        let ApiRequest { method, path, body } = request;
        let url = self.url_for(&path);
        let headers = self.request_headers()?;

        debug!(%method, %url, "sending request");

        let response = crate::opentelemetry::trace_request(&method, &url, || {
            client_utils::send_request(&self.client, method.clone(), &url, body, headers)
        })
        .await?;

        Ok(response.body)
    }
}
