use crate::{FilePayload, RequestBody, RiskApiError, RiskApiResult};
use reqwest::{
    header::HeaderMap,
    multipart::{Form, Part},
    Client, Method, StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

const FILE_FIELD: &str = "file";

/// A decoded success response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Send a request, parse the JSON response.
/// Fails on any non-success status code and on a success body that is not
/// valid JSON.
pub async fn send_request(
    client: &Client,
    method: Method,
    url: &str,
    body: RequestBody,
    headers: HeaderMap,
) -> RiskApiResult<ApiResponse> {
    let builder = client.request(method, url).headers(headers);
    // The multipart encoder sets its own content type with the boundary.
    let builder = match body {
        RequestBody::Empty => builder,
        RequestBody::Json(value) => builder.json(&value),
        RequestBody::File(file) => builder.multipart(file_form(file)?),
    };

    let response = builder.send().await?;
    let status = response.status();

    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(RiskApiError::Http(status, error_message(status, &text)));
    }

    let text = response.text().await?;
    let body = serde_json::from_str(&text).map_err(|error| {
        RiskApiError::Protocol(format!("Response body is not valid JSON: {error}"))
    })?;

    Ok(ApiResponse { status, body })
}

/// Decode a JSON body into the expected shape.
pub fn decode<R: DeserializeOwned>(body: Value) -> RiskApiResult<R> {
    serde_json::from_value(body)
        .map_err(|error| RiskApiError::Protocol(format!("Unexpected response shape: {error}")))
}

/// The `error` field of an error body, or a generic message with the status
/// code when the body has none.
pub fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .as_ref()
        .and_then(|value| value.get("error"))
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .map_or_else(
            || format!("HTTP error! status: {}", status.as_u16()),
            str::to_string,
        )
}

fn file_form(file: FilePayload) -> RiskApiResult<Form> {
    let FilePayload {
        file_name,
        mime_type,
        data,
    } = file;
    let part = Part::bytes(data)
        .file_name(file_name)
        .mime_str(&mime_type)
        .map_err(|error| {
            RiskApiError::InvalidInput(format!("Invalid MIME type '{mime_type}': {error}"))
        })?;
    Ok(Form::new().part(FILE_FIELD, part))
}
