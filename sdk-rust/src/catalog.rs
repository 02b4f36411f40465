use crate::{
    client_utils::decode, AnalysisRecord, AnalysisRequest, AnalysisResult, AnalysisSummary,
    ApiRequest, Company, Document, FilePayload, HttpTransport, ListAnalysesQuery, RequestBody,
    RiskApiError, RiskApiResult, RiskType, Transport, TransportOptions,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use urlencoding::encode;

#[derive(Serialize)]
struct CreateCompanyBody<'a> {
    name: &'a str,
    context: &'a str,
}

#[derive(Serialize)]
struct AddContextBody<'a> {
    context: &'a str,
}

#[derive(Serialize)]
struct DynamicRiskBody<'a> {
    risk_description: &'a str,
    risk_context: &'a str,
    risk_type: RiskType,
}

/// Typed operations of the risk analysis service.
///
/// Each operation only shapes the request and decodes the response; local
/// validation is left to callers.
#[derive(Clone)]
pub struct RiskApiClient {
    transport: Arc<dyn Transport>,
}

impl RiskApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// A client over HTTP with the given options.
    #[must_use]
    pub fn http(options: TransportOptions) -> Self {
        Self::new(Arc::new(HttpTransport::new(options)))
    }

    #[must_use]
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub async fn list_companies(&self) -> RiskApiResult<Vec<Company>> {
        let body = self.transport.send(ApiRequest::get("/companies")).await?;
        decode(body)
    }

    pub async fn create_company(&self, name: &str, context: &str) -> RiskApiResult<Company> {
        let body = to_json(&CreateCompanyBody { name, context })?;
        let response = self
            .transport
            .send(ApiRequest::post("/companies", body))
            .await?;
        decode(response)
    }

    /// Append context to a company. The acknowledgment body is returned as
    /// received.
    pub async fn add_context(&self, company_id: &str, context: &str) -> RiskApiResult<Value> {
        let body = to_json(&AddContextBody { context })?;
        self.transport
            .send(ApiRequest::post(
                format!("{}/context", company_path(company_id)),
                body,
            ))
            .await
    }

    pub async fn get_company(&self, company_id: &str) -> RiskApiResult<Company> {
        let body = self
            .transport
            .send(ApiRequest::get(company_path(company_id)))
            .await?;
        decode(body)
    }

    pub async fn upload_document(
        &self,
        company_id: &str,
        file: FilePayload,
    ) -> RiskApiResult<Document> {
        let body = self
            .transport
            .send(ApiRequest::post(
                format!("{}/documents", company_path(company_id)),
                RequestBody::File(file),
            ))
            .await?;
        decode(body)
    }

    /// Trigger an analysis and return the response without normalizing it.
    pub async fn trigger_analysis(
        &self,
        company_id: &str,
        request: &AnalysisRequest,
    ) -> RiskApiResult<Value> {
        let body = match request {
            AnalysisRequest::General => RequestBody::Json(json!({})),
            AnalysisRequest::DynamicRisk(request) => to_json(&DynamicRiskBody {
                risk_description: &request.description,
                risk_context: &request.context,
                risk_type: request.risk_type,
            })?,
        };
        self.transport
            .send(ApiRequest::post(
                format!("{}/analyse", company_path(company_id)),
                body,
            ))
            .await
    }

    /// Trigger an analysis and normalize the response according to the kind
    /// of request.
    pub async fn run_analysis(
        &self,
        company_id: &str,
        request: &AnalysisRequest,
    ) -> RiskApiResult<AnalysisResult> {
        let raw = self.trigger_analysis(company_id, request).await?;
        Ok(AnalysisResult::from_response(request.kind(), raw))
    }

    pub async fn list_analyses(
        &self,
        company_id: &str,
        query: &ListAnalysesQuery,
    ) -> RiskApiResult<Vec<AnalysisSummary>> {
        let mut path = format!("{}/analyses", company_path(company_id));
        let query_string = analyses_query_string(query);
        if !query_string.is_empty() {
            path.push('?');
            path.push_str(&query_string);
        }
        let body = self.transport.send(ApiRequest::get(path)).await?;
        decode(body)
    }

    pub async fn get_analysis(
        &self,
        company_id: &str,
        analysis_id: &str,
    ) -> RiskApiResult<AnalysisRecord> {
        let body = self
            .transport
            .send(ApiRequest::get(format!(
                "{}/analyses/{}",
                company_path(company_id),
                encode(analysis_id)
            )))
            .await?;
        decode(body)
    }
}

fn company_path(company_id: &str) -> String {
    format!("/companies/{}", encode(company_id))
}

fn analyses_query_string(query: &ListAnalysesQuery) -> String {
    let mut params: Vec<(&str, String)> = vec![];
    if let Some(analysis_type) = query.analysis_type {
        params.push(("analysis_type", analysis_type.as_str().to_string()));
    }
    if let Some(limit) = query.limit {
        params.push(("limit", limit.to_string()));
    }
    params
        .iter()
        .map(|(key, value)| format!("{key}={}", encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

fn to_json<T: Serialize>(body: &T) -> RiskApiResult<RequestBody> {
    serde_json::to_value(body)
        .map(RequestBody::Json)
        .map_err(|error| RiskApiError::InvalidInput(format!("Invalid request body: {error}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AnalysisKind;

    #[test]
    fn query_string_is_empty_without_filters() {
        assert_eq!(analyses_query_string(&ListAnalysesQuery::default()), "");
    }

    #[test]
    fn query_string_keeps_parameter_order() {
        let query = ListAnalysesQuery::default()
            .with_analysis_type(AnalysisKind::DynamicRisk)
            .with_limit(10);
        assert_eq!(
            analyses_query_string(&query),
            "analysis_type=dynamic_risk&limit=10"
        );
    }

    #[test]
    fn company_ids_are_percent_encoded() {
        assert_eq!(company_path("acme/eu 1"), "/companies/acme%2Feu%201");
    }
}
