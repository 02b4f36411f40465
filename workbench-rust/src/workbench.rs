use crate::{
    documents::{validate_document, DEFAULT_MAX_UPLOAD_BYTES, EML_MIME_TYPE, PDF_MIME_TYPE},
    WorkbenchError, WorkbenchResult,
};
use futures::lock::Mutex;
use risk_sdk::{
    AnalysisRecord, AnalysisRequest, AnalysisResult, AnalysisSummary, CallLifecycle, CallState,
    Company, Document, FilePayload, ListAnalysesQuery, RiskApiClient, RiskApiError, RiskApiResult,
};
use tracing::{info, info_span, warn};
use tracing_futures::Instrument;

/// Options for a [`Workbench`].
/// # Default Values
/// - `history_limit`: 10
/// - `max_upload_bytes`: 10 MiB
/// - `allowed_document_types`: `application/pdf`, `message/rfc822`
#[derive(Debug, Clone, Default)]
pub struct WorkbenchOptions {
    /// Number of analyses fetched when the history is (re)loaded.
    pub history_limit: Option<u32>,
    pub max_upload_bytes: Option<usize>,
    /// MIME types accepted for upload.
    pub allowed_document_types: Option<Vec<String>>,
}

/// The controller over the risk analysis service. Keeps the last fetched
/// state of each view and one call lifecycle per view, so each can show its
/// own loading and error indicator.
pub struct Workbench {
    client: RiskApiClient,
    history_limit: u32,
    max_upload_bytes: usize,
    allowed_document_types: Vec<String>,

    companies_call: CallLifecycle,
    documents_call: CallLifecycle,
    analysis_call: CallLifecycle,

    companies: Mutex<Vec<Company>>,
    selected: Mutex<Option<Company>>,
    last_result: Mutex<Option<AnalysisResult>>,
    analyses: Mutex<Vec<AnalysisSummary>>,
    opened_analysis: Mutex<Option<AnalysisRecord>>,
}

impl Workbench {
    #[must_use]
    pub fn new(client: RiskApiClient, options: WorkbenchOptions) -> Self {
        Self {
            client,
            history_limit: options.history_limit.unwrap_or(10),
            max_upload_bytes: options.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            allowed_document_types: options.allowed_document_types.unwrap_or_else(|| {
                vec![PDF_MIME_TYPE.to_string(), EML_MIME_TYPE.to_string()]
            }),
            companies_call: CallLifecycle::new(),
            documents_call: CallLifecycle::new(),
            analysis_call: CallLifecycle::new(),
            companies: Mutex::new(vec![]),
            selected: Mutex::new(None),
            last_result: Mutex::new(None),
            analyses: Mutex::new(vec![]),
            opened_analysis: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn client(&self) -> &RiskApiClient {
        &self.client
    }

    #[must_use]
    pub fn companies_state(&self) -> CallState {
        self.companies_call.state()
    }

    #[must_use]
    pub fn documents_state(&self) -> CallState {
        self.documents_call.state()
    }

    #[must_use]
    pub fn analysis_state(&self) -> CallState {
        self.analysis_call.state()
    }

    pub async fn companies(&self) -> Vec<Company> {
        self.companies.lock().await.clone()
    }

    pub async fn selected_company(&self) -> Option<Company> {
        self.selected.lock().await.clone()
    }

    pub async fn last_result(&self) -> Option<AnalysisResult> {
        self.last_result.lock().await.clone()
    }

    pub async fn analyses(&self) -> Vec<AnalysisSummary> {
        self.analyses.lock().await.clone()
    }

    pub async fn opened_analysis(&self) -> Option<AnalysisRecord> {
        self.opened_analysis.lock().await.clone()
    }

    /// Fetch the company list and replace the cached one.
    pub async fn load_companies(&self) -> WorkbenchResult<Vec<Company>> {
        let companies = self
            .companies_call
            .run(|| self.client.list_companies())
            .await?;
        *self.companies.lock().await = companies.clone();
        Ok(companies)
    }

    /// Create a company, then reload the list. Names are compared with the
    /// cached list after trimming; a name already present is rejected without
    /// contacting the service. Once the service has created the company a
    /// failed reload is recorded on the companies lifecycle only.
    pub async fn add_company(&self, name: &str, context: &str) -> WorkbenchResult<Company> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WorkbenchError::InvalidInput(
                "Please enter a company name".to_string(),
            ));
        }
        if self
            .companies
            .lock()
            .await
            .iter()
            .any(|company| company.name == name)
        {
            return Err(WorkbenchError::DuplicateCompany(name.to_string()));
        }

        let company = self
            .companies_call
            .run(|| self.client.create_company(name, context))
            .await?;
        info!(company_id = %company.id, "company added");
        self.companies.lock().await.push(company.clone());

        self.refresh_companies().await;
        Ok(company)
    }

    /// Append context to a company, then reload the list and, when it is the
    /// selected company, its detail. Reload failures do not fail the call.
    pub async fn add_context(&self, company_id: &str, context: &str) -> WorkbenchResult<()> {
        if context.trim().is_empty() {
            return Err(WorkbenchError::InvalidInput(
                "Please enter context".to_string(),
            ));
        }

        self.companies_call
            .run(|| self.client.add_context(company_id, context))
            .await?;
        self.refresh_companies().await;

        if self.selected_company_id().await.as_deref() == Some(company_id) {
            self.refresh_selected(&self.companies_call).await;
        }
        Ok(())
    }

    /// Fetch a company's detail and make it the selected company. The last
    /// analysis result is cleared and the analysis history reloaded.
    pub async fn select_company(&self, company_id: &str) -> WorkbenchResult<Company> {
        async {
            let company = self
                .companies_call
                .run(|| self.client.get_company(company_id))
                .await?;

            *self.selected.lock().await = Some(company.clone());
            *self.last_result.lock().await = None;
            *self.opened_analysis.lock().await = None;
            self.analyses.lock().await.clear();

            self.refresh_history(&company.id).await;
            Ok::<_, WorkbenchError>(company)
        }
        .instrument(info_span!("risk_workbench.select_company", company_id))
        .await
    }

    /// Upload a document for the selected company. Type and size are checked
    /// locally first. Once the service acknowledges the upload the selected
    /// company is fetched again so its document list is current; a failure to
    /// do so is recorded on the documents lifecycle but does not fail the
    /// upload.
    pub async fn upload_document(&self, file: FilePayload) -> WorkbenchResult<Document> {
        let company_id = self.require_selected().await?;
        validate_document(&file, &self.allowed_document_types, self.max_upload_bytes)?;

        let file_name = file.file_name.clone();
        let document = self
            .documents_call
            .run(|| self.client.upload_document(&company_id, file))
            .await?;
        info!(%company_id, %file_name, "document uploaded");

        self.refresh_selected(&self.documents_call).await;
        Ok(document)
    }

    /// Run an analysis for the selected company and keep its normalized
    /// result. The history is reloaded afterwards; a failure to reload is
    /// recorded on the analysis lifecycle but does not fail the run.
    pub async fn run_analysis(&self, request: AnalysisRequest) -> WorkbenchResult<AnalysisResult> {
        let company_id = self.require_selected().await?;
        request.validate().map_err(|error| match error {
            RiskApiError::InvalidInput(message) => WorkbenchError::InvalidInput(message),
            other => other.into(),
        })?;

        async {
            let result = self
                .analysis_call
                .run(|| self.client.run_analysis(&company_id, &request))
                .await?;
            info!(kind = %result.kind(), "analysis completed");

            *self.last_result.lock().await = Some(result.clone());
            self.refresh_history(&company_id).await;
            Ok::<_, WorkbenchError>(result)
        }
        .instrument(info_span!(
            "risk_workbench.run_analysis",
            company_id = %company_id,
            analysis_type = %request.kind()
        ))
        .await
    }

    /// Fetch the most recent analyses of the selected company.
    pub async fn load_analyses(&self) -> WorkbenchResult<Vec<AnalysisSummary>> {
        let company_id = self.require_selected().await?;
        Ok(self.fetch_history(&company_id).await?)
    }

    /// Fetch one stored analysis of the selected company.
    pub async fn open_analysis(&self, analysis_id: &str) -> WorkbenchResult<AnalysisRecord> {
        let company_id = self.require_selected().await?;
        let record = self
            .analysis_call
            .run(|| self.client.get_analysis(&company_id, analysis_id))
            .await?;
        *self.opened_analysis.lock().await = Some(record.clone());
        Ok(record)
    }

    async fn fetch_history(&self, company_id: &str) -> RiskApiResult<Vec<AnalysisSummary>> {
        let query = ListAnalysesQuery::default().with_limit(self.history_limit);
        let analyses = self
            .analysis_call
            .run(|| self.client.list_analyses(company_id, &query))
            .await?;
        *self.analyses.lock().await = analyses.clone();
        Ok(analyses)
    }

    async fn refresh_history(&self, company_id: &str) {
        if let Err(error) = self.fetch_history(company_id).await {
            warn!(%error, company_id, "failed to load analyses");
        }
    }

    async fn refresh_companies(&self) {
        if let Err(error) = self.load_companies().await {
            warn!(%error, "failed to reload companies");
        }
    }

    async fn refresh_selected(&self, lifecycle: &CallLifecycle) {
        let Some(company_id) = self.selected_company_id().await else {
            return;
        };
        match lifecycle.run(|| self.client.get_company(&company_id)).await {
            Ok(company) => *self.selected.lock().await = Some(company),
            Err(error) => warn!(%error, %company_id, "failed to reload the selected company"),
        }
    }

    async fn selected_company_id(&self) -> Option<String> {
        self.selected
            .lock()
            .await
            .as_ref()
            .map(|company| company.id.clone())
    }

    async fn require_selected(&self) -> WorkbenchResult<String> {
        self.selected_company_id()
            .await
            .ok_or(WorkbenchError::NoCompanySelected)
    }
}
