use risk_sdk::RiskApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkbenchError {
    #[error(transparent)]
    Api(#[from] RiskApiError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Company already exists: {0}")]
    DuplicateCompany(String),
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    #[error("No company selected")]
    NoCompanySelected,
}

pub type WorkbenchResult<T> = Result<T, WorkbenchError>;
