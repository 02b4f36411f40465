use crate::{
    AnalysisKind, AnalysisRequest, AnalysisResult, DynamicRiskAnalysis, DynamicRiskRequest,
    DynamicRiskResult, GeneralResult, ListAnalysesQuery, RiskApiError, RiskApiResult, RiskType,
};
use std::{fmt, str::FromStr};

impl RiskType {
    pub const ALL: [Self; 5] = [
        Self::Regulatory,
        Self::Operational,
        Self::Financial,
        Self::Reputational,
        Self::Legal,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Regulatory => "regulatory",
            Self::Operational => "operational",
            Self::Financial => "financial",
            Self::Reputational => "reputational",
            Self::Legal => "legal",
        }
    }
}

impl fmt::Display for RiskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskType {
    type Err = RiskApiError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|risk_type| risk_type.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| RiskApiError::InvalidInput(format!("Unknown risk type: {value}")))
    }
}

impl AnalysisKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::DynamicRisk => "dynamic_risk",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DynamicRiskRequest {
    pub fn new(description: impl Into<String>, risk_type: RiskType) -> Self {
        Self {
            description: description.into(),
            context: String::new(),
            risk_type,
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }
}

impl AnalysisRequest {
    pub fn dynamic_risk(description: impl Into<String>, risk_type: RiskType) -> Self {
        Self::DynamicRisk(DynamicRiskRequest::new(description, risk_type))
    }

    #[must_use]
    pub fn kind(&self) -> AnalysisKind {
        match self {
            Self::General => AnalysisKind::General,
            Self::DynamicRisk(_) => AnalysisKind::DynamicRisk,
        }
    }

    /// Reject requests the backend would refuse anyway, before anything is
    /// sent.
    pub fn validate(&self) -> RiskApiResult<()> {
        match self {
            Self::General => Ok(()),
            Self::DynamicRisk(request) if request.description.trim().is_empty() => Err(
                RiskApiError::InvalidInput("Risk description required".to_string()),
            ),
            Self::DynamicRisk(_) => Ok(()),
        }
    }
}

impl From<DynamicRiskRequest> for AnalysisRequest {
    fn from(request: DynamicRiskRequest) -> Self {
        Self::DynamicRisk(request)
    }
}

impl ListAnalysesQuery {
    #[must_use]
    pub fn with_analysis_type(mut self, analysis_type: AnalysisKind) -> Self {
        self.analysis_type = Some(analysis_type);
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

fn bounded_confidence(value: Option<f64>) -> Option<f64> {
    value.filter(|confidence| (0.0..=1.0).contains(confidence))
}

impl GeneralResult {
    /// The model confidence, if present and within `[0, 1]`.
    #[must_use]
    pub fn confidence(&self) -> Option<f64> {
        bounded_confidence(self.ai_confidence)
    }
}

impl DynamicRiskAnalysis {
    /// The model confidence, if present and within `[0, 1]`.
    #[must_use]
    pub fn confidence(&self) -> Option<f64> {
        bounded_confidence(self.ai_confidence)
    }
}

impl AnalysisResult {
    #[must_use]
    pub fn kind(&self) -> AnalysisKind {
        match self {
            Self::General { .. } => AnalysisKind::General,
            Self::DynamicRisk(_) => AnalysisKind::DynamicRisk,
            Self::Unrecognized(kind, _) => *kind,
        }
    }

    #[must_use]
    pub fn confidence(&self) -> Option<f64> {
        match self {
            Self::General { result, .. } => result.confidence(),
            Self::DynamicRisk(DynamicRiskResult::Structured { analysis, .. }) => {
                analysis.confidence()
            }
            Self::DynamicRisk(DynamicRiskResult::Text(_)) | Self::Unrecognized(..) => None,
        }
    }

    #[must_use]
    pub fn recommendations(&self) -> &[String] {
        match self {
            Self::General { result, .. } => result.recommendations.as_deref().unwrap_or_default(),
            Self::DynamicRisk(DynamicRiskResult::Structured { analysis, .. }) => {
                analysis.recommendations.as_deref().unwrap_or_default()
            }
            Self::DynamicRisk(DynamicRiskResult::Text(_)) | Self::Unrecognized(..) => &[],
        }
    }

    #[must_use]
    pub fn next_steps(&self) -> &[String] {
        match self {
            Self::General { result, .. } => result.next_steps.as_deref().unwrap_or_default(),
            Self::DynamicRisk(DynamicRiskResult::Structured { analysis, .. }) => {
                analysis.next_steps.as_deref().unwrap_or_default()
            }
            Self::DynamicRisk(DynamicRiskResult::Text(_)) | Self::Unrecognized(..) => &[],
        }
    }

    /// The analysis identifier, which only general results carry.
    #[must_use]
    pub fn analysis_id(&self) -> Option<&str> {
        match self {
            Self::General { result, .. } => result.analysis_id.as_deref(),
            Self::DynamicRisk(_) | Self::Unrecognized(..) => None,
        }
    }
}
