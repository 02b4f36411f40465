use crate::serde_utils::{
    lenient, lenient_entries, lenient_items, lenient_string, lenient_strings, null_as_default,
    option_lenient_items, option_lenient_string, option_lenient_strings, timestamp,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A company tracked by the backend. The list endpoint may return summaries
/// without `context` or `documents`; both then default to empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub context: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub documents: Vec<Document>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// A document attached to a company. Immutable once the backend has
/// acknowledged the upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub file_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub file_type: String,
    #[serde(with = "timestamp")]
    pub uploaded_at: DateTime<Utc>,
}

/// The category of risk a dynamic analysis is asked to focus on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskType {
    #[default]
    Regulatory,
    Operational,
    Financial,
    Reputational,
    Legal,
}

/// Which analysis mode produced a result. The backend does not tag its
/// responses, so this travels alongside the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    General,
    DynamicRisk,
}

/// A request to analyse a company.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisRequest {
    /// Analyse everything the backend knows about the company.
    General,
    /// Analyse one described risk scenario.
    DynamicRisk(DynamicRiskRequest),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicRiskRequest {
    /// What could happen. Must not be blank.
    pub description: String,
    /// Free-form background for the scenario. May be empty.
    pub context: String,
    pub risk_type: RiskType,
}

/// Optional filters for the analysis history endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListAnalysesQuery {
    pub analysis_type: Option<AnalysisKind>,
    pub limit: Option<u32>,
}

/// Follow-up guidance attached to a risk factor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskNarrative {
    #[serde(default, deserialize_with = "lenient_string")]
    pub solutions_in_contract: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub alternative_mitigation_strategies: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub monitoring_tasks: String,
}

/// One identified risk. `severity` and `risk_type` are open strings; use
/// [`crate::severity_tier`] and [`crate::risk_category`] to classify them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    #[serde(default, deserialize_with = "lenient_string")]
    pub severity: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub specific_event: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub risk_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub affected_contracts: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub affected_clauses: String,
    #[serde(default, deserialize_with = "lenient")]
    pub narrative: RiskNarrative,
}

/// A news article the backend linked to a risk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsTrigger {
    #[serde(default, deserialize_with = "lenient_string")]
    pub article_title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub article_source: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub article_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub risk_connection: String,
}

/// Assessment of one risk category in a general analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryAssessment {
    #[serde(default, deserialize_with = "lenient_string")]
    pub risk_level: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub assessment: String,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub key_concerns: Vec<String>,
    #[serde(default, deserialize_with = "lenient_items")]
    pub news_triggers: Vec<NewsTrigger>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallRiskAssessment {
    #[serde(default, deserialize_with = "lenient_string")]
    pub overall_risk_level: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub summary: String,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub critical_issues: Vec<String>,
}

/// The result of a general analysis. Fields the backend adds beyond these are
/// kept in `extra`. Sections with an unexpected shape are dropped rather than
/// failing the whole result; malformed list elements and category entries
/// are skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneralResult {
    #[serde(
        default,
        deserialize_with = "option_lenient_items",
        skip_serializing_if = "Option::is_none"
    )]
    pub risk_factors: Option<Vec<RiskFactor>>,
    #[serde(
        default,
        deserialize_with = "lenient_entries",
        skip_serializing_if = "Option::is_none"
    )]
    pub risk_analysis: Option<BTreeMap<String, CategoryAssessment>>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub overall_risk_assessment: Option<OverallRiskAssessment>,
    #[serde(
        default,
        deserialize_with = "option_lenient_strings",
        skip_serializing_if = "Option::is_none"
    )]
    pub recommendations: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "option_lenient_strings",
        skip_serializing_if = "Option::is_none"
    )]
    pub next_steps: Option<Vec<String>>,
    /// Expected in `[0, 1]`. Prefer [`GeneralResult::confidence`], which
    /// discards out-of-range values.
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub ai_confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub news_analysis: Option<Value>,
    #[serde(
        default,
        deserialize_with = "option_lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub analysis_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `risk_analysis` object of a structured dynamic-risk result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAssessment {
    #[serde(default, deserialize_with = "lenient_string")]
    pub scenario: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub risk_level: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub impact_assessment: String,
    #[serde(
        default,
        deserialize_with = "option_lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub legal_implications: Option<String>,
    #[serde(
        default,
        deserialize_with = "option_lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub regulatory_considerations: Option<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub affected_areas: Vec<String>,
    #[serde(default, deserialize_with = "lenient_items")]
    pub news_triggers: Vec<NewsTrigger>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A dynamic-risk payload that carries a `risk_analysis` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DynamicRiskAnalysis {
    pub risk_analysis: ScenarioAssessment,
    #[serde(
        default,
        deserialize_with = "option_lenient_strings",
        skip_serializing_if = "Option::is_none"
    )]
    pub recommendations: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "option_lenient_strings",
        skip_serializing_if = "Option::is_none"
    )]
    pub next_steps: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub ai_confidence: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The two shapes a dynamic-risk payload takes once unwrapped.
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicRiskResult {
    Text(String),
    /// `raw` is the unwrapped payload exactly as received.
    Structured {
        analysis: Box<DynamicRiskAnalysis>,
        raw: Value,
    },
}

/// A normalized analysis result, tagged by the request that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisResult {
    /// `raw` is the response exactly as received; the typed view may drop
    /// sections it could not read.
    General {
        result: Box<GeneralResult>,
        raw: Value,
    },
    DynamicRisk(DynamicRiskResult),
    /// The payload matched none of the known shapes. It is kept exactly as
    /// received so it can still be displayed raw.
    Unrecognized(AnalysisKind, Value),
}

/// An entry of the analysis history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub analysis_type: String,
    #[serde(default, with = "timestamp::option")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A stored analysis as returned by the single-analysis endpoint. Everything
/// beyond the identifying fields is kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(
        default,
        deserialize_with = "option_lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub analysis_type: Option<String>,
    #[serde(default, with = "timestamp::option")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
