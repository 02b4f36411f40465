use crate::{
    AnalysisKind, AnalysisResult, DynamicRiskAnalysis, DynamicRiskResult, GeneralResult,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

const ENVELOPE_FIELD: &str = "result";
const SCENARIO_FIELD: &str = "risk_analysis";

/// Extract the canonical payload from a raw analysis response.
///
/// General analyses are returned as is. Dynamic-risk analyses are expected in
/// a `{ "result": payload }` envelope; a response without that field, or
/// whose `result` is empty (`null`, `""`, `false` or `0`), is returned
/// unchanged rather than rejected.
#[must_use]
pub fn unwrap_envelope(kind: AnalysisKind, raw: Value) -> Value {
    match (kind, raw) {
        (AnalysisKind::DynamicRisk, Value::Object(mut object))
            if object.get(ENVELOPE_FIELD).is_some_and(is_present) =>
        {
            object.remove(ENVELOPE_FIELD).unwrap_or(Value::Null)
        }
        (_, raw) => raw,
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|number| number != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

impl AnalysisResult {
    /// Normalize a raw analysis response produced by a request of `kind`.
    /// Never fails: payloads that match no known shape come back as
    /// [`AnalysisResult::Unrecognized`] with the payload untouched.
    #[must_use]
    pub fn from_response(kind: AnalysisKind, raw: Value) -> Self {
        let payload = unwrap_envelope(kind, raw);
        match kind {
            AnalysisKind::General => classify_general(payload),
            AnalysisKind::DynamicRisk => classify_dynamic_risk(payload),
        }
    }

    /// The payload exactly as received (after unwrapping), for raw display.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::General { raw, .. }
            | Self::DynamicRisk(DynamicRiskResult::Structured { raw, .. })
            | Self::Unrecognized(_, raw) => raw.clone(),
            Self::DynamicRisk(DynamicRiskResult::Text(text)) => Value::String(text.clone()),
        }
    }
}

fn classify_general(payload: Value) -> AnalysisResult {
    if !payload.is_object() {
        return unrecognized(AnalysisKind::General, payload, "payload is not an object");
    }
    match GeneralResult::deserialize(&payload) {
        Ok(result) => AnalysisResult::General {
            result: Box::new(result),
            raw: payload,
        },
        Err(error) => unrecognized(AnalysisKind::General, payload, &error.to_string()),
    }
}

fn classify_dynamic_risk(payload: Value) -> AnalysisResult {
    match payload {
        Value::String(text) => AnalysisResult::DynamicRisk(DynamicRiskResult::Text(text)),
        other => classify_scenario(other),
    }
}

fn classify_scenario(payload: Value) -> AnalysisResult {
    if !payload.get(SCENARIO_FIELD).is_some_and(Value::is_object) {
        return unrecognized(
            AnalysisKind::DynamicRisk,
            payload,
            "payload has no risk_analysis object",
        );
    }
    match DynamicRiskAnalysis::deserialize(&payload) {
        Ok(analysis) => AnalysisResult::DynamicRisk(DynamicRiskResult::Structured {
            analysis: Box::new(analysis),
            raw: payload,
        }),
        Err(error) => unrecognized(AnalysisKind::DynamicRisk, payload, &error.to_string()),
    }
}

fn unrecognized(kind: AnalysisKind, payload: Value, reason: &str) -> AnalysisResult {
    warn!(analysis_kind = %kind, reason, "analysis payload kept unstructured");
    AnalysisResult::Unrecognized(kind, payload)
}
