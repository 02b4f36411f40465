use std::fmt;

/// Display bucket for a free-text severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeverityTier {
    High,
    Medium,
    Low,
    Unknown,
}

/// Display bucket for a free-text risk type or risk-analysis category key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskCategory {
    Operational,
    Financial,
    Reputational,
    Legal,
    Regulatory,
    Unknown,
}

/// Classify a severity string. Matching is case-insensitive and ignores
/// surrounding whitespace; anything unrecognized, including an absent value,
/// is [`SeverityTier::Unknown`].
#[must_use]
pub fn severity_tier(severity: Option<&str>) -> SeverityTier {
    let Some(severity) = severity else {
        return SeverityTier::Unknown;
    };
    match severity.trim().to_lowercase().as_str() {
        "high" | "critical" => SeverityTier::High,
        "medium" | "moderate" => SeverityTier::Medium,
        "low" => SeverityTier::Low,
        _ => SeverityTier::Unknown,
    }
}

/// Classify a risk type. Both the canonical names and the category keys the
/// backend uses in general analyses (`financial_exposure`,
/// `legal_liabilities`, ...) are recognized.
#[must_use]
pub fn risk_category(risk_type: Option<&str>) -> RiskCategory {
    let Some(risk_type) = risk_type else {
        return RiskCategory::Unknown;
    };
    match risk_type.trim().to_lowercase().as_str() {
        "operational" | "operational_risks" => RiskCategory::Operational,
        "financial" | "financial_exposure" => RiskCategory::Financial,
        "reputational" | "reputation_management" => RiskCategory::Reputational,
        "legal" | "legal_liabilities" => RiskCategory::Legal,
        "regulatory" | "regulatory_compliance" => RiskCategory::Regulatory,
        _ => RiskCategory::Unknown,
    }
}

impl SeverityTier {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl RiskCategory {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Operational => "Operational",
            Self::Financial => "Financial",
            Self::Reputational => "Reputational",
            Self::Legal => "Legal",
            Self::Regulatory => "Regulatory",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
