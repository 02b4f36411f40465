//! Plain-text rendering of analysis results.

use risk_sdk::{
    risk_category, severity_tier, AnalysisResult, CategoryAssessment, DynamicRiskAnalysis,
    DynamicRiskResult, GeneralResult, NewsTrigger, RiskCategory, RiskFactor, SeverityTier,
};
use serde_json::Value;
use std::fmt;

/// Colour affordance for a severity tier or risk category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    Red,
    Yellow,
    Green,
    Blue,
    Purple,
    Orange,
    Indigo,
    Gray,
}

impl Tone {
    #[must_use]
    pub fn for_severity(tier: SeverityTier) -> Self {
        match tier {
            SeverityTier::High => Self::Red,
            SeverityTier::Medium => Self::Yellow,
            SeverityTier::Low => Self::Green,
            SeverityTier::Unknown => Self::Gray,
        }
    }

    #[must_use]
    pub fn for_category(category: RiskCategory) -> Self {
        match category {
            RiskCategory::Operational => Self::Blue,
            RiskCategory::Financial => Self::Purple,
            RiskCategory::Reputational => Self::Orange,
            RiskCategory::Legal => Self::Red,
            RiskCategory::Regulatory => Self::Indigo,
            RiskCategory::Unknown => Self::Gray,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Purple => "purple",
            Self::Orange => "orange",
            Self::Indigo => "indigo",
            Self::Gray => "gray",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A confidence in `[0, 1]` as a percentage with one decimal, e.g. `82.0%`.
#[must_use]
pub fn format_confidence(confidence: f64) -> String {
    format!("{:.1}%", confidence * 100.0)
}

/// Risk factor counts per severity tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RiskTally {
    /// High and critical.
    pub high: usize,
    /// Medium and moderate.
    pub medium: usize,
    pub low: usize,
    /// All factors, including those with an unrecognized severity.
    pub total: usize,
}

impl RiskTally {
    #[must_use]
    pub fn from_factors(factors: &[RiskFactor]) -> Self {
        factors.iter().fold(
            Self {
                total: factors.len(),
                ..Self::default()
            },
            |mut tally, factor| {
                match severity_tier(Some(&factor.severity)) {
                    SeverityTier::High => tally.high += 1,
                    SeverityTier::Medium => tally.medium += 1,
                    SeverityTier::Low => tally.low += 1,
                    SeverityTier::Unknown => {}
                }
                tally
            },
        )
    }
}

impl fmt::Display for RiskTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "High/Critical: {} | Medium: {} | Low: {} | Total: {}",
            self.high, self.medium, self.low, self.total
        )
    }
}

/// Render any analysis result as plain text. Payloads that matched no known
/// shape are shown as pretty-printed JSON.
#[must_use]
pub fn render(result: &AnalysisResult) -> String {
    let mut report = Report::default();
    match result {
        AnalysisResult::General { result, .. } => render_general(&mut report, result),
        AnalysisResult::DynamicRisk(DynamicRiskResult::Text(text)) => {
            report.line("Analysis");
            report.line(text);
        }
        AnalysisResult::DynamicRisk(DynamicRiskResult::Structured { analysis, .. }) => {
            render_scenario(&mut report, analysis);
        }
        AnalysisResult::Unrecognized(kind, raw) => {
            report.line(format!("Unrecognized {kind} result"));
            report.line(pretty_json(raw));
        }
    }
    report.finish()
}

fn render_general(report: &mut Report, result: &GeneralResult) {
    if let Some(analysis_id) = &result.analysis_id {
        report.line(format!("Analysis ID: {analysis_id}"));
    }

    if let Some(overall) = &result.overall_risk_assessment {
        report.section(format!("{} Overall Risk", overall.overall_risk_level));
        if !overall.summary.is_empty() {
            report.line(&overall.summary);
        }
        if !overall.critical_issues.is_empty() {
            report.line("Critical issues:");
            report.bullets(&overall.critical_issues);
        }
    }

    if let Some(factors) = &result.risk_factors {
        report.section(format!("Risk Factors ({})", factors.len()));
        for (index, factor) in factors.iter().enumerate() {
            render_factor(report, index + 1, factor);
        }
        if !factors.is_empty() {
            report.line(RiskTally::from_factors(factors).to_string());
        }
    }

    if let Some(categories) = &result.risk_analysis {
        report.section("Risk Categories");
        for (key, assessment) in categories {
            render_category(report, key, assessment);
        }
    }

    if let Some(news) = &result.news_analysis {
        report.section("News Analysis");
        report.line(pretty_json(news));
    }

    render_follow_up(
        report,
        result.recommendations.as_deref(),
        result.next_steps.as_deref(),
    );
    render_confidence(report, result.confidence());
}

fn render_factor(report: &mut Report, number: usize, factor: &RiskFactor) {
    report.line(format!(
        "{number}. [{}] {} ({})",
        factor.severity,
        factor.specific_event,
        category_label(&factor.risk_type)
    ));
    report.field("Affected contracts", &factor.affected_contracts);
    report.field("Affected clauses", &factor.affected_clauses);
    report.field("Solutions in contract", &factor.narrative.solutions_in_contract);
    report.field(
        "Alternative mitigation",
        &factor.narrative.alternative_mitigation_strategies,
    );
    report.field("Monitoring tasks", &factor.narrative.monitoring_tasks);
}

fn render_category(report: &mut Report, key: &str, assessment: &CategoryAssessment) {
    report.line(format!(
        "{} [{} Risk]",
        key.replace('_', " ").to_uppercase(),
        assessment.risk_level
    ));
    report.field("Assessment", &assessment.assessment);
    if !assessment.key_concerns.is_empty() {
        report.line("   Key concerns:");
        for concern in &assessment.key_concerns {
            report.line(format!("   - {concern}"));
        }
    }
    render_news(report, &assessment.news_triggers);
}

fn render_scenario(report: &mut Report, analysis: &DynamicRiskAnalysis) {
    let scenario = &analysis.risk_analysis;
    report.section("Risk Analysis");
    report.field("Scenario", &scenario.scenario);
    report.field("Risk level", &scenario.risk_level);
    report.field("Impact assessment", &scenario.impact_assessment);
    if let Some(legal) = &scenario.legal_implications {
        report.field("Legal implications", legal);
    }
    if let Some(regulatory) = &scenario.regulatory_considerations {
        report.field("Regulatory considerations", regulatory);
    }
    if !scenario.affected_areas.is_empty() {
        report.line("   Affected areas:");
        for area in &scenario.affected_areas {
            report.line(format!("   - {area}"));
        }
    }
    render_news(report, &scenario.news_triggers);

    render_follow_up(
        report,
        analysis.recommendations.as_deref(),
        analysis.next_steps.as_deref(),
    );
    render_confidence(report, analysis.confidence());
}

fn render_news(report: &mut Report, triggers: &[NewsTrigger]) {
    if triggers.is_empty() {
        return;
    }
    report.line("   Related news:");
    for trigger in triggers {
        report.line(format!(
            "   - {} ({}, {})",
            trigger.article_title, trigger.article_source, trigger.article_date
        ));
        if !trigger.risk_connection.is_empty() {
            report.line(format!("     {}", trigger.risk_connection));
        }
    }
}

fn render_follow_up(
    report: &mut Report,
    recommendations: Option<&[String]>,
    next_steps: Option<&[String]>,
) {
    if let Some(recommendations) = recommendations.filter(|items| !items.is_empty()) {
        report.section("Recommendations");
        report.bullets(recommendations);
    }
    if let Some(next_steps) = next_steps.filter(|items| !items.is_empty()) {
        report.section("Next Steps");
        for (index, step) in next_steps.iter().enumerate() {
            report.line(format!("{}. {step}", index + 1));
        }
    }
}

fn render_confidence(report: &mut Report, confidence: Option<f64>) {
    if let Some(confidence) = confidence {
        report.section(format!("AI Confidence: {}", format_confidence(confidence)));
    }
}

fn category_label(risk_type: &str) -> String {
    match risk_category(Some(risk_type)) {
        RiskCategory::Unknown if risk_type.is_empty() => RiskCategory::Unknown.to_string(),
        RiskCategory::Unknown => risk_type.to_string(),
        category => category.to_string(),
    }
}

fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[derive(Default)]
struct Report {
    lines: Vec<String>,
}

impl Report {
    fn line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// A heading, separated from what precedes it by a blank line.
    fn section(&mut self, title: impl Into<String>) {
        if !self.lines.is_empty() {
            self.lines.push(String::new());
        }
        self.lines.push(title.into());
    }

    fn field(&mut self, label: &str, value: &str) {
        if !value.is_empty() {
            self.lines.push(format!("   {label}: {value}"));
        }
    }

    fn bullets(&mut self, items: &[String]) {
        self.lines.extend(items.iter().map(|item| format!("- {item}")));
    }

    fn finish(self) -> String {
        self.lines.join("\n")
    }
}
