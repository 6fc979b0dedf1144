//! Reporting: the processing report describing how sources will be fetched,
//! and the success / error response envelopes returned to callers.

use crate::date::now_rfc3339;
use crate::enhance::{alternatives, enhance_all, summarize};
use crate::issues::ValidationIssue;
use crate::planner::ProcessingStrategy;
use crate::results::ExtractionResults;
use crate::source::Source;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SourceAnalysis {
    pub input: String,
    pub detected_type: &'static str,
    pub normalized: String,
    pub reddit_url: Option<String>,
    pub allocated_items: u32,
    pub estimated_items: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SourceBreakdown {
    pub urls: usize,
    pub search_terms: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StrategySummary {
    /// `mixed` or `uniform`.
    pub mode: &'static str,
    /// Seconds with one decimal, e.g. `"14.5s"`.
    pub estimated_duration: String,
    pub processing_order: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProcessingReport {
    pub total_sources: usize,
    pub source_breakdown: SourceBreakdown,
    pub processing_strategy: StrategySummary,
    pub source_analysis: Vec<SourceAnalysis>,
    pub item_distribution: BTreeMap<String, u32>,
}

impl ProcessingReport {
    /// Pure presentation of classifier and planner output.
    pub fn new(sources: &[Source], strategy: &ProcessingStrategy) -> Self {
        let source_analysis = sources
            .iter()
            .map(|s| SourceAnalysis {
                input: s.original.clone(),
                detected_type: s.kind.as_str(),
                normalized: s.normalized.clone(),
                reddit_url: s.resolved_url.clone(),
                allocated_items: strategy.allocated(&s.original),
                estimated_items: s.estimated_yield,
            })
            .collect();
        let search_terms = sources.iter().filter(|s| s.is_search()).count();
        Self {
            total_sources: sources.len(),
            source_breakdown: SourceBreakdown { urls: sources.len() - search_terms, search_terms },
            processing_strategy: StrategySummary {
                mode: if strategy.is_mixed { "mixed" } else { "uniform" },
                estimated_duration: format!("{:.1}s", strategy.estimated_duration_seconds),
                processing_order: strategy.order.clone(),
            },
            source_analysis,
            item_distribution: strategy.allocation.clone(),
        }
    }
}

fn warning_entries(warnings: &[ValidationIssue]) -> Vec<Value> {
    warnings
        .iter()
        .filter_map(|w| match w {
            ValidationIssue::Warning { code, section, message, suggestion } => Some(json!({
                "code": code,
                "section": section,
                "message": message,
                "suggestion": suggestion,
            })),
            ValidationIssue::Error { .. } => None,
        })
        .collect()
}

/// Envelope for a completed extraction.
pub fn success_response(data: &ExtractionResults, request_params: &impl Serialize, execution_secs: f64, warnings: &[ValidationIssue]) -> Value {
    let total = data.total();
    json!({
        "success": true,
        "data": data,
        "metadata": {
            "totalItems": total,
            "itemsReturned": total,
            "requestParams": request_params,
            "scrapedAt": now_rfc3339(),
            "executionTime": format!("{execution_secs:.2}s"),
        },
        "warnings": warning_entries(warnings),
        "errors": [],
    })
}

/// Envelope for a rejected request. `issues` is the normalizer's failure list
/// (errors then warnings); `raw_request` feeds suggestions and alternatives.
pub fn error_response(issues: &[ValidationIssue], raw_request: Option<&Value>) -> Value {
    let errors = enhance_all(issues, raw_request);
    let warnings = warning_entries(issues);
    let mut response = json!({
        "success": false,
        "data": null,
        "metadata": {
            "validatedAt": now_rfc3339(),
            "errorCount": errors.len(),
            "warningCount": warnings.len(),
        },
        "errors": errors,
        "warnings": warnings,
    });
    if errors.len() > 1 {
        if let Some(summary) = summarize(&errors) {
            response["errorSummary"] = json!(summary);
        }
    }
    if let Some(raw) = raw_request {
        let alts = alternatives(raw);
        if !alts.is_empty() {
            response["alternatives"] = json!(alts);
        }
    }
    response
}
