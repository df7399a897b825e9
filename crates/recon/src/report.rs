//! Reconciliation report — the diagnostic side output.
//!
//! Always produced, never blocks the pipeline. Downstream consumers use it
//! for operator-facing diagnostics only; it carries no control-flow weight.

use serde::Serialize;

use crate::matcher::MatchVia;

/// Which dictionary a label matched in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldScope {
    Declaration,
    Goods,
}

impl FieldScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Declaration => "declaration",
            Self::Goods => "goods",
        }
    }
}

/// One raw label that resolved to a canonical field.
#[derive(Debug, Clone, Serialize)]
pub struct MatchedLabel {
    pub label: String,
    pub scope: FieldScope,
    pub field: &'static str,
    pub via: MatchVia,
}

/// A matched value that could not be converted to its declared type.
/// Non-fatal: the record keeps the raw string form.
#[derive(Debug, Clone, Serialize)]
pub struct CoercionWarning {
    pub scope: FieldScope,
    pub field: &'static str,
    pub detail: String,
}

/// Per-run match diagnostics: every raw label and whether/where it landed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconReport {
    pub matched: Vec<MatchedLabel>,
    pub unmatched: Vec<String>,
    pub warnings: Vec<CoercionWarning>,
    /// Free-form adapter/service notes (parse fallbacks, extraction
    /// failures). Informational only.
    pub notes: Vec<String>,
}

impl ReconReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_match(
        &mut self,
        label: &str,
        scope: FieldScope,
        field: &'static str,
        via: MatchVia,
    ) {
        self.matched.push(MatchedLabel {
            label: label.to_string(),
            scope,
            field,
            via,
        });
    }

    pub fn record_warning(&mut self, scope: FieldScope, field: &'static str, detail: String) {
        self.warnings.push(CoercionWarning { scope, field, detail });
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            recognized: self.matched.len(),
            unrecognized: self.unmatched.len(),
            warnings: self.warnings.len(),
        }
    }
}

/// The "N fields recognized, M unrecognized" counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub recognized: usize,
    pub unrecognized: usize,
    pub warnings: usize,
}

impl std::fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} fields recognized, {} unrecognized",
            self.recognized, self.unrecognized
        )?;
        if self.warnings > 0 {
            write!(f, ", {} coercion warnings", self.warnings)?;
        }
        Ok(())
    }
}
