//! Core validation and export logic shared by the CLI and library users.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::ErcOptions;
use crate::design::DesignDocument;
use crate::erc::ErcEngine;
use crate::error::{ErcError, ErcFailure};
use crate::export::{self, ExportReport};
use crate::hierarchy::HierarchicalSchematic;

#[derive(Debug, thiserror::Error)]
pub enum SchemGuardError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Erc(#[from] ErcError),
    #[error("ERC failed:\n{0}")]
    ErcFailed(#[from] ErcFailure),
    #[error("Config error: {0}")]
    Config(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub rule_id: String,
    pub code: String,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
}

impl Issue {
    pub fn from_error(rule_id: &str, error: &ErcError) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            rule_id: rule_id.to_string(),
            code: error.code().to_string(),
            severity: Severity::Error,
            message: error.to_string(),
            sheet: error.sheet().map(str::to_string),
        }
    }
}

/// Per-design validation result with issues and counts.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub file: PathBuf,
    pub title: String,
    pub issues: Vec<Issue>,
    pub stats: ValidationStats,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationStats {
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
}

impl ValidationResult {
    /// ERC passed: warnings and info do not count.
    pub fn passed(&self) -> bool {
        self.stats.errors == 0
    }

    pub fn total_issues(&self) -> usize {
        self.stats.errors + self.stats.warnings + self.stats.info
    }
}

fn issues_to_stats(issues: &[Issue]) -> ValidationStats {
    let mut stats = ValidationStats::default();
    for issue in issues {
        match issue.severity {
            Severity::Error => stats.errors += 1,
            Severity::Warning => stats.warnings += 1,
            Severity::Info => stats.info += 1,
        }
    }
    stats
}

/// Core API used by the CLI.
pub struct SchemGuardCore;

impl SchemGuardCore {
    /// Default rules narrowed to `options.rules`.
    pub fn engine(options: &ErcOptions) -> ErcEngine {
        let mut engine = ErcEngine::with_default_rules(options.config.clone());
        engine.retain_rules(&options.rules);
        engine
    }

    /// Load a design document and build its graph, merging the configured power
    /// rails into the graph's own policy.
    pub fn load_design(path: &Path, options: &ErcOptions) -> Result<HierarchicalSchematic, SchemGuardError> {
        let document = DesignDocument::load(path)?;
        let mut graph = document.into_graph()?;
        graph.policy = graph.policy.with_rails(&options.config.power_rails);
        tracing::info!(
            "Loaded design '{}' from {}: {} sheets, {} connections",
            graph.title,
            path.display(),
            graph.sheet_count(),
            graph.connections().len()
        );
        Ok(graph)
    }

    /// Run the enabled rules over a graph. Violations become `Error` issues;
    /// floating ports become `Warning` issues when the hierarchy rule is enabled.
    pub fn check_graph(graph: &HierarchicalSchematic, options: &ErcOptions) -> Vec<Issue> {
        let engine = Self::engine(options);
        let mut issues = Vec::new();
        for failure in engine.check(graph) {
            for error in &failure.errors {
                tracing::debug!(rule = %failure.rule_id, code = error.code(), "{}", error);
                issues.push(Issue::from_error(&failure.rule_id, error));
            }
        }

        if !engine.rules().any(|r| r.id() == "hierarchy") {
            return issues;
        }
        for port in graph.floating_ports() {
            issues.push(Issue {
                id: uuid::Uuid::new_v4().to_string(),
                rule_id: "hierarchy".to_string(),
                code: "floating_port".to_string(),
                severity: Severity::Warning,
                message: format!(
                    "Port '{}' ({}) on sheet '{}' is not connected",
                    port.name, port.direction, port.sheet
                ),
                sheet: Some(port.sheet.clone()),
            });
        }
        issues
    }

    /// Validate a single design document.
    pub fn check_design(path: &Path, options: &ErcOptions) -> Result<ValidationResult, SchemGuardError> {
        let graph = Self::load_design(path, options)?;
        let issues = Self::check_graph(&graph, options);
        let stats = issues_to_stats(&issues);
        if stats.errors > 0 {
            tracing::warn!("ERC found {} violation(s) in '{}'", stats.errors, graph.title);
        }
        Ok(ValidationResult {
            file: path.to_path_buf(),
            title: graph.title.clone(),
            issues,
            stats,
        })
    }

    /// Load a design and write its artifacts. With `require_erc`, every enabled
    /// rule must pass first; otherwise only the structural check gates the export.
    pub fn export_design(
        path: &Path,
        out_dir: &Path,
        options: &ErcOptions,
        require_erc: bool,
    ) -> Result<ExportReport, SchemGuardError> {
        let graph = Self::load_design(path, options)?;
        let engine = Self::engine(options);
        if require_erc {
            engine.run(&graph)?;
        }
        export::write_hierarchy_with(&graph, out_dir, &engine)
    }
}
