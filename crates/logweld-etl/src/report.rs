//! Validation report generation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::validate::ValidationResult;

#[derive(Debug, Error)]
pub enum ReportError {
    /// `generate_report` was called before any validation ran.
    #[error("no validation results available")]
    NoResults,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationSummary {
    pub total_validations: usize,
    pub passed_validations: usize,
    pub failed_validations: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub validation_summary: ValidationSummary,
    pub detailed_results: Vec<ValidationResult>,
    pub recommendations: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// Summarizes the validator's accumulated history.
///
/// # Errors
///
/// Returns [`ReportError::NoResults`] when the history is empty — an
/// explicit marker rather than an empty report.
pub fn generate_report(history: &[ValidationResult]) -> Result<ValidationReport, ReportError> {
    if history.is_empty() {
        return Err(ReportError::NoResults);
    }

    let total_errors: usize = history.iter().map(|r| r.errors.len()).sum();
    let total_warnings: usize = history.iter().map(|r| r.warnings.len()).sum();
    let passed_validations = history.iter().filter(|r| r.passed).count();

    let summary = ValidationSummary {
        total_validations: history.len(),
        passed_validations,
        failed_validations: history.len() - passed_validations,
        total_errors,
        total_warnings,
    };

    Ok(ValidationReport {
        validation_summary: summary,
        detailed_results: history.to_vec(),
        recommendations: recommendations(history, total_errors, total_warnings),
        generated_at: Utc::now(),
    })
}

fn recommendations(
    history: &[ValidationResult],
    total_errors: usize,
    total_warnings: usize,
) -> Vec<String> {
    let mut out = Vec::new();
    if total_errors > 0 {
        out.push("Fix critical errors before proceeding with data processing".to_owned());
    }
    if total_warnings > 0 {
        out.push("Review warnings and consider data quality improvements".to_owned());
    }
    for result in history {
        if !result.errors.is_empty() {
            out.push(format!(
                "Address {} errors in {}",
                result.errors.len(),
                result.data_type
            ));
        }
    }
    if out.is_empty() {
        out.push("Data quality looks good, proceed with processing".to_owned());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use logweld_core::Dataset;

    fn result(dataset: Dataset, errors: usize, warnings: usize) -> ValidationResult {
        ValidationResult {
            data_type: dataset,
            total_records: 10,
            validated_at: Utc::now(),
            errors: (0..errors).map(|i| format!("error {i}")).collect(),
            warnings: (0..warnings).map(|i| format!("warning {i}")).collect(),
            passed: errors == 0,
        }
    }

    #[test]
    fn empty_history_is_an_error_marker() {
        assert!(matches!(generate_report(&[]), Err(ReportError::NoResults)));
    }

    #[test]
    fn summary_counts_add_up() {
        let history = vec![
            result(Dataset::UserActivities, 0, 2),
            result(Dataset::ApiLogs, 3, 1),
        ];
        let report = generate_report(&history).unwrap();
        let summary = &report.validation_summary;
        assert_eq!(summary.total_validations, 2);
        assert_eq!(summary.passed_validations, 1);
        assert_eq!(summary.failed_validations, 1);
        assert_eq!(summary.total_errors, 3);
        assert_eq!(summary.total_warnings, 3);
        assert_eq!(report.detailed_results.len(), 2);
    }

    #[test]
    fn error_datasets_get_their_own_recommendation() {
        let history = vec![
            result(Dataset::UserActivities, 0, 0),
            result(Dataset::ApiLogs, 2, 0),
        ];
        let report = generate_report(&history).unwrap();
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.contains("2 errors") && r.contains("api_logs")));
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.contains("Fix critical errors")));
    }

    #[test]
    fn warnings_only_suggest_review() {
        let history = vec![result(Dataset::UserActivities, 0, 1)];
        let report = generate_report(&history).unwrap();
        assert_eq!(
            report.recommendations,
            vec!["Review warnings and consider data quality improvements".to_owned()]
        );
    }

    #[test]
    fn clean_history_gets_the_all_clear() {
        let history = vec![result(Dataset::UserActivities, 0, 0)];
        let report = generate_report(&history).unwrap();
        assert_eq!(
            report.recommendations,
            vec!["Data quality looks good, proceed with processing".to_owned()]
        );
    }
}
