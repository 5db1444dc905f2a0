// ============================================================================
// Assessly Core - Report Entity
// File: crates/assessly-core/src/domain/report.rs
// Description: Report definition and generation lifecycle
// ============================================================================

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    AssessmentSummary,
    UserActivity,
    MetricTrends,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::AssessmentSummary => "assessment_summary",
            ReportType::UserActivity => "user_activity",
            ReportType::MetricTrends => "metric_trends",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "assessment_summary" => Some(ReportType::AssessmentSummary),
            "user_activity" => Some(ReportType::UserActivity),
            "metric_trends" => Some(ReportType::MetricTrends),
            _ => None,
        }
    }

    /// Parameter keys each report type understands.
    pub fn allowed_parameters(&self) -> &'static [&'static str] {
        match self {
            ReportType::AssessmentSummary => &["category"],
            ReportType::UserActivity => &["days"],
            ReportType::MetricTrends => &["metric_types", "days"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Generating,
    Completed,
    Failed,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Generating => "generating",
            ReportStatus::Completed => "completed",
            ReportStatus::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ReportStatus::Pending),
            "generating" => Some(ReportStatus::Generating),
            "completed" => Some(ReportStatus::Completed),
            "failed" => Some(ReportStatus::Failed),
            _ => None,
        }
    }
}

impl Default for ReportStatus {
    fn default() -> Self {
        ReportStatus::Pending
    }
}

/// Report entity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Report {
    pub id: Uuid,
    pub organization_id: Uuid,

    #[validate(length(min = 3, max = 200, message = "Report name must be between 3 and 200 characters"))]
    pub name: String,

    pub report_type: ReportType,
    pub parameters: Value,
    pub status: ReportStatus,
    pub result: Option<Value>,
    pub error_message: Option<String>,
    pub generated_at: Option<DateTime<Utc>>,

    // Audit fields
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewReport {
    pub name: String,
    pub report_type: ReportType,
    pub parameters: Option<Value>,
}

#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub report_type: Option<ReportType>,
    pub status: Option<ReportStatus>,
}

impl Report {
    pub fn new(organization_id: Uuid, created_by: Uuid, input: NewReport) -> Result<Self, DomainError> {
        let parameters = match input.parameters {
            None | Some(Value::Null) => Value::Object(Default::default()),
            Some(v @ Value::Object(_)) => v,
            Some(_) => {
                return Err(DomainError::ValidationError(
                    "Report parameters must be a JSON object".into(),
                ))
            }
        };
        let now = Utc::now();
        let report = Self {
            id: Uuid::new_v4(),
            organization_id,
            name: input.name.trim().to_string(),
            report_type: input.report_type,
            parameters,
            status: ReportStatus::Pending,
            result: None,
            error_message: None,
            generated_at: None,
            created_by,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        report.validate()?;
        report.validate_parameters()?;
        Ok(report)
    }

    /// Reject keys the report type does not know and values of the wrong shape.
    pub fn validate_parameters(&self) -> Result<(), DomainError> {
        let allowed = self.report_type.allowed_parameters();
        if let Some(map) = self.parameters.as_object() {
            if let Some(unknown) = map.keys().find(|key| !allowed.contains(&key.as_str())) {
                return Err(DomainError::ValidationError(format!(
                    "Unknown parameter '{}' for {} reports (allowed: {})",
                    unknown,
                    self.report_type.as_str(),
                    allowed.join(", ")
                )));
            }
        }

        match self.report_type {
            ReportType::AssessmentSummary => {
                self.param_str("category")?;
            }
            ReportType::UserActivity => {
                self.param_days("days")?;
            }
            ReportType::MetricTrends => {
                if self.param_str_list("metric_types")?.unwrap_or_default().is_empty() {
                    return Err(DomainError::ValidationError(
                        "Report parameter 'metric_types' is required".into(),
                    ));
                }
                self.param_days("days")?;
            }
        }
        Ok(())
    }

    /// A `generating` report older than `stale_after` is treated as abandoned.
    pub fn generation_in_progress(&self, now: DateTime<Utc>, stale_after: Duration) -> bool {
        self.status == ReportStatus::Generating && self.updated_at > now - stale_after
    }

    pub fn complete(&mut self, result: Value) {
        let now = Utc::now();
        self.status = ReportStatus::Completed;
        self.result = Some(result);
        self.error_message = None;
        self.generated_at = Some(now);
        self.updated_at = now;
    }

    pub fn fail(&mut self, message: String) {
        self.status = ReportStatus::Failed;
        self.error_message = Some(message);
        self.updated_at = Utc::now();
    }

    /// Optional string parameter; present but non-string is a validation error.
    pub fn param_str(&self, key: &str) -> Result<Option<String>, DomainError> {
        match self.parameters.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(DomainError::ValidationError(format!(
                "Report parameter '{}' must be a string",
                key
            ))),
        }
    }

    /// Optional positive integer parameter.
    pub fn param_days(&self, key: &str) -> Result<Option<i64>, DomainError> {
        match self.parameters.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => match v.as_i64() {
                Some(days) if (1..=366).contains(&days) => Ok(Some(days)),
                _ => Err(DomainError::ValidationError(format!(
                    "Report parameter '{}' must be an integer between 1 and 366",
                    key
                ))),
            },
        }
    }

    /// Optional list of strings parameter.
    pub fn param_str_list(&self, key: &str) -> Result<Option<Vec<String>>, DomainError> {
        match self.parameters.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        DomainError::ValidationError(format!(
                            "Report parameter '{}' must be a list of strings",
                            key
                        ))
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            Some(_) => Err(DomainError::ValidationError(format!(
                "Report parameter '{}' must be a list of strings",
                key
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report(parameters: Value) -> Report {
        Report::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            NewReport {
                name: "Monthly summary".into(),
                report_type: ReportType::AssessmentSummary,
                parameters: Some(parameters),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_new_report_is_pending() {
        let r = report(json!({}));
        assert_eq!(r.status, ReportStatus::Pending);
        assert!(r.result.is_none());
    }

    #[test]
    fn test_parameters_must_be_object() {
        let result = Report::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            NewReport {
                name: "Monthly summary".into(),
                report_type: ReportType::UserActivity,
                parameters: Some(json!("days=30")),
            },
        );
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }

    #[test]
    fn test_complete_and_fail() {
        let mut r = report(json!({}));
        r.fail("boom".into());
        assert_eq!(r.status, ReportStatus::Failed);
        r.complete(json!({"total": 3}));
        assert_eq!(r.status, ReportStatus::Completed);
        assert!(r.error_message.is_none());
        assert!(r.generated_at.is_some());
    }

    fn new_report(report_type: ReportType, parameters: Value) -> Result<Report, DomainError> {
        Report::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            NewReport {
                name: "Monthly summary".into(),
                report_type,
                parameters: Some(parameters),
            },
        )
    }

    #[test]
    fn test_unknown_parameters_are_rejected() {
        let result = new_report(ReportType::UserActivity, json!({"dayz": 7}));
        match result {
            Err(DomainError::ValidationError(msg)) => assert!(msg.contains("'dayz'")),
            other => panic!("expected validation error, got {:?}", other),
        }

        // category belongs to assessment summaries only
        assert!(new_report(ReportType::UserActivity, json!({"days": 7, "category": "x"})).is_err());
        assert!(new_report(ReportType::UserActivity, json!({"days": 7})).is_ok());
    }

    #[test]
    fn test_parameter_types_are_checked_at_creation() {
        assert!(new_report(ReportType::AssessmentSummary, json!({"category": 12})).is_err());
        assert!(new_report(ReportType::UserActivity, json!({"days": "seven"})).is_err());
        assert!(new_report(ReportType::UserActivity, json!({"days": 0})).is_err());
        assert!(new_report(ReportType::MetricTrends, json!({"days": 7})).is_err());
        assert!(new_report(ReportType::MetricTrends, json!({"metric_types": []})).is_err());
        assert!(new_report(ReportType::MetricTrends, json!({"metric_types": ["logins"], "days": 7})).is_ok());
    }

    #[test]
    fn test_generation_in_progress_expires() {
        let mut r = report(json!({}));
        let stale_after = Duration::minutes(10);
        assert!(!r.generation_in_progress(Utc::now(), stale_after));

        r.status = ReportStatus::Generating;
        r.updated_at = Utc::now();
        assert!(r.generation_in_progress(Utc::now(), stale_after));

        r.updated_at = Utc::now() - Duration::minutes(11);
        assert!(!r.generation_in_progress(Utc::now(), stale_after));
    }

    #[test]
    fn test_param_accessors() {
        let mut r = report(json!({}));
        r.parameters = json!({"category": "safety", "days": 14, "metric_types": ["a", "b"]});
        assert_eq!(r.param_str("category").unwrap().as_deref(), Some("safety"));
        assert_eq!(r.param_days("days").unwrap(), Some(14));
        assert_eq!(r.param_str_list("metric_types").unwrap().unwrap().len(), 2);
        assert_eq!(r.param_str("missing").unwrap(), None);

        let mut bad = report(json!({}));
        bad.parameters = json!({"category": 5, "days": 0, "metric_types": [1]});
        assert!(bad.param_str("category").is_err());
        assert!(bad.param_days("days").is_err());
        assert!(bad.param_str_list("metric_types").is_err());
    }
}
