//! Report content builders

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use assessly_shared::constants::DEFAULT_ACTIVITY_WINDOW_DAYS;

use crate::domain::{AssessmentStatsFilter, Report, ReportType, TenantScope, UserActivityFilter};
use crate::error::DomainError;
use crate::repositories::{AssessmentRepository, MetricRepository, ProfileRepository};
use crate::services::dashboard_service::{compare_windows, normalize_metric_types};

/// Builds the `result` document of a report.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    async fn generate_report(&self, report: &Report, scope: &TenantScope) -> Result<Value, DomainError>;
}

pub struct DefaultReportGenerator {
    assessments: Arc<dyn AssessmentRepository>,
    profiles: Arc<dyn ProfileRepository>,
    metrics: Arc<dyn MetricRepository>,
}

impl DefaultReportGenerator {
    pub fn new(
        assessments: Arc<dyn AssessmentRepository>,
        profiles: Arc<dyn ProfileRepository>,
        metrics: Arc<dyn MetricRepository>,
    ) -> Self {
        Self {
            assessments,
            profiles,
            metrics,
        }
    }

    async fn assessment_summary(&self, report: &Report, scope: &TenantScope) -> Result<Value, DomainError> {
        let category = report.param_str("category")?;
        let filter = AssessmentStatsFilter {
            category: category.clone(),
            now: Utc::now(),
        };
        let stats = self.assessments.stats(&scope.organization_id, &filter).await?;

        let completion_rate = if stats.total > 0 {
            Some(stats.completed as f64 / stats.total as f64 * 100.0)
        } else {
            None
        };

        Ok(json!({
            "category": category,
            "totals": {
                "total": stats.total,
                "draft": stats.draft,
                "active": stats.active,
                "completed": stats.completed,
                "archived": stats.archived,
                "overdue": stats.overdue,
            },
            "scores": {
                "average": stats.average_score,
                "min": stats.min_score,
                "max": stats.max_score,
            },
            "completion_rate": completion_rate,
        }))
    }

    async fn user_activity(&self, report: &Report, scope: &TenantScope) -> Result<Value, DomainError> {
        let days = report
            .param_days("days")?
            .unwrap_or(DEFAULT_ACTIVITY_WINDOW_DAYS);
        let filter = UserActivityFilter {
            seen_since: Utc::now() - Duration::days(days),
        };
        let stats = self
            .profiles
            .activity_stats(&scope.organization_id, &filter)
            .await?;

        Ok(json!({
            "days": days,
            "members": {
                "total": stats.total,
                "active": stats.active,
                "inactive": stats.inactive,
                "seen_recently": stats.seen_recently,
            },
            "by_role": {
                "admin": stats.admins,
                "manager": stats.managers,
                "member": stats.members,
                "viewer": stats.viewers,
            },
        }))
    }

    async fn metric_trends(&self, report: &Report, scope: &TenantScope) -> Result<Value, DomainError> {
        let metric_types = report.param_str_list("metric_types")?.ok_or_else(|| {
            DomainError::ValidationError("Report parameter 'metric_types' is required".into())
        })?;
        let metric_types = normalize_metric_types(&metric_types)?;
        let days = report
            .param_days("days")?
            .unwrap_or(DEFAULT_ACTIVITY_WINDOW_DAYS);

        let to = Utc::now();
        let from = to - Duration::days(days);
        let trends = compare_windows(
            self.metrics.as_ref(),
            &scope.organization_id,
            metric_types,
            from,
            to,
        )
        .await?;

        Ok(json!({
            "days": days,
            "from": from,
            "to": to,
            "trends": trends,
        }))
    }
}

#[async_trait]
impl ReportGenerator for DefaultReportGenerator {
    async fn generate_report(&self, report: &Report, scope: &TenantScope) -> Result<Value, DomainError> {
        // Rows written before parameters were checked at creation
        report.validate_parameters()?;

        let mut body = match report.report_type {
            ReportType::AssessmentSummary => self.assessment_summary(report, scope).await?,
            ReportType::UserActivity => self.user_activity(report, scope).await?,
            ReportType::MetricTrends => self.metric_trends(report, scope).await?,
        };
        if let Value::Object(map) = &mut body {
            map.insert("report_type".into(), json!(report.report_type.as_str()));
            map.insert("generated_at".into(), json!(Utc::now()));
        }
        Ok(body)
    }
}
