// ============================================================================
// Assessly Core - Dashboard Service
// File: crates/assessly-core/src/services/dashboard_service.rs
// Description: Metric recording, bucketed aggregation and window comparison
// ============================================================================

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;
use uuid::Uuid;

use assessly_shared::constants::{
    DEFAULT_ACTIVITY_WINDOW_DAYS, DEFAULT_METRIC_LIMIT, MAX_AGGREGATION_RANGE_DAYS,
    MAX_CALCULATE_METRIC_TYPES, MAX_METRIC_LIMIT,
};

use crate::domain::dashboard_metric::is_valid_metric_name;
use crate::domain::{
    AggregateRequest, AssessmentStatsFilter, DashboardMetric, DashboardOverview, MetricBucket,
    MetricCalculation, MetricQuery, NewMetric, Role, TenantScope, UserActivityFilter, WindowQuery,
};
use crate::error::DomainError;
use crate::repositories::{AssessmentRepository, MetricRepository, ProfileRepository, ReportRepository};

#[derive(Debug, Clone)]
pub struct CalculateRequest {
    pub metric_types: Vec<String>,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

pub struct DashboardService {
    metrics: Arc<dyn MetricRepository>,
    profiles: Arc<dyn ProfileRepository>,
    assessments: Arc<dyn AssessmentRepository>,
    reports: Arc<dyn ReportRepository>,
}

impl DashboardService {
    pub fn new(
        metrics: Arc<dyn MetricRepository>,
        profiles: Arc<dyn ProfileRepository>,
        assessments: Arc<dyn AssessmentRepository>,
        reports: Arc<dyn ReportRepository>,
    ) -> Self {
        Self {
            metrics,
            profiles,
            assessments,
            reports,
        }
    }

    /// Newest first. A zero limit means the default; larger limits are capped.
    pub async fn list_metrics(
        &self,
        scope: &TenantScope,
        mut query: MetricQuery,
    ) -> Result<Vec<DashboardMetric>, DomainError> {
        if let Some(metric_type) = &query.metric_type {
            check_metric_type(metric_type)?;
        }
        if let (Some(from), Some(to)) = (query.from, query.to) {
            if from >= to {
                return Err(DomainError::ValidationError("'from' must be before 'to'".into()));
            }
        }
        query.limit = match query.limit {
            0 => DEFAULT_METRIC_LIMIT,
            n => n.min(MAX_METRIC_LIMIT),
        };
        self.metrics.list(&scope.organization_id, &query).await
    }

    pub async fn record_metric(
        &self,
        scope: &TenantScope,
        input: NewMetric,
    ) -> Result<DashboardMetric, DomainError> {
        scope.require_role(Role::Member)?;
        let metric = DashboardMetric::new(scope.organization_id, input)?;
        self.metrics.create(&metric).await
    }

    pub async fn aggregate(
        &self,
        scope: &TenantScope,
        request: AggregateRequest,
    ) -> Result<Vec<MetricBucket>, DomainError> {
        check_metric_type(&request.metric_type)?;
        check_range(request.from, request.to)?;

        let buckets = self
            .metrics
            .aggregate(&scope.organization_id, &request)
            .await?;
        debug!(
            "Aggregated {} into {} {} buckets",
            request.metric_type,
            buckets.len(),
            request.interval.as_str()
        );

        Ok(buckets
            .into_iter()
            .map(|b| MetricBucket {
                bucket: b.bucket,
                value: b.select(request.function),
                samples: b.samples,
            })
            .collect())
    }

    /// Compare `[from, to)` with the window of equal length just before it.
    pub async fn calculate(
        &self,
        scope: &TenantScope,
        request: CalculateRequest,
    ) -> Result<Vec<MetricCalculation>, DomainError> {
        let metric_types = normalize_metric_types(&request.metric_types)?;
        check_range(request.from, request.to)?;
        compare_windows(
            self.metrics.as_ref(),
            &scope.organization_id,
            metric_types,
            request.from,
            request.to,
        )
        .await
    }

    pub async fn overview(&self, scope: &TenantScope) -> Result<DashboardOverview, DomainError> {
        let now = Utc::now();
        let activity_filter = UserActivityFilter {
            seen_since: now - Duration::days(DEFAULT_ACTIVITY_WINDOW_DAYS),
        };
        let stats_filter = AssessmentStatsFilter { category: None, now };
        let org = scope.organization_id;

        let (members, assessments, reports) = tokio::try_join!(
            self.profiles.activity_stats(&org, &activity_filter),
            self.assessments.stats(&org, &stats_filter),
            self.reports.count(&org),
        )?;

        Ok(DashboardOverview {
            active_members: members.active,
            total_members: members.total,
            assessments,
            reports,
            generated_at: now,
        })
    }
}

/// Shared by `calculate` and the metric trends report.
pub(crate) async fn compare_windows(
    metrics: &dyn MetricRepository,
    organization_id: &Uuid,
    metric_types: Vec<String>,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<MetricCalculation>, DomainError> {
    let length = to - from;
    let current = WindowQuery {
        metric_types: metric_types.clone(),
        from,
        to,
    };
    let previous = WindowQuery {
        metric_types: metric_types.clone(),
        from: from - length,
        to: from,
    };

    let (current, previous) = tokio::try_join!(
        metrics.window_stats(organization_id, &current),
        metrics.window_stats(organization_id, &previous),
    )?;

    Ok(MetricCalculation::from_windows(&metric_types, current, previous))
}

/// Validate and de-duplicate requested metric types, keeping request order.
pub(crate) fn normalize_metric_types(types: &[String]) -> Result<Vec<String>, DomainError> {
    if types.is_empty() || types.len() > MAX_CALCULATE_METRIC_TYPES {
        return Err(DomainError::ValidationError(format!(
            "Between 1 and {} metric types are required",
            MAX_CALCULATE_METRIC_TYPES
        )));
    }
    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(types.len());
    for metric_type in types {
        check_metric_type(metric_type)?;
        if seen.insert(metric_type.as_str()) {
            normalized.push(metric_type.clone());
        }
    }
    Ok(normalized)
}

pub(crate) fn check_range(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<(), DomainError> {
    if from >= to {
        return Err(DomainError::ValidationError("'from' must be before 'to'".into()));
    }
    if to - from > Duration::days(MAX_AGGREGATION_RANGE_DAYS) {
        return Err(DomainError::ValidationError(format!(
            "Time range cannot exceed {} days",
            MAX_AGGREGATION_RANGE_DAYS
        )));
    }
    Ok(())
}

fn check_metric_type(metric_type: &str) -> Result<(), DomainError> {
    if is_valid_metric_name(metric_type) {
        Ok(())
    } else {
        Err(DomainError::ValidationError(format!(
            "Invalid metric type: {}",
            metric_type
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        AggregateFunction, AggregateInterval, AssessmentStats, BucketStats, UserActivityStats,
        WindowStats,
    };
    use crate::repositories::{
        MockAssessmentRepository, MockMetricRepository, MockProfileRepository, MockReportRepository,
    };

    fn scope(role: Role) -> TenantScope {
        TenantScope::new(Uuid::new_v4(), Uuid::new_v4(), role)
    }

    fn service(metrics: MockMetricRepository) -> DashboardService {
        DashboardService::new(
            Arc::new(metrics),
            Arc::new(MockProfileRepository::new()),
            Arc::new(MockAssessmentRepository::new()),
            Arc::new(MockReportRepository::new()),
        )
    }

    fn window(metric_type: &str, sum: f64) -> WindowStats {
        WindowStats {
            metric_type: metric_type.into(),
            count: 1,
            sum: Some(sum),
            avg: Some(sum),
            min: Some(sum),
            max: Some(sum),
        }
    }

    #[tokio::test]
    async fn test_list_metrics_clamps_limit() {
        let mut repo = MockMetricRepository::new();
        repo.expect_list()
            .withf(|_, q| q.limit == MAX_METRIC_LIMIT)
            .times(1)
            .returning(|_, _| Ok(vec![]));
        repo.expect_list()
            .withf(|_, q| q.limit == DEFAULT_METRIC_LIMIT)
            .times(1)
            .returning(|_, _| Ok(vec![]));

        let svc = service(repo);
        let viewer = scope(Role::Viewer);
        svc.list_metrics(&viewer, MetricQuery { limit: 50_000, ..Default::default() })
            .await
            .unwrap();
        svc.list_metrics(&viewer, MetricQuery::default()).await.unwrap();
    }

    #[tokio::test]
    async fn test_record_metric_requires_member() {
        let mut repo = MockMetricRepository::new();
        repo.expect_create().returning(|m| Ok(m.clone()));
        let svc = service(repo);

        let input = NewMetric {
            metric_type: "completion_rate".into(),
            value: 0.75,
            dimensions: None,
            recorded_at: None,
        };
        assert!(matches!(
            svc.record_metric(&scope(Role::Viewer), input.clone()).await,
            Err(DomainError::InsufficientRole { .. })
        ));
        let metric = svc.record_metric(&scope(Role::Member), input).await.unwrap();
        assert_eq!(metric.metric_type, "completion_rate");
    }

    #[tokio::test]
    async fn test_aggregate_selects_function() {
        let now = Utc::now();
        let mut repo = MockMetricRepository::new();
        repo.expect_aggregate().returning(move |_, _| {
            Ok(vec![BucketStats {
                bucket: now,
                samples: 3,
                sum: 9.0,
                avg: 3.0,
                min: 1.0,
                max: 5.0,
            }])
        });

        let buckets = service(repo)
            .aggregate(
                &scope(Role::Viewer),
                AggregateRequest {
                    metric_type: "score".into(),
                    interval: AggregateInterval::Day,
                    function: AggregateFunction::Max,
                    from: now - Duration::days(7),
                    to: now,
                },
            )
            .await
            .unwrap();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].value, 5.0);
        assert_eq!(buckets[0].samples, 3);
    }

    #[tokio::test]
    async fn test_aggregate_rejects_bad_ranges() {
        let now = Utc::now();
        let mut repo = MockMetricRepository::new();
        repo.expect_aggregate().never();
        let svc = service(repo);

        let request = |from, to| AggregateRequest {
            metric_type: "score".into(),
            interval: AggregateInterval::Hour,
            function: AggregateFunction::Sum,
            from,
            to,
        };
        let viewer = scope(Role::Viewer);
        assert!(svc.aggregate(&viewer, request(now, now)).await.is_err());
        assert!(svc
            .aggregate(&viewer, request(now - Duration::days(400), now))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_calculate_uses_previous_window() {
        let now = Utc::now();
        let from = now - Duration::days(7);

        let mut repo = MockMetricRepository::new();
        repo.expect_window_stats()
            .withf(move |_, q| q.from == from && q.to == now)
            .returning(|_, _| Ok(vec![window("logins", 150.0)]));
        repo.expect_window_stats()
            .withf(move |_, q| q.to == from && q.from == from - Duration::days(7))
            .returning(|_, _| Ok(vec![window("logins", 100.0)]));

        let result = service(repo)
            .calculate(
                &scope(Role::Viewer),
                CalculateRequest {
                    metric_types: vec!["logins".into(), "logins".into()],
                    from,
                    to: now,
                },
            )
            .await
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].change_percent, Some(50.0));
    }

    #[test]
    fn test_normalize_metric_types_bounds() {
        assert!(normalize_metric_types(&[]).is_err());
        let too_many: Vec<String> = (0..21).map(|i| format!("m{}", i)).collect();
        assert!(normalize_metric_types(&too_many).is_err());
        assert!(normalize_metric_types(&["Bad-Name".to_string()]).is_err());
        assert_eq!(
            normalize_metric_types(&["b".into(), "a".into(), "b".into()]).unwrap(),
            vec!["b".to_string(), "a".to_string()]
        );
    }

    #[tokio::test]
    async fn test_overview_combines_sources() {
        let mut profiles = MockProfileRepository::new();
        profiles.expect_activity_stats().returning(|_, _| {
            Ok(UserActivityStats {
                total: 12,
                active: 10,
                ..Default::default()
            })
        });
        let mut assessments = MockAssessmentRepository::new();
        assessments.expect_stats().returning(|_, _| {
            Ok(AssessmentStats {
                total: 5,
                completed: 2,
                average_score: Some(81.0),
                ..Default::default()
            })
        });
        let mut reports = MockReportRepository::new();
        reports.expect_count().returning(|_| Ok(4));

        let svc = DashboardService::new(
            Arc::new(MockMetricRepository::new()),
            Arc::new(profiles),
            Arc::new(assessments),
            Arc::new(reports),
        );
        let overview = svc.overview(&scope(Role::Viewer)).await.unwrap();
        assert_eq!(overview.active_members, 10);
        assert_eq!(overview.total_members, 12);
        assert_eq!(overview.assessments.completed, 2);
        assert_eq!(overview.reports, 4);
    }
}
