//! Platform-level performance data (platform operators only)

use std::sync::Arc;

use serde::Serialize;

use assessly_shared::constants::{DEFAULT_METRIC_LIMIT, MAX_METRIC_LIMIT};

use crate::domain::{
    NewPerformanceMetric, PerformanceMetric, PerformanceQuery, PlatformScope, RuntimeSnapshot,
};
use crate::error::DomainError;
use crate::repositories::PerformanceRepository;

/// Live counters of the running process, provided by the HTTP layer.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
pub trait RuntimeStats: Send + Sync {
    fn snapshot(&self) -> RuntimeSnapshot;
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemPerformance {
    pub runtime: RuntimeSnapshot,
    pub metrics: Vec<PerformanceMetric>,
}

pub struct SystemService {
    performance: Arc<dyn PerformanceRepository>,
    runtime: Arc<dyn RuntimeStats>,
}

impl SystemService {
    pub fn new(performance: Arc<dyn PerformanceRepository>, runtime: Arc<dyn RuntimeStats>) -> Self {
        Self { performance, runtime }
    }

    pub async fn performance(
        &self,
        _scope: &PlatformScope,
        mut query: PerformanceQuery,
    ) -> Result<SystemPerformance, DomainError> {
        if let (Some(from), Some(to)) = (query.from, query.to) {
            if from >= to {
                return Err(DomainError::ValidationError("'from' must be before 'to'".into()));
            }
        }
        query.limit = match query.limit {
            0 => DEFAULT_METRIC_LIMIT,
            n => n.min(MAX_METRIC_LIMIT),
        };

        let metrics = self.performance.list(&query).await?;
        Ok(SystemPerformance {
            runtime: self.runtime.snapshot(),
            metrics,
        })
    }

    pub async fn record(
        &self,
        _scope: &PlatformScope,
        input: NewPerformanceMetric,
    ) -> Result<PerformanceMetric, DomainError> {
        let metric = PerformanceMetric::new(input)?;
        self.performance.create(&metric).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MetricUnit, Role, TenantScope};
    use crate::repositories::MockPerformanceRepository;
    use uuid::Uuid;

    fn operator() -> PlatformScope {
        let admin = TenantScope::new(Uuid::new_v4(), Uuid::new_v4(), Role::Admin);
        PlatformScope::grant(&admin, true).unwrap()
    }

    #[tokio::test]
    async fn test_performance_rejects_inverted_range() {
        let mut repo = MockPerformanceRepository::new();
        repo.expect_list().never();
        let service = SystemService::new(Arc::new(repo), Arc::new(MockRuntimeStats::new()));

        let now = chrono::Utc::now();
        let query = PerformanceQuery {
            from: Some(now),
            to: Some(now - chrono::Duration::hours(1)),
            ..Default::default()
        };
        let result = service.performance(&operator(), query).await;
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_performance_includes_runtime_snapshot() {
        let mut repo = MockPerformanceRepository::new();
        repo.expect_list()
            .withf(|q| q.limit == DEFAULT_METRIC_LIMIT)
            .returning(|_| Ok(vec![]));
        let mut runtime = MockRuntimeStats::new();
        runtime.expect_snapshot().returning(|| RuntimeSnapshot {
            uptime_secs: 42,
            requests_total: 7,
            requests_in_flight: 1,
            error_responses: 0,
        });

        let service = SystemService::new(Arc::new(repo), Arc::new(runtime));
        let perf = service
            .performance(&operator(), PerformanceQuery::default())
            .await
            .unwrap();
        assert_eq!(perf.runtime.uptime_secs, 42);
        assert!(perf.metrics.is_empty());
    }

    #[tokio::test]
    async fn test_record_validates_metric() {
        let mut repo = MockPerformanceRepository::new();
        repo.expect_create().returning(|m| Ok(m.clone()));
        let service = SystemService::new(Arc::new(repo), Arc::new(MockRuntimeStats::new()));
        let admin = operator();

        let bad = NewPerformanceMetric {
            metric_name: "cpu_usage".into(),
            value: 140.0,
            unit: MetricUnit::Percent,
            tags: None,
            recorded_at: None,
        };
        assert!(matches!(
            service.record(&admin, bad).await,
            Err(DomainError::ValidationError(_))
        ));

        let good = NewPerformanceMetric {
            metric_name: "cpu_usage".into(),
            value: 40.0,
            unit: MetricUnit::Percent,
            tags: None,
            recorded_at: None,
        };
        assert_eq!(service.record(&admin, good).await.unwrap().value, 40.0);
    }
}
