// ============================================================================
// Assessly Infrastructure - PostgreSQL Performance Metric Repository
// File: crates/assessly-infrastructure/src/database/postgres/performance_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use tracing::error;
use uuid::Uuid;

use assessly_core::domain::{MetricUnit, PerformanceMetric, PerformanceQuery};
use assessly_core::error::DomainError;
use assessly_core::repositories::PerformanceRepository;

pub struct PgPerformanceRepository {
    pool: PgPool,
}

impl PgPerformanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct PerformanceRow {
    pub id: Uuid,
    pub metric_name: String,
    pub value: f64,
    pub unit: String,
    pub tags: Value,
    pub recorded_at: DateTime<Utc>,
}

impl TryFrom<PerformanceRow> for PerformanceMetric {
    type Error = DomainError;

    fn try_from(row: PerformanceRow) -> Result<Self, Self::Error> {
        let unit = MetricUnit::from_str(&row.unit)
            .ok_or_else(|| DomainError::InternalError(format!("Unknown metric unit: {}", row.unit)))?;
        Ok(PerformanceMetric {
            id: row.id,
            metric_name: row.metric_name,
            value: row.value,
            unit,
            tags: row.tags,
            recorded_at: row.recorded_at,
        })
    }
}

#[async_trait]
impl PerformanceRepository for PgPerformanceRepository {
    async fn list(&self, query: &PerformanceQuery) -> Result<Vec<PerformanceMetric>, DomainError> {
        let rows: Vec<PerformanceRow> = sqlx::query_as(
            r#"
            SELECT id, metric_name, value, unit, tags, recorded_at
            FROM performance_metrics
            WHERE ($1::text IS NULL OR metric_name = $1)
              AND ($2::timestamptz IS NULL OR recorded_at >= $2)
              AND ($3::timestamptz IS NULL OR recorded_at < $3)
            ORDER BY recorded_at DESC
            LIMIT $4
            "#,
        )
        .bind(&query.metric_name)
        .bind(query.from)
        .bind(query.to)
        .bind(i64::from(query.limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error listing performance metrics: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        rows.into_iter().map(PerformanceMetric::try_from).collect()
    }

    async fn create(&self, metric: &PerformanceMetric) -> Result<PerformanceMetric, DomainError> {
        let row: PerformanceRow = sqlx::query_as(
            r#"
            INSERT INTO performance_metrics (id, metric_name, value, unit, tags, recorded_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, metric_name, value, unit, tags, recorded_at
            "#,
        )
        .bind(metric.id)
        .bind(&metric.metric_name)
        .bind(metric.value)
        .bind(metric.unit.as_str())
        .bind(&metric.tags)
        .bind(metric.recorded_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error recording performance metric: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        PerformanceMetric::try_from(row)
    }
}
