// ============================================================================
// Assessly Infrastructure - PostgreSQL Dashboard Metric Repository
// File: crates/assessly-infrastructure/src/database/postgres/metric_repo_impl.rs
// Description: Metric time series with date_trunc bucketing and window stats
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use tracing::{debug, error};
use uuid::Uuid;

use assessly_core::domain::{
    AggregateRequest, BucketStats, DashboardMetric, MetricQuery, WindowQuery, WindowStats,
};
use assessly_core::error::DomainError;
use assessly_core::repositories::MetricRepository;

pub struct PgMetricRepository {
    pool: PgPool,
}

impl PgMetricRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row types for SQLx mapping
#[derive(Debug, FromRow)]
struct MetricRow {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub metric_type: String,
    pub value: f64,
    pub dimensions: Value,
    pub recorded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<MetricRow> for DashboardMetric {
    fn from(row: MetricRow) -> Self {
        DashboardMetric {
            id: row.id,
            organization_id: row.organization_id,
            metric_type: row.metric_type,
            value: row.value,
            dimensions: row.dimensions,
            recorded_at: row.recorded_at,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct BucketRow {
    pub bucket: DateTime<Utc>,
    pub samples: i64,
    pub sum: f64,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

impl From<BucketRow> for BucketStats {
    fn from(row: BucketRow) -> Self {
        BucketStats {
            bucket: row.bucket,
            samples: row.samples,
            sum: row.sum,
            avg: row.avg,
            min: row.min,
            max: row.max,
        }
    }
}

#[derive(Debug, FromRow)]
struct WindowRow {
    pub metric_type: String,
    pub count: i64,
    pub sum: Option<f64>,
    pub avg: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl From<WindowRow> for WindowStats {
    fn from(row: WindowRow) -> Self {
        WindowStats {
            metric_type: row.metric_type,
            count: row.count,
            sum: row.sum,
            avg: row.avg,
            min: row.min,
            max: row.max,
        }
    }
}

#[async_trait]
impl MetricRepository for PgMetricRepository {
    async fn list(&self, organization_id: &Uuid, query: &MetricQuery) -> Result<Vec<DashboardMetric>, DomainError> {
        let rows: Vec<MetricRow> = sqlx::query_as(
            r#"
            SELECT id, organization_id, metric_type, value, dimensions, recorded_at, created_at
            FROM dashboard_metrics
            WHERE organization_id = $1
              AND ($2::text IS NULL OR metric_type = $2)
              AND ($3::timestamptz IS NULL OR recorded_at >= $3)
              AND ($4::timestamptz IS NULL OR recorded_at < $4)
            ORDER BY recorded_at DESC
            LIMIT $5
            "#,
        )
        .bind(organization_id)
        .bind(&query.metric_type)
        .bind(query.from)
        .bind(query.to)
        .bind(i64::from(query.limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error listing metrics: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(&self, metric: &DashboardMetric) -> Result<DashboardMetric, DomainError> {
        let row: MetricRow = sqlx::query_as(
            r#"
            INSERT INTO dashboard_metrics (
                id, organization_id, metric_type, value, dimensions, recorded_at, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, organization_id, metric_type, value, dimensions, recorded_at, created_at
            "#,
        )
        .bind(metric.id)
        .bind(metric.organization_id)
        .bind(&metric.metric_type)
        .bind(metric.value)
        .bind(&metric.dimensions)
        .bind(metric.recorded_at)
        .bind(metric.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error recording metric: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(row.into())
    }

    async fn aggregate(
        &self,
        organization_id: &Uuid,
        request: &AggregateRequest,
    ) -> Result<Vec<BucketStats>, DomainError> {
        let rows: Vec<BucketRow> = sqlx::query_as(
            r#"
            SELECT
                date_trunc($2, recorded_at) AS bucket,
                COUNT(*)                    AS samples,
                SUM(value)                  AS sum,
                AVG(value)                  AS avg,
                MIN(value)                  AS min,
                MAX(value)                  AS max
            FROM dashboard_metrics
            WHERE organization_id = $1
              AND metric_type = $3
              AND recorded_at >= $4
              AND recorded_at < $5
            GROUP BY bucket
            ORDER BY bucket
            "#,
        )
        .bind(organization_id)
        .bind(request.interval.as_str())
        .bind(&request.metric_type)
        .bind(request.from)
        .bind(request.to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error aggregating metrics: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        debug!("Aggregation returned {} buckets", rows.len());
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn window_stats(
        &self,
        organization_id: &Uuid,
        query: &WindowQuery,
    ) -> Result<Vec<WindowStats>, DomainError> {
        let rows: Vec<WindowRow> = sqlx::query_as(
            r#"
            SELECT
                metric_type,
                COUNT(*)   AS count,
                SUM(value) AS sum,
                AVG(value) AS avg,
                MIN(value) AS min,
                MAX(value) AS max
            FROM dashboard_metrics
            WHERE organization_id = $1
              AND metric_type = ANY($2)
              AND recorded_at >= $3
              AND recorded_at < $4
            GROUP BY metric_type
            "#,
        )
        .bind(organization_id)
        .bind(&query.metric_types)
        .bind(query.from)
        .bind(query.to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error computing metric windows: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
