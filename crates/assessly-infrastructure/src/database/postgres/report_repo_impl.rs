// ============================================================================
// Assessly Infrastructure - PostgreSQL Report Repository
// File: crates/assessly-infrastructure/src/database/postgres/report_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use tracing::{error, info};
use uuid::Uuid;

use assessly_core::domain::{Report, ReportFilter, ReportStatus, ReportType};
use assessly_core::error::DomainError;
use assessly_core::repositories::ReportRepository;
use assessly_shared::Pagination;

const REPORT_COLUMNS: &str = "id, organization_id, name, report_type, parameters, status, result, \
     error_message, generated_at, created_by, created_at, updated_at, deleted_at";

const LIST_FILTER: &str = "organization_id = $1 AND deleted_at IS NULL \
     AND ($2::text IS NULL OR report_type = $2) \
     AND ($3::text IS NULL OR status = $3)";

pub struct PgReportRepository {
    pool: PgPool,
}

impl PgReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct ReportRow {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub report_type: String,
    pub parameters: Value,
    pub status: String,
    pub result: Option<Value>,
    pub error_message: Option<String>,
    pub generated_at: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<ReportRow> for Report {
    type Error = DomainError;

    fn try_from(row: ReportRow) -> Result<Self, Self::Error> {
        let report_type = ReportType::from_str(&row.report_type).ok_or_else(|| {
            DomainError::InternalError(format!("Unknown report type: {}", row.report_type))
        })?;
        Ok(Report {
            id: row.id,
            organization_id: row.organization_id,
            name: row.name,
            report_type,
            parameters: row.parameters,
            status: ReportStatus::from_str(&row.status).unwrap_or_default(),
            result: row.result,
            error_message: row.error_message,
            generated_at: row.generated_at,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

#[async_trait]
impl ReportRepository for PgReportRepository {
    async fn find_by_id(&self, organization_id: &Uuid, id: &Uuid) -> Result<Option<Report>, DomainError> {
        let sql = format!(
            "SELECT {} FROM reports WHERE organization_id = $1 AND id = $2 AND deleted_at IS NULL",
            REPORT_COLUMNS
        );
        let row: Option<ReportRow> = sqlx::query_as(&sql)
            .bind(organization_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error finding report by id: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        row.map(Report::try_from).transpose()
    }

    async fn list(
        &self,
        organization_id: &Uuid,
        filter: &ReportFilter,
        pagination: Pagination,
    ) -> Result<(Vec<Report>, i64), DomainError> {
        let report_type = filter.report_type.map(|t| t.as_str());
        let status = filter.status.map(|s| s.as_str());

        let sql = format!(
            "SELECT {} FROM reports WHERE {} ORDER BY created_at DESC, id LIMIT $4 OFFSET $5",
            REPORT_COLUMNS, LIST_FILTER
        );
        let rows: Vec<ReportRow> = sqlx::query_as(&sql)
            .bind(organization_id)
            .bind(report_type)
            .bind(status)
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error listing reports: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        let count_sql = format!("SELECT COUNT(*) FROM reports WHERE {}", LIST_FILTER);
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(organization_id)
            .bind(report_type)
            .bind(status)
            .fetch_one(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error counting reports: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        let reports = rows
            .into_iter()
            .map(Report::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((reports, total))
    }

    async fn create(&self, report: &Report) -> Result<Report, DomainError> {
        info!("Creating report: {}", report.id);

        let sql = format!(
            "INSERT INTO reports ({cols}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {cols}",
            cols = REPORT_COLUMNS
        );
        let row: ReportRow = sqlx::query_as(&sql)
            .bind(report.id)
            .bind(report.organization_id)
            .bind(&report.name)
            .bind(report.report_type.as_str())
            .bind(&report.parameters)
            .bind(report.status.as_str())
            .bind(&report.result)
            .bind(&report.error_message)
            .bind(report.generated_at)
            .bind(report.created_by)
            .bind(report.created_at)
            .bind(report.updated_at)
            .bind(report.deleted_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error creating report: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        Report::try_from(row)
    }

    async fn update(&self, report: &Report) -> Result<Report, DomainError> {
        let sql = format!(
            "UPDATE reports \
             SET name = $3, parameters = $4, status = $5, result = $6, error_message = $7, \
                 generated_at = $8, updated_at = $9 \
             WHERE organization_id = $1 AND id = $2 AND deleted_at IS NULL \
             RETURNING {}",
            REPORT_COLUMNS
        );
        let row: Option<ReportRow> = sqlx::query_as(&sql)
            .bind(report.organization_id)
            .bind(report.id)
            .bind(&report.name)
            .bind(&report.parameters)
            .bind(report.status.as_str())
            .bind(&report.result)
            .bind(&report.error_message)
            .bind(report.generated_at)
            .bind(report.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error updating report: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        row.map(Report::try_from)
            .transpose()?
            .ok_or(DomainError::ReportNotFound(report.id))
    }

    async fn begin_generation(
        &self,
        organization_id: &Uuid,
        id: &Uuid,
        stale_after_secs: i64,
    ) -> Result<Option<Report>, DomainError> {
        // Single conditional UPDATE: two concurrent callers cannot both win
        let sql = format!(
            "UPDATE reports \
             SET status = 'generating', error_message = NULL, updated_at = now() \
             WHERE organization_id = $1 AND id = $2 AND deleted_at IS NULL \
               AND (status <> 'generating' OR updated_at < now() - make_interval(secs => $3)) \
             RETURNING {}",
            REPORT_COLUMNS
        );
        let row: Option<ReportRow> = sqlx::query_as(&sql)
            .bind(organization_id)
            .bind(id)
            .bind(stale_after_secs as f64)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error locking report for generation: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        row.map(Report::try_from).transpose()
    }

    async fn abort_generation(&self, organization_id: &Uuid, id: &Uuid, message: &str) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE reports
            SET status = 'failed', error_message = $3, updated_at = now()
            WHERE organization_id = $1 AND id = $2 AND status = 'generating'
            "#,
        )
        .bind(organization_id)
        .bind(id)
        .bind(message)
        .execute(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error aborting report generation: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    async fn soft_delete(&self, organization_id: &Uuid, id: &Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE reports
            SET deleted_at = now(), updated_at = now()
            WHERE organization_id = $1 AND id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(organization_id)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error deleting report: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self, organization_id: &Uuid) -> Result<i64, DomainError> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM reports WHERE organization_id = $1 AND deleted_at IS NULL",
        )
        .bind(organization_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error counting reports: {}", e);
            DomainError::DatabaseError(e.to_string())
        })
    }
}
