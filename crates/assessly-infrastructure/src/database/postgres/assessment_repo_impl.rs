// ============================================================================
// Assessly Infrastructure - PostgreSQL Assessment Repository
// File: crates/assessly-infrastructure/src/database/postgres/assessment_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{error, info};
use uuid::Uuid;

use assessly_core::domain::{
    Assessment, AssessmentFilter, AssessmentStats, AssessmentStatsFilter, AssessmentStatus,
};
use assessly_core::error::DomainError;
use assessly_core::repositories::AssessmentRepository;
use assessly_shared::utils::contains_pattern;
use assessly_shared::Pagination;

const ASSESSMENT_COLUMNS: &str = "id, organization_id, title, description, category, status, score, \
     max_score, assigned_to, due_date, created_by, created_at, updated_at, completed_at, deleted_at";

const LIST_FILTER: &str = "organization_id = $1 AND deleted_at IS NULL \
     AND ($2::text IS NULL OR status = $2) \
     AND ($3::uuid IS NULL OR assigned_to = $3) \
     AND ($4::text IS NULL OR category = $4) \
     AND ($5::text IS NULL OR title ILIKE $5)";

pub struct PgAssessmentRepository {
    pool: PgPool,
}

impl PgAssessmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct AssessmentRow {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub status: String,
    pub score: Option<f64>,
    pub max_score: f64,
    pub assigned_to: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<AssessmentRow> for Assessment {
    fn from(row: AssessmentRow) -> Self {
        Assessment {
            id: row.id,
            organization_id: row.organization_id,
            title: row.title,
            description: row.description,
            category: row.category,
            status: AssessmentStatus::from_str(&row.status).unwrap_or_default(),
            score: row.score,
            max_score: row.max_score,
            assigned_to: row.assigned_to,
            due_date: row.due_date,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
            completed_at: row.completed_at,
            deleted_at: row.deleted_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct StatsRow {
    pub total: i64,
    pub draft: i64,
    pub active: i64,
    pub completed: i64,
    pub archived: i64,
    pub overdue: i64,
    pub average_score: Option<f64>,
    pub min_score: Option<f64>,
    pub max_score: Option<f64>,
}

#[async_trait]
impl AssessmentRepository for PgAssessmentRepository {
    async fn find_by_id(&self, organization_id: &Uuid, id: &Uuid) -> Result<Option<Assessment>, DomainError> {
        let sql = format!(
            "SELECT {} FROM assessments \
             WHERE organization_id = $1 AND id = $2 AND deleted_at IS NULL",
            ASSESSMENT_COLUMNS
        );
        let row: Option<AssessmentRow> = sqlx::query_as(&sql)
            .bind(organization_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error finding assessment by id: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        Ok(row.map(|r| r.into()))
    }

    async fn list(
        &self,
        organization_id: &Uuid,
        filter: &AssessmentFilter,
        pagination: Pagination,
    ) -> Result<(Vec<Assessment>, i64), DomainError> {
        let status = filter.status.map(|s| s.as_str());
        let search = filter.search.as_deref().map(|s| contains_pattern(s.trim()));

        let sql = format!(
            "SELECT {} FROM assessments WHERE {} \
             ORDER BY created_at DESC, id LIMIT $6 OFFSET $7",
            ASSESSMENT_COLUMNS, LIST_FILTER
        );
        let rows: Vec<AssessmentRow> = sqlx::query_as(&sql)
            .bind(organization_id)
            .bind(status)
            .bind(filter.assigned_to)
            .bind(&filter.category)
            .bind(&search)
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error listing assessments: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        let count_sql = format!("SELECT COUNT(*) FROM assessments WHERE {}", LIST_FILTER);
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(organization_id)
            .bind(status)
            .bind(filter.assigned_to)
            .bind(&filter.category)
            .bind(&search)
            .fetch_one(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error counting assessments: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    async fn create(&self, assessment: &Assessment) -> Result<Assessment, DomainError> {
        info!("Creating assessment: {}", assessment.id);

        let sql = format!(
            "INSERT INTO assessments ({cols}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
             RETURNING {cols}",
            cols = ASSESSMENT_COLUMNS
        );
        let row: AssessmentRow = sqlx::query_as(&sql)
            .bind(assessment.id)
            .bind(assessment.organization_id)
            .bind(&assessment.title)
            .bind(&assessment.description)
            .bind(&assessment.category)
            .bind(assessment.status.as_str())
            .bind(assessment.score)
            .bind(assessment.max_score)
            .bind(assessment.assigned_to)
            .bind(assessment.due_date)
            .bind(assessment.created_by)
            .bind(assessment.created_at)
            .bind(assessment.updated_at)
            .bind(assessment.completed_at)
            .bind(assessment.deleted_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error creating assessment: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        Ok(row.into())
    }

    async fn update(&self, assessment: &Assessment) -> Result<Assessment, DomainError> {
        let sql = format!(
            "UPDATE assessments \
             SET title = $3, description = $4, category = $5, status = $6, score = $7, \
                 max_score = $8, assigned_to = $9, due_date = $10, updated_at = $11, \
                 completed_at = $12 \
             WHERE organization_id = $1 AND id = $2 AND deleted_at IS NULL \
             RETURNING {}",
            ASSESSMENT_COLUMNS
        );
        let row: Option<AssessmentRow> = sqlx::query_as(&sql)
            .bind(assessment.organization_id)
            .bind(assessment.id)
            .bind(&assessment.title)
            .bind(&assessment.description)
            .bind(&assessment.category)
            .bind(assessment.status.as_str())
            .bind(assessment.score)
            .bind(assessment.max_score)
            .bind(assessment.assigned_to)
            .bind(assessment.due_date)
            .bind(assessment.updated_at)
            .bind(assessment.completed_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error updating assessment: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        row.map(Into::into)
            .ok_or(DomainError::AssessmentNotFound(assessment.id))
    }

    async fn soft_delete(&self, organization_id: &Uuid, id: &Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE assessments
            SET deleted_at = now(), updated_at = now()
            WHERE organization_id = $1 AND id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(organization_id)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error deleting assessment: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn stats(
        &self,
        organization_id: &Uuid,
        filter: &AssessmentStatsFilter,
    ) -> Result<AssessmentStats, DomainError> {
        let row: StatsRow = sqlx::query_as(
            r#"
            SELECT
                COUNT(*)                                            AS total,
                COUNT(*) FILTER (WHERE status = 'draft')            AS draft,
                COUNT(*) FILTER (WHERE status = 'active')           AS active,
                COUNT(*) FILTER (WHERE status = 'completed')        AS completed,
                COUNT(*) FILTER (WHERE status = 'archived')         AS archived,
                COUNT(*) FILTER (
                    WHERE status IN ('draft', 'active') AND due_date < $3
                )                                                   AS overdue,
                AVG(score) FILTER (WHERE status = 'completed')      AS average_score,
                MIN(score) FILTER (WHERE status = 'completed')      AS min_score,
                MAX(score) FILTER (WHERE status = 'completed')      AS max_score
            FROM assessments
            WHERE organization_id = $1
              AND deleted_at IS NULL
              AND ($2::text IS NULL OR category = $2)
            "#,
        )
        .bind(organization_id)
        .bind(&filter.category)
        .bind(filter.now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error computing assessment stats: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(AssessmentStats {
            total: row.total,
            draft: row.draft,
            active: row.active,
            completed: row.completed,
            archived: row.archived,
            overdue: row.overdue,
            average_score: row.average_score,
            min_score: row.min_score,
            max_score: row.max_score,
        })
    }
}
