// ============================================================================
// Assessly Infrastructure - PostgreSQL Organization Repository
// File: crates/assessly-infrastructure/src/database/postgres/organization_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgExecutor, FromRow, PgPool};
use tracing::{error, info};
use uuid::Uuid;

use assessly_core::domain::{OrgPlan, Organization};
use assessly_core::error::DomainError;
use assessly_core::repositories::OrganizationRepository;

use super::is_unique_violation;

pub struct PgOrganizationRepository {
    pool: PgPool,
}

impl PgOrganizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct OrganizationRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub plan: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OrganizationRow> for Organization {
    fn from(row: OrganizationRow) -> Self {
        Organization {
            id: row.id,
            name: row.name,
            slug: row.slug,
            plan: OrgPlan::from_str(&row.plan).unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl OrganizationRepository for PgOrganizationRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Organization>, DomainError> {
        let row: Option<OrganizationRow> = sqlx::query_as(
            r#"
            SELECT id, name, slug, plan, created_at, updated_at
            FROM organizations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error finding organization by id: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(row.map(|r| r.into()))
    }
}

/// Insert an organization on any executor (pool or open transaction).
pub(super) async fn insert_organization<'e, E>(
    executor: E,
    organization: &Organization,
) -> Result<Organization, DomainError>
where
    E: PgExecutor<'e>,
{
    info!("Creating organization: {}", organization.slug);

    let row: OrganizationRow = sqlx::query_as(
        r#"
        INSERT INTO organizations (id, name, slug, plan, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, name, slug, plan, created_at, updated_at
        "#,
    )
    .bind(organization.id)
    .bind(&organization.name)
    .bind(&organization.slug)
    .bind(organization.plan.as_str())
    .bind(organization.created_at)
    .bind(organization.updated_at)
    .fetch_one(executor)
    .await
    .map_err(|e: sqlx::Error| {
        error!("Database error creating organization: {}", e);
        if is_unique_violation(&e, "organizations_slug_key") {
            DomainError::OrganizationSlugAlreadyExists(organization.slug.clone())
        } else {
            DomainError::DatabaseError(e.to_string())
        }
    })?;

    Ok(row.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_plan_falls_back_to_free() {
        let now = Utc::now();
        let org: Organization = OrganizationRow {
            id: Uuid::new_v4(),
            name: "Acme".into(),
            slug: "acme-1a2b3c4d".into(),
            plan: "legacy".into(),
            created_at: now,
            updated_at: now,
        }
        .into();
        assert_eq!(org.plan, OrgPlan::Free);
    }
}
