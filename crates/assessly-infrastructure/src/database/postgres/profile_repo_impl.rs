// ============================================================================
// Assessly Infrastructure - PostgreSQL Profile Repository
// File: crates/assessly-infrastructure/src/database/postgres/profile_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgExecutor, FromRow, PgPool};
use tracing::{error, info};
use uuid::Uuid;

use assessly_core::domain::{
    Organization, Profile, Role, UserActivityFilter, UserActivityStats, UserFilter,
};
use assessly_core::error::DomainError;
use assessly_core::repositories::ProfileRepository;
use assessly_shared::utils::contains_pattern;
use assessly_shared::Pagination;

use super::is_unique_violation;
use super::organization_repo_impl::insert_organization;

const PROFILE_COLUMNS: &str = "id, organization_id, email, full_name, role, is_active, avatar_url, \
     last_seen_at, created_at, updated_at, deleted_at";

pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_write_error(e: sqlx::Error, profile: &Profile) -> DomainError {
        if is_unique_violation(&e, "profiles_email_live_key") {
            DomainError::EmailAlreadyExists(profile.email.clone())
        } else {
            DomainError::DatabaseError(e.to_string())
        }
    }

    async fn insert<'e, E>(executor: E, profile: &Profile) -> Result<Profile, DomainError>
    where
        E: PgExecutor<'e>,
    {
        info!("Creating profile: {}", profile.id);

        let sql = format!(
            "INSERT INTO profiles ({cols}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {cols}",
            cols = PROFILE_COLUMNS
        );
        let row: ProfileRow = sqlx::query_as(&sql)
            .bind(profile.id)
            .bind(profile.organization_id)
            .bind(&profile.email)
            .bind(&profile.full_name)
            .bind(profile.role.as_str())
            .bind(profile.is_active)
            .bind(&profile.avatar_url)
            .bind(profile.last_seen_at)
            .bind(profile.created_at)
            .bind(profile.updated_at)
            .bind(profile.deleted_at)
            .fetch_one(executor)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error creating profile: {}", e);
                Self::map_write_error(e, profile)
            })?;

        Ok(row.into())
    }
}

fn transaction_error(e: sqlx::Error) -> DomainError {
    error!("Database transaction error: {}", e);
    DomainError::DatabaseError(e.to_string())
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct ProfileRow {
    pub id: Uuid,
    pub organization_id: Option<Uuid>,
    pub email: String,
    pub full_name: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub avatar_url: Option<String>,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            id: row.id,
            organization_id: row.organization_id,
            email: row.email,
            full_name: row.full_name,
            role: Role::from_str(&row.role).unwrap_or_default(),
            is_active: row.is_active,
            avatar_url: row.avatar_url,
            last_seen_at: row.last_seen_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct ActivityRow {
    pub total: i64,
    pub active: i64,
    pub seen_recently: i64,
    pub admins: i64,
    pub managers: i64,
    pub members: i64,
    pub viewers: i64,
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Profile>, DomainError> {
        let sql = format!(
            "SELECT {} FROM profiles WHERE id = $1 AND deleted_at IS NULL",
            PROFILE_COLUMNS
        );
        let row: Option<ProfileRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error finding profile by id: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_id_with_deleted(&self, id: &Uuid) -> Result<Option<Profile>, DomainError> {
        let sql = format!("SELECT {} FROM profiles WHERE id = $1", PROFILE_COLUMNS);
        let row: Option<ProfileRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error finding profile by id: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, DomainError> {
        let sql = format!(
            "SELECT {} FROM profiles WHERE lower(email) = lower($1) AND deleted_at IS NULL",
            PROFILE_COLUMNS
        );
        let row: Option<ProfileRow> = sqlx::query_as(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error finding profile by email: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_in_org(&self, organization_id: &Uuid, id: &Uuid) -> Result<Option<Profile>, DomainError> {
        let sql = format!(
            "SELECT {} FROM profiles \
             WHERE organization_id = $1 AND id = $2 AND deleted_at IS NULL",
            PROFILE_COLUMNS
        );
        let row: Option<ProfileRow> = sqlx::query_as(&sql)
            .bind(organization_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error finding profile in organization: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        Ok(row.map(|r| r.into()))
    }

    async fn list(
        &self,
        organization_id: &Uuid,
        filter: &UserFilter,
        pagination: Pagination,
    ) -> Result<(Vec<Profile>, i64), DomainError> {
        let role = filter.role.map(|r| r.as_str());
        let search = filter.search.as_deref().map(|s| contains_pattern(s.trim()));

        const WHERE: &str = "organization_id = $1 AND deleted_at IS NULL \
             AND ($2::text IS NULL OR role = $2) \
             AND ($3::boolean IS NULL OR is_active = $3) \
             AND ($4::text IS NULL OR email ILIKE $4 OR full_name ILIKE $4)";

        let sql = format!(
            "SELECT {} FROM profiles WHERE {} ORDER BY created_at DESC, id LIMIT $5 OFFSET $6",
            PROFILE_COLUMNS, WHERE
        );
        let rows: Vec<ProfileRow> = sqlx::query_as(&sql)
            .bind(organization_id)
            .bind(role)
            .bind(filter.is_active)
            .bind(&search)
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error listing profiles: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM profiles WHERE {}", WHERE))
            .bind(organization_id)
            .bind(role)
            .bind(filter.is_active)
            .bind(&search)
            .fetch_one(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error counting profiles: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    async fn create(&self, profile: &Profile) -> Result<Profile, DomainError> {
        Self::insert(&self.pool, profile).await
    }

    async fn create_with_organization(
        &self,
        organization: &Organization,
        profile: &Profile,
    ) -> Result<(Organization, Profile), DomainError> {
        let mut tx = self.pool.begin().await.map_err(transaction_error)?;

        let organization = insert_organization(&mut *tx, organization).await?;
        let profile = Self::insert(&mut *tx, profile).await?;

        tx.commit().await.map_err(transaction_error)?;
        Ok((organization, profile))
    }

    async fn attach_organization(
        &self,
        organization: &Organization,
        profile: &Profile,
    ) -> Result<(Organization, Profile), DomainError> {
        let mut tx = self.pool.begin().await.map_err(transaction_error)?;

        let organization = insert_organization(&mut *tx, organization).await?;
        let sql = format!(
            "UPDATE profiles \
             SET organization_id = $2, role = $3, updated_at = $4 \
             WHERE id = $1 AND organization_id IS NULL AND deleted_at IS NULL \
             RETURNING {}",
            PROFILE_COLUMNS
        );
        let row: Option<ProfileRow> = sqlx::query_as(&sql)
            .bind(profile.id)
            .bind(organization.id)
            .bind(profile.role.as_str())
            .bind(profile.updated_at)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error attaching organization: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        // Dropping the transaction rolls the organization back
        let row = row.ok_or(DomainError::UserNotFound(profile.id))?;
        tx.commit().await.map_err(transaction_error)?;
        Ok((organization, row.into()))
    }

    async fn update(&self, organization_id: &Uuid, profile: &Profile) -> Result<Profile, DomainError> {
        let sql = format!(
            "UPDATE profiles \
             SET email = $3, full_name = $4, role = $5, \
                 is_active = $6, avatar_url = $7, last_seen_at = $8, updated_at = $9 \
             WHERE id = $1 AND organization_id = $2 AND deleted_at IS NULL \
             RETURNING {}",
            PROFILE_COLUMNS
        );
        let row: Option<ProfileRow> = sqlx::query_as(&sql)
            .bind(profile.id)
            .bind(organization_id)
            .bind(&profile.email)
            .bind(&profile.full_name)
            .bind(profile.role.as_str())
            .bind(profile.is_active)
            .bind(&profile.avatar_url)
            .bind(profile.last_seen_at)
            .bind(profile.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error updating profile: {}", e);
                Self::map_write_error(e, profile)
            })?;

        row.map(Into::into).ok_or(DomainError::UserNotFound(profile.id))
    }

    async fn reassign(&self, previous_id: &Uuid, profile: &Profile) -> Result<Profile, DomainError> {
        info!("Reassigning profile {} to {}", previous_id, profile.id);

        // Foreign keys referencing profiles(id) cascade on update
        let sql = format!(
            "UPDATE profiles \
             SET id = $2, full_name = $3, avatar_url = $4, last_seen_at = $5, updated_at = $6 \
             WHERE id = $1 AND deleted_at IS NULL \
             RETURNING {}",
            PROFILE_COLUMNS
        );
        let row: Option<ProfileRow> = sqlx::query_as(&sql)
            .bind(previous_id)
            .bind(profile.id)
            .bind(&profile.full_name)
            .bind(&profile.avatar_url)
            .bind(profile.last_seen_at)
            .bind(profile.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error reassigning profile: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        row.map(Into::into).ok_or(DomainError::UserNotFound(*previous_id))
    }

    async fn soft_delete(&self, organization_id: &Uuid, id: &Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET deleted_at = now(), is_active = FALSE, updated_at = now()
            WHERE organization_id = $1 AND id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(organization_id)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error deleting profile: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn touch_last_seen(&self, id: &Uuid, at: DateTime<Utc>) -> Result<(), DomainError> {
        sqlx::query("UPDATE profiles SET last_seen_at = $2 WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error updating last_seen_at: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        Ok(())
    }

    async fn activity_stats(
        &self,
        organization_id: &Uuid,
        filter: &UserActivityFilter,
    ) -> Result<UserActivityStats, DomainError> {
        let row: ActivityRow = sqlx::query_as(
            r#"
            SELECT
                COUNT(*)                                          AS total,
                COUNT(*) FILTER (WHERE is_active)                 AS active,
                COUNT(*) FILTER (WHERE last_seen_at >= $2)        AS seen_recently,
                COUNT(*) FILTER (WHERE role = 'admin')            AS admins,
                COUNT(*) FILTER (WHERE role = 'manager')          AS managers,
                COUNT(*) FILTER (WHERE role = 'member')           AS members,
                COUNT(*) FILTER (WHERE role = 'viewer')           AS viewers
            FROM profiles
            WHERE organization_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(organization_id)
        .bind(filter.seen_since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error computing user activity: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(UserActivityStats {
            total: row.total,
            active: row.active,
            inactive: row.total - row.active,
            seen_recently: row.seen_recently,
            admins: row.admins,
            managers: row.managers,
            members: row.members,
            viewers: row.viewers,
        })
    }
}
