//! Assessment management

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use assessly_shared::{Page, Pagination};

use crate::domain::{
    Assessment, AssessmentFilter, AssessmentPatch, AssessmentStats, AssessmentStatsFilter,
    NewAssessment, Role, TenantScope,
};
use crate::error::DomainError;
use crate::repositories::{AssessmentRepository, ProfileRepository};

pub struct AssessmentService {
    assessments: Arc<dyn AssessmentRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl AssessmentService {
    pub fn new(
        assessments: Arc<dyn AssessmentRepository>,
        profiles: Arc<dyn ProfileRepository>,
    ) -> Self {
        Self { assessments, profiles }
    }

    pub async fn list_assessments(
        &self,
        scope: &TenantScope,
        filter: &AssessmentFilter,
        pagination: Pagination,
    ) -> Result<Page<Assessment>, DomainError> {
        let (items, total) = self
            .assessments
            .list(&scope.organization_id, filter, pagination)
            .await?;
        Ok(Page::new(items, total, pagination))
    }

    pub async fn get_assessment(
        &self,
        scope: &TenantScope,
        id: &Uuid,
    ) -> Result<Assessment, DomainError> {
        self.assessments
            .find_by_id(&scope.organization_id, id)
            .await?
            .ok_or(DomainError::AssessmentNotFound(*id))
    }

    pub async fn create_assessment(
        &self,
        scope: &TenantScope,
        input: NewAssessment,
    ) -> Result<Assessment, DomainError> {
        scope.require_role(Role::Member)?;
        if let Some(assignee) = input.assigned_to {
            self.ensure_assignee(scope, &assignee).await?;
        }

        let assessment = Assessment::new(scope.organization_id, scope.user_id, input)?;
        let assessment = self.assessments.create(&assessment).await?;

        info!(
            "Assessment {} created in organization {} by {}",
            assessment.id, scope.organization_id, scope.user_id
        );
        Ok(assessment)
    }

    pub async fn update_assessment(
        &self,
        scope: &TenantScope,
        id: &Uuid,
        patch: AssessmentPatch,
    ) -> Result<Assessment, DomainError> {
        scope.require_role(Role::Member)?;
        if let Some(assignee) = patch.assigned_to {
            self.ensure_assignee(scope, &assignee).await?;
        }

        let mut assessment = self.get_assessment(scope, id).await?;
        let previous_status = assessment.status;
        assessment.apply_patch(patch)?;
        let assessment = self.assessments.update(&assessment).await?;

        if assessment.status != previous_status {
            info!(
                "Assessment {} moved from {} to {}",
                assessment.id, previous_status, assessment.status
            );
        }
        Ok(assessment)
    }

    pub async fn delete_assessment(&self, scope: &TenantScope, id: &Uuid) -> Result<(), DomainError> {
        scope.require_role(Role::Manager)?;
        if !self.assessments.soft_delete(&scope.organization_id, id).await? {
            return Err(DomainError::AssessmentNotFound(*id));
        }
        info!("Assessment {} deleted by {}", id, scope.user_id);
        Ok(())
    }

    /// Per-status counts and score statistics for the caller's organization.
    pub async fn status_counts(
        &self,
        scope: &TenantScope,
        category: Option<String>,
    ) -> Result<AssessmentStats, DomainError> {
        let filter = AssessmentStatsFilter {
            category,
            now: Utc::now(),
        };
        self.assessments.stats(&scope.organization_id, &filter).await
    }

    async fn ensure_assignee(&self, scope: &TenantScope, assignee: &Uuid) -> Result<(), DomainError> {
        match self.profiles.find_in_org(&scope.organization_id, assignee).await? {
            Some(profile) if profile.is_active => Ok(()),
            _ => Err(DomainError::ValidationError(format!(
                "Assignee {} is not an active member of this organization",
                assignee
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AssessmentStatus, NewProfile, Profile};
    use crate::repositories::{MockAssessmentRepository, MockProfileRepository};

    fn scope(role: Role) -> TenantScope {
        TenantScope::new(Uuid::new_v4(), Uuid::new_v4(), role)
    }

    fn new_assessment() -> NewAssessment {
        NewAssessment {
            title: "Onboarding checklist".into(),
            ..Default::default()
        }
    }

    fn service(assessments: MockAssessmentRepository, profiles: MockProfileRepository) -> AssessmentService {
        AssessmentService::new(Arc::new(assessments), Arc::new(profiles))
    }

    #[tokio::test]
    async fn test_viewer_cannot_create() {
        let mut repo = MockAssessmentRepository::new();
        repo.expect_create().never();

        let result = service(repo, MockProfileRepository::new())
            .create_assessment(&scope(Role::Viewer), new_assessment())
            .await;
        assert!(matches!(result, Err(DomainError::InsufficientRole { .. })));
    }

    #[tokio::test]
    async fn test_create_sets_tenant_and_author() {
        let member = scope(Role::Member);
        let (org, user) = (member.organization_id, member.user_id);

        let mut repo = MockAssessmentRepository::new();
        repo.expect_create()
            .withf(move |a| a.organization_id == org && a.created_by == user)
            .returning(|a| Ok(a.clone()));

        let created = service(repo, MockProfileRepository::new())
            .create_assessment(&member, new_assessment())
            .await
            .unwrap();
        assert_eq!(created.status, AssessmentStatus::Draft);
    }

    #[tokio::test]
    async fn test_create_rejects_foreign_assignee() {
        let member = scope(Role::Member);
        let mut profiles = MockProfileRepository::new();
        profiles.expect_find_in_org().returning(|_, _| Ok(None));

        let result = service(MockAssessmentRepository::new(), profiles)
            .create_assessment(
                &member,
                NewAssessment {
                    assigned_to: Some(Uuid::new_v4()),
                    ..new_assessment()
                },
            )
            .await;
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_create_accepts_org_assignee() {
        let member = scope(Role::Member);
        let assignee = Uuid::new_v4();
        let profile = Profile::new(NewProfile {
            id: assignee,
            organization_id: Some(member.organization_id),
            email: "assignee@example.com".into(),
            full_name: None,
            role: Role::Member,
            avatar_url: None,
        })
        .unwrap();

        let mut profiles = MockProfileRepository::new();
        profiles
            .expect_find_in_org()
            .returning(move |_, _| Ok(Some(profile.clone())));
        let mut repo = MockAssessmentRepository::new();
        repo.expect_create().returning(|a| Ok(a.clone()));

        let created = service(repo, profiles)
            .create_assessment(
                &member,
                NewAssessment {
                    assigned_to: Some(assignee),
                    ..new_assessment()
                },
            )
            .await
            .unwrap();
        assert_eq!(created.assigned_to, Some(assignee));
    }

    #[tokio::test]
    async fn test_update_invalid_transition() {
        let member = scope(Role::Member);
        let existing = Assessment::new(member.organization_id, member.user_id, new_assessment()).unwrap();

        let mut repo = MockAssessmentRepository::new();
        repo.expect_find_by_id()
            .returning(move |_, _| Ok(Some(existing.clone())));
        repo.expect_update().never();

        let result = service(repo, MockProfileRepository::new())
            .update_assessment(
                &member,
                &Uuid::new_v4(),
                AssessmentPatch {
                    status: Some(AssessmentStatus::Completed),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(DomainError::InvalidStatusTransition { .. })));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let mut repo = MockAssessmentRepository::new();
        repo.expect_find_by_id().returning(|_, _| Ok(None));

        let result = service(repo, MockProfileRepository::new())
            .update_assessment(
                &scope(Role::Admin),
                &Uuid::new_v4(),
                AssessmentPatch {
                    title: Some("New title".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(DomainError::AssessmentNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_requires_manager() {
        let mut repo = MockAssessmentRepository::new();
        repo.expect_soft_delete().times(1).returning(|_, _| Ok(true));
        let svc = service(repo, MockProfileRepository::new());

        let result = svc.delete_assessment(&scope(Role::Member), &Uuid::new_v4()).await;
        assert!(matches!(result, Err(DomainError::InsufficientRole { .. })));
        assert!(svc.delete_assessment(&scope(Role::Manager), &Uuid::new_v4()).await.is_ok());
    }

    #[tokio::test]
    async fn test_stats_passes_category() {
        let viewer = scope(Role::Viewer);
        let mut repo = MockAssessmentRepository::new();
        repo.expect_stats()
            .withf(|_, f| f.category.as_deref() == Some("safety"))
            .returning(|_, _| {
                Ok(AssessmentStats {
                    total: 3,
                    completed: 1,
                    ..Default::default()
                })
            });

        let stats = service(repo, MockProfileRepository::new())
            .status_counts(&viewer, Some("safety".into()))
            .await
            .unwrap();
        assert_eq!(stats.total, 3);
    }
}
