// ============================================================================
// Assessly Core - Assessment Entity
// File: crates/assessly-core/src/domain/assessment.rs
// Description: Assessment with status lifecycle and scoring
// ============================================================================

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::DomainError;

pub const DEFAULT_MAX_SCORE: f64 = 100.0;

/// Assessment lifecycle.
///
/// ```text
/// draft <-> active -> completed
///   \         |          |
///    `--------+----------+--> archived (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    Draft,
    Active,
    Completed,
    Archived,
}

impl AssessmentStatus {
    pub const ALL: [AssessmentStatus; 4] = [
        AssessmentStatus::Draft,
        AssessmentStatus::Active,
        AssessmentStatus::Completed,
        AssessmentStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentStatus::Draft => "draft",
            AssessmentStatus::Active => "active",
            AssessmentStatus::Completed => "completed",
            AssessmentStatus::Archived => "archived",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(AssessmentStatus::Draft),
            "active" => Some(AssessmentStatus::Active),
            "completed" => Some(AssessmentStatus::Completed),
            "archived" => Some(AssessmentStatus::Archived),
            _ => None,
        }
    }

    pub fn can_transition_to(&self, next: AssessmentStatus) -> bool {
        use AssessmentStatus::*;
        matches!(
            (self, next),
            (Draft, Active)
                | (Active, Draft)
                | (Active, Completed)
                | (Draft, Archived)
                | (Active, Archived)
                | (Completed, Archived)
        )
    }

    /// Statuses a new assessment may start in.
    pub fn is_initial(&self) -> bool {
        matches!(self, AssessmentStatus::Draft | AssessmentStatus::Active)
    }
}

impl Default for AssessmentStatus {
    fn default() -> Self {
        AssessmentStatus::Draft
    }
}

impl fmt::Display for AssessmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Assessment entity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Assessment {
    pub id: Uuid,
    pub organization_id: Uuid,

    #[validate(length(min = 3, max = 200, message = "Title must be between 3 and 200 characters"))]
    pub title: String,

    #[validate(length(max = 5000, message = "Description too long"))]
    pub description: Option<String>,

    #[validate(length(min = 1, max = 64, message = "Category must be between 1 and 64 characters"))]
    pub category: Option<String>,

    pub status: AssessmentStatus,

    #[validate(range(min = 0.0, message = "Score cannot be negative"))]
    pub score: Option<f64>,

    #[validate(range(exclusive_min = 0.0, max = 1_000_000.0, message = "Max score must be positive"))]
    pub max_score: f64,

    pub assigned_to: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,

    // Audit fields
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct NewAssessment {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub status: Option<AssessmentStatus>,
    pub max_score: Option<f64>,
    pub assigned_to: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct AssessmentPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub status: Option<AssessmentStatus>,
    pub score: Option<f64>,
    pub max_score: Option<f64>,
    pub assigned_to: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct AssessmentFilter {
    pub status: Option<AssessmentStatus>,
    pub assigned_to: Option<Uuid>,
    pub category: Option<String>,
    /// Case-insensitive match on the title.
    pub search: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AssessmentStatsFilter {
    pub category: Option<String>,
    /// Reference time for the overdue count.
    pub now: DateTime<Utc>,
}

/// Counts and score statistics computed by the database.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentStats {
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

impl Assessment {
    pub fn new(
        organization_id: Uuid,
        created_by: Uuid,
        input: NewAssessment,
    ) -> Result<Self, DomainError> {
        let status = input.status.unwrap_or_default();
        if !status.is_initial() {
            return Err(DomainError::ValidationError(format!(
                "New assessments must start as draft or active, not {}",
                status
            )));
        }

        let now = Utc::now();
        let assessment = Self {
            id: Uuid::new_v4(),
            organization_id,
            title: input.title.trim().to_string(),
            description: normalize(input.description),
            category: normalize(input.category),
            status,
            score: None,
            max_score: input.max_score.unwrap_or(DEFAULT_MAX_SCORE),
            assigned_to: input.assigned_to,
            due_date: input.due_date,
            created_by,
            created_at: now,
            updated_at: now,
            completed_at: None,
            deleted_at: None,
        };

        assessment.check()?;
        Ok(assessment)
    }

    /// Apply a patch. Field changes land before the status change so a single
    /// request can set the score and complete the assessment.
    pub fn apply_patch(&mut self, patch: AssessmentPatch) -> Result<(), DomainError> {
        if self.status == AssessmentStatus::Archived {
            return Err(DomainError::ValidationError(
                "Archived assessments cannot be modified".to_string(),
            ));
        }

        if let Some(title) = patch.title {
            self.title = title.trim().to_string();
        }
        if patch.description.is_some() {
            self.description = normalize(patch.description);
        }
        if patch.category.is_some() {
            self.category = normalize(patch.category);
        }
        if let Some(max_score) = patch.max_score {
            self.max_score = max_score;
        }
        if let Some(score) = patch.score {
            self.score = Some(score);
        }
        if let Some(assigned_to) = patch.assigned_to {
            self.assigned_to = Some(assigned_to);
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = Some(due_date);
        }
        if let Some(status) = patch.status {
            self.transition_to(status)?;
        }

        self.updated_at = Utc::now();
        self.check()
    }

    pub fn transition_to(&mut self, next: AssessmentStatus) -> Result<(), DomainError> {
        if self.status == next {
            return Ok(());
        }
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidStatusTransition {
                from: self.status,
                to: next,
            });
        }
        if next == AssessmentStatus::Completed {
            if self.score.is_none() {
                return Err(DomainError::ValidationError(
                    "A score is required to complete an assessment".to_string(),
                ));
            }
            self.completed_at = Some(Utc::now());
        }
        self.status = next;
        Ok(())
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        matches!(self.status, AssessmentStatus::Draft | AssessmentStatus::Active)
            && self.due_date.is_some_and(|due| due < now)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    fn check(&self) -> Result<(), DomainError> {
        self.validate()?;
        if !self.max_score.is_finite() {
            return Err(DomainError::ValidationError("Max score must be finite".to_string()));
        }
        if let Some(score) = self.score {
            if !score.is_finite() || score > self.max_score {
                return Err(DomainError::ValidationError(format!(
                    "Score must be between 0 and {}",
                    self.max_score
                )));
            }
        }
        Ok(())
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn draft() -> Assessment {
        Assessment::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            NewAssessment {
                title: "Quarterly safety review".to_string(),
                category: Some("  ".to_string()),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_new_defaults() {
        let a = draft();
        assert_eq!(a.status, AssessmentStatus::Draft);
        assert_eq!(a.max_score, DEFAULT_MAX_SCORE);
        assert_eq!(a.category, None);
        assert!(a.score.is_none());
    }

    #[test]
    fn test_new_rejects_non_initial_status_and_short_title() {
        let result = Assessment::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            NewAssessment {
                title: "Valid title".to_string(),
                status: Some(AssessmentStatus::Completed),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(DomainError::ValidationError(_))));

        let result = Assessment::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            NewAssessment { title: "ab".to_string(), ..Default::default() },
        );
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }

    #[test]
    fn test_transition_table() {
        use AssessmentStatus::*;
        assert!(Draft.can_transition_to(Active));
        assert!(Active.can_transition_to(Draft));
        assert!(Active.can_transition_to(Completed));
        assert!(Completed.can_transition_to(Archived));
        assert!(!Draft.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Active));
        for status in AssessmentStatus::ALL {
            assert!(!Archived.can_transition_to(status));
        }
    }

    #[test]
    fn test_complete_requires_score() {
        let mut a = draft();
        a.transition_to(AssessmentStatus::Active).unwrap();
        assert!(matches!(
            a.transition_to(AssessmentStatus::Completed),
            Err(DomainError::ValidationError(_))
        ));

        a.apply_patch(AssessmentPatch {
            score: Some(87.5),
            status: Some(AssessmentStatus::Completed),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(a.status, AssessmentStatus::Completed);
        assert!(a.completed_at.is_some());
    }

    #[test]
    fn test_invalid_transition() {
        let mut a = draft();
        let err = a.transition_to(AssessmentStatus::Completed).unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidStatusTransition {
                from: AssessmentStatus::Draft,
                to: AssessmentStatus::Completed
            }
        ));
        // Same status is a no-op
        assert!(a.transition_to(AssessmentStatus::Draft).is_ok());
    }

    #[test]
    fn test_score_bounds() {
        let mut a = draft();
        let result = a.apply_patch(AssessmentPatch {
            score: Some(120.0),
            ..Default::default()
        });
        assert!(matches!(result, Err(DomainError::ValidationError(_))));

        let mut a = draft();
        let result = a.apply_patch(AssessmentPatch {
            score: Some(-1.0),
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_archived_is_frozen() {
        let mut a = draft();
        a.transition_to(AssessmentStatus::Archived).unwrap();
        let result = a.apply_patch(AssessmentPatch {
            title: Some("Renamed assessment".into()),
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_overdue() {
        let now = Utc::now();
        let mut a = draft();
        assert!(!a.is_overdue(now));
        a.due_date = Some(now - Duration::days(1));
        assert!(a.is_overdue(now));
        a.transition_to(AssessmentStatus::Archived).unwrap();
        assert!(!a.is_overdue(now));
    }
}
