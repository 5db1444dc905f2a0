use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use assessly_core::{AssessmentFilter, AssessmentPatch, AssessmentStatus, NewAssessment};
use assessly_shared::Pagination;

#[derive(Debug, Default, Deserialize, Validate)]
pub struct AssessmentListQuery {
    #[validate(range(min = 1, message = "Page starts at 1"))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100, message = "per_page must be between 1 and 100"))]
    pub per_page: Option<u32>,
    pub status: Option<AssessmentStatus>,
    pub assigned_to: Option<Uuid>,
    #[validate(length(min = 1, max = 64))]
    pub category: Option<String>,
    #[validate(length(max = 100, message = "Search term too long"))]
    pub search: Option<String>,
}

impl AssessmentListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.per_page)
    }

    pub fn filter(&self) -> AssessmentFilter {
        AssessmentFilter {
            status: self.status,
            assigned_to: self.assigned_to,
            category: self.category.clone(),
            search: self.search.clone().filter(|s| !s.trim().is_empty()),
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct AssessmentStatsQuery {
    #[validate(length(min = 1, max = 64))]
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAssessmentRequest {
    #[validate(length(min = 3, max = 200, message = "Title must be between 3 and 200 characters"))]
    pub title: String,

    #[validate(length(max = 5000, message = "Description too long"))]
    pub description: Option<String>,

    #[validate(length(min = 1, max = 64, message = "Category must be between 1 and 64 characters"))]
    pub category: Option<String>,

    pub status: Option<AssessmentStatus>,

    #[validate(range(exclusive_min = 0.0, max = 1_000_000.0, message = "Max score must be positive"))]
    pub max_score: Option<f64>,

    pub assigned_to: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
}

impl From<CreateAssessmentRequest> for NewAssessment {
    fn from(req: CreateAssessmentRequest) -> Self {
        NewAssessment {
            title: req.title,
            description: req.description,
            category: req.category,
            status: req.status,
            max_score: req.max_score,
            assigned_to: req.assigned_to,
            due_date: req.due_date,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAssessmentRequest {
    #[validate(length(min = 3, max = 200, message = "Title must be between 3 and 200 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 5000, message = "Description too long"))]
    pub description: Option<String>,

    #[validate(length(max = 64, message = "Category must be at most 64 characters"))]
    pub category: Option<String>,

    pub status: Option<AssessmentStatus>,

    #[validate(range(min = 0.0, message = "Score cannot be negative"))]
    pub score: Option<f64>,

    #[validate(range(exclusive_min = 0.0, max = 1_000_000.0, message = "Max score must be positive"))]
    pub max_score: Option<f64>,

    pub assigned_to: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
}

impl From<UpdateAssessmentRequest> for AssessmentPatch {
    fn from(req: UpdateAssessmentRequest) -> Self {
        AssessmentPatch {
            title: req.title,
            description: req.description,
            category: req.category,
            status: req.status,
            score: req.score,
            max_score: req.max_score,
            assigned_to: req.assigned_to,
            due_date: req.due_date,
        }
    }
}
