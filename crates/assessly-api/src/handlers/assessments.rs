use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use assessly_core::{Assessment, AssessmentStats};
use assessly_shared::Page;

use crate::dto::{
    AssessmentListQuery, AssessmentStatsQuery, CreateAssessmentRequest, UpdateAssessmentRequest,
};
use crate::extract::{ApiPath, ValidatedJson, ValidatedQuery};
use crate::middleware::OrgScope;
use crate::response::ApiResult;
use crate::state::AppState;

pub async fn list_assessments(
    State(state): State<AppState>,
    OrgScope(scope): OrgScope,
    ValidatedQuery(query): ValidatedQuery<AssessmentListQuery>,
) -> ApiResult<Json<Page<Assessment>>> {
    let page = state
        .assessments
        .list_assessments(&scope, &query.filter(), query.pagination())
        .await?;
    Ok(Json(page))
}

pub async fn create_assessment(
    State(state): State<AppState>,
    OrgScope(scope): OrgScope,
    ValidatedJson(req): ValidatedJson<CreateAssessmentRequest>,
) -> ApiResult<(StatusCode, Json<Assessment>)> {
    let assessment = state.assessments.create_assessment(&scope, req.into()).await?;
    Ok((StatusCode::CREATED, Json(assessment)))
}

pub async fn assessment_stats(
    State(state): State<AppState>,
    OrgScope(scope): OrgScope,
    ValidatedQuery(query): ValidatedQuery<AssessmentStatsQuery>,
) -> ApiResult<Json<AssessmentStats>> {
    Ok(Json(state.assessments.status_counts(&scope, query.category).await?))
}

pub async fn get_assessment(
    State(state): State<AppState>,
    OrgScope(scope): OrgScope,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Assessment>> {
    Ok(Json(state.assessments.get_assessment(&scope, &id).await?))
}

pub async fn update_assessment(
    State(state): State<AppState>,
    OrgScope(scope): OrgScope,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateAssessmentRequest>,
) -> ApiResult<Json<Assessment>> {
    let assessment = state
        .assessments
        .update_assessment(&scope, &id, req.into())
        .await?;
    Ok(Json(assessment))
}

pub async fn delete_assessment(
    State(state): State<AppState>,
    OrgScope(scope): OrgScope,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.assessments.delete_assessment(&scope, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
