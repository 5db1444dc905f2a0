use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use assessly_core::Profile;
use assessly_shared::Page;

use crate::dto::{CreateUserRequest, UpdateUserRequest, UserListQuery};
use crate::extract::{ApiPath, ValidatedJson, ValidatedQuery};
use crate::middleware::OrgScope;
use crate::response::ApiResult;
use crate::state::AppState;

pub async fn list_users(
    State(state): State<AppState>,
    OrgScope(scope): OrgScope,
    ValidatedQuery(query): ValidatedQuery<UserListQuery>,
) -> ApiResult<Json<Page<Profile>>> {
    let page = state
        .users
        .list_users(&scope, &query.filter(), query.pagination())
        .await?;
    Ok(Json(page))
}

pub async fn create_user(
    State(state): State<AppState>,
    OrgScope(scope): OrgScope,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<Profile>)> {
    let profile = state.users.create_user(&scope, req.into()).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn get_user(
    State(state): State<AppState>,
    OrgScope(scope): OrgScope,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Profile>> {
    Ok(Json(state.users.get_user(&scope, &id).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    OrgScope(scope): OrgScope,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<Json<Profile>> {
    Ok(Json(state.users.update_user(&scope, &id, req.into()).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    OrgScope(scope): OrgScope,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.users.delete_user(&scope, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
