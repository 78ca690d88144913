use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    middleware::{AuthUser, OptionalAuthUser},
    models::{
        FollowDetailDto, ListUsersQuery, ProfileResponse, SubscriptionsQuery, SubscriptionsResponse,
        UsersResponse,
    },
    AppState,
};

pub async fn list_users(
    State(state): State<AppState>,
    OptionalAuthUser(viewer_id): OptionalAuthUser,
    Query(query): Query<ListUsersQuery>,
) -> AppResult<Json<UsersResponse>> {
    let response = state.user_service.list(query, viewer_id).await?;

    Ok(Json(response))
}

pub async fn get_profile(
    State(state): State<AppState>,
    OptionalAuthUser(viewer_id): OptionalAuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ProfileResponse>> {
    let response = state.user_service.profile(id, viewer_id).await?;

    Ok(Json(response))
}

pub async fn subscribe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i32>,
    Query(query): Query<SubscriptionsQuery>,
) -> AppResult<(StatusCode, Json<FollowDetailDto>)> {
    let response = state
        .user_service
        .subscribe(user_id, id, query.recipes_limit)
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn unsubscribe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.user_service.unsubscribe(user_id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn subscriptions(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<SubscriptionsQuery>,
) -> AppResult<Json<SubscriptionsResponse>> {
    let response = state.user_service.subscriptions(user_id, query).await?;

    Ok(Json(response))
}
