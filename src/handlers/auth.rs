use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    middleware::AuthUser,
    models::{
        ChangePasswordInput, LoginInput, ProfileResponse, RegisterInput, SetAvatarInput,
        UserResponse,
    },
    AppState,
};

pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state.auth_service.register(input).await?;

    Ok((StatusCode::CREATED, Json(UserResponse { user })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> AppResult<Json<UserResponse>> {
    let user = state.auth_service.login(input).await?;

    Ok(Json(UserResponse { user }))
}

pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<ProfileResponse>> {
    let user = state.auth_service.get_user(user_id).await?;

    Ok(Json(ProfileResponse::from_user(user, false)))
}

pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(input): Json<ChangePasswordInput>,
) -> AppResult<StatusCode> {
    state.auth_service.change_password(user_id, input).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_avatar(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(input): Json<SetAvatarInput>,
) -> AppResult<Json<Value>> {
    let user = state.auth_service.set_avatar(user_id, &input.avatar).await?;

    Ok(Json(json!({ "avatar": user.avatar })))
}

pub async fn delete_avatar(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<StatusCode> {
    state.auth_service.delete_avatar(user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn logout() -> Json<Value> {
    Json(json!({ "message": "Logged out successfully" }))
}
