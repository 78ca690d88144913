use axum::{
    extract::{Path, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::Query;

use crate::{
    error::AppResult,
    middleware::{AuthUser, OptionalAuthUser},
    models::{
        CreateRecipeInput, ListRecipesQuery, RecipeResponse, RecipesResponse, ShortLinkResponse,
        ShortRecipeDto,
    },
    AppState,
};

pub async fn create_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(input): Json<CreateRecipeInput>,
) -> AppResult<(StatusCode, Json<RecipeResponse>)> {
    let response = state.recipe_service.create(user_id, input).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_recipe(
    State(state): State<AppState>,
    OptionalAuthUser(viewer_id): OptionalAuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<RecipeResponse>> {
    let response = state.recipe_service.get(id, viewer_id).await?;

    Ok(Json(response))
}

pub async fn list_recipes(
    State(state): State<AppState>,
    OptionalAuthUser(viewer_id): OptionalAuthUser,
    Query(query): Query<ListRecipesQuery>,
) -> AppResult<Json<RecipesResponse>> {
    let response = state.recipe_service.list(query, viewer_id).await?;

    Ok(Json(response))
}

pub async fn update_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i32>,
    Json(input): Json<CreateRecipeInput>,
) -> AppResult<Json<RecipeResponse>> {
    let response = state.recipe_service.update(id, user_id, input).await?;

    Ok(Json(response))
}

pub async fn delete_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.recipe_service.delete(id, user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn favorite_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i32>,
) -> AppResult<(StatusCode, Json<ShortRecipeDto>)> {
    let response = state.recipe_service.favorite(id, user_id).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn unfavorite_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.recipe_service.unfavorite(id, user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_to_shopping_cart(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i32>,
) -> AppResult<(StatusCode, Json<ShortRecipeDto>)> {
    let response = state.shopping_service.add_recipe(user_id, id).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn remove_from_shopping_cart(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.shopping_service.remove_recipe(user_id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Streams the aggregated shopping list as a downloadable text document.
pub async fn download_shopping_cart(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Response> {
    let document = state.shopping_service.download(user_id).await?;

    Ok((
        [
            (CONTENT_TYPE, "text/plain; charset=utf-8"),
            (
                CONTENT_DISPOSITION,
                "attachment; filename=\"shopping_list.txt\"",
            ),
        ],
        document,
    )
        .into_response())
}

pub async fn get_short_link(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ShortLinkResponse>> {
    let response = state.recipe_service.get_short_link(id).await?;

    Ok(Json(response))
}
