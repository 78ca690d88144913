use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{Ingredient, ListIngredientsQuery, Tag},
    AppState,
};

pub async fn list_tags(State(state): State<AppState>) -> AppResult<Json<Vec<Tag>>> {
    let tags = state.catalog_service.list_tags().await?;

    Ok(Json(tags))
}

pub async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Tag>> {
    let tag = state.catalog_service.get_tag(id).await?;

    Ok(Json(tag))
}

pub async fn list_ingredients(
    State(state): State<AppState>,
    Query(query): Query<ListIngredientsQuery>,
) -> AppResult<Json<Vec<Ingredient>>> {
    let ingredients = state.catalog_service.list_ingredients(query).await?;

    Ok(Json(ingredients))
}

pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Ingredient>> {
    let ingredient = state.catalog_service.get_ingredient(id).await?;

    Ok(Json(ingredient))
}
