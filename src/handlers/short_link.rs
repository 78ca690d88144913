use axum::{
    extract::{Path, State},
    http::{header::LOCATION, StatusCode},
    response::{IntoResponse, Response},
};

use crate::{error::AppResult, AppState};

/// `GET /r/{short_id}` — 302 redirect to the recipe's canonical URL.
pub async fn redirect_short_link(
    State(state): State<AppState>,
    Path(short_id): Path<String>,
) -> AppResult<Response> {
    let location = state.recipe_service.resolve_short_link(&short_id).await?;

    Ok((StatusCode::FOUND, [(LOCATION, location)]).into_response())
}
