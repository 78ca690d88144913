use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

use crate::{AppState, handlers};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health_check))
        .route("/api/register", post(handlers::register))
        .route("/api/login", post(handlers::login))
        .route("/api/logout", post(handlers::logout))
        .route("/api/user", get(handlers::me))
        .route("/api/user/password", put(handlers::change_password))
        .route("/api/user/avatar", put(handlers::set_avatar))
        .route("/api/user/avatar", delete(handlers::delete_avatar))
        .route("/api/users", get(handlers::list_users))
        .route("/api/users/{id}", get(handlers::get_profile))
        .route("/api/users/{id}/subscribe", post(handlers::subscribe))
        .route("/api/users/{id}/subscribe", delete(handlers::unsubscribe))
        .route("/api/subscriptions", get(handlers::subscriptions))
        .route("/api/tags", get(handlers::list_tags))
        .route("/api/tags/{id}", get(handlers::get_tag))
        .route("/api/ingredients", get(handlers::list_ingredients))
        .route("/api/ingredients/{id}", get(handlers::get_ingredient))
        .route("/api/recipes", get(handlers::list_recipes))
        .route("/api/recipes", post(handlers::create_recipe))
        .route(
            "/api/recipes/download_shopping_cart",
            get(handlers::download_shopping_cart),
        )
        .route("/api/recipes/{id}", get(handlers::get_recipe))
        .route("/api/recipes/{id}", patch(handlers::update_recipe))
        .route("/api/recipes/{id}", delete(handlers::delete_recipe))
        .route(
            "/api/recipes/{id}/favorite",
            post(handlers::favorite_recipe),
        )
        .route(
            "/api/recipes/{id}/favorite",
            delete(handlers::unfavorite_recipe),
        )
        .route(
            "/api/recipes/{id}/shopping_cart",
            post(handlers::add_to_shopping_cart),
        )
        .route(
            "/api/recipes/{id}/shopping_cart",
            delete(handlers::remove_from_shopping_cart),
        )
        .route("/api/recipes/{id}/get-link", get(handlers::get_short_link))
        .route("/r/{short_id}", get(handlers::redirect_short_link))
        .with_state(state)
}
