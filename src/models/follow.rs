use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use super::ShortRecipeDto;

#[derive(Debug, Clone, FromRow)]
pub struct Follow {
    pub id: i32,
    pub user_id: i32,
    pub following_id: i32,
    pub created_at: OffsetDateTime,
}

/// Followed author as rendered in the subscriptions feed: profile fields
/// plus a capped preview of their recipes.
#[derive(Debug, Serialize)]
pub struct FollowDetailDto {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: String,
    pub is_subscribed: bool,
    pub recipes: Vec<ShortRecipeDto>,
    pub recipes_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionsQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "default_recipes_limit")]
    pub recipes_limit: i64,
}

fn default_limit() -> i64 {
    20
}

fn default_recipes_limit() -> i64 {
    6
}

#[derive(Debug, Serialize)]
pub struct SubscriptionsResponse {
    pub subscriptions: Vec<FollowDetailDto>,
    pub total: i64,
}
