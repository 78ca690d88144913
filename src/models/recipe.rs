use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use super::{ProfileResponse, Tag};

pub const COOKING_TIME_MIN: i32 = 1;
pub const COOKING_TIME_MAX: i32 = 1440;
pub const INGREDIENT_AMOUNT_MIN: i32 = 1;
pub const INGREDIENT_AMOUNT_MAX: i32 = 32767;
pub const SHORT_ID_LEN: usize = 6;

#[derive(Debug, Clone, FromRow)]
pub struct Recipe {
    pub id: i32,
    pub author_id: i32,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub short_id: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct RecipeWithAuthor {
    pub id: i32,
    pub author_id: i32,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub short_id: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub author_email: String,
    pub author_username: String,
    pub author_first_name: String,
    pub author_last_name: String,
    pub author_avatar: String,
}

/// Ingredient line as read back from a recipe: the ingredient's identity
/// plus the per-recipe amount.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RecipeIngredientLine {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub recipe: RecipeDto,
}

#[derive(Debug, Serialize)]
pub struct RecipesResponse {
    pub recipes: Vec<RecipeDto>,
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub struct RecipeDto {
    pub id: i32,
    pub author: ProfileResponse,
    pub name: String,
    pub image: String,
    pub text: String,
    pub ingredients: Vec<RecipeIngredientLine>,
    pub tags: Vec<Tag>,
    pub cooking_time: i32,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// Compact recipe rendering used by favorites, the shopping cart, and
/// subscription previews.
#[derive(Debug, Serialize)]
pub struct ShortRecipeDto {
    pub id: i32,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl From<Recipe> for ShortRecipeDto {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name,
            image: recipe.image,
            cooking_time: recipe.cooking_time,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct IngredientAmountInput {
    pub id: i32,
    pub amount: i32,
}

/// Write payload for both create and update: a recipe's ingredient and tag
/// sets are always replaced wholesale, never merged.
#[derive(Debug, Deserialize)]
pub struct CreateRecipeInput {
    pub name: String,
    pub image: String,
    pub text: String,
    pub ingredients: Vec<IngredientAmountInput>,
    pub tags: Vec<i32>,
    pub cooking_time: i32,
}

#[derive(Debug, Deserialize)]
pub struct ListRecipesQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    pub author: Option<i32>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_favorited: Option<bool>,
    pub is_in_shopping_cart: Option<bool>,
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize)]
pub struct ShortLinkResponse {
    #[serde(rename = "short-link")]
    pub short_link: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn create_test_recipe() -> Recipe {
        Recipe {
            id: 7,
            author_id: 1,
            name: "Borscht".to_string(),
            image: "data:image/png;base64,xyz".to_string(),
            text: "Simmer for two hours.".to_string(),
            cooking_time: 120,
            short_id: "aB3dE9".to_string(),
            created_at: datetime!(2024-02-01 09:00:00 UTC),
            updated_at: datetime!(2024-02-01 09:00:00 UTC),
        }
    }

    #[test]
    fn test_short_recipe_dto_from_recipe() {
        let recipe = create_test_recipe();
        let dto = ShortRecipeDto::from(recipe.clone());

        assert_eq!(dto.id, recipe.id);
        assert_eq!(dto.name, recipe.name);
        assert_eq!(dto.cooking_time, recipe.cooking_time);
    }

    #[test]
    fn test_create_recipe_input_deserialization() {
        let json = r#"{
            "name": "Pancakes",
            "image": "data:image/png;base64,abc",
            "text": "Mix and fry.",
            "ingredients": [{"id": 3, "amount": 500}, {"id": 5, "amount": 2}],
            "tags": [1, 2],
            "cooking_time": 25
        }"#;
        let input: CreateRecipeInput =
            serde_json::from_str(json).expect("deserialization should succeed");

        assert_eq!(input.name, "Pancakes");
        assert_eq!(input.ingredients.len(), 2);
        assert_eq!(input.ingredients[1].id, 5);
        assert_eq!(input.ingredients[1].amount, 2);
        assert_eq!(input.tags, vec![1, 2]);
        assert_eq!(input.cooking_time, 25);
    }

    #[test]
    fn test_list_recipes_query_defaults() {
        let query: ListRecipesQuery =
            serde_json::from_str("{}").expect("deserialization should succeed");

        assert_eq!(query.limit, 20);
        assert_eq!(query.offset, 0);
        assert!(query.tags.is_empty());
        assert!(query.author.is_none());
        assert!(query.is_favorited.is_none());
    }

    #[test]
    fn test_short_link_response_uses_hyphenated_key() {
        let response = ShortLinkResponse {
            short_link: "http://localhost:8080/r/aB3dE9/".to_string(),
        };

        let json = serde_json::to_string(&response).expect("serialization should succeed");
        assert!(json.contains("\"short-link\""));
        assert!(!json.contains("short_link"));
    }
}
