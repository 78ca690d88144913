use std::collections::{HashMap, HashSet};

use rand::{distributions::Alphanumeric, Rng};
use tracing::instrument;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    jobs::JobQueue,
    models::{
        CreateRecipeInput, ListRecipesQuery, ProfileResponse, RecipeDto, RecipeIngredientLine,
        RecipeResponse, RecipeWithAuthor, RecipesResponse, ShortLinkResponse, ShortRecipeDto, Tag,
        COOKING_TIME_MAX, COOKING_TIME_MIN, INGREDIENT_AMOUNT_MAX, INGREDIENT_AMOUNT_MIN,
        SHORT_ID_LEN,
    },
    repository::{
        FavoriteRepository, FollowRepository, IngredientRepository, RecipeIngredientRow,
        RecipeRepository, RecipeTagRow, ShoppingListRepository, TagRepository,
    },
    telemetry::{
        FAVORITES_ADDED, FAVORITES_REMOVED, RECIPES_CREATED, RECIPES_DELETED, RECIPES_UPDATED,
        SHORT_LINKS_RESOLVED,
    },
};

const SHORT_ID_MAX_ATTEMPTS: usize = 5;

#[derive(Clone)]
pub struct RecipeService {
    recipe_repo: RecipeRepository,
    tag_repo: TagRepository,
    ingredient_repo: IngredientRepository,
    favorite_repo: FavoriteRepository,
    shopping_repo: ShoppingListRepository,
    follow_repo: FollowRepository,
    job_queue: JobQueue,
    base_url: String,
}

impl RecipeService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        recipe_repo: RecipeRepository,
        tag_repo: TagRepository,
        ingredient_repo: IngredientRepository,
        favorite_repo: FavoriteRepository,
        shopping_repo: ShoppingListRepository,
        follow_repo: FollowRepository,
        job_queue: JobQueue,
        config: &Config,
    ) -> Self {
        Self {
            recipe_repo,
            tag_repo,
            ingredient_repo,
            favorite_repo,
            shopping_repo,
            follow_repo,
            job_queue,
            base_url: config.base_url.clone(),
        }
    }

    #[instrument(name = "recipe.create", skip(self, input), fields(author_id))]
    pub async fn create(&self, author_id: i32, input: CreateRecipeInput) -> AppResult<RecipeResponse> {
        validate_recipe_input(&input)?;
        self.check_references(&input).await?;

        // The unique index backs up the pre-check for the collision race.
        let mut short_id = generate_short_id();
        for _ in 1..SHORT_ID_MAX_ATTEMPTS {
            if !self.recipe_repo.short_id_exists(&short_id).await? {
                break;
            }
            short_id = generate_short_id();
        }

        let recipe = self
            .recipe_repo
            .create(
                author_id,
                input.name.trim(),
                &input.image,
                &input.text,
                input.cooking_time,
                &short_id,
            )
            .await
            .map_err(|e| AppError::conflict_on_unique(e, "Short link collision, retry"))?;

        self.recipe_repo
            .replace_ingredients(recipe.id, &input.ingredients)
            .await?;
        self.recipe_repo.replace_tags(recipe.id, &input.tags).await?;

        if let Err(e) = self
            .job_queue
            .enqueue_recipe_published(recipe.id, &recipe.name, author_id)
            .await
        {
            tracing::warn!(recipe_id = recipe.id, error = %e, "Failed to enqueue notification");
        }

        RECIPES_CREATED.add(1, &[]);

        tracing::info!(recipe_id = recipe.id, short_id = %recipe.short_id, "Recipe created");

        self.get(recipe.id, Some(author_id)).await
    }

    #[instrument(name = "recipe.get", skip(self))]
    pub async fn get(&self, id: i32, viewer_id: Option<i32>) -> AppResult<RecipeResponse> {
        let recipe = self
            .recipe_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Recipe not found".to_string()))?;

        let mut dtos = self.assemble(vec![recipe], viewer_id).await?;

        Ok(RecipeResponse {
            recipe: dtos.remove(0),
        })
    }

    #[instrument(name = "recipe.list", skip(self, query))]
    pub async fn list(
        &self,
        query: ListRecipesQuery,
        viewer_id: Option<i32>,
    ) -> AppResult<RecipesResponse> {
        let recipes = self.recipe_repo.list(&query, viewer_id).await?;
        let total = self.recipe_repo.count(&query, viewer_id).await?;

        let dtos = self.assemble(recipes, viewer_id).await?;

        Ok(RecipesResponse {
            recipes: dtos,
            total,
        })
    }

    #[instrument(name = "recipe.update", skip(self, input))]
    pub async fn update(
        &self,
        id: i32,
        user_id: i32,
        input: CreateRecipeInput,
    ) -> AppResult<RecipeResponse> {
        let recipe = self
            .recipe_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Recipe not found".to_string()))?;

        if recipe.author_id != user_id {
            return Err(AppError::Forbidden);
        }

        validate_recipe_input(&input)?;
        self.check_references(&input).await?;

        self.recipe_repo
            .update(
                recipe.id,
                input.name.trim(),
                &input.image,
                &input.text,
                input.cooking_time,
            )
            .await?;

        // Ingredient and tag sets are replaced, never merged.
        self.recipe_repo
            .replace_ingredients(recipe.id, &input.ingredients)
            .await?;
        self.recipe_repo.replace_tags(recipe.id, &input.tags).await?;

        RECIPES_UPDATED.add(1, &[]);

        tracing::info!(recipe_id = recipe.id, "Recipe updated");

        self.get(recipe.id, Some(user_id)).await
    }

    #[instrument(name = "recipe.delete", skip(self))]
    pub async fn delete(&self, id: i32, user_id: i32) -> AppResult<()> {
        let recipe = self
            .recipe_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Recipe not found".to_string()))?;

        if recipe.author_id != user_id {
            return Err(AppError::Forbidden);
        }

        self.recipe_repo.delete(recipe.id).await?;

        RECIPES_DELETED.add(1, &[]);

        tracing::info!(recipe_id = recipe.id, "Recipe deleted");

        Ok(())
    }

    #[instrument(name = "recipe.favorite", skip(self))]
    pub async fn favorite(&self, id: i32, user_id: i32) -> AppResult<ShortRecipeDto> {
        let recipe = self
            .recipe_repo
            .find_plain(id)
            .await?
            .ok_or(AppError::NotFound("Recipe not found".to_string()))?;

        if self.favorite_repo.exists(user_id, recipe.id).await? {
            return Err(AppError::Validation(
                "Recipe is already in favorites".to_string(),
            ));
        }

        self.favorite_repo
            .create(user_id, recipe.id)
            .await
            .map_err(|e| AppError::conflict_on_unique(e, "Recipe is already in favorites"))?;

        FAVORITES_ADDED.add(1, &[]);

        tracing::info!(recipe_id = recipe.id, user_id, "Recipe favorited");

        Ok(ShortRecipeDto::from(recipe))
    }

    #[instrument(name = "recipe.unfavorite", skip(self))]
    pub async fn unfavorite(&self, id: i32, user_id: i32) -> AppResult<()> {
        self.recipe_repo
            .find_plain(id)
            .await?
            .ok_or(AppError::NotFound("Recipe not found".to_string()))?;

        let removed = self.favorite_repo.delete(user_id, id).await?;
        if !removed {
            return Err(AppError::Validation(
                "Recipe is not in favorites".to_string(),
            ));
        }

        FAVORITES_REMOVED.add(1, &[]);

        tracing::info!(recipe_id = id, user_id, "Recipe unfavorited");

        Ok(())
    }

    #[instrument(name = "recipe.get_short_link", skip(self))]
    pub async fn get_short_link(&self, id: i32) -> AppResult<ShortLinkResponse> {
        let recipe = self
            .recipe_repo
            .find_plain(id)
            .await?
            .ok_or(AppError::NotFound("Recipe not found".to_string()))?;

        Ok(ShortLinkResponse {
            short_link: format!("{}/r/{}/", self.base_url, recipe.short_id),
        })
    }

    /// Resolves a short identifier to the recipe's canonical path.
    #[instrument(name = "recipe.resolve_short_link", skip(self))]
    pub async fn resolve_short_link(&self, short_id: &str) -> AppResult<String> {
        let recipe = self
            .recipe_repo
            .find_by_short_id(short_id)
            .await?
            .ok_or(AppError::NotFound("Recipe not found".to_string()))?;

        SHORT_LINKS_RESOLVED.add(1, &[]);

        Ok(format!("/recipes/{}/", recipe.id))
    }

    async fn check_references(&self, input: &CreateRecipeInput) -> AppResult<()> {
        let ingredient_ids: Vec<i32> = input.ingredients.iter().map(|i| i.id).collect();
        let existing = self.ingredient_repo.existing_ids(&ingredient_ids).await?;
        let existing: HashSet<i32> = existing.into_iter().collect();
        let missing: Vec<i32> = ingredient_ids
            .iter()
            .copied()
            .filter(|id| !existing.contains(id))
            .collect();
        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "Ingredients with ids {:?} do not exist",
                missing
            )));
        }

        let tags = self.tag_repo.find_by_ids(&input.tags).await?;
        if tags.len() != input.tags.len() {
            let found: HashSet<i32> = tags.iter().map(|t| t.id).collect();
            let missing: Vec<i32> = input
                .tags
                .iter()
                .copied()
                .filter(|id| !found.contains(id))
                .collect();
            return Err(AppError::Validation(format!(
                "Tags with ids {:?} do not exist",
                missing
            )));
        }

        Ok(())
    }

    /// Resolves ingredient lines, tags, and the viewer-relative flags for a
    /// page of recipes with one batch query per relation.
    async fn assemble(
        &self,
        recipes: Vec<RecipeWithAuthor>,
        viewer_id: Option<i32>,
    ) -> AppResult<Vec<RecipeDto>> {
        let recipe_ids: Vec<i32> = recipes.iter().map(|r| r.id).collect();
        let author_ids: Vec<i32> = recipes.iter().map(|r| r.author_id).collect();

        let ingredient_rows = self.recipe_repo.ingredients_for(&recipe_ids).await?;
        let tag_rows = self.recipe_repo.tags_for(&recipe_ids).await?;

        let (favorited, in_cart, following) = if let Some(viewer) = viewer_id {
            (
                self.favorite_repo
                    .is_favorited_batch(viewer, &recipe_ids)
                    .await?,
                self.shopping_repo.in_cart_batch(viewer, &recipe_ids).await?,
                self.follow_repo
                    .is_following_batch(viewer, &author_ids)
                    .await?,
            )
        } else {
            (vec![], vec![], vec![])
        };
        let favorited: HashSet<i32> = favorited.into_iter().collect();
        let in_cart: HashSet<i32> = in_cart.into_iter().collect();
        let following: HashSet<i32> = following.into_iter().collect();

        let mut ingredients_by_recipe: HashMap<i32, Vec<RecipeIngredientRow>> = HashMap::new();
        for row in ingredient_rows {
            ingredients_by_recipe.entry(row.recipe_id).or_default().push(row);
        }
        let mut tags_by_recipe: HashMap<i32, Vec<RecipeTagRow>> = HashMap::new();
        for row in tag_rows {
            tags_by_recipe.entry(row.recipe_id).or_default().push(row);
        }

        Ok(recipes
            .into_iter()
            .map(|recipe| {
                let ingredients = ingredients_by_recipe
                    .remove(&recipe.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|row| RecipeIngredientLine {
                        id: row.id,
                        name: row.name,
                        measurement_unit: row.measurement_unit,
                        amount: row.amount,
                    })
                    .collect();
                let tags = tags_by_recipe
                    .remove(&recipe.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|row| Tag {
                        id: row.id,
                        name: row.name,
                        slug: row.slug,
                    })
                    .collect();

                RecipeDto {
                    id: recipe.id,
                    author: ProfileResponse {
                        id: recipe.author_id,
                        email: recipe.author_email,
                        username: recipe.author_username,
                        first_name: recipe.author_first_name,
                        last_name: recipe.author_last_name,
                        avatar: recipe.author_avatar,
                        is_subscribed: following.contains(&recipe.author_id),
                    },
                    name: recipe.name,
                    image: recipe.image,
                    text: recipe.text,
                    ingredients,
                    tags,
                    cooking_time: recipe.cooking_time,
                    is_favorited: favorited.contains(&recipe.id),
                    is_in_shopping_cart: in_cart.contains(&recipe.id),
                }
            })
            .collect())
    }
}

pub fn generate_short_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SHORT_ID_LEN)
        .map(char::from)
        .collect()
}

fn validate_recipe_input(input: &CreateRecipeInput) -> AppResult<()> {
    if input.name.trim().is_empty() {
        return Err(AppError::Validation("Recipe name is required".to_string()));
    }
    if input.text.trim().is_empty() {
        return Err(AppError::Validation(
            "Recipe description is required".to_string(),
        ));
    }
    if input.image.is_empty() {
        return Err(AppError::Validation("Recipe image is required".to_string()));
    }
    if !(COOKING_TIME_MIN..=COOKING_TIME_MAX).contains(&input.cooking_time) {
        return Err(AppError::Validation(format!(
            "Cooking time must be between {} and {} minutes",
            COOKING_TIME_MIN, COOKING_TIME_MAX
        )));
    }

    if input.ingredients.is_empty() {
        return Err(AppError::Validation(
            "Add at least one ingredient".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for item in &input.ingredients {
        if !seen.insert(item.id) {
            return Err(AppError::Validation(
                "Ingredients must not repeat".to_string(),
            ));
        }
        if !(INGREDIENT_AMOUNT_MIN..=INGREDIENT_AMOUNT_MAX).contains(&item.amount) {
            return Err(AppError::Validation(format!(
                "Ingredient amount must be between {} and {}",
                INGREDIENT_AMOUNT_MIN, INGREDIENT_AMOUNT_MAX
            )));
        }
    }

    if input.tags.is_empty() {
        return Err(AppError::Validation("Add at least one tag".to_string()));
    }
    let unique_tags: HashSet<i32> = input.tags.iter().copied().collect();
    if unique_tags.len() != input.tags.len() {
        return Err(AppError::Validation("Tags must not repeat".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IngredientAmountInput;

    fn valid_input() -> CreateRecipeInput {
        CreateRecipeInput {
            name: "Pancakes".to_string(),
            image: "data:image/png;base64,abc".to_string(),
            text: "Mix and fry.".to_string(),
            ingredients: vec![
                IngredientAmountInput { id: 1, amount: 500 },
                IngredientAmountInput { id: 2, amount: 2 },
            ],
            tags: vec![1, 2],
            cooking_time: 25,
        }
    }

    #[test]
    fn test_generate_short_id_length() {
        assert_eq!(generate_short_id().len(), SHORT_ID_LEN);
    }

    #[test]
    fn test_generate_short_id_is_alphanumeric() {
        assert!(generate_short_id().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_short_id_varies() {
        let ids: HashSet<String> = (0..32).map(|_| generate_short_id()).collect();
        assert!(ids.len() > 1);
    }

    #[test]
    fn test_validate_accepts_valid_input() {
        assert!(validate_recipe_input(&valid_input()).is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_ingredients() {
        let mut input = valid_input();
        input.ingredients.clear();
        assert!(matches!(
            validate_recipe_input(&input),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_ingredients() {
        let mut input = valid_input();
        input.ingredients.push(IngredientAmountInput { id: 1, amount: 5 });
        assert!(matches!(
            validate_recipe_input(&input),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_amount() {
        let mut input = valid_input();
        input.ingredients[0].amount = 0;
        assert!(matches!(
            validate_recipe_input(&input),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_rejects_cooking_time_out_of_range() {
        let mut input = valid_input();
        input.cooking_time = 0;
        assert!(validate_recipe_input(&input).is_err());
        input.cooking_time = 1441;
        assert!(validate_recipe_input(&input).is_err());
        input.cooking_time = 1440;
        assert!(validate_recipe_input(&input).is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_tags() {
        let mut input = valid_input();
        input.tags = vec![1, 1];
        assert!(matches!(
            validate_recipe_input(&input),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_tags() {
        let mut input = valid_input();
        input.tags.clear();
        assert!(matches!(
            validate_recipe_input(&input),
            Err(AppError::Validation(_))
        ));
    }
}
