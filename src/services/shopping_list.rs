use std::collections::HashMap;

use serde::Serialize;
use tracing::instrument;

use crate::{
    error::{AppError, AppResult},
    models::{ShoppingLine, ShortRecipeDto},
    repository::{RecipeRepository, ShoppingListRepository},
    telemetry::{CART_RECIPES_ADDED, CART_RECIPES_REMOVED, SHOPPING_LISTS_EXPORTED},
};

const EXPORT_HEADER: &str = "Shopping list:";

/// Grouping identity for aggregation. Two lines merge only when id, name
/// and unit all agree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct IngredientKey {
    id: i32,
    name: String,
    measurement_unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedIngredient {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

/// Sums per-ingredient amounts across every line of a shopping list.
///
/// Output entries keep the order in which their identity first appeared in
/// the input, so an unchanged cart always aggregates to the same sequence.
/// No unit conversion is attempted; amounts widen to i64 so summation
/// cannot overflow.
pub fn aggregate_ingredients(lines: &[ShoppingLine]) -> Vec<AggregatedIngredient> {
    let mut index: HashMap<IngredientKey, usize> = HashMap::new();
    let mut totals: Vec<AggregatedIngredient> = Vec::new();

    for line in lines {
        let key = IngredientKey {
            id: line.ingredient_id,
            name: line.name.clone(),
            measurement_unit: line.measurement_unit.clone(),
        };
        match index.get(&key) {
            Some(&at) => totals[at].amount += i64::from(line.amount),
            None => {
                index.insert(key, totals.len());
                totals.push(AggregatedIngredient {
                    id: line.ingredient_id,
                    name: line.name.clone(),
                    measurement_unit: line.measurement_unit.clone(),
                    amount: i64::from(line.amount),
                });
            }
        }
    }

    // One ingredient id recorded under two units is a data inconsistency.
    // Both entries are kept; flag it instead of picking a unit.
    let mut units_by_id: HashMap<i32, &str> = HashMap::new();
    for entry in &totals {
        if let Some(other) = units_by_id.insert(entry.id, &entry.measurement_unit) {
            if other != entry.measurement_unit {
                tracing::warn!(
                    ingredient_id = entry.id,
                    unit_a = other,
                    unit_b = %entry.measurement_unit,
                    "Ingredient recorded under conflicting measurement units"
                );
            }
        }
    }

    totals
}

/// Renders the aggregate as the downloadable plain-text document: a fixed
/// header, a blank line, then one line per ingredient in aggregate order.
pub fn render_shopping_list(items: &[AggregatedIngredient]) -> String {
    let mut out = String::from(EXPORT_HEADER);
    out.push_str("\n\n");
    for item in items {
        out.push_str(&format!(
            "{} — {} {}\n",
            item.name, item.amount, item.measurement_unit
        ));
    }
    out
}

#[derive(Clone)]
pub struct ShoppingListService {
    shopping_repo: ShoppingListRepository,
    recipe_repo: RecipeRepository,
}

impl ShoppingListService {
    pub fn new(shopping_repo: ShoppingListRepository, recipe_repo: RecipeRepository) -> Self {
        Self {
            shopping_repo,
            recipe_repo,
        }
    }

    #[instrument(name = "shopping_list.add_recipe", skip(self))]
    pub async fn add_recipe(&self, user_id: i32, recipe_id: i32) -> AppResult<ShortRecipeDto> {
        let recipe = self
            .recipe_repo
            .find_plain(recipe_id)
            .await?
            .ok_or(AppError::NotFound("Recipe not found".to_string()))?;

        let list = self.shopping_repo.get_or_create(user_id).await?;

        if self.shopping_repo.contains(list.id, recipe.id).await? {
            return Err(AppError::Validation(
                "Recipe is already in the shopping list".to_string(),
            ));
        }

        self.shopping_repo
            .add_recipe(list.id, recipe.id)
            .await
            .map_err(|e| AppError::conflict_on_unique(e, "Recipe is already in the shopping list"))?;

        CART_RECIPES_ADDED.add(1, &[]);

        tracing::info!(user_id, recipe_id, "Recipe added to shopping list");

        Ok(ShortRecipeDto::from(recipe))
    }

    #[instrument(name = "shopping_list.remove_recipe", skip(self))]
    pub async fn remove_recipe(&self, user_id: i32, recipe_id: i32) -> AppResult<()> {
        self.recipe_repo
            .find_plain(recipe_id)
            .await?
            .ok_or(AppError::NotFound("Recipe not found".to_string()))?;

        let list = self.shopping_repo.get_or_create(user_id).await?;

        let removed = self.shopping_repo.remove_recipe(list.id, recipe_id).await?;
        if !removed {
            return Err(AppError::Validation(
                "Recipe is not in the shopping list".to_string(),
            ));
        }

        CART_RECIPES_REMOVED.add(1, &[]);

        tracing::info!(user_id, recipe_id, "Recipe removed from shopping list");

        Ok(())
    }

    /// Aggregates the user's cart and renders the downloadable document.
    /// An empty or never-created cart yields a header-only document.
    #[instrument(name = "shopping_list.download", skip(self))]
    pub async fn download(&self, user_id: i32) -> AppResult<String> {
        let lines = self.shopping_repo.shopping_lines(user_id).await?;
        let aggregate = aggregate_ingredients(&lines);
        let document = render_shopping_list(&aggregate);

        SHOPPING_LISTS_EXPORTED.add(1, &[]);

        tracing::info!(
            user_id,
            lines = lines.len(),
            distinct = aggregate.len(),
            "Shopping list exported"
        );

        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: i32, name: &str, unit: &str, amount: i32) -> ShoppingLine {
        ShoppingLine {
            ingredient_id: id,
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            amount,
        }
    }

    #[test]
    fn test_aggregate_empty_list_is_empty() {
        assert!(aggregate_ingredients(&[]).is_empty());
    }

    #[test]
    fn test_aggregate_single_recipe_passes_through() {
        let lines = vec![line(1, "flour", "g", 500), line(2, "sugar", "g", 200)];

        let result = aggregate_ingredients(&lines);

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].name, "flour");
        assert_eq!(result[0].amount, 500);
        assert_eq!(result[1].name, "sugar");
        assert_eq!(result[1].amount, 200);
    }

    #[test]
    fn test_aggregate_sums_same_ingredient_across_recipes() {
        let lines = vec![
            line(5, "egg", "pcs", 2),
            line(1, "flour", "g", 500),
            line(5, "egg", "pcs", 3),
        ];

        let result = aggregate_ingredients(&lines);

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, 5);
        assert_eq!(result[0].amount, 5);
        assert_eq!(result[1].id, 1);
        assert_eq!(result[1].amount, 500);
    }

    #[test]
    fn test_aggregate_total_equals_sum_of_all_lines() {
        let lines = vec![
            line(3, "milk", "ml", 250),
            line(3, "milk", "ml", 100),
            line(3, "milk", "ml", 50),
        ];

        let result = aggregate_ingredients(&lines);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].amount, 250 + 100 + 50);
    }

    #[test]
    fn test_aggregate_preserves_first_seen_order() {
        let lines = vec![
            line(9, "salt", "g", 5),
            line(4, "butter", "g", 100),
            line(9, "salt", "g", 3),
            line(7, "onion", "pcs", 1),
        ];

        let ids: Vec<i32> = aggregate_ingredients(&lines).iter().map(|e| e.id).collect();

        assert_eq!(ids, vec![9, 4, 7]);
    }

    #[test]
    fn test_aggregate_keeps_conflicting_units_separate() {
        let lines = vec![line(5, "egg", "pcs", 2), line(5, "egg", "g", 100)];

        let result = aggregate_ingredients(&lines);

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].amount, 2);
        assert_eq!(result[1].amount, 100);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let lines = vec![
            line(5, "egg", "pcs", 2),
            line(1, "flour", "g", 500),
            line(5, "egg", "pcs", 3),
        ];

        let first = render_shopping_list(&aggregate_ingredients(&lines));
        let second = render_shopping_list(&aggregate_ingredients(&lines));

        assert_eq!(first, second);
    }

    #[test]
    fn test_render_empty_aggregate_is_header_only() {
        assert_eq!(render_shopping_list(&[]), "Shopping list:\n\n");
    }

    #[test]
    fn test_render_line_format() {
        let lines = vec![line(5, "egg", "pcs", 2), line(5, "egg", "pcs", 3)];
        let aggregate = aggregate_ingredients(&lines);

        let document = render_shopping_list(&aggregate);

        assert_eq!(document, "Shopping list:\n\negg — 5 pcs\n");
    }

    #[test]
    fn test_render_keeps_aggregate_order() {
        let aggregate = vec![
            AggregatedIngredient {
                id: 1,
                name: "flour".to_string(),
                measurement_unit: "g".to_string(),
                amount: 500,
            },
            AggregatedIngredient {
                id: 2,
                name: "sugar".to_string(),
                measurement_unit: "g".to_string(),
                amount: 200,
            },
        ];

        let document = render_shopping_list(&aggregate);
        let body: Vec<&str> = document.lines().skip(2).collect();

        assert_eq!(body, vec!["flour — 500 g", "sugar — 200 g"]);
    }
}
