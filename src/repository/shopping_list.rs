use sqlx::{PgPool, Row};
use tracing::instrument;

use crate::models::{ShoppingLine, ShoppingList};

#[derive(Clone)]
pub struct ShoppingListRepository {
    pool: PgPool,
}

impl ShoppingListRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Each user owns at most one shopping list; it is created lazily on
    /// first use. The no-op upsert makes creation race-safe under the
    /// unique constraint.
    #[instrument(name = "db.shopping_list.get_or_create", skip(self))]
    pub async fn get_or_create(&self, user_id: i32) -> Result<ShoppingList, sqlx::Error> {
        sqlx::query_as::<_, ShoppingList>(
            r#"
            INSERT INTO shopping_lists (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE SET user_id = $1
            RETURNING id, user_id, created_at
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
    }

    #[instrument(name = "db.shopping_list.add_recipe", skip(self))]
    pub async fn add_recipe(&self, shopping_list_id: i32, recipe_id: i32) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO shopping_list_recipes (shopping_list_id, recipe_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(shopping_list_id)
        .bind(recipe_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(name = "db.shopping_list.remove_recipe", skip(self))]
    pub async fn remove_recipe(
        &self,
        shopping_list_id: i32,
        recipe_id: i32,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM shopping_list_recipes WHERE shopping_list_id = $1 AND recipe_id = $2",
        )
        .bind(shopping_list_id)
        .bind(recipe_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(name = "db.shopping_list.contains", skip(self))]
    pub async fn contains(&self, shopping_list_id: i32, recipe_id: i32) -> Result<bool, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM shopping_list_recipes
                WHERE shopping_list_id = $1 AND recipe_id = $2
            ) as exists
            "#,
        )
        .bind(shopping_list_id)
        .bind(recipe_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get::<bool, _>("exists"))
    }

    #[instrument(name = "db.shopping_list.in_cart_batch", skip(self, recipe_ids))]
    pub async fn in_cart_batch(
        &self,
        user_id: i32,
        recipe_ids: &[i32],
    ) -> Result<Vec<i32>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT slr.recipe_id
            FROM shopping_list_recipes slr
            JOIN shopping_lists sl ON sl.id = slr.shopping_list_id
            WHERE sl.user_id = $1 AND slr.recipe_id = ANY($2)
            "#,
        )
        .bind(user_id)
        .bind(recipe_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(|r| r.get::<i32, _>("recipe_id")).collect())
    }

    /// Every (ingredient, amount) pair across the user's queued recipes,
    /// in cart insertion order then line order. The deterministic ordering
    /// is what makes aggregation output reproducible.
    #[instrument(name = "db.shopping_list.lines", skip(self))]
    pub async fn shopping_lines(&self, user_id: i32) -> Result<Vec<ShoppingLine>, sqlx::Error> {
        sqlx::query_as::<_, ShoppingLine>(
            r#"
            SELECT ri.ingredient_id, i.name, i.measurement_unit, ri.amount
            FROM shopping_lists sl
            JOIN shopping_list_recipes slr ON slr.shopping_list_id = sl.id
            JOIN recipe_ingredients ri ON ri.recipe_id = slr.recipe_id
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE sl.user_id = $1
            ORDER BY slr.created_at, slr.recipe_id, ri.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }
}
