use sqlx::{PgPool, Row};
use tracing::instrument;

use crate::models::Ingredient;

#[derive(Clone)]
pub struct IngredientRepository {
    pool: PgPool,
}

impl IngredientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(name = "db.ingredient.list", skip(self))]
    pub async fn list(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>, sqlx::Error> {
        if let Some(prefix) = name_prefix {
            sqlx::query_as::<_, Ingredient>(
                r#"
                SELECT id, name, measurement_unit
                FROM ingredients
                WHERE name LIKE $1 || '%'
                ORDER BY name
                "#,
            )
            .bind(prefix)
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, Ingredient>(
                "SELECT id, name, measurement_unit FROM ingredients ORDER BY name",
            )
            .fetch_all(&self.pool)
            .await
        }
    }

    #[instrument(name = "db.ingredient.find_by_id", skip(self))]
    pub async fn find_by_id(&self, id: i32) -> Result<Option<Ingredient>, sqlx::Error> {
        sqlx::query_as::<_, Ingredient>(
            "SELECT id, name, measurement_unit FROM ingredients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    #[instrument(name = "db.ingredient.existing_ids", skip(self, ids))]
    pub async fn existing_ids(&self, ids: &[i32]) -> Result<Vec<i32>, sqlx::Error> {
        let rows = sqlx::query("SELECT id FROM ingredients WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(|r| r.get::<i32, _>("id")).collect())
    }
}
