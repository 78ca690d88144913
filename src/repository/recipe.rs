use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use sqlx::FromRow;
use tracing::instrument;

use crate::models::{
    IngredientAmountInput, ListRecipesQuery, Recipe, RecipeWithAuthor,
};

#[derive(Debug, Clone, FromRow)]
pub struct RecipeIngredientRow {
    pub recipe_id: i32,
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

#[derive(Debug, Clone, FromRow)]
pub struct RecipeTagRow {
    pub recipe_id: i32,
    pub id: i32,
    pub name: String,
    pub slug: String,
}

#[derive(Clone)]
pub struct RecipeRepository {
    pool: PgPool,
}

impl RecipeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(name = "db.recipe.create", skip(self, image, text))]
    pub async fn create(
        &self,
        author_id: i32,
        name: &str,
        image: &str,
        text: &str,
        cooking_time: i32,
        short_id: &str,
    ) -> Result<Recipe, sqlx::Error> {
        sqlx::query_as::<_, Recipe>(
            r#"
            INSERT INTO recipes (author_id, name, image, text, cooking_time, short_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, author_id, name, image, text, cooking_time, short_id, created_at, updated_at
            "#,
        )
        .bind(author_id)
        .bind(name)
        .bind(image)
        .bind(text)
        .bind(cooking_time)
        .bind(short_id)
        .fetch_one(&self.pool)
        .await
    }

    #[instrument(name = "db.recipe.find_by_id", skip(self))]
    pub async fn find_by_id(&self, id: i32) -> Result<Option<RecipeWithAuthor>, sqlx::Error> {
        sqlx::query_as::<_, RecipeWithAuthor>(
            r#"
            SELECT
                r.id, r.author_id, r.name, r.image, r.text, r.cooking_time,
                r.short_id, r.created_at, r.updated_at,
                u.email as author_email, u.username as author_username,
                u.first_name as author_first_name, u.last_name as author_last_name,
                u.avatar as author_avatar
            FROM recipes r
            JOIN users u ON r.author_id = u.id
            WHERE r.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    #[instrument(name = "db.recipe.find_plain", skip(self))]
    pub async fn find_plain(&self, id: i32) -> Result<Option<Recipe>, sqlx::Error> {
        sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, author_id, name, image, text, cooking_time, short_id, created_at, updated_at
            FROM recipes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    #[instrument(name = "db.recipe.find_by_short_id", skip(self))]
    pub async fn find_by_short_id(&self, short_id: &str) -> Result<Option<Recipe>, sqlx::Error> {
        sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, author_id, name, image, text, cooking_time, short_id, created_at, updated_at
            FROM recipes
            WHERE short_id = $1
            "#,
        )
        .bind(short_id)
        .fetch_optional(&self.pool)
        .await
    }

    #[instrument(name = "db.recipe.short_id_exists", skip(self))]
    pub async fn short_id_exists(&self, short_id: &str) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM recipes WHERE short_id = $1) as exists")
            .bind(short_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get::<bool, _>("exists"))
    }

    #[instrument(name = "db.recipe.list", skip(self, query))]
    pub async fn list(
        &self,
        query: &ListRecipesQuery,
        viewer_id: Option<i32>,
    ) -> Result<Vec<RecipeWithAuthor>, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new(
            r#"
            SELECT
                r.id, r.author_id, r.name, r.image, r.text, r.cooking_time,
                r.short_id, r.created_at, r.updated_at,
                u.email as author_email, u.username as author_username,
                u.first_name as author_first_name, u.last_name as author_last_name,
                u.avatar as author_avatar
            FROM recipes r
            JOIN users u ON r.author_id = u.id
            WHERE TRUE
            "#,
        );
        push_filters(&mut builder, query, viewer_id);
        builder.push(" ORDER BY r.id DESC LIMIT ");
        builder.push_bind(query.limit);
        builder.push(" OFFSET ");
        builder.push_bind(query.offset);

        builder
            .build_query_as::<RecipeWithAuthor>()
            .fetch_all(&self.pool)
            .await
    }

    #[instrument(name = "db.recipe.count", skip(self, query))]
    pub async fn count(
        &self,
        query: &ListRecipesQuery,
        viewer_id: Option<i32>,
    ) -> Result<i64, sqlx::Error> {
        let mut builder =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM recipes r WHERE TRUE");
        push_filters(&mut builder, query, viewer_id);

        let row = builder.build().fetch_one(&self.pool).await?;

        Ok(row.get::<i64, _>(0))
    }

    #[instrument(name = "db.recipe.list_by_author", skip(self))]
    pub async fn list_by_author(
        &self,
        author_id: i32,
        limit: i64,
    ) -> Result<Vec<Recipe>, sqlx::Error> {
        sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, author_id, name, image, text, cooking_time, short_id, created_at, updated_at
            FROM recipes
            WHERE author_id = $1
            ORDER BY id DESC
            LIMIT $2
            "#,
        )
        .bind(author_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    #[instrument(name = "db.recipe.count_by_author", skip(self))]
    pub async fn count_by_author(&self, author_id: i32) -> Result<i64, sqlx::Error> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM recipes WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get::<i64, _>("count"))
    }

    #[instrument(name = "db.recipe.update", skip(self, image, text))]
    pub async fn update(
        &self,
        id: i32,
        name: &str,
        image: &str,
        text: &str,
        cooking_time: i32,
    ) -> Result<Recipe, sqlx::Error> {
        sqlx::query_as::<_, Recipe>(
            r#"
            UPDATE recipes
            SET name = $2, image = $3, text = $4, cooking_time = $5
            WHERE id = $1
            RETURNING id, author_id, name, image, text, cooking_time, short_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(image)
        .bind(text)
        .bind(cooking_time)
        .fetch_one(&self.pool)
        .await
    }

    #[instrument(name = "db.recipe.delete", skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Replaces the recipe's ingredient set wholesale. Write semantics only;
    /// merging is never attempted.
    #[instrument(name = "db.recipe.replace_ingredients", skip(self, items))]
    pub async fn replace_ingredients(
        &self,
        recipe_id: i32,
        items: &[IngredientAmountInput],
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&mut *tx)
            .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(recipe_id)
            .bind(item.id)
            .bind(item.amount)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await
    }

    #[instrument(name = "db.recipe.replace_tags", skip(self, tag_ids))]
    pub async fn replace_tags(&self, recipe_id: i32, tag_ids: &[i32]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&mut *tx)
            .await?;

        for tag_id in tag_ids {
            sqlx::query("INSERT INTO recipe_tags (recipe_id, tag_id) VALUES ($1, $2)")
                .bind(recipe_id)
                .bind(tag_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await
    }

    #[instrument(name = "db.recipe.ingredients_for", skip(self, recipe_ids))]
    pub async fn ingredients_for(
        &self,
        recipe_ids: &[i32],
    ) -> Result<Vec<RecipeIngredientRow>, sqlx::Error> {
        sqlx::query_as::<_, RecipeIngredientRow>(
            r#"
            SELECT ri.recipe_id, i.id, i.name, i.measurement_unit, ri.amount
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = ANY($1)
            ORDER BY ri.recipe_id, ri.id
            "#,
        )
        .bind(recipe_ids)
        .fetch_all(&self.pool)
        .await
    }

    #[instrument(name = "db.recipe.tags_for", skip(self, recipe_ids))]
    pub async fn tags_for(&self, recipe_ids: &[i32]) -> Result<Vec<RecipeTagRow>, sqlx::Error> {
        sqlx::query_as::<_, RecipeTagRow>(
            r#"
            SELECT rt.recipe_id, t.id, t.name, t.slug
            FROM recipe_tags rt
            JOIN tags t ON t.id = rt.tag_id
            WHERE rt.recipe_id = ANY($1)
            ORDER BY rt.recipe_id, t.id
            "#,
        )
        .bind(recipe_ids)
        .fetch_all(&self.pool)
        .await
    }
}

fn push_filters(
    builder: &mut QueryBuilder<'_, Postgres>,
    query: &ListRecipesQuery,
    viewer_id: Option<i32>,
) {
    if let Some(author) = query.author {
        builder.push(" AND r.author_id = ");
        builder.push_bind(author);
    }

    if !query.tags.is_empty() {
        builder.push(
            r#" AND EXISTS (
                SELECT 1 FROM recipe_tags rt
                JOIN tags t ON t.id = rt.tag_id
                WHERE rt.recipe_id = r.id AND t.slug = ANY("#,
        );
        builder.push_bind(query.tags.clone());
        builder.push("))");
    }

    // Viewer-relative filters only apply to authenticated requests.
    if query.is_favorited == Some(true) {
        if let Some(viewer) = viewer_id {
            builder.push(
                " AND EXISTS (SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = ",
            );
            builder.push_bind(viewer);
            builder.push(")");
        }
    }

    if query.is_in_shopping_cart == Some(true) {
        if let Some(viewer) = viewer_id {
            builder.push(
                r#" AND EXISTS (
                    SELECT 1 FROM shopping_list_recipes slr
                    JOIN shopping_lists sl ON sl.id = slr.shopping_list_id
                    WHERE slr.recipe_id = r.id AND sl.user_id = "#,
            );
            builder.push_bind(viewer);
            builder.push(")");
        }
    }
}
