use sqlx::{PgPool, Row};
use tracing::instrument;

use crate::models::{Follow, User};

#[derive(Clone)]
pub struct FollowRepository {
    pool: PgPool,
}

impl FollowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(name = "db.follow.create", skip(self))]
    pub async fn create(&self, user_id: i32, following_id: i32) -> Result<Follow, sqlx::Error> {
        sqlx::query_as::<_, Follow>(
            r#"
            INSERT INTO follows (user_id, following_id)
            VALUES ($1, $2)
            RETURNING id, user_id, following_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(following_id)
        .fetch_one(&self.pool)
        .await
    }

    #[instrument(name = "db.follow.delete", skip(self))]
    pub async fn delete(&self, user_id: i32, following_id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM follows WHERE user_id = $1 AND following_id = $2")
            .bind(user_id)
            .bind(following_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(name = "db.follow.exists", skip(self))]
    pub async fn exists(&self, user_id: i32, following_id: i32) -> Result<bool, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM follows WHERE user_id = $1 AND following_id = $2
            ) as exists
            "#,
        )
        .bind(user_id)
        .bind(following_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get::<bool, _>("exists"))
    }

    #[instrument(name = "db.follow.is_following_batch", skip(self, user_ids))]
    pub async fn is_following_batch(
        &self,
        user_id: i32,
        user_ids: &[i32],
    ) -> Result<Vec<i32>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT following_id
            FROM follows
            WHERE user_id = $1 AND following_id = ANY($2)
            "#,
        )
        .bind(user_id)
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(|r| r.get::<i32, _>("following_id")).collect())
    }

    /// Users the given user follows, in subscription order.
    #[instrument(name = "db.follow.list_following", skip(self))]
    pub async fn list_following(
        &self,
        user_id: i32,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT
                u.id, u.email, u.username, u.password_hash, u.first_name,
                u.last_name, u.avatar, u.created_at, u.updated_at
            FROM follows f
            JOIN users u ON u.id = f.following_id
            WHERE f.user_id = $1
            ORDER BY f.id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    #[instrument(name = "db.follow.count_following", skip(self))]
    pub async fn count_following(&self, user_id: i32) -> Result<i64, sqlx::Error> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM follows WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get::<i64, _>("count"))
    }

    /// Followers of the given author, for notification fan-out.
    #[instrument(name = "db.follow.follower_ids", skip(self))]
    pub async fn follower_ids(&self, following_id: i32) -> Result<Vec<i32>, sqlx::Error> {
        let rows = sqlx::query("SELECT user_id FROM follows WHERE following_id = $1")
            .bind(following_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(|r| r.get::<i32, _>("user_id")).collect())
    }
}
