use sqlx::{PgPool, Row};
use tracing::instrument;

use crate::models::User;

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(name = "db.user.create", skip(self, password_hash))]
    pub async fn create(
        &self,
        email: &str,
        username: &str,
        password_hash: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, username, password_hash, first_name, last_name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, username, password_hash, first_name, last_name, avatar, created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(username)
        .bind(password_hash)
        .bind(first_name)
        .bind(last_name)
        .fetch_one(&self.pool)
        .await
    }

    #[instrument(name = "db.user.find_by_email", skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, password_hash, first_name, last_name, avatar, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    #[instrument(name = "db.user.find_by_id", skip(self))]
    pub async fn find_by_id(&self, id: i32) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, password_hash, first_name, last_name, avatar, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    #[instrument(name = "db.user.exists_by_email", skip(self))]
    pub async fn exists_by_email(&self, email: &str) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1) as exists")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get::<bool, _>("exists"))
    }

    #[instrument(name = "db.user.exists_by_username", skip(self))]
    pub async fn exists_by_username(&self, username: &str) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1) as exists")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get::<bool, _>("exists"))
    }

    #[instrument(name = "db.user.list", skip(self))]
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, password_hash, first_name, last_name, avatar, created_at, updated_at
            FROM users
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    #[instrument(name = "db.user.count", skip(self))]
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get::<i64, _>("count"))
    }

    #[instrument(name = "db.user.update_password", skip(self, password_hash))]
    pub async fn update_password(&self, id: i32, password_hash: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    #[instrument(name = "db.user.update_avatar", skip(self, avatar))]
    pub async fn update_avatar(&self, id: i32, avatar: &str) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET avatar = $2
            WHERE id = $1
            RETURNING id, email, username, password_hash, first_name, last_name, avatar, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(avatar)
        .fetch_one(&self.pool)
        .await
    }
}
