use sqlx::PgPool;
use tracing::instrument;

use crate::models::Tag;

#[derive(Clone)]
pub struct TagRepository {
    pool: PgPool,
}

impl TagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(name = "db.tag.list", skip(self))]
    pub async fn list(&self) -> Result<Vec<Tag>, sqlx::Error> {
        sqlx::query_as::<_, Tag>("SELECT id, name, slug FROM tags ORDER BY id")
            .fetch_all(&self.pool)
            .await
    }

    #[instrument(name = "db.tag.find_by_id", skip(self))]
    pub async fn find_by_id(&self, id: i32) -> Result<Option<Tag>, sqlx::Error> {
        sqlx::query_as::<_, Tag>("SELECT id, name, slug FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    #[instrument(name = "db.tag.find_by_ids", skip(self, ids))]
    pub async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Tag>, sqlx::Error> {
        sqlx::query_as::<_, Tag>("SELECT id, name, slug FROM tags WHERE id = ANY($1) ORDER BY id")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
    }
}
