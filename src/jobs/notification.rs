use serde::Deserialize;
use tracing::instrument;

use super::queue::Job;
use crate::repository::FollowRepository;

#[derive(Debug, Deserialize)]
pub struct RecipePublishedPayload {
    pub recipe_id: i32,
    pub name: String,
    pub author_id: i32,
}

pub struct NotificationHandler;

impl NotificationHandler {
    /// Fans a new-recipe notification out to everyone following the author.
    #[instrument(name = "job.recipe_published.handle", skip(job, follow_repo), fields(job_id = job.id))]
    pub async fn handle(job: &Job, follow_repo: &FollowRepository) -> Result<(), anyhow::Error> {
        let payload: RecipePublishedPayload = serde_json::from_value(job.payload.clone())?;

        let followers = follow_repo.follower_ids(payload.author_id).await?;

        tracing::info!(
            recipe_id = payload.recipe_id,
            name = %payload.name,
            followers = followers.len(),
            "Processing notifications for new recipe"
        );

        // Simulate delivery (email, push, etc.)
        for follower_id in &followers {
            tracing::debug!(follower_id, recipe_id = payload.recipe_id, "Notification sent");
            tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
        }

        tracing::info!(
            recipe_id = payload.recipe_id,
            notified = followers.len(),
            "Recipe notifications sent"
        );

        Ok(())
    }
}
