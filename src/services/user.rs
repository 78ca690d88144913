use std::collections::HashSet;

use tracing::instrument;

use crate::{
    error::{AppError, AppResult},
    models::{
        FollowDetailDto, ListUsersQuery, ProfileResponse, ShortRecipeDto, SubscriptionsQuery,
        SubscriptionsResponse, User, UsersResponse,
    },
    repository::{FollowRepository, RecipeRepository, UserRepository},
    telemetry::{FOLLOWS_ADDED, FOLLOWS_REMOVED},
};

#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    follow_repo: FollowRepository,
    recipe_repo: RecipeRepository,
}

impl UserService {
    pub fn new(
        user_repo: UserRepository,
        follow_repo: FollowRepository,
        recipe_repo: RecipeRepository,
    ) -> Self {
        Self {
            user_repo,
            follow_repo,
            recipe_repo,
        }
    }

    #[instrument(name = "user.list", skip(self, query))]
    pub async fn list(
        &self,
        query: ListUsersQuery,
        viewer_id: Option<i32>,
    ) -> AppResult<UsersResponse> {
        let users = self.user_repo.list(query.limit, query.offset).await?;
        let total = self.user_repo.count().await?;

        let user_ids: Vec<i32> = users.iter().map(|u| u.id).collect();
        let following: HashSet<i32> = if let Some(viewer) = viewer_id {
            self.follow_repo
                .is_following_batch(viewer, &user_ids)
                .await?
                .into_iter()
                .collect()
        } else {
            HashSet::new()
        };

        let users = users
            .into_iter()
            .map(|u| {
                let subscribed = following.contains(&u.id);
                ProfileResponse::from_user(u, subscribed)
            })
            .collect();

        Ok(UsersResponse { users, total })
    }

    #[instrument(name = "user.profile", skip(self))]
    pub async fn profile(&self, id: i32, viewer_id: Option<i32>) -> AppResult<ProfileResponse> {
        let user = self
            .user_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("User not found".to_string()))?;

        let is_subscribed = match viewer_id {
            Some(viewer) => self.follow_repo.exists(viewer, user.id).await?,
            None => false,
        };

        Ok(ProfileResponse::from_user(user, is_subscribed))
    }

    #[instrument(name = "user.subscribe", skip(self))]
    pub async fn subscribe(
        &self,
        user_id: i32,
        target_id: i32,
        recipes_limit: i64,
    ) -> AppResult<FollowDetailDto> {
        let target = self
            .user_repo
            .find_by_id(target_id)
            .await?
            .ok_or(AppError::NotFound("User not found".to_string()))?;

        if user_id == target_id {
            return Err(AppError::Validation(
                "Subscribing to yourself is not allowed".to_string(),
            ));
        }

        if self.follow_repo.exists(user_id, target_id).await? {
            return Err(AppError::Validation(
                "Already subscribed to this author".to_string(),
            ));
        }

        self.follow_repo
            .create(user_id, target_id)
            .await
            .map_err(|e| AppError::conflict_on_unique(e, "Already subscribed to this author"))?;

        FOLLOWS_ADDED.add(1, &[]);

        tracing::info!(user_id, target_id, "User subscribed");

        self.follow_detail(target, recipes_limit).await
    }

    #[instrument(name = "user.unsubscribe", skip(self))]
    pub async fn unsubscribe(&self, user_id: i32, target_id: i32) -> AppResult<()> {
        self.user_repo
            .find_by_id(target_id)
            .await?
            .ok_or(AppError::NotFound("User not found".to_string()))?;

        let removed = self.follow_repo.delete(user_id, target_id).await?;
        if !removed {
            return Err(AppError::Validation(
                "Not subscribed to this author".to_string(),
            ));
        }

        FOLLOWS_REMOVED.add(1, &[]);

        tracing::info!(user_id, target_id, "User unsubscribed");

        Ok(())
    }

    /// Authors the user follows, each with a capped preview of their
    /// recipes, in subscription order.
    #[instrument(name = "user.subscriptions", skip(self, query))]
    pub async fn subscriptions(
        &self,
        user_id: i32,
        query: SubscriptionsQuery,
    ) -> AppResult<SubscriptionsResponse> {
        let authors = self
            .follow_repo
            .list_following(user_id, query.limit, query.offset)
            .await?;
        let total = self.follow_repo.count_following(user_id).await?;

        let mut subscriptions = Vec::with_capacity(authors.len());
        for author in authors {
            subscriptions.push(self.follow_detail(author, query.recipes_limit).await?);
        }

        Ok(SubscriptionsResponse {
            subscriptions,
            total,
        })
    }

    async fn follow_detail(&self, author: User, recipes_limit: i64) -> AppResult<FollowDetailDto> {
        let recipes = self
            .recipe_repo
            .list_by_author(author.id, recipes_limit.max(0))
            .await?;
        let recipes_count = self.recipe_repo.count_by_author(author.id).await?;

        Ok(FollowDetailDto {
            id: author.id,
            email: author.email,
            username: author.username,
            first_name: author.first_name,
            last_name: author.last_name,
            avatar: author.avatar,
            is_subscribed: true,
            recipes: recipes.into_iter().map(ShortRecipeDto::from).collect(),
            recipes_count,
        })
    }
}
