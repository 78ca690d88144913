mod notification;
mod queue;

pub use notification::{NotificationHandler, RecipePublishedPayload};
pub use queue::{Job, JobQueue, RECIPE_PUBLISHED_KIND};
