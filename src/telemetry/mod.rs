mod init;
mod metrics;

pub use init::init_telemetry;
pub use metrics::{
    CART_RECIPES_ADDED, CART_RECIPES_REMOVED, FAVORITES_ADDED, FAVORITES_REMOVED, FOLLOWS_ADDED,
    FOLLOWS_REMOVED, HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION, JOBS_COMPLETED, JOBS_ENQUEUED,
    JOBS_FAILED, RECIPES_CREATED, RECIPES_DELETED, RECIPES_UPDATED, SHOPPING_LISTS_EXPORTED,
    SHORT_LINKS_RESOLVED, USERS_REGISTERED,
};
