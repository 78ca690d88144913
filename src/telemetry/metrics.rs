use once_cell::sync::Lazy;
use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter},
};

pub static METER: Lazy<Meter> = Lazy::new(|| global::meter("recipegram"));

pub static HTTP_REQUESTS_TOTAL: Lazy<Counter<u64>> = Lazy::new(|| {
    METER
        .u64_counter("http.requests.total")
        .with_description("Total HTTP requests")
        .build()
});

pub static HTTP_REQUEST_DURATION: Lazy<Histogram<f64>> = Lazy::new(|| {
    METER
        .f64_histogram("http.request.duration")
        .with_description("HTTP request latency in milliseconds")
        .build()
});

pub static USERS_REGISTERED: Lazy<Counter<u64>> = Lazy::new(|| {
    METER
        .u64_counter("users.registered")
        .with_description("Total users registered")
        .build()
});

pub static RECIPES_CREATED: Lazy<Counter<u64>> = Lazy::new(|| {
    METER
        .u64_counter("recipes.created")
        .with_description("Total recipes created")
        .build()
});

pub static RECIPES_UPDATED: Lazy<Counter<u64>> = Lazy::new(|| {
    METER
        .u64_counter("recipes.updated")
        .with_description("Total recipes updated")
        .build()
});

pub static RECIPES_DELETED: Lazy<Counter<u64>> = Lazy::new(|| {
    METER
        .u64_counter("recipes.deleted")
        .with_description("Total recipes deleted")
        .build()
});

pub static FAVORITES_ADDED: Lazy<Counter<u64>> = Lazy::new(|| {
    METER
        .u64_counter("favorites.added")
        .with_description("Total favorites added")
        .build()
});

pub static FAVORITES_REMOVED: Lazy<Counter<u64>> = Lazy::new(|| {
    METER
        .u64_counter("favorites.removed")
        .with_description("Total favorites removed")
        .build()
});

pub static FOLLOWS_ADDED: Lazy<Counter<u64>> = Lazy::new(|| {
    METER
        .u64_counter("follows.added")
        .with_description("Total subscriptions created")
        .build()
});

pub static FOLLOWS_REMOVED: Lazy<Counter<u64>> = Lazy::new(|| {
    METER
        .u64_counter("follows.removed")
        .with_description("Total subscriptions removed")
        .build()
});

pub static CART_RECIPES_ADDED: Lazy<Counter<u64>> = Lazy::new(|| {
    METER
        .u64_counter("shopping_cart.recipes.added")
        .with_description("Total recipes added to shopping lists")
        .build()
});

pub static CART_RECIPES_REMOVED: Lazy<Counter<u64>> = Lazy::new(|| {
    METER
        .u64_counter("shopping_cart.recipes.removed")
        .with_description("Total recipes removed from shopping lists")
        .build()
});

pub static SHOPPING_LISTS_EXPORTED: Lazy<Counter<u64>> = Lazy::new(|| {
    METER
        .u64_counter("shopping_lists.exported")
        .with_description("Total shopping list downloads")
        .build()
});

pub static SHORT_LINKS_RESOLVED: Lazy<Counter<u64>> = Lazy::new(|| {
    METER
        .u64_counter("short_links.resolved")
        .with_description("Total short link redirects")
        .build()
});

pub static JOBS_ENQUEUED: Lazy<Counter<u64>> = Lazy::new(|| {
    METER
        .u64_counter("jobs.enqueued")
        .with_description("Total jobs enqueued")
        .build()
});

pub static JOBS_COMPLETED: Lazy<Counter<u64>> = Lazy::new(|| {
    METER
        .u64_counter("jobs.completed")
        .with_description("Total jobs completed successfully")
        .build()
});

pub static JOBS_FAILED: Lazy<Counter<u64>> = Lazy::new(|| {
    METER
        .u64_counter("jobs.failed")
        .with_description("Total jobs failed")
        .build()
});
