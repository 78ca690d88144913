mod health;
mod auth;
mod users;
mod catalog;
mod recipes;
mod short_link;

pub use health::health_check;
pub use auth::{register, login, logout, me, change_password, set_avatar, delete_avatar};
pub use users::{list_users, get_profile, subscribe, unsubscribe, subscriptions};
pub use catalog::{list_tags, get_tag, list_ingredients, get_ingredient};
pub use recipes::{
    list_recipes, create_recipe, get_recipe, update_recipe, delete_recipe,
    favorite_recipe, unfavorite_recipe, add_to_shopping_cart, remove_from_shopping_cart,
    download_shopping_cart, get_short_link,
};
pub use short_link::redirect_short_link;
