mod user;
mod tag;
mod ingredient;
mod recipe;
mod favorite;
mod follow;
mod shopping_list;

pub use user::UserRepository;
pub use tag::TagRepository;
pub use ingredient::IngredientRepository;
pub use recipe::{RecipeIngredientRow, RecipeRepository, RecipeTagRow};
pub use favorite::FavoriteRepository;
pub use follow::FollowRepository;
pub use shopping_list::ShoppingListRepository;
