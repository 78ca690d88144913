mod user;
mod tag;
mod ingredient;
mod recipe;
mod favorite;
mod follow;
mod shopping_list;

pub use user::{
    ChangePasswordInput, ListUsersQuery, LoginInput, ProfileResponse, RegisterInput, SetAvatarInput,
    User, UserResponse, UserWithToken, UsersResponse,
};
pub use tag::Tag;
pub use ingredient::{Ingredient, ListIngredientsQuery};
pub use recipe::{
    CreateRecipeInput, IngredientAmountInput, ListRecipesQuery, Recipe, RecipeDto,
    RecipeIngredientLine, RecipeResponse, RecipeWithAuthor, RecipesResponse, ShortLinkResponse,
    ShortRecipeDto, COOKING_TIME_MAX, COOKING_TIME_MIN, INGREDIENT_AMOUNT_MAX,
    INGREDIENT_AMOUNT_MIN, SHORT_ID_LEN,
};
pub use favorite::Favorite;
pub use follow::{Follow, FollowDetailDto, SubscriptionsQuery, SubscriptionsResponse};
pub use shopping_list::{ShoppingLine, ShoppingList};
