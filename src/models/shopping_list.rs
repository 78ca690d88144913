use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, Clone, FromRow)]
pub struct ShoppingList {
    pub id: i32,
    pub user_id: i32,
    pub created_at: OffsetDateTime,
}

/// One (ingredient, amount) pair drawn from a recipe in the cart, in cart
/// insertion order. Input to the shopping-list aggregator.
#[derive(Debug, Clone, FromRow)]
pub struct ShoppingLine {
    pub ingredient_id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}
