pub use super::creators::Entity as Creators;
pub use super::posts::Entity as Posts;
pub use super::token_holdings::Entity as TokenHoldings;
