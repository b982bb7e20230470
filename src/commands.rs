pub mod evaluate;
pub mod inventory;
pub mod score;
