pub mod health;
pub mod recipients;
pub mod telegram;
