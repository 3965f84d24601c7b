pub mod broadcast;
pub mod dispatch;
pub mod health;
pub mod membership;
pub mod recipient;
pub mod response;
pub mod retry;
pub mod telegram;
pub mod validation;
