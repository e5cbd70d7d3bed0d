pub mod articles;
pub mod auth;
pub mod companies;
pub mod groups;
pub mod health;
pub mod messages;
pub mod news;
pub mod notifications;
