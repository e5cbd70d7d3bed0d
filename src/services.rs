pub mod article_service;
pub mod auth;
pub mod company_service;
pub mod group_service;
pub mod media;
pub mod message_service;
pub mod notification_service;
pub mod storage;
pub mod visibility;
