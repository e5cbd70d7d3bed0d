pub mod user_repo;
pub use user_repo::UserRepository;
pub mod company_repo;
pub use company_repo::CompanyRepository;
pub mod group_repo;
pub use group_repo::GroupRepository;
pub mod message_repo;
pub use message_repo::MessageRepository;
pub mod article_repo;
pub use article_repo::ArticleRepository;
pub mod notification_repo;
pub use notification_repo::NotificationRepository;

#[cfg(test)]
mod scenarios;
