// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Health ---
        handlers::health::health,

        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,

        // --- Companies ---
        handlers::companies::list_companies,
        handlers::companies::get_company,
        handlers::companies::list_employees,
        handlers::companies::create_employee,

        // --- Groups ---
        handlers::groups::list_groups,
        handlers::groups::create_group,
        handlers::groups::get_group,
        handlers::groups::list_members,
        handlers::groups::add_member,
        handlers::groups::remove_member,
        handlers::groups::list_requests,
        handlers::groups::create_request,
        handlers::groups::answer_request,

        // --- Messages ---
        handlers::messages::send_message,
        handlers::messages::list_messages,
        handlers::messages::conversation,
        handlers::messages::get_message,
        handlers::messages::mark_read,
        handlers::messages::list_conversations,
        handlers::messages::group_messages,

        // --- News ---
        handlers::news::list_categories,
        handlers::news::create_category,
        handlers::news::list_tags,
        handlers::news::create_tag,
        handlers::articles::list_articles,
        handlers::articles::create_article,
        handlers::articles::my_articles,
        handlers::articles::popular_articles,
        handlers::articles::get_article,
        handlers::articles::update_article,
        handlers::articles::delete_article,
        handlers::articles::toggle_like,
        handlers::articles::list_comments,
        handlers::articles::add_comment,
        handlers::articles::upload_media,
        handlers::articles::delete_media,

        // --- Notifications ---
        handlers::notifications::list_notifications,
        handlers::notifications::unread_count,
        handlers::notifications::mark_all_read,
        handlers::notifications::mark_read,
    ),
    components(
        schemas(
            handlers::health::HealthStatus,

            // --- Auth ---
            models::auth::User,
            models::auth::RegisterCompanyPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::MeResponse,

            // --- Companies ---
            models::company::ProfileRole,
            models::company::Company,
            models::company::Profile,
            models::company::EmployeeEntry,
            models::company::CreateEmployeePayload,

            // --- Groups ---
            models::group::MemberRole,
            models::group::IntegrationStatus,
            models::group::Group,
            models::group::GroupDetail,
            models::group::GroupMember,
            models::group::GroupMemberEntry,
            models::group::IntegrationRequest,
            models::group::CreateGroupPayload,
            models::group::AddMemberPayload,
            models::group::CreateIntegrationRequestPayload,
            models::group::AnswerIntegrationPayload,

            // --- Messages ---
            models::messaging::MessageKind,
            models::messaging::Message,
            models::messaging::DirectConversation,
            models::messaging::ConversationWithMessages,
            models::messaging::SendMessagePayload,

            // --- News ---
            models::news::ArticleStatus,
            models::news::ArticleVisibility,
            models::news::MediaKind,
            models::news::Category,
            models::news::CreateCategoryPayload,
            models::news::Tag,
            models::news::CreateTagPayload,
            models::news::Article,
            models::news::ArticleDetail,
            models::news::ArticleSummary,
            models::news::ArticlePage,
            models::news::CreateArticlePayload,
            models::news::UpdateArticlePayload,
            models::news::LikeToggleResponse,
            models::news::Media,
            models::news::Comment,
            models::news::CommentNode,
            models::news::CreateCommentPayload,

            // --- Notifications ---
            models::notification::NotificationKind,
            models::notification::Notification,
            models::notification::UnreadCount,
            models::notification::MarkedCount,
        )
    ),
    tags(
        (name = "Health", description = "Estado do serviço"),
        (name = "Auth", description = "Registo de empresas e login"),
        (name = "Users", description = "Dados do utilizador e perfil"),
        (name = "Companies", description = "Empresas e funcionários"),
        (name = "Groups", description = "Grupos, membros e pedidos de integração"),
        (name = "Messages", description = "Mensagens diretas e de grupo"),
        (name = "News", description = "Artigos, comentários, likes e mídia"),
        (name = "Notifications", description = "Avisos do feed de notícias")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme("api_jwt", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_lists_the_main_routes() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/register",
            "/api/groups/{id}/members/{user_id}",
            "/api/messages/send",
            "/api/articles/{id}/toggle_like",
            "/api/notifications/unread",
        ] {
            assert!(doc.paths.paths.contains_key(path), "rota em falta: {}", path);
        }
    }
}
