// src/services/notification_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CompanyRepository, NotificationRepository, UserRepository},
    models::{
        news::{Article, ArticleVisibility},
        notification::{Notification, NotificationKind},
    },
};

// Teto do fan-out de artigos públicos
pub const PUBLIC_FANOUT_LIMIT: i64 = 100;

/// Quem recebe o aviso de um artigo novo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanoutAudience {
    AllActiveUsers { limit: i64 },
    Company(Uuid),
    Nobody,
}

/// PUBLIC -> todos (com teto); PRIVATE -> a empresa do autor; o resto não notifica.
/// Autor sem empresa não gera avisos.
pub fn new_article_audience(visibility: ArticleVisibility, author_company: Option<Uuid>) -> FanoutAudience {
    let Some(company) = author_company else {
        return FanoutAudience::Nobody;
    };
    match visibility {
        ArticleVisibility::Public => FanoutAudience::AllActiveUsers { limit: PUBLIC_FANOUT_LIMIT },
        ArticleVisibility::Private => FanoutAudience::Company(company),
        ArticleVisibility::Group | ArticleVisibility::Partners => FanoutAudience::Nobody,
    }
}

/// Destinatários de um comentário: autor do artigo e autor do comentário pai,
/// nunca o próprio comentador, sem repetições.
pub fn comment_recipients(commenter: Uuid, article_author: Uuid, parent_author: Option<Uuid>) -> Vec<Uuid> {
    let mut recipients = Vec::with_capacity(2);
    for candidate in std::iter::once(article_author).chain(parent_author) {
        if candidate != commenter && !recipients.contains(&candidate) {
            recipients.push(candidate);
        }
    }
    recipients
}

pub fn like_recipient(liker: Uuid, article_author: Uuid) -> Option<Uuid> {
    (liker != article_author).then_some(article_author)
}

#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    user_repo: UserRepository,
    company_repo: CompanyRepository,
    pool: PgPool,
}

impl NotificationService {
    pub fn new(
        notification_repo: NotificationRepository,
        user_repo: UserRepository,
        company_repo: CompanyRepository,
        pool: PgPool,
    ) -> Self {
        Self { notification_repo, user_repo, company_repo, pool }
    }

    // =========================================================================
    //  FAN-OUT (melhor esforço: chamado depois do commit, nunca falha a ação)
    // =========================================================================

    pub async fn notify_new_article(&self, article: &Article) {
        if let Err(e) = self.try_notify_new_article(article).await {
            tracing::warn!("⚠️ Falha ao notificar o artigo {}: {}", article.id, e);
        }
    }

    async fn try_notify_new_article(&self, article: &Article) -> Result<(), AppError> {
        let author_company = self.company_repo.company_of(article.author_id).await?;

        let recipients = match new_article_audience(article.visibility, author_company) {
            FanoutAudience::Nobody => return Ok(()),
            FanoutAudience::AllActiveUsers { limit } => {
                self.user_repo.active_user_ids(&self.pool, article.author_id, limit).await?
            }
            FanoutAudience::Company(company_id) => {
                self.company_repo
                    .active_member_ids(&self.pool, company_id, article.author_id)
                    .await?
            }
        };

        let created = self
            .deliver(article.id, &recipients, NotificationKind::NewArticle)
            .await;

        tracing::info!("🔔 {} notificações criadas para o artigo {}", created, article.id);
        Ok(())
    }

    pub async fn notify_comment(
        &self,
        article: &Article,
        commenter: Uuid,
        parent_author: Option<Uuid>,
    ) {
        let recipients = comment_recipients(commenter, article.author_id, parent_author);
        self.deliver(article.id, &recipients, NotificationKind::Comment).await;
    }

    pub async fn notify_like(&self, article: &Article, liker: Uuid) {
        let Some(author) = like_recipient(liker, article.author_id) else {
            return;
        };
        self.deliver(article.id, &[author], NotificationKind::Like).await;
    }

    /// Insere em lote; se o lote falhar, tenta destinatário a destinatário.
    /// Devolve quantas notificações novas ficaram gravadas.
    pub(crate) async fn deliver(&self, article_id: Uuid, recipients: &[Uuid], kind: NotificationKind) -> u64 {
        let batch_error = match self
            .notification_repo
            .insert_many(&self.pool, article_id, recipients, kind)
            .await
        {
            Ok(created) => return created,
            Err(e) => e,
        };
        tracing::warn!(
            "⚠️ Lote de notificações {:?} do artigo {} falhou, a tentar um a um: {}",
            kind,
            article_id,
            batch_error
        );

        let mut created = 0;
        for user_id in recipients {
            match self
                .notification_repo
                .insert_many(&self.pool, article_id, std::slice::from_ref(user_id), kind)
                .await
            {
                Ok(n) => created += n,
                Err(e) => tracing::warn!("⚠️ Falha ao notificar {} sobre o artigo {}: {}", user_id, article_id, e),
            }
        }
        created
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Notification>, AppError> {
        self.notification_repo.list_for_user(user_id).await
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<i64, AppError> {
        self.notification_repo.unread_count(user_id).await
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, AppError> {
        self.notification_repo.mark_all_read(user_id).await
    }

    pub async fn mark_read(&self, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if self.notification_repo.mark_read(id, user_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("notification_not_found"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_audience_by_visibility() {
        let company = Uuid::new_v4();
        assert_eq!(
            new_article_audience(ArticleVisibility::Public, Some(company)),
            FanoutAudience::AllActiveUsers { limit: 100 }
        );
        assert_eq!(
            new_article_audience(ArticleVisibility::Private, Some(company)),
            FanoutAudience::Company(company)
        );
        assert_eq!(new_article_audience(ArticleVisibility::Group, Some(company)), FanoutAudience::Nobody);
        assert_eq!(new_article_audience(ArticleVisibility::Partners, Some(company)), FanoutAudience::Nobody);
    }

    #[test]
    fn author_without_company_notifies_nobody() {
        assert_eq!(new_article_audience(ArticleVisibility::Public, None), FanoutAudience::Nobody);
    }

    #[test]
    fn comment_notifies_author_and_parent_author_once() {
        let commenter = Uuid::new_v4();
        let author = Uuid::new_v4();
        let parent_author = Uuid::new_v4();

        assert_eq!(comment_recipients(commenter, author, None), vec![author]);
        assert_eq!(
            comment_recipients(commenter, author, Some(parent_author)),
            vec![author, parent_author]
        );
        // Resposta a um comentário do próprio autor do artigo
        assert_eq!(comment_recipients(commenter, author, Some(author)), vec![author]);
    }

    #[test]
    fn nobody_is_notified_about_their_own_actions() {
        let author = Uuid::new_v4();
        assert!(comment_recipients(author, author, None).is_empty());
        assert!(comment_recipients(author, author, Some(author)).is_empty());
        assert_eq!(like_recipient(author, author), None);

        let other = Uuid::new_v4();
        assert_eq!(like_recipient(other, author), Some(author));
    }
}
