// src/services/visibility.rs
//
// Regras de "quem pode ver o quê" para mensagens e artigos.
// Funções puras: o chamador carrega do banco o que elas precisam.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::company::Profile;
use crate::models::group::MemberRole;
use crate::models::messaging::{Message, MessageKind};
use crate::models::news::{Article, ArticleAudience, ArticleVisibility};

// =============================================================================
//  1. MENSAGENS
// =============================================================================

/// O leitor de uma mensagem: a sua empresa e os grupos onde é membro.
#[derive(Debug, Clone)]
pub struct MessageViewer {
    pub user_id: Uuid,
    pub company_id: Option<Uuid>,
    pub memberships: HashMap<Uuid, MemberRole>,
}

impl MessageViewer {
    pub fn is_member_of(&self, group_id: Uuid) -> bool {
        self.memberships.contains_key(&group_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Mensagem direta de que o leitor não é remetente nem destinatário
    NotParticipant,
    NotGroupMember,
    /// GROUP_PRIVATE lida por alguém de outra empresa (ou sem empresa)
    DifferentCompany,
}

impl DenyReason {
    pub fn code(self) -> &'static str {
        match self {
            DenyReason::NotParticipant => "message_not_participant",
            DenyReason::NotGroupMember => "not_group_member",
            DenyReason::DifferentCompany => "message_private_to_company",
        }
    }
}

impl From<DenyReason> for AppError {
    fn from(reason: DenyReason) -> Self {
        AppError::Forbidden(reason.code())
    }
}

pub fn resolve_message_visibility(viewer: &MessageViewer, message: &Message) -> Result<(), DenyReason> {
    match message.kind {
        MessageKind::Direct => {
            if viewer.user_id == message.sender_id || Some(viewer.user_id) == message.recipient_id {
                Ok(())
            } else {
                Err(DenyReason::NotParticipant)
            }
        }
        MessageKind::GroupPublic => match message.group_id {
            Some(group) if viewer.is_member_of(group) => Ok(()),
            _ => Err(DenyReason::NotGroupMember),
        },
        MessageKind::GroupPrivate => {
            match message.group_id {
                Some(group) if viewer.is_member_of(group) => {}
                _ => return Err(DenyReason::NotGroupMember),
            }
            // Remetente sem perfil conta como outra empresa
            match (viewer.company_id, message.sender_company_id) {
                (Some(mine), Some(theirs)) if mine == theirs => Ok(()),
                _ => Err(DenyReason::DifferentCompany),
            }
        }
    }
}

// =============================================================================
//  2. ARTIGOS
// =============================================================================

/// O leitor de um artigo. Anónimo = tudo None.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArticleViewer {
    pub user_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
}

pub fn resolve_article_visibility(
    viewer: &ArticleViewer,
    article: &Article,
    audience: ArticleAudience,
    now: DateTime<Utc>,
) -> bool {
    if viewer.user_id == Some(article.author_id) {
        return true;
    }
    if !article.is_published(now) {
        return false;
    }

    let same_company = viewer.company_id == Some(article.company_id);
    match article.visibility {
        ArticleVisibility::Public => true,
        ArticleVisibility::Private => same_company,
        ArticleVisibility::Group => same_company || audience.in_target_group,
        ArticleVisibility::Partners => same_company || audience.is_partner,
    }
}

/// Editar/apagar/anexar mídia: o autor ou um ADMIN da empresa do artigo.
pub fn can_manage_article(user_id: Uuid, profile: Option<&Profile>, article: &Article) -> bool {
    article.author_id == user_id || profile.is_some_and(|p| p.is_admin_of(article.company_id))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::models::company::ProfileRole;
    use crate::models::news::ArticleStatus;

    // ---
    // Mensagens
    // ---

    struct Scenario {
        company_a: Uuid,
        company_b: Uuid,
        group: Uuid,
        admin1: Uuid,
    }

    impl Scenario {
        fn new() -> Self {
            Self {
                company_a: Uuid::new_v4(),
                company_b: Uuid::new_v4(),
                group: Uuid::new_v4(),
                admin1: Uuid::new_v4(),
            }
        }

        fn viewer(&self, company: Option<Uuid>, member: bool) -> MessageViewer {
            let mut memberships = HashMap::new();
            if member {
                memberships.insert(self.group, MemberRole::Member);
            }
            MessageViewer { user_id: Uuid::new_v4(), company_id: company, memberships }
        }

        fn group_message(&self, kind: MessageKind, sender_company: Option<Uuid>) -> Message {
            Message {
                id: Uuid::new_v4(),
                sender_id: self.admin1,
                sender_username: "admin1".into(),
                sender_company_id: sender_company,
                kind,
                content: "olá".into(),
                group_id: Some(self.group),
                recipient_id: None,
                is_read: false,
                is_edited: false,
                sent_at: Utc::now(),
                edited_at: None,
            }
        }
    }

    fn direct(sender: Uuid, recipient: Uuid) -> Message {
        Message {
            id: Uuid::new_v4(),
            sender_id: sender,
            sender_username: "s".into(),
            sender_company_id: None,
            kind: MessageKind::Direct,
            content: "oi".into(),
            group_id: None,
            recipient_id: Some(recipient),
            is_read: false,
            is_edited: false,
            sent_at: Utc::now(),
            edited_at: None,
        }
    }

    #[test]
    fn direct_message_is_visible_only_to_its_two_participants() {
        let sender = Uuid::new_v4();
        let recipient = Uuid::new_v4();
        let msg = direct(sender, recipient);

        let as_viewer = |id| MessageViewer { user_id: id, company_id: None, memberships: HashMap::new() };
        assert!(resolve_message_visibility(&as_viewer(sender), &msg).is_ok());
        assert!(resolve_message_visibility(&as_viewer(recipient), &msg).is_ok());
        assert_eq!(
            resolve_message_visibility(&as_viewer(Uuid::new_v4()), &msg),
            Err(DenyReason::NotParticipant)
        );
    }

    #[test]
    fn group_public_requires_membership_only() {
        let s = Scenario::new();
        let msg = s.group_message(MessageKind::GroupPublic, Some(s.company_a));

        assert!(resolve_message_visibility(&s.viewer(Some(s.company_b), true), &msg).is_ok());
        assert_eq!(
            resolve_message_visibility(&s.viewer(Some(s.company_a), false), &msg),
            Err(DenyReason::NotGroupMember)
        );
    }

    #[test]
    fn private_group_message_scenario() {
        let s = Scenario::new();
        let msg = s.group_message(MessageKind::GroupPrivate, Some(s.company_a));

        // e2: mesma empresa, membro
        let e2 = s.viewer(Some(s.company_a), true);
        assert!(resolve_message_visibility(&e2, &msg).is_ok());

        // u3: outra empresa, não membro
        let u3 = s.viewer(Some(s.company_b), false);
        assert_eq!(resolve_message_visibility(&u3, &msg), Err(DenyReason::NotGroupMember));

        // membro de outra empresa
        let outsider = s.viewer(Some(s.company_b), true);
        assert_eq!(resolve_message_visibility(&outsider, &msg), Err(DenyReason::DifferentCompany));
    }

    #[test]
    fn private_message_from_sender_without_profile_is_denied() {
        let s = Scenario::new();
        let msg = s.group_message(MessageKind::GroupPrivate, None);
        let member = s.viewer(Some(s.company_a), true);
        assert_eq!(resolve_message_visibility(&member, &msg), Err(DenyReason::DifferentCompany));

        let no_company = s.viewer(None, true);
        let msg = s.group_message(MessageKind::GroupPrivate, Some(s.company_a));
        assert_eq!(resolve_message_visibility(&no_company, &msg), Err(DenyReason::DifferentCompany));
    }

    #[test]
    fn deny_reasons_become_authorization_errors() {
        let err: AppError = DenyReason::DifferentCompany.into();
        assert_eq!(err.code(), "message_private_to_company");
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    // ---
    // Artigos
    // ---

    fn article(visibility: ArticleVisibility, status: ArticleStatus, company: Uuid) -> Article {
        let publish = Utc::now() - Duration::days(1);
        Article {
            id: Uuid::new_v4(),
            title: "Quarterly Report".into(),
            slug: "quarterly-report".into(),
            summary: String::new(),
            content: "conteúdo".into(),
            author_id: Uuid::new_v4(),
            author_username: "autor".into(),
            company_id: company,
            category_id: None,
            status,
            visibility,
            publish_date: publish,
            expiry_date: None,
            is_pinned: false,
            comments_enabled: true,
            notifications_enabled: true,
            views: 0,
            likes: 0,
            created_at: publish,
            updated_at: publish,
        }
    }

    fn reader(company: Option<Uuid>) -> ArticleViewer {
        ArticleViewer { user_id: Some(Uuid::new_v4()), company_id: company }
    }

    const NOBODY: ArticleAudience = ArticleAudience { in_target_group: false, is_partner: false };

    #[test]
    fn public_article_is_visible_even_anonymously() {
        let a = article(ArticleVisibility::Public, ArticleStatus::Published, Uuid::new_v4());
        assert!(resolve_article_visibility(&ArticleViewer::default(), &a, NOBODY, Utc::now()));
    }

    #[test]
    fn private_article_is_hidden_from_other_companies() {
        let x = Uuid::new_v4();
        let y = Uuid::new_v4();
        let a = article(ArticleVisibility::Private, ArticleStatus::Published, x);
        let now = Utc::now();

        assert!(resolve_article_visibility(&reader(Some(x)), &a, NOBODY, now));
        assert!(!resolve_article_visibility(&reader(Some(y)), &a, NOBODY, now));
        assert!(!resolve_article_visibility(&reader(None), &a, NOBODY, now));
        assert!(!resolve_article_visibility(&ArticleViewer::default(), &a, NOBODY, now));
    }

    #[test]
    fn group_and_partner_articles_use_the_audience() {
        let x = Uuid::new_v4();
        let y = Uuid::new_v4();
        let now = Utc::now();

        let g = article(ArticleVisibility::Group, ArticleStatus::Published, x);
        assert!(resolve_article_visibility(&reader(Some(x)), &g, NOBODY, now));
        assert!(!resolve_article_visibility(&reader(Some(y)), &g, NOBODY, now));
        let member = ArticleAudience { in_target_group: true, is_partner: false };
        assert!(resolve_article_visibility(&reader(Some(y)), &g, member, now));

        let p = article(ArticleVisibility::Partners, ArticleStatus::Published, x);
        assert!(!resolve_article_visibility(&reader(Some(y)), &p, member, now));
        let partner = ArticleAudience { in_target_group: false, is_partner: true };
        assert!(resolve_article_visibility(&reader(Some(y)), &p, partner, now));
    }

    #[test]
    fn unpublished_article_is_only_for_its_author() {
        let x = Uuid::new_v4();
        let a = article(ArticleVisibility::Public, ArticleStatus::Draft, x);
        let now = Utc::now();

        let author = ArticleViewer { user_id: Some(a.author_id), company_id: Some(x) };
        assert!(resolve_article_visibility(&author, &a, NOBODY, now));
        assert!(!resolve_article_visibility(&reader(Some(x)), &a, NOBODY, now));

        let mut expired = article(ArticleVisibility::Public, ArticleStatus::Published, x);
        expired.expiry_date = Some(now - Duration::hours(1));
        assert!(!resolve_article_visibility(&reader(Some(x)), &expired, NOBODY, now));
    }

    #[test]
    fn author_or_company_admin_manages_the_article() {
        let x = Uuid::new_v4();
        let a = article(ArticleVisibility::Public, ArticleStatus::Published, x);

        let profile = |role, company| Profile {
            user_id: Uuid::new_v4(),
            company_id: company,
            role,
            job_title: None,
            is_active: true,
            created_at: Utc::now(),
        };

        assert!(can_manage_article(a.author_id, None, &a));
        assert!(can_manage_article(Uuid::new_v4(), Some(&profile(ProfileRole::Admin, x)), &a));
        assert!(!can_manage_article(Uuid::new_v4(), Some(&profile(ProfileRole::Employee, x)), &a));
        assert!(!can_manage_article(
            Uuid::new_v4(),
            Some(&profile(ProfileRole::Admin, Uuid::new_v4())),
            &a
        ));
    }
}
