// src/db/scenarios.rs
//
// Cenários ponta a ponta contra um Postgres real.
// Rodar com: DATABASE_URL=postgres://... cargo test -- --ignored

use std::sync::Arc;

use sqlx::PgPool;
use tempfile::TempDir;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        ArticleRepository, CompanyRepository, GroupRepository, MessageRepository,
        NotificationRepository, UserRepository,
    },
    models::{
        company::ProfileRole,
        group::{CreateGroupPayload, IntegrationStatus, MemberRole},
        messaging::{MessageKind, SendMessagePayload},
        news::{ArticleFilter, ArticleStatus, ArticleVisibility, CreateArticlePayload, CreateCommentPayload},
        notification::NotificationKind,
    },
    services::{
        article_service::{ArticleService, ViewContext},
        group_service::GroupService,
        media::ImageMediaProcessor,
        message_service::MessageService,
        notification_service::NotificationService,
        storage::LocalFileStorage,
    },
};

struct Fixture {
    pool: PgPool,
    users: UserRepository,
    companies: CompanyRepository,
    groups: GroupService,
    messages: MessageService,
    articles: ArticleService,
    notifications: NotificationService,
    _media_dir: TempDir,
}

impl Fixture {
    fn new(pool: PgPool) -> Self {
        let users = UserRepository::new(pool.clone());
        let companies = CompanyRepository::new(pool.clone());
        let group_repo = GroupRepository::new(pool.clone());

        let media_dir = TempDir::new().unwrap();
        let storage = LocalFileStorage::new(media_dir.path().to_path_buf(), "/media").unwrap();

        let notifications = NotificationService::new(
            NotificationRepository::new(pool.clone()),
            users.clone(),
            companies.clone(),
            pool.clone(),
        );

        Self {
            groups: GroupService::new(group_repo.clone(), companies.clone(), users.clone(), pool.clone()),
            messages: MessageService::new(
                MessageRepository::new(pool.clone()),
                group_repo,
                companies.clone(),
                users.clone(),
                pool.clone(),
            ),
            articles: ArticleService::new(
                ArticleRepository::new(pool.clone()),
                companies.clone(),
                notifications.clone(),
                Arc::new(storage),
                Arc::new(ImageMediaProcessor),
                pool.clone(),
            ),
            notifications,
            users,
            companies,
            pool,
            _media_dir: media_dir,
        }
    }

    async fn user(&self, username: &str) -> Uuid {
        self.users
            .create_user(&self.pool, username, &format!("{}@example.com", username), "hash", "", "")
            .await
            .unwrap()
            .id
    }

    // Empresa com o seu ADMIN
    async fn company(&self, name: &str, admin: &str) -> (Uuid, Uuid) {
        let admin_id = self.user(admin).await;
        let company = self
            .companies
            .create_company(&self.pool, name, &format!("contact@{}.com", name), None, admin_id)
            .await
            .unwrap();
        self.companies
            .create_profile(&self.pool, admin_id, company.id, ProfileRole::Admin, None)
            .await
            .unwrap();
        (company.id, admin_id)
    }

    async fn employee(&self, company_id: Uuid, username: &str) -> Uuid {
        let id = self.user(username).await;
        self.companies
            .create_profile(&self.pool, id, company_id, ProfileRole::Employee, None)
            .await
            .unwrap();
        id
    }

    async fn publish(&self, author: Uuid, title: &str, visibility: ArticleVisibility) -> Uuid {
        let payload = CreateArticlePayload {
            title: title.into(),
            summary: String::new(),
            content: "conteúdo do artigo".into(),
            category_id: None,
            status: Some(ArticleStatus::Published),
            visibility: Some(visibility),
            publish_date: None,
            expiry_date: None,
            is_pinned: false,
            comments_enabled: None,
            notifications_enabled: None,
            tag_ids: vec![],
            group_ids: vec![],
        };
        self.articles.create_article(author, &payload).await.unwrap().id
    }
}

#[sqlx::test]
#[ignore = "precisa de DATABASE_URL"]
async fn same_title_gets_a_numbered_slug(pool: PgPool) {
    let fx = Fixture::new(pool);
    let (_, admin) = fx.company("acme", "admin1").await;

    let payload = |title: &str| CreateArticlePayload {
        title: title.into(),
        summary: String::new(),
        content: "texto".into(),
        category_id: None,
        status: None,
        visibility: None,
        publish_date: None,
        expiry_date: None,
        is_pinned: false,
        comments_enabled: None,
        notifications_enabled: None,
        tag_ids: vec![],
        group_ids: vec![],
    };

    let first = fx.articles.create_article(admin, &payload("Quarterly Report")).await.unwrap();
    let second = fx.articles.create_article(admin, &payload("Quarterly Report")).await.unwrap();

    assert_eq!(first.slug, "quarterly-report");
    assert_eq!(second.slug, "quarterly-report-1");
}

#[sqlx::test]
#[ignore = "precisa de DATABASE_URL"]
async fn both_directions_share_one_conversation(pool: PgPool) {
    let fx = Fixture::new(pool);
    let u1 = fx.user("u1").await;
    let u2 = fx.user("u2").await;

    for (from, to) in [(u1, u2), (u2, u1)] {
        let payload = SendMessagePayload {
            kind: MessageKind::Direct,
            content: "olá".into(),
            group_id: None,
            recipient_id: Some(to),
        };
        fx.messages.send_message(from, &payload).await.unwrap();
    }

    assert_eq!(fx.messages.list_conversations(u1).await.unwrap().len(), 1);
    assert_eq!(fx.messages.list_conversations(u2).await.unwrap().len(), 1);
    assert_eq!(fx.messages.conversation(u1, u2).await.unwrap().len(), 2);
}

#[sqlx::test]
#[ignore = "precisa de DATABASE_URL"]
async fn private_group_messages_stay_inside_the_company(pool: PgPool) {
    let fx = Fixture::new(pool);
    let (company_a, admin1) = fx.company("acme", "admin1").await;
    let e2 = fx.employee(company_a, "e2").await;
    let (company_b, _) = fx.company("globex", "admin_b").await;
    let u3 = fx.employee(company_b, "u3").await;
    let u4 = fx.employee(company_b, "u4").await;

    let group = fx
        .groups
        .create_group(
            admin1,
            &CreateGroupPayload { name: "G".into(), description: None, accepts_requests: true },
        )
        .await
        .unwrap();
    fx.groups.add_member(admin1, group.id, e2, MemberRole::Member).await.unwrap();
    fx.groups.add_member(admin1, group.id, u4, MemberRole::Member).await.unwrap();

    // Não membro não lê o grupo
    let err = fx.messages.group_messages(u3, group.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden("not_group_member")));

    let message = fx
        .messages
        .send_message(
            admin1,
            &SendMessagePayload {
                kind: MessageKind::GroupPrivate,
                content: "só para a Acme".into(),
                group_id: Some(group.id),
                recipient_id: None,
            },
        )
        .await
        .unwrap();

    assert!(fx.messages.get_message(e2, message.id).await.is_ok());
    assert!(fx.messages.get_message(u3, message.id).await.is_err());

    // Membro de outra empresa também não
    let err = fx.messages.get_message(u4, message.id).await.unwrap_err();
    assert_eq!(err.code(), "message_private_to_company");
    assert!(fx.messages.group_messages(u4, group.id).await.unwrap().is_empty());
}

#[sqlx::test]
#[ignore = "precisa de DATABASE_URL"]
async fn private_article_is_invisible_to_other_companies(pool: PgPool) {
    let fx = Fixture::new(pool);
    let (company_x, admin_x) = fx.company("x", "admin_x").await;
    let colleague = fx.employee(company_x, "colleague").await;
    let (company_y, _) = fx.company("y", "admin_y").await;
    let outsider = fx.employee(company_y, "outsider").await;

    let article_id = fx.publish(admin_x, "Interno", ArticleVisibility::Private).await;

    let reader = fx.articles.reader(Some(outsider)).await.unwrap();
    let page = fx.articles.list_articles(&reader, &ArticleFilter::default()).await.unwrap();
    assert!(page.items.iter().all(|a| a.id != article_id));
    let err = fx
        .articles
        .get_article(&reader, article_id, &ViewContext::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "article_not_found");

    let reader = fx.articles.reader(Some(colleague)).await.unwrap();
    let page = fx.articles.list_articles(&reader, &ArticleFilter::default()).await.unwrap();
    assert!(page.items.iter().any(|a| a.id == article_id));

    // Artigo PRIVATE avisa só a empresa do autor
    let notified = fx.notifications.list(colleague).await.unwrap();
    assert!(notified.iter().any(|n| n.article_id == article_id && n.kind == NotificationKind::NewArticle));
    assert!(fx.notifications.list(outsider).await.unwrap().is_empty());
}

#[sqlx::test]
#[ignore = "precisa de DATABASE_URL"]
async fn views_count_once_and_likes_toggle_back(pool: PgPool) {
    let fx = Fixture::new(pool);
    let (company, admin) = fx.company("acme", "admin1").await;
    let reader_id = fx.employee(company, "leitor").await;
    let article_id = fx.publish(admin, "Novidades", ArticleVisibility::Public).await;

    let reader = fx.articles.reader(Some(reader_id)).await.unwrap();
    let view = ViewContext::default();
    let first = fx.articles.get_article(&reader, article_id, &view).await.unwrap();
    let second = fx.articles.get_article(&reader, article_id, &view).await.unwrap();
    assert_eq!(first.article.views, 1);
    assert_eq!(second.article.views, 1);

    let liked = fx.articles.toggle_like(&reader, article_id).await.unwrap();
    assert!(liked.liked);
    assert_eq!(liked.likes, 1);
    let unliked = fx.articles.toggle_like(&reader, article_id).await.unwrap();
    assert!(!unliked.liked);
    assert_eq!(unliked.likes, 0);
}

#[sqlx::test]
#[ignore = "precisa de DATABASE_URL"]
async fn repeated_comments_notify_the_author_once(pool: PgPool) {
    let fx = Fixture::new(pool);
    let (company, admin) = fx.company("acme", "admin1").await;
    let commenter = fx.employee(company, "e2").await;
    let article_id = fx.publish(admin, "Aberto a comentários", ArticleVisibility::Public).await;

    let reader = fx.articles.reader(Some(commenter)).await.unwrap();
    for text in ["primeiro", "segundo"] {
        let payload = CreateCommentPayload { content: text.into(), parent_id: None };
        fx.articles.add_comment(&reader, article_id, &payload).await.unwrap();
    }

    let comment_notifications = fx
        .notifications
        .list(admin)
        .await
        .unwrap()
        .into_iter()
        .filter(|n| n.kind == NotificationKind::Comment)
        .count();
    assert_eq!(comment_notifications, 1);

    // O próprio comentador não é avisado
    assert!(fx
        .notifications
        .list(commenter)
        .await
        .unwrap()
        .iter()
        .all(|n| n.kind != NotificationKind::Comment));
}

#[sqlx::test]
#[ignore = "precisa de DATABASE_URL"]
async fn accepted_request_adds_one_invited_member(pool: PgPool) {
    let fx = Fixture::new(pool);
    let (company, admin) = fx.company("acme", "admin1").await;
    let requester = fx.employee(company, "candidato").await;
    let early = fx.employee(company, "apressado").await;

    let group = fx
        .groups
        .create_group(
            admin,
            &CreateGroupPayload { name: "Aberto".into(), description: None, accepts_requests: true },
        )
        .await
        .unwrap();

    let request = fx.groups.create_request(requester, group.id, Some("posso entrar?")).await.unwrap();
    assert_eq!(request.status, IntegrationStatus::Pending);

    let accepted = fx.groups.answer_request(admin, request.id, true).await.unwrap();
    assert_eq!(accepted.status, IntegrationStatus::Accepted);
    // Repetir a mesma resposta não muda nada
    let again = fx.groups.answer_request(admin, request.id, true).await.unwrap();
    assert_eq!(again.status, IntegrationStatus::Accepted);

    let rows: Vec<_> = fx
        .groups
        .list_members(group.id)
        .await
        .unwrap()
        .into_iter()
        .filter(|m| m.user_id == requester)
        .collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].role, MemberRole::Invited);

    let err = fx.groups.answer_request(admin, request.id, false).await.unwrap_err();
    assert!(matches!(err, AppError::InvariantViolation("request_already_answered")));

    // Já membro quando o pedido é aceite: sem duplicado e sem rebaixar o papel
    let request = fx.groups.create_request(early, group.id, None).await.unwrap();
    fx.groups.add_member(admin, group.id, early, MemberRole::Member).await.unwrap();
    fx.groups.answer_request(admin, request.id, true).await.unwrap();

    let rows: Vec<_> = fx
        .groups
        .list_members(group.id)
        .await
        .unwrap()
        .into_iter()
        .filter(|m| m.user_id == early)
        .collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].role, MemberRole::Member);
}

#[sqlx::test]
#[ignore = "precisa de DATABASE_URL"]
async fn unknown_recipient_does_not_sink_the_batch(pool: PgPool) {
    let fx = Fixture::new(pool);
    let (company, admin) = fx.company("acme", "admin1").await;
    let reader = fx.employee(company, "leitor").await;
    let article_id = fx.publish(admin, "Lote", ArticleVisibility::Private).await;

    let created = fx
        .notifications
        .deliver(article_id, &[Uuid::new_v4(), admin], NotificationKind::Like)
        .await;
    assert_eq!(created, 1);
    // Segunda entrega do mesmo tipo não duplica
    assert_eq!(fx.notifications.deliver(article_id, &[admin], NotificationKind::Like).await, 0);

    let likes = fx
        .notifications
        .list(admin)
        .await
        .unwrap()
        .into_iter()
        .filter(|n| n.kind == NotificationKind::Like)
        .count();
    assert_eq!(likes, 1);
    assert!(fx.notifications.list(reader).await.unwrap().iter().all(|n| n.kind != NotificationKind::Like));
}

#[sqlx::test]
#[ignore = "precisa de DATABASE_URL"]
async fn group_history_is_capped_to_the_latest_messages(pool: PgPool) {
    let fx = Fixture::new(pool);
    let (_, admin) = fx.company("acme", "admin1").await;
    let group = fx
        .groups
        .create_group(
            admin,
            &CreateGroupPayload { name: "Falador".into(), description: None, accepts_requests: false },
        )
        .await
        .unwrap();

    for i in 0..205 {
        let payload = SendMessagePayload {
            kind: MessageKind::GroupPublic,
            content: format!("m{}", i),
            group_id: Some(group.id),
            recipient_id: None,
        };
        fx.messages.send_message(admin, &payload).await.unwrap();
    }

    let messages = fx.messages.group_messages(admin, group.id).await.unwrap();
    assert_eq!(messages.len(), 200);
    assert!(messages.iter().any(|m| m.content == "m204"));
    assert!(messages.windows(2).all(|w| w[0].sent_at <= w[1].sent_at));
}
