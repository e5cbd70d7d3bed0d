// src/services/message_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CompanyRepository, GroupRepository, MessageRepository, UserRepository},
    models::messaging::{
        canonical_pair, ConversationWithMessages, Message, MessageTarget,
        SendMessagePayload,
    },
    services::visibility::{resolve_message_visibility, MessageViewer},
};

// Quantas mensagens recentes vão em cada conversa da listagem
const RECENT_PER_CONVERSATION: i64 = 5;

#[derive(Clone)]
pub struct MessageService {
    message_repo: MessageRepository,
    group_repo: GroupRepository,
    company_repo: CompanyRepository,
    user_repo: UserRepository,
    pool: PgPool,
}

impl MessageService {
    pub fn new(
        message_repo: MessageRepository,
        group_repo: GroupRepository,
        company_repo: CompanyRepository,
        user_repo: UserRepository,
        pool: PgPool,
    ) -> Self {
        Self { message_repo, group_repo, company_repo, user_repo, pool }
    }

    /// Monta o leitor (empresa + filiações) para o resolver.
    async fn viewer(&self, user_id: Uuid) -> Result<MessageViewer, AppError> {
        let company_id = self.company_repo.company_of(user_id).await?;
        let memberships = self.group_repo.memberships_of(user_id).await?;
        Ok(MessageViewer { user_id, company_id, memberships })
    }

    pub async fn send_message(
        &self,
        sender_id: Uuid,
        payload: &SendMessagePayload,
    ) -> Result<Message, AppError> {
        let target = MessageTarget::from_parts(payload.kind, payload.group_id, payload.recipient_id)?;

        match target {
            MessageTarget::Direct(recipient) => {
                if recipient == sender_id {
                    return Err(AppError::InvalidInput("cannot_message_self"));
                }
                if !self.user_repo.exists_active(recipient).await? {
                    return Err(AppError::NotFound("recipient_not_found"));
                }

                // Mensagem + conversa na mesma transação
                let mut tx = self.pool.begin().await?;
                let message = self
                    .message_repo
                    .insert_message(&mut *tx, sender_id, target, &payload.content)
                    .await?;
                let (user_a, user_b) = canonical_pair(sender_id, recipient);
                self.message_repo.touch_conversation(&mut *tx, user_a, user_b).await?;
                tx.commit().await?;

                Ok(message)
            }
            MessageTarget::GroupPublic(group_id) | MessageTarget::GroupPrivate(group_id) => {
                if self.group_repo.find_group(&self.pool, group_id).await?.is_none() {
                    return Err(AppError::NotFound("group_not_found"));
                }
                if self
                    .group_repo
                    .find_member(&self.pool, group_id, sender_id)
                    .await?
                    .is_none()
                {
                    return Err(AppError::Forbidden("not_group_member"));
                }

                self.message_repo
                    .insert_message(&self.pool, sender_id, target, &payload.content)
                    .await
            }
        }
    }

    pub async fn get_message(&self, user_id: Uuid, message_id: Uuid) -> Result<Message, AppError> {
        let message = self
            .message_repo
            .find_message(message_id)
            .await?
            .ok_or(AppError::NotFound("message_not_found"))?;

        let viewer = self.viewer(user_id).await?;
        resolve_message_visibility(&viewer, &message)?;
        Ok(message)
    }

    pub async fn list_visible_messages(&self, user_id: Uuid) -> Result<Vec<Message>, AppError> {
        let viewer = self.viewer(user_id).await?;
        let mut messages = self.message_repo.list_candidates_for(user_id).await?;
        messages.retain(|m| resolve_message_visibility(&viewer, m).is_ok());
        Ok(messages)
    }

    /// Mensagens do grupo. Só membros; as PRIVATE passam pelo resolver.
    pub async fn group_messages(&self, user_id: Uuid, group_id: Uuid) -> Result<Vec<Message>, AppError> {
        if self.group_repo.find_group(&self.pool, group_id).await?.is_none() {
            return Err(AppError::NotFound("group_not_found"));
        }

        let viewer = self.viewer(user_id).await?;
        if !viewer.is_member_of(group_id) {
            return Err(AppError::Forbidden("not_group_member"));
        }

        let mut messages = self.message_repo.list_group_messages(group_id).await?;
        messages.retain(|m| resolve_message_visibility(&viewer, m).is_ok());
        Ok(messages)
    }

    pub async fn conversation(&self, user_id: Uuid, other: Uuid) -> Result<Vec<Message>, AppError> {
        self.message_repo.list_direct_between(user_id, other, None).await
    }

    pub async fn list_conversations(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ConversationWithMessages>, AppError> {
        let conversations = self.message_repo.list_conversations(user_id).await?;

        let mut result = Vec::with_capacity(conversations.len());
        for conversation in conversations {
            let other_user_id = conversation.other(user_id);
            let recent_messages = self
                .message_repo
                .list_direct_between(user_id, other_user_id, Some(RECENT_PER_CONVERSATION))
                .await?;
            result.push(ConversationWithMessages { conversation, other_user_id, recent_messages });
        }
        Ok(result)
    }

    /// Só o destinatário de uma mensagem direta a marca como lida.
    pub async fn mark_read(&self, user_id: Uuid, message_id: Uuid) -> Result<(), AppError> {
        let message = self
            .message_repo
            .find_message(message_id)
            .await?
            .ok_or(AppError::NotFound("message_not_found"))?;

        if !matches!(message.target()?, MessageTarget::Direct(recipient) if recipient == user_id) {
            return Err(AppError::Forbidden("only_recipient_can_mark_read"));
        }

        if !message.is_read {
            self.message_repo.mark_read(message.id).await?;
        }
        Ok(())
    }
}
