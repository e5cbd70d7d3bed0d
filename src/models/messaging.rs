// src/models/messaging.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::error::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "message_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageKind {
    GroupPublic,
    GroupPrivate,
    Direct,
}

/// Destino de uma mensagem. Grupo e destinatário são mutuamente exclusivos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageTarget {
    GroupPublic(Uuid),
    GroupPrivate(Uuid),
    Direct(Uuid),
}

impl MessageTarget {
    /// Monta o destino a partir dos campos soltos (payload ou linha do banco).
    pub fn from_parts(
        kind: MessageKind,
        group_id: Option<Uuid>,
        recipient_id: Option<Uuid>,
    ) -> Result<Self, AppError> {
        match (kind, group_id, recipient_id) {
            (MessageKind::Direct, None, Some(recipient)) => Ok(MessageTarget::Direct(recipient)),
            (MessageKind::Direct, _, None) => {
                Err(AppError::InvalidInput("direct_message_requires_recipient"))
            }
            (MessageKind::GroupPublic, Some(group), None) => Ok(MessageTarget::GroupPublic(group)),
            (MessageKind::GroupPrivate, Some(group), None) => {
                Ok(MessageTarget::GroupPrivate(group))
            }
            (MessageKind::GroupPublic | MessageKind::GroupPrivate, None, _) => {
                Err(AppError::InvalidInput("group_message_requires_group"))
            }
            _ => Err(AppError::InvalidInput("message_target_conflict")),
        }
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            MessageTarget::GroupPublic(_) => MessageKind::GroupPublic,
            MessageTarget::GroupPrivate(_) => MessageKind::GroupPrivate,
            MessageTarget::Direct(_) => MessageKind::Direct,
        }
    }

    pub fn group_id(&self) -> Option<Uuid> {
        match self {
            MessageTarget::GroupPublic(g) | MessageTarget::GroupPrivate(g) => Some(*g),
            MessageTarget::Direct(_) => None,
        }
    }

    pub fn recipient_id(&self) -> Option<Uuid> {
        match self {
            MessageTarget::Direct(r) => Some(*r),
            _ => None,
        }
    }
}

// Mensagem já com os dados do remetente (JOIN em users/profiles)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub sender_username: String,
    // Empresa do remetente no momento da leitura (None se não tiver perfil)
    pub sender_company_id: Option<Uuid>,
    pub kind: MessageKind,
    pub content: String,
    pub group_id: Option<Uuid>,
    pub recipient_id: Option<Uuid>,
    pub is_read: bool,
    pub is_edited: bool,
    pub sent_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
}

impl Message {
    pub fn target(&self) -> Result<MessageTarget, AppError> {
        MessageTarget::from_parts(self.kind, self.group_id, self.recipient_id)
    }
}

/// Ordena o par de forma canónica: (menor, maior).
pub fn canonical_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b { (a, b) } else { (b, a) }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DirectConversation {
    pub id: Uuid,
    pub user_a: Uuid,
    pub user_b: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl DirectConversation {
    /// O outro participante, do ponto de vista de `me`.
    pub fn other(&self, me: Uuid) -> Uuid {
        if self.user_a == me { self.user_b } else { self.user_a }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationWithMessages {
    #[serde(flatten)]
    pub conversation: DirectConversation,
    pub other_user_id: Uuid,
    pub recent_messages: Vec<Message>,
}

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    pub kind: MessageKind,
    #[validate(length(min = 1, max = 10000, message = "required"))]
    pub content: String,
    pub group_id: Option<Uuid>,
    pub recipient_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ConversationQuery {
    /// Id do outro participante
    pub with: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_pair_ignores_direction() {
        let u1 = Uuid::new_v4();
        let u2 = Uuid::new_v4();
        assert_eq!(canonical_pair(u1, u2), canonical_pair(u2, u1));

        let (a, b) = canonical_pair(u1, u2);
        assert!(a < b);
    }

    #[test]
    fn target_requires_the_matching_reference() {
        let g = Uuid::new_v4();
        let r = Uuid::new_v4();

        assert_eq!(
            MessageTarget::from_parts(MessageKind::GroupPrivate, Some(g), None).unwrap(),
            MessageTarget::GroupPrivate(g)
        );
        assert_eq!(
            MessageTarget::from_parts(MessageKind::Direct, None, Some(r)).unwrap(),
            MessageTarget::Direct(r)
        );

        let err = MessageTarget::from_parts(MessageKind::GroupPublic, None, None).unwrap_err();
        assert_eq!(err.code(), "group_message_requires_group");

        let err = MessageTarget::from_parts(MessageKind::Direct, Some(g), None).unwrap_err();
        assert_eq!(err.code(), "direct_message_requires_recipient");
    }

    #[test]
    fn target_rejects_both_references() {
        let g = Uuid::new_v4();
        let r = Uuid::new_v4();
        for kind in [MessageKind::Direct, MessageKind::GroupPublic] {
            let err = MessageTarget::from_parts(kind, Some(g), Some(r)).unwrap_err();
            assert_eq!(err.code(), "message_target_conflict");
        }
    }
}
