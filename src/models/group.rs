// src/models/group.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::error::AppError;

// Papel dentro do grupo (group_member_role)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash, ToSchema)]
#[sqlx(type_name = "group_member_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum MemberRole {
    Admin,
    Member,
    Invited,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "integration_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum IntegrationStatus {
    Pending,
    Accepted,
    Refused,
}

/// Resultado de aplicar uma resposta a um pedido de integração.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// PENDING -> estado terminal; o chamador persiste a mudança.
    Transition(IntegrationStatus),
    /// A mesma resposta repetida: nada a fazer.
    Unchanged,
}

impl IntegrationStatus {
    /// PENDING -> ACCEPTED | REFUSED. Estados terminais não mudam.
    pub fn answer(self, accept: bool) -> Result<AnswerOutcome, AppError> {
        let target = if accept {
            IntegrationStatus::Accepted
        } else {
            IntegrationStatus::Refused
        };

        match self {
            IntegrationStatus::Pending => Ok(AnswerOutcome::Transition(target)),
            current if current == target => Ok(AnswerOutcome::Unchanged),
            _ => Err(AppError::InvariantViolation("request_already_answered")),
        }
    }
}

// ---
// Grupo de conversa (pertence a uma empresa)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: Uuid,
    #[schema(example = "Equipe Marketing")]
    pub name: String,
    pub description: Option<String>,
    pub company_id: Uuid,
    pub owner_id: Uuid,
    pub accepts_requests: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub group: Group,
    pub member_count: i64,
}

// Linha crua da tabela group_members
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupMember {
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub role: MemberRole,
    pub added_by: Option<Uuid>,
    pub added_at: DateTime<Utc>,
}

// Membro com os dados do utilizador e da empresa (para listagens)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupMemberEntry {
    pub user_id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub company_id: Option<Uuid>,
    pub role: MemberRole,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationRequest {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub group_id: Uuid,
    pub message: Option<String>,
    pub status: IntegrationStatus,
    pub created_at: DateTime<Utc>,
    pub answered_at: Option<DateTime<Utc>>,
    pub answered_by: Option<Uuid>,
}

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupPayload {
    #[validate(length(min = 1, max = 200, message = "required"))]
    #[schema(example = "Equipe Marketing")]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub accepts_requests: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberPayload {
    pub user_id: Uuid,
    pub role: Option<MemberRole>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntegrationRequestPayload {
    pub group_id: Uuid,
    #[validate(length(max = 2000, message = "too_long"))]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AnswerIntegrationPayload {
    pub accept: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_request_moves_to_a_terminal_state() {
        assert_eq!(
            IntegrationStatus::Pending.answer(true).unwrap(),
            AnswerOutcome::Transition(IntegrationStatus::Accepted)
        );
        assert_eq!(
            IntegrationStatus::Pending.answer(false).unwrap(),
            AnswerOutcome::Transition(IntegrationStatus::Refused)
        );
    }

    #[test]
    fn repeating_the_same_answer_is_a_no_op() {
        assert_eq!(
            IntegrationStatus::Accepted.answer(true).unwrap(),
            AnswerOutcome::Unchanged
        );
        assert_eq!(
            IntegrationStatus::Refused.answer(false).unwrap(),
            AnswerOutcome::Unchanged
        );
    }

    #[test]
    fn terminal_answer_cannot_be_flipped() {
        let err = IntegrationStatus::Accepted.answer(false).unwrap_err();
        assert_eq!(err.code(), "request_already_answered");

        let err = IntegrationStatus::Refused.answer(true).unwrap_err();
        assert!(matches!(err, AppError::InvariantViolation(_)));
    }
}
