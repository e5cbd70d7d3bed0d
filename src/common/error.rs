// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// ---
// Taxonomia estável (machine-checkable) exposta ao cliente
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Authentication,
    Authorization,
    NotFound,
    Conflict,
    InvariantViolation,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::Authentication => "AUTHENTICATION_ERROR",
            ErrorKind::Authorization => "AUTHORIZATION_ERROR",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::InvariantViolation => "INVARIANT_VIOLATION",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
            ErrorKind::Authorization => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::InvariantViolation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// O erro interno da aplicação. Os códigos (&'static str) são as chaves de tradução.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Dados inválidos: {0}")]
    InvalidInput(&'static str),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado: {0}")]
    Forbidden(&'static str),

    #[error("Não encontrado: {0}")]
    NotFound(&'static str),

    #[error("Conflito: {0}")]
    Conflict(&'static str),

    #[error("Invariante violada: {0}")]
    InvariantViolation(&'static str),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::ValidationError(_) | AppError::InvalidInput(_) => ErrorKind::Validation,
            AppError::InvalidCredentials | AppError::InvalidToken => ErrorKind::Authentication,
            AppError::Forbidden(_) => ErrorKind::Authorization,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Conflict(_) => ErrorKind::Conflict,
            AppError::InvariantViolation(_) => ErrorKind::InvariantViolation,
            AppError::DatabaseError(sqlx::Error::RowNotFound) => ErrorKind::NotFound,
            _ => ErrorKind::Internal,
        }
    }

    /// Código estável do motivo (também usado como chave de tradução).
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_failed",
            AppError::InvalidInput(code)
            | AppError::Forbidden(code)
            | AppError::NotFound(code)
            | AppError::Conflict(code)
            | AppError::InvariantViolation(code) => code,
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::InvalidToken => "invalid_token",
            AppError::DatabaseError(sqlx::Error::RowNotFound) => "resource_not_found",
            _ => "internal_error",
        }
    }

    /// Converte o erro na resposta pública, traduzida para o idioma do pedido.
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let kind = self.kind();

        if kind == ErrorKind::Internal {
            // O detalhe fica só no log
            tracing::error!("🔥 Erro Interno do Servidor: {}", self);
        }

        let details = match self {
            AppError::ValidationError(errors) => {
                let mut fields = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<Value> = field_errors
                        .iter()
                        .map(|e| {
                            let key = e.message.as_deref().unwrap_or(e.code.as_ref());
                            Value::String(store.translate(&locale.0, key))
                        })
                        .collect();
                    fields.insert(field.to_string(), Value::Array(messages));
                }
                Some(Value::Object(fields))
            }
            _ => None,
        };

        ApiError {
            status: kind.status(),
            kind: kind.as_str(),
            code: self.code().to_string(),
            error: store.translate(&locale.0, self.code()),
            details,
        }
    }
}

// Converte violações de unicidade num Conflict com o código dado;
// qualquer outro erro segue como DatabaseError.
pub(crate) fn map_unique_violation(e: sqlx::Error, code: &'static str) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return AppError::Conflict(code);
        }
    }
    e.into()
}

// ---
// O erro que sai pela API
// ---
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub kind: &'static str,
    pub code: String,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        let body = Json(json!(self));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> I18nStore {
        I18nStore::new().expect("locales embutidos válidos")
    }

    #[test]
    fn every_kind_has_a_stable_status() {
        assert_eq!(AppError::InvalidInput("x").kind().status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidToken.kind().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden("x").kind().status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("x").kind().status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Conflict("x").kind().status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::InvariantViolation("x").kind().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::DatabaseError(sqlx::Error::PoolTimedOut).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn api_error_carries_kind_code_and_translated_message() {
        let store = store();
        let err = AppError::Forbidden("message_not_visible");

        let fr = err.to_api_error(&Locale("fr".into()), &store);
        assert_eq!(fr.kind, "AUTHORIZATION_ERROR");
        assert_eq!(fr.code, "message_not_visible");
        assert_ne!(fr.error, "message_not_visible");

        let en = err.to_api_error(&Locale("en".into()), &store);
        assert_ne!(fr.error, en.error);
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let store = store();
        let err = AppError::InternalServerError(anyhow::anyhow!("segredo do banco"));
        let api = err.to_api_error(&Locale("en".into()), &store);
        assert_eq!(api.code, "internal_error");
        assert!(!api.error.contains("segredo"));
    }
}
