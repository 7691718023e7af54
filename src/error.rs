use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

const UNIQUE_VIOLATION: &str = "23505";
const DUPLICATE_SLUG: &str = "Slug já existe";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    /// Falha do banco; a causa já foi registrada no log.
    #[error("{0}")]
    Internal(&'static str),
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    /// Loga o erro do banco e devolve a mensagem genérica para o cliente.
    pub fn database(context: &'static str, err: sqlx::Error) -> Self {
        tracing::error!("{}: {:?}", context, err);
        AppError::Internal(context)
    }

    /// Erro de escrita em tabela com slug único: colisão vira 400.
    pub fn write(context: &'static str, err: sqlx::Error) -> Self {
        if is_unique_violation(&err) {
            return AppError::bad_request(DUPLICATE_SLUG);
        }
        AppError::database(context, err)
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::{borrow::Cow, fmt};

    use http_body_util::BodyExt;
    use sqlx::error::{DatabaseError, ErrorKind};

    #[derive(Debug)]
    struct PgError(&'static str);

    impl fmt::Display for PgError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "pg error {}", self.0)
        }
    }

    impl std::error::Error for PgError {}

    impl DatabaseError for PgError {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.0))
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            if self.0 == UNIQUE_VIOLATION {
                ErrorKind::UniqueViolation
            } else {
                ErrorKind::Other
            }
        }
    }

    fn pg_error(code: &'static str) -> sqlx::Error {
        sqlx::Error::Database(Box::new(PgError(code)))
    }

    #[test]
    fn maps_variants_to_status() {
        assert_eq!(AppError::bad_request("x").into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Unauthorized("x").into_response().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::NotFound("x").into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::database("Erro ao buscar autores", sqlx::Error::RowNotFound)
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn non_database_errors_are_not_unique_violations() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
        assert!(!is_unique_violation(&sqlx::Error::PoolTimedOut));
        assert!(!is_unique_violation(&pg_error("23503")));
    }

    #[tokio::test]
    async fn duplicate_slug_is_a_bad_request() {
        assert!(is_unique_violation(&pg_error("23505")));

        let response = AppError::write("Erro ao criar autor", pg_error("23505")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], r#"{"error":"Slug já existe"}"#.as_bytes());

        let other = AppError::write("Erro ao criar autor", pg_error("23503")).into_response();
        assert_eq!(other.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
