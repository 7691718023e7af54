use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{error::AppError, models::non_empty};

#[derive(Debug, Deserialize, Serialize, FromRow)]
pub struct Author {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub posts_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AuthorRef {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

// Corpo do POST/PUT /api/admin/autores
#[derive(Debug, Default, Deserialize)]
pub struct AuthorPayload {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, PartialEq)]
pub struct ValidAuthor {
    pub name: String,
    pub slug: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

impl AuthorPayload {
    pub fn validate(self) -> Result<ValidAuthor, AppError> {
        match (non_empty(self.name), non_empty(self.slug)) {
            (Some(name), Some(slug)) => Ok(ValidAuthor {
                name,
                slug,
                bio: non_empty(self.bio),
                avatar_url: non_empty(self.avatar_url),
            }),
            _ => Err(AppError::bad_request("Nome e slug são obrigatórios")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_name_and_slug() {
        let missing_slug = AuthorPayload { name: Some("Ana".into()), ..Default::default() };
        assert!(matches!(missing_slug.validate(), Err(AppError::BadRequest(_))));

        let blank_name = AuthorPayload {
            name: Some("   ".into()),
            slug: Some("ana".into()),
            ..Default::default()
        };
        assert!(blank_name.validate().is_err());
    }

    #[test]
    fn blank_optionals_become_null() {
        let payload = AuthorPayload {
            name: Some("Ana Souza".into()),
            slug: Some("ana-souza".into()),
            bio: Some(String::new()),
            avatar_url: None,
        };
        assert_eq!(
            payload.validate().unwrap(),
            ValidAuthor {
                name: "Ana Souza".into(),
                slug: "ana-souza".into(),
                bio: None,
                avatar_url: None,
            }
        );
    }
}
