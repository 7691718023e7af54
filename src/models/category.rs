use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub posts_count: i32,
}

// Versão resumida embutida nos posts
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryRef {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub color: Option<String>,
}
