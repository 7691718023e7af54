use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{author::AuthorRef, category::CategoryRef, non_empty, tag::Tag},
    utils::slug::is_valid_slug,
};

const WORDS_PER_MINUTE: f64 = 200.0;

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
    Archived,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Archived => "archived",
        }
    }
}

// Linha completa de blog_posts
#[derive(Debug, Clone, Deserialize, Serialize, FromRow)]
pub struct BlogPost {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    /// Nome do arquivo .mdx dentro do diretório de conteúdo.
    pub content_file: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub featured_image: Option<String>,
    pub featured_image_alt: Option<String>,
    pub status: String,
    pub featured: bool,
    pub category_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
    pub published_at: Option<DateTime<Utc>>,
    pub reading_time: i32,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Colunas de categoria/autor vindas do LEFT JOIN.
#[derive(Debug, Clone, FromRow)]
pub struct JoinedRefs {
    pub category_ref_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
    pub category_color: Option<String>,
    pub author_ref_id: Option<Uuid>,
    pub author_name: Option<String>,
    pub author_slug: Option<String>,
    pub author_bio: Option<String>,
    pub author_avatar_url: Option<String>,
}

impl JoinedRefs {
    pub fn category(&self) -> Option<CategoryRef> {
        match (&self.category_ref_id, &self.category_name, &self.category_slug) {
            (Some(id), Some(name), Some(slug)) => Some(CategoryRef {
                id: *id,
                name: name.clone(),
                slug: slug.clone(),
                color: self.category_color.clone(),
            }),
            _ => None,
        }
    }

    pub fn author(&self) -> Option<AuthorRef> {
        match (&self.author_ref_id, &self.author_name, &self.author_slug) {
            (Some(id), Some(name), Some(slug)) => Some(AuthorRef {
                id: *id,
                name: name.clone(),
                slug: slug.clone(),
                bio: self.author_bio.clone(),
                avatar_url: self.author_avatar_url.clone(),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct PostRow {
    #[sqlx(flatten)]
    pub post: BlogPost,
    #[sqlx(flatten)]
    pub refs: JoinedRefs,
}

/// Post com categoria, autor e tags aninhados.
#[derive(Debug, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: BlogPost,
    pub category: Option<CategoryRef>,
    pub author: Option<AuthorRef>,
    pub tags: Vec<Tag>,
}

impl PostRow {
    pub fn into_view(self, tags: Vec<Tag>) -> PostView {
        PostView {
            category: self.refs.category(),
            author: self.refs.author(),
            post: self.post,
            tags,
        }
    }
}

// Item das listagens públicas (sem o corpo)
#[derive(Debug, Serialize)]
pub struct PostSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub featured_image_alt: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub reading_time: i32,
    pub views: i64,
    pub featured: bool,
    pub status: String,
    pub category: Option<CategoryRef>,
    pub author: Option<AuthorRef>,
}

impl From<PostRow> for PostSummary {
    fn from(row: PostRow) -> Self {
        let category = row.refs.category();
        let author = row.refs.author();
        let p = row.post;

        PostSummary {
            id: p.id,
            title: p.title,
            slug: p.slug,
            excerpt: p.excerpt,
            featured_image: p.featured_image,
            featured_image_alt: p.featured_image_alt,
            published_at: p.published_at,
            reading_time: p.reading_time,
            views: p.views,
            featured: p.featured,
            status: p.status,
            category,
            author,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub posts: Vec<T>,
    pub total: i64,
    #[serde(rename = "hasMore")]
    pub has_more: bool,
}

impl<T> Paginated<T> {
    pub fn new(posts: Vec<T>, total: i64, offset: i64) -> Self {
        let has_more = total > offset.saturating_add(posts.len() as i64);
        Self { posts, total, has_more }
    }
}

// Corpo do POST/PUT /api/admin/posts
#[derive(Debug, Default, Deserialize)]
pub struct PostPayload {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub content_file: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub featured_image: Option<String>,
    pub featured_image_alt: Option<String>,
    pub status: Option<PostStatus>,
    pub featured: Option<bool>,
    pub category_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
    pub published_at: Option<DateTime<Utc>>,
    pub tags: Option<Vec<Uuid>>,
}

/// Valores prontos para INSERT/UPDATE.
#[derive(Debug)]
pub struct ValidPost {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub content_file: Option<String>,
    pub meta_title: String,
    pub meta_description: Option<String>,
    pub featured_image: Option<String>,
    pub featured_image_alt: Option<String>,
    pub status: PostStatus,
    pub featured: bool,
    pub category_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
    pub published_at: Option<DateTime<Utc>>,
    pub reading_time: i32,
    pub tags: Option<Vec<Uuid>>,
}

impl PostPayload {
    pub fn validate(self, now: DateTime<Utc>) -> Result<ValidPost, AppError> {
        let (title, slug) = match (non_empty(self.title), non_empty(self.slug)) {
            (Some(title), Some(slug)) => (title, slug),
            _ => return Err(AppError::bad_request("Título e slug são obrigatórios")),
        };

        if !is_valid_slug(&slug) {
            return Err(AppError::bad_request("Slug inválido"));
        }

        let content = non_empty(self.content);
        let excerpt = non_empty(self.excerpt);
        let status = self.status.unwrap_or(PostStatus::Draft);

        let published_at = match status {
            PostStatus::Published => Some(self.published_at.unwrap_or(now)),
            _ => None,
        };

        Ok(ValidPost {
            meta_title: non_empty(self.meta_title).unwrap_or_else(|| title.clone()),
            meta_description: non_empty(self.meta_description).or_else(|| excerpt.clone()),
            reading_time: reading_time(content.as_deref()),
            title,
            slug,
            description: non_empty(self.description),
            excerpt,
            content,
            content_file: non_empty(self.content_file),
            featured_image: non_empty(self.featured_image),
            featured_image_alt: non_empty(self.featured_image_alt),
            status,
            featured: self.featured.unwrap_or(false),
            category_id: self.category_id,
            author_id: self.author_id,
            published_at,
            tags: self.tags,
        })
    }
}

// Minutos de leitura a 200 palavras/minuto, mínimo 1
pub fn reading_time(content: Option<&str>) -> i32 {
    let words = content.map(|c| c.split_whitespace().count()).unwrap_or(0);
    ((words as f64 / WORDS_PER_MINUTE).round() as i32).max(1)
}
