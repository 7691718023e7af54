use axum::{
    extract::{Json, Query, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    error::{AppError, AppResult},
    handlers::posts::POST_SELECT,
    models::post::{PostRow, PostSummary},
    state::AppState,
    utils::slug::{create_unique_slug, generate_slug},
};

const RECENT_POSTS: i64 = 5;

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCounts {
    pub total_posts: i64,
    pub published_posts: i64,
    pub draft_posts: i64,
    pub total_views: i64,
    pub total_authors: i64,
    pub total_categories: i64,
}

// GET /api/admin/dashboard
pub async fn dashboard_handler(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let counts = sqlx::query_as::<_, DashboardCounts>(
        r#"SELECT
               (SELECT COUNT(*) FROM blog_posts) AS total_posts,
               (SELECT COUNT(*) FROM blog_posts WHERE status = 'published') AS published_posts,
               (SELECT COUNT(*) FROM blog_posts WHERE status = 'draft') AS draft_posts,
               (SELECT COALESCE(SUM(views), 0)::bigint FROM blog_posts) AS total_views,
               (SELECT COUNT(*) FROM blog_authors) AS total_authors,
               (SELECT COUNT(*) FROM blog_categories) AS total_categories"#,
    )
    .fetch_one(&state.pool)
    .await
    .map_err(|e| AppError::database("Erro ao carregar dashboard", e))?;

    let sql = format!("{POST_SELECT} ORDER BY p.created_at DESC LIMIT $1");
    let recent: Vec<PostSummary> = sqlx::query_as::<_, PostRow>(&sql)
        .bind(RECENT_POSTS)
        .fetch_all(&state.pool)
        .await
        .map_err(|e| AppError::database("Erro ao carregar dashboard", e))?
        .into_iter()
        .map(PostSummary::from)
        .collect();

    Ok(Json(json!({
        "stats": counts,
        "recentPosts": recent,
    })))
}

// GET /api/admin/content-files - arquivos .mdx disponíveis para content_file
pub async fn list_content_files_handler(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.mdx.list_mdx_files().await)
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SlugCollection {
    #[default]
    Posts,
    Autores,
}

impl SlugCollection {
    fn table(&self) -> &'static str {
        match self {
            SlugCollection::Posts => "blog_posts",
            SlugCollection::Autores => "blog_authors",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SlugQuery {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub collection: SlugCollection,
}

// GET /api/admin/slug?text=Benefícios do Pilates&collection=posts
pub async fn suggest_slug_handler(
    Query(opts): Query<SlugQuery>,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let base = generate_slug(&opts.text);
    if base.is_empty() {
        return Err(AppError::bad_request("Texto inválido para slug"));
    }

    // Só os slugs que podem colidir: o próprio base e base-N
    let sql = format!(
        "SELECT slug FROM {} WHERE slug = $1 OR slug LIKE $1 || '-%'",
        opts.collection.table()
    );
    let existing: Vec<String> = sqlx::query_scalar(&sql)
        .bind(&base)
        .fetch_all(&state.pool)
        .await
        .map_err(|e| AppError::database("Erro ao gerar slug", e))?;

    Ok(Json(json!({ "slug": create_unique_slug(&opts.text, &existing) })))
}
