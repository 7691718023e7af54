use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::tag::Tag,
    state::AppState,
};

const POPULAR_TAGS: i64 = 20;
const TAG_COLUMNS: &str = "id, name, slug, description, posts_count";

// GET /api/blog/tags (público)
pub async fn list_tags_handler(State(state): State<AppState>) -> AppResult<Json<Vec<Tag>>> {
    let sql = format!("SELECT {TAG_COLUMNS} FROM blog_tags ORDER BY posts_count DESC, name ASC LIMIT $1");

    sqlx::query_as::<_, Tag>(&sql)
        .bind(POPULAR_TAGS)
        .fetch_all(&state.pool)
        .await
        .map(Json)
        .map_err(|e| AppError::database("Erro ao buscar tags", e))
}

// GET /api/blog/tags/:slug
pub async fn get_tag_handler(
    Path(slug): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Json<Tag>> {
    let sql = format!("SELECT {TAG_COLUMNS} FROM blog_tags WHERE slug = $1");

    sqlx::query_as::<_, Tag>(&sql)
        .bind(&slug)
        .fetch_optional(&state.pool)
        .await
        .map_err(|e| AppError::database("Erro ao buscar tag", e))?
        .map(Json)
        .ok_or(AppError::NotFound("Tag não encontrada"))
}
