use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::category::Category,
    state::AppState,
};

const CATEGORY_COLUMNS: &str = "id, name, slug, description, color, icon, posts_count";

// GET /api/admin/categories
pub async fn list_categories_handler(State(state): State<AppState>) -> AppResult<Json<Vec<Category>>> {
    let sql = format!("SELECT {CATEGORY_COLUMNS} FROM blog_categories ORDER BY name ASC");

    sqlx::query_as::<_, Category>(&sql)
        .fetch_all(&state.pool)
        .await
        .map(Json)
        .map_err(|e| AppError::database("Erro ao buscar categorias", e))
}

// GET /api/blog/categories - mais usadas primeiro
pub async fn list_blog_categories_handler(State(state): State<AppState>) -> AppResult<Json<Vec<Category>>> {
    let sql = format!("SELECT {CATEGORY_COLUMNS} FROM blog_categories ORDER BY posts_count DESC, name ASC");

    sqlx::query_as::<_, Category>(&sql)
        .fetch_all(&state.pool)
        .await
        .map(Json)
        .map_err(|e| AppError::database("Erro ao buscar categorias", e))
}

// GET /api/blog/categories/:slug - página de arquivo da categoria
pub async fn get_blog_category_handler(
    Path(slug): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Json<Category>> {
    let sql = format!("SELECT {CATEGORY_COLUMNS} FROM blog_categories WHERE slug = $1");

    sqlx::query_as::<_, Category>(&sql)
        .bind(&slug)
        .fetch_optional(&state.pool)
        .await
        .map_err(|e| AppError::database("Erro ao buscar categoria", e))?
        .map(Json)
        .ok_or(AppError::NotFound("Categoria não encontrada"))
}
