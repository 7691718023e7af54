use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::author::{Author, AuthorPayload},
    state::AppState,
};

const AUTHOR_COLUMNS: &str = "id, name, slug, bio, avatar_url, posts_count, created_at";

// GET /api/admin/autores
pub async fn list_authors_handler(State(state): State<AppState>) -> AppResult<Json<Vec<Author>>> {
    let sql = format!("SELECT {AUTHOR_COLUMNS} FROM blog_authors ORDER BY name ASC");

    sqlx::query_as::<_, Author>(&sql)
        .fetch_all(&state.pool)
        .await
        .map(Json)
        .map_err(|e| AppError::database("Erro ao buscar autores", e))
}

// POST /api/admin/autores
pub async fn create_author_handler(
    State(state): State<AppState>,
    Json(body): Json<AuthorPayload>,
) -> AppResult<impl IntoResponse> {
    let author = body.validate()?;

    let sql = format!(
        "INSERT INTO blog_authors (name, slug, bio, avatar_url, posts_count)
         VALUES ($1, $2, $3, $4, 0)
         RETURNING {AUTHOR_COLUMNS}"
    );

    let result = sqlx::query_as::<_, Author>(&sql)
        .bind(&author.name)
        .bind(&author.slug)
        .bind(&author.bio)
        .bind(&author.avatar_url)
        .fetch_one(&state.pool)
        .await;

    match result {
        Ok(created) => {
            tracing::info!("Autor criado: {}", created.slug);
            Ok((StatusCode::CREATED, Json(created)))
        }
        Err(e) => Err(AppError::write("Erro ao criar autor", e)),
    }
}

// GET /api/admin/autores/:id
pub async fn get_author_handler(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> AppResult<Json<Author>> {
    let sql = format!("SELECT {AUTHOR_COLUMNS} FROM blog_authors WHERE id = $1");

    sqlx::query_as::<_, Author>(&sql)
        .bind(id)
        .fetch_optional(&state.pool)
        .await
        .map_err(|e| AppError::database("Erro ao buscar autor", e))?
        .map(Json)
        .ok_or(AppError::NotFound("Autor não encontrado"))
}

// PUT /api/admin/autores/:id
pub async fn update_author_handler(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(body): Json<AuthorPayload>,
) -> AppResult<Json<Author>> {
    let author = body.validate()?;

    let sql = format!(
        "UPDATE blog_authors SET name = $1, slug = $2, bio = $3, avatar_url = $4
         WHERE id = $5
         RETURNING {AUTHOR_COLUMNS}"
    );

    let result = sqlx::query_as::<_, Author>(&sql)
        .bind(&author.name)
        .bind(&author.slug)
        .bind(&author.bio)
        .bind(&author.avatar_url)
        .bind(id)
        .fetch_optional(&state.pool)
        .await;

    match result {
        Ok(Some(updated)) => Ok(Json(updated)),
        Ok(None) => Err(AppError::NotFound("Autor não encontrado")),
        Err(e) => Err(AppError::write("Erro ao atualizar autor", e)),
    }
}

// DELETE /api/admin/autores/:id - só autores sem posts
pub async fn delete_author_handler(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let has_posts: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM blog_posts WHERE author_id = $1)")
            .bind(id)
            .fetch_one(&state.pool)
            .await
            .map_err(|e| AppError::database("Erro ao deletar autor", e))?;

    if has_posts {
        return Err(AppError::bad_request("Não é possível deletar autor que possui posts"));
    }

    let result = sqlx::query("DELETE FROM blog_authors WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await
        .map_err(|e| AppError::database("Erro ao deletar autor", e))?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Autor não encontrado"));
    }

    Ok(Json(json!({ "success": true })))
}
