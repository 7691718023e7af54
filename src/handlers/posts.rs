use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::{AppError, AppResult},
    models::{
        post::{Paginated, PostPayload, PostRow, PostStatus, PostSummary, PostView},
        tag::Tag,
    },
    state::AppState,
};

/// SELECT base dos posts com categoria e autor; os aliases batem com `JoinedRefs`.
pub(crate) const POST_SELECT: &str = r#"
    SELECT
        p.id, p.title, p.slug, p.description, p.excerpt, p.content, p.content_file,
        p.meta_title, p.meta_description, p.featured_image, p.featured_image_alt,
        p.status, p.featured, p.category_id, p.author_id, p.published_at,
        p.reading_time, p.views, p.created_at, p.updated_at,
        c.id AS category_ref_id, c.name AS category_name,
        c.slug AS category_slug, c.color AS category_color,
        a.id AS author_ref_id, a.name AS author_name, a.slug AS author_slug,
        a.bio AS author_bio, a.avatar_url AS author_avatar_url
    FROM blog_posts p
    LEFT JOIN blog_categories c ON c.id = p.category_id
    LEFT JOIN blog_authors a ON a.id = p.author_id
"#;

// Contadores de posts publicados por categoria, autor e tag
const REFRESH_COUNTS: [&str; 3] = [
    r#"UPDATE blog_categories c SET posts_count = (
        SELECT COUNT(*) FROM blog_posts p
        WHERE p.category_id = c.id AND p.status = 'published')"#,
    r#"UPDATE blog_authors a SET posts_count = (
        SELECT COUNT(*) FROM blog_posts p
        WHERE p.author_id = a.id AND p.status = 'published')"#,
    r#"UPDATE blog_tags t SET posts_count = (
        SELECT COUNT(*) FROM blog_post_tags pt
        JOIN blog_posts p ON p.id = pt.post_id
        WHERE pt.tag_id = t.id AND p.status = 'published')"#,
];

const ADMIN_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;
const MAX_PAGE: i64 = 100_000;

/// `(limit, offset)` a partir de `page` (base 1) e `limit`.
pub(crate) fn page_window(page: Option<i64>, limit: Option<i64>, default_limit: i64) -> (i64, i64) {
    let limit = limit.filter(|l| *l > 0).unwrap_or(default_limit).min(MAX_PAGE_SIZE);
    let page = page.unwrap_or(1).clamp(1, MAX_PAGE);
    (limit, (page - 1) * limit)
}

pub(crate) async fn fetch_tags(pool: &DbPool, post_id: Uuid) -> Result<Vec<Tag>, sqlx::Error> {
    sqlx::query_as::<_, Tag>(
        r#"SELECT t.id, t.name, t.slug, t.description, t.posts_count
           FROM blog_tags t
           JOIN blog_post_tags pt ON pt.tag_id = t.id
           WHERE pt.post_id = $1
           ORDER BY t.name ASC"#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await
}

async fn load_post(pool: &DbPool, id: Uuid) -> AppResult<Option<PostView>> {
    let sql = format!("{POST_SELECT} WHERE p.id = $1");

    let row = sqlx::query_as::<_, PostRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::database("Erro ao buscar post", e))?;

    let Some(row) = row else {
        return Ok(None);
    };

    let tags = fetch_tags(pool, id)
        .await
        .map_err(|e| AppError::database("Erro ao buscar post", e))?;

    Ok(Some(row.into_view(tags)))
}

async fn replace_tags(
    tx: &mut Transaction<'_, Postgres>,
    post_id: Uuid,
    tags: &[Uuid],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM blog_post_tags WHERE post_id = $1")
        .bind(post_id)
        .execute(&mut **tx)
        .await?;

    if !tags.is_empty() {
        sqlx::query(
            r#"INSERT INTO blog_post_tags (post_id, tag_id)
               SELECT $1, UNNEST($2::uuid[])
               ON CONFLICT DO NOTHING"#,
        )
        .bind(post_id)
        .bind(tags)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn refresh_counts(tx: &mut Transaction<'_, Postgres>) -> Result<(), sqlx::Error> {
    for sql in REFRESH_COUNTS {
        sqlx::query(sql).execute(&mut **tx).await?;
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminPostQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<PostStatus>,
    pub search: Option<String>,
}

// GET /api/admin/posts?page=1&limit=20&status=draft&search=texto
pub async fn list_posts_handler(
    Query(opts): Query<AdminPostQuery>,
    State(state): State<AppState>,
) -> AppResult<Json<Paginated<PostSummary>>> {
    let (limit, offset) = page_window(opts.page, opts.limit, ADMIN_PAGE_SIZE);
    let status = opts.status.map(|s| s.as_str());
    let search = opts.search.filter(|s| !s.trim().is_empty());

    // ($1::text IS NULL OR ...): filtro ignorado quando não informado
    let filters = r#"
        WHERE ($1::text IS NULL OR p.status = $1)
          AND ($2::text IS NULL OR p.title ILIKE '%' || $2 || '%' OR p.excerpt ILIKE '%' || $2 || '%')
    "#;

    let sql = format!("{POST_SELECT} {filters} ORDER BY p.created_at DESC LIMIT $3 OFFSET $4");
    let rows = sqlx::query_as::<_, PostRow>(&sql)
        .bind(status)
        .bind(&search)
        .bind(limit)
        .bind(offset)
        .fetch_all(&state.pool)
        .await
        .map_err(|e| AppError::database("Erro ao buscar posts", e))?;

    let count_sql = format!("SELECT COUNT(*) FROM blog_posts p {filters}");
    let total: i64 = sqlx::query_scalar(&count_sql)
        .bind(status)
        .bind(&search)
        .fetch_one(&state.pool)
        .await
        .map_err(|e| AppError::database("Erro ao buscar posts", e))?;

    let posts = rows.into_iter().map(PostSummary::from).collect();
    Ok(Json(Paginated::new(posts, total, offset)))
}

// POST /api/admin/posts
pub async fn create_post_handler(
    State(state): State<AppState>,
    Json(body): Json<PostPayload>,
) -> AppResult<impl IntoResponse> {
    let post = body.validate(Utc::now())?;

    let mut tx = state
        .pool
        .begin()
        .await
        .map_err(|e| AppError::database("Erro ao criar post", e))?;

    let inserted = sqlx::query_scalar::<_, Uuid>(
        r#"INSERT INTO blog_posts (
               title, slug, description, excerpt, content, content_file,
               meta_title, meta_description, featured_image, featured_image_alt,
               status, featured, category_id, author_id, published_at, reading_time
           )
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
           RETURNING id"#,
    )
    .bind(&post.title)
    .bind(&post.slug)
    .bind(&post.description)
    .bind(&post.excerpt)
    .bind(&post.content)
    .bind(&post.content_file)
    .bind(&post.meta_title)
    .bind(&post.meta_description)
    .bind(&post.featured_image)
    .bind(&post.featured_image_alt)
    .bind(post.status.as_str())
    .bind(post.featured)
    .bind(post.category_id)
    .bind(post.author_id)
    .bind(post.published_at)
    .bind(post.reading_time)
    .fetch_one(&mut *tx)
    .await;

    let id = match inserted {
        Ok(id) => id,
        Err(e) => return Err(AppError::write("Erro ao criar post", e)),
    };

    if let Some(tags) = &post.tags {
        replace_tags(&mut tx, id, tags)
            .await
            .map_err(|e| AppError::database("Erro ao salvar tags", e))?;
    }
    refresh_counts(&mut tx)
        .await
        .map_err(|e| AppError::database("Erro ao criar post", e))?;
    tx.commit()
        .await
        .map_err(|e| AppError::database("Erro ao criar post", e))?;

    tracing::info!("Post criado: {} ({})", post.slug, post.status.as_str());

    let created = load_post(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound("Post não encontrado"))?;
    Ok((StatusCode::CREATED, Json(created)))
}

// GET /api/admin/posts/:id
pub async fn get_post_handler(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> AppResult<Json<PostView>> {
    load_post(&state.pool, id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Post não encontrado"))
}

// PUT /api/admin/posts/:id - substitui os campos e, se enviadas, as tags
pub async fn update_post_handler(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(body): Json<PostPayload>,
) -> AppResult<Json<PostView>> {
    let explicit_date = body.published_at;
    let post = body.validate(Utc::now())?;

    let mut tx = state
        .pool
        .begin()
        .await
        .map_err(|e| AppError::database("Erro ao atualizar post", e))?;

    // Post já publicado mantém a data original, salvo data explícita
    let updated = sqlx::query_scalar::<_, Uuid>(
        r#"UPDATE blog_posts SET
               title = $1, slug = $2, description = $3, excerpt = $4,
               content = $5, content_file = $6, meta_title = $7,
               meta_description = $8, featured_image = $9, featured_image_alt = $10,
               status = $11, featured = $12, category_id = $13, author_id = $14,
               published_at = CASE
                   WHEN $11 = 'published' THEN COALESCE($15, blog_posts.published_at, $16)
                   ELSE NULL
               END,
               reading_time = $17,
               updated_at = NOW()
           WHERE id = $18
           RETURNING id"#,
    )
    .bind(&post.title)
    .bind(&post.slug)
    .bind(&post.description)
    .bind(&post.excerpt)
    .bind(&post.content)
    .bind(&post.content_file)
    .bind(&post.meta_title)
    .bind(&post.meta_description)
    .bind(&post.featured_image)
    .bind(&post.featured_image_alt)
    .bind(post.status.as_str())
    .bind(post.featured)
    .bind(post.category_id)
    .bind(post.author_id)
    .bind(explicit_date)
    .bind(post.published_at)
    .bind(post.reading_time)
    .bind(id)
    .fetch_optional(&mut *tx)
    .await;

    match updated {
        Ok(Some(_)) => {}
        Ok(None) => return Err(AppError::NotFound("Post não encontrado")),
        Err(e) => return Err(AppError::write("Erro ao atualizar post", e)),
    }

    if let Some(tags) = &post.tags {
        replace_tags(&mut tx, id, tags)
            .await
            .map_err(|e| AppError::database("Erro ao salvar tags", e))?;
    }
    refresh_counts(&mut tx)
        .await
        .map_err(|e| AppError::database("Erro ao atualizar post", e))?;
    tx.commit()
        .await
        .map_err(|e| AppError::database("Erro ao atualizar post", e))?;

    load_post(&state.pool, id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Post não encontrado"))
}

// DELETE /api/admin/posts/:id
pub async fn delete_post_handler(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let mut tx = state
        .pool
        .begin()
        .await
        .map_err(|e| AppError::database("Erro ao deletar post", e))?;

    let result = sqlx::query("DELETE FROM blog_posts WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database("Erro ao deletar post", e))?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Post não encontrado"));
    }

    refresh_counts(&mut tx)
        .await
        .map_err(|e| AppError::database("Erro ao deletar post", e))?;
    tx.commit()
        .await
        .map_err(|e| AppError::database("Erro ao deletar post", e))?;

    tracing::info!("Post deletado: {}", id);
    Ok(Json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_window_defaults_and_bounds() {
        assert_eq!(page_window(None, None, 20), (20, 0));
        assert_eq!(page_window(Some(3), Some(10), 20), (10, 20));
        assert_eq!(page_window(Some(0), Some(-5), 12), (12, 0));
        assert_eq!(page_window(Some(2), Some(1000), 12), (100, 100));
    }

    #[test]
    fn huge_page_numbers_are_clamped() {
        let (limit, offset) = page_window(Some(i64::MAX), Some(100), 20);
        assert_eq!(limit, 100);
        assert_eq!(offset, (MAX_PAGE - 1) * 100);
        assert_eq!(page_window(Some(i64::MIN), None, 12), (12, 0));
    }
}
