use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    content::{embedded_components, MdxDocument},
    error::{AppError, AppResult},
    handlers::posts::{fetch_tags, page_window, POST_SELECT},
    models::post::{Paginated, PostRow, PostSummary, PostView},
    sitemap::iso,
    state::AppState,
};

const BLOG_PAGE_SIZE: i64 = 12;
const RELATED_POSTS: i64 = 4;

// Só o que já está no ar
const PUBLISHED: &str = "p.status = 'published' AND p.published_at <= NOW()";

#[derive(Debug, Default, Deserialize)]
pub struct BlogQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Slug da categoria.
    pub category: Option<String>,
    /// Slug da tag.
    pub tag: Option<String>,
    pub search: Option<String>,
    pub featured: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct BlogPostDetail {
    #[serde(flatten)]
    pub post: PostView,
    pub mdx: Option<MdxDocument>,
    pub components: Vec<&'static str>,
    #[serde(rename = "jsonLd")]
    pub json_ld: Value,
    #[serde(rename = "relatedPosts")]
    pub related_posts: Vec<PostSummary>,
}

/// Dados estruturados schema.org `Article` do post.
pub fn article_json_ld(post: &PostView, site_url: &str) -> Value {
    let p = &post.post;
    let url = format!("{}/blog/{}", site_url, p.slug);

    let mut ld = json!({
        "@context": "https://schema.org",
        "@type": "Article",
        "headline": p.title,
        "description": p.meta_description.as_deref().or(p.excerpt.as_deref()),
        "url": url,
        "mainEntityOfPage": { "@type": "WebPage", "@id": url },
        "datePublished": p.published_at.map(iso),
        "dateModified": iso(p.updated_at),
        "publisher": { "@type": "Organization", "name": "Pilates SP", "url": site_url },
    });

    if let Some(image) = &p.featured_image {
        ld["image"] = json!(absolute_url(image, site_url));
    }
    if let Some(author) = &post.author {
        ld["author"] = json!({ "@type": "Person", "name": author.name });
    }
    if let Some(category) = &post.category {
        ld["articleSection"] = json!(category.name);
    }
    if !post.tags.is_empty() {
        let keywords: Vec<&str> = post.tags.iter().map(|t| t.name.as_str()).collect();
        ld["keywords"] = json!(keywords.join(", "));
    }
    ld
}

fn absolute_url(path: &str, site_url: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        format!("{}/{}", site_url, path.trim_start_matches('/'))
    }
}

// GET /api/blog/posts?page=1&limit=12&category=saude&tag=respiracao&search=texto&featured=true
pub async fn list_blog_posts_handler(
    Query(opts): Query<BlogQuery>,
    State(state): State<AppState>,
) -> AppResult<Json<Paginated<PostSummary>>> {
    let (limit, offset) = page_window(opts.page, opts.limit, BLOG_PAGE_SIZE);
    let category = opts.category.filter(|c| !c.trim().is_empty());
    let tag = opts.tag.filter(|t| !t.trim().is_empty());
    let search = opts.search.filter(|s| !s.trim().is_empty());

    let filters = format!(
        r#"WHERE {PUBLISHED}
             AND ($1::text IS NULL OR c.slug = $1)
             AND ($2::text IS NULL OR p.title ILIKE '%' || $2 || '%' OR p.excerpt ILIKE '%' || $2 || '%')
             AND ($3::bool IS NULL OR p.featured = $3)
             AND ($4::text IS NULL OR EXISTS (
                 SELECT 1 FROM blog_post_tags pt
                 JOIN blog_tags t ON t.id = pt.tag_id
                 WHERE pt.post_id = p.id AND t.slug = $4))"#
    );

    let sql = format!(
        "{POST_SELECT} {filters} ORDER BY p.featured DESC, p.published_at DESC LIMIT $5 OFFSET $6"
    );
    let rows = sqlx::query_as::<_, PostRow>(&sql)
        .bind(&category)
        .bind(&search)
        .bind(opts.featured)
        .bind(&tag)
        .bind(limit)
        .bind(offset)
        .fetch_all(&state.pool)
        .await
        .map_err(|e| AppError::database("Erro ao buscar posts", e))?;

    let count_sql = format!(
        "SELECT COUNT(*) FROM blog_posts p
         LEFT JOIN blog_categories c ON c.id = p.category_id
         {filters}"
    );
    let total: i64 = sqlx::query_scalar(&count_sql)
        .bind(&category)
        .bind(&search)
        .bind(opts.featured)
        .bind(&tag)
        .fetch_one(&state.pool)
        .await
        .map_err(|e| AppError::database("Erro ao buscar posts", e))?;

    let posts = rows.into_iter().map(PostSummary::from).collect();
    Ok(Json(Paginated::new(posts, total, offset)))
}

// GET /api/blog/posts/:slug
pub async fn get_blog_post_handler(
    Path(slug): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Json<BlogPostDetail>> {
    let sql = format!("{POST_SELECT} WHERE p.slug = $1 AND {PUBLISHED}");

    let row = sqlx::query_as::<_, PostRow>(&sql)
        .bind(&slug)
        .fetch_optional(&state.pool)
        .await
        .map_err(|e| AppError::database("Erro ao buscar post", e))?
        .ok_or(AppError::NotFound("Post não encontrado"))?;

    let tags = fetch_tags(&state.pool, row.post.id)
        .await
        .map_err(|e| AppError::database("Erro ao buscar post", e))?;
    let post = row.into_view(tags);

    let mdx = match &post.post.content_file {
        Some(file) => state.mdx.get_mdx_content(file).await,
        None => None,
    };

    let source = mdx
        .as_ref()
        .map(|doc| doc.content.as_str())
        .or(post.post.content.as_deref())
        .unwrap_or_default();

    let related_posts = related_posts(&state, &post).await;

    Ok(Json(BlogPostDetail {
        components: embedded_components(source),
        json_ld: article_json_ld(&post, &state.config.site_url),
        related_posts,
        mdx,
        post,
    }))
}

// Mesma categoria (ou só os mais recentes, se o post não tem), sem o próprio post.
// Falha aqui não derruba o detalhe: volta lista vazia.
async fn related_posts(state: &AppState, post: &PostView) -> Vec<PostSummary> {
    let sql = format!(
        r#"{POST_SELECT}
           WHERE {PUBLISHED}
             AND p.id <> $1
             AND ($2::uuid IS NULL OR p.category_id = $2)
           ORDER BY p.published_at DESC
           LIMIT $3"#
    );

    match sqlx::query_as::<_, PostRow>(&sql)
        .bind(post.post.id)
        .bind(post.post.category_id)
        .bind(RELATED_POSTS)
        .fetch_all(&state.pool)
        .await
    {
        Ok(rows) => rows.into_iter().map(PostSummary::from).collect(),
        Err(e) => {
            tracing::error!("Erro ao buscar posts relacionados: {:?}", e);
            Vec::new()
        }
    }
}

// POST /api/blog/posts/:slug/view
pub async fn increment_views_handler(
    Path(slug): Path<String>,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let views: Option<i64> = sqlx::query_scalar(
        r#"UPDATE blog_posts
           SET views = views + 1
           WHERE slug = $1 AND status = 'published'
           RETURNING views"#,
    )
    .bind(&slug)
    .fetch_optional(&state.pool)
    .await
    .map_err(|e| AppError::database("Erro ao registrar visualização", e))?;

    views
        .map(|views| Json(json!({ "views": views })))
        .ok_or(AppError::NotFound("Post não encontrado"))
}
