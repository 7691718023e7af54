use axum::{
    extract::{Json, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use chrono::{DateTime, Utc};
use serde_json::json;

use crate::{
    error::{AppError, AppResult},
    sitemap::{
        blog_entries, blog_fallback, cache::notify_search_engines, city_entries, iso,
        neighborhood_entries, render_index, render_urlset, static_pages, studio_entries,
        BlogPostRow, SitemapKind, StudioRow, UrlEntry, BLOG_FALLBACK_MAX_AGE, MAX_STUDIO_URLS,
    },
    state::AppState,
};

fn xml_response(xml: String, max_age: u32) -> Response {
    let cache = format!("public, max-age={max_age}, s-maxage={max_age}");
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/xml".to_string()),
            (header::CACHE_CONTROL, cache),
        ],
        xml,
    )
        .into_response()
}

fn cached(state: &AppState, kind: SitemapKind, now: DateTime<Utc>) -> Option<Response> {
    state
        .sitemaps
        .get(kind, now)
        .map(|xml| xml_response(xml, kind.max_age()))
}

fn store(state: &AppState, kind: SitemapKind, xml: String, now: DateTime<Utc>) -> Response {
    state.sitemaps.store(kind, &xml, now);
    xml_response(xml, kind.max_age())
}

const STUDIO_BATCH: usize = 1000;

// Estúdios do mais recente para o mais antigo, em lotes; `cap` corta a lista
async fn studio_rows(state: &AppState, cap: Option<usize>) -> Result<Vec<StudioRow>, sqlx::Error> {
    let mut rows: Vec<StudioRow> = Vec::new();

    loop {
        let batch = sqlx::query_as::<_, StudioRow>(
            r#"SELECT slug, city_code, neighborhood, updated_at
               FROM studios
               ORDER BY updated_at DESC NULLS LAST, id ASC
               LIMIT $1 OFFSET $2"#,
        )
        .bind(STUDIO_BATCH as i64)
        .bind(rows.len() as i64)
        .fetch_all(&state.pool)
        .await?;

        let last_batch = batch.len() < STUDIO_BATCH;
        rows.extend(batch);
        if last_batch {
            break;
        }

        if let Some(cap) = cap.filter(|cap| rows.len() >= *cap) {
            tracing::warn!("Sitemap limitado a {} estúdios", cap);
            rows.truncate(cap);
            break;
        }
    }

    Ok(rows)
}

async fn dynamic_sitemap(
    state: &AppState,
    kind: SitemapKind,
    build: fn(&str, &[StudioRow], DateTime<Utc>) -> Vec<UrlEntry>,
    cap: Option<usize>,
    context: &'static str,
) -> AppResult<Response> {
    let now = Utc::now();
    if let Some(hit) = cached(state, kind, now) {
        return Ok(hit);
    }

    let rows = studio_rows(state, cap)
        .await
        .map_err(|e| AppError::database(context, e))?;

    let xml = render_urlset(&build(&state.config.site_url, &rows, now));
    Ok(store(state, kind, xml, now))
}

// GET /sitemap.xml
pub async fn sitemap_index_handler(State(state): State<AppState>) -> Response {
    let now = Utc::now();
    if let Some(hit) = cached(&state, SitemapKind::Index, now) {
        return hit;
    }

    let xml = render_index(&state.config.site_url, now);
    store(&state, SitemapKind::Index, xml, now)
}

// GET /sitemap-pages.xml
pub async fn sitemap_pages_handler(State(state): State<AppState>) -> Response {
    let now = Utc::now();
    if let Some(hit) = cached(&state, SitemapKind::Pages, now) {
        return hit;
    }

    let xml = render_urlset(&static_pages(&state.config.site_url, now));
    store(&state, SitemapKind::Pages, xml, now)
}

// GET /sitemap-cities.xml
pub async fn sitemap_cities_handler(State(state): State<AppState>) -> AppResult<Response> {
    dynamic_sitemap(&state, SitemapKind::Cities, city_entries, None, "Erro ao gerar sitemap de cidades").await
}

// GET /sitemap-neighborhoods.xml
pub async fn sitemap_neighborhoods_handler(State(state): State<AppState>) -> AppResult<Response> {
    dynamic_sitemap(
        &state,
        SitemapKind::Neighborhoods,
        neighborhood_entries,
        None,
        "Erro ao gerar sitemap de bairros",
    )
    .await
}

// GET /sitemap-studios.xml
pub async fn sitemap_studios_handler(State(state): State<AppState>) -> AppResult<Response> {
    dynamic_sitemap(
        &state,
        SitemapKind::Studios,
        studio_entries,
        Some(MAX_STUDIO_URLS),
        "Erro ao gerar sitemap de estúdios",
    )
    .await
}

// GET /sitemap-blog.xml - se o banco falhar, devolve só /blog com cache curto
pub async fn sitemap_blog_handler(State(state): State<AppState>) -> Response {
    let now = Utc::now();
    if let Some(hit) = cached(&state, SitemapKind::Blog, now) {
        return hit;
    }

    let posts = sqlx::query_as::<_, BlogPostRow>(
        r#"SELECT slug, published_at, updated_at
           FROM blog_posts
           WHERE status = 'published' AND published_at <= NOW()
           ORDER BY published_at DESC"#,
    )
    .fetch_all(&state.pool)
    .await;

    let categories = sqlx::query_scalar::<_, String>("SELECT slug FROM blog_categories ORDER BY name ASC")
        .fetch_all(&state.pool)
        .await;

    match (posts, categories) {
        (Ok(posts), Ok(categories)) => {
            let xml = render_urlset(&blog_entries(&state.config.site_url, &posts, &categories, now));
            store(&state, SitemapKind::Blog, xml, now)
        }
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!("Erro ao gerar sitemap do blog: {:?}", e);
            let xml = render_urlset(&blog_fallback(&state.config.site_url, now));
            xml_response(xml, BLOG_FALLBACK_MAX_AGE)
        }
    }
}

// POST /api/sitemap/refresh - token opcional via Authorization: Bearer
pub async fn refresh_sitemaps_handler(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
) -> AppResult<impl IntoResponse> {
    if let Some(expected) = &state.config.sitemap_refresh_token {
        let provided = auth.as_ref().map(|TypedHeader(Authorization(bearer))| bearer.token());
        if provided != Some(expected.as_str()) {
            return Err(AppError::Unauthorized("Não autorizado"));
        }
    }

    let now = Utc::now();
    let cleared = state.sitemaps.invalidate(now);
    tracing::info!("Cache de sitemaps invalidado ({} entradas)", cleared);

    let sitemap_url = state.config.sitemap_url();
    if state.config.ping_search_engines {
        let client = state.http.clone();
        let url = sitemap_url.clone();
        tokio::spawn(async move { notify_search_engines(&client, &url).await });
    }

    Ok(Json(json!({
        "success": true,
        "message": "Atualização dos sitemaps disparada",
        "timestamp": iso(now),
        "sitemapUrl": sitemap_url,
        "cleared": cleared,
        "searchEnginesNotified": state.config.ping_search_engines,
    })))
}

// GET /api/sitemap/refresh
pub async fn sitemap_status_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let status = state.sitemaps.status();
    let sitemaps: Vec<String> = std::iter::once(SitemapKind::Index)
        .chain(SitemapKind::CHILDREN)
        .map(|kind| format!("{}{}", state.config.site_url, kind.path()))
        .collect();

    Json(json!({
        "status": "ok",
        "sitemapUrl": state.config.sitemap_url(),
        "sitemaps": sitemaps,
        "cached": status.cached,
        "lastInvalidated": status.last_invalidated.map(iso),
        "methods": ["GET", "POST"],
        "authRequired": state.config.sitemap_refresh_token.is_some(),
    }))
}
