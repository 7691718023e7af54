use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::services::{ServeDir, ServeFile};

use crate::{
    handlers::{auth, authors, blog, category, dashboard, posts, sitemap, studios, tag, upload},
    state::AppState,
    utils::gate::admin_gate,
};

// Margem para o envelope multipart em cima do tamanho máximo da imagem
const MULTIPART_MARGIN: usize = 1024 * 1024;

pub fn create_routes(state: AppState) -> Router {
    // 1. Rotas públicas: diretório e blog
    let public_routes = Router::new()
        .route("/api/cities", get(studios::list_cities_handler))
        .route("/api/cities/:code/studios", get(studios::list_studios_handler))
        .route("/api/cities/:code/neighborhoods", get(studios::list_neighborhoods_handler))
        .route("/api/cities/:code/stats", get(studios::city_stats_handler))
        .route("/api/cities/:code/top-studios", get(studios::top_studios_handler))
        .route("/api/studios/:slug", get(studios::get_studio_handler))
        .route("/api/analytics", get(studios::analytics_handler))
        .route("/api/blog/posts", get(blog::list_blog_posts_handler))
        .route("/api/blog/posts/:slug", get(blog::get_blog_post_handler))
        .route("/api/blog/posts/:slug/view", post(blog::increment_views_handler))
        .route("/api/blog/categories", get(category::list_blog_categories_handler))
        .route("/api/blog/categories/:slug", get(category::get_blog_category_handler))
        .route("/api/blog/tags", get(tag::list_tags_handler))
        .route("/api/blog/tags/:slug", get(tag::get_tag_handler))
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir));

    // 2. Sitemaps
    let sitemap_routes = Router::new()
        .route("/sitemap.xml", get(sitemap::sitemap_index_handler))
        .route("/sitemap-pages.xml", get(sitemap::sitemap_pages_handler))
        .route("/sitemap-cities.xml", get(sitemap::sitemap_cities_handler))
        .route("/sitemap-neighborhoods.xml", get(sitemap::sitemap_neighborhoods_handler))
        .route("/sitemap-studios.xml", get(sitemap::sitemap_studios_handler))
        .route("/sitemap-blog.xml", get(sitemap::sitemap_blog_handler))
        .route(
            "/api/sitemap/refresh",
            get(sitemap::sitemap_status_handler).post(sitemap::refresh_sitemaps_handler),
        );

    // 3. Painel admin: o gate cuida do cookie
    let admin_index = state.config.admin_dir.join("index.html");
    let admin_routes = Router::new()
        .route("/api/admin/auth", post(auth::login_handler).delete(auth::logout_handler))
        .route(
            "/api/admin/autores",
            get(authors::list_authors_handler).post(authors::create_author_handler),
        )
        .route(
            "/api/admin/autores/:id",
            get(authors::get_author_handler)
                .put(authors::update_author_handler)
                .delete(authors::delete_author_handler),
        )
        .route("/api/admin/categories", get(category::list_categories_handler))
        .route(
            "/api/admin/posts",
            get(posts::list_posts_handler).post(posts::create_post_handler),
        )
        .route(
            "/api/admin/posts/:id",
            get(posts::get_post_handler)
                .put(posts::update_post_handler)
                .delete(posts::delete_post_handler),
        )
        .route("/api/admin/dashboard", get(dashboard::dashboard_handler))
        .route("/api/admin/slug", get(dashboard::suggest_slug_handler))
        .route("/api/admin/content-files", get(dashboard::list_content_files_handler))
        .nest_service(
            "/admin",
            ServeDir::new(&state.config.admin_dir).fallback(ServeFile::new(admin_index)),
        );

    let upload_routes = Router::new()
        .route("/api/admin/upload", post(upload::upload_image_handler))
        .route("/api/admin/upload/featured-image", post(upload::upload_featured_image_handler))
        .layer(DefaultBodyLimit::max(upload::MAX_IMAGE_BYTES + MULTIPART_MARGIN));

    // Fotos de estúdio aceitam até 10MB
    let studio_upload_routes = Router::new()
        .route("/api/admin/upload/studio-image", post(upload::upload_studio_image_handler))
        .layer(DefaultBodyLimit::max(upload::MAX_STUDIO_IMAGE_BYTES + MULTIPART_MARGIN));

    // Fusionamos tudo; o gate roda antes de qualquer rota
    Router::new()
        .merge(public_routes)
        .merge(sitemap_routes)
        .merge(admin_routes)
        .merge(upload_routes)
        .merge(studio_upload_routes)
        .layer(middleware::from_fn(admin_gate))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Config, db::lazy_pool};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    const PASSWORD: &str = "q1w2e3r4t5";
    const COOKIE: &str = "admin-auth=authenticated";

    fn app_with(config: Config) -> Router {
        let pool = lazy_pool(&config.database_url);
        create_routes(AppState::new(pool, config))
    }

    fn app() -> Router {
        app_with(Config::for_tests(PASSWORD))
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn login(password: &str) -> Request<Body> {
        Request::post("/api/admin/auth")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(format!(r#"{{"password":"{}"}}"#, password)))
            .unwrap()
    }

    #[tokio::test]
    async fn correct_password_sets_cookie() {
        let response = app().oneshot(login(PASSWORD)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
        assert!(cookie.starts_with("admin-auth=authenticated"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=604800"));
        assert_eq!(body_text(response).await, r#"{"success":true}"#);
    }

    #[tokio::test]
    async fn wrong_password_is_rejected_without_cookie() {
        let response = app().oneshot(login("senha-errada")).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        assert_eq!(body_text(response).await, r#"{"error":"Senha incorreta"}"#);
    }

    #[tokio::test]
    async fn malformed_login_body_is_a_json_bad_request() {
        let request = Request::post("/api/admin/auth")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"password":123}"#))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, r#"{"error":"Dados inválidos"}"#);

        let request = Request::post("/api/admin/auth")
            .body(Body::from(format!(r#"{{"password":"{}"}}"#, PASSWORD)))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn logout_clears_the_cookie() {
        let request = Request::delete("/api/admin/auth")
            .header(header::COOKIE, COOKIE)
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
        assert!(cookie.starts_with("admin-auth=;"), "{cookie}");
        assert!(cookie.contains("Max-Age=0"), "{cookie}");
        assert!(cookie.contains("Path=/"), "{cookie}");
        assert_eq!(body_text(response).await, r#"{"success":true}"#);
    }

    #[tokio::test]
    async fn admin_pages_redirect_to_login_without_cookie() {
        let request = Request::get("/admin/dashboard").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/admin/login");
    }

    #[tokio::test]
    async fn admin_pages_pass_through_with_cookie() {
        let request = Request::get("/admin/dashboard")
            .header(header::COOKIE, COOKIE)
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_ne!(response.status(), StatusCode::SEE_OTHER);
        assert!(response.headers().get(header::LOCATION).is_none());
    }

    #[tokio::test]
    async fn admin_api_requires_cookie() {
        let request = Request::get("/api/admin/autores").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_text(response).await, r#"{"error":"Não autorizado"}"#);
    }

    #[tokio::test]
    async fn author_without_name_is_rejected() {
        let request = Request::post("/api/admin/autores")
            .header(header::COOKIE, COOKIE)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"slug":"ana-souza"}"#))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, r#"{"error":"Nome e slug são obrigatórios"}"#);
    }

    #[tokio::test]
    async fn pages_sitemap_lists_static_pages() {
        let request = Request::get("/sitemap-pages.xml").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/xml");
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "public, max-age=3600, s-maxage=3600"
        );
        let xml = body_text(response).await;
        assert_eq!(xml.matches("<url>").count(), 7);
        assert!(xml.contains("<loc>https://pilates-sp.com/pilates-sao-paulo</loc>"));
    }

    #[tokio::test]
    async fn sitemap_index_references_children() {
        let request = Request::get("/sitemap.xml").body(Body::empty()).unwrap();
        let xml = body_text(app().oneshot(request).await.unwrap()).await;

        assert_eq!(xml.matches("<sitemap>").count(), 5);
        assert!(xml.contains("https://pilates-sp.com/sitemap-blog.xml"));
    }

    #[tokio::test]
    async fn unknown_city_has_no_studios() {
        let request = Request::get("/api/cities/xyz/neighborhoods").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "[]");

        let request = Request::get("/api/cities/xyz/studios").body(Body::empty()).unwrap();
        let body = body_text(app().oneshot(request).await.unwrap()).await;
        let page: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(page["total"], 0);
        assert_eq!(page["studios"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn studio_detail_by_slug() {
        let request = Request::get("/api/studios/pilates-savassi").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let studio: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(studio["cityName"], "Belo Horizonte");

        let request = Request::get("/api/studios/nao-existe").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn analytics_covers_every_city() {
        let request = Request::get("/api/analytics").body(Body::empty()).unwrap();
        let body = body_text(app().oneshot(request).await.unwrap()).await;
        let analytics: serde_json::Value = serde_json::from_str(&body).unwrap();

        assert_eq!(analytics["cities"].as_array().map(Vec::len), Some(5));
        assert!(analytics["overall"]["totalStudios"].as_u64().unwrap() > 0);
    }

    #[tokio::test]
    async fn content_files_lists_mdx_sources() {
        let request = Request::get("/api/admin/content-files")
            .header(header::COOKIE, COOKIE)
            .body(Body::empty())
            .unwrap();
        let body = body_text(app().oneshot(request).await.unwrap()).await;
        let files: Vec<String> = serde_json::from_str(&body).unwrap();

        assert!(files.contains(&"beneficios-do-pilates.mdx".to_string()));
    }

    fn studio_upload(studio_slug: Option<&str>) -> Request<Body> {
        const BOUNDARY: &str = "pilates-boundary";
        let mut body = String::new();
        if let Some(slug) = studio_slug {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"studioSlug\"\r\n\r\n{slug}\r\n"
            ));
        }
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"foto.png\"\r\n\
             Content-Type: image/png\r\n\r\nnot-really-a-png\r\n--{BOUNDARY}--\r\n"
        ));

        Request::post("/api/admin/upload/studio-image")
            .header(header::COOKIE, COOKIE)
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn studio_image_requires_slug() {
        let response = app().oneshot(studio_upload(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, r#"{"error":"Studio slug é obrigatório"}"#);

        let response = app().oneshot(studio_upload(Some("../etc"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn studio_image_is_saved_under_its_slug() {
        let uploads = tempfile::tempdir().unwrap();
        let mut config = Config::for_tests(PASSWORD);
        config.upload_dir = uploads.path().to_path_buf();

        let response = app_with(config)
            .oneshot(studio_upload(Some("pilates-savassi")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        let path = body["path"].as_str().unwrap();
        assert!(path.starts_with("studios/pilates-savassi-"), "{path}");
        assert!(path.ends_with(".png"));
        assert_eq!(body["url"], format!("/uploads/{path}"));
        assert_eq!(body["type"], "image/png");
        assert!(uploads.path().join(path).is_file());
    }

    #[tokio::test]
    async fn refresh_checks_bearer_token() {
        let mut config = Config::for_tests(PASSWORD);
        config.sitemap_refresh_token = Some("segredo".into());
        let app = app_with(config);

        let request = Request::post("/api/sitemap/refresh")
            .header(header::AUTHORIZATION, "Bearer outro")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let request = Request::post("/api/sitemap/refresh")
            .header(header::AUTHORIZATION, "Bearer segredo")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["sitemapUrl"], "https://pilates-sp.com/sitemap.xml");
    }
}
