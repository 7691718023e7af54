use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::error::AppError;

pub const AUTH_COOKIE: &str = "admin-auth";
pub const AUTH_VALUE: &str = "authenticated";
pub const LOGIN_PATH: &str = "/admin/login";

const SESSION_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Area {
    /// Páginas do painel: sem cookie, redireciona para o login.
    AdminPage,
    /// API do painel: sem cookie, 401.
    AdminApi,
    Public,
}

pub fn classify(path: &str) -> Area {
    if under(path, LOGIN_PATH) || under(path, "/api/admin/auth") {
        return Area::Public;
    }
    if under(path, "/admin") {
        return Area::AdminPage;
    }
    if under(path, "/api/admin") {
        return Area::AdminApi;
    }
    Area::Public
}

fn under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

pub fn is_authenticated(jar: &CookieJar) -> bool {
    jar.get(AUTH_COOKIE).is_some_and(|c| c.value() == AUTH_VALUE)
}

pub fn session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, AUTH_VALUE))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::days(SESSION_DAYS))
        .build()
}

pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(AUTH_COOKIE).path("/").build()
}

// Roda antes de qualquer rota; só olha /admin e /api/admin
pub async fn admin_gate(jar: CookieJar, request: Request, next: Next) -> Response {
    let area = classify(request.uri().path());

    if area == Area::Public || is_authenticated(&jar) {
        return next.run(request).await;
    }

    tracing::debug!("Acesso negado a {}", request.uri().path());
    match area {
        Area::AdminPage => Redirect::to(LOGIN_PATH).into_response(),
        _ => AppError::Unauthorized("Não autorizado").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderMap, HeaderValue};

    fn jar_with(cookie: &str) -> CookieJar {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        CookieJar::from_headers(&headers)
    }

    #[test]
    fn classifies_restricted_prefixes() {
        assert_eq!(classify("/admin"), Area::AdminPage);
        assert_eq!(classify("/admin/dashboard"), Area::AdminPage);
        assert_eq!(classify("/admin/login"), Area::Public);
        assert_eq!(classify("/api/admin/auth"), Area::Public);
        assert_eq!(classify("/api/admin/autores"), Area::AdminApi);
        assert_eq!(classify("/api/admin/authx"), Area::AdminApi);
        assert_eq!(classify("/administracao"), Area::Public);
        assert_eq!(classify("/blog/admin"), Area::Public);
        assert_eq!(classify("/"), Area::Public);
    }

    #[test]
    fn cookie_value_must_match_exactly() {
        assert!(is_authenticated(&jar_with("admin-auth=authenticated")));
        assert!(is_authenticated(&jar_with("tema=escuro; admin-auth=authenticated")));
        assert!(!is_authenticated(&jar_with("admin-auth=true")));
        assert!(!is_authenticated(&jar_with("outro=authenticated")));
        assert!(!is_authenticated(&CookieJar::new()));
    }

    #[test]
    fn session_cookie_attributes() {
        let cookie = session_cookie(false);
        assert_eq!(cookie.name(), "admin-auth");
        assert_eq!(cookie.value(), "authenticated");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(time::Duration::days(7)));
        assert_eq!(session_cookie(true).secure(), Some(true));
    }
}
