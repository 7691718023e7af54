use axum::{
    extract::{rejection::JsonRejection, Json, State},
    response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::AppError,
    state::AppState,
    utils::gate::{removal_cookie, session_cookie},
};

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    pub password: String,
}

// POST /api/admin/auth
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload.map_err(|e| {
        tracing::debug!("Corpo de login inválido: {}", e);
        AppError::bad_request("Dados inválidos")
    })?;
    let password = state.config.admin_password.clone();

    // argon2 é caro; fora do runtime async
    let valid = tokio::task::spawn_blocking(move || password.matches(&payload.password))
        .await
        .map_err(|e| {
            tracing::error!("Erro verificando senha: {:?}", e);
            AppError::Internal("Erro interno")
        })?;

    if !valid {
        tracing::warn!("Tentativa de login no admin com senha incorreta");
        return Err(AppError::Unauthorized("Senha incorreta"));
    }

    let jar = jar.add(session_cookie(state.config.secure_cookies));
    Ok((jar, Json(json!({ "success": true }))))
}

// DELETE /api/admin/auth
pub async fn logout_handler(jar: CookieJar) -> impl IntoResponse {
    (jar.remove(removal_cookie()), Json(json!({ "success": true })))
}
