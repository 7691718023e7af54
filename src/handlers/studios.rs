use axum::{
    extract::{Json, Path, Query},
    http::header,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    data::{
        self,
        filter::{paginate, StudioFilter, StudioQuery},
    },
    error::{AppError, AppResult},
    models::{
        city::{City, CITIES},
        studio::StudioDetail,
    },
};

const TOP_LIMIT: usize = 5;
const TOP_MIN_RATING: f64 = 4.0;

// Dados estáticos: o navegador pode guardar por alguns minutos
const STATIC_CACHE: &str = "public, max-age=300";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopQuery {
    pub limit: Option<usize>,
    pub min_rating: Option<f64>,
}

// GET /api/cities
pub async fn list_cities_handler() -> Json<[City; 5]> {
    Json(CITIES)
}

// GET /api/cities/:code/studios?search=&neighborhoods=Moema,Pinheiros&page=1
pub async fn list_studios_handler(
    Path(code): Path<String>,
    Query(opts): Query<StudioQuery>,
) -> impl IntoResponse {
    let filter = StudioFilter::from(&opts);
    let studios = filter.apply(data::city_data(&code));

    (
        [(header::CACHE_CONTROL, STATIC_CACHE)],
        Json(paginate(studios, opts.page, opts.limit)),
    )
}

// GET /api/cities/:code/neighborhoods
pub async fn list_neighborhoods_handler(Path(code): Path<String>) -> impl IntoResponse {
    ([(header::CACHE_CONTROL, STATIC_CACHE)], Json(data::neighborhoods(&code)))
}

// GET /api/cities/:code/stats
pub async fn city_stats_handler(Path(code): Path<String>) -> impl IntoResponse {
    let stats = data::city_stats(&code);
    Json(json!({
        "city": code,
        "cityName": data::city_name(&code),
        "stats": stats,
    }))
}

// GET /api/cities/:code/top-studios?limit=5&minRating=4
pub async fn top_studios_handler(
    Path(code): Path<String>,
    Query(opts): Query<TopQuery>,
) -> impl IntoResponse {
    let limit = opts.limit.unwrap_or(TOP_LIMIT);
    let min_rating = opts.min_rating.unwrap_or(TOP_MIN_RATING);

    ([(header::CACHE_CONTROL, STATIC_CACHE)], Json(data::top_studios(&code, limit, min_rating)))
}

// GET /api/studios/:slug
pub async fn get_studio_handler(Path(slug): Path<String>) -> AppResult<Json<StudioDetail<'static>>> {
    let studio = data::find_by_slug(&slug).ok_or(AppError::NotFound("Estúdio não encontrado"))?;

    Ok(Json(StudioDetail::new(studio, data::city_name(&studio.city))))
}

// GET /api/analytics - comparativo entre as cidades
pub async fn analytics_handler() -> impl IntoResponse {
    let cities: Vec<_> = CITIES
        .iter()
        .map(|city| {
            json!({
                "code": city.code,
                "name": city.name,
                "slug": city.slug,
                "stats": data::city_stats(city.code),
                "topStudio": data::top_studios(city.code, 1, TOP_MIN_RATING).first(),
            })
        })
        .collect();

    (
        [(header::CACHE_CONTROL, STATIC_CACHE)],
        Json(json!({ "overall": data::overall_stats(), "cities": cities })),
    )
}
