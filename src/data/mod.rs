//! Bases estáticas de estúdios por cidade.
//!
//! Os JSON em `data/` são gerados fora deste serviço e embutidos no binário;
//! a leitura acontece uma única vez, no primeiro acesso.

pub mod filter;

use std::{collections::HashMap, sync::LazyLock};

use crate::{
    models::{
        city::{City, CITIES},
        studio::{CityStats, Studio},
    },
    utils::slug::create_unique_slug,
};

const UNKNOWN_CITY: &str = "Cidade não encontrada";
const TOP_MIN_REVIEWS: u32 = 5;

// Slugs são únicos entre todas as cidades: `/api/studios/:slug` não leva o código
static CITY_DATA: LazyLock<HashMap<&'static str, Vec<Studio>>> = LazyLock::new(|| {
    let mut used = Vec::new();
    CITIES
        .iter()
        .map(|city| {
            let mut studios = parse_city(city, raw_dataset(city.code));
            assign_slugs(&mut studios, &mut used);
            (city.code, studios)
        })
        .collect()
});

fn raw_dataset(code: &str) -> &'static str {
    match code {
        "sp" => include_str!("../../data/pilates-sp.json"),
        "rj" => include_str!("../../data/pilates-rj.json"),
        "bh" => include_str!("../../data/pilates-bh.json"),
        "bsb" => include_str!("../../data/pilates-bsb.json"),
        "cwb" => include_str!("../../data/pilates-cwb.json"),
        _ => "[]",
    }
}

fn parse_city(city: &City, raw: &str) -> Vec<Studio> {
    match serde_json::from_str::<Vec<Studio>>(raw) {
        Ok(studios) => {
            tracing::debug!("{}: {} estúdios carregados", city.file_name, studios.len());
            studios
        }
        Err(e) => {
            tracing::error!("Erro lendo {}: {:?}", city.file_name, e);
            Vec::new()
        }
    }
}

// Slug do dataset é mantido se ainda livre; os demais saem do título com sufixo
pub(crate) fn assign_slugs(studios: &mut [Studio], used: &mut Vec<String>) {
    for studio in studios.iter_mut() {
        let slug = match studio.slug.as_deref().filter(|s| !s.is_empty()) {
            Some(existing) if !used.iter().any(|u| u == existing) => existing.to_string(),
            Some(existing) => create_unique_slug(existing, used.as_slice()),
            None => create_unique_slug(&studio.title, used.as_slice()),
        };
        used.push(slug.clone());
        studio.slug = Some(slug);
    }
}

/// Estúdios da cidade; código desconhecido devolve lista vazia.
pub fn city_data(code: &str) -> &'static [Studio] {
    CITY_DATA.get(code).map(Vec::as_slice).unwrap_or(&[])
}

pub fn all_cities_data() -> Vec<&'static Studio> {
    CITIES
        .iter()
        .flat_map(|city| city_data(city.code))
        .collect()
}

pub fn city_by_code(code: &str) -> Option<&'static City> {
    CITIES.iter().find(|c| c.code == code)
}

pub fn city_name(code: &str) -> &'static str {
    city_by_code(code).map(|c| c.name).unwrap_or(UNKNOWN_CITY)
}

pub fn find_by_slug(slug: &str) -> Option<&'static Studio> {
    CITIES
        .iter()
        .flat_map(|city| city_data(city.code))
        .find(|s| s.slug.as_deref() == Some(slug))
}

pub fn neighborhoods(code: &str) -> Vec<&'static str> {
    let mut names: Vec<&'static str> = city_data(code)
        .iter()
        .map(|s| s.neighborhood.as_str())
        .filter(|n| !n.trim().is_empty())
        .collect();
    names.sort_unstable();
    names.dedup();
    names
}

pub fn city_stats(code: &str) -> CityStats {
    stats_for(city_data(code))
}

/// Números somados de todas as cidades.
pub fn overall_stats() -> CityStats {
    stats_for(all_cities_data())
}

fn stats_for<'a>(studios: impl IntoIterator<Item = &'a Studio>) -> CityStats {
    let mut total_studios = 0usize;
    let mut total_reviews = 0u64;
    let mut score_sum = 0.0f64;

    for studio in studios {
        total_studios += 1;
        total_reviews += u64::from(studio.reviews_count);
        score_sum += studio.total_score;
    }

    let avg_rating = if total_studios == 0 {
        0.0
    } else {
        let avg = score_sum / total_studios as f64;
        (avg * 10.0).round() / 10.0
    };

    CityStats { total_studios, avg_rating, total_reviews }
}

/// Melhores avaliados com pelo menos 5 avaliações.
pub fn top_studios(code: &str, limit: usize, min_rating: f64) -> Vec<&'static Studio> {
    let mut top: Vec<&Studio> = city_data(code)
        .iter()
        .filter(|s| s.total_score >= min_rating && s.reviews_count >= TOP_MIN_REVIEWS)
        .collect();

    top.sort_by(|a, b| {
        b.total_score
            .total_cmp(&a.total_score)
            .then(b.reviews_count.cmp(&a.reviews_count))
    });
    top.truncate(limit);
    top
}
