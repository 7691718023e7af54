use serde::Deserialize;

use crate::{
    models::studio::{Studio, StudioPage},
    utils::format::is_whatsapp_number,
};

const DEFAULT_PAGE_SIZE: usize = 100;
const MAX_PAGE_SIZE: usize = 500;

// Query string de GET /api/cities/:code/studios
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudioQuery {
    pub search: Option<String>,
    /// Bairros separados por vírgula.
    pub neighborhoods: Option<String>,
    pub min_rating: Option<f64>,
    pub whatsapp: Option<bool>,
    pub website: Option<bool>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Default)]
pub struct StudioFilter {
    pub search: String,
    pub neighborhoods: Vec<String>,
    pub min_rating: f64,
    pub whatsapp_only: bool,
    pub website_only: bool,
}

impl From<&StudioQuery> for StudioFilter {
    fn from(q: &StudioQuery) -> Self {
        let neighborhoods = q
            .neighborhoods
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        StudioFilter {
            search: q.search.as_deref().unwrap_or("").trim().to_lowercase(),
            neighborhoods,
            min_rating: q.min_rating.unwrap_or(0.0),
            whatsapp_only: q.whatsapp.unwrap_or(false),
            website_only: q.website.unwrap_or(false),
        }
    }
}

impl StudioFilter {
    pub fn matches(&self, studio: &Studio) -> bool {
        let matches_search = self.search.is_empty()
            || studio.title.to_lowercase().contains(&self.search)
            || studio.neighborhood.to_lowercase().contains(&self.search);

        let matches_neighborhood =
            self.neighborhoods.is_empty() || self.neighborhoods.iter().any(|n| *n == studio.neighborhood);

        matches_search
            && matches_neighborhood
            && studio.total_score >= self.min_rating
            && (!self.whatsapp_only || is_whatsapp_number(&studio.phone))
            && (!self.website_only || studio.has_website())
    }

    pub fn apply<'a>(&self, studios: &'a [Studio]) -> Vec<&'a Studio> {
        studios.iter().filter(|s| self.matches(s)).collect()
    }
}

/// Página 1-based; `limit` limitado a 500.
pub fn paginate(items: Vec<&Studio>, page: Option<usize>, limit: Option<usize>) -> StudioPage<'_> {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let total = items.len();
    let total_pages = total.div_ceil(limit);

    let studios = items
        .into_iter()
        .skip((page - 1).saturating_mul(limit))
        .take(limit)
        .collect();

    StudioPage {
        studios,
        total,
        page,
        total_pages,
        has_more: page < total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::city_data;

    fn query(f: impl FnOnce(&mut StudioQuery)) -> StudioFilter {
        let mut q = StudioQuery::default();
        f(&mut q);
        StudioFilter::from(&q)
    }

    #[test]
    fn empty_filter_matches_everything() {
        let sp = city_data("sp");
        assert_eq!(StudioFilter::default().apply(sp).len(), sp.len());
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_neighborhood() {
        let sp = city_data("sp");
        let by_title = query(|q| q.search = Some("EQUILÍBRIO".into())).apply(sp);
        assert_eq!(by_title.len(), 1);
        let by_neighborhood = query(|q| q.search = Some("moema".into())).apply(sp);
        assert!(by_neighborhood.iter().all(|s| s.neighborhood == "Moema"));
        assert!(!by_neighborhood.is_empty());
    }

    #[test]
    fn neighborhood_list_is_parsed_from_commas() {
        let filter = query(|q| q.neighborhoods = Some("Moema, Pinheiros,,".into()));
        assert_eq!(filter.neighborhoods, ["Moema", "Pinheiros"]);
        let found = filter.apply(city_data("sp"));
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn rating_website_and_whatsapp_flags() {
        let sp = city_data("sp");
        let rated = query(|q| q.min_rating = Some(4.7)).apply(sp);
        assert!(rated.iter().all(|s| s.total_score >= 4.7));

        let with_site = query(|q| q.website = Some(true)).apply(sp);
        assert!(with_site.iter().all(|s| s.has_website()));

        let whatsapp = query(|q| q.whatsapp = Some(true)).apply(sp);
        assert!(whatsapp.iter().all(|s| is_whatsapp_number(&s.phone)));
    }

    #[test]
    fn paginates_with_totals() {
        let sp = city_data("sp");
        let all: Vec<&Studio> = sp.iter().collect();

        let first = paginate(all.clone(), Some(1), Some(3));
        assert_eq!(first.studios.len(), 3);
        assert_eq!(first.total, sp.len());
        assert_eq!(first.total_pages, sp.len().div_ceil(3));
        assert!(first.has_more);

        let beyond = paginate(all, Some(99), Some(3));
        assert!(beyond.studios.is_empty());
        assert!(!beyond.has_more);
    }
}
