use serde::{Deserialize, Serialize};

use crate::utils::format::{is_whatsapp_number, phone_href, rating_display, whatsapp_url};

const WHATSAPP_GREETING: &str = "Olá! Vi o estúdio no site e gostaria de mais informações.";

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct OpeningHours {
    pub day: String,
    pub hours: String,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

// Registro pré-gerado (scraping externo), somente leitura
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Studio {
    pub title: String,
    #[serde(default)]
    pub total_score: f64,
    #[serde(default)]
    pub reviews_count: u32,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub neighborhood: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub category_name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub image_url: String,
    pub website: Option<String>,
    #[serde(default)]
    pub opening_hours: Vec<OpeningHours>,
    pub location: Location,
    #[serde(default)]
    pub address: String,
    pub city: String,
    pub slug: Option<String>,
}

impl Studio {
    pub fn has_website(&self) -> bool {
        self.website.as_deref().is_some_and(|w| !w.is_empty())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudioDetail<'a> {
    #[serde(flatten)]
    pub studio: &'a Studio,
    pub city_name: &'static str,
    pub phone_href: Option<String>,
    pub whatsapp_url: Option<String>,
    pub rating_label: String,
}

impl<'a> StudioDetail<'a> {
    pub fn new(studio: &'a Studio, city_name: &'static str) -> Self {
        let whatsapp_url = is_whatsapp_number(&studio.phone)
            .then(|| whatsapp_url(&studio.phone, Some(WHATSAPP_GREETING)));

        StudioDetail {
            city_name,
            phone_href: phone_href(&studio.phone),
            whatsapp_url,
            rating_label: rating_display(studio.total_score, studio.reviews_count),
            studio,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudioPage<'a> {
    pub studios: Vec<&'a Studio>,
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
    pub has_more: bool,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CityStats {
    pub total_studios: usize,
    pub avg_rating: f64,
    pub total_reviews: u64,
}
