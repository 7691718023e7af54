use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
    time::Duration,
};

use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use serde::Serialize;

use super::SitemapKind;

const PING_ENDPOINTS: [&str; 2] = [
    "https://www.google.com/ping",
    "https://www.bing.com/ping",
];
const PING_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
struct CachedSitemap {
    xml: String,
    generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub cached: Vec<SitemapKind>,
    pub last_invalidated: Option<DateTime<Utc>>,
}

/// XML já gerado por tipo de sitemap. Cada entrada vale pelo `max_age` do
/// tipo; `invalidate` descarta tudo.
#[derive(Debug, Default)]
pub struct SitemapCache {
    entries: RwLock<HashMap<SitemapKind, CachedSitemap>>,
    last_invalidated: RwLock<Option<DateTime<Utc>>>,
}

impl SitemapCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: SitemapKind, now: DateTime<Utc>) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let cached = entries.get(&kind)?;

        let age = now.signed_duration_since(cached.generated_at).num_seconds();
        if age < 0 || age >= i64::from(kind.max_age()) {
            return None;
        }
        Some(cached.xml.clone())
    }

    pub fn store(&self, kind: SitemapKind, xml: &str, now: DateTime<Utc>) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            kind,
            CachedSitemap {
                xml: xml.to_string(),
                generated_at: now,
            },
        );
    }

    /// Descarta todos os sitemaps; devolve quantos estavam em cache.
    pub fn invalidate(&self, now: DateTime<Utc>) -> usize {
        let cleared = {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            let n = entries.len();
            entries.clear();
            n
        };
        *self.last_invalidated.write().unwrap_or_else(PoisonError::into_inner) = Some(now);
        cleared
    }

    pub fn status(&self) -> CacheStatus {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut cached: Vec<SitemapKind> = entries.keys().copied().collect();
        cached.sort_by_key(|k| k.path());

        CacheStatus {
            cached,
            last_invalidated: *self.last_invalidated.read().unwrap_or_else(PoisonError::into_inner),
        }
    }
}

pub fn ping_urls(sitemap_url: &str) -> Vec<Url> {
    PING_ENDPOINTS
        .iter()
        .filter_map(|endpoint| Url::parse_with_params(endpoint, &[("sitemap", sitemap_url)]).ok())
        .collect()
}

/// Avisa os buscadores que o sitemap mudou. Falhas só vão para o log.
pub async fn notify_search_engines(client: &Client, sitemap_url: &str) {
    let urls = ping_urls(sitemap_url);
    let mut pending = tokio::task::JoinSet::new();

    for url in urls {
        let client = client.clone();
        pending.spawn(async move {
            match client.get(url.clone()).timeout(PING_TIMEOUT).send().await {
                Ok(response) => {
                    tracing::info!("Buscador notificado: {} - status {}", url, response.status())
                }
                Err(e) => tracing::error!("Falha ao notificar buscador {}: {:?}", url, e),
            }
        });
    }

    while let Some(result) = pending.join_next().await {
        if let Err(e) = result {
            tracing::error!("Erro ao notificar buscadores: {:?}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn serves_until_max_age() {
        let cache = SitemapCache::new();
        cache.store(SitemapKind::Pages, "<urlset/>", at(10));

        assert_eq!(cache.get(SitemapKind::Pages, at(10)).as_deref(), Some("<urlset/>"));
        // Pages vale 1 hora
        assert_eq!(cache.get(SitemapKind::Pages, at(11)), None);
        assert_eq!(cache.get(SitemapKind::Cities, at(10)), None);
    }

    #[test]
    fn invalidate_clears_everything() {
        let cache = SitemapCache::new();
        cache.store(SitemapKind::Pages, "a", at(10));
        cache.store(SitemapKind::Studios, "b", at(10));

        assert_eq!(cache.invalidate(at(10)), 2);
        assert_eq!(cache.get(SitemapKind::Studios, at(10)), None);

        let status = cache.status();
        assert!(status.cached.is_empty());
        assert_eq!(status.last_invalidated, Some(at(10)));
    }

    #[test]
    fn ping_urls_encode_the_sitemap() {
        let urls = ping_urls("https://pilates-sp.com/sitemap.xml");
        assert_eq!(urls.len(), 2);
        assert_eq!(
            urls[0].as_str(),
            "https://www.google.com/ping?sitemap=https%3A%2F%2Fpilates-sp.com%2Fsitemap.xml"
        );
    }
}
