use std::sync::Arc;

use reqwest::Client;

use crate::{config::Config, content::MdxLoader, db::DbPool, sitemap::cache::SitemapCache};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<Config>,
    pub mdx: MdxLoader,
    pub sitemaps: Arc<SitemapCache>,
    pub http: Client,
}

impl AppState {
    pub fn new(pool: DbPool, config: Config) -> Self {
        let mdx = MdxLoader::new(config.content_dir.clone());

        Self {
            pool,
            config: Arc::new(config),
            mdx,
            sitemaps: Arc::new(SitemapCache::new()),
            http: Client::new(),
        }
    }
}
