//! Montagem dos sitemaps XML.
//!
//! Tudo aqui é determinístico: recebe dados já buscados (lista estática,
//! linhas de `studios`, posts/categorias) e devolve a string XML.

pub mod cache;

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::{
    models::city::{city_slug, CITIES},
    utils::slug::generate_slug,
};

const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

pub const BLOG_FALLBACK_MAX_AGE: u32 = 300;
/// Teto de URLs do sitemap de estúdios.
pub const MAX_STUDIO_URLS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SitemapKind {
    Index,
    Pages,
    Cities,
    Neighborhoods,
    Studios,
    Blog,
}

impl SitemapKind {
    /// Sitemaps referenciados pelo índice.
    pub const CHILDREN: [SitemapKind; 5] = [
        SitemapKind::Pages,
        SitemapKind::Cities,
        SitemapKind::Neighborhoods,
        SitemapKind::Studios,
        SitemapKind::Blog,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            SitemapKind::Index => "/sitemap.xml",
            SitemapKind::Pages => "/sitemap-pages.xml",
            SitemapKind::Cities => "/sitemap-cities.xml",
            SitemapKind::Neighborhoods => "/sitemap-neighborhoods.xml",
            SitemapKind::Studios => "/sitemap-studios.xml",
            SitemapKind::Blog => "/sitemap-blog.xml",
        }
    }

    /// Segundos de `Cache-Control`.
    pub fn max_age(&self) -> u32 {
        match self {
            SitemapKind::Index | SitemapKind::Pages | SitemapKind::Blog => 3600,
            SitemapKind::Cities => 7200,
            SitemapKind::Neighborhoods => 21600,
            SitemapKind::Studios => 43200,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFreq {
    Daily,
    Weekly,
    Monthly,
}

impl ChangeFreq {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeFreq::Daily => "daily",
            ChangeFreq::Weekly => "weekly",
            ChangeFreq::Monthly => "monthly",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UrlEntry {
    pub loc: String,
    pub lastmod: String,
    pub changefreq: ChangeFreq,
    pub priority: &'static str,
}

impl UrlEntry {
    fn new(loc: String, lastmod: String, changefreq: ChangeFreq, priority: &'static str) -> Self {
        Self { loc, lastmod, changefreq, priority }
    }
}

// Campos de `studios` usados pelos sitemaps dinâmicos
#[derive(Debug, Clone, FromRow)]
pub struct StudioRow {
    pub slug: Option<String>,
    pub city_code: String,
    pub neighborhood: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Mesmo formato do `toISOString()`: milissegundos e `Z`.
pub fn iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn render_urlset(entries: &[UrlEntry]) -> String {
    let mut xml = String::with_capacity(128 + entries.len() * 160);
    xml.push_str(XML_HEADER);
    xml.push('\n');
    xml.push_str(&format!("<urlset xmlns=\"{}\">\n", SITEMAP_NS));

    for entry in entries {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.loc)));
        xml.push_str(&format!("    <lastmod>{}</lastmod>\n", escape_xml(&entry.lastmod)));
        xml.push_str(&format!("    <changefreq>{}</changefreq>\n", entry.changefreq.as_str()));
        xml.push_str(&format!("    <priority>{}</priority>\n", entry.priority));
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>");
    xml
}

pub fn render_index(base_url: &str, now: DateTime<Utc>) -> String {
    let lastmod = iso(now);
    let mut xml = String::new();
    xml.push_str(XML_HEADER);
    xml.push('\n');
    xml.push_str(&format!("<sitemapindex xmlns=\"{}\">\n", SITEMAP_NS));

    for kind in SitemapKind::CHILDREN {
        xml.push_str("  <sitemap>\n");
        xml.push_str(&format!("    <loc>{}{}</loc>\n", escape_xml(base_url), kind.path()));
        xml.push_str(&format!("    <lastmod>{}</lastmod>\n", lastmod));
        xml.push_str("  </sitemap>\n");
    }

    xml.push_str("</sitemapindex>");
    xml
}

/// Home, uma página por cidade e a página de analytics.
pub fn static_pages(base_url: &str, now: DateTime<Utc>) -> Vec<UrlEntry> {
    let lastmod = iso(now);
    let mut pages = vec![UrlEntry::new(base_url.to_string(), lastmod.clone(), ChangeFreq::Daily, "1.0")];

    pages.extend(CITIES.iter().map(|city| {
        UrlEntry::new(
            format!("{}/pilates-{}", base_url, city.slug),
            lastmod.clone(),
            ChangeFreq::Daily,
            "0.9",
        )
    }));

    pages.push(UrlEntry::new(
        format!("{}/analytics", base_url),
        lastmod,
        ChangeFreq::Weekly,
        "0.7",
    ));
    pages
}

// Agrupa por chave mantendo a ordem da primeira aparição e o updated_at mais novo
fn newest_by_key<K, F>(rows: &[StudioRow], key: F) -> Vec<(K, Option<DateTime<Utc>>)>
where
    K: Clone + Eq + std::hash::Hash,
    F: Fn(&StudioRow) -> Option<K>,
{
    let mut groups: Vec<(K, Option<DateTime<Utc>>)> = Vec::new();
    let mut index: HashMap<K, usize> = HashMap::new();

    for row in rows {
        let Some(k) = key(row) else { continue };
        match index.get(&k) {
            Some(&i) => {
                if row.updated_at > groups[i].1 {
                    groups[i].1 = row.updated_at;
                }
            }
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, row.updated_at));
            }
        }
    }

    groups
}

pub fn city_entries(base_url: &str, rows: &[StudioRow], now: DateTime<Utc>) -> Vec<UrlEntry> {
    newest_by_key(rows, |r| Some(r.city_code.clone()))
        .into_iter()
        .map(|(code, updated)| {
            UrlEntry::new(
                format!("{}/pilates-{}", base_url, city_slug(&code)),
                iso(updated.unwrap_or(now)),
                ChangeFreq::Daily,
                "0.9",
            )
        })
        .collect()
}

pub fn neighborhood_entries(base_url: &str, rows: &[StudioRow], now: DateTime<Utc>) -> Vec<UrlEntry> {
    let groups = newest_by_key(rows, |r| {
        r.neighborhood
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .map(|n| (n.to_string(), r.city_code.clone()))
    });

    groups
        .into_iter()
        .filter_map(|((neighborhood, code), updated)| {
            let slug = generate_slug(&neighborhood);
            if slug.is_empty() {
                return None;
            }
            Some(UrlEntry::new(
                format!("{}/pilates-{}-{}", base_url, slug, city_slug(&code)),
                iso(updated.unwrap_or(now)),
                ChangeFreq::Weekly,
                "0.8",
            ))
        })
        .collect()
}

pub fn studio_entries(base_url: &str, rows: &[StudioRow], now: DateTime<Utc>) -> Vec<UrlEntry> {
    rows.iter()
        .filter_map(|row| {
            let slug = row.slug.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
            Some(UrlEntry::new(
                format!("{}/estudio/{}", base_url, slug),
                iso(row.updated_at.unwrap_or(now)),
                ChangeFreq::Monthly,
                "0.7",
            ))
        })
        .take(MAX_STUDIO_URLS)
        .collect()
}

#[derive(Debug, Clone, FromRow)]
pub struct BlogPostRow {
    pub slug: String,
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

pub fn blog_entries(
    base_url: &str,
    posts: &[BlogPostRow],
    category_slugs: &[String],
    now: DateTime<Utc>,
) -> Vec<UrlEntry> {
    let mut entries = blog_fallback(base_url, now);

    entries.extend(posts.iter().map(|post| {
        let lastmod = post.updated_at.or(post.published_at).unwrap_or(now);
        UrlEntry::new(
            format!("{}/blog/{}", base_url, post.slug),
            iso(lastmod),
            ChangeFreq::Monthly,
            "0.7",
        )
    }));

    entries.extend(category_slugs.iter().map(|slug| {
        UrlEntry::new(
            format!("{}/blog/categoria/{}", base_url, slug),
            iso(now),
            ChangeFreq::Weekly,
            "0.6",
        )
    }));

    entries
}

/// Só a página principal do blog; usado quando o banco falha.
pub fn blog_fallback(base_url: &str, now: DateTime<Utc>) -> Vec<UrlEntry> {
    vec![UrlEntry::new(
        format!("{}/blog", base_url),
        iso(now),
        ChangeFreq::Daily,
        "0.8",
    )]
}
