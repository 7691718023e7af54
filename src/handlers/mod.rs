pub mod auth;
pub mod authors;
pub mod blog;
pub mod category;
pub mod dashboard;
pub mod posts;
pub mod sitemap;
pub mod studios;
pub mod tag;
pub mod upload;
