use sqlx::{migrate::MigrateError, postgres::PgPoolOptions, Pool, Postgres};

pub type DbPool = Pool<Postgres>;

const MAX_CONNECTIONS: u32 = 5;

pub async fn init_db(db_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect(db_url)
        .await
}

pub async fn run_migrations(pool: &DbPool) -> Result<(), MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

// Pool que só conecta no primeiro uso; rotas que não tocam o banco rodam sem Postgres
#[cfg(test)]
pub fn lazy_pool(db_url: &str) -> DbPool {
    PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(std::time::Duration::from_millis(200))
        .connect_lazy(db_url)
        .unwrap()
}
