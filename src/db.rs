use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::Config;

pub async fn get_db_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
}

/// Накатывает `schema.sql` на пустую базу, которую создаёт `#[sqlx::test]`.
#[cfg(test)]
pub async fn apply_schema(pool: &PgPool) {
    sqlx::raw_sql(include_str!("../schema.sql"))
        .execute(pool)
        .await
        .expect("schema.sql should apply to an empty database");
}

/// Код Postgres `unique_violation`.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23505"),
        _ => false,
    }
}
