use sqlx::PgPool;
use time::Date;

use crate::models::{Master, Promotion, Service};

pub async fn get_services(pool: &PgPool) -> Result<Vec<Service>, sqlx::Error> {
    sqlx::query_as::<_, Service>("SELECT * FROM services ORDER BY name")
        .fetch_all(pool)
        .await
}

pub async fn find_service(pool: &PgPool, service_id: i32) -> Result<Option<Service>, sqlx::Error> {
    sqlx::query_as::<_, Service>("SELECT * FROM services WHERE id = $1")
        .bind(service_id)
        .fetch_optional(pool)
        .await
}

pub async fn get_masters_by_service(pool: &PgPool, service_id: i32) -> Result<Vec<Master>, sqlx::Error> {
    sqlx::query_as::<_, Master>(
        "SELECT m.* FROM masters m
         JOIN master_services ms ON m.id = ms.master_id
         WHERE ms.service_id = $1
         ORDER BY m.name",
    )
    .bind(service_id)
    .fetch_all(pool)
    .await
}

pub async fn find_master(pool: &PgPool, master_id: i32) -> Result<Option<Master>, sqlx::Error> {
    sqlx::query_as::<_, Master>("SELECT * FROM masters WHERE id = $1")
        .bind(master_id)
        .fetch_optional(pool)
        .await
}

/// Акции, действующие в `today` (границы включительно).
pub async fn active_promotions(pool: &PgPool, today: Date) -> Result<Vec<Promotion>, sqlx::Error> {
    let promotions = sqlx::query_as::<_, Promotion>(
        "SELECT title, description, start_date, end_date FROM promotions
         WHERE start_date <= $1 AND end_date >= $1
         ORDER BY start_date DESC",
    )
    .bind(today)
    .fetch_all(pool)
    .await?;

    Ok(promotions.into_iter().filter(|p| p.is_active(today)).collect())
}
